//! Per-session "go back" history of visited directories.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{AppError, Result};

/// Stacks of visited paths keyed by session id. Sessions never see each
/// other's history.
#[derive(Debug, Clone, Default)]
pub struct NavigationStacks {
    inner: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("Lock poisoned".to_string())
}

impl NavigationStacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `path` and returns the new depth.
    pub fn push(&self, session: &str, path: &str) -> Result<usize> {
        let mut stacks = self.inner.write().map_err(poisoned)?;
        let stack = stacks.entry(session.to_string()).or_default();
        stack.push(path.to_string());
        Ok(stack.len())
    }

    pub fn pop(&self, session: &str) -> Result<Option<String>> {
        let mut stacks = self.inner.write().map_err(poisoned)?;
        let Some(stack) = stacks.get_mut(session) else {
            return Ok(None);
        };
        let popped = stack.pop();
        if stack.is_empty() {
            stacks.remove(session);
        }
        Ok(popped)
    }

    pub fn peek(&self, session: &str) -> Result<Option<String>> {
        let stacks = self.inner.read().map_err(poisoned)?;
        Ok(stacks.get(session).and_then(|s| s.last().cloned()))
    }

    pub fn entries(&self, session: &str) -> Result<Vec<String>> {
        let stacks = self.inner.read().map_err(poisoned)?;
        Ok(stacks.get(session).cloned().unwrap_or_default())
    }

    pub fn reset(&self, session: &str) -> Result<()> {
        self.inner.write().map_err(poisoned)?.remove(session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_is_last_in_first_out() {
        let nav = NavigationStacks::new();
        assert_eq!(nav.push("s", "/a").unwrap(), 1);
        assert_eq!(nav.push("s", "/a/b").unwrap(), 2);

        assert_eq!(nav.peek("s").unwrap().as_deref(), Some("/a/b"));
        assert_eq!(nav.pop("s").unwrap().as_deref(), Some("/a/b"));
        assert_eq!(nav.pop("s").unwrap().as_deref(), Some("/a"));
        assert_eq!(nav.pop("s").unwrap(), None);
    }

    #[test]
    fn sessions_are_independent() {
        let nav = NavigationStacks::new();
        nav.push("left", "/l").unwrap();
        nav.push("right", "/r").unwrap();

        nav.reset("left").unwrap();
        assert!(nav.entries("left").unwrap().is_empty());
        assert_eq!(nav.entries("right").unwrap(), vec!["/r".to_string()]);
    }

    #[test]
    fn clones_share_state() {
        let nav = NavigationStacks::new();
        let other = nav.clone();
        nav.push("s", "/x").unwrap();
        assert_eq!(other.peek("s").unwrap().as_deref(), Some("/x"));
    }
}
