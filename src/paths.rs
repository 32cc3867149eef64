//! Path normalization shared by the listing and repository code.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Lexically resolves `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Makes `input` absolute against the current directory and normalizes it.
pub fn resolve_absolute<P: AsRef<Path>>(input: P) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(input.as_ref())?;
    Ok(normalize(&absolute))
}

/// Canonicalizes the longest existing prefix of `path` and re-appends the rest.
///
/// Paths that no longer exist (deleted files, rename targets) still resolve
/// through symlinked parents this way.
pub fn canonicalize_lenient(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut rest: Vec<std::ffi::OsString> = Vec::new();

    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut out = canonical;
            for part in rest.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (existing.file_name().map(|n| n.to_os_string()), existing.parent()) {
            (Some(name), Some(parent)) => {
                rest.push(name);
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
}

pub fn is_filesystem_root(path: &Path) -> bool {
    path.parent().is_none()
}

/// Joins the components of a relative path with `/`, the separator git uses.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn root_detection() {
        assert!(is_filesystem_root(Path::new("/")));
        assert!(!is_filesystem_root(Path::new("/tmp")));
    }

    #[test]
    fn slash_join_drops_non_normal_components() {
        assert_eq!(to_slash(Path::new("dir/sub/file.txt")), "dir/sub/file.txt");
        assert_eq!(to_slash(Path::new("")), "");
    }

    #[test]
    fn lenient_canonicalize_keeps_missing_tail() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("gone").join("file.txt");
        let resolved = canonicalize_lenient(&missing);
        assert!(resolved.ends_with("gone/file.txt"));
        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
    }
}
