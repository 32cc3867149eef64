use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;

/// Runtime settings for the HTTP server, built from the command line.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built frontend served for any non-API path
    pub static_dir: Option<PathBuf>,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    pub open: bool,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
            cors_origins: Vec::new(),
            open: false,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address a browser should use; wildcard binds are reached via loopback.
    pub fn url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "127.0.0.1",
            h => h,
        };
        format!("http://{}:{}", host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_frontend_expectations() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:3001");
        assert_eq!(config.url(), "http://127.0.0.1:3001");
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn wildcard_host_is_browsed_through_loopback() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.url(), "http://127.0.0.1:8080");
    }
}
