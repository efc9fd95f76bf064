use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use strum::Display;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub likes: Likes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Database {
    pub url: String,
    pub pool_size: u32,
    pub connection_timeout_ms: u64,
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Likes {
    pub strategy: LikeStrategy,
}

/// How `/posts.like` and `/posts.dislike` move the counter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display)]
pub enum LikeStrategy {
    /// Read the current value, then write `value + delta`. Concurrent requests
    /// on the same post can lose updates.
    #[default]
    #[strum(serialize = "read-then-write")]
    ReadThenWrite,
    /// Let the store apply `likes = likes + delta` in one statement.
    #[strum(serialize = "atomic")]
    Atomic,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: Server {
                host: "0.0.0.0".to_string(),
                port: 9999,
            },
            database: Database {
                url: "posts.db".to_string(),
                pool_size: 5,
                connection_timeout_ms: 5000,
                busy_timeout_ms: 2000,
            },
            likes: Likes {
                strategy: LikeStrategy::ReadThenWrite,
            },
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(Self::load_from_files)
    }

    fn load_from_files() -> Settings {
        let default_path = Path::new("settings.default.ron");
        let override_path = Path::new("settings.ron");

        let mut settings = Self::read_ron(default_path).unwrap_or_default();

        if let Some(overrides) = Self::read_ron(override_path) {
            settings = overrides;
        }

        settings.apply_env();
        settings
    }

    fn read_ron(path: &Path) -> Option<Settings> {
        if !path.exists() {
            return None;
        }
        fs::read_to_string(path)
            .ok()
            .and_then(|content| ron::from_str(&content).ok())
    }

    /// `PORT` and `DATABASE_URL` win over whatever the files said.
    fn apply_env(&mut self) {
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.server.port, 9999);
        assert_eq!(s.socket_addr(), "0.0.0.0:9999");
        assert_eq!(s.likes.strategy, LikeStrategy::ReadThenWrite);
    }

    #[test]
    fn test_parse_ron_override() {
        let text = r#"(
            server: (host: "127.0.0.1", port: 8080),
            database: (
                url: ":memory:",
                pool_size: 1,
                connection_timeout_ms: 100,
                busy_timeout_ms: 10,
            ),
            likes: (strategy: Atomic),
        )"#;
        let parsed: Settings = ron::from_str(text).unwrap();
        assert_eq!(parsed.socket_addr(), "127.0.0.1:8080");
        assert_eq!(parsed.database.pool_size, 1);
        assert_eq!(parsed.likes.strategy, LikeStrategy::Atomic);
    }

    #[test]
    fn test_missing_file_is_ignored() {
        assert!(Settings::read_ron(Path::new("does-not-exist.ron")).is_none());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(LikeStrategy::ReadThenWrite.to_string(), "read-then-write");
        assert_eq!(LikeStrategy::Atomic.to_string(), "atomic");
    }
}
