use std::{env, path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};

use crate::models::User;
use crate::overdue::DEFAULT_SCAN_INTERVAL;
use crate::store::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

// Where the task blob lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    File,
    Memory, // nothing survives a restart
}

impl StorageBackend {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => bail!("STORAGE must be `file` or `memory`, got `{other}`"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,
    pub log_format: LogFormat,

    // Storage
    pub storage: StorageBackend,
    pub data_dir: PathBuf,
    pub storage_key: String,

    // Static frontend files
    pub static_dir: PathBuf,

    // Overdue scanner
    pub overdue_scan_interval: Duration,

    // People tasks can be assigned to
    pub users: Vec<User>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = Environment::parse(&lookup("ENV").unwrap_or_else(|| "dev".to_string()));
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string());

        // JSON lines by default in production only
        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => bail!("LOG_FORMAT must be `pretty` or `json`, got `{other}`"),
            None if env == Environment::Prod => LogFormat::Json,
            None => LogFormat::Pretty,
        };

        let storage = match lookup("STORAGE") {
            Some(raw) => StorageBackend::parse(&raw)?,
            None => StorageBackend::File,
        };
        let data_dir = PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let storage_key = lookup("STORAGE_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        let static_dir = PathBuf::from(lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string()));

        let overdue_scan_interval = match lookup("OVERDUE_SCAN_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("OVERDUE_SCAN_INTERVAL_SECS is not a number: {raw}"))?;
                if secs == 0 {
                    bail!("OVERDUE_SCAN_INTERVAL_SECS must be greater than 0");
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_SCAN_INTERVAL,
        };

        Ok(Settings {
            env,
            server_addr,
            log_format,
            storage,
            data_dir,
            storage_key,
            static_dir,
            overdue_scan_interval,
            users: default_users(),
        })
    }

    pub fn has_user(&self, user_id: &str) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }
}

// Built-in roster
pub fn default_users() -> Vec<User> {
    [
        ("1", "John Doe"),
        ("2", "Jane Smith"),
        ("3", "Alice Johnson"),
        ("4", "Bob Wilson"),
    ]
    .into_iter()
    .map(|(id, name)| User {
        id: id.to_string(),
        name: name.to_string(),
        avatar: Some(format!("https://i.pravatar.cc/150?u={id}")),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.env, Environment::Dev);
        assert_eq!(s.server_addr, "127.0.0.1:3000");
        assert_eq!(s.log_format, LogFormat::Pretty);
        assert_eq!(s.storage, StorageBackend::File);
        assert_eq!(s.data_dir, PathBuf::from("data"));
        assert_eq!(s.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(s.overdue_scan_interval, Duration::from_secs(30));
        assert_eq!(s.users.len(), 4);
        assert!(s.has_user("3"));
        assert!(!s.has_user("9"));
    }

    #[test]
    fn overrides() {
        let s = settings(&[
            ("ENV", "production"),
            ("SERVER_ADDR", "0.0.0.0:8080"),
            ("DATA_DIR", "/var/lib/board"),
            ("STORAGE_KEY", "team-board"),
            ("OVERDUE_SCAN_INTERVAL_SECS", "5"),
            ("STORAGE", "Memory"),
        ])
        .unwrap();
        assert_eq!(s.env, Environment::Prod);
        assert_eq!(s.log_format, LogFormat::Json);
        assert_eq!(s.storage, StorageBackend::Memory);
        assert_eq!(s.server_addr, "0.0.0.0:8080");
        assert_eq!(s.data_dir, PathBuf::from("/var/lib/board"));
        assert_eq!(s.storage_key, "team-board");
        assert_eq!(s.overdue_scan_interval, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_interval() {
        assert!(settings(&[("OVERDUE_SCAN_INTERVAL_SECS", "soon")]).is_err());
        assert!(settings(&[("OVERDUE_SCAN_INTERVAL_SECS", "0")]).is_err());
    }

    #[test]
    fn log_format_and_storage_choices() {
        let s = settings(&[("ENV", "prod"), ("LOG_FORMAT", "pretty")]).unwrap();
        assert_eq!(s.log_format, LogFormat::Pretty);
        assert!(settings(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(settings(&[("STORAGE", "redis")]).is_err());
    }
}
