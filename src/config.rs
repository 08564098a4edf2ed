use std::env;
use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings, read from the environment (and a `.env` file when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_vars(env::var("JOBBOARD_DB").ok(), env::var("JOBBOARD_LOG").ok())
    }

    pub fn from_vars(database: Option<String>, log: Option<String>) -> Self {
        Self {
            database_path: database
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_path),
            log_filter: log
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

fn default_path() -> PathBuf {
    // XDG data directory, or the working directory when there is no home
    match directories::ProjectDirs::from("", "", "jobboard") {
        Some(dirs) => dirs.data_dir().join("jobboard.db"),
        None => PathBuf::from("jobboard.db"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_values_win() {
        let config = Config::from_vars(Some("/tmp/board.db".to_string()), Some("debug".to_string()));
        assert_eq!(config.database_path, PathBuf::from("/tmp/board.db"));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(None, Some("  ".to_string()));
        assert!(config.database_path.ends_with("jobboard.db"));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }
}
