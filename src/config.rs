// Runtime configuration read from the environment (and `.env` when present).
use std::path::PathBuf;
use std::str::FromStr;

use crate::algorithm::UnscheduledPolicy;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_DIR: &str = "generated/json";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";
pub const DEFAULT_MAX_COMBINATIONS: usize = 5000;
pub const MAX_COMBINATIONS_LIMIT: usize = 10000;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub default_max_combinations: usize,
    pub max_combinations_limit: usize,
    pub unscheduled_policy: UnscheduledPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            default_max_combinations: DEFAULT_MAX_COMBINATIONS,
            max_combinations_limit: MAX_COMBINATIONS_LIMIT,
            unscheduled_policy: UnscheduledPolicy::Wildcard,
        }
    }
}

fn split_origins(s: &str) -> Vec<String> {
    s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect()
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, fallback: T) -> T {
    match raw {
        Some(v) => match v.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(key, value = %v, "invalid config value, using default");
                fallback
            }
        },
        None => fallback,
    }
}

impl AppConfig {
    /// Loads `.env` if there is one, then reads the process environment.
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        AppConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Tests pass a map here
    /// instead of touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let limit = parse_or(
            "MAX_COMBINATIONS_LIMIT",
            lookup("MAX_COMBINATIONS_LIMIT"),
            defaults.max_combinations_limit,
        )
        .max(1);
        let default_max = parse_or(
            "DEFAULT_MAX_COMBINATIONS",
            lookup("DEFAULT_MAX_COMBINATIONS"),
            defaults.default_max_combinations,
        )
        .clamp(1, limit);

        AppConfig {
            host: lookup("SCHEDULER_HOST").filter(|h| !h.trim().is_empty()).unwrap_or(defaults.host),
            port: parse_or("SCHEDULER_PORT", lookup("SCHEDULER_PORT"), defaults.port),
            data_dir: lookup("SCHEDULER_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            allowed_origins: lookup("ALLOWED_ORIGINS").map(|s| split_origins(&s)).unwrap_or(defaults.allowed_origins),
            default_max_combinations: default_max,
            max_combinations_limit: limit,
            unscheduled_policy: parse_or(
                "UNSCHEDULED_POLICY",
                lookup("UNSCHEDULED_POLICY"),
                defaults.unscheduled_policy,
            ),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.allowed_origins.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("SCHEDULER_HOST", "127.0.0.1"),
            ("SCHEDULER_PORT", "8080"),
            ("SCHEDULER_DATA_DIR", "/tmp/courses"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("DEFAULT_MAX_COMBINATIONS", "100"),
            ("MAX_COMBINATIONS_LIMIT", "500"),
            ("UNSCHEDULED_POLICY", "exclude"),
        ]));
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/courses"));
        assert_eq!(cfg.allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(cfg.default_max_combinations, 100);
        assert_eq!(cfg.max_combinations_limit, 500);
        assert_eq!(cfg.unscheduled_policy, UnscheduledPolicy::Exclude);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("SCHEDULER_PORT", "eighty"),
            ("UNSCHEDULED_POLICY", "sometimes"),
            ("DEFAULT_MAX_COMBINATIONS", "20000"),
        ]));
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.unscheduled_policy, UnscheduledPolicy::Wildcard);
        // default never exceeds the limit
        assert_eq!(cfg.default_max_combinations, MAX_COMBINATIONS_LIMIT);
    }
}
