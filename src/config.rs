#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! Values are resolved with the precedence command line override, process
//! environment, `.env` file, built-in default.

use anyhow::{Context, Result, anyhow};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_ENV_PATH: &str = ".env";
pub const DEFAULT_TUBEFEED_PORT: u16 = 8080;
pub const DEFAULT_TUBEFEED_HOST: &str = "127.0.0.1";
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:3001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_LOCATION: &str = "TR";
pub const DEFAULT_LANG: &str = "tr";
pub const DEFAULT_CLIENT_TYPE: &str = "WEB";

/// Session settings forwarded to the upstream scraping client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub location: String,
    pub lang: String,
    pub client_type: String,
    pub enable_session_cache: bool,
    pub enable_safety_mode: bool,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            lang: DEFAULT_LANG.to_string(),
            client_type: DEFAULT_CLIENT_TYPE.to_string(),
            enable_session_cache: false,
            enable_safety_mode: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upstream_url: Option<String>,
    pub env_path: Option<PathBuf>,
}

pub fn resolve_runtime_settings(overrides: RuntimeOverrides) -> Result<RuntimeSettings> {
    let env_path = overrides
        .env_path
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_ENV_PATH));
    let file_vars = read_env_file(env_path)?;
    build_runtime_settings_with_overrides(&file_vars, env_var_string, overrides)
}

#[cfg(test)]
fn build_runtime_settings(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<RuntimeSettings> {
    build_runtime_settings_with_overrides(file_vars, env_lookup, RuntimeOverrides::default())
}

fn build_runtime_settings_with_overrides(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: RuntimeOverrides,
) -> Result<RuntimeSettings> {
    let lookup = |key: &str| lookup_value(key, file_vars, &env_lookup);

    let host = non_blank(overrides.host)
        .or_else(|| lookup("TUBEFEED_HOST"))
        .unwrap_or_else(|| DEFAULT_TUBEFEED_HOST.to_string());
    let port = overrides
        .port
        .or_else(|| lookup("TUBEFEED_PORT").and_then(|value| value.parse::<u16>().ok()))
        .unwrap_or(DEFAULT_TUBEFEED_PORT);
    let request_timeout = lookup("REQUEST_TIMEOUT_SECS")
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

    let base_url = non_blank(overrides.upstream_url)
        .or_else(|| lookup("UPSTREAM_URL"))
        .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(anyhow!("UPSTREAM_URL must be an http(s) URL, got {base_url}"));
    }

    let upstream = UpstreamSettings {
        base_url: base_url.trim_end_matches('/').to_string(),
        location: lookup("YOUTUBE_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        lang: lookup("YOUTUBE_LANG").unwrap_or_else(|| DEFAULT_LANG.to_string()),
        client_type: lookup("YOUTUBE_CLIENT_TYPE")
            .unwrap_or_else(|| DEFAULT_CLIENT_TYPE.to_string()),
        enable_session_cache: lookup("YOUTUBE_ENABLE_CACHE").as_deref() == Some("true"),
        enable_safety_mode: lookup("YOUTUBE_ENABLE_SAFETY_MODE").as_deref() == Some("true"),
    };

    Ok(RuntimeSettings {
        host,
        port,
        request_timeout,
        upstream,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_var_string(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
}

fn lookup_value(
    key: &str,
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    env_lookup(key).or_else(|| non_blank(file_vars.get(key).cloned()))
}

/// Parses a dotenv-style file. A missing file is an empty set of variables.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value_raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value_raw.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|value| value.strip_suffix('"'))
            .or_else(|| {
                value
                    .strip_prefix('\'')
                    .and_then(|value| value.strip_suffix('\''))
            })
            .unwrap_or(value);
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn make_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    fn settings_from(contents: &str) -> RuntimeSettings {
        let cfg = make_config(contents);
        let vars = read_env_file(cfg.path()).unwrap();
        build_runtime_settings(&vars, |_| None).unwrap()
    }

    #[test]
    fn defaults_apply_to_an_empty_file() {
        let settings = settings_from("");
        assert_eq!(settings.host, DEFAULT_TUBEFEED_HOST);
        assert_eq!(settings.port, DEFAULT_TUBEFEED_PORT);
        assert_eq!(
            settings.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert_eq!(settings.upstream, UpstreamSettings::default());
    }

    #[test]
    fn reads_upstream_session_settings() {
        let settings = settings_from(
            "UPSTREAM_URL=\"http://bridge:9000/\"\nYOUTUBE_LOCATION=\"DE\"\nYOUTUBE_LANG=de\nYOUTUBE_CLIENT_TYPE=MWEB\nYOUTUBE_ENABLE_CACHE=true\nYOUTUBE_ENABLE_SAFETY_MODE=yes\n",
        );
        assert_eq!(settings.upstream.base_url, "http://bridge:9000");
        assert_eq!(settings.upstream.location, "DE");
        assert_eq!(settings.upstream.lang, "de");
        assert_eq!(settings.upstream.client_type, "MWEB");
        assert!(settings.upstream.enable_session_cache);
        assert!(!settings.upstream.enable_safety_mode);
    }

    #[test]
    fn invalid_port_and_timeout_fall_back_to_defaults() {
        let settings = settings_from("TUBEFEED_PORT=\"nope\"\nREQUEST_TIMEOUT_SECS=0\n");
        assert_eq!(settings.port, DEFAULT_TUBEFEED_PORT);
        assert_eq!(
            settings.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn rejects_non_http_upstream() {
        let vars = read_env_file(make_config("UPSTREAM_URL=ftp://bridge\n").path()).unwrap();
        let err = build_runtime_settings(&vars, |_| None).unwrap_err();
        assert!(err.to_string().contains("UPSTREAM_URL"));
    }

    #[test]
    fn env_wins_over_file() {
        let vars = read_env_file(make_config("TUBEFEED_PORT=7000\nYOUTUBE_LANG=tr\n").path()).unwrap();
        let settings = build_runtime_settings(&vars, |key| match key {
            "YOUTUBE_LANG" => Some("en".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(settings.port, 7000);
        assert_eq!(settings.upstream.lang, "en");
    }

    #[test]
    fn overrides_win_over_env_and_file() {
        let mut vars = HashMap::new();
        vars.insert("TUBEFEED_HOST".to_string(), "file-host".to_string());
        vars.insert("TUBEFEED_PORT".to_string(), "7000".to_string());
        vars.insert("UPSTREAM_URL".to_string(), "http://file".to_string());

        let overrides = RuntimeOverrides {
            host: Some("override-host".into()),
            port: Some(9000),
            upstream_url: Some("https://override".into()),
            env_path: None,
        };
        let settings = build_runtime_settings_with_overrides(
            &vars,
            |key| (key == "TUBEFEED_PORT").then(|| "8000".to_string()),
            overrides,
        )
        .unwrap();

        assert_eq!(settings.host, "override-host");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.upstream.base_url, "https://override");
    }

    #[test]
    fn blank_host_override_is_ignored() {
        let settings = build_runtime_settings_with_overrides(
            &HashMap::new(),
            |_| None,
            RuntimeOverrides {
                host: Some("   ".into()),
                ..RuntimeOverrides::default()
            },
        )
        .unwrap();
        assert_eq!(settings.host, DEFAULT_TUBEFEED_HOST);
    }

    #[test]
    fn read_env_file_handles_export_and_quotes() {
        let cfg = make_config(
            r#"
            export UPSTREAM_URL="http://bridge"
            YOUTUBE_LANG='tr'
            TUBEFEED_HOST =  "0.0.0.0"
            TUBEFEED_PORT=9090
            # comment
            INVALID_LINE
            "#,
        );
        let vars = read_env_file(cfg.path()).unwrap();
        assert_eq!(vars.get("UPSTREAM_URL").unwrap(), "http://bridge");
        assert_eq!(vars.get("YOUTUBE_LANG").unwrap(), "tr");
        assert_eq!(vars.get("TUBEFEED_HOST").unwrap(), "0.0.0.0");
        assert_eq!(vars.get("TUBEFEED_PORT").unwrap(), "9090");
        assert!(!vars.contains_key("INVALID_LINE"));
    }

    #[test]
    fn read_env_file_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let vars = read_env_file(&dir.path().join("missing.env")).unwrap();
        assert!(vars.is_empty());
    }
}
