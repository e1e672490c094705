//! Prism - Process-wide configuration
//!
//! Resolved once at startup (CLI flags, then environment, then literal
//! defaults) and never mutated afterwards.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Environment variable naming the analytics backend base URL.
pub const BACKEND_URL_ENV: &str = "PRISM_BACKEND_URL";

/// Backend used when neither a flag nor the environment names one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Largest file the upload surface will read into memory.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 32 * 1024 * 1024;

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the analytics backend, without a trailing slash
    pub backend_url: String,
    /// Directory that preview exports are written to
    pub export_dir: PathBuf,
    /// Upload size limit in bytes
    pub max_file_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            export_dir: PathBuf::from("."),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl Config {
    /// Resolve from explicit overrides, falling back to the environment and
    /// then to the literal defaults.
    pub fn resolve(backend_url: Option<String>, export_dir: Option<PathBuf>) -> Self {
        let env_url = std::env::var(BACKEND_URL_ENV).ok();
        Self::resolve_with(backend_url, env_url, export_dir)
    }

    fn resolve_with(
        flag_url: Option<String>,
        env_url: Option<String>,
        export_dir: Option<PathBuf>,
    ) -> Self {
        let defaults = Self::default();
        let non_blank = |u: Option<String>| {
            u.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
        };
        let backend_url = non_blank(flag_url)
            .or_else(|| non_blank(env_url))
            .unwrap_or(defaults.backend_url);

        Self {
            backend_url: normalize_url(&backend_url),
            export_dir: export_dir.unwrap_or(defaults.export_dir),
            max_file_bytes: defaults.max_file_bytes,
        }
    }
}

fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Install the process configuration. Only the first call wins; later calls
/// return `false` and leave the installed value untouched.
pub fn init(config: Config) -> bool {
    CONFIG.set(config).is_ok()
}

/// The installed configuration, or the environment defaults if `init` was
/// never called.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| Config::resolve(None, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_beats_env() {
        let cfg = Config::resolve_with(
            Some("http://flag:9000/".into()),
            Some("http://env:1".into()),
            None,
        );
        assert_eq!(cfg.backend_url, "http://flag:9000");
    }

    #[test]
    fn test_env_fallback() {
        let cfg = Config::resolve_with(None, Some("http://env:1".into()), None);
        assert_eq!(cfg.backend_url, "http://env:1");
    }

    #[test]
    fn test_blank_flag_falls_through_to_env() {
        let cfg = Config::resolve_with(Some("  ".into()), Some("http://env:1/".into()), None);
        assert_eq!(cfg.backend_url, "http://env:1");
    }

    #[test]
    fn test_literal_fallback() {
        let cfg = Config::resolve_with(None, Some("   ".into()), None);
        assert_eq!(cfg.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(cfg.export_dir, PathBuf::from("."));
        assert_eq!(cfg.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
    }
}
