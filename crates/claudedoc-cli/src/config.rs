use claudedoc_devserver::{user_config_dir, ServerConfig};
use claudedoc_logging::LogFormat;
use claudedoc_site::{EscapeDepth, SiteConfig};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global config file name inside `~/.config/claude-code-doc/`
const GLOBAL_CONFIG_FILE: &str = "claudedoc.toml";

/// Local config looked up in the working directory (`claudedoc.toml`)
const LOCAL_CONFIG: &str = "claudedoc";

/// Convenience variables and the setting each one overrides
const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("CLAUDE_DIR", "site.source_root"),
    ("DOCS_SITE_DIR", "site.site_root"),
    ("DOCS_PREFIX", "site.docs_prefix"),
    ("SECTION_LABEL", "site.section_label"),
];

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WatchConfig {
    /// Quiet period before regenerating, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    5000
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replaces the local `./claudedoc.toml`
    pub config_file: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub site: Option<PathBuf>,
    pub prefix: Option<String>,
    pub label: Option<String>,
    pub escape: Option<EscapeDepth>,
    pub log_level: Option<String>,
}

impl Overrides {
    fn settings(&self) -> Vec<(&'static str, String)> {
        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());
        [
            ("site.source_root", path(&self.source)),
            ("site.site_root", path(&self.site)),
            ("site.docs_prefix", self.prefix.clone()),
            ("site.section_label", self.label.clone()),
            ("site.escape", self.escape.map(|e| e.to_string())),
            ("logging.level", self.log_level.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect()
    }
}

impl AppConfig {
    /// Load configuration with layered approach (later wins):
    /// 1. Global config: ~/.config/claude-code-doc/claudedoc.toml (optional)
    /// 2. Local override: ./claudedoc.toml, or the file given with `--config`
    /// 3. `CLAUDEDOC__SECTION__KEY` environment variables
    /// 4. Convenience variables such as `CLAUDE_DIR`
    /// 5. Command-line flags
    pub fn load(overrides: &Overrides) -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let global = user_config_dir().map(|dir| dir.join(GLOBAL_CONFIG_FILE));
        Self::build(global.as_deref(), overrides, |key| env::var(key).ok())
    }

    fn build(
        global: Option<&Path>,
        overrides: &Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = global {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = match &overrides.config_file {
            Some(path) => builder.add_source(config::File::from(path.as_path())),
            None => builder.add_source(config::File::with_name(LOCAL_CONFIG).required(false)),
        };

        builder = builder.add_source(config::Environment::with_prefix("CLAUDEDOC").separator("__"));

        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                builder = builder.set_override(key, value)?;
            }
        }

        for (key, value) in overrides.settings() {
            builder = builder.set_override(key, value)?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.site.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_any_source() {
        let temp = tempdir().unwrap();
        let overrides = Overrides {
            config_file: Some(temp.path().join("empty.toml")),
            ..Overrides::default()
        };
        fs::write(temp.path().join("empty.toml"), "").unwrap();

        let config = AppConfig::build(None, &overrides, no_env).unwrap();
        assert_eq!(config.site, SiteConfig::default());
        assert_eq!(config.watch.debounce(), Duration::from_secs(5));
        assert_eq!(config.server.port, 9987);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_layers_override_in_order() {
        let temp = tempdir().unwrap();
        let global = temp.path().join("global.toml");
        fs::write(
            &global,
            "[site]\ndocs_prefix = \"global\"\nsection_label = \"Global\"\n\n[watch]\ndebounce_ms = 100\n",
        )
        .unwrap();
        let local = temp.path().join("local.toml");
        fs::write(&local, "[site]\ndocs_prefix = \"local\"\n\n[logging]\nformat = \"json\"\n").unwrap();

        let env: HashMap<&str, &str> =
            HashMap::from([("DOCS_PREFIX", "env"), ("CLAUDE_DIR", "/data/claude")]);
        let lookup = |key: &str| env.get(key).map(ToString::to_string);

        let mut overrides = Overrides {
            config_file: Some(local),
            ..Overrides::default()
        };
        let config = AppConfig::build(Some(&global), &overrides, lookup).unwrap();
        assert_eq!(config.site.docs_prefix, "env");
        assert_eq!(config.site.section_label, "Global");
        assert_eq!(config.site.source_root, PathBuf::from("/data/claude"));
        assert_eq!(config.watch.debounce_ms, 100);
        assert_eq!(config.logging.format, LogFormat::Json);

        overrides.prefix = Some("cli".to_string());
        overrides.source = Some(PathBuf::from("/cli/claude"));
        let config = AppConfig::build(Some(&global), &overrides, lookup).unwrap();
        assert_eq!(config.site.docs_prefix, "cli");
        assert_eq!(config.site.source_root, PathBuf::from("/cli/claude"));
    }

    #[test]
    fn test_escape_is_validated() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("empty.toml"), "").unwrap();
        let overrides = Overrides {
            config_file: Some(temp.path().join("empty.toml")),
            escape: Some(EscapeDepth::Markup),
            ..Overrides::default()
        };
        let config = AppConfig::build(None, &overrides, no_env).unwrap();
        assert_eq!(config.site.escape, EscapeDepth::Markup);

        fs::write(temp.path().join("html.toml"), "[site]\nescape = \"html\"\n").unwrap();
        let overrides = Overrides {
            config_file: Some(temp.path().join("html.toml")),
            ..Overrides::default()
        };
        assert!(AppConfig::build(None, &overrides, no_env).is_err());
    }

    #[test]
    fn test_prefix_outside_docs_rejected() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("empty.toml"), "").unwrap();
        for prefix in ["", "..", "a/b"] {
            let overrides = Overrides {
                config_file: Some(temp.path().join("empty.toml")),
                prefix: Some(prefix.to_string()),
                ..Overrides::default()
            };
            let err = AppConfig::build(None, &overrides, no_env).unwrap_err();
            assert!(err.to_string().contains("docs prefix"), "{prefix:?}: {err}");
        }
    }

    #[test]
    fn test_missing_explicit_config_file_fails() {
        let temp = tempdir().unwrap();
        let overrides = Overrides {
            config_file: Some(temp.path().join("absent.toml")),
            ..Overrides::default()
        };
        assert!(AppConfig::build(None, &overrides, no_env).is_err());
    }
}
