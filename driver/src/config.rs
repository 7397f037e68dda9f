use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DriverError, DriverResult};

pub const DEFAULT_CONFIG_PATH: &str = "abbot.toml";

/// Where a finished report goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportTarget {
    #[default]
    Stdout,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Txt,
}

/// Report output settings (`[report]` table).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    #[serde(rename = "type")]
    pub target: ReportTarget,
    pub format: ReportFormat,
    /// Output file, required when `type = "file"`
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
}

impl Config {
    /// Load config from TOML file, with environment variable overrides.
    /// Falls back to defaults if the file is not found. `ABBOT_CONFIG`
    /// replaces the default path; an explicit path wins over both.
    pub fn load(explicit: Option<&Path>) -> DriverResult<Self> {
        ConfigLoader::from_env().load(explicit)
    }

    pub fn from_toml(s: &str) -> DriverResult<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Resolves configuration from a file and environment variables.
struct ConfigLoader<F> {
    var: F,
}

impl ConfigLoader<fn(&str) -> Option<String>> {
    fn from_env() -> Self {
        Self {
            var: |name| env::var(name).ok(),
        }
    }
}

impl<F> ConfigLoader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn load(&self, explicit: Option<&Path>) -> DriverResult<Config> {
        let cfg_path = self.resolve_config_path(explicit);

        let mut cfg = match fs::read_to_string(&cfg_path) {
            Ok(s) => {
                debug!(path = %cfg_path.display(), "loaded config");
                Config::from_toml(&s)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %cfg_path.display(), "no config file, using defaults");
                Config::default()
            }
            Err(e) => return Err(DriverError::io(cfg_path, e)),
        };
        self.apply_env_overrides(&mut cfg)?;
        Ok(cfg)
    }

    fn resolve_config_path(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(p) => p.to_path_buf(),
            None => (self.var)("ABBOT_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        }
    }

    /// Apply ABBOT_REPORT_* environment variable overrides.
    fn apply_env_overrides(&self, cfg: &mut Config) -> DriverResult<()> {
        if let Some(v) = (self.var)("ABBOT_REPORT_TYPE") {
            cfg.report.target = parse_value("ABBOT_REPORT_TYPE", &v)?;
        }
        if let Some(v) = (self.var)("ABBOT_REPORT_FORMAT") {
            cfg.report.format = parse_value("ABBOT_REPORT_FORMAT", &v)?;
        }
        if let Some(v) = (self.var)("ABBOT_REPORT_PATH")
            && !v.is_empty()
        {
            cfg.report.path = Some(PathBuf::from(v));
        }
        Ok(())
    }
}

fn parse_value<T: ValueEnum>(name: &str, value: &str) -> DriverResult<T> {
    T::from_str(value, true)
        .map_err(|_| DriverError::Config(format!("invalid value '{value}' for {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn loader(vars: &[(&str, &str)]) -> ConfigLoader<impl Fn(&str) -> Option<String>> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigLoader {
            var: move |name: &str| vars.get(name).cloned(),
        }
    }

    #[test]
    fn parses_report_table() {
        let cfg = Config::from_toml(
            r#"
            [report]
            type = "file"
            format = "txt"
            path = "out/report.txt"
            "#,
        )
        .unwrap();

        assert_eq!(
            cfg.report,
            ReportConfig {
                target: ReportTarget::File,
                format: ReportFormat::Txt,
                path: Some(PathBuf::from("out/report.txt")),
            }
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = loader(&[])
            .load(Some(&dir.path().join("absent.toml")))
            .unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn env_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abbot.toml");
        fs::write(&path, "[report]\ntype = \"stdout\"\nformat = \"json\"\n").unwrap();

        let cfg = loader(&[
            ("ABBOT_REPORT_TYPE", "FILE"),
            ("ABBOT_REPORT_PATH", "/tmp/r.json"),
        ])
        .load(Some(&path))
        .unwrap();

        assert_eq!(cfg.report.target, ReportTarget::File);
        assert_eq!(cfg.report.format, ReportFormat::Json);
        assert_eq!(cfg.report.path, Some(PathBuf::from("/tmp/r.json")));
    }

    #[test]
    fn config_path_from_env() {
        let l = loader(&[("ABBOT_CONFIG", "/etc/abbot.toml")]);
        assert_eq!(l.resolve_config_path(None), PathBuf::from("/etc/abbot.toml"));
        assert_eq!(
            l.resolve_config_path(Some(Path::new("local.toml"))),
            PathBuf::from("local.toml")
        );
        assert_eq!(
            loader(&[]).resolve_config_path(None),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
    }

    #[test]
    fn invalid_env_value_is_a_config_error() {
        let err = loader(&[("ABBOT_REPORT_FORMAT", "yaml")])
            .apply_env_overrides(&mut Config::default())
            .unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
