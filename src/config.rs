use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{store::NameLimits, transport::Endpoint, Result, TableError};

pub const DEFAULT_URL: &str = "ws://localhost:8000";
pub const DEFAULT_TOPIC: &str = "Scratch/TinyRest/Mix/REST";
pub const DEFAULT_SEED: [&str; 3] = ["Jacoby", "Andrew", "Miklos"];

/// Prefix of requests sent by the UI.
pub const SOLICIT_PREFIX: &str = "API/";
/// Prefix of the operations the service implements.
pub const IMPL_PREFIX: &str = "Impl/";

/// Service configuration.
///
/// Read from a TOML file; every field is optional and falls back to the
/// demo defaults:
/// ```toml
/// url = "ws://localhost:8000"
/// topic = "Scratch/TinyRest/Mix/REST"
/// seed = ["Jacoby", "Andrew", "Miklos"]
/// solicit_prefix = "API/"
/// impl_prefix = "Impl/"
///
/// [limits]
/// min = 3
/// max = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub url: String,
    pub topic: String,
    pub seed: Vec<String>,
    pub limits: NameLimits,
    pub solicit_prefix: String,
    pub impl_prefix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            url: DEFAULT_URL.to_owned(),
            topic: DEFAULT_TOPIC.to_owned(),
            seed: DEFAULT_SEED.iter().map(|name| name.to_string()).collect(),
            limits: NameLimits::default(),
            solicit_prefix: SOLICIT_PREFIX.to_owned(),
            impl_prefix: IMPL_PREFIX.to_owned(),
        }
    }
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ServiceConfig = toml::from_str(&content)?;
        config.validate()?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.min == 0 {
            return Err(TableError::Config(
                "minimum name length must be positive".to_owned(),
            ));
        }
        if self.limits.min > self.limits.max {
            return Err(TableError::Config(format!(
                "minimum name length {} exceeds maximum {}",
                self.limits.min, self.limits.max
            )));
        }
        if self.solicit_prefix.is_empty() || self.impl_prefix.is_empty() {
            return Err(TableError::Config(
                "operation prefixes must not be empty".to_owned(),
            ));
        }
        if self.solicit_prefix == self.impl_prefix {
            return Err(TableError::Config(
                "solicit and implementation prefixes must differ".to_owned(),
            ));
        }
        Url::parse(&self.url)?;
        Ok(())
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint {
            url: Url::parse(&self.url)?,
            topic: self.topic.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("tinytable.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn default_matches_demo() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.seed, vec!["Jacoby", "Andrew", "Miklos"]);
        assert_eq!(config.endpoint().unwrap().topic, DEFAULT_TOPIC);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = TempDir::new("tinytable").unwrap();
        let path = write_config(
            &dir,
            r#"
url = "ws://example.org:9000"
seed = []

[limits]
max = 8
"#,
        );

        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.url, "ws://example.org:9000");
        assert_eq!(config.topic, DEFAULT_TOPIC);
        assert!(config.seed.is_empty());
        assert_eq!(config.limits, NameLimits { min: 3, max: 8 });
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let dir = TempDir::new("tinytable").unwrap();
        let path = write_config(&dir, "[limits]\nmin = 10\nmax = 4\n");
        assert!(matches!(
            ServiceConfig::load(&path),
            Err(TableError::Config(_))
        ));
    }

    #[test]
    fn bad_url_is_rejected() {
        let config = ServiceConfig {
            url: "not a url".to_owned(),
            ..ServiceConfig::default()
        };
        assert!(matches!(config.validate(), Err(TableError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = TempDir::new("tinytable").unwrap();
        let path = write_config(&dir, "seed = [1, 2");
        assert!(matches!(
            ServiceConfig::load(&path),
            Err(TableError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new("tinytable").unwrap();
        let result = ServiceConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(TableError::Io(_))));
    }
}
