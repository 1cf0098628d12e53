//! Layered configuration.
//!
//! Sources, lowest precedence first:
//! 1. builtin defaults,
//! 2. `reader.toml` in the user's configuration directory, or the file given
//!    explicitly (TOML, YAML or JSON, by extension),
//! 3. `READER_*` environment variables, with `__` separating nested keys
//!    (`READER_EXTRACTOR__KIND=meta`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use reader_slug::{Alphabet, Shortener};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "reader.toml";
pub const DATABASE_FILE_NAME: &str = "reader.sqlite";
pub const ENV_PREFIX: &str = "READER_";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/110.0";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file.
    pub database: PathBuf,
    /// Alphabet for short IDs. Changing it changes every short ID handed out
    /// so far.
    pub slug_encoding: String,
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Mozilla Readability, run by node.js.
    #[default]
    Process,
    /// Native extraction from page metadata.
    Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub kind: ExtractorKind,
    /// node.js executable; searched for on the `PATH` when unset.
    pub node: Option<PathBuf>,
    /// Readability script; the builtin one when unset.
    pub script: Option<PathBuf>,
    /// `NODE_PATH` for the script's npm packages.
    pub node_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: project_dirs()
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
                .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME)),
            slug_encoding: reader_slug::DEFAULT_ALPHABET.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            extractor: ExtractorConfig::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "reader")
}

/// Location of the configuration file used when none is given explicitly.
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load, merge and validate every configuration source.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path)?.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        tracing::debug!(database = %config.database.display(), extractor = ?config.extractor.kind, "Configuration loaded");
        Ok(config)
    }

    /// The merged sources, before extraction.
    ///
    /// An explicit `path` must exist; the default configuration file is
    /// optional.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::FileNotFound(path.to_path_buf()));
                }
                let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
                match extension.to_ascii_lowercase().as_str() {
                    "toml" => figment.merge(Toml::file(path)),
                    "yaml" | "yml" => figment.merge(Yaml::file(path)),
                    "json" => figment.merge(Json::file(path)),
                    other => exn::bail!(ErrorKind::UnsupportedFormat(other.to_string())),
                }
            },
            None => match default_config_file() {
                Some(file) => figment.merge(Toml::file(file)),
                None => figment,
            },
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        Alphabet::new(&self.slug_encoding).or_raise(|| ErrorKind::InvalidValue("slug_encoding"))?;
        if self.user_agent.trim().is_empty() {
            exn::bail!(ErrorKind::InvalidValue("user_agent"));
        }
        if self.fetch_timeout_secs == 0 {
            exn::bail!(ErrorKind::InvalidValue("fetch_timeout_secs"));
        }
        Ok(())
    }

    pub fn shortener(&self) -> Result<Shortener> {
        let alphabet = Alphabet::new(&self.slug_encoding).or_raise(|| ErrorKind::InvalidValue("slug_encoding"))?;
        Ok(Shortener::new(alphabet))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    fn load(jail: &Jail, file: Option<&str>) -> Result<Config> {
        Config::load(file.map(|name| jail.directory().join(name)).as_deref())
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.extractor.kind, ExtractorKind::Process);
        assert_eq!(config.shortener().unwrap(), Shortener::default());
        assert!(config.database.ends_with(DATABASE_FILE_NAME));
    }

    #[rstest]
    #[case("reader.toml", "user_agent = \"test-agent\"\n[extractor]\nkind = \"meta\"\n")]
    #[case("reader.yaml", "user_agent: test-agent\nextractor:\n  kind: meta\n")]
    #[case("reader.json", r#"{"user_agent": "test-agent", "extractor": {"kind": "meta"}}"#)]
    fn test_explicit_file_formats(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let config = load(jail, Some(name)).unwrap();
            assert_eq!(config.user_agent, "test-agent");
            assert_eq!(config.extractor.kind, ExtractorKind::Meta);
            assert_eq!(config.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("reader.toml", "fetch_timeout_secs = 5\ndatabase = \"from-file.sqlite\"\n")?;
            jail.set_env("READER_DATABASE", "from-env.sqlite");
            jail.set_env("READER_EXTRACTOR__NODE", "/usr/local/bin/node");
            let config = load(jail, Some("reader.toml")).unwrap();
            assert_eq!(config.database, PathBuf::from("from-env.sqlite"));
            assert_eq!(config.fetch_timeout_secs, 5);
            assert_eq!(config.extractor.node, Some(PathBuf::from("/usr/local/bin/node")));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|jail| {
            let err = load(jail, Some("absent.toml")).unwrap_err();
            assert_eq!(&*err, &ErrorKind::FileNotFound(jail.directory().join("absent.toml")));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_format() {
        Jail::expect_with(|jail| {
            jail.create_file("reader.ini", "user_agent=x")?;
            let err = load(jail, Some("reader.ini")).unwrap_err();
            assert_eq!(&*err, &ErrorKind::UnsupportedFormat("ini".to_string()));
            Ok(())
        });
    }

    #[rstest]
    #[case("slug_encoding = \"aa\"", "slug_encoding")]
    #[case("slug_encoding = \"a\"", "slug_encoding")]
    #[case("user_agent = \"  \"", "user_agent")]
    #[case("fetch_timeout_secs = 0", "fetch_timeout_secs")]
    fn test_validation(#[case] contents: &str, #[case] field: &'static str) {
        Jail::expect_with(|jail| {
            jail.create_file("reader.toml", contents)?;
            let err = load(jail, Some("reader.toml")).unwrap_err();
            assert_eq!(&*err, &ErrorKind::InvalidValue(field));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_values_are_invalid() {
        Jail::expect_with(|jail| {
            jail.create_file("reader.toml", "[extractor]\nkind = \"telepathy\"\n")?;
            let err = load(jail, Some("reader.toml")).unwrap_err();
            assert_eq!(&*err, &ErrorKind::Invalid);
            Ok(())
        });
    }

    #[test]
    fn test_custom_alphabet_shortener() {
        let config = Config { slug_encoding: "01".to_string(), ..Config::default() };
        assert_eq!(config.shortener().unwrap().encode(5), "101");
    }
}
