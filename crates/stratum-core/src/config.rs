use crate::{codec::CodecOptions, Result};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TABLE_PREFIX: &str = "a7";
pub const DEFAULT_ARCHIVE_NAME: &str = "stratum.zip";

/// Top-level configuration, usually read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub database: Option<DatabaseConfig>,
    pub file: Option<FileConfig>,
    pub codec: CodecConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    pub url: String,
    pub table_prefix: String,
    pub max_connections: Option<usize>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: String::new(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            max_connections: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileConfig {
    pub base_path: PathBuf,

    /// Store records inside one zip archive instead of loose files.
    pub archive: bool,
    pub archive_name: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        FileConfig {
            base_path: PathBuf::from("."),
            archive: false,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodecConfig {
    pub foreign_keys: bool,
    pub condense_self: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            foreign_keys: true,
            condense_self: true,
        }
    }
}

impl From<&CodecConfig> for CodecOptions {
    fn from(config: &CodecConfig) -> Self {
        CodecOptions {
            foreign_keys: config.foreign_keys,
            condense_self: config.condense_self,
            ..CodecOptions::default()
        }
    }
}

impl Config {
    pub fn from_json(contents: &str) -> Result<Config> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let contents = std::fs::read_to_string(path)?;
        Config::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.codec.foreign_keys);
    }

    #[test]
    fn sections_fill_missing_keys() {
        let config = Config::from_json(
            r#"{
                "database": { "url": "sqlite::memory:" },
                "file": { "basePath": "/tmp/store", "archive": true },
                "codec": { "condenseSelf": false }
            }"#,
        )
        .unwrap();

        let database = config.database.unwrap();
        assert_eq!(database.url, "sqlite::memory:");
        assert_eq!(database.table_prefix, DEFAULT_TABLE_PREFIX);

        let file = config.file.unwrap();
        assert!(file.archive);
        assert_eq!(file.archive_name, DEFAULT_ARCHIVE_NAME);

        assert!(config.codec.foreign_keys);
        assert!(!config.codec.condense_self);
    }

    #[test]
    fn malformed_document_is_a_serialization_error() {
        let err = Config::from_json("{ nope").unwrap_err();
        assert!(err.is_serialization());
    }
}
