//! The JSON config descriptor read once at startup.
//!
//! A config holds at most one strings pipeline and at most one analytics
//! pipeline. Both are optional; a missing section is only worth a warning.
//!
//! ```json
//! {
//!   "strings": {
//!     "platform": "Android",
//!     "sources": [{ "url": "https://example.com/export.csv", "title": "Main" }],
//!     "languages": [{ "id": "en", "path": "values/strings.xml" }]
//!   },
//!   "analytics": {
//!     "platform": "iOS",
//!     "sources": [{ "url": "https://example.com/analytics.csv", "title": "Analytics" }],
//!     "path": "GA.swift",
//!     "typeColumnName": "type",
//!     "tagColumnName": "tag"
//!   }
//! }
//! ```

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::warn;
use unic_langid::LanguageIdentifier;

use crate::{error::Error, types::Platform};

/// Default config file name, looked up in the working directory and then its parent.
pub const DEFAULT_CONFIG_FILE: &str = "weave-config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strings: Option<StringsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<AnalyticsConfig>,
}

/// One remote spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    pub url: String,
    pub title: String,
}

/// One output locale: the spreadsheet column id and the file it is written to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Language {
    pub id: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringsConfig {
    pub platform: Platform,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsConfig {
    pub platform: Platform,
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Output file for the generated constants.
    pub path: PathBuf,
    /// Package declaration emitted at the top of the Android file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    pub type_column_name: String,
    pub tag_column_name: String,
    /// Column the `=` of each constant is padded to. 0 leaves declarations unaligned.
    #[serde(default)]
    pub tags_align_column: usize,
}

impl Config {
    /// Reads a config from an explicit path.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::config_error(format!("cannot open {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Reads the config from `file_name`, looking in `dir` first and then in its parent.
    pub fn discover_in<P: AsRef<Path>>(dir: P, file_name: &str) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let candidates = std::iter::once(dir.join(file_name))
            .chain(dir.parent().map(|parent| parent.join(file_name)));
        for candidate in candidates {
            if candidate.is_file() {
                return Self::read_from(candidate);
            }
        }
        Err(Error::config_error(format!(
            "Config file {} not found in current or parent directory",
            file_name
        )))
    }

    /// Reads the default config file relative to the working directory.
    pub fn discover() -> Result<Self, Error> {
        let cwd = std::env::current_dir()?;
        Self::discover_in(cwd, DEFAULT_CONFIG_FILE)
    }
}

impl StringsConfig {
    /// Checks the settings that must hold before any source is fetched.
    pub fn verify(&self) -> Result<(), Error> {
        if self.languages.is_empty() {
            return Err(Error::config_error("You need to add at least one language"));
        }
        for language in &self.languages {
            if language.id.trim().is_empty() {
                return Err(Error::config_error("Language ids cannot be empty"));
            }
            if language.id.parse::<LanguageIdentifier>().is_err() {
                warn!(language = %language.id, "language id is not a BCP 47 identifier");
            }
        }
        if self.sources.is_empty() {
            warn!("No sources configured for strings");
        }
        Ok(())
    }
}

impl AnalyticsConfig {
    /// Checks the settings that must hold before any source is fetched.
    pub fn verify(&self) -> Result<(), Error> {
        if self.type_column_name.trim().is_empty() {
            return Err(Error::config_error("typeColumnName cannot be empty"));
        }
        if self.tag_column_name.trim().is_empty() {
            return Err(Error::config_error("tagColumnName cannot be empty"));
        }
        if self.path.as_os_str().is_empty() {
            return Err(Error::config_error("Analytics output path cannot be empty"));
        }
        if self.sources.is_empty() {
            warn!("No sources configured for analytics");
        }
        Ok(())
    }
}
