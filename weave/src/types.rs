//! Core, platform-agnostic types for weave.
//! The ingestor decodes spreadsheet rows into these; the dialect writers
//! serialize them.

use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Key prefix that marks a row as a section header rather than an entry.
pub const HEADER_TOKEN: &str = "###";

/// The three output dialects weave knows how to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Android, Platform::Ios, Platform::Web];

    /// Returns true if `platforms` (the raw cell of a `platforms` column) targets this platform.
    ///
    /// The cell is a comma-separated, case-insensitive list. A blank or absent
    /// cell targets every platform.
    pub fn is_targeted_by(&self, platforms: Option<&str>) -> bool {
        let Some(cell) = platforms else {
            return true;
        };
        let names: Vec<String> = cell
            .split(',')
            .map(|name| name.trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        names.is_empty() || names.iter().any(|name| name == self.as_lowercase())
    }

    fn as_lowercase(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Web => "web",
        }
    }
}

/// Renders the canonical spelling used in config files: `Android`, `iOS`, `Web`.
impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Android => write!(f, "Android"),
            Platform::Ios => write!(f, "iOS"),
            Platform::Web => write!(f, "Web"),
        }
    }
}

/// Accepts `android`, `ios` and `web` in any case, surrounding whitespace ignored.
///
/// # Example
/// ```rust
/// use weave::Platform;
/// use std::str::FromStr;
/// assert_eq!(Platform::from_str("iOS").unwrap(), Platform::Ios);
/// assert_eq!(Platform::from_str(" WEB ").unwrap(), Platform::Web);
/// assert!(Platform::from_str("windows").is_err());
/// ```
impl FromStr for Platform {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "web" => Ok(Platform::Web),
            _ => Err(Error::UnknownPlatform(s.to_string())),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.to_string()
    }
}

/// Where a record came from: the source title and its 1-based line (the header is line 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub source: String,
    pub line: usize,
}

impl Origin {
    pub fn new(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {} from {}", self.line, self.source)
    }
}

/// One row of the normalized model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The row key. For headers this is the section title with the `###` token removed.
    pub key: String,
    pub origin: Origin,
    pub value: RecordValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    /// A section title, rendered as a comment.
    Header,

    /// Language id → raw translated text. Languages whose cell was empty are absent.
    Translations(HashMap<String, String>),

    /// An analytics constant.
    Analytics { kind: String, tag: String },
}

impl Record {
    pub fn header(title: impl Into<String>, origin: Origin) -> Self {
        Record {
            key: title.into(),
            origin,
            value: RecordValue::Header,
        }
    }

    pub fn translations(
        key: impl Into<String>,
        origin: Origin,
        translations: HashMap<String, String>,
    ) -> Self {
        Record {
            key: key.into(),
            origin,
            value: RecordValue::Translations(translations),
        }
    }

    pub fn analytics(
        key: impl Into<String>,
        origin: Origin,
        kind: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Record {
            key: key.into(),
            origin,
            value: RecordValue::Analytics {
                kind: kind.into(),
                tag: tag.into(),
            },
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self.value, RecordValue::Header)
    }

    /// Returns the raw translation for `language`, if the row had one.
    pub fn translation(&self, language: &str) -> Option<&str> {
        match &self.value {
            RecordValue::Translations(map) => map.get(language).map(String::as_str),
            _ => None,
        }
    }
}

/// The ordered set of records for one pipeline run.
///
/// A fresh model is built for every pipeline; nothing is shared between the
/// strings and analytics runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub records: Vec<Record>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    #[cfg(test)]
    pub(crate) fn find(&self, key: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|record| !record.is_header() && record.key == key)
    }
}
