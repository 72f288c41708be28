//! Platform dialects for generated files.
//!
//! Each platform module provides a strings dialect and an analytics dialect.
//! This module picks the dialect once per output and drives it over the model;
//! it also holds the text rules every platform shares.

pub mod android;
pub mod apple;
pub mod web;

use std::{collections::BTreeSet, io::Write};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, warn};

pub use android::{AndroidAnalytics, AndroidStrings};
pub use apple::{AppleAnalytics, AppleStrings};
pub use web::{WebAnalytics, WebStrings};

use crate::{
    config::AnalyticsConfig,
    error::Error,
    traits::{AnalyticsDialect, StringsDialect},
    types::{Model, Platform, RecordValue},
};

/// Analytics type that forms the first section.
pub const EVENT_TYPE: &str = "Event";
/// Analytics type expected in the second section.
pub const SCREEN_TYPE: &str = "Screen";

lazy_static! {
    static ref HTML_OPEN_TAG: Regex = Regex::new(r"(?i)<html>").unwrap();
    static ref HTML_CLOSE_TAG: Regex = Regex::new(r"(?i)</html>").unwrap();
}

/// Rules applied to every translation before the platform rules: trim,
/// escape double quotes, `(c)` to `©`, drop line breaks.
pub fn normalize_text(raw: &str) -> String {
    clean_text(raw).replace('"', "\\\"")
}

/// [`normalize_text`] without the quote escaping, for writers that quote
/// through a serializer.
pub(crate) fn clean_text(raw: &str) -> String {
    raw.trim()
        .replace("(c)", "\u{00A9}")
        .replace(['\n', '\r'], "")
}

/// Returns true if `text` carries an `<html>` wrapper, in any case.
pub fn has_html_wrapper(text: &str) -> bool {
    HTML_OPEN_TAG.is_match(text)
}

/// Replaces the `<html>` and `</html>` wrapper tokens, in any case.
pub fn replace_html_wrapper(text: &str, open: &str, close: &str) -> String {
    let opened = HTML_OPEN_TAG.replace_all(text, regex::NoExpand(open));
    HTML_CLOSE_TAG
        .replace_all(&opened, regex::NoExpand(close))
        .into_owned()
}

/// Escapes a value for a double-quoted Kotlin or Swift string literal.
pub(crate) fn quote_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Builds `prefix = `, padding so that `=` lands at `align_column` (0-based) when it can.
pub(crate) fn align_declaration(prefix: &str, align_column: usize) -> String {
    if align_column > prefix.chars().count() {
        format!("{:<width$}= ", prefix, width = align_column)
    } else {
        format!("{} = ", prefix)
    }
}

/// Picks the strings dialect for a platform.
pub fn strings_dialect(platform: Platform) -> Box<dyn StringsDialect> {
    match platform {
        Platform::Android => Box::new(AndroidStrings),
        Platform::Ios => Box::new(AppleStrings),
        Platform::Web => Box::new(WebStrings::default()),
    }
}

/// Picks the analytics dialect described by `config`.
pub fn analytics_dialect(config: &AnalyticsConfig) -> Box<dyn AnalyticsDialect> {
    match config.platform {
        Platform::Android => Box::new(AndroidAnalytics::new(
            config.package_name.clone(),
            config.tags_align_column,
        )),
        Platform::Ios => Box::new(AppleAnalytics::new(config.tags_align_column)),
        Platform::Web => Box::new(WebAnalytics::default()),
    }
}

/// Writes the `language` column of `model` in the `platform` strings format.
///
/// A record that fails to render is logged and skipped; header and footer
/// failures are returned.
pub fn write_strings<W: Write>(
    model: &Model,
    platform: Platform,
    language: &str,
    out: W,
) -> Result<(), Error> {
    render_strings(strings_dialect(platform).as_mut(), model, language, out)
}

fn render_strings<W: Write>(
    dialect: &mut dyn StringsDialect,
    model: &Model,
    language: &str,
    mut out: W,
) -> Result<(), Error> {
    dialect.write_header(&mut out)?;
    for record in model.iter() {
        if let Err(e) = dialect.write_record(&mut out, record, language) {
            error!(source = %record.origin.source, line = record.origin.line, error = %e, "failed to write record");
        }
    }
    dialect.write_footer(&mut out)?;

    out.flush()?;
    Ok(())
}

fn is_event(kind: &str) -> bool {
    kind.eq_ignore_ascii_case(EVENT_TYPE)
}

/// Writes the analytics constants of `model` in the format `config` asks for.
///
/// Only analytics records are written. Events come first, then every other
/// type in one screens section, each group ordered by type.
pub fn write_analytics<W: Write>(
    model: &Model,
    config: &AnalyticsConfig,
    out: W,
) -> Result<(), Error> {
    render_analytics(analytics_dialect(config).as_mut(), model, out)
}

fn render_analytics<W: Write>(
    dialect: &mut dyn AnalyticsDialect,
    model: &Model,
    mut out: W,
) -> Result<(), Error> {
    let mut entries: Vec<_> = model
        .iter()
        .filter_map(|record| match &record.value {
            RecordValue::Analytics { kind, tag } => Some((record, kind.as_str(), tag.as_str())),
            _ => None,
        })
        .collect();
    entries.sort_by(|a, b| (!is_event(a.1), a.1).cmp(&(!is_event(b.1), b.1)));

    let unexpected: BTreeSet<&str> = entries
        .iter()
        .map(|(_, kind, _)| *kind)
        .filter(|kind| !is_event(kind) && !kind.eq_ignore_ascii_case(SCREEN_TYPE))
        .collect();
    for kind in unexpected {
        warn!(kind, "unexpected analytics type, writing it with the screens");
    }

    dialect.write_header(&mut out)?;

    let mut in_events = true;
    for (record, kind, tag) in entries {
        let event = is_event(kind);
        if in_events && !event {
            dialect.open_screens(&mut out)?;
        }
        if let Err(e) = dialect.write_constant(&mut out, &record.key, tag) {
            error!(source = %record.origin.source, line = record.origin.line, error = %e, "failed to write analytics constant");
        }
        in_events = event;
    }

    dialect.write_footer(&mut out)?;
    out.flush()?;
    Ok(())
}
