//! Web output: a flat JSON object of strings and an `events`/`screens` JSON object.
//!
//! Both writers hold back the last rendered line so its trailing comma can be
//! decided once the next line (or the closing brace) is known.

use std::io::Write;

use super::{clean_text, replace_html_wrapper};
use crate::{
    error::Error,
    traits::{AnalyticsDialect, StringsDialect},
    types::{Record, RecordValue},
};

/// Applies the shared rules, drops `<html>` wrappers and renders the result
/// as a quoted JSON string.
pub fn escape_web(raw: &str) -> Result<String, Error> {
    let text = replace_html_wrapper(&clean_text(raw), "", "");
    Ok(serde_json::to_string(&text)?)
}

/// One JSON object's worth of `"key": value` lines.
#[derive(Debug, Default)]
struct PendingLines {
    pending: Option<String>,
}

impl PendingLines {
    fn push(&mut self, out: &mut dyn Write, line: String) -> Result<(), Error> {
        if let Some(previous) = self.pending.take() {
            writeln!(out, "{},", previous)?;
        }
        self.pending = Some(line);
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        if let Some(last) = self.pending.take() {
            writeln!(out, "{}", last)?;
        }
        Ok(())
    }
}

/// `strings.json` writer. Section headers have no JSON rendering and are dropped.
#[derive(Debug, Default)]
pub struct WebStrings {
    lines: PendingLines,
}

impl StringsDialect for WebStrings {
    fn write_header(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        writeln!(out, "{{")?;
        Ok(())
    }

    fn write_record(
        &mut self,
        out: &mut dyn Write,
        record: &Record,
        language: &str,
    ) -> Result<(), Error> {
        if let RecordValue::Translations(_) = record.value {
            let value = escape_web(record.translation(language).unwrap_or_default())?;
            self.lines.push(
                out,
                format!("    {}: {}", serde_json::to_string(&record.key)?, value),
            )?;
        }
        Ok(())
    }

    fn write_footer(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        self.lines.finish(out)?;
        writeln!(out, "}}")?;
        Ok(())
    }
}

/// `{ "events": {..}, "screens": {..} }` writer.
#[derive(Debug, Default)]
pub struct WebAnalytics {
    lines: PendingLines,
}

impl AnalyticsDialect for WebAnalytics {
    fn write_header(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        writeln!(out, "{{")?;
        writeln!(out, "    \"events\": {{")?;
        Ok(())
    }

    fn open_screens(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        self.lines.finish(out)?;
        writeln!(out, "    }},")?;
        writeln!(out)?;
        writeln!(out, "    \"screens\": {{")?;
        Ok(())
    }

    fn write_constant(&mut self, out: &mut dyn Write, key: &str, tag: &str) -> Result<(), Error> {
        let line = format!(
            "        {}: {}",
            serde_json::to_string(key)?,
            serde_json::to_string(tag)?
        );
        self.lines.push(out, line)
    }

    fn write_footer(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        self.lines.finish(out)?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        Ok(())
    }
}
