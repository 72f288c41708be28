//! iOS output: `Localizable.strings` and a Swift `class` of analytics enums.

use std::io::Write;

use indoc::indoc;

use super::{align_declaration, normalize_text, quote_literal, replace_html_wrapper};
use crate::{
    error::Error,
    traits::{AnalyticsDialect, StringsDialect},
    types::{Record, RecordValue},
};

/// Applies the shared rules, swaps `%s`/`$s` for `%@`/`$@` and drops `<html>` wrappers.
///
/// Backslashes are doubled first so the quote escaping stays unambiguous.
pub fn escape_apple(raw: &str) -> String {
    let text = normalize_text(&raw.replace('\\', "\\\\"))
        .replace("%s", "%@")
        .replace("$s", "$@");
    replace_html_wrapper(&text, "", "")
}

/// `.strings` writer.
pub struct AppleStrings;

impl StringsDialect for AppleStrings {
    fn write_header(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        out.write_all(
            indoc! {"
            // This file is automatically generated by weave.
            // Do not edit it manually, as your changes will be overwritten.
            "}
            .as_bytes(),
        )?;
        Ok(())
    }

    fn write_record(
        &mut self,
        out: &mut dyn Write,
        record: &Record,
        language: &str,
    ) -> Result<(), Error> {
        match &record.value {
            RecordValue::Header => {
                writeln!(out)?;
                writeln!(out, "/* {} */", record.key)?;
            }
            RecordValue::Translations(_) => {
                let raw = record.translation(language).unwrap_or_default();
                if raw.trim().is_empty() {
                    return Ok(());
                }
                writeln!(out, "\"{}\" = \"{}\";", record.key, escape_apple(raw))?;
            }
            RecordValue::Analytics { .. } => {}
        }
        Ok(())
    }

    fn write_footer(&mut self, _out: &mut dyn Write) -> Result<(), Error> {
        Ok(())
    }
}

/// Swift `class GA { enum Event { .. } enum Screen { .. } }` writer.
pub struct AppleAnalytics {
    align_column: usize,
}

impl AppleAnalytics {
    pub fn new(align_column: usize) -> Self {
        Self { align_column }
    }
}

impl AnalyticsDialect for AppleAnalytics {
    fn write_header(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        writeln!(out, "class GA {{")?;
        writeln!(out, "    enum Event {{")?;
        Ok(())
    }

    fn open_screens(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        writeln!(out, "    }}")?;
        writeln!(out)?;
        writeln!(out, "    enum Screen {{")?;
        Ok(())
    }

    fn write_constant(&mut self, out: &mut dyn Write, key: &str, tag: &str) -> Result<(), Error> {
        let prefix = format!("        static let {}", key.to_uppercase());
        writeln!(
            out,
            "{}\"{}\"",
            align_declaration(&prefix, self.align_column),
            quote_literal(tag)
        )?;
        Ok(())
    }

    fn write_footer(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        Ok(())
    }
}
