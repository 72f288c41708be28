//! Android output: `strings.xml` resources and a Kotlin `object` of analytics constants.

use std::io::Write;

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use super::{align_declaration, has_html_wrapper, normalize_text, quote_literal, replace_html_wrapper};
use crate::{
    error::Error,
    traits::{AnalyticsDialect, StringsDialect},
    types::{Record, RecordValue},
};

/// Applies the shared rules and then the Android resource escaping.
///
/// Text wrapped in `<html>` becomes a CDATA section with its markup kept;
/// anything else has its angle brackets escaped.
pub fn escape_android(raw: &str) -> String {
    let text = normalize_text(raw)
        .replace('&', "&amp;")
        .replace('\'', "\\'")
        .replace('@', "\\@")
        .replace("...", "&#8230;")
        .replace('-', "\u{2013}");

    if has_html_wrapper(&text) {
        replace_html_wrapper(&text, "<![CDATA[", "]]>")
    } else {
        text.replace('>', "&gt;").replace('<', "&lt;")
    }
}

/// `res/values*/strings.xml` writer.
pub struct AndroidStrings;

impl StringsDialect for AndroidStrings {
    fn write_header(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        let mut xml_writer = Writer::new(out);
        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        xml_writer.write_event(Event::Start(BytesStart::new("resources")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        Ok(())
    }

    fn write_record(
        &mut self,
        out: &mut dyn Write,
        record: &Record,
        language: &str,
    ) -> Result<(), Error> {
        let mut xml_writer = Writer::new(out);
        match &record.value {
            RecordValue::Header => {
                xml_writer.write_event(Event::Text(BytesText::new("\n    ")))?;
                // `--` may not appear inside an XML comment.
                let title = record.key.replace("--", "\u{2013}");
                xml_writer.write_event(Event::Comment(BytesText::from_escaped(format!(
                    " {} ",
                    title
                ))))?;
                xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
            }
            RecordValue::Translations(_) => {
                let raw = record.translation(language).unwrap_or_default();
                if raw.trim().is_empty() {
                    return Ok(());
                }

                let mut elem = BytesStart::new("string");
                elem.push_attribute(("name", record.key.as_str()));

                xml_writer.write_event(Event::Text(BytesText::new("    ")))?;
                xml_writer.write_event(Event::Start(elem))?;
                xml_writer.write_event(Event::Text(BytesText::from_escaped(escape_android(raw))))?;
                xml_writer.write_event(Event::End(BytesEnd::new("string")))?;
                xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
            }
            RecordValue::Analytics { .. } => {}
        }
        Ok(())
    }

    fn write_footer(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        let mut xml_writer = Writer::new(out);
        xml_writer.write_event(Event::End(BytesEnd::new("resources")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        Ok(())
    }
}

/// Kotlin `object GA { object Event { .. } object Screen { .. } }` writer.
pub struct AndroidAnalytics {
    package_name: Option<String>,
    align_column: usize,
}

impl AndroidAnalytics {
    pub fn new(package_name: Option<String>, align_column: usize) -> Self {
        Self {
            package_name,
            align_column,
        }
    }
}

impl AnalyticsDialect for AndroidAnalytics {
    fn write_header(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        if let Some(package) = self.package_name.as_deref().filter(|p| !p.trim().is_empty()) {
            writeln!(out, "package {}", package.trim())?;
            writeln!(out)?;
        }
        writeln!(out, "object GA {{")?;
        writeln!(out)?;
        writeln!(out, "    object Event {{")?;
        Ok(())
    }

    fn open_screens(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        writeln!(out, "    }}")?;
        writeln!(out)?;
        writeln!(out, "    object Screen {{")?;
        Ok(())
    }

    fn write_constant(&mut self, out: &mut dyn Write, key: &str, tag: &str) -> Result<(), Error> {
        let prefix = format!("        const val {}", key.to_uppercase());
        // Kotlin string templates start with `$`.
        let tag = quote_literal(tag).replace('$', "\\$");
        writeln!(
            out,
            "{}\"{}\"",
            align_declaration(&prefix, self.align_column),
            tag
        )?;
        Ok(())
    }

    fn write_footer(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        Ok(())
    }
}
