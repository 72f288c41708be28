//! Turns CSV sources into model records.
//!
//! Each source is read strictly in order: header resolution first, then every
//! data row with a running line counter (the header is line 1). Rows that
//! cannot be used are logged and skipped; only unresolvable headers are fatal.

use std::{collections::HashMap, io::Read};

use csv::StringRecord;
use encoding_rs::UTF_8;
use encoding_rs_io::DecodeReaderBytesBuilder;
use tracing::{info, warn};

use crate::{
    classify::{Columns, RowIntent, cell, resolve_analytics_columns, resolve_string_columns},
    config::{AnalyticsConfig, Source, StringsConfig},
    error::Error,
    traits::Fetch,
    types::{Model, Origin, Platform, Record},
};

/// Fetches and parses every strings source, in configuration order.
pub fn ingest_strings(fetcher: &dyn Fetch, config: &StringsConfig) -> Result<Model, Error> {
    let mut model = Model::new();
    for source in &config.sources {
        let records = ingest_source(fetcher, source, |reader| {
            parse_strings(reader, &source.title, config)
        })?;
        model.extend(records);
    }
    Ok(model)
}

/// Fetches and parses every analytics source, in configuration order.
pub fn ingest_analytics(fetcher: &dyn Fetch, config: &AnalyticsConfig) -> Result<Model, Error> {
    let mut model = Model::new();
    for source in &config.sources {
        let records = ingest_source(fetcher, source, |reader| {
            parse_analytics(reader, &source.title, config)
        })?;
        model.extend(records);
    }
    Ok(model)
}

/// Runs `parse` over one fetched source.
///
/// Transport failures and malformed CSV only drop this source's records;
/// every other error is returned.
fn ingest_source(
    fetcher: &dyn Fetch,
    source: &Source,
    parse: impl FnOnce(Box<dyn Read>) -> Result<Vec<Record>, Error>,
) -> Result<Vec<Record>, Error> {
    let reader = match fetcher.fetch(&source.url) {
        Ok(reader) => reader,
        Err(e) => {
            warn!(source = %source.title, url = %source.url, error = %e, "could not fetch source, skipping it");
            return Ok(Vec::new());
        }
    };

    match parse(reader) {
        Ok(records) => {
            info!(source = %source.title, records = records.len(), "source parsed");
            Ok(records)
        }
        Err(Error::CsvParse(e)) => {
            warn!(source = %source.title, error = %e, "malformed CSV, skipping source");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<impl Read> {
    // A BOM picks the encoding; otherwise UTF-8 with invalid bytes replaced by U+FFFD.
    let decoded = DecodeReaderBytesBuilder::new()
        .encoding(Some(UTF_8))
        .bom_override(true)
        .strip_bom(true)
        .build(reader);
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(decoded)
}

/// Walks the data rows of `rdr`, handing each keyed, platform-matching row to `on_row`.
fn parse_rows<R: Read>(
    rdr: &mut csv::Reader<R>,
    source_title: &str,
    columns: Columns,
    platform: Platform,
    mut on_row: impl FnMut(Origin, &str, &StringRecord) -> Option<Record>,
) -> Result<Vec<Record>, Error> {
    let mut records = Vec::new();
    let mut row = StringRecord::new();
    let mut line = 2;

    while rdr.read_record(&mut row)? {
        let origin = Origin::new(source_title, line);
        line += 1;

        match columns.classify(&row, platform) {
            RowIntent::MissingKey => {
                warn!(source = %origin.source, line = origin.line, "row does not have a key and will not be parsed");
            }
            RowIntent::Header(title) => records.push(Record::header(title, origin)),
            RowIntent::OtherPlatform => {}
            RowIntent::Data(key) => {
                if let Some(record) = on_row(origin, key, &row) {
                    records.push(record);
                }
            }
        }
    }

    Ok(records)
}

/// Parses one strings CSV document.
pub fn parse_strings<R: Read>(
    reader: R,
    source_title: &str,
    config: &StringsConfig,
) -> Result<Vec<Record>, Error> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();

    let ids: Vec<&str> = config.languages.iter().map(|l| l.id.as_str()).collect();
    let resolved = resolve_string_columns(headers.iter(), source_title, &ids)?;

    parse_rows(
        &mut rdr,
        source_title,
        resolved.columns,
        config.platform,
        |origin, key, row| {
            let mut translations = HashMap::new();
            let mut missing = 0;
            for (id, index) in &resolved.languages {
                match cell(row, *index) {
                    Some(text) => {
                        translations.insert(id.clone(), text.to_string());
                    }
                    None => missing += 1,
                }
            }

            if translations.is_empty() {
                warn!(source = %origin.source, line = origin.line, "row has no translations so it will not be parsed");
                return None;
            }
            if missing > 0 {
                warn!(source = %origin.source, line = origin.line, missing, "row is missing at least one translation");
            }
            Some(Record::translations(key, origin, translations))
        },
    )
}

/// Parses one analytics CSV document.
pub fn parse_analytics<R: Read>(
    reader: R,
    source_title: &str,
    config: &AnalyticsConfig,
) -> Result<Vec<Record>, Error> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();

    let resolved = resolve_analytics_columns(
        headers.iter(),
        source_title,
        &config.type_column_name,
        &config.tag_column_name,
    )?;

    parse_rows(
        &mut rdr,
        source_title,
        resolved.columns,
        config.platform,
        |origin, key, row| match (cell(row, resolved.kind), cell(row, resolved.tag)) {
            (None, _) => {
                warn!(source = %origin.source, line = origin.line, "row has no type and will not be parsed");
                None
            }
            (_, None) => {
                warn!(source = %origin.source, line = origin.line, "row has no tag and will not be parsed");
                None
            }
            (Some(kind), Some(tag)) => Some(Record::analytics(key, origin, kind.trim(), tag.trim())),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::types::RecordValue;
    use std::{io::Cursor, path::PathBuf};

    fn strings_config(platform: Platform, ids: &[&str]) -> StringsConfig {
        StringsConfig {
            platform,
            sources: vec![],
            languages: ids
                .iter()
                .map(|id| Language {
                    id: id.to_string(),
                    path: PathBuf::from(format!("{id}.out")),
                })
                .collect(),
        }
    }

    fn analytics_config(platform: Platform) -> AnalyticsConfig {
        AnalyticsConfig {
            platform,
            sources: vec![],
            path: PathBuf::from("GA.out"),
            package_name: None,
            type_column_name: "type".to_string(),
            tag_column_name: "tag".to_string(),
            tags_align_column: 0,
        }
    }

    #[test]
    fn test_parse_strings_basic() {
        let csv = "key,platforms,en,fr\ngreeting,,Hello,Bonjour\n";
        let config = strings_config(Platform::Android, &["en", "fr"]);
        let records = parse_strings(Cursor::new(csv), "Main", &config).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.key, "greeting");
        assert_eq!(record.origin, Origin::new("Main", 2));
        assert_eq!(record.translation("en"), Some("Hello"));
        assert_eq!(record.translation("fr"), Some("Bonjour"));
    }

    #[test]
    fn test_rows_without_key_are_skipped_but_counted() {
        let csv = "key,en\n,Orphan\n  ,Spaces\nkept,Kept\n";
        let config = strings_config(Platform::Web, &["en"]);
        let records = parse_strings(Cursor::new(csv), "Main", &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "kept");
        assert_eq!(records[0].origin.line, 4);
    }

    #[test]
    fn test_header_marker_rows() {
        let csv = "key,en\n###  Section A ,ignored\nafter,After\n";
        let config = strings_config(Platform::Ios, &["en"]);
        let records = parse_strings(Cursor::new(csv), "Main", &config).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "Section A");
        assert_eq!(records[0].value, RecordValue::Header);
        assert_eq!(records[1].origin.line, 3);
    }

    #[test]
    fn test_platform_filtering() {
        let csv = "key,platforms,en\nboth,\"iOS, Web\",Both\nall,,All\n";
        let android = strings_config(Platform::Android, &["en"]);
        let keys: Vec<String> = parse_strings(Cursor::new(csv), "Main", &android)
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["all"]);

        let ios = strings_config(Platform::Ios, &["en"]);
        let records = parse_strings(Cursor::new(csv), "Main", &ios).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_row_without_translations_is_dropped() {
        let csv = "key,en,fr\nempty,,\npartial,Hi,\n";
        let config = strings_config(Platform::Android, &["en", "fr"]);
        let records = parse_strings(Cursor::new(csv), "Main", &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "partial");
        assert_eq!(records[0].translation("fr"), None);
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let csv = "key,en,fr\nshort,Only English\n";
        let config = strings_config(Platform::Android, &["en", "fr"]);
        let records = parse_strings(Cursor::new(csv), "Main", &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].translation("en"), Some("Only English"));
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let csv = "\u{feff}key,en\nhello,Hello\n";
        let config = strings_config(Platform::Android, &["en"]);
        let records = parse_strings(Cursor::new(csv.as_bytes()), "Main", &config).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let csv: &[u8] = b"key,en\ngreeting,Hello\ncafe,Caf\xE9\n";
        let config = strings_config(Platform::Android, &["en"]);
        let records = parse_strings(Cursor::new(csv), "Main", &config).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].translation("en"), Some("Hello"));
        assert_eq!(records[1].translation("en"), Some("Caf\u{FFFD}"));
    }

    #[test]
    fn test_missing_language_column_is_fatal() {
        let csv = "key,en\nhello,Hello\n";
        let config = strings_config(Platform::Android, &["en", "fr"]);
        let err = parse_strings(Cursor::new(csv), "Main", &config).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }

    #[test]
    fn test_parse_analytics() {
        let csv = "key,type,tag\nlogin_tapped,Event,login_tap\nno_tag,Event,\nno_type,,x\nhome,Screen,home_screen\n";
        let config = analytics_config(Platform::Ios);
        let records = parse_analytics(Cursor::new(csv), "GA", &config).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].value,
            RecordValue::Analytics {
                kind: "Event".to_string(),
                tag: "login_tap".to_string()
            }
        );
        assert_eq!(records[1].key, "home");
        assert_eq!(records[1].origin.line, 5);
    }

    #[test]
    fn test_analytics_missing_tag_column_is_fatal() {
        let csv = "key,type\nlogin,Event\n";
        let config = analytics_config(Platform::Web);
        let err = parse_analytics(Cursor::new(csv), "GA", &config).unwrap_err();
        assert!(err.to_string().contains("Tag column"));
    }

    struct FailingFetcher;

    impl Fetch for FailingFetcher {
        fn fetch(&self, url: &str) -> Result<Box<dyn Read>, Error> {
            Err(Error::HttpStatus {
                url: url.to_string(),
                status: 500,
            })
        }
    }

    #[test]
    fn test_transport_failure_skips_source() {
        let mut config = strings_config(Platform::Android, &["en"]);
        config.sources.push(Source {
            url: "https://example.com/down.csv".to_string(),
            title: "Down".to_string(),
        });
        let model = ingest_strings(&FailingFetcher, &config).unwrap();
        assert!(model.is_empty());
    }
}
