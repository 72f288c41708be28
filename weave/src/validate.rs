//! Key legality and uniqueness checks over a freshly ingested model.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::{
    error::Error,
    types::{Model, Record},
};

lazy_static! {
    static ref LEGAL_KEY: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
}

/// Checks that a single key is usable as a generated identifier.
pub fn check_key(record: &Record) -> Result<(), Error> {
    if record.key.chars().any(char::is_whitespace) {
        return Err(Error::InvalidKey {
            location: record.origin.to_string(),
            reason: "contains a space in its key.".to_string(),
        });
    }
    if !LEGAL_KEY.is_match(&record.key) {
        return Err(Error::InvalidKey {
            location: record.origin.to_string(),
            reason: "contains some illegal characters.".to_string(),
        });
    }
    Ok(())
}

/// Validates every entry key and drops superseded duplicates in place.
///
/// Section headers are neither checked nor deduplicated. For entries, the
/// first illegal key aborts the pipeline. When two entries share a key the
/// later one wins; removals are applied after the whole scan.
pub fn verify_keys(model: &mut Model) -> Result<(), Error> {
    let reviewable: Vec<usize> = model
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| !record.is_header())
        .map(|(index, _)| index)
        .collect();

    let mut superseded = HashSet::new();

    for (position, &i) in reviewable.iter().enumerate() {
        let first = &model.records[i];
        check_key(first)?;

        for &j in &reviewable[position + 1..] {
            let second = &model.records[j];
            if first.key == second.key {
                warn!(
                    key = %first.key,
                    "{} and {} have the same key. The second one will be used",
                    first.origin,
                    second.origin
                );
                superseded.insert(i);
            }
        }
    }

    if !superseded.is_empty() {
        let mut index = 0;
        model.records.retain(|_| {
            let keep = !superseded.contains(&index);
            index += 1;
            keep
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;
    use std::collections::HashMap;

    fn entry(key: &str, line: usize) -> Record {
        let mut map = HashMap::new();
        map.insert("en".to_string(), format!("value {line}"));
        Record::translations(key, Origin::new("Main", line), map)
    }

    #[test]
    fn test_later_duplicate_wins() {
        let mut model = Model::new();
        model.extend([entry("title", 2), entry("other", 3), entry("title", 4)]);
        verify_keys(&mut model).unwrap();

        assert_eq!(model.len(), 2);
        assert_eq!(model.find("title").unwrap().origin.line, 4);
        assert_eq!(model.records[0].key, "other");
    }

    #[test]
    fn test_triplicate_keeps_only_last() {
        let mut model = Model::new();
        model.extend([entry("a", 2), entry("a", 3), entry("a", 4)]);
        verify_keys(&mut model).unwrap();
        assert_eq!(model.len(), 1);
        assert_eq!(model.records[0].origin.line, 4);
    }

    #[test]
    fn test_duplicates_across_record_kinds() {
        let mut model = Model::new();
        model.extend([
            entry("login", 2),
            Record::analytics("login", Origin::new("GA", 2), "Event", "login_tap"),
        ]);
        verify_keys(&mut model).unwrap();
        assert_eq!(model.len(), 1);
        assert_eq!(model.records[0].origin.source, "GA");
    }

    #[test]
    fn test_key_with_space_is_fatal() {
        let mut model = Model::new();
        model.extend([entry("my key", 5)]);
        let err = verify_keys(&mut model).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Line 5 from Main contains a space in its key."
        );
    }

    #[test]
    fn test_illegal_characters_are_fatal() {
        let mut model = Model::new();
        model.extend([entry("fine", 2), entry("dash-key", 3)]);
        let err = verify_keys(&mut model).unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }));
        assert!(err.to_string().contains("Line 3 from Main"));
        assert!(err.to_string().contains("illegal characters"));
    }

    #[test]
    fn test_headers_are_exempt() {
        let mut model = Model::new();
        model.extend([
            Record::header("Section A", Origin::new("Main", 2)),
            entry("a", 3),
            Record::header("Section A", Origin::new("Main", 4)),
        ]);
        verify_keys(&mut model).unwrap();
        assert_eq!(model.len(), 3);
        assert!(model.records[0].is_header());
        assert!(model.records[2].is_header());
    }

    #[test]
    fn test_check_key_accepts_identifiers() {
        assert!(check_key(&entry("Sign_In_2", 2)).is_ok());
        assert!(check_key(&entry("", 2)).is_err());
        assert!(check_key(&entry("café", 2)).is_err());
        assert!(check_key(&entry("tab\there", 2)).is_err());
    }
}
