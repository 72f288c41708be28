//! Header resolution and per-row classification.
//!
//! The header row is scanned once, left to right, and turned into an
//! immutable column map. Data rows are then classified against that map
//! before the pipeline-specific extraction looks at the remaining cells.

use csv::StringRecord;

use crate::{
    error::Error,
    types::{HEADER_TOKEN, Platform},
};

/// Reserved header naming the key column.
pub const KEY_COLUMN: &str = "key";
/// Reserved header naming the optional platforms column.
pub const PLATFORMS_COLUMN: &str = "platforms";

/// Columns every pipeline shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub key: usize,
    pub platforms: Option<usize>,
}

/// Resolved columns for a strings source: one column per configured language,
/// in configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringColumns {
    pub columns: Columns,
    pub languages: Vec<(String, usize)>,
}

/// Resolved columns for an analytics source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsColumns {
    pub columns: Columns,
    pub kind: usize,
    pub tag: usize,
}

/// What a data row turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIntent<'r> {
    /// The key cell is blank or absent.
    MissingKey,
    /// A `###` section header; holds the trimmed title.
    Header(&'r str),
    /// The platforms cell names other platforms only.
    OtherPlatform,
    /// A regular entry; holds the trimmed key.
    Data(&'r str),
}

/// Returns the cell at `index`, treating empty and absent cells alike as `None`.
pub fn cell(row: &StringRecord, index: usize) -> Option<&str> {
    row.get(index).filter(|value| !value.is_empty())
}

/// Scans the header row for the reserved columns, handing every other
/// non-empty cell to `on_column` with its trimmed text.
///
/// The first occurrence of a reserved name wins.
fn scan_headers<'a>(
    headers: impl IntoIterator<Item = &'a str>,
    source_title: &str,
    mut on_column: impl FnMut(usize, &str),
) -> Result<Columns, Error> {
    let mut key = None;
    let mut platforms = None;

    for (index, header) in headers.into_iter().enumerate() {
        let header = header.trim();
        if header.is_empty() {
            continue;
        }
        if header.eq_ignore_ascii_case(KEY_COLUMN) {
            key.get_or_insert(index);
        } else if header.eq_ignore_ascii_case(PLATFORMS_COLUMN) {
            platforms.get_or_insert(index);
        } else {
            on_column(index, header);
        }
    }

    let key = key.ok_or_else(|| {
        Error::missing_column(
            source_title,
            "There must be a column marked 'key' with the String keys",
        )
    })?;

    Ok(Columns { key, platforms })
}

/// Resolves the key, platforms and per-language columns of a strings source.
///
/// Every language in `language_ids` must have a column.
pub fn resolve_string_columns<'a>(
    headers: impl IntoIterator<Item = &'a str>,
    source_title: &str,
    language_ids: &[&str],
) -> Result<StringColumns, Error> {
    let mut found: Vec<Option<usize>> = vec![None; language_ids.len()];

    let columns = scan_headers(headers, source_title, |index, header| {
        for (slot, id) in found.iter_mut().zip(language_ids) {
            if header.eq_ignore_ascii_case(id.trim()) {
                slot.get_or_insert(index);
            }
        }
    })?;

    let languages = language_ids
        .iter()
        .zip(found)
        .map(|(id, index)| match index {
            Some(index) => Ok((id.to_string(), index)),
            None => Err(Error::missing_column(
                source_title,
                format!("{} does not have any translations", id),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StringColumns { columns, languages })
}

/// Resolves the key, platforms, type and tag columns of an analytics source.
pub fn resolve_analytics_columns<'a>(
    headers: impl IntoIterator<Item = &'a str>,
    source_title: &str,
    type_column_name: &str,
    tag_column_name: &str,
) -> Result<AnalyticsColumns, Error> {
    let mut kind = None;
    let mut tag = None;

    let columns = scan_headers(headers, source_title, |index, header| {
        if header.eq_ignore_ascii_case(type_column_name.trim()) {
            kind.get_or_insert(index);
        } else if header.eq_ignore_ascii_case(tag_column_name.trim()) {
            tag.get_or_insert(index);
        }
    })?;

    let kind = kind.ok_or_else(|| {
        Error::missing_column(
            source_title,
            format!("Type column with name {} not found", type_column_name),
        )
    })?;
    let tag = tag.ok_or_else(|| {
        Error::missing_column(
            source_title,
            format!("Tag column with name {} not found", tag_column_name),
        )
    })?;

    Ok(AnalyticsColumns { columns, kind, tag })
}

impl Columns {
    /// Classifies a data row for the given target platform.
    pub fn classify<'r>(&self, row: &'r StringRecord, platform: Platform) -> RowIntent<'r> {
        let key = match cell(row, self.key).map(str::trim) {
            Some(key) if !key.is_empty() => key,
            _ => return RowIntent::MissingKey,
        };

        if let Some(title) = key.strip_prefix(HEADER_TOKEN) {
            return RowIntent::Header(title.trim());
        }

        if let Some(index) = self.platforms {
            if !platform.is_targeted_by(cell(row, index)) {
                return RowIntent::OtherPlatform;
            }
        }

        RowIntent::Data(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(cells: &[&str]) -> StringRecord {
        StringRecord::from(cells.to_vec())
    }

    #[test]
    fn test_resolve_string_columns() {
        let headers = ["key", "platforms", "en", "fr"];
        let resolved = resolve_string_columns(headers, "Main", &["en", "fr"]).unwrap();
        assert_eq!(resolved.columns.key, 0);
        assert_eq!(resolved.columns.platforms, Some(1));
        assert_eq!(
            resolved.languages,
            vec![("en".to_string(), 2), ("fr".to_string(), 3)]
        );
    }

    #[test]
    fn test_platforms_column_is_optional() {
        let resolved = resolve_string_columns(["en", "KEY"], "Main", &["en"]).unwrap();
        assert_eq!(resolved.columns.key, 1);
        assert_eq!(resolved.columns.platforms, None);
    }

    #[test]
    fn test_missing_key_column_is_fatal() {
        let err = resolve_string_columns(["id", "en"], "Main", &["en"]).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
        assert!(err.to_string().contains("'key'"));
    }

    #[test]
    fn test_missing_language_column_is_fatal() {
        let err = resolve_string_columns(["key", "en"], "Main", &["en", "de"]).unwrap_err();
        assert_eq!(err.to_string(), "Main: de does not have any translations");
    }

    #[test]
    fn test_first_reserved_header_wins() {
        let resolved = resolve_string_columns(["key", "en", "Key"], "Main", &["en"]).unwrap();
        assert_eq!(resolved.columns.key, 0);
    }

    #[test]
    fn test_blank_headers_are_ignored() {
        let resolved = resolve_string_columns(["", " key ", "  ", "en "], "Main", &["en"]).unwrap();
        assert_eq!(resolved.columns.key, 1);
        assert_eq!(resolved.languages[0].1, 3);
    }

    #[test]
    fn test_resolve_analytics_columns() {
        let resolved =
            resolve_analytics_columns(["Tag", "key", "Type"], "GA", "type", "tag").unwrap();
        assert_eq!(resolved.columns.key, 1);
        assert_eq!(resolved.kind, 2);
        assert_eq!(resolved.tag, 0);
    }

    #[test]
    fn test_analytics_missing_type_or_tag_is_fatal() {
        let err = resolve_analytics_columns(["key", "tag"], "GA", "type", "tag").unwrap_err();
        assert!(err.to_string().contains("Type column with name type not found"));

        let err = resolve_analytics_columns(["key", "type"], "GA", "type", "tag").unwrap_err();
        assert!(err.to_string().contains("Tag column with name tag not found"));
    }

    #[test]
    fn test_classify_rows() {
        let columns = Columns {
            key: 0,
            platforms: Some(1),
        };
        assert_eq!(
            columns.classify(&row(&["", "", "x"]), Platform::Android),
            RowIntent::MissingKey
        );
        assert_eq!(
            columns.classify(&row(&["   ", "", "x"]), Platform::Android),
            RowIntent::MissingKey
        );
        assert_eq!(
            columns.classify(&row(&["###  Section A ", "", ""]), Platform::Android),
            RowIntent::Header("Section A")
        );
        assert_eq!(
            columns.classify(&row(&[" greeting ", "iOS, Web", "Hi"]), Platform::Android),
            RowIntent::OtherPlatform
        );
        assert_eq!(
            columns.classify(&row(&[" greeting ", "iOS, Web", "Hi"]), Platform::Web),
            RowIntent::Data("greeting")
        );
    }

    #[test]
    fn test_classify_header_ignores_platform_filter() {
        let columns = Columns {
            key: 0,
            platforms: Some(1),
        };
        assert_eq!(
            columns.classify(&row(&["###Web only", "Web"]), Platform::Android),
            RowIntent::Header("Web only")
        );
    }

    #[test]
    fn test_short_rows_have_absent_cells() {
        let columns = Columns {
            key: 2,
            platforms: None,
        };
        assert_eq!(
            columns.classify(&row(&["a"]), Platform::Ios),
            RowIntent::MissingKey
        );
        assert_eq!(cell(&row(&["a", ""]), 1), None);
        assert_eq!(cell(&row(&["a", " "]), 1), Some(" "));
    }

    fn header_case() -> impl Strategy<Value = (Vec<String>, Vec<bool>)> {
        let names = vec!["key", "platforms", "en", "fr", "pt-br", "notes"];
        (
            Just(names).prop_shuffle().prop_map(|names| {
                names.into_iter().map(str::to_string).collect::<Vec<_>>()
            }),
            proptest::collection::vec(any::<bool>(), 6),
        )
    }

    proptest! {
        #[test]
        fn prop_header_resolution_ignores_order_and_case((names, upper) in header_case()) {
            let headers: Vec<String> = names
                .iter()
                .zip(&upper)
                .map(|(name, up)| if *up { name.to_uppercase() } else { name.clone() })
                .collect();

            let resolved = resolve_string_columns(
                headers.iter().map(String::as_str),
                "Prop",
                &["en", "fr", "pt-BR"],
            ).unwrap();

            let position = |name: &str| names.iter().position(|n| n == name).unwrap();
            prop_assert_eq!(resolved.columns.key, position("key"));
            prop_assert_eq!(resolved.columns.platforms, Some(position("platforms")));
            prop_assert_eq!(resolved.languages[0].1, position("en"));
            prop_assert_eq!(resolved.languages[1].1, position("fr"));
            prop_assert_eq!(resolved.languages[2].1, position("pt-br"));
        }

        #[test]
        fn prop_platform_filter(android in any::<bool>(), ios in any::<bool>(), web in any::<bool>()) {
            let mut names = Vec::new();
            if android { names.push("android"); }
            if ios { names.push(" IOS"); }
            if web { names.push("Web "); }
            let cell = names.join(",");
            let none = names.is_empty();

            prop_assert_eq!(Platform::Android.is_targeted_by(Some(cell.as_str())), none || android);
            prop_assert_eq!(Platform::Ios.is_targeted_by(Some(cell.as_str())), none || ios);
            prop_assert_eq!(Platform::Web.is_targeted_by(Some(cell.as_str())), none || web);
        }
    }
}
