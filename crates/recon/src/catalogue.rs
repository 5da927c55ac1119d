//! Catalogue payload parsing.
//!
//! The catalogue service returns one string: records separated by `*&*`,
//! each record optionally carrying fields separated by `*^*`:
//!
//! | Schema        | Layout                                  |
//! |---------------|-----------------------------------------|
//! | `plain`       | `displayName`                           |
//! | `indexed`     | `index *^* displayName`                 |
//! | `categorized` | `index *^* category *^* displayName`    |
//!
//! A record that contains the field separator must have exactly the
//! schema's field count. Records without a separator are plain titles.

use serde::Deserialize;

use crate::error::ReconError;
use crate::model::{AnnotatedTitle, ParseIssue, RawTitle, RecordLabel, Source};

pub const RECORD_DELIMITER: &str = "*&*";
pub const FIELD_DELIMITER: &str = "*^*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSchema {
    #[default]
    Plain,
    Indexed,
    Categorized,
}

impl RecordSchema {
    pub fn field_count(&self) -> usize {
        match self {
            Self::Plain => 1,
            Self::Indexed => 2,
            Self::Categorized => 3,
        }
    }
}

impl std::fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Indexed => write!(f, "indexed"),
            Self::Categorized => write!(f, "categorized"),
        }
    }
}

/// Titles recovered from a catalogue payload plus the records that were skipped.
#[derive(Debug, Clone, Default)]
pub struct CatalogueParse {
    pub titles: Vec<AnnotatedTitle>,
    pub issues: Vec<ParseIssue>,
}

/// Split a payload into trimmed, non-empty record strings.
pub fn split_records(raw: &str) -> Vec<&str> {
    raw.split(RECORD_DELIMITER)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect()
}

/// Parse a single record at `position` against `schema`.
pub fn parse_record(
    record: &str,
    position: usize,
    schema: RecordSchema,
) -> Result<AnnotatedTitle, ReconError> {
    let raw = RawTitle::new(record, Source::Catalogue, position);

    if !record.contains(FIELD_DELIMITER) {
        return Ok(AnnotatedTitle::plain(raw));
    }

    let fields: Vec<&str> = record.split(FIELD_DELIMITER).map(str::trim).collect();

    let (index, category, display) = match (schema, fields.as_slice()) {
        (RecordSchema::Indexed, [index, display]) => (*index, None, *display),
        (RecordSchema::Categorized, [index, category, display]) => {
            (*index, Some(*category), *display)
        }
        _ => {
            return Err(ReconError::FieldCount {
                position,
                expected: schema.field_count(),
                found: fields.len(),
            })
        }
    };

    if index.is_empty() {
        return Err(ReconError::EmptyField { position, field: "index" });
    }
    if display.is_empty() {
        return Err(ReconError::EmptyField { position, field: "display" });
    }

    Ok(AnnotatedTitle {
        raw,
        label: Some(RecordLabel {
            index: index.to_string(),
            category: category.map(str::to_string),
            display: display.to_string(),
        }),
    })
}

/// Parse a whole payload. Malformed records are skipped and reported.
pub fn parse_catalogue(raw: &str, schema: RecordSchema) -> CatalogueParse {
    let mut out = CatalogueParse::default();

    for (position, record) in split_records(raw).into_iter().enumerate() {
        match parse_record(record, position, schema) {
            Ok(title) => out.titles.push(title),
            Err(e) => {
                log::warn!("skipping catalogue record: {e}");
                out.issues.push(ParseIssue {
                    position: Some(position),
                    raw: record.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    log::debug!(
        "catalogue payload: {} titles, {} skipped ({schema} schema)",
        out.titles.len(),
        out.issues.len()
    );
    out
}
