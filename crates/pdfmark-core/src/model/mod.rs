//! Metadata model for registry records.
//!
//! Every accessor is fallible: records are views over documents fetched
//! from the registry, and any piece of that document may be missing or
//! malformed. A failed query is reported as [`MarkError::StructuralQuery`].

pub mod crossref;
pub mod summary;
pub mod unixref;
pub mod xml;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{MarkError, Result};

pub use crossref::CrossRefWork;
pub use summary::RecordSummary;
pub use unixref::Unixref;

/// A fetched registry record for one published work.
pub trait Record {
    /// Identifier of the record. Always populated by the fetch client.
    fn doi(&self) -> &str;

    fn record_type(&self) -> Result<RecordType>;

    /// The journal article inside this record.
    fn journal_article(&self) -> Result<&dyn Article>;
}

pub trait Article {
    fn contributors(&self) -> Result<Vec<String>>;
    fn titles(&self) -> Result<Vec<String>>;
    fn publication_date(&self) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Journal,
    Book,
    Conference,
    Dissertation,
    Report,
    Standard,
    Database,
    Other,
}

impl RecordType {
    /// Maps the `type` field of a CrossRef REST work.
    pub fn from_crossref_type(s: &str) -> Self {
        match s {
            "journal-article" => Self::Journal,
            "book" | "book-chapter" | "book-part" | "book-section" | "book-series"
            | "book-set" | "book-track" | "edited-book" | "monograph" | "reference-book"
            | "reference-entry" => Self::Book,
            "proceedings" | "proceedings-article" | "proceedings-series" => Self::Conference,
            "dissertation" => Self::Dissertation,
            "report" | "report-component" | "report-series" => Self::Report,
            "standard" | "standard-series" => Self::Standard,
            "dataset" | "database" => Self::Database,
            _ => Self::Other,
        }
    }

    /// Maps the element found under `doi_record/crossref` in unixref.
    pub fn from_unixref_element(name: &str) -> Self {
        match name {
            "journal" => Self::Journal,
            "book" => Self::Book,
            "conference" => Self::Conference,
            "dissertation" => Self::Dissertation,
            "report-paper" => Self::Report,
            "standard" => Self::Standard,
            "database" => Self::Database,
            _ => Self::Other,
        }
    }
}

/// Formats a possibly partial publication date as `YYYY`, `YYYY-MM` or
/// `YYYY-MM-DD`. Month and day are only meaningful together with the parts
/// before them; a day without a month is dropped.
pub(crate) fn iso_date(year: i32, month: Option<u32>, day: Option<u32>) -> Result<String> {
    if !(1..=9999).contains(&year) {
        return Err(MarkError::structural(format!("year {year} out of range")));
    }
    match (month, day) {
        (Some(month), Some(day)) => NaiveDate::from_ymd_opt(year, month, day)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .ok_or_else(|| {
                MarkError::structural(format!("no such date {year}-{month}-{day}"))
            }),
        (Some(month), None) => {
            if (1..=12).contains(&month) {
                Ok(format!("{year:04}-{month:02}"))
            } else {
                Err(MarkError::structural(format!("month {month} out of range")))
            }
        }
        (None, _) => Ok(format!("{year:04}")),
    }
}
