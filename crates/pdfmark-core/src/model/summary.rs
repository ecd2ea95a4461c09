use serde::Serialize;

use crate::error::Result;
use crate::model::{Record, RecordType};

/// Everything a record exposes, with failed queries collected as
/// `problems` instead of aborting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordSummary {
    pub doi: String,
    pub record_type: Option<RecordType>,
    pub contributors: Vec<String>,
    pub titles: Vec<String>,
    pub publication_date: Option<String>,
    pub problems: Vec<String>,
}

impl RecordSummary {
    pub fn from_record(record: &dyn Record) -> Self {
        let mut summary = Self {
            doi: record.doi().to_string(),
            ..Default::default()
        };

        summary.record_type = summary.keep("type", record.record_type());
        if summary.record_type != Some(RecordType::Journal) {
            return summary;
        }

        let Some(article) = summary.keep("journal_article", record.journal_article()) else {
            return summary;
        };
        summary.contributors = summary
            .keep("contributors", article.contributors())
            .unwrap_or_default();
        summary.titles = summary.keep("titles", article.titles()).unwrap_or_default();
        summary.publication_date = summary.keep("publication_date", article.publication_date());
        summary
    }

    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    fn keep<T>(&mut self, what: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.problems.push(format!("{what}: {e}"));
                None
            }
        }
    }
}
