//! CrossRef REST `works` messages.

use serde_json::Value;

use crate::error::{MarkError, Result};
use crate::model::{Article, Record, RecordType, iso_date};

/// Date fields in order of preference.
const DATE_FIELDS: &[&str] = &["published-print", "published-online", "published", "issued"];

#[derive(Debug, Clone)]
pub struct CrossRefWork {
    doi: String,
    message: Value,
}

impl CrossRefWork {
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    /// Accepts either the full API envelope (`{"status": "ok", "message": …}`)
    /// or the bare message.
    pub fn from_json(v: &Value) -> Result<Self> {
        let message = if v.get("message").is_some_and(Value::is_object) {
            &v["message"]
        } else {
            v
        };

        let doi = message["DOI"]
            .as_str()
            .map(str::trim)
            .filter(|doi| !doi.is_empty())
            .ok_or_else(|| MarkError::Parse("Missing DOI in CrossRef response".to_string()))?
            .to_string();

        Ok(Self {
            doi,
            message: message.clone(),
        })
    }

    fn string_list(&self, field: &str) -> Result<Vec<String>> {
        match &self.message[field] {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(clean_text)
                        .ok_or_else(|| MarkError::structural(format!("non-string entry in {field}")))
                })
                .filter(|item| !matches!(item, Ok(text) if text.is_empty()))
                .collect(),
            _ => Err(MarkError::structural(format!("{field} is not an array"))),
        }
    }
}

impl Record for CrossRefWork {
    fn doi(&self) -> &str {
        &self.doi
    }

    fn record_type(&self) -> Result<RecordType> {
        self.message["type"]
            .as_str()
            .map(RecordType::from_crossref_type)
            .ok_or_else(|| MarkError::structural("missing work type"))
    }

    fn journal_article(&self) -> Result<&dyn Article> {
        if self.record_type()? == RecordType::Journal {
            Ok(self as &dyn Article)
        } else {
            Err(MarkError::structural("work is not a journal article"))
        }
    }
}

impl Article for CrossRefWork {
    fn contributors(&self) -> Result<Vec<String>> {
        match &self.message["author"] {
            Value::Null => Ok(Vec::new()),
            Value::Array(authors) => authors.iter().map(author_name).collect(),
            _ => Err(MarkError::structural("author is not an array")),
        }
    }

    fn titles(&self) -> Result<Vec<String>> {
        self.string_list("title")
    }

    fn publication_date(&self) -> Result<String> {
        for field in DATE_FIELDS {
            let value = &self.message[*field];
            if value.is_null() {
                continue;
            }
            if let Some(date) = parse_date_parts(value, field)? {
                return Ok(date);
            }
        }
        Err(MarkError::structural("no publication date"))
    }
}

fn author_name(v: &Value) -> Result<String> {
    let given = v["given"].as_str().map(clean_text).filter(|s| !s.is_empty());
    let family = v["family"].as_str().map(clean_text).filter(|s| !s.is_empty());
    match (given, family) {
        (Some(g), Some(f)) => Ok(format!("{g} {f}")),
        (None, Some(f)) => Ok(f),
        (given, None) => v["name"]
            .as_str()
            .map(clean_text)
            .filter(|s| !s.is_empty())
            .or(given)
            .ok_or_else(|| MarkError::structural("author without a name")),
    }
}

/// `{"date-parts": [[2015, 2, 26]]}`. Returns `None` for the `[[null]]`
/// placeholder CrossRef uses when the date is unknown.
fn parse_date_parts(v: &Value, field: &str) -> Result<Option<String>> {
    let parts = v["date-parts"][0]
        .as_array()
        .ok_or_else(|| MarkError::structural(format!("{field} has no date-parts")))?;
    if parts.first().is_none_or(Value::is_null) {
        return Ok(None);
    }

    let part = |index: usize, name: &str| -> Result<Option<i64>> {
        match parts.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .map(Some)
                .ok_or_else(|| MarkError::structural(format!("non-numeric {name} in {field}"))),
        }
    };

    let year = part(0, "year")?.unwrap_or_default();
    let month = part(1, "month")?;
    let day = part(2, "day")?;

    let narrow = |n: i64, name: &str| {
        u32::try_from(n).map_err(|_| MarkError::structural(format!("{name} {n} out of range")))
    };
    let year = i32::try_from(year)
        .map_err(|_| MarkError::structural(format!("year {year} out of range")))?;
    let month = month.map(|m| narrow(m, "month")).transpose()?;
    let day = day.map(|d| narrow(d, "day")).transpose()?;

    iso_date(year, month, day).map(Some)
}

fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DQN_JSON: &str = r#"{
        "status": "ok",
        "message": {
            "DOI": "10.1038/nature14236",
            "title": ["Human-level control through deep reinforcement learning"],
            "author": [
                {"given": "Volodymyr", "family": "Mnih"},
                {"given": "Koray", "family": "Kavukcuoglu"},
                {"name": "DeepMind Technologies"}
            ],
            "published-online": {"date-parts": [[2015, 2, 25]]},
            "published-print": {"date-parts": [[2015, 2, 26]]},
            "issued": {"date-parts": [[2015, 2, 25]]},
            "type": "journal-article",
            "container-title": ["Nature"],
            "publisher": "Springer Science and Business Media LLC"
        }
    }"#;

    #[test]
    fn parses_journal_work() {
        let work = CrossRefWork::parse(DQN_JSON).unwrap();
        assert_eq!(work.doi(), "10.1038/nature14236");
        assert_eq!(work.record_type().unwrap(), RecordType::Journal);

        let article = work.journal_article().unwrap();
        assert_eq!(
            article.contributors().unwrap(),
            vec!["Volodymyr Mnih", "Koray Kavukcuoglu", "DeepMind Technologies"]
        );
        assert_eq!(
            article.titles().unwrap(),
            vec!["Human-level control through deep reinforcement learning"]
        );
        assert_eq!(article.publication_date().unwrap(), "2015-02-26");
    }

    #[test]
    fn accepts_bare_message() {
        let json = r#"{"DOI": "10.1/x", "type": "book-chapter", "title": []}"#;
        let work = CrossRefWork::parse(json).unwrap();
        assert_eq!(work.record_type().unwrap(), RecordType::Book);
        assert!(matches!(work.journal_article(), Err(MarkError::StructuralQuery(_))));
    }

    #[test]
    fn missing_doi_is_parse_error() {
        let err = CrossRefWork::parse(r#"{"message": {"type": "journal-article"}}"#).unwrap_err();
        assert!(matches!(err, MarkError::Parse(_)));
        assert!(matches!(CrossRefWork::parse("{"), Err(MarkError::Json(_))));
    }

    #[test]
    fn missing_type_is_structural_error() {
        let work = CrossRefWork::parse(r#"{"DOI": "10.1/x"}"#).unwrap();
        assert!(matches!(work.record_type(), Err(MarkError::StructuralQuery(_))));
    }

    #[test]
    fn skips_unknown_dates() {
        let json = r#"{
            "DOI": "10.1/x",
            "type": "journal-article",
            "published-print": {"date-parts": [[null]]},
            "issued": {"date-parts": [[2019, 7]]}
        }"#;
        let work = CrossRefWork::parse(json).unwrap();
        assert_eq!(work.publication_date().unwrap(), "2019-07");
        assert!(work.contributors().unwrap().is_empty());
        assert!(work.titles().unwrap().is_empty());
    }

    #[test]
    fn malformed_fields_are_structural_errors() {
        let json = r#"{
            "DOI": "10.1/x",
            "type": "journal-article",
            "title": "not a list",
            "author": [{"affiliation": []}],
            "published-print": {"date-parts": [["twenty", 1]]}
        }"#;
        let work = CrossRefWork::parse(json).unwrap();
        assert!(matches!(work.titles(), Err(MarkError::StructuralQuery(_))));
        assert!(matches!(work.contributors(), Err(MarkError::StructuralQuery(_))));
        assert!(matches!(work.publication_date(), Err(MarkError::StructuralQuery(_))));
    }

    #[test]
    fn no_date_at_all() {
        let work = CrossRefWork::parse(r#"{"DOI": "10.1/x", "type": "journal-article"}"#).unwrap();
        assert!(matches!(work.publication_date(), Err(MarkError::StructuralQuery(_))));
    }
}
