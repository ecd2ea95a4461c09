//! CrossRef UNIXREF XML records.

use crate::error::{MarkError, Result};
use crate::model::xml::XmlElement;
use crate::model::{Article, Record, RecordType, iso_date};

#[derive(Debug, Clone)]
pub struct Unixref {
    doi: String,
    root: XmlElement,
    article: Option<UnixrefArticle>,
}

#[derive(Debug, Clone)]
pub struct UnixrefArticle {
    element: XmlElement,
    issue_dates: Vec<XmlElement>,
}

impl Unixref {
    /// Reads a unixref document, taking the record identifier from its
    /// `doi_data/doi` element.
    pub fn parse(xml: &str) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        let doi = find_doi(&root)
            .ok_or_else(|| MarkError::Parse("no DOI in unixref document".to_string()))?;
        Ok(Self::from_root(doi, root))
    }

    /// Reads a unixref document on behalf of a lookup for `doi`. The
    /// document's own identifier is kept when present; registry error
    /// records carry no `doi_data`, so they fall back to `doi`.
    pub fn parse_with_doi(xml: &str, doi: &str) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        let doi = find_doi(&root).unwrap_or_else(|| doi.to_string());
        Ok(Self::from_root(doi, root))
    }

    fn from_root(doi: String, root: XmlElement) -> Self {
        let article = doi_record(&root)
            .and_then(|record| record.find("crossref/journal"))
            .and_then(|journal| {
                let element = journal.child("journal_article")?.clone();
                let issue_dates = journal
                    .find_all("journal_issue/publication_date")
                    .into_iter()
                    .cloned()
                    .collect();
                Some(UnixrefArticle {
                    element,
                    issue_dates,
                })
            });
        Self { doi, root, article }
    }

    fn crossref(&self) -> Result<&XmlElement> {
        doi_record(&self.root)
            .and_then(|record| record.child("crossref"))
            .ok_or_else(|| MarkError::structural("no doi_record/crossref element"))
    }
}

impl Record for Unixref {
    fn doi(&self) -> &str {
        &self.doi
    }

    fn record_type(&self) -> Result<RecordType> {
        let crossref = self.crossref()?;
        let body = crossref
            .elements()
            .next()
            .ok_or_else(|| MarkError::structural("empty crossref element"))?;
        Ok(RecordType::from_unixref_element(&body.name))
    }

    fn journal_article(&self) -> Result<&dyn Article> {
        self.article
            .as_ref()
            .map(|article| article as &dyn Article)
            .ok_or_else(|| MarkError::structural("no crossref/journal/journal_article element"))
    }
}

impl Article for UnixrefArticle {
    fn contributors(&self) -> Result<Vec<String>> {
        let Some(contributors) = self.element.child("contributors") else {
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        for contributor in contributors.elements() {
            match contributor.name.as_str() {
                "person_name" => names.push(person_name(contributor)?),
                "organization" => {
                    let name = contributor.text();
                    if name.is_empty() {
                        return Err(MarkError::structural("empty organization contributor"));
                    }
                    names.push(name);
                }
                _ => {}
            }
        }
        Ok(names)
    }

    fn titles(&self) -> Result<Vec<String>> {
        Ok(self
            .element
            .find_all("titles/title")
            .into_iter()
            .map(XmlElement::text)
            .filter(|title| !title.is_empty())
            .collect())
    }

    fn publication_date(&self) -> Result<String> {
        let own = self.element.children_named("publication_date").collect::<Vec<_>>();
        let candidates = if own.is_empty() {
            self.issue_dates.iter().collect()
        } else {
            own
        };

        let date = candidates
            .iter()
            .find(|date| date.attr("media_type") == Some("print"))
            .or_else(|| candidates.first())
            .ok_or_else(|| MarkError::structural("no publication_date element"))?;

        let year = date
            .child("year")
            .ok_or_else(|| MarkError::structural("publication_date without <year>"))
            .and_then(|year| date_part::<i32>(year, "year"))?;
        let month = date
            .child("month")
            .map(|month| date_part::<u32>(month, "month"))
            .transpose()?;
        let day = date
            .child("day")
            .map(|day| date_part::<u32>(day, "day"))
            .transpose()?;

        iso_date(year, month, day)
    }
}

fn doi_record(root: &XmlElement) -> Option<&XmlElement> {
    if root.name == "doi_record" {
        return Some(root);
    }
    root.descendants("doi_record").into_iter().next()
}

fn find_doi(root: &XmlElement) -> Option<String> {
    root.descendants("doi_data")
        .into_iter()
        .find_map(|data| data.child("doi"))
        .or_else(|| root.descendants("doi").into_iter().next())
        .map(XmlElement::text)
        .filter(|doi| !doi.is_empty())
}

fn person_name(person: &XmlElement) -> Result<String> {
    let surname = person
        .child("surname")
        .map(XmlElement::text)
        .filter(|surname| !surname.is_empty())
        .ok_or_else(|| MarkError::structural("person_name without <surname>"))?;

    match person
        .child("given_name")
        .map(XmlElement::text)
        .filter(|given| !given.is_empty())
    {
        Some(given) => Ok(format!("{given} {surname}")),
        None => Ok(surname),
    }
}

fn date_part<T: std::str::FromStr>(element: &XmlElement, part: &str) -> Result<T> {
    let text = element.text();
    text.parse::<T>()
        .map_err(|_| MarkError::structural(format!("non-numeric {part} {text:?}")))
}
