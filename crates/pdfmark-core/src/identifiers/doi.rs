use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MarkError, Result};

const RESOLVER_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];

/// A validated DOI, as typed by a user on the command line.
///
/// Records keep their identifier verbatim; this type only exists to check
/// and normalize identifiers that come from outside a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Doi {
    pub raw: String,
    pub normalized: String,
    pub url: String,
}

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let stripped = RESOLVER_PREFIXES
            .iter()
            .find_map(|prefix| input.strip_prefix(prefix))
            .or_else(|| {
                input
                    .get(..4)
                    .filter(|scheme| scheme.eq_ignore_ascii_case("doi:"))
                    .map(|_| input[4..].trim_start())
            })
            .unwrap_or(input);

        let Some((prefix, suffix)) = stripped.split_once('/') else {
            return Err(MarkError::InvalidDoi(input.to_string()));
        };
        let registrant = prefix.strip_prefix("10.").unwrap_or_default();
        if registrant.is_empty()
            || !registrant.chars().all(|c| c.is_ascii_digit() || c == '.')
            || suffix.is_empty()
        {
            return Err(MarkError::InvalidDoi(input.to_string()));
        }

        let normalized = stripped.to_lowercase();
        let url = format!("https://doi.org/{normalized}");

        Ok(Self {
            raw: input.to_string(),
            normalized,
            url,
        })
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_doi() {
        let doi = Doi::parse("10.1103/PhysRev.47.777").unwrap();
        assert_eq!(doi.normalized, "10.1103/physrev.47.777");
        assert_eq!(doi.url, "https://doi.org/10.1103/physrev.47.777");
        assert_eq!(doi.raw, "10.1103/PhysRev.47.777");
    }

    #[test]
    fn resolver_urls_are_stripped() {
        for input in [
            "https://doi.org/10.1000/xyz123",
            "http://dx.doi.org/10.1000/xyz123",
        ] {
            assert_eq!(Doi::parse(input).unwrap().normalized, "10.1000/xyz123");
        }
    }

    #[test]
    fn doi_scheme_any_case() {
        assert_eq!(Doi::parse("doi:10.1000/a").unwrap().normalized, "10.1000/a");
        assert_eq!(Doi::parse("DOI: 10.1000/a").unwrap().normalized, "10.1000/a");
    }

    #[test]
    fn display_uses_normalized_form() {
        let doi = Doi::parse("  10.1000/ABC ").unwrap();
        assert_eq!(doi.to_string(), "10.1000/abc");
    }

    #[test]
    fn rejects_malformed() {
        for input in ["", "not-a-doi", "10.1000", "10.1000/", "10./x", "11.1000/x", "10.ab/x"] {
            assert!(
                matches!(Doi::parse(input), Err(MarkError::InvalidDoi(_))),
                "{input:?} should be rejected"
            );
        }
    }
}
