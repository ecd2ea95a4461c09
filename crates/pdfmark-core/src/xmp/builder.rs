//! Record to XMP packet transformation.
//!
//! A journal-article record becomes one packet holding a Dublin Core block
//! and a PRISM block. Anything else becomes a [`MarkFailure`] carrying the
//! record's DOI, so callers can report it against the lookup they made.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::PacketConfig;
use crate::error::{FailureCode, Result};
use crate::model::{Record, RecordType};
use crate::xmp::packet::Packet;
use crate::xmp::schema::{XmpSchema, dc, prism};
use crate::xmp::writer::XmpWriter;

pub const UNKNOWN_RECORD_TYPE: &str =
    "Could not determine if record has any journal article metadata.";
pub const NO_JOURNAL_METADATA: &str = "No journal article metadata for identifier.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkFailure {
    pub doi: String,
    pub code: FailureCode,
    pub message: String,
}

impl std::fmt::Display for MarkFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} (code {})", self.doi, self.message, self.code.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    Success(Packet),
    Failure(MarkFailure),
}

impl MarkOutcome {
    pub fn packet(&self) -> Option<&Packet> {
        match self {
            Self::Success(packet) => Some(packet),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&MarkFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> std::result::Result<Packet, MarkFailure> {
        match self {
            Self::Success(packet) => Ok(packet),
            Self::Failure(failure) => Err(failure),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkBuilder {
    config: PacketConfig,
}

impl MarkBuilder {
    pub fn new(config: PacketConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PacketConfig {
        &self.config
    }

    /// Builds the packet for one fetched record. Never panics or returns an
    /// error; every problem ends up in [`MarkOutcome::Failure`].
    pub fn on_metadata(&self, record: &dyn Record) -> MarkOutcome {
        let doi = record.doi();

        let outcome = match record.record_type() {
            Err(e) => {
                debug!(doi, error = %e, "record type query failed");
                failure(doi, FailureCode::CrummyMetadata, UNKNOWN_RECORD_TYPE)
            }
            Ok(RecordType::Journal) => match self.build(record) {
                Ok(packet) => MarkOutcome::Success(packet),
                Err(e) => failure(doi, FailureCode::BuildException, e.to_string()),
            },
            Ok(_) => failure(doi, FailureCode::CrummyMetadata, NO_JOURNAL_METADATA),
        };

        match &outcome {
            MarkOutcome::Success(packet) => debug!(doi, bytes = packet.len(), "built XMP packet"),
            MarkOutcome::Failure(f) => {
                warn!(doi, code = f.code.code(), message = %f.message, "no XMP packet")
            }
        }
        outcome
    }

    fn build(&self, record: &dyn Record) -> Result<Packet> {
        let doi = record.doi();
        let article = record.journal_article()?;
        let contributors = article.contributors()?;
        let titles = article.titles()?;
        let date = article.publication_date()?;

        let mut dublin_core = XmpSchema::dublin_core();
        dublin_core.set_list(dc::CREATOR, contributors);
        dublin_core.set_list(dc::TITLE, titles);
        dublin_core.set_property(dc::DATE, date.as_str());
        dublin_core.set_property(dc::IDENTIFIER, doi);

        let mut publishing = XmpSchema::prism();
        publishing.set_property(prism::PUBLICATION_DATE, date);
        publishing.set_property(prism::DOI, doi);

        let mut writer = XmpWriter::new(Vec::new(), &self.config)?;
        writer.add_rdf_description(&dublin_core)?;
        writer.add_rdf_description(&publishing)?;
        Packet::new(writer.close()?)
    }
}

fn failure(doi: &str, code: FailureCode, message: impl Into<String>) -> MarkOutcome {
    MarkOutcome::Failure(MarkFailure {
        doi: doi.to_string(),
        code,
        message: message.into(),
    })
}
