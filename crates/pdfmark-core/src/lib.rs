//! pdfmark core: CrossRef records in, XMP metadata packets out.
//!
//! ```no_run
//! use pdfmark_core::{MarkBuilder, MarkOutcome, Unixref};
//!
//! # fn main() -> pdfmark_core::Result<()> {
//! let record = Unixref::parse(&std::fs::read_to_string("record.xml")?)?;
//! match MarkBuilder::default().on_metadata(&record) {
//!     MarkOutcome::Success(packet) => std::fs::write("record.xmp", packet.as_bytes())?,
//!     MarkOutcome::Failure(failure) => eprintln!("{failure}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod identifiers;
pub mod model;
pub mod xmp;

pub use config::{MarkConfig, PacketConfig};
pub use error::{FailureCode, MarkError, Result};
pub use identifiers::Doi;
pub use model::{Article, CrossRefWork, Record, RecordSummary, RecordType, Unixref};
pub use xmp::{MarkBuilder, MarkFailure, MarkOutcome, Packet};
