pub mod builder;
pub mod packet;
pub mod schema;
pub mod writer;

pub use builder::{MarkBuilder, MarkFailure, MarkOutcome};
pub use packet::Packet;
pub use schema::{XmpSchema, XmpValue};
pub use writer::XmpWriter;
