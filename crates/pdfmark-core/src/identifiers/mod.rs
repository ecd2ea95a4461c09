pub mod doi;

pub use doi::Doi;
