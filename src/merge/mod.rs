//! Fill-gaps merging of two observations of the same entity
//!
//! The receiver is the record being enriched. Scalars are only taken from the
//! other side when the receiver's value is unknown (empty text, `None`, zero or
//! negative numbers). Collections are merged by key. Merging payloads of
//! different media types does nothing.

mod details;
mod media;
pub mod traits;

pub use traits::Merge;
