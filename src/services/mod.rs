//! Per-resource services.
//!
//! One service per resource family, each owning its credentials and
//! transport state. Photos and documents share the file-resource engine in
//! `file`; objects are read-only and live in [`object`].

pub(crate) mod file;

pub mod document;
pub mod object;
pub mod photo;

pub use document::{DocumentOptions, DocumentService};
pub use object::{ObjectEndpoint, ObjectService};
pub use photo::{PhotoOptions, PhotoService};
