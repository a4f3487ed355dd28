//! Client for the EyeMove real-estate web service
//!
//! Talks to the EyeMove SOAP endpoints for property objects, photos and
//! documents, normalizing both response styles of the service into plain
//! `Result` values.
//!
//! # Features
//!
//! - Object retrieval (full listing and single object)
//! - Photo management (list, show, add, update, delete)
//! - Document management (list, show, add, update, delete)
//! - Envelope composition with per-call authentication headers
//! - Uniform error reporting across both transport styles
//! - Wire diagnostics with credentials redacted
//!
//! # Example
//!
//! ```no_run
//! use eyemove_client::{EyeMoveClient, PhotoOptions};
//!
//! let client = EyeMoveClient::authenticate("user", "secret", "customer");
//!
//! let mut photos = client.photos();
//! let photo_id = photos.add(12, 1, "front.jpg", &std::fs::read("front.jpg")?, &PhotoOptions {
//!     main_photo: Some(true),
//!     ..Default::default()
//! })?;
//! println!("uploaded photo {photo_id}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod config;
pub mod debug;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod response;
pub mod services;
pub mod transport;

pub use client::{Credentials, EyeMoveClient};
pub use config::EyeMoveConfig;
pub use debug::DebugInfo;
pub use error::{EyeMoveError, Result};
pub use fields::{FieldMap, FieldValue};
pub use response::ResponseValue;
pub use services::{
    DocumentOptions, DocumentService, ObjectEndpoint, ObjectService, PhotoOptions, PhotoService,
};
