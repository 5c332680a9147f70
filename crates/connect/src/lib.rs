//! Lektora Connect
//!
//! Thin async clients for the platform's external collaborators: object
//! storage for lesson media, transactional email, and the LLM tutor endpoint.
//! Each wrapper validates nothing beyond the HTTP exchange; business rules
//! stay in `lektora-core`.

pub mod error;
pub mod mail;
pub mod media;
pub mod tutor;

pub use error::{Error, Result};
pub use mail::Mailer;
pub use media::MediaStore;
pub use tutor::TutorClient;
