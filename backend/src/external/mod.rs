//! External API integrations

pub mod document_extraction;

pub use document_extraction::DocumentExtractionClient;
