mod processing_backend;

pub use processing_backend::{BackendReport, ProcessingBackend, ProcessingRequest};
