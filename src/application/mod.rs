pub mod error;
pub mod pipeline;
pub mod services;
pub mod session_store;
