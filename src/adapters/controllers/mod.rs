pub mod comparison_controller;
pub mod file_controller;
pub mod health_controller;
pub mod session_controller;
