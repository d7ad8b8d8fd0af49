pub mod comparison_dto;
pub mod file_dto;
pub mod session_dto;
