pub mod config;
pub mod controls;
pub mod models;
