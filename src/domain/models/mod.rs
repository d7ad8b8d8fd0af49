pub mod file_record;
pub mod level;
pub mod preview;
pub mod size;
