//! Data models for the application

mod file_record;

pub use file_record::*;
