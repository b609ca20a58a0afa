//! Command handlers

pub mod backup;
pub mod config;
pub mod image;
pub mod note;
pub mod status;
