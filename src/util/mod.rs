//! Utility types and functions

pub mod config;
pub mod logger;
