pub mod config;
pub mod marker;
