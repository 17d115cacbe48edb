pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod scoring;
