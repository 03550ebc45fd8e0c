pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod logging;
pub mod pattern;
pub mod rules;
pub mod scan;
pub mod select;
pub mod structure;
pub mod tokens;
pub mod types;
