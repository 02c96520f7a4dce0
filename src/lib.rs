pub mod config;
pub mod debugger;
pub mod error;
pub mod executor;
pub mod parser;
pub mod paths;
