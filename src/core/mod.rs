pub mod access;
pub mod app;
pub mod cli;
pub mod config;
pub mod demo;
pub mod extract;
pub mod llm;
pub mod message;
pub mod normalize;
pub mod parser;
pub mod paths;
pub mod prompt;
pub mod quiz;
pub mod records;
pub mod store;
pub mod util;
