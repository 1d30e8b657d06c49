pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod form;
pub mod publish;
pub mod snippet;
pub mod utils;
