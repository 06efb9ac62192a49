//! CLI module containing argument parsing, configuration and output tables

pub mod api;
pub(crate) mod args;
pub(crate) mod config;
pub(crate) mod display;

#[cfg(test)]
mod tests;
