//! Application module

pub mod cli;
pub mod sim;
pub mod startup;
