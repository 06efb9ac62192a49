//! CLI module tests
