//! Integration tests for offgrid

mod cli_tests;
mod command_tests;
mod lifecycle_tests;
