//! Integration tests for the Grove tree viewer

mod cli_commands;
mod sled_store;
mod test_utils;
mod tree_walk;
