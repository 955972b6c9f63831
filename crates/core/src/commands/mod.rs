//! Command schema loading and argument vector construction.

pub mod args;
pub mod catalog;

pub use args::{build_cli_args, command_tokens, tokenize_direct_line};
pub use catalog::CommandCatalog;
