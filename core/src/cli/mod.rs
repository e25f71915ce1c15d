//! Text front end: command-line parsing and the assignment mini-language.

pub mod assign;
pub mod parse;

pub use assign::{parse_assignments, split_assignments};
pub use parse::{canonical_command, parse_args, split_line};
