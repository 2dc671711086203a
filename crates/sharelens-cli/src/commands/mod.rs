//! Subcommand implementations.

pub mod indexed;
pub mod list;
pub mod roots;
pub mod search;
pub mod serve;
