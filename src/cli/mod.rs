pub mod args;
pub mod output;

pub use args::{Cli, OutputFormat};
