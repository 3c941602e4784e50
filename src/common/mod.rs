pub mod config;
pub mod errors;
pub mod format;
pub mod permissions;

pub use config::Config;
pub use errors::{FailureKind, FsError, IoResultExt};
