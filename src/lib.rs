//! # dupsweep
//!
//! Finds byte-identical files in a single folder and keeps one copy of each.
//!
//! - **Scan**: list the folder (one level), skip hidden and unreadable
//!   entries, fingerprint every regular file with SHA-256
//! - **Resolve**: in every group of identical files keep the first by name,
//!   then delete the others or move them into a quarantine folder
//! - **History**: every skip and error goes to an append-only log; successful
//!   actions too when asked

pub mod cli;
pub mod common;
pub mod duplicates;
pub mod logging;
