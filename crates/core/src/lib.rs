//! Core types shared by the netmotif crates.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

#![forbid(unsafe_code)]

pub mod error;
pub mod result;

pub use error::{Error, ErrorKind};
pub use result::{OptionExt, Result, ResultExt};
