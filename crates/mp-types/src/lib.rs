#![forbid(unsafe_code)]
#![doc = "Common types and error codes for the mp arbitrary-precision workspace."]

pub mod error;

pub use error::*;
