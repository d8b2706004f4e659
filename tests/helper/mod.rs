//! Shared test utilities

#![allow(dead_code)]

pub mod archive;
pub mod registry;

pub use archive::*;
pub use registry::*;
