// src/lib.rs
#![doc = include_str!("../README.md")]

#[macro_use]
pub mod macros;

pub mod api;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod core;
pub mod csv;
pub mod error;
pub mod file;
pub mod log;
pub mod progress;
pub mod stages;
pub mod verify;

pub use error::{HarvestError, Result};
