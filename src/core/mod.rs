// src/core/mod.rs

pub mod cursor;
pub mod tag;

pub use cursor::TagCursor;
