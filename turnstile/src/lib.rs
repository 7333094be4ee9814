//! Batch driver for decoding predicted dialogue states into SGD-format
//! dialogue files.

pub mod cli;
pub mod parse;
