#![doc = include_str!("../README.md")]

pub mod calls;
pub mod cli;
pub mod convert;
pub mod plink;
pub mod report;
pub mod smart_reader;

pub use convert::{ConversionConfig, ConversionSummary, convert_calls_file};
