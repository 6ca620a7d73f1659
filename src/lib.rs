//! Upload a Parquet file, get back its schema, footer metadata, first
//! row-group statistics, rows and a numeric summary as one JSON document.

pub mod config;
pub mod error;
pub mod inspect;
pub mod service;

pub use config::ServiceConfig;
pub use error::{ErrorKind, ParseError};
pub use inspect::{parse, try_parse, ParquetReport, ParseOptions, ParseResult};
