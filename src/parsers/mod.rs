//! Instance file readers.

mod solomon;

pub use solomon::{load_problem, parse_solomon, read_solomon, read_solomon_from, ParseError};
