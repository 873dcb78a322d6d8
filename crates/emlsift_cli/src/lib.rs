//! Command-line surface of emlsift: argument parsing, candidate discovery,
//! logger setup and the CSV/JSON output sink.
pub mod cli;
pub mod logging;
pub mod output;
pub mod scan;
