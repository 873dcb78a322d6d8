use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use emlsift_core::{CollisionPolicy, SideEffectOptions};
use log::LevelFilter;

use crate::output::OutputFormat;

/// Extract sender, recipient, date, originating IP and body links from a
/// directory of `.eml` files.
///
/// Results go to stdout as CSV (default) or JSON. When any file action
/// (`--eml2html-to`, `--rename-by-header`, `--rename-by-header-to`) is
/// requested, nothing is printed to stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "emlsift", author, version)]
pub struct Cli {
    /// Directory holding the `.eml` files.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Descend into subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Print JSON instead of CSV.
    #[arg(long, conflicts_with = "csv")]
    pub json: bool,

    /// Print CSV (the default).
    #[arg(long)]
    pub csv: bool,

    /// Write each message's HTML body under PATH, mirroring the input layout.
    #[arg(long = "eml2html-to", value_name = "PATH")]
    pub eml2html_to: Option<PathBuf>,

    /// Rename each file in place to `<date>_<time> <subject>.eml`.
    #[arg(long = "rename-by-header")]
    pub rename_by_header: bool,

    /// Copy each file under PATH with the canonical name instead of renaming it.
    #[arg(long = "rename-by-header-to", value_name = "PATH")]
    pub rename_by_header_to: Option<PathBuf>,

    /// Number of worker threads (defaults to available parallelism).
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<NonZeroUsize>,

    /// Add ` (n)` to a canonical name that is already taken instead of overwriting.
    #[arg(long)]
    pub keep_collisions: bool,

    /// More log output on stderr; repeat for debug and trace.
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// No log output at all.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Csv
        }
    }

    pub fn side_effect_options(&self) -> SideEffectOptions {
        SideEffectOptions {
            html_out: self.eml2html_to.clone(),
            rename_in_place: self.rename_by_header,
            copy_to: self.rename_by_header_to.clone(),
            collision: if self.keep_collisions {
                CollisionPolicy::Suffix
            } else {
                CollisionPolicy::Overwrite
            },
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Off;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("emlsift").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn csv_is_the_default_format() {
        let cli = parse(&["mail"]);
        assert_eq!(cli.output_format(), OutputFormat::Csv);
        assert!(!cli.side_effect_options().is_active());
        assert_eq!(cli.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn json_and_csv_conflict() {
        let result = Cli::try_parse_from(["emlsift", "--json", "--csv", "mail"]);
        assert!(result.is_err());
    }

    #[test]
    fn file_actions_map_to_side_effect_options() {
        let cli = parse(&[
            "-r",
            "--eml2html-to",
            "html",
            "--rename-by-header",
            "--rename-by-header-to",
            "copies",
            "--keep-collisions",
            "mail",
        ]);
        let options = cli.side_effect_options();
        assert!(cli.recursive);
        assert_eq!(options.html_out, Some(PathBuf::from("html")));
        assert!(options.rename_in_place);
        assert_eq!(options.copy_to, Some(PathBuf::from("copies")));
        assert_eq!(options.collision, CollisionPolicy::Suffix);
    }

    #[test]
    fn verbosity_counts_and_quiet() {
        assert_eq!(parse(&["-vv", "mail"]).log_level(), LevelFilter::Debug);
        assert_eq!(parse(&["-vvvv", "mail"]).log_level(), LevelFilter::Trace);
        assert_eq!(parse(&["-q", "mail"]).log_level(), LevelFilter::Off);
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(Cli::try_parse_from(["emlsift", "-j", "0", "mail"]).is_err());
        assert_eq!(parse(&["-j", "3", "mail"]).workers, NonZeroUsize::new(3));
    }
}
