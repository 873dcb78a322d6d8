use std::io::{self, Write};

use anyhow::{Context, Result};
use emlsift_cli::cli::Cli;
use emlsift_cli::{logging, output, scan};
use emlsift_engine::{BatchOrchestrator, BatchSettings};
use engine_logging::engine_info;

fn main() -> Result<()> {
    let cli = Cli::from_args();
    logging::initialize(cli.log_level());

    let paths = scan::collect_candidates(&cli.dir, cli.recursive)
        .with_context(|| format!("cannot read input directory {}", cli.dir.display()))?;

    let side_effects = cli.side_effect_options();
    let mut settings = BatchSettings::new(&cli.dir).with_side_effects(side_effects.clone());
    if let Some(workers) = cli.workers {
        settings = settings.with_workers(workers);
    }
    let report = BatchOrchestrator::new(settings)
        .run(paths)
        .context("batch could not start")?;

    if side_effects.is_active() {
        engine_info!(
            "file actions finished for {} messages; result output skipped",
            report.records.len()
        );
        return Ok(());
    }

    let rendered = output::formatter_for(cli.output_format()).format_records(&report.records)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
