//! Command execution: settings, services and the run report

use std::path::Path;

use tracing::{debug, instrument};

use crate::application::services::{RunOptions, RunReport};
use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;

/// Load settings, then apply the positional input and `--output-dir`.
pub fn resolve_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(input) = &cli.input {
        settings.input = input.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        settings.output_dir = output_dir.clone();
    }
    debug!("resolve_settings: {:?}", settings);
    Ok(settings)
}

/// Options derived from the command-line switches.
pub fn run_options(cli: &Cli) -> RunOptions {
    RunOptions {
        keep_intermediate: cli.keep,
        latex_snippets: cli.latex,
        ignore_dates: cli.no_dates,
    }
}

#[instrument(skip(cli))]
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = resolve_settings(cli)?;
    if cli.show_config {
        output::info(&settings.to_toml()?);
        return Ok(());
    }

    let container = ServiceContainer::new(settings);
    let service = container.render_service();
    output::header(&format!(
        "Rendering {}",
        container.settings.input.display()
    ));
    let report = service.run(&run_options(cli))?;
    print_report(&report, &container.settings.output_dir);

    if report.is_complete() {
        Ok(())
    } else {
        Err(CliError::IncompleteBatch {
            failed: report.failed.into_iter().map(|(name, _)| name).collect(),
        })
    }
}

fn print_report(report: &RunReport, output_dir: &Path) {
    for view in &report.rendered {
        output::success_detail(&format!("{} -> {}", view.name, view.image.display()));
    }
    for (name, reason) in &report.skipped {
        output::skipped(&format!("{name}: {reason}"));
    }
    for (name, error) in &report.failed {
        output::failure(&format!("{name}: {error}"));
    }
    if let Some(path) = &report.snippets {
        output::action("Snippets", &path.display());
    }
    if report.rendered.is_empty() {
        output::warning(&format!("no views rendered into {}", output_dir.display()));
    }
}
