mod app;
mod cli;
mod keys;

use app::App;
use clap::Parser;
use cli::Cli;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the trial data, so logs go to stderr
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let trial = cli.load_trial()?.validate()?;
    let font = cli.resolve_font(trial.config.task_cue)?;
    info!(
        objects = trial.objects.len(),
        duration_ms = trial.config.trial_duration,
        "trial configuration loaded"
    );

    match App::new(trial, font, cli.windowed).run()? {
        Some(result) => println!("{}", result.to_json_pretty()?),
        None => warn!("no trial data: the window was closed early"),
    }
    Ok(())
}
