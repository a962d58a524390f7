use ab_glyph::FontArc;
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dims_render::{find_system_font, load_font};
use dims_trial::TrialConfig;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

/// Runs one dimensions trial and prints its data as JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "dimensions-task")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Trial configuration file (JSON)
    #[arg(required_unless_present = "stdin")]
    pub config: Option<PathBuf>,

    /// Read the trial configuration from standard input
    #[arg(long, conflicts_with = "config")]
    pub stdin: bool,

    /// Font file for the task cue; common system fonts are tried otherwise
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Run in a window instead of borderless fullscreen
    #[arg(long)]
    pub windowed: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn load_trial(&self) -> Result<TrialConfig> {
        match &self.config {
            Some(path) if !self.stdin => {
                let file = File::open(path)
                    .with_context(|| format!("opening trial config {}", path.display()))?;
                TrialConfig::from_reader(BufReader::new(file))
                    .with_context(|| format!("reading trial config {}", path.display()))
            }
            _ => TrialConfig::from_reader(io::stdin().lock())
                .context("reading trial config from stdin"),
        }
    }

    /// Font for the cue. Only a trial that shows a cue requires one.
    pub fn resolve_font(&self, needs_cue: bool) -> Result<Option<FontArc>> {
        if let Some(path) = &self.font {
            return load_font(path).map(Some);
        }
        if !needs_cue {
            return Ok(None);
        }
        find_system_font()
            .map(Some)
            .ok_or_else(|| anyhow!("the task cue needs a font; none found, pass --font"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_and_flags() {
        let cli = Cli::try_parse_from(["dimensions-task", "trial.json", "--windowed", "-v"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("trial.json")));
        assert!(cli.windowed);
        assert!(cli.verbose);
        assert!(!cli.stdin);
        assert!(cli.font.is_none());
    }

    #[test]
    fn config_source_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["dimensions-task"]).is_err());
        assert!(Cli::try_parse_from(["dimensions-task", "--stdin"]).is_ok());
        assert!(Cli::try_parse_from(["dimensions-task", "a.json", "--stdin"]).is_err());
    }

    #[test]
    fn no_font_needed_without_cue() {
        let cli = Cli::try_parse_from(["dimensions-task", "a.json"]).unwrap();
        assert!(cli.resolve_font(false).unwrap().is_none());
    }

    #[test]
    fn explicit_font_must_load() {
        let cli =
            Cli::try_parse_from(["dimensions-task", "a.json", "--font", "/nonexistent.ttf"]).unwrap();
        assert!(cli.resolve_font(false).is_err());
    }

    #[test]
    fn loads_demo_trial() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/arrows.json");
        let cli = Cli::try_parse_from(["dimensions-task", path]).unwrap();
        let trial = cli.load_trial().unwrap().validate().unwrap();
        assert_eq!(trial.valid_keys, vec![37, 39]);
        assert_eq!(trial.config.task_name, "1");
    }
}
