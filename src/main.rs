//! Headless Stack Tower runner (default binary).
//!
//! Plays autopilot runs against the simulation core at a fixed 60 Hz tick
//! and prints one summary line per run. Useful for soak testing tuning
//! changes without a renderer.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{LevelFilter, Log, Metadata, Record};

use stack_tower::core::{Autopilot, RecordStore, StackConfig, StackSession};
use stack_tower::store::{load_config, JsonFileStore};
use stack_tower::types::GameMode;

const TICK_SECS: f32 = 1.0 / 60.0;

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging() {
    let level = std::env::var("STACK_LOG")
        .ok()
        .and_then(|s| s.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Warn);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "stack-tower", about = "Headless autopilot runs of the stacking core")]
struct Cli {
    /// Number of runs to play
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Autopilot RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Difficulty preset applied over the config
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Records file (kept in memory when omitted)
    #[arg(long)]
    records: Option<PathBuf>,

    /// Tick limit per run
    #[arg(long, default_value_t = 60 * 60 * 10)]
    max_ticks: u64,

    /// Autopilot aim noise in world units
    #[arg(long, default_value_t = 0.08)]
    jitter: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ModeArg {
    Normal,
    Easy,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => GameMode::Normal,
            ModeArg::Easy => GameMode::Easy,
        }
    }
}

fn build_config(cli: &Cli) -> Result<StackConfig> {
    let base = match &cli.config {
        Some(path) => load_config(path)?,
        None => StackConfig::default(),
    };
    let mut config = base.overlay_env();
    if let Some(mode) = cli.mode {
        config = config.with_mode(mode.into());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let store: Box<dyn RecordStore> = match &cli.records {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(stack_tower::core::MemoryStore::default()),
    };

    let mut session = StackSession::with_store(config, store)?;
    let mut pilot = Autopilot::new(cli.seed, cli.jitter);

    for run in 0..cli.runs {
        if run > 0 {
            session.reset();
        }
        let summary = pilot.play_run(&mut session, TICK_SECS, cli.max_ticks);
        println!(
            "run {:>3}: score {:>4}  best combo {:>3}  ticks {:>7}  {}{}",
            run + 1,
            summary.score,
            summary.best_combo,
            summary.ticks,
            if summary.game_over { "game over" } else { "tick limit" },
            if summary.new_record { "  NEW RECORD" } else { "" },
        );
    }

    let records = session.records();
    println!(
        "high score {}  high combo {}",
        records.high_score, records.high_combo
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("stack-tower").chain(list.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.runs, 1);
        assert_eq!(cli.max_ticks, 36_000);
        assert!(cli.mode.is_none());
        assert!(cli.records.is_none());
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = parse(&[
            "--runs", "3", "--seed", "9", "--mode", "easy", "--records", "r.json", "--max-ticks", "100",
            "--jitter", "0.2",
        ])
        .unwrap();
        assert_eq!(cli.runs, 3);
        assert_eq!(cli.seed, 9);
        assert_eq!(cli.mode, Some(ModeArg::Easy));
        assert_eq!(cli.records, Some(PathBuf::from("r.json")));
        assert_eq!(cli.max_ticks, 100);
        assert_eq!(cli.jitter, 0.2);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse(&["--fast"]).is_err());
        assert!(parse(&["--runs"]).is_err());
        assert!(parse(&["--mode", "hard"]).is_err());
    }

    #[test]
    fn test_mode_flag_applies_preset() {
        let cli = parse(&["--mode", "easy"]).unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.combo_start_gain, 5.0);
    }
}
