use std::io::{self, BufRead, Write};

use clap::Parser;
use rmoderate::{ModerationConfig, ModerationEngine, ModerationLevel};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "moderate", version, about = "Moderate text from stdin or --text, one JSON result per line")]
struct Cli {
    /// Moderation level: off, relaxed, moderate or strict (overrides MODERATION_LEVEL)
    #[arg(long)]
    level: Option<ModerationLevel>,

    /// Replace matches with the word's first alternative where one exists
    #[arg(long)]
    preserve: bool,

    /// Moderate this text instead of reading stdin
    #[arg(long)]
    text: Option<String>,
}

fn emit(engine: &ModerationEngine, text: &str, preserve: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let result = engine.moderate_sentence(text, preserve);
    serde_json::to_writer(&mut *out, &result)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ModerationConfig::from_env()?;
    if let Some(level) = cli.level {
        config.level = level;
    }
    let engine = config.build_engine()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(text) = cli.text {
        return emit(&engine, &text, cli.preserve, &mut out);
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        emit(&engine, &line, cli.preserve, &mut out)?;
    }

    Ok(())
}
