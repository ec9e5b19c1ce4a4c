//! ngrip: interactive recursive pattern search.
//!
//! Usage:
//!   ngrip [options] PATTERN [PATH]

use clap::Parser;
use ngrip::cli::Cli;
use ngrip::config;
use ngrip::engine::Engine;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The TUI owns stdout/the terminal, so logs go to stderr only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ngrip=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let editor = config::editor_basename();
    let config_file = config::load_config_file(&editor)?;

    let mut engine = Engine::start(&cli, &config_file)?;
    tracing::info!(pattern = %cli.pattern, root = %cli.root().display(), "starting search");

    let ui_result = ngrip::ui::run(&mut engine);
    engine.shutdown()?;

    ui_result?;
    Ok(())
}
