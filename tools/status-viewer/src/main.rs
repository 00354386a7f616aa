//! status-viewer - inspect chunk allocator status dumps
//!
//! Commands:
//! - `status-viewer view <file>` - Page through a dump as a coloured grid
//! - `status-viewer decode <file>` - Print every status byte as text
//! - `status-viewer demo --out <file>` - Replay the reference sequence and write its dump

mod config;
mod demo;
mod grid;
mod keys;
#[cfg(unix)]
mod term;
mod tui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chunk_allocator::{dump, StatusTable, CHUNKS_PER_STATUS};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::FileConfig;

#[derive(Parser)]
#[command(name = "status-viewer")]
#[command(version)]
#[command(about = "Inspect chunk allocator status dumps", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Page through a dump interactively
    View {
        /// Status dump file
        file: PathBuf,

        /// Status bytes per page
        #[arg(short = 'n', long = "statuses")]
        statuses: Option<usize>,

        /// Status bytes per row
        #[arg(short, long)]
        columns: Option<usize>,
    },

    /// Print a dump as text, one status byte per line
    Decode {
        /// Status dump file
        file: PathBuf,

        /// Stop after this many status bytes
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Replay the reference allocate/release sequence and write its dump
    Demo {
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::View {
            file,
            statuses,
            columns,
        } => {
            let config = config.with_overrides(statuses, columns)?;
            view(&file, &config)?;
        }

        Commands::Decode { file, limit } => {
            decode(&file, limit)?;
        }

        Commands::Demo { out } => {
            demo::run(&config.region, &out)?;
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Vec<u8>> {
    let data = dump::load_status(path)
        .with_context(|| format!("Failed to read status dump {}", path.display()))?;
    if data.is_empty() {
        anyhow::bail!("Status dump {} is empty", path.display());
    }
    log::info!("{}: {} status bytes", path.display(), data.len());
    Ok(data)
}

#[cfg(unix)]
fn view(path: &Path, config: &FileConfig) -> Result<()> {
    use std::io::{self, Read, Write};

    use crate::grid::{render_page, Pager};
    use crate::keys::{read_key, Key};

    let data = load(path)?;
    let mut pager = Pager::new(data.len(), config.viewer.statuses_per_page);

    let _raw = term::RawMode::enable().context("Failed to configure terminal")?;
    let _screen = term::AlternateScreen::enter().context("Failed to switch screen")?;

    let mut stdout = io::stdout();
    let mut input = io::stdin().lock().bytes().map_while(|byte| byte.ok());

    loop {
        let frame = render_page(&data, &pager, config.viewer.columns);
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()?;

        match read_key(&mut input) {
            Some(Key::Quit) | None => break,
            Some(Key::Right) => pager.next(),
            Some(Key::Left) => pager.prev(),
            Some(Key::Other) => {}
        }
    }

    Ok(())
}

#[cfg(not(unix))]
fn view(_path: &Path, _config: &FileConfig) -> Result<()> {
    anyhow::bail!("Interactive view needs a unix terminal; use `decode` instead")
}

/// One decoded line: index, raw bits, then the four codes in chunk order
fn decode_line(index: usize, byte: u8) -> String {
    let codes: Vec<String> = StatusTable::new([byte])
        .iter()
        .map(|status| format!("{:<5}", status))
        .collect();
    format!("{:>5}  {:08b}  {}", index, byte, codes.join(" "))
}

fn decode(path: &Path, limit: Option<usize>) -> Result<()> {
    let data = load(path)?;
    let shown = limit.unwrap_or(data.len()).min(data.len());

    for (index, &byte) in data.iter().take(shown).enumerate() {
        println!("{}", decode_line(index, byte));
    }

    let table = StatusTable::new(&data[..]);
    println!(
        "\n{} {} chunks, {} free, {} in use",
        "Σ".cyan(),
        data.len() * CHUNKS_PER_STATUS,
        table.count_free().to_string().green(),
        (table.len() - table.count_free()).to_string().red()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line() {
        assert_eq!(
            decode_line(0, 0b10_10_10_01),
            "    0  10101001  TAG_A TAG_B TAG_B TAG_B"
        );
        assert_eq!(
            decode_line(12, 0b00_11_00_00),
            "   12  00110000  FREE  FREE  TAG_C FREE "
        );
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["status-viewer", "view", "dump.bin", "-n", "32", "-c", "4"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::View {
                statuses: Some(32),
                columns: Some(4),
                ..
            }
        ));

        let cli = Cli::try_parse_from(["status-viewer", "demo", "--out", "x.bin", "--config", "v.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("v.toml")));
        assert!(matches!(cli.command, Commands::Demo { .. }));

        assert!(Cli::try_parse_from(["status-viewer", "decode"]).is_err());
    }
}
