// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # Vinyl.
//!
//! A personal album library. Albums ("vinyls") are imported from audio files
//! on disk, their track durations are probed with `ffprobe`, and the result
//! is kept in a local SQLite database.
//!
//! ## Architecture
//!
//! * **Import pipeline**: [`import`] opens one transaction per album and
//!   hands the track paths to a fixed pool of probe worker threads, which
//!   report back over channels. Any failure rolls the whole album back.
//! * **Data access**: [`db`] owns the schema and rebuilds the vinyl, disc and
//!   track graph for reads.
//! * **Front end**: a command line interface dispatches to the library
//!   operations through [`actions::commands`].
//!
//! The database connection is opened once here and passed explicitly to
//! everything that needs it.

mod actions;
mod config;
mod db;
mod error;
mod import;
mod media;
mod model;
mod probe;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    actions::commands::{AppCommand, CommandContext, handle_command},
    probe::FfprobeProber,
};

#[derive(Debug, Parser)]
#[command(name = "vinyl", version, about = "A personal vinyl album library")]
struct Cli {
    /// Database file, overriding the configured one.
    #[arg(long, global = true)]
    database: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: AppCommand,
}

/// The entry point of the application.
///
/// Loads the configuration, opens the database, and runs the requested
/// command, returning an error if any part of it fails.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = config::load_config();
    let database_file = cli
        .database
        .clone()
        .unwrap_or_else(|| config.database_file.clone());

    let mut conn = db::init_db(&database_file).context("Failed to initialise database")?;
    let prober = FfprobeProber::new(config.ffprobe_path.clone());

    let mut ctx = CommandContext {
        config: &mut config,
        conn: &mut conn,
        prober: &prober,
        json: cli.json,
    };

    handle_command(&mut ctx, cli.command).context("Command failed")
}
