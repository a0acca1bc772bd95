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

//! Command-line command processing.
//!
//! Each [`AppCommand`] maps onto one library operation. Results are printed
//! to standard output, either as a readable listing or as JSON.

use anyhow::{Context, Result};
use clap::Subcommand;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::{
    config::{self, AppConfig},
    db,
    import::{self, ImportRequest},
    media,
    model::{
        TimelineEntry, Vinyl,
        sort::{self, SortDirection, SortMode},
    },
    probe::Prober,
    util::format::{format_duration, format_played_at},
};

#[derive(Debug, Subcommand)]
pub(crate) enum AppCommand {
    /// Import audio files (or directories of them) as a new vinyl.
    Import {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        artist: String,
        #[arg(long, default_value = "")]
        cover: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List every vinyl in the library.
    List {
        #[arg(long, value_enum)]
        sort: Option<SortMode>,
        #[arg(long, value_enum)]
        direction: Option<SortDirection>,
    },

    /// Show one vinyl with its tracks.
    Show { id: i64 },

    /// Overwrite the title, artist and cover of a vinyl.
    Edit {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        artist: String,
        #[arg(long, default_value = "")]
        cover: String,
    },

    /// Mark a vinyl as played now.
    Play { id: i64 },

    /// Delete a vinyl and all of its tracks.
    Delete { id: i64 },

    /// Print a cover image as a data URL.
    CoverUrl { path: PathBuf },

    /// Print an audio file as a data URL.
    AudioUrl { path: PathBuf },
}

/// Bundles what the command handlers need.
pub(crate) struct CommandContext<'a> {
    pub(crate) config: &'a mut AppConfig,
    pub(crate) conn: &'a mut Connection,
    pub(crate) prober: &'a dyn Prober,
    pub(crate) json: bool,
}

/// Orchestrates the execution of a single command.
pub(crate) fn handle_command(ctx: &mut CommandContext, command: AppCommand) -> Result<()> {
    match command {
        AppCommand::Import {
            title,
            artist,
            cover,
            paths,
        } => {
            let track_paths = expand_track_paths(&paths)?;
            if track_paths.is_empty() {
                anyhow::bail!("No audio files found");
            }
            check_cover(&cover);

            let request = ImportRequest {
                track_paths,
                title,
                artist,
                cover_path: cover,
            };
            let vinyl = import::import_album(ctx.conn, ctx.prober, &request)
                .context("Import failed, nothing was saved")?;
            print_vinyl(&vinyl, ctx.json)?;
        }
        AppCommand::List {
            sort: mode,
            direction,
        } => {
            if mode.is_some() || direction.is_some() {
                ctx.config.sort_mode = mode.unwrap_or(ctx.config.sort_mode);
                ctx.config.sort_direction = direction.unwrap_or(ctx.config.sort_direction);
                if let Err(e) = config::save_config(ctx.config) {
                    warn!(error = %e, "Failed to save sort preference");
                }
            }

            let mut vinyls = db::fetch_all_vinyls(ctx.conn)?;
            sort::sort_vinyls(&mut vinyls, ctx.config.sort_mode, ctx.config.sort_direction);
            print_library(&vinyls, ctx.json)?;
        }
        AppCommand::Show { id } => {
            let vinyl = db::fetch_vinyl(ctx.conn, id)?;
            print_vinyl(&vinyl, ctx.json)?;
        }
        AppCommand::Edit {
            id,
            title,
            artist,
            cover,
        } => {
            check_cover(&cover);
            db::update_vinyl(ctx.conn, id, &title, &artist, &cover)?;
        }
        AppCommand::Play { id } => import::mark_played(ctx.conn, id)?,
        AppCommand::Delete { id } => import::delete_album(ctx.conn, id)?,
        AppCommand::CoverUrl { path } => println!("{}", media::image_data_url(&path)?),
        AppCommand::AudioUrl { path } => println!("{}", media::audio_data_url(&path)?),
    }

    Ok(())
}

/// Turns the command line paths into absolute audio file paths.
///
/// Files are taken as given. Directories are walked and their audio files
/// appended in path order.
fn expand_track_paths(paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut tracks = vec![];

    for path in paths {
        let path = path
            .canonicalize()
            .with_context(|| format!("Cannot access {}", path.display()))?;

        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(&path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && media::is_audio_file(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            tracks.extend(found.iter().map(|p| path_string(p)).collect::<Result<Vec<_>>>()?);
        } else {
            tracks.push(path_string(&path)?);
        }
    }

    Ok(tracks)
}

fn path_string(path: &Path) -> Result<String> {
    Ok(path.to_str().context("Path contains invalid UTF-8")?.to_string())
}

fn check_cover(cover: &str) {
    if cover.trim().is_empty() {
        return;
    }

    let ext = Path::new(cover)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !media::IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        warn!(cover, "Cover does not look like a supported image");
    }
}

fn print_library(vinyls: &[Vinyl], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(vinyls)?);
        return Ok(());
    }

    for vinyl in vinyls {
        println!(
            "{:>4}  {} - {}  [{} tracks, {}]  played {}",
            vinyl.id,
            vinyl.artist,
            vinyl.title,
            vinyl.tracks().count(),
            format_duration(vinyl.total_duration()),
            format_played_at(vinyl.played_at),
        );
    }

    Ok(())
}

fn print_vinyl(vinyl: &Vinyl, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(vinyl)?);
        return Ok(());
    }

    println!("{} - {} (#{})", vinyl.artist, vinyl.title, vinyl.id);
    if !vinyl.cover_path.is_empty() {
        println!("Cover: {}", vinyl.cover_path);
    }
    println!("Last played: {}", format_played_at(vinyl.played_at));

    let timeline = vinyl.timeline();
    for disc in &vinyl.discs {
        println!("Disc {}", disc.number);
        for track in &disc.tracks {
            let start = track_start(&timeline, disc.number, track.ordering)
                .map(|start| format!(" @ {}", format_duration(start)))
                .unwrap_or_default();
            println!(
                "  {:>2}. {}  {}{}",
                track.ordering,
                track.title,
                format_duration(track.duration),
                start
            );
        }
    }
    println!("Total: {}", format_duration(vinyl.total_duration()));

    Ok(())
}

/// Offset of a track on the first disc's timeline.
///
/// Orderings are 1-based; anything outside the timeline yields `None`.
fn track_start(timeline: &[TimelineEntry], disc_number: i32, ordering: i32) -> Option<f64> {
    if disc_number != 1 {
        return None;
    }

    let index = usize::try_from(ordering).ok()?.checked_sub(1)?;
    timeline.get(index).map(|entry| entry.start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn directories_expand_to_sorted_audio_files() {
        let dir = TempDir::new().unwrap();
        for name in ["02 b.mp3", "01 a.flac", "cover.jpg", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let tracks = expand_track_paths(&[dir.path().to_path_buf()]).unwrap();

        let names: Vec<_> = tracks
            .iter()
            .map(|t| Path::new(t).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["01 a.flac", "02 b.mp3"]);
        assert!(tracks.iter().all(|t| Path::new(t).is_absolute()));
    }

    #[test]
    fn track_start_handles_out_of_range_orderings() {
        let entry = |index: usize, start: f64| TimelineEntry {
            index,
            start,
            end: start + 10.0,
            duration: 10.0,
        };
        let timeline = vec![entry(0, 0.0), entry(1, 10.0)];

        assert_eq!(track_start(&timeline, 1, 2), Some(10.0));
        assert_eq!(track_start(&timeline, 1, 0), None);
        assert_eq!(track_start(&timeline, 1, -3), None);
        assert_eq!(track_start(&timeline, 1, 3), None);
        assert_eq!(track_start(&timeline, 2, 1), None);
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(expand_track_paths(&[PathBuf::from("/no/such/album")]).is_err());
    }
}
