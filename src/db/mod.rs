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

//! Data access layer.
//!
//! This module handles all interactions with the SQLite database: schema
//! creation, the row-level writes used by the importer, and reconstruction
//! of the full vinyl graph for read paths.
//!
//! # Tables
//!
//! * `vinyls` - Albums, with an optional cover path and last played time.
//! * `discs` - Numbered sides belonging to a vinyl.
//! * `tracks` - Individual audio files with probed duration and ordering.
//!
//! # Performance
//!
//! Most functions in this module use [`rusqlite::Connection::prepare_cached`]
//! to reduce SQL parsing overhead. The write helpers take a plain
//! [`Connection`] so they can be called with a [`rusqlite::Transaction`],
//! which dereferences to one.

mod model;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    error::LibraryError,
    model::{Disc, Track, TrackMeta, Vinyl},
};

/// Opens a connection to the SQLite database and configures it.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging so readers do not block the
///   importer's write transaction.
/// * **Performance Tuning**: Sets synchronous mode to `NORMAL` and increases the cache size.
/// * **Constraints**: Enforces foreign key integrity.
/// * **Schema**: Executes [`create_schema`] to ensure all tables and indices exist.
///
/// # Errors
///
/// Returns an error if:
/// * The database file cannot be opened.
/// * The initial PRAGMA configurations fail.
/// * The schema initialization fails.
pub(crate) fn init_db(path: &str) -> Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("Failed to open {path}"))?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        anyhow::bail!(
            "Failed to switch to WAL mode. Current mode: {}",
            journal_mode
        );
    }

    conn.execute_batch(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -16000;
    ",
    )?;

    conn.set_prepared_statement_cache_capacity(32);

    create_schema(&conn)?;

    Ok(conn)
}

/// Create the database schema.
///
/// Every statement is `CREATE ... IF NOT EXISTS`, so this is safe to run on
/// each start. The batch is wrapped in a single transaction.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS vinyls (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            cover_path TEXT NOT NULL DEFAULT '',
            played_at INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS discs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            vinyl_id INTEGER NOT NULL,
            number INTEGER NOT NULL,
            FOREIGN KEY (vinyl_id) REFERENCES vinyls (id)
        );

        CREATE INDEX IF NOT EXISTS idx_discs_vinyl_id ON discs (vinyl_id);

        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            disc_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            file_path TEXT NOT NULL,
            duration REAL NOT NULL CHECK (duration >= 0),
            ordering INTEGER NOT NULL,
            UNIQUE (disc_id, ordering),
            FOREIGN KEY (disc_id) REFERENCES discs (id)
        );

        CREATE INDEX IF NOT EXISTS idx_tracks_disc_id ON tracks (disc_id);

        COMMIT;",
    )
    .context("Failed to create schema")
}

/// Inserts a vinyl row with an empty cover path and returns its id.
pub(crate) fn insert_vinyl(
    conn: &Connection,
    title: &str,
    artist: &str,
    played_at: i64,
) -> rusqlite::Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO vinyls (title, artist, cover_path, played_at) VALUES (?1, ?2, '', ?3)",
    )?;
    stmt.execute(params![title, artist, played_at])?;

    Ok(conn.last_insert_rowid())
}

pub(crate) fn update_cover_path(
    conn: &Connection,
    vinyl_id: i64,
    cover_path: &str,
) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached("UPDATE vinyls SET cover_path = ?1 WHERE id = ?2")?;
    stmt.execute(params![cover_path, vinyl_id])?;

    Ok(())
}

/// Inserts a disc for the given vinyl and returns its id.
pub(crate) fn insert_disc(conn: &Connection, vinyl_id: i64, number: i32) -> rusqlite::Result<i64> {
    let mut stmt = conn.prepare_cached("INSERT INTO discs (vinyl_id, number) VALUES (?1, ?2)")?;
    stmt.execute(params![vinyl_id, number])?;

    Ok(conn.last_insert_rowid())
}

/// Inserts a probed track, deriving its ordering from the request index.
pub(crate) fn insert_track(conn: &Connection, disc_id: i64, meta: &TrackMeta) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO tracks (disc_id, title, file_path, duration, ordering)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    stmt.execute(params![
        disc_id,
        meta.title,
        meta.path,
        meta.duration,
        meta.index as i64 + 1
    ])?;

    Ok(())
}

/// Fetches every vinyl in storage order, fully hydrated.
///
/// # Errors
///
/// Returns an error if any of the underlying queries fail or a row cannot be
/// mapped onto the model.
pub fn fetch_all_vinyls(conn: &Connection) -> Result<Vec<Vinyl>, LibraryError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, title, artist, cover_path, played_at FROM vinyls ORDER BY id")?;
    let vinyls = stmt
        .query_map([], Vinyl::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    vinyls
        .into_iter()
        .map(|mut vinyl| -> Result<Vinyl, LibraryError> {
            vinyl.discs = fetch_discs(conn, vinyl.id)?;
            Ok(vinyl)
        })
        .collect()
}

/// Fetches a single vinyl with its discs and tracks.
///
/// # Errors
///
/// Returns [`LibraryError::NotFound`] if no vinyl has the given id.
pub fn fetch_vinyl(conn: &Connection, vinyl_id: i64) -> Result<Vinyl, LibraryError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, title, artist, cover_path, played_at FROM vinyls WHERE id = ?",
    )?;
    let mut vinyl = stmt
        .query_row([vinyl_id], Vinyl::from_row)
        .optional()?
        .ok_or(LibraryError::NotFound(vinyl_id))?;

    vinyl.discs = fetch_discs(conn, vinyl.id)?;

    Ok(vinyl)
}

fn fetch_discs(conn: &Connection, vinyl_id: i64) -> rusqlite::Result<Vec<Disc>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, vinyl_id, number FROM discs WHERE vinyl_id = ? ORDER BY number, id",
    )?;
    let discs = stmt
        .query_map([vinyl_id], Disc::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    discs
        .into_iter()
        .map(|mut disc| -> rusqlite::Result<Disc> {
            disc.tracks = fetch_tracks(conn, disc.id)?;
            Ok(disc)
        })
        .collect()
}

fn fetch_tracks(conn: &Connection, disc_id: i64) -> rusqlite::Result<Vec<Track>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, disc_id, title, file_path, duration, ordering
         FROM tracks
         WHERE disc_id = ?
         ORDER BY ordering ASC
    ",
    )?;

    let tracks = stmt
        .query_map([disc_id], Track::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tracks)
}

/// Overwrites the editable fields of a vinyl.
///
/// There is no existence check: updating an unknown id changes nothing and
/// is not an error.
pub fn update_vinyl(
    conn: &Connection,
    vinyl_id: i64,
    title: &str,
    artist: &str,
    cover_path: &str,
) -> Result<(), LibraryError> {
    let mut stmt = conn.prepare_cached(
        "UPDATE vinyls SET title = ?1, artist = ?2, cover_path = ?3 WHERE id = ?4",
    )?;
    stmt.execute(params![title, artist, cover_path, vinyl_id])?;

    Ok(())
}

/// Records `played_at` for a vinyl, returning the number of rows changed.
pub(crate) fn update_played_at(
    conn: &Connection,
    vinyl_id: i64,
    played_at: i64,
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached("UPDATE vinyls SET played_at = ?1 WHERE id = ?2")?;
    stmt.execute(params![played_at, vinyl_id])
}

/// Removes a vinyl and everything it owns in one transaction.
///
/// Tracks go first, then discs, then the vinyl row itself so foreign keys
/// are never violated part way through.
pub(crate) fn delete_vinyl_tree(conn: &mut Connection, vinyl_id: i64) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;

    tx.execute(
        "DELETE FROM tracks WHERE disc_id IN (SELECT id FROM discs WHERE vinyl_id = ?)",
        [vinyl_id],
    )?;
    tx.execute("DELETE FROM discs WHERE vinyl_id = ?", [vinyl_id])?;
    tx.execute("DELETE FROM vinyls WHERE id = ?", [vinyl_id])?;

    tx.commit()
}

/// Counts rows in each table, used to check that nothing was left behind.
#[cfg(test)]
pub(crate) fn row_counts(conn: &Connection) -> rusqlite::Result<(i64, i64, i64)> {
    let count = |table: &str| -> rusqlite::Result<i64> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
    };

    Ok((count("vinyls")?, count("discs")?, count("tracks")?))
}
