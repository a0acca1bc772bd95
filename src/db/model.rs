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

//! Database row mapping for domain models.
//!
//! This module provides the conversion logic between raw SQLite result rows
//! and the library model. Child collections are left empty here and filled
//! in by the fetch functions in the parent module.

use rusqlite::Row;

use crate::model::{Disc, Track, Vinyl};

impl Vinyl {
    /// Maps a `SELECT id, title, artist, cover_path, played_at` row.
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            artist: row.get(2)?,
            cover_path: row.get(3)?,
            played_at: row.get(4)?,
            discs: vec![],
        })
    }
}

impl Disc {
    /// Maps a `SELECT id, vinyl_id, number` row.
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            vinyl_id: row.get(1)?,
            number: row.get(2)?,
            tracks: vec![],
        })
    }
}

impl Track {
    /// Maps a `SELECT id, disc_id, title, file_path, duration, ordering` row.
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            disc_id: row.get(1)?,
            title: row.get(2)?,
            file_path: row.get(3)?,
            duration: row.get(4)?,
            ordering: row.get(5)?,
        })
    }
}
