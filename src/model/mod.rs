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

//! Library domain model.
//!
//! A [`Vinyl`] is the aggregate root of the library. It owns its [`Disc`]s,
//! and each disc owns its [`Track`]s. Values of these types are always fully
//! hydrated when returned from the data access layer: discs are ordered by
//! number and tracks by their playback ordering.

pub(crate) mod sort;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vinyl {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub cover_path: String,
    pub played_at: i64,
    pub discs: Vec<Disc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Disc {
    pub id: i64,
    pub vinyl_id: i64,
    pub number: i32,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: i64,
    pub disc_id: i64,
    pub title: String,
    pub file_path: String,
    pub duration: f64,
    pub ordering: i32,
}

/// The probed metadata for one path of an import request.
///
/// `index` is the zero-based position of the path in the request, which is
/// what the track ordering is derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMeta {
    pub index: usize,
    pub path: String,
    pub title: String,
    pub duration: f64,
}

/// Where a track sits on the continuous playback timeline of a vinyl.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl Vinyl {
    /// Iterates over every track of every disc, in disc then track order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.discs.iter().flat_map(|d| d.tracks.iter())
    }

    /// Total playing time in seconds.
    pub fn total_duration(&self) -> f64 {
        self.tracks().map(|t| t.duration).sum()
    }

    /// Builds the cumulative timeline for the first disc.
    ///
    /// Playback treats a disc side as one continuous stretch, so each entry
    /// records the offset at which its track starts and ends.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        let Some(disc) = self.discs.first() else {
            return vec![];
        };

        let mut cumulative = 0.0;
        disc.tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let start = cumulative;
                cumulative += track.duration;
                TimelineEntry {
                    index,
                    start,
                    end: cumulative,
                    duration: track.duration,
                }
            })
            .collect()
    }
}
