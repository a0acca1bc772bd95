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

//! Album import and lifecycle operations.
//!
//! An import creates a vinyl with a single disc, probes every track
//! concurrently through [`pool::probe_all`], and writes the resulting
//! tracks. All of it happens inside one SQLite transaction: the
//! [`rusqlite::Transaction`] guard rolls back when dropped, so returning
//! early on any error leaves no trace of the album.

pub(crate) mod pool;

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::{
    db,
    error::Result,
    model::Vinyl,
    probe::Prober,
};

/// Artist recorded when none was given.
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Everything needed to import one album.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    /// Absolute paths of the audio files, in playback order.
    pub track_paths: Vec<String>,
    pub title: String,
    pub artist: String,
    /// Path of the cover image, stored by reference. Blank means no cover.
    pub cover_path: String,
}

/// Imports an album and returns it as stored.
///
/// The vinyl's `played_at` is set to the import time, so a freshly imported
/// album sorts as if it had just been played.
///
/// # Errors
///
/// * [`LibraryError::Storage`](crate::error::LibraryError::Storage) if the transaction or any statement fails.
/// * [`LibraryError::Probe`](crate::error::LibraryError::Probe) with the first probe failure of the batch. No
///   rows are written for the album in that case.
/// * Any error from re-reading the album after commit. The album is stored
///   at that point even though the call failed.
pub fn import_album(
    conn: &mut Connection,
    prober: &dyn Prober,
    request: &ImportRequest,
) -> Result<Vinyl> {
    info!(
        title = %request.title,
        tracks = request.track_paths.len(),
        "Importing album"
    );

    let tx = conn.transaction()?;

    let artist = match request.artist.trim() {
        "" => UNKNOWN_ARTIST,
        _ => request.artist.as_str(),
    };
    let vinyl_id = db::insert_vinyl(&tx, &request.title, artist, now())?;

    if !request.cover_path.trim().is_empty() {
        db::update_cover_path(&tx, vinyl_id, &request.cover_path)?;
    }

    let disc_id = db::insert_disc(&tx, vinyl_id, 1)?;

    let metas = pool::probe_all(prober, &request.track_paths)?;

    for meta in &metas {
        db::insert_track(&tx, disc_id, meta)?;
    }

    tx.commit()?;

    debug!(vinyl_id, disc_id, "Import committed");

    db::fetch_vinyl(conn, vinyl_id)
}

/// Records that a vinyl was played just now.
///
/// Marking an id that does not exist is not an error.
pub fn mark_played(conn: &Connection, vinyl_id: i64) -> Result<()> {
    let changed = db::update_played_at(conn, vinyl_id, now())?;
    debug!(vinyl_id, changed, "Marked played");

    Ok(())
}

/// Deletes a vinyl together with its discs and tracks.
///
/// # Errors
///
/// Returns [`LibraryError::NotFound`](crate::error::LibraryError::NotFound) without writing anything if the vinyl
/// does not exist.
pub fn delete_album(conn: &mut Connection, vinyl_id: i64) -> Result<()> {
    let vinyl = db::fetch_vinyl(conn, vinyl_id)?;

    db::delete_vinyl_tree(conn, vinyl_id)?;

    info!(vinyl_id, title = %vinyl.title, "Deleted album");

    Ok(())
}

fn now() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{fetch_all_vinyls, fetch_vinyl, row_counts, tests::open_test_db},
        error::{LibraryError, ProbeError},
        import::pool::tests::ScriptedProber,
    };

    fn request(paths: &[&str]) -> ImportRequest {
        ImportRequest {
            track_paths: paths.iter().map(|p| p.to_string()).collect(),
            title: "Songs".to_string(),
            artist: "Band".to_string(),
            cover_path: "/covers/songs.png".to_string(),
        }
    }

    #[test]
    fn import_stores_tracks_in_request_order() {
        let (_dir, mut conn) = open_test_db();
        let prober = ScriptedProber::default()
            .ok("/a/song1.mp3", 40, 180.5)
            .ok("/a/song2.mp3", 0, 200.0)
            .ok("/a/song3.mp3", 80, 195.25);

        let vinyl = import_album(
            &mut conn,
            &prober,
            &request(&["/a/song1.mp3", "/a/song2.mp3", "/a/song3.mp3"]),
        )
        .unwrap();

        assert_eq!(vinyl.discs.len(), 1);
        assert_eq!(vinyl.discs[0].number, 1);
        let tracks: Vec<_> = vinyl
            .tracks()
            .map(|t| (t.ordering, t.title.as_str(), t.duration))
            .collect();
        assert_eq!(
            tracks,
            vec![(1, "song1", 180.5), (2, "song2", 200.0), (3, "song3", 195.25)]
        );
        assert_eq!(vinyl.discs[0].tracks[2].file_path, "/a/song3.mp3");
    }

    #[test]
    fn imported_vinyl_round_trips_fields() {
        let (_dir, mut conn) = open_test_db();
        let prober = ScriptedProber::default();

        let before = Utc::now().timestamp();
        let vinyl = import_album(&mut conn, &prober, &request(&["/a/x.flac"])).unwrap();
        let after = Utc::now().timestamp();

        let fetched = fetch_vinyl(&conn, vinyl.id).unwrap();
        assert_eq!(fetched, vinyl);
        assert_eq!(fetched.title, "Songs");
        assert_eq!(fetched.artist, "Band");
        assert_eq!(fetched.cover_path, "/covers/songs.png");
        assert!(fetched.played_at >= before && fetched.played_at <= after);
    }

    #[test]
    fn blank_cover_and_artist() {
        let (_dir, mut conn) = open_test_db();
        let prober = ScriptedProber::default();
        let mut req = request(&["/a/x.flac"]);
        req.cover_path = "   ".to_string();
        req.artist = String::new();

        let vinyl = import_album(&mut conn, &prober, &req).unwrap();

        assert_eq!(vinyl.cover_path, "");
        assert_eq!(vinyl.artist, UNKNOWN_ARTIST);
    }

    #[test]
    fn probe_failure_rolls_back_everything() {
        let (_dir, mut conn) = open_test_db();
        let existing = import_album(&mut conn, &ScriptedProber::default(), &request(&["/b/keep.mp3"]))
            .unwrap();

        let prober = ScriptedProber::default()
            .ok("/a/1.mp3", 30, 1.0)
            .ok("/a/2.mp3", 0, 2.0)
            .failing("/a/3.mp3", 10)
            .ok("/a/4.mp3", 0, 4.0);
        let mut req = request(&["/a/1.mp3", "/a/2.mp3", "/a/3.mp3", "/a/4.mp3"]);
        req.title = "Broken".to_string();

        let err = import_album(&mut conn, &prober, &req).unwrap_err();

        assert!(matches!(
            err,
            LibraryError::Probe(ProbeError::ExecutionFailed { ref path, .. }) if path == "/a/3.mp3"
        ));
        let vinyls = fetch_all_vinyls(&conn).unwrap();
        assert_eq!(vinyls.len(), 1);
        assert_eq!(vinyls[0].id, existing.id);
        assert!(vinyls.iter().all(|v| v.title != "Broken"));
        assert_eq!(row_counts(&conn).unwrap(), (1, 1, 1));
    }

    #[test]
    fn mark_played_updates_timestamp() {
        let (_dir, mut conn) = open_test_db();
        let vinyl = import_album(&mut conn, &ScriptedProber::default(), &request(&["/a/x.mp3"]))
            .unwrap();
        db::update_played_at(&conn, vinyl.id, 0).unwrap();

        mark_played(&conn, vinyl.id).unwrap();

        assert!(fetch_vinyl(&conn, vinyl.id).unwrap().played_at > 0);
    }

    #[test]
    fn mark_played_unknown_id_is_not_an_error() {
        let (_dir, conn) = open_test_db();

        mark_played(&conn, 99).unwrap();

        assert_eq!(row_counts(&conn).unwrap(), (0, 0, 0));
    }

    #[test]
    fn delete_unknown_album_is_not_found() {
        let (_dir, mut conn) = open_test_db();
        let kept = import_album(&mut conn, &ScriptedProber::default(), &request(&["/a/x.mp3"]))
            .unwrap();

        let err = delete_album(&mut conn, kept.id + 1).unwrap_err();

        assert!(matches!(err, LibraryError::NotFound(_)));
        assert_eq!(row_counts(&conn).unwrap(), (1, 1, 1));
    }

    #[test]
    fn delete_album_removes_the_whole_graph() {
        let (_dir, mut conn) = open_test_db();
        let vinyl = import_album(
            &mut conn,
            &ScriptedProber::default(),
            &request(&["/a/1.mp3", "/a/2.mp3"]),
        )
        .unwrap();

        delete_album(&mut conn, vinyl.id).unwrap();

        assert!(matches!(
            fetch_vinyl(&conn, vinyl.id),
            Err(LibraryError::NotFound(_))
        ));
        assert_eq!(row_counts(&conn).unwrap(), (0, 0, 0));
    }
}
