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

//! Library error types.
//!
//! Storage, probing, lookup and validation failures are kept distinct so
//! callers can tell a missing album apart from a broken database or a file
//! that could not be probed.

use thiserror::Error;

/// Failure to determine the duration of a single audio file.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("duration probing is not supported on {0}")]
    UnsupportedPlatform(String),

    #[error("ffprobe failed for {path}: {reason}")]
    ExecutionFailed { path: String, reason: String },

    #[error("ffprobe returned an empty duration for {0}")]
    EmptyResult(String),

    #[error("malformed duration {value:?} for {path}")]
    MalformedDuration { path: String, value: String },
}

/// Rejection of a file that cannot be turned into an inline data URL.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("vinyl with ID {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = LibraryError> = std::result::Result<T, E>;
