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

//! Inline media references.
//!
//! Covers and audio files are handed to display layers as `data:` URLs
//! carrying the file content in base64. Only files whose extension maps to
//! an `audio/` or `image/` MIME type respectively are accepted.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::{fs, path::Path};

use crate::error::{Result, ValidationError};

/// Extensions offered when selecting audio files for an import.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "m4a", "aac", "ogg", "opus", "aiff", "aif", "wma", "ape", "caf", "mka",
];

/// Extensions offered when selecting a cover image.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Maps a lower-case file extension to its MIME type.
fn mime_type(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "opus" => "audio/opus",
        "aiff" | "aif" => "audio/aiff",
        "wma" => "audio/x-ms-wma",
        "ape" => "audio/x-ape",
        "caf" => "audio/x-caf",
        "mka" => "audio/x-matroska",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => return None,
    };

    Some(mime)
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Returns `true` if the path looks like an audio file we can import.
pub fn is_audio_file(path: &Path) -> bool {
    AUDIO_EXTENSIONS.contains(&extension(path).as_str())
}

/// Encodes an audio file as a `data:` URL.
pub fn audio_data_url(path: &Path) -> Result<String> {
    data_url(path, "audio/")
}

/// Encodes an image file as a `data:` URL.
pub fn image_data_url(path: &Path) -> Result<String> {
    data_url(path, "image/")
}

/// Encodes a file as a `data:` URL after checking its MIME type.
///
/// The type is checked before the file is read, so an unsupported file is
/// rejected without any I/O.
fn data_url(path: &Path, mime_prefix: &str) -> Result<String> {
    let ext = extension(path);

    let mime = mime_type(&ext)
        .filter(|mime| mime.starts_with(mime_prefix))
        .ok_or_else(|| ValidationError::UnsupportedType(format!(".{ext}")))?;

    let data = fs::read(path)?;

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(data)))
}
