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

//! Location of the `ffprobe` executable.
//!
//! An explicit path from the configuration wins. Otherwise a platform
//! specific binary is looked for in a `bin/` directory next to the running
//! program, and failing that the bare name is left for the operating system
//! to find on `PATH`. The fallback lookup is done once per run.

use std::{
    env,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use crate::error::ProbeError;

static BUNDLED: OnceLock<PathBuf> = OnceLock::new();

/// Returns the name of the probe executable for the given operating system.
///
/// Only one Unix-like family and Windows are supported; anything else is an
/// error rather than a guess.
pub(crate) fn executable_name(os: &str) -> Result<&'static str, ProbeError> {
    match os {
        "macos" | "linux" => Ok("ffprobe"),
        "windows" => Ok("ffprobe.exe"),
        other => Err(ProbeError::UnsupportedPlatform(other.to_string())),
    }
}

/// Resolves the probe executable for this host.
///
/// The host platform is checked before anything else. Concurrent callers may
/// race on the first lookup; [`OnceLock`] guarantees they all observe the
/// same path.
pub(crate) fn resolve(configured: Option<&Path>) -> Result<PathBuf, ProbeError> {
    let name = executable_name(env::consts::OS)?;

    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }

    let path = BUNDLED.get_or_init(|| bundled(name).unwrap_or_else(|| PathBuf::from(name)));
    Ok(path.clone())
}

fn bundled(name: &str) -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let candidate = exe.parent()?.join("bin").join(name);
    candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_name_per_platform() {
        assert_eq!(executable_name("linux").unwrap(), "ffprobe");
        assert_eq!(executable_name("macos").unwrap(), "ffprobe");
        assert_eq!(executable_name("windows").unwrap(), "ffprobe.exe");
    }

    #[test]
    fn unsupported_platform_is_rejected() {
        let err = executable_name("plan9").unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedPlatform(os) if os == "plan9"));
    }

    #[test]
    fn configured_path_wins() {
        let path = Path::new("/opt/tools/ffprobe");
        assert_eq!(resolve(Some(path)).unwrap(), path);
    }
}
