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

//! Library ordering.
//!
//! The library can be listed alphabetically by title or by when each vinyl
//! was last played. The chosen mode and direction are remembered in the
//! application configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::model::Vinyl;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    Alphabetical,
    RecentlyPlayed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sorts vinyls in place.
///
/// For [`SortMode::RecentlyPlayed`] the "ascending" direction lists the most
/// recently played vinyl first, matching how the library view presents it.
/// Ties keep their storage order.
pub fn sort_vinyls(vinyls: &mut [Vinyl], mode: SortMode, direction: SortDirection) {
    vinyls.sort_by(|a, b| {
        let ordering = match mode {
            SortMode::Alphabetical => compare_titles(a, b),
            SortMode::RecentlyPlayed => b.played_at.cmp(&a.played_at),
        };

        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_titles(a: &Vinyl, b: &Vinyl) -> Ordering {
    a.title.to_lowercase().cmp(&b.title.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::vinyl_with_durations;

    fn vinyl(id: i64, title: &str, played_at: i64) -> Vinyl {
        Vinyl {
            id,
            title: title.to_string(),
            played_at,
            ..vinyl_with_durations(&[])
        }
    }

    fn ids(vinyls: &[Vinyl]) -> Vec<i64> {
        vinyls.iter().map(|v| v.id).collect()
    }

    #[test]
    fn alphabetical_ignores_case() {
        let mut vinyls = vec![vinyl(1, "kid A", 0), vinyl(2, "Abbey Road", 0), vinyl(3, "blue", 0)];

        sort_vinyls(&mut vinyls, SortMode::Alphabetical, SortDirection::Asc);
        assert_eq!(ids(&vinyls), vec![2, 3, 1]);

        sort_vinyls(&mut vinyls, SortMode::Alphabetical, SortDirection::Desc);
        assert_eq!(ids(&vinyls), vec![1, 3, 2]);
    }

    #[test]
    fn recently_played_lists_latest_first() {
        let mut vinyls = vec![vinyl(1, "a", 100), vinyl(2, "b", 0), vinyl(3, "c", 300)];

        sort_vinyls(&mut vinyls, SortMode::RecentlyPlayed, SortDirection::Asc);
        assert_eq!(ids(&vinyls), vec![3, 1, 2]);

        sort_vinyls(&mut vinyls, SortMode::RecentlyPlayed, SortDirection::Desc);
        assert_eq!(ids(&vinyls), vec![2, 1, 3]);
    }
}
