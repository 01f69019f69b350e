//! The `--tracks` argument: `all` or a comma separated list of audio track
//! numbers.

use std::fmt;
use std::str::FromStr;

use rn_core::InventoryError;
use rn_engine::Selection;
use rn_host::MediaHost;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSpec {
    All,
    /// 1-based audio track numbers in the order given.
    List(Vec<usize>),
}

impl TrackSpec {
    /// Resolve into a fixed selection on `timeline`.
    pub fn selection<H: MediaHost + ?Sized>(
        &self,
        host: &H,
        timeline: &str,
    ) -> Result<Selection, InventoryError> {
        match self {
            Self::All => Selection::all_tracks(host, timeline),
            Self::List(tracks) => Ok(Selection::new(timeline, tracks.clone())),
        }
    }
}

impl FromStr for TrackSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let tracks = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                match part.parse::<usize>() {
                    Ok(0) => Err("track numbers start at 1".to_string()),
                    Ok(n) => Ok(n),
                    Err(_) => Err(format!("invalid track number: {part:?}")),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::List(tracks))
    }
}

impl fmt::Display for TrackSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::List(tracks) => {
                let parts: Vec<_> = tracks.iter().map(|t| t.to_string()).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}
