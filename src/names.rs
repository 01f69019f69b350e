//! Where base names come from: a TOML names file or an interactive prompt.
//!
//! A names file maps entries to base names under a `[names]` table. Keys are
//! either the 1-based position of the media in the inventory or its media
//! pool id:
//!
//! ```toml
//! [names]
//! 1 = "Introduction"
//! 2 = "Main Theme"
//! "6f1c1d0e-7a55-4f0e-9d7e-5d3b2f1a9c10" = "Outro"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use rn_core::MediaId;
use rn_engine::{current_base, UniqueMedia};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NamesFile {
    #[serde(default)]
    pub names: BTreeMap<String, String>,
}

impl NamesFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse names file")
    }

    /// Map every key onto the media identity it names.
    pub fn resolve(&self, unique: &[UniqueMedia]) -> Result<HashMap<MediaId, String>> {
        let mut resolved = HashMap::new();

        for (key, base) in &self.names {
            let media = if let Ok(index) = key.trim().parse::<usize>() {
                match index.checked_sub(1).and_then(|i| unique.get(i)) {
                    Some(u) => u.id(),
                    None => anyhow::bail!(
                        "names file entry {key} is out of range (1-{})",
                        unique.len()
                    ),
                }
            } else {
                let id: MediaId = key
                    .trim()
                    .parse()
                    .with_context(|| format!("names file key {key:?} is neither an index nor a media id"))?;
                if !unique.iter().any(|u| u.id() == id) {
                    anyhow::bail!("names file names media {id}, which is not on the selected tracks");
                }
                id
            };

            if resolved.insert(media, base.clone()).is_some() {
                anyhow::bail!("names file gives media {media} more than one name");
            }
        }

        Ok(resolved)
    }
}

/// Read and resolve a names file.
pub fn load_names(path: &Path, unique: &[UniqueMedia]) -> Result<HashMap<MediaId, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read names file: {:?}", path))?;
    NamesFile::parse(&content)
        .with_context(|| format!("In names file {:?}", path))?
        .resolve(unique)
}

/// The base a file currently carries, without an index of `width` digits.
pub fn existing_base(media: &UniqueMedia, width: usize) -> String {
    let stem = media
        .media
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    current_base(&stem, width).to_string()
}

/// Ask for a base name per unique media.
///
/// An empty answer leaves the entry inert. `q` or `Q` (or end of input) stops
/// prompting; every remaining entry stays inert.
pub fn prompt_names<R: BufRead, W: Write>(
    unique: &[UniqueMedia],
    width: usize,
    mut input: R,
    mut output: W,
) -> io::Result<HashMap<MediaId, String>> {
    let mut names = HashMap::new();

    for (i, media) in unique.iter().enumerate() {
        let first = &media.occurrences[0];
        let file_name = media
            .media
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        writeln!(
            output,
            "[{:0width$}] {file_name}  ({} clip{}, first at {} on {})",
            i + 1,
            media.occurrences.len(),
            if media.occurrences.len() == 1 { "" } else { "s" },
            first.start,
            first.track.name,
        )?;
        writeln!(output, "     current: {}", existing_base(media, width))?;
        write!(output, "     new base (empty to skip, q to stop): ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            break;
        }
        if !answer.is_empty() {
            names.insert(media.id(), answer.to_string());
        }
    }

    Ok(names)
}
