//! Grouping of clip occurrences by media identity.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use rn_core::MediaId;

use crate::inventory::{ClipOccurrence, MediaReference};

/// One underlying media file and every place it is used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueMedia {
    pub media: Arc<MediaReference>,
    /// Occurrences in inventory order; never empty.
    pub occurrences: Vec<ClipOccurrence>,
}

impl UniqueMedia {
    pub fn id(&self) -> MediaId {
        self.media.id
    }
}

/// Group `occurrences` by media identity.
///
/// Groups are ordered by the first appearance of their media in
/// `occurrences`, and each group keeps its occurrences in input order, so
/// the result depends only on the input sequence. Every occurrence lands in
/// exactly one group.
pub fn deduplicate(occurrences: &[ClipOccurrence]) -> Vec<UniqueMedia> {
    let mut slots: HashMap<MediaId, usize> = HashMap::new();
    let mut groups: Vec<UniqueMedia> = Vec::new();

    for occurrence in occurrences {
        let id = occurrence.media.id;
        let slot = *slots.entry(id).or_insert_with(|| {
            groups.push(UniqueMedia {
                media: Arc::clone(&occurrence.media),
                occurrences: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].occurrences.push(occurrence.clone());
    }

    tracing::debug!(
        "{} occurrences grouped into {} unique media",
        occurrences.len(),
        groups.len()
    );
    groups
}
