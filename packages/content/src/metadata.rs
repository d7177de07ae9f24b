//! Filesystem-derived content metadata and owner resolution.

use std::fs;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::format::Format;

/// Stat-derived facts about a stored file. Never persisted; always rebuilt
/// from the filesystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Byte length as of the last load or successful save.
    pub size: u64,
    pub mime_type: Format,
    pub owner: String,
    pub group: String,
}

impl Metadata {
    /// Zero-valued metadata for content that has never been persisted.
    pub fn empty(mime_type: Format) -> Self {
        let epoch = DateTime::<Utc>::from(SystemTime::UNIX_EPOCH);
        Self {
            created: epoch,
            modified: epoch,
            size: 0,
            mime_type,
            owner: String::new(),
            group: String::new(),
        }
    }

    pub(crate) fn from_stat(stat: &fs::Metadata, mime_type: Format, owners: OwnerLookup) -> Self {
        let epoch = SystemTime::UNIX_EPOCH;
        let modified = stat.modified().unwrap_or(epoch);
        // Not every filesystem records a birth time.
        let created = stat.created().unwrap_or(modified);
        let (owner, group) = owners.owner_and_group(stat);

        Self {
            created: created.into(),
            modified: modified.into(),
            size: stat.len(),
            mime_type,
            owner,
            group,
        }
    }
}

/// Whether owner and group names can be resolved on this host.
///
/// Probed once when a store is built; handles carry the result so a missing
/// user database never costs a lookup per file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OwnerLookup {
    /// Resolve uid/gid through the system user database.
    System,
    /// Owner and group are always empty strings.
    #[default]
    Unavailable,
}

impl OwnerLookup {
    pub fn probe() -> Self {
        #[cfg(unix)]
        {
            if uzers::get_user_by_uid(uzers::get_current_uid()).is_some() {
                log::debug!("Owner lookup available via system user database");
                return OwnerLookup::System;
            }
        }

        log::debug!("Owner lookup unavailable; owner and group will be empty");
        OwnerLookup::Unavailable
    }

    /// Owner and group names for a stat result; empty strings for anything
    /// that cannot be resolved.
    pub fn owner_and_group(self, stat: &fs::Metadata) -> (String, String) {
        match self {
            OwnerLookup::System => system_owner_and_group(stat),
            OwnerLookup::Unavailable => (String::new(), String::new()),
        }
    }
}

#[cfg(unix)]
fn system_owner_and_group(stat: &fs::Metadata) -> (String, String) {
    use std::os::unix::fs::MetadataExt;

    let owner = uzers::get_user_by_uid(stat.uid())
        .map(|user| user.name().to_string_lossy().into_owned())
        .unwrap_or_default();
    let group = uzers::get_group_by_gid(stat.gid())
        .map(|group| group.name().to_string_lossy().into_owned())
        .unwrap_or_default();
    (owner, group)
}

#[cfg(not(unix))]
fn system_owner_and_group(_stat: &fs::Metadata) -> (String, String) {
    (String::new(), String::new())
}
