//! On-disk format of the JSON credential store.
//!
//! A store file is a single JSON document:
//!
//! ```text
//! {
//!   "version": 1,
//!   "cards": {
//!     "<card id>": { "updated_at": "<RFC 3339>", "credentials": [ <Credential>, ... ] }
//!   }
//! }
//! ```
//!
//! Writes go through a temp file and a rename so readers never see a
//! half-written document.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credential::Credential;
use crate::errors::{Result, VaultError};

/// Current store format version.
pub const CURRENT_VERSION: u8 = 1;

/// Credentials saved for one card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRecord {
    /// When this card's credentials were last saved.
    pub updated_at: DateTime<Utc>,

    pub credentials: Vec<Credential>,
}

/// The whole store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: u8,

    /// Card id -> record.  Ordered so the file diffs cleanly.
    #[serde(default)]
    pub cards: BTreeMap<String, CardRecord>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            cards: BTreeMap::new(),
        }
    }
}

/// Read a store document.  A missing file is an empty store.
pub fn read_document(path: &Path) -> Result<StoreDocument> {
    if !path.exists() {
        return Ok(StoreDocument::default());
    }

    let data = fs::read(path)?;
    let document: StoreDocument = serde_json::from_slice(&data)
        .map_err(|e| VaultError::InvalidStoreFormat(path.to_path_buf(), e.to_string()))?;

    if document.version != CURRENT_VERSION {
        return Err(VaultError::InvalidStoreFormat(
            path.to_path_buf(),
            format!(
                "unsupported version {}, expected {CURRENT_VERSION}",
                document.version
            ),
        ));
    }

    Ok(document)
}

/// Write a store document to disk **atomically**.
///
/// The temp file sits in the same directory so the rename stays on one
/// filesystem.  On Unix the file is owner-only.
pub fn write_document(path: &Path, document: &StoreDocument) -> Result<()> {
    let buf = serde_json::to_vec_pretty(document)
        .map_err(|e| VaultError::SerializationError(format!("store document: {e}")))?;

    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}
