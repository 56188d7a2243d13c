use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Spaces are listed in batches of this size.
pub const SPACE_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

impl Space {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// Paginated listing of the spaces visible to the caller.
pub trait SpaceDirectory {
    fn list_spaces(&self, start: usize, limit: usize) -> Result<Vec<Space>>;
}

/// Map a human-readable space name (or a key) to its key.
///
/// Within each batch a case-insensitive name match is preferred over an
/// exact key match; batches are scanned in order.
pub fn resolve_space_key<D: SpaceDirectory + ?Sized>(
    directory: &D,
    name_or_key: &str,
) -> Result<Option<String>> {
    let wanted = name_or_key.to_lowercase();
    let mut start = 0;

    loop {
        let batch = directory.list_spaces(start, SPACE_PAGE_SIZE)?;
        if batch.is_empty() {
            break;
        }

        let by_name = batch.iter().find(|s| s.name.to_lowercase() == wanted);
        if let Some(space) = by_name {
            info!(name = name_or_key, key = %space.key, "found space key");
            return Ok(Some(space.key.clone()));
        }
        if batch.iter().any(|s| s.key == name_or_key) {
            debug!(key = name_or_key, "name is already a space key");
            return Ok(Some(name_or_key.to_string()));
        }

        if batch.len() < SPACE_PAGE_SIZE {
            break;
        }
        start += SPACE_PAGE_SIZE;
    }

    warn!(name = name_or_key, "no space with this name");
    Ok(None)
}

/// Every space, in directory order.
pub fn list_all_spaces<D: SpaceDirectory + ?Sized>(
    directory: &D,
) -> Result<Vec<Space>> {
    let mut spaces = Vec::new();
    let mut start = 0;

    loop {
        let batch = directory.list_spaces(start, SPACE_PAGE_SIZE)?;
        let batch_len = batch.len();
        spaces.extend(batch);
        if batch_len < SPACE_PAGE_SIZE {
            break;
        }
        start += SPACE_PAGE_SIZE;
    }

    Ok(spaces)
}
