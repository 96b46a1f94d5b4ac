//! Durable storage for the cart identifier used by identifier-addressed carts.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::domain::CartId;

pub trait CartIdStore: Send + Sync {
    fn load(&self) -> Result<Option<CartId>>;
    fn save(&self, cart_id: CartId) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryCartIdStore {
    cart_id: Mutex<Option<CartId>>,
}

impl MemoryCartIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cart_id(cart_id: CartId) -> Self {
        Self {
            cart_id: Mutex::new(Some(cart_id)),
        }
    }
}

impl CartIdStore for MemoryCartIdStore {
    fn load(&self) -> Result<Option<CartId>> {
        Ok(*self.cart_id.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save(&self, cart_id: CartId) -> Result<()> {
        *self.cart_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(cart_id);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.cart_id.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCart {
    cart_id: CartId,
}

/// Keeps the cart id in a small JSON file so it survives restarts.
pub struct FileCartIdStore {
    path: PathBuf,
}

impl FileCartIdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartIdStore for FileCartIdStore {
    fn load(&self) -> Result<Option<CartId>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read cart id from '{}'", self.path.display())
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let persisted: PersistedCart = serde_json::from_str(&raw)
            .with_context(|| format!("malformed cart id file '{}'", self.path.display()))?;
        Ok(Some(persisted.cart_id))
    }

    fn save(&self, cart_id: CartId) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create cart id directory '{}'", parent.display())
            })?;
        }
        let raw = serde_json::to_string_pretty(&PersistedCart { cart_id })?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write cart id to '{}'", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to remove cart id '{}'", self.path.display())),
        }
    }
}
