//! Access keys gating paper length.
//!
//! Every user can generate short papers; a redeemed key unlocks the full
//! page range. Keys are single-use and bind to the first user who redeems
//! them. State is a small JSON file so an operator can inspect or hand-edit
//! it; writes go through a temp file rename to stay crash-safe.

use crate::sessions::collector::PAGE_MAX;
use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const KEY_PREFIX: &str = "PAPER-";
const SUFFIX_LEN: usize = 10;
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Page ceiling for users without a redeemed key.
pub const FREE_PAGE_LIMIT: u8 = 4;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct KeyRecord {
    redeemed_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Key was unused; it now belongs to this user.
    Activated,
    /// This user already redeemed this exact key.
    AlreadyYours,
    /// Someone else got there first.
    AlreadyUsed,
    /// Not a known key.
    Invalid,
}

pub struct KeyStore {
    path: PathBuf,
    inner: Mutex<BTreeMap<String, KeyRecord>>,
}

impl KeyStore {
    /// Load the store, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let keys = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading key store {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing key store {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            inner: Mutex::new(keys),
        })
    }

    /// Mint `count` fresh keys and persist them.
    pub fn generate(&self, count: usize) -> anyhow::Result<Vec<String>> {
        let mut minted = Vec::with_capacity(count);
        {
            let mut keys = self.lock();
            let mut rng = rand::rng();
            while minted.len() < count {
                let suffix: String = (0..SUFFIX_LEN)
                    .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
                    .collect();
                let key = format!("{KEY_PREFIX}{suffix}");
                if keys.contains_key(&key) {
                    continue;
                }
                keys.insert(key.clone(), KeyRecord::default());
                minted.push(key);
            }
            self.persist(&keys)?;
        }
        Ok(minted)
    }

    /// Bind a key to a user. First redemption wins; redeeming your own key
    /// again is a no-op rather than an error.
    pub fn redeem(&self, key: &str, user: &str) -> anyhow::Result<RedeemOutcome> {
        let key = key.trim().to_uppercase();
        let mut keys = self.lock();
        let Some(record) = keys.get_mut(&key) else {
            return Ok(RedeemOutcome::Invalid);
        };
        match &record.redeemed_by {
            Some(owner) if owner == user => Ok(RedeemOutcome::AlreadyYours),
            Some(_) => Ok(RedeemOutcome::AlreadyUsed),
            None => {
                record.redeemed_by = Some(user.to_string());
                self.persist(&keys)?;
                Ok(RedeemOutcome::Activated)
            }
        }
    }

    pub fn is_premium(&self, user: &str) -> bool {
        self.lock()
            .values()
            .any(|r| r.redeemed_by.as_deref() == Some(user))
    }

    /// The page ceiling this user may request.
    pub fn page_cap(&self, user: &str) -> u8 {
        if self.is_premium(user) {
            PAGE_MAX
        } else {
            FREE_PAGE_LIMIT
        }
    }

    /// All keys with their redemption state, for the operator CLI.
    pub fn list(&self) -> Vec<(String, Option<String>)> {
        self.lock()
            .iter()
            .map(|(k, r)| (k.clone(), r.redeemed_by.clone()))
            .collect()
    }

    /// Remove a key entirely. Returns whether it existed.
    pub fn revoke(&self, key: &str) -> anyhow::Result<bool> {
        let key = key.trim().to_uppercase();
        let mut keys = self.lock();
        let existed = keys.remove(&key).is_some();
        if existed {
            self.persist(&keys)?;
        }
        Ok(existed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, KeyRecord>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn persist(&self, keys: &BTreeMap<String, KeyRecord>) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let raw = serde_json::to_string_pretty(keys)?;
        std::fs::write(&tmp, raw).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

/// True when the text looks like an access key attempt (used to give a
/// clearer hint than a generic validation error).
pub fn looks_like_key(text: &str) -> bool {
    text.trim().to_uppercase().starts_with(KEY_PREFIX)
}

impl AsRef<Path> for KeyStore {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
