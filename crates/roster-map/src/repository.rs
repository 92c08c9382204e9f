//! Knowledge repository for persisting learned mappings between runs.
//!
//! Each profile's knowledge base is stored as one JSON file named
//! `{PROFILE}.json` in the repository directory. Profile ids are upper-cased
//! and every non-alphanumeric character becomes `_`, so `acme-health` and
//! `ACME HEALTH` share a file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::knowledge::KnowledgeBase;

/// Directory-backed store of knowledge bases, one file per profile.
#[derive(Debug, Clone)]
pub struct KnowledgeRepository {
    base_dir: PathBuf,
}

/// Metadata about a stored knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeMetadata {
    /// Normalised profile id.
    pub profile: String,
    /// Path of the profile's JSON file.
    pub file_path: PathBuf,
    /// Entries across all categories.
    pub entry_count: usize,
    /// Categories holding at least one entry.
    pub category_count: usize,
    /// RFC 3339 timestamp of the last save, if recorded.
    pub saved_at: Option<String>,
}

/// Knowledge base with repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredKnowledgeBase {
    /// The learned mappings.
    pub knowledge: KnowledgeBase,
    /// RFC 3339 timestamp of the save.
    pub saved_at: Option<String>,
    /// Free-form note shown when listing profiles.
    pub description: Option<String>,
    /// Version of the file format.
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StoredKnowledgeBase {
    /// Wraps a knowledge base stamped with the current time.
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self {
            knowledge,
            saved_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            description: None,
            version: default_version(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl KnowledgeRepository {
    /// Opens a repository at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).with_context(|| {
            format!(
                "Failed to create knowledge repository: {}",
                base_dir.display()
            )
        })?;
        Ok(Self { base_dir })
    }

    /// Directory holding the profile files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file backing `profile`.
    pub fn profile_path(&self, profile: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_id(profile)))
    }

    /// Saves a knowledge base under `profile`, stamped with the current time.
    pub fn save(&self, profile: &str, knowledge: &KnowledgeBase) -> Result<PathBuf> {
        let stored = StoredKnowledgeBase::new(knowledge.clone());
        self.save_stored(profile, &stored)
    }

    /// Saves a knowledge base with its metadata as given.
    pub fn save_stored(&self, profile: &str, stored: &StoredKnowledgeBase) -> Result<PathBuf> {
        let path = self.profile_path(profile);
        let json = serde_json::to_string_pretty(stored)
            .with_context(|| format!("Failed to serialize knowledge for {profile}"))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write knowledge to {}", path.display()))?;
        info!(
            profile = %normalize_id(profile),
            entries = stored.knowledge.len(),
            path = %path.display(),
            "knowledge saved"
        );
        Ok(path)
    }

    /// Loads the knowledge base for `profile`; `None` if none was saved.
    pub fn load(&self, profile: &str) -> Result<Option<KnowledgeBase>> {
        let stored = self.load_stored(profile)?;
        Ok(stored.map(|stored| stored.knowledge))
    }

    /// Loads the knowledge base for `profile` together with its metadata.
    pub fn load_stored(&self, profile: &str) -> Result<Option<StoredKnowledgeBase>> {
        let path = self.profile_path(profile);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read knowledge from {}", path.display()))?;
        let stored: StoredKnowledgeBase = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse knowledge from {}", path.display()))?;
        Ok(Some(stored))
    }

    /// Loads the knowledge base for `profile`, or an empty one.
    pub fn load_or_default(&self, profile: &str) -> Result<KnowledgeBase> {
        Ok(self.load(profile)?.unwrap_or_default())
    }

    /// Whether a file exists for `profile`.
    pub fn exists(&self, profile: &str) -> bool {
        self.profile_path(profile).exists()
    }

    /// Deletes the file for `profile`. Returns false if there was none.
    pub fn delete(&self, profile: &str) -> Result<bool> {
        let path = self.profile_path(profile);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete knowledge: {}", path.display()))?;
        Ok(true)
    }

    /// Lists stored profiles sorted by id. Files that cannot be read or
    /// parsed are skipped.
    pub fn list(&self) -> Result<Vec<KnowledgeMetadata>> {
        let mut metadata = Vec::new();

        for entry in fs::read_dir(&self.base_dir).with_context(|| {
            format!("Failed to read repository: {}", self.base_dir.display())
        })? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(profile) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let profile = profile.to_string();

            let stored = match fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|contents| {
                    serde_json::from_str::<StoredKnowledgeBase>(&contents)
                        .map_err(anyhow::Error::from)
                }) {
                Ok(stored) => stored,
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable knowledge file");
                    continue;
                }
            };

            metadata.push(KnowledgeMetadata {
                profile,
                file_path: path,
                entry_count: stored.knowledge.len(),
                category_count: stored.knowledge.categories().count(),
                saved_at: stored.saved_at,
            });
        }

        metadata.sort_by(|a, b| a.profile.cmp(&b.profile));
        Ok(metadata)
    }
}

/// Normalize a profile id for use in filenames.
pub fn normalize_id(id: &str) -> String {
    id.trim()
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
