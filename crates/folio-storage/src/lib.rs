//! Durable key/value storage and the portfolio data store built on it.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use folio_core::{
    bundled_defaults, new_record_id, reconcile::to_sections, reconcile, NewProject,
    PersonalInfoPatch, PortfolioDocument, ProjectPatch, SkillsPatch, SocialPatch,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub const CRATE_NAME: &str = "folio-storage";

pub const DEFAULT_STORAGE_KEY: &str = "portfolioData";

/// Newest envelope layout this build writes and reads.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage key {0:?} may only contain ASCII letters, digits, '-', '_' and '.'")]
    InvalidKey(String),
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// String-keyed durable storage scoped to one profile.
pub trait DurableStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: DurableStorage + ?Sized> DurableStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Type-erased storage for callers that pick the backend at runtime.
pub type BoxedStorage = Box<dyn DurableStorage + Send + Sync>;

fn check_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// One file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                action: "reading",
                path,
                source,
            }),
        }
    }

    /// Writes to a temp file beside the target, then renames it into place.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let path = self.path_for(key);
        fs::create_dir_all(&self.root).map_err(|source| StorageError::Io {
            action: "creating storage directory",
            path: self.root.clone(),
            source,
        })?;

        let temp_path = self
            .root
            .join(format!(".{}.{}.tmp", Uuid::new_v4(), value.len()));
        let write_temp = || -> std::io::Result<()> {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()
        };
        if let Err(source) = write_temp() {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::Io {
                action: "writing temp file",
                path: temp_path,
                source,
            });
        }

        fs::rename(&temp_path, &path).map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            StorageError::Io {
                action: "renaming temp file over",
                path,
                source,
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                action: "removing",
                path,
                source,
            }),
        }
    }
}

/// In-process storage. Clones share the same entries, so a clone handed to a
/// second store behaves like reopening the same profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryEntries>>,
}

#[derive(Debug, Default)]
struct MemoryEntries {
    values: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects writes that would push the total stored bytes past `quota`.
    pub fn with_quota(quota: usize) -> Self {
        let storage = Self::default();
        storage.entries().quota = Some(quota);
        storage
    }

    pub fn set_quota(&self, quota: Option<usize>) {
        self.entries().quota = quota;
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().values.contains_key(key)
    }

    fn entries(&self) -> MutexGuard<'_, MemoryEntries> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        Ok(self.entries().values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let mut entries = self.entries();
        if let Some(quota) = entries.quota {
            let others: usize = entries
                .values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        entries.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.entries().values.remove(key);
        Ok(())
    }
}

/// On-disk layout of the persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEnvelope {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub sha256: String,
    pub data: Map<String, Value>,
}

impl PersistedEnvelope {
    pub fn seal(
        data: Map<String, Value>,
        saved_at: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        let sha256 = sha256_hex(serde_json::to_string(&data)?.as_bytes());
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            saved_at,
            sha256,
            data,
        })
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading saved data: {0}")]
    Read(#[source] StorageError),
    #[error("saved data is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("saved data is not a JSON object")]
    NotAnObject,
    #[error("saved data has schema version {found}, this build supports up to {supported}")]
    UnsupportedSchema { found: u64, supported: u32 },
    #[error("saved data checksum mismatch")]
    ChecksumMismatch,
    #[error("saved sections rejected: {}", .0.join(", "))]
    RejectedSections(Vec<String>),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("serializing document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Store-level error flag. Non-fatal; the store keeps serving its in-memory
/// document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to load saved data: {0}")]
    Load(#[from] LoadError),
    #[error("Failed to save data: {0}")]
    Save(#[from] SaveError),
    #[error("Failed to clear saved data: {0}")]
    Clear(#[source] StorageError),
}

/// Decode a stored entry into its top-level sections.
///
/// A bare object without `schemaVersion` is a legacy payload whose keys are
/// the sections themselves.
pub fn decode_entry(raw: &str) -> Result<Map<String, Value>, LoadError> {
    let value: Value = serde_json::from_str(raw).map_err(LoadError::Parse)?;
    let Value::Object(mut object) = value else {
        return Err(LoadError::NotAnObject);
    };

    let Some(version) = object.get("schemaVersion") else {
        return Ok(object);
    };
    let found = version.as_u64().ok_or(LoadError::UnsupportedSchema {
        found: 0,
        supported: SCHEMA_VERSION,
    })?;
    if found == 0 {
        object.remove("schemaVersion");
        return Ok(object);
    }
    if found > u64::from(SCHEMA_VERSION) {
        return Err(LoadError::UnsupportedSchema {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    let envelope: PersistedEnvelope =
        serde_json::from_value(Value::Object(object)).map_err(LoadError::Parse)?;
    let actual = sha256_hex(
        serde_json::to_string(&envelope.data)
            .map_err(LoadError::Parse)?
            .as_bytes(),
    );
    if actual != envelope.sha256 {
        return Err(LoadError::ChecksumMismatch);
    }
    Ok(envelope.data)
}

pub fn encode_document(
    document: &PortfolioDocument,
    saved_at: DateTime<Utc>,
) -> Result<String, SaveError> {
    let sections = to_sections(document).map_err(SaveError::Serialize)?;
    let envelope = PersistedEnvelope::seal(sections, saved_at).map_err(SaveError::Serialize)?;
    serde_json::to_string(&envelope).map_err(SaveError::Serialize)
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub key: String,
    pub defaults: PortfolioDocument,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            defaults: bundled_defaults(),
        }
    }
}

/// Owner of the portfolio document and its only mutation surface. Every
/// mutation re-persists the whole document before returning.
#[derive(Debug)]
pub struct PortfolioStore<S> {
    storage: S,
    key: String,
    defaults: PortfolioDocument,
    document: PortfolioDocument,
    error: Option<StoreError>,
}

impl<S: DurableStorage> PortfolioStore<S> {
    pub fn load(storage: S) -> Self {
        Self::load_with(storage, StoreOptions::default())
    }

    pub fn load_with(storage: S, options: StoreOptions) -> Self {
        let mut store = Self {
            storage,
            key: options.key,
            document: options.defaults.clone(),
            defaults: options.defaults,
            error: None,
        };
        store.reload();
        store
    }

    /// Re-read persisted state. Falls back to pure defaults on any read or
    /// decode failure and records the failure in the error flag.
    pub fn reload(&mut self) {
        self.document = self.defaults.clone();
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no saved portfolio data, using defaults");
                return;
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read saved portfolio data");
                self.error = Some(LoadError::Read(err).into());
                return;
            }
        };

        let sections = match decode_entry(&raw) {
            Ok(sections) => sections,
            Err(err) => {
                warn!(key = %self.key, error = %err, "discarding saved portfolio data");
                self.error = Some(err.into());
                return;
            }
        };

        let reconciled = reconcile(self.defaults.clone(), &sections);
        if !reconciled.ignored.is_empty() {
            debug!(keys = ?reconciled.ignored, "ignoring unknown saved sections");
        }
        if !reconciled.is_clean() {
            for rejected in &reconciled.rejected {
                warn!(
                    section = %rejected.key,
                    reason = %rejected.reason,
                    "saved section rejected, keeping default"
                );
            }
            let keys = reconciled.rejected.iter().map(|r| r.key.clone()).collect();
            self.error = Some(LoadError::RejectedSections(keys).into());
        }
        debug!(sections = ?reconciled.applied, "loaded saved portfolio data");
        self.document = reconciled.document;
    }

    pub fn document(&self) -> &PortfolioDocument {
        &self.document
    }

    pub fn defaults(&self) -> &PortfolioDocument {
        &self.defaults
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn error(&self) -> Option<&StoreError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn update_personal_info(&mut self, patch: PersonalInfoPatch) {
        patch.apply_to(&mut self.document.personal);
        self.persist();
    }

    pub fn update_skills(&mut self, patch: SkillsPatch) {
        patch.apply_to(&mut self.document.skills);
        self.persist();
    }

    /// Appends the project under a fresh id and returns that id.
    pub fn add_project(&mut self, project: NewProject) -> String {
        let mut id = new_record_id();
        while self.document.projects.iter().any(|p| p.id == id) {
            id = new_record_id();
        }
        self.document.projects.push(project.into_project(id.clone()));
        self.persist();
        id
    }

    /// Returns `false` without persisting when no project has this id.
    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> bool {
        let Some(project) = self.document.projects.iter_mut().find(|p| p.id == id) else {
            debug!(id, "update for unknown project ignored");
            return false;
        };
        patch.apply_to(project);
        self.persist();
        true
    }

    /// Returns `false` without persisting when no project has this id.
    pub fn delete_project(&mut self, id: &str) -> bool {
        let Some(index) = self.document.projects.iter().position(|p| p.id == id) else {
            debug!(id, "delete for unknown project ignored");
            return false;
        };
        self.document.projects.remove(index);
        self.persist();
        true
    }

    pub fn update_social(&mut self, patch: SocialPatch) {
        patch.apply_to(&mut self.document.social);
        self.persist();
    }

    /// Restore the bundled defaults and drop the persisted entry.
    pub fn reset_data(&mut self) {
        self.document = self.defaults.clone();
        if let Err(err) = self.storage.remove(&self.key) {
            warn!(key = %self.key, error = %err, "failed to clear saved portfolio data");
            self.error = Some(StoreError::Clear(err));
        }
    }

    fn persist(&mut self) {
        let result = encode_document(&self.document, Utc::now())
            .and_then(|encoded| self.storage.set(&self.key, &encoded).map_err(SaveError::from));
        if let Err(err) = result {
            warn!(key = %self.key, error = %err, "failed to save portfolio data");
            self.error = Some(err.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{NewProjectLinks, ProjectStatus};
    use tempfile::tempdir;

    fn sample_project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: "A project description long enough".into(),
            image: String::new(),
            technologies: vec!["Rust".into()],
            features: vec![],
            links: None,
            status: ProjectStatus::Completed,
            start_date: "2024-02-01".into(),
            end_date: Some("2024-06-01".into()),
        }
    }

    #[test]
    fn sha256_is_stable() {
        assert_eq!(
            sha256_hex(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn first_load_uses_defaults_without_error() {
        let store = PortfolioStore::load(MemoryStorage::new());
        assert_eq!(store.document(), &bundled_defaults());
        assert!(store.error().is_none());
    }

    #[test]
    fn personal_update_overwrites_exactly_the_given_keys_and_is_idempotent() {
        let mut store = PortfolioStore::load(MemoryStorage::new());
        let before = store.document().personal.clone();
        let patch = PersonalInfoPatch {
            name: Some("Jordan Lee".into()),
            location: Some("Berlin".into()),
            ..Default::default()
        };
        store.update_personal_info(patch.clone());
        let once = store.document().personal.clone();
        store.update_personal_info(patch);
        assert_eq!(store.document().personal, once);

        let mut expected = before;
        expected.name = "Jordan Lee".into();
        expected.location = "Berlin".into();
        assert_eq!(once, expected);
    }

    #[test]
    fn add_project_appends_one_record_with_fresh_id() {
        let mut store = PortfolioStore::load(MemoryStorage::new());
        let before = store.document().projects.clone();
        let id = store.add_project(sample_project("Beacon"));
        let after = &store.document().projects;
        assert_eq!(after.len(), before.len() + 1);
        assert!(before.iter().all(|p| p.id != id));
        let added = after.last().unwrap();
        assert_eq!(added.id, id);
        assert_eq!(added.links.github, "");
        assert_eq!(added.links.live, "");
    }

    #[test]
    fn add_project_keeps_given_links() {
        let mut store = PortfolioStore::load(MemoryStorage::new());
        let mut project = sample_project("Beacon");
        project.links = Some(NewProjectLinks {
            github: None,
            live: Some("https://beacon.example.com".into()),
        });
        let id = store.add_project(project);
        let added = store.document().project(&id).unwrap();
        assert_eq!(added.links.live, "https://beacon.example.com");
        assert_eq!(added.links.github, "");
    }

    #[test]
    fn delete_missing_id_is_a_noop_and_present_id_removes_one() {
        let storage = MemoryStorage::new();
        let mut store = PortfolioStore::load(storage.clone());
        let before = store.document().projects.clone();

        assert!(!store.delete_project("does-not-exist"));
        assert_eq!(store.document().projects, before);
        assert!(!storage.contains(DEFAULT_STORAGE_KEY));

        let target = before[1].id.clone();
        assert!(store.delete_project(&target));
        assert_eq!(store.document().projects.len(), before.len() - 1);
        assert!(store.document().project(&target).is_none());
        assert!(store.error().is_none());
    }

    #[test]
    fn update_project_by_id() {
        let mut store = PortfolioStore::load(MemoryStorage::new());
        let id = store.document().projects[0].id.clone();
        assert!(store.update_project(
            &id,
            ProjectPatch {
                title: Some("Renamed".into()),
                ..Default::default()
            }
        ));
        assert_eq!(store.document().project(&id).unwrap().title, "Renamed");
        assert!(!store.update_project("missing", ProjectPatch::default()));
    }

    #[test]
    fn skills_and_social_merge_shallowly() {
        let mut store = PortfolioStore::load(MemoryStorage::new());
        let frontend = store.document().skills["frontend"].clone();
        store.update_skills(SkillsPatch::default().category("backend", vec!["Go".into()]));
        assert_eq!(store.document().skills["backend"], vec!["Go".to_string()]);
        assert_eq!(store.document().skills["frontend"], frontend);

        let linkedin = store.document().social.linkedin.clone();
        store.update_social(SocialPatch {
            twitter: Some("https://twitter.com/example".into()),
            ..Default::default()
        });
        assert_eq!(store.document().social.twitter, "https://twitter.com/example");
        assert_eq!(store.document().social.linkedin, linkedin);
    }

    #[test]
    fn reload_reproduces_last_persisted_document() {
        let storage = MemoryStorage::new();
        let mut store = PortfolioStore::load(storage.clone());
        store.update_personal_info(PersonalInfoPatch {
            bio: Some("Ünïcode bio survives the trip".into()),
            ..Default::default()
        });
        store.add_project(sample_project("Beacon"));
        let first = store.document().projects[0].id.clone();
        store.delete_project(&first);
        store.update_skills(SkillsPatch::default().category("design", vec!["Figma".into()]));

        let fresh = PortfolioStore::load(storage);
        assert!(fresh.error().is_none());
        assert_eq!(fresh.document(), store.document());
    }

    #[test]
    fn reset_restores_defaults_and_clears_storage() {
        let storage = MemoryStorage::new();
        let mut store = PortfolioStore::load(storage.clone());
        store.update_personal_info(PersonalInfoPatch {
            name: Some("Someone Else".into()),
            ..Default::default()
        });
        store.add_project(sample_project("Beacon"));
        assert!(storage.contains(DEFAULT_STORAGE_KEY));

        store.reset_data();
        assert_eq!(store.document(), &bundled_defaults());
        assert!(!storage.contains(DEFAULT_STORAGE_KEY));
        assert_eq!(PortfolioStore::load(storage).document(), &bundled_defaults());
    }

    #[test]
    fn corrupt_entry_falls_back_to_defaults_with_error_flag() {
        let storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let store = PortfolioStore::load(storage);
        assert_eq!(store.document(), &bundled_defaults());
        assert!(matches!(store.error(), Some(StoreError::Load(LoadError::Parse(_)))));
    }

    #[test]
    fn tampered_envelope_is_rejected() {
        let storage = MemoryStorage::new();
        let mut store = PortfolioStore::load(storage.clone());
        store.update_personal_info(PersonalInfoPatch {
            name: Some("Jordan Lee".into()),
            ..Default::default()
        });
        let raw = storage.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        storage
            .set(DEFAULT_STORAGE_KEY, &raw.replace("Jordan Lee", "Mallory"))
            .unwrap();

        let fresh = PortfolioStore::load(storage);
        assert_eq!(fresh.document(), &bundled_defaults());
        assert!(matches!(
            fresh.error(),
            Some(StoreError::Load(LoadError::ChecksumMismatch))
        ));
    }

    #[test]
    fn newer_schema_version_is_rejected() {
        let storage = MemoryStorage::new();
        storage
            .set(DEFAULT_STORAGE_KEY, r#"{"schemaVersion": 7, "data": {}}"#)
            .unwrap();
        let store = PortfolioStore::load(storage);
        assert!(matches!(
            store.error(),
            Some(StoreError::Load(LoadError::UnsupportedSchema { found: 7, .. }))
        ));
    }

    #[test]
    fn legacy_bare_subset_is_merged_over_defaults() {
        let storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"{"social": {"github": "https://github.com/legacy"}}"#,
            )
            .unwrap();
        let store = PortfolioStore::load(storage);
        assert!(store.error().is_none());
        assert_eq!(store.document().social.github, "https://github.com/legacy");
        assert_eq!(store.document().social.linkedin, "");
        assert_eq!(store.document().projects, bundled_defaults().projects);
    }

    #[test]
    fn malformed_section_sets_flag_but_keeps_good_sections() {
        let storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"{"projects": "oops", "skills": {"tools": ["Vim"]}}"#,
            )
            .unwrap();
        let store = PortfolioStore::load(storage);
        assert_eq!(store.document().skills["tools"], vec!["Vim".to_string()]);
        assert_eq!(store.document().projects, bundled_defaults().projects);
        assert!(matches!(
            store.error(),
            Some(StoreError::Load(LoadError::RejectedSections(keys)))
                if keys == &vec!["projects".to_string()]
        ));
    }

    #[test]
    fn write_failure_sets_flag_without_losing_in_memory_update() {
        let storage = MemoryStorage::with_quota(16);
        let mut store = PortfolioStore::load(storage.clone());
        store.update_personal_info(PersonalInfoPatch {
            name: Some("Quota Test".into()),
            ..Default::default()
        });
        assert_eq!(store.document().personal.name, "Quota Test");
        assert!(matches!(
            store.error(),
            Some(StoreError::Save(SaveError::Storage(StorageError::QuotaExceeded { .. })))
        ));
        assert!(!storage.contains(DEFAULT_STORAGE_KEY));

        store.clear_error();
        storage.set_quota(None);
        store.update_personal_info(PersonalInfoPatch::default());
        assert!(store.error().is_none());
        assert!(storage.contains(DEFAULT_STORAGE_KEY));
    }

    #[test]
    fn file_storage_round_trips_and_removes() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("profile"));
        assert_eq!(storage.get("portfolioData").unwrap(), None);

        let mut store = PortfolioStore::load(storage.clone());
        store.add_project(sample_project("On disk"));
        assert!(storage.path_for("portfolioData").exists());

        let fresh = PortfolioStore::load(storage.clone());
        assert_eq!(fresh.document(), store.document());

        storage.remove("portfolioData").unwrap();
        storage.remove("portfolioData").unwrap();
        assert_eq!(storage.get("portfolioData").unwrap(), None);
    }

    #[test]
    fn file_storage_leaves_no_temp_files_behind() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());
        storage.set("portfolioData", "{}").unwrap();
        storage.set("portfolioData", "{\"a\":1}").unwrap();
        let names = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["portfolioData.json".to_string()]);
    }

    #[test]
    fn keys_cannot_escape_the_storage_root() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.set("../etc/passwd", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.get(""), Err(StorageError::InvalidKey(_))));
    }

    /// Reads and writes go to memory; removes always fail.
    struct StuckStorage(MemoryStorage);

    impl DurableStorage for StuckStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                action: "removing",
                path: PathBuf::from(key),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn failed_clear_on_reset_sets_error_flag_and_still_reverts() {
        let memory = MemoryStorage::new();
        let mut store = PortfolioStore::load(StuckStorage(memory.clone()));
        store.update_personal_info(PersonalInfoPatch {
            name: Some("Jordan Lee".into()),
            ..Default::default()
        });
        assert!(store.error().is_none());

        store.reset_data();
        assert_eq!(store.document(), &bundled_defaults());
        assert!(matches!(
            store.error(),
            Some(StoreError::Clear(StorageError::Io { action: "removing", .. }))
        ));
        assert!(memory.contains(DEFAULT_STORAGE_KEY));

        store.clear_error();
        assert!(store.error().is_none());
    }
}
