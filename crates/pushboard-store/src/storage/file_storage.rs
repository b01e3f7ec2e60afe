use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, json};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::TemplateStorage;
use crate::address::TemplateAddress;
use crate::entities::{
    CreatedTemplate, Template, TemplateInput, TemplateRecord, TemplateSummary, UpdatedTemplate,
    is_utc_timestamp, now_timestamp,
};
use crate::error::{Result, StoreError};

/// File-based implementation of TemplateStorage
///
/// Directory structure:
/// ```text
/// base_path/
/// ├── welcome.json
/// ├── welcome-1.json
/// └── a1b2c3d4.json
/// ```
///
/// Each file holds one record; the file stem is the record id. Writes go to a
/// hidden `.tmp` file first and are then published, so readers never observe a
/// partially written record.
///
/// New records are published with a hard link, which claims the name
/// atomically. On filesystems without hard links the store falls back to an
/// exclusive create (`O_EXCL`) followed by a plain write; names stay unique,
/// but a concurrent reader may briefly see an incomplete new record.
pub struct FileStorage {
    base_path: PathBuf,
    /// Serializes mutations made through this instance; readers never take it
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open a store rooted at `base_path`, creating the directory if needed
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).await?;

        debug!("Template store opened at {}", base_path.display());

        Ok(Self {
            base_path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get path to a record file for an already resolved id
    fn record_path(&self, id: &str) -> PathBuf {
        self.base_path.join(TemplateAddress::file_name(id))
    }

    /// Resolve an untrusted id; ids that cannot name a record are reported as missing
    fn resolve(&self, raw_id: &str) -> Result<(String, PathBuf)> {
        let id = TemplateAddress::resolve(raw_id).ok_or_else(|| StoreError::not_found(raw_id))?;
        let path = self.record_path(&id);
        Ok((id, path))
    }

    async fn read_bytes(id: &str, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::not_found(id),
            _ => StoreError::Io(e),
        })
    }

    fn parse_record(id: &str, content: &[u8]) -> Result<TemplateRecord> {
        serde_json::from_slice(content).map_err(|e| StoreError::corrupt(id, e))
    }

    async fn read_record(id: &str, path: &Path) -> Result<TemplateRecord> {
        let content = Self::read_bytes(id, path).await?;
        Self::parse_record(id, &content)
    }

    /// Serialize a record into a fresh temporary file next to the records
    async fn write_temp(&self, id: &str, record: &TemplateRecord) -> Result<PathBuf> {
        let content = serde_json::to_vec_pretty(record)?;
        let temp_path = self
            .base_path
            .join(format!(".{}.{}.tmp", id, Uuid::new_v4().simple()));

        fs::write(&temp_path, content).await?;
        Ok(temp_path)
    }

    /// Link `temp_path` under the first free name `stem`, `stem-1`, `stem-2`, ...
    ///
    /// `hard_link` refuses to replace an existing file, so the check and the
    /// claim are a single filesystem operation even across processes.
    async fn publish_new(&self, stem: &str, temp_path: &Path) -> Result<String> {
        let mut candidate = stem.to_string();
        let mut counter = 0;
        let mut use_links = true;

        loop {
            let target = self.record_path(&candidate);
            let claimed = if use_links {
                match fs::hard_link(temp_path, &target).await {
                    Err(e)
                        if matches!(
                            e.kind(),
                            ErrorKind::Unsupported | ErrorKind::PermissionDenied
                        ) =>
                    {
                        warn!("Hard links unavailable ({}), using exclusive create", e);
                        use_links = false;
                        continue;
                    }
                    other => other,
                }
            } else {
                Self::copy_exclusive(temp_path, &target).await
            };

            match claimed {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    counter += 1;
                    candidate = TemplateAddress::with_counter(stem, counter);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Copy `temp_path` to `target`, failing with `AlreadyExists` if `target` exists
    async fn copy_exclusive(temp_path: &Path, target: &Path) -> std::io::Result<()> {
        let content = fs::read(temp_path).await?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(target)
            .await?;

        let written = async {
            file.write_all(&content).await?;
            file.flush().await
        }
        .await;

        if written.is_err() {
            let _ = fs::remove_file(target).await;
        }
        written
    }

    async fn discard_temp(temp_path: &Path) {
        if let Err(e) = fs::remove_file(temp_path).await {
            warn!("Failed to remove temporary file {}: {}", temp_path.display(), e);
        }
    }
}

#[async_trait]
impl TemplateStorage for FileStorage {
    async fn list_templates(&self) -> Result<Vec<TemplateSummary>> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(id) = file_name.to_str().and_then(TemplateAddress::id_from_file_name) else {
                continue;
            };

            // A single bad file must not break the listing
            match Self::read_record(id, &entry.path()).await {
                Ok(record) => summaries.push(record.summary(id)),
                Err(e) => warn!("Skipping template {}: {}", id, e),
            }
        }

        summaries.sort_by(|a, b| {
            b.sort_key()
                .cmp(a.sort_key())
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(summaries)
    }

    async fn get_template(&self, raw_id: &str) -> Result<Template> {
        let (id, path) = self.resolve(raw_id)?;
        let record = Self::read_record(&id, &path).await?;
        Ok(record.into_template(id))
    }

    async fn create_template(&self, input: TemplateInput) -> Result<CreatedTemplate> {
        if input.is_empty() {
            return Err(StoreError::invalid_input("request body is empty"));
        }

        let candidate_id = input
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(TemplateAddress::random_id);
        let name = input.name.unwrap_or_else(|| candidate_id.clone());

        let mut stem = TemplateAddress::stem_from_name(&name);
        if stem.is_empty() {
            stem = TemplateAddress::resolve(&candidate_id).unwrap_or_else(TemplateAddress::random_id);
        }

        let now = now_timestamp();
        let record = TemplateRecord {
            name: Some(name.clone()),
            payload: input.payload.unwrap_or_else(|| json!({})),
            thumbnail: input.thumbnail,
            created: now.clone(),
            updated: now.clone(),
            extra: Map::new(),
        };

        let _guard = self.write_lock.lock().await;
        let temp_path = self.write_temp(&stem, &record).await?;
        let published = self.publish_new(&stem, &temp_path).await;
        Self::discard_temp(&temp_path).await;
        let id = published?;

        debug!("Created template {} ({})", id, name);

        Ok(CreatedTemplate {
            id,
            name,
            created: now,
            message: "Template saved".to_string(),
        })
    }

    async fn update_template(&self, raw_id: &str, input: TemplateInput) -> Result<UpdatedTemplate> {
        let (id, path) = self.resolve(raw_id)?;

        let _guard = self.write_lock.lock().await;
        let content = Self::read_bytes(&id, &path).await?;

        if input.is_empty() {
            return Err(StoreError::invalid_input("request body is empty"));
        }

        let mut record = Self::parse_record(&id, &content)?;

        // Never move `updated` backwards, even if the wall clock does. Legacy
        // local-time values are not comparable and are simply replaced.
        let now = now_timestamp();
        let previous = record.sort_key();
        let updated = if is_utc_timestamp(previous) {
            now.max(previous.to_string())
        } else {
            now
        };
        record.merge(input, updated.clone());

        let temp_path = self.write_temp(&id, &record).await?;
        if let Err(e) = fs::rename(&temp_path, &path).await {
            Self::discard_temp(&temp_path).await;
            return Err(e.into());
        }

        debug!("Updated template {}", id);

        Ok(UpdatedTemplate {
            name: record.display_name(&id),
            id,
            updated,
            message: "Template updated".to_string(),
        })
    }

    async fn delete_template(&self, raw_id: &str) -> Result<()> {
        let (id, path) = self.resolve(raw_id)?;

        let _guard = self.write_lock.lock().await;
        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::not_found(&id),
            _ => StoreError::Io(e),
        })?;

        debug!("Deleted template {}", id);
        Ok(())
    }
}
