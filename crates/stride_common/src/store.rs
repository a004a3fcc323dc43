//! File-backed progress documents (v0.2.0).
//!
//! One JSON document per (user, curriculum) pair under the data directory.
//! `ensure` is the idempotent init: an existing document is returned as is,
//! otherwise the curriculum is cloned and written once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::curriculum::Curriculum;
use crate::error::{Result, StrideError};
use crate::progress::{clone_curriculum, Progress};

/// Stored progress plus its owner and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressDocument {
    pub user_id: String,
    pub curriculum_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub progress: Progress,
}

/// Progress store backed by a directory of JSON files
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the document for a pair.
    ///
    /// Both ids are hex-encoded, so distinct pairs never share a file.
    pub fn document_path(&self, user_id: &str, curriculum_id: &str) -> PathBuf {
        self.dir.join(format!(
            "progress-{}-{}.json",
            hex::encode(user_id),
            hex::encode(curriculum_id)
        ))
    }

    /// Load the document for a pair, if one exists
    pub fn load(&self, user_id: &str, curriculum_id: &str) -> Result<Option<ProgressDocument>> {
        let path = self.document_path(user_id, curriculum_id);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let doc: ProgressDocument = serde_json::from_str(&contents)?;
        if doc.user_id != user_id || doc.curriculum_id != curriculum_id {
            warn!(
                "{} belongs to {} on {}, expected {} on {}",
                path.display(),
                doc.user_id,
                doc.curriculum_id,
                user_id,
                curriculum_id
            );
            return Err(StrideError::OwnerMismatch {
                path: path.display().to_string(),
                user_id: doc.user_id,
                curriculum_id: doc.curriculum_id,
            });
        }
        Ok(Some(doc))
    }

    /// Write a document, bumping `updated_at`
    pub fn save(&self, doc: &mut ProgressDocument, now: DateTime<Utc>) -> Result<()> {
        doc.updated_at = now;
        self.write(doc)
    }

    fn write(&self, doc: &ProgressDocument) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.document_path(&doc.user_id, &doc.curriculum_id);
        let tmp = path.with_extension("json.tmp");

        // Write then rename so readers never see a half-written document
        let written = serde_json::to_string_pretty(doc)
            .map_err(StrideError::from)
            .and_then(|json| {
                let mut file = fs::File::create(&tmp)?;
                file.write_all(json.as_bytes())?;
                file.sync_all()?;
                fs::rename(&tmp, &path)?;
                Ok(())
            });
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }

        debug!("Wrote progress document {}", path.display());
        Ok(())
    }

    /// Return the existing document, or clone the curriculum into a new one.
    ///
    /// The boolean is true when the document was created by this call.
    pub fn ensure(
        &self,
        user_id: &str,
        curriculum: Option<&Curriculum>,
        code_language: &str,
        now: DateTime<Utc>,
    ) -> Result<(ProgressDocument, bool)> {
        if user_id.trim().is_empty() {
            return Err(StrideError::InvalidArgument("userId is required".to_string()));
        }
        let curriculum_ref = curriculum
            .ok_or_else(|| StrideError::InvalidArgument("curriculum not provided".to_string()))?;

        if let Some(existing) = self.load(user_id, &curriculum_ref.id)? {
            debug!("Progress already exists for {} on {}", user_id, curriculum_ref.id);
            return Ok((existing, false));
        }

        let doc = ProgressDocument {
            user_id: user_id.to_string(),
            curriculum_id: curriculum_ref.id.clone(),
            created_at: now,
            updated_at: now,
            progress: clone_curriculum(curriculum, code_language)?,
        };
        self.write(&doc)?;
        info!("Initialized progress for {} on {}", user_id, curriculum_ref.id);
        Ok((doc, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_path_is_hex_encoded() {
        let store = ProgressStore::new("/data");
        let path = store.document_path("a.b", "c");
        assert_eq!(path, Path::new("/data/progress-612e62-63.json"));
        assert_ne!(store.document_path("a.b", "c"), store.document_path("a_b", "c"));
        assert_ne!(store.document_path("a-b", "c"), store.document_path("a", "b-c"));
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());
        let doc = ProgressDocument {
            user_id: "u1".into(),
            curriculum_id: "c1".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            progress: Progress::default(),
        };
        // A directory where the document should go makes the rename fail
        let target = store.document_path("u1", "c1");
        fs::create_dir_all(target.join("occupied")).unwrap();

        assert!(store.write(&doc).is_err());
        assert!(!target.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());
        assert!(store.load("u1", "c1").unwrap().is_none());
    }

    #[test]
    fn test_ensure_requires_user_and_curriculum() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());
        assert!(matches!(
            store.ensure("u1", None, "cpp", Utc::now()),
            Err(StrideError::InvalidArgument(_))
        ));
    }
}
