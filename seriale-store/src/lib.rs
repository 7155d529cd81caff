use std::{
    fs, io,
    path::{Path, PathBuf},
};

use seriale_common::{models::Document, Conf};
use uuid::Uuid;

/// Persistence backend for the [`Document`].
///
/// Every call stands alone: nothing is cached between a `load` and the
/// following `save`, and concurrent writers simply overwrite each other.
pub trait Storage: Send + Sync {
    /// Reads the current document, falling back to an empty one when the
    /// stored copy is missing or unreadable.
    fn load(&self) -> Document;

    /// Replaces the stored document with `document`.
    fn save(&self, document: &Document) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error accessing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What [`JsonStore::ensure_ready`] found or did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// The data file was already there and was left alone.
    Existing,
    /// The seed file was copied into place.
    Seeded,
    /// A fresh empty document was written.
    Created,
    /// The data file could not be prepared; the error has been logged.
    Failed,
}

/// A [`Storage`] backed by a single pretty-printed JSON file.
#[derive(Clone, Debug)]
pub struct JsonStore {
    data_file: PathBuf,
    seed_file: PathBuf,
}

impl JsonStore {
    pub fn new(data_file: impl Into<PathBuf>, seed_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            seed_file: seed_file.into(),
        }
    }

    pub fn from_conf(conf: &Conf) -> Self {
        Self::new(&conf.data_file, &conf.seed_file)
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Makes sure the data file exists, seeding it on first run.
    ///
    /// Never overwrites an existing file and never fails: problems are
    /// logged and reported as [`Readiness::Failed`].
    #[tracing::instrument(skip(self), fields(data_file = %self.data_file.display()))]
    pub fn ensure_ready(&self) -> Readiness {
        match self.prepare() {
            Ok(readiness) => {
                match readiness {
                    Readiness::Existing => tracing::debug!("data file already present"),
                    Readiness::Seeded => {
                        tracing::info!(seed_file = %self.seed_file.display(), "copied seed document")
                    }
                    Readiness::Created => tracing::info!("created empty document"),
                    Readiness::Failed => {}
                }

                readiness
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to prepare data file");

                Readiness::Failed
            }
        }
    }

    fn prepare(&self) -> Result<Readiness, StoreError> {
        if let Some(parent) = self.data_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tracing::info!(dir = %parent.display(), "creating data directory");

                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        if self.data_file.exists() {
            return Ok(Readiness::Existing);
        }

        if self.seed_file.is_file() {
            fs::copy(&self.seed_file, &self.data_file).map_err(|source| StoreError::Io {
                path: self.data_file.clone(),
                source,
            })?;

            return Ok(Readiness::Seeded);
        }

        self.write(&Document::default())?;

        Ok(Readiness::Created)
    }

    // Writes to a sibling file first so readers never see a half written
    // document. Each write gets its own temporary name; concurrent saves
    // only race on the final rename.
    fn write(&self, document: &Document) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(document)?;

        let mut temp = self.data_file.clone().into_os_string();
        temp.push(format!(".{}.tmp", Uuid::new_v4()));
        let temp = PathBuf::from(temp);

        fs::write(&temp, content).map_err(|source| StoreError::Io {
            path: temp.clone(),
            source,
        })?;

        fs::rename(&temp, &self.data_file).map_err(|source| {
            fs::remove_file(&temp).ok();

            StoreError::Io {
                path: self.data_file.clone(),
                source,
            }
        })
    }
}

impl Storage for JsonStore {
    #[tracing::instrument(skip(self), fields(data_file = %self.data_file.display()))]
    fn load(&self) -> Document {
        self.ensure_ready();

        let content = match fs::read_to_string(&self.data_file) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(error = %err, "unable to read data file, using an empty document");

                return Document::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(error = %err, "data file is not a valid document, using an empty one");

                Document::default()
            }
        }
    }

    #[tracing::instrument(skip(self, document), fields(data_file = %self.data_file.display()), err)]
    fn save(&self, document: &Document) -> Result<(), StoreError> {
        self.write(document)
    }
}
