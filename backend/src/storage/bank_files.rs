use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::storage::traits::BankFileStorage;

/// DiskBankFileStore writes uploaded bank documents into a single directory
#[derive(Clone)]
pub struct DiskBankFileStore {
    directory: PathBuf,
}

impl DiskBankFileStore {
    /// Create a store rooted at `directory`, creating it if it doesn't exist
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            std::fs::create_dir_all(&directory).with_context(|| {
                format!("Failed to create bank file directory {}", directory.display())
            })?;
            info!("Created bank file directory {}", directory.display());
        }

        Ok(Self { directory })
    }

    /// Build a fresh file name: bankfile-<epoch millis>-<uuid>.<ext>
    fn generate_file_name(extension: &str) -> String {
        format!(
            "bankfile-{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            extension
        )
    }

    /// Resolve a stored reference to its path, refusing anything that is not a bare file name
    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        if reference.is_empty()
            || reference.contains(['/', '\\'])
            || reference == "."
            || reference == ".."
        {
            return Err(anyhow!("Invalid bank file reference: {:?}", reference));
        }
        Ok(self.directory.join(reference))
    }
}

#[async_trait]
impl BankFileStorage for DiskBankFileStore {
    async fn store_bank_file(&self, contents: &[u8], extension: &str) -> Result<String> {
        let file_name = Self::generate_file_name(extension);
        let path = self.resolve(&file_name)?;

        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("Failed to write bank file {}", path.display()))?;

        info!("Stored bank file {} ({} bytes)", file_name, contents.len());
        Ok(file_name)
    }

    async fn remove_bank_file(&self, reference: &str) -> Result<()> {
        let path = self.resolve(reference)?;

        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to remove bank file {}", path.display()))?;

        debug!("Removed bank file {}", reference);
        Ok(())
    }
}
