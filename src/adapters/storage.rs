use crate::core::Storage;
use crate::utils::error::{CardError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }

    /// Regular files matched by `<base>/*`, in glob order.
    async fn list_files(&self) -> Result<Vec<String>> {
        let pattern = format!(
            "{}/*",
            glob::Pattern::escape(&self.base_path.to_string_lossy())
        );

        let entries = glob::glob(&pattern).map_err(|e| CardError::ProcessingError {
            message: format!("Invalid data file pattern '{}': {}", pattern, e),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CardError::IoError(e.into_error()))?;
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                files.push(name.to_string());
            }
        }
        Ok(files)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}
