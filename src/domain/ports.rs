use crate::domain::model::{BuildReport, DataFile, DatasetCollection, RawRecord, RenderContext};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// File names directly inside the storage root, in enumeration order.
    fn list_files(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    /// Where a relative path ends up, for reporting.
    fn resolve(&self, path: &str) -> PathBuf;
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &Path;
    fn template_dir(&self) -> &Path;
    fn template_name(&self) -> &str;
    fn output_file(&self) -> &str;
    fn page_capacity(&self) -> NonZeroUsize;
}

/// Turns the contents of one data file into records, in file order.
///
/// Every call starts from the beginning of `contents`; a failing row or
/// document surfaces as an `Err` item and ends the sequence for the caller.
pub trait RecordParser: Send + Sync {
    fn records<'a>(
        &self,
        file: &'a str,
        contents: &'a [u8],
    ) -> Box<dyn Iterator<Item = Result<RawRecord>> + 'a>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<DataFile>>;
    async fn transform(&self, files: Vec<DataFile>) -> Result<DatasetCollection>;
    async fn load(&self, context: RenderContext) -> Result<BuildReport>;
}
