use crate::core::parser::ParserRegistry;
use crate::core::paginate::Paginator;
use crate::core::{DataFile, Dataset, DatasetCollection, Page, Storage};
use crate::utils::error::Result;

/// Parses and paginates every data file of one build pass.
pub struct DatasetAssembler<S: Storage> {
    storage: S,
    paginator: Paginator,
    parsers: ParserRegistry,
}

impl<S: Storage> DatasetAssembler<S> {
    pub fn new(storage: S, paginator: Paginator) -> Self {
        Self::with_parsers(storage, paginator, ParserRegistry::default())
    }

    pub fn with_parsers(storage: S, paginator: Paginator, parsers: ParserRegistry) -> Self {
        Self {
            storage,
            paginator,
            parsers,
        }
    }

    /// Data files in the storage root, in enumeration order.
    pub async fn discover(&self) -> Result<Vec<DataFile>> {
        let files = self
            .storage
            .list_files()
            .await?
            .into_iter()
            .filter(|name| !name.starts_with('.'))
            .filter_map(DataFile::from_file_name)
            .collect::<Vec<_>>();

        tracing::debug!("Discovered {} data files", files.len());
        Ok(files)
    }

    /// Any parse failure aborts the whole collection.
    pub async fn assemble(&self, files: &[DataFile]) -> Result<DatasetCollection> {
        let mut datasets = DatasetCollection::new();

        for file in files {
            tracing::info!("Processing file: {}", file.file_name);
            let contents = self.storage.read_file(&file.file_name).await?;
            let pages = self.paginate_file(file, &contents)?;

            if pages.is_empty() {
                tracing::info!(" No items found, skipping");
                continue;
            }

            let dataset = Dataset {
                name: file.dataset_name(),
                pages,
            };
            tracing::debug!(
                "Dataset '{}': {} cards on {} pages",
                dataset.name,
                dataset.card_count(),
                dataset.pages.len()
            );
            datasets.push(dataset);
        }

        Ok(datasets)
    }

    fn paginate_file(&self, file: &DataFile, contents: &[u8]) -> Result<Vec<Page>> {
        let parser = self.parsers.parser_for(file.format);
        let mut builder = self.paginator.builder();
        for record in parser.records(&file.file_name, contents) {
            builder.push(record?);
        }
        Ok(builder.finish())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::utils::error::CardError;
    use std::collections::HashMap;
    use std::num::NonZeroUsize;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// In-memory storage that remembers insertion order for listing.
    #[derive(Clone, Default)]
    pub(crate) struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        order: Arc<Mutex<Vec<String>>>,
    }

    impl MockStorage {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) async fn put(&self, path: &str, data: &str) {
            self.write_file(path, data.as_bytes()).await.unwrap();
        }

        pub(crate) async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CardError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            if files.insert(path.to_string(), data.to_vec()).is_none() {
                self.order.lock().await.push(path.to_string());
            }
            Ok(())
        }

        async fn list_files(&self) -> Result<Vec<String>> {
            Ok(self.order.lock().await.clone())
        }

        fn resolve(&self, path: &str) -> PathBuf {
            PathBuf::from("mem").join(path)
        }
    }

    fn assembler(storage: MockStorage) -> DatasetAssembler<MockStorage> {
        DatasetAssembler::new(storage, Paginator::new(NonZeroUsize::new(9).unwrap()))
    }

    fn heroes_csv(rows: usize) -> String {
        let mut csv = String::from("name,copies\n");
        for i in 0..rows {
            csv.push_str(&format!("Hero {},1\n", i));
        }
        csv
    }

    #[tokio::test]
    async fn test_discover_keeps_enumeration_order_and_filters() {
        let storage = MockStorage::new();
        storage.put("zombies.csv", "").await;
        storage.put("cards.html", "").await;
        storage.put("angels.yml", "").await;
        storage.put(".hidden.csv", "").await;
        storage.put("notes.txt", "").await;
        storage.put("beasts.yaml", "").await;

        let files = assembler(storage).discover().await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["zombies.csv", "angels.yml", "beasts.yaml"]);
    }

    #[tokio::test]
    async fn test_ten_heroes_make_two_pages() {
        let storage = MockStorage::new();
        storage.put("heroes.csv", &heroes_csv(10)).await;

        let assembler = assembler(storage);
        let files = assembler.discover().await.unwrap();
        let datasets = assembler.assemble(&files).await.unwrap();

        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].name, "heroes");
        let sizes: Vec<_> = datasets[0].pages.iter().map(Page::len).collect();
        assert_eq!(sizes, vec![9, 1]);
    }

    #[tokio::test]
    async fn test_empty_files_are_skipped() {
        let storage = MockStorage::new();
        storage.put("empty.csv", "name,copies\n").await;
        storage.put("none_left.csv", "name,copies\nGhost,0\n").await;
        storage.put("mapping.yml", "name: Dragon\ncopies: 2\n").await;
        storage.put("card_types.yml", "- name: Spell\n  copies: 2\n").await;

        let assembler = assembler(storage);
        let files = assembler.discover().await.unwrap();
        let datasets = assembler.assemble(&files).await.unwrap();

        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].name, "card types");
        assert_eq!(datasets[0].card_count(), 2);
    }

    #[tokio::test]
    async fn test_parse_failure_aborts_assembly() {
        let storage = MockStorage::new();
        storage.put("good.yml", "- name: Elf\n  copies: 1\n").await;
        storage.put("broken.csv", "name,copies\nOrc,1,surplus\n").await;

        let assembler = assembler(storage);
        let files = assembler.discover().await.unwrap();
        let result = assembler.assemble(&files).await;

        assert!(matches!(result, Err(CardError::CsvRowError { ref file, .. }) if file == "broken.csv"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let files = vec![DataFile::from_file_name("gone.csv").unwrap()];
        let result = assembler(MockStorage::new()).assemble(&files).await;
        assert!(matches!(result, Err(CardError::IoError(_))));
    }
}
