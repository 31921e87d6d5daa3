use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Map;
use std::path::PathBuf;
use std::sync::Arc;

/// Field name holding the number of physical copies of a card.
pub const COPIES_FIELD: &str = "copies";

/// Upper bound on the copies of a single record; larger counts are clamped.
pub const MAX_COPIES: u32 = 1_000;

/// One card entry from a data file, before copy expansion.
///
/// Fields keep the column (or mapping key) order of the source file, so
/// rendering the same inputs twice produces the same document. `copies` is resolved once at construction;
/// the raw `copies` field stays in `fields` so templates can still show it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    #[serde(flatten)]
    pub fields: Map<String, serde_json::Value>,
    #[serde(skip)]
    copies: u32,
}

impl RawRecord {
    pub fn new(fields: Map<String, serde_json::Value>) -> Self {
        let copies = copy_count(fields.get(COPIES_FIELD));
        Self { fields, copies }
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.fields.get(field)
    }
}

/// Resolve a `copies` value to a count.
///
/// Non-negative integers (numbers or numeric strings, `"3.0"` included) are
/// taken as-is up to [`MAX_COPIES`]; anything else counts as zero copies.
pub fn copy_count(value: Option<&serde_json::Value>) -> u32 {
    let Some(value) = value else {
        tracing::debug!("Record has no copies field, treating as zero copies");
        return 0;
    };

    let parsed = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(whole_non_negative)),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<u64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_non_negative))
        }
        _ => None,
    };

    match parsed {
        Some(n) => match u32::try_from(n) {
            Ok(count) if count <= MAX_COPIES => count,
            _ => {
                tracing::warn!("Copies value {} exceeds {}, clamping", n, MAX_COPIES);
                MAX_COPIES
            }
        },
        None => {
            tracing::warn!("Invalid copies value {}, treating as zero copies", value);
            0
        }
    }
}

fn whole_non_negative(f: f64) -> Option<u64> {
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// A fixed-capacity bucket of expanded record copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Page {
    entries: Vec<Arc<RawRecord>>,
}

impl Page {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: Arc<RawRecord>) {
        self.entries.push(record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Arc<RawRecord>] {
        &self.entries
    }
}

/// The paginated output for one data file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub name: String,
    pub pages: Vec<Page>,
}

impl Dataset {
    /// Display name from a file stem: the first underscore becomes a space.
    pub fn display_name(stem: &str) -> String {
        stem.replacen('_', " ", 1)
    }

    pub fn card_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }
}

pub type DatasetCollection = Vec<Dataset>;

/// What the templating engine is evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RenderContext {
    Cards {
        #[serde(rename = "itemSets")]
        item_sets: DatasetCollection,
    },
    Error {
        error: String,
    },
}

impl RenderContext {
    pub fn cards(item_sets: DatasetCollection) -> Self {
        RenderContext::Cards { item_sets }
    }

    pub fn error(message: impl Into<String>) -> Self {
        RenderContext::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RenderContext::Error { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Csv,
    Yaml,
}

impl RecordFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(RecordFormat::Csv),
            "yml" | "yaml" => Some(RecordFormat::Yaml),
            _ => None,
        }
    }
}

/// A discovered data file, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub file_name: String,
    pub format: RecordFormat,
}

impl DataFile {
    pub fn from_file_name(file_name: impl Into<String>) -> Option<Self> {
        let file_name = file_name.into();
        let extension = std::path::Path::new(&file_name).extension()?.to_str()?;
        let format = RecordFormat::from_extension(extension)?;
        Some(Self { file_name, format })
    }

    pub fn stem(&self) -> &str {
        std::path::Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }

    pub fn dataset_name(&self) -> String {
        Dataset::display_name(self.stem())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub datasets: usize,
    pub pages: usize,
    pub output_path: PathBuf,
    pub stylesheet_path: Option<PathBuf>,
    pub error_page: bool,
    pub finished_at: DateTime<Utc>,
}

/// Which watched tree a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    Data,
    Template,
}

/// What the change-notification side hands to the rebuild loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Watches are registered; nothing has changed yet.
    Ready,
    Changed { source: ChangeSource, path: PathBuf },
}
