#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::paginate::DEFAULT_PAGE_CAPACITY;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TEMPLATE_NAME: &str = "template";
pub const DEFAULT_OUTPUT_FILE: &str = "cards.html";
pub const TEMPLATE_DIR_NAME: &str = "template";

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub template_dir: PathBuf,
    pub template_name: String,
    pub output_file: String,
    pub page_capacity: usize,
    pub watch: bool,
}

impl Settings {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            template_dir: default_template_dir(),
            template_name: DEFAULT_TEMPLATE_NAME.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            page_capacity: DEFAULT_PAGE_CAPACITY,
            watch: true,
        }
    }

    pub fn stylesheet_file(&self) -> String {
        format!("{}.css", self.template_name)
    }
}

/// `template/` next to the executable when shipped that way, else `./template`.
pub fn default_template_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(TEMPLATE_DIR_NAME)))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from(TEMPLATE_DIR_NAME))
}

impl ConfigProvider for Settings {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    fn template_name(&self) -> &str {
        &self.template_name
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn page_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.page_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_existing_dir("data_dir", &self.data_dir)?;
        validation::validate_existing_dir("template_dir", &self.template_dir)?;
        validation::validate_file_name("template_name", &self.template_name)?;
        validation::validate_file_name("output_file", &self.output_file)?;
        validation::validate_positive_number("page_capacity", self.page_capacity, 1)?;
        Ok(())
    }
}
