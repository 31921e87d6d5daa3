use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "cardsheet")]
#[command(about = "Render card data files into a printable HTML sheet and keep it up to date")]
pub struct CliConfig {
    /// Directory holding the .csv / .yml / .yaml data files
    pub data_dir: Option<PathBuf>,

    /// Directory holding <name>.handlebars, <name>.css and error.handlebars
    #[arg(long)]
    pub template_dir: Option<PathBuf>,

    /// Base name of the card template and stylesheet
    #[arg(long)]
    pub template_name: Option<String>,

    /// Name of the rendered document inside the data directory
    #[arg(long)]
    pub output_file: Option<String>,

    /// Cards per printed page
    #[arg(long)]
    pub page_capacity: Option<usize>,

    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Build once and exit instead of watching for changes
    #[arg(long)]
    pub once: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl CliConfig {
    /// 合併預設值、設定檔與命令列參數（命令列優先）
    pub fn resolve(&self) -> Result<Settings> {
        let data_dir = validate_required_field("data_dir", &self.data_dir)?;
        let mut settings = Settings::new(data_dir.clone());

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            TomlConfig::from_file(path)?.apply_to(&mut settings);
        }

        if let Some(dir) = &self.template_dir {
            settings.template_dir = dir.clone();
        }
        if let Some(name) = &self.template_name {
            settings.template_name = name.clone();
        }
        if let Some(file) = &self.output_file {
            settings.output_file = file.clone();
        }
        if let Some(capacity) = self.page_capacity {
            settings.page_capacity = capacity;
        }
        if self.once {
            settings.watch = false;
        }

        Ok(settings)
    }
}
