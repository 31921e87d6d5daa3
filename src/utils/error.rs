use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("CSV parse error in {file}: {source}")]
    CsvParseError {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A row with more cells than the header names.
    #[error("CSV parse error in {file}, line {line}: {reason}")]
    CsvRowError {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("YAML parse error in {file}: {source}")]
    YamlParseError {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Template error: {0}")]
    TemplateError(#[from] Box<handlebars::TemplateError>),

    #[error("Render error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Parse,
    Template,
    Io,
    Watch,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CardError::CsvParseError { .. }
            | CardError::CsvRowError { .. }
            | CardError::YamlParseError { .. } => ErrorCategory::Parse,
            CardError::TemplateError(_) | CardError::RenderError(_) => ErrorCategory::Template,
            CardError::IoError(_) => ErrorCategory::Io,
            CardError::WatchError(_) => ErrorCategory::Watch,
            CardError::ConfigError { .. }
            | CardError::ConfigValidationError { .. }
            | CardError::InvalidConfigValueError { .. }
            | CardError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CardError::SerializationError(_) | CardError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Parse => ErrorSeverity::Medium,
            ErrorCategory::Template | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Watch => ErrorSeverity::Critical,
        }
    }

    /// Build errors are caught by the rebuild loop; startup errors are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.category(),
            ErrorCategory::Configuration | ErrorCategory::Watch
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CardError::CsvParseError { file, .. } => {
                format!("Could not read CSV data file '{}'", file)
            }
            CardError::CsvRowError { file, line, .. } => {
                format!("CSV data file '{}' has a malformed row on line {}", file, line)
            }
            CardError::YamlParseError { file, .. } => {
                format!("Could not read YAML data file '{}'", file)
            }
            CardError::TemplateError(_) => "The card template could not be compiled".to_string(),
            CardError::RenderError(_) => "The card template failed while rendering".to_string(),
            CardError::IoError(e) => format!("File access failed: {}", e),
            CardError::WatchError(_) => "Could not watch the data or template directory".to_string(),
            CardError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Parse => {
                "Fix the syntax of the data file; the sheet is rebuilt as soon as it is saved"
            }
            ErrorCategory::Template => "Check the handlebars template for unbalanced blocks or typos",
            ErrorCategory::Io => "Check that the files exist and are readable and writable",
            ErrorCategory::Watch => "Check the directory permissions or the system watch limit",
            ErrorCategory::Configuration => {
                "Check the command line arguments and the configuration file"
            }
            ErrorCategory::Processing => "Re-run with --verbose to see more details",
        }
    }
}

impl From<handlebars::TemplateError> for CardError {
    fn from(e: handlebars::TemplateError) -> Self {
        CardError::TemplateError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
