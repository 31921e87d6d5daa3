use crate::config::Settings;
use crate::utils::error::{CardError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional settings file; every key may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub render: Option<RenderConfig>,
    pub layout: Option<LayoutConfig>,
    pub watch: Option<WatchConfig>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    pub template_dir: Option<PathBuf>,
    pub template_name: Option<String>,
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    pub page_capacity: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    pub enabled: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置；相對路徑以檔案所在目錄為基準
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(CardError::IoError)?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CARD_TEMPLATES})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CardError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// Overlay the keys present in the file onto `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(render) = &self.render {
            if let Some(dir) = &render.template_dir {
                settings.template_dir = match &self.base_dir {
                    Some(base) if dir.is_relative() => base.join(dir),
                    _ => dir.clone(),
                };
            }
            if let Some(name) = &render.template_name {
                settings.template_name = name.clone();
            }
            if let Some(file) = &render.output_file {
                settings.output_file = file.clone();
            }
        }

        if let Some(capacity) = self.layout.as_ref().and_then(|l| l.page_capacity) {
            settings.page_capacity = capacity;
        }

        if let Some(enabled) = self.watch.as_ref().and_then(|w| w.enabled) {
            settings.watch = enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[render]
template_dir = "/opt/cards/template"
template_name = "tarot"
output_file = "sheet.html"

[layout]
page_capacity = 8

[watch]
enabled = false
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let mut settings = Settings::new("data");
        config.apply_to(&mut settings);

        assert_eq!(settings.template_dir, PathBuf::from("/opt/cards/template"));
        assert_eq!(settings.template_name, "tarot");
        assert_eq!(settings.output_file, "sheet.html");
        assert_eq!(settings.page_capacity, 8);
        assert!(!settings.watch);
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        let mut settings = Settings::new("data");
        let before = settings.clone();
        config.apply_to(&mut settings);
        assert_eq!(settings, before);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CARDSHEET_TEST_TEMPLATE", "poker");

        let config =
            TomlConfig::from_toml_str("[render]\ntemplate_name = \"${CARDSHEET_TEST_TEMPLATE}\"\n")
                .unwrap();
        assert_eq!(
            config.render.unwrap().template_name.as_deref(),
            Some("poker")
        );

        std::env::remove_var("CARDSHEET_TEST_TEMPLATE");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = TomlConfig::from_toml_str("[layout]\ncards_per_page = 4\n");
        assert!(matches!(
            result,
            Err(CardError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_relative_template_dir_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[render]\ntemplate_dir = \"skins\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        let mut settings = Settings::new("data");
        config.apply_to(&mut settings);

        let expected = temp_file.path().parent().unwrap().join("skins");
        assert_eq!(settings.template_dir, expected);
    }
}
