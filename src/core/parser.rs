use crate::core::{RawRecord, RecordParser};
use crate::domain::model::RecordFormat;
use crate::utils::error::{CardError, Result};
use serde_json::{Map, Value};

/// Header-driven CSV: the first row names the fields, every later row is a record.
///
/// Rows may be shorter than the header; the missing trailing cells are simply
/// absent from the record. A row with more cells than there are column names
/// is a [`CardError::CsvRowError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl RecordParser for CsvParser {
    fn records<'a>(
        &self,
        file: &'a str,
        contents: &'a [u8],
    ) -> Box<dyn Iterator<Item = Result<RawRecord>> + 'a> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(contents);

        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(source) => {
                return Box::new(std::iter::once(Err(CardError::CsvParseError {
                    file: file.to_string(),
                    source,
                })))
            }
        };

        Box::new(reader.into_records().map(move |row| -> Result<RawRecord> {
            let row = row.map_err(|source| CardError::CsvParseError {
                file: file.to_string(),
                source,
            })?;
            if row.len() > headers.len() {
                return Err(CardError::CsvRowError {
                    file: file.to_string(),
                    line: row.position().map_or(0, |p| p.line()),
                    reason: format!(
                        "{} cells but only {} columns",
                        row.len(),
                        headers.len()
                    ),
                });
            }

            let fields = headers
                .iter()
                .zip(row.iter())
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect();
            Ok(RawRecord::new(fields))
        }))
    }
}

/// A YAML document holding a sequence of mappings.
///
/// Anything other than a sequence at the top level (a mapping, a scalar, an
/// empty document) yields no records.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl YamlParser {
    fn parse_document(file: &str, contents: &[u8]) -> Result<Vec<RawRecord>> {
        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let document: serde_yaml::Value =
            serde_yaml::from_slice(contents).map_err(|source| CardError::YamlParseError {
                file: file.to_string(),
                source,
            })?;

        let serde_yaml::Value::Sequence(items) = document else {
            tracing::info!("{} is not a YAML sequence, no records", file);
            return Ok(Vec::new());
        };

        items
            .into_iter()
            .map(|item| -> Result<RawRecord> {
                let fields = match serde_json::to_value(item)? {
                    Value::Object(map) => map,
                    other => {
                        tracing::debug!("{}: skipping non-mapping entry {}", file, other);
                        Map::new()
                    }
                };
                Ok(RawRecord::new(fields))
            })
            .collect()
    }
}

impl RecordParser for YamlParser {
    fn records<'a>(
        &self,
        file: &'a str,
        contents: &'a [u8],
    ) -> Box<dyn Iterator<Item = Result<RawRecord>> + 'a> {
        match Self::parse_document(file, contents) {
            Ok(records) => Box::new(records.into_iter().map(Ok)),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

/// Parser lookup keyed by data file format.
pub struct ParserRegistry {
    csv: Box<dyn RecordParser>,
    yaml: Box<dyn RecordParser>,
}

impl ParserRegistry {
    pub fn new(csv: Box<dyn RecordParser>, yaml: Box<dyn RecordParser>) -> Self {
        Self { csv, yaml }
    }

    pub fn parser_for(&self, format: RecordFormat) -> &dyn RecordParser {
        match format {
            RecordFormat::Csv => self.csv.as_ref(),
            RecordFormat::Yaml => self.yaml.as_ref(),
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new(Box::new(CsvParser), Box::new(YamlParser))
    }
}
