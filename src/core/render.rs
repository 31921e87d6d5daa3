use crate::core::{BuildReport, RenderContext, Storage};
use crate::utils::error::{CardError, Result};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output};

pub const TEMPLATE_EXTENSION: &str = "handlebars";
pub const ERROR_TEMPLATE: &str = "error";

/// Used when the template directory has no `error.handlebars`.
const FALLBACK_ERROR_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Card sheet error</title></head>
<body>
<h1>The card sheet could not be built</h1>
<pre>{{error}}</pre>
</body>
</html>
"#;

/// Escapes the text and turns literal `\n` sequences into line breaks.
fn text_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = match h.param(0).map(|p| p.value()) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    out.write(&format_text(&text))?;
    Ok(())
}

pub fn format_text(text: &str) -> String {
    handlebars::html_escape(text).replace("\\n", "<br>")
}

/// Writes the card document and the stylesheet for one build pass.
///
/// Templates are read from `assets` on every call, so edits show up on the
/// next pass without restarting.
pub struct RenderPipeline<S: Storage> {
    output: S,
    assets: S,
    template_name: String,
    output_file: String,
}

impl<S: Storage> RenderPipeline<S> {
    pub fn new(
        output: S,
        assets: S,
        template_name: impl Into<String>,
        output_file: impl Into<String>,
    ) -> Self {
        Self {
            output,
            assets,
            template_name: template_name.into(),
            output_file: output_file.into(),
        }
    }

    pub fn stylesheet_file(&self) -> String {
        format!("{}.css", self.template_name)
    }

    pub async fn render(&self, context: &RenderContext) -> Result<BuildReport> {
        let (name, source) = match context {
            RenderContext::Cards { .. } => {
                let file = format!("{}.{}", self.template_name, TEMPLATE_EXTENSION);
                let source = self.assets.read_file(&file).await?;
                (self.template_name.as_str(), String::from_utf8_lossy(&source).into_owned())
            }
            RenderContext::Error { .. } => (ERROR_TEMPLATE, self.error_template().await?),
        };

        tracing::info!("Rendering html file");
        let html = render_document(name, &source, context)?;
        self.output
            .write_file(&self.output_file, html.as_bytes())
            .await?;

        tracing::info!("Copy style");
        let stylesheet_path = match self.copy_stylesheet().await {
            Ok(()) => Some(self.output.resolve(&self.stylesheet_file())),
            Err(e) if context.is_error() => {
                tracing::warn!("Could not copy stylesheet for the error page: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        let (datasets, pages) = match context {
            RenderContext::Cards { item_sets } => (
                item_sets.len(),
                item_sets.iter().map(|d| d.pages.len()).sum::<usize>(),
            ),
            RenderContext::Error { .. } => (0, 0),
        };

        Ok(BuildReport {
            datasets,
            pages,
            output_path: self.output.resolve(&self.output_file),
            stylesheet_path,
            error_page: context.is_error(),
            finished_at: chrono::Utc::now(),
        })
    }

    async fn error_template(&self) -> Result<String> {
        let file = format!("{}.{}", ERROR_TEMPLATE, TEMPLATE_EXTENSION);
        match self.assets.read_file(&file).await {
            Ok(source) => Ok(String::from_utf8_lossy(&source).into_owned()),
            Err(CardError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("{} not found, using the built-in error page", file);
                Ok(FALLBACK_ERROR_TEMPLATE.to_string())
            }
            Err(e) => Err(e),
        }
    }

    async fn copy_stylesheet(&self) -> Result<()> {
        let file = self.stylesheet_file();
        let css = self.assets.read_file(&file).await?;
        self.output.write_file(&file, &css).await
    }
}

fn render_document(name: &str, source: &str, context: &RenderContext) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_helper("text", Box::new(text_helper));
    handlebars.register_template_string(name, source)?;
    Ok(handlebars.render(name, context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assembler::tests::MockStorage;
    use crate::core::{Dataset, Page, RawRecord};
    use serde_json::json;
    use serde_json::Map;
    use std::sync::Arc;

    const CARDS_TEMPLATE: &str = "{{#each itemSets}}<h2>{{name}}</h2>{{#each pages}}<div class=\"page\">{{#each this}}<p>{{text text}}</p>{{/each}}</div>{{/each}}{{/each}}";

    async fn assets() -> MockStorage {
        let assets = MockStorage::new();
        assets.put("template.handlebars", CARDS_TEMPLATE).await;
        assets.put("template.css", ".page { width: 210mm; }").await;
        assets.put("error.handlebars", "<h1>Oops</h1><p>{{error}}</p>").await;
        assets
    }

    fn context_with(text: &str) -> RenderContext {
        let mut fields = Map::new();
        fields.insert("text".to_string(), json!(text));
        fields.insert("copies".to_string(), json!("1"));
        let mut page = Page::with_capacity(1);
        page.push(Arc::new(RawRecord::new(fields)));
        RenderContext::cards(vec![Dataset {
            name: "spells".to_string(),
            pages: vec![page],
        }])
    }

    async fn output_text(storage: &MockStorage, file: &str) -> String {
        String::from_utf8(storage.get_file(file).await.unwrap()).unwrap()
    }

    #[test]
    fn test_format_text_escapes_and_breaks_lines() {
        assert_eq!(format_text("a <b> & c"), "a &lt;b&gt; &amp; c");
        assert_eq!(format_text("line one\\nline two"), "line one<br>line two");
        assert_eq!(format_text("real\nnewline"), "real\nnewline");
    }

    #[tokio::test]
    async fn test_render_cards_writes_document_and_stylesheet() {
        let output = MockStorage::new();
        let pipeline = RenderPipeline::new(output.clone(), assets().await, "template", "cards.html");

        let report = pipeline
            .render(&context_with("Deal 2\\nDraw <1>"))
            .await
            .unwrap();

        assert_eq!(report.datasets, 1);
        assert_eq!(report.pages, 1);
        assert!(!report.error_page);
        assert_eq!(
            output_text(&output, "cards.html").await,
            "<h2>spells</h2><div class=\"page\"><p>Deal 2<br>Draw &lt;1&gt;</p></div>"
        );
        assert_eq!(
            output_text(&output, "template.css").await,
            ".page { width: 210mm; }"
        );
    }

    #[tokio::test]
    async fn test_render_error_page() {
        let output = MockStorage::new();
        let pipeline = RenderPipeline::new(output.clone(), assets().await, "template", "cards.html");

        let report = pipeline
            .render(&RenderContext::error("broken.csv: bad row"))
            .await
            .unwrap();

        assert!(report.error_page);
        assert_eq!(
            output_text(&output, "cards.html").await,
            "<h1>Oops</h1><p>broken.csv: bad row</p>"
        );
    }

    #[tokio::test]
    async fn test_error_page_still_copies_stylesheet() {
        let output = MockStorage::new();
        let pipeline = RenderPipeline::new(output.clone(), assets().await, "template", "cards.html");

        let report = pipeline.render(&RenderContext::error("boom")).await.unwrap();

        assert!(report.stylesheet_path.is_some());
        assert!(output.get_file("template.css").await.is_some());
    }

    #[tokio::test]
    async fn test_missing_error_template_uses_builtin_page() {
        let assets = MockStorage::new();
        let output = MockStorage::new();
        let pipeline = RenderPipeline::new(output.clone(), assets, "template", "cards.html");

        let report = pipeline
            .render(&RenderContext::error("<bad> input"))
            .await
            .unwrap();

        // No stylesheet either, which only costs a warning on the error path.
        assert!(report.stylesheet_path.is_none());
        let html = output_text(&output, "cards.html").await;
        assert!(html.contains("<pre>&lt;bad&gt; input</pre>"));
    }

    #[tokio::test]
    async fn test_missing_stylesheet_fails_card_render() {
        let assets = MockStorage::new();
        assets.put("template.handlebars", CARDS_TEMPLATE).await;
        let pipeline = RenderPipeline::new(MockStorage::new(), assets, "template", "cards.html");

        let result = pipeline.render(&context_with("x")).await;
        assert!(matches!(result, Err(CardError::IoError(_))));
    }

    #[tokio::test]
    async fn test_broken_template_is_a_template_error() {
        let assets = MockStorage::new();
        assets.put("template.handlebars", "{{#each itemSets}}").await;
        assets.put("template.css", "").await;
        let pipeline = RenderPipeline::new(MockStorage::new(), assets, "template", "cards.html");

        let result = pipeline.render(&context_with("x")).await;
        assert!(matches!(result, Err(CardError::TemplateError(_))));
    }

    #[tokio::test]
    async fn test_custom_template_name() {
        let assets = MockStorage::new();
        assets.put("tarot.handlebars", "{{#each itemSets}}{{name}};{{/each}}").await;
        assets.put("tarot.css", "body {}").await;
        let output = MockStorage::new();
        let pipeline = RenderPipeline::new(output.clone(), assets, "tarot", "cards.html");

        pipeline.render(&context_with("x")).await.unwrap();

        assert_eq!(output_text(&output, "cards.html").await, "spells;");
        assert!(output.get_file("tarot.css").await.is_some());
    }
}
