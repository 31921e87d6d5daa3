use crate::core::{BuildReport, Pipeline, RenderContext};
use crate::utils::error::Result;

/// How a guarded build pass ended.
#[derive(Debug)]
pub enum BuildOutcome {
    /// Cards were rendered.
    Rendered(BuildReport),
    /// The pass failed and the error page was rendered instead.
    ErrorPage { message: String, report: BuildReport },
    /// The pass failed and so did the error page.
    Failed { message: String },
}

impl BuildOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, BuildOutcome::Rendered(_))
    }
}

pub struct BuildEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BuildEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// One build pass; the first error ends it and nothing partial is rendered.
    pub async fn run(&self) -> Result<BuildReport> {
        let files = self.pipeline.extract().await?;
        tracing::debug!("Found {} data files", files.len());

        let datasets = self.pipeline.transform(files).await?;
        tracing::debug!("Assembled {} datasets", datasets.len());

        let report = self
            .pipeline
            .load(RenderContext::cards(datasets))
            .await?;
        tracing::debug!(
            "Wrote {} at {}",
            report.output_path.display(),
            report.finished_at
        );
        tracing::info!("DONE");

        Ok(report)
    }

    /// [`BuildEngine::run`] behind a failure boundary: errors become the
    /// error page and never escape.
    pub async fn run_guarded(&self) -> BuildOutcome {
        let e = match self.run().await {
            Ok(report) => return BuildOutcome::Rendered(report),
            Err(e) => e,
        };

        let message = e.to_string();
        tracing::error!(
            "❌ Build failed: {} (Category: {:?}, Severity: {:?})",
            message,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());

        match self.pipeline.load(RenderContext::error(message.clone())).await {
            Ok(report) => BuildOutcome::ErrorPage { message, report },
            Err(render_err) => {
                tracing::error!("❌ Could not render the error page: {}", render_err);
                BuildOutcome::Failed { message }
            }
        }
    }
}
