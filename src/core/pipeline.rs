use crate::core::assembler::DatasetAssembler;
use crate::core::paginate::Paginator;
use crate::core::render::RenderPipeline;
use crate::core::{
    BuildReport, ConfigProvider, DataFile, DatasetCollection, Pipeline, RenderContext, Storage,
};
use crate::utils::error::Result;

/// Data directory in, `cards.html` out.
///
/// Extract discovers the data files, transform parses and paginates them,
/// load renders whichever context it is handed.
pub struct CardPipeline<S: Storage> {
    assembler: DatasetAssembler<S>,
    renderer: RenderPipeline<S>,
}

impl<S: Storage + Clone> CardPipeline<S> {
    pub fn new<C: ConfigProvider>(data: S, assets: S, config: &C) -> Self {
        Self {
            assembler: DatasetAssembler::new(data.clone(), Paginator::new(config.page_capacity())),
            renderer: RenderPipeline::new(
                data,
                assets,
                config.template_name(),
                config.output_file(),
            ),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for CardPipeline<S> {
    async fn extract(&self) -> Result<Vec<DataFile>> {
        self.assembler.discover().await
    }

    async fn transform(&self, files: Vec<DataFile>) -> Result<DatasetCollection> {
        self.assembler.assemble(&files).await
    }

    async fn load(&self, context: RenderContext) -> Result<BuildReport> {
        self.renderer.render(&context).await
    }
}
