pub mod assembler;
pub mod engine;
pub mod orchestrator;
pub mod paginate;
pub mod parser;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{
    BuildReport, ChangeSource, DataFile, Dataset, DatasetCollection, Page, RawRecord,
    RenderContext, WatchEvent,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordParser, Storage};
pub use crate::utils::error::Result;
