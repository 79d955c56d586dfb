pub mod analysis;
pub mod file;
pub mod lenient;
pub mod wire;

pub use analysis::{
    non_empty, AnalysisResult, BudgetFinancials, KeyStatistic, NamedEntity, PolicyScheme,
    TableEntry,
};
pub use file::{SelectedFile, PDF_MEDIA_TYPE};
pub use wire::{ExportKind, ProcessRequest, ProcessResponse, ServiceReply, UploadResponse};
