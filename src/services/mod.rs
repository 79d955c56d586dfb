pub mod entity_categorizer;
pub mod export_writer;
pub mod result_renderer;

pub use entity_categorizer::{categorize_entities, entity_groups, EntityGroups};
pub use export_writer::ExportWriter;
pub use result_renderer::{placeholders, RenderedResult, ResultRenderer};
