mod branding;
mod catalog;
mod content_item;
mod ids;
mod module;
mod quiz;

pub use branding::BrandingImage;
pub use catalog::{Catalog, CatalogError, Transition};
pub use content_item::{
    ContentDraft, ContentItem, ContentKind, DEFAULT_VIDEO_DURATION_SECS, ResourceHandle,
};
pub use ids::{ContentId, ModuleId, ParseIdError, QuizId};
pub use module::Module;
pub use quiz::{DEFAULT_QUESTION_COUNT, Quiz, QuizError};
