mod document;
mod page;

pub use document::{NormalizedUser, ProgressRecord, UserDocument};
pub use page::{Page, PageCatalog, Step, PLACEHOLDER_SLUG};
