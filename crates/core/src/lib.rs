#![forbid(unsafe_code)]

pub mod model;
pub mod patch;
pub mod summary;

pub use model::{NormalizedUser, Page, PageCatalog, ProgressRecord, Step, UserDocument};
pub use patch::{apply_patch, PatchOp};
pub use summary::{aggregate, PageSummaryRow, ProgressSummary, StatusCounts, StatusKey};
