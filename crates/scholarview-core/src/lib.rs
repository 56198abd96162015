//! Scholarview Core - profile data model and view-state derivation
//!
//! Pure, synchronous building blocks shared by the acquisition client and
//! front-ends: wire types, title categorization, the filter/sort/paginate
//! pipeline, plus logging and terminal progress helpers.

pub mod category;
pub mod logging;
pub mod model;
pub mod present;
pub mod progress;
pub mod view;

// Re-exports for convenience
pub use category::{CategoryFilter, CategorySet, CategoryTag, categorize};
pub use logging::{IndicatifLogger, init_logging};
pub use model::{AcquisitionResult, AuthorStats, ProfileData, ProgressSnapshot, PublicationRecord};
pub use present::{CacheBanner, citation_search_url, fmt_num, progress_message};
pub use progress::{ProgressContext, apply_snapshot};
pub use view::{
    CategorizedRecord, PAGE_SIZE, PublicationView, SortKey, TOP_COUNT, Tab, View, ViewParameters,
    derive_view,
};
