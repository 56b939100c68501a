//! Report generation engine for a personal expense tracker.
//!
//! One shared pipeline — select, aggregate, render — feeds two artifacts
//! that must agree on every statistic: a four-sheet Excel workbook and a
//! paginated PDF document. Everything is synchronous, pure computation
//! over the caller's in-memory collections; persistence, UI and delivery
//! live with external collaborators.

pub mod aggregate;
pub mod error;
pub mod export;
pub mod format;
pub mod models;
pub mod sanitize;
pub mod select;
pub mod style;

pub use aggregate::{aggregate, StatBucket, Stats, TopSplit};
pub use error::AppError;
pub use export::{generate, generate_with_style};
pub use models::{
  Category, ExportArtifact, ExportFormat, ExportMode, ExportRequest, PaymentMethod, Transaction,
};
pub use sanitize::sanitize;
pub use select::select;
pub use style::ReportStyle;
