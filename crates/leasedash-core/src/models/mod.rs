//! Data models for the lease-accounting service.
//!
//! - `User`: identity returned by `/whoami`
//! - `Report`, `NewReport`, `ReportType`: generated reports and the
//!   creation payload
//! - `Template`: report configuration, possibly nested
//!
//! Values are kept as the service returns them. Unknown fields are
//! preserved in each model's `extra` map.

pub mod report;
pub mod template;
pub mod user;

pub use report::{
    filter_reports, sort_reports, NewReport, Report, ReportFilter, ReportSortColumn, ReportType,
};
pub use template::Template;
pub use user::User;
