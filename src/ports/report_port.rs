//! Report output port trait.

use crate::domain::error::StratsearchError;
use crate::domain::search::FileReport;

/// Port for writing per-file search results.
pub trait ReportPort {
    fn write(&self, reports: &[FileReport]) -> Result<(), StratsearchError>;
}
