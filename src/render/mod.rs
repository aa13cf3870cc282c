//! Output rendering: the report file, JSON, and markdown summaries.

pub(crate) mod json;
pub(crate) mod markdown;
pub(crate) mod report;
