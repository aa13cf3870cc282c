//! In-memory pipeline stages over loaded drug records.

pub(crate) mod annotate;
pub(crate) mod condense;
pub(crate) mod matcher;
