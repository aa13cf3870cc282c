//! Internal utility helpers for date parsing and file I/O.

pub(crate) mod date;
pub(crate) mod fs;
