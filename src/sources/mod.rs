//! Readers for the FDA Orange Book data files.

pub(crate) mod orange_book;
