//! Orange Book records and essential-medicine targets.

pub(crate) mod drug;
pub(crate) mod essential;
