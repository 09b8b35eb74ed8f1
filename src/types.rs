//! Types shared across the converter.

/// The global vertex id type (the on-disk integer width).
pub type VId = u32;

/// The label index type.
pub type LabelId = usize;
