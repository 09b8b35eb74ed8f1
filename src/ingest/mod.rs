//! The two graph producers sharing one id-assignment and serialization
//! contract.

pub mod csv;
pub mod query;
