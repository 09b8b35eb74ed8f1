//! Label-partitioned CSR graph conversion.

pub mod catalog;
pub mod edge_index;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod types;
pub mod vertex_map;

pub(crate) mod tools;
