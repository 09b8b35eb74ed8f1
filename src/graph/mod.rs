//! The label-partitioned CSR graph.

mod codec;

use crate::types::VId;
use itertools::Itertools;
use std::collections::BTreeSet;

/// One direction of adjacency: a flat arena of neighbor ids indexed by
/// per-vertex `(offset, len)`, so no per-vertex allocation survives
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjacency {
    offsets: Vec<u32>,
    ids: Vec<VId>,
}

impl Adjacency {
    pub fn from_sets(sets: Vec<BTreeSet<VId>>) -> Self {
        let mut offsets = Vec::with_capacity(sets.len() + 1);
        offsets.push(0);
        let mut ids = Vec::new();
        for set in sets {
            ids.extend(set);
            offsets.push(ids.len() as u32);
        }
        Self { offsets, ids }
    }

    pub(crate) fn from_parts(degrees: &[u32], ids: Vec<VId>) -> Self {
        let mut offsets = Vec::with_capacity(degrees.len() + 1);
        offsets.push(0);
        for &degree in degrees {
            offsets.push(offsets.last().unwrap() + degree);
        }
        Self { offsets, ids }
    }

    pub fn neighbors(&self, vid: VId) -> &[VId] {
        let vid = vid as usize;
        &self.ids[self.offsets[vid] as usize..self.offsets[vid + 1] as usize]
    }

    pub fn degree(&self, vid: VId) -> u32 {
        let vid = vid as usize;
        self.offsets[vid + 1] - self.offsets[vid]
    }

    pub fn degrees(&self) -> impl Iterator<Item = u32> + '_ {
        self.offsets.windows(2).map(|pair| pair[1] - pair[0])
    }

    /// Total number of stored neighbor ids.
    pub fn total(&self) -> u64 {
        self.ids.len() as u64
    }
}

/// The in-memory form of the binary graph shared by the data-graph and
/// query-graph producers.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrGraph {
    vertex_offsets: Vec<VId>,
    in_adj: Adjacency,
    out_adj: Adjacency,
}

impl CsrGraph {
    /// Builds the graph from per-vertex neighbor sets. Both vectors must
    /// have one entry per global id and `vertex_offsets` must be the
    /// per-label prefix sum covering them.
    pub fn from_neighbor_sets(
        vertex_offsets: Vec<VId>,
        in_sets: Vec<BTreeSet<VId>>,
        out_sets: Vec<BTreeSet<VId>>,
    ) -> Self {
        debug_assert_eq!(in_sets.len(), out_sets.len());
        debug_assert_eq!(vertex_offsets.last().copied(), Some(in_sets.len() as VId));
        Self {
            vertex_offsets,
            in_adj: Adjacency::from_sets(in_sets),
            out_adj: Adjacency::from_sets(out_sets),
        }
    }

    pub fn vertex_num(&self) -> VId {
        *self.vertex_offsets.last().unwrap()
    }

    pub fn label_count(&self) -> usize {
        self.vertex_offsets.len() - 1
    }

    pub fn vertex_offsets(&self) -> &[VId] {
        &self.vertex_offsets
    }

    pub fn in_neighbors(&self, vid: VId) -> &[VId] {
        self.in_adj.neighbors(vid)
    }

    pub fn out_neighbors(&self, vid: VId) -> &[VId] {
        self.out_adj.neighbors(vid)
    }

    pub fn in_degree(&self, vid: VId) -> u32 {
        self.in_adj.degree(vid)
    }

    pub fn out_degree(&self, vid: VId) -> u32 {
        self.out_adj.degree(vid)
    }

    /// Number of logical edges (every edge appears once per direction).
    pub fn edge_num(&self) -> u64 {
        self.out_adj.total()
    }
}

impl std::fmt::Display for CsrGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "|V|: {} |Σ|: {} |E|: {}",
            self.vertex_num(),
            self.label_count(),
            self.edge_num()
        )?;
        for label in 0..self.label_count() {
            writeln!(
                f,
                "partition {}: [{}, {})",
                label,
                self.vertex_offsets[label],
                self.vertex_offsets[label + 1]
            )?;
            for vid in self.vertex_offsets[label]..self.vertex_offsets[label + 1] {
                writeln!(
                    f,
                    "  {} <- [{}] -> [{}]",
                    vid,
                    self.in_neighbors(vid).iter().join(" "),
                    self.out_neighbors(vid).iter().join(" ")
                )?;
            }
        }
        Ok(())
    }
}
