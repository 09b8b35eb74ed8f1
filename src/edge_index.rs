//! Directed edge deduplication and adjacency construction.

use crate::{
    catalog::LabelCatalog,
    error::{Error, Result},
    types::{LabelId, VId},
    vertex_map::VertexMap,
};
use std::collections::BTreeSet;
use std::path::Path;

/// How an edge column's label text maps onto the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelHint {
    /// The column names exactly one partition.
    Exact(LabelId),
    /// A polymorphic super-type column: the vertex population is split
    /// across the contiguous run of sub-label partitions starting at
    /// `start` whose names begin with `name`.
    Prefix { start: LabelId, name: String },
}

impl LabelHint {
    /// The contiguous range of candidate partitions, in partition order.
    pub fn run(&self, catalog: &LabelCatalog) -> std::ops::Range<LabelId> {
        match self {
            LabelHint::Exact(label) => *label..*label + 1,
            LabelHint::Prefix { start, name } => {
                let mut end = *start;
                while end < catalog.len() && catalog.name(end).starts_with(name.as_str()) {
                    end += 1;
                }
                *start..end
            }
        }
    }
}

/// Builds ascending, duplicate-free in/out adjacency sets from resolved
/// edges, plus a label-by-label edge-count matrix for reporting.
#[derive(Debug)]
pub struct EdgeIndexBuilder {
    in_neighbors: Vec<BTreeSet<VId>>,
    out_neighbors: Vec<BTreeSet<VId>>,
    edge_counts: Vec<Vec<u64>>,
}

impl EdgeIndexBuilder {
    pub fn new(vertex_num: VId, label_count: usize) -> Self {
        Self {
            in_neighbors: vec![BTreeSet::new(); vertex_num as usize],
            out_neighbors: vec![BTreeSet::new(); vertex_num as usize],
            edge_counts: vec![vec![0; label_count]; label_count],
        }
    }

    /// Inserts the ordered pair `(src, dst)`. Idempotent: only a genuinely
    /// new pair updates the adjacency sets and the edge-count matrix.
    pub fn insert(&mut self, src: VId, dst: VId, src_label: LabelId, dst_label: LabelId) -> bool {
        if self.out_neighbors[src as usize].insert(dst) {
            self.in_neighbors[dst as usize].insert(src);
            self.edge_counts[src_label][dst_label] += 1;
            true
        } else {
            false
        }
    }

    /// Resolves a raw endpoint to `(global id, label index)`.
    ///
    /// An exact hint looks up one partition; a prefix hint probes the run of
    /// sub-label partitions in partition order and the first membership hit
    /// wins.
    pub fn resolve_endpoint(
        map: &VertexMap,
        catalog: &LabelCatalog,
        hint: &LabelHint,
        raw: &str,
        file: &Path,
    ) -> Result<(VId, LabelId)> {
        hint.run(catalog)
            .find_map(|label| map.get(label, raw).map(|vid| (vid, label)))
            .ok_or_else(|| Error::UnresolvedIdentifier {
                identifier: String::from(raw),
                file: file.to_path_buf(),
            })
    }

    /// Resolves both endpoints and inserts the edge.
    pub fn insert_raw(
        &mut self,
        map: &VertexMap,
        catalog: &LabelCatalog,
        src_hint: &LabelHint,
        dst_hint: &LabelHint,
        raw_src: &str,
        raw_dst: &str,
        file: &Path,
    ) -> Result<bool> {
        let (src, src_label) = Self::resolve_endpoint(map, catalog, src_hint, raw_src, file)?;
        let (dst, dst_label) = Self::resolve_endpoint(map, catalog, dst_hint, raw_dst, file)?;
        Ok(self.insert(src, dst, src_label, dst_label))
    }

    pub fn edge_count(&self, src_label: LabelId, dst_label: LabelId) -> u64 {
        self.edge_counts[src_label][dst_label]
    }

    pub fn total_edges(&self) -> u64 {
        self.edge_counts.iter().flatten().sum()
    }

    pub fn into_neighbor_sets(self) -> (Vec<BTreeSet<VId>>, Vec<BTreeSet<VId>>) {
        (self.in_neighbors, self.out_neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex_map::VertexPartitions;

    #[test]
    fn test_insert_is_idempotent() {
        let mut builder = EdgeIndexBuilder::new(3, 1);
        assert!(builder.insert(0, 1, 0, 0));
        assert!(!builder.insert(0, 1, 0, 0));
        assert!(builder.insert(0, 2, 0, 0));
        assert_eq!(builder.edge_count(0, 0), 2);
        assert_eq!(builder.total_edges(), 2);
        let (in_neighbors, out_neighbors) = builder.into_neighbor_sets();
        assert_eq!(out_neighbors[0].iter().copied().collect::<Vec<_>>(), [1, 2]);
        assert_eq!(in_neighbors[1].iter().copied().collect::<Vec<_>>(), [0]);
        assert_eq!(in_neighbors[2].iter().copied().collect::<Vec<_>>(), [0]);
    }

    #[test]
    fn test_adjacency_symmetry() {
        let mut builder = EdgeIndexBuilder::new(4, 1);
        for &(src, dst) in &[(0, 1), (1, 2), (0, 2), (3, 0), (2, 2)] {
            builder.insert(src, dst, 0, 0);
        }
        let (in_neighbors, out_neighbors) = builder.into_neighbor_sets();
        for (src, neighbors) in out_neighbors.iter().enumerate() {
            for &dst in neighbors {
                assert!(in_neighbors[dst as usize].contains(&(src as VId)));
            }
        }
        for (dst, neighbors) in in_neighbors.iter().enumerate() {
            for &src in neighbors {
                assert!(out_neighbors[src as usize].contains(&(dst as VId)));
            }
        }
    }

    fn create_polymorphic() -> (VertexMap, LabelCatalog) {
        let mut catalog = LabelCatalog::new();
        let mut partitions = VertexPartitions::new();
        for raw in ["S1", "S2"] {
            partitions.insert(catalog.register("person_student"), raw);
        }
        partitions.insert(catalog.register("person_teacher"), "T1");
        partitions.insert(catalog.register("comment"), "c1");
        (partitions.seal(catalog.len()), catalog)
    }

    #[test]
    fn test_resolve_exact() {
        let (map, catalog) = create_polymorphic();
        let hint = LabelHint::Exact(2);
        let file = Path::new("edges.csv");
        assert_eq!(
            EdgeIndexBuilder::resolve_endpoint(&map, &catalog, &hint, "c1", file).unwrap(),
            (3, 2)
        );
        assert!(matches!(
            EdgeIndexBuilder::resolve_endpoint(&map, &catalog, &hint, "S1", file),
            Err(Error::UnresolvedIdentifier { .. })
        ));
    }

    #[test]
    fn test_resolve_prefix_probes_partitions_in_order() {
        let (map, catalog) = create_polymorphic();
        let hint = LabelHint::Prefix {
            start: 0,
            name: String::from("person"),
        };
        let file = Path::new("edges.csv");
        assert_eq!(
            EdgeIndexBuilder::resolve_endpoint(&map, &catalog, &hint, "S2", file).unwrap(),
            (1, 0)
        );
        assert_eq!(
            EdgeIndexBuilder::resolve_endpoint(&map, &catalog, &hint, "T1", file).unwrap(),
            (2, 1)
        );
        // The probe stops at the end of the "person" run: "c1" lives in the
        // comment partition and must not resolve.
        assert!(matches!(
            EdgeIndexBuilder::resolve_endpoint(&map, &catalog, &hint, "c1", file),
            Err(Error::UnresolvedIdentifier { .. })
        ));
    }

    #[test]
    fn test_insert_raw_counts_label_pairs() {
        let (map, catalog) = create_polymorphic();
        let mut builder = EdgeIndexBuilder::new(map.vertex_num(), catalog.len());
        let person = LabelHint::Prefix {
            start: 0,
            name: String::from("person"),
        };
        let comment = LabelHint::Exact(2);
        let file = Path::new("edges.csv");
        assert!(builder
            .insert_raw(&map, &catalog, &comment, &person, "c1", "S2", file)
            .unwrap());
        assert!(!builder
            .insert_raw(&map, &catalog, &comment, &person, "c1", "S2", file)
            .unwrap());
        assert!(builder
            .insert_raw(&map, &catalog, &comment, &person, "c1", "T1", file)
            .unwrap());
        assert_eq!(builder.edge_count(2, 0), 1);
        assert_eq!(builder.edge_count(2, 1), 1);
        assert_eq!(builder.total_edges(), 2);
    }
}
