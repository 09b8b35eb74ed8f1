//! Global vertex id assignment.
//!
//! Both assignment strategies produce contiguous ids aligned to label
//! partitions: every vertex of label `i` falls in
//! `vertex_offset[i]..vertex_offset[i + 1]`.

use crate::{
    catalog::LabelCatalog,
    error::{Error, Result},
    types::{LabelId, VId},
};
use std::collections::{BTreeMap, BTreeSet};

/// Distinct raw identifiers collected per label partition (discovery mode).
#[derive(Debug, Default)]
pub struct VertexPartitions {
    partitions: Vec<BTreeSet<String>>,
}

impl VertexPartitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a raw identifier under `label`, returning false if it was
    /// already present.
    pub fn insert(&mut self, label: LabelId, raw: &str) -> bool {
        if label >= self.partitions.len() {
            self.partitions.resize_with(label + 1, BTreeSet::new);
        }
        self.partitions[label].insert(String::from(raw))
    }

    pub fn partition_len(&self, label: LabelId) -> usize {
        self.partitions.get(label).map_or(0, BTreeSet::len)
    }

    /// Assigns global ids: `vertex_offset[label] + rank` where rank is the
    /// identifier's position in the partition's lexicographic order.
    pub fn seal(mut self, label_count: usize) -> VertexMap {
        self.partitions.resize_with(label_count, BTreeSet::new);
        let mut offsets = Vec::with_capacity(label_count + 1);
        offsets.push(0);
        for partition in &self.partitions {
            offsets.push(offsets.last().unwrap() + partition.len() as VId);
        }
        let by_label = self
            .partitions
            .into_iter()
            .zip(&offsets)
            .map(|(partition, &base)| {
                partition
                    .into_iter()
                    .enumerate()
                    .map(|(rank, raw)| (raw, base + rank as VId))
                    .collect()
            })
            .collect();
        VertexMap { offsets, by_label }
    }
}

/// Raw identifier to global id mapping, partitioned by label.
#[derive(Debug)]
pub struct VertexMap {
    offsets: Vec<VId>,
    by_label: Vec<BTreeMap<String, VId>>,
}

impl VertexMap {
    pub fn vertex_num(&self) -> VId {
        *self.offsets.last().unwrap()
    }

    pub fn label_count(&self) -> usize {
        self.by_label.len()
    }

    /// The per-label prefix sum; `offsets().len() == label_count + 1`.
    pub fn offsets(&self) -> &[VId] {
        &self.offsets
    }

    pub fn partition_size(&self, label: LabelId) -> usize {
        self.by_label[label].len()
    }

    /// Looks up a raw identifier within one label partition.
    pub fn get(&self, label: LabelId, raw: &str) -> Option<VId> {
        self.by_label.get(label).and_then(|map| map.get(raw)).copied()
    }

    pub fn label_of(&self, vid: VId) -> LabelId {
        debug_assert!(vid < self.vertex_num());
        self.offsets.partition_point(|&offset| offset <= vid) - 1
    }
}

/// Reconstructs global ids from the `<label>_<rank>` naming convention
/// against an existing catalog (query mode).
///
/// Partition sizes come from counting the supplied vertex population per
/// resolved label; ranks are taken from the identifiers, never re-derived.
#[derive(Debug)]
pub struct RankAssigner<'a> {
    catalog: &'a LabelCatalog,
    offsets: Vec<VId>,
}

impl<'a> RankAssigner<'a> {
    pub fn new<I, S>(catalog: &'a LabelCatalog, population: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: Vec<VId> = vec![0; catalog.len()];
        for vertex in population {
            counts[catalog.resolve(vertex.as_ref())?] += 1;
        }
        let mut offsets = Vec::with_capacity(catalog.len() + 1);
        offsets.push(0);
        for count in counts {
            offsets.push(offsets.last().unwrap() + count);
        }
        Ok(Self { catalog, offsets })
    }

    pub fn vertex_num(&self) -> VId {
        *self.offsets.last().unwrap()
    }

    pub fn offsets(&self) -> &[VId] {
        &self.offsets
    }

    pub fn label_of(&self, vid: VId) -> LabelId {
        debug_assert!(vid < self.vertex_num());
        self.offsets.partition_point(|&offset| offset <= vid) - 1
    }

    /// Computes `offsets[label] + rank - 1` from the text after the last `_`.
    pub fn assign(&self, raw: &str) -> Result<VId> {
        let label = self.catalog.resolve(raw)?;
        let suffix = match raw.rfind('_') {
            Some(pos) => &raw[pos + 1..],
            None => return Err(violation(raw, "missing rank suffix")),
        };
        let rank: VId = suffix
            .parse()
            .map_err(|_| violation(raw, "non-numeric rank suffix"))?;
        let partition_size = self.offsets[label + 1] - self.offsets[label];
        if rank == 0 || rank > partition_size {
            return Err(violation(
                raw,
                &format!("rank {} out of partition bounds 1..={}", rank, partition_size),
            ));
        }
        Ok(self.offsets[label] + rank - 1)
    }
}

fn violation(identifier: &str, reason: &str) -> Error {
    Error::ConventionViolation {
        identifier: String::from(identifier),
        reason: String::from(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_map() -> VertexMap {
        let mut partitions = VertexPartitions::new();
        for raw in ["c2", "c1", "c3"] {
            partitions.insert(0, raw);
        }
        for raw in ["s1", "s2"] {
            partitions.insert(1, raw);
        }
        partitions.seal(3)
    }

    #[test]
    fn test_seal_offsets_and_ranks() {
        let map = create_map();
        assert_eq!(map.vertex_num(), 5);
        assert_eq!(map.offsets(), [0, 3, 5, 5]);
        assert_eq!(map.get(0, "c1"), Some(0));
        assert_eq!(map.get(0, "c2"), Some(1));
        assert_eq!(map.get(0, "c3"), Some(2));
        assert_eq!(map.get(1, "s1"), Some(3));
        assert_eq!(map.get(1, "s2"), Some(4));
        assert_eq!(map.get(1, "c1"), None);
        assert_eq!(map.get(2, "s1"), None);
    }

    #[test]
    fn test_insert_dedupes() {
        let mut partitions = VertexPartitions::new();
        assert!(partitions.insert(0, "v1"));
        assert!(!partitions.insert(0, "v1"));
        assert_eq!(partitions.partition_len(0), 1);
    }

    #[test]
    fn test_partition_invariant() {
        let map = create_map();
        for vid in 0..map.vertex_num() {
            let label = map.label_of(vid);
            assert!(map.offsets()[label] <= vid && vid < map.offsets()[label + 1]);
        }
        assert_eq!(map.label_of(0), 0);
        assert_eq!(map.label_of(3), 1);
    }

    fn create_catalog() -> LabelCatalog {
        let mut catalog = LabelCatalog::new();
        catalog.register("comment");
        catalog.register("person");
        catalog
    }

    #[test]
    fn test_rank_assigner() {
        let catalog = create_catalog();
        let assigner = RankAssigner::new(
            &catalog,
            ["person_1", "person_2", "comment_1", "person_3"],
        )
        .unwrap();
        assert_eq!(assigner.vertex_num(), 4);
        assert_eq!(assigner.offsets(), [0, 1, 4]);
        assert_eq!(assigner.assign("comment_1").unwrap(), 0);
        assert_eq!(assigner.assign("person_1").unwrap(), 1);
        assert_eq!(assigner.assign("person_3").unwrap(), 3);
        assert_eq!(assigner.label_of(0), 0);
        assert_eq!(assigner.label_of(3), 1);
    }

    #[test]
    fn test_rank_assigner_rejects_convention_violations() {
        let catalog = create_catalog();
        let assigner = RankAssigner::new(&catalog, ["person_1", "person_2"]).unwrap();
        assert!(matches!(
            assigner.assign("person_x"),
            Err(Error::ConventionViolation { .. })
        ));
        assert!(matches!(
            assigner.assign("person_0"),
            Err(Error::ConventionViolation { .. })
        ));
        assert!(matches!(
            assigner.assign("person_3"),
            Err(Error::ConventionViolation { .. })
        ));
        assert!(matches!(
            assigner.assign("forum_1"),
            Err(Error::UnresolvedLabel { .. })
        ));
    }

    #[test]
    fn test_rank_assigner_rejects_unresolved_population() {
        let catalog = create_catalog();
        assert!(matches!(
            RankAssigner::new(&catalog, ["forum_1"]),
            Err(Error::UnresolvedLabel { .. })
        ));
    }
}
