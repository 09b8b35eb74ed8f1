//! The label profile.

use crate::{
    error::{Error, Result},
    tools::{push_u32, read_u32},
    types::LabelId,
};
use std::fs;
use std::path::Path;

/// Ordered registry of vertex label names.
///
/// The on-disk layout (all integers u32 little-endian) is:
///
/// ```text
/// u32 label_count
/// u32[label_count + 1] label_offset    (byte offsets, label_offset[0] = 0)
/// u8[label_offset[label_count]] bytes  (concatenated names, no separators)
/// ```
///
/// Label `i` owns `bytes[label_offset[i]..label_offset[i + 1]]`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LabelCatalog {
    labels: Vec<String>,
}

impl LabelCatalog {
    pub fn new() -> Self {
        Self { labels: Vec::new() }
    }

    /// Registers `name` in first-seen order and returns its index.
    pub fn register(&mut self, name: &str) -> LabelId {
        if let Some(index) = self.index_of(name) {
            index
        } else {
            self.labels.push(String::from(name));
            self.labels.len() - 1
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn name(&self, index: LabelId) -> &str {
        &self.labels[index]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Returns the index of the label whose full name equals `name`.
    pub fn index_of(&self, name: &str) -> Option<LabelId> {
        self.labels.iter().position(|label| label == name)
    }

    /// Resolves an identifier to the first label (in index order) whose full
    /// name is a substring of the identifier.
    ///
    /// This is a containment heuristic, not an exact match: with labels
    /// `["a", "ab"]` the identifier `"ab_1"` resolves to label 0.
    pub fn resolve(&self, identifier: &str) -> Result<LabelId> {
        self.labels
            .iter()
            .position(|label| identifier.contains(label.as_str()))
            .ok_or_else(|| Error::UnresolvedLabel {
                identifier: String::from(identifier),
            })
    }

    /// The label text with everything up to and including the first `_`
    /// stripped. Reporting only; matching always uses the full name.
    pub fn display_name(&self, index: LabelId) -> &str {
        let name = self.name(index);
        match name.find('_') {
            Some(pos) => &name[pos + 1..],
            None => name,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        push_u32(&mut buf, self.labels.len() as u32);
        let mut offset = 0u32;
        push_u32(&mut buf, offset);
        for label in &self.labels {
            offset += label.len() as u32;
            push_u32(&mut buf, offset);
        }
        for label in &self.labels {
            buf.extend_from_slice(label.as_bytes());
        }
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let label_count =
            read_u32(bytes, 0).ok_or_else(|| corrupt("truncated label count"))? as usize;
        let mut offsets = Vec::with_capacity(label_count + 1);
        for i in 0..=label_count {
            offsets.push(read_u32(bytes, 4 + 4 * i).ok_or_else(|| corrupt("truncated offsets"))?);
        }
        if offsets[0] != 0 {
            return Err(corrupt("label offsets must start at 0"));
        }
        if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(corrupt("label offsets must be non-decreasing"));
        }
        let body = &bytes[4 + 4 * (label_count + 1)..];
        if body.len() < offsets[label_count] as usize {
            return Err(corrupt("truncated label bytes"));
        }
        let mut labels = Vec::with_capacity(label_count);
        for pair in offsets.windows(2) {
            let text = std::str::from_utf8(&body[pair[0] as usize..pair[1] as usize])
                .map_err(|_| corrupt("label bytes are not valid UTF-8"))?;
            labels.push(String::from(text));
        }
        Ok(Self { labels })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_bytes())?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(&path).map_err(|source| Error::MissingInput {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }
}

fn corrupt(what: &str) -> Error {
    Error::Corrupt(format!("label profile: {}", what))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_catalog() -> LabelCatalog {
        let mut catalog = LabelCatalog::new();
        catalog.register("comment");
        catalog.register("person_student");
        catalog.register("person_teacher");
        catalog
    }

    #[test]
    fn test_register_first_seen_order() {
        let mut catalog = create_catalog();
        assert_eq!(catalog.register("comment"), 0);
        assert_eq!(catalog.register("forum"), 3);
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            ["comment", "person_student", "person_teacher", "forum"]
        );
    }

    #[test]
    fn test_resolve_first_match_in_catalog_order() {
        let catalog = create_catalog();
        assert_eq!(catalog.resolve("comment_42").unwrap(), 0);
        assert_eq!(catalog.resolve("person_student_1").unwrap(), 1);
        assert!(matches!(
            catalog.resolve("forum_1"),
            Err(Error::UnresolvedLabel { .. })
        ));
    }

    #[test]
    fn test_resolve_is_a_containment_scan() {
        let mut catalog = LabelCatalog::new();
        catalog.register("a");
        catalog.register("ab");
        assert_eq!(catalog.resolve("ab_1").unwrap(), 0);
    }

    #[test]
    fn test_display_name_strips_prefix() {
        let catalog = create_catalog();
        assert_eq!(catalog.display_name(0), "comment");
        assert_eq!(catalog.display_name(1), "student");
        assert_eq!(catalog.display_name(2), "teacher");
    }

    #[test]
    fn test_bytes_round_trip() {
        let catalog = create_catalog();
        assert_eq!(LabelCatalog::from_bytes(&catalog.to_bytes()).unwrap(), catalog);
        let empty = LabelCatalog::new();
        assert_eq!(LabelCatalog::from_bytes(&empty.to_bytes()).unwrap(), empty);
    }

    #[test]
    fn test_bytes_layout() {
        let mut catalog = LabelCatalog::new();
        catalog.register("ab");
        catalog.register("c");
        let mut expected = vec![2u8, 0, 0, 0];
        expected.extend_from_slice(&[0, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
        expected.extend_from_slice(b"abc");
        assert_eq!(catalog.to_bytes(), expected);
    }

    #[test]
    fn test_from_bytes_rejects_truncation() {
        let bytes = create_catalog().to_bytes();
        assert!(matches!(
            LabelCatalog::from_bytes(&bytes[..bytes.len() - 1]),
            Err(Error::Corrupt(_))
        ));
        assert!(matches!(
            LabelCatalog::from_bytes(&bytes[..2]),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn test_from_bytes_rejects_bad_offsets() {
        let mut bytes = vec![1u8, 0, 0, 0];
        bytes.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0]);
        bytes.push(b'x');
        assert!(matches!(
            LabelCatalog::from_bytes(&bytes),
            Err(Error::Corrupt(_))
        ));
    }
}
