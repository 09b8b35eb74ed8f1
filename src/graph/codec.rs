//! The binary graph codec.
//!
//! Data graphs and query graphs share one layout, all integers u32
//! little-endian, written contiguously with no padding:
//!
//! ```text
//! u32 vertex_num
//! u32 num_offsets                      (= label_count + 1)
//! u32[num_offsets] vertex_offset
//! u32[vertex_num] in_degree
//! u32[vertex_num] out_degree
//! u32[in_degree[v]] in_neighbors       for v in 0..vertex_num
//! u32[out_degree[v]] out_neighbors     for v in 0..vertex_num
//! ```
//!
//! The byte order is canonical so that files are portable across hosts.

use super::{Adjacency, CsrGraph};
use crate::{
    error::{Error, Result},
    tools::read_u32,
    types::VId,
};
use std::io::{self, Write};

impl CsrGraph {
    pub fn encode<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write_u32(&mut writer, self.vertex_num())?;
        write_u32(&mut writer, self.vertex_offsets.len() as u32)?;
        write_u32s(&mut writer, &self.vertex_offsets)?;
        for degree in self.in_adj.degrees() {
            write_u32(&mut writer, degree)?;
        }
        for degree in self.out_adj.degrees() {
            write_u32(&mut writer, degree)?;
        }
        write_u32s(&mut writer, &self.in_adj.ids)?;
        write_u32s(&mut writer, &self.out_adj.ids)?;
        Ok(())
    }

    /// The exact inverse of [`encode`](CsrGraph::encode): reproduces the
    /// pre-encoding structure bit-for-bit.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let vertex_num = reader.next("vertex_num")?;
        let num_offsets = reader.next("num_offsets")? as usize;
        if num_offsets == 0 {
            return Err(corrupt("num_offsets must be at least 1"));
        }
        let vertex_offsets = reader.take(num_offsets, "vertex_offset")?;
        if vertex_offsets[0] != 0 || *vertex_offsets.last().unwrap() != vertex_num {
            return Err(corrupt("vertex_offset must span 0..vertex_num"));
        }
        if vertex_offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(corrupt("vertex_offset must be non-decreasing"));
        }
        let in_degrees = reader.take(vertex_num as usize, "in_degree")?;
        let out_degrees = reader.take(vertex_num as usize, "out_degree")?;
        let num_in: u64 = in_degrees.iter().map(|&d| d as u64).sum();
        let num_out: u64 = out_degrees.iter().map(|&d| d as u64).sum();
        if num_in != num_out {
            return Err(corrupt("in/out degree sums disagree"));
        }
        let in_ids = reader.take(num_in as usize, "in_neighbors")?;
        let out_ids = reader.take(num_out as usize, "out_neighbors")?;
        if !reader.at_end() {
            return Err(corrupt("trailing bytes after adjacency lists"));
        }
        Ok(CsrGraph {
            vertex_offsets,
            in_adj: Adjacency::from_parts(&in_degrees, in_ids),
            out_adj: Adjacency::from_parts(&out_degrees, out_ids),
        })
    }
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn write_u32s<W: Write>(writer: &mut W, values: &[u32]) -> io::Result<()> {
    for &value in values {
        write_u32(writer, value)?;
    }
    Ok(())
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn next(&mut self, what: &str) -> Result<u32> {
        let value = read_u32(self.buf, self.pos)
            .ok_or_else(|| corrupt(&format!("truncated {}", what)))?;
        self.pos += 4;
        Ok(value)
    }

    fn take(&mut self, count: usize, what: &str) -> Result<Vec<VId>> {
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.next(what)?);
        }
        Ok(values)
    }

    fn at_end(&self) -> bool {
        self.pos == self.buf.len()
    }
}

fn corrupt(what: &str) -> Error {
    Error::Corrupt(format!("graph file: {}", what))
}
