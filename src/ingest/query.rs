//! The query producer: a plain-text edge list against an existing label
//! profile.
//!
//! The text starts with the edge count followed by one whitespace-separated
//! raw-identifier pair per edge; identifiers follow the `<label>_<rank>`
//! convention resolved by [`RankAssigner`].

use crate::{
    catalog::LabelCatalog,
    edge_index::EdgeIndexBuilder,
    error::{Error, Result},
    graph::CsrGraph,
    vertex_map::RankAssigner,
};
use log::info;
use pest::Parser;
use pest_derive::Parser;
use std::collections::BTreeSet;

#[derive(Parser)]
#[grammar = "ingest/query.pest"]
struct QueryParser;

/// Parses the query text into raw edges, checking the declared edge count.
pub fn parse_query(input: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = QueryParser::parse(Rule::query, input)
        .map_err(|err| Error::QuerySyntax(err.to_string()))?;
    let mut inner = pairs.next().unwrap().into_inner();
    let edge_count: usize = inner
        .next()
        .unwrap()
        .as_str()
        .parse()
        .map_err(|_| Error::QuerySyntax(String::from("edge count out of range")))?;
    let mut edges = Vec::new();
    for pair in inner {
        if pair.as_rule() == Rule::edge {
            let mut endpoints = pair.into_inner();
            let src = endpoints.next().unwrap().as_str();
            let dst = endpoints.next().unwrap().as_str();
            edges.push((String::from(src), String::from(dst)));
        }
    }
    if edges.len() != edge_count {
        return Err(Error::QuerySyntax(format!(
            "declared {} edges, found {}",
            edge_count,
            edges.len()
        )));
    }
    Ok(edges)
}

pub fn convert(input: &str, catalog: &LabelCatalog) -> Result<CsrGraph> {
    let edges = parse_query(input)?;
    let vertices: BTreeSet<&str> = edges
        .iter()
        .flat_map(|(src, dst)| vec![src.as_str(), dst.as_str()])
        .collect();
    let assigner = RankAssigner::new(catalog, vertices.iter().copied())?;
    info!("|V|: {} |E|: {}", assigner.vertex_num(), edges.len());
    let mut builder = EdgeIndexBuilder::new(assigner.vertex_num(), catalog.len());
    for (src, dst) in &edges {
        let src_vid = assigner.assign(src)?;
        let dst_vid = assigner.assign(dst)?;
        builder.insert(
            src_vid,
            dst_vid,
            assigner.label_of(src_vid),
            assigner.label_of(dst_vid),
        );
    }
    let (in_sets, out_sets) = builder.into_neighbor_sets();
    Ok(CsrGraph::from_neighbor_sets(
        assigner.offsets().to_vec(),
        in_sets,
        out_sets,
    ))
}
