//! The CSV producer: a directory of relational CSV dumps becomes one data
//! graph plus its label profile.
//!
//! A file whose name contains exactly two `_` is a vertex file, anything
//! else an edge file. A vertex file's column containing `id` carries the
//! raw identifier and a column containing `type` the sub-label
//! discriminator; an edge file's two columns containing `.id` carry the
//! source and destination identifiers, with the label text preceding
//! `.id`.

use crate::{
    catalog::LabelCatalog,
    edge_index::{EdgeIndexBuilder, LabelHint},
    error::{Error, Result},
    graph::CsrGraph,
    types::LabelId,
    vertex_map::{VertexMap, VertexPartitions},
};
use csv::{Reader, StringRecord};
use log::info;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::Instant;

/// A super-type column whose vertex population was split into sub-label
/// partitions during discovery.
struct Specific {
    name: String,
    start: LabelId,
}

pub fn convert_dir(dir: &Path) -> Result<(CsrGraph, LabelCatalog)> {
    let (vertex_files, edge_files) = scan_dir(dir)?;

    let start = Instant::now();
    info!("reading vertices...");
    let mut catalog = LabelCatalog::new();
    let mut partitions = VertexPartitions::new();
    let mut specifics = Vec::new();
    for name in &vertex_files {
        read_vertex_file(dir, name, &mut catalog, &mut partitions, &mut specifics)?;
    }
    let map = partitions.seal(catalog.len());
    info!("|V|: {} |Σ|: {}", map.vertex_num(), catalog.len());
    info!("load vertices time: {:.4}s", start.elapsed().as_secs_f64());

    let start = Instant::now();
    info!("reading edges...");
    let mut builder = EdgeIndexBuilder::new(map.vertex_num(), catalog.len());
    for name in &edge_files {
        read_edge_file(dir, name, &catalog, &map, &specifics, &mut builder)?;
    }
    info!("|E|: {}", builder.total_edges());
    info!("load edges time: {:.4}s", start.elapsed().as_secs_f64());

    let (in_sets, out_sets) = builder.into_neighbor_sets();
    let graph = CsrGraph::from_neighbor_sets(map.offsets().to_vec(), in_sets, out_sets);
    info!("|E-|: {} |E+|: {}", graph.edge_num(), graph.edge_num());
    Ok((graph, catalog))
}

fn is_vertex_file(name: &str) -> bool {
    name.matches('_').count() == 2
}

/// Collects the directory's `.csv` files, classified and sorted by name so
/// that label discovery order does not depend on readdir order.
fn scan_dir(dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let entries = fs::read_dir(dir).map_err(|source| Error::MissingInput {
        path: dir.to_path_buf(),
        source,
    })?;
    let (mut vertex_files, mut edge_files) = (Vec::new(), Vec::new());
    for entry in entries {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".csv") {
            continue;
        }
        if is_vertex_file(&name) {
            vertex_files.push(name);
        } else {
            edge_files.push(name);
        }
    }
    if vertex_files.is_empty() && edge_files.is_empty() {
        return Err(Error::MissingInput {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no .csv files"),
        });
    }
    vertex_files.sort();
    edge_files.sort();
    Ok((vertex_files, edge_files))
}

fn open_csv(path: &Path) -> Result<Reader<File>> {
    let file = File::open(path).map_err(|source| Error::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Reader::from_reader(file))
}

fn find_vertex_columns(headers: &StringRecord) -> (Option<usize>, Option<usize>) {
    let (mut id_col, mut type_col) = (None, None);
    for (i, header) in headers.iter().enumerate() {
        if header.contains("id") {
            id_col = Some(i);
        } else if header.contains("type") {
            type_col = Some(i);
        }
    }
    (id_col, type_col)
}

fn field<'a>(
    record: &'a StringRecord,
    index: usize,
    headers: &StringRecord,
    file: &Path,
) -> Result<&'a str> {
    record.get(index).ok_or_else(|| Error::MalformedSchema {
        file: file.to_path_buf(),
        column: String::from(headers.get(index).unwrap_or("")),
    })
}

fn read_vertex_file(
    dir: &Path,
    name: &str,
    catalog: &mut LabelCatalog,
    partitions: &mut VertexPartitions,
    specifics: &mut Vec<Specific>,
) -> Result<()> {
    let path = dir.join(name);
    let mut reader = open_csv(&path)?;
    let headers = reader.headers()?.clone();
    let (id_col, type_col) = find_vertex_columns(&headers);
    let id_col = id_col.ok_or_else(|| Error::MalformedSchema {
        file: path.clone(),
        column: String::from("id"),
    })?;
    let stem = name.split('_').next().unwrap().to_lowercase();
    let first_label = catalog.len();
    match type_col {
        None => {
            let label = catalog.register(&stem);
            for record in reader.records() {
                let record = record?;
                partitions.insert(label, field(&record, id_col, &headers, &path)?);
            }
            info!("\t|{}|: {}", catalog.name(label), partitions.partition_len(label));
        }
        Some(type_col) => {
            specifics.push(Specific {
                name: stem.clone(),
                start: first_label,
            });
            for record in reader.records() {
                let record = record?;
                let sub = format!(
                    "{}_{}",
                    stem,
                    field(&record, type_col, &headers, &path)?.to_lowercase()
                );
                let label = catalog.register(&sub);
                partitions.insert(label, field(&record, id_col, &headers, &path)?);
            }
            for label in first_label..catalog.len() {
                info!("\t|{}|: {}", catalog.name(label), partitions.partition_len(label));
            }
        }
    }
    Ok(())
}

fn find_endpoint_columns(headers: &StringRecord) -> Option<((usize, String), (usize, String))> {
    let mut cols = headers.iter().enumerate().filter_map(|(i, header)| {
        header
            .find(".id")
            .map(|pos| (i, header[..pos].to_lowercase()))
    });
    match (cols.next(), cols.next()) {
        (Some(src), Some(dst)) => Some((src, dst)),
        _ => None,
    }
}

fn hint_for(catalog: &LabelCatalog, specifics: &[Specific], text: &str) -> Result<LabelHint> {
    if let Some(specific) = specifics.iter().find(|specific| specific.name == text) {
        Ok(LabelHint::Prefix {
            start: specific.start,
            name: specific.name.clone(),
        })
    } else {
        catalog
            .index_of(text)
            .map(LabelHint::Exact)
            .ok_or_else(|| Error::UnresolvedLabel {
                identifier: String::from(text),
            })
    }
}

fn read_edge_file(
    dir: &Path,
    name: &str,
    catalog: &LabelCatalog,
    map: &VertexMap,
    specifics: &[Specific],
    builder: &mut EdgeIndexBuilder,
) -> Result<()> {
    let path = dir.join(name);
    let mut reader = open_csv(&path)?;
    let headers = reader.headers()?.clone();
    let ((src_col, src_text), (dst_col, dst_text)) =
        find_endpoint_columns(&headers).ok_or_else(|| Error::MalformedSchema {
            file: path.clone(),
            column: String::from(".id"),
        })?;
    let src_hint = hint_for(catalog, specifics, &src_text)?;
    let dst_hint = hint_for(catalog, specifics, &dst_text)?;
    for record in reader.records() {
        let record = record?;
        let raw_src = field(&record, src_col, &headers, &path)?;
        let raw_dst = field(&record, dst_col, &headers, &path)?;
        builder.insert_raw(map, catalog, &src_hint, &dst_hint, raw_src, raw_dst, &path)?;
    }
    report_edge_counts(catalog, builder, &src_hint, &dst_hint);
    Ok(())
}

fn report_edge_counts(
    catalog: &LabelCatalog,
    builder: &EdgeIndexBuilder,
    src_hint: &LabelHint,
    dst_hint: &LabelHint,
) {
    for src_label in src_hint.run(catalog) {
        for dst_label in dst_hint.run(catalog) {
            let count = builder.edge_count(src_label, dst_label);
            if count > 0 {
                info!(
                    "\t|{}->{}|: {}",
                    catalog.name(src_label),
                    catalog.name(dst_label),
                    count
                );
            }
        }
    }
}
