use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use lpcsr::{
    catalog::LabelCatalog,
    error::{Error as ConvertError, Result as ConvertResult},
    graph::CsrGraph,
    ingest,
};
use log::info;
use memmap::Mmap;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;
use std::time::Instant;

fn handle_csv(matches: &ArgMatches) -> ConvertResult<()> {
    let input_dir = Path::new(matches.value_of("INPUT").unwrap());
    let graph_path = matches.value_of("GRAPH").unwrap();
    let label_path = matches.value_of("LABEL").unwrap();
    info!("csv files: {}", input_dir.display());
    info!("data graph: {}", graph_path);
    info!("label profile: {}", label_path);
    let (graph, catalog) = ingest::csv::convert_dir(input_dir)?;
    let start = Instant::now();
    info!("storing graph and labels...");
    let mut buf = Vec::new();
    graph.encode(&mut buf)?;
    fs::write(graph_path, buf)?;
    catalog.save(label_path)?;
    info!("store time: {:.4}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn handle_query(matches: &ArgMatches) -> ConvertResult<()> {
    let query_path = Path::new(matches.value_of("QUERY").unwrap());
    let label_path = matches.value_of("LABEL").unwrap();
    let output_path = matches.value_of("OUTPUT").unwrap();
    info!("input query graph: {}", query_path.display());
    info!("label profile: {}", label_path);
    info!("output query graph: {}", output_path);
    let start = Instant::now();
    let catalog = LabelCatalog::load(label_path)?;
    for index in 0..catalog.len() {
        info!("\t{}", catalog.display_name(index));
    }
    info!("|Σ|: {}", catalog.len());
    info!("load label profile time: {:.4}s", start.elapsed().as_secs_f64());
    let query_text =
        std::fs::read_to_string(query_path).map_err(|source| ConvertError::MissingInput {
            path: query_path.to_path_buf(),
            source,
        })?;
    let graph = ingest::query::convert(&query_text, &catalog)?;
    let mut buf = Vec::new();
    graph.encode(&mut buf)?;
    fs::write(output_path, buf)?;
    Ok(())
}

fn handle_display(matches: &ArgMatches) -> ConvertResult<()> {
    let graph_path = Path::new(matches.value_of("GRAPH").unwrap());
    let file = File::open(graph_path).map_err(|source| ConvertError::MissingInput {
        path: graph_path.to_path_buf(),
        source,
    })?;
    let mmap = unsafe { Mmap::map(&file) }?;
    let graph = CsrGraph::decode(&mmap)?;
    if let Some(label_path) = matches.value_of("LABEL") {
        let catalog = LabelCatalog::load(label_path)?;
        for index in 0..catalog.len() {
            println!(
                "{}: {} ({})",
                index,
                catalog.display_name(index),
                catalog.name(index)
            );
        }
    }
    println!("{}", graph);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let matches = App::new("lpcsr")
        .about("Label-partitioned CSR graph conversion")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("csv")
                .about("Converts a directory of CSV dumps into a data graph")
                .arg(
                    Arg::with_name("INPUT")
                        .short("i")
                        .help("The CSV directory")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("GRAPH")
                        .short("g")
                        .help("The output data graph file")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("LABEL")
                        .short("l")
                        .help("The output label profile file")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("query")
                .about("Converts a plain-text query into a query graph")
                .arg(
                    Arg::with_name("QUERY")
                        .short("q")
                        .help("The input query text file")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("OUTPUT")
                        .short("o")
                        .help("The output query graph file")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("LABEL")
                        .short("l")
                        .help("The label profile file")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("display")
                .about("Pretty-prints a binary graph file")
                .arg(Arg::with_name("GRAPH").required(true))
                .arg(
                    Arg::with_name("LABEL")
                        .short("l")
                        .help("The label profile file")
                        .takes_value(true),
                ),
        )
        .get_matches();
    if let Some(matches) = matches.subcommand_matches("csv") {
        handle_csv(matches)?;
    } else if let Some(matches) = matches.subcommand_matches("query") {
        handle_query(matches)?;
    } else if let Some(matches) = matches.subcommand_matches("display") {
        handle_display(matches)?;
    }
    Ok(())
}
