// Command line utility for building a UMAP report from a Seurat object

use anyhow::Error;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use umap_report::config::{DEFAULT_CONVERSION_SCRIPT, DEFAULT_OUTPUT, DEFAULT_RSCRIPT};
use umap_report::frame::DEFAULT_CLUSTER_COLUMN;
use umap_report::{parse_gene_list, run, ColorScale, ReportConfig};

pub fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("seurat-umap-report")
        .about("Plot the UMAP embedding of a Seurat object colored by metadata columns and gene expression")
        .arg(
            Arg::new("INPUT")
                .help("Seurat .rds file to convert")
                .short('i')
                .long("input")
                .required_unless_present("SKIP_CONVERSION")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("TARGET_GENES")
                .help("Comma-separated genes to color by expression")
                .short('t')
                .long("target_genes"),
        )
        .arg(
            Arg::new("COLOR_CHOICE")
                .help("Color scale for metadata columns")
                .short('c')
                .long("color_choice")
                .default_value("continuous")
                .value_parser(["categorical", "continuous"]),
        )
        .arg(
            Arg::new("RSCRIPT")
                .help("R interpreter used for the conversion")
                .long("rscript")
                .default_value(DEFAULT_RSCRIPT)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("CONVERSION_SCRIPT")
                .help("R script converting the .rds file to h5ad")
                .long("conversion_script")
                .default_value(DEFAULT_CONVERSION_SCRIPT)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("SEARCH_DIR")
                .help("Directory searched for the conversion outputs")
                .short('d')
                .long("search_dir")
                .default_value(".")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("OUTPUT")
                .help("HTML report to write")
                .short('o')
                .long("output")
                .default_value(DEFAULT_OUTPUT)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("CLUSTER_COLUMN")
                .help("obs column holding the clustering shown in hover text")
                .long("cluster_column")
                .default_value(DEFAULT_CLUSTER_COLUMN),
        )
        .arg(
            Arg::new("SKIP_CONVERSION")
                .help("Use conversion outputs already under the search directory")
                .long("skip_conversion")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = ReportConfig {
        input: matches.get_one::<PathBuf>("INPUT").cloned(),
        target_genes: matches
            .get_one::<String>("TARGET_GENES")
            .map(|genes| parse_gene_list(genes))
            .unwrap_or_default(),
        color_scale: matches
            .get_one::<String>("COLOR_CHOICE")
            .map_or(Ok(ColorScale::default()), |s| s.parse())?,
        rscript: matches.get_one::<PathBuf>("RSCRIPT").cloned().unwrap_or_default(),
        conversion_script: matches
            .get_one::<PathBuf>("CONVERSION_SCRIPT")
            .cloned()
            .unwrap_or_default(),
        search_dir: matches.get_one::<PathBuf>("SEARCH_DIR").cloned().unwrap_or_default(),
        output: matches.get_one::<PathBuf>("OUTPUT").cloned().unwrap_or_default(),
        cluster_column: matches
            .get_one::<String>("CLUSTER_COLUMN")
            .cloned()
            .unwrap_or_default(),
        skip_conversion: matches.get_flag("SKIP_CONVERSION"),
    };

    run(&config)?;
    Ok(())
}
