use crate::config::ReportConfig;
use crate::convert::RdsConverter;
use crate::discovery::ConversionOutputs;
use crate::dropdown::read_dropdown_columns;
use crate::figure::{umap_figure, PlotlyChart};
use crate::frame::{PlotTarget, UmapFrame};
use crate::report::Report;
use anyhow::{format_err, Context, Error};
use hdf5_io::read_h5ad;
use log::{info, warn};
use scan_types::AnnotatedMatrix;
use std::path::PathBuf;

pub const REPORT_TITLE: &str = "Seurat UMAP plots";

/// Outcome of a report run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// plots written to the report
    pub rendered: usize,
    /// plots that failed and were left out
    pub skipped: usize,
    pub output: PathBuf,
}

/// Split a comma-separated gene list, trimming names and dropping empty entries.
pub fn parse_gene_list(arg: &str) -> Vec<String> {
    arg.split(',')
        .map(str::trim)
        .filter(|gene| !gene.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn dropdown_label(target: &PlotTarget) -> String {
    match target {
        PlotTarget::Gene(gene) => format!("{gene} expression"),
        PlotTarget::Metadata(column) => column.clone(),
    }
}

fn render(data: &AnnotatedMatrix, target: &PlotTarget, config: &ReportConfig) -> Result<PlotlyChart, Error> {
    let frame = UmapFrame::build(data, target, config.color_scale, &config.cluster_column)?;
    umap_figure(&frame)
}

/// Convert, discover the conversion outputs, and write one UMAP plot per gene and metadata column.
///
/// Plots that cannot be built are logged and skipped; failures before plotting or while writing the
/// report abort the run.
pub fn run(config: &ReportConfig) -> Result<RunSummary, Error> {
    if config.skip_conversion {
        info!("skipping conversion");
    } else {
        let input = config
            .input
            .as_ref()
            .ok_or_else(|| format_err!("an input .rds file is required unless conversion is skipped"))?;
        RdsConverter::new(&config.rscript, &config.conversion_script).run(input)?;
    }

    let outputs = ConversionOutputs::discover(&config.search_dir)?;
    let columns = read_dropdown_columns(&outputs.dropdown)?;
    let data = read_h5ad(&outputs.h5ad, !config.target_genes.is_empty())?;

    let targets: Vec<PlotTarget> = config
        .target_genes
        .iter()
        .cloned()
        .map(PlotTarget::Gene)
        .chain(columns.into_iter().map(PlotTarget::Metadata))
        .collect();

    let mut report = Report::new(REPORT_TITLE);
    let mut skipped = 0;
    for target in &targets {
        match render(&data, target, config) {
            Ok(chart) => {
                report.push(dropdown_label(target), chart);
            }
            Err(e) => {
                warn!("skipping plot for {target}: {e:#}");
                skipped += 1;
            }
        }
    }

    report
        .write(&config.output)
        .with_context(|| format!("writing report {}", config.output.display()))?;
    info!(
        "finished: {} plots written to {}, {} skipped",
        report.len(),
        config.output.display(),
        skipped
    );

    Ok(RunSummary {
        rendered: report.len(),
        skipped,
        output: config.output.clone(),
    })
}
