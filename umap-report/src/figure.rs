use crate::frame::{is_cluster_column, PlotTarget, PlotValues, UmapFrame};
use anyhow::Error;
use plotly::color::Rgb;
use plotly::common::{Marker, Mode, Title};
use plotly::layout::{HoverMode, Margin};
use plotly::{Layout, Scatter};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Width and height of every UMAP plot, in pixels
const PLOT_SIZE: usize = 750;
const MARKER_SIZE: usize = 5;
const HIDDEN_TICKS: &str = "rgba(0,0,0,0)";

/// Plotly's default qualitative palette, cycled for categorical plots.
pub const QUALITATIVE_PALETTE: [usize; 10] = [
    0x636efa, 0xef553b, 0x00cc96, 0xab63fa, 0xffa15a, 0x19d3f3, 0xff6692, 0xb6e880, 0xff97ff, 0xfecb52,
];

/// Colorscale for continuous plots
pub const CONTINUOUS_COLORSCALE: &str = "Plasma";

pub fn hex_num_to_rgb(num: usize) -> [u8; 3] {
    let r = (num >> 16) as u8;
    let g = ((num >> 8) & 0x00FF) as u8;
    let b = (num & 0x0000_00FF) as u8;
    [r, g, b]
}

pub fn default_plotly_config() -> Value {
    json!({ "displaylogo": false, "responsive": false })
}

/// A plotly figure as JSON, ready to be handed to `Plotly.newPlot`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlotlyChart {
    pub config: Value,
    pub data: Vec<Value>,
    pub layout: Value,
}

impl PlotlyChart {
    pub fn with_layout_and_data<D: Serialize>(layout: Layout, data: Vec<D>) -> Result<Self, Error> {
        Ok(PlotlyChart {
            config: default_plotly_config(),
            data: data
                .into_iter()
                .map(|d| serde_json::to_value(&d))
                .collect::<Result<_, _>>()?,
            layout: serde_json::to_value(&layout)?,
        })
    }

    /// A `<div>` holding the chart and the script that draws it. Plotly.js must be loaded by the page.
    pub fn to_html_fragment(&self, div_id: &str) -> Result<String, Error> {
        Ok(format!(
            "<div id=\"{div_id}\" class=\"plotly-graph-div\" style=\"height:{PLOT_SIZE}px; width:{PLOT_SIZE}px;\"></div>\n\
             <script type=\"text/javascript\">\n\
             Plotly.newPlot(\"{div_id}\", {}, {}, {});\n\
             </script>\n",
            script_json(&self.data)?,
            script_json(&self.layout)?,
            script_json(&self.config)?,
        ))
    }
}

/// JSON that is safe to inline in a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> Result<String, Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn plot_title(target: &PlotTarget) -> String {
    match target {
        PlotTarget::Gene(gene) => format!("UMAP Scatterplot Colored by Expression of {gene} Gene"),
        PlotTarget::Metadata(column) => format!("UMAP Scatterplot ({column} clustering)"),
    }
}

/// Hover text lines for the cluster annotations. Column names come from `meta` and values from `customdata`,
/// so no user text is parsed as a template.
fn cluster_hover(frame: &UmapFrame) -> &'static str {
    match &frame.target {
        PlotTarget::Gene(_) => "<br>UMAP cluster=%{customdata[0]}<br>Number of cells in cluster=%{customdata[1]}",
        PlotTarget::Metadata(column) if is_cluster_column(column) => {
            "<br>%{meta[1]}=%{customdata[0]}<br>cells_in_cluster=%{customdata[1]}"
        }
        PlotTarget::Metadata(_) => "<br>%{meta[1]}=%{customdata[0]}",
    }
}

/// `[plotted name, cluster column]`, referenced from hover templates
fn trace_meta(frame: &UmapFrame) -> Value {
    json!([frame.target.name(), frame.cluster_column])
}

/// Per-point `[cluster, cluster size]`, followed by the point's label when given.
fn custom_data(frame: &UmapFrame, rows: &[usize], label: Option<&str>) -> Value {
    Value::Array(
        rows.iter()
            .map(|&r| match label {
                Some(label) => json!([frame.clusters[r], frame.cells_in_cluster[r], label]),
                None => json!([frame.clusters[r], frame.cells_in_cluster[r]]),
            })
            .collect(),
    )
}

/// One trace per label, in first-appearance order.
fn categorical_traces(frame: &UmapFrame, labels: &[String]) -> Result<Vec<Value>, Error> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (row, label) in labels.iter().enumerate() {
        match groups.iter_mut().find(|(l, _)| *l == label.as_str()) {
            Some((_, rows)) => rows.push(row),
            None => groups.push((label.as_str(), vec![row])),
        }
    }

    let hover = cluster_hover(frame);
    groups
        .into_iter()
        .enumerate()
        .map(|(i, (label, rows))| {
            let [r, g, b] = hex_num_to_rgb(QUALITATIVE_PALETTE[i % QUALITATIVE_PALETTE.len()]);
            let trace = Scatter::new(
                rows.iter().map(|&row| frame.umap1[row]).collect(),
                rows.iter().map(|&row| frame.umap2[row]).collect(),
            )
            .mode(Mode::Markers)
            .name(label)
            .marker(Marker::new().color(Rgb::new(r, g, b)).size(MARKER_SIZE))
            .hover_template(&format!("%{{meta[0]}}=%{{customdata[2]}}{hover}<extra></extra>"));

            let mut data = serde_json::to_value(trace)?;
            // Due to plotly API limitations
            data["customdata"] = custom_data(frame, &rows, Some(label));
            data["meta"] = trace_meta(frame);
            data["legendgroup"] = json!(label);
            data["showlegend"] = json!(true);
            Ok::<_, Error>(data)
        })
        .collect()
}

fn continuous_trace(frame: &UmapFrame, values: &[f64]) -> Result<Value, Error> {
    let name = frame.target.name();
    let hover = cluster_hover(frame);
    let trace = Scatter::new(frame.umap1.clone(), frame.umap2.clone())
        .mode(Mode::Markers)
        .name(name)
        .hover_template(&format!("%{{meta[0]}}=%{{marker.color}}{hover}<extra></extra>"));

    let mut data = serde_json::to_value(trace)?;
    let rows: Vec<usize> = (0..frame.len()).collect();
    data["customdata"] = custom_data(frame, &rows, None);
    data["meta"] = trace_meta(frame);
    data["showlegend"] = json!(false);
    data["marker"] = json!({
        "color": values,
        "colorscale": CONTINUOUS_COLORSCALE,
        "showscale": true,
        "size": MARKER_SIZE,
        "colorbar": { "title": { "text": name } },
    });
    Ok(data)
}

/// Square layout with hidden tick labels and equal axis scales.
fn umap_layout(frame: &UmapFrame) -> Layout {
    let categorical = matches!(frame.values, PlotValues::Labels(_));
    Layout::new()
        .title(Title::with_text(plot_title(&frame.target)))
        .margin(Margin::new().left(65).right(65).top(100).bottom(65))
        .hover_mode(HoverMode::Closest)
        .show_legend(categorical)
}

fn patch_layout(layout: &mut Value, frame: &UmapFrame) {
    layout["width"] = json!(PLOT_SIZE);
    layout["height"] = json!(PLOT_SIZE);
    layout["title"]["x"] = json!(0.5);
    layout["xaxis"] = json!({
        "title": { "text": "UMAP1" },
        "tickfont": { "color": HIDDEN_TICKS },
    });
    layout["yaxis"] = json!({
        "title": { "text": "UMAP2" },
        "tickfont": { "color": HIDDEN_TICKS },
        "scaleanchor": "x",
        "scaleratio": 1,
    });
    layout["legend"] = json!({
        "title": { "text": frame.target.name() },
        "itemsizing": "constant",
    });
}

/// Build the scatter plot for one frame.
pub fn umap_figure(frame: &UmapFrame) -> Result<PlotlyChart, Error> {
    let data = match &frame.values {
        PlotValues::Labels(labels) => categorical_traces(frame, labels)?,
        PlotValues::Numbers(values) => vec![continuous_trace(frame, values)?],
    };
    let mut chart = PlotlyChart::with_layout_and_data(umap_layout(frame), data)?;
    patch_layout(&mut chart.layout, frame);
    Ok(chart)
}
