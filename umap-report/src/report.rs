use crate::figure::PlotlyChart;
use anyhow::{Context, Error};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Plotly.js bundle loaded by the report page
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

const SELECT_ID: &str = "umap-select";

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlot {
    /// id of the plot's `<div>`; its panel is `{id}-panel`
    pub id: String,
    /// dropdown text
    pub label: String,
    pub chart: PlotlyChart,
}

/// HTML page of UMAP plots with a dropdown that shows one plot at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    title: String,
    plots: Vec<ReportPlot>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Report {
        Report {
            title: title.into(),
            plots: Vec::new(),
        }
    }

    /// Add a plot and return the id of its `<div>`.
    pub fn push(&mut self, label: impl Into<String>, chart: PlotlyChart) -> &str {
        let id = format!("umap-plot-{}", self.plots.len());
        self.plots.push(ReportPlot {
            id,
            label: label.into(),
            chart,
        });
        &self.plots[self.plots.len() - 1].id
    }

    pub fn plots(&self) -> &[ReportPlot] {
        &self.plots
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    pub fn to_html(&self) -> Result<String, Error> {
        let mut html = String::with_capacity(64 * 1024);
        let title = escape_html(&self.title);

        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html lang=\"en\">")?;
        writeln!(html, "<head>")?;
        writeln!(html, "<meta charset=\"utf-8\"/>")?;
        writeln!(html, "<title>{title}</title>")?;
        writeln!(html, "<script src=\"{PLOTLY_CDN}\" charset=\"utf-8\"></script>")?;
        writeln!(html, "<style>")?;
        writeln!(html, "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;}}")?;
        writeln!(html, "label{{font-weight:bold;margin-right:8px;}}")?;
        writeln!(html, "select{{font-size:14px;padding:4px;margin-bottom:16px;}}")?;
        writeln!(html, ".notice{{color:#8a6d3b;}}")?;
        writeln!(html, "</style>")?;
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;
        writeln!(html, "<h1>{title}</h1>")?;

        if self.plots.is_empty() {
            writeln!(html, "<p class=\"notice\">No plots could be generated.</p>")?;
        } else {
            writeln!(html, "<label for=\"{SELECT_ID}\">Color by</label>")?;
            writeln!(html, "<select id=\"{SELECT_ID}\">")?;
            for plot in &self.plots {
                writeln!(
                    html,
                    "<option value=\"{}-panel\">{}</option>",
                    plot.id,
                    escape_html(&plot.label)
                )?;
            }
            writeln!(html, "</select>")?;

            for (i, plot) in self.plots.iter().enumerate() {
                let display = if i == 0 { "block" } else { "none" };
                writeln!(
                    html,
                    "<div class=\"umap-plot\" id=\"{}-panel\" style=\"display:{display};\">",
                    plot.id
                )?;
                html.push_str(&plot.chart.to_html_fragment(&plot.id)?);
                writeln!(html, "</div>")?;
            }

            writeln!(html, "<script type=\"text/javascript\">")?;
            writeln!(html, "function showUmapPlot(panelId) {{")?;
            writeln!(html, "  document.querySelectorAll('.umap-plot').forEach(function (el) {{")?;
            writeln!(html, "    el.style.display = el.id === panelId ? 'block' : 'none';")?;
            writeln!(html, "  }});")?;
            writeln!(html, "}}")?;
            writeln!(
                html,
                "document.getElementById('{SELECT_ID}').addEventListener('change', function (e) {{ showUmapPlot(e.target.value); }});"
            )?;
            writeln!(html, "</script>")?;
        }

        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;
        Ok(html)
    }

    /// Write the page to `path`, replacing any existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path).with_context(|| path.display().to_string())?);
        writer.write_all(self.to_html()?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::figure::default_plotly_config;
    use serde_json::json;

    fn chart(name: &str) -> PlotlyChart {
        PlotlyChart {
            config: default_plotly_config(),
            data: vec![json!({ "type": "scatter", "name": name, "x": [1.0], "y": [2.0] })],
            layout: json!({ "width": 750 }),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b> & \"c\" 'd'"), "a&lt;b&gt; &amp; &quot;c&quot; &#39;d&#39;");
        assert_eq!(escape_html("RNA_snn_res.0.5"), "RNA_snn_res.0.5");
    }

    #[test]
    fn test_ids() {
        let mut report = Report::new("UMAP plots");
        assert_eq!(report.push("Gene: CD8A", chart("CD8A")), "umap-plot-0");
        assert_eq!(report.push("Column: seurat_clusters", chart("seurat_clusters")), "umap-plot-1");
        assert_eq!(report.len(), 2);
        assert_eq!(report.plots()[1].label, "Column: seurat_clusters");
    }

    #[test]
    fn test_html() {
        let mut report = Report::new("UMAP plots");
        report.push("Gene: CD8A", chart("CD8A"));
        report.push("Column: <weird>", chart("weird"));
        let html = report.to_html().unwrap();

        assert_eq!(html.matches(PLOTLY_CDN).count(), 1);
        assert!(html.contains("<option value=\"umap-plot-0-panel\">Gene: CD8A</option>"));
        assert!(html.contains("<option value=\"umap-plot-1-panel\">Column: &lt;weird&gt;</option>"));
        assert!(html.contains("<div class=\"umap-plot\" id=\"umap-plot-0-panel\" style=\"display:block;\">"));
        assert!(html.contains("<div class=\"umap-plot\" id=\"umap-plot-1-panel\" style=\"display:none;\">"));
        assert!(html.contains("Plotly.newPlot(\"umap-plot-1\""));
        assert!(html.contains("function showUmapPlot(panelId)"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_empty_report() {
        let html = Report::new("UMAP plots").to_html().unwrap();
        assert!(html.contains("No plots could be generated."));
        assert!(!html.contains("<select"));
    }

    #[test]
    fn test_write_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "stale contents").unwrap();

        let mut report = Report::new("UMAP plots");
        report.push("Gene: CD8A", chart("CD8A"));
        report.write(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(!written.contains("stale contents"));
    }
}
