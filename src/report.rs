// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Reporting adapter - renders results as plain text or JSON

use crate::all_paths::AllPathsStats;
use crate::analysis::{AnalysisReport, Enumeration};
use crate::error::PathError;
use crate::graph::WeightedDigraph;
use crate::metrics::{MetricValue, MetricsReport};
use crate::paths::SuiteReport;
use crate::types::{Edge, GraphSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt::Write;

/// JSON wrapper adding provenance to every payload
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    /// Producing tool
    pub tool: &'static str,
    /// Tool version
    pub version: &'static str,
    /// When the report was rendered
    pub generated_at: DateTime<Utc>,
    /// The report itself
    pub data: &'a T,
}

/// Pretty JSON of `data` wrapped in an [`Envelope`]
///
/// # Errors
/// Serialization failure.
pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
    let envelope = Envelope {
        tool: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        generated_at: Utc::now(),
        data,
    };
    serde_json::to_string_pretty(&envelope).context("Failed to serialize report")
}

/// Terminal styling, disabled for `--no-color`
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    /// Styled output when `color` is set, plain text otherwise
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Palette without escape codes
    #[must_use]
    pub fn plain() -> Self {
        Self::new(false)
    }

    fn heading(self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn good(self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn bad(self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }
}

fn rule(out: &mut String, width: usize) {
    let _ = writeln!(out, "{}", "-".repeat(width));
}

/// A graph's identity plus its full edge list
#[derive(Debug, Clone, Serialize)]
pub struct GraphExport {
    /// Node and edge counts, fingerprint
    pub graph: GraphSummary,
    /// Every edge, ordered by source then target
    pub edges: Vec<Edge>,
}

impl GraphExport {
    /// Snapshot of `graph`
    #[must_use]
    pub fn new(graph: &WeightedDigraph) -> Self {
        Self {
            graph: graph.summary(),
            edges: graph.edges().collect(),
        }
    }
}

/// Graphviz DOT rendering with weights as edge labels
#[must_use]
pub fn render_dot(graph: &WeightedDigraph) -> String {
    let mut dot = String::from("digraph pathyard {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=circle];\n\n");
    for node in graph.nodes() {
        let _ = writeln!(dot, "  {node};");
    }
    dot.push('\n');
    for edge in graph.edges() {
        let _ = writeln!(
            dot,
            "  {} -> {} [label=\"{}\"];",
            edge.source, edge.target, edge.weight
        );
    }
    dot.push_str("}\n");
    dot
}

/// Edge list, one `source -> target (weight)` per line
#[must_use]
pub fn render_edges(graph: &WeightedDigraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_summary(&graph.summary()));
    rule(&mut out, 60);
    for edge in graph.edges() {
        let _ = writeln!(out, "  {:>5} -> {:<5} {}", edge.source, edge.target, edge.weight);
    }
    out
}

/// One-line identity of a graph
#[must_use]
pub fn render_summary(summary: &GraphSummary) -> String {
    format!(
        "Graph {} ({} nodes, {} edges)",
        summary.fingerprint, summary.nodes, summary.edges
    )
}

/// Table of every metric
#[must_use]
pub fn render_metrics(report: &MetricsReport, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Metrics"));
    rule(&mut out, 60);
    for (metric, value) in report.iter() {
        let shown = match value {
            MetricValue::Unavailable(_) => palette.bad(&value.to_string()),
            _ => value.to_string(),
        };
        let _ = writeln!(out, "  {:<28} {}", metric.name(), shown);
    }
    if let Some(communities) = report.communities() {
        let sizes: Vec<String> = communities.iter().map(|c| c.len().to_string()).collect();
        let _ = writeln!(out, "  {:<28} [{}]", "community_sizes", sizes.join(", "));
    }
    out
}

/// Per-algorithm shortest-path results plus the agreement verdict
#[must_use]
pub fn render_suite(report: &SuiteReport, relative_tolerance: f64, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        palette.heading(&format!(
            "Shortest paths {} -> {}",
            report.source, report.target
        ))
    );
    rule(&mut out, 60);

    for (algorithm, outcome) in &report.results {
        let line = match outcome {
            Ok(found) => match &found.path {
                Some(path) => format!(
                    "cost {:.6}, {} hops: {}",
                    found.cost,
                    path.len().saturating_sub(1),
                    join_nodes(path)
                ),
                None => "no path".to_string(),
            },
            Err(e) => palette.bad(&format!("failed: {e}")),
        };
        let _ = writeln!(out, "  {:<24} {}", algorithm.name(), line);
    }

    let verdict = match report.verify_agreement(relative_tolerance) {
        Ok(cost) if cost.is_infinite() => palette.good("all algorithms agree: unreachable"),
        Ok(cost) => palette.good(&format!("all algorithms agree on cost {cost:.6}")),
        Err(PathError::CostMismatch {
            algorithm,
            expected,
            actual,
        }) => palette.bad(&format!(
            "MISMATCH: {algorithm} reported {actual:.6}, expected {expected:.6}"
        )),
        Err(e) => palette.bad(&format!("agreement not checked: {e}")),
    };
    let _ = writeln!(out, "  {verdict}");
    out
}

/// Aggregate statistics of a simple-path enumeration
#[must_use]
pub fn render_all_paths(stats: &AllPathsStats, max_depth: usize, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        palette.heading(&format!("Simple paths (max depth {max_depth})"))
    );
    rule(&mut out, 60);
    let _ = writeln!(out, "  {:<24} {}", "n_paths", stats.n_paths);
    for (name, value) in [
        ("avg_hops", stats.avg_hops),
        ("avg_total_weight", stats.avg_total_weight),
        ("avg_weight_per_hop", stats.avg_weight_per_hop),
    ] {
        let shown = value.map_or_else(|| "undefined".to_string(), |v| format!("{v:.6}"));
        let _ = writeln!(out, "  {name:<24} {shown}");
    }
    if stats.truncated {
        let _ = writeln!(out, "  {}", palette.bad("stopped at the path limit"));
    }
    out
}

/// Full analysis: summary, paths, enumeration and metrics
#[must_use]
pub fn render_analysis(
    report: &AnalysisReport,
    max_depth: usize,
    relative_tolerance: f64,
    palette: Palette,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_summary(&report.graph));
    let _ = writeln!(out);
    out.push_str(&render_suite(&report.paths, relative_tolerance, palette));
    let _ = writeln!(out);
    out.push_str(&render_all_paths(report.all_paths.stats(), max_depth, palette));
    if let Enumeration::TimedOut { budget_ms, .. } = &report.all_paths {
        let _ = writeln!(
            out,
            "  {}",
            palette.bad(&format!("timed out after {budget_ms} ms, statistics are partial"))
        );
    }
    let _ = writeln!(out);
    out.push_str(&render_metrics(&report.metrics, palette));
    let _ = writeln!(out);
    let _ = writeln!(out, "Completed in {} ms", report.elapsed_ms);
    out
}

fn join_nodes(path: &[usize]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WeightedDigraph;
    use crate::metrics::{compute, MetricsConfig};
    use crate::paths::{run_suite, DEFAULT_RELATIVE_TOLERANCE};

    fn chain() -> WeightedDigraph {
        WeightedDigraph::from_edges(3, [(0, 1, 0.5), (1, 2, 0.5)]).unwrap()
    }

    #[test]
    fn test_suite_text_lists_every_algorithm() {
        let report = run_suite(&chain(), 0, 2).unwrap();
        let text = render_suite(&report, DEFAULT_RELATIVE_TOLERANCE, Palette::plain());

        for name in ["dijkstra", "bellman_ford", "a_star", "floyd_warshall", "bidirectional_dijkstra"] {
            assert!(text.contains(name), "{name} missing from:\n{text}");
        }
        assert!(text.contains("0 -> 1 -> 2"));
        assert!(text.contains("agree on cost 1.000000"));
    }

    #[test]
    fn test_unreachable_suite_text() {
        let report = run_suite(&chain(), 2, 0).unwrap();
        let text = render_suite(&report, DEFAULT_RELATIVE_TOLERANCE, Palette::plain());
        assert!(text.contains("no path"));
        assert!(text.contains("unreachable"));
    }

    #[test]
    fn test_undefined_statistics_snapshot() {
        let text = render_all_paths(&AllPathsStats::default(), 3, Palette::plain());
        insta::assert_snapshot!(text, @r"
Simple paths (max depth 3)
------------------------------------------------------------
  n_paths                  0
  avg_hops                 undefined
  avg_total_weight         undefined
  avg_weight_per_hop       undefined
");
    }

    #[test]
    fn test_metrics_text_marks_unavailable() {
        let report = compute(&chain(), &MetricsConfig::default());
        let text = render_metrics(&report, Palette::plain());
        assert!(text.contains("node_connectivity"));
        assert!(text.contains("unavailable"));
    }

    #[test]
    fn test_plain_palette_has_no_escape_codes() {
        let report = compute(&chain(), &MetricsConfig::default());
        assert!(!render_metrics(&report, Palette::plain()).contains('\u{1b}'));
        assert!(render_metrics(&report, Palette::new(true)).contains('\u{1b}'));
    }

    #[test]
    fn test_dot_lists_every_edge() {
        let dot = render_dot(&chain());
        assert!(dot.starts_with("digraph pathyard {"));
        assert!(dot.contains("0 -> 1 [label=\"0.5\"];"));
        assert!(dot.contains("1 -> 2 [label=\"0.5\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_export_carries_summary_and_edges() {
        let json = serde_json::to_value(GraphExport::new(&chain())).unwrap();
        assert_eq!(json["graph"]["nodes"], 3);
        assert_eq!(json["edges"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["edges"][0]["weight"], 0.5);
    }

    #[test]
    fn test_json_envelope() {
        let summary = chain().summary();
        let json: serde_json::Value = serde_json::from_str(&to_json(&summary).unwrap()).unwrap();

        assert_eq!(json["tool"], "pathyard");
        assert_eq!(json["data"]["nodes"], 3);
        assert!(json["generated_at"].is_string());
    }
}
