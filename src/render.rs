//! Rendering sinks for resolved charts.
//!
//! Plotting itself belongs to whatever front end consumes the output; the
//! crate ships a terminal table sink and a JSON sink that hands the payload
//! and the [`RenderConfig`] to an external plotter. Style settings always
//! travel as an explicit value, never as global state.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    chart::{ChartPayload, ResolvedChart},
    fields::CanonicalField,
    table::{format_optional, render_table},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Preferred font families, first installed one wins.
    pub font_families: Vec<String>,
    pub fallback_font: String,
    /// Figure size in inches.
    pub width: f64,
    pub height: f64,
    pub dpi: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_families: ["NanumGothic", "Malgun Gothic", "AppleGothic", "Noto Sans CJK KR"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            fallback_font: "DejaVu Sans".to_string(),
            width: 12.0,
            height: 8.0,
            dpi: 300,
        }
    }
}

/// Opaque rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

pub trait ChartSink {
    fn render(&self, chart: &ResolvedChart, config: &RenderConfig) -> Result<Artifact>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn sink(self) -> Box<dyn ChartSink> {
        match self {
            OutputFormat::Table => Box::new(TextSink),
            OutputFormat::Json => Box::new(JsonSink),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink;

#[derive(Serialize)]
struct JsonDocument<'a> {
    render: &'a RenderConfig,
    chart: &'a ResolvedChart,
}

impl ChartSink for JsonSink {
    fn render(&self, chart: &ResolvedChart, config: &RenderConfig) -> Result<Artifact> {
        let document = JsonDocument {
            render: config,
            chart,
        };
        let mut bytes =
            serde_json::to_vec_pretty(&document).context("Serializing chart payload to JSON")?;
        bytes.push(b'\n');
        Ok(Artifact {
            media_type: "application/json",
            bytes,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSink;

impl ChartSink for TextSink {
    fn render(&self, chart: &ResolvedChart, _config: &RenderConfig) -> Result<Artifact> {
        let decimals = chart.spec.decimals;
        let mut text = format!("{}\n\n", chart.spec.title);
        match &chart.payload {
            ChartPayload::Profile {
                labels,
                values,
                substituted,
                summary,
                self_evaluation,
                ..
            } => {
                text.push_str(&vector_table(labels, values, substituted, decimals));
                if let (Some(summary), Some(self_evaluation)) = (summary, self_evaluation) {
                    text.push_str(&format!(
                        "\n{}: {summary}\n{}: {self_evaluation}\n",
                        CanonicalField::SummaryText.label(),
                        CanonicalField::SelfEvaluation.label()
                    ));
                }
            }
            ChartPayload::Delta {
                labels,
                values,
                substituted,
                ..
            } => text.push_str(&vector_table(labels, values, substituted, decimals)),
            ChartPayload::Means {
                labels,
                means,
                std_devs,
                counts,
            } => {
                let headers = strings(&["item", "count", "mean", "std_dev"]);
                let rows = labels
                    .iter()
                    .enumerate()
                    .map(|(idx, label)| {
                        vec![
                            label.clone(),
                            counts[idx].to_string(),
                            format_optional(means[idx], decimals),
                            format_optional(std_devs[idx], decimals),
                        ]
                    })
                    .collect::<Vec<_>>();
                text.push_str(&render_table(&headers, &rows));
            }
            ChartPayload::Correlation { labels, matrix } => {
                let mut headers = vec![String::new()];
                headers.extend(labels.iter().cloned());
                let rows = labels
                    .iter()
                    .zip(matrix)
                    .map(|(label, row)| {
                        let mut cells = vec![label.clone()];
                        cells.extend(row.iter().map(|value| format_optional(*value, decimals)));
                        cells
                    })
                    .collect::<Vec<_>>();
                text.push_str(&render_table(&headers, &rows));
            }
            ChartPayload::Comparison { labels, series } => {
                let mut headers = vec!["student".to_string()];
                headers.extend(labels.iter().cloned());
                let rows = series
                    .iter()
                    .map(|line| {
                        let mut cells = vec![line.student.clone()];
                        cells.extend(line.values.iter().map(|value| format!("{value:.decimals$}")));
                        cells
                    })
                    .collect::<Vec<_>>();
                text.push_str(&render_table(&headers, &rows));
            }
        }
        Ok(Artifact {
            media_type: "text/plain; charset=utf-8",
            bytes: text.into_bytes(),
        })
    }
}

fn vector_table(
    labels: &[String],
    values: &[f64],
    substituted: &[CanonicalField],
    decimals: usize,
) -> String {
    let headers = strings(&["item", "score", "note"]);
    let rows = labels
        .iter()
        .zip(values)
        .map(|(label, value)| {
            let missing = substituted.iter().any(|field| field.label() == label.as_str());
            vec![
                label.clone(),
                format!("{value:.decimals$}"),
                if missing {
                    "not available".to_string()
                } else {
                    String::new()
                },
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartKind, ChartSpec};

    fn means_chart() -> ResolvedChart {
        ResolvedChart {
            spec: ChartSpec {
                kind: ChartKind::Means,
                title: "means".to_string(),
                y_label: None,
                y_range: None,
                decimals: 2,
            },
            payload: ChartPayload::Means {
                labels: vec!["긴장도".to_string(), "집중도".to_string()],
                means: vec![Some(1.5), None],
                std_devs: vec![Some(0.70710678), None],
                counts: vec![2, 0],
            },
        }
    }

    #[test]
    fn text_sink_prints_not_available_statistics() {
        let artifact = TextSink
            .render(&means_chart(), &RenderConfig::default())
            .unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.starts_with("means\n"));
        assert!(text.contains("긴장도  2      1.50  0.71"));
        assert!(text.contains("집중도  0      n/a   n/a"));
    }

    #[test]
    fn json_sink_carries_render_config() {
        let artifact = JsonSink
            .render(&means_chart(), &RenderConfig::default())
            .unwrap();
        assert_eq!(artifact.media_type, "application/json");
        let value: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(value["render"]["dpi"], 300);
        assert_eq!(value["chart"]["payload"]["kind"], "means");
        assert!(value["chart"]["payload"]["means"][1].is_null());
    }
}
