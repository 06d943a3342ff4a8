// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Turns chart configurations into data-series artifacts and writes report
//! documents as JSON or YAML.

use crate::analyzer::FeatureSummary;
use crate::chart::ChartType;
use crate::chart_config::{keys, ChartConfig};
use crate::error::{EaselError, Result};
use crate::recommender::histogram_bins;
use crate::settings::ReportFormat;
use crate::table::{Column, ColumnKind, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

pub trait ChartRenderer {
    fn render_chart(&self, table: &Table, config: &ChartConfig) -> Result<ChartArtifact>;
    fn render_report(
        &self,
        table: &Table,
        summary: &FeatureSummary,
        title: &str,
        charts: &[(String, ChartConfig)],
        output_path: &Path,
    ) -> Result<PathBuf>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: AxisValue,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Points {
        x_column: String,
        y_column: String,
        points: Vec<Point>,
    },
    Slices {
        labels_column: String,
        values_column: String,
        slices: Vec<Slice>,
    },
    Histogram {
        column: String,
        buckets: Vec<Bucket>,
    },
    Stacked {
        x_column: String,
        labels: Vec<String>,
        series: Vec<NamedSeries>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub config: ChartConfig,
    pub data: ChartData,
}
impl ChartArtifact {
    pub fn chart_type(&self) -> ChartType {
        self.config.chart_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum Section {
    Title {
        title: String,
        subtitle: String,
    },
    Summary {
        rows: usize,
        columns: usize,
        numeric_columns: usize,
        categorical_columns: usize,
        datetime_columns: usize,
        total_missing: usize,
    },
    Chart {
        title: String,
        artifact: ChartArtifact,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub id: Uuid,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<Section>,
}
impl ReportDocument {
    pub fn chart_titles(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter_map(|section| match section {
                Section::Chart { title, .. } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }
    pub fn read_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(match ReportFormat::from_path(path) {
            ReportFormat::Json => serde_json::from_str(&content)?,
            ReportFormat::Yaml => serde_yaml::from_str(&content)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRenderer;
impl DocumentRenderer {
    pub fn new() -> Self {
        Self
    }
    pub fn build_report(
        &self,
        table: &Table,
        summary: &FeatureSummary,
        title: &str,
        charts: &[(String, ChartConfig)],
    ) -> Result<ReportDocument> {
        let generated_at = Utc::now();
        let mut sections = Vec::with_capacity(charts.len() + 2);
        sections.push(Section::Title {
            title: title.to_string(),
            subtitle: format!("Generated on {}", generated_at.format("%Y-%m-%d %H:%M")),
        });
        sections.push(Section::Summary {
            rows: summary.row_count,
            columns: summary.column_count,
            numeric_columns: summary.numeric_columns.len(),
            categorical_columns: summary.categorical_columns.len(),
            datetime_columns: summary.datetime_columns.len(),
            total_missing: summary.total_missing(),
        });
        for (chart_title, config) in charts {
            sections.push(Section::Chart {
                title: chart_title.clone(),
                artifact: self.render_chart(table, config)?,
            });
        }
        Ok(ReportDocument {
            id: Uuid::new_v4(),
            title: title.to_string(),
            generated_at,
            sections,
        })
    }
}
impl ChartRenderer for DocumentRenderer {
    fn render_chart(&self, table: &Table, config: &ChartConfig) -> Result<ChartArtifact> {
        let data = match config.chart_type {
            ChartType::Bar | ChartType::Line | ChartType::Area | ChartType::Scatter => {
                render_points(table, config)?
            }
            ChartType::Pie => render_slices(table, config)?,
            ChartType::Histogram => render_histogram(table, config)?,
            ChartType::StackedBar | ChartType::StackedArea => render_stacked(table, config)?,
        };
        debug!(chart = %config.chart_type, "Chart rendered");
        Ok(ChartArtifact {
            config: config.clone(),
            data,
        })
    }
    fn render_report(
        &self,
        table: &Table,
        summary: &FeatureSummary,
        title: &str,
        charts: &[(String, ChartConfig)],
        output_path: &Path,
    ) -> Result<PathBuf> {
        let document = self.build_report(table, summary, title, charts)?;
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let format = ReportFormat::from_path(output_path);
        let content = match format {
            ReportFormat::Json => serde_json::to_string_pretty(&document)?,
            ReportFormat::Yaml => serde_yaml::to_string(&document)?,
        };
        fs::write(output_path, content)?;
        info!(
            path = %output_path.display(),
            format = format.extension(),
            charts = charts.len(),
            report_id = %document.id,
            "Report written"
        );
        Ok(output_path.to_path_buf())
    }
}

fn setting<'a>(config: &'a ChartConfig, key: &str) -> Result<&'a str> {
    config.text(key).ok_or_else(|| {
        EaselError::invalid_input(format!(
            "{} configuration is missing '{key}'",
            config.chart_type
        ))
    })
}

fn column<'a>(table: &'a Table, name: &str) -> Result<&'a Column> {
    table
        .column(name)
        .ok_or_else(|| EaselError::invalid_input(format!("column '{name}' not found")))
}

fn numeric_column<'a>(table: &'a Table, name: &str) -> Result<&'a Column> {
    let column = column(table, name)?;
    if column.kind() != ColumnKind::Numeric {
        return Err(EaselError::invalid_input(format!(
            "column '{name}' is {}, expected numeric values",
            column.kind()
        )));
    }
    Ok(column)
}

fn render_points(table: &Table, config: &ChartConfig) -> Result<ChartData> {
    let x_name = setting(config, keys::X_COLUMN)?;
    let y_name = setting(config, keys::Y_COLUMN)?;
    let x = column(table, x_name)?;
    let y = numeric_column(table, y_name)?;
    let points = (0..table.row_count())
        .filter_map(|i| {
            let y_value = y.data.numeric_at(i)?;
            let x_value = match x.kind() {
                ColumnKind::Numeric => AxisValue::Number(x.data.numeric_at(i)?),
                _ => AxisValue::Text(x.data.display_at(i)?),
            };
            Some(Point {
                x: x_value,
                y: y_value,
            })
        })
        .collect();
    Ok(ChartData::Points {
        x_column: x_name.to_string(),
        y_column: y_name.to_string(),
        points,
    })
}

fn render_slices(table: &Table, config: &ChartConfig) -> Result<ChartData> {
    let labels_name = setting(config, keys::LABELS_COLUMN)?;
    let values_name = setting(config, keys::VALUES_COLUMN)?;
    let labels = column(table, labels_name)?;
    let values = numeric_column(table, values_name)?;
    let mut slices: Vec<Slice> = Vec::new();
    for i in 0..table.row_count() {
        let (Some(label), Some(value)) = (labels.data.display_at(i), values.data.numeric_at(i))
        else {
            continue;
        };
        match slices.iter_mut().find(|s| s.label == label) {
            Some(slice) => slice.value += value,
            None => slices.push(Slice { label, value }),
        }
    }
    Ok(ChartData::Slices {
        labels_column: labels_name.to_string(),
        values_column: values_name.to_string(),
        slices,
    })
}

fn render_histogram(table: &Table, config: &ChartConfig) -> Result<ChartData> {
    let name = setting(config, keys::COLUMN)?;
    let values = numeric_column(table, name)?.data.numeric_values();
    let bins = match config.integer(keys::BINS) {
        Some(bins) if bins >= 1 => usize::try_from(bins).unwrap_or(1),
        Some(bins) => {
            return Err(EaselError::invalid_input(format!(
                "histogram bins must be at least 1, got {bins}"
            )))
        }
        None => histogram_bins(table.row_count()),
    };
    Ok(ChartData::Histogram {
        column: name.to_string(),
        buckets: bucket_counts(&values, bins),
    })
}

/// Equal-width buckets over `[min, max]`; the last bucket is closed on the right.
fn bucket_counts(values: &[f64], bins: usize) -> Vec<Bucket> {
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if min == max {
        return vec![Bucket {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }
    let width = (max - min) / bins as f64;
    let mut buckets: Vec<Bucket> = (0..bins)
        .map(|i| Bucket {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();
    for value in values {
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        buckets[index].count += 1;
    }
    buckets
}

fn render_stacked(table: &Table, config: &ChartConfig) -> Result<ChartData> {
    let x_name = setting(config, keys::X_COLUMN)?;
    let y_names = config.list(keys::Y_COLUMNS).ok_or_else(|| {
        EaselError::invalid_input(format!(
            "{} configuration is missing '{}'",
            config.chart_type,
            keys::Y_COLUMNS
        ))
    })?;
    let x = column(table, x_name)?;
    let labels = (0..table.row_count())
        .map(|i| x.data.display_at(i).unwrap_or_default())
        .collect();
    let series = y_names
        .iter()
        .map(|name| {
            let y = numeric_column(table, name)?;
            Ok(NamedSeries {
                name: name.clone(),
                values: (0..table.row_count())
                    .map(|i| y.data.numeric_at(i).unwrap_or(0.0))
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ChartData::Stacked {
        x_column: x_name.to_string(),
        labels,
        series,
    })
}
