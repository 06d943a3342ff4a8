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

use crate::error::Result;
use crate::table::{ColumnKind, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}
impl NumericStats {
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self::default();
        }
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count >= 2).then(|| {
            let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (sum_sq / (count - 1) as f64).sqrt()
        });
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            count,
            mean: Some(mean),
            std,
            min: sorted.first().copied(),
            q25: Some(linear_quantile(&sorted, 0.25)),
            median: Some(linear_quantile(&sorted, 0.5)),
            q75: Some(linear_quantile(&sorted, 0.75)),
            max: sorted.last().copied(),
        }
    }
    /// True when no value is below zero, including when there are no values.
    pub fn is_non_negative(&self) -> bool {
        self.min.is_none_or(|min| min >= 0.0)
    }
}
fn linear_quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Pairwise Pearson coefficients keyed by column name; `None` where undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub coefficients: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}
impl CorrelationMatrix {
    fn compute(table: &Table, numeric: &[String]) -> Self {
        let series: Vec<Vec<Option<f64>>> = numeric
            .iter()
            .map(|name| {
                table.column(name).map_or_else(Vec::new, |column| {
                    (0..column.len()).map(|i| column.data.numeric_at(i)).collect()
                })
            })
            .collect();
        let mut coefficients: BTreeMap<String, BTreeMap<String, Option<f64>>> = BTreeMap::new();
        for (i, a) in numeric.iter().enumerate() {
            for (j, b) in numeric.iter().enumerate().skip(i) {
                let r = if i == j {
                    Some(1.0)
                } else {
                    pearson(&series[i], &series[j])
                };
                coefficients.entry(a.clone()).or_default().insert(b.clone(), r);
                coefficients.entry(b.clone()).or_default().insert(a.clone(), r);
            }
        }
        Self {
            columns: numeric.to_vec(),
            coefficients,
        }
    }
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.coefficients.get(a).and_then(|row| row.get(b)).copied().flatten()
    }
    /// Defined off-diagonal pairs with |r| at or above `threshold`, strongest first.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<(&str, &str, f64)> {
        let mut pairs = Vec::new();
        for (i, a) in self.columns.iter().enumerate() {
            for b in self.columns.iter().skip(i + 1) {
                if let Some(r) = self.get(a, b).filter(|r| r.abs() >= threshold) {
                    pairs.push((a.as_str(), b.as_str(), r));
                }
            }
        }
        pairs.sort_by(|x, y| y.2.abs().total_cmp(&x.2.abs()));
        pairs
    }
}
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Structural snapshot of a table. Column lists follow table column order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub datetime_columns: Vec<String>,
    pub missing_values: BTreeMap<String, usize>,
    pub distinct_counts: BTreeMap<String, usize>,
    pub numeric_stats: BTreeMap<String, NumericStats>,
    pub correlation: Option<CorrelationMatrix>,
}
impl FeatureSummary {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == column)
    }
    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical_columns.iter().any(|c| c == column)
    }
    pub fn is_datetime(&self, column: &str) -> bool {
        self.datetime_columns.iter().any(|c| c == column)
    }
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
    pub fn cardinality(&self, column: &str) -> Option<usize> {
        self.distinct_counts.get(column).copied()
    }
    pub fn categorical_cardinalities(&self) -> impl Iterator<Item = usize> + '_ {
        self.categorical_columns
            .iter()
            .map(|c| self.cardinality(c).unwrap_or(0))
    }
    pub fn max_categorical_cardinality(&self) -> Option<usize> {
        self.categorical_cardinalities().max()
    }
    pub fn stats(&self, column: &str) -> Option<&NumericStats> {
        self.numeric_stats.get(column)
    }
    pub fn total_cells(&self) -> usize {
        self.row_count * self.column_count
    }
    pub fn total_missing(&self) -> usize {
        self.missing_values.values().sum()
    }
    /// Fraction of non-missing cells; 0.0 for a table without cells.
    pub fn completeness(&self) -> f64 {
        let cells = self.total_cells();
        if cells == 0 {
            return 0.0;
        }
        1.0 - self.total_missing() as f64 / cells as f64
    }
    pub fn numeric_ratio(&self) -> f64 {
        ratio(self.numeric_columns.len(), self.column_count)
    }
    pub fn categorical_ratio(&self) -> f64 {
        ratio(self.categorical_columns.len(), self.column_count)
    }
    pub fn report(&self) -> String {
        let mut report = String::new();
        report.push_str("Dataset Summary\n===============\n");
        report.push_str(&format!(
            "Shape: {} rows x {} columns\n",
            self.row_count, self.column_count
        ));
        report.push_str(&format!("  - Numeric: {}\n", self.numeric_columns.len()));
        report.push_str(&format!(
            "  - Categorical: {}\n",
            self.categorical_columns.len()
        ));
        report.push_str(&format!("  - Datetime: {}\n", self.datetime_columns.len()));
        report.push_str(&format!(
            "\nMissing Values: {} ({:.1}% complete)\n",
            self.total_missing(),
            self.completeness() * 100.0
        ));
        if !self.columns.is_empty() {
            report.push_str("\nColumns:\n");
            for name in &self.columns {
                let role = if self.is_numeric(name) {
                    "numeric"
                } else if self.is_datetime(name) {
                    "datetime"
                } else {
                    "categorical"
                };
                report.push_str(&format!(
                    "  - {} ({}, {} distinct, {} missing)\n",
                    name,
                    role,
                    self.cardinality(name).unwrap_or(0),
                    self.missing_values.get(name).copied().unwrap_or(0)
                ));
            }
        }
        if let Some(correlation) = &self.correlation {
            let strong = correlation.strong_pairs(0.7);
            if !strong.is_empty() {
                report.push_str("\nStrong Correlations:\n");
                for (a, b, r) in strong {
                    report.push_str(&format!("  - {a} / {b}: {r:.2}\n"));
                }
            }
        }
        report
    }
}
impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dataset: {} rows, {} columns ({} numeric, {} categorical, {} datetime)",
            self.row_count,
            self.column_count,
            self.numeric_columns.len(),
            self.categorical_columns.len(),
            self.datetime_columns.len()
        )
    }
}
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralAnalyzer;
impl StructuralAnalyzer {
    pub fn new() -> Self {
        Self
    }
    pub fn analyze(&self, table: &Table) -> Result<FeatureSummary> {
        table.validate()?;
        let mut summary = FeatureSummary {
            row_count: table.row_count(),
            column_count: table.column_count(),
            ..Default::default()
        };
        for column in table.columns() {
            let name = column.name.clone();
            match column.kind() {
                ColumnKind::Numeric => {
                    let stats = NumericStats::from_values(&column.data.numeric_values());
                    summary.numeric_stats.insert(name.clone(), stats);
                    summary.numeric_columns.push(name.clone());
                }
                ColumnKind::Datetime => summary.datetime_columns.push(name.clone()),
                ColumnKind::Categorical | ColumnKind::Boolean => {
                    summary.categorical_columns.push(name.clone());
                }
            }
            summary
                .missing_values
                .insert(name.clone(), column.data.missing_count());
            summary
                .distinct_counts
                .insert(name.clone(), column.data.distinct_count());
            summary.columns.push(name);
        }
        if summary.numeric_columns.len() >= 2 {
            summary.correlation = Some(CorrelationMatrix::compute(table, &summary.numeric_columns));
        }
        debug!(
            rows = summary.row_count,
            columns = summary.column_count,
            numeric = summary.numeric_columns.len(),
            categorical = summary.categorical_columns.len(),
            datetime = summary.datetime_columns.len(),
            "Table analyzed"
        );
        Ok(summary)
    }
}
