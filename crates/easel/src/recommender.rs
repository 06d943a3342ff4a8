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

use crate::analyzer::{FeatureSummary, StructuralAnalyzer};
use crate::chart::ChartType;
use crate::chart_config::{keys, ChartConfig};
use crate::error::{EaselError, Result};
use crate::scoring::{has_prerequisites, score_card, ScoreCard, ScoringContext};
use crate::settings::{EaselSettings, EnsembleSettings};
use crate::table::{ColumnKind, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

const MIN_HISTOGRAM_BINS: usize = 5;
const MAX_HISTOGRAM_BINS: usize = 30;
const ROWS_PER_HISTOGRAM_BIN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub chart_type: ChartType,
    pub confidence: f64,
}
impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.chart_type, self.confidence)
    }
}

pub fn histogram_bins(row_count: usize) -> usize {
    (row_count / ROWS_PER_HISTOGRAM_BIN).clamp(MIN_HISTOGRAM_BINS, MAX_HISTOGRAM_BINS)
}

#[derive(Debug, Clone)]
pub struct ChartRecommender {
    analyzer: StructuralAnalyzer,
    ensemble: EnsembleSettings,
    max_charts: usize,
}
impl Default for ChartRecommender {
    fn default() -> Self {
        Self::with_settings(&EaselSettings::default())
    }
}
impl ChartRecommender {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_settings(settings: &EaselSettings) -> Self {
        Self {
            analyzer: StructuralAnalyzer::new(),
            ensemble: settings.ensemble.clone(),
            max_charts: settings.max_charts,
        }
    }
    pub fn max_charts(&self) -> usize {
        self.max_charts
    }
    pub fn score(&self, summary: &FeatureSummary, chart_type: ChartType, target: Option<&str>) -> f64 {
        score_card(&ScoringContext::new(summary, target), chart_type).score()
    }
    /// Scores of every auto-scored chart type, in tie-break order.
    pub fn score_all(&self, summary: &FeatureSummary, target: Option<&str>) -> Vec<(ChartType, f64)> {
        let context = ScoringContext::new(summary, target);
        ChartType::SCORED
            .into_iter()
            .map(|chart| (chart, score_card(&context, chart).score()))
            .collect()
    }
    pub fn explain(&self, summary: &FeatureSummary, target: Option<&str>) -> Vec<ScoreCard> {
        let context = ScoringContext::new(summary, target);
        ChartType::SCORED
            .into_iter()
            .map(|chart| score_card(&context, chart))
            .collect()
    }
    pub fn recommend(&self, table: &Table, target: Option<&str>) -> Result<Recommendation> {
        let summary = self.analyzer.analyze(table)?;
        self.recommend_from_summary(&summary, target)
    }
    pub fn recommend_from_summary(
        &self,
        summary: &FeatureSummary,
        target: Option<&str>,
    ) -> Result<Recommendation> {
        require_columns(summary)?;
        self.select_best(summary, checked_target(summary, target))
    }
    /// Arg-max over the chart types whose required columns exist; the first declared wins ties.
    fn select_best(&self, summary: &FeatureSummary, target: Option<&str>) -> Result<Recommendation> {
        let mut best: Option<Recommendation> = None;
        for (chart_type, confidence) in self.score_all(summary, target) {
            if !has_prerequisites(summary, chart_type) {
                debug!(chart = %chart_type, score = confidence, "Chart skipped, required columns missing");
                continue;
            }
            debug!(chart = %chart_type, score = confidence, "Chart scored");
            if best.as_ref().is_none_or(|b| confidence > b.confidence) {
                best = Some(Recommendation {
                    chart_type,
                    confidence,
                });
            }
        }
        let best = best.ok_or_else(|| {
            EaselError::no_data("no chart type has its required columns; the table has no numeric columns")
        })?;
        debug!(chart = %best.chart_type, confidence = best.confidence, "Best chart selected");
        Ok(best)
    }
    pub fn build_config(
        &self,
        table: &Table,
        chart_type: ChartType,
        target: Option<&str>,
    ) -> Result<ChartConfig> {
        let summary = self.analyzer.analyze(table)?;
        self.build_config_from_summary(&summary, chart_type, target)
    }
    pub fn build_config_from_summary(
        &self,
        summary: &FeatureSummary,
        chart_type: ChartType,
        target: Option<&str>,
    ) -> Result<ChartConfig> {
        require_columns(summary)?;
        let target = checked_target(summary, target);
        config_for(summary, chart_type, target)
    }
    /// Stacked charts bind an explicit x column and two or more numeric value columns.
    pub fn build_stacked_config(
        &self,
        table: &Table,
        chart_type: ChartType,
        x_column: &str,
        y_columns: &[String],
    ) -> Result<ChartConfig> {
        if !chart_type.is_stacked() {
            return Err(EaselError::invalid_input(format!(
                "{chart_type} is not a stacked chart type"
            )));
        }
        if table.is_empty() {
            return Err(EaselError::no_data("table has no columns"));
        }
        if table.column(x_column).is_none() {
            return Err(EaselError::invalid_input(format!(
                "x column '{x_column}' not found"
            )));
        }
        if y_columns.len() < 2 {
            return Err(EaselError::invalid_input(format!(
                "{chart_type} needs at least two y columns, got {}",
                y_columns.len()
            )));
        }
        for y in y_columns {
            if y == x_column {
                return Err(EaselError::invalid_input(format!(
                    "y column '{y}' is also the x column"
                )));
            }
            match table.column(y) {
                None => {
                    return Err(EaselError::invalid_input(format!(
                        "y column '{y}' not found"
                    )))
                }
                Some(column) if column.kind() != ColumnKind::Numeric => {
                    return Err(EaselError::invalid_input(format!(
                        "y column '{y}' is {}, not numeric",
                        column.kind()
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(ChartConfig::new(chart_type)
            .with(keys::X_COLUMN, x_column)
            .with(keys::Y_COLUMNS, y_columns.to_vec()))
    }
    pub fn recommend_set(
        &self,
        table: &Table,
        target: Option<&str>,
        max_charts: Option<usize>,
    ) -> Result<Vec<ChartConfig>> {
        let summary = self.analyzer.analyze(table)?;
        self.recommend_set_from_summary(&summary, target, max_charts)
    }
    /// Best chart first, then the fixed scatter, bar and histogram candidates.
    pub fn recommend_set_from_summary(
        &self,
        summary: &FeatureSummary,
        target: Option<&str>,
        max_charts: Option<usize>,
    ) -> Result<Vec<ChartConfig>> {
        require_columns(summary)?;
        let target = checked_target(summary, target);
        let best = self.select_best(summary, target)?;
        let mut configs =
            vec![config_for(summary, best.chart_type, target)?.with_confidence(best.confidence)];
        let numeric = summary.numeric_columns.len();
        let categorical = summary.categorical_columns.len();
        let candidates = [
            (ChartType::Scatter, numeric >= 2, self.ensemble.scatter_confidence),
            (
                ChartType::Bar,
                categorical >= 1 && numeric >= 1,
                self.ensemble.bar_confidence,
            ),
            (ChartType::Histogram, numeric == 1, self.ensemble.histogram_confidence),
        ];
        for (chart_type, eligible, confidence) in candidates {
            if !eligible {
                continue;
            }
            let candidate = config_for(summary, chart_type, None)?.with_confidence(confidence);
            if configs.contains(&candidate) {
                debug!(chart = %chart_type, "Duplicate candidate skipped");
                continue;
            }
            configs.push(candidate);
        }
        configs.truncate(max_charts.unwrap_or(self.max_charts));
        debug!(count = configs.len(), "Recommendation set built");
        Ok(configs)
    }
}

fn first_of(columns: &[String]) -> Option<&str> {
    columns.first().map(String::as_str)
}

fn require_columns(summary: &FeatureSummary) -> Result<()> {
    if summary.column_count == 0 {
        return Err(EaselError::no_data("table has no columns"));
    }
    Ok(())
}

fn checked_target<'a>(summary: &FeatureSummary, target: Option<&'a str>) -> Option<&'a str> {
    match target {
        Some(name) if !summary.has_column(name) => {
            warn!(target_column = name, "Target column not in table, ignoring it");
            None
        }
        other => other,
    }
}

fn config_for(
    summary: &FeatureSummary,
    chart_type: ChartType,
    target: Option<&str>,
) -> Result<ChartConfig> {
    let Some(first) = summary.columns.first().map(String::as_str) else {
        return Err(EaselError::no_data("table has no columns"));
    };
    let second = summary.columns.get(1).map_or(first, String::as_str);
    let numeric_target = target.filter(|t| summary.is_numeric(t));
    let value_column = numeric_target
        .or_else(|| first_of(&summary.numeric_columns))
        .unwrap_or(second);
    let config = ChartConfig::new(chart_type);
    let config = match chart_type {
        ChartType::Bar => config
            .with(
                keys::X_COLUMN,
                first_of(&summary.categorical_columns).unwrap_or(first),
            )
            .with(keys::Y_COLUMN, value_column),
        ChartType::Line | ChartType::Area => config
            .with(
                keys::X_COLUMN,
                first_of(&summary.datetime_columns).unwrap_or(first),
            )
            .with(keys::Y_COLUMN, value_column),
        ChartType::Pie => config
            .with(
                keys::LABELS_COLUMN,
                first_of(&summary.categorical_columns).unwrap_or(first),
            )
            .with(keys::VALUES_COLUMN, value_column),
        ChartType::Scatter => config
            .with(
                keys::X_COLUMN,
                first_of(&summary.numeric_columns).unwrap_or(first),
            )
            .with(
                keys::Y_COLUMN,
                summary
                    .numeric_columns
                    .get(1)
                    .map_or(second, String::as_str),
            ),
        ChartType::Histogram => config
            .with(
                keys::COLUMN,
                numeric_target
                    .or_else(|| first_of(&summary.numeric_columns))
                    .unwrap_or(first),
            )
            .with(keys::BINS, histogram_bins(summary.row_count)),
        ChartType::StackedBar | ChartType::StackedArea => {
            return Err(EaselError::invalid_input(format!(
                "{chart_type} needs explicit x and y columns; use build_stacked_config"
            )))
        }
    };
    Ok(config)
}
