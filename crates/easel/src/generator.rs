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
use crate::chart_config::{keys, ChartConfig, ConfigOverrides};
use crate::error::{EaselError, Result};
use crate::reader::{DataSource, FileTableReader, TableReader};
use crate::recommender::{ChartRecommender, Recommendation};
use crate::renderer::{ChartRenderer, DocumentRenderer};
use crate::settings::EaselSettings;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Data-quality ratios, all expressed as percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub completeness: f64,
    pub numeric_ratio: f64,
    pub categorical_ratio: f64,
}
impl DataQuality {
    pub fn from_summary(summary: &FeatureSummary) -> Self {
        Self {
            completeness: summary.completeness() * 100.0,
            numeric_ratio: summary.numeric_ratio() * 100.0,
            categorical_ratio: summary.categorical_ratio() * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub summary: FeatureSummary,
    pub recommendation: Recommendation,
    pub data_quality: DataQuality,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub source: PathBuf,
    pub error: EaselError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub produced: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
}
impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
struct LoadedTable {
    source: String,
    table: Table,
    summary: FeatureSummary,
}

/// Loads a table once and drives recommendation and report writing over it.
pub struct ReportGenerator<R = FileTableReader, W = DocumentRenderer> {
    settings: EaselSettings,
    reader: R,
    renderer: W,
    analyzer: StructuralAnalyzer,
    recommender: ChartRecommender,
    loaded: Option<LoadedTable>,
}
impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_settings(EaselSettings::default())
    }
    pub fn with_settings(settings: EaselSettings) -> Self {
        let reader = FileTableReader::with_options(settings.reader.clone());
        Self::with_components(settings, reader, DocumentRenderer::new())
    }
}
impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
impl<R: TableReader, W: ChartRenderer> ReportGenerator<R, W> {
    pub fn with_components(settings: EaselSettings, reader: R, renderer: W) -> Self {
        let recommender = ChartRecommender::with_settings(&settings);
        Self {
            settings,
            reader,
            renderer,
            analyzer: StructuralAnalyzer::new(),
            recommender,
            loaded: None,
        }
    }
    pub fn settings(&self) -> &EaselSettings {
        &self.settings
    }
    pub fn recommender(&self) -> &ChartRecommender {
        &self.recommender
    }
    pub fn table(&self) -> Option<&Table> {
        self.loaded.as_ref().map(|l| &l.table)
    }
    pub fn summary(&self) -> Option<&FeatureSummary> {
        self.loaded.as_ref().map(|l| &l.summary)
    }
    pub fn load(&mut self, source: impl Into<DataSource>) -> Result<&FeatureSummary> {
        let source = source.into();
        let description = source.describe();
        let table = match source {
            DataSource::Path(path) => self.reader.read(&path)?,
            DataSource::Table(table) => table,
        };
        let summary = self.analyzer.analyze(&table)?;
        info!(
            source = %description,
            rows = summary.row_count,
            columns = summary.column_count,
            "Data loaded"
        );
        let loaded = self.loaded.insert(LoadedTable {
            source: description,
            table,
            summary,
        });
        Ok(&loaded.summary)
    }
    fn require_loaded(&self, operation: &str) -> Result<&LoadedTable> {
        self.loaded
            .as_ref()
            .ok_or_else(|| EaselError::missing_state(operation))
    }
    pub fn recommend(
        &self,
        target: Option<&str>,
        max_charts: Option<usize>,
    ) -> Result<Vec<ChartConfig>> {
        let loaded = self.require_loaded("recommend")?;
        self.recommender
            .recommend_set_from_summary(&loaded.summary, target, max_charts)
    }
    pub fn insights(&self) -> Result<Insights> {
        let loaded = self.require_loaded("insights")?;
        let recommendation = self
            .recommender
            .recommend_from_summary(&loaded.summary, None)?;
        Ok(Insights {
            summary: loaded.summary.clone(),
            recommendation,
            data_quality: DataQuality::from_summary(&loaded.summary),
        })
    }
    pub fn generate_report(
        &mut self,
        source: impl Into<DataSource>,
        title: &str,
        target: Option<&str>,
        chart_configs: Option<Vec<ChartConfig>>,
        output_path: Option<&Path>,
    ) -> Result<PathBuf> {
        self.load(source)?;
        let configs = match chart_configs {
            Some(configs) => configs,
            None => self.recommend(target, None)?,
        };
        let charts: Vec<(String, ChartConfig)> = configs
            .into_iter()
            .enumerate()
            .map(|(i, config)| (format!("{} Chart {}", config.chart_type.title(), i + 1), config))
            .collect();
        let output_path = output_path.map_or_else(
            || self.default_output(&title.replace(' ', "_")),
            Path::to_path_buf,
        );
        self.write_report(title, &charts, &output_path)
    }
    /// Renders one explicitly chosen chart type; stacked types take their columns from `overrides`.
    pub fn generate_single_chart(
        &mut self,
        chart_type: &str,
        source: impl Into<DataSource>,
        overrides: &ConfigOverrides,
        output_path: Option<&Path>,
    ) -> Result<PathBuf> {
        let chart_type: ChartType = chart_type.parse()?;
        self.load(source)?;
        let loaded = self.require_loaded("generate_single_chart")?;
        let mut config = if chart_type.is_stacked() {
            let x_column = overrides
                .get(keys::X_COLUMN)
                .and_then(|v| v.as_text())
                .ok_or_else(|| {
                    EaselError::invalid_input(format!("{chart_type} needs an x_column override"))
                })?;
            let y_columns = overrides
                .get(keys::Y_COLUMNS)
                .and_then(|v| v.as_list())
                .ok_or_else(|| {
                    EaselError::invalid_input(format!("{chart_type} needs a y_columns override"))
                })?;
            self.recommender
                .build_stacked_config(&loaded.table, chart_type, x_column, y_columns)?
        } else {
            self.recommender
                .build_config_from_summary(&loaded.summary, chart_type, None)?
        };
        config.apply_overrides(overrides);
        if let Some(unknown) = config
            .referenced_columns()
            .into_iter()
            .find(|name| !loaded.summary.has_column(name))
        {
            return Err(EaselError::invalid_input(format!(
                "{chart_type} chart refers to column '{unknown}', which is not in the table"
            )));
        }
        let title = format!("{} Chart Analysis", chart_type.title());
        let charts = vec![(format!("{} Chart", chart_type.title()), config)];
        let output_path = output_path.map_or_else(
            || self.default_output(&format!("{}_chart", chart_type.as_str())),
            Path::to_path_buf,
        );
        self.write_report(&title, &charts, &output_path)
    }
    /// One report per source; a failing source is recorded and the batch moves on.
    pub fn process_batch(&mut self, sources: &[PathBuf], output_dir: &Path) -> Result<BatchOutcome> {
        fs::create_dir_all(output_dir)?;
        let extension = self.settings.report_format.extension();
        let mut outcome = BatchOutcome::default();
        for source in sources {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("dataset")
                .to_string();
            let output = output_dir.join(format!("{stem}_analysis.{extension}"));
            let title = format!("{stem} Analysis");
            match self.generate_report(source.as_path(), &title, None, None, Some(output.as_path())) {
                Ok(path) => outcome.produced.push(path),
                Err(error) => {
                    warn!(source = %source.display(), error = %error, "Batch item failed");
                    outcome.failures.push(BatchFailure {
                        source: source.clone(),
                        error,
                    });
                }
            }
        }
        info!(
            produced = outcome.produced.len(),
            failed = outcome.failures.len(),
            "Batch finished"
        );
        Ok(outcome)
    }
    fn default_output(&self, stem: &str) -> PathBuf {
        self.settings
            .output_dir
            .join(format!("{stem}.{}", self.settings.report_format.extension()))
    }
    fn write_report(
        &self,
        title: &str,
        charts: &[(String, ChartConfig)],
        output_path: &Path,
    ) -> Result<PathBuf> {
        let loaded = self.require_loaded("generate_report")?;
        info!(source = %loaded.source, title, charts = charts.len(), "Generating report");
        self.renderer.render_report(
            &loaded.table,
            &loaded.summary,
            title,
            charts,
            output_path,
        )
    }
}
