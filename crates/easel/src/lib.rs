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

pub mod analyzer;
pub mod chart;
pub mod chart_config;
pub mod error;
pub mod generator;
pub mod reader;
pub mod recommender;
pub mod renderer;
pub mod scoring;
pub mod settings;
pub mod table;

pub use analyzer::{CorrelationMatrix, FeatureSummary, NumericStats, StructuralAnalyzer};
pub use chart::ChartType;
pub use chart_config::{ChartConfig, ConfigOverrides, ConfigValue};
pub use error::{ConfigError, EaselError, ErrorReporter, ErrorSeverity, Result};
pub use generator::{BatchFailure, BatchOutcome, DataQuality, Insights, ReportGenerator};
pub use reader::{DataSource, FileTableReader, ReaderOptions, SourceFormat, TableReader};
pub use recommender::{ChartRecommender, Recommendation};
pub use renderer::{ChartArtifact, ChartData, ChartRenderer, DocumentRenderer, ReportDocument, Section};
pub use scoring::{ScoreCard, ScoringContext};
pub use settings::{EaselSettings, EnsembleSettings, ReportFormat};
pub use table::{Column, ColumnData, ColumnKind, Table, TableBuilder};
