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

use crate::error::EaselError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Histogram,
    StackedBar,
    StackedArea,
}
impl ChartType {
    pub const ALL: [ChartType; 8] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Scatter,
        ChartType::Area,
        ChartType::Histogram,
        ChartType::StackedBar,
        ChartType::StackedArea,
    ];
    /// Auto-scored chart types in tie-break order: earlier entries win equal scores.
    pub const SCORED: [ChartType; 6] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Scatter,
        ChartType::Area,
        ChartType::Histogram,
    ];
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Area => "area",
            ChartType::Histogram => "histogram",
            ChartType::StackedBar => "stacked_bar",
            ChartType::StackedArea => "stacked_area",
        }
    }
    /// Title-cased name used in report section headings.
    pub fn title(&self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::Line => "Line",
            ChartType::Pie => "Pie",
            ChartType::Scatter => "Scatter",
            ChartType::Area => "Area",
            ChartType::Histogram => "Histogram",
            ChartType::StackedBar => "Stacked Bar",
            ChartType::StackedArea => "Stacked Area",
        }
    }
    pub fn is_stacked(&self) -> bool {
        matches!(self, ChartType::StackedBar | ChartType::StackedArea)
    }
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(ChartType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for ChartType {
    type Err = EaselError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|chart| chart.as_str() == normalised)
            .ok_or_else(|| EaselError::InvalidChartType {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}
