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

//! Per-chart scoring rules.
//!
//! Each auto-scored [`ChartType`] maps to one plain function over a
//! [`ScoringContext`]. Rules are additive: every satisfied check appends a
//! named [`Contribution`] to a [`ScoreCard`], and the score is the card's
//! total clamped to `[0, 1]`. Stacked chart types have no rule and score 0.

use crate::analyzer::FeatureSummary;
use crate::chart::ChartType;
use serde::Serialize;
use std::fmt;

pub mod scoring_weights {
    pub const BAR_CATEGORICAL_AND_NUMERIC: f64 = 0.8;
    pub const BAR_NUMERIC_TARGET_BY_CATEGORY: f64 = 0.6;
    pub const BAR_FEW_CATEGORIES: f64 = 0.4;
    pub const BAR_MODERATE_CATEGORIES: f64 = 0.2;
    pub const BAR_FEW_CATEGORIES_MAX: usize = 10;
    pub const BAR_MODERATE_CATEGORIES_MAX: usize = 20;
    pub const LINE_DATETIME: f64 = 0.9;
    pub const LINE_NUMERIC: f64 = 0.5;
    pub const LINE_NUMERIC_TARGET: f64 = 0.3;
    pub const PIE_SINGLE_PAIR: f64 = 0.7;
    pub const PIE_IDEAL_SLICES: f64 = 0.6;
    pub const PIE_ACCEPTABLE_SLICES: f64 = 0.3;
    pub const PIE_IDEAL_SLICES_MIN: usize = 2;
    pub const PIE_IDEAL_SLICES_MAX: usize = 7;
    pub const PIE_ACCEPTABLE_SLICES_MAX: usize = 10;
    pub const PIE_NON_NEGATIVE_TARGET: f64 = 0.2;
    pub const SCATTER_NUMERIC_PAIR: f64 = 0.8;
    pub const SCATTER_RELATIONSHIP: f64 = 0.4;
    pub const SCATTER_LARGE_DATASET: f64 = 0.2;
    pub const SCATTER_LARGE_DATASET_ROWS: usize = 50;
    pub const AREA_DATETIME: f64 = 0.7;
    pub const AREA_NUMERIC: f64 = 0.5;
    pub const HISTOGRAM_SINGLE_NUMERIC: f64 = 0.8;
    pub const HISTOGRAM_NUMERIC_TARGET: f64 = 0.6;
    pub const HISTOGRAM_ENOUGH_ROWS: f64 = 0.3;
    pub const HISTOGRAM_ENOUGH_ROWS_MIN: usize = 20;
}
use scoring_weights as w;

/// Inputs every rule sees: the summary and an optional target column.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub summary: &'a FeatureSummary,
    pub target: Option<&'a str>,
}
impl<'a> ScoringContext<'a> {
    pub fn new(summary: &'a FeatureSummary, target: Option<&'a str>) -> Self {
        Self { summary, target }
    }
    /// The target column when it names a numeric column; absent targets count as non-numeric.
    pub fn numeric_target(&self) -> Option<&'a str> {
        self.target.filter(|t| self.summary.is_numeric(t))
    }
    fn numeric_count(&self) -> usize {
        self.summary.numeric_columns.len()
    }
    fn categorical_count(&self) -> usize {
        self.summary.categorical_columns.len()
    }
    fn has_datetime(&self) -> bool {
        !self.summary.datetime_columns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub reason: &'static str,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub chart_type: ChartType,
    pub contributions: Vec<Contribution>,
}
impl ScoreCard {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            contributions: Vec::new(),
        }
    }
    fn add(&mut self, reason: &'static str, weight: f64) {
        self.contributions.push(Contribution { reason, weight });
    }
    fn add_if(&mut self, condition: bool, reason: &'static str, weight: f64) {
        if condition {
            self.add(reason, weight);
        }
    }
    pub fn raw_total(&self) -> f64 {
        self.contributions.iter().map(|c| c.weight).sum()
    }
    pub fn score(&self) -> f64 {
        self.raw_total().clamp(0.0, 1.0)
    }
}
impl fmt::Display for ScoreCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2}", self.chart_type, self.score())?;
        for contribution in &self.contributions {
            write!(f, "\n  +{:.1} {}", contribution.weight, contribution.reason)?;
        }
        Ok(())
    }
}

pub type ScoringRule = fn(&ScoringContext<'_>) -> ScoreCard;

const RULES: [(ChartType, ScoringRule); 6] = [
    (ChartType::Bar, bar_rule),
    (ChartType::Line, line_rule),
    (ChartType::Pie, pie_rule),
    (ChartType::Scatter, scatter_rule),
    (ChartType::Area, area_rule),
    (ChartType::Histogram, histogram_rule),
];

pub fn rule_for(chart_type: ChartType) -> Option<ScoringRule> {
    RULES
        .iter()
        .find(|(chart, _)| *chart == chart_type)
        .map(|(_, rule)| *rule)
}

/// Scores one chart type. Chart types without a rule get an empty card.
pub fn score_card(context: &ScoringContext<'_>, chart_type: ChartType) -> ScoreCard {
    rule_for(chart_type).map_or_else(|| ScoreCard::new(chart_type), |rule| rule(context))
}

/// Whether the summary has the value columns a chart type plots.
pub fn has_prerequisites(summary: &FeatureSummary, chart_type: ChartType) -> bool {
    let numeric = summary.numeric_columns.len();
    match chart_type {
        ChartType::Scatter | ChartType::StackedBar | ChartType::StackedArea => numeric >= 2,
        ChartType::Bar | ChartType::Line | ChartType::Pie | ChartType::Area | ChartType::Histogram => {
            numeric >= 1
        }
    }
}

fn bar_rule(ctx: &ScoringContext<'_>) -> ScoreCard {
    let mut card = ScoreCard::new(ChartType::Bar);
    card.add_if(
        ctx.categorical_count() >= 1 && ctx.numeric_count() >= 1,
        "categorical and numeric columns present",
        w::BAR_CATEGORICAL_AND_NUMERIC,
    );
    if let Some(target) = ctx.numeric_target() {
        card.add_if(
            ctx.summary.categorical_columns.iter().any(|c| c != target),
            "numeric target can be compared across categories",
            w::BAR_NUMERIC_TARGET_BY_CATEGORY,
        );
    }
    match ctx.summary.max_categorical_cardinality() {
        Some(max) if max <= w::BAR_FEW_CATEGORIES_MAX => {
            card.add("few categories", w::BAR_FEW_CATEGORIES);
        }
        Some(max) if max <= w::BAR_MODERATE_CATEGORIES_MAX => {
            card.add("moderate number of categories", w::BAR_MODERATE_CATEGORIES);
        }
        _ => {}
    }
    card
}

fn line_rule(ctx: &ScoringContext<'_>) -> ScoreCard {
    let mut card = ScoreCard::new(ChartType::Line);
    card.add_if(ctx.has_datetime(), "datetime column present", w::LINE_DATETIME);
    card.add_if(ctx.numeric_count() >= 1, "numeric column present", w::LINE_NUMERIC);
    card.add_if(
        ctx.numeric_target().is_some(),
        "numeric target",
        w::LINE_NUMERIC_TARGET,
    );
    card
}

fn pie_rule(ctx: &ScoringContext<'_>) -> ScoreCard {
    let mut card = ScoreCard::new(ChartType::Pie);
    card.add_if(
        ctx.numeric_count() == 1 && ctx.categorical_count() == 1,
        "exactly one numeric and one categorical column",
        w::PIE_SINGLE_PAIR,
    );
    let counts: Vec<usize> = ctx.summary.categorical_cardinalities().collect();
    if !counts.is_empty() {
        if counts
            .iter()
            .any(|c| (w::PIE_IDEAL_SLICES_MIN..=w::PIE_IDEAL_SLICES_MAX).contains(c))
        {
            card.add("category count suits slices", w::PIE_IDEAL_SLICES);
        } else if counts.iter().any(|c| *c <= w::PIE_ACCEPTABLE_SLICES_MAX) {
            card.add("category count acceptable for slices", w::PIE_ACCEPTABLE_SLICES);
        }
    }
    if let Some(target) = ctx.numeric_target() {
        card.add_if(
            ctx.summary
                .stats(target)
                .is_none_or(|stats| stats.is_non_negative()),
            "numeric target is non-negative",
            w::PIE_NON_NEGATIVE_TARGET,
        );
    }
    card
}

fn scatter_rule(ctx: &ScoringContext<'_>) -> ScoreCard {
    let mut card = ScoreCard::new(ChartType::Scatter);
    let numeric_pair = ctx.numeric_count() >= 2;
    card.add_if(numeric_pair, "two or more numeric columns", w::SCATTER_NUMERIC_PAIR);
    card.add_if(numeric_pair, "relationship between numeric columns", w::SCATTER_RELATIONSHIP);
    card.add_if(
        ctx.summary.row_count > w::SCATTER_LARGE_DATASET_ROWS,
        "large dataset",
        w::SCATTER_LARGE_DATASET,
    );
    card
}

fn area_rule(ctx: &ScoringContext<'_>) -> ScoreCard {
    let mut card = ScoreCard::new(ChartType::Area);
    card.add_if(ctx.has_datetime(), "datetime column present", w::AREA_DATETIME);
    card.add_if(ctx.numeric_count() >= 1, "numeric column present", w::AREA_NUMERIC);
    card
}

fn histogram_rule(ctx: &ScoringContext<'_>) -> ScoreCard {
    let mut card = ScoreCard::new(ChartType::Histogram);
    card.add_if(
        ctx.numeric_count() == 1,
        "single numeric column",
        w::HISTOGRAM_SINGLE_NUMERIC,
    );
    card.add_if(
        ctx.numeric_target().is_some(),
        "numeric target",
        w::HISTOGRAM_NUMERIC_TARGET,
    );
    card.add_if(
        ctx.summary.row_count >= w::HISTOGRAM_ENOUGH_ROWS_MIN,
        "enough rows for a distribution",
        w::HISTOGRAM_ENOUGH_ROWS,
    );
    card
}
