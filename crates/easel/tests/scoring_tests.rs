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

use chrono::NaiveDate;
use easel::scoring::has_prerequisites;
use easel::{
    ChartRecommender, ChartRenderer, ChartType, DocumentRenderer, EaselError, FeatureSummary, StructuralAnalyzer,
    Table,
};
use proptest::prelude::*;

/// Table with the given column counts; categorical columns cycle through `cardinality` labels.
fn shaped_table(
    numeric: usize,
    categorical: usize,
    datetime: usize,
    rows: usize,
    cardinality: usize,
) -> Table {
    let mut builder = Table::builder();
    for n in 0..numeric {
        builder = builder.numeric_dense(&format!("num_{n}"), (0..rows).map(|r| (r * (n + 1)) as f64));
    }
    for c in 0..categorical {
        builder = builder.categorical_dense(
            &format!("cat_{c}"),
            (0..rows).map(|r| format!("label_{}", r % cardinality.max(1))),
        );
    }
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    for d in 0..datetime {
        builder = builder.datetime(
            &format!("date_{d}"),
            (0..rows).map(|r| start.map(|s| s + chrono::Duration::days(r as i64))),
        );
    }
    builder.build().unwrap()
}

fn summarize(table: &Table) -> FeatureSummary {
    StructuralAnalyzer::new().analyze(table).unwrap()
}

#[test]
fn test_region_sales_prefers_bar() {
    let table = Table::builder()
        .categorical_dense("Region", (0..20).map(|i| ["N", "S", "E", "W", "C"][i % 5]))
        .numeric_dense("Sales", (0..20).map(|i| 100.0 + i as f64))
        .build()
        .unwrap();
    let recommender = ChartRecommender::new();
    let summary = summarize(&table);
    assert_eq!(recommender.score(&summary, ChartType::Bar, None), 1.0);
    let best = recommender.recommend(&table, None).unwrap();
    assert_eq!(best.chart_type, ChartType::Bar);
    assert_eq!(best.confidence, 1.0);
}

#[test]
fn test_dated_revenue_prefers_line() {
    let table = shaped_table(1, 0, 1, 12, 1);
    let recommender = ChartRecommender::new();
    let summary = summarize(&table);
    assert_eq!(recommender.score(&summary, ChartType::Line, None), 1.0);
    assert_eq!(recommender.score(&summary, ChartType::Area, None), 1.0);
    let best = recommender.recommend(&table, None).unwrap();
    assert_eq!(best.chart_type, ChartType::Line);
}

#[test]
fn test_single_numeric_column_prefers_histogram() {
    let table = shaped_table(1, 0, 0, 50, 1);
    let recommender = ChartRecommender::new();
    let summary = summarize(&table);
    assert_eq!(recommender.score(&summary, ChartType::Histogram, None), 1.0);
    assert_eq!(recommender.score(&summary, ChartType::Line, None), 0.5);
    let best = recommender.recommend(&table, None).unwrap();
    assert_eq!(best.chart_type, ChartType::Histogram);
    assert_eq!(best.confidence, 1.0);
}

#[test]
fn test_bar_cardinality_bonus_steps_down() {
    let recommender = ChartRecommender::new();
    let few = summarize(&shaped_table(1, 1, 0, 40, 8));
    let moderate = summarize(&shaped_table(1, 1, 0, 40, 15));
    let many = summarize(&shaped_table(1, 1, 0, 40, 30));
    let card = |summary: &FeatureSummary| {
        recommender
            .explain(summary, None)
            .into_iter()
            .find(|c| c.chart_type == ChartType::Bar)
            .unwrap()
    };
    assert!((card(&few).raw_total() - 1.2).abs() < 1e-9);
    assert!((card(&moderate).raw_total() - 1.0).abs() < 1e-9);
    assert!((card(&many).raw_total() - 0.8).abs() < 1e-9);
}

#[test]
fn test_numeric_target_adds_bonuses() {
    let table = shaped_table(2, 1, 0, 10, 30);
    let summary = summarize(&table);
    let recommender = ChartRecommender::new();
    assert_eq!(recommender.score(&summary, ChartType::Histogram, None), 0.0);
    assert_eq!(recommender.score(&summary, ChartType::Histogram, Some("num_0")), 0.6);
    assert_eq!(recommender.score(&summary, ChartType::Line, Some("num_0")), 0.8);
    // Categorical and absent targets are not numeric.
    assert_eq!(recommender.score(&summary, ChartType::Line, Some("cat_0")), 0.5);
    assert_eq!(recommender.score(&summary, ChartType::Line, Some("missing")), 0.5);
}

#[test]
fn test_stacked_types_are_not_auto_scored() {
    let summary = summarize(&shaped_table(3, 1, 1, 60, 4));
    let recommender = ChartRecommender::new();
    assert_eq!(recommender.score(&summary, ChartType::StackedBar, None), 0.0);
    assert_eq!(recommender.score(&summary, ChartType::StackedArea, None), 0.0);
    let scored: Vec<ChartType> = recommender
        .score_all(&summary, None)
        .into_iter()
        .map(|(chart, _)| chart)
        .collect();
    assert_eq!(scored, ChartType::SCORED.to_vec());
}

#[test]
fn test_ties_resolve_in_declared_order() {
    // Bar, pie and histogram all reach 1.0 here; bar is declared first.
    let table = shaped_table(1, 1, 0, 20, 5);
    let recommender = ChartRecommender::new();
    let summary = summarize(&table);
    for chart in [ChartType::Bar, ChartType::Pie, ChartType::Histogram] {
        assert_eq!(recommender.score(&summary, chart, None), 1.0);
    }
    assert_eq!(recommender.recommend(&table, None).unwrap().chart_type, ChartType::Bar);
}

fn shape() -> impl Strategy<Value = (usize, usize, usize, usize, usize)> {
    (0usize..4, 0usize..3, 0usize..2, 1usize..80, 1usize..25)
}

proptest! {
    #[test]
    fn test_bar_scores_high_with_categories_and_numbers((n, c, d, rows, k) in shape()) {
        prop_assume!(n >= 1 && c >= 1);
        let summary = summarize(&shaped_table(n, c, d, rows, k));
        prop_assert!(ChartRecommender::new().score(&summary, ChartType::Bar, None) >= 0.8);
    }

    #[test]
    fn test_datetime_drives_line_and_area((n, c, rows, k) in (0usize..4, 0usize..3, 1usize..80, 1usize..25)) {
        let summary = summarize(&shaped_table(n, c, 1, rows, k));
        let recommender = ChartRecommender::new();
        prop_assert!(recommender.score(&summary, ChartType::Line, None) >= 0.9);
        prop_assert!(recommender.score(&summary, ChartType::Area, None) >= 0.7);
    }

    #[test]
    fn test_scatter_needs_two_numeric_columns((c, d, rows, k) in (0usize..3, 0usize..2, 1usize..80, 1usize..25), n in 0usize..2) {
        let summary = summarize(&shaped_table(n, c, d, rows, k));
        prop_assert!(ChartRecommender::new().score(&summary, ChartType::Scatter, None) <= 0.2);
    }

    #[test]
    fn test_scores_stay_in_unit_interval((n, c, d, rows, k) in shape(), target in prop::option::of("(num|cat|date)_[0-2]")) {
        let summary = summarize(&shaped_table(n, c, d, rows, k));
        let recommender = ChartRecommender::new();
        for chart in ChartType::ALL {
            let score = recommender.score(&summary, chart, target.as_deref());
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_recommendation_is_a_nonzero_arg_max((n, c, d, rows, k) in shape()) {
        prop_assume!(n >= 1);
        let table = shaped_table(n, c, d, rows, k);
        let recommender = ChartRecommender::new();
        let summary = summarize(&table);
        let best = recommender.recommend(&table, None).unwrap();
        let eligible: Vec<(ChartType, f64)> = recommender
            .score_all(&summary, None)
            .into_iter()
            .filter(|(chart, _)| has_prerequisites(&summary, *chart))
            .collect();
        let max = eligible.iter().map(|(_, s)| *s).fold(0.0, f64::max);
        prop_assert_eq!(best.confidence, max);
        if max > 0.0 {
            prop_assert!(best.confidence > 0.0);
        }
        let first_max = eligible.iter().find(|(_, s)| *s == max).map(|(chart, _)| *chart);
        prop_assert_eq!(Some(best.chart_type), first_max);
        match best.chart_type {
            ChartType::Scatter => {
                prop_assert!(n >= 2);
            }
            ChartType::Bar | ChartType::Line | ChartType::Pie | ChartType::Area | ChartType::Histogram => {
                prop_assert!(n >= 1);
            }
            ChartType::StackedBar | ChartType::StackedArea => {
                prop_assert!(false, "stacked chart recommended");
            }
        }
        let config = recommender.build_config(&table, best.chart_type, None).unwrap();
        for column in config.referenced_columns() {
            prop_assert!(summary.has_column(column));
        }
        prop_assert!(DocumentRenderer::new().render_chart(&table, &config).is_ok());
    }

    #[test]
    fn test_no_numeric_columns_means_no_recommendation((c, d, rows, k) in (0usize..3, 0usize..2, 1usize..80, 1usize..25)) {
        prop_assume!(c + d > 0);
        let table = shaped_table(0, c, d, rows, k);
        let recommender = ChartRecommender::new();
        let single_is_no_data = matches!(recommender.recommend(&table, None), Err(EaselError::NoData { .. }));
        prop_assert!(single_is_no_data);
        let set_is_no_data = matches!(recommender.recommend_set(&table, None, None), Err(EaselError::NoData { .. }));
        prop_assert!(set_is_no_data);
    }
}
