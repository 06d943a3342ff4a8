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

use easel::chart_config::keys;
use easel::renderer::{AxisValue, Point, Slice};
use easel::{
    ChartConfig, ChartData, ChartRenderer, ChartType, ConfigOverrides, ConfigValue,
    DocumentRenderer, EaselError, EaselSettings, ReportDocument, ReportGenerator, Section,
    StructuralAnalyzer, Table,
};
use std::fs;
use tempfile::TempDir;

const SALES_CSV: &str = "Region,Sales,Cost\n\
    North,10,4\n\
    South,20,8\n\
    North,5,\n\
    East,,3\n";

fn generator_in(dir: &TempDir) -> ReportGenerator {
    ReportGenerator::with_settings(EaselSettings {
        output_dir: dir.path().join("reports"),
        ..Default::default()
    })
}

fn small_table() -> Table {
    Table::builder()
        .categorical("Region", [Some("North"), Some("South"), Some("North"), None])
        .numeric("Sales", [Some(10.0), Some(20.0), Some(5.0), Some(1.0)])
        .numeric("Cost", [Some(4.0), None, Some(2.0), Some(3.0)])
        .build()
        .unwrap()
}

#[test]
fn test_points_drop_rows_without_y() {
    let config = ChartConfig::new(ChartType::Bar)
        .with(keys::X_COLUMN, "Region")
        .with(keys::Y_COLUMN, "Cost");
    let artifact = DocumentRenderer::new()
        .render_chart(&small_table(), &config)
        .unwrap();
    match artifact.data {
        ChartData::Points { points, .. } => assert_eq!(
            points,
            vec![
                Point {
                    x: AxisValue::Text("North".to_string()),
                    y: 4.0
                },
                Point {
                    x: AxisValue::Text("North".to_string()),
                    y: 2.0
                },
            ]
        ),
        other => panic!("unexpected artifact {other:?}"),
    }
}

#[test]
fn test_pie_sums_values_per_label() {
    let config = ChartConfig::new(ChartType::Pie)
        .with(keys::LABELS_COLUMN, "Region")
        .with(keys::VALUES_COLUMN, "Sales");
    let artifact = DocumentRenderer::new()
        .render_chart(&small_table(), &config)
        .unwrap();
    match artifact.data {
        ChartData::Slices { slices, .. } => assert_eq!(
            slices,
            vec![
                Slice {
                    label: "North".to_string(),
                    value: 15.0
                },
                Slice {
                    label: "South".to_string(),
                    value: 20.0
                },
            ]
        ),
        other => panic!("unexpected artifact {other:?}"),
    }
}

#[test]
fn test_stacked_series_fill_missing_with_zero() {
    let config = ChartConfig::new(ChartType::StackedBar)
        .with(keys::X_COLUMN, "Region")
        .with(
            keys::Y_COLUMNS,
            vec!["Sales".to_string(), "Cost".to_string()],
        );
    let artifact = DocumentRenderer::new()
        .render_chart(&small_table(), &config)
        .unwrap();
    match artifact.data {
        ChartData::Stacked { labels, series, .. } => {
            assert_eq!(labels, vec!["North", "South", "North", ""]);
            assert_eq!(series[1].name, "Cost");
            assert_eq!(series[1].values, vec![4.0, 0.0, 2.0, 3.0]);
        }
        other => panic!("unexpected artifact {other:?}"),
    }
}

#[test]
fn test_renderer_rejects_unknown_or_mismatched_columns() {
    let renderer = DocumentRenderer::new();
    let table = small_table();
    let unknown = ChartConfig::new(ChartType::Line)
        .with(keys::X_COLUMN, "Region")
        .with(keys::Y_COLUMN, "Profit");
    assert!(matches!(
        renderer.render_chart(&table, &unknown),
        Err(EaselError::InvalidInput { .. })
    ));
    let text_values = ChartConfig::new(ChartType::Histogram).with(keys::COLUMN, "Region");
    assert!(matches!(
        renderer.render_chart(&table, &text_values),
        Err(EaselError::InvalidInput { .. })
    ));
    let missing_key = ChartConfig::new(ChartType::Scatter).with(keys::X_COLUMN, "Sales");
    assert!(matches!(
        renderer.render_chart(&table, &missing_key),
        Err(EaselError::InvalidInput { .. })
    ));
}

#[test]
fn test_report_document_sections() {
    let dir = TempDir::new().unwrap();
    let table = small_table();
    let summary = StructuralAnalyzer::new().analyze(&table).unwrap();
    let charts = vec![(
        "Bar Chart 1".to_string(),
        ChartConfig::new(ChartType::Bar)
            .with(keys::X_COLUMN, "Region")
            .with(keys::Y_COLUMN, "Sales"),
    )];
    let output = dir.path().join("nested/dir/report.yaml");
    let path = DocumentRenderer::new()
        .render_report(&table, &summary, "Quarterly", &charts, &output)
        .unwrap();
    assert_eq!(path, output);
    let document = ReportDocument::read_from(&path).unwrap();
    assert_eq!(document.title, "Quarterly");
    assert_eq!(document.sections.len(), 3);
    match &document.sections[0] {
        Section::Title { subtitle, .. } => assert!(subtitle.starts_with("Generated on ")),
        other => panic!("expected title section, got {other:?}"),
    }
    match &document.sections[1] {
        Section::Summary {
            rows,
            columns,
            numeric_columns,
            categorical_columns,
            total_missing,
            ..
        } => {
            assert_eq!((*rows, *columns), (4, 3));
            assert_eq!((*numeric_columns, *categorical_columns), (2, 1));
            assert_eq!(*total_missing, 2);
        }
        other => panic!("expected summary section, got {other:?}"),
    }
    assert_eq!(document.chart_titles(), vec!["Bar Chart 1"]);
}

#[test]
fn test_operations_need_a_loaded_table() {
    let generator = ReportGenerator::new();
    assert!(matches!(
        generator.recommend(None, None),
        Err(EaselError::MissingState { .. })
    ));
    assert!(matches!(
        generator.insights(),
        Err(EaselError::MissingState { .. })
    ));
}

#[test]
fn test_generate_report_uses_recommendations() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("sales.csv");
    fs::write(&source, SALES_CSV).unwrap();
    let mut generator = generator_in(&dir);
    let path = generator
        .generate_report(source.as_path(), "Sales Overview", None, None, None)
        .unwrap();
    assert_eq!(path, dir.path().join("reports").join("Sales_Overview.json"));
    let document = ReportDocument::read_from(&path).unwrap();
    assert_eq!(
        document.chart_titles(),
        vec!["Bar Chart 1", "Scatter Chart 2", "Bar Chart 3"]
    );
    assert!(generator.table().is_some());
}

#[test]
fn test_text_only_table_has_no_report() {
    let dir = TempDir::new().unwrap();
    let names = Table::builder()
        .categorical_dense("Name", (0..30).map(|i| ["ann", "bo", "cy", "di"][i % 4]))
        .build()
        .unwrap();
    let mut generator = generator_in(&dir);
    let output = dir.path().join("names.json");
    let result = generator.generate_report(names, "Names", None, None, Some(output.as_path()));
    assert!(matches!(result, Err(EaselError::NoData { .. })));
    assert!(!output.exists());
    assert!(matches!(generator.insights(), Err(EaselError::NoData { .. })));
}

#[test]
fn test_generate_report_with_explicit_configs() {
    let dir = TempDir::new().unwrap();
    let mut generator = generator_in(&dir);
    let configs = vec![ChartConfig::new(ChartType::Histogram)
        .with(keys::COLUMN, "Sales")
        .with(keys::BINS, 2usize)];
    let output = dir.path().join("custom.json");
    let path = generator
        .generate_report(small_table(), "Custom", None, Some(configs), Some(output.as_path()))
        .unwrap();
    let document = ReportDocument::read_from(&path).unwrap();
    assert_eq!(document.chart_titles(), vec!["Histogram Chart 1"]);
}

#[test]
fn test_single_chart_report() {
    let dir = TempDir::new().unwrap();
    let mut generator = generator_in(&dir);
    let mut overrides = ConfigOverrides::new();
    overrides.insert(keys::Y_COLUMN.to_string(), ConfigValue::from("Cost"));
    let path = generator
        .generate_single_chart("line", small_table(), &overrides, None)
        .unwrap();
    assert_eq!(path, dir.path().join("reports").join("line_chart.json"));
    let document = ReportDocument::read_from(&path).unwrap();
    assert_eq!(document.title, "Line Chart Analysis");
    match document.sections.last() {
        Some(Section::Chart { artifact, .. }) => {
            assert_eq!(artifact.config.text(keys::X_COLUMN), Some("Region"));
            assert_eq!(artifact.config.text(keys::Y_COLUMN), Some("Cost"));
        }
        other => panic!("expected chart section, got {other:?}"),
    }
}

#[test]
fn test_single_chart_rejects_unknown_override_column() {
    let dir = TempDir::new().unwrap();
    let mut generator = generator_in(&dir);
    let mut overrides = ConfigOverrides::new();
    overrides.insert(keys::X_COLUMN.to_string(), ConfigValue::from("Profit"));
    let output = dir.path().join("bar.json");
    let result = generator.generate_single_chart("bar", small_table(), &overrides, Some(output.as_path()));
    match result {
        Err(EaselError::InvalidInput { reason }) => assert!(reason.contains("'Profit'")),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_single_stacked_chart_takes_columns_from_overrides() {
    let dir = TempDir::new().unwrap();
    let mut generator = generator_in(&dir);
    let mut overrides = ConfigOverrides::new();
    overrides.insert(keys::X_COLUMN.to_string(), ConfigValue::from("Region"));
    overrides.insert(
        keys::Y_COLUMNS.to_string(),
        ConfigValue::from(vec!["Sales".to_string(), "Cost".to_string()]),
    );
    let output = dir.path().join("stacked.json");
    let path = generator
        .generate_single_chart("stacked_area", small_table(), &overrides, Some(output.as_path()))
        .unwrap();
    let document = ReportDocument::read_from(&path).unwrap();
    assert_eq!(document.title, "Stacked Area Chart Analysis");

    let missing = generator.generate_single_chart(
        "stacked_bar",
        small_table(),
        &ConfigOverrides::new(),
        Some(output.as_path()),
    );
    assert!(matches!(missing, Err(EaselError::InvalidInput { .. })));
}

#[test]
fn test_single_chart_rejects_unknown_type() {
    let dir = TempDir::new().unwrap();
    let mut generator = generator_in(&dir);
    let result =
        generator.generate_single_chart("radar", small_table(), &ConfigOverrides::new(), None);
    match result {
        Err(EaselError::InvalidChartType { name, valid }) => {
            assert_eq!(name, "radar");
            assert!(valid.contains("stacked_bar"));
        }
        other => panic!("expected InvalidChartType, got {other:?}"),
    }
    assert!(generator.table().is_none());
}

#[test]
fn test_insights_report_quality_ratios() {
    let mut generator = ReportGenerator::new();
    generator.load(small_table()).unwrap();
    let insights = generator.insights().unwrap();
    assert_eq!(insights.recommendation.chart_type, ChartType::Bar);
    assert!((insights.data_quality.completeness - 100.0 * 10.0 / 12.0).abs() < 1e-9);
    assert!((insights.data_quality.numeric_ratio - 200.0 / 3.0).abs() < 1e-9);
    assert!((insights.data_quality.categorical_ratio - 100.0 / 3.0).abs() < 1e-9);

    generator.load(Table::empty()).unwrap();
    assert!(matches!(generator.insights(), Err(EaselError::NoData { .. })));
}

#[test]
fn test_batch_continues_past_failures() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("q1.csv");
    fs::write(&good, SALES_CSV).unwrap();
    let also_good = dir.path().join("q2.json");
    fs::write(&also_good, r#"[{"Score": 1}, {"Score": 2}, {"Score": 3}]"#).unwrap();
    let unsupported = dir.path().join("notes.txt");
    fs::write(&unsupported, "hello").unwrap();
    let absent = dir.path().join("missing.csv");

    let out = dir.path().join("batch");
    let mut generator = generator_in(&dir);
    let outcome = generator
        .process_batch(
            &[good, unsupported.clone(), also_good, absent.clone()],
            &out,
        )
        .unwrap();
    assert_eq!(
        outcome.produced,
        vec![out.join("q1_analysis.json"), out.join("q2_analysis.json")]
    );
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].source, unsupported);
    assert!(matches!(
        outcome.failures[0].error,
        EaselError::UnsupportedFormat { .. }
    ));
    assert_eq!(outcome.failures[1].source, absent);
    let document = ReportDocument::read_from(&out.join("q1_analysis.json")).unwrap();
    assert_eq!(document.title, "q1 Analysis");
}
