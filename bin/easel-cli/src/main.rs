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

mod cli;

use clap::Parser;
use cli::{Args, Command, LogLevel};
use easel::chart_config::keys;
use easel::{
    ChartType, ConfigOverrides, ConfigValue, EaselError, EaselSettings, ErrorReporter,
    ReportGenerator,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn setup_logging(log_level: Option<&LogLevel>) {
    let level = log_level.map_or("warn", LogLevel::as_str);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    setup_logging(args.log_level.as_ref());
    if let Err(err) = run(args) {
        match err.downcast_ref::<EaselError>() {
            Some(easel_error) => {
                let reporter = if std::io::stderr().is_terminal() {
                    ErrorReporter::new()
                } else {
                    ErrorReporter::plain()
                };
                eprint!("{}", reporter.report(easel_error));
            }
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let settings = match &args.config {
        Some(path) => EaselSettings::from_yaml_file(path)?,
        None => EaselSettings::default(),
    };
    debug!(?settings, "Settings resolved");
    let mut generator = ReportGenerator::with_settings(settings);
    match args.command {
        Command::Recommend {
            file,
            target,
            max_charts,
            explain,
        } => {
            let summary = generator.load(file)?.clone();
            if explain {
                for card in generator.recommender().explain(&summary, target.as_deref()) {
                    println!("{card}");
                }
                println!();
            }
            let configs = generator.recommend(target.as_deref(), max_charts)?;
            println!("{}", serde_json::to_string_pretty(&configs)?);
        }
        Command::Insights { file } => {
            generator.load(file)?;
            let insights = generator.insights()?;
            println!("{}", insights.summary.report());
            println!("Recommended Chart: {}", insights.recommendation);
            println!("\nData Quality:");
            println!("  - Completeness: {:.1}%", insights.data_quality.completeness);
            println!("  - Numeric Columns: {:.1}%", insights.data_quality.numeric_ratio);
            println!(
                "  - Categorical Columns: {:.1}%",
                insights.data_quality.categorical_ratio
            );
        }
        Command::Report {
            file,
            title,
            target,
            output,
        } => {
            let path = generator.generate_report(
                file,
                &title,
                target.as_deref(),
                None,
                output.as_deref(),
            )?;
            println!("Report written to {}", path.display());
        }
        Command::Chart {
            chart_type,
            file,
            x,
            y,
            y_columns,
            bins,
            output,
        } => {
            let parsed: ChartType = chart_type.parse()?;
            let overrides = chart_overrides(parsed, x, y, y_columns, bins)?;
            let path = generator.generate_single_chart(
                &chart_type,
                file,
                &overrides,
                output.as_deref(),
            )?;
            println!("Chart report written to {}", path.display());
        }
        Command::Batch { files, output_dir } => {
            let output_dir: PathBuf =
                output_dir.unwrap_or_else(|| generator.settings().output_dir.clone());
            let outcome = generator.process_batch(&files, &output_dir)?;
            for path in &outcome.produced {
                println!("Generated: {}", path.display());
            }
            for failure in &outcome.failures {
                eprintln!("Failed: {}: {}", failure.source.display(), failure.error);
            }
            info!(
                produced = outcome.produced.len(),
                failed = outcome.failures.len(),
                "Batch complete"
            );
            if !outcome.is_complete() {
                anyhow::bail!("{} of {} files failed", outcome.failures.len(), files.len());
            }
        }
    }
    Ok(())
}

/// Maps the generic --x/--y flags onto the keys each chart type uses.
/// Histograms bind one column, so giving both flags is rejected.
fn chart_overrides(
    chart_type: ChartType,
    x: Option<String>,
    y: Option<String>,
    y_columns: Vec<String>,
    bins: Option<i64>,
) -> Result<ConfigOverrides, EaselError> {
    if chart_type == ChartType::Histogram && x.is_some() && y.is_some() {
        return Err(EaselError::invalid_input(
            "histogram takes a single column: pass --x or --y, not both",
        ));
    }
    let (x_key, y_key) = match chart_type {
        ChartType::Pie => (keys::LABELS_COLUMN, keys::VALUES_COLUMN),
        ChartType::Histogram => (keys::COLUMN, keys::COLUMN),
        _ => (keys::X_COLUMN, keys::Y_COLUMN),
    };
    let mut overrides = ConfigOverrides::new();
    if let Some(x) = x {
        overrides.insert(x_key.to_string(), ConfigValue::from(x));
    }
    if let Some(y) = y {
        overrides.insert(y_key.to_string(), ConfigValue::from(y));
    }
    if !y_columns.is_empty() {
        overrides.insert(keys::Y_COLUMNS.to_string(), ConfigValue::from(y_columns));
    }
    if let Some(bins) = bins {
        overrides.insert(keys::BINS.to_string(), ConfigValue::from(bins));
    }
    Ok(overrides)
}
