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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "easel")]
#[command(about = "Recommend charts for tabular data and write chart reports")]
#[command(version)]
pub struct Args {
    #[arg(long, global = true, help = "YAML settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, help = "Set the logging level")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank chart types for a data file and print the recommended configurations
    Recommend {
        file: PathBuf,
        #[arg(long, help = "Column the charts should focus on")]
        target: Option<String>,
        #[arg(long, help = "Maximum number of charts to recommend")]
        max_charts: Option<usize>,
        #[arg(long, help = "Print every chart's score breakdown")]
        explain: bool,
    },
    /// Print the dataset summary, primary recommendation and data quality
    Insights { file: PathBuf },
    /// Write a multi-chart report for a data file
    Report {
        file: PathBuf,
        #[arg(long, default_value = "Data Analysis Report")]
        title: String,
        #[arg(long)]
        target: Option<String>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write a single-chart report of an explicitly chosen chart type
    Chart {
        chart_type: String,
        file: PathBuf,
        #[arg(long, help = "x_column (labels_column for pie, column for histogram)")]
        x: Option<String>,
        #[arg(long, help = "y_column (values_column for pie, column for histogram)")]
        y: Option<String>,
        #[arg(long, value_delimiter = ',', help = "Value columns for stacked charts")]
        y_columns: Vec<String>,
        #[arg(long)]
        bins: Option<i64>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write one report per file, continuing past failures
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
