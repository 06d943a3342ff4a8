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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum EaselError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("Unsupported data format: {format}")]
    UnsupportedFormat { format: String },
    #[error("No data: {reason}")]
    NoData { reason: String },
    #[error("No table loaded: call load() before {operation}")]
    MissingState { operation: String },
    #[error("Invalid chart type '{name}'. Valid types: {valid}")]
    InvalidChartType { name: String, valid: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read data file '{path}': {source}")]
    DataFile {
        path: String,
        #[source]
        source: polars::error::PolarsError,
    },
    #[error("Failed to read spreadsheet '{path}': {reason}")]
    Spreadsheet { path: String, reason: String },
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] SerialisationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
#[derive(Error, Debug)]
pub enum SerialisationError {
    #[error("JSON serialisation failed: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("YAML serialisation failed: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file '{path}': {reason}")]
    SettingsFile { path: String, reason: String },
    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}
pub type Result<T> = std::result::Result<T, EaselError>;
impl From<serde_json::Error> for EaselError {
    fn from(err: serde_json::Error) -> Self {
        EaselError::Serialisation(SerialisationError::Json { source: err })
    }
}
impl From<serde_yaml::Error> for EaselError {
    fn from(err: serde_yaml::Error) -> Self {
        EaselError::Serialisation(SerialisationError::Yaml { source: err })
    }
}
impl EaselError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        EaselError::InvalidInput {
            reason: reason.into(),
        }
    }
    pub fn no_data(reason: impl Into<String>) -> Self {
        EaselError::NoData {
            reason: reason.into(),
        }
    }
    pub fn missing_state(operation: &str) -> Self {
        EaselError::MissingState {
            operation: operation.to_string(),
        }
    }
    pub fn category(&self) -> &'static str {
        match self {
            EaselError::InvalidInput { .. } => "Input",
            EaselError::UnsupportedFormat { .. } => "Format",
            EaselError::NoData { .. } => "Data",
            EaselError::MissingState { .. } => "State",
            EaselError::InvalidChartType { .. } => "Chart",
            EaselError::Io(_) | EaselError::DataFile { .. } | EaselError::Spreadsheet { .. } => {
                "I/O"
            }
            EaselError::Serialisation(_) => "Serialisation",
            EaselError::Config(_) => "Configuration",
        }
    }
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            EaselError::UnsupportedFormat { .. } => vec![
                "Supported extensions are .csv, .json, .xlsx and .xls".to_string(),
                "Check the file extension matches its contents".to_string(),
            ],
            EaselError::NoData { .. } => vec![
                "Check the file has a header row".to_string(),
                "Charts need at least one numeric column to plot".to_string(),
            ],
            EaselError::MissingState { .. } => {
                vec!["Load a data source before asking for recommendations".to_string()]
            }
            EaselError::InvalidChartType { valid, .. } => {
                vec![format!("Use one of: {valid}")]
            }
            EaselError::InvalidInput { .. } => vec![
                "Check column names against the loaded table".to_string(),
                "Make sure all columns have the same number of rows".to_string(),
            ],
            _ => vec!["Check the error message for specific guidance".to_string()],
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            EaselError::NoData { reason } => format!("No chart can be recommended: {reason}."),
            EaselError::MissingState { .. } => {
                "No data has been loaded yet. Load a CSV, JSON or Excel file first.".to_string()
            }
            _ => self.to_string(),
        }
    }
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EaselError::NoData { .. } | EaselError::MissingState { .. } => ErrorSeverity::Warning,
            EaselError::Config(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}
impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }
    pub fn color_code(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "\x1b[36m",
            ErrorSeverity::Warning => "\x1b[33m",
            ErrorSeverity::Error => "\x1b[31m",
            ErrorSeverity::Critical => "\x1b[35m",
        }
    }
}
pub struct ErrorReporter {
    pub show_suggestions: bool,
    pub colored_output: bool,
}
impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            show_suggestions: true,
            colored_output: true,
        }
    }
    pub fn plain() -> Self {
        Self {
            show_suggestions: true,
            colored_output: false,
        }
    }
    pub fn report(&self, error: &EaselError) -> String {
        let severity = error.severity();
        let mut output = String::new();
        if self.colored_output {
            output.push_str(severity.color_code());
        }
        output.push_str(&format!(
            "[{}] {}: {}\n",
            severity.as_str(),
            error.category(),
            error.user_message()
        ));
        if self.colored_output {
            output.push_str("\x1b[0m");
        }
        if self.show_suggestions {
            let suggestions = error.suggestions();
            if !suggestions.is_empty() {
                output.push_str("\nSuggestions:\n");
                for suggestion in suggestions {
                    output.push_str(&format!("  • {suggestion}\n"));
                }
            }
        }
        output
    }
}
impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
