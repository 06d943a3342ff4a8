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

use crate::error::{ConfigError, EaselError, Result};
use crate::reader::ReaderOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Yaml,
}
impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
        }
    }
    /// Format implied by a path's extension; anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => ReportFormat::Yaml,
            _ => ReportFormat::Json,
        }
    }
}

/// Fixed confidences attached to the secondary charts of a recommendation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleSettings {
    pub scatter_confidence: f64,
    pub bar_confidence: f64,
    pub histogram_confidence: f64,
}
impl Default for EnsembleSettings {
    fn default() -> Self {
        Self {
            scatter_confidence: 0.7,
            bar_confidence: 0.8,
            histogram_confidence: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaselSettings {
    pub max_charts: usize,
    pub ensemble: EnsembleSettings,
    pub output_dir: PathBuf,
    pub report_format: ReportFormat,
    pub reader: ReaderOptions,
}
impl Default for EaselSettings {
    fn default() -> Self {
        Self {
            max_charts: 5,
            ensemble: EnsembleSettings::default(),
            output_dir: PathBuf::from("output"),
            report_format: ReportFormat::Json,
            reader: ReaderOptions::default(),
        }
    }
}
impl EaselSettings {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_charts == 0 {
            return Err("max_charts must be greater than 0".to_string());
        }
        for (name, value) in [
            ("ensemble.scatter_confidence", self.ensemble.scatter_confidence),
            ("ensemble.bar_confidence", self.ensemble.bar_confidence),
            ("ensemble.histogram_confidence", self.ensemble.histogram_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be between 0.0 and 1.0"));
            }
        }
        let threshold = self.reader.datetime_confidence_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(
                "reader.datetime_confidence_threshold must be in (0.0, 1.0]".to_string(),
            );
        }
        if self.reader.datetime_formats.is_empty() {
            return Err("reader.datetime_formats must list at least one format".to_string());
        }
        if !self.reader.delimiter.is_ascii() {
            return Err("reader.delimiter must be a single ASCII character".to_string());
        }
        Ok(())
    }
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let settings_file_error = |reason: String| {
            EaselError::Config(ConfigError::SettingsFile {
                path: path.display().to_string(),
                reason,
            })
        };
        let content = fs::read_to_string(path).map_err(|e| settings_file_error(e.to_string()))?;
        Self::from_yaml_string(&content).map_err(|err| match err {
            EaselError::Serialisation(source) => settings_file_error(source.to_string()),
            other => other,
        })
    }
    /// Parse failures surface as YAML serialisation errors; out-of-range values as validation failures.
    pub fn from_yaml_string(yaml_content: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(yaml_content)?;
        settings
            .validate()
            .map_err(|reason| ConfigError::ValidationFailed { reason })?;
        Ok(settings)
    }
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
    /// Only the best chart per dataset.
    pub fn for_single_chart() -> Self {
        Self {
            max_charts: 1,
            ..Default::default()
        }
    }
    /// Reports written as YAML, with every secondary chart kept.
    pub fn for_exploration() -> Self {
        Self {
            max_charts: 8,
            report_format: ReportFormat::Yaml,
            ..Default::default()
        }
    }
    /// Text columns become datetime only when nearly every value parses.
    pub fn for_strict_dates() -> Self {
        Self {
            reader: ReaderOptions {
                datetime_confidence_threshold: 0.95,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
