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

//! Rendering configuration handed from the recommender to a renderer.
//!
//! A [`ChartConfig`] serializes flat: `chart_type`, then its settings in key
//! order, then `confidence` when present. Equality compares every key,
//! confidence included.

use crate::chart::ChartType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod keys {
    pub const X_COLUMN: &str = "x_column";
    pub const Y_COLUMN: &str = "y_column";
    pub const Y_COLUMNS: &str = "y_columns";
    pub const LABELS_COLUMN: &str = "labels_column";
    pub const VALUES_COLUMN: &str = "values_column";
    pub const COLUMN: &str = "column";
    pub const BINS: &str = "bins";
    pub const CHART_TYPE: &str = "chart_type";
    pub const CONFIDENCE: &str = "confidence";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<String>),
}
impl ConfigValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(text) => Some(text),
            _ => None,
        }
    }
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(value) => Some(*value),
            _ => None,
        }
    }
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Integer(value) => Some(*value as f64),
            ConfigValue::Number(value) => Some(*value),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }
}
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Flag(value) => write!(f, "{value}"),
            ConfigValue::Integer(value) => write!(f, "{value}"),
            ConfigValue::Number(value) => write!(f, "{value}"),
            ConfigValue::Text(value) => f.write_str(value),
            ConfigValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}
impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}
impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}
impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}
impl From<usize> for ConfigValue {
    fn from(value: usize) -> Self {
        ConfigValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}
impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}
impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Flag(value)
    }
}
impl From<Vec<String>> for ConfigValue {
    fn from(items: Vec<String>) -> Self {
        ConfigValue::List(items)
    }
}

/// Caller-supplied settings merged over a built configuration.
pub type ConfigOverrides = BTreeMap<String, ConfigValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub chart_type: ChartType,
    #[serde(flatten)]
    pub settings: BTreeMap<String, ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}
impl ChartConfig {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            settings: BTreeMap::new(),
            confidence: None,
        }
    }
    pub fn with(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.settings.get(key)
    }
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_text)
    }
    pub fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_integer)
    }
    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(ConfigValue::as_list)
    }
    /// Overrides replace existing keys; `confidence` sets the score and `chart_type` is ignored.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        for (key, value) in overrides {
            match key.as_str() {
                keys::CHART_TYPE => {}
                keys::CONFIDENCE => {
                    if let Some(confidence) = value.as_number() {
                        self.confidence = Some(confidence.clamp(0.0, 1.0));
                    }
                }
                _ => {
                    self.settings.insert(key.clone(), value.clone());
                }
            }
        }
    }
    /// Column names this configuration binds, in key order.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        for key in [
            keys::X_COLUMN,
            keys::Y_COLUMN,
            keys::LABELS_COLUMN,
            keys::VALUES_COLUMN,
            keys::COLUMN,
        ] {
            if let Some(name) = self.text(key) {
                columns.push(name);
            }
        }
        if let Some(names) = self.list(keys::Y_COLUMNS) {
            columns.extend(names.iter().map(String::as_str));
        }
        columns
    }
}
impl fmt::Display for ChartConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chart_type)?;
        for (key, value) in &self.settings {
            write!(f, " {key}={value}")?;
        }
        if let Some(confidence) = self.confidence {
            write!(f, " (confidence {confidence:.2})")?;
        }
        Ok(())
    }
}
