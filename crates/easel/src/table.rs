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

//! In-memory typed table handed from the reader to the analyzer.
//!
//! A [`Table`] is an ordered list of uniquely named, equally long columns. Every
//! cell may be missing. Tables are immutable once built: all constructors validate
//! the shape invariants and there is no mutable access to the columns.

use crate::error::{EaselError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Datetime,
    Boolean,
}
impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Datetime => "datetime",
            ColumnKind::Boolean => "boolean",
        }
    }
}
impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
    Datetime(Vec<Option<NaiveDateTime>>),
    Boolean(Vec<Option<bool>>),
}
impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
            ColumnData::Datetime(values) => values.len(),
            ColumnData::Boolean(values) => values.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
            ColumnData::Datetime(_) => ColumnKind::Datetime,
            ColumnData::Boolean(_) => ColumnKind::Boolean,
        }
    }
    /// NaN counts as missing in numeric columns.
    pub fn is_missing(&self, index: usize) -> bool {
        match self {
            ColumnData::Numeric(values) => values
                .get(index)
                .is_none_or(|v| v.is_none_or(|x| !x.is_finite())),
            ColumnData::Categorical(values) => values.get(index).is_none_or(Option::is_none),
            ColumnData::Datetime(values) => values.get(index).is_none_or(Option::is_none),
            ColumnData::Boolean(values) => values.get(index).is_none_or(Option::is_none),
        }
    }
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }
    pub fn distinct_count(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values
                .iter()
                .flatten()
                .filter(|v| v.is_finite())
                .map(|v| normalise_zero(*v).to_bits())
                .collect::<HashSet<_>>()
                .len(),
            ColumnData::Categorical(values) => {
                values.iter().flatten().collect::<HashSet<_>>().len()
            }
            ColumnData::Datetime(values) => values.iter().flatten().collect::<HashSet<_>>().len(),
            ColumnData::Boolean(values) => values.iter().flatten().collect::<HashSet<_>>().len(),
        }
    }
    pub fn numeric_at(&self, index: usize) -> Option<f64> {
        match self {
            ColumnData::Numeric(values) => values
                .get(index)
                .copied()
                .flatten()
                .filter(|v| v.is_finite()),
            _ => None,
        }
    }
    /// Non-missing numeric values in row order; empty for non-numeric columns.
    pub fn numeric_values(&self) -> Vec<f64> {
        match self {
            ColumnData::Numeric(values) => values
                .iter()
                .flatten()
                .copied()
                .filter(|v| v.is_finite())
                .collect(),
            _ => Vec::new(),
        }
    }
    pub fn display_at(&self, index: usize) -> Option<String> {
        if self.is_missing(index) {
            return None;
        }
        match self {
            ColumnData::Numeric(values) => values.get(index).copied().flatten().map(format_number),
            ColumnData::Categorical(values) => values.get(index).cloned().flatten(),
            ColumnData::Datetime(values) => values
                .get(index)
                .copied()
                .flatten()
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            ColumnData::Boolean(values) => values
                .get(index)
                .copied()
                .flatten()
                .map(|b| b.to_string()),
        }
    }
}
fn normalise_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}
impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}
impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let table = Self { columns };
        table.validate()?;
        Ok(table)
    }
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }
    /// Checks the shape invariants: unique column names and equal column lengths.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(EaselError::invalid_input(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        if let Some(first) = self.columns.first() {
            let expected = first.len();
            if let Some(ragged) = self.columns.iter().find(|c| c.len() != expected) {
                return Err(EaselError::invalid_input(format!(
                    "column length mismatch: '{}' has {} rows, '{}' has {}",
                    first.name,
                    expected,
                    ragged.name,
                    ragged.len()
                )));
            }
        }
        Ok(())
    }
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<Column>,
}
impl TableBuilder {
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }
    pub fn numeric(self, name: &str, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        self.column(Column::new(
            name,
            ColumnData::Numeric(values.into_iter().collect()),
        ))
    }
    pub fn numeric_dense(self, name: &str, values: impl IntoIterator<Item = f64>) -> Self {
        self.numeric(name, values.into_iter().map(Some))
    }
    pub fn categorical<S: Into<String>>(
        self,
        name: &str,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        self.column(Column::new(
            name,
            ColumnData::Categorical(values.into_iter().map(|v| v.map(Into::into)).collect()),
        ))
    }
    pub fn categorical_dense<S: Into<String>>(
        self,
        name: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.categorical(name, values.into_iter().map(Some))
    }
    pub fn datetime(
        self,
        name: &str,
        values: impl IntoIterator<Item = Option<NaiveDateTime>>,
    ) -> Self {
        self.column(Column::new(
            name,
            ColumnData::Datetime(values.into_iter().collect()),
        ))
    }
    pub fn boolean(self, name: &str, values: impl IntoIterator<Item = Option<bool>>) -> Self {
        self.column(Column::new(
            name,
            ColumnData::Boolean(values.into_iter().collect()),
        ))
    }
    pub fn build(self) -> Result<Table> {
        Table::new(self.columns)
    }
}
