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

use crate::error::{EaselError, Result};
use crate::table::{Column, ColumnData, Table};
use calamine::{open_workbook_auto, Data, DataType as CellType, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::{
    CsvReadOptions, DataFrame as PolarsFrame, DataType as PolarsType, JsonReader, PolarsError,
    SerReader, Series,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait TableReader {
    fn read(&self, path: &Path) -> Result<Table>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Excel,
}
impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            "xlsx" | "xls" => Ok(SourceFormat::Excel),
            "" => Err(EaselError::UnsupportedFormat {
                format: format!("no file extension on '{}'", path.display()),
            }),
            other => Err(EaselError::UnsupportedFormat {
                format: format!(".{other}"),
            }),
        }
    }
}

/// Where a table comes from: a file on disk or a table the caller already holds.
#[derive(Debug, Clone)]
pub enum DataSource {
    Path(PathBuf),
    Table(Table),
}
impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::Path(path) => path.display().to_string(),
            DataSource::Table(table) => format!(
                "in-memory table ({} rows x {} columns)",
                table.row_count(),
                table.column_count()
            ),
        }
    }
}
impl From<PathBuf> for DataSource {
    fn from(path: PathBuf) -> Self {
        DataSource::Path(path)
    }
}
impl From<&Path> for DataSource {
    fn from(path: &Path) -> Self {
        DataSource::Path(path.to_path_buf())
    }
}
impl From<&str> for DataSource {
    fn from(path: &str) -> Self {
        DataSource::Path(PathBuf::from(path))
    }
}
impl From<Table> for DataSource {
    fn from(table: Table) -> Self {
        DataSource::Table(table)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    pub delimiter: char,
    pub has_header: bool,
    pub sheet: Option<String>,
    pub datetime_formats: Vec<String>,
    pub datetime_confidence_threshold: f64,
}
impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
            sheet: None,
            datetime_formats: vec![
                "%Y-%m-%d".to_string(),
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%dT%H:%M:%SZ".to_string(),
                "%m/%d/%Y".to_string(),
                "%d/%m/%Y".to_string(),
                "%Y%m%d".to_string(),
            ],
            datetime_confidence_threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileTableReader {
    options: ReaderOptions,
}
impl FileTableReader {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_options(options: ReaderOptions) -> Self {
        Self { options }
    }
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }
    fn read_csv(&self, path: &Path) -> std::result::Result<PolarsFrame, PolarsError> {
        let separator = u8::try_from(self.options.delimiter).unwrap_or(b',');
        CsvReadOptions::default()
            .with_has_header(self.options.has_header)
            .map_parse_options(|parse| parse.with_separator(separator))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
    }
    fn read_json(&self, path: &Path) -> std::result::Result<PolarsFrame, PolarsError> {
        let file = File::open(path)?;
        JsonReader::new(file).finish()
    }
    fn table_from_frame(
        &self,
        path: &Path,
        frame: std::result::Result<PolarsFrame, PolarsError>,
    ) -> Result<Table> {
        let data_file_error = |source| EaselError::DataFile {
            path: path.display().to_string(),
            source,
        };
        let frame = frame.map_err(data_file_error)?;
        let columns = self.frame_to_table(&frame).map_err(data_file_error)?;
        Table::new(columns)
    }
    fn frame_to_table(&self, frame: &PolarsFrame) -> std::result::Result<Vec<Column>, PolarsError> {
        frame
            .get_columns()
            .iter()
            .map(|column| self.convert_series(column.as_materialized_series()))
            .collect()
    }
    fn convert_series(&self, series: &Series) -> std::result::Result<Column, PolarsError> {
        let name = series.name().to_string();
        let data = match series.dtype() {
            PolarsType::Boolean => ColumnData::Boolean(series.bool()?.into_iter().collect()),
            PolarsType::Float64
            | PolarsType::Float32
            | PolarsType::Int64
            | PolarsType::Int32
            | PolarsType::UInt64
            | PolarsType::UInt32 => {
                let floats = series.cast(&PolarsType::Float64)?;
                ColumnData::Numeric(floats.f64()?.into_iter().collect())
            }
            PolarsType::Date | PolarsType::Datetime(_, _) => {
                let strings = series_strings(series)?;
                ColumnData::Datetime(
                    strings
                        .iter()
                        .map(|v| v.as_deref().and_then(|s| self.parse_any_datetime(s)))
                        .collect(),
                )
            }
            _ => self.classify_text(series_strings(series)?),
        };
        Ok(Column::new(name, data))
    }
    fn read_spreadsheet(&self, path: &Path) -> Result<Table> {
        let spreadsheet_error = |reason: String| EaselError::Spreadsheet {
            path: path.display().to_string(),
            reason,
        };
        let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
        let range = match &self.options.sheet {
            Some(sheet) => workbook.worksheet_range(sheet),
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| spreadsheet_error("workbook has no sheets".to_string()))?,
        }
        .map_err(|e| spreadsheet_error(e.to_string()))?;
        let mut rows = range.rows();
        let width = range.width();
        let header = if self.options.has_header {
            match rows.next() {
                Some(first) => header_names(Some(first), width),
                None => return Ok(Table::empty()),
            }
        } else {
            header_names(None, width)
        };
        let body: Vec<&[Data]> = rows.collect();
        let columns = header
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let cells: Vec<Option<&Data>> = body
                    .iter()
                    .map(|row| row.get(i).filter(|c| !c.is_empty()))
                    .collect();
                Column::new(name, self.convert_cells(&cells))
            })
            .collect();
        Table::new(columns)
    }
    fn convert_cells(&self, cells: &[Option<&Data>]) -> ColumnData {
        let present: Vec<&Data> = cells.iter().flatten().copied().collect();
        if present.is_empty() {
            return ColumnData::Categorical(vec![None; cells.len()]);
        }
        if present.iter().all(|c| c.is_int() || c.is_float()) {
            return ColumnData::Numeric(cells.iter().map(|c| c.and_then(CellType::as_f64)).collect());
        }
        if present.iter().all(|c| c.is_bool()) {
            return ColumnData::Boolean(cells.iter().map(|c| c.and_then(CellType::get_bool)).collect());
        }
        if present.iter().all(|c| c.is_datetime() || c.is_datetime_iso()) {
            return ColumnData::Datetime(
                cells
                    .iter()
                    .map(|c| c.and_then(CellType::as_datetime))
                    .collect(),
            );
        }
        self.classify_text(cells.iter().map(|c| c.map(ToString::to_string)).collect())
    }
    /// Text columns become datetime when enough values parse with a single format.
    fn classify_text(&self, values: Vec<Option<String>>) -> ColumnData {
        let confidence = self.datetime_confidence(&values);
        if confidence >= self.options.datetime_confidence_threshold {
            return ColumnData::Datetime(
                values
                    .iter()
                    .map(|v| v.as_deref().and_then(|s| self.parse_any_datetime(s)))
                    .collect(),
            );
        }
        ColumnData::Categorical(values)
    }
    fn datetime_confidence(&self, values: &[Option<String>]) -> f64 {
        let present: Vec<&str> = values.iter().flatten().map(|s| s.trim()).collect();
        if present.is_empty() {
            return 0.0;
        }
        self.options
            .datetime_formats
            .iter()
            .map(|format| {
                let parsed = present
                    .iter()
                    .filter(|v| parse_datetime(v, format).is_some())
                    .count();
                parsed as f64 / present.len() as f64
            })
            .fold(0.0, f64::max)
    }
    fn parse_any_datetime(&self, value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        self.options
            .datetime_formats
            .iter()
            .find_map(|format| parse_datetime(value, format))
    }
}
impl TableReader for FileTableReader {
    fn read(&self, path: &Path) -> Result<Table> {
        let format = SourceFormat::from_path(path)?;
        let table = match format {
            SourceFormat::Excel => self.read_spreadsheet(path)?,
            SourceFormat::Csv => self.table_from_frame(path, self.read_csv(path))?,
            SourceFormat::Json => self.table_from_frame(path, self.read_json(path))?,
        };
        debug!(
            path = %path.display(),
            format = ?format,
            rows = table.row_count(),
            columns = table.column_count(),
            "Table read"
        );
        Ok(table)
    }
}
/// Header cells by position; blank or missing cells become `column_<n>`.
fn header_names(first: Option<&[Data]>, width: usize) -> Vec<String> {
    (0..width)
        .map(|i| match first.and_then(|row| row.get(i)) {
            Some(cell) if !cell.is_empty() => cell.to_string(),
            _ => format!("column_{}", i + 1),
        })
        .collect()
}
fn series_strings(series: &Series) -> std::result::Result<Vec<Option<String>>, PolarsError> {
    let strings = series.cast(&PolarsType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
fn parse_datetime(value: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
