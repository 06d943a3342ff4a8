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

use easel::{
    ColumnKind, EaselError, FileTableReader, ReaderOptions, SourceFormat, TableReader,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_csv_columns_are_typed() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "sales.csv",
        "Date,Region,Sales,Active\n\
         2024-01-01,North,10.5,true\n\
         2024-01-02,South,,false\n\
         2024-01-03,,7,true\n",
    );
    let table = FileTableReader::new().read(&path).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_names(), vec!["Date", "Region", "Sales", "Active"]);
    assert_eq!(table.column("Date").unwrap().kind(), ColumnKind::Datetime);
    assert_eq!(table.column("Region").unwrap().kind(), ColumnKind::Categorical);
    assert_eq!(table.column("Sales").unwrap().kind(), ColumnKind::Numeric);
    assert_eq!(table.column("Active").unwrap().kind(), ColumnKind::Boolean);
    assert_eq!(table.column("Sales").unwrap().data.missing_count(), 1);
    assert_eq!(table.column("Region").unwrap().data.missing_count(), 1);
    assert_eq!(table.column("Sales").unwrap().data.numeric_at(2), Some(7.0));
}

#[test]
fn test_csv_delimiter_is_configurable() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "semi.csv", "Team;Score\nA;1\nB;2\n");
    let reader = FileTableReader::with_options(ReaderOptions {
        delimiter: ';',
        ..Default::default()
    });
    let table = reader.read(&path).unwrap();
    assert_eq!(table.column_names(), vec!["Team", "Score"]);
    assert_eq!(table.column("Score").unwrap().kind(), ColumnKind::Numeric);
}

#[test]
fn test_json_records_are_read() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "records.json",
        r#"[
            {"product": "Widget", "units": 3, "launched": "03/15/2023"},
            {"product": "Gadget", "units": 5, "launched": "04/01/2023"},
            {"product": "Doohickey", "units": null, "launched": "05/20/2023"}
        ]"#,
    );
    let table = FileTableReader::new().read(&path).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column("product").unwrap().kind(), ColumnKind::Categorical);
    assert_eq!(table.column("units").unwrap().kind(), ColumnKind::Numeric);
    assert_eq!(table.column("units").unwrap().data.missing_count(), 1);
    assert_eq!(table.column("launched").unwrap().kind(), ColumnKind::Datetime);
}

#[test]
fn test_extension_matching_ignores_case() {
    assert_eq!(
        SourceFormat::from_path(Path::new("DATA.CSV")).unwrap(),
        SourceFormat::Csv
    );
    assert_eq!(
        SourceFormat::from_path(Path::new("book.Xlsx")).unwrap(),
        SourceFormat::Excel
    );
    assert_eq!(
        SourceFormat::from_path(Path::new("old.xls")).unwrap(),
        SourceFormat::Excel
    );
}

#[test]
fn test_unknown_extensions_are_unsupported() {
    let reader = FileTableReader::new();
    for name in ["data.parquet", "notes.txt", "no_extension"] {
        let result = reader.read(Path::new(name));
        assert!(
            matches!(result, Err(EaselError::UnsupportedFormat { .. })),
            "{name} should be unsupported"
        );
    }
}

#[test]
fn test_reader_failures_pass_through() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.csv");
    assert!(matches!(
        FileTableReader::new().read(&missing),
        Err(EaselError::DataFile { .. })
    ));
    let corrupt = write(&dir, "broken.xlsx", "definitely not a zip archive");
    assert!(matches!(
        FileTableReader::new().read(&corrupt),
        Err(EaselError::Spreadsheet { .. })
    ));
}

#[test]
fn test_datetime_threshold_controls_inference() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "mostly_dates.csv",
        "When\n2024-01-01\n2024-01-02\n2024-01-03\n2024-01-04\nsoon\n",
    );
    let relaxed = FileTableReader::new().read(&path).unwrap();
    assert_eq!(relaxed.column("When").unwrap().kind(), ColumnKind::Datetime);
    assert_eq!(relaxed.column("When").unwrap().data.missing_count(), 1);

    let strict = FileTableReader::with_options(ReaderOptions {
        datetime_confidence_threshold: 0.95,
        ..Default::default()
    })
    .read(&path)
    .unwrap();
    assert_eq!(strict.column("When").unwrap().kind(), ColumnKind::Categorical);
}
