use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, SalesTable, Transaction};
use super::schema::{ColumnIndex, ColumnKind, Field, LoadParams, SchemaDescriptor, SheetWindow};
use crate::error::{LoadError, LoadResult};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – header row and column
///   range taken from [`LoadParams::window`]
/// * `.csv`     – header on the first line
/// * `.parquet` – one column per field, header from the Arrow schema
///
/// Every format is reduced to a [`RawGrid`] first, so header validation,
/// typing and the hour derivation are shared.
pub fn load_table(path: &Path, params: &LoadParams) -> LoadResult<SalesTable> {
    if !path.is_file() {
        return Err(LoadError::MissingFile(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let grid = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
            read_spreadsheet(path, params.sheet.as_deref(), &params.window)?
        }
        "csv" => read_csv(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let table = build_table(grid, &params.schema)?;
    log::info!(
        "Loaded {} transactions ({} columns) from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

/// Header row plus untyped data rows, as read from any source.
#[derive(Debug, Clone, Default)]
pub struct RawGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Typing: raw grid → SalesTable
// ---------------------------------------------------------------------------

/// Validate the headers against `schema` and type every non-blank row.
pub fn build_table(grid: RawGrid, schema: &SchemaDescriptor) -> LoadResult<SalesTable> {
    let index = schema.validate(&grid.headers)?;

    // Row numbers in errors count blank rows too, so keep the source index.
    let numbered: Vec<(usize, Vec<CellValue>)> = grid
        .rows
        .into_iter()
        .enumerate()
        .filter(|(_, row)| !row.iter().all(CellValue::is_empty))
        .collect();

    let transactions = numbered
        .iter()
        .map(|(i, row)| build_transaction(row, &index, i + 1))
        .collect::<LoadResult<Vec<_>>>()?;
    let rows = numbered.into_iter().map(|(_, row)| row).collect();

    Ok(SalesTable::new(grid.headers, rows, transactions))
}

/// A required cell after conversion according to its [`ColumnKind`].
enum Typed {
    Text(String),
    Number(f64),
    Time(NaiveTime),
}

fn typed_cell(row: &[CellValue], index: &ColumnIndex, field: Field, row_no: usize) -> LoadResult<Typed> {
    static EMPTY: CellValue = CellValue::Empty;
    let col = index.get(field);
    let cell = row.get(col.position).unwrap_or(&EMPTY);
    match col.kind {
        ColumnKind::Category => {
            if cell.is_empty() {
                return Err(LoadError::EmptyCategory {
                    row: row_no,
                    column: col.header.clone(),
                });
            }
            Ok(Typed::Text(cell.to_string().trim().to_string()))
        }
        ColumnKind::Amount | ColumnKind::Rating => {
            cell.as_f64()
                .map(Typed::Number)
                .ok_or_else(|| LoadError::BadNumber {
                    row: row_no,
                    column: col.header.clone(),
                    value: cell.to_string(),
                })
        }
        ColumnKind::TimeOfDay => {
            parse_time_of_day(cell)
                .map(Typed::Time)
                .ok_or_else(|| LoadError::BadTime {
                    row: row_no,
                    column: col.header.clone(),
                    value: cell.to_string(),
                })
        }
    }
}

fn build_transaction(row: &[CellValue], index: &ColumnIndex, row_no: usize) -> LoadResult<Transaction> {
    let text = |field| -> LoadResult<String> {
        match typed_cell(row, index, field, row_no)? {
            Typed::Text(s) => Ok(s),
            Typed::Number(v) => Ok(v.to_string()),
            Typed::Time(t) => Ok(t.format("%H:%M:%S").to_string()),
        }
    };
    let number = |field| -> LoadResult<f64> {
        match typed_cell(row, index, field, row_no)? {
            Typed::Number(v) => Ok(v),
            _ => Err(kind_mismatch(row, index, field, row_no, false)),
        }
    };
    let time = |field| -> LoadResult<NaiveTime> {
        match typed_cell(row, index, field, row_no)? {
            Typed::Time(t) => Ok(t),
            _ => Err(kind_mismatch(row, index, field, row_no, true)),
        }
    };

    Ok(Transaction::new(
        text(Field::City)?,
        text(Field::CustomerType)?,
        text(Field::Gender)?,
        text(Field::ProductLine)?,
        number(Field::Total)?,
        number(Field::Rating)?,
        time(Field::Time)?,
    ))
}

/// A schema declared a numeric/time field with a different kind.
fn kind_mismatch(row: &[CellValue], index: &ColumnIndex, field: Field, row_no: usize, time: bool) -> LoadError {
    let col = index.get(field);
    let value = row
        .get(col.position)
        .map(ToString::to_string)
        .unwrap_or_default();
    let column = col.header.clone();
    if time {
        LoadError::BadTime { row: row_no, column, value }
    } else {
        LoadError::BadNumber { row: row_no, column, value }
    }
}

/// Interpret a cell as a time of day.
///
/// Accepted: native time cells, `HH:MM:SS` text, ISO date-time text (time
/// part used) and day fractions in `[0, 1)` as stored by spreadsheets.
pub fn parse_time_of_day(cell: &CellValue) -> Option<NaiveTime> {
    match cell {
        CellValue::Time(t) => Some(*t),
        CellValue::Text(s) => {
            let s = s.trim();
            NaiveTime::parse_from_str(s, "%H:%M:%S")
                .ok()
                .or_else(|| {
                    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                        .map(|dt| dt.time())
                })
        }
        CellValue::Float(f) if (0.0..1.0).contains(f) => {
            let secs = (f * 86_400.0).round() as u32;
            NaiveTime::from_num_seconds_from_midnight_opt(secs.min(86_399), 0)
        }
        CellValue::Integer(0) => NaiveTime::from_hms_opt(0, 0, 0),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

/// Read the window of a worksheet: the header row at `window.header_row`,
/// then every following row up to the last used one, restricted to
/// `first_col..=last_col`.  Rows above the header and columns outside
/// the window are ignored.
fn read_spreadsheet(path: &Path, sheet: Option<&str>, window: &SheetWindow) -> LoadResult<RawGrid> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoadError::NoSheets)?,
    };
    if !workbook.sheet_names().contains(&sheet_name) {
        return Err(LoadError::MissingSheet(sheet_name));
    }
    let range = workbook.worksheet_range(&sheet_name)?;
    grid_from_range(&range, window)
}

fn grid_from_range(range: &Range<Data>, window: &SheetWindow) -> LoadResult<RawGrid> {
    let empty_header = || LoadError::EmptyHeader {
        row: window.header_row + 1,
    };
    let last_row = range.end().map(|(r, _)| r).ok_or_else(empty_header)?;

    let read_row = |r: u32| -> Vec<CellValue> {
        (window.first_col..=window.last_col)
            .map(|c| {
                range
                    .get_value((r, c))
                    .map(cell_from_data)
                    .unwrap_or(CellValue::Empty)
            })
            .collect()
    };

    let headers: Vec<String> = read_row(window.header_row)
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(empty_header());
    }

    let rows = (window.header_row + 1..=last_row).map(read_row).collect();
    Ok(RawGrid { headers, rows })
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Float(*f),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            // Pure times are stored as serials below one day.
            Some(ndt) if dt.as_f64() < 1.0 => CellValue::Time(ndt.time()),
            Some(ndt) if ndt.time().num_seconds_from_midnight() == 0 => {
                CellValue::Text(ndt.format("%Y-%m-%d").to_string())
            }
            Some(ndt) => CellValue::Text(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#ERROR:{e:?}")),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one transaction per line.
fn read_csv(path: &Path) -> LoadResult<RawGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let rows = reader
        .records()
        .map(|record| -> LoadResult<Vec<CellValue>> {
            Ok(record?.iter().map(CellValue::from_text).collect())
        })
        .collect::<LoadResult<Vec<_>>>()?;

    Ok(RawGrid { headers, rows })
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  Time columns may be `Utf8` or an
/// Arrow time type.
fn read_parquet(path: &Path) -> LoadResult<RawGrid> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| cell_from_arrow(col, row))
                .collect::<LoadResult<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawGrid { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn cell_from_arrow(col: &ArrayRef, row: usize) -> LoadResult<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Empty);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // Time32/Time64, dates, decimals ... go through Arrow's display.
        _ => CellValue::from_text(&array_value_to_string(col, row)?),
    };
    Ok(value)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field as ArrowField, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    pub(crate) const CSV_HEADER: &str =
        "Invoice ID,Branch,City,Customer_type,Gender,Product line,Total,Time,Rating";

    /// Write a CSV with the supermarket header and the given lines.
    pub(crate) fn write_csv(dir: &tempfile::TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{CSV_HEADER}").unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    #[test]
    fn csv_rows_are_typed_and_hours_derived() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "sales.csv",
            &[
                "750-67-8428,A,Yangon,Member,Female,Health and beauty,548.9715,13:08:00,9.1",
                "226-31-3081,C,Naypyitaw,Normal,Female,Electronic accessories,80.22,10:29:00,9.6",
                ",,,,,,,,",
            ],
        );

        let table = load_table(&path, &LoadParams::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.headers.len(), 9);
        assert_eq!(table.rows[0][0], CellValue::Text("750-67-8428".into()));

        let first = &table.transactions[0];
        assert_eq!(first.city, "Yangon");
        assert_eq!(first.product_line, "Health and beauty");
        assert_eq!(first.total, 548.9715);
        assert_eq!(first.rating, 9.1);
        assert_eq!(first.hour(), 13);
        assert_eq!(table.transactions[1].hour(), 10);
    }

    #[test]
    fn missing_file_fails_fast() {
        let err = load_table(Path::new("/nonexistent/sales.xlsx"), &LoadParams::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingFile(_)));
    }

    #[test]
    fn unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.txt");
        std::fs::write(&path, "City\n").unwrap();
        let err = load_table(&path, &LoadParams::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn misnamed_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(
            &path,
            "City,Customer type,Gender,Product line,Total,Time,Rating\n\
             Yangon,Member,Male,Sports,10,10:00:00,7\n",
        )
        .unwrap();
        let err = load_table(&path, &LoadParams::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "Customer_type"));
    }

    #[test]
    fn bad_time_and_bad_total_name_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "bad_time.csv", &["1,A,Yangon,Member,Male,Sports,10,noon,7"]);
        let err = load_table(&path, &LoadParams::default()).unwrap_err();
        assert!(matches!(err, LoadError::BadTime { row: 1, .. }), "{err}");

        let path = write_csv(
            &dir,
            "bad_total.csv",
            &[
                "1,A,Yangon,Member,Male,Sports,10,10:00:00,7",
                "2,A,Yangon,Member,Male,Sports,ten,10:00:00,7",
            ],
        );
        let err = load_table(&path, &LoadParams::default()).unwrap_err();
        assert!(
            matches!(&err, LoadError::BadNumber { row: 2, column, .. } if column == "Total"),
            "{err}"
        );
    }

    #[test]
    fn error_row_counts_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "gap.csv",
            &[
                "1,A,Yangon,Member,Male,Sports,10,10:00:00,7",
                ",,,,,,,,",
                "3,A,Yangon,Member,Male,Sports,ten,10:00:00,7",
            ],
        );
        let err = load_table(&path, &LoadParams::default()).unwrap_err();
        assert!(
            matches!(&err, LoadError::BadNumber { row: 3, column, .. } if column == "Total"),
            "{err}"
        );
    }

    #[test]
    fn time_of_day_forms() {
        let t = |h, m, s| NaiveTime::from_hms_opt(h, m, s);
        assert_eq!(parse_time_of_day(&CellValue::Text("13:08:00".into())), t(13, 8, 0));
        assert_eq!(
            parse_time_of_day(&CellValue::Text("1899-12-31T19:20:00".into())),
            t(19, 20, 0)
        );
        assert_eq!(parse_time_of_day(&CellValue::Float(0.5)), t(12, 0, 0));
        assert_eq!(parse_time_of_day(&CellValue::Float(1.5)), None);
        assert_eq!(parse_time_of_day(&CellValue::Text("25:00:00".into())), None);
    }

    #[test]
    fn spreadsheet_window_skips_leading_rows_and_outer_columns() {
        let mut range: Range<Data> = Range::new((0, 0), (5, 9));
        // Title rows and a note column that must be ignored.
        range.set_value((0, 0), Data::String("Supermarket sales".into()));
        range.set_value((4, 0), Data::String("note".into()));
        range.set_value((4, 9), Data::String("outside".into()));
        let headers = ["City", "Customer_type", "Gender", "Product line", "Total", "Time", "Rating"];
        for (i, h) in headers.iter().enumerate() {
            range.set_value((3, 1 + i as u32), Data::String(h.to_string()));
        }
        let row = [
            Data::String("Mandalay".into()),
            Data::String("Normal".into()),
            Data::String("Male".into()),
            Data::String("Sports and travel".into()),
            Data::Float(100.5),
            Data::String("19:45:00".into()),
            Data::Float(6.5),
        ];
        for (i, v) in row.iter().enumerate() {
            range.set_value((4, 1 + i as u32), v.clone());
        }

        let window = SheetWindow::new(3, "B:H").unwrap();
        let grid = grid_from_range(&range, &window).unwrap();
        assert_eq!(grid.headers, headers);
        // Row 5 is blank inside the window and dropped when typing.
        assert_eq!(grid.rows.len(), 2);

        let table = build_table(grid, &SchemaDescriptor::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.transactions[0].city, "Mandalay");
        assert_eq!(table.transactions[0].hour(), 19);
    }

    #[test]
    fn blank_header_row_is_an_error() {
        let range: Range<Data> = Range::new((0, 0), (5, 5));
        let err = grid_from_range(&range, &SheetWindow::default()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyHeader { row: 4 }));
    }

    #[test]
    fn parquet_source_goes_through_the_same_schema() {
        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("City", DataType::Utf8, false),
            ArrowField::new("Customer_type", DataType::Utf8, false),
            ArrowField::new("Gender", DataType::Utf8, false),
            ArrowField::new("Product line", DataType::Utf8, false),
            ArrowField::new("Total", DataType::Float64, false),
            ArrowField::new("Rating", DataType::Float64, false),
            ArrowField::new("Time", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Yangon", "Mandalay"])),
                Arc::new(StringArray::from(vec!["Member", "Normal"])),
                Arc::new(StringArray::from(vec!["Female", "Male"])),
                Arc::new(StringArray::from(vec!["Food and beverages", "Sports and travel"])),
                Arc::new(Float64Array::from(vec![120.0, 80.5])),
                Arc::new(Float64Array::from(vec![7.5, 8.0])),
                Arc::new(StringArray::from(vec!["11:15:00", "18:02:00"])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(&path, &LoadParams::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.transactions[1].city, "Mandalay");
        assert_eq!(table.transactions[1].total, 80.5);
        assert_eq!(table.transactions[1].hour(), 18);
    }
}
