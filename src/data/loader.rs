use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use log::{debug, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{Dataset, Measure, Observation, STATION_COLUMN, TIME_COLUMNS};
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the merged observation table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; `station`, `year`, `month`, `day`, `hour` and the
///   eleven measure columns (`PM2.5` … `WSPM`). Extra columns are ignored.
/// * `.json`    – `[{ "station": "...", "year": 2013, ..., "PM2.5": 4.0 }, ...]`
/// * `.parquet` – same columns; integer time parts, numeric measures
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    debug!("Loading {} as .{ext}", path.display());
    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }
}

/// Missing-value spellings produced by pandas and spreadsheet exports.
fn parse_measure(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    match cell {
        "" | "NA" | "N/A" | "NaN" | "nan" | "null" => None,
        _ => cell.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

/// Apply ingestion rules shared by every format.
fn clean_values(row: usize, mut values: [Option<f64>; Measure::COUNT]) -> [Option<f64>; Measure::COUNT] {
    let pm25 = &mut values[Measure::Pm25.index()];
    if let Some(v) = *pm25 {
        if v < 0.0 {
            warn!("Row {row}: negative PM2.5 ({v}) treated as missing");
            *pm25 = None;
        }
    }
    values
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let reader = csv::Reader::from_path(path)?;
    read_csv(reader)
}

/// Parse CSV from any reader; split out so tests can feed in-memory data.
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset> {
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };
    let station_idx = position(STATION_COLUMN)?;
    let time_idx = TIME_COLUMNS
        .iter()
        .map(|&c| position(c))
        .collect::<Result<Vec<_>>>()?;
    let measure_idx = Measure::ALL
        .iter()
        .map(|m| position(m.column_name()))
        .collect::<Result<Vec<_>>>()?;

    let mut observations = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;

        let time_part = |k: usize| -> Result<i64> {
            let cell = record.get(time_idx[k]).unwrap_or("").trim();
            parse_time_part(cell).ok_or_else(|| DataError::InvalidRecord {
                row: row_no,
                message: format!("'{}' is not a valid {}", cell, TIME_COLUMNS[k]),
            })
        };
        let parts = (time_part(0)?, time_part(1)?, time_part(2)?, time_part(3)?);

        let mut values = [None; Measure::COUNT];
        for (slot, &idx) in values.iter_mut().zip(&measure_idx) {
            *slot = record.get(idx).and_then(parse_measure);
        }

        let station = record.get(station_idx).unwrap_or("").trim().to_string();
        observations.push(Observation::from_components(
            row_no,
            station,
            parts,
            clean_values(row_no, values),
        )?);
    }

    Ok(Dataset::from_observations(observations))
}

/// Accept `2013` as well as pandas' float spelling `2013.0`.
fn parse_time_part(cell: &str) -> Option<i64> {
    cell.parse::<i64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "station": "Aotizhongxin", "year": 2013, "month": 3, "day": 1, "hour": 0,
///     "PM2.5": 4.0, "PM10": 4.0, ..., "WSPM": 4.4 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root.as_array().ok_or_else(|| DataError::InvalidRecord {
        row: 0,
        message: "expected a top-level JSON array".to_string(),
    })?;

    let mut observations = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| DataError::InvalidRecord {
            row: i,
            message: "not a JSON object".to_string(),
        })?;

        let station = match obj.get(STATION_COLUMN) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => return Err(DataError::MissingColumn(STATION_COLUMN.to_string())),
        };

        let parts = (
            json_time_part(obj, i, 0)?,
            json_time_part(obj, i, 1)?,
            json_time_part(obj, i, 2)?,
            json_time_part(obj, i, 3)?,
        );

        let mut values = [None; Measure::COUNT];
        for (slot, m) in values.iter_mut().zip(Measure::ALL) {
            *slot = match obj.get(m.column_name()) {
                Some(JsonValue::Number(n)) => n.as_f64(),
                Some(JsonValue::String(s)) => parse_measure(s),
                Some(_) => None,
                None => return Err(DataError::MissingColumn(m.column_name().to_string())),
            };
        }

        observations.push(Observation::from_components(
            i,
            station,
            parts,
            clean_values(i, values),
        )?);
    }

    Ok(Dataset::from_observations(observations))
}

fn json_time_part(obj: &Map<String, JsonValue>, row: usize, k: usize) -> Result<i64> {
    let name = TIME_COLUMNS[k];
    let value = obj
        .get(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
    let parsed = match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        JsonValue::String(s) => parse_time_part(s.trim()),
        _ => None,
    };
    parsed.ok_or_else(|| DataError::InvalidRecord {
        row,
        message: format!("{value} is not a valid {name}"),
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the merged observation columns.
///
/// Time parts may be Int32 or Int64, measures Float64, Float32, Int32 or
/// Int64 (nulls become missing values). Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut observations = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        read_batch(&batch, &mut observations)?;
    }

    Ok(Dataset::from_observations(observations))
}

fn batch_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema_ref()
        .index_of(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;
    Ok(batch.column(idx))
}

fn read_batch(batch: &RecordBatch, out: &mut Vec<Observation>) -> Result<()> {
    let station_col = batch_column(batch, STATION_COLUMN)?;
    let time_cols = TIME_COLUMNS
        .iter()
        .map(|&c| batch_column(batch, c))
        .collect::<Result<Vec<_>>>()?;
    let measure_cols = Measure::ALL
        .iter()
        .map(|m| batch_column(batch, m.column_name()))
        .collect::<Result<Vec<_>>>()?;

    let offset = out.len();
    for row in 0..batch.num_rows() {
        let row_no = offset + row;
        let station = extract_string(station_col, row).ok_or_else(|| DataError::InvalidRecord {
            row: row_no,
            message: format!("unreadable station ({:?})", station_col.data_type()),
        })?;

        let time_part = |k: usize| -> Result<i64> {
            extract_i64(time_cols[k], row).ok_or_else(|| DataError::InvalidRecord {
                row: row_no,
                message: format!("unreadable {} ({:?})", TIME_COLUMNS[k], time_cols[k].data_type()),
            })
        };
        let parts = (time_part(0)?, time_part(1)?, time_part(2)?, time_part(3)?);

        let mut values = [None; Measure::COUNT];
        for (slot, col) in values.iter_mut().zip(&measure_cols) {
            *slot = extract_f64(col, row);
        }

        out.push(Observation::from_components(
            row_no,
            station,
            parts,
            clean_values(row_no, values),
        )?);
    }
    Ok(())
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string_opt::<i32>().map(|s| s.value(row).to_string()),
        DataType::LargeUtf8 => col.as_string_opt::<i64>().map(|s| s.value(row).to_string()),
        _ => None,
    }
}

fn extract_i64(col: &ArrayRef, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int64 => col.as_primitive_opt::<Int64Type>().map(|a| a.value(row)),
        DataType::Int32 => col.as_primitive_opt::<Int32Type>().map(|a| a.value(row) as i64),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| a.value(row))
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64),
        _ => None,
    }
}

fn extract_f64(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive_opt::<Float64Type>().map(|a| a.value(row)),
        DataType::Float32 => col.as_primitive_opt::<Float32Type>().map(|a| a.value(row) as f64),
        DataType::Int64 => col.as_primitive_opt::<Int64Type>().map(|a| a.value(row) as f64),
        DataType::Int32 => col.as_primitive_opt::<Int32Type>().map(|a| a.value(row) as f64),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

    fn csv_reader(body: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(body.as_bytes())
    }

    #[test]
    fn reads_merged_csv_with_missing_cells() {
        let text = format!(
            "{HEADER}\n\
             1,2013,3,1,0,4.0,4.0,4.0,7.0,300.0,77.0,-0.7,1023.0,-18.8,0.0,NNW,4.4,Aotizhongxin\n\
             2,2013,3,1,1,NA,8.0,,7.0,300.0,77.0,-1.1,1023.2,-18.2,0.0,N,4.7,Aotizhongxin\n\
             3,2013,3,2,0,-3.0,8.0,4.0,7.0,300.0,77.0,-1.1,1023.2,-18.2,0.0,N,4.7,Changping\n"
        );
        let ds = read_csv(csv_reader(&text)).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.station_count(), 2);

        let first = &ds.observations[0];
        assert_eq!(first.pm25(), Some(4.0));
        assert_eq!(first.value(Measure::Temp), Some(-0.7));
        assert_eq!(first.value(Measure::Wspm), Some(4.4));

        let second = &ds.observations[1];
        assert_eq!(second.pm25(), None);
        assert_eq!(second.value(Measure::So2), None);
        assert_eq!(second.timestamp.to_string(), "2013-03-01 01:00:00");

        // Negative PM2.5 is dropped, negative temperature is kept.
        assert_eq!(ds.observations[2].pm25(), None);
        assert_eq!(ds.observations[2].value(Measure::Dewp), Some(-18.2));
    }

    #[test]
    fn missing_column_is_fatal() {
        let text = "station,year,month,day,hour,PM2.5\nA,2013,3,1,0,4.0\n";
        let err = read_csv(csv_reader(text)).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(ref c) if c == "PM10"), "{err}");
    }

    #[test]
    fn malformed_timestamp_is_fatal() {
        let bad_month = format!("{HEADER}\n1,2013,13,1,0,4,4,4,7,300,77,0,1023,-18,0,N,4,A\n");
        let err = read_csv(csv_reader(&bad_month)).unwrap_err();
        assert!(matches!(err, DataError::InvalidTimestamp { row: 0, month: 13, .. }), "{err}");

        let garbage = format!("{HEADER}\n1,20x3,3,1,0,4,4,4,7,300,77,0,1023,-18,0,N,4,A\n");
        let err = read_csv(csv_reader(&garbage)).unwrap_err();
        assert!(matches!(err, DataError::InvalidRecord { row: 0, .. }), "{err}");
    }

    #[test]
    fn reads_records_json() {
        let text = r#"[
            {"station": "Dongsi", "year": 2014, "month": 1, "day": 2, "hour": 3.0,
             "PM2.5": 61.5, "PM10": 80, "SO2": null, "NO2": 40, "CO": 900, "O3": 10,
             "TEMP": -2.0, "PRES": 1030.1, "DEWP": -20.0, "RAIN": 0, "WSPM": 1.2, "wd": "E"}
        ]"#;
        let ds = parse_json(text).unwrap();
        assert_eq!(ds.len(), 1);
        let obs = &ds.observations[0];
        assert_eq!(obs.station, "Dongsi");
        assert_eq!(obs.timestamp.to_string(), "2014-01-02 03:00:00");
        assert_eq!(obs.pm25(), Some(61.5));
        assert_eq!(obs.value(Measure::So2), None);
        assert_eq!(obs.value(Measure::Pm10), Some(80.0));
    }

    #[test]
    fn dispatches_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("merged.CSV");
        let mut f = std::fs::File::create(&csv_path).unwrap();
        writeln!(f, "{HEADER}").unwrap();
        writeln!(f, "1,2013,3,1,0,4,4,4,7,300,77,0,1023,-18,0,N,4,A").unwrap();
        drop(f);
        assert_eq!(load_file(&csv_path).unwrap().len(), 1);

        let err = load_file(&dir.path().join("merged.xlsx")).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat(ref e) if e == "xlsx"));

        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataError::Csv(_)), "{err}");
    }

    #[test]
    fn reads_parquet_with_nulls() {
        let mut fields = vec![Field::new("station", DataType::Utf8, false)];
        for c in TIME_COLUMNS {
            fields.push(Field::new(c, DataType::Int64, false));
        }
        for m in Measure::ALL {
            fields.push(Field::new(m.column_name(), DataType::Float64, true));
        }
        let schema = Arc::new(Schema::new(fields));

        let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(vec!["Wanliu", "Wanliu"]))];
        for part in [[2015, 2015], [7, 7], [4, 4], [10, 11]] {
            columns.push(Arc::new(Int64Array::from(part.to_vec())));
        }
        for m in Measure::ALL {
            let data = if m == Measure::Pm25 {
                vec![Some(20.0), None]
            } else {
                vec![Some(1.0), Some(2.0)]
            };
            columns.push(Arc::new(Float64Array::from(data)));
        }
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.observations[0].pm25(), Some(20.0));
        assert_eq!(ds.observations[1].pm25(), None);
        assert_eq!(ds.observations[1].timestamp.to_string(), "2015-07-04 11:00:00");
    }
}
