use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate, Timelike};
use parquet::arrow::ArrowWriter;

use air_quality_dashboard::data::model::{Measure, STATION_COLUMN, TIME_COLUMNS};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Station name and its pollution baseline (µg/m³ PM2.5).
const STATIONS: [(&str, f64); 4] = [
    ("Aotizhongxin", 82.0),
    ("Changping", 71.0),
    ("Dingling", 66.0),
    ("Dongsi", 86.0),
];

const HOURS: i64 = 24 * 365 * 2;
const MISSING_RATE: f64 = 0.02;

/// One synthetic hour at one station, in [`Measure::ALL`] order.
fn synth_hour(rng: &mut SimpleRng, baseline: f64, day_of_year: f64, hour: f64) -> [Option<f64>; Measure::COUNT] {
    let season = (2.0 * std::f64::consts::PI * day_of_year / 365.0).cos(); // +1 in winter
    let diurnal = (2.0 * std::f64::consts::PI * (hour - 15.0) / 24.0).cos();

    let temp = 13.0 - 15.0 * season + 4.0 * diurnal + rng.gauss(0.0, 2.0);
    let wspm = (1.8 + rng.gauss(0.0, 1.0)).max(0.0);
    let pm25 = (baseline * (1.0 + 0.5 * season) / (0.6 + 0.3 * wspm) + rng.gauss(0.0, 20.0)).max(2.0);

    let mut values = [
        pm25,
        pm25 * 1.3 + rng.gauss(0.0, 15.0).abs(),
        (15.0 + 12.0 * season + rng.gauss(0.0, 4.0)).max(1.0),
        (50.0 + 0.2 * pm25 + rng.gauss(0.0, 10.0)).max(2.0),
        (1200.0 + 9.0 * pm25 + rng.gauss(0.0, 150.0)).max(100.0),
        (55.0 - 30.0 * season + 25.0 * diurnal + rng.gauss(0.0, 10.0)).max(0.2),
        temp,
        1012.0 + 10.0 * season + rng.gauss(0.0, 3.0),
        temp - 8.0 - 6.0 * season + rng.gauss(0.0, 2.0),
        if rng.next_f64() < 0.04 { rng.next_f64() * 6.0 } else { 0.0 },
        wspm,
    ]
    .map(Some);

    for slot in &mut values {
        if rng.next_f64() < MISSING_RATE {
            *slot = None;
        }
    }
    values
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2013, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("invalid start date"))?;

    let mut stations: Vec<String> = Vec::new();
    let mut time_parts: [Vec<i64>; 4] = Default::default();
    let mut measures: Vec<Float64Builder> = (0..Measure::COUNT).map(|_| Float64Builder::new()).collect();

    for (station, baseline) in STATIONS {
        for h in 0..HOURS {
            let ts = start + Duration::hours(h);
            let values = synth_hour(&mut rng, baseline, ts.ordinal() as f64, ts.hour() as f64);

            stations.push(station.to_string());
            time_parts[0].push(ts.year() as i64);
            time_parts[1].push(ts.month() as i64);
            time_parts[2].push(ts.day() as i64);
            time_parts[3].push(ts.hour() as i64);
            for (builder, v) in measures.iter_mut().zip(values) {
                builder.append_option(v.map(|x| (x * 10.0).round() / 10.0));
            }
        }
    }

    // Schema: station, year..hour, then the measures
    let mut fields = vec![Field::new(STATION_COLUMN, DataType::Utf8, false)];
    fields.extend(TIME_COLUMNS.iter().map(|c| Field::new(*c, DataType::Int64, false)));
    fields.extend(Measure::ALL.iter().map(|m| Field::new(m.column_name(), DataType::Float64, true)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(stations))];
    for part in time_parts {
        columns.push(Arc::new(Int64Array::from(part)));
    }
    for mut builder in measures {
        columns.push(Arc::new(builder.finish()));
    }
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    // Write Parquet
    let parquet_path = "sample_air_quality.parquet";
    let file = std::fs::File::create(parquet_path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    // Write CSV (same rows, pandas-style empty cells for missing values)
    let csv_path = "sample_air_quality.csv";
    write_csv(csv_path, &batch)?;

    println!(
        "Wrote {} observations ({} stations) to {parquet_path} and {csv_path}",
        batch.num_rows(),
        STATIONS.len()
    );
    Ok(())
}

fn write_csv(path: &str, batch: &RecordBatch) -> anyhow::Result<()> {
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{Float64Type, Int64Type};

    let mut writer = csv::Writer::from_path(path)?;
    let header: Vec<&str> = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    writer.write_record(&header)?;

    for row in 0..batch.num_rows() {
        let mut record: Vec<String> = Vec::with_capacity(batch.num_columns());
        for col in batch.columns() {
            let cell = if col.is_null(row) {
                String::new()
            } else if let Some(s) = col.as_string_opt::<i32>() {
                s.value(row).to_string()
            } else if let Some(i) = col.as_primitive_opt::<Int64Type>() {
                i.value(row).to_string()
            } else if let Some(f) = col.as_primitive_opt::<Float64Type>() {
                f.value(row).to_string()
            } else {
                String::new()
            };
            record.push(cell);
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
