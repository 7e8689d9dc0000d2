use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Region name and base monthly revenue.
const REGIONS: [(&str, f64); 4] = [
    ("North", 1200.0),
    ("South", 950.0),
    ("East", 700.0),
    ("West", 400.0),
];

const PRODUCTS: [&str; 3] = ["Widget", "Gadget", "Gizmo"];

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct Row {
    month: &'static str,
    region: &'static str,
    product: &'static str,
    units: i64,
    revenue: Option<f64>,
    /// Signed change against the previous month; feeds polar charts.
    growth: f64,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for (m, month) in MONTHS.iter().enumerate() {
        let season = 1.0 + 0.25 * (m as f64 / 12.0 * std::f64::consts::TAU).sin();
        for &(region, base) in &REGIONS {
            let revenue = (base * season + rng.gauss(0.0, base * 0.08)).max(0.0);
            let units = (revenue / 12.5).round() as i64;
            // roughly one cell in twenty is left blank
            let missing = rng.next_f64() < 0.05;
            rows.push(Row {
                month,
                region,
                product: rng.pick(&PRODUCTS),
                units,
                revenue: (!missing).then_some((revenue * 100.0).round() / 100.0),
                growth: (rng.gauss(0.0, 6.0) * 10.0).round() / 10.0,
            });
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["month", "region", "product", "units", "revenue", "growth"])?;
    for row in rows {
        writer.write_record([
            row.month.to_string(),
            row.region.to_string(),
            row.product.to_string(),
            row.units.to_string(),
            row.revenue.map(|r| r.to_string()).unwrap_or_default(),
            row.growth.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("month", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("product", DataType::Utf8, false),
        Field::new("units", DataType::Int64, false),
        Field::new("revenue", DataType::Float64, true),
        Field::new("growth", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.month))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.region))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.product))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.units))),
            Arc::new(rows.iter().map(|r| r.revenue).collect::<Float64Array>()),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.growth))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv("sample_sales.csv", &rows)?;
    write_parquet("sample_sales.parquet", &rows)?;

    println!(
        "Wrote {} rows ({} months x {} regions) to sample_sales.csv and sample_sales.parquet",
        rows.len(),
        MONTHS.len(),
        REGIONS.len()
    );
    Ok(())
}
