use std::sync::Arc;

use anyhow::Result;
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const N_ROWS: usize = 250;

const CATEGORIES: [&str; 8] = [
    "Animation",
    "Games",
    "Movies",
    "Television",
    "Rocks",
    "Sports",
    "Ad Icons",
    "Heroes",
];

const CHARACTERS: [&str; 12] = [
    "Kitsune",
    "Pocket Dragon",
    "Moon Witch",
    "Robo Cat",
    "Captain Nova",
    "Pixel Knight",
    "Sewer Shark",
    "Disco Yeti",
    "Grim Jester",
    "Static Fox",
    "Iron Baker",
    "Velvet Ghoul",
];

const VARIANTS: [&str; 5] = ["", " (Glow)", " (Flocked)", " (Metallic)", " (Chase)"];

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

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[(self.next_u64() % pool.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated sale row, with the literal CSV cell text alongside the
/// typed value so both outputs stay consistent.
struct SampleRow {
    category: String,
    name: String,
    price: Option<f64>,
    price_cell: String,
    volume: Option<i64>,
    date_cell: Option<String>,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<SampleRow> {
    (0..N_ROWS)
        .map(|i| {
            let category = rng.pick(&CATEGORIES).to_string();
            let name = format!(
                "{}{} #{}",
                rng.pick(&CHARACTERS),
                rng.pick(&VARIANTS),
                100 + (rng.next_u64() % 900)
            );

            // Log-normal-ish price spread, occasionally unparsable text or
            // a blank cell.
            let roll = rng.next_f64();
            let (price, price_cell) = if roll < 0.05 {
                (None, "sold out".to_string())
            } else if roll < 0.08 {
                (None, String::new())
            } else {
                let p = (rng.gauss(2.5, 1.2).exp()).clamp(0.5, 5000.0);
                let p = (p * 100.0).round() / 100.0;
                (Some(p), format_currency(p))
            };

            // Volumes skew small; a slice of the market never resells.
            let roll = rng.next_f64();
            let volume = if roll < 0.04 {
                None
            } else if roll < 0.12 {
                Some((rng.next_u64() % 2) as i64)
            } else {
                Some((rng.next_f64().powi(2) * 400.0) as i64 + 2)
            };

            // ISO dates with a sprinkling of malformed values.
            let roll = rng.next_f64();
            let date_cell = if roll < 0.04 {
                None
            } else if roll < 0.08 {
                Some("unknown".to_string())
            } else if i % 97 == 0 {
                Some("06/15/2019".to_string())
            } else {
                let year = 2008 + (rng.next_u64() % 16) as i32;
                let month = 1 + (rng.next_u64() % 12) as u32;
                let day = 1 + (rng.next_u64() % 28) as u32;
                Some(format!("{year:04}-{month:02}-{day:02}"))
            };

            SampleRow {
                category,
                name,
                price,
                price_cell,
                volume,
                date_cell,
            }
        })
        .collect()
}

/// `1234.5` → `"$1,234.50"`.
fn format_currency(v: f64) -> String {
    let cents = (v * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = cents % 100;
    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}.{frac:02}")
}

fn write_csv(path: &str, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "console-name",
        "product-name",
        "new-price",
        "sales-volume",
        "release-date",
    ])?;
    for row in rows {
        let volume_cell = row.volume.map(|v| v.to_string()).unwrap_or_default();
        writer.write_record([
            row.category.as_str(),
            row.name.as_str(),
            row.price_cell.as_str(),
            volume_cell.as_str(),
            row.date_cell.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[SampleRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("console-name", DataType::Utf8, false),
        Field::new("product-name", DataType::Utf8, false),
        Field::new("new-price", DataType::Float64, true),
        Field::new("sales-volume", DataType::Int64, true),
        Field::new("release-date", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.category.clone()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.price).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.volume).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.date_cell.clone()).collect::<Vec<_>>(),
            )),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_csv("funko_sample.csv", &rows)?;
    write_parquet("funko_sample.parquet", &rows)?;

    println!("Wrote {} rows to funko_sample.csv and funko_sample.parquet", rows.len());
    Ok(())
}
