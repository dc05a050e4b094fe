//! Writes a synthetic listings dataset as `sample_listings.csv` and
//! `sample_listings.parquet`.
//!
//! Usage: `generate_sample [rows] [out_dir]` (defaults: 2000 rows, `.`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, UInt16Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5EED_1157;

/// Country with its typical nightly price.
const COUNTRIES: [(&str, f64); 9] = [
    ("United States", 180.0),
    ("Spain", 95.0),
    ("Portugal", 80.0),
    ("Brazil", 60.0),
    ("Turkey", 55.0),
    ("Canada", 140.0),
    ("Australia", 170.0),
    ("Hong Kong", 120.0),
    ("China", 70.0),
];

/// Property type with a price multiplier.
const PROPERTY_TYPES: [(&str, f64); 8] = [
    ("Apartment", 1.0),
    ("House", 1.4),
    ("Condominium", 1.2),
    ("Serviced apartment", 1.3),
    ("Loft", 1.1),
    ("Guest suite", 0.8),
    ("Villa", 3.0),
    ("Hostel", 0.4),
];

const ROOM_TYPES: [(&str, f64); 3] = [
    ("Entire home/apt", 1.0),
    ("Private room", 0.55),
    ("Shared room", 0.3),
];

const FIRST_NAMES: [&str; 16] = [
    "Ana", "Bruno", "Chen", "Dana", "Emre", "Fatima", "Gustavo", "Hana", "Ivan", "Julia", "Kai",
    "Lucia", "Marco", "Nadia", "Omar", "Pia",
];

const ADJECTIVES: [&str; 8] = [
    "Sunny", "Cozy", "Modern", "Quiet", "Spacious", "Charming", "Central", "Bright",
];

struct Row {
    id: i64,
    name: String,
    host_name: String,
    country: &'static str,
    property_type: &'static str,
    room_type: &'static str,
    price: f64,
    review_score: Option<f64>,
    availability: u16,
}

fn generate(n: usize, rng: &mut StdRng) -> Vec<Row> {
    // A small pool of hosts so some hosts hold many listings.
    let hosts: Vec<String> = (0..n.div_ceil(4).max(1))
        .map(|i| format!("{} {}", FIRST_NAMES[i % FIRST_NAMES.len()], i / FIRST_NAMES.len() + 1))
        .collect();

    (0..n)
        .map(|i| {
            let &(country, base) = COUNTRIES.choose(rng).unwrap_or(&COUNTRIES[0]);
            let &(property_type, p_mult) = PROPERTY_TYPES.choose(rng).unwrap_or(&PROPERTY_TYPES[0]);
            let &(room_type, r_mult) = ROOM_TYPES.choose(rng).unwrap_or(&ROOM_TYPES[0]);
            // Skew host choice toward the front of the pool.
            let host_idx = ((rng.gen::<f64>().powi(3)) * hosts.len() as f64) as usize;
            let noise: f64 = rng.gen_range(0.6..1.6);
            let price = (base * p_mult * r_mult * noise).round().max(9.0);
            let review_score = if rng.gen_bool(0.85) {
                Some(f64::from(rng.gen_range(60u8..=100)))
            } else {
                None
            };
            let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Nice");
            Row {
                id: 10_000_000 + i as i64,
                name: format!("{adjective} {} in {country}", property_type.to_lowercase()),
                host_name: hosts[host_idx.min(hosts.len() - 1)].clone(),
                country,
                property_type,
                room_type,
                price,
                review_score,
                availability: rng.gen_range(0..=365),
            }
        })
        .collect()
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Id", DataType::Int64, false),
        Field::new("Name", DataType::Utf8, false),
        Field::new("Host_name", DataType::Utf8, false),
        Field::new("Country", DataType::Utf8, false),
        Field::new("Property_type", DataType::Utf8, false),
        Field::new("Room_type", DataType::Utf8, false),
        Field::new("Price", DataType::Float64, false),
        Field::new("Review_scores", DataType::Float64, true),
        Field::new("Availability_365", DataType::UInt16, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.name.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.host_name.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.country))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.property_type))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.room_type))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.price))),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.review_score))),
        Arc::new(UInt16Array::from_iter_values(rows.iter().map(|r| r.availability))),
    ];

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "Id",
        "Name",
        "Host_name",
        "Country",
        "Property_type",
        "Room_type",
        "Price",
        "Review_scores",
        "Availability_365",
    ])?;
    for r in rows {
        writer.write_record([
            r.id.to_string(),
            r.name.clone(),
            r.host_name.clone(),
            r.country.to_string(),
            r.property_type.to_string(),
            r.room_type.to_string(),
            r.price.to_string(),
            r.review_score.map(|s| s.to_string()).unwrap_or_default(),
            r.availability.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let n: usize = match args.next() {
        Some(s) => s.parse().with_context(|| format!("'{s}' is not a row count"))?,
        None => 2000,
    };
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let mut rng = StdRng::seed_from_u64(SEED);
    let rows = generate(n, &mut rng);
    let batch = to_batch(&rows)?;

    let csv_path = out_dir.join("sample_listings.csv");
    let parquet_path = out_dir.join("sample_listings.parquet");
    write_csv(&rows, &csv_path)?;
    write_parquet(&batch, &parquet_path)?;

    log::info!("Wrote {n} listings to {} and {}", csv_path.display(), parquet_path.display());
    println!("{}", pretty_format_batches(&[batch.slice(0, n.min(5))])?);
    Ok(())
}
