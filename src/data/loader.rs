use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, UInt32Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{columns, CellValue, Dataset, Listing};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one listing per line
/// * `.json`    – `[{ "Country": "...", "Price": 120, ... }, ...]`
/// * `.parquet` – flat columns with the same names as the CSV header
///
/// Headers are matched case-insensitively. Columns outside the listing
/// schema are kept per row as [`CellValue`]s.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let open = || {
        File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    let dataset = match ext.as_str() {
        "csv" => read_csv(open()?)?,
        "json" => read_json(open()?)?,
        "parquet" | "pq" => read_parquet(open()?)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} listings from {} ({} extra columns)",
        dataset.len(),
        path.display(),
        dataset.extra_columns().len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Header resolution and row conversion, shared by all formats
// ---------------------------------------------------------------------------

/// Position of each schema column in the source header, plus the
/// non-schema columns to carry along.
struct HeaderMap {
    name: usize,
    host_name: usize,
    country: usize,
    property_type: usize,
    room_type: usize,
    price: usize,
    review_scores: usize,
    availability: usize,
    extras: Vec<(usize, String)>,
}

impl HeaderMap {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or(LoadError::MissingColumn(column))
        };

        let mut map = HeaderMap {
            name: find(columns::NAME)?,
            host_name: find(columns::HOST_NAME)?,
            country: find(columns::COUNTRY)?,
            property_type: find(columns::PROPERTY_TYPE)?,
            room_type: find(columns::ROOM_TYPE)?,
            price: find(columns::PRICE)?,
            review_scores: find(columns::REVIEW_SCORES)?,
            availability: find(columns::AVAILABILITY)?,
            extras: Vec::new(),
        };

        let known = [
            map.name,
            map.host_name,
            map.country,
            map.property_type,
            map.room_type,
            map.price,
            map.review_scores,
            map.availability,
        ];
        map.extras = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !known.contains(i))
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();
        Ok(map)
    }

    fn extra_columns(&self) -> Vec<String> {
        self.extras.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Convert one source row (cells aligned with the header) into a listing.
    fn listing(&self, row: usize, mut cells: Vec<CellValue>) -> Result<Listing, LoadError> {
        let mut take = |idx: usize| {
            cells
                .get_mut(idx)
                .map(|cell| std::mem::replace(cell, CellValue::Null))
                .unwrap_or(CellValue::Null)
        };

        let name = text(take(self.name));
        let host_name = text(take(self.host_name));
        let country = required_text(row, columns::COUNTRY, take(self.country))?;
        let property_type = required_text(row, columns::PROPERTY_TYPE, take(self.property_type))?;
        let room_type = required_text(row, columns::ROOM_TYPE, take(self.room_type))?;

        let price = number(row, columns::PRICE, take(self.price))?.ok_or_else(|| {
            invalid(row, columns::PRICE, "blank price")
        })?;
        if price < 0.0 {
            return Err(invalid(row, columns::PRICE, format!("negative price {price}")));
        }

        let review_score = number(row, columns::REVIEW_SCORES, take(self.review_scores))?;

        let availability = number(row, columns::AVAILABILITY, take(self.availability))?
            .ok_or_else(|| invalid(row, columns::AVAILABILITY, "blank availability"))?;
        if availability.fract() != 0.0 || !(0.0..=365.0).contains(&availability) {
            return Err(invalid(
                row,
                columns::AVAILABILITY,
                format!("{availability} is not a whole number of days in 0..=365"),
            ));
        }

        let extra = self
            .extras
            .iter()
            .map(|(idx, col)| {
                let cell = match take(*idx) {
                    CellValue::Text(s) => CellValue::infer(&s),
                    other => other,
                };
                (col.clone(), cell)
            })
            .collect::<BTreeMap<_, _>>();

        Ok(Listing {
            name,
            host_name,
            country,
            property_type,
            room_type,
            price,
            review_score,
            availability_365: availability as u16,
            extra,
        })
    }
}

fn invalid(row: usize, column: &'static str, reason: impl Into<String>) -> LoadError {
    LoadError::InvalidValue {
        row,
        column,
        reason: reason.into(),
    }
}

fn text(cell: CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn required_text(row: usize, column: &'static str, cell: CellValue) -> Result<String, LoadError> {
    let value = text(cell);
    if value.is_empty() {
        return Err(invalid(row, column, "blank value"));
    }
    Ok(value)
}

/// Numeric cell; `Ok(None)` when blank.
fn number(row: usize, column: &'static str, cell: CellValue) -> Result<Option<f64>, LoadError> {
    let value = match cell {
        CellValue::Null => return Ok(None),
        CellValue::Integer(i) => i as f64,
        CellValue::Float(f) => f,
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map_err(|_| invalid(row, column, format!("'{s}' is not a number")))?
        }
        CellValue::Bool(b) => return Err(invalid(row, column, format!("'{b}' is not a number"))),
    };
    if value.is_nan() {
        return Ok(None);
    }
    if !value.is_finite() {
        return Err(invalid(row, column, format!("{value} is not finite")));
    }
    Ok(Some(value))
}

fn finish(listings: Vec<Listing>, header: &HeaderMap) -> Result<Dataset, LoadError> {
    if listings.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(Dataset::from_listings(listings, header.extra_columns()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one listing per record.
pub(crate) fn read_csv<R: Read>(source: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let header = HeaderMap::resolve(&headers)?;

    let mut listings = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cells = record
            .iter()
            .map(|s| CellValue::Text(s.to_string()))
            .collect();
        listings.push(header.listing(row_no, cells)?);
    }

    finish(listings, &header)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `orient='records'` dataframe dump:
///
/// ```json
/// [
///   { "Name": "Loft", "Country": "Spain", "Price": 80, "Review_scores": 94, ... },
///   ...
/// ]
/// ```
pub(crate) fn read_json<R: Read>(source: R) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_reader(source)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array".into()))?;

    // Column order: first appearance across records.
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let header = HeaderMap::resolve(&headers)?;

    let mut listings = Vec::with_capacity(records.len());
    for (row_no, rec) in records.iter().enumerate() {
        let cells = headers
            .iter()
            .map(|h| rec.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect();
        listings.push(header.listing(row_no, cells)?);
    }

    finish(listings, &header)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat listing columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
pub(crate) fn read_parquet(file: File) -> Result<Dataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let header = HeaderMap::resolve(&headers)?;
    let reader = builder.build()?;

    let mut listings = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| arrow_cell(col, row))
                .collect();
            listings.push(header.listing(listings.len(), cells)?);
        }
    }

    finish(listings, &header)
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => array_value_to_string(col, row)
            .map(CellValue::Text)
            .unwrap_or(CellValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::{Facet, Measure};

    const HEADER: &str =
        "Id,Name,Host_name,Country,Property_type,Room_type,Price,Review_scores,Availability_365";

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_with_extra_columns() {
        let body = format!(
            "{HEADER}\n\
             10,Sunny loft,Ana,Spain,Loft,Entire home/apt,80,95,120\n\
             11,Quiet room,Bo,Portugal,Apartment,Private room,45.5,,0\n"
        );
        let file = write_temp(".csv", &body);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.extra_columns(), ["Id"]);
        let first = &ds.listings()[0];
        assert_eq!(first.name, "Sunny loft");
        assert_eq!(first.review_score, Some(95.0));
        assert_eq!(first.availability_365, 120);
        assert_eq!(first.extra.get("Id"), Some(&CellValue::Integer(10)));
        assert_eq!(ds.listings()[1].review_score, None);
        assert_eq!(ds.bounds(Measure::Price), Some((45.5, 80.0)));
        assert_eq!(ds.distinct_values(Facet::Country).len(), 2);
    }

    #[test]
    fn header_match_ignores_case() {
        let body = "name,host_name,country,property_type,room_type,price,review_scores,availability_365\n\
                    A,H,Spain,Loft,Shared room,10,80,5\n";
        let ds = read_csv(body.as_bytes()).unwrap();
        assert_eq!(ds.listings()[0].room_type, "Shared room");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = write_temp(".xlsx", "whatever");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let body = "Name,Host_name,Country,Property_type,Room_type,Review_scores,Availability_365\n\
                    A,H,Spain,Loft,Shared room,80,5\n";
        let err = read_csv(body.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Price")));
    }

    #[test]
    fn invalid_cells_name_row_and_column() {
        let bad_price = format!("{HEADER}\n1,A,H,Spain,Loft,Shared room,cheap,80,5\n");
        let err = read_csv(bad_price.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { row: 0, column: "Price", .. }));
        assert!(err.to_string().starts_with("row 1, column 'Price'"));

        let negative = format!("{HEADER}\n1,A,H,Spain,Loft,Shared room,-3,80,5\n");
        assert!(read_csv(negative.as_bytes()).is_err());

        let blank_country = format!("{HEADER}\n1,A,H,,Loft,Shared room,3,80,5\n");
        let err = read_csv(blank_country.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { column: "Country", .. }));

        let too_available = format!("{HEADER}\n1,A,H,Spain,Loft,Shared room,3,80,400\n");
        let err = read_csv(too_available.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { column: "Availability_365", .. }));
    }

    #[test]
    fn header_only_csv_is_empty_error() {
        let body = format!("{HEADER}\n");
        assert!(matches!(read_csv(body.as_bytes()), Err(LoadError::Empty)));
    }

    #[test]
    fn loads_json_records() {
        let body = r#"[
            {"Name": "Loft", "Host_name": "Ana", "Country": "Spain", "Property_type": "Loft",
             "Room_type": "Entire home/apt", "Price": 80, "Review_scores": null,
             "Availability_365": 12, "Superhost": true},
            {"Name": "Room", "Host_name": "Bo", "Country": "Brazil", "Property_type": "House",
             "Room_type": "Private room", "Price": 20.5, "Review_scores": 88.0,
             "Availability_365": 300}
        ]"#;
        let ds = read_json(body.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.listings()[0].review_score, None);
        assert_eq!(ds.listings()[0].extra.get("Superhost"), Some(&CellValue::Bool(true)));
        assert_eq!(ds.listings()[1].extra.get("Superhost"), Some(&CellValue::Null));
        assert_eq!(ds.listings()[1].price, 20.5);
    }

    #[test]
    fn json_must_be_an_array() {
        let err = read_json(r#"{"Name": "x"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn loads_parquet_columns() {
        use std::sync::Arc;

        use arrow::array::{Float64Array, Int32Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Name", DataType::Utf8, false),
            Field::new("Host_name", DataType::Utf8, false),
            Field::new("Country", DataType::Utf8, false),
            Field::new("Property_type", DataType::Utf8, false),
            Field::new("Room_type", DataType::Utf8, false),
            Field::new("Price", DataType::Float64, false),
            Field::new("Review_scores", DataType::Float64, true),
            Field::new("Availability_365", DataType::Int32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Loft", "Villa"])),
                Arc::new(StringArray::from(vec!["Ana", "Cy"])),
                Arc::new(StringArray::from(vec!["Spain", "Turkey"])),
                Arc::new(StringArray::from(vec!["Loft", "Villa"])),
                Arc::new(StringArray::from(vec!["Entire home/apt", "Entire home/apt"])),
                Arc::new(Float64Array::from(vec![80.0, 640.0])),
                Arc::new(Float64Array::from(vec![Some(97.0), None])),
                Arc::new(Int32Array::from(vec![30, 365])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.listings()[1].country, "Turkey");
        assert_eq!(ds.listings()[1].review_score, None);
        assert_eq!(ds.listings()[1].availability_365, 365);
        assert!(ds.extra_columns().is_empty());
    }
}
