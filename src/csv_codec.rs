// CSV interchange format for the inventory
//
// The format is deliberately naive: fields are joined with commas and never
// quoted, and import splits on every comma. A value containing a comma or a
// newline does not survive a round trip.

use crate::error::{InventoryError, Result};
use crate::record::{VehicleRecord, Year, normalize_color, normalize_mileage, now_ms, parse_int};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::{debug, info};

pub const HEADER: [&str; 7] = ["ID", "Owner", "Make", "Model", "Year", "Color", "Mileage"];

/// Name offered for exported files
pub const EXPORT_FILE_NAME: &str = "car-inventory.csv";

pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// ID, Owner, Make, Model and Year must be present; Color and Mileage may be cut off
const MIN_COLUMNS: usize = 5;

/// Serialize records, header first, one row per record
pub fn encode<'a, I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = &'a VehicleRecord>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;

    let mut count = 0;
    for car in records {
        let year = car.year.to_string();
        let mileage = car.mileage.map(|m| m.to_string()).unwrap_or_default();
        writer.write_record([
            car.id.as_str(),
            car.owner.as_str(),
            car.make.as_str(),
            car.model.as_str(),
            year.as_str(),
            car.color.as_deref().unwrap_or(""),
            mileage.as_str(),
        ])?;
        count += 1;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    debug!(count, "encode: wrote CSV rows");

    // Every field came from a String, so the output is valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse CSV text into new records
///
/// See [`decode_at`]; generated ids use the current time.
pub fn decode(text: &str) -> Result<Vec<VehicleRecord>> {
    decode_at(text, now_ms())
}

/// Parse CSV text into new records, generating missing ids from `timestamp_ms`
///
/// The text is split on `\n` and the first line is a header, ignored without
/// being checked even when blank. Blank lines are skipped. One trailing `\r`
/// per line is dropped so CRLF files import cleanly; any other `\r` stays in
/// its field. Fields are split on every comma. A row with too few columns
/// aborts the whole decode: no records are returned and the error names the
/// offending line.
pub fn decode_at(text: &str, timestamp_ms: i64) -> Result<Vec<VehicleRecord>> {
    let mut cars = Vec::new();

    for (index, raw) in text.split('\n').enumerate().skip(1) {
        if raw.trim().is_empty() {
            continue;
        }

        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < MIN_COLUMNS {
            return Err(InventoryError::Import {
                line: index + 1,
                reason: format!("expected at least {} columns, found {}", MIN_COLUMNS, fields.len()),
            });
        }

        let field = |i: usize| fields.get(i).copied().unwrap_or("");

        // Generated ids carry the zero-based line index, header included
        let id = match field(0) {
            "" => format!("car{}{}", timestamp_ms, index),
            id => id.to_string(),
        };

        cars.push(VehicleRecord {
            id,
            owner: field(1).to_string(),
            make: field(2).to_string(),
            model: field(3).to_string(),
            year: Year::parse(field(4)),
            color: normalize_color(Some(field(5).to_string())),
            mileage: normalize_mileage(parse_int(field(6))),
            image: None,
        });
    }

    info!(count = cars.len(), "Decoded records from CSV");
    Ok(cars)
}
