// Vehicle record model and raw field coercion

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Model year of a vehicle
///
/// Years are never range-checked. Input that does not parse as an integer is
/// kept as a "not a number" sentinel instead of being rejected, so a malformed
/// CSV row still produces a record. The sentinel serializes as JSON `null`
/// and renders as `NaN`. The default year is the sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(Option<i64>);

impl Year {
    pub const NAN: Year = Year(None);

    pub fn new(year: i64) -> Self {
        Year(Some(year))
    }

    /// Parse user or CSV input leniently (see [`parse_int`])
    pub fn parse(input: &str) -> Self {
        Year(parse_int(input))
    }

    pub fn value(&self) -> Option<i64> {
        self.0
    }

    pub fn is_nan(&self) -> bool {
        self.0.is_none()
    }
}

impl From<i64> for Year {
    fn from(year: i64) -> Self {
        Year::new(year)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(year) => write!(f, "{}", year),
            None => write!(f, "NaN"),
        }
    }
}

// NaN orders before every real year so sorting stays total.
impl Ord for Year {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Year {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One vehicle inventory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Time-based identifier, immutable once assigned
    pub id: String,
    pub owner: String,
    pub make: String,
    pub model: String,
    pub year: Year,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub mileage: Option<i64>,
    /// Inline image reference, usually a `data:` URI
    #[serde(default)]
    pub image: Option<String>,
}

impl VehicleRecord {
    /// "2019 Honda Civic"
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}

/// Field values for a record that does not exist yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewVehicle {
    pub owner: String,
    pub make: String,
    pub model: String,
    pub year: Year,
    pub color: Option<String>,
    pub mileage: Option<i64>,
    pub image: Option<String>,
}

impl NewVehicle {
    /// Build from raw form input, coercing the numeric fields
    pub fn from_input(owner: &str, make: &str, model: &str, year: &str, color: &str, mileage: &str) -> Self {
        Self {
            owner: owner.to_string(),
            make: make.to_string(),
            model: model.to_string(),
            year: Year::parse(year),
            color: Some(color.to_string()),
            mileage: parse_int(mileage),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub(crate) fn into_record(self, id: String) -> VehicleRecord {
        VehicleRecord {
            id,
            owner: self.owner,
            make: self.make,
            model: self.model,
            year: self.year,
            color: normalize_color(self.color),
            mileage: normalize_mileage(self.mileage),
            image: self.image,
        }
    }
}

/// Partial update for an existing record
///
/// `None` leaves a field untouched. For `color` and `mileage`, `Some(None)`
/// clears the value; blank colors and non-positive mileages clear it too.
/// `image` can only be replaced, never cleared, by an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehiclePatch {
    pub owner: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<Year>,
    pub color: Option<Option<String>>,
    pub mileage: Option<Option<i64>>,
    pub image: Option<String>,
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        *self == VehiclePatch::default()
    }

    pub(crate) fn apply(self, record: &mut VehicleRecord) {
        if let Some(owner) = self.owner {
            record.owner = owner;
        }
        if let Some(make) = self.make {
            record.make = make;
        }
        if let Some(model) = self.model {
            record.model = model;
        }
        if let Some(year) = self.year {
            record.year = year;
        }
        if let Some(color) = self.color {
            record.color = normalize_color(color);
        }
        if let Some(mileage) = self.mileage {
            record.mileage = normalize_mileage(mileage);
        }
        if let Some(image) = self.image {
            record.image = Some(image);
        }
    }
}

pub(crate) fn normalize_color(color: Option<String>) -> Option<String> {
    color.filter(|c| !c.trim().is_empty())
}

pub(crate) fn normalize_mileage(mileage: Option<i64>) -> Option<i64> {
    mileage.filter(|m| *m > 0)
}

/// Lenient integer parsing, as a form field would do it
///
/// Leading whitespace is skipped, an optional sign is accepted, then the
/// longest run of ASCII digits is taken and the rest ignored. Returns `None`
/// when no digit follows, or on overflow.
pub fn parse_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Current timestamp in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Records the inventory starts with when nothing has been persisted yet
pub fn seed_collection() -> Vec<VehicleRecord> {
    let seed = |id: &str, owner: &str, make: &str, model: &str, year: i64, color: &str, mileage: i64| VehicleRecord {
        id: id.to_string(),
        owner: owner.to_string(),
        make: make.to_string(),
        model: model.to_string(),
        year: Year::new(year),
        color: Some(color.to_string()),
        mileage: Some(mileage),
        image: None,
    };

    vec![
        seed("car3242", "Bob", "Honda", "Civic", 2019, "Blue", 45000),
        seed("car4567", "Alice", "Toyota", "Camry", 2021, "Silver", 28000),
        seed("car8901", "Charlie", "Ford", "F-150", 2020, "Red", 52000),
    ]
}
