// Filtered and sorted projections of the inventory

use crate::record::VehicleRecord;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Search and filter options for a projection
///
/// An empty string means "no constraint". All active criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of owner, make, model or id
    pub text: String,
    /// Exact match on the year as it would be typed
    pub year: String,
    /// Exact, case-sensitive make
    pub make: String,
    /// Case-insensitive substring of model
    pub model: String,
}

impl FilterCriteria {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn make(mut self, make: impl Into<String>) -> Self {
        self.make = make.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.year.is_empty() && self.make.is_empty() && self.model.is_empty()
    }

    pub fn matches(&self, car: &VehicleRecord) -> bool {
        let text = self.text.to_lowercase();
        let model = self.model.to_lowercase();

        let matches_text = text.is_empty()
            || [&car.owner, &car.make, &car.model, &car.id]
                .iter()
                .any(|field| field.to_lowercase().contains(&text));
        let matches_year = self.year.is_empty() || car.year.to_string() == self.year;
        let matches_make = self.make.is_empty() || car.make == self.make;
        let matches_model = model.is_empty() || car.model.to_lowercase().contains(&model);

        matches_text && matches_year && matches_make && matches_model
    }
}

/// Select the records matching `criteria`, keeping their relative order
///
/// The input is never modified; the result borrows from it.
pub fn filter<'a, I>(records: I, criteria: &FilterCriteria) -> Vec<&'a VehicleRecord>
where
    I: IntoIterator<Item = &'a VehicleRecord>,
{
    let view: Vec<&VehicleRecord> = records.into_iter().filter(|car| criteria.matches(car)).collect();
    debug!(matched = view.len(), ?criteria, "filter: applied");
    view
}

/// Display orders a projection can be re-sorted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    YearDesc,
    YearAsc,
    MakeAsc,
    MakeDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::YearDesc, SortKey::YearAsc, SortKey::MakeAsc, SortKey::MakeDesc];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::YearDesc => "year-desc",
            SortKey::YearAsc => "year-asc",
            SortKey::MakeAsc => "make-asc",
            SortKey::MakeDesc => "make-desc",
        }
    }

    fn compare(self, a: &VehicleRecord, b: &VehicleRecord) -> Ordering {
        match self {
            SortKey::YearDesc => b.year.cmp(&a.year),
            SortKey::YearAsc => a.year.cmp(&b.year),
            SortKey::MakeAsc => locale_cmp(&a.make, &b.make),
            SortKey::MakeDesc => locale_cmp(&b.make, &a.make),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown sort option: {}", s))
    }
}

/// Reorder a projection in place (stable)
pub fn sort(view: &mut [&VehicleRecord], key: SortKey) {
    view.sort_by(|a, b| key.compare(a, b));
}

/// Reorder a projection by the option name a user picked
///
/// Unrecognized names leave the order unchanged. Returns whether a sort was applied.
pub fn sort_by_name(view: &mut [&VehicleRecord], name: &str) -> bool {
    match name.parse::<SortKey>() {
        Ok(key) => {
            sort(view, key);
            true
        }
        Err(e) => {
            debug!(error = %e, "sort_by_name: ignoring");
            false
        }
    }
}

/// Human-oriented string ordering
///
/// Accents are folded away first, so "Škoda" sorts with the plain "S" words.
/// Ties are broken case-insensitively with accents kept, then lowercase
/// before uppercase, the way a locale collator orders "a" and "A".
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

fn fold(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_lowercase()
}
