//! Loads raw area measurements from a directory of CSV files.
//!
//! Every file is keyed by `zip_code`. `areas.csv` is required and defines the
//! set of areas; each other file is optional and a missing file leaves its
//! category absent for every area.

use anyhow::{Context, Result};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::scoring::category::{
    crime::CrimeCounts, diversity::Demographics, healthcare::HospitalAccess,
    housing::HousingCosts, lifestyle::LifestyleGrades, schools::SchoolGrade,
    transit::TransitStops,
};
use crate::scoring::types::{Area, AreaInputs};

pub const AREAS_FILE: &str = "areas.csv";

/// Marker used upstream for a grade that was never assigned.
const ABSENT_GRADE: &str = "-";

/// Pads purely numeric ids to five digits (`"2108"` becomes `"02108"`).
pub fn normalize_zip(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.len() < 5 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        format!("{trimmed:0>5}")
    } else {
        trimmed.to_string()
    }
}

/// Trims and upper-cases a letter grade; blank and `-` mean absent.
pub fn clean_grade(raw: Option<String>) -> Option<String> {
    let grade = raw?.trim().to_uppercase();
    if grade.is_empty() || grade == ABSENT_GRADE {
        None
    } else {
        Some(grade)
    }
}

/// Reads a whole, non-negative count. Integral decimals such as `"610.0"`
/// are accepted; fractions, negatives and text are errors. Empty is `None`.
fn count<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let invalid = || D::Error::custom(format!("invalid count {raw:?}"));

    let value = match raw.parse::<u64>() {
        Ok(n) => n,
        Err(_) => {
            let v: f64 = raw.parse().map_err(|_| invalid())?;
            if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v >= u64::MAX as f64 {
                return Err(invalid());
            }
            v as u64
        }
    };
    T::try_from(value).map(Some).map_err(|_| invalid())
}

#[derive(Debug, Deserialize)]
struct AreaRow {
    zip_code: String,
    area_sq_mi: f64,
}

/// One CSV row of a category file.
trait CategoryRow: DeserializeOwned {
    type Raw;

    fn zip_code(&self) -> &str;

    /// `None` when the row carries nothing usable.
    fn into_raw(self) -> Option<Self::Raw>;
}

#[derive(Debug, Deserialize)]
struct CrimeRow {
    zip_code: String,
    #[serde(default, deserialize_with = "count")]
    total_crimes: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    violent_crimes: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    property_crimes: Option<u64>,
}

impl CategoryRow for CrimeRow {
    type Raw = CrimeCounts;

    fn zip_code(&self) -> &str {
        &self.zip_code
    }

    fn into_raw(self) -> Option<CrimeCounts> {
        Some(CrimeCounts {
            total_crimes: self.total_crimes,
            violent_crimes: self.violent_crimes,
            property_crimes: self.property_crimes,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LifestyleRow {
    zip_code: String,
    #[serde(default, alias = "nightlife_grade")]
    nightlife: Option<String>,
    #[serde(default, alias = "health_grade")]
    health: Option<String>,
    #[serde(default, alias = "outdoor_grade", alias = "outdoors")]
    outdoor: Option<String>,
}

impl CategoryRow for LifestyleRow {
    type Raw = LifestyleGrades;

    fn zip_code(&self) -> &str {
        &self.zip_code
    }

    fn into_raw(self) -> Option<LifestyleGrades> {
        Some(LifestyleGrades {
            nightlife: clean_grade(self.nightlife),
            health: clean_grade(self.health),
            outdoor: clean_grade(self.outdoor),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SchoolRow {
    zip_code: String,
    #[serde(default, alias = "overall_grade")]
    grade: Option<String>,
    #[serde(default, deserialize_with = "count")]
    enrollment: Option<u32>,
}

impl CategoryRow for SchoolRow {
    type Raw = SchoolGrade;

    fn zip_code(&self) -> &str {
        &self.zip_code
    }

    fn into_raw(self) -> Option<SchoolGrade> {
        clean_grade(self.grade).map(|grade| SchoolGrade {
            grade,
            enrollment: self.enrollment,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TransitRow {
    zip_code: String,
    #[serde(default, alias = "stop_count", deserialize_with = "count")]
    total_stops: Option<u64>,
}

impl CategoryRow for TransitRow {
    type Raw = TransitStops;

    fn zip_code(&self) -> &str {
        &self.zip_code
    }

    fn into_raw(self) -> Option<TransitStops> {
        Some(TransitStops {
            total_stops: self.total_stops,
        })
    }
}

#[derive(Debug, Deserialize)]
struct HousingRow {
    zip_code: String,
    #[serde(default)]
    median_home_value: Option<f64>,
    #[serde(default)]
    median_rent: Option<f64>,
    #[serde(default)]
    median_household_income: Option<f64>,
}

impl CategoryRow for HousingRow {
    type Raw = HousingCosts;

    fn zip_code(&self) -> &str {
        &self.zip_code
    }

    fn into_raw(self) -> Option<HousingCosts> {
        Some(HousingCosts {
            median_home_value: self.median_home_value,
            median_rent: self.median_rent,
            median_household_income: self.median_household_income,
        })
    }
}

#[derive(Debug, Deserialize)]
struct HealthcareRow {
    zip_code: String,
    #[serde(default)]
    nearest_tier1_dist: Option<f64>,
    #[serde(default)]
    nearest_hospital_dist: Option<f64>,
    #[serde(
        default,
        alias = "hospitals_within_5mi",
        deserialize_with = "count"
    )]
    hospitals_within_radius: Option<u32>,
    #[serde(
        default,
        alias = "tier1_within_5mi",
        deserialize_with = "count"
    )]
    tier1_within_radius: Option<u32>,
}

impl CategoryRow for HealthcareRow {
    type Raw = HospitalAccess;

    fn zip_code(&self) -> &str {
        &self.zip_code
    }

    fn into_raw(self) -> Option<HospitalAccess> {
        Some(HospitalAccess {
            nearest_tier1_dist: self.nearest_tier1_dist,
            nearest_hospital_dist: self.nearest_hospital_dist,
            hospitals_within_radius: self.hospitals_within_radius,
            tier1_within_radius: self.tier1_within_radius,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DiversityRow {
    zip_code: String,
    #[serde(default, alias = "total_population", deserialize_with = "count")]
    total_pop: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    white: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    black: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    asian: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    other: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    two_or_more: Option<u64>,
}

impl CategoryRow for DiversityRow {
    type Raw = Demographics;

    fn zip_code(&self) -> &str {
        &self.zip_code
    }

    fn into_raw(self) -> Option<Demographics> {
        Some(Demographics {
            total_pop: self.total_pop,
            white: self.white,
            black: self.black,
            asian: self.asian,
            other: self.other,
            two_or_more: self.two_or_more,
        })
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let row: T =
            result.with_context(|| format!("parsing {} record {}", path.display(), line + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Reads `file` under `dir` and hands each row's raw measurement to `assign`.
///
/// Returns the number of rows attached to a known area.
fn load_category<R, F>(
    dir: &Path,
    file: &str,
    inputs: &mut [AreaInputs],
    index: &HashMap<String, usize>,
    mut assign: F,
) -> Result<usize>
where
    R: CategoryRow,
    F: FnMut(&mut AreaInputs, R::Raw),
{
    let path = dir.join(file);
    if !path.exists() {
        warn!(file, "Input file not found, category missing for every area");
        return Ok(0);
    }

    let rows: Vec<R> = read_rows(&path)?;
    let total = rows.len();
    let mut attached = 0;
    let mut unknown = 0;

    for row in rows {
        let zip = normalize_zip(row.zip_code());
        let Some(&i) = index.get(&zip) else {
            unknown += 1;
            debug!(file, zip_code = %zip, "Row for unknown area ignored");
            continue;
        };
        if let Some(raw) = row.into_raw() {
            assign(&mut inputs[i], raw);
            attached += 1;
        }
    }

    if unknown > 0 {
        warn!(file, unknown, "Ignored rows for unknown areas");
    }
    debug!(file, total, attached, "Loaded category file");

    Ok(attached)
}

/// Loads every area and its raw measurements from `dir`.
///
/// Areas keep the order of `areas.csv`; duplicate ids after the first are
/// ignored.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_dir(dir: &Path) -> Result<Vec<AreaInputs>> {
    let area_rows: Vec<AreaRow> = read_rows(&dir.join(AREAS_FILE))?;

    let mut inputs = Vec::with_capacity(area_rows.len());
    let mut index = HashMap::with_capacity(area_rows.len());
    for row in area_rows {
        let zip = normalize_zip(&row.zip_code);
        if index.contains_key(&zip) {
            warn!(zip_code = %zip, "Duplicate area ignored");
            continue;
        }
        let area = Area::new(zip.clone(), row.area_sq_mi)
            .with_context(|| format!("loading {AREAS_FILE}"))?;
        index.insert(zip, inputs.len());
        inputs.push(AreaInputs::new(area));
    }

    load_category::<CrimeRow, _>(dir, "crime.csv", &mut inputs, &index, |a, raw| {
        a.crime = Some(raw);
    })?;
    load_category::<LifestyleRow, _>(dir, "lifestyle.csv", &mut inputs, &index, |a, raw| {
        a.lifestyle = Some(raw);
    })?;
    load_category::<SchoolRow, _>(dir, "schools.csv", &mut inputs, &index, |a, raw| {
        a.schools.get_or_insert_with(Default::default).schools.push(raw);
    })?;
    load_category::<TransitRow, _>(dir, "transit.csv", &mut inputs, &index, |a, raw| {
        a.transit = Some(raw);
    })?;
    load_category::<HousingRow, _>(dir, "housing.csv", &mut inputs, &index, |a, raw| {
        a.housing = Some(raw);
    })?;
    load_category::<HealthcareRow, _>(dir, "healthcare.csv", &mut inputs, &index, |a, raw| {
        a.healthcare = Some(raw);
    })?;
    load_category::<DiversityRow, _>(dir, "diversity.csv", &mut inputs, &index, |a, raw| {
        a.diversity = Some(raw);
    })?;

    info!(areas = inputs.len(), "Loaded inputs");
    Ok(inputs)
}
