//! Output formatting and persistence for scored tables.
//!
//! Supports JSON serialization, CSV export and the column data dictionary.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

use crate::scoring::category::{components, metrics};
use crate::scoring::types::{Category, ScoredAreaRecord};

/// Two-decimal display rounding; absent values are empty cells.
fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// Column order of the full export: area columns, then per category its
/// metrics, sub-scores and score, then the composite columns.
pub fn full_header() -> Vec<String> {
    let mut header = ["area_id", "area_sq_mi"].map(String::from).to_vec();
    for category in Category::ALL {
        header.extend(metrics(category).iter().map(|&(name, _)| name.to_string()));
        header.extend(components(category).iter().map(|c| c.to_string()));
        header.push(category.score_column());
    }
    header.extend(["composite_score", "tier", "partial"].map(String::from));
    header
}

fn full_row(record: &ScoredAreaRecord) -> Vec<String> {
    let mut row = vec![record.area_id.clone(), cell(Some(record.area_sq_mi))];
    for category in Category::ALL {
        let score = record.category(category);
        for &(name, _) in metrics(category) {
            row.push(
                score
                    .and_then(|s| s.metric(name))
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        for name in components(category) {
            row.push(cell(score.and_then(|s| s.component(name)).map(|c| c.value)));
        }
        row.push(cell(score.map(|s| s.value)));
    }
    row.push(cell(record.composite_value()));
    row.push(record.tier_label().to_string());
    row.push(record.is_partial().to_string());
    row
}

/// Column order of the scores-only export.
pub fn scores_only_header() -> Vec<String> {
    let mut header = ["area_id", "composite_score", "tier"].map(String::from).to_vec();
    header.extend(Category::ALL.iter().map(|c| c.score_column()));
    header
}

fn scores_only_row(record: &ScoredAreaRecord) -> Vec<String> {
    let mut row = vec![
        record.area_id.clone(),
        cell(record.composite_value()),
        record.tier_label().to_string(),
    ];
    row.extend(
        Category::ALL
            .iter()
            .map(|&c| cell(record.category(c).map(|s| s.value))),
    );
    row
}

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("creating {}", path.display()))
}

fn write_table<F>(path: &Path, header: Vec<String>, records: &[ScoredAreaRecord], row: F) -> Result<()>
where
    F: Fn(&ScoredAreaRecord) -> Vec<String>,
{
    debug!(path = %path.display(), rows = records.len(), "Writing CSV");

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(create(path)?);

    writer.write_record(&header)?;
    for record in records {
        writer.write_record(row(record))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the full table: published metrics, sub-scores, category scores,
/// composite, tier and partial flag.
pub fn write_scores(path: &Path, records: &[ScoredAreaRecord]) -> Result<()> {
    write_table(path, full_header(), records, full_row)
}

/// Writes the id, composite, tier and the seven category scores.
pub fn write_scores_only(path: &Path, records: &[ScoredAreaRecord]) -> Result<()> {
    write_table(path, scores_only_header(), records, scores_only_row)
}

/// Every column of the full export with its description, in export order.
pub fn data_dictionary() -> Vec<(String, String)> {
    let mut rows = vec![
        ("area_id".to_string(), "Five-digit ZIP code".to_string()),
        ("area_sq_mi".to_string(), "Land area in square miles".to_string()),
    ];
    for category in Category::ALL {
        rows.extend(
            metrics(category)
                .iter()
                .map(|&(name, description)| (name.to_string(), description.to_string())),
        );
        rows.extend(
            components(category)
                .iter()
                .map(|name| (name.to_string(), format!("{category} sub-score, 0-10"))),
        );
        rows.push((category.score_column(), format!("{category} category score, 0-10")));
    }
    rows.extend([
        (
            "composite_score".to_string(),
            "Weighted composite over the categories present, 0-10".to_string(),
        ),
        ("tier".to_string(), "Livability tier of the composite".to_string()),
        (
            "partial".to_string(),
            "True when any category is missing".to_string(),
        ),
    ]);
    rows
}

/// Writes the data dictionary as a `column,description` CSV.
pub fn write_data_dictionary(path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(create(path)?);
    writer.write_record(["column", "description"])?;
    for (column, description) in data_dictionary() {
        writer.write_record([column, description])?;
    }
    writer.flush()?;
    Ok(())
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = create(path)?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryWeights;
    use crate::scoring::aggregate::aggregate;
    use crate::scoring::tier::classify;
    use crate::scoring::types::{CategoryScore, Metric, SubScore};
    use std::collections::BTreeMap;
    use std::env;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn record(id: &str, scores: &[(Category, f64)]) -> ScoredAreaRecord {
        let categories: BTreeMap<_, _> = scores
            .iter()
            .map(|&(c, v)| {
                let subs = components(c)
                    .iter()
                    .map(|&name| SubScore {
                        name,
                        value: v,
                        weight: 1.0 / components(c).len() as f64,
                    })
                    .collect();
                (c, CategoryScore::from_components(c, subs))
            })
            .collect();
        let composite = aggregate(&categories, &CategoryWeights::default());
        let tier = composite.as_ref().and_then(|c| classify(c.value).ok());
        ScoredAreaRecord {
            area_id: id.to_string(),
            area_sq_mi: 0.5,
            categories,
            composite,
            tier,
            errors: vec![],
        }
    }

    #[test]
    fn test_full_header_order() {
        let header = full_header();
        assert_eq!(&header[..2], &["area_id", "area_sq_mi"]);
        assert_eq!(
            &header[2..9],
            &[
                "crimes_per_sq_mi",
                "violent_per_sq_mi",
                "property_per_sq_mi",
                "total_density_score",
                "violent_density_score",
                "property_density_score",
                "crime_score"
            ]
        );
        assert_eq!(
            &header[header.len() - 3..],
            &["composite_score", "tier", "partial"]
        );
        for category in Category::ALL {
            assert!(header.contains(&category.score_column()));
        }
        for column in ["stops_per_sq_mi", "price_to_income_ratio", "pct_two_or_more"] {
            assert!(header.iter().any(|h| h == column), "{column}");
        }
    }

    #[test]
    fn test_write_scores_rounds_and_leaves_absent_empty() {
        let path = temp_path("livability_rater_test_full.csv");
        let _ = fs::remove_file(&path);

        let records = vec![record("02108", &[(Category::Crime, 7.123_456)]), record("02109", &[])];
        write_scores(&path, &records).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        // crime metrics are empty because the test scores publish none
        assert!(lines[1].starts_with("02108,0.50,,,,7.12,7.12,7.12,7.12,,"));
        assert!(lines[1].ends_with(",,7.12,Good,true"));
        assert!(lines[2].ends_with(",,No Data,true"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_scores_exports_metrics() {
        let path = temp_path("livability_rater_test_metrics.csv");
        let _ = fs::remove_file(&path);

        let mut scored = record("02116", &[(Category::Transit, 6.0), (Category::Lifestyle, 8.0)]);
        let published = [
            (
                Category::Transit,
                vec![
                    Metric::count("total_stops", 42),
                    Metric::number("stops_per_sq_mi", 84.0),
                ],
            ),
            (Category::Lifestyle, vec![Metric::text("nightlife_grade", "B+")]),
        ];
        for (category, list) in published {
            let score = scored.categories.remove(&category).unwrap();
            scored.categories.insert(category, score.with_metrics(list));
        }
        write_scores(&path, &[scored]).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        let row = rdr.records().next().unwrap().unwrap();
        let column = |name: &str| {
            let i = headers.iter().position(|h| h == name).unwrap();
            row[i].to_string()
        };
        assert_eq!(column("area_sq_mi"), "0.50");
        assert_eq!(column("total_stops"), "42");
        assert_eq!(column("stops_per_sq_mi"), "84.00");
        assert_eq!(column("nightlife_grade"), "B+");
        assert_eq!(column("health_grade"), "");
        assert_eq!(column("transit_score"), "6.00");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_data_dictionary_covers_every_column() {
        let dictionary = data_dictionary();
        let columns: Vec<_> = dictionary.iter().map(|(c, _)| c.clone()).collect();
        assert_eq!(columns, full_header());
        assert!(dictionary.iter().all(|(_, d)| !d.is_empty()));

        let path = temp_path("livability_rater_test_dictionary.csv");
        let _ = fs::remove_file(&path);
        write_data_dictionary(&path).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!((&headers[0], &headers[1]), ("column", "description"));
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), columns.len());
        let ratio = rows.iter().find(|r| &r[0] == "rent_to_income_ratio").unwrap();
        assert_eq!(&ratio[1], "Annual median rent over median household income");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_scores_only() {
        let path = temp_path("livability_rater_test_scores.csv");
        let _ = fs::remove_file(&path);

        let all: Vec<_> = Category::ALL.iter().map(|&c| (c, 8.0)).collect();
        write_scores_only(&path, &[record("02116", &all)]).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.len(), 10);
        assert_eq!(&headers[3], "crime_score");

        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "02116");
        assert_eq!(&row[1], "8.00");
        assert_eq!(&row[2], "Excellent");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let records = vec![record("02108", &[(Category::Transit, 5.0)])];
        print_json(&records).unwrap();
    }
}
