use crate::calendar::DayKey;
use crate::geo::GeoPoint;
use crate::prelude::{DataError, DataResult};
use crate::series::Incident;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub const REPORT_DATE_COLUMN: &str = "RPT_DT";
pub const LONGITUDE_COLUMN: &str = "Longitude";
pub const LATITUDE_COLUMN: &str = "Latitude";

/// Per-load accounting of rows that could not be used as-is.
///
/// Rows with unparseable dates are dropped entirely; rows with unusable
/// coordinates survive without a location. Both are counted so the UI and
/// the inspector can report them instead of discarding input silently.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows: usize,
    pub invalid_dates: usize,
    pub missing_coordinates: usize,
}

impl LoadReport {
    pub fn clean(&self) -> bool {
        self.invalid_dates == 0 && self.missing_coordinates == 0
    }
}

/// Reads the incident table from CSV.
///
/// Requires the `RPT_DT` (MM/DD/YYYY), `Longitude`, and `Latitude` columns;
/// a missing column is a hard error, bad cell values are counted per row.
pub fn read_incidents<R: Read>(reader: R) -> DataResult<(Vec<Incident>, LoadReport)> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let date_column = column_index(&headers, REPORT_DATE_COLUMN)?;
    let lon_column = column_index(&headers, LONGITUDE_COLUMN)?;
    let lat_column = column_index(&headers, LATITUDE_COLUMN)?;

    let mut incidents = Vec::new();
    let mut report = LoadReport::default();

    for row in csv_reader.records() {
        let row = row?;
        report.rows += 1;

        let date_text = row.get(date_column).unwrap_or("");
        let reported_on = match DayKey::parse_mdy(date_text) {
            Ok(day) => day,
            Err(_) => {
                report.invalid_dates += 1;
                continue;
            }
        };

        let location = parse_location(row.get(lon_column), row.get(lat_column));
        if location.is_none() {
            report.missing_coordinates += 1;
        }

        incidents.push(Incident {
            reported_on,
            location,
        });
    }

    if !report.clean() {
        warn!(
            "incident load skipped {} dates and {} coordinates out of {} rows",
            report.invalid_dates, report.missing_coordinates, report.rows
        );
    }
    info!(
        "loaded {} incidents from {} csv rows",
        incidents.len(),
        report.rows
    );

    Ok((incidents, report))
}

pub fn load_incidents<P: AsRef<Path>>(path: P) -> DataResult<(Vec<Incident>, LoadReport)> {
    let file = File::open(path)?;
    read_incidents(BufReader::new(file))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> DataResult<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))
}

fn parse_location(lon: Option<&str>, lat: Option<&str>) -> Option<GeoPoint> {
    let lon: f64 = lon?.trim().parse().ok()?;
    let lat: f64 = lat?.trim().parse().ok()?;
    if lon.is_finite() && lat.is_finite() {
        Some(GeoPoint { lon, lat })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "RPT_DT,Longitude,Latitude\n";

    #[test]
    fn reads_rows_with_dates_and_coordinates() {
        let csv = format!("{HEADER}01/01/2006,-73.9,40.7\n01/03/2006,-73.8,40.6\n");
        let (incidents, report) = read_incidents(csv.as_bytes()).unwrap();
        assert_eq!(incidents.len(), 2);
        assert_eq!(report.rows, 2);
        assert!(report.clean());
        assert_eq!(incidents[0].reported_on.format_mdy(), "01/01/2006");
        assert_eq!(
            incidents[1].location,
            Some(GeoPoint {
                lon: -73.8,
                lat: 40.6,
            })
        );
    }

    #[test]
    fn invalid_dates_are_dropped_and_counted() {
        let csv = format!("{HEADER}not-a-date,-73.9,40.7\n01/02/2006,-73.9,40.7\n");
        let (incidents, report) = read_incidents(csv.as_bytes()).unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(report.invalid_dates, 1);
    }

    #[test]
    fn missing_coordinates_keep_the_incident_without_location() {
        let csv = format!("{HEADER}01/02/2006,,\n01/02/2006,abc,40.7\n");
        let (incidents, report) = read_incidents(csv.as_bytes()).unwrap();
        assert_eq!(incidents.len(), 2);
        assert_eq!(report.missing_coordinates, 2);
        assert!(incidents.iter().all(|incident| incident.location.is_none()));
    }

    #[test]
    fn missing_required_column_is_a_hard_error() {
        let csv = "RPT_DT,Longitude\n01/02/2006,-73.9\n";
        let error = read_incidents(csv.as_bytes()).unwrap_err();
        assert!(matches!(error, DataError::MissingColumn(name) if name == LATITUDE_COLUMN));
    }
}
