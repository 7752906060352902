use crate::config::SessionConfig;
use anyhow::Context;
use crimecore::calendar::DateInterval;
use crimecore::ingest;
use crimecore::series::DailySeries;
use serde::Serialize;

/// Headless audit of one dataset: series shape plus the skipped-row counts
/// the interactive view also surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary {
    pub window_start: String,
    pub window_end: String,
    pub days: usize,
    pub incidents: usize,
    pub outside_window: usize,
    pub invalid_dates: usize,
    pub missing_coordinates: usize,
    pub max_daily_count: usize,
    pub peak_day: Option<String>,
    pub empty_days: usize,
    pub boroughs: Vec<String>,
}

pub struct Auditor {
    config: SessionConfig,
}

impl Auditor {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<(DailySeries, SeriesSummary)> {
        let window = self.config.window()?;
        let (incidents, report) = ingest::load_incidents(&self.config.incidents)
            .with_context(|| format!("loading incidents {}", self.config.incidents.display()))?;
        let series = DailySeries::build(incidents, window);

        let boroughs = match &self.config.boundaries {
            Some(path) => ingest::load_boundaries(path)
                .with_context(|| format!("loading boundaries {}", path.display()))?
                .into_iter()
                .map(|borough| borough.name)
                .collect(),
            None => Vec::new(),
        };

        let counts = series.daily_counts();
        let peak_day = counts
            .iter()
            .max_by_key(|count| count.count)
            .filter(|count| count.count > 0)
            .map(|count| count.day.format_mdy());
        let empty_days = counts.iter().filter(|count| count.count == 0).count();

        let summary = SeriesSummary {
            window_start: window.start().format_mdy(),
            window_end: window.end().format_mdy(),
            days: series.buckets().len(),
            incidents: series.total_incidents(),
            outside_window: series.outside_window(),
            invalid_dates: report.invalid_dates,
            missing_coordinates: report.missing_coordinates,
            max_daily_count: series.max_daily_count(),
            peak_day,
            empty_days,
            boroughs,
        };

        Ok((series, summary))
    }
}

/// Count of incidents inside an interval, for the `--from/--to` probe.
pub fn probe_interval(series: &DailySeries, interval: DateInterval) -> usize {
    series.incidents_in(interval).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crimecore::calendar::DayKey;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn sample_csv() -> NamedTempFile {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"RPT_DT,Longitude,Latitude\n\
              01/01/2010,-73.9,40.7\n\
              01/01/2010,,\n\
              01/03/2010,-73.8,40.6\n\
              bogus,-73.8,40.6\n\
              06/15/2017,-73.8,40.6\n",
        )
        .unwrap();
        temp
    }

    fn sample_config(csv_path: PathBuf) -> SessionConfig {
        SessionConfig {
            incidents: csv_path,
            boundaries: None,
            window_start: Some("01/01/2010".to_string()),
            window_end: Some("01/05/2010".to_string()),
        }
    }

    #[test]
    fn auditor_reports_series_shape_and_skip_counts() {
        let temp = sample_csv();
        let auditor = Auditor::new(sample_config(temp.path().to_path_buf()));
        let (series, summary) = auditor.execute().unwrap();

        assert_eq!(summary.days, 5);
        assert_eq!(summary.incidents, 3);
        assert_eq!(summary.outside_window, 1);
        assert_eq!(summary.invalid_dates, 1);
        assert_eq!(summary.missing_coordinates, 1);
        assert_eq!(summary.max_daily_count, 2);
        assert_eq!(summary.peak_day.as_deref(), Some("01/01/2010"));
        assert_eq!(summary.empty_days, 3);

        let single = DateInterval::single_day(DayKey::from_ymd(2010, 1, 3).unwrap());
        assert_eq!(probe_interval(&series, single), 1);
    }
}
