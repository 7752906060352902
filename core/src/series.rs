use crate::calendar::{DateInterval, DayKey};
use crate::geo::GeoPoint;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw crime record: a report day plus (possibly missing) coordinates.
///
/// Incidents whose coordinate columns were empty or non-numeric keep a
/// `None` location; they still count toward the histogram but draw no point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub reported_on: DayKey,
    pub location: Option<GeoPoint>,
}

/// All incidents reported on one calendar day; empty days keep an empty list.
#[derive(Debug, Clone)]
pub struct DayBucket {
    pub day: DayKey,
    pub incidents: Vec<Incident>,
}

/// Derived per-day count; recomputed whenever bars are drawn, never stored.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DailyCount {
    pub day: DayKey,
    pub count: usize,
}

/// Complete, gap-free ordered sequence of day buckets over a fixed window.
///
/// Built once at load time and read-only afterwards; repeated interval
/// filters index into the prebuilt buckets instead of rescanning raw rows.
#[derive(Debug, Clone)]
pub struct DailySeries {
    window: DateInterval,
    buckets: Vec<DayBucket>,
    outside_window: usize,
}

impl DailySeries {
    /// Groups incidents by report day, then enumerates the window day by day
    /// in ascending order, synthesizing an empty bucket for absent days.
    ///
    /// Grouping alone guarantees neither calendar order nor coverage of
    /// empty days, so the enumeration pass is what establishes the
    /// one-bucket-per-window-day invariant. Incidents outside the window are
    /// unreachable by the enumeration; they are dropped from the series but
    /// counted rather than silently discarded.
    pub fn build(incidents: Vec<Incident>, window: DateInterval) -> Self {
        let mut groups: HashMap<DayKey, Vec<Incident>> = HashMap::new();
        for incident in incidents {
            groups.entry(incident.reported_on).or_default().push(incident);
        }

        let mut buckets = Vec::with_capacity(window.len_days());
        for day in window.days() {
            let incidents = groups.remove(&day).unwrap_or_default();
            buckets.push(DayBucket { day, incidents });
        }

        let outside_window: usize = groups.values().map(Vec::len).sum();
        if outside_window > 0 {
            warn!(
                "{} incidents fall outside the analysis window {} and were dropped",
                outside_window, window
            );
        }

        Self {
            window,
            buckets,
            outside_window,
        }
    }

    pub fn window(&self) -> DateInterval {
        self.window
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn bucket_for(&self, day: DayKey) -> Option<&DayBucket> {
        if !self.window.contains(day) {
            return None;
        }
        let index = day.offset_from(self.window.start()) as usize;
        self.buckets.get(index)
    }

    /// Incidents dropped because their report day misses the window.
    pub fn outside_window(&self) -> usize {
        self.outside_window
    }

    pub fn total_incidents(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.incidents.len()).sum()
    }

    pub fn daily_counts(&self) -> Vec<DailyCount> {
        self.buckets
            .iter()
            .map(|bucket| DailyCount {
                day: bucket.day,
                count: bucket.incidents.len(),
            })
            .collect()
    }

    /// Maximum single-day count across the whole series. The count axis is
    /// pinned to this value so bar heights stay comparable across filters.
    pub fn max_daily_count(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.incidents.len())
            .max()
            .unwrap_or(0)
    }

    /// Collects the incidents of every bucket whose day falls inside the
    /// closed interval, in calendar order.
    ///
    /// Filters against the prebuilt series, so it inherits the window limits
    /// of the build step; the requested interval is clamped to the window.
    pub fn incidents_in(&self, interval: DateInterval) -> Vec<&Incident> {
        let Some(clamped) = self.window.intersect(interval) else {
            return Vec::new();
        };
        let first = clamped.start().offset_from(self.window.start()) as usize;
        let last = clamped.end().offset_from(self.window.start()) as usize;
        self.buckets[first..=last]
            .iter()
            .flat_map(|bucket| bucket.incidents.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DayKey {
        DayKey::from_ymd(y, m, d).unwrap()
    }

    fn incident(y: i32, m: u32, d: u32) -> Incident {
        Incident {
            reported_on: day(y, m, d),
            location: Some(GeoPoint {
                lon: -73.9,
                lat: 40.7,
            }),
        }
    }

    fn three_day_window() -> DateInterval {
        DateInterval::new(day(2006, 1, 1), day(2006, 1, 3))
    }

    #[test]
    fn build_fills_gaps_with_empty_buckets() {
        let series = DailySeries::build(
            vec![incident(2006, 1, 1), incident(2006, 1, 3)],
            three_day_window(),
        );
        let counts: Vec<(String, usize)> = series
            .daily_counts()
            .iter()
            .map(|c| (c.day.format_mdy(), c.count))
            .collect();
        assert_eq!(
            counts,
            [
                ("01/01/2006".to_string(), 1),
                ("01/02/2006".to_string(), 0),
                ("01/03/2006".to_string(), 1),
            ]
        );
    }

    #[test]
    fn build_covers_full_analysis_window() {
        let series = DailySeries::build(Vec::new(), DateInterval::analysis_window());
        assert_eq!(series.buckets().len(), 4018);
        assert_eq!(series.max_daily_count(), 0);
    }

    #[test]
    fn every_in_window_incident_lands_in_its_day_bucket() {
        let series = DailySeries::build(
            vec![
                incident(2006, 1, 2),
                incident(2006, 1, 2),
                incident(2006, 1, 3),
            ],
            three_day_window(),
        );
        assert_eq!(series.bucket_for(day(2006, 1, 2)).unwrap().incidents.len(), 2);
        assert_eq!(series.bucket_for(day(2006, 1, 3)).unwrap().incidents.len(), 1);
        assert_eq!(series.total_incidents(), 3);
    }

    #[test]
    fn full_window_filter_is_identity_over_incident_set() {
        let series = DailySeries::build(
            vec![incident(2006, 1, 1), incident(2006, 1, 3)],
            three_day_window(),
        );
        let filtered = series.incidents_in(series.window());
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn single_day_filter_returns_exactly_that_day() {
        let series = DailySeries::build(
            vec![incident(2006, 1, 1), incident(2006, 1, 3)],
            three_day_window(),
        );
        let empty_day = series.incidents_in(DateInterval::single_day(day(2006, 1, 2)));
        assert!(empty_day.is_empty());
        let first_day = series.incidents_in(DateInterval::single_day(day(2006, 1, 1)));
        assert_eq!(first_day.len(), 1);
        assert_eq!(first_day[0].reported_on, day(2006, 1, 1));
    }

    #[test]
    fn out_of_window_incidents_are_dropped_and_counted() {
        let series = DailySeries::build(
            vec![incident(2005, 12, 31), incident(2006, 1, 1)],
            three_day_window(),
        );
        assert_eq!(series.total_incidents(), 1);
        assert_eq!(series.outside_window(), 1);
    }

    #[test]
    fn filter_clamps_interval_to_window() {
        let series = DailySeries::build(vec![incident(2006, 1, 1)], three_day_window());
        let wide = DateInterval::new(day(2005, 6, 1), day(2007, 6, 1));
        assert_eq!(series.incidents_in(wide).len(), 1);
        let disjoint = DateInterval::new(day(2009, 1, 1), day(2009, 1, 5));
        assert!(series.incidents_in(disjoint).is_empty());
    }
}
