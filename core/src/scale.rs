use crate::calendar::{DateInterval, DayKey};

/// Linear calendar-day to pixel mapping over the analysis window.
///
/// The domain is measured in whole-day offsets from the window start; the
/// window start maps to `px_start` and the window end to `px_end`, matching
/// a time scale whose domain endpoints are the window bounds.
#[derive(Debug, Clone, Copy)]
pub struct TimeScale {
    window: DateInterval,
    px_start: f32,
    px_end: f32,
}

impl TimeScale {
    pub fn new(window: DateInterval, px_start: f32, px_end: f32) -> Self {
        Self {
            window,
            px_start,
            px_end,
        }
    }

    pub fn window(&self) -> DateInterval {
        self.window
    }

    /// Day offset of the window end; the domain is `[0, span]`.
    fn span(&self) -> f32 {
        (self.window.len_days().saturating_sub(1)).max(1) as f32
    }

    fn x_of_offset(&self, offset: f32) -> f32 {
        let clamped = offset.clamp(0.0, self.span());
        self.px_start + (clamped / self.span()) * (self.px_end - self.px_start)
    }

    pub fn position(&self, day: DayKey) -> f32 {
        self.x_of_offset(day.offset_from(self.window.start()) as f32)
    }

    /// Inverts a pixel position to a fractional day offset from the window
    /// start, clamped to the domain.
    pub fn invert(&self, x: f32) -> f32 {
        let width = self.px_end - self.px_start;
        if width == 0.0 {
            return 0.0;
        }
        (((x - self.px_start) / width) * self.span()).clamp(0.0, self.span())
    }

    /// Turns a raw pixel selection into a whole-day interval plus the pixel
    /// span the visual selector should snap back to.
    ///
    /// Both inverted endpoints are rounded to the nearest whole day. A
    /// selection that rounds to zero or negative width collapses to exactly
    /// one day starting at the floor of the un-rounded start. The snapped
    /// pixel span covers the full extent of the selected days, so handles
    /// land on day boundaries.
    pub fn brush_interval(&self, x0: f32, x1: f32) -> (DateInterval, (f32, f32)) {
        let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let raw_start = self.invert(lo);
        let raw_end = self.invert(hi);

        let mut start = raw_start.round();
        let mut end = raw_end.round();
        if end <= start {
            start = raw_start.floor();
            end = start;
        }
        start = start.clamp(0.0, self.span());
        end = end.clamp(0.0, self.span());

        let window_start = self.window.start();
        let first = window_start
            .add_days(start as i64)
            .unwrap_or(window_start);
        let last = window_start
            .add_days(end as i64)
            .unwrap_or(window_start);

        let snapped = (self.x_of_offset(start), self.x_of_offset(end + 1.0));
        (DateInterval::new(first, last), snapped)
    }

    /// January firsts inside the window, used as x-axis tick positions.
    pub fn year_ticks(&self) -> Vec<DayKey> {
        let window = self.window;
        (window.start().year()..=window.end().year())
            .filter_map(|year| DayKey::from_ymd(year, 1, 1))
            .filter(|day| window.contains(*day))
            .collect()
    }
}

/// Linear count to pixel mapping pinned to the full-series maximum.
///
/// `px_zero` is the baseline (bottom of the plot) and `px_max` the position
/// of the maximum count; never recomputed on interval changes.
#[derive(Debug, Clone, Copy)]
pub struct CountScale {
    max_count: usize,
    px_zero: f32,
    px_max: f32,
}

impl CountScale {
    pub fn new(max_count: usize, px_zero: f32, px_max: f32) -> Self {
        Self {
            max_count,
            px_zero,
            px_max,
        }
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn position(&self, count: usize) -> f32 {
        if self.max_count == 0 {
            return self.px_zero;
        }
        let fraction = (count.min(self.max_count) as f32) / (self.max_count as f32);
        self.px_zero + fraction * (self.px_max - self.px_zero)
    }

    /// Round-valued tick counts, aiming for roughly `target` of them.
    pub fn ticks(&self, target: usize) -> Vec<usize> {
        if self.max_count == 0 || target == 0 {
            return vec![0];
        }
        let raw_step = (self.max_count as f64 / target as f64).max(1.0);
        let magnitude = 10f64.powf(raw_step.log10().floor());
        let residual = raw_step / magnitude;
        let nice = if residual >= 50f64.sqrt() {
            10.0
        } else if residual >= 10f64.sqrt() {
            5.0
        } else if residual >= 2f64.sqrt() {
            2.0
        } else {
            1.0
        };
        let step = ((nice * magnitude) as usize).max(1);
        (0..=self.max_count).step_by(step).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DayKey {
        DayKey::from_ymd(y, m, d).unwrap()
    }

    fn ten_day_scale() -> TimeScale {
        // 2006-01-01..2006-01-11: span of 10 days over 100 pixels.
        let window = DateInterval::new(day(2006, 1, 1), day(2006, 1, 11));
        TimeScale::new(window, 0.0, 100.0)
    }

    #[test]
    fn position_and_invert_round_trip() {
        let scale = ten_day_scale();
        assert_eq!(scale.position(day(2006, 1, 1)), 0.0);
        assert_eq!(scale.position(day(2006, 1, 11)), 100.0);
        assert_eq!(scale.position(day(2006, 1, 6)), 50.0);
        assert!((scale.invert(50.0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn brush_rounds_to_whole_days() {
        let scale = ten_day_scale();
        // 12px -> 1.2 days, 38px -> 3.8 days: rounds to days 1..4.
        let (interval, snapped) = scale.brush_interval(12.0, 38.0);
        assert_eq!(interval.start(), day(2006, 1, 2));
        assert_eq!(interval.end(), day(2006, 1, 5));
        assert!((snapped.0 - 10.0).abs() < 1e-4);
        assert!((snapped.1 - 50.0).abs() < 1e-4);
    }

    #[test]
    fn collapsed_brush_widens_to_one_day_at_floor_of_start() {
        let scale = ten_day_scale();
        // 26px..28px inverts to 2.6..2.8, both round to day 3 (zero width);
        // the corrected interval is the single day at floor(2.6) = day 2.
        let (interval, snapped) = scale.brush_interval(26.0, 28.0);
        assert_eq!(interval.start(), day(2006, 1, 3));
        assert_eq!(interval.end(), day(2006, 1, 3));
        assert_eq!(interval.len_days(), 1);
        assert!((snapped.0 - 20.0).abs() < 1e-4);
        assert!((snapped.1 - 30.0).abs() < 1e-4);
    }

    #[test]
    fn brush_accepts_reversed_pixel_order() {
        let scale = ten_day_scale();
        let (forward, _) = scale.brush_interval(12.0, 38.0);
        let (reversed, _) = scale.brush_interval(38.0, 12.0);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn brush_clamps_to_window_edges() {
        let scale = ten_day_scale();
        let (interval, snapped) = scale.brush_interval(-40.0, 400.0);
        assert_eq!(interval, scale.window());
        assert!((snapped.0 - 0.0).abs() < 1e-4);
        assert!((snapped.1 - 100.0).abs() < 1e-4);
    }

    #[test]
    fn count_scale_is_linear_and_pinned() {
        let scale = CountScale::new(20, 180.0, 40.0);
        assert_eq!(scale.position(0), 180.0);
        assert_eq!(scale.position(20), 40.0);
        assert_eq!(scale.position(10), 110.0);
        // Counts beyond the pinned maximum saturate instead of overshooting.
        assert_eq!(scale.position(40), 40.0);
    }

    #[test]
    fn count_ticks_are_round_valued() {
        let scale = CountScale::new(23, 180.0, 40.0);
        let ticks = scale.ticks(10);
        assert_eq!(ticks.first(), Some(&0));
        assert!(ticks.windows(2).all(|pair| pair[1] - pair[0] == 2));
        assert!(*ticks.last().unwrap() <= 23);
    }
}
