use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// Fixed 6-color visual encoding: boroughs by feature order, bars by
/// `BAR_PALETTE_INDEX`. RGB triples.
pub const PALETTE: [[u8; 3]; 6] = [
    [0x8c, 0x5b, 0x79],
    [0x77, 0x7d, 0xa3],
    [0x49, 0xa1, 0xb4],
    [0x41, 0xbf, 0xa4],
    [0x88, 0xd5, 0x7f],
    [0xe2, 0xe0, 0x62],
];

pub const BAR_PALETTE_INDEX: usize = 2;

/// Latitudes at or beyond this have no finite Mercator image.
const MAX_MERCATOR_LAT: f64 = 85.06;

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Borough boundary: a display name plus one or more closed rings.
#[derive(Debug, Clone)]
pub struct Borough {
    pub name: String,
    pub rings: Vec<Vec<GeoPoint>>,
}

/// Spherical Mercator projection with explicit scale, center, and translate.
///
/// Mirrors the usual web-map parameterization: the center coordinate lands
/// on the translate point, and one radian of longitude spans `scale` pixels.
#[derive(Debug, Clone, Copy)]
pub struct MercatorProjection {
    scale: f64,
    center: GeoPoint,
    translate: (f64, f64),
}

impl MercatorProjection {
    pub fn new(scale: f64, center: GeoPoint, translate: (f64, f64)) -> Self {
        Self {
            scale,
            center,
            translate,
        }
    }

    /// The NYC map view: scale 50 000, centered on (-73.94, 40.70),
    /// translated to the middle of the canvas.
    pub fn nyc(width: f64, height: f64) -> Self {
        Self::new(
            50_000.0,
            GeoPoint {
                lon: -73.94,
                lat: 40.70,
            },
            (width / 2.0, height / 2.0),
        )
    }

    /// Projects a coordinate to canvas pixels.
    ///
    /// Non-finite or pole-adjacent coordinates yield `None`; callers skip
    /// such points instead of erroring.
    pub fn project(&self, point: GeoPoint) -> Option<(f32, f32)> {
        if !point.lon.is_finite() || !point.lat.is_finite() {
            return None;
        }
        if point.lat.abs() >= MAX_MERCATOR_LAT {
            return None;
        }

        let x = self.translate.0 + self.scale * (point.lon.to_radians() - self.center.lon.to_radians());
        let y = self.translate.1 + self.scale * (mercator_y(self.center.lat) - mercator_y(point.lat));
        Some((x as f32, y as f32))
    }
}

fn mercator_y(lat_degrees: f64) -> f64 {
    (FRAC_PI_4 + lat_degrees.to_radians() / 2.0).tan().ln()
}
