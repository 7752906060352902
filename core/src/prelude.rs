/// Common error type for dataset ingestion and series construction.
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed geojson: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("invalid calendar date: {0:?}")]
    InvalidDate(String),
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),
}

pub type DataResult<T> = Result<T, DataError>;

pub use crate::calendar::{DateInterval, DayKey};
pub use crate::geo::{Borough, GeoPoint, MercatorProjection};
pub use crate::ingest::LoadReport;
pub use crate::scale::{CountScale, TimeScale};
pub use crate::series::{DailyCount, DailySeries, DayBucket, Incident};
