pub mod boundaries;
pub mod incidents;

pub use boundaries::{load_boundaries, read_boundaries};
pub use incidents::{load_incidents, read_incidents, LoadReport};
