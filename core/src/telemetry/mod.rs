pub mod metrics;

pub use metrics::{LoadMetrics, LoadSnapshot};
