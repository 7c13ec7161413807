pub mod client;
pub mod flux;
pub mod shape;

pub use client::{FluxRow, InfluxClient, InfluxConfig, InfluxError};
pub use flux::HistoryRange;
