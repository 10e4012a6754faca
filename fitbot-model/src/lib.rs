pub mod metrics;
pub mod profile;
