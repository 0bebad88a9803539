//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod gaussian_oracle;
pub mod json_report_adapter;
pub mod oracle_factory;
pub mod random_oracle;
