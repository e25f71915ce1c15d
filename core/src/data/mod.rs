//! On-disk configuration loading.

pub mod settings;
