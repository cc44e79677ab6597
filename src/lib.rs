pub mod config;
pub mod convert;
pub mod error;
pub mod excel;
pub mod json_export;
pub mod publish;
pub mod utils;

pub use config::Config;
pub use convert::{ConversionSummary, convert};
pub use error::{ConvertError, Stage};
