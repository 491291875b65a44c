//! Core module - configuration, error types, and the content data model

mod config;
mod error;
mod types;

pub use config::{ApiConfig, Config, GeneralConfig, TranslateConfig};
pub use error::{Error, Result};
pub use types::{BilingualMap, BilingualText, FieldValue, Lang, ListItem, Record, RecordSchema};
