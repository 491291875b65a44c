//! ContentDesk library
//!
//! Bilingual (ES/EN) content management core: record ordering and
//! archival, bilingual field editing with legacy migration,
//! auto-translation orchestration, and persistence against the
//! file-backed content API with a local write-ahead cache.

pub mod bilingual;
pub mod core;
pub mod db;
pub mod i18n;
pub mod order;
pub mod store;
pub mod translate;
