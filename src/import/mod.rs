//! Best-effort importers for CSV exports of the legacy spreadsheets.
//!
//! Rows are processed independently: malformed rows are counted and logged,
//! never fatal to the batch.

pub mod engine_shelf;
pub mod parse;
pub mod requisition;

pub use engine_shelf::{import_engine_shelf, EngineShelfReport};
pub use requisition::{import_requisitions, RequisitionReport};
