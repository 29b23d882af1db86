//! Sectorsplit - Split merged sector report sheets into per-school workbooks.
//!
//! This crate ingests one .xlsx report that interleaves the records of
//! many schools in a single sheet, splits it into one record group per
//! school, validates those schools against an ordered registry, remaps
//! each row onto a fixed target schema and emits one workbook per school
//! plus a combined multi-sheet workbook with signature blocks.
//!
//! # Example
//!
//! ```
//! use sectorsplit_ingest::config;
//!
//! // Reporting periods are year-month labels
//! assert!(config::validate_period_label("2026-07").is_ok());
//! assert!(config::validate_period_label("July 2026").is_err());
//! ```
//!
//! # Architecture
//!
//! The pipeline is organized into several modules, leaf-first:
//!
//! - [`config`]: Limits, sanitizers and period-label validation
//! - [`error`]: Error types and Result alias
//! - [`normalize`]: Header and school-name comparison keys
//! - [`sheet`]: Cell/sheet model and xlsx decoding
//! - [`scan`]: Header-row and school-column detection
//! - [`segment`]: Per-school record grouping
//! - [`registry`]: School registry, signers and registry matching
//! - [`schema`]: Target schema and column remapping
//! - [`assemble`]: Output documents and signature trailers
//! - [`workbook`]: xlsx rendering and run output writing
//! - [`ingest`]: Pipeline orchestration
//! - [`cli`]: Command-line interface

pub mod assemble;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod registry;
pub mod scan;
pub mod schema;
pub mod segment;
pub mod sheet;
pub mod workbook;

// Re-export main entry points
pub use ingest::{ingest, manual_assemble, preview, IngestOutcome, SheetPreview};
pub use workbook::{write_outputs, WrittenRun};

// Re-export commonly used items
pub use error::{IngestError, Result};
pub use registry::{Registry, SignerDirectory};
pub use schema::TargetSchema;
pub use sheet::{CellValue, RawSheet};
