//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `csv` - encoded CSV for the site register
//! - `shp` - Shapefile format for boundary layers

pub(crate) mod csv;
pub(crate) mod shp;
