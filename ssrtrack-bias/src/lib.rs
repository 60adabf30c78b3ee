//! ssrtrack-bias: ACIS bias interval planning on top of recorder pointer correlation.
//!
//! # Key Components
//!
//! - [`ConcernPolicy`] - Classification thresholds and per-class window definitions
//! - [`attribute_bias_intervals`] - Catalog events to labelled, classified intervals
//! - [`ConcernDeriver`] - Intervals to concern windows with recorder addresses
//! - [`Timeline`] - Time-ordered rows with playback status
//! - [`TrackerConfig`] - JSON configuration for the recorder and policy
//!
//! # Pipeline
//!
//! 1. Load the catalog and attribute each bias packet to the next observation
//! 2. Drop intervals past the stale horizon and derive concern windows
//! 3. Merge with the playback pointer and bad codewords into a timeline

pub mod catalog;
pub mod config;
pub mod error;
pub mod interval;
pub mod policy;
pub mod timeline;
pub mod window;

pub use catalog::{
    attribute_bias_intervals, catalog_from_json, load_catalog, parse_catalog_duration,
    CatalogEvent, EventKind, UNATTRIBUTED_LABEL,
};
pub use config::TrackerConfig;
pub use error::{Error, Result};
pub use interval::Interval;
pub use policy::{Anchor, Classification, ConcernPolicy, WindowBound, WindowSpec};
pub use ssrtrack_core::BadCodeword;
pub use timeline::{EntryKind, EntryStatus, Timeline, TimelineEntry};
pub use window::{BiasRange, ConcernDeriver, ConcernWindow};
