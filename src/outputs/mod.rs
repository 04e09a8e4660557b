//! Output generation for the run report and the trend series.
//!
//! # Submodules
//!
//! - [`json`]: Writes the per-keyword sentiment series for chart consumers
//! - [`markdown`]: Renders the run report (articles, scores, trend tables)
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     └── trends.json
//!
//! markdown_output_dir/
//! └── 2025-05-06_143000.md
//! ```

pub mod json;
pub mod markdown;
