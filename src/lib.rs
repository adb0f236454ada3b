//! The Arcaea chart (.aff) format parser and scroll position engine.
//!
//! # Usage
//!
//! - Call [`aff::parse_aff`] with the chart source text to get an [`aff::ChartOutput`], which
//!   holds the parsed [`aff::model::Chart`] and the warnings found on the way.
//! - Use [`aff::parse_aff_lines_with_sink`] instead when the lines are already split by a loader,
//!   or when the audio offset should be handed to a settings store.
//! - Query where a note is at any time with [`chart_process::ScrollPositionEngine`], against the
//!   timeline of the timing group the note belongs to.
//! - Render the warnings and errors with `ariadne` through [`diagnostics`] (needs the
//!   `diagnostics` feature, enabled by default).
//!
//! # Example
//!
//! ```
//! use aff_rs::{
//!     aff::{ChartOutput, parse_aff},
//!     chart_process::{ScrollPosition, ScrollPositionEngine},
//! };
//!
//! let source = "AudioOffset:0\n-\ntiming(0,120)\n(2,1)\n";
//! let ChartOutput { chart, .. } = parse_aff(source)?;
//! let engine = ScrollPositionEngine::default();
//!
//! // two seconds at 120 BPM is four beats
//! let group = &chart.groups[0];
//! let Some(Ok(ScrollPosition::Approaching(beats))) = group.position_of(&engine, 0, 0.0) else {
//!     panic!("the tap is ahead");
//! };
//! assert!((beats - 4.0).abs() < 1e-9);
//! # Ok::<(), aff_rs::aff::ChartError>(())
//! ```
//!
//! # Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for the model, warnings and errors.
//! - `diagnostics`: reports with `ariadne`. Enabled by default.

pub mod aff;
pub mod chart_process;
pub mod diagnostics;
