//! Prelude module for the chart parser.
//!
//! This module re-exports all public types of the `aff` module for convenient access.
//! You can use `use aff_rs::aff::prelude::*;` to import them at once.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{ToAriadne, emit_chart_error, emit_chart_warnings};
pub use crate::{
    chart_process::scroll::{ScrollConfig, ScrollPosition, ScrollPositionEngine, TraceSample},
    diagnostics::SimpleSource,
};

pub use super::{
    ChartError, ChartOutput, ChartWarning, ChartWarningWithLine, OffsetSink,
    line::{ChartLine, Field, LineError},
    mixin::{SourceLineMixin, SourceLineMixinExt},
    model::{Chart, TimingGroup},
    note::{
        Arc, ArcColor, ArcEasing, ArcPoint, Axis, EasingCurve, Hold, Lane, Note, NoteError,
        NoteKind, NoteWarning, SkyNote, Tap,
    },
    parse_aff, parse_aff_lines, parse_aff_lines_with_sink,
    split::{GroupSpan, SplitError, SplitOutput, split_timing_groups},
    timeline::{BpmTimeline, TempoAnchor, TimelineError},
};
