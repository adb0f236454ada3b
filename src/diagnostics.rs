//! Fancy diagnostics support using `ariadne`.
//!
//! This module provides convenient methods to convert the errors and warnings of a chart parse
//! (`ChartError` and `ChartWarningWithLine`) to `ariadne::Report` without modifying their
//! definitions.
//!
//! Since they only carry a 1-based line number, [`SimpleSource::line_span`] maps the line to its
//! character span, and ariadne handles the row/column display from there.
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(feature = "diagnostics")]
//! # {
//! use aff_rs::{aff::parse_aff, diagnostics::emit_chart_warnings};
//!
//! // Parse a chart having an arc out of the sky area
//! let source = "AudioOffset:0\n-\ntiming(0,120)\narc(0,500,0,-0.5,sisi,1,1,0,none,false)\n";
//! let output = parse_aff(source).unwrap();
//!
//! // Output all warnings
//! emit_chart_warnings("test.aff", source, &output.warnings);
//! # }
//! ```

use std::ops::Range;

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
use crate::aff::{ChartError, ChartWarningWithLine};

/// Simple source container that holds the filename and source text.
///
/// # Usage Example
///
/// ```rust
/// use aff_rs::diagnostics::SimpleSource;
///
/// let source_text = "AudioOffset:0\n-\ntiming(0,120)\n";
/// let source = SimpleSource::new("test.aff", source_text);
///
/// assert_eq!(source.text(), source_text);
/// assert_eq!(source.line_span(3), 16..29);
/// ```
pub struct SimpleSource<'a> {
    /// Name of the source file.
    name: &'a str,
    /// Source text content.
    text: &'a str,
}

impl<'a> SimpleSource<'a> {
    /// Create a new source container instance.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Get source text content.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Get source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Character span of the 1-based line `line`, without its line break.
    ///
    /// A line past the end maps to the empty span at the end of the text.
    #[must_use]
    pub fn line_span(&self, line: usize) -> Range<usize> {
        let mut start = 0;
        for (index, raw) in self.text.split_inclusive('\n').enumerate() {
            let length = raw.chars().count();
            if index + 1 == line {
                let content = raw.trim_end_matches(['\n', '\r']).chars().count();
                return start..start + content;
            }
            start += length;
        }
        start..start
    }
}

/// Trait for converting errors with a line number to `ariadne::Report`.
///
/// # Usage Example
///
/// ```rust
/// use aff_rs::{aff::parse_aff, diagnostics::{SimpleSource, ToAriadne}};
/// use ariadne::Source;
///
/// let source_text = "timing(0,120)\n(1,7)\n";
/// let error = parse_aff(source_text).unwrap_err();
///
/// let source = SimpleSource::new("test.aff", source_text);
/// let report = error.to_report(&source);
/// let _ = report.eprint(("test.aff".to_string(), Source::from(source_text)));
/// ```
#[cfg(feature = "diagnostics")]
pub trait ToAriadne {
    /// Convert error to ariadne Report.
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)>;
}

/// Helper to build a styled ariadne `Report` consistently.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn build_report<'a>(
    src: &SimpleSource<'a>,
    kind: ReportKind<'a>,
    range: Range<usize>,
    title: &str,
    label_message: impl ToString,
    color: Color,
) -> Report<'a, (String, Range<usize>)> {
    let filename = src.name().to_string();
    Report::build(kind, (filename.clone(), range.clone()))
        .with_message(title)
        .with_label(
            Label::new((filename, range))
                .with_message(label_message.to_string())
                .with_color(color),
        )
        .finish()
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for ChartWarningWithLine {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        build_report(
            src,
            ReportKind::Warning,
            src.line_span(self.line()),
            &format!("chart: {}", self.content()),
            format!("in timing group {}", self.group()),
            Color::Blue,
        )
    }
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for ChartError {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        let label = match self {
            Self::Line { group, source, .. } => format!("{source} (timing group {group})"),
            Self::Split(source) => source.to_string(),
        };
        build_report(
            src,
            ReportKind::Error,
            src.line_span(self.line()),
            "chart: parse failed",
            label,
            Color::Red,
        )
    }
}

/// Convenience method: batch render chart warnings to stderr.
///
/// # Parameters
/// * `name` - Name of the source file, used for display in diagnostic information
/// * `source` - Complete chart source text
/// * `warnings` - List of warnings to display
#[cfg(feature = "diagnostics")]
pub fn emit_chart_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a ChartWarningWithLine>,
) {
    let simple = SimpleSource::new(name, source);
    let ariadne_source = Source::from(source);
    for w in warnings {
        let report = w.to_report(&simple);
        let _ = report.eprint((name.to_string(), ariadne_source.clone()));
    }
}

/// Render a chart error to stderr.
#[cfg(feature = "diagnostics")]
pub fn emit_chart_error(name: &str, source: &str, error: &ChartError) {
    let report = error.to_report(&SimpleSource::new(name, source));
    let _ = report.eprint((name.to_string(), Source::from(source)));
}

/// Collect `ariadne::Report` instances for chart warnings without printing.
///
/// This is useful in tests to verify diagnostics can be generated while keeping test output clean.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn collect_chart_reports<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a ChartWarningWithLine>,
) -> Vec<Report<'a, (String, Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    warnings.into_iter().map(|w| w.to_report(&simple)).collect()
}
