//! The parser module of the Arcaea chart format (.aff).
//!
//! Parsing consists of two phases: splitting and assembling.
//!
//! `split` module delimits the line ranges of each timing group, and collects the audio offset and
//! the other headers from the header section at the top. It never looks into the content lines.
//!
//! `line` module parses each content line into a tempo anchor or a note, which are defined in
//! `timeline` and `note` modules. The assembler feeds them into the [`model::TimingGroup`] the
//! line belongs to.
//!
//! In detail, our policies are:
//!
//! - Support only UTF-8 (as required `&str` to input).
//! - Every error aborts the whole parse. No partial chart is returned.
//! - Suspicious but readable input, such as sky coordinates outside `[0, 1]`, is kept as written
//!   and reported as a warning.
//! - Tempo anchors are trusted in declaration order and never sorted.

pub mod line;
pub mod mixin;
pub mod model;
pub mod note;
pub mod prelude;
pub mod split;
pub mod timeline;

use thiserror::Error;

use self::{
    line::{ChartLine, LineError},
    mixin::{SourceLineMixin, SourceLineMixinExt},
    model::{Chart, TimingGroup},
    note::NoteWarning,
    split::{LineKind, SplitError, SplitOutput, split_timing_groups},
};

/// An error occurred when parsing a chart. Any of them aborts the parse.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartError {
    /// The timing groups could not be delimited.
    #[error("split: {0}")]
    Split(#[from] SplitError),
    /// A content line could not be parsed.
    #[error("{source} at line {line} (timing group {group})")]
    Line {
        /// The timing group the line belongs to.
        group: usize,
        /// The 1-based line number.
        line: usize,
        /// What was wrong with the line.
        source: LineError,
    },
}

impl ChartError {
    /// The 1-based line number the error points at.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Split(
                SplitError::UnclosedGroup { line, .. }
                | SplitError::UnmatchedClose { line }
                | SplitError::InvalidOffset { line, .. },
            ) => *line,
            Self::Split(SplitError::DanglingGroup { open_line }) => *open_line,
            Self::Line { line, .. } => *line,
        }
    }
}

/// A non-fatal issue found when parsing a chart.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartWarning {
    /// A note has a suspicious field.
    #[error(transparent)]
    Note(#[from] NoteWarning),
    /// A tempo anchor is not strictly after the previous one. It is kept in declaration order.
    #[error("tempo anchor at {time} is not after the previous anchor at {previous}")]
    UnorderedTempoAnchor {
        /// The time of the previous anchor.
        previous: f64,
        /// The time of the anchor.
        time: f64,
    },
    /// The audio offset was declared again, and the last one is used.
    #[error("audio offset is declared again as {value}, overriding {previous}")]
    DuplicateOffset {
        /// The overridden value.
        previous: i64,
        /// The new value.
        value: i64,
    },
}

/// A [`ChartWarning`] with the line it was found on.
pub type ChartWarningWithLine = SourceLineMixin<ChartWarning>;

/// Output of parsing a chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartOutput {
    /// The parsed chart.
    pub chart: Chart,
    /// Warnings that occurred during parsing, in line order.
    pub warnings: Vec<ChartWarningWithLine>,
}

/// Receiver of the audio offset of a parsed chart, such as a settings store.
pub trait OffsetSink {
    /// Stores the offset in milliseconds. Called once per successful parse.
    fn store_offset(&mut self, offset: i64);
}

impl<F: FnMut(i64)> OffsetSink for F {
    fn store_offset(&mut self, offset: i64) {
        self(offset);
    }
}

/// Parse a chart from source text.
///
/// # Example
///
/// ```
/// use aff_rs::aff::{ChartOutput, parse_aff};
///
/// let source = "AudioOffset:1500\n-\ntiming(0,120.00,4.00);\n(1000,1);\nhold(2000,3000,4);";
/// let ChartOutput { chart, warnings } = parse_aff(source)?;
/// assert_eq!(chart.offset, 1500);
/// assert_eq!(chart.groups.len(), 1);
/// assert_eq!(chart.groups[0].notes().len(), 2);
/// assert!(warnings.is_empty());
/// # Ok::<(), aff_rs::aff::ChartError>(())
/// ```
///
/// # Errors
///
/// Returns [`ChartError`] if the timing groups are malformed or any content line is invalid.
pub fn parse_aff(source: &str) -> Result<ChartOutput, ChartError> {
    let lines: Vec<&str> = source.lines().collect();
    parse_aff_lines(&lines)
}

/// Parse a chart from lines, discarding the offset notification.
///
/// A step of [`parse_aff`]
///
/// # Errors
///
/// Returns [`ChartError`] if the timing groups are malformed or any content line is invalid.
pub fn parse_aff_lines<S: AsRef<str>>(lines: &[S]) -> Result<ChartOutput, ChartError> {
    parse_aff_lines_with_sink(lines, &mut |_: i64| {})
}

/// Parse a chart from lines, and reports its audio offset to `sink`.
///
/// A step of [`parse_aff`]
///
/// # Errors
///
/// Returns [`ChartError`] if the timing groups are malformed or any content line is invalid.
/// `sink` is not called then.
pub fn parse_aff_lines_with_sink<S: AsRef<str>>(
    lines: &[S],
    sink: &mut impl OffsetSink,
) -> Result<ChartOutput, ChartError> {
    let SplitOutput {
        groups: spans,
        offset,
        headers,
        mut warnings,
    } = split_timing_groups(lines)?;

    let mut groups = Vec::with_capacity(spans.len());
    for span in spans {
        log::debug!(
            "assembling timing group {} at lines {:?} with attributes {:?}",
            span.index,
            span.range,
            span.attributes
        );
        let mut group = TimingGroup::new(span.index, span.attributes.clone());
        let content = span
            .line_indices()
            .filter_map(|index| lines.get(index).map(|line| (index + 1, line.as_ref())))
            .filter(|(_, line)| LineKind::classify(line) == LineKind::Content);
        for (line_number, line) in content {
            let parsed = ChartLine::parse(line).map_err(|source| ChartError::Line {
                group: span.index,
                line: line_number,
                source,
            })?;
            log::debug!("line {line_number}: {parsed:?}");
            match parsed {
                ChartLine::TempoAnchor(anchor) => {
                    if let Some(previous) = group.timeline_mut().push(anchor) {
                        warnings.push(
                            ChartWarning::UnorderedTempoAnchor {
                                previous: previous.time,
                                time: anchor.time,
                            }
                            .at_line(span.index, line_number),
                        );
                    }
                }
                ChartLine::Note(note) => {
                    warnings.extend(
                        note.bounds_warnings()
                            .into_iter()
                            .map(|warning| {
                                ChartWarning::from(warning).at_line(span.index, line_number)
                            }),
                    );
                    group.push_note(note);
                }
            }
        }
        groups.push(group);
    }

    warnings.sort_by_key(SourceLineMixin::line);
    for warning in &warnings {
        log::warn!("{warning}");
    }

    let offset = offset.unwrap_or(0);
    sink.store_offset(offset);
    Ok(ChartOutput {
        chart: Chart {
            offset,
            headers,
            groups,
        },
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::aff::{
        line::Field,
        note::{Axis, Hold, Note, NoteKind, Tap},
        timeline::TempoAnchor,
    };

    #[test]
    fn offset_and_tap() {
        let ChartOutput { chart, warnings } =
            parse_aff_lines(&["AudioOffset: 1500", "---", "(1,1)"]).unwrap();
        assert_eq!(chart.offset, 1500);
        assert_eq!(chart.groups.len(), 1);
        assert_eq!(chart.groups[0].notes(), &[Note::Tap(Tap::new(1.0, 1).unwrap())]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn single_group_with_anchor() {
        let ChartOutput { chart, .. } =
            parse_aff_lines(&["timing(0,3)", "(1,1)", "hold(2,3,4)"]).unwrap();
        assert_eq!(chart.offset, 0);
        let group = chart.group(0).unwrap();
        assert_eq!(group.timeline().anchors(), &[TempoAnchor::new(0.0, 3.0)]);
        assert_eq!(
            group.notes(),
            &[
                Note::Tap(Tap::new(1.0, 1).unwrap()),
                Note::Hold(Hold::new(2.0, 3.0, 4).unwrap()),
            ]
        );
    }

    #[test]
    fn explicit_group_has_own_timeline() {
        let ChartOutput { chart, .. } = parse_aff_lines(&[
            "timing(0,3)",
            "(1,1)",
            "timinggroup(){",
            "timing(10,5)",
            "(2,2)",
            "}",
        ])
        .unwrap();
        assert_eq!(chart.groups.len(), 2);
        let group = chart.group(1).unwrap();
        assert_eq!(group.index(), 1);
        assert_eq!(group.timeline().anchors(), &[TempoAnchor::new(10.0, 5.0)]);
        assert_eq!(
            group.notes().first().and_then(Note::lane).map(|lane| lane.get()),
            Some(2)
        );
    }

    #[test]
    fn line_error_names_group_and_line() {
        let error = parse_aff_lines(&[
            "timing(0,3)",
            "timinggroup(){",
            "timing(0,3)",
            "(1,5)",
            "}",
        ])
        .unwrap_err();
        assert_eq!(
            error,
            ChartError::Line {
                group: 1,
                line: 4,
                source: LineError::Note(note::NoteError::LaneOutOfRange { lane: 5 }),
            }
        );
        assert_eq!(error.line(), 4);
        assert_eq!(
            error.to_string(),
            "lane 5 is out of range, expected 1 to 4 at line 4 (timing group 1)"
        );
    }

    #[test]
    fn unrecognized_line_aborts() {
        let error = parse_aff_lines(&["timing(0,3)", "flick(1,1)"]).unwrap_err();
        assert_eq!(
            error,
            ChartError::Line {
                group: 0,
                line: 2,
                source: LineError::UnrecognizedLine("flick(1,1)".into()),
            }
        );
    }

    #[test]
    fn split_errors_are_wrapped() {
        assert_eq!(
            parse_aff_lines(&["(1,1)", "}"]),
            Err(ChartError::Split(SplitError::UnmatchedClose { line: 2 }))
        );
        assert_eq!(
            parse_aff_lines(&["timinggroup(){"]).map_err(|error| error.line()),
            Err(1)
        );
    }

    #[test]
    fn arc_warnings_point_at_their_line() {
        let ChartOutput { chart, warnings } = parse_aff_lines(&[
            "timing(0,120)",
            "",
            "arc(0,1000,-0.25,0.50,sisi,1.00,1.50,0,none,false);",
        ])
        .unwrap();
        assert_eq!(chart.groups[0].notes().len(), 1);
        assert_eq!(
            warnings,
            vec![
                ChartWarning::from(NoteWarning::PositionOutOfBounds {
                    kind: NoteKind::Arc,
                    time: 0.0,
                    axis: Axis::X,
                    value: -0.25,
                })
                .at_line(0, 3),
                ChartWarning::from(NoteWarning::PositionOutOfBounds {
                    kind: NoteKind::Arc,
                    time: 1000.0,
                    axis: Axis::Y,
                    value: 1.5,
                })
                .at_line(0, 3),
            ]
        );
    }

    #[test]
    fn arc_tap_outside_its_arc_is_warned() {
        let ChartOutput { chart, warnings } = parse_aff_lines(&[
            "timing(0,120)",
            "timinggroup(){",
            "timing(0,120)",
            "arc(0,1000,0.00,0.50,sisi,1.00,0.50,0,none,true)[arctap(500),arctap(1500)];",
            "}",
        ])
        .unwrap();
        assert_eq!(chart.groups[1].sky_notes().count(), 2);
        assert_eq!(
            warnings,
            vec![
                ChartWarning::from(NoteWarning::ArcTapOutOfSpan {
                    time: 1500.0,
                    start: 0.0,
                    end: 1000.0,
                })
                .at_line(1, 4)
            ]
        );
    }

    #[test]
    fn unordered_anchor_is_warned_and_kept() {
        let ChartOutput { chart, warnings } =
            parse_aff_lines(&["timing(1000,120)", "timing(0,60)"]).unwrap();
        assert_eq!(chart.groups[0].timeline().anchors().len(), 2);
        assert_eq!(
            warnings,
            vec![
                ChartWarning::UnorderedTempoAnchor {
                    previous: 1000.0,
                    time: 0.0,
                }
                .at_line(0, 2)
            ]
        );
    }

    #[test]
    fn warnings_are_in_line_order() {
        let ChartOutput { warnings, .. } = parse_aff_lines(&[
            "AudioOffset:10",
            "AudioOffset:20",
            "-",
            "timing(0,120)",
            "timinggroup(){",
            "timing(5,120)",
            "timing(1,120)",
            "}",
            "timing(-1,120)",
        ])
        .unwrap();
        assert_eq!(
            warnings.iter().map(|warning| warning.line()).collect::<Vec<_>>(),
            vec![2, 7, 9]
        );
    }

    #[test]
    fn sink_receives_final_offset_once() {
        let mut stored = Vec::new();
        let output = parse_aff_lines_with_sink(
            &["AudioOffset:100", "AudioOffset:-50", "-", "timing(0,1)"],
            &mut |offset: i64| stored.push(offset),
        )
        .unwrap();
        assert_eq!(output.chart.offset, -50);
        assert_eq!(stored, vec![-50]);
    }

    #[test]
    fn sink_is_not_called_on_error() {
        let mut stored = Vec::new();
        let result =
            parse_aff_lines_with_sink(&["AudioOffset:100", "-", "hold(2,1,1)"], &mut |offset: i64| {
                stored.push(offset);
            });
        assert!(result.is_err());
        assert!(stored.is_empty());
    }

    #[test]
    fn missing_field_is_reported() {
        assert_eq!(
            parse_aff_lines(&["timing(0)"]),
            Err(ChartError::Line {
                group: 0,
                line: 1,
                source: LineError::MissingField { field: Field::Bpm },
            })
        );
    }

    #[test]
    fn source_text_with_crlf() {
        let output = parse_aff("AudioOffset:0\r\n-\r\ntiming(0,100.00,4.00);\r\n(500,2);\r\n").unwrap();
        assert_eq!(output.chart.groups[0].notes().len(), 1);
        assert_eq!(
            output.chart.groups[0].timeline().anchors()[0].beats,
            Some(4.0)
        );
    }
}
