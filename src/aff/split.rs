//! Splitting chart lines into timing groups.
//!
//! The splitter scans all the lines once and delimits the line ranges of each timing group
//! without looking into the content lines:
//!
//! - Lines before the first `timinggroup(...){` belong to the default group `0`.
//! - Each `timinggroup(...){` ... `}` block becomes a new group, numbered in declaration order.
//!   Blocks cannot be nested.
//! - Content lines after a block, outside of any other block, return to group `0`.
//!
//! Headers (`Name:value`) and separators (`-`) are recognized only in the header section at the
//! top of the chart, which ends at the first separator or at the first body line. The header
//! section is excluded from the range of group `0`. In the body, those shapes are content like
//! any other line, so the line grammar rejects them. Blank lines are skipped by the assembler.

use std::{collections::BTreeMap, ops::Range};

use thiserror::Error;

use super::{
    ChartWarning, ChartWarningWithLine,
    mixin::SourceLineMixinExt,
};

/// The header declaring the audio offset.
pub const AUDIO_OFFSET_HEADER: &str = "AudioOffset";

/// An error occurred when delimiting timing groups.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitError {
    /// A group was opened while another one was still open.
    #[error(
        "timing group opened at line {line}, but the timing group at lines {open_line}-{} is not closed",
        line - 1
    )]
    UnclosedGroup {
        /// The line of the second opening marker.
        line: usize,
        /// The line of the group left open.
        open_line: usize,
    },
    /// A closing marker was found without an open group.
    #[error("timing group closed at line {line}, but no timing group is open")]
    UnmatchedClose {
        /// The line of the closing marker.
        line: usize,
    },
    /// The input ended with a group still open.
    #[error("timing group opened at line {open_line} is not closed until the end")]
    DanglingGroup {
        /// The line of the opening marker.
        open_line: usize,
    },
    /// The audio offset was not an integer.
    #[error("audio offset `{value}` at line {line} is not an integer")]
    InvalidOffset {
        /// The line of the header.
        line: usize,
        /// The written value.
        value: String,
    },
}

/// Type alias of `core::result::Result<T, SplitError>`
pub(crate) type Result<T> = core::result::Result<T, SplitError>;

/// A line of the header section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderLine<'a> {
    /// A run of `-`, ending the header section.
    Separator,
    /// `Name:value`
    Header { name: &'a str, value: &'a str },
}

impl<'a> HeaderLine<'a> {
    pub(crate) fn classify(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if !line.is_empty() && line.chars().all(|c| c == '-') {
            return Some(Self::Separator);
        }
        let (name, value) = line.split_once(':')?;
        let is_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        is_name.then_some(Self::Header {
            name,
            value: value.trim(),
        })
    }
}

/// What a body line is, as far as the splitter is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// Empty or whitespace only.
    Blank,
    /// `timinggroup(attributes){`
    GroupOpen { attributes: &'a str },
    /// `}`
    GroupClose,
    /// Anything else, left to the line grammar.
    Content,
}

impl<'a> LineKind<'a> {
    pub(crate) fn classify(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Blank;
        }
        if let Some(rest) = line.strip_prefix("timinggroup") {
            let attributes = rest
                .trim_start()
                .strip_prefix('(')
                .and_then(|inner| inner.split_once(')'))
                .map_or("", |(attributes, _)| attributes.trim());
            return Self::GroupOpen { attributes };
        }
        if line.starts_with('}') {
            return Self::GroupClose;
        }
        Self::Content
    }
}

/// The lines of one timing group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupSpan {
    /// Index of the group, `0` for the default group.
    pub index: usize,
    /// The 0-based half-open line range of the group, without its markers.
    pub range: Range<usize>,
    /// More ranges of the default group, found after explicit groups.
    pub continuations: Vec<Range<usize>>,
    /// Attributes written in the opening marker, such as `noinput`.
    pub attributes: Vec<String>,
}

impl GroupSpan {
    fn new(index: usize, range: Range<usize>, attributes: &str) -> Self {
        Self {
            index,
            range,
            continuations: Vec::new(),
            attributes: attributes
                .split('_')
                .map(str::trim)
                .filter(|attribute| !attribute.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        }
    }

    /// All the 0-based line indices of the group, in order.
    pub fn line_indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.range.clone())
            .chain(self.continuations.iter().cloned())
            .flatten()
    }
}

/// Output of [`split_timing_groups`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutput {
    /// The groups in index order, group `0` first.
    pub groups: Vec<GroupSpan>,
    /// The last declared audio offset.
    pub offset: Option<i64>,
    /// Headers other than the audio offset. The last one wins.
    pub headers: BTreeMap<String, String>,
    /// Warnings found on header lines.
    pub warnings: Vec<ChartWarningWithLine>,
}

/// Delimits the timing groups in `lines`.
///
/// # Errors
///
/// Returns [`SplitError`] if the group markers are not balanced or the audio offset is broken.
pub fn split_timing_groups<S: AsRef<str>>(lines: &[S]) -> Result<SplitOutput> {
    let mut offset = None;
    let mut headers = BTreeMap::new();
    let mut warnings = Vec::new();

    let mut in_header = true;
    let mut default_start = 0;
    let mut default_group: Option<GroupSpan> = None;
    let mut explicit_groups = Vec::new();
    let mut open: Option<(usize, &str)> = None;
    // line after the last closing marker, and whether content was found since
    let mut resume = 0;
    let mut outside_content_seen = false;

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let line_number = index + 1;
        if in_header {
            match HeaderLine::classify(line) {
                Some(HeaderLine::Separator) => {
                    log::trace!("header section ends at line {line_number}");
                    in_header = false;
                    default_start = index + 1;
                    continue;
                }
                Some(HeaderLine::Header { name, value }) => {
                    default_start = index + 1;
                    if name == AUDIO_OFFSET_HEADER {
                        let parsed = value.parse().map_err(|_| SplitError::InvalidOffset {
                            line: line_number,
                            value: value.to_owned(),
                        })?;
                        if let Some(previous) = offset.replace(parsed) {
                            warnings.push(
                                ChartWarning::DuplicateOffset {
                                    previous,
                                    value: parsed,
                                }
                                .at_line(0, line_number),
                            );
                        }
                    } else {
                        headers.insert(name.to_owned(), value.to_owned());
                    }
                    continue;
                }
                None if line.trim().is_empty() => continue,
                None => in_header = false,
            }
        }
        match LineKind::classify(line) {
            LineKind::Blank => {}
            LineKind::GroupOpen { attributes } => {
                if let Some((open_index, _)) = open {
                    return Err(SplitError::UnclosedGroup {
                        line: line_number,
                        open_line: open_index + 1,
                    });
                }
                match &mut default_group {
                    None => {
                        log::trace!("timing group 0 delimited at lines {default_start}..{index}");
                        default_group = Some(GroupSpan::new(0, default_start..index, ""));
                    }
                    Some(group) => {
                        if outside_content_seen {
                            group.continuations.push(resume..index);
                        }
                    }
                }
                open = Some((index, attributes));
            }
            LineKind::GroupClose => {
                let Some((open_index, attributes)) = open.take() else {
                    return Err(SplitError::UnmatchedClose { line: line_number });
                };
                let group_index = explicit_groups.len() + 1;
                log::trace!(
                    "timing group {group_index} delimited at lines {}..{index}",
                    open_index + 1
                );
                explicit_groups.push(GroupSpan::new(
                    group_index,
                    open_index + 1..index,
                    attributes,
                ));
                resume = index + 1;
                outside_content_seen = false;
            }
            LineKind::Content => {
                if open.is_none() && default_group.is_some() {
                    outside_content_seen = true;
                }
            }
        }
    }

    if let Some((open_index, _)) = open {
        return Err(SplitError::DanglingGroup {
            open_line: open_index + 1,
        });
    }
    let default_group = match default_group {
        None => GroupSpan::new(0, default_start..lines.len(), ""),
        Some(mut group) => {
            if outside_content_seen {
                group.continuations.push(resume..lines.len());
            }
            group
        }
    };

    let mut groups = Vec::with_capacity(explicit_groups.len() + 1);
    groups.push(default_group);
    groups.extend(explicit_groups);
    Ok(SplitOutput {
        groups,
        offset,
        headers,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ranges(output: &SplitOutput) -> Vec<Range<usize>> {
        output.groups.iter().map(|group| group.range.clone()).collect()
    }

    #[test]
    fn classify_header_lines() {
        assert_eq!(HeaderLine::classify("-"), Some(HeaderLine::Separator));
        assert_eq!(HeaderLine::classify(" --- "), Some(HeaderLine::Separator));
        assert_eq!(
            HeaderLine::classify("AudioOffset: -250"),
            Some(HeaderLine::Header {
                name: "AudioOffset",
                value: "-250"
            })
        );
        assert_eq!(HeaderLine::classify("-(3,3)"), None);
        assert_eq!(HeaderLine::classify("--- garbage"), None);
        assert_eq!(HeaderLine::classify("(1,1);"), None);
        assert_eq!(HeaderLine::classify(":1"), None);
    }

    #[test]
    fn classify_body_lines() {
        assert_eq!(LineKind::classify("   "), LineKind::Blank);
        assert_eq!(
            LineKind::classify("timinggroup(noinput_fadingholds){"),
            LineKind::GroupOpen {
                attributes: "noinput_fadingholds"
            }
        );
        assert_eq!(
            LineKind::classify("timinggroup(){"),
            LineKind::GroupOpen { attributes: "" }
        );
        assert_eq!(LineKind::classify("};"), LineKind::GroupClose);
        assert_eq!(LineKind::classify("(1,1);"), LineKind::Content);
        assert_eq!(LineKind::classify("timing(0,120)"), LineKind::Content);
        assert_eq!(
            LineKind::classify("arc(0,1,0,0,sisi,0,0,0,none,true)"),
            LineKind::Content
        );
        assert_eq!(LineKind::classify("-"), LineKind::Content);
        assert_eq!(LineKind::classify("hold:2"), LineKind::Content);
    }

    #[test]
    fn no_markers_make_one_group() {
        let output = split_timing_groups(&["timing(0,3)", "(1,1)", "hold(2,3,4)"]).unwrap();
        assert_eq!(ranges(&output), vec![0..3]);
        assert_eq!(output.offset, None);
    }

    #[test]
    fn leading_headers_are_excluded() {
        let output = split_timing_groups(&["AudioOffset: 1500", "---", "(1,1)"]).unwrap();
        assert_eq!(ranges(&output), vec![2..3]);
        assert_eq!(output.offset, Some(1500));
    }

    #[test]
    fn explicit_groups_follow_group_zero() {
        let lines = [
            "AudioOffset:0",
            "-",
            "timing(0,3)",
            "(1,1)",
            "hold(2,3,4)",
            "timinggroup(){",
            "timing(114514,1919810)",
            "(2,2)",
            "}",
            "timinggroup(noinput){",
            "timing(114514,1919810)",
            "(3,3)",
            "}",
        ];
        let output = split_timing_groups(&lines).unwrap();
        assert_eq!(ranges(&output), vec![2..5, 6..8, 10..12]);
        assert_eq!(
            output
                .groups
                .iter()
                .map(|group| group.index)
                .collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(output.groups[2].attributes, vec!["noinput".to_owned()]);
        assert!(output.groups[0].continuations.is_empty());
    }

    #[test]
    fn content_after_groups_returns_to_group_zero() {
        let lines = [
            "timing(0,3)",
            "timinggroup(){",
            "timing(0,5)",
            "}",
            "(1,1)",
            "timinggroup(){",
            "timing(0,6)",
            "}",
            "",
            "(2,2)",
        ];
        let output = split_timing_groups(&lines).unwrap();
        assert_eq!(ranges(&output), vec![0..1, 2..3, 6..7]);
        assert_eq!(output.groups[0].continuations, vec![4..5, 8..10]);
        assert_eq!(
            output.groups[0].line_indices().collect::<Vec<_>>(),
            vec![0, 4, 8, 9]
        );
    }

    #[test]
    fn blank_lines_between_groups_add_nothing() {
        let lines = ["timing(0,3)", "timinggroup(){", "}", "", "  "];
        let output = split_timing_groups(&lines).unwrap();
        assert!(output.groups[0].continuations.is_empty());
    }

    #[test]
    fn header_shapes_in_the_body_are_content() {
        let lines = [
            "AudioOffset:100",
            "-",
            "timing(0,100)",
            "timinggroup(){",
            "AudioOffset:200",
            "}",
            "-",
        ];
        let output = split_timing_groups(&lines).unwrap();
        assert_eq!(output.offset, Some(100));
        assert!(output.warnings.is_empty());
        assert_eq!(ranges(&output), vec![2..3, 4..5]);
        assert_eq!(output.groups[0].continuations, vec![6..7]);
    }

    #[test]
    fn header_section_ends_at_first_body_line() {
        let output =
            split_timing_groups(&["AudioOffset:100", "", "timing(0,100)", "Title:late"]).unwrap();
        assert_eq!(output.offset, Some(100));
        assert!(output.headers.is_empty());
        assert_eq!(ranges(&output), vec![1..4]);
    }

    #[test]
    fn nested_open_is_unclosed_group() {
        let lines = ["timing(0,3)", "timinggroup(){", "(1,1)", "timinggroup(){", "}"];
        assert_eq!(
            split_timing_groups(&lines),
            Err(SplitError::UnclosedGroup {
                line: 4,
                open_line: 2
            })
        );
    }

    #[test]
    fn close_without_open_is_unmatched() {
        assert_eq!(
            split_timing_groups(&["timing(0,3)", "}"]),
            Err(SplitError::UnmatchedClose { line: 2 })
        );
        assert_eq!(
            split_timing_groups(&["timinggroup(){", "}", "}"]),
            Err(SplitError::UnmatchedClose { line: 3 })
        );
    }

    #[test]
    fn open_until_end_is_dangling() {
        assert_eq!(
            split_timing_groups(&["timing(0,3)", "timinggroup(){", "timing(0,4)"]),
            Err(SplitError::DanglingGroup { open_line: 2 })
        );
    }

    #[test]
    fn repeated_offset_keeps_the_last() {
        let output =
            split_timing_groups(&["AudioOffset:100", "AudioOffset:-20", "-", "(1,1)"]).unwrap();
        assert_eq!(output.offset, Some(-20));
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(
            output.warnings[0].content(),
            &ChartWarning::DuplicateOffset {
                previous: 100,
                value: -20
            }
        );
        assert_eq!(output.warnings[0].line(), 2);
    }

    #[test]
    fn broken_offset_is_error() {
        assert_eq!(
            split_timing_groups(&["AudioOffset:soon", "-"]),
            Err(SplitError::InvalidOffset {
                line: 1,
                value: "soon".into()
            })
        );
    }

    #[test]
    fn other_headers_are_collected() {
        let output =
            split_timing_groups(&["AudioOffset:0", "TimingPointDensityFactor:1.5", "-"]).unwrap();
        assert_eq!(
            output.headers.get("TimingPointDensityFactor").map(String::as_str),
            Some("1.5")
        );
        assert_eq!(ranges(&output), vec![3..3]);
    }
}
