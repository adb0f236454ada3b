//! Grammar of a content line in a timing group.
//!
//! A content line is classified by its prefix, checked in this order:
//!
//! 1. `timing(time,bpm)` or `timing(time,bpm,beats)`: a tempo anchor,
//! 2. `(time,lane)`: a tap,
//! 3. `arc(start,end,x_start,y_start,easing,x_end,y_end,color,extra,trace)[arctap(t),...]`: an arc,
//! 4. `hold(start,end,lane)`: a hold.
//!
//! A trailing `;` is allowed on any of them. The arc-tap list of an arc is optional, and its
//! items may be written either as `arctap(t)` or as a bare number.

mod cursor;

use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use super::{
    note::{Arc, ArcColor, ArcEasing, ArcPoint, Hold, Note, NoteError, Tap},
    timeline::TempoAnchor,
};

use self::cursor::{FieldCursor, parse_finite};

/// Names of the positional fields in a content line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    /// Time of a tempo anchor, a tap or the start of a long note.
    Time,
    /// Tempo of an anchor.
    Bpm,
    /// Beats per bar line of an anchor.
    Beats,
    /// Ground lane.
    Lane,
    /// End time of a long note.
    EndTime,
    /// Horizontal start coordinate of an arc.
    XStart,
    /// Vertical start coordinate of an arc.
    YStart,
    /// Movement shape of an arc.
    Easing,
    /// Horizontal end coordinate of an arc.
    XEnd,
    /// Vertical end coordinate of an arc.
    YEnd,
    /// Color of an arc.
    Color,
    /// Opaque tag of an arc.
    ExtraTag,
    /// Trace flag of an arc.
    Trace,
    /// Time of an arc-tap.
    ArcTap,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Time => "time",
            Self::Bpm => "bpm",
            Self::Beats => "beats",
            Self::Lane => "lane",
            Self::EndTime => "end time",
            Self::XStart => "x start",
            Self::YStart => "y start",
            Self::Easing => "easing",
            Self::XEnd => "x end",
            Self::YEnd => "y end",
            Self::Color => "color",
            Self::ExtraTag => "extra tag",
            Self::Trace => "trace flag",
            Self::ArcTap => "arc-tap time",
        })
    }
}

/// An error occurred when parsing a content line.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineError {
    /// The line matches no known grammar.
    #[error("unrecognized line `{0}`")]
    UnrecognizedLine(String),
    /// A required field was missing.
    #[error("missing field: {field}")]
    MissingField {
        /// The missing field.
        field: Field,
    },
    /// A field could not be parsed as its type.
    #[error("invalid {field}: `{value}`")]
    InvalidField {
        /// The field.
        field: Field,
        /// The written value.
        value: String,
    },
    /// There were more fields than the grammar has.
    #[error("unexpected field #{position}: `{value}`")]
    UnexpectedField {
        /// 1-based position of the field.
        position: usize,
        /// The written value.
        value: String,
    },
    /// The fields were parsed, but the note was invalid.
    #[error(transparent)]
    Note(#[from] NoteError),
}

/// Type alias of `core::result::Result<T, LineError>`
pub(crate) type Result<T> = core::result::Result<T, LineError>;

/// A parsed content line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartLine {
    /// A tempo anchor for the timing group's timeline.
    TempoAnchor(TempoAnchor),
    /// A note of the timing group.
    Note(Note),
}

impl ChartLine {
    /// Parses one content line.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::UnrecognizedLine`] if the line matches no grammar, or the other
    /// [`LineError`]s if its fields are broken.
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        let body = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
        let unrecognized = || LineError::UnrecognizedLine(trimmed.to_owned());

        if let Some(rest) = body.strip_prefix("timing") {
            let (payload, tail) = parenthesized(rest).ok_or_else(unrecognized)?;
            if !tail.is_empty() {
                return Err(unrecognized());
            }
            return parse_tempo_anchor(payload).map(Self::TempoAnchor);
        }
        if body.starts_with('(') {
            let (payload, tail) = parenthesized(body).ok_or_else(unrecognized)?;
            if !tail.is_empty() {
                return Err(unrecognized());
            }
            return parse_tap(payload).map(|tap| Self::Note(tap.into()));
        }
        if let Some(rest) = body.strip_prefix("arc") {
            let (payload, tail) = parenthesized(rest).ok_or_else(unrecognized)?;
            let arc_taps = if tail.is_empty() {
                Vec::new()
            } else {
                let list = tail
                    .strip_prefix('[')
                    .and_then(|list| list.strip_suffix(']'))
                    .ok_or_else(unrecognized)?;
                parse_arc_taps(list)?
            };
            return parse_arc(payload).map(|arc| Self::Note(arc.with_arc_taps(arc_taps).into()));
        }
        if let Some(rest) = body.strip_prefix("hold") {
            let (payload, tail) = parenthesized(rest).ok_or_else(unrecognized)?;
            if !tail.is_empty() {
                return Err(unrecognized());
            }
            return parse_hold(payload).map(|hold| Self::Note(hold.into()));
        }
        Err(unrecognized())
    }
}

/// Splits `(payload)tail` into the payload and the trimmed tail.
fn parenthesized(source: &str) -> Option<(&str, &str)> {
    let inner = source.trim_start().strip_prefix('(')?;
    let close = inner.find(')')?;
    Some((&inner[..close], inner[close + 1..].trim()))
}

fn parse_tempo_anchor(payload: &str) -> Result<TempoAnchor> {
    let mut fields = FieldCursor::new(payload);
    let time = fields.next_f64(Field::Time)?;
    let bpm = fields.next_f64(Field::Bpm)?;
    let beats = fields.next_optional_f64(Field::Beats)?;
    fields.finish()?;
    Ok(TempoAnchor { time, bpm, beats })
}

fn parse_tap(payload: &str) -> Result<Tap> {
    let mut fields = FieldCursor::new(payload);
    let time = fields.next_f64(Field::Time)?;
    let lane = fields.next_i64(Field::Lane)?;
    fields.finish()?;
    Ok(Tap::new(time, lane)?)
}

fn parse_hold(payload: &str) -> Result<Hold> {
    let mut fields = FieldCursor::new(payload);
    let start = fields.next_f64(Field::Time)?;
    let end = fields.next_f64(Field::EndTime)?;
    let lane = fields.next_i64(Field::Lane)?;
    fields.finish()?;
    Ok(Hold::new(start, end, lane)?)
}

fn parse_arc(payload: &str) -> Result<Arc> {
    let mut fields = FieldCursor::new(payload);
    let start_time = fields.next_f64(Field::Time)?;
    let end_time = fields.next_f64(Field::EndTime)?;
    let x_start = fields.next_f64(Field::XStart)?;
    let y_start = fields.next_f64(Field::YStart)?;
    let easing: ArcEasing = fields.next_str(Field::Easing)?.parse()?;
    let x_end = fields.next_f64(Field::XEnd)?;
    let y_end = fields.next_f64(Field::YEnd)?;
    let color: ArcColor = fields.next_str(Field::Color)?.parse()?;
    let extra_tag = fields.next_str(Field::ExtraTag)?;
    let is_trace = fields.next_parsed::<bool>(Field::Trace)?;
    fields.finish()?;

    Ok(Arc::new(
        start_time,
        end_time,
        ArcPoint::new(x_start, y_start),
        ArcPoint::new(x_end, y_end),
        easing,
        color,
    )?
    .with_extra_tag(extra_tag)
    .with_trace(is_trace))
}

fn parse_arc_taps(list: &str) -> Result<Vec<f64>> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    list.split(',')
        .map(|item| {
            let item = item.trim();
            let time = item
                .strip_prefix("arctap(")
                .and_then(|inner| inner.strip_suffix(')'))
                .unwrap_or(item);
            parse_finite(time).ok_or_else(|| LineError::InvalidField {
                field: Field::ArcTap,
                value: item.to_owned(),
            })
        })
        .try_collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::aff::note::NoteKind;

    fn parse_note(line: &str) -> Note {
        match ChartLine::parse(line) {
            Ok(ChartLine::Note(note)) => note,
            other => panic!("expected a note from `{line}`, got {other:?}"),
        }
    }

    #[test]
    fn tempo_anchor() {
        assert_eq!(
            ChartLine::parse("timing(0,3)"),
            Ok(ChartLine::TempoAnchor(TempoAnchor::new(0.0, 3.0)))
        );
        assert_eq!(
            ChartLine::parse("timing(1500,126.00,4.00);"),
            Ok(ChartLine::TempoAnchor(TempoAnchor {
                time: 1500.0,
                bpm: 126.0,
                beats: Some(4.0),
            }))
        );
    }

    #[test]
    fn tap_and_hold() {
        assert_eq!(
            parse_note("(1,1)"),
            Note::Tap(Tap::new(1.0, 1).unwrap())
        );
        assert_eq!(
            parse_note("  hold(2,3,4);  "),
            Note::Hold(Hold::new(2.0, 3.0, 4).unwrap())
        );
    }

    #[test]
    fn lane_out_of_range() {
        assert_eq!(
            ChartLine::parse("(1,5)"),
            Err(LineError::Note(NoteError::LaneOutOfRange { lane: 5 }))
        );
        assert_eq!(
            ChartLine::parse("hold(1,2,0)"),
            Err(LineError::Note(NoteError::LaneOutOfRange { lane: 0 }))
        );
    }

    #[test]
    fn hold_with_negative_duration() {
        assert_eq!(
            ChartLine::parse("hold(3,2,1)"),
            Err(LineError::Note(NoteError::NegativeDuration {
                start: 3.0,
                end: 2.0
            }))
        );
    }

    #[test]
    fn arc_with_arc_taps() {
        let Note::Arc(arc) =
            parse_note("arc(1000,2000,0.00,1.00,siso,1.00,0.00,0,none,true)[arctap(1500),arctap(1750)];")
        else {
            panic!("expected an arc");
        };
        assert_eq!(arc.touch_time(), 1000.0);
        assert_eq!(arc.end_time(), 2000.0);
        assert_eq!(arc.start(), ArcPoint::new(0.0, 1.0));
        assert_eq!(arc.end(), ArcPoint::new(1.0, 0.0));
        assert_eq!(arc.easing(), ArcEasing::SiSo);
        assert_eq!(arc.color(), ArcColor::Blue);
        assert_eq!(arc.extra_tag(), "none");
        assert!(arc.is_trace());
        assert_eq!(arc.arc_taps(), &[1500.0, 1750.0]);
    }

    #[test]
    fn arc_without_arc_taps() {
        let note = parse_note("arc(0,10,0.5,0.5,soso,0.5,0.5,2,none,false)");
        assert_eq!(note.kind(), NoteKind::Arc);
        let Note::Arc(arc) = note else { unreachable!() };
        assert!(arc.arc_taps().is_empty());
        assert!(!arc.is_trace());

        let Note::Arc(arc) = parse_note("arc(0,10,0.5,0.5,soso,0.5,0.5,2,none,true)[5,6.5]") else {
            unreachable!()
        };
        assert_eq!(arc.arc_taps(), &[5.0, 6.5]);
    }

    #[test]
    fn arc_out_of_bounds_is_still_parsed() {
        let note = parse_note("arc(0,10,-0.5,0.5,sisi,1.5,0.5,1,none,false)");
        assert_eq!(note.bounds_warnings().len(), 2);
    }

    #[test]
    fn arc_field_errors() {
        assert_eq!(
            ChartLine::parse("arc(0,10,0,0,b,0,0,0,none,false)"),
            Err(LineError::Note(NoteError::UnknownEasing("b".into())))
        );
        assert_eq!(
            ChartLine::parse("arc(0,10,0,0,sisi,0,0,3,none,false)"),
            Err(LineError::Note(NoteError::UnknownColor("3".into())))
        );
        assert_eq!(
            ChartLine::parse("arc(0,10,0,0,sisi,0,0,0,none,yes)"),
            Err(LineError::InvalidField {
                field: Field::Trace,
                value: "yes".into()
            })
        );
        assert_eq!(
            ChartLine::parse("arc(0,10,0,0,sisi,0,0,0,none,true)[arctap(x)]"),
            Err(LineError::InvalidField {
                field: Field::ArcTap,
                value: "arctap(x)".into()
            })
        );
        assert_eq!(
            ChartLine::parse("arc(10,0,0,0,sisi,0,0,0,none,true)"),
            Err(LineError::Note(NoteError::NegativeDuration {
                start: 10.0,
                end: 0.0
            }))
        );
    }

    #[test]
    fn unrecognized_lines() {
        for line in [
            "scenecontrol(0,trackhide)",
            "flick(0,0.5,0.5,1,0)",
            "timing 0 120",
            "(1,1)x",
            "hold(1,2,1)[3]",
            "arc(0,1,0,0,sisi,0,0,0,none,true)junk",
            "",
        ] {
            assert!(
                matches!(ChartLine::parse(line), Err(LineError::UnrecognizedLine(_))),
                "`{line}` must be unrecognized"
            );
        }
    }

    #[test]
    fn broken_fields() {
        assert_eq!(
            ChartLine::parse("(abc,1)"),
            Err(LineError::InvalidField {
                field: Field::Time,
                value: "abc".into()
            })
        );
        assert_eq!(
            ChartLine::parse("hold(1,2)"),
            Err(LineError::MissingField { field: Field::Lane })
        );
        assert_eq!(
            ChartLine::parse("(1,1,1)"),
            Err(LineError::UnexpectedField {
                position: 3,
                value: "1".into()
            })
        );
    }
}
