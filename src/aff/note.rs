//! Definitions of the notes placed in a timing group.
//!
//! Every note variant validates its fields on construction. Lane and duration violations are
//! errors ([`NoteError`]), while sky coordinates outside `[0, 1]` and arc-taps outside of their
//! arc are only reported as [`NoteWarning`]s and the note is kept as-is.

use std::{f64::consts::FRAC_PI_2, fmt, str::FromStr};

use thiserror::Error;

/// An error occurred when constructing a note.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteError {
    /// The lane of a tap or hold was not in `1..=4`.
    #[error("lane {lane} is out of range, expected 1 to 4")]
    LaneOutOfRange {
        /// The lane written in the chart.
        lane: i64,
    },
    /// The note ends before it starts.
    #[error("note ends at {end} before it starts at {start}")]
    NegativeDuration {
        /// The start time.
        start: f64,
        /// The end time.
        end: f64,
    },
    /// The arc easing tag was not one of `sisi`, `siso`, `sosi` or `soso`.
    #[error("unknown arc easing `{0}`")]
    UnknownEasing(String),
    /// The arc color was not one of `0`, `1` or `2`.
    #[error("unknown arc color `{0}`")]
    UnknownColor(String),
}

/// Type alias of `core::result::Result<T, NoteError>`
pub(crate) type Result<T> = core::result::Result<T, NoteError>;

/// A non-fatal issue found on a note.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteWarning {
    /// A sky coordinate is outside the nominal `[0, 1]` range.
    #[error("{kind} at {time} has {axis} coordinate {value} outside of [0, 1]")]
    PositionOutOfBounds {
        /// The kind of the note.
        kind: NoteKind,
        /// The time of the endpoint having the coordinate.
        time: f64,
        /// Which coordinate is out of bounds.
        axis: Axis,
        /// The coordinate value.
        value: f64,
    },
    /// An arc-tap is placed outside of the time span of its arc.
    #[error("arc-tap at {time} is outside of its arc from {start} to {end}")]
    ArcTapOutOfSpan {
        /// The time of the arc-tap.
        time: f64,
        /// The start time of the arc.
        start: f64,
        /// The end time of the arc.
        end: f64,
    },
}

/// A coordinate axis of the sky area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
        })
    }
}

/// The kind of a note, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteKind {
    /// [`Tap`]
    Tap,
    /// [`Hold`]
    Hold,
    /// [`SkyNote`]
    SkyNote,
    /// [`Arc`]
    Arc,
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tap => "Tap",
            Self::Hold => "Hold",
            Self::SkyNote => "Sky Note",
            Self::Arc => "Arc",
        })
    }
}

/// A ground lane, one of `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "u8"))]
pub struct Lane(u8);

impl Lane {
    /// Returns the lane number.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Lane {
    type Error = NoteError;

    fn try_from(lane: i64) -> Result<Self> {
        match lane {
            1..=4 => Ok(Self(lane as u8)),
            _ => Err(NoteError::LaneOutOfRange { lane }),
        }
    }
}

impl From<Lane> for u8 {
    fn from(value: Lane) -> Self {
        value.0
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn check_duration(start: f64, end: f64) -> Result<()> {
    if end < start {
        return Err(NoteError::NegativeDuration { start, end });
    }
    Ok(())
}

fn bounds_warnings(kind: NoteKind, time: f64, x: f64, y: f64) -> Vec<NoteWarning> {
    [(Axis::X, x), (Axis::Y, y)]
        .into_iter()
        .filter(|(_, value)| !(0.0..=1.0).contains(value))
        .map(|(axis, value)| NoteWarning::PositionOutOfBounds {
            kind,
            time,
            axis,
            value,
        })
        .collect()
}

/// A ground note hit once. `(time,lane)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tap {
    touch_time: f64,
    lane: Lane,
}

impl Tap {
    /// Creates a new tap.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::LaneOutOfRange`] if `lane` is not in `1..=4`.
    pub fn new(touch_time: f64, lane: i64) -> Result<Self> {
        Ok(Self {
            touch_time,
            lane: lane.try_into()?,
        })
    }

    /// The judgment time.
    #[must_use]
    pub const fn touch_time(&self) -> f64 {
        self.touch_time
    }

    /// The lane the tap falls on.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }
}

/// A ground note held down from its touch time to its end time. `hold(start,end,lane)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hold {
    touch_time: f64,
    end_time: f64,
    lane: Lane,
}

impl Hold {
    /// Creates a new hold.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::LaneOutOfRange`] if `lane` is not in `1..=4`, or
    /// [`NoteError::NegativeDuration`] if `end_time < touch_time`.
    pub fn new(touch_time: f64, end_time: f64, lane: i64) -> Result<Self> {
        let lane = lane.try_into()?;
        check_duration(touch_time, end_time)?;
        Ok(Self {
            touch_time,
            end_time,
            lane,
        })
    }

    /// The time the hold starts.
    #[must_use]
    pub const fn touch_time(&self) -> f64 {
        self.touch_time
    }

    /// The time the hold is released.
    #[must_use]
    pub const fn end_time(&self) -> f64 {
        self.end_time
    }

    /// The lane the hold falls on.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Length of the hold, never negative.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.touch_time
    }
}

/// A note hit in the sky area at a coordinate, nominally inside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkyNote {
    touch_time: f64,
    x_position: f64,
    y_position: f64,
}

impl SkyNote {
    /// Creates a new sky note. Coordinates are not restricted, see [`SkyNote::bounds_warnings`].
    #[must_use]
    pub const fn new(touch_time: f64, x_position: f64, y_position: f64) -> Self {
        Self {
            touch_time,
            x_position,
            y_position,
        }
    }

    /// The judgment time.
    #[must_use]
    pub const fn touch_time(&self) -> f64 {
        self.touch_time
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x_position(&self) -> f64 {
        self.x_position
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y_position(&self) -> f64 {
        self.y_position
    }

    /// Reports the coordinates outside `[0, 1]`.
    #[must_use]
    pub fn bounds_warnings(&self) -> Vec<NoteWarning> {
        bounds_warnings(
            NoteKind::SkyNote,
            self.touch_time,
            self.x_position,
            self.y_position,
        )
    }
}

/// Shape of one axis of an arc between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EasingCurve {
    /// `si`, starts slow and ends fast.
    SineIn,
    /// `so`, starts fast and ends slow.
    SineOut,
}

impl EasingCurve {
    /// Maps the progress `t` in `[0, 1]` onto the curve.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::SineIn => 1.0 - (t * FRAC_PI_2).cos(),
            Self::SineOut => (t * FRAC_PI_2).sin(),
        }
    }
}

/// Movement shape of an arc. The first syllable shapes the x axis, the second one the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArcEasing {
    /// `sisi`
    SiSi,
    /// `siso`
    SiSo,
    /// `sosi`
    SoSi,
    /// `soso`
    SoSo,
}

impl ArcEasing {
    /// Curve of the horizontal movement.
    #[must_use]
    pub const fn x_curve(self) -> EasingCurve {
        match self {
            Self::SiSi | Self::SiSo => EasingCurve::SineIn,
            Self::SoSi | Self::SoSo => EasingCurve::SineOut,
        }
    }

    /// Curve of the vertical movement.
    #[must_use]
    pub const fn y_curve(self) -> EasingCurve {
        match self {
            Self::SiSi | Self::SoSi => EasingCurve::SineIn,
            Self::SiSo | Self::SoSo => EasingCurve::SineOut,
        }
    }
}

impl FromStr for ArcEasing {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "sisi" => Self::SiSi,
            "siso" => Self::SiSo,
            "sosi" => Self::SoSi,
            "soso" => Self::SoSo,
            other => return Err(NoteError::UnknownEasing(other.to_owned())),
        })
    }
}

impl fmt::Display for ArcEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SiSi => "sisi",
            Self::SiSo => "siso",
            Self::SoSi => "sosi",
            Self::SoSo => "soso",
        })
    }
}

/// Color of an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArcColor {
    /// `0`
    Blue,
    /// `1`
    Red,
    /// `2`
    Green,
}

impl FromStr for ArcColor {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "0" => Self::Blue,
            "1" => Self::Red,
            "2" => Self::Green,
            other => return Err(NoteError::UnknownColor(other.to_owned())),
        })
    }
}

/// A point in the sky area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl ArcPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A sky note traced from a start point to an end point, possibly carrying arc-taps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arc {
    touch_time: f64,
    end_time: f64,
    start: ArcPoint,
    end: ArcPoint,
    easing: ArcEasing,
    color: ArcColor,
    extra_tag: String,
    is_trace: bool,
    arc_taps: Vec<f64>,
}

impl Arc {
    /// Creates a new arc without extra tag, trace flag or arc-taps.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::NegativeDuration`] if `end_time < touch_time`.
    pub fn new(
        touch_time: f64,
        end_time: f64,
        start: ArcPoint,
        end: ArcPoint,
        easing: ArcEasing,
        color: ArcColor,
    ) -> Result<Self> {
        check_duration(touch_time, end_time)?;
        Ok(Self {
            touch_time,
            end_time,
            start,
            end,
            easing,
            color,
            extra_tag: "none".to_owned(),
            is_trace: false,
            arc_taps: Vec::new(),
        })
    }

    /// Sets the opaque tag written after the color.
    #[must_use]
    pub fn with_extra_tag(mut self, extra_tag: impl Into<String>) -> Self {
        self.extra_tag = extra_tag.into();
        self
    }

    /// Sets whether the arc is a trace line.
    #[must_use]
    pub const fn with_trace(mut self, is_trace: bool) -> Self {
        self.is_trace = is_trace;
        self
    }

    /// Sets the arc-tap times, in declaration order.
    #[must_use]
    pub fn with_arc_taps(mut self, arc_taps: Vec<f64>) -> Self {
        self.arc_taps = arc_taps;
        self
    }

    /// The time the arc starts.
    #[must_use]
    pub const fn touch_time(&self) -> f64 {
        self.touch_time
    }

    /// The time the arc ends.
    #[must_use]
    pub const fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Length of the arc, never negative.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.touch_time
    }

    /// The start point.
    #[must_use]
    pub const fn start(&self) -> ArcPoint {
        self.start
    }

    /// The end point.
    #[must_use]
    pub const fn end(&self) -> ArcPoint {
        self.end
    }

    /// The movement shape.
    #[must_use]
    pub const fn easing(&self) -> ArcEasing {
        self.easing
    }

    /// The color.
    #[must_use]
    pub const fn color(&self) -> ArcColor {
        self.color
    }

    /// The opaque tag written after the color.
    #[must_use]
    pub fn extra_tag(&self) -> &str {
        &self.extra_tag
    }

    /// Whether the arc is a trace line.
    #[must_use]
    pub const fn is_trace(&self) -> bool {
        self.is_trace
    }

    /// Times of the attached arc-taps.
    #[must_use]
    pub fn arc_taps(&self) -> &[f64] {
        &self.arc_taps
    }

    /// Point on the arc at `time`, clamped into the arc's time span.
    #[must_use]
    pub fn point_at(&self, time: f64) -> ArcPoint {
        let duration = self.duration();
        let t = if duration > 0.0 {
            ((time - self.touch_time) / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let lerp = |from: f64, to: f64, curve: EasingCurve| from + (to - from) * curve.apply(t);
        ArcPoint {
            x: lerp(self.start.x, self.end.x, self.easing.x_curve()),
            y: lerp(self.start.y, self.end.y, self.easing.y_curve()),
        }
    }

    /// Sky notes produced by the arc-taps, placed on the arc.
    ///
    /// An arc-tap outside of the arc's time span is placed on the nearest endpoint.
    pub fn sky_notes(&self) -> impl Iterator<Item = SkyNote> + '_ {
        self.arc_taps.iter().map(|&time| {
            let ArcPoint { x, y } = self.point_at(time);
            SkyNote::new(time, x, y)
        })
    }

    /// Reports the endpoint coordinates outside `[0, 1]`, then the arc-taps outside of
    /// `[touch_time, end_time]`.
    #[must_use]
    pub fn bounds_warnings(&self) -> Vec<NoteWarning> {
        let mut warnings =
            bounds_warnings(NoteKind::Arc, self.touch_time, self.start.x, self.start.y);
        warnings.extend(bounds_warnings(
            NoteKind::Arc,
            self.end_time,
            self.end.x,
            self.end.y,
        ));
        let span = self.touch_time..=self.end_time;
        warnings.extend(
            self.arc_taps
                .iter()
                .filter(|&&time| !span.contains(&time))
                .map(|&time| NoteWarning::ArcTapOutOfSpan {
                    time,
                    start: self.touch_time,
                    end: self.end_time,
                }),
        );
        warnings
    }
}

/// A note in a timing group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Note {
    /// A tap on a ground lane.
    Tap(Tap),
    /// A hold on a ground lane.
    Hold(Hold),
    /// A hit in the sky area.
    SkyNote(SkyNote),
    /// A traced arc.
    Arc(Arc),
}

impl Note {
    /// The judgment time, or the start time for long notes.
    #[must_use]
    pub const fn touch_time(&self) -> f64 {
        match self {
            Self::Tap(tap) => tap.touch_time(),
            Self::Hold(hold) => hold.touch_time(),
            Self::SkyNote(sky) => sky.touch_time(),
            Self::Arc(arc) => arc.touch_time(),
        }
    }

    /// The end time of long notes, or the touch time otherwise.
    #[must_use]
    pub const fn end_time(&self) -> f64 {
        match self {
            Self::Hold(hold) => hold.end_time(),
            Self::Arc(arc) => arc.end_time(),
            Self::Tap(_) | Self::SkyNote(_) => self.touch_time(),
        }
    }

    /// The kind of the note.
    #[must_use]
    pub const fn kind(&self) -> NoteKind {
        match self {
            Self::Tap(_) => NoteKind::Tap,
            Self::Hold(_) => NoteKind::Hold,
            Self::SkyNote(_) => NoteKind::SkyNote,
            Self::Arc(_) => NoteKind::Arc,
        }
    }

    /// The ground lane, if the note is on the ground.
    #[must_use]
    pub const fn lane(&self) -> Option<Lane> {
        match self {
            Self::Tap(tap) => Some(tap.lane()),
            Self::Hold(hold) => Some(hold.lane()),
            Self::SkyNote(_) | Self::Arc(_) => None,
        }
    }

    /// Reports the sky coordinates outside `[0, 1]`, and the arc-taps outside of their arc.
    #[must_use]
    pub fn bounds_warnings(&self) -> Vec<NoteWarning> {
        match self {
            Self::SkyNote(sky) => sky.bounds_warnings(),
            Self::Arc(arc) => arc.bounds_warnings(),
            Self::Tap(_) | Self::Hold(_) => Vec::new(),
        }
    }
}

impl From<Tap> for Note {
    fn from(value: Tap) -> Self {
        Self::Tap(value)
    }
}

impl From<Hold> for Note {
    fn from(value: Hold) -> Self {
        Self::Hold(value)
    }
}

impl From<SkyNote> for Note {
    fn from(value: SkyNote) -> Self {
        Self::SkyNote(value)
    }
}

impl From<Arc> for Note {
    fn from(value: Arc) -> Self {
        Self::Arc(value)
    }
}
