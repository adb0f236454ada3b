//! This module introduces struct [`BpmTimeline`], which manages tempo anchors of a timing group.
//!
//! Anchors are kept in declaration order and are never sorted. The lookup and the integration
//! both assume that the declaration order is chronological, so a chart declaring anchors out
//! of order gets a warning from the assembler but is otherwise processed as written.

use thiserror::Error;

/// An error occurred when querying a [`BpmTimeline`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimelineError {
    /// The timeline has no tempo anchor.
    #[error("no tempo anchor is defined")]
    NoTimelineDefined,
}

/// Type alias of `core::result::Result<T, TimelineError>`
pub(crate) type Result<T> = core::result::Result<T, TimelineError>;

/// A point in time where the scroll speed changes. `timing(time,bpm)` or `timing(time,bpm,beats)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoAnchor {
    /// The time the speed starts applying.
    pub time: f64,
    /// The tempo, also the scroll speed until the next anchor.
    pub bpm: f64,
    /// Beats per bar line, if declared.
    pub beats: Option<f64>,
}

impl TempoAnchor {
    /// Creates a new anchor without beats.
    #[must_use]
    pub const fn new(time: f64, bpm: f64) -> Self {
        Self {
            time,
            bpm,
            beats: None,
        }
    }
}

/// Ordered table of tempo anchors.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BpmTimeline {
    anchors: Vec<TempoAnchor>,
}

impl BpmTimeline {
    /// Creates an empty timeline.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            anchors: Vec::new(),
        }
    }

    /// Appends an anchor. Returns the preceding anchor if the new one is not strictly after it.
    pub fn push(&mut self, anchor: TempoAnchor) -> Option<TempoAnchor> {
        let unordered = self
            .anchors
            .last()
            .filter(|last| last.time >= anchor.time)
            .copied();
        self.anchors.push(anchor);
        unordered
    }

    /// Anchors in declaration order.
    #[must_use]
    pub fn anchors(&self) -> &[TempoAnchor] {
        &self.anchors
    }

    /// Whether no anchor is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Index of the last anchor at or before `time`. Times before the first anchor map to it.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoTimelineDefined`] if there is no anchor.
    pub fn segment_for(&self, time: f64) -> Result<usize> {
        if self.anchors.is_empty() {
            return Err(TimelineError::NoTimelineDefined);
        }
        Ok(self
            .anchors
            .partition_point(|anchor| anchor.time <= time)
            .saturating_sub(1))
    }

    /// The scroll speed in effect at `time`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoTimelineDefined`] if there is no anchor.
    pub fn speed_at(&self, time: f64) -> Result<f64> {
        let index = self.segment_for(time)?;
        self.anchors
            .get(index)
            .map(|anchor| anchor.bpm)
            .ok_or(TimelineError::NoTimelineDefined)
    }

    /// Cumulative scroll distance between two times, in BPM times chart time.
    ///
    /// Each segment between two anchors contributes its speed times the overlapped duration.
    /// The first segment extends to the past and the last one to the future. The result is
    /// negated when `time_from` is after `time_to`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoTimelineDefined`] if there is no anchor.
    pub fn integrate(&self, time_from: f64, time_to: f64) -> Result<f64> {
        let first = self.segment_for(time_from)?;
        if time_from == time_to {
            return Ok(0.0);
        }
        if time_to < time_from {
            return self.integrate(time_to, time_from).map(|distance| -distance);
        }

        let mut distance = 0.0;
        for (index, anchor) in self.anchors.iter().enumerate().skip(first) {
            let segment_start = if index == first {
                time_from
            } else {
                anchor.time.max(time_from)
            };
            if segment_start >= time_to {
                break;
            }
            let segment_end = self
                .anchors
                .get(index + 1)
                .map_or(time_to, |next| next.time.min(time_to));
            if segment_end > segment_start {
                distance += anchor.bpm * (segment_end - segment_start);
            }
        }
        Ok(distance)
    }
}

impl FromIterator<TempoAnchor> for BpmTimeline {
    fn from_iter<T: IntoIterator<Item = TempoAnchor>>(iter: T) -> Self {
        Self {
            anchors: iter.into_iter().collect(),
        }
    }
}
