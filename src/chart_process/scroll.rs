//! Scroll position calculation module
//!
//! Computes how far a note is from the judgment line at a sample time, by integrating the
//! tempo of its timing group between the sample time and the note's touch time.

use crate::aff::{
    note::Note,
    timeline::{BpmTimeline, TimelineError},
};

/// Distance units per one BPM for one unit of chart time, which reads a position in beats when
/// the chart time is in seconds.
///
/// Charts are timed in milliseconds. To get the distances of the Arcaea playfield for them, use
/// [`MILLISECOND_DISTANCE_PER_TEMPO_UNIT`] instead: a note touching at `1500` on the timeline
/// `{0: 100, 1000: 200}` is then at `0.2` at time `0`.
pub const DEFAULT_DISTANCE_PER_TEMPO_UNIT: f64 = 1.0 / 60.0;

/// Distance units per one BPM for one millisecond, `0.001 * 0.001`.
pub const MILLISECOND_DISTANCE_PER_TEMPO_UNIT: f64 = 0.001 * 0.001;

/// Sampling interval of dense traces, one millisecond.
pub const DEFAULT_FRAME_INTERVAL: f64 = 0.001;

// in frames, absorbs the rounding error of `until / frame`
const FRAME_TOLERANCE: f64 = 1e-9;

/// Configuration of [`ScrollPositionEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollConfig {
    /// Scale from the integrated tempo to the scroll distance.
    pub distance_per_tempo_unit: f64,
    /// Time between two samples of [`ScrollPositionEngine::trace`].
    pub frame_interval: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            distance_per_tempo_unit: DEFAULT_DISTANCE_PER_TEMPO_UNIT,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

/// Position of a note at a sample time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollPosition {
    /// The note is approaching, at the distance from the judgment line. `0.0` at its touch time.
    Approaching(f64),
    /// The sample time is after the touch time, the note has already resolved.
    Past,
}

impl ScrollPosition {
    /// The distance if the note is still approaching.
    #[must_use]
    pub const fn distance(self) -> Option<f64> {
        match self {
            Self::Approaching(distance) => Some(distance),
            Self::Past => None,
        }
    }
}

/// A sample of a dense position trace.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceSample {
    /// The sample time.
    pub time: f64,
    /// The distance from the judgment line.
    pub distance: f64,
}

/// Computes scroll positions of notes against their timing group's timeline.
///
/// Every query integrates independently, so positions don't drift however many samples are taken.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollPositionEngine {
    config: ScrollConfig,
}

impl ScrollPositionEngine {
    /// Creates a new engine with the configuration.
    #[must_use]
    pub const fn new(config: ScrollConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Position of a note touching at `touch_time`, seen at `sample_time`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoTimelineDefined`] if `timeline` has no anchor.
    pub fn position_at(
        &self,
        timeline: &BpmTimeline,
        touch_time: f64,
        sample_time: f64,
    ) -> Result<ScrollPosition, TimelineError> {
        let distance = timeline.integrate(sample_time, touch_time)?;
        if sample_time > touch_time {
            return Ok(ScrollPosition::Past);
        }
        Ok(ScrollPosition::Approaching(
            distance * self.config.distance_per_tempo_unit,
        ))
    }

    /// Position of `note` at `sample_time`, measured to its touch time on `timeline`.
    ///
    /// `timeline` must be the one of the note's timing group.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoTimelineDefined`] if `timeline` has no anchor.
    pub fn position_of_note(
        &self,
        timeline: &BpmTimeline,
        note: &Note,
        sample_time: f64,
    ) -> Result<ScrollPosition, TimelineError> {
        self.position_at(timeline, note.touch_time(), sample_time)
    }

    /// Samples the position of a note every frame from time `0` until its touch time, or until
    /// `song_duration` if it comes earlier.
    ///
    /// The last sample is at the end time itself when it falls on a frame, so a trace up to the
    /// touch time ends at distance `0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoTimelineDefined`] if `timeline` has no anchor.
    pub fn trace(
        &self,
        timeline: &BpmTimeline,
        touch_time: f64,
        song_duration: Option<f64>,
    ) -> Result<Vec<TraceSample>, TimelineError> {
        if timeline.is_empty() {
            return Err(TimelineError::NoTimelineDefined);
        }
        let until = song_duration.map_or(touch_time, |duration| duration.min(touch_time));
        let frame = self.config.frame_interval;
        if until < 0.0 || frame <= 0.0 {
            return Ok(Vec::new());
        }
        let quotient = until / frame;
        let frames = if (quotient - quotient.round()).abs() < FRAME_TOLERANCE {
            quotient.round()
        } else {
            quotient.floor()
        };
        (0..=frames as u64)
            .map(|k| {
                let time = k as f64 * frame;
                let time = if (time - until).abs() < FRAME_TOLERANCE * frame {
                    until
                } else {
                    time
                };
                let distance = timeline.integrate(time, touch_time)?
                    * self.config.distance_per_tempo_unit;
                Ok(TraceSample { time, distance })
            })
            .collect()
    }
}
