//! The assembled chart and its timing groups.

use std::collections::BTreeMap;

use crate::chart_process::scroll::{ScrollPosition, ScrollPositionEngine};

use super::{
    note::{Note, SkyNote},
    timeline::{BpmTimeline, TimelineError},
};

/// A timing group, a sub-chart with its own tempo timeline.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingGroup {
    index: usize,
    attributes: Vec<String>,
    timeline: BpmTimeline,
    notes: Vec<Note>,
}

impl TimingGroup {
    /// Creates an empty timing group.
    #[must_use]
    pub const fn new(index: usize, attributes: Vec<String>) -> Self {
        Self {
            index,
            attributes,
            timeline: BpmTimeline::new(),
            notes: Vec::new(),
        }
    }

    /// Zero-based index in declaration order, `0` for the default group.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Attributes declared on the group, such as `noinput`.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Whether the group declares the attribute.
    #[must_use]
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|declared| declared == attribute)
    }

    /// The tempo timeline of the group.
    #[must_use]
    pub const fn timeline(&self) -> &BpmTimeline {
        &self.timeline
    }

    /// Notes in declaration order.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub(crate) const fn timeline_mut(&mut self) -> &mut BpmTimeline {
        &mut self.timeline
    }

    pub(crate) fn push_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Sky notes of the group, the declared ones followed by the arc-taps of each arc.
    pub fn sky_notes(&self) -> impl Iterator<Item = SkyNote> + '_ {
        let declared = self.notes.iter().filter_map(|note| match note {
            Note::SkyNote(sky_note) => Some(*sky_note),
            _ => None,
        });
        let arc_taps = self
            .notes
            .iter()
            .filter_map(|note| match note {
                Note::Arc(arc) => Some(arc),
                _ => None,
            })
            .flat_map(|arc| arc.sky_notes());
        declared.chain(arc_taps)
    }

    /// Position of the note at `note_index` at `sample_time`, or `None` if there is no such note.
    pub fn position_of(
        &self,
        engine: &ScrollPositionEngine,
        note_index: usize,
        sample_time: f64,
    ) -> Option<Result<ScrollPosition, TimelineError>> {
        self.notes
            .get(note_index)
            .map(|note| engine.position_of_note(&self.timeline, note, sample_time))
    }

    /// Positions of all the notes at `sample_time`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoTimelineDefined`] if the group has notes but no tempo anchor.
    pub fn positions_at(
        &self,
        engine: &ScrollPositionEngine,
        sample_time: f64,
    ) -> Result<Vec<ScrollPosition>, TimelineError> {
        self.notes
            .iter()
            .map(|note| engine.position_of_note(&self.timeline, note, sample_time))
            .collect()
    }
}

/// A parsed chart.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chart {
    /// The audio offset in milliseconds, `0` if not declared.
    pub offset: i64,
    /// Header values other than the audio offset.
    pub headers: BTreeMap<String, String>,
    /// The timing groups in index order. Group `0` always exists.
    pub groups: Vec<TimingGroup>,
}

impl Chart {
    /// The timing group at `index`.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&TimingGroup> {
        self.groups.get(index)
    }

    /// All the notes with their timing group index, group by group.
    pub fn notes(&self) -> impl Iterator<Item = (usize, &Note)> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.notes.iter().map(move |note| (group.index, note)))
    }
}
