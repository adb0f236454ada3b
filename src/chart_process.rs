//! Chart processing module.
//!
//! Turns a parsed [`crate::aff::model::Chart`] into values needed on playback. Currently this is
//! the scroll position of each note, see [`scroll::ScrollPositionEngine`].

pub mod scroll;

pub use self::scroll::{
    ScrollConfig, ScrollPosition, ScrollPositionEngine, TraceSample,
    DEFAULT_DISTANCE_PER_TEMPO_UNIT, DEFAULT_FRAME_INTERVAL, MILLISECOND_DISTANCE_PER_TEMPO_UNIT,
};
