//! Frames and the validated frame store
//!
//! [`FrameStore::load`] is the single validation gate for tracking data: once
//! a store exists, every frame in it is well formed, so playback never has to
//! recover from a malformed frame.

use crate::entity::{Entity, Skater};
use crate::error::{Error, ParseError, Result};
use crate::identity::EntityId;
use crate::raw::{RawEntity, RawFrame};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One timestamped snapshot of every tracked entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Position in the sequence, `0..len`
    pub index: usize,
    /// The feed's own frame number
    pub source_ordinal: u64,
    /// Feed time in seconds
    pub timestamp_seconds: f64,
    /// Entities in feed order
    pub entities: IndexMap<EntityId, Entity>,
}

impl Frame {
    /// The puck, if it was tracked in this frame
    pub fn puck(&self) -> Option<&Entity> {
        self.entities.get(EntityId::PUCK)
    }

    /// Iterate over skaters with their ids
    pub fn skaters(&self) -> impl Iterator<Item = (&EntityId, &Skater)> {
        self.entities
            .iter()
            .filter_map(|(id, e)| e.as_skater().map(|s| (id, s)))
    }

    /// Number of tracked entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

/// Ordered, non-empty, validated frame sequence
///
/// # Example
///
/// ```
/// use puckplay_core::{FrameStore, RawFrame};
///
/// let store = FrameStore::load(vec![
///     RawFrame::new(0.0).with_puck(1200.0, 510.0),
///     RawFrame::new(0.1).with_puck(1210.0, 510.0),
/// ])
/// .unwrap();
///
/// assert_eq!(store.len(), 2);
/// assert!(store.frame_at(1).is_ok());
/// assert!(store.frame_at(2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStore {
    frames: Vec<Frame>,
}

impl FrameStore {
    /// Validate raw feed records into a frame store
    ///
    /// All-or-nothing: the first invalid frame rejects the whole input.
    pub fn load(raw: Vec<RawFrame>) -> std::result::Result<Self, ParseError> {
        if raw.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut frames = Vec::with_capacity(raw.len());
        let mut previous: Option<(u64, f64)> = None;

        for (index, record) in raw.into_iter().enumerate() {
            let time = record.time.ok_or_else(|| missing(index, "time"))?;
            if !time.is_finite() || time < 0.0 {
                return Err(invalid(index, "time", format!("{} is not a valid time", time)));
            }

            let ordinal = match record.frame {
                Some(n) if n < 0 => {
                    return Err(invalid(index, "frame", format!("{} is negative", n)));
                }
                Some(n) => n as u64,
                None => previous.map(|(o, _)| o + 1).unwrap_or(0),
            };

            if let Some((prev_ordinal, prev_time)) = previous {
                if time < prev_time {
                    return Err(ParseError::NonMonotonicTime {
                        frame: index,
                        previous: prev_time,
                        current: time,
                    });
                }
                if ordinal <= prev_ordinal {
                    return Err(ParseError::NonMonotonicOrdinal {
                        frame: index,
                        previous: prev_ordinal,
                        current: ordinal,
                    });
                }
            }

            let on_ice = record.on_ice.ok_or_else(|| missing(index, "onIce"))?;
            let mut entities = IndexMap::with_capacity(on_ice.len());
            for (key, value) in on_ice {
                let id = EntityId::new(key);
                let entity = build_entity(index, &id, value)?;
                entities.insert(id, entity);
            }

            previous = Some((ordinal, time));
            frames.push(Frame {
                index,
                source_ordinal: ordinal,
                timestamp_seconds: time,
                entities,
            });
        }

        log::debug!("validated {} frames", frames.len());
        Ok(Self { frames })
    }

    /// Get the frame at `index`
    ///
    /// Never clamps: an out-of-range index is a caller bug.
    pub fn frame_at(&self, index: usize) -> Result<&Frame> {
        self.frames.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.frames.len(),
        })
    }

    /// Number of frames (always at least one)
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for the `len` convention
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the final frame
    pub fn last_index(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// Clamp an arbitrary signed index into `[0, len - 1]`
    pub fn clamp_index(&self, index: i64) -> usize {
        index.clamp(0, self.last_index() as i64) as usize
    }

    /// All frames in order
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Iterate over the frames in order
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Time of frame `index` relative to the first frame
    pub fn elapsed_at(&self, index: usize) -> Result<f64> {
        let first = self.frame_at(0)?.timestamp_seconds;
        Ok(self.frame_at(index)?.timestamp_seconds - first)
    }

    /// Span between the first and the last frame
    pub fn duration_seconds(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.timestamp_seconds - first.timestamp_seconds,
            _ => 0.0,
        }
    }
}

fn missing(frame: usize, field: &str) -> ParseError {
    ParseError::MissingField {
        frame,
        field: field.to_string(),
    }
}

fn invalid(frame: usize, field: &str, reason: String) -> ParseError {
    ParseError::InvalidField {
        frame,
        field: field.to_string(),
        reason,
    }
}

fn build_entity(frame: usize, id: &EntityId, record: RawEntity) -> std::result::Result<Entity, ParseError> {
    let coord = |value: Option<f64>, axis: &str| {
        let field = format!("onIce.{}.{}", id, axis);
        match value {
            None => Err(missing(frame, &field)),
            Some(v) if !v.is_finite() => Err(invalid(frame, &field, format!("{} is not finite", v))),
            Some(v) => Ok(v),
        }
    };
    let x = coord(record.x, "x")?;
    let y = coord(record.y, "y")?;

    if id.is_puck() {
        return Ok(Entity::Puck { x, y });
    }

    Ok(Entity::Skater(Skater {
        x,
        y,
        team_code: record.team_abbrev.unwrap_or_default(),
        jersey_number: record
            .sweater_number
            .map(|n| n.to_string())
            .unwrap_or_default(),
        display_name: record.name,
    }))
}
