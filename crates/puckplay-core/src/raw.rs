//! Raw feed records, as deserialized before validation
//!
//! Every field is optional here so that [`FrameStore::load`](crate::FrameStore::load)
//! can report exactly which frame and field is missing instead of a generic
//! deserialization failure.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One frame record from the tracking feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFrame {
    /// Feed frame ordinal (derived from position when absent)
    #[serde(default, alias = "frame_index")]
    pub frame: Option<i64>,
    /// Frame time in seconds
    #[serde(default, alias = "time_seconds")]
    pub time: Option<f64>,
    /// Tracked entities keyed by feed id
    #[serde(default, alias = "on_ice")]
    pub on_ice: Option<IndexMap<String, RawEntity>>,
}

impl RawFrame {
    /// Create a frame record with a time and no entities
    pub fn new(time: f64) -> Self {
        Self {
            frame: None,
            time: Some(time),
            on_ice: Some(IndexMap::new()),
        }
    }

    /// Set the feed ordinal
    pub fn with_ordinal(mut self, ordinal: i64) -> Self {
        self.frame = Some(ordinal);
        self
    }

    /// Add the puck at a raw position
    pub fn with_puck(self, x: f64, y: f64) -> Self {
        self.with_entity(crate::EntityId::PUCK, RawEntity::at(x, y))
    }

    /// Add a skater at a raw position
    pub fn with_skater(self, id: &str, x: f64, y: f64, team: &str, number: &str) -> Self {
        let mut record = RawEntity::at(x, y);
        record.team_abbrev = Some(team.to_string());
        record.sweater_number = Some(Label::Text(number.to_string()));
        self.with_entity(id, record)
    }

    /// Add an arbitrary entity record
    pub fn with_entity(mut self, id: &str, record: RawEntity) -> Self {
        self.on_ice
            .get_or_insert_with(IndexMap::new)
            .insert(id.to_string(), record);
        self
    }
}

/// One positional record inside a frame's `onIce` map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntity {
    #[serde(default)]
    pub id: Option<Label>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default, alias = "team_abbrev")]
    pub team_abbrev: Option<String>,
    #[serde(default, alias = "sweater_number")]
    pub sweater_number: Option<Label>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawEntity {
    /// Create a record at a raw position
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }
}

/// A feed value that may arrive as text or as a number (ids, sweater numbers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Number(i64),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(s) => write!(f, "{}", s),
            Label::Number(n) => write!(f, "{}", n),
        }
    }
}
