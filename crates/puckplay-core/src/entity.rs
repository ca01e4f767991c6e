//! Tracked entities: the puck and the skaters

use crate::geometry::{CoordinateMapper, RinkPoint};
use serde::{Deserialize, Serialize};

/// A tracked object inside a frame, in raw feed coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// The puck (feed id `"1"`)
    Puck { x: f64, y: f64 },
    /// Any other tracked id
    Skater(Skater),
}

impl Entity {
    /// Raw feed position
    pub fn raw_position(&self) -> (f64, f64) {
        match self {
            Entity::Puck { x, y } => (*x, *y),
            Entity::Skater(s) => (s.x, s.y),
        }
    }

    /// Position on the normalized rink
    pub fn position(&self, mapper: &CoordinateMapper) -> RinkPoint {
        let (x, y) = self.raw_position();
        mapper.map(x, y)
    }

    /// Get the skater data if this is a skater
    pub fn as_skater(&self) -> Option<&Skater> {
        match self {
            Entity::Skater(s) => Some(s),
            Entity::Puck { .. } => None,
        }
    }
}

/// A skater record with its identity metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skater {
    pub x: f64,
    pub y: f64,
    /// Team abbreviation, empty when the feed omits it
    pub team_code: String,
    /// Sweater number as text, empty when the feed omits it
    pub jersey_number: String,
    pub display_name: Option<String>,
}
