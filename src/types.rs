use std::time::Instant;

use serde::{Deserialize, Serialize};

pub const NUM_LANDMARKS: usize = 21;

/// A pixel-space point. `(0, 0)` doubles as the "no point" sentinel in the
/// motion history.
pub type Point = (i32, i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    #[serde(rename = "L", alias = "Left")]
    Left,
    #[serde(rename = "R", alias = "Right")]
    Right,
}

impl Handedness {
    pub fn label(&self) -> &'static str {
        match self {
            Handedness::Left => "L",
            Handedness::Right => "R",
        }
    }
}

/// The 21 ordered landmarks of one detected hand, in frame pixels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub landmarks: [Point; NUM_LANDMARKS],
    pub handedness: Handedness,
}

impl LandmarkSet {
    pub fn point(&self, index: usize) -> Option<Point> {
        self.landmarks.get(index).copied()
    }
}

/// Everything the external detector hands over for one captured frame.
#[derive(Clone, Debug)]
pub struct HandObservation {
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
    pub hand: Option<LandmarkSet>,
}

/// A classifier id together with the label it resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GestureReading {
    pub id: usize,
    pub label: String,
}

impl GestureReading {
    pub fn display_text(&self) -> String {
        format!("{} (#{})", self.label, self.id)
    }
}
