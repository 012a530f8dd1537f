//! Orientation classification of a video frame.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect class of a frame. Recomputed for every build, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// height > width (portrait)
    Tall,
    /// height == width
    Square,
    /// width > height (landscape)
    Wide,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [Orientation::Tall, Orientation::Square, Orientation::Wide];

    /// Classify a frame by comparing height against width.
    pub fn classify(width: u32, height: u32) -> Self {
        use std::cmp::Ordering;

        match height.cmp(&width) {
            Ordering::Greater => Orientation::Tall,
            Ordering::Equal => Orientation::Square,
            Ordering::Less => Orientation::Wide,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tall => "tall",
            Self::Square => "square",
            Self::Wide => "wide",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`Orientation::classify`].
pub fn classify(width: u32, height: u32) -> Orientation {
    Orientation::classify(width, height)
}
