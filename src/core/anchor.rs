//! Fixed ranging anchors.
//!
//! Anchors are the stationary reference points the range pipeline
//! measures against. A session uses a static set of four, laid out at
//! the corners of a square around the world origin. Anchor #1 is the
//! reference anchor for the autonomy snap.

use serde::{Deserialize, Serialize};

use super::Point3;

/// A fixed anchor with a stable identifier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Anchor identifier (1-based, stable for the session)
    pub id: u8,
    /// Anchor position in absolute coordinates
    pub position: Point3,
}

impl Anchor {
    /// Create a new anchor
    #[inline]
    pub fn new(id: u8, position: Point3) -> Self {
        Self { id, position }
    }
}

/// The static anchor set for a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorSet {
    anchors: Vec<Anchor>,
}

impl AnchorSet {
    /// Build the default layout: four anchors at the corners of a square
    /// of the given half extent, numbered 1..=4 counter-clockwise
    /// starting at (-e, -e).
    pub fn square(half_extent: f32) -> Self {
        let e = half_extent;
        Self {
            anchors: vec![
                Anchor::new(1, Point3::new(-e, -e, 0.0)),
                Anchor::new(2, Point3::new(e, -e, 0.0)),
                Anchor::new(3, Point3::new(e, e, 0.0)),
                Anchor::new(4, Point3::new(-e, e, 0.0)),
            ],
        }
    }

    /// Build a set from explicit anchors.
    pub fn from_anchors(anchors: Vec<Anchor>) -> Self {
        Self { anchors }
    }

    /// Look up an anchor by identifier.
    pub fn get(&self, id: u8) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.id == id)
    }

    /// The reference anchor (anchor #1), used to anchor the autonomy
    /// snap. Falls back to the first anchor if #1 is absent.
    pub fn reference(&self) -> Option<&Anchor> {
        self.get(1).or_else(|| self.anchors.first())
    }

    /// Iterate over the anchors in id order as constructed.
    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    /// Number of anchors in the set.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
