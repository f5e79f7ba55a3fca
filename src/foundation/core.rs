use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{SlotframeError, SlotframeResult};

pub use kurbo::{Affine, BezPath, Rect, RoundedRect, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> SlotframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlotframeError::invalid_input(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Canvas bounds as a floating-point rectangle anchored at the origin.
    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Fixed output height shared by every layout.
pub const LAYOUT_HEIGHT: u32 = 1800;

/// Slot count and output size combination selected by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LayoutType {
    /// Two stacked slots on a 900x1800 canvas.
    #[serde(rename = "2-slot")]
    TwoSlot,
    /// Three stacked slots on a 600x1800 canvas.
    #[serde(rename = "3-slot")]
    ThreeSlot,
    /// Four stacked slots on a 450x1800 canvas.
    #[serde(rename = "4-slot")]
    FourSlot,
}

impl LayoutType {
    /// All layouts, in ascending slot count.
    pub const ALL: [LayoutType; 3] = [Self::TwoSlot, Self::ThreeSlot, Self::FourSlot];

    /// Number of photos the layout holds.
    pub fn expected_slots(self) -> usize {
        match self {
            Self::TwoSlot => 2,
            Self::ThreeSlot => 3,
            Self::FourSlot => 4,
        }
    }

    /// Fixed output canvas. Width narrows as slot count grows; height is always 1800.
    pub fn canvas(self) -> Canvas {
        let width = match self {
            Self::TwoSlot => 900,
            Self::ThreeSlot => 600,
            Self::FourSlot => 450,
        };
        Canvas {
            width,
            height: LAYOUT_HEIGHT,
        }
    }

    /// Look up the layout holding exactly `slots` photos.
    pub fn from_slot_count(slots: usize) -> SlotframeResult<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.expected_slots() == slots)
            .ok_or_else(|| {
                SlotframeError::invalid_input(format!("no layout holds {slots} photos"))
            })
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-slot", self.expected_slots())
    }
}

impl FromStr for LayoutType {
    type Err = SlotframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        let head = norm
            .strip_suffix("-slot")
            .or_else(|| norm.strip_suffix("slot"))
            .unwrap_or(&norm)
            .trim_end_matches(['-', '_', ' ']);
        match head {
            "2" | "two" => Ok(Self::TwoSlot),
            "3" | "three" => Ok(Self::ThreeSlot),
            "4" | "four" => Ok(Self::FourSlot),
            _ => Err(SlotframeError::invalid_input(format!(
                "unknown layout '{s}' (expected 2-slot, 3-slot or 4-slot)"
            ))),
        }
    }
}

/// Integer pixel rectangle inside the output canvas where one photo is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SlotRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl SlotRect {
    /// Create a slot rectangle.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    pub fn right(self) -> u32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Area in pixels.
    pub fn area(self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// Length of the shorter side.
    pub fn shorter_side(self) -> u32 {
        self.w.min(self.h)
    }

    /// Return `true` when the rectangle lies entirely inside `canvas`.
    pub fn fits_within(self, canvas: Canvas) -> bool {
        self.right() <= canvas.width && self.bottom() <= canvas.height
    }

    /// Floating-point view used for drawing.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }
}

/// Which path produced the slot geometry of a composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    /// Slots were found by scanning the frame's alpha channel.
    Detected,
    /// Detection found the wrong count; evenly spaced slots were generated instead.
    Fallback,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
