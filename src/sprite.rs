//! Maps actor frames onto sprite-sheet blits and computes the wall-clock hand.
//! Pure geometry; the host does the drawing.

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Source cell on the sheet and where it lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blit {
    pub src: Rect,
    pub dst: Rect,
}

/// A horizontal strip of equally sized cells drawn at a fixed spot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSheet {
    pub cell_w: f64,
    pub cell_h: f64,
    pub dst: Rect,
}

impl SpriteSheet {
    pub const WORKER: SpriteSheet = SpriteSheet {
        cell_w: 120.0,
        cell_h: 150.0,
        dst: Rect::new(210.0, 163.0, 120.0, 150.0),
    };

    pub const SUPERVISOR: SpriteSheet = SpriteSheet {
        cell_w: 150.0,
        cell_h: 150.0,
        dst: Rect::new(50.0, 75.0, 150.0, 150.0),
    };

    pub fn blit(&self, frame: u32) -> Blit {
        Blit {
            src: Rect::new(f64::from(frame) * self.cell_w, 0.0, self.cell_w, self.cell_h),
            dst: self.dst,
        }
    }
}

/// Hand of the wall clock, one full turn every twelve in-game hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockHand {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl ClockHand {
    pub const CENTER: (f64, f64) = (252.0, 67.0);
    pub const LENGTH: f64 = 20.0;
    pub const WIDTH: f64 = 2.0;
    pub const COLOR: &'static str = "black";

    /// Unlike the hour bucket, the hand moves continuously.
    pub fn at(active_ms: f64, ms_per_hour: f64) -> Self {
        let hour = if ms_per_hour > 0.0 { active_ms / ms_per_hour } else { 0.0 };
        let angle = PI * hour / 6.0;
        let (cx, cy) = Self::CENTER;
        Self {
            from: (cx, cy),
            to: (cx + Self::LENGTH * angle.sin(), cy - Self::LENGTH * angle.cos()),
        }
    }
}
