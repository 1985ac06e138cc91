use crate::ir::SourceRef;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn diagonal(&self) -> f64 {
        let w = self.width as f64;
        let h = self.height as f64;
        (w * w + h * h).sqrt()
    }

    /// Viewport minus `margin` on every side, never negative.
    pub fn inner(&self, margin: f32) -> Self {
        Self {
            width: (self.width - margin * 2.0).max(0.0),
            height: (self.height - margin * 2.0).max(0.0),
        }
    }

    /// The fixed-area working viewport matching this viewport's aspect ratio.
    pub fn working(&self, area_width: f32, area_height: f32) -> Self {
        let ratio = ((area_width as f64 * area_height as f64)
            / (self.width as f64 * self.height as f64))
            .sqrt();
        if !ratio.is_finite() {
            return Self::new(1.0, 1.0);
        }
        Self {
            width: (self.width as f64 * ratio) as f32,
            height: (self.height as f64 * ratio) as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned rectangle in working-viewport pixels, right/bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// Union extent of every word placed so far in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Borders {
    pub left: Point,
    pub right: Point,
}

/// De-duplicated word with its aggregated weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WordGroup {
    /// First-seen spelling.
    pub text: String,
    pub total_weight: f64,
    pub source_refs: Vec<SourceRef>,
    /// Source row of the first occurrence; drives color passthrough.
    pub representative_index: usize,
    /// Position among the surviving groups in first-seen order, before the
    /// weight sort. Rotation buckets are drawn by this index.
    pub seen_order: usize,
}

/// Mutable layout record of one word.
///
/// Geometry is in working-viewport pixels. `x0..x1` / `y0..y1` are relative
/// to `(x, y)`; the horizontal box stays centered, the vertical one is
/// trimmed to the inked rows once the sprite is extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct WordDataPoint {
    pub text: String,
    pub weight: f64,
    pub font_size: f32,
    pub rotation: f32,
    pub x: i32,
    pub y: i32,
    pub x_off: i32,
    pub y_off: i32,
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    /// Slot width, always a multiple of 32.
    pub width: i32,
    pub height: i32,
    pub padding: i32,
    /// Leftmost and one-past-rightmost inked column relative to `x`.
    pub ink_x0: i32,
    pub ink_x1: i32,
    pub measured_width: Option<f32>,
    /// Row-packed bitmask, `width / 32` integers per row; present only
    /// between rasterization and placement.
    pub sprite: Option<Vec<u32>>,
    pub source_refs: Vec<SourceRef>,
    pub word_index: usize,
}

impl WordDataPoint {
    pub fn new(group: &WordGroup, font_size: f32, rotation: f32, padding: i32) -> Self {
        Self {
            text: group.text.clone(),
            weight: group.total_weight,
            font_size,
            rotation,
            x: 0,
            y: 0,
            x_off: 0,
            y_off: 0,
            x0: 0,
            y0: 0,
            x1: 0,
            y1: 0,
            width: 0,
            height: 0,
            padding,
            ink_x0: 0,
            ink_x1: 0,
            measured_width: None,
            sprite: None,
            source_refs: group.source_refs.clone(),
            word_index: group.representative_index,
        }
    }

    /// Number of packed integers per sprite row.
    pub fn columns(&self) -> i32 {
        self.width >> 5
    }

    pub fn sprite_rows(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Collision box at the current position.
    pub fn rect(&self) -> Rect {
        Rect {
            left: self.x + self.x0,
            top: self.y + self.y0,
            right: self.x + self.x1,
            bottom: self.y + self.y1,
        }
    }

    /// Tight box around the inked pixels at the current position.
    pub fn ink_rect(&self) -> Rect {
        Rect {
            left: self.x + self.ink_x0,
            top: self.y + self.y0,
            right: self.x + self.ink_x1,
            bottom: self.y + self.y1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The sprite slot did not fit the rasterization canvas.
    OutsideCanvas,
    /// Rasterization produced no inked pixel.
    NoInk,
    /// The spiral walked past the viewport diagonal without a free slot.
    SpiralExhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementFailure {
    pub text: String,
    pub reason: FailureReason,
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCloudLayout {
    /// Placed words in placement order, positions relative to the working
    /// viewport center.
    pub words: Vec<WordDataPoint>,
    /// Union extent of the placed words in working-viewport coordinates
    /// (before centering).
    pub borders: Option<Borders>,
    pub viewport: Viewport,
    /// Words that were dropped, for diagnostics only.
    pub failures: Vec<PlacementFailure>,
}

impl WordCloudLayout {
    pub fn empty(viewport: Viewport) -> Self {
        Self {
            words: Vec::new(),
            borders: None,
            viewport,
            failures: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Union of the centered slot rectangles, `(x ± width/2, y ± height/2)`,
    /// as the renderer sees them.
    pub fn extent(&self) -> Option<(f32, f32, f32, f32)> {
        let mut iter = self.words.iter();
        let first = iter.next()?;
        let slot = |word: &WordDataPoint| {
            let hw = word.width as f32 / 2.0;
            let hh = word.height as f32 / 2.0;
            (
                word.x as f32 - hw,
                word.y as f32 - hh,
                word.x as f32 + hw,
                word.y as f32 + hh,
            )
        };
        let mut extent = slot(first);
        for word in iter {
            let (left, top, right, bottom) = slot(word);
            extent.0 = extent.0.min(left);
            extent.1 = extent.1.min(top);
            extent.2 = extent.2.max(right);
            extent.3 = extent.3.max(bottom);
        }
        Some(extent)
    }
}
