use super::text::{
    BOX_ASCENT, BOX_DESCENT, DRAW_FONT_SIZE_OFFSET, fallback_text_width, text_width,
    word_slot_width,
};
use super::{FailureReason, WordDataPoint};

/// Off-screen 8-bit alpha buffer shared by every sprite batch of a pass.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.alpha.fill(0);
    }

    pub fn is_inked(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.alpha[y * self.width + x] != 0
    }

    /// Raises the alpha at `(x, y)` to at least `value`; out-of-bounds
    /// writes are ignored.
    pub fn mark(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let cell = &mut self.alpha[y * self.width + x];
        *cell = (*cell).max(value);
    }

    /// Copies a `width x height` coverage block whose top-left corner lands
    /// at `(x, y)`.
    pub fn blit(&mut self, x: i64, y: i64, width: usize, height: usize, coverage: &[u8]) {
        for row in 0..height {
            for col in 0..width {
                let value = coverage[row * width + col];
                if value != 0 {
                    self.mark(x + col as i64, y + row as i64, value);
                }
            }
        }
    }
}

/// A canvas rectangle reserved for one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Slot {
    pub fn center(&self) -> (f32, f32) {
        (
            (self.x + (self.width >> 1)) as f32,
            (self.y + (self.height >> 1)) as f32,
        )
    }
}

/// One word to draw: filled text, centered on the slot center at the
/// alphabetic baseline and rotated around it.
#[derive(Debug, Clone, Copy)]
pub struct GlyphRun<'a> {
    pub text: &'a str,
    /// Size the text is drawn at (one pixel above the nominal size).
    pub font_size: f32,
    pub rotation: f32,
    /// Advance width of `text` at `font_size`.
    pub advance: f32,
    /// Outline stroke half-width; 0 disables the stroke.
    pub padding: f32,
    pub slot: Slot,
}

/// Drawing capability used to turn words into collision sprites.
pub trait TextRasterizer {
    /// Advance width of `text` at `font_size` pixels.
    fn measure(&mut self, text: &str, font_size: f32) -> f32;

    /// Draws every run onto `canvas`. Ink must stay inside the run's slot.
    fn rasterize(&mut self, canvas: &mut Canvas, runs: &[GlyphRun<'_>]);
}

impl<T: TextRasterizer + ?Sized> TextRasterizer for &mut T {
    fn measure(&mut self, text: &str, font_size: f32) -> f32 {
        (**self).measure(text, font_size)
    }

    fn rasterize(&mut self, canvas: &mut Canvas, runs: &[GlyphRun<'_>]) {
        (**self).rasterize(canvas, runs)
    }
}

/// Draws each word as one solid rotated box spanning its advance width and
/// the ascent/descent of the font size.
#[derive(Debug, Clone, Default)]
pub struct BoxRasterizer {
    font_family: Option<String>,
}

impl BoxRasterizer {
    /// Measures with the built-in per-character table only, so results do
    /// not depend on the fonts installed on the host.
    pub fn new() -> Self {
        Self { font_family: None }
    }

    /// Measures with the system font matching `font_family`, falling back
    /// to the built-in table.
    pub fn with_font(font_family: impl Into<String>) -> Self {
        Self {
            font_family: Some(font_family.into()),
        }
    }
}

impl TextRasterizer for BoxRasterizer {
    fn measure(&mut self, text: &str, font_size: f32) -> f32 {
        match self.font_family.as_deref() {
            Some(family) => text_width(text, font_size, family, false),
            None => fallback_text_width(text, font_size),
        }
    }

    fn rasterize(&mut self, canvas: &mut Canvas, runs: &[GlyphRun<'_>]) {
        for run in runs {
            draw_box(canvas, run);
        }
    }
}

fn draw_box(canvas: &mut Canvas, run: &GlyphRun<'_>) {
    let (cx, cy) = run.slot.center();
    let half = run.advance / 2.0 + run.padding;
    let top = -BOX_ASCENT * run.font_size - run.padding;
    let bottom = BOX_DESCENT * run.font_size + run.padding;
    let (sin, cos) = run.rotation.to_radians().sin_cos();

    for py in run.slot.y..run.slot.y + run.slot.height {
        for px in run.slot.x..run.slot.x + run.slot.width {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            // Undo the rotation to test against the upright box.
            let lx = dx * cos + dy * sin;
            let ly = -dx * sin + dy * cos;
            if lx >= -half && lx < half && ly >= top && ly < bottom {
                canvas.mark(px as i64, py as i64, 0xff);
            }
        }
    }
}

#[cfg(feature = "raster")]
pub use glyph::GlyphRasterizer;

#[cfg(feature = "raster")]
mod glyph {
    use resvg::tiny_skia::{FillRule, Mask, PathBuilder, Stroke, Transform};
    use ttf_parser::OutlineBuilder;

    use super::{Canvas, GlyphRun, TextRasterizer, draw_box};
    use crate::layout::text::text_width;
    use crate::text_metrics;

    /// Rasterizes real glyph outlines of a system font with tiny-skia.
    /// Runs whose font cannot be loaded are drawn as boxes instead.
    #[derive(Debug, Clone)]
    pub struct GlyphRasterizer {
        font_family: String,
    }

    impl GlyphRasterizer {
        pub fn new(font_family: impl Into<String>) -> Self {
            Self {
                font_family: font_family.into(),
            }
        }
    }

    impl TextRasterizer for GlyphRasterizer {
        fn measure(&mut self, text: &str, font_size: f32) -> f32 {
            text_width(text, font_size, &self.font_family, false)
        }

        fn rasterize(&mut self, canvas: &mut Canvas, runs: &[GlyphRun<'_>]) {
            for run in runs {
                if !self.draw_outline(canvas, run) {
                    draw_box(canvas, run);
                }
            }
        }
    }

    impl GlyphRasterizer {
        fn draw_outline(&self, canvas: &mut Canvas, run: &GlyphRun<'_>) -> bool {
            let slot = run.slot;
            if slot.width <= 0 || slot.height <= 0 {
                return true;
            }
            let mut sink = PathSink(PathBuilder::new());
            let origin = -run.advance / 2.0;
            if text_metrics::outline_text(run.text, run.font_size, &self.font_family, origin, &mut sink)
                .is_none()
            {
                return false;
            }
            // Whitespace-only text has no outline and no ink.
            let Some(path) = sink.0.finish() else {
                return true;
            };
            let Some(mut mask) = Mask::new(slot.width as u32, slot.height as u32) else {
                return false;
            };

            let (cx, cy) = slot.center();
            let transform = Transform::from_translate(cx - slot.x as f32, cy - slot.y as f32)
                .pre_concat(Transform::from_rotate(run.rotation));
            mask.fill_path(&path, FillRule::Winding, true, transform);
            if run.padding > 0.0 {
                let stroke = Stroke {
                    width: run.padding * 2.0,
                    ..Stroke::default()
                };
                if let Some(outline) = path.stroke(&stroke, 1.0) {
                    mask.fill_path(&outline, FillRule::Winding, true, transform);
                }
            }
            canvas.blit(
                slot.x as i64,
                slot.y as i64,
                slot.width as usize,
                slot.height as usize,
                mask.data(),
            );
            true
        }
    }

    struct PathSink(PathBuilder);

    impl OutlineBuilder for PathSink {
        fn move_to(&mut self, x: f32, y: f32) {
            self.0.move_to(x, y);
        }

        fn line_to(&mut self, x: f32, y: f32) {
            self.0.line_to(x, y);
        }

        fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
            self.0.quad_to(x1, y1, x, y);
        }

        fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
            self.0.cubic_to(x1, y1, x2, y2, x, y);
        }

        fn close(&mut self) {
            self.0.close();
        }
    }
}

/// Measures `word` (once) and returns its slot size: the rotated bounding
/// box of `(advance + 2) x (2 * font_size)`, width rounded up to 32 pixels.
pub fn measure_slot(word: &mut WordDataPoint, rasterizer: &mut dyn TextRasterizer) -> (i32, i32) {
    let measured = match word.measured_width {
        Some(width) => width,
        None => {
            let width = rasterizer.measure(&word.text, word.font_size + DRAW_FONT_SIZE_OFFSET);
            word.measured_width = Some(width);
            width
        }
    };
    let base_width = word_slot_width(measured) as f64;
    let base_height = ((word.font_size as i64) << 1) as f64;

    if word.rotation != 0.0 {
        let (sin, cos) = (word.rotation as f64).to_radians().sin_cos();
        let width_cos = base_width * cos;
        let width_sin = base_width * sin;
        let height_cos = base_height * cos;
        let height_sin = base_height * sin;
        let width = (width_cos + height_sin)
            .abs()
            .max((width_cos - height_sin).abs());
        let height = (width_sin + height_cos)
            .abs()
            .max((width_sin - height_cos).abs());
        (round_up_32(width), clamp_pixels(height.floor()))
    } else {
        (round_up_32(base_width), clamp_pixels(base_height))
    }
}

/// Largest slot side in pixels.
const MAX_SLOT_SIZE: i32 = 1 << 24;

fn clamp_pixels(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, MAX_SLOT_SIZE as f64) as i32
}

fn round_up_32(value: f64) -> i32 {
    (clamp_pixels(value + 31.0) >> 5) << 5
}

/// Rasterizes `words[start..]` in one canvas batch and stores a trimmed
/// sprite on every word that fits. Returns why `words[start]` got no
/// sprite, if it did not. Words packed past the canvas bottom keep no
/// slot; they get their own batch when the placement loop reaches them.
pub fn generate_sprites(
    words: &mut [WordDataPoint],
    start: usize,
    canvas: &mut Canvas,
    rasterizer: &mut dyn TextRasterizer,
) -> Option<FailureReason> {
    canvas.clear();
    let canvas_width = canvas.width() as i32;
    let canvas_height = canvas.height() as i32;

    let mut slots: Vec<(usize, Slot)> = Vec::new();
    let (mut x, mut y, mut row_height) = (0i32, 0i32, 0i32);
    for (index, word) in words.iter_mut().enumerate().skip(start) {
        word.sprite = None;
        let (width, height) = measure_slot(word, rasterizer);
        if x.saturating_add(width) >= canvas_width {
            x = 0;
            y = y.saturating_add(row_height);
            row_height = 0;
        }
        if y >= canvas_height {
            break;
        }
        row_height = row_height.max(height);

        word.width = width;
        word.height = height;
        word.x_off = x;
        word.y_off = y;
        word.x1 = width >> 1;
        word.y1 = height >> 1;
        word.x0 = -word.x1;
        word.y0 = -word.y1;
        slots.push((
            index,
            Slot {
                x,
                y,
                width,
                height,
            },
        ));
        x = x.saturating_add(width);
    }

    let fits = |slot: &Slot| {
        slot.x.saturating_add(slot.width) < canvas_width
            && slot.y.saturating_add(slot.height) < canvas_height
    };
    let runs: Vec<GlyphRun<'_>> = slots
        .iter()
        .filter(|(_, slot)| fits(slot))
        .map(|&(index, slot)| {
            let word = &words[index];
            GlyphRun {
                text: &word.text,
                font_size: word.font_size + DRAW_FONT_SIZE_OFFSET,
                rotation: word.rotation,
                advance: word.measured_width.unwrap_or_default(),
                padding: word.padding as f32,
                slot,
            }
        })
        .collect();
    rasterizer.rasterize(canvas, &runs);
    tracing::debug!(
        start,
        slots = slots.len(),
        drawn = runs.len(),
        rows_used = y.saturating_add(row_height),
        "rasterized sprite batch"
    );

    let mut head_failure = None;
    for (index, slot) in slots {
        let word = &mut words[index];
        let reason = if fits(&slot) {
            extract_sprite(word, canvas).err()
        } else {
            Some(FailureReason::OutsideCanvas)
        };
        if index == start {
            head_failure = reason;
        }
    }
    head_failure
}

/// Reads the word's slot back into a row-packed bitmask, trimming empty
/// rows at the top and bottom.
fn extract_sprite(word: &mut WordDataPoint, canvas: &Canvas) -> Result<(), FailureReason> {
    let width = word.width as usize;
    let columns = width >> 5;
    let height = (word.y1 - word.y0) as usize;
    let origin_x = word.x_off as usize;
    let origin_y = word.y_off as usize;

    let mut sprite: Vec<u32> = Vec::with_capacity(columns * height);
    let mut first_row: Option<usize> = None;
    let mut last_row = 0usize;
    let mut ink_left = usize::MAX;
    let mut ink_right = 0usize;

    for row in 0..height {
        let mut bits = vec![0u32; columns];
        let mut inked = false;
        for col in 0..width {
            if canvas.is_inked(origin_x + col, origin_y + row) {
                bits[col >> 5] |= 1 << (31 - (col & 31));
                inked = true;
                ink_left = ink_left.min(col);
                ink_right = ink_right.max(col + 1);
            }
        }
        if first_row.is_none() {
            if !inked {
                continue;
            }
            first_row = Some(row);
        }
        if inked {
            last_row = row;
        }
        sprite.extend_from_slice(&bits);
    }

    let Some(first_row) = first_row else {
        return Err(FailureReason::NoInk);
    };
    let rows = last_row - first_row + 1;
    sprite.truncate(rows * columns);

    word.y0 += first_row as i32;
    word.y1 = word.y0 + rows as i32;
    word.ink_x0 = word.x0 + ink_left as i32;
    word.ink_x1 = word.x0 + ink_right as i32;
    word.sprite = Some(sprite);
    Ok(())
}
