mod font_size;
pub(crate) mod placement;
pub mod random;
pub mod sprite;
pub(crate) mod text;
pub(crate) mod types;
pub mod words;

pub use font_size::{font_size_for, rotation_for, size_words};
pub use placement::OccupancyGrid;
pub use random::{CycledSequence, PreparedRandoms, RandomSource};
#[cfg(feature = "raster")]
pub use sprite::GlyphRasterizer;
pub use sprite::{BoxRasterizer, Canvas, GlyphRun, Slot, TextRasterizer};
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::WordList;
use placement::Placer;
use sprite::{generate_sprites, measure_slot};
use words::{build_exclusions, reduce_text};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid viewport {width}x{height}: dimensions must be finite and non-negative")]
    InvalidViewport { width: f32, height: f32 },
}

/// Lays out `list` inside `viewport` with the production random table.
pub fn compute_layout(
    list: &WordList,
    viewport: Viewport,
    config: &LayoutConfig,
    rasterizer: &mut dyn TextRasterizer,
) -> Result<WordCloudLayout, LayoutError> {
    compute_layout_with_random(list, viewport, config, rasterizer, &PreparedRandoms)
}

/// One full pass: aggregate, size, optionally pre-estimate, rasterize and
/// place. Degenerate input yields an empty layout; only an invalid viewport
/// is an error.
pub fn compute_layout_with_random(
    list: &WordList,
    viewport: Viewport,
    config: &LayoutConfig,
    rasterizer: &mut dyn TextRasterizer,
    random: &dyn RandomSource,
) -> Result<WordCloudLayout, LayoutError> {
    let (width, height) = (viewport.width, viewport.height);
    if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
        return Err(LayoutError::InvalidViewport { width, height });
    }
    let span = tracing::debug_span!("layout_pass", width, height, occurrences = list.occurrences.len());
    let _guard = span.enter();

    let config = config.clamped();
    let inner = viewport.inner(config.margin);
    if inner.is_empty() {
        tracing::debug!("viewport has no room inside the margin");
        return Ok(WordCloudLayout::empty(inner));
    }

    let exclusions = build_exclusions(&list.excluded, &config.general, &config.stop_words);
    let groups = reduce_text(&list.occurrences, &exclusions, &config.general);
    let working = inner.working(config.working_width, config.working_height);
    if groups.is_empty() {
        return Ok(WordCloudLayout::empty(working));
    }

    let mut words = size_words(&groups, &config, random);
    if config.performance.preestimate {
        let count = estimate_word_count(&mut words, working, config.performance.quality, rasterizer);
        tracing::debug!(count, total = words.len(), "pre-estimated word count");
        words.truncate(count);
    }

    let mut canvas = Canvas::new(config.canvas_width, config.canvas_height);
    let layout = place_words(words, working, &config, &mut canvas, rasterizer, random);
    tracing::debug!(
        placed = layout.words.len(),
        failed = layout.failures.len(),
        "layout pass finished"
    );
    Ok(layout)
}

/// Number of leading words whose slots, smallest first, fit the viewport
/// area once `quality` percent of each slot is assumed to overlap others.
pub fn estimate_word_count(
    words: &mut [WordDataPoint],
    viewport: Viewport,
    quality: f32,
    rasterizer: &mut dyn TextRasterizer,
) -> usize {
    let mut areas: Vec<(f32, f64)> = words
        .iter_mut()
        .map(|word| {
            let (width, height) = measure_slot(word, rasterizer);
            (word.font_size, width as f64 * height as f64)
        })
        .collect();
    areas.sort_by(|a, b| a.0.total_cmp(&b.0));

    let overlap = 1.0 - quality as f64 / 100.0;
    let mut remaining = viewport.width as f64 * viewport.height as f64;
    let mut count = 0;
    for (_, area) in areas {
        remaining -= area * overlap;
        if remaining < 0.0 {
            break;
        }
        count += 1;
    }
    count
}

fn place_words(
    mut words: Vec<WordDataPoint>,
    working: Viewport,
    config: &LayoutConfig,
    canvas: &mut Canvas,
    rasterizer: &mut dyn TextRasterizer,
    random: &dyn RandomSource,
) -> WordCloudLayout {
    let max_words = config.general.max_number_of_words;
    let half_width = (working.width as i32) >> 1;
    let half_height = (working.height as i32) >> 1;
    let mut placer = Placer::new(working, words.len(), random);
    let mut placed = vec![false; words.len()];
    let mut placed_count = 0;
    let mut failures = Vec::new();

    for index in 0..words.len() {
        if placed_count >= max_words {
            break;
        }
        placer.start_position(&mut words[index], index);

        if words[index].sprite.is_none() {
            let reason = generate_sprites(&mut words, index, canvas, rasterizer);
            if words[index].sprite.is_none() {
                let reason = reason.unwrap_or(FailureReason::OutsideCanvas);
                tracing::debug!(text = %words[index].text, ?reason, "word has no sprite");
                failures.push(PlacementFailure {
                    text: words[index].text.clone(),
                    reason,
                });
                continue;
            }
        }

        let word = &mut words[index];
        if placer.find_position(word, index) {
            word.x -= half_width;
            word.y -= half_height;
            placed[index] = true;
            placed_count += 1;
        } else {
            tracing::trace!(text = %word.text, "spiral exhausted");
            word.sprite = None;
            failures.push(PlacementFailure {
                text: word.text.clone(),
                reason: FailureReason::SpiralExhausted,
            });
        }
    }

    let words = words
        .into_iter()
        .zip(placed)
        .filter_map(|(word, placed)| placed.then_some(word))
        .collect();
    WordCloudLayout {
        words,
        borders: placer.borders,
        viewport: working,
        failures,
    }
}
