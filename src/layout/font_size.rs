use crate::config::{GeneralConfig, LayoutConfig, RotateTextConfig};

use super::random::RandomSource;
use super::{WordDataPoint, WordGroup};

/// Maps an aggregated weight onto `[min_font_size, max_font_size]`.
///
/// `min_value`/`max_value` are the raw weight extremes of the pass. The
/// extremes go through the configured scale too, not just `value`: that is
/// what pins the lightest word to the minimum and the heaviest to the
/// maximum for sqrt and log scales.
pub fn font_size_for(value: f64, min_value: f64, max_value: f64, general: &GeneralConfig) -> f32 {
    let min_font = general.min_font_size as f64;
    let max_font = general.max_font_size as f64;
    let scale = general.scale_type;
    let weight = scale.apply(value);
    let low = scale.apply(min_value);
    let high = scale.apply(max_value);

    let mut size = if weight.is_finite() && low.is_finite() && weight > low {
        if high != low && high.is_finite() {
            max_font * (weight - low) / (high - low)
        } else {
            0.0
        }
    } else {
        0.0
    };

    if max_font > 0.0 {
        size = size / max_font * (max_font - min_font) + min_font;
    } else {
        size = min_font;
    }
    size as f32
}

/// Rotation in degrees for the word at rank `index`: one of
/// `max_number_of_orientations` evenly spaced angles from `min_angle`.
pub fn rotation_for(index: usize, rotate: &RotateTextConfig, random: &dyn RandomSource) -> f32 {
    if !rotate.show {
        return 0.0;
    }
    let orientations = rotate.max_number_of_orientations.max(1) as f64;
    let step = (rotate.max_angle - rotate.min_angle) as f64 / orientations;
    let bucket = (random.next(index) * orientations).floor();
    (rotate.min_angle as f64 + step * bucket) as f32
}

/// Turns weight-ordered groups into sized, rotated data points. Rotations
/// are drawn by each group's first-seen position, so reordering by weight
/// does not change which angle a word gets.
pub fn size_words(
    groups: &[WordGroup],
    config: &LayoutConfig,
    random: &dyn RandomSource,
) -> Vec<WordDataPoint> {
    let Some(first) = groups.first() else {
        return Vec::new();
    };
    let (min_value, max_value) = groups.iter().fold(
        (first.total_weight, first.total_weight),
        |(low, high), group| (low.min(group.total_weight), high.max(group.total_weight)),
    );

    groups
        .iter()
        .map(|group| {
            let size = font_size_for(group.total_weight, min_value, max_value, &config.general);
            let rotation = rotation_for(group.seen_order, &config.rotate_text, random);
            WordDataPoint::new(group, size, rotation, config.word_padding)
        })
        .collect()
}
