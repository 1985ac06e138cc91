use crate::text_metrics;

/// Extra pixels added to every measured word so antialiased edges stay
/// inside the sprite slot.
pub const TEXT_WIDTH_PADDING: f32 = 2.0;

/// Words are drawn one pixel larger than their nominal font size.
pub const DRAW_FONT_SIZE_OFFSET: f32 = 1.0;

/// Ascent and descent of the synthetic glyph box, as fractions of the font
/// size. Matches common sans-serif faces closely enough for packing.
pub const BOX_ASCENT: f32 = 0.8;
pub const BOX_DESCENT: f32 = 0.2;

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Per-character advances of a typical sans-serif face at 1px.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}

pub fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics && text.is_ascii() {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

pub fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Unrotated slot width of a word drawn at `font_size`, before 32-pixel
/// alignment.
pub fn word_slot_width(measured: f32) -> f32 {
    measured + TEXT_WIDTH_PADDING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_width_factor_returns_positive_values() {
        for ch in ['a', 'Z', ' ', '0', '@', '\u{4e2d}'] {
            assert!(char_width_factor(ch) > 0.0, "char {:?} has zero width", ch);
        }
    }

    #[test]
    fn fallback_text_width_scales_with_font_size() {
        let w16 = fallback_text_width("Hello", 16.0);
        let w32 = fallback_text_width("Hello", 32.0);
        assert!((w32 - w16 * 2.0).abs() < 0.01, "width should double with font size");
    }

    #[test]
    fn fast_metrics_skip_font_lookup_for_ascii() {
        let width = text_width("car", 20.0, "definitely-not-a-font", true);
        assert_eq!(width, fallback_text_width("car", 20.0));
    }

    #[test]
    fn slot_width_adds_padding() {
        assert_eq!(word_slot_width(40.0), 42.0);
    }
}
