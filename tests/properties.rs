use proptest::prelude::*;

use wordcloud_rs::config::GeneralConfig;
use wordcloud_rs::ir::WordOccurrence;
use wordcloud_rs::layout::words::{Exclusions, reduce_text, tokenize};
use wordcloud_rs::layout::{BoxRasterizer, PreparedRandoms, WordGroup, size_words};
use wordcloud_rs::{LayoutConfig, Viewport, WordList, compute_layout};

fn word_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,8}"
}

fn occurrences(items: &[(String, f64)]) -> Vec<WordOccurrence> {
    items
        .iter()
        .enumerate()
        .map(|(idx, (text, weight))| WordOccurrence::new(text.clone(), *weight, idx))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Aggregation neither loses nor invents weight.
    #[test]
    fn aggregation_preserves_weight(
        items in prop::collection::vec((word_strategy(), 1u32..100), 0..60),
    ) {
        let items: Vec<(String, f64)> = items.into_iter().map(|(t, w)| (t, w as f64)).collect();
        let input = occurrences(&items);
        let general = GeneralConfig::default();
        let tokens = tokenize(&input, &Exclusions::new(), &general);
        let groups = reduce_text(&input, &Exclusions::new(), &general);

        let token_total: f64 = tokens.iter().map(|t| t.weight).sum();
        let group_total: f64 = groups.iter().map(|g| g.total_weight).sum();
        prop_assert_eq!(token_total, group_total);

        let refs: usize = groups.iter().map(|g| g.source_refs.len()).sum();
        prop_assert_eq!(refs, tokens.len());
        for pair in groups.windows(2) {
            prop_assert!(pair[0].total_weight >= pair[1].total_weight);
        }
    }

    /// Heavier groups never get a smaller font.
    #[test]
    fn font_sizes_follow_weights(
        weights in prop::collection::vec(0.5f64..500.0, 1..40),
        min_font in 1.0f32..40.0,
        spread in 0.0f32..120.0,
    ) {
        let groups: Vec<WordGroup> = weights
            .iter()
            .enumerate()
            .map(|(idx, weight)| WordGroup {
                text: format!("w{idx}"),
                total_weight: *weight,
                source_refs: vec![idx],
                representative_index: idx,
                seen_order: idx,
            })
            .collect();
        let mut config = LayoutConfig::default();
        config.general.min_font_size = min_font;
        config.general.max_font_size = min_font + spread;
        let words = size_words(&groups, &config, &PreparedRandoms);

        for a in &words {
            prop_assert!(a.font_size >= min_font - 1e-3);
            prop_assert!(a.font_size <= min_font + spread + 1e-3);
            for b in &words {
                if a.weight > b.weight {
                    prop_assert!(a.font_size >= b.font_size);
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Unrotated words never share a pixel, the cap holds and a second pass
    /// reproduces the first exactly.
    #[test]
    fn layout_respects_overlap_cap_and_determinism(
        items in prop::collection::vec((word_strategy(), 1u32..50), 1..30),
        max_words in 1usize..30,
        width in 300f32..1200.0,
        height in 200f32..900.0,
    ) {
        let list: WordList = items.iter().map(|(t, w)| (t.clone(), *w as f64)).collect();
        let mut config = LayoutConfig::default();
        config.rotate_text.show = false;
        config.general.max_number_of_words = max_words;
        let viewport = Viewport::new(width, height);

        let layout = compute_layout(&list, viewport, &config, &mut BoxRasterizer::new()).unwrap();
        prop_assert!(layout.words.len() <= max_words);
        for (i, a) in layout.words.iter().enumerate() {
            for b in layout.words.iter().skip(i + 1) {
                prop_assert!(!a.ink_rect().intersects(&b.ink_rect()), "{} overlaps {}", a.text, b.text);
            }
        }

        let again = compute_layout(&list, viewport, &config, &mut BoxRasterizer::new()).unwrap();
        prop_assert_eq!(layout, again);
    }
}
