use std::path::Path;

use wordcloud_rs::config::{Config, merge_init_config};
use wordcloud_rs::layout::words::{build_exclusions, reduce_text};
use wordcloud_rs::layout::{
    BoxRasterizer, CycledSequence, WordCloudLayout, compute_layout_with_random,
};
use wordcloud_rs::{
    LayoutConfig, Viewport, WordList, compute_layout, parse_words, parse_words_json, render_svg,
};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> (WordList, Config) {
    let path = fixture_path(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    let mut config = Config::default();
    config.layout.fast_text_metrics = true;
    if name.ends_with(".json") {
        return (parse_words_json(&input).expect("parse failed"), config);
    }
    let parsed = parse_words(&input).expect("parse failed");
    if let Some(init) = parsed.init_config {
        config = merge_init_config(config, init).expect("init directive");
    }
    (parsed.list, config)
}

fn layout_fixture(name: &str) -> (WordCloudLayout, Config) {
    let (list, config) = load_fixture(name);
    let viewport = Viewport::new(config.render.width, config.render.height);
    let layout = compute_layout(&list, viewport, &config.layout, &mut BoxRasterizer::new())
        .expect("layout failed");
    (layout, config)
}

fn texts(layout: &WordCloudLayout) -> Vec<&str> {
    layout.words.iter().map(|word| word.text.as_str()).collect()
}

fn assert_no_ink_overlap(layout: &WordCloudLayout) {
    for (i, a) in layout.words.iter().enumerate() {
        for b in layout.words.iter().skip(i + 1) {
            assert!(
                !a.ink_rect().intersects(&b.ink_rect()),
                "{:?} overlaps {:?}",
                a.text,
                b.text
            );
        }
    }
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "countries.txt",
        "phrases.txt",
        "stop_words.txt",
        "weighted.json",
    ];

    for rel in candidates {
        assert!(fixture_path(rel).exists(), "fixture missing: {}", rel);
        let (layout, config) = layout_fixture(rel);
        assert!(!layout.is_empty(), "{rel}: nothing placed");
        let svg = render_svg(&layout, &config.theme, &config.render, config.layout.margin);
        assert_valid_svg(&svg, rel);
    }
}

#[test]
fn countries_place_heaviest_first() {
    let (layout, _) = layout_fixture("countries.txt");
    assert_eq!(layout.words[0].text, "China");
    assert_eq!(layout.words[0].font_size, 100.0);
    let texts = texts(&layout);
    assert!(texts.contains(&"Guinea") && texts.contains(&"Bissau"));
    for word in &layout.words {
        assert!((-60.0..90.0).contains(&word.rotation), "{}", word.rotation);
    }
}

#[test]
fn phrases_keep_whole_texts() {
    let (layout, config) = layout_fixture("phrases.txt");
    assert!(!config.layout.general.is_broken_text);
    let new_york = layout
        .words
        .iter()
        .find(|word| word.text == "New York")
        .expect("phrase placed");
    assert_eq!(new_york.weight, 11.0);
    assert_eq!(new_york.font_size, 72.0);
    assert_eq!(new_york.source_refs, vec![0, 5]);
    assert!(layout.words.iter().all(|word| word.rotation == 0.0));
    assert_no_ink_overlap(&layout);
}

#[test]
fn stop_words_and_repetition_threshold() {
    let (layout, _) = layout_fixture("stop_words.txt");
    let texts = texts(&layout);
    assert!(texts.contains(&"words"));
    assert!(texts.contains(&"larger"));
    for hidden in ["the", "The", "cloud", "are", "word"] {
        assert!(!texts.contains(&hidden), "{hidden} should be filtered");
    }
    let words = layout.words.iter().find(|w| w.text == "words").unwrap();
    assert_eq!(words.weight, 5.0);
}

#[test]
fn json_exclusions_apply() {
    let (layout, _) = layout_fixture("weighted.json");
    let texts = texts(&layout);
    assert_eq!(texts[0], "layout");
    assert!(!texts.contains(&"the"));
    assert!(texts.contains(&"glyph"));
}

#[test]
fn min_repetitions_keeps_only_repeated_word() {
    let list: WordList = [("car", 1.0), ("car", 1.0), ("truck", 1.0)].into_iter().collect();
    let mut config = LayoutConfig::default();
    config.general.min_repetitions_to_display = 2.0;
    let layout = compute_layout(
        &list,
        Viewport::new(800.0, 600.0),
        &config,
        &mut BoxRasterizer::new(),
    )
    .unwrap();
    assert_eq!(texts(&layout), vec!["car"]);
    assert_eq!(layout.words[0].weight, 2.0);
    assert_eq!(layout.words[0].source_refs, vec![0, 1]);
}

#[test]
fn six_equal_words_do_not_overlap() {
    let list: WordList = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"]
        .into_iter()
        .map(|text| (text, 5.0))
        .collect();
    let mut config = LayoutConfig::default();
    config.rotate_text.show = false;
    let layout = compute_layout_with_random(
        &list,
        Viewport::new(1000.0, 500.0),
        &config,
        &mut BoxRasterizer::new(),
        &CycledSequence::constant(0.3),
    )
    .unwrap();
    assert_eq!(layout.words.len(), 6);
    assert!(layout.words.iter().all(|word| word.font_size == 20.0));
    assert_no_ink_overlap(&layout);
}

#[test]
fn extreme_weights_hit_font_bounds() {
    let list: WordList = [("rare", 1.0), ("common", 100.0)].into_iter().collect();
    let mut config = LayoutConfig::default();
    config.general.min_font_size = 20.0;
    config.general.max_font_size = 100.0;
    let layout = compute_layout(
        &list,
        Viewport::new(1000.0, 800.0),
        &config,
        &mut BoxRasterizer::new(),
    )
    .unwrap();
    let size_of = |text: &str| {
        layout
            .words
            .iter()
            .find(|word| word.text == text)
            .map(|word| word.font_size)
    };
    assert_eq!(size_of("rare"), Some(20.0));
    assert_eq!(size_of("common"), Some(100.0));
}

#[test]
fn cap_keeps_the_heaviest_words() {
    let list: WordList = (0..74).map(|i| (format!("w{i}"), 10.0 + i as f64)).collect();
    let mut config = LayoutConfig::default();
    config.general.max_number_of_words = 30;
    config.general.min_font_size = 10.0;
    config.general.max_font_size = 30.0;
    config.rotate_text.show = false;
    let layout = compute_layout(
        &list,
        Viewport::new(1000.0, 800.0),
        &config,
        &mut BoxRasterizer::new(),
    )
    .unwrap();
    assert_eq!(layout.words.len(), 30);
    let expected: Vec<String> = (44..74).rev().map(|i| format!("w{i}")).collect();
    let placed: Vec<String> = layout.words.iter().map(|word| word.text.clone()).collect();
    assert_eq!(placed, expected);
}

#[test]
fn identical_input_gives_identical_layout() {
    let (list, config) = load_fixture("countries.txt");
    let viewport = Viewport::new(900.0, 600.0);
    let first = compute_layout(&list, viewport, &config.layout, &mut BoxRasterizer::new()).unwrap();
    let second = compute_layout(&list, viewport, &config.layout, &mut BoxRasterizer::new()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn aggregation_preserves_total_weight() {
    let (list, config) = load_fixture("countries.txt");
    let exclusions = build_exclusions(&list.excluded, &config.layout.general, &config.layout.stop_words);
    let groups = reduce_text(&list.occurrences, &exclusions, &config.layout.general);
    let total: f64 = groups.iter().map(|group| group.total_weight).sum();
    // "Guinea-Bissau" splits into two tokens carrying the row weight each.
    assert_eq!(total, list.total_weight() + 2.0);
}

#[test]
fn preestimate_limits_dense_clouds() {
    let list: WordList = (0..400).map(|i| (format!("token{i}"), 1.0 + i as f64)).collect();
    let mut config = LayoutConfig::default();
    config.performance.preestimate = true;
    config.general.max_number_of_words = 400;
    let viewport = Viewport::new(600.0, 400.0);
    let estimated =
        compute_layout(&list, viewport, &config, &mut BoxRasterizer::new()).unwrap();
    assert!(estimated.words.len() + estimated.failures.len() < 400);
    assert!(!estimated.is_empty());
}
