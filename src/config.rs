use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MIN_FONT_SIZE: f32 = 1.0;
pub const MIN_ANGLE: f32 = -180.0;
pub const MAX_ANGLE: f32 = 180.0;
pub const MIN_NUMBER_OF_WORDS: usize = 1;
pub const MAX_NUMBER_OF_WORDS: usize = 2500;

/// Monotonic transform applied to aggregated weights before font sizing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    #[default]
    Linear,
    Sqrt,
    Log,
}

impl ScaleType {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            ScaleType::Linear => value,
            ScaleType::Sqrt => value.sqrt(),
            ScaleType::Log => value.ln(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub min_repetitions_to_display: f64,
    pub max_number_of_words: usize,
    pub min_font_size: f32,
    pub max_font_size: f32,
    /// Split texts into independent words instead of keeping whole phrases.
    pub is_broken_text: bool,
    /// Keep punctuation characters instead of replacing them with spaces.
    pub is_punctuations_characters: bool,
    pub scale_type: ScaleType,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            min_repetitions_to_display: 1.0,
            max_number_of_words: 200,
            min_font_size: 20.0,
            max_font_size: 100.0,
            is_broken_text: true,
            is_punctuations_characters: false,
            scale_type: ScaleType::Linear,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopWordsConfig {
    pub show: bool,
    pub default_stop_words: bool,
    /// Space-delimited list of extra words to exclude.
    pub words: Option<String>,
}

impl Default for StopWordsConfig {
    fn default() -> Self {
        Self {
            show: true,
            default_stop_words: false,
            words: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateTextConfig {
    pub show: bool,
    pub min_angle: f32,
    pub max_angle: f32,
    pub max_number_of_orientations: usize,
}

impl Default for RotateTextConfig {
    fn default() -> Self {
        Self {
            show: true,
            min_angle: -60.0,
            max_angle: 90.0,
            max_number_of_orientations: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Drop the words that cannot fit the working area before rasterizing.
    pub preestimate: bool,
    /// Share of each word's slot area assumed to overlap others, 0..=100.
    pub quality: f32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            preestimate: false,
            quality: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub general: GeneralConfig,
    pub stop_words: StopWordsConfig,
    pub rotate_text: RotateTextConfig,
    pub performance: PerformanceConfig,
    /// Margin removed from every side of the real viewport.
    pub margin: f32,
    /// Area of the working viewport; its aspect follows the real viewport.
    pub working_width: f32,
    pub working_height: f32,
    pub canvas_width: usize,
    pub canvas_height: usize,
    pub word_padding: i32,
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            stop_words: StopWordsConfig::default(),
            rotate_text: RotateTextConfig::default(),
            performance: PerformanceConfig::default(),
            margin: 10.0,
            working_width: 1500.0,
            working_height: 1000.0,
            canvas_width: 128 << 5,
            canvas_height: 2048,
            word_padding: 1,
            fast_text_metrics: false,
        }
    }
}

impl LayoutConfig {
    /// Returns a copy with every setting forced into its supported range.
    pub fn clamped(&self) -> Self {
        let mut config = self.clone();
        let general = &mut config.general;
        general.min_font_size = general.min_font_size.max(MIN_FONT_SIZE);
        general.max_font_size = general
            .max_font_size
            .max(MIN_FONT_SIZE)
            .max(general.min_font_size);
        general.max_number_of_words = general
            .max_number_of_words
            .clamp(MIN_NUMBER_OF_WORDS, MAX_NUMBER_OF_WORDS);

        let rotate = &mut config.rotate_text;
        rotate.min_angle = rotate.min_angle.clamp(MIN_ANGLE, MAX_ANGLE);
        rotate.max_angle = rotate
            .max_angle
            .clamp(MIN_ANGLE, MAX_ANGLE)
            .max(rotate.min_angle);
        rotate.max_number_of_orientations = rotate
            .max_number_of_orientations
            .clamp(MIN_NUMBER_OF_WORDS, MAX_NUMBER_OF_WORDS);

        config.performance.quality = config.performance.quality.clamp(0.0, 100.0);
        config.word_padding = config.word_padding.max(0);
        config.canvas_width = (config.canvas_width.max(32) >> 5) << 5;
        config.canvas_height = config.canvas_height.max(1);
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    text_color: Option<String>,
    background: Option<String>,
    palette: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeneralConfigFile {
    min_repetitions_to_display: Option<f64>,
    max_number_of_words: Option<usize>,
    min_font_size: Option<f32>,
    max_font_size: Option<f32>,
    is_broken_text: Option<bool>,
    is_punctuations_characters: Option<bool>,
    scale_type: Option<ScaleType>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StopWordsConfigFile {
    show: Option<bool>,
    is_default_stop_words: Option<bool>,
    words: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RotateTextConfigFile {
    show: Option<bool>,
    min_angle: Option<f32>,
    max_angle: Option<f32>,
    max_number_of_orientations: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PerformanceConfigFile {
    preestimate: Option<bool>,
    quality: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    general: Option<GeneralConfigFile>,
    stop_words: Option<StopWordsConfigFile>,
    rotate_text: Option<RotateTextConfigFile>,
    performance: Option<PerformanceConfigFile>,
    render: Option<RenderConfigFile>,
    margin: Option<f32>,
    fast_text_metrics: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    Ok(apply_config_file(config, parsed))
}

/// Merges an inline `%%{init: ...}%%` directive (already parsed as JSON) on
/// top of `config`. The directive uses the same schema as config files.
pub fn merge_init_config(config: Config, init: serde_json::Value) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_value(init)?;
    Ok(apply_config_file(config, parsed))
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.palette
            && !v.is_empty()
        {
            config.theme.palette = v;
        }
    }

    if let Some(general) = parsed.general {
        let target = &mut config.layout.general;
        if let Some(v) = general.min_repetitions_to_display {
            target.min_repetitions_to_display = v;
        }
        if let Some(v) = general.max_number_of_words {
            target.max_number_of_words = v;
        }
        if let Some(v) = general.min_font_size {
            target.min_font_size = v;
        }
        if let Some(v) = general.max_font_size {
            target.max_font_size = v;
        }
        if let Some(v) = general.is_broken_text {
            target.is_broken_text = v;
        }
        if let Some(v) = general.is_punctuations_characters {
            target.is_punctuations_characters = v;
        }
        if let Some(v) = general.scale_type {
            target.scale_type = v;
        }
    }

    if let Some(stop_words) = parsed.stop_words {
        let target = &mut config.layout.stop_words;
        if let Some(v) = stop_words.show {
            target.show = v;
        }
        if let Some(v) = stop_words.is_default_stop_words {
            target.default_stop_words = v;
        }
        if stop_words.words.is_some() {
            target.words = stop_words.words;
        }
    }

    if let Some(rotate) = parsed.rotate_text {
        let target = &mut config.layout.rotate_text;
        if let Some(v) = rotate.show {
            target.show = v;
        }
        if let Some(v) = rotate.min_angle {
            target.min_angle = v;
        }
        if let Some(v) = rotate.max_angle {
            target.max_angle = v;
        }
        if let Some(v) = rotate.max_number_of_orientations {
            target.max_number_of_orientations = v;
        }
    }

    if let Some(performance) = parsed.performance {
        if let Some(v) = performance.preestimate {
            config.layout.performance.preestimate = v;
        }
        if let Some(v) = performance.quality {
            config.layout.performance.quality = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }

    if let Some(v) = parsed.margin {
        config.layout.margin = v;
    }
    if let Some(v) = parsed.fast_text_metrics {
        config.layout.fast_text_metrics = v;
    }

    config
}
