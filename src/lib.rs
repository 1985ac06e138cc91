#[cfg(feature = "cli")]
pub mod cli;
pub mod cloud;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use cloud::{CloudInput, UpdateStatus, WordCloud};
pub use config::{Config, LayoutConfig, RenderConfig};
pub use ir::{WordList, WordOccurrence};
pub use layout::{
    BoxRasterizer, LayoutError, TextRasterizer, Viewport, WordCloudLayout, compute_layout,
};
pub use parser::{parse_words, parse_words_json};
pub use render::render_svg;
pub use theme::Theme;

/// The rasterizer the CLI and [`render_with_options`] use: real glyph
/// outlines when the `raster` feature is on, measured boxes otherwise, and
/// table-measured boxes when fast text metrics are requested.
pub fn default_rasterizer(config: &Config) -> Box<dyn TextRasterizer> {
    if config.layout.fast_text_metrics {
        return Box::new(BoxRasterizer::new());
    }
    #[cfg(feature = "raster")]
    {
        Box::new(layout::GlyphRasterizer::new(config.theme.font_family.clone()))
    }
    #[cfg(not(feature = "raster"))]
    {
        Box::new(BoxRasterizer::with_font(config.theme.font_family.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::classic()
    }
}

impl RenderOptions {
    pub fn classic() -> Self {
        let config = Config::default();
        Self {
            theme: config.theme,
            layout: config.layout,
            render: config.render,
        }
    }

    pub fn modern() -> Self {
        let theme = Theme::modern();
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

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.render.width = width;
        self.render.height = height;
        self
    }
}

/// Parses the line format (honoring an init directive), lays the words out
/// at the render size and returns the SVG document.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let parsed = parse_words(input)?;
    let mut config = Config {
        theme: options.theme,
        layout: options.layout,
        render: options.render,
    };
    if let Some(init_cfg) = parsed.init_config {
        config = crate::config::merge_init_config(config, init_cfg)?;
    }
    let viewport = Viewport::new(config.render.width, config.render.height);
    let mut rasterizer = default_rasterizer(&config);
    let layout = compute_layout(&parsed.list, viewport, &config.layout, rasterizer.as_mut())?;
    Ok(render_svg(
        &layout,
        &config.theme,
        &config.render,
        config.layout.margin,
    ))
}
