use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wordcloud_rs::{RenderOptions, render_with_options};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordCloudRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    max_number_of_words: Option<usize>,
    rotate: Option<bool>,
    fast_text: Option<bool>,
}

fn build_render_options(options: WordCloudRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(width) = options.width {
        render_options.render.width = width;
    }
    if let Some(height) = options.height {
        render_options.render.height = height;
    }
    if let Some(max_words) = options.max_number_of_words {
        render_options.layout.general.max_number_of_words = max_words;
    }
    if let Some(rotate) = options.rotate {
        render_options.layout.rotate_text.show = rotate;
    }
    // No system fonts inside the browser sandbox.
    render_options.layout.fast_text_metrics = options.fast_text.unwrap_or(true);

    render_options
}

#[wasm_bindgen]
pub fn render_word_cloud_svg(words: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<WordCloudRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        WordCloudRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(words, render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}
