use crate::layout::{FailureReason, WordCloudLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub borders: Option<[[i32; 2]; 2]>,
    pub words: Vec<WordDump>,
    pub failures: Vec<FailureDump>,
}

#[derive(Debug, Serialize)]
pub struct WordDump {
    pub text: String,
    pub weight: f64,
    pub font_size: f32,
    pub rotation: f32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// `[x0, y0, x1, y1]` relative to `(x, y)`.
    pub bounds: [i32; 4],
    pub source_refs: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct FailureDump {
    pub text: String,
    pub reason: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &WordCloudLayout) -> Self {
        let words = layout
            .words
            .iter()
            .map(|word| WordDump {
                text: word.text.clone(),
                weight: word.weight,
                font_size: word.font_size,
                rotation: word.rotation,
                x: word.x,
                y: word.y,
                width: word.width,
                height: word.height,
                bounds: [word.x0, word.y0, word.x1, word.y1],
                source_refs: word.source_refs.clone(),
            })
            .collect();
        let failures = layout
            .failures
            .iter()
            .map(|failure| FailureDump {
                text: failure.text.clone(),
                reason: reason_name(failure.reason).to_string(),
            })
            .collect();

        LayoutDump {
            width: layout.viewport.width,
            height: layout.viewport.height,
            borders: layout
                .borders
                .map(|b| [[b.left.x, b.left.y], [b.right.x, b.right.y]]),
            words,
            failures,
        }
    }
}

fn reason_name(reason: FailureReason) -> &'static str {
    match reason {
        FailureReason::OutsideCanvas => "outside_canvas",
        FailureReason::NoInk => "no_ink",
        FailureReason::SpiralExhausted => "spiral_exhausted",
    }
}

pub fn write_layout_dump(path: &Path, layout: &WordCloudLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PlacementFailure, Viewport};

    #[test]
    fn dump_lists_words_and_failures() {
        let mut layout = WordCloudLayout::empty(Viewport::new(300.0, 200.0));
        layout.failures.push(PlacementFailure {
            text: "giant".to_string(),
            reason: FailureReason::SpiralExhausted,
        });
        let dump = LayoutDump::from_layout(&layout);
        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["width"], 300.0);
        assert!(json["borders"].is_null());
        assert_eq!(json["failures"][0]["reason"], "spiral_exhausted");
        assert_eq!(json["words"].as_array().unwrap().len(), 0);
    }
}
