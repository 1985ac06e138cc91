use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub text_color: String,
    pub background: String,
    /// Fill colors cycled over the words by their first-seen input row.
    pub palette: Vec<String>,
}

const CLASSIC_PALETTE: [&str; 8] = [
    "#01B8AA", "#374649", "#FD625E", "#F2C80F", "#5F6B6D", "#8AD4EB", "#FE9666", "#A66999",
];

const MODERN_PALETTE: [&str; 8] = [
    "#2563EB", "#0F766E", "#B45309", "#7C3AED", "#BE123C", "#15803D", "#0369A1", "#4B5563",
];

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"Segoe UI\", wf_segoe-ui_normal, helvetica, arial, sans-serif".to_string(),
            text_color: "#333333".to_string(),
            background: "#FFFFFF".to_string(),
            palette: CLASSIC_PALETTE.iter().map(|value| value.to_string()).collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            palette: MODERN_PALETTE.iter().map(|value| value.to_string()).collect(),
        }
    }

    pub fn color_for(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return self.text_color.as_str();
        }
        self.palette[index % self.palette.len()].as_str()
    }
}
