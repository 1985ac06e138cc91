use crate::ir::{MIN_COUNT, WordList};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static INIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%%\{\s*init\s*:\s*(\{.*\})\s*\}%%").unwrap());
static WEIGHT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<text>.*?)\s*,\s*(?P<weight>[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)$")
        .unwrap()
});

#[derive(Debug, Clone)]
pub struct ParsedWords {
    pub list: WordList,
    pub init_config: Option<serde_json::Value>,
}

/// Parses the line-oriented word format: one occurrence per line with an
/// optional trailing `, <weight>`; `%%` starts a comment and a leading
/// `%%{init: {...}}%%` line carries config overrides.
pub fn parse_words(input: &str) -> Result<ParsedWords> {
    let mut init_config: Option<serde_json::Value> = None;
    let mut list = WordList::new();

    for raw_line in input.lines() {
        let trimmed_line = raw_line.trim();
        if trimmed_line.is_empty() {
            continue;
        }
        if let Some(caps) = INIT_RE.captures(trimmed_line) {
            if let Some(json_str) = caps.get(1).map(|m| m.as_str()) {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(json_str) {
                    init_config = Some(value);
                } else if let Ok(value) = json5::from_str::<serde_json::Value>(json_str) {
                    init_config = Some(value);
                } else {
                    return Err(anyhow::anyhow!("Invalid init directive: {trimmed_line}"));
                }
            }
            continue;
        }
        if trimmed_line.starts_with("%%") {
            continue;
        }
        let line = strip_trailing_comment(trimmed_line);
        if line.is_empty() {
            continue;
        }
        let (text, weight) = split_weight(line);
        list.push(unquote(text), weight);
    }

    Ok(ParsedWords { list, init_config })
}

#[derive(Debug, Deserialize)]
struct JsonWord {
    text: String,
    weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Words(Vec<JsonWord>),
    Document {
        words: Vec<JsonWord>,
        #[serde(default)]
        exclude: Vec<String>,
    },
}

/// Parses `[{"text": ..., "weight": ...}]`, or an object with `words` and
/// an optional `exclude` list.
pub fn parse_words_json(input: &str) -> Result<WordList> {
    let parsed: JsonInput = serde_json::from_str(input)?;
    let (words, exclude) = match parsed {
        JsonInput::Words(words) => (words, Vec::new()),
        JsonInput::Document { words, exclude } => (words, exclude),
    };
    let mut list = WordList::new();
    for word in words {
        list.push(word.text, word.weight.unwrap_or(MIN_COUNT));
    }
    for value in exclude {
        list.exclude(value);
    }
    Ok(list)
}

fn split_weight(line: &str) -> (&str, f64) {
    if let Some(caps) = WEIGHT_RE.captures(line)
        && let (Some(text), Some(weight)) = (caps.name("text"), caps.name("weight"))
        && let Ok(value) = weight.as_str().parse::<f64>()
    {
        return (text.as_str(), value);
    }
    (line, MIN_COUNT)
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn strip_trailing_comment(line: &str) -> &str {
    match line.find(" %%") {
        Some(index) => line[..index].trim_end(),
        None => line,
    }
}
