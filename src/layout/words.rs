use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{GeneralConfig, StopWordsConfig};
use crate::ir::WordOccurrence;

use super::WordGroup;

static PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[!.:';,?@#$%^&*()\[\]"\\/\-_+=<>|]"#).unwrap());

const STOP_WORDS_DELIMITER: char = ' ';

pub const STOP_WORDS: [&str; 118] = [
    "a", "able", "about", "across", "after", "all", "almost", "also", "am", "among", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "but", "by", "can", "cannot", "could",
    "did", "do", "does", "either", "else", "ever", "every", "for", "from", "get", "got", "had",
    "has", "have", "he", "her", "hers", "him", "his", "how", "however", "i", "if", "in", "into",
    "is", "it", "its", "just", "least", "let", "like", "likely", "may", "me", "might", "most",
    "must", "my", "neither", "no", "nor", "not", "of", "off", "often", "on", "only", "or",
    "other", "our", "own", "rather", "said", "say", "says", "she", "should", "since", "so",
    "some", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "tis", "to", "too", "twas", "us", "wants", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "yet", "you", "your",
];

/// Lowercased words that never reach the cloud.
pub type Exclusions = HashSet<String>;

/// Replaces punctuation with spaces (unless kept) and splits on whitespace.
pub fn clean_and_split(text: &str, keep_punctuation: bool) -> Vec<String> {
    if keep_punctuation {
        return text.split_whitespace().map(str::to_string).collect();
    }
    PUNCTUATION_RE
        .replace_all(text, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Builds the exclusion set from explicit values and the stop-word settings.
/// Explicit values go through the same cleaning as target texts so that an
/// excluded "Guinea-Bissau" also removes both halves of the split word.
pub fn build_exclusions(
    excluded: &[String],
    general: &GeneralConfig,
    stop_words: &StopWordsConfig,
) -> Exclusions {
    let mut set = Exclusions::new();
    for value in excluded {
        for word in clean_and_split(value, general.is_punctuations_characters) {
            set.insert(word.to_lowercase());
        }
    }
    if !stop_words.show {
        return set;
    }
    if let Some(words) = stop_words.words.as_deref() {
        for word in words.split(STOP_WORDS_DELIMITER) {
            if !word.is_empty() {
                set.insert(word.to_lowercase());
            }
        }
    }
    if stop_words.default_stop_words {
        set.extend(STOP_WORDS.iter().map(|word| word.to_string()));
    }
    set
}

/// Splits each occurrence into tokens, drops excluded tokens, and either
/// emits one occurrence per token (word breaking) or keeps the cleaned
/// phrase when at least one token survives.
pub fn tokenize(
    occurrences: &[WordOccurrence],
    exclusions: &Exclusions,
    general: &GeneralConfig,
) -> Vec<WordOccurrence> {
    let keep_punctuation = general.is_punctuations_characters;
    let mut tokens = Vec::new();
    for item in occurrences {
        if item.text.trim().is_empty() {
            continue;
        }
        let words: Vec<String> = clean_and_split(&item.text, keep_punctuation)
            .into_iter()
            .filter(|word| !exclusions.contains(&word.to_lowercase()))
            .collect();
        if words.is_empty() {
            continue;
        }
        if general.is_broken_text {
            tokens.extend(
                words
                    .into_iter()
                    .map(|word| WordOccurrence::new(word, item.weight, item.source_ref)),
            );
        } else {
            let phrase = if keep_punctuation {
                item.text.trim().to_string()
            } else {
                PUNCTUATION_RE.replace_all(&item.text, " ").trim().to_string()
            };
            tokens.push(WordOccurrence::new(phrase, item.weight, item.source_ref));
        }
    }
    tokens
}

/// Groups tokens by lowercase text, sums weights, drops groups below
/// `min_repetitions`, and orders by descending weight (first-seen order
/// breaks ties).
pub fn aggregate(tokens: &[WordOccurrence], min_repetitions: f64) -> Vec<WordGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<WordGroup> = Vec::new();
    for token in tokens {
        let key = token.text.to_lowercase();
        match index.get(&key) {
            Some(&slot) => {
                let group = &mut groups[slot];
                group.total_weight += token.weight;
                group.source_refs.push(token.source_ref);
            }
            None => {
                index.insert(key, groups.len());
                groups.push(WordGroup {
                    text: token.text.clone(),
                    total_weight: token.weight,
                    source_refs: vec![token.source_ref],
                    representative_index: token.source_ref,
                    seen_order: 0,
                });
            }
        }
    }
    groups.retain(|group| group.total_weight >= min_repetitions);
    for (order, group) in groups.iter_mut().enumerate() {
        group.seen_order = order;
    }
    groups.sort_by(|a, b| {
        b.total_weight
            .partial_cmp(&a.total_weight)
            .unwrap_or(Ordering::Equal)
    });
    groups
}

pub fn reduce_text(
    occurrences: &[WordOccurrence],
    exclusions: &Exclusions,
    general: &GeneralConfig,
) -> Vec<WordGroup> {
    let tokens = tokenize(occurrences, exclusions, general);
    aggregate(&tokens, general.min_repetitions_to_display)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrences(items: &[(&str, f64)]) -> Vec<WordOccurrence> {
        items
            .iter()
            .enumerate()
            .map(|(idx, (text, weight))| WordOccurrence::new(*text, *weight, idx))
            .collect()
    }

    #[test]
    fn min_repetitions_drops_rare_words() {
        let input = occurrences(&[("car", 1.0), ("car", 1.0), ("truck", 1.0)]);
        let general = GeneralConfig {
            min_repetitions_to_display: 2.0,
            ..Default::default()
        };
        let groups = reduce_text(&input, &Exclusions::new(), &general);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text, "car");
        assert_eq!(groups[0].total_weight, 2.0);
        assert_eq!(groups[0].source_refs, vec![0, 1]);
    }

    #[test]
    fn aggregation_is_case_insensitive_and_keeps_first_spelling() {
        let input = occurrences(&[("Car", 2.0), ("CAR", 3.0), ("car", 1.0)]);
        let groups = reduce_text(&input, &Exclusions::new(), &GeneralConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text, "Car");
        assert_eq!(groups[0].total_weight, 6.0);
        assert_eq!(groups[0].representative_index, 0);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let input = occurrences(&[("b", 1.0), ("a", 1.0), ("c", 5.0), ("d", 1.0)]);
        let groups = reduce_text(&input, &Exclusions::new(), &GeneralConfig::default());
        let texts: Vec<&str> = groups.iter().map(|group| group.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "b", "a", "d"]);
        let seen: Vec<usize> = groups.iter().map(|group| group.seen_order).collect();
        assert_eq!(seen, vec![2, 0, 1, 3]);
    }

    #[test]
    fn word_breaking_splits_phrases_and_strips_punctuation() {
        let input = occurrences(&[("Guinea-Bissau, Guinea!", 2.0)]);
        let groups = reduce_text(&input, &Exclusions::new(), &GeneralConfig::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].text, "Guinea");
        assert_eq!(groups[0].total_weight, 4.0);
        assert_eq!(groups[1].text, "Bissau");
    }

    #[test]
    fn keep_punctuation_preserves_tokens() {
        let input = occurrences(&[("C++ rocks!", 1.0)]);
        let general = GeneralConfig {
            is_punctuations_characters: true,
            ..Default::default()
        };
        let groups = reduce_text(&input, &Exclusions::new(), &general);
        let texts: Vec<&str> = groups.iter().map(|group| group.text.as_str()).collect();
        assert_eq!(texts, vec!["C++", "rocks!"]);
    }

    #[test]
    fn phrases_survive_when_any_token_survives() {
        let input = occurrences(&[("Hong Kong", 1.0), ("the of", 1.0)]);
        let general = GeneralConfig {
            is_broken_text: false,
            ..Default::default()
        };
        let stop_words = StopWordsConfig {
            default_stop_words: true,
            ..Default::default()
        };
        let exclusions = build_exclusions(&[], &general, &stop_words);
        let groups = reduce_text(&input, &exclusions, &general);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text, "Hong Kong");
    }

    #[test]
    fn empty_texts_are_skipped() {
        let input = occurrences(&[("", 5.0), ("   ", 5.0), ("!!!", 5.0)]);
        let groups = reduce_text(&input, &Exclusions::new(), &GeneralConfig::default());
        assert!(groups.is_empty());
    }

    #[test]
    fn exclusions_follow_target_cleaning_rules() {
        let general = GeneralConfig::default();
        let stop_words = StopWordsConfig {
            words: Some("Afghanistan Albania".to_string()),
            ..Default::default()
        };
        let exclusions =
            build_exclusions(&["Guinea-Bissau".to_string()], &general, &stop_words);
        for word in ["guinea", "bissau", "afghanistan", "albania"] {
            assert!(exclusions.contains(word), "missing {word}");
        }
        let input = occurrences(&[("AFGHANISTAN", 3.0), ("Chad", 1.0)]);
        let groups = reduce_text(&input, &exclusions, &general);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text, "Chad");
    }

    #[test]
    fn hidden_stop_words_are_ignored() {
        let stop_words = StopWordsConfig {
            show: false,
            default_stop_words: true,
            words: Some("car".to_string()),
        };
        let exclusions = build_exclusions(&[], &GeneralConfig::default(), &stop_words);
        assert!(exclusions.is_empty());
    }
}
