/// Opaque host reference carried through aggregation untouched. The CLI and
/// parser use the zero-based input row index.
pub type SourceRef = usize;

/// Weight given to rows that carry no usable numeric value.
pub const MIN_COUNT: f64 = 1.0;

/// One raw occurrence of a text before tokenizing and aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct WordOccurrence {
    pub text: String,
    pub weight: f64,
    pub source_ref: SourceRef,
}

impl WordOccurrence {
    pub fn new(text: impl Into<String>, weight: f64, source_ref: SourceRef) -> Self {
        let weight = if weight.is_finite() { weight } else { MIN_COUNT };
        Self {
            text: text.into(),
            weight,
            source_ref,
        }
    }
}

/// Everything a single layout pass consumes besides configuration.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    pub occurrences: Vec<WordOccurrence>,
    /// Values excluded on top of the configured stop words. Each entry is
    /// cleaned and split with the same rules as the target texts.
    pub excluded: Vec<String>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, weight: f64) {
        let source_ref = self.occurrences.len();
        self.occurrences
            .push(WordOccurrence::new(text, weight, source_ref));
    }

    pub fn exclude(&mut self, value: impl Into<String>) {
        self.excluded.push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.occurrences.iter().map(|item| item.weight).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for WordList {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut list = WordList::new();
        for (text, weight) in iter {
            list.push(text, weight);
        }
        list
    }
}
