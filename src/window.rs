// Character-bounded sliding window over a word stream with an incrementally
// maintained bigram multiset

use crate::bigrams::extract_bigrams;
use crate::weights::BigramWeights;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// One scoring configuration: a weight table paired with a character budget
#[derive(Debug, Clone)]
pub struct WindowParams {
    id: String,
    weights: Arc<BigramWeights>,
    max_chars: usize,
}

impl WindowParams {
    pub fn new(weights: Arc<BigramWeights>, max_chars: usize) -> Self {
        Self {
            // NOTE: two transforms sharing a max_chars share an id; callers that
            // need to tell configurations apart must key on list position
            id: max_chars.to_string(),
            weights,
            max_chars,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn weights(&self) -> &BigramWeights {
        &self.weights
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

/// Words currently held plus the multiset of their bigrams.
///
/// Bigram counts live in a `BTreeMap` so that [`Window::score`] always sums
/// weights in the same order and repeated runs produce bit-identical scores.
#[derive(Debug, Clone)]
pub struct Window {
    words: VecDeque<String>,
    bigrams: BTreeMap<String, usize>,
    // Sum of held words' lengths in chars, separators excluded
    word_chars: usize,
    params: Arc<WindowParams>,
}

impl Window {
    pub fn new(params: Arc<WindowParams>) -> Self {
        Self {
            words: VecDeque::new(),
            bigrams: BTreeMap::new(),
            word_chars: 0,
            params,
        }
    }

    pub fn params(&self) -> &Arc<WindowParams> {
        &self.params
    }

    /// Append a word and count its bigrams. Does not enforce the size budget.
    pub fn push_word(&mut self, word: &str) {
        for bigram in extract_bigrams(word) {
            *self.bigrams.entry(bigram).or_insert(0) += 1;
        }
        self.word_chars += word.chars().count();
        self.words.push_back(word.to_string());
    }

    /// Remove the oldest word and uncount its bigrams.
    /// Returns `None` when the window is already empty.
    pub fn shift_word(&mut self) -> Option<String> {
        let word = self.words.pop_front()?;
        self.word_chars -= word.chars().count();

        for bigram in extract_bigrams(&word) {
            if let Some(count) = self.bigrams.get_mut(&bigram) {
                *count -= 1;
                if *count == 0 {
                    self.bigrams.remove(&bigram);
                }
            }
        }

        Some(word)
    }

    /// Append a word, then evict from the front until the window fits its
    /// budget again. A single word larger than the budget is kept alone.
    pub fn add_word(&mut self, word: &str) {
        self.push_word(word);
        while self.size() > self.params.max_chars && self.words.len() > 1 {
            self.shift_word();
        }
    }

    /// Copy of this window with `word` appended, or `None` if the word would
    /// not fit without evicting anything. `self` is left untouched.
    pub fn with_word_if_fits(&self, word: &str) -> Option<Window> {
        let separator = usize::from(!self.words.is_empty());
        let new_size = self.size() + separator + word.chars().count();
        if new_size > self.params.max_chars {
            return None;
        }

        let mut extended = self.clone();
        extended.push_word(word);
        Some(extended)
    }

    /// Characters in the window including one space between adjacent words
    pub fn size(&self) -> usize {
        if self.words.is_empty() {
            return 0;
        }
        self.word_chars + self.words.len() - 1
    }

    /// Sum of the weights of every distinct bigram held, in key order.
    /// Bigrams missing from the table contribute nothing.
    pub fn score(&self) -> f64 {
        let weights = self.params.weights();
        self.bigrams
            .iter()
            .filter(|&(_, &count)| count > 0)
            .filter_map(|(bigram, _)| weights.lookup(bigram))
            .fold(0.0, |acc, weight| acc + weight)
    }

    /// Held words joined with single spaces
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.size());
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(word);
        }
        text
    }

    pub fn words(&self) -> Vec<String> {
        self.words.iter().cloned().collect()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Read-only view of the bigram counts
    pub fn bigrams(&self) -> &BTreeMap<String, usize> {
        &self.bigrams
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.bigrams.is_empty()
    }
}
