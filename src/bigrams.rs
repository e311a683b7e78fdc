// Word normalization and bigram extraction shared by the window scorer and
// the counting tool, so both sides of a weight table agree on what a bigram is

use std::collections::HashMap;

/// Boundary marker placed before the first and after the last character
pub const BOUNDARY: char = '_';

/// Trailing punctuation dropped from a word before extraction
const TERMINAL_PUNCTUATION: [char; 6] = ['.', ',', ';', ':', '!', '?'];

/// Single-letter contraction suffixes: I'm, it's, he'd, don't
const SHORT_SUFFIXES: [char; 4] = ['m', 's', 'd', 't'];

/// Two-letter contraction suffixes: they're, we've, you'll
const LONG_SUFFIXES: [[char; 2]; 3] = [['r', 'e'], ['v', 'e'], ['l', 'l']];

/// ASCII apostrophe, curly quotes, modifier apostrophe and prime all count
pub fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2019}' | '\u{2018}' | '\u{02BC}' | '\u{2032}')
}

fn drop_terminal_punctuation(chars: &mut Vec<char>) {
    if chars.last().is_some_and(|c| TERMINAL_PUNCTUATION.contains(c)) {
        chars.pop();
    }
}

fn collapse_contraction(chars: &mut Vec<char>) {
    let len = chars.len();
    if len < 2 {
        return;
    }

    if is_apostrophe(chars[len - 2]) && SHORT_SUFFIXES.contains(&chars[len - 1]) {
        chars.remove(len - 2);
        return;
    }

    if len >= 4
        && is_apostrophe(chars[len - 3])
        && LONG_SUFFIXES.contains(&[chars[len - 2], chars[len - 1]])
    {
        chars.remove(len - 3);
    }
}

/// Normalize a raw whitespace-delimited word: one trailing punctuation mark
/// is removed, then a common contraction apostrophe is collapsed.
pub fn normalize_word(word: &str) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    drop_terminal_punctuation(&mut chars);
    collapse_contraction(&mut chars);
    chars.into_iter().collect()
}

/// Extract the boundary and internal bigrams of a word after normalization.
///
/// A normalized word of `n` characters yields `n + 1` bigrams: `_x`, every
/// adjacent pair, then `x_`. A word that normalizes to nothing yields none.
///
/// ```
/// use passage_scan::bigrams::extract_bigrams;
/// assert_eq!(extract_bigrams("Hi!"), vec!["_H", "Hi", "i_"]);
/// ```
pub fn extract_bigrams(word: &str) -> Vec<String> {
    let normalized = normalize_word(word);
    let chars: Vec<char> = normalized.chars().collect();

    let (Some(&first), Some(&last)) = (chars.first(), chars.last()) else {
        return Vec::new();
    };

    let mut bigrams = Vec::with_capacity(chars.len() + 1);
    bigrams.push(String::from_iter([BOUNDARY, first]));
    for pair in chars.windows(2) {
        bigrams.push(String::from_iter([pair[0], pair[1]]));
    }
    bigrams.push(String::from_iter([last, BOUNDARY]));
    bigrams
}

/// Add the bigrams of every word to `counts`
pub fn count_bigrams_into<I, S>(words: I, counts: &mut HashMap<String, u64>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for word in words {
        for bigram in extract_bigrams(word.as_ref()) {
            *counts.entry(bigram).or_insert(0) += 1;
        }
    }
}

/// Count bigram occurrences across a word stream
pub fn count_bigrams<I, S>(words: I) -> HashMap<String, u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = HashMap::new();
    count_bigrams_into(words, &mut counts);
    counts
}
