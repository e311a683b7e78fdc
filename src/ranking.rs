// Bounded top-N lists ordered by descending score

/// Anything that can be ranked by a floating-point score
pub trait Scored {
    fn score(&self) -> f64;
}

/// Insert `candidate` into `list`, keeping it sorted by descending score and
/// at most `max_results` long.
///
/// The candidate goes before the first entry scoring strictly less than it,
/// so ties keep earlier arrivals ahead. Returns the insertion index, or
/// `None` when the candidate did not make the cut.
pub fn insert_sorted<T: Scored>(list: &mut Vec<T>, candidate: T, max_results: usize) -> Option<usize> {
    let score = candidate.score();
    let pos = list
        .iter()
        .position(|existing| score > existing.score())
        .unwrap_or(list.len());

    if pos >= max_results {
        return None;
    }

    list.insert(pos, candidate);
    list.truncate(max_results);
    Some(pos)
}

/// Best passages seen so far for one configuration
#[derive(Debug, Clone)]
pub struct PassageRanker<T> {
    entries: Vec<T>,
    max_results: usize,
}

impl<T: Scored> PassageRanker<T> {
    pub fn new(max_results: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_results.min(1024)),
            max_results,
        }
    }

    /// See [`insert_sorted`]
    pub fn insert(&mut self, candidate: T) -> Option<usize> {
        insert_sorted(&mut self.entries, candidate, self.max_results)
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn best(&self) -> Option<&T> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn into_entries(self) -> Vec<T> {
        self.entries
    }
}
