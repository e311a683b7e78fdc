use crate::ranking::Scored;
use crate::window::{Window, WindowParams};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Best-scoring window snapshot tagged with the file it came from
#[derive(Debug, Clone)]
pub struct Passage {
    window: Window,
    file_path: PathBuf,
    // Captured at snapshot time; the window is never mutated afterwards
    score: f64,
}

impl Passage {
    pub fn new(window: Window, file_path: impl Into<PathBuf>) -> Self {
        let score = window.score();
        Self {
            window,
            file_path: file_path.into(),
            score,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn params(&self) -> &Arc<WindowParams> {
        self.window.params()
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn size(&self) -> usize {
        self.window.size()
    }

    pub fn text(&self) -> String {
        self.window.text()
    }
}

impl Scored for Passage {
    fn score(&self) -> f64 {
        self.score
    }
}

/// Run every configuration's window over one file's words, in order.
///
/// Returns one slot per entry of `params_list`, in the same order. A slot
/// holds the window state whose score first reached that configuration's
/// maximum; it is `None` when no window ever scored above zero.
pub fn find_best_passages<I, S>(
    words: I,
    params_list: &[Arc<WindowParams>],
    file_path: &Path,
) -> Vec<Option<Passage>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut windows: Vec<Window> = params_list.iter().cloned().map(Window::new).collect();
    let mut best: Vec<Option<Window>> = vec![None; params_list.len()];
    let mut best_scores = vec![0.0f64; params_list.len()];

    for word in words {
        let word = word.as_ref();
        for ((window, slot), best_score) in windows.iter_mut().zip(best.iter_mut()).zip(best_scores.iter_mut()) {
            window.add_word(word);
            let score = window.score();
            if score > *best_score {
                *best_score = score;
                *slot = Some(window.clone());
            }
        }
    }

    best.into_iter()
        .map(|window| window.map(|w| Passage::new(w, file_path)))
        .collect()
}
