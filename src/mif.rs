use std::fmt::Write as _;

/// Fully resolved program memory image.
///
/// Only ever constructed after the zero-diagnostics gate passes, so every
/// word is final. Rendering happens entirely in memory; callers commit the
/// result to its sink in one operation so a failed run never leaves a
/// partial image behind.
#[derive(PartialEq, Eq, Debug)]
pub struct Image {
    words: Vec<u16>,
}

impl Image {
    pub(crate) fn new(words: Vec<u16>) -> Self {
        Image { words }
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Render the memory initialization text: one fixed 32-character record
    /// per word, `{address:011b} : {word:016b};` plus a line break.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.words.len() * 32);
        for (addr, word) in self.words.iter().enumerate() {
            let _ = writeln!(out, "{addr:011b} : {word:016b};");
        }
        out
    }
}
