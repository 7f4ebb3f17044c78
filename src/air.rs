use miette::Report;

use crate::error;
use crate::isa::ADDR_MAX;
use crate::span::Span;
use crate::symbol::SymbolTable;

/// Where a resolved 11-bit label address lands inside a word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PatchSlot {
    /// Above the pad bit of a one-word jump.
    JumpTarget,
    /// The low bits of a branch or jump second word.
    AddressWord,
}

impl PatchSlot {
    /// Substitute the address into the fixed surrounding bits.
    pub fn apply(self, bits: u16, addr: u16) -> u16 {
        let addr = addr & ADDR_MAX as u16;
        match self {
            PatchSlot::JumpTarget => bits | addr << 1,
            PatchSlot::AddressWord => bits | addr,
        }
    }
}

/// A word carrying everything except a missing label's address.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Patch {
    pub bits: u16,
    pub slot: PatchSlot,
    pub label: String,
    pub span: Span,
}

/// One 16-bit program memory word, tagged by its assembly state.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Word {
    Resolved(u16),
    /// Forward reference, deferred to the fixup pass.
    Deferred(Patch),
    /// Stand-in for a word whose line already produced a diagnostic.
    /// Keeps later addresses stable; the emission gate keeps it off disk.
    Poisoned,
}

/// Assembly intermediate representation: the ordered word stream, with each
/// word's address given by its position.
#[derive(Default, Debug)]
pub struct Air {
    words: Vec<Word>,
}

impl Air {
    pub fn new() -> Self {
        Air { words: Vec::new() }
    }

    /// Current program counter: one unit per word pushed so far.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn push(&mut self, word: Word) {
        self.words.push(word);
    }

    /// Resolve every deferred reference against the completed symbol table.
    ///
    /// Must not run until scanning has consumed every line, otherwise a
    /// legitimate forward reference is indistinguishable from an undefined
    /// label. Each undefined label is reported once and resolution continues
    /// so they all surface together.
    pub fn backpatch(self, symbols: &SymbolTable, src: &str, diags: &mut Vec<Report>) -> Vec<u16> {
        self.words
            .into_iter()
            .map(|word| match word {
                Word::Resolved(bits) => bits,
                Word::Deferred(patch) => match symbols.lookup(&patch.label) {
                    Some(addr) => patch.slot.apply(patch.bits, addr),
                    None => {
                        diags.push(error::undefined_label(patch.span, src, &patch.label));
                        0
                    }
                },
                Word::Poisoned => 0,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn patch_slots() {
        assert_eq!(PatchSlot::JumpTarget.apply(0b1001 << 12, 0x005), 0b1001_0000_0000_1010);
        assert_eq!(PatchSlot::AddressWord.apply(0, 0x7FF), 0b0000_0111_1111_1111);
    }

    #[test]
    fn backpatch_resolves_deferred() {
        let mut symbols = SymbolTable::new();
        symbols.define("LOOP", 3);
        let mut air = Air::new();
        air.push(Word::Resolved(0x1234));
        air.push(Word::Deferred(Patch {
            bits: 0,
            slot: PatchSlot::AddressWord,
            label: "LOOP".to_string(),
            span: Span::default(),
        }));
        let mut diags = Vec::new();
        let words = air.backpatch(&symbols, "", &mut diags);
        assert!(diags.is_empty());
        assert_eq!(words, vec![0x1234, 3]);
    }

    #[test]
    fn backpatch_reports_each_undefined_label() {
        let symbols = SymbolTable::new();
        let mut air = Air::new();
        for name in ["A", "B"] {
            air.push(Word::Deferred(Patch {
                bits: 0,
                slot: PatchSlot::AddressWord,
                label: name.to_string(),
                span: Span::default(),
            }));
        }
        let mut diags = Vec::new();
        let _ = air.backpatch(&symbols, "", &mut diags);
        assert_eq!(diags.len(), 2);
    }
}
