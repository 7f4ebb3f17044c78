use miette::Report;

use crate::air::Air;
use crate::encode::Encoder;
use crate::error;
use crate::isa::{ADDR_MAX, PM_WORDS};
use crate::mif::Image;
use crate::parse;
use crate::symbol::SymbolTable;

/// Assemble a complete source text into a program memory image.
///
/// `Err` carries every diagnostic recorded across scanning and fixup; the
/// image exists only when that collection would have been empty.
pub fn assemble(src: &str) -> Result<Image, Vec<Report>> {
    Assembler::new(src).assemble()
}

/// State for one assembly run: the symbol table, the growing word stream,
/// and the accumulated diagnostics, threaded through both phases.
pub struct Assembler<'a> {
    src: &'a str,
    symbols: SymbolTable,
    air: Air,
    diags: Vec<Report>,
}

impl<'a> Assembler<'a> {
    pub fn new(src: &'a str) -> Self {
        Assembler {
            src,
            symbols: SymbolTable::new(),
            air: Air::new(),
            diags: Vec::new(),
        }
    }

    pub fn assemble(mut self) -> Result<Image, Vec<Report>> {
        // A fatal error stops the scan with whatever was collected so far
        if let Err(fatal) = self.scan() {
            self.diags.push(fatal);
            return Err(self.diags);
        }
        if self.air.len() > PM_WORDS {
            self.diags.push(error::pm_overflow(self.air.len()));
        }

        // Fixup must not start until every label definition is known
        let words = self.air.backpatch(&self.symbols, self.src, &mut self.diags);

        if self.diags.is_empty() {
            Ok(Image::new(words))
        } else {
            Err(self.diags)
        }
    }

    /// Scanning phase: define labels at the current program counter, encode
    /// each instruction, advance the counter once per emitted word.
    fn scan(&mut self) -> miette::Result<()> {
        let encoder = Encoder::new(self.src);
        let mut offs = 0;
        for raw in self.src.split('\n') {
            let line = parse::line(raw, offs);

            // The label names the address of this line's first word
            if let Some(label) = line.label {
                let pc = self.air.len();
                // A trailing label on a full program escapes the word-count
                // check, so exhaustion is caught at definition time
                if pc > ADDR_MAX as usize {
                    self.diags.push(error::label_out_of_range(label.span, self.src, pc));
                }
                if !self.symbols.define(label.text, pc as u16) {
                    self.diags.push(error::duplicate_label(label.span, self.src));
                }
            }

            for word in encoder.encode(&line, &self.symbols, &mut self.diags)? {
                self.air.push(word);
            }
            offs += raw.len() + 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn words(src: &str) -> Vec<u16> {
        match assemble(src) {
            Ok(image) => image.words().to_vec(),
            Err(diags) => panic!("expected clean assembly, got {diags:?}"),
        }
    }

    fn diags(src: &str) -> Vec<Report> {
        match assemble(src) {
            Ok(_) => panic!("expected diagnostics"),
            Err(diags) => diags,
        }
    }

    #[test]
    fn empty_source() {
        assert!(words("").is_empty());
        assert!(words("\n\n  \n").is_empty());
    }

    #[test]
    fn loop_example_end_to_end() {
        let image = words("LOOP: ADD R1,R2,R3\nBNEZ R1,LOOP");
        // ADD: 0000 00001 00010 00
        assert_eq!(image[0], 0b0000_0000_1000_1000);
        // BNEZ word one: 1010 00001 00000 00
        assert_eq!(image[1], 0b1010_0000_1000_0000);
        // Second word carries LOOP's address, zero
        assert_eq!(image[2], 0b0000_0000_0000_0000);
    }

    #[test]
    fn two_word_instructions_advance_counter_twice() {
        // LD occupies addresses 0 and 1, so END lands on 2
        let image = words("LD R1, 0x10\nEND: ADD R1,R2,R3\nJMP END");
        assert_eq!(image.len(), 4);
        assert_eq!(image[3], 0b1001 << 12 | 2 << 1);
    }

    #[test]
    fn forward_and_backward_references_agree() {
        let image = words("JMP MID\nMID: ADD R1,R2,R3\nJMP MID");
        assert_eq!(image[0], image[2]);
        assert_eq!(image[0], 0b1001 << 12 | 1 << 1);
    }

    #[test]
    fn bare_label_line_takes_next_address() {
        let image = words("ADD R1,R2,R3\nEND:\nJMP END");
        assert_eq!(image[1], 0b1001 << 12 | 1 << 1);
    }

    #[test]
    fn unknown_mnemonic_halts_scan() {
        let ds = diags("ADD R1,R2,R3\nFROB R1\nLD R1, 0x800");
        // The bad LD line is never reached
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn soft_errors_accumulate() {
        let ds = diags("ADDI R1,R1,0x20\nLD R2, 0x800\nADD R1,R2,R3");
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn immediate_gate_example() {
        assert_eq!(words("ADDI R4,R4,0x1F")[0], 0b0000_0010_0111_1101);
        assert_eq!(diags("ADDI R4,R4,0x20").len(), 1);
    }

    #[test]
    fn undefined_label_reported_once_after_fixup() {
        let ds = diags("BNEZ R1, NOWHERE");
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn undefined_labels_all_reported() {
        let ds = diags("JMP A\nJMP B\nADD R1,R2,R3");
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn duplicate_label_keeps_first_address() {
        let ds = diags("A: ADD R1,R2,R3\nA: SUB R1,R2,R3\nJMP A");
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn exactly_full_program_assembles() {
        let mut src = String::from("TOP: ADD R1,R2,R3\n");
        for _ in 0..2047 {
            src.push_str("ADD R1,R2,R3\n");
        }
        assert_eq!(words(&src).len(), 2048);
    }

    #[test]
    fn trailing_label_past_address_space() {
        // Exactly 2048 words, then a label at address 2048: the word count
        // fits but the label's address needs a twelfth bit
        let mut src = String::from("JMP END\n");
        for _ in 0..2047 {
            src.push_str("ADD R1,R2,R3\n");
        }
        src.push_str("END:");
        let ds = diags(&src);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn overflowing_program_rejected() {
        let mut src = String::new();
        for _ in 0..2049 {
            src.push_str("ADD R1,R2,R3\n");
        }
        assert!(!diags(&src).is_empty());
    }

    #[test]
    fn poisoned_lines_keep_addresses_stable() {
        // The bad ADDI still occupies address 0, so END stays at 1
        let mut asm = Assembler::new("ADDI R1,R1,0x20\nEND: ADD R1,R2,R3");
        asm.scan().unwrap();
        assert_eq!(asm.diags.len(), 1);
        assert_eq!(asm.air.len(), 2);
        assert_eq!(asm.symbols.lookup("END"), Some(1));
    }
}
