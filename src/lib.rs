// Line parsing and encoding
mod parse;
mod encode;
mod air;
pub use air::{Air, Word};

// Driving a run
mod asm;
pub use asm::{assemble, Assembler};
mod mif;
pub use mif::Image;

// Static tables and run state
mod isa;
pub use isa::{Mnemonic, Register};
mod symbol;
pub use symbol::SymbolTable;

mod error;
mod span;
pub use span::Span;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 2;
