use miette::{miette, LabeledSpan, Report, Severity};

use crate::isa::{ADDR_MAX, IMM_MAX, PM_WORDS};
use crate::span::Span;

// Scanning errors (fatal)

pub fn unknown_mnemonic(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::unknown_mnemonic",
        help = "check the mnemonic against the instruction set listing",
        labels = vec![LabeledSpan::at(span, "not a known instruction")],
        "Encountered an unknown mnemonic.",
    )
    .with_source_code(src.to_string())
}

pub fn unknown_register(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::unknown_register",
        help = "valid register names are R0 through R31",
        labels = vec![LabeledSpan::at(span, "not a valid register")],
        "Encountered an unknown register name.",
    )
    .with_source_code(src.to_string())
}

// Encoding errors (accumulated)

pub fn imm_out_of_range(span: Span, src: &str, val: u32) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::imm_range",
        help = format!("immediate values range from 0x0 to {IMM_MAX:#X}"),
        labels = vec![LabeledSpan::at(span, "does not fit in 5 bits")],
        "Immediate value {val:#X} is out of range.",
    )
    .with_source_code(src.to_string())
}

pub fn addr_out_of_range(span: Span, src: &str, val: u32) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::addr_range",
        help = format!("program memory addresses range from 0x0 to {ADDR_MAX:#X}"),
        labels = vec![LabeledSpan::at(span, "does not fit in 11 bits")],
        "Memory address {val:#X} is out of range.",
    )
    .with_source_code(src.to_string())
}

pub fn illegal_parens(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::illegal_parens",
        help = "a register indirect operand is written like 0x1F(R2)",
        labels = vec![LabeledSpan::at(span, "malformed operand")],
        "Illegal parenthesis placement in operand.",
    )
    .with_source_code(src.to_string())
}

pub fn bad_operand(span: Span, src: &str, expected: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::bad_operand",
        help = "check the operand list for this instruction",
        labels = vec![LabeledSpan::at(span, "unexpected operand")],
        "Expected {expected} here.",
    )
    .with_source_code(src.to_string())
}

pub fn missing_operand(span: Span, src: &str, expected: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::missing_operand",
        help = "check the operand list for this instruction",
        labels = vec![LabeledSpan::at(span, "instruction is incomplete")],
        "Missing operand: expected {expected}.",
    )
    .with_source_code(src.to_string())
}

pub fn label_out_of_range(span: Span, src: &str, addr: usize) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::label_range",
        help = format!("program memory addresses range from 0x0 to {ADDR_MAX:#X}"),
        labels = vec![LabeledSpan::at(span, "label lies beyond program memory")],
        "Label address {addr:#X} does not fit in 11 bits.",
    )
    .with_source_code(src.to_string())
}

pub fn duplicate_label(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::duplicate_label",
        help = "a label may be defined only once; the first address is kept",
        labels = vec![LabeledSpan::at(span, "label defined again")],
        "Duplicate label definition.",
    )
    .with_source_code(src.to_string())
}

// Fixup errors (accumulated)

pub fn undefined_label(span: Span, src: &str, name: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "fixup::undefined_label",
        help = "branch and jump targets must be labels defined somewhere in the program",
        labels = vec![LabeledSpan::at(span, "label is never defined")],
        "Undefined label `{name}`.",
    )
    .with_source_code(src.to_string())
}

pub fn pm_overflow(words: usize) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::pm_overflow",
        help = format!("program memory holds {PM_WORDS} words"),
        "Program needs {words} words and does not fit in program memory.",
    )
}
