use miette::{Report, Result};

use crate::air::{Patch, PatchSlot, Word};
use crate::error;
use crate::isa::{Mnemonic, Register, Shape, ADDR_MAX, IMM_MAX};
use crate::parse::{Line, Token};
use crate::symbol::SymbolTable;

/// Operand classified by surface shape. Range checks are per family and
/// happen later.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Operand<'a> {
    Reg(Register),
    /// Bare hex literal, value not yet range checked.
    Lit(u32),
    /// `offset(Rbase)` memory indirect form.
    Indirect { offset: u32, base: Register },
    /// Anything else: a label reference, or garbage that resolves to one.
    Sym(&'a str),
}

/// Packs parsed lines into program memory words.
///
/// Hard failures (unknown mnemonic, unknown register) come back as `Err` and
/// abort the scan. Soft failures are pushed onto `diags` and yield
/// [`Word::Poisoned`] placeholders so later addresses stay correct.
pub struct Encoder<'a> {
    src: &'a str,
}

fn word1(opcode: u8, r1: u8, r2: u8, sel: u8) -> u16 {
    (opcode as u16) << 12 | (r1 as u16) << 7 | (r2 as u16) << 2 | sel as u16
}

fn poisoned(n: usize) -> Vec<Word> {
    vec![Word::Poisoned; n]
}

impl<'a> Encoder<'a> {
    pub fn new(src: &'a str) -> Self {
        Encoder { src }
    }

    /// Encode one parsed line into its word(s), resolving branch targets
    /// against `symbols` where already possible.
    pub fn encode(
        &self,
        line: &Line<'a>,
        symbols: &SymbolTable,
        diags: &mut Vec<Report>,
    ) -> Result<Vec<Word>> {
        let Some(m_tok) = line.mnemonic else {
            return Ok(Vec::new());
        };
        let m: Mnemonic = m_tok
            .text
            .parse()
            .map_err(|_| error::unknown_mnemonic(m_tok.span, self.src))?;

        match m.shape() {
            Shape::Arith { imm } => self.arith(m, imm, m_tok, line, diags),
            Shape::Mem { store } => self.mem(m, store, m_tok, line, diags),
            Shape::Jump => self.jump(m, m_tok, line, symbols, diags),
            Shape::Branch { zero } => self.branch(m, zero, m_tok, line, symbols, diags),
            Shape::Io => self.io(m, m_tok, line, diags),
        }
    }

    fn arith(
        &self,
        m: Mnemonic,
        imm: bool,
        m_tok: Token<'a>,
        line: &Line<'a>,
        diags: &mut Vec<Report>,
    ) -> Result<Vec<Word>> {
        let Some(r1) = self.reg_operand(line, 0, m_tok, diags)? else {
            return Ok(poisoned(1));
        };

        let field = if imm {
            self.imm_field(m, m_tok, line, diags)?
        } else {
            self.reg_operand(line, 1, m_tok, diags)?.map(Register::code)
        };
        match field {
            Some(f) => Ok(vec![Word::Resolved(word1(m.opcode(), r1.code(), f, m.sel()))]),
            None => Ok(poisoned(1)),
        }
    }

    fn mem(
        &self,
        m: Mnemonic,
        store: bool,
        m_tok: Token<'a>,
        line: &Line<'a>,
        diags: &mut Vec<Report>,
    ) -> Result<Vec<Word>> {
        let Some(r1) = self.reg_operand(line, 0, m_tok, diags)? else {
            return Ok(poisoned(2));
        };
        let Some(addr_tok) = line.operands.get(1) else {
            diags.push(error::missing_operand(m_tok.span, self.src, "a memory address"));
            return Ok(poisoned(2));
        };

        let (base, bare, addr) = match self.classify(addr_tok, diags)? {
            Some(Operand::Lit(v)) => (Register::ZERO, true, v),
            Some(Operand::Indirect { offset, base }) => (base, false, offset),
            Some(_) => {
                diags.push(error::bad_operand(addr_tok.span, self.src, "a memory address"));
                return Ok(poisoned(2));
            }
            None => return Ok(poisoned(2)),
        };
        if addr > ADDR_MAX {
            diags.push(error::addr_out_of_range(addr_tok.span, self.src, addr));
            return Ok(poisoned(2));
        }

        let sel = (store as u8) << 1 | bare as u8;
        Ok(vec![
            Word::Resolved(word1(m.opcode(), r1.code(), base.code(), sel)),
            Word::Resolved(addr as u16),
        ])
    }

    fn jump(
        &self,
        m: Mnemonic,
        m_tok: Token<'a>,
        line: &Line<'a>,
        symbols: &SymbolTable,
        diags: &mut Vec<Report>,
    ) -> Result<Vec<Word>> {
        let bits = (m.opcode() as u16) << 12;
        match self.target(line, 0, m_tok, diags)? {
            Some(tok) => Ok(vec![self.resolve(bits, PatchSlot::JumpTarget, tok, symbols)]),
            None => Ok(poisoned(1)),
        }
    }

    fn branch(
        &self,
        m: Mnemonic,
        zero: bool,
        m_tok: Token<'a>,
        line: &Line<'a>,
        symbols: &SymbolTable,
        diags: &mut Vec<Report>,
    ) -> Result<Vec<Word>> {
        let Some(r1) = self.reg_operand(line, 0, m_tok, diags)? else {
            return Ok(poisoned(2));
        };
        let r2 = if zero {
            // Zero test compares against a zeroed field
            Register::ZERO
        } else {
            match self.reg_operand(line, 1, m_tok, diags)? {
                Some(r) => r,
                None => return Ok(poisoned(2)),
            }
        };

        let target_idx = if zero { 1 } else { 2 };
        let Some(tok) = self.target(line, target_idx, m_tok, diags)? else {
            return Ok(poisoned(2));
        };

        Ok(vec![
            Word::Resolved(word1(m.opcode(), r1.code(), r2.code(), m.sel())),
            self.resolve(0, PatchSlot::AddressWord, tok, symbols),
        ])
    }

    fn io(
        &self,
        m: Mnemonic,
        m_tok: Token<'a>,
        line: &Line<'a>,
        diags: &mut Vec<Report>,
    ) -> Result<Vec<Word>> {
        match self.reg_operand(line, 0, m_tok, diags)? {
            Some(r1) => Ok(vec![Word::Resolved(word1(
                m.opcode(),
                r1.code(),
                Register::ZERO.code(),
                m.sel(),
            ))]),
            None => Ok(poisoned(1)),
        }
    }

    /// Resolve a branch/jump target now if the label is already defined,
    /// otherwise defer it to the fixup pass.
    fn resolve(&self, bits: u16, slot: PatchSlot, tok: Token<'a>, symbols: &SymbolTable) -> Word {
        match symbols.lookup(tok.text) {
            Some(addr) => Word::Resolved(slot.apply(bits, addr)),
            None => Word::Deferred(Patch {
                bits,
                slot,
                label: tok.text.to_string(),
                span: tok.span,
            }),
        }
    }

    /// Operand at `idx` that must name a register.
    ///
    /// A name that resolves to no register is a hard failure since no field
    /// code exists to continue with. A literal in a register slot is soft.
    fn reg_operand(
        &self,
        line: &Line<'a>,
        idx: usize,
        m_tok: Token<'a>,
        diags: &mut Vec<Report>,
    ) -> Result<Option<Register>> {
        let Some(tok) = line.operands.get(idx) else {
            diags.push(error::missing_operand(m_tok.span, self.src, "a register"));
            return Ok(None);
        };
        match self.classify(tok, diags)? {
            Some(Operand::Reg(r)) => Ok(Some(r)),
            Some(Operand::Sym(_)) => Err(error::unknown_register(tok.span, self.src)),
            Some(_) => {
                diags.push(error::bad_operand(tok.span, self.src, "a register"));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Branch/jump target operand, which must be a label name.
    fn target(
        &self,
        line: &Line<'a>,
        idx: usize,
        m_tok: Token<'a>,
        diags: &mut Vec<Report>,
    ) -> Result<Option<Token<'a>>> {
        let Some(tok) = line.operands.get(idx) else {
            diags.push(error::missing_operand(m_tok.span, self.src, "a target label"));
            return Ok(None);
        };
        match self.classify(tok, diags)? {
            Some(Operand::Sym(_)) => Ok(Some(*tok)),
            Some(_) => {
                diags.push(error::bad_operand(tok.span, self.src, "a target label"));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// The 5-bit reg2 field of an immediate-form instruction: the first
    /// literal operand after reg1. Registers before it are the written-out
    /// source operands and are skipped, matching the three-operand surface
    /// syntax. `NOT` alone among the family accepts a register (or nothing)
    /// in this field.
    fn imm_field(
        &self,
        m: Mnemonic,
        m_tok: Token<'a>,
        line: &Line<'a>,
        diags: &mut Vec<Report>,
    ) -> Result<Option<u8>> {
        for tok in line.operands.iter().skip(1) {
            match self.classify(tok, diags)? {
                Some(Operand::Lit(v)) => {
                    if v > IMM_MAX {
                        diags.push(error::imm_out_of_range(tok.span, self.src, v));
                        return Ok(None);
                    }
                    return Ok(Some(v as u8));
                }
                Some(Operand::Reg(r)) if m == Mnemonic::NOT => return Ok(Some(r.code())),
                Some(Operand::Reg(_)) => continue,
                Some(_) => {
                    diags.push(error::bad_operand(tok.span, self.src, "an immediate literal"));
                    return Ok(None);
                }
                None => return Ok(None),
            }
        }
        if m == Mnemonic::NOT {
            return Ok(Some(Register::ZERO.code()));
        }
        diags.push(error::missing_operand(m_tok.span, self.src, "an immediate literal"));
        Ok(None)
    }

    /// Classify an operand token. `Ok(None)` means a soft diagnostic was
    /// recorded; an unknown register inside parentheses is as fatal as one
    /// in the open.
    fn classify(&self, tok: &Token<'a>, diags: &mut Vec<Report>) -> Result<Option<Operand<'a>>> {
        let t = tok.text;
        if let Ok(r) = t.parse::<Register>() {
            return Ok(Some(Operand::Reg(r)));
        }
        if let Some(v) = parse_hex(t) {
            return Ok(Some(Operand::Lit(v)));
        }
        if t.contains(['(', ')']) {
            let Some((before, inner)) = split_indirect(t) else {
                diags.push(error::illegal_parens(tok.span, self.src));
                return Ok(None);
            };
            let Ok(base) = inner.parse::<Register>() else {
                return Err(error::unknown_register(tok.span, self.src));
            };
            let Some(offset) = parse_hex(before) else {
                diags.push(error::illegal_parens(tok.span, self.src));
                return Ok(None);
            };
            return Ok(Some(Operand::Indirect { offset, base }));
        }
        Ok(Some(Operand::Sym(t)))
    }
}

/// Split `off(base)` into its parts; `None` when the punctuation is off.
fn split_indirect(t: &str) -> Option<(&str, &str)> {
    let open = t.find('(')?;
    if open == 0 || !t.ends_with(')') {
        return None;
    }
    let inner = &t[open + 1..t.len() - 1];
    if inner.is_empty() || inner.contains(['(', ')']) {
        return None;
    }
    Some((&t[..open], inner))
}

/// Hex literals are written `0x1F` (or bare `x1F`).
fn parse_hex(t: &str) -> Option<u32> {
    let digits = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .or_else(|| t.strip_prefix('x'))
        .or_else(|| t.strip_prefix('X'))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    // Absurdly long literals saturate so the range check trips
    Some(u32::from_str_radix(digits, 16).unwrap_or(u32::MAX))
}
