use std::str::FromStr;

/// Program memory capacity in 16-bit words.
pub const PM_WORDS: usize = 2048;

/// Largest 5-bit immediate operand.
pub const IMM_MAX: u32 = 0x1F;

/// Largest 11-bit program memory address.
pub const ADDR_MAX: u32 = 0x7FF;

/// One of the 32 CPU registers, held as its 5-bit field code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Register(u8);

impl Register {
    /// R0, also used to zero-fill unused register fields.
    pub const ZERO: Register = Register(0);

    pub fn code(self) -> u8 {
        self.0
    }
}

impl FromStr for Register {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(['R', 'r']).ok_or(())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }
        match digits.parse::<u8>() {
            Ok(n) if n < 32 => Ok(Register(n)),
            _ => Err(()),
        }
    }
}

/// Complete mnemonic inventory of the target CPU.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mnemonic {
    ADD,
    ADDI,
    SUB,
    SUBI,
    MUL,
    MULI,
    DIV,
    DIVI,
    LOG,
    RTL,
    RTR,
    RTLI,
    RTRI,
    SLL,
    SRL,
    SLLI,
    SRLI,
    SLA,
    SRA,
    SLAI,
    SRAI,
    LD,
    ST,
    JMP,
    BNE,
    BNEZ,
    IOR,
    IOW,
    ICR,
    ICW,
    ANDI,
    ORI,
    XORI,
    NOT,
    CP,
}

/// Encoding family of a mnemonic; decides operand shape and word count.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shape {
    /// One word: opcode, reg1, reg2 or 5-bit immediate, select.
    Arith { imm: bool },
    /// Two words: load/store with an 11-bit address in the second.
    Mem { store: bool },
    /// One word: 11-bit target address plus a pad bit.
    Jump,
    /// Two words: compare registers (or test against zero), target in the second.
    Branch { zero: bool },
    /// One word: I/O or cache control on a single register.
    Io,
}

impl Shape {
    /// Number of 16-bit words this family occupies in program memory.
    pub fn words(self) -> usize {
        match self {
            Shape::Arith { .. } | Shape::Jump | Shape::Io => 1,
            Shape::Mem { .. } | Shape::Branch { .. } => 2,
        }
    }
}

impl Mnemonic {
    /// 4-bit opcode family.
    pub fn opcode(self) -> u8 {
        use Mnemonic::*;
        match self {
            ADD | ADDI => 0b0000,
            SUB | SUBI => 0b0001,
            MUL | MULI => 0b0010,
            DIV | DIVI => 0b0011,
            LOG => 0b0100,
            RTL | RTR | RTLI | RTRI => 0b0101,
            SLL | SRL | SLLI | SRLI => 0b0110,
            SLA | SRA | SLAI | SRAI => 0b0111,
            LD | ST => 0b1000,
            JMP => 0b1001,
            BNE | BNEZ => 0b1010,
            IOR | IOW | ICR | ICW => 0b1011,
            ANDI | ORI | XORI | NOT => 0b1100,
            CP => 0b1101,
        }
    }

    /// 2-bit instruction select, fixed by mnemonic spelling.
    ///
    /// LD/ST selects depend on operand form and JMP has no select field;
    /// the encoder supplies those.
    pub fn sel(self) -> u8 {
        use Mnemonic::*;
        match self {
            ADD | SUB | MUL | DIV | LOG | RTL | SLL | SLA | CP => 0b00,
            BNEZ | IOR | ANDI => 0b00,
            ADDI | SUBI | MULI | DIVI | RTR | SRL | SRA => 0b01,
            BNE | IOW | ORI => 0b01,
            RTLI | SLLI | SLAI | ICR | XORI => 0b10,
            RTRI | SRLI | SRAI | ICW | NOT => 0b11,
            LD | ST | JMP => 0b00,
        }
    }

    pub fn shape(self) -> Shape {
        use Mnemonic::*;
        match self {
            ADD | SUB | MUL | DIV | LOG | RTL | RTR | SLL | SRL | SLA | SRA | CP => {
                Shape::Arith { imm: false }
            }
            ADDI | SUBI | MULI | DIVI | RTLI | RTRI | SLLI | SRLI | SLAI | SRAI | ANDI | ORI
            | XORI | NOT => Shape::Arith { imm: true },
            LD => Shape::Mem { store: false },
            ST => Shape::Mem { store: true },
            JMP => Shape::Jump,
            BNE => Shape::Branch { zero: false },
            BNEZ => Shape::Branch { zero: true },
            IOR | IOW | ICR | ICW => Shape::Io,
        }
    }
}

impl FromStr for Mnemonic {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Mnemonic::*;
        let m = match s.to_ascii_uppercase().as_str() {
            "ADD" => ADD,
            "ADDI" => ADDI,
            "SUB" => SUB,
            "SUBI" => SUBI,
            "MUL" => MUL,
            "MULI" => MULI,
            "DIV" => DIV,
            "DIVI" => DIVI,
            "LOG" => LOG,
            "RTL" => RTL,
            "RTR" => RTR,
            "RTLI" => RTLI,
            "RTRI" => RTRI,
            "SLL" => SLL,
            "SRL" => SRL,
            "SLLI" => SLLI,
            "SRLI" => SRLI,
            "SLA" => SLA,
            "SRA" => SRA,
            "SLAI" => SLAI,
            "SRAI" => SRAI,
            "LD" => LD,
            "ST" => ST,
            "JMP" => JMP,
            "BNE" => BNE,
            "BNEZ" => BNEZ,
            "IOR" => IOR,
            "IOW" => IOW,
            "ICR" => ICR,
            "ICW" => ICW,
            "ANDI" => ANDI,
            "ORI" => ORI,
            "XORI" => XORI,
            "NOT" => NOT,
            "CP" => CP,
            _ => return Err(()),
        };
        Ok(m)
    }
}
