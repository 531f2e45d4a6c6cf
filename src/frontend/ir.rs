//! The intermediate form built by the parser: one record per accepted
//! operation, in source order.
//!
//! The source language is a register-transfer subset of ILOC. One operation
//! per line, operands separated by spaces or tabs, `=>` naming the
//! destination, `//` starting a comment:
//!
//! ```text
//! loadI 4     => r1   // r1 <- 4
//! loadI 8     => r2
//! add   r1,r2 => r3   // r3 <- r1 + r2
//! store r3    => r1   // MEM(r1) <- r3
//! output 0            // print MEM(0)
//! nop
//! ```
//!
//! Each operand slot carries the source register (or immediate) plus three
//! fields the later allocation stages fill in: physical register, virtual
//! register, and next use. The front end leaves those unset.

use std::fmt;

use super::scanner::TokenKind;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Opcode {
    Load,
    LoadI,
    Store,
    Add,
    Sub,
    Mult,
    Lshift,
    Rshift,
    Output,
    Nop,
}

impl Opcode {
    /// Looks up a mnemonic exactly as written. Mnemonics are case-sensitive.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        use Opcode::*;
        match mnemonic {
            "load" => Some(Load),
            "loadI" => Some(LoadI),
            "store" => Some(Store),
            "add" => Some(Add),
            "sub" => Some(Sub),
            "mult" => Some(Mult),
            "lshift" => Some(Lshift),
            "rshift" => Some(Rshift),
            "output" => Some(Output),
            "nop" => Some(Nop),
            _ => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        use Opcode::*;
        match self {
            Load => "load",
            LoadI => "loadI",
            Store => "store",
            Add => "add",
            Sub => "sub",
            Mult => "mult",
            Lshift => "lshift",
            Rshift => "rshift",
            Output => "output",
            Nop => "nop",
        }
    }

    /// The token sequence required after the mnemonic. The five shapes only
    /// differ in length and slot placement, so they live here as data and
    /// the parser walks whichever one the opcode names.
    pub fn shape(&self) -> &'static [Step] {
        use Opcode::*;
        match self {
            Output => OUTPUT_SHAPE,
            LoadI => LOADI_SHAPE,
            Load | Store => MEMORY_SHAPE,
            Add | Sub | Mult | Lshift | Rshift => THREE_REG_SHAPE,
            Nop => NOP_SHAPE,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// One step of an opcode's required token sequence: the expected kind and,
/// for operands, the record slot the token fills.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Step {
    pub kind: TokenKind,
    pub slot: Option<usize>,
}

const fn operand(kind: TokenKind, slot: usize) -> Step {
    Step { kind, slot: Some(slot) }
}

const fn punct(kind: TokenKind) -> Step {
    Step { kind, slot: None }
}

const OUTPUT_SHAPE: &[Step] = &[operand(TokenKind::Num, 0)];

const LOADI_SHAPE: &[Step] = &[
    operand(TokenKind::Num, 0),
    punct(TokenKind::Assign),
    operand(TokenKind::Reg, 2),
];

const MEMORY_SHAPE: &[Step] = &[
    operand(TokenKind::Reg, 0),
    punct(TokenKind::Assign),
    operand(TokenKind::Reg, 2),
];

const THREE_REG_SHAPE: &[Step] = &[
    operand(TokenKind::Reg, 0),
    punct(TokenKind::Comma),
    operand(TokenKind::Reg, 1),
    punct(TokenKind::Assign),
    operand(TokenKind::Reg, 2),
];

const NOP_SHAPE: &[Step] = &[];

/// One operand slot. `sr` holds the source register number or immediate as
/// text; `pr`, `vr`, and `nu` belong to the allocator and stay unset here.
/// Unset fields print as `-`.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Operand {
    pub sr: Option<String>,
    pub pr: Option<String>,
    pub vr: Option<String>,
    pub nu: Option<String>,
}

impl Operand {
    pub fn source(text: String) -> Operand {
        Operand { sr: Some(text), ..Operand::default() }
    }

    /// The four sub-fields in record order, `-` standing in for unset.
    pub fn fields(&self) -> [&str; 4] {
        [
            self.sr.as_deref().unwrap_or("-"),
            self.pr.as_deref().unwrap_or("-"),
            self.vr.as_deref().unwrap_or("-"),
            self.nu.as_deref().unwrap_or("-"),
        ]
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.fields().join(" "))
    }
}

/// One accepted operation. Unused slots keep their place so every record
/// has the same shape for the stages downstream.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OperationRecord {
    pub line: usize,
    pub opcode: Opcode,
    pub operands: [Operand; 3],
}

impl fmt::Display for OperationRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} [ {} ] [ {} ] [ {} ]",
            self.line, self.opcode, self.operands[0], self.operands[1], self.operands[2]
        )
    }
}
