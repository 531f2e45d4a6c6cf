//! The parser imposes the line grammar over the scanner's token stream,
//! builds the intermediate form, and recovers from syntax errors by skipping
//! to the next source line.
use std::fmt;
use std::io::Read;

use regex::Regex;

use super::ir::{Opcode, Operand, OperationRecord};
use super::scanner::{Scanner, Token, TokenKind};

/// A recoverable per-line error. The pass reports each one where it is
/// found and keeps going on the following line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ParseError {
    Syntax { line: usize, symbol: String },
    InvalidNumber { line: usize, lexeme: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Syntax { line, symbol } => {
                write!(f, "ERROR {}: syntax error on symbol {}", line, symbol)
            }
            ParseError::InvalidNumber { line, lexeme } => {
                write!(f, "ERROR {}: invalid number {}", line, lexeme)
            }
        }
    }
}

pub struct Parser<R: Read> {
    scanner: Scanner<R>,
    records: Vec<OperationRecord>,
    errors: Vec<ParseError>,
    status: String,
    reg_pattern: Regex,
}

impl<R: Read> Parser<R> {
    pub fn new(scanner: Scanner<R>) -> Parser<R> {
        Parser {
            scanner,
            records: Vec::new(),
            errors: Vec::new(),
            status: String::new(),
            reg_pattern: Regex::new(r"^r\d+$").unwrap(),
        }
    }

    /// Runs the full pass over the input, accumulating operation records and
    /// error records and leaving the final status message behind. Blank and
    /// comment tokens are skipped outright; everything else must open an
    /// operation.
    pub fn parse(&mut self) {
        loop {
            let token = self.scanner.next_token();
            match token.kind {
                TokenKind::Comment | TokenKind::Blank => continue,
                TokenKind::Eof => break,
                _ => {}
            }

            let opcode = match Opcode::from_mnemonic(&token.lexeme) {
                Some(opcode) if token.kind == TokenKind::Cmd => opcode,
                _ => {
                    self.recover(ParseError::Syntax {
                        line: token.line,
                        symbol: token.lexeme,
                    });
                    continue;
                }
            };

            match self.operation(opcode, token.line) {
                Ok(record) => self.records.push(record),
                Err(err) => self.recover(err),
            }
        }

        self.status = if self.errors.is_empty() {
            format!("Parse succeeded. Processed {} operations.", self.records.len())
        } else {
            "Parse found errors.".to_string()
        };
    }

    /// The status line left behind by `parse`.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The accepted operations, in source encounter order.
    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    /// The per-line errors found during the pass.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_records(self) -> Vec<OperationRecord> {
        self.records
    }

    /// Matches one opcode's required token sequence and builds its record.
    fn operation(&mut self, opcode: Opcode, line: usize) -> Result<OperationRecord, ParseError> {
        let mut operands: [Operand; 3] = Default::default();

        for step in opcode.shape() {
            let token = self.scanner.next_token();
            if token.kind != step.kind {
                return Err(Self::mismatch(step.kind, token));
            }
            if let Some(slot) = step.slot {
                operands[slot].sr = Some(match step.kind {
                    TokenKind::Reg => self.register(&token)?,
                    _ => token.lexeme,
                });
            }
        }

        Ok(OperationRecord { line, opcode, operands })
    }

    /// Validates a REG token against `r<digits>` and extracts the register
    /// number. The scanner's REG class only looks at the first character, so
    /// the rest of the lexeme is checked here.
    fn register(&self, token: &Token) -> Result<String, ParseError> {
        if self.reg_pattern.is_match(&token.lexeme) {
            Ok(token.lexeme[1..].to_string())
        } else {
            Err(ParseError::Syntax {
                line: token.line,
                symbol: token.lexeme.clone(),
            })
        }
    }

    fn mismatch(expected: TokenKind, token: Token) -> ParseError {
        match (expected, token.kind) {
            (TokenKind::Num, TokenKind::InvalidNum) => ParseError::InvalidNumber {
                line: token.line,
                lexeme: token.lexeme,
            },
            _ => ParseError::Syntax {
                line: token.line,
                symbol: token.lexeme,
            },
        }
    }

    /// Reports an error and discards the rest of the offending line, so the
    /// main loop resumes at the next one.
    fn recover(&mut self, err: ParseError) {
        error!("{}", err);
        self.errors.push(err);
        self.scanner.next_line();
    }
}
