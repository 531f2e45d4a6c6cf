//! The frontend module turns ILOC source text into an ordered sequence of
//! validated operation records.
//!
//! It does this with a stateful line scanner and a non-lookahead recursive
//! descent parser that recovers from a syntax error by discarding the rest
//! of the offending line and resuming on the next one.

pub mod ir;
pub mod parser;
pub mod scanner;

use std::io;
use std::path::Path;

use self::ir::OperationRecord;
use self::parser::Parser;
use self::scanner::{Scanner, Token, TokenKind};

/// Scans the whole file and returns every token through the closing EOF
/// marker. Backs the token-listing mode.
pub fn scan_all<P: AsRef<Path>>(path: P) -> io::Result<Vec<Token>> {
    let mut scanner = Scanner::open(path)?;
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// Parses the whole file, returning the final status message and the
/// operation records that survived error recovery. Per-line errors are
/// reported during the pass and only surface here through the status.
pub fn parse<P: AsRef<Path>>(path: P) -> io::Result<(String, Vec<OperationRecord>)> {
    let scanner = Scanner::open(path)?;
    let mut parser = Parser::new(scanner);
    parser.parse();
    let status = parser.status().to_string();
    Ok((status, parser.into_records()))
}
