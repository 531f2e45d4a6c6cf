//! This scanner tokenizes ILOC source text, one token per call.
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::fmt;

/// Lexical classes produced by the scanner. The parser drives the line
/// grammar entirely off these kinds.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Eof,
    Blank,
    Comment,
    Assign,
    Reg,
    Cmd,
    Comma,
    Num,
    InvalidNum,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Blank => "BLANK",
            TokenKind::Comment => "COMMENT",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Reg => "REG",
            TokenKind::Cmd => "CMD",
            TokenKind::Comma => "COMMA",
            TokenKind::Num => "NUM",
            TokenKind::InvalidNum => "INVALID_NUM",
        };
        write!(f, "{}", name)
    }
}

// Tokens carry the 1-based source line they appear on.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub line: usize,
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    fn new(line: usize, kind: TokenKind, lexeme: String) -> Token {
        Token { line, kind, lexeme }
    }

    fn eof(line: usize) -> Token {
        Token::new(line, TokenKind::Eof, "EOF".to_string())
    }
}

/// A stateful line scanner. It buffers one source line at a time and hands
/// out classified tokens on demand; the cursor tracks the unconsumed suffix
/// of the buffered line.
pub struct Scanner<R: Read> {
    reader: BufReader<R>,
    buf: String,
    pos: usize,
    active: bool,
    line_num: usize,
    eof: bool,
}

impl Scanner<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Scanner<File>> {
        Ok(Scanner::new(File::open(path)?))
    }
}

impl<R: Read> Scanner<R> {
    pub fn new(source: R) -> Scanner<R> {
        Scanner {
            reader: BufReader::new(source),
            buf: String::new(),
            pos: 0,
            active: false,
            line_num: 0,
            eof: false,
        }
    }

    /// Discards whatever remains of the buffered line, so the next
    /// `next_token` call starts on a fresh one. Error recovery uses this to
    /// skip the rest of a malformed line.
    pub fn next_line(&mut self) {
        self.active = false;
    }

    /// Returns the next token. Once the source is exhausted this keeps
    /// returning the EOF marker.
    pub fn next_token(&mut self) -> Token {
        loop {
            if !self.active {
                if !self.read_line() {
                    return Token::eof(self.line_num);
                }
                if self.buf.is_empty() {
                    self.active = false;
                    return Token::new(self.line_num, TokenKind::Blank, String::new());
                }
            }

            // A comment marker anywhere in the unconsumed suffix truncates
            // the line at the marker; the text to its left stays buffered
            // and is tokenized by subsequent calls.
            if let Some(found) = self.buf[self.pos..].find("//") {
                self.buf.truncate(self.pos + found);
                let kept = self.buf.trim_end().len();
                self.buf.truncate(kept);
                if self.pos >= self.buf.len() {
                    self.active = false;
                }
                return Token::new(self.line_num, TokenKind::Comment, String::new());
            }

            self.skip_whitespace();
            if self.pos >= self.buf.len() {
                self.active = false;
                continue;
            }

            if let Some(token) = self.lex_token() {
                return token;
            }
        }
    }

    /// Accumulates one token from the buffered line. The classification is
    /// decided by the first character; every later character either extends
    /// the token or terminates it:
    ///   - a comma after token content terminates without being consumed
    ///     (it is scanned as its own token on the next call);
    ///   - an `=` after token content also terminates unconsumed, which
    ///     splits a register or number glued to `=>`;
    ///   - a completed `=>` is returned as a unit;
    ///   - whitespace terminates and is consumed;
    ///   - a NUM that picks up a non-digit becomes INVALID_NUM for the rest
    ///     of its accumulation.
    fn lex_token(&mut self) -> Option<Token> {
        let line = self.line_num;
        let mut lexeme = String::new();
        let mut kind = TokenKind::Num;

        while let Some(c) = self.peek() {
            if lexeme.is_empty() {
                kind = self.classify(c);
                if kind == TokenKind::Comma {
                    self.advance(c);
                    return Some(Token::new(line, kind, ",".to_string()));
                }
            } else {
                if c == ',' || c == '=' {
                    return Some(Token::new(line, kind, lexeme));
                }
                if lexeme == "=>" {
                    return Some(Token::new(line, kind, lexeme));
                }
                if c == ' ' || c == '\t' {
                    self.skip_whitespace();
                    return Some(Token::new(line, kind, lexeme));
                }
            }

            lexeme.push(c);
            self.advance(c);
            if kind == TokenKind::Num && !c.is_ascii_digit() {
                kind = TokenKind::InvalidNum;
            }
        }

        // Ran off the end of the line mid-token.
        self.active = false;
        if lexeme.is_empty() {
            None
        } else {
            Some(Token::new(line, kind, lexeme))
        }
    }

    /// Picks the in-progress token kind from its first character. An `r` is
    /// only a register lead-in when not immediately followed by `s`, which
    /// keeps `rshift` out of the register class.
    fn classify(&self, c: char) -> TokenKind {
        match c {
            '=' => TokenKind::Assign,
            ',' => TokenKind::Comma,
            'r' if self.peek_second() != Some('s') => TokenKind::Reg,
            'a'..='z' => TokenKind::Cmd,
            _ => TokenKind::Num,
        }
    }

    /// Pulls the next source line into the buffer, stripping the newline and
    /// trailing whitespace. Returns false once the source is exhausted; an
    /// I/O error mid-file is reported and treated as end of input.
    fn read_line(&mut self) -> bool {
        if self.eof {
            return false;
        }
        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => {
                self.eof = true;
                false
            }
            Ok(_) => {
                let kept = self.buf.trim_end().len();
                self.buf.truncate(kept);
                self.pos = 0;
                self.line_num += 1;
                self.active = true;
                true
            }
            Err(err) => {
                error!("unable to read line {}: {}", self.line_num + 1, err);
                self.eof = true;
                false
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.buf[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.buf[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' {
                self.advance(c);
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::TokenKind::*;

    fn tok(line: usize, kind: TokenKind, lexeme: &str) -> Token {
        Token::new(line, kind, lexeme.to_string())
    }

    fn scan_str(src: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(src.as_bytes());
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token();
            let done = token.kind == Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    #[test]
    fn test_single_instruction() {
        assert_eq!(scan_str("loadI 2 => r1"), vec![
            tok(1, Cmd, "loadI"),
            tok(1, Num, "2"),
            tok(1, Assign, "=>"),
            tok(1, Reg, "r1"),
            tok(1, Eof, "EOF"),
        ]);
    }

    #[test]
    fn test_commas_and_tabs() {
        assert_eq!(scan_str("add\tr1, r2 => r3"), vec![
            tok(1, Cmd, "add"),
            tok(1, Reg, "r1"),
            tok(1, Comma, ","),
            tok(1, Reg, "r2"),
            tok(1, Assign, "=>"),
            tok(1, Reg, "r3"),
            tok(1, Eof, "EOF"),
        ]);

        // No space around the comma: it still bounds both registers.
        assert_eq!(scan_str("add r1,r2 => r3"), vec![
            tok(1, Cmd, "add"),
            tok(1, Reg, "r1"),
            tok(1, Comma, ","),
            tok(1, Reg, "r2"),
            tok(1, Assign, "=>"),
            tok(1, Reg, "r3"),
            tok(1, Eof, "EOF"),
        ]);
    }

    #[test]
    fn test_assign_glued_to_operands() {
        // The '=' bounds the register on its left, and the register on the
        // right bounds the completed '=>'.
        assert_eq!(scan_str("store r1=>r2"), vec![
            tok(1, Cmd, "store"),
            tok(1, Reg, "r1"),
            tok(1, Assign, "=>"),
            tok(1, Reg, "r2"),
            tok(1, Eof, "EOF"),
        ]);
    }

    #[test]
    fn test_incomplete_assign() {
        // A bare '=' never grows into '=>'; it comes back as the
        // accumulated ASSIGN-kind lexeme.
        assert_eq!(scan_str("loadI 2 = r1"), vec![
            tok(1, Cmd, "loadI"),
            tok(1, Num, "2"),
            tok(1, Assign, "="),
            tok(1, Reg, "r1"),
            tok(1, Eof, "EOF"),
        ]);

        assert_eq!(scan_str("r1 ="), vec![
            tok(1, Reg, "r1"),
            tok(1, Assign, "="),
            tok(1, Eof, "EOF"),
        ]);
    }

    #[test]
    fn test_trailing_comment() {
        // The comment token is produced first, when the marker is cut off
        // the line; the text to its left then scans exactly as it would
        // have without the comment.
        assert_eq!(scan_str("output 5 // print it"), vec![
            tok(1, Comment, ""),
            tok(1, Cmd, "output"),
            tok(1, Num, "5"),
            tok(1, Eof, "EOF"),
        ]);
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(scan_str("\n// nothing here\n   \nnop"), vec![
            tok(1, Blank, ""),
            tok(2, Comment, ""),
            tok(3, Blank, ""),
            tok(4, Cmd, "nop"),
            tok(4, Eof, "EOF"),
        ]);
    }

    #[test]
    fn test_register_heuristic() {
        // 'r' followed by 's' is an opcode lead-in, not a register.
        assert_eq!(scan_str("rshift")[0], tok(1, Cmd, "rshift"));
        assert_eq!(scan_str("r1")[0], tok(1, Reg, "r1"));
        // The scanner only classifies; a malformed register is still REG
        // here and is rejected by the parser.
        assert_eq!(scan_str("rabc")[0], tok(1, Reg, "rabc"));
        assert_eq!(scan_str("r")[0], tok(1, Reg, "r"));
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(scan_str("2x")[0], tok(1, InvalidNum, "2x"));
        // The kind sticks for the remainder of the token.
        assert_eq!(scan_str("23a4")[0], tok(1, InvalidNum, "23a4"));
        // Uppercase starts a numeric-looking token and immediately spoils it.
        assert_eq!(scan_str("ADD")[0], tok(1, InvalidNum, "ADD"));
    }

    #[test]
    fn test_eof_idempotent() {
        let mut scanner = Scanner::new("nop".as_bytes());
        assert_eq!(scanner.next_token(), tok(1, Cmd, "nop"));
        assert_eq!(scanner.next_token(), tok(1, Eof, "EOF"));
        assert_eq!(scanner.next_token(), tok(1, Eof, "EOF"));
        assert_eq!(scanner.next_token(), tok(1, Eof, "EOF"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(scan_str(""), vec![tok(0, Eof, "EOF")]);
    }

    #[test]
    fn test_next_line_discards_remainder() {
        let mut scanner = Scanner::new("add r1, r2 => r3\nnop".as_bytes());
        assert_eq!(scanner.next_token(), tok(1, Cmd, "add"));
        scanner.next_line();
        assert_eq!(scanner.next_token(), tok(2, Cmd, "nop"));
        assert_eq!(scanner.next_token(), tok(2, Eof, "EOF"));
    }

    #[test]
    fn test_rescan_is_identical() {
        let src = "loadI 2 => r1\nadd r1, r2 => r3 // sum\n\noutput 5\n";
        assert_eq!(scan_str(src), scan_str(src));
    }

    #[test]
    fn test_full_program() {
        let src = "loadI 8 => r1\n// double it\nadd r1, r1 => r2\noutput 0\n";
        assert_eq!(scan_str(src), vec![
            tok(1, Cmd, "loadI"),
            tok(1, Num, "8"),
            tok(1, Assign, "=>"),
            tok(1, Reg, "r1"),
            tok(2, Comment, ""),
            tok(3, Cmd, "add"),
            tok(3, Reg, "r1"),
            tok(3, Comma, ","),
            tok(3, Reg, "r1"),
            tok(3, Assign, "=>"),
            tok(3, Reg, "r2"),
            tok(4, Cmd, "output"),
            tok(4, Num, "0"),
            tok(4, Eof, "EOF"),
        ]);
    }
}
