//! SQL Lexer - Tokenizes normalized SQL text into a stream of spanned tokens
//!
//! Words are kept verbatim (identifiers, keywords and bare literals all lex
//! to [`Token::Word`]); the parser decides what a word means from its
//! position and re-reads literal text through the token spans.

use std::{iter::Peekable, str::CharIndices};

use crate::error::{Error, Result};

/// Represents a single lexical token in the SQL input
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Run of characters up to whitespace, punctuation or a quote
    Word(String),
    /// Single-quoted literal, with `''` already unescaped
    String(String),
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
    Asterisk,
    Equal,
}

impl Token {
    /// Returns the keyword this token spells, if any
    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            Token::Word(w) => Keyword::from_str(w),
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }
}

/// A token with its byte range in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// SQL reserved keywords
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keyword {
    Create,
    Table,
    Select,
    From,
    Where,
    Join,
    On,
    And,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
}

impl Keyword {
    /// Attempts to parse a string as a keyword (case-insensitive)
    pub fn from_str(ident: &str) -> Option<Keyword> {
        Some(match ident.to_uppercase().as_ref() {
            "CREATE" => Keyword::Create,
            "TABLE" => Keyword::Table,
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,
            "JOIN" => Keyword::Join,
            "ON" => Keyword::On,
            "AND" => Keyword::And,
            "INSERT" => Keyword::Insert,
            "INTO" => Keyword::Into,
            "VALUES" => Keyword::Values,
            "UPDATE" => Keyword::Update,
            "SET" => Keyword::Set,
            "DELETE" => Keyword::Delete,
            _ => return None,
        })
    }
}

/// SQL lexical analyzer (lexer/tokenizer)
pub struct Lexer<'a> {
    iter: Peekable<CharIndices<'a>>,
    len: usize,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Lexeme>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan().transpose()
    }
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given SQL text
    pub fn new(sql_text: &'a str) -> Self {
        Self {
            iter: sql_text.char_indices().peekable(),
            len: sql_text.len(),
        }
    }

    /// Byte offset of the next unread character
    fn offset(&mut self) -> usize {
        self.iter.peek().map_or(self.len, |(i, _)| *i)
    }

    /// Consumes the next character if it satisfies the predicate
    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.iter.next_if(|(_, c)| predicate(*c)).map(|(_, c)| c)
    }

    /// Consumes consecutive characters while they satisfy the predicate
    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<String> {
        let mut value = String::new();
        while let Some(c) = self.next_if(&predicate) {
            value.push(c);
        }
        Some(value).filter(|v| !v.is_empty())
    }

    /// Removes whitespace from the input stream
    fn erase_whitespace(&mut self) {
        self.next_while(|c| c.is_whitespace());
    }

    /// Scans and returns the next token
    fn scan(&mut self) -> Result<Option<Lexeme>> {
        self.erase_whitespace();
        let start = self.offset();
        let token = match self.iter.peek() {
            Some((_, '\'')) => self.scan_string()?,
            Some((_, c)) if is_symbol(*c) => self.scan_symbol(),
            Some(_) => self.scan_word(),
            None => return Ok(None),
        };
        Ok(token.map(|token| Lexeme {
            token,
            start,
            end: self.offset(),
        }))
    }

    /// Scans a string literal (enclosed in single quotes, `''` escapes a quote)
    fn scan_string(&mut self) -> Result<Option<Token>> {
        self.iter.next();
        let mut val = String::new();

        loop {
            match self.iter.next() {
                Some((_, '\'')) => {
                    if self.next_if(|c| c == '\'').is_some() {
                        val.push('\'');
                    } else {
                        break;
                    }
                }
                Some((_, c)) => val.push(c),
                None => return Err(Error::UnterminatedString),
            }
        }
        Ok(Some(Token::String(val)))
    }

    /// Scans a bare word: identifier, keyword, number or unquoted text
    fn scan_word(&mut self) -> Option<Token> {
        self.next_while(|c| !c.is_whitespace() && !is_symbol(c) && c != '\'')
            .map(Token::Word)
    }

    /// Scans a single-character symbol token
    fn scan_symbol(&mut self) -> Option<Token> {
        let token = match self.iter.peek()?.1 {
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '*' => Token::Asterisk,
            '=' => Token::Equal,
            _ => return None,
        };
        self.iter.next();
        Some(token)
    }
}

fn is_symbol(c: char) -> bool {
    matches!(c, '(' | ')' | ',' | ';' | '*' | '=')
}
