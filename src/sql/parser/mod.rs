use crate::error::{Error, Result};
use crate::sql::parser::ast::{Condition, Conditions, Join, Statement};
use crate::sql::parser::lexer::{Keyword, Lexeme, Lexer, Token};
use crate::sql::schema::{Column, Constraint};
use crate::sql::types::{DataType, Record, Value};

pub mod ast;
mod lexer;

/// A statement shape: `Ok(None)` when the tokens don't have its structure
type Shape = fn(&Parser, &[Lexeme]) -> Result<Option<Statement>>;

/// SQL Parser - Converts a statement string into a typed [`Statement`]
///
/// The input is normalized first (whitespace runs collapsed to one space,
/// ends trimmed). Then CREATE TABLE, INSERT, SELECT, UPDATE and DELETE are
/// tried in that order; the first shape that matches structurally wins.
pub struct Parser {
    sql: String,
}

impl Parser {
    /// Creates a new parser for the given SQL input
    pub fn new(input: &str) -> Self {
        Parser {
            sql: input.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }

    /// Parses the input SQL statement
    pub fn parse(&self) -> Result<Statement> {
        let mut tokens = Lexer::new(&self.sql).collect::<Result<Vec<_>>>()?;
        if tokens.last().is_some_and(|l| l.token == Token::Semicolon) {
            tokens.pop();
        }

        let shapes: [Shape; 5] = [
            Parser::parse_create_table,
            Parser::parse_insert,
            Parser::parse_select,
            Parser::parse_update,
            Parser::parse_delete,
        ];
        for shape in shapes {
            if let Some(stmt) = shape(self, &tokens)? {
                return Ok(stmt);
            }
        }
        Err(Error::UnsupportedSyntax(self.sql.clone()))
    }

    /// CREATE TABLE <name> ( <col_def>, ... )
    fn parse_create_table(&self, tokens: &[Lexeme]) -> Result<Option<Statement>> {
        if !keyword_at(tokens, 0, Keyword::Create) || !keyword_at(tokens, 1, Keyword::Table) {
            return Ok(None);
        }
        let Some(name) = ident_at(tokens, 2) else {
            return Ok(None);
        };
        if !token_at(tokens, 3, &Token::OpenParen)
            || tokens.len() < 6
            || !token_at(tokens, tokens.len() - 1, &Token::CloseParen)
        {
            return Ok(None);
        }

        let mut columns: Vec<Column> = Vec::new();
        for def in split_list(&tokens[4..tokens.len() - 1]) {
            let column = self.parse_column(def)?;
            if columns.iter().any(|c| c.name == column.name) {
                return Err(Error::InvalidColumnDefinition(format!(
                    "duplicate column {}",
                    column.name
                )));
            }
            columns.push(column);
        }
        Ok(Some(Statement::CreateTable { name, columns }))
    }

    /// Parses `<name> <type> [constraint tokens...]`
    ///
    /// Unrecognized trailing tokens are ignored.
    fn parse_column(&self, def: &[Lexeme]) -> Result<Column> {
        let text = self.text(def);
        let parts = text.split_whitespace().collect::<Vec<_>>();
        if parts.len() < 2 {
            return Err(Error::InvalidColumnDefinition(text.to_string()));
        }
        let datatype = DataType::from_token(parts[1])
            .ok_or_else(|| Error::UnknownType(parts[1].to_uppercase()))?;

        let mut constraint = Constraint::None;
        let mut nullable = true;
        for (i, part) in parts.iter().enumerate().skip(2) {
            match part.to_uppercase().as_ref() {
                "PRIMARY_KEY" | "PRIMARY" => {
                    constraint = Constraint::PrimaryKey;
                    nullable = false;
                }
                "UNIQUE" => constraint = Constraint::Unique,
                "NOT" if parts.get(i + 1).is_some_and(|p| p.eq_ignore_ascii_case("NULL")) => {
                    nullable = false
                }
                _ => {}
            }
        }
        Ok(Column::new(parts[0], datatype, constraint, nullable))
    }

    /// INSERT INTO <name> ( <col>, ... ) VALUES ( <val>, ... )
    fn parse_insert(&self, tokens: &[Lexeme]) -> Result<Option<Statement>> {
        if !keyword_at(tokens, 0, Keyword::Insert) || !keyword_at(tokens, 1, Keyword::Into) {
            return Ok(None);
        }
        let Some(table_name) = ident_at(tokens, 2) else {
            return Ok(None);
        };
        if !token_at(tokens, 3, &Token::OpenParen)
            || !tokens.last().is_some_and(|l| l.token == Token::CloseParen)
        {
            return Ok(None);
        }
        // the column list ends at the first `)` followed by `VALUES (`
        let Some(close) = (4..tokens.len()).find(|&i| {
            token_at(tokens, i, &Token::CloseParen)
                && keyword_at(tokens, i + 1, Keyword::Values)
                && token_at(tokens, i + 2, &Token::OpenParen)
                && i + 3 < tokens.len()
        }) else {
            return Ok(None);
        };

        let columns = split_list(&tokens[4..close])
            .into_iter()
            .map(|c| self.text(c).to_string())
            .collect::<Vec<_>>();
        let values = split_list(&tokens[close + 3..tokens.len() - 1])
            .into_iter()
            .map(|v| self.parse_value(v))
            .collect::<Vec<_>>();
        if columns.is_empty() && values.is_empty() {
            return Ok(None);
        }
        if columns.len() != values.len() {
            return Err(Error::ArityMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        Ok(Some(Statement::Insert {
            table_name,
            values: columns.into_iter().zip(values).collect(),
        }))
    }

    /// SELECT <cols> FROM <name> [WHERE <cond>] [JOIN <name2> ON <cond>]
    fn parse_select(&self, tokens: &[Lexeme]) -> Result<Option<Statement>> {
        if !keyword_at(tokens, 0, Keyword::Select) {
            return Ok(None);
        }
        // projection must be non-empty, so FROM is at index 2 or later
        let Some(from) = (2..tokens.len()).find(|&i| keyword_at(tokens, i, Keyword::From)) else {
            return Ok(None);
        };
        let Some(table_name) = ident_at(tokens, from + 1) else {
            return Ok(None);
        };

        let projection = &tokens[1..from];
        let columns = if self.text(projection) == "*" {
            vec!["*".to_string()]
        } else {
            split_list(projection)
                .into_iter()
                .map(|c| self.text(c).to_string())
                .collect()
        };

        let rest = &tokens[from + 2..];
        let (where_tokens, join_tokens) = match rest.first() {
            None => (None, None),
            Some(l) if l.token.is_keyword(Keyword::Where) => {
                let body = &rest[1..];
                if body.is_empty() {
                    return Ok(None);
                }
                // WHERE extends up to the first complete JOIN clause
                match (1..body.len()).find(|&j| is_join_clause(&body[j..])) {
                    Some(j) => (Some(&body[..j]), Some(&body[j..])),
                    None => (Some(body), None),
                }
            }
            Some(l) if l.token.is_keyword(Keyword::Join) && is_join_clause(rest) => {
                (None, Some(rest))
            }
            Some(_) => return Ok(None),
        };

        let where_clause = where_tokens.map(|w| self.parse_conditions(w)).transpose()?;
        let join = match join_tokens {
            Some(j) => Some(Join {
                table_name: self.text(&j[1..2]).to_string(),
                predicate: self.parse_conditions(&j[3..])?,
            }),
            None => None,
        };

        Ok(Some(Statement::Select {
            columns,
            table_name,
            where_clause,
            join,
        }))
    }

    /// UPDATE <name> SET <col>=<val>, ... [WHERE <cond>]
    fn parse_update(&self, tokens: &[Lexeme]) -> Result<Option<Statement>> {
        if !keyword_at(tokens, 0, Keyword::Update) {
            return Ok(None);
        }
        let Some(table_name) = ident_at(tokens, 1) else {
            return Ok(None);
        };
        if !keyword_at(tokens, 2, Keyword::Set) || tokens.len() < 4 {
            return Ok(None);
        }

        let rest = &tokens[3..];
        let (set, where_tokens) =
            match (1..rest.len()).find(|&w| keyword_at(rest, w, Keyword::Where) && w + 1 < rest.len()) {
                Some(w) => (&rest[..w], Some(&rest[w + 1..])),
                None => (rest, None),
            };

        let mut columns = Record::new();
        for pair in split_list(set) {
            let Some(eq) = pair.iter().position(|l| l.token == Token::Equal) else {
                return Err(Error::InvalidSetClause(self.text(pair).to_string()));
            };
            let col = self.text(&pair[..eq]).to_string();
            if col.is_empty() {
                return Err(Error::InvalidSetClause(self.text(pair).to_string()));
            }
            if columns.contains(&col) {
                return Err(Error::DuplicateSetColumn(col));
            }
            let value = self.parse_value(&pair[eq + 1..]);
            columns.insert(col, value);
        }

        Ok(Some(Statement::Update {
            table_name,
            columns,
            where_clause: where_tokens.map(|w| self.parse_conditions(w)).transpose()?,
        }))
    }

    /// DELETE FROM <name> [WHERE <cond>]
    fn parse_delete(&self, tokens: &[Lexeme]) -> Result<Option<Statement>> {
        if !keyword_at(tokens, 0, Keyword::Delete) || !keyword_at(tokens, 1, Keyword::From) {
            return Ok(None);
        }
        let Some(table_name) = ident_at(tokens, 2) else {
            return Ok(None);
        };

        let where_clause = match &tokens[3..] {
            [] => None,
            [w, body @ ..] if w.token.is_keyword(Keyword::Where) && !body.is_empty() => {
                Some(self.parse_conditions(body)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(Statement::Delete {
            table_name,
            where_clause,
        }))
    }

    /// Parses `key = value [AND key = value ...]`
    fn parse_conditions(&self, tokens: &[Lexeme]) -> Result<Conditions> {
        let mut conditions = Conditions::new();
        for part in split_on(tokens, |t| t.is_keyword(Keyword::And)) {
            // exactly one `=` per conjunct
            let mut equals = part
                .iter()
                .enumerate()
                .filter(|(_, l)| l.token == Token::Equal)
                .map(|(i, _)| i);
            let (Some(eq), None) = (equals.next(), equals.next()) else {
                return Err(Error::InvalidCondition(self.text(part).to_string()));
            };
            let column = self.text(&part[..eq]);
            if column.is_empty() {
                return Err(Error::InvalidCondition(self.text(part).to_string()));
            }

            let rhs = &part[eq + 1..];
            let value = self.parse_value(rhs);
            let reference = match rhs {
                [Lexeme {
                    token: Token::Word(w),
                    ..
                }] if matches!(value, Value::Text(_)) && is_column_ref(w) => Some(w.clone()),
                _ => None,
            };
            conditions.push(Condition {
                column: column.to_string(),
                value,
                reference,
            });
        }
        Ok(conditions)
    }

    fn parse_value(&self, tokens: &[Lexeme]) -> Value {
        parse_literal(self.text(tokens))
    }

    /// Source text covered by a token slice
    fn text(&self, tokens: &[Lexeme]) -> &str {
        match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => &self.sql[first.start..last.end],
            _ => "",
        }
    }
}

/// Parses a value literal.
///
/// `NULL` (any case) is null, `'...'` is text with `''` unescaped, a literal
/// containing `.` is tried as a float, anything else as an integer. A literal
/// that parses as neither is kept as unquoted text.
pub fn parse_literal(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("NULL") {
        return Value::Null;
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return Value::Text(raw[1..raw.len() - 1].replace("''", "'"));
    }
    let number = if raw.contains('.') {
        raw.parse::<f64>().ok().map(Value::Float)
    } else {
        raw.parse::<i64>().ok().map(Value::Integer)
    };
    number.unwrap_or_else(|| Value::Text(raw.to_string()))
}

fn split_on<F: Fn(&Token) -> bool>(tokens: &[Lexeme], is_sep: F) -> Vec<&[Lexeme]> {
    if tokens.is_empty() {
        return Vec::new();
    }
    tokens.split(|l| is_sep(&l.token)).collect()
}

/// Splits on commas; quoted commas are already inside string tokens
fn split_list(tokens: &[Lexeme]) -> Vec<&[Lexeme]> {
    split_on(tokens, |t| *t == Token::Comma)
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// `col` or `table.col`
fn is_column_ref(s: &str) -> bool {
    match s.split_once('.') {
        Some((table, col)) => is_ident(table) && is_ident(col),
        None => is_ident(s),
    }
}

fn token_at(tokens: &[Lexeme], i: usize, token: &Token) -> bool {
    tokens.get(i).is_some_and(|l| l.token == *token)
}

fn keyword_at(tokens: &[Lexeme], i: usize, keyword: Keyword) -> bool {
    tokens.get(i).is_some_and(|l| l.token.is_keyword(keyword))
}

fn ident_at(tokens: &[Lexeme], i: usize) -> Option<String> {
    match tokens.get(i).map(|l| &l.token) {
        Some(Token::Word(w)) if is_ident(w) => Some(w.clone()),
        _ => None,
    }
}

/// JOIN <name> ON <non-empty condition>
fn is_join_clause(tokens: &[Lexeme]) -> bool {
    keyword_at(tokens, 0, Keyword::Join)
        && ident_at(tokens, 1).is_some()
        && keyword_at(tokens, 2, Keyword::On)
        && tokens.len() > 3
}
