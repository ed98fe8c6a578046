//! # `CREATE TABLE` Mini-Parser
//!
//! The schema catalog needs two things from the stored `CREATE TABLE`
//! text: the column list and which column, if any, is declared
//! `INTEGER PRIMARY KEY` (the rowid alias). Full SQL parsing is out of
//! scope, but naive comma-splitting breaks on real-world DDL, so this
//! module tokenizes properly:
//!
//! - quoted identifiers in all four styles: `"double"`, `` `backtick` ``,
//!   `[bracket]`, and `'single'` string literals, with doubled-quote
//!   escapes
//! - `--` line comments and `/* */` block comments
//! - nested parentheses (type arguments, `CHECK` expressions, composite
//!   `PRIMARY KEY (...)` clauses)
//! - column definitions split at top-level commas only
//! - table-level constraint clauses (`PRIMARY KEY`, `UNIQUE`, `CHECK`,
//!   `FOREIGN KEY`, `CONSTRAINT`) recognised and excluded from the
//!   column list
//!
//! A column is the rowid alias when its tokens after the name contain the
//! word sequence `INTEGER PRIMARY KEY`. A quoted identifier never matches
//! a keyword, so a column named `"primary"` parses as a column.
//!
//! Not handled, by choice: aliasing declared through a table-level
//! `PRIMARY KEY(col)` clause, and generated-column subtleties beyond
//! skipping their parenthesized expressions.

use eyre::{bail, ensure, Result};

use super::ColumnInfo;

/// One lexical token of a column definition.
#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    /// A bare word: identifier, type name, or keyword.
    Word(&'a str),
    /// A quoted identifier, with quoting removed.
    Ident(String),
    /// A string literal; its content never matters here.
    Literal,
}

/// Parses a `CREATE TABLE` statement into its column list and the index
/// of the rowid-alias column.
pub fn parse_create_table(sql: &str) -> Result<(Vec<ColumnInfo>, Option<usize>)> {
    let body = column_body(sql)?;

    let mut columns = Vec::new();
    let mut rowid_alias = None;

    for def in split_top_level(body)? {
        let tokens = tokenize(def)?;
        let Some(first) = tokens.first() else {
            continue;
        };
        if is_table_constraint(first) {
            continue;
        }

        let name = match first {
            Token::Word(w) => (*w).to_string(),
            Token::Ident(s) => s.clone(),
            Token::Literal => bail!("malformed column definition: {:?}", def.trim()),
        };
        if rowid_alias.is_none() && has_integer_primary_key(&tokens[1..]) {
            rowid_alias = Some(columns.len());
        }
        columns.push(ColumnInfo {
            name,
            decl_type: declared_type(&tokens[1..]),
        });
    }

    ensure!(
        !columns.is_empty(),
        "no column definitions in CREATE TABLE statement"
    );
    Ok((columns, rowid_alias))
}

/// Words that begin a table-level constraint clause instead of a column.
fn is_table_constraint(token: &Token) -> bool {
    const CONSTRAINTS: &[&str] = &["PRIMARY", "UNIQUE", "CHECK", "FOREIGN", "CONSTRAINT"];
    matches!(token, Token::Word(w) if CONSTRAINTS.iter().any(|kw| w.eq_ignore_ascii_case(kw)))
}

/// Words that end the declared type and begin column constraints.
fn is_constraint_keyword(word: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "PRIMARY",
        "NOT",
        "NULL",
        "UNIQUE",
        "CHECK",
        "DEFAULT",
        "COLLATE",
        "REFERENCES",
        "GENERATED",
        "AS",
        "CONSTRAINT",
    ];
    KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw))
}

/// The declared type: the run of bare words after the column name, up to
/// the first constraint keyword. Parenthesized type arguments were
/// dropped during tokenization.
fn declared_type(tokens: &[Token]) -> String {
    let mut words = Vec::new();
    for token in tokens {
        match token {
            Token::Word(w) if !is_constraint_keyword(w) => words.push(*w),
            _ => break,
        }
    }
    words.join(" ")
}

/// True when the tokens contain the consecutive words
/// `INTEGER PRIMARY KEY`.
fn has_integer_primary_key(tokens: &[Token]) -> bool {
    tokens.windows(3).any(|w| {
        matches!(
            (&w[0], &w[1], &w[2]),
            (Token::Word(a), Token::Word(b), Token::Word(c))
                if a.eq_ignore_ascii_case("INTEGER")
                    && b.eq_ignore_ascii_case("PRIMARY")
                    && c.eq_ignore_ascii_case("KEY")
        )
    })
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn closing_quote(open: u8) -> u8 {
    if open == b'[' {
        b']'
    } else {
        open
    }
}

/// Advances past whitespace and comments starting at `i`.
fn skip_ws_comments(b: &[u8], mut i: usize) -> usize {
    loop {
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        if i + 1 < b.len() && b[i] == b'-' && b[i + 1] == b'-' {
            while i < b.len() && b[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if i + 1 < b.len() && b[i] == b'/' && b[i + 1] == b'*' {
            i += 2;
            while i + 1 < b.len() && !(b[i] == b'*' && b[i + 1] == b'/') {
                i += 1;
            }
            i = (i + 2).min(b.len());
            continue;
        }
        return i;
    }
}

/// Advances past a quoted region whose opener is at `i`, honouring
/// doubled-quote escapes, and returns the index one past the closer.
fn skip_quoted(b: &[u8], i: usize) -> Result<usize> {
    let close = closing_quote(b[i]);
    let mut j = i + 1;
    while j < b.len() {
        if b[j] == close {
            // A doubled closer is an escape, not the end.
            if close != b']' && j + 1 < b.len() && b[j + 1] == close {
                j += 2;
                continue;
            }
            return Ok(j + 1);
        }
        j += 1;
    }
    bail!("unterminated {:?} quote in CREATE TABLE statement", close as char)
}

/// Advances past a balanced parenthesized group whose opener is at `i`.
fn skip_group(b: &[u8], i: usize) -> Result<usize> {
    let mut depth = 0usize;
    let mut j = i;
    while j < b.len() {
        j = skip_ws_comments(b, j);
        if j >= b.len() {
            break;
        }
        match b[j] {
            b'\'' | b'"' | b'`' | b'[' => j = skip_quoted(b, j)?,
            b'(' => {
                depth += 1;
                j += 1;
            }
            b')' => {
                depth -= 1;
                j += 1;
                if depth == 0 {
                    return Ok(j);
                }
            }
            _ => j += 1,
        }
    }
    bail!("unbalanced parentheses in CREATE TABLE statement")
}

/// The text between the outermost parentheses: the column definitions.
fn column_body(sql: &str) -> Result<&str> {
    let b = sql.as_bytes();
    let mut i = 0;
    while i < b.len() {
        i = skip_ws_comments(b, i);
        if i >= b.len() {
            break;
        }
        match b[i] {
            b'\'' | b'"' | b'`' | b'[' => i = skip_quoted(b, i)?,
            b'(' => {
                let end = skip_group(b, i)?;
                return Ok(&sql[i + 1..end - 1]);
            }
            _ => i += 1,
        }
    }
    bail!("invalid CREATE TABLE statement: missing column definitions")
}

/// Splits the column body at top-level commas.
fn split_top_level(body: &str) -> Result<Vec<&str>> {
    let b = body.as_bytes();
    let mut defs = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < b.len() {
        i = skip_ws_comments(b, i);
        if i >= b.len() {
            break;
        }
        match b[i] {
            b'\'' | b'"' | b'`' | b'[' => i = skip_quoted(b, i)?,
            b'(' => i = skip_group(b, i)?,
            b',' => {
                defs.push(&body[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    defs.push(&body[start..]);
    Ok(defs)
}

/// Tokenizes one column definition. Parenthesized groups (type arguments,
/// check expressions) are skipped wholesale.
fn tokenize(def: &str) -> Result<Vec<Token<'_>>> {
    let b = def.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < b.len() {
        i = skip_ws_comments(b, i);
        if i >= b.len() {
            break;
        }
        match b[i] {
            b'\'' => {
                i = skip_quoted(b, i)?;
                tokens.push(Token::Literal);
            }
            b'"' | b'`' | b'[' => {
                let end = skip_quoted(b, i)?;
                tokens.push(Token::Ident(unquote(&def[i..end])));
                i = end;
            }
            b'(' => i = skip_group(b, i)?,
            c if is_word_byte(c) => {
                let start = i;
                while i < b.len() && is_word_byte(b[i]) {
                    i += 1;
                }
                tokens.push(Token::Word(&def[start..i]));
            }
            _ => i += 1,
        }
    }
    Ok(tokens)
}

/// Strips the quoting from a quoted identifier and undoes doubled-quote
/// escapes.
fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    match quoted.as_bytes()[0] {
        b'"' => inner.replace("\"\"", "\""),
        b'`' => inner.replace("``", "`"),
        b'\'' => inner.replace("''", "'"),
        _ => inner.to_string(),
    }
}
