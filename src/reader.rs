//! Tokenizer and recursive-descent reader.
//!
//! A token is a maximal run of non-whitespace, non-paren characters, or a
//! single `(`/`)`. Tree construction is recursive with single-token
//! lookahead: `(` opens a proper list, `)` closes it, and any other token
//! is classified syntactically as an integer, boolean, or symbol. No
//! evaluation happens while reading; special forms are plain symbols to
//! the reader.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, value},
    sequence::pair,
};

use crate::ast::{NumberType, Value};
use crate::{Error, ReadError};

/// Controls optional reader behavior beyond the core grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReadConfig {
    /// Treat `;` to end of line as ignorable, like whitespace. Off by
    /// default: the core grammar makes `;` an ordinary symbol character.
    pub handle_comments: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn atom_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

fn lex_token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        value(Token::Open, char('(')),
        value(Token::Close, char(')')),
        map(take_while1(atom_char), Token::Atom),
    ))
    .parse(input)
}

fn comment(input: &str) -> IResult<&str, ()> {
    value((), pair(char(';'), take_while(|c| c != '\n'))).parse(input)
}

fn skip_whitespace(input: &str) -> IResult<&str, ()> {
    value((), multispace0).parse(input)
}

/// Comments are recognized only where a token would start.
fn skip_whitespace_and_comments(mut input: &str) -> IResult<&str, ()> {
    loop {
        let (rest, ()) = skip_whitespace(input)?;
        input = rest;
        match comment(input) {
            Ok((rest, ())) => input = rest,
            Err(_) => return Ok((input, ())),
        }
    }
}

/// Classify a non-paren token, in order: an optional leading `-` followed
/// by digits is an integer, `#t`/`#f` are booleans, anything else is a
/// symbol. Purely syntactic.
fn classify_atom(token: &str) -> Result<Value, Error> {
    if is_integer_token(token) {
        return token
            .parse::<NumberType>()
            .map(Value::Integer)
            .map_err(|_| ReadError::IntegerOutOfRange(token.to_owned()).into());
    }
    match token {
        "#t" => Ok(Value::Boolean(true)),
        "#f" => Ok(Value::Boolean(false)),
        _ => Ok(Value::Symbol(token.to_owned())),
    }
}

/// An optional leading `-` followed by one or more ASCII digits. A bare
/// `-` is a symbol.
fn is_integer_token(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Streaming reader over a source string.
///
/// Each call to [`Reader::read`] consumes exactly one complete expression
/// and leaves the reader positioned after it, so a sequence of top-level
/// forms can be read by calling `read` until [`Reader::at_eof`].
pub struct Reader<'a> {
    input: &'a str,
    config: ReadConfig,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Reader::with_config(input, ReadConfig::default())
    }

    pub fn with_config(input: &'a str, config: ReadConfig) -> Self {
        Reader { input, config }
    }

    /// Remaining unread input.
    pub fn rest(&self) -> &'a str {
        self.input
    }

    /// True when no further expression can be read.
    pub fn at_eof(&mut self) -> bool {
        self.skip_ignored();
        self.input.is_empty()
    }

    /// Read one expression, advancing past it.
    pub fn read(&mut self) -> Result<Value, Error> {
        match self.next_token()? {
            Token::Open => self.read_list(),
            Token::Close => Err(ReadError::UnmatchedCloseParen.into()),
            Token::Atom(token) => classify_atom(token),
        }
    }

    fn read_list(&mut self) -> Result<Value, Error> {
        let mut elements = Vec::new();
        loop {
            // EOF inside an open list surfaces as UnexpectedEof here
            match self.next_token()? {
                Token::Close => return Ok(Value::list(elements)),
                Token::Open => elements.push(self.read_list()?),
                Token::Atom(token) => elements.push(classify_atom(token)?),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token<'a>, Error> {
        self.skip_ignored();
        match lex_token(self.input) {
            Ok((rest, token)) => {
                self.input = rest;
                Ok(token)
            }
            // The lexer only fails on exhausted input: any remaining
            // character either is a paren or starts an atom.
            Err(_) => Err(ReadError::UnexpectedEof.into()),
        }
    }

    fn skip_ignored(&mut self) {
        let skipped = if self.config.handle_comments {
            skip_whitespace_and_comments(self.input)
        } else {
            skip_whitespace(self.input)
        };
        if let Ok((rest, ())) = skipped {
            self.input = rest;
        }
    }
}

/// Parse a single complete expression from `input`. Anything but
/// ignorable input after the expression is an error; use [`Reader`] to
/// read a sequence of forms.
pub fn parse(input: &str) -> Result<Value, Error> {
    parse_with_config(input, ReadConfig::default())
}

/// Parse a single complete expression with explicit reader configuration.
pub fn parse_with_config(input: &str, config: ReadConfig) -> Result<Value, Error> {
    let mut reader = Reader::with_config(input, config);
    let expr = reader.read()?;
    if reader.at_eof() {
        Ok(expr)
    } else {
        Err(ReadError::TrailingContent(reader.rest().to_owned()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{nil, sym, val};

    /// Test result variants for comprehensive reading tests
    #[derive(Debug)]
    enum ReadTestResult {
        Success(Value),   // Reading should succeed with this value
        Fails(ReadError), // Reading should fail with exactly this error
    }
    use ReadTestResult::*;

    /// Helper for successful read test cases
    fn success<T: Into<Value>>(value: T) -> ReadTestResult {
        Success(value.into())
    }

    /// Run read tests with round-trip validation on every success
    fn run_read_tests(test_cases: Vec<(&str, ReadTestResult)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("Read test #{}", i + 1);
            let result = parse(input);

            match (result, expected) {
                (Ok(actual), Success(expected_val)) => {
                    assert_eq!(actual, *expected_val, "{test_id}: value mismatch");

                    // Round-trip: display -> parse -> display must be stable
                    let displayed = format!("{actual}");
                    let reparsed = parse(&displayed).unwrap_or_else(|e| {
                        panic!("{test_id}: round-trip parse failed for '{displayed}': {e:?}")
                    });
                    assert_eq!(
                        reparsed, actual,
                        "{test_id}: round-trip value mismatch for '{input}'"
                    );
                    assert_eq!(
                        format!("{reparsed}"),
                        displayed,
                        "{test_id}: round-trip display mismatch for '{input}'"
                    );
                }
                (Err(Error::Read(err)), Fails(expected_err)) => {
                    assert_eq!(err, *expected_err, "{test_id}: error mismatch");
                }
                (Ok(actual), Fails(expected_err)) => {
                    panic!("{test_id}: expected {expected_err:?}, got {actual:?}");
                }
                (Err(err), Success(_)) => {
                    panic!("{test_id}: expected success, got error {err:?}");
                }
                (Err(err), Fails(_)) => {
                    panic!("{test_id}: expected a read error, got {err:?}");
                }
            }
        }
    }

    #[test]
    fn test_reader_comprehensive() {
        let test_cases = vec![
            // ===== INTEGER CLASSIFICATION =====
            ("42", success(42)),
            ("-5", success(-5)),
            ("0", success(0)),
            ("-0", success(0)),
            ("007", success(7)),
            ("9223372036854775807", success(i64::MAX)),
            ("-9223372036854775808", success(i64::MIN)),
            // Literals outside i64
            (
                "99999999999999999999",
                Fails(ReadError::IntegerOutOfRange(
                    "99999999999999999999".to_owned(),
                )),
            ),
            (
                "-99999999999999999999",
                Fails(ReadError::IntegerOutOfRange(
                    "-99999999999999999999".to_owned(),
                )),
            ),
            // ===== BOOLEAN CLASSIFICATION =====
            ("#t", success(true)),
            ("#f", success(false)),
            // ===== SYMBOL CLASSIFICATION =====
            // Anything that is not an integer or #t/#f is a symbol
            ("foo", success(sym("foo"))),
            ("+", success(sym("+"))),
            ("-", success(sym("-"))),
            ("<=", success(sym("<="))),
            ("null?", success(sym("null?"))),
            ("-abc", success(sym("-abc"))),
            ("123abc", success(sym("123abc"))),
            ("-42x", success(sym("-42x"))),
            ("+5", success(sym("+5"))),
            ("3.14", success(sym("3.14"))),
            ("#true", success(sym("#true"))),
            ("#T", success(sym("#T"))),
            ("'foo", success(sym("'foo"))),
            (";", success(sym(";"))),
            // ===== LIST CONSTRUCTION =====
            ("()", success(nil())),
            ("(   )", success(nil())),
            ("(42)", success([42])),
            ("(1 2 3)", success([1, 2, 3])),
            ("(a b c)", success([sym("a"), sym("b"), sym("c")])),
            (
                "(1 hello #t)",
                success(vec![val(1), sym("hello"), val(true)]),
            ),
            (
                "(define x 5)",
                success(vec![sym("define"), sym("x"), val(5)]),
            ),
            // Parens delimit tokens without surrounding whitespace
            ("(1(2)3)", success(vec![val(1), val([2]), val(3)])),
            ("((1 2) (3 4))", success([[1, 2], [3, 4]])),
            ("(((1)))", success(vec![val(vec![val(vec![val(1)])])])),
            (
                "(foo (bar (baz)))",
                success(vec![
                    sym("foo"),
                    val(vec![sym("bar"), val(vec![sym("baz")])]),
                ]),
            ),
            // ===== WHITESPACE HANDLING =====
            ("  42  ", success(42)),
            ("\t#t\n", success(true)),
            ("\r\n  foo  \t", success(sym("foo"))),
            ("( 1   2\t\n3 )", success([1, 2, 3])),
            // With comments off, `;` is just a symbol character
            ("(a ;b)", success(vec![sym("a"), sym(";b")])),
            // ===== ERROR CASES =====
            ("", Fails(ReadError::UnexpectedEof)),
            ("   ", Fails(ReadError::UnexpectedEof)),
            ("(1 2 3", Fails(ReadError::UnexpectedEof)),
            ("((1 2)", Fails(ReadError::UnexpectedEof)),
            ("(", Fails(ReadError::UnexpectedEof)),
            (")", Fails(ReadError::UnmatchedCloseParen)),
            ("  )", Fails(ReadError::UnmatchedCloseParen)),
            // Trailing input after one complete expression
            ("1 2", Fails(ReadError::TrailingContent("2".to_owned()))),
            ("(1 2))", Fails(ReadError::TrailingContent(")".to_owned()))),
            (
                "(+ 1 2) (+ 3 4)",
                Fails(ReadError::TrailingContent("(+ 3 4)".to_owned())),
            ),
        ];

        run_read_tests(test_cases);
    }

    #[test]
    fn test_printed_form() {
        // The printed form contract: reading and reprinting normalizes
        // whitespace to a single space between elements.
        let test_cases = vec![
            ("3", "3"),
            ("foo", "foo"),
            ("()", "()"),
            ("(1)", "(1)"),
            ("(1 2 3)", "(1 2 3)"),
            ("(1(2)3)", "(1 (2) 3)"),
            ("(foo (bar (baz)))", "(foo (bar (baz)))"),
            ("( 1   2\t3 )", "(1 2 3)"),
        ];

        for (input, expected) in test_cases {
            let parsed = parse(input).unwrap();
            assert_eq!(format!("{parsed}"), expected, "printed form of '{input}'");
        }
    }

    #[test]
    fn test_streaming_reads_sequence_of_forms() {
        let mut reader = Reader::new("(+ 1 2) (define x 5)\n  x");

        assert_eq!(
            reader.read().unwrap(),
            val(vec![sym("+"), val(1), val(2)])
        );
        assert!(!reader.at_eof());
        assert_eq!(
            reader.read().unwrap(),
            val(vec![sym("define"), sym("x"), val(5)])
        );
        assert_eq!(reader.read().unwrap(), sym("x"));
        assert!(reader.at_eof());
        assert_eq!(
            reader.read().unwrap_err(),
            Error::Read(ReadError::UnexpectedEof)
        );
    }

    #[test]
    fn test_reader_with_comments_enabled() {
        let config = ReadConfig {
            handle_comments: true,
        };

        let test_cases = vec![
            ("; intro\n42", val(42)),
            ("42 ; trailing", val(42)),
            (
                "(+ 1 ; a note\n 2)",
                val(vec![sym("+"), val(1), val(2)]),
            ),
            ("; only\n; comments\nfoo", sym("foo")),
        ];

        for (input, expected) in test_cases {
            assert_eq!(
                parse_with_config(input, config).unwrap(),
                expected,
                "comment test for '{input}'"
            );
        }

        // A comment-only line is exhausted input
        let mut reader = Reader::with_config("; nothing here", config);
        assert!(reader.at_eof());
    }
}
