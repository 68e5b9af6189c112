use std::num::ParseFloatError;
use std::str::Utf8Error;

use btoi::ParseIntegerError;
use thiserror::Error;

/// The kind of an error raised by the tokenizer.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Growing the state stack or the scratch buffer failed.
    #[error("out of memory")]
    Memory,

    /// The state machine reached a point that should be unreachable.
    #[error("internal state machine error")]
    Internal,

    /// The tokenizer is in a sticky error state. An earlier call raised
    /// an error and the tokenizer has to be reset to be usable again.
    #[error("parser is in an error state")]
    State,

    /// A digit was required by the number grammar.
    #[error("expected a digit")]
    ExpectedDigit,

    /// A hexadecimal digit was required inside a `\u` escape.
    #[error("expected a hex digit")]
    ExpectedHexDigit,

    /// A `,` or `]` was required after an array element.
    #[error("expected `,` or `]`")]
    ExpectedCommaOrArrayEnd,

    /// A `,` or `}` was required after an object member.
    #[error("expected `,` or `}}`")]
    ExpectedCommaOrObjectEnd,

    /// An object key was required, and keys must be strings.
    #[error("expected a string")]
    ExpectedString,

    /// A `:` was required after an object key.
    #[error("expected `:`")]
    ExpectedColon,

    /// An escape sequence other than the ones JSON permits.
    #[error("illegal escape sequence")]
    IllegalEscape,

    /// Malformed UTF-8, a lone or mismatched surrogate, or a code point
    /// beyond U+10FFFF.
    #[error("illegal unicode codepoint")]
    IllegalUnicode,

    /// The magnitude of a numeric exponent cannot be represented.
    #[error("number out of range")]
    Range,

    /// A character that no grammar rule accepts at this position.
    #[error("unexpected character")]
    UnexpectedChar,

    /// The input ended in the middle of a value or before any value.
    #[error("unexpected end of input")]
    UnexpectedEof,
}

/// Where inside this crate an error was raised. Purely diagnostic: the
/// file and module names are opaque to callers and carry no API promise.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub file: &'static str,
    pub module: &'static str,
    pub line: u32,
}

/// An error record captured by the tokenizer. After the first error the
/// tokenizer is sticky: every further
/// [`next_token()`](crate::JsonTokenizer::next_token()) re-raises
/// [`ErrorKind::State`] until [`reset()`](crate::Reset::reset()).
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("{kind} (raised at {file}:{line})", file = .location.file, line = .location.line)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub location: Location,
}

/// An error that can happen when reading the current value as a string
#[derive(Error, Debug)]
pub enum InvalidStringValueError {
    #[error("current value is not a string")]
    NotAString,

    #[error("invalid string: {0}")]
    Utf8(#[from] Utf8Error),
}

/// An error that can happen when trying to parse the current
/// number-as-string value to an integer
#[derive(Error, Debug)]
pub enum InvalidIntValueError {
    #[error("current value is not a captured number literal")]
    NotANumber,

    #[error("invalid integer: {0}")]
    Parse(#[from] ParseIntegerError),
}

/// An error that can happen when trying to parse the current
/// number-as-string value to a float
#[derive(Error, Debug)]
pub enum InvalidFloatValueError {
    #[error("unable to convert current value to string: {0}")]
    String(#[from] InvalidStringValueError),

    #[error("unable to parse current value to float: {0}")]
    Float(#[from] ParseFloatError),
}

/// An error returned by [`feed()`](crate::JsonTokenizer::feed()) when the
/// previous input chunk has not been fully consumed yet.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("previous input chunk has unconsumed bytes")]
pub struct FeedError;

/// An error returned when tokenizer options are contradictory:
/// number-as-string capture excludes the integer fast path and
/// decomposed numbers.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("number_as_string cannot be combined with integer_fast_path or decomposed_numbers")]
pub struct InvalidOptionsError;

/// Records the raise site of a tokenizer error.
macro_rules! raise_location {
    () => {
        $crate::error::Location {
            file: file!(),
            module: module_path!(),
            line: line!(),
        }
    };
}

pub(crate) use raise_location;
