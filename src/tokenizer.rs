use std::str::from_utf8;

use num_traits::{CheckedAdd, CheckedMul, CheckedSub, FromPrimitive, Zero};

use crate::error::{
    raise_location, ErrorKind, FeedError, InvalidFloatValueError, InvalidIntValueError,
    InvalidOptionsError, InvalidStringValueError, Location, ParseError,
};
use crate::event::JsonToken;
use crate::number::NumberComponents;
use crate::options::{Encoding, JsonTokenizerOptions};
use crate::reset::Reset;
use crate::scratch::Scratch;
use crate::unicode;

/// Initial capacity of the state stack; the stack grows in steps of the
/// same size.
const STACK_CHUNK: usize = 64;

/// The keyword literals.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Lit {
    True,
    False,
    Null,
}

impl Lit {
    fn bytes(self) -> &'static [u8] {
        match self {
            Lit::True => b"true",
            Lit::False => b"false",
            Lit::Null => b"null",
        }
    }
}

/// Resume labels of the tokenizer state machine. The top of the state
/// stack is the label to resume at after a suspension; the entries below
/// it describe the path from the document root through nested containers.
/// Nesting pushes a label instead of recursing, so depth is bounded only
/// by memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    /// Leading whitespace before the top-level value.
    Start,
    /// Trailing whitespace after the top-level value.
    Trailing,
    /// Dispatch on the first byte of a value.
    Value,
    /// Inside a keyword, `pos` bytes matched so far.
    Keyword { lit: Lit, pos: u8 },
    /// The keyword matched; check that a word character does not follow.
    KeywordEnd { lit: Lit },
    /// Between the quotes of a string.
    StrBody,
    /// After a backslash.
    StrEscape,
    /// Inside the four hex digits of a `\u` escape. `low` selects the
    /// second unit of a surrogate pair.
    StrHex { low: bool, digit: u8 },
    /// A high surrogate was read; the `\` of the low half must follow.
    StrLowBackslash,
    /// The `u` of the low surrogate half must follow.
    StrLowU,
    /// Awaiting continuation bytes of a UTF-8 sequence.
    StrUtf8Cont,
    /// At the optional leading `-` of a number.
    NumStart,
    /// First digit of the integer part.
    NumIntFirst,
    /// Further digits of the integer part.
    NumIntDigits,
    /// The integer accumulator saturated; count dropped digits into the
    /// exponent.
    NumIntOverflow,
    /// After the integer part: `.`, `e`, or the end of the number.
    NumAfterInt,
    /// First digit after the decimal point.
    NumFrac,
    /// Further fraction digits.
    NumFracDigits,
    /// The decimal accumulator saturated; drop further fraction digits.
    NumFracOverflow,
    /// After the fraction: `e`, or the end of the number.
    NumAfterFrac,
    /// After `e`/`E`: optional sign.
    NumExp,
    /// First exponent digit.
    NumExpFirst,
    /// Further exponent digits.
    NumExpDigits,
    /// The exponent saturated to `u64::MAX`; drop further digits.
    NumExpOverflow,
    /// Between the last byte of a number and the following non-word
    /// character.
    NumEnd,
    /// Directly after `[`.
    ArrStart,
    /// After an array element: `,` or `]`.
    ArrAfterValue,
    /// After an array comma: the next element.
    ArrValue,
    /// Directly after `{`.
    ObjStart,
    /// After an object comma: the next key.
    ObjKey,
    /// After an object key: `:`.
    ObjAfterKey,
    /// After the colon: the member value.
    ObjValue,
    /// After a member value: `,` or `}`.
    ObjAfterValue,
    /// Sticky error state, entered by any raise and left only by reset.
    Sick,
}

/// The value attached to the last emitted token.
#[derive(Debug)]
enum Slot {
    None,
    Bool(bool),
    Number(f64),
    Integer(i64),
    Components,
    Str { len: usize },
    NumStr { len: usize },
    Error(ParseError),
}

macro_rules! raise {
    ($self:ident, $kind:expr) => {
        return $self.fail($kind, raise_location!())
    };
}

/// JSON whitespace: space, tab, CR, LF, FF, VT.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\r' | b'\t' | 0x0C | 0x0B)
}

/// A character that may not directly follow a keyword or number.
fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// The replacement byte of a single-character escape, if the escape is
/// legal.
fn escape_byte(b: u8) -> Option<u8> {
    match b {
        b'"' => Some(b'"'),
        b'\\' => Some(b'\\'),
        b'/' => Some(b'/'),
        b'b' => Some(0x08),
        b'f' => Some(0x0C),
        b'n' => Some(0x0A),
        b'r' => Some(0x0D),
        b't' => Some(0x09),
        _ => None,
    }
}

/// An incremental, pull-mode JSON tokenizer.
///
/// Feed input chunks with [`feed()`](Self::feed()) and pull tokens with
/// [`next_token()`](Self::next_token()) until it returns
/// [`JsonToken::NeedData`]; an empty chunk signals the end of input. The
/// tokenizer suspends and resumes at arbitrary chunk boundaries, including
/// inside keywords, escapes, surrogate pairs, and numbers, without losing
/// work.
pub struct JsonTokenizer {
    options: JsonTokenizerOptions,

    /// The current input chunk and the index of the first unparsed byte.
    input: Vec<u8>,
    pos: usize,

    /// `true` once an empty chunk has been fed.
    eof: bool,

    /// Total number of bytes consumed across all chunks.
    parsed_bytes: usize,

    /// The resume-label stack. Non-empty exactly while a document is in
    /// flight.
    stack: Vec<State>,

    /// Assembles string payloads and captured number literals.
    scratch: Scratch,

    slot: Slot,

    /// Number components, accumulated for every number regardless of the
    /// numeric mode.
    num: NumberComponents,

    /// The high half of a surrogate pair.
    utf16_high: u16,
    /// Accumulator for the four hex digits of a `\u` escape.
    utf16_acc: u16,

    /// A partially read UTF-8 sequence.
    utf8_seq: [u8; 4],
    utf8_len: u8,
    utf8_need: u8,
}

impl JsonTokenizer {
    /// Create a tokenizer with default options: combined doubles, strict
    /// UTF-8 input.
    pub fn new() -> Self {
        // the default options are always valid
        Self::with_options(JsonTokenizerOptions::default()).unwrap_or_else(|_| unreachable!())
    }

    /// Create a tokenizer with the given options. Fails if
    /// `number_as_string` is combined with `integer_fast_path` or
    /// `decomposed_numbers`.
    pub fn with_options(options: JsonTokenizerOptions) -> Result<Self, InvalidOptionsError> {
        options.validate()?;
        let mut stack = Vec::new();
        stack.reserve_exact(STACK_CHUNK);
        stack.push(State::Start);
        Ok(JsonTokenizer {
            options,
            input: Vec::new(),
            pos: 0,
            eof: false,
            parsed_bytes: 0,
            stack,
            scratch: Scratch::new(),
            slot: Slot::None,
            num: NumberComponents::default(),
            utf16_high: 0,
            utf16_acc: 0,
            utf8_seq: [0; 4],
            utf8_len: 0,
            utf8_need: 0,
        })
    }

    /// Returns the options this tokenizer was created with.
    pub fn options(&self) -> &JsonTokenizerOptions {
        &self.options
    }

    /// Provide the next input chunk. The previous chunk must have been
    /// fully consumed, i.e. [`next_token()`](Self::next_token()) must
    /// have returned [`JsonToken::NeedData`]. An empty chunk signals the
    /// end of the input.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), FeedError> {
        if self.pos < self.input.len() {
            return Err(FeedError);
        }
        self.input.clear();
        self.input.extend_from_slice(chunk);
        self.pos = 0;
        self.eof = chunk.is_empty();
        Ok(())
    }

    /// Return the number of bytes consumed so far across all chunks.
    pub fn parsed_bytes(&self) -> usize {
        self.parsed_bytes
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.pos += 1;
        self.parsed_bytes += 1;
    }

    /// Replace the resume label on top of the stack.
    #[inline]
    fn set(&mut self, state: State) {
        if let Some(top) = self.stack.last_mut() {
            *top = state;
        }
    }

    /// Push a resume label, growing the stack in fixed steps.
    fn push_state(&mut self, state: State) -> Result<(), ()> {
        if self.stack.len() == self.stack.capacity()
            && self.stack.try_reserve_exact(STACK_CHUNK).is_err()
        {
            return Err(());
        }
        self.stack.push(state);
        Ok(())
    }

    /// Emit a token for a completed value: pop its label so the next call
    /// resumes at the label beneath.
    fn finish(&mut self, token: JsonToken) -> JsonToken {
        if self.stack.pop().is_none() {
            return self.fail(ErrorKind::Internal, raise_location!());
        }
        token
    }

    /// Record an error and enter the sticky error state.
    fn fail(&mut self, kind: ErrorKind, location: Location) -> JsonToken {
        self.slot = Slot::Error(ParseError { kind, location });
        match self.stack.last_mut() {
            Some(top) => *top = State::Sick,
            None => self.stack.push(State::Sick),
        }
        JsonToken::Error(kind)
    }

    /// Append a decoded code point to the scratch buffer as UTF-8.
    fn put_codepoint(&mut self, codepoint: u32) -> Result<(), ErrorKind> {
        let mut buf = [0u8; 4];
        let n = unicode::encode_utf8(codepoint, &mut buf).map_err(|_| ErrorKind::IllegalUnicode)?;
        self.scratch
            .extend(&buf[..n])
            .map_err(|_| ErrorKind::Memory)
    }

    /// Advance the state machine and return the next token. Returns
    /// [`JsonToken::NeedData`] when the current chunk is exhausted and
    /// more input is required.
    pub fn next_token(&mut self) -> JsonToken {
        loop {
            let state = match self.stack.last() {
                Some(state) => *state,
                // the document has been fully tokenized
                None => return JsonToken::End,
            };

            match state {
                State::Start => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(_) => {
                            self.set(State::Trailing);
                            if self.push_state(State::Value).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            break;
                        }
                    }
                },

                State::Trailing => loop {
                    match self.peek() {
                        None if self.eof => {
                            self.stack.pop();
                            return JsonToken::End;
                        }
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(_) => raise!(self, ErrorKind::UnexpectedChar),
                    }
                },

                State::Value => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b't') => {
                        self.bump();
                        self.set(State::Keyword {
                            lit: Lit::True,
                            pos: 1,
                        });
                    }
                    Some(b'f') => {
                        self.bump();
                        self.set(State::Keyword {
                            lit: Lit::False,
                            pos: 1,
                        });
                    }
                    Some(b'n') => {
                        self.bump();
                        self.set(State::Keyword {
                            lit: Lit::Null,
                            pos: 1,
                        });
                    }
                    Some(b'"') => {
                        self.bump();
                        self.scratch.clear();
                        self.set(State::StrBody);
                    }
                    Some(b'-' | b'0'..=b'9') => {
                        self.num = NumberComponents::default();
                        if self.options.number_as_string {
                            self.scratch.clear();
                        }
                        self.set(State::NumStart);
                    }
                    Some(b'[') => {
                        self.bump();
                        self.set(State::ArrStart);
                        return JsonToken::BeginArray;
                    }
                    Some(b'{') => {
                        self.bump();
                        self.set(State::ObjStart);
                        return JsonToken::BeginObject;
                    }
                    Some(_) => raise!(self, ErrorKind::UnexpectedChar),
                },

                State::Keyword { lit, pos } => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b) if b == lit.bytes()[pos as usize] => {
                        self.bump();
                        if pos as usize + 1 == lit.bytes().len() {
                            self.set(State::KeywordEnd { lit });
                        } else {
                            self.set(State::Keyword { lit, pos: pos + 1 });
                        }
                    }
                    Some(_) => raise!(self, ErrorKind::UnexpectedChar),
                },

                State::KeywordEnd { lit } => {
                    match self.peek() {
                        None if !self.eof => return JsonToken::NeedData,
                        Some(b) if is_word(b) => raise!(self, ErrorKind::UnexpectedChar),
                        _ => {}
                    }
                    return match lit {
                        Lit::True => {
                            self.slot = Slot::Bool(true);
                            self.finish(JsonToken::Boolean)
                        }
                        Lit::False => {
                            self.slot = Slot::Bool(false);
                            self.finish(JsonToken::Boolean)
                        }
                        Lit::Null => {
                            self.slot = Slot::None;
                            self.finish(JsonToken::Null)
                        }
                    };
                }

                State::StrBody => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b'"') => {
                            self.bump();
                            if self.scratch.push(0).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            self.slot = Slot::Str {
                                len: self.scratch.len() - 1,
                            };
                            return self.finish(JsonToken::String);
                        }
                        Some(b'\\') => {
                            self.bump();
                            self.set(State::StrEscape);
                            break;
                        }
                        Some(b) if b < 0x80 => {
                            self.bump();
                            if self.scratch.push(b).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                        }
                        Some(b) => match self.options.encoding {
                            Encoding::Latin1 => {
                                self.bump();
                                if let Err(kind) = self.put_codepoint(b as u32) {
                                    raise!(self, kind);
                                }
                            }
                            Encoding::Utf8 => {
                                if !(0xC2..0xF5).contains(&b) {
                                    raise!(self, ErrorKind::IllegalUnicode);
                                }
                                self.bump();
                                self.utf8_seq[0] = b;
                                self.utf8_len = 1;
                                self.utf8_need = if b < 0xE0 {
                                    2
                                } else if b < 0xF0 {
                                    3
                                } else {
                                    4
                                };
                                self.set(State::StrUtf8Cont);
                                break;
                            }
                        },
                    }
                },

                State::StrUtf8Cont => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) => {
                            if b & 0xC0 != 0x80 {
                                raise!(self, ErrorKind::IllegalUnicode);
                            }
                            if self.utf8_len == 1 {
                                // second-byte bounds: no overlong encodings,
                                // no surrogates, nothing above U+10FFFF
                                let lead = self.utf8_seq[0];
                                if (lead == 0xE0 && b < 0xA0)
                                    || (lead == 0xED && b >= 0xA0)
                                    || (lead == 0xF0 && b < 0x90)
                                    || (lead == 0xF4 && b >= 0x90)
                                {
                                    raise!(self, ErrorKind::IllegalUnicode);
                                }
                            }
                            self.bump();
                            self.utf8_seq[self.utf8_len as usize] = b;
                            self.utf8_len += 1;
                            if self.utf8_len == self.utf8_need {
                                let seq = self.utf8_seq;
                                if self.scratch.extend(&seq[..self.utf8_need as usize]).is_err() {
                                    raise!(self, ErrorKind::Memory);
                                }
                                self.set(State::StrBody);
                                break;
                            }
                        }
                    }
                },

                State::StrEscape => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b'u') => {
                        self.bump();
                        self.utf16_acc = 0;
                        self.set(State::StrHex {
                            low: false,
                            digit: 0,
                        });
                    }
                    Some(b) => match escape_byte(b) {
                        Some(mapped) => {
                            self.bump();
                            if self.scratch.push(mapped).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            self.set(State::StrBody);
                        }
                        None => raise!(self, ErrorKind::IllegalEscape),
                    },
                },

                State::StrHex { low, digit } => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b) => {
                        let value = match hex_value(b) {
                            Some(value) => value,
                            None => raise!(self, ErrorKind::ExpectedHexDigit),
                        };
                        self.bump();
                        self.utf16_acc = (self.utf16_acc << 4) | value as u16;
                        if digit < 3 {
                            self.set(State::StrHex {
                                low,
                                digit: digit + 1,
                            });
                        } else if !low {
                            let unit = self.utf16_acc;
                            if (0xD800..=0xDBFF).contains(&unit) {
                                self.utf16_high = unit;
                                self.set(State::StrLowBackslash);
                            } else if (0xDC00..=0xDFFF).contains(&unit) {
                                // a lone low surrogate
                                raise!(self, ErrorKind::IllegalUnicode);
                            } else {
                                if let Err(kind) = self.put_codepoint(unit as u32) {
                                    raise!(self, kind);
                                }
                                self.set(State::StrBody);
                            }
                        } else {
                            let unit = self.utf16_acc;
                            if !(0xDC00..=0xDFFF).contains(&unit) {
                                raise!(self, ErrorKind::IllegalUnicode);
                            }
                            let codepoint = unicode::combine_surrogates(self.utf16_high, unit);
                            if let Err(kind) = self.put_codepoint(codepoint) {
                                raise!(self, kind);
                            }
                            self.set(State::StrBody);
                        }
                    }
                },

                State::StrLowBackslash => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b'\\') => {
                        self.bump();
                        self.set(State::StrLowU);
                    }
                    Some(_) => raise!(self, ErrorKind::IllegalUnicode),
                },

                State::StrLowU => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b'u') => {
                        self.bump();
                        self.utf16_acc = 0;
                        self.set(State::StrHex {
                            low: true,
                            digit: 0,
                        });
                    }
                    Some(_) => raise!(self, ErrorKind::IllegalUnicode),
                },

                State::NumStart => {
                    match self.peek() {
                        None => return JsonToken::NeedData,
                        Some(b'-') => {
                            self.bump();
                            if self.options.number_as_string {
                                if self.scratch.push(b'-').is_err() {
                                    raise!(self, ErrorKind::Memory);
                                }
                            } else {
                                self.num.positive = false;
                            }
                        }
                        Some(_) => {}
                    }
                    self.set(State::NumIntFirst);
                }

                State::NumIntFirst => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b @ b'0') => {
                        self.bump();
                        if self.options.number_as_string && self.scratch.push(b).is_err() {
                            raise!(self, ErrorKind::Memory);
                        }
                        self.set(State::NumAfterInt);
                    }
                    Some(b @ b'1'..=b'9') => {
                        self.bump();
                        if self.options.number_as_string {
                            if self.scratch.push(b).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                        } else {
                            self.num.integer = (b - b'0') as u64;
                        }
                        self.set(State::NumIntDigits);
                    }
                    Some(_) => raise!(self, ErrorKind::ExpectedDigit),
                },

                State::NumIntDigits => loop {
                    match self.peek() {
                        None if self.eof => {
                            self.set(State::NumAfterInt);
                            break;
                        }
                        None => return JsonToken::NeedData,
                        Some(b @ b'0'..=b'9') => {
                            self.bump();
                            if self.options.number_as_string {
                                if self.scratch.push(b).is_err() {
                                    raise!(self, ErrorKind::Memory);
                                }
                            } else if !self.accum_int(b - b'0') {
                                // the dropped digit counts toward the exponent
                                if self.num.exponent == u64::MAX {
                                    raise!(self, ErrorKind::Range);
                                }
                                self.num.exponent += 1;
                                self.set(State::NumIntOverflow);
                                break;
                            }
                        }
                        Some(_) => {
                            self.set(State::NumAfterInt);
                            break;
                        }
                    }
                },

                State::NumIntOverflow => loop {
                    match self.peek() {
                        None if self.eof => {
                            self.set(State::NumAfterInt);
                            break;
                        }
                        None => return JsonToken::NeedData,
                        Some(b'0'..=b'9') => {
                            if self.num.exponent == u64::MAX {
                                raise!(self, ErrorKind::Range);
                            }
                            self.num.exponent += 1;
                            self.bump();
                        }
                        Some(_) => {
                            self.set(State::NumAfterInt);
                            break;
                        }
                    }
                },

                State::NumAfterInt => match self.peek() {
                    None if self.eof => self.set(State::NumEnd),
                    None => return JsonToken::NeedData,
                    Some(b @ b'.') => {
                        self.bump();
                        self.num.is_integer = false;
                        if self.options.number_as_string && self.scratch.push(b).is_err() {
                            raise!(self, ErrorKind::Memory);
                        }
                        self.set(State::NumFrac);
                    }
                    Some(b @ (b'e' | b'E')) => {
                        self.bump();
                        self.num.is_integer = false;
                        if self.options.number_as_string && self.scratch.push(b).is_err() {
                            raise!(self, ErrorKind::Memory);
                        }
                        self.set(State::NumExp);
                    }
                    Some(_) => self.set(State::NumEnd),
                },

                State::NumFrac => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b @ b'0'..=b'9') => {
                        self.bump();
                        if self.options.number_as_string {
                            if self.scratch.push(b).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            self.set(State::NumFracDigits);
                        } else if self.accum_frac(b - b'0') {
                            self.set(State::NumFracDigits);
                        } else {
                            self.set(State::NumFracOverflow);
                        }
                    }
                    Some(_) => raise!(self, ErrorKind::ExpectedDigit),
                },

                State::NumFracDigits => loop {
                    match self.peek() {
                        None if self.eof => {
                            self.set(State::NumAfterFrac);
                            break;
                        }
                        None => return JsonToken::NeedData,
                        Some(b @ b'0'..=b'9') => {
                            self.bump();
                            if self.options.number_as_string {
                                if self.scratch.push(b).is_err() {
                                    raise!(self, ErrorKind::Memory);
                                }
                            } else if !self.accum_frac(b - b'0') {
                                self.set(State::NumFracOverflow);
                                break;
                            }
                        }
                        Some(_) => {
                            self.set(State::NumAfterFrac);
                            break;
                        }
                    }
                },

                State::NumFracOverflow => loop {
                    match self.peek() {
                        None if self.eof => {
                            self.set(State::NumAfterFrac);
                            break;
                        }
                        None => return JsonToken::NeedData,
                        Some(b'0'..=b'9') => self.bump(),
                        Some(_) => {
                            self.set(State::NumAfterFrac);
                            break;
                        }
                    }
                },

                State::NumAfterFrac => match self.peek() {
                    None if self.eof => self.set(State::NumEnd),
                    None => return JsonToken::NeedData,
                    Some(b @ (b'e' | b'E')) => {
                        self.bump();
                        if self.options.number_as_string && self.scratch.push(b).is_err() {
                            raise!(self, ErrorKind::Memory);
                        }
                        self.set(State::NumExp);
                    }
                    Some(_) => self.set(State::NumEnd),
                },

                State::NumExp => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b @ (b'-' | b'+')) => {
                        self.bump();
                        if self.options.number_as_string {
                            if self.scratch.push(b).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                        } else if b == b'-' {
                            self.num.exponent_positive = false;
                        }
                        self.set(State::NumExpFirst);
                    }
                    Some(_) => self.set(State::NumExpFirst),
                },

                State::NumExpFirst => match self.peek() {
                    None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                    None => return JsonToken::NeedData,
                    Some(b @ b'0'..=b'9') => {
                        self.bump();
                        if self.options.number_as_string {
                            if self.scratch.push(b).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            self.set(State::NumExpDigits);
                        } else if self.accum_exp(b - b'0') {
                            self.set(State::NumExpDigits);
                        } else {
                            self.set(State::NumExpOverflow);
                        }
                    }
                    Some(_) => raise!(self, ErrorKind::ExpectedDigit),
                },

                State::NumExpDigits => loop {
                    match self.peek() {
                        None if self.eof => {
                            self.set(State::NumEnd);
                            break;
                        }
                        None => return JsonToken::NeedData,
                        Some(b @ b'0'..=b'9') => {
                            self.bump();
                            if self.options.number_as_string {
                                if self.scratch.push(b).is_err() {
                                    raise!(self, ErrorKind::Memory);
                                }
                            } else if !self.accum_exp(b - b'0') {
                                self.set(State::NumExpOverflow);
                                break;
                            }
                        }
                        Some(_) => {
                            self.set(State::NumEnd);
                            break;
                        }
                    }
                },

                State::NumExpOverflow => loop {
                    match self.peek() {
                        None if self.eof => {
                            self.set(State::NumEnd);
                            break;
                        }
                        None => return JsonToken::NeedData,
                        Some(b'0'..=b'9') => self.bump(),
                        Some(_) => {
                            self.set(State::NumEnd);
                            break;
                        }
                    }
                },

                State::NumEnd => {
                    match self.peek() {
                        None if !self.eof => return JsonToken::NeedData,
                        Some(b) if is_word(b) => raise!(self, ErrorKind::UnexpectedChar),
                        _ => {}
                    }
                    return self.finish_number();
                }

                State::ArrStart => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(b']') => {
                            self.bump();
                            return self.finish(JsonToken::EndArray);
                        }
                        Some(_) => {
                            self.set(State::ArrAfterValue);
                            if self.push_state(State::Value).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            break;
                        }
                    }
                },

                State::ArrAfterValue => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(b',') => {
                            self.bump();
                            self.set(State::ArrValue);
                            break;
                        }
                        Some(b']') => {
                            self.bump();
                            return self.finish(JsonToken::EndArray);
                        }
                        Some(_) => raise!(self, ErrorKind::ExpectedCommaOrArrayEnd),
                    }
                },

                State::ArrValue => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(_) => {
                            self.set(State::ArrAfterValue);
                            if self.push_state(State::Value).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            break;
                        }
                    }
                },

                State::ObjStart => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(b'}') => {
                            self.bump();
                            return self.finish(JsonToken::EndObject);
                        }
                        Some(b'"') => {
                            self.bump();
                            self.scratch.clear();
                            self.set(State::ObjAfterKey);
                            if self.push_state(State::StrBody).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            break;
                        }
                        Some(_) => raise!(self, ErrorKind::ExpectedString),
                    }
                },

                State::ObjKey => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(b'"') => {
                            self.bump();
                            self.scratch.clear();
                            self.set(State::ObjAfterKey);
                            if self.push_state(State::StrBody).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            break;
                        }
                        Some(_) => raise!(self, ErrorKind::ExpectedString),
                    }
                },

                State::ObjAfterKey => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(b':') => {
                            self.bump();
                            self.set(State::ObjValue);
                            break;
                        }
                        Some(_) => raise!(self, ErrorKind::ExpectedColon),
                    }
                },

                State::ObjValue => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(_) => {
                            self.set(State::ObjAfterValue);
                            if self.push_state(State::Value).is_err() {
                                raise!(self, ErrorKind::Memory);
                            }
                            break;
                        }
                    }
                },

                State::ObjAfterValue => loop {
                    match self.peek() {
                        None if self.eof => raise!(self, ErrorKind::UnexpectedEof),
                        None => return JsonToken::NeedData,
                        Some(b) if is_space(b) => self.bump(),
                        Some(b',') => {
                            self.bump();
                            self.set(State::ObjKey);
                            break;
                        }
                        Some(b'}') => {
                            self.bump();
                            return self.finish(JsonToken::EndObject);
                        }
                        Some(_) => raise!(self, ErrorKind::ExpectedCommaOrObjectEnd),
                    }
                },

                State::Sick => raise!(self, ErrorKind::State),
            }
        }
    }

    /// Accumulate an integer-part digit. Returns `false` once the
    /// accumulator would overflow; the number is then marked non-integer
    /// and the dropped digit is rounded half-up into the accumulator.
    fn accum_int(&mut self, digit: u8) -> bool {
        match self
            .num
            .integer
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit as u64))
        {
            Some(value) => {
                self.num.integer = value;
                true
            }
            None => {
                self.num.is_integer = false;
                if digit >= 5 && self.num.integer < u64::MAX {
                    self.num.integer += 1;
                }
                false
            }
        }
    }

    /// Accumulate a fraction digit. Returns `false` once the accumulator
    /// or the decimal-place counter saturates; further fraction digits
    /// are dropped after rounding this one.
    fn accum_frac(&mut self, digit: u8) -> bool {
        if self.num.decimal_places == u64::MAX {
            if digit >= 5 && self.num.decimal < u64::MAX {
                self.num.decimal += 1;
            }
            return false;
        }
        match self
            .num
            .decimal
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit as u64))
        {
            Some(value) => {
                self.num.decimal = value;
                self.num.decimal_places += 1;
                true
            }
            None => {
                if digit >= 5 && self.num.decimal < u64::MAX {
                    self.num.decimal += 1;
                }
                false
            }
        }
    }

    /// Accumulate an exponent digit. Returns `false` once the exponent
    /// saturates; it is then pinned to `u64::MAX`, which combines to ±∞
    /// or ±0.
    fn accum_exp(&mut self, digit: u8) -> bool {
        match self
            .num
            .exponent
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit as u64))
        {
            Some(value) => {
                self.num.exponent = value;
                true
            }
            None => {
                self.num.exponent = u64::MAX;
                false
            }
        }
    }

    /// Emit the token for a completed number literal.
    fn finish_number(&mut self) -> JsonToken {
        if self.options.number_as_string {
            if self.scratch.push(0).is_err() {
                return self.fail(ErrorKind::Memory, raise_location!());
            }
            self.slot = Slot::NumStr {
                len: self.scratch.len() - 1,
            };
            return self.finish(JsonToken::Number);
        }

        // -0 has no faithful signed 64-bit representation
        if self.num.integer == 0 && !self.num.positive {
            self.num.is_integer = false;
        }

        if self.options.integer_fast_path && self.num.is_integer {
            if let Some(value) = self.num.to_i64() {
                self.slot = Slot::Integer(value);
                return self.finish(JsonToken::Integer);
            }
        }

        if self.options.decomposed_numbers {
            self.slot = Slot::Components;
        } else {
            self.slot = Slot::Number(self.num.to_f64());
        }
        self.finish(JsonToken::Number)
    }

    /// Get the value of the boolean that has just been parsed.
    pub fn current_bool(&self) -> Option<bool> {
        match self.slot {
            Slot::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Get the combined double of the number that has just been parsed.
    /// `None` in decomposed or number-as-string mode.
    pub fn current_f64(&self) -> Option<f64> {
        match self.slot {
            Slot::Number(value) => Some(value),
            _ => None,
        }
    }

    /// Get the value of the integer that has just been parsed. Only
    /// [`JsonToken::Integer`] tokens carry one.
    pub fn current_i64(&self) -> Option<i64> {
        match self.slot {
            Slot::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Get the decomposed components of the number that has just been
    /// parsed. Components are accumulated in every numeric mode except
    /// number-as-string.
    pub fn current_components(&self) -> Option<&NumberComponents> {
        match self.slot {
            Slot::Components | Slot::Number(_) | Slot::Integer(_) => Some(&self.num),
            _ => None,
        }
    }

    /// Get the value of the string that has just been parsed, or the
    /// verbatim literal of a number in number-as-string mode. The
    /// reference is valid only until the next call to
    /// [`next_token()`](Self::next_token()); copy it to keep it longer.
    pub fn current_str(&self) -> Result<&str, InvalidStringValueError> {
        match self.slot {
            Slot::Str { len } | Slot::NumStr { len } => {
                Ok(from_utf8(&self.scratch.as_slice()[..len])?)
            }
            _ => Err(InvalidStringValueError::NotAString),
        }
    }

    /// Like [`current_str()`](Self::current_str()), but returns an owned
    /// copy.
    pub fn current_string(&self) -> Result<String, InvalidStringValueError> {
        self.current_str().map(ToOwned::to_owned)
    }

    /// The raw bytes of the current string payload. Always valid UTF-8;
    /// may contain embedded NUL bytes. The scratch buffer keeps a NUL
    /// terminator just past the returned slice.
    pub fn string_bytes(&self) -> Option<&[u8]> {
        match self.slot {
            Slot::Str { len } | Slot::NumStr { len } => Some(&self.scratch.as_slice()[..len]),
            _ => None,
        }
    }

    /// Parse the captured number literal to an integer. Only available in
    /// number-as-string mode.
    pub fn current_int<I>(&self) -> Result<I, InvalidIntValueError>
    where
        I: FromPrimitive + Zero + CheckedAdd + CheckedSub + CheckedMul,
    {
        match self.slot {
            Slot::NumStr { len } => Ok(btoi::btoi(&self.scratch.as_slice()[..len])?),
            _ => Err(InvalidIntValueError::NotANumber),
        }
    }

    /// Parse the captured number literal to a float. Only available in
    /// number-as-string mode.
    pub fn current_float(&self) -> Result<f64, InvalidFloatValueError> {
        Ok(self.current_str()?.parse()?)
    }

    /// The error record of the last raised error, if any.
    pub fn error(&self) -> Option<&ParseError> {
        match &self.slot {
            Slot::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl Default for JsonTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reset for JsonTokenizer {
    /// Reset the tokenizer to the state it was in when it was
    /// constructed. Buffers keep their allocations.
    fn reset(&mut self) {
        self.input.clear();
        self.pos = 0;
        self.eof = false;
        self.parsed_bytes = 0;
        self.stack.clear();
        self.stack.push(State::Start);
        self.scratch.clear();
        self.slot = Slot::None;
        self.num = NumberComponents::default();
    }
}
