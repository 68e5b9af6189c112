//! # jsonpull
//!
//! An incremental, pull-mode JSON tokenizer and a symmetric incremental
//! JSON writer.
//!
//! Both engines follow a "push input bytes in / pull events or output
//! bytes out" contract: the caller stays in full control of its own I/O
//! and no document is ever materialized in memory. Each engine is a
//! suspendable state machine that resumes exactly where it left off
//! across arbitrarily many buffer boundaries, including inside keywords,
//! UTF-8 sequences, surrogate pairs, numbers, string escapes, and the
//! indentation between container children.
//!
//! ## Tokenizing
//!
//! Feed chunks into a [`JsonTokenizer`] and pull tokens until it returns
//! [`JsonToken::NeedData`]; then feed the next chunk, or an empty slice
//! to signal the end of input. The final token is [`JsonToken::End`] or
//! [`JsonToken::Error`].
//!
//! ```
//! use jsonpull::{JsonToken, JsonTokenizer};
//!
//! let json = br#"{"stream": "stdin", "chunk": 7}"#;
//!
//! let mut tokenizer = JsonTokenizer::new();
//! let mut chunks = json.chunks(7);
//! let mut strings = Vec::new();
//!
//! loop {
//!     match tokenizer.next_token() {
//!         JsonToken::NeedData => {
//!             // any chunk size works; an empty chunk means end of input
//!             tokenizer.feed(chunks.next().unwrap_or(&[])).unwrap();
//!         }
//!         JsonToken::String => strings.push(tokenizer.current_string().unwrap()),
//!         JsonToken::End => break,
//!         JsonToken::Error(kind) => panic!("parse error: {kind}"),
//!         _ => {}
//!     }
//! }
//!
//! assert_eq!(strings, vec!["stream", "stdin", "chunk"]);
//! ```
//!
//! Object keys are ordinary [`JsonToken::String`] tokens; the caller
//! tells keys from values by their position inside the object.
//!
//! ## Numeric modes
//!
//! By default numbers arrive as combined doubles. The integer fast path
//! emits true integers as [`JsonToken::Integer`], decomposed mode
//! surfaces the accumulated [`NumberComponents`], and number-as-string
//! mode captures the literal verbatim for callers that cannot tolerate
//! lossy 64-bit accumulation.
//!
//! ```
//! use jsonpull::{JsonToken, JsonTokenizer, JsonTokenizerOptionsBuilder};
//!
//! let mut tokenizer = JsonTokenizer::with_options(
//!     JsonTokenizerOptionsBuilder::default()
//!         .with_integer_fast_path(true)
//!         .build(),
//! )
//! .unwrap();
//!
//! tokenizer.feed(b"[1, 2.5]").unwrap();
//! assert_eq!(tokenizer.next_token(), JsonToken::BeginArray);
//! assert_eq!(tokenizer.next_token(), JsonToken::Integer);
//! assert_eq!(tokenizer.current_i64(), Some(1));
//! assert_eq!(tokenizer.next_token(), JsonToken::Number);
//! assert_eq!(tokenizer.current_f64(), Some(2.5));
//! assert_eq!(tokenizer.next_token(), JsonToken::EndArray);
//! ```
//!
//! ## Writing
//!
//! A [`JsonWriter`] emits one event at a time into a caller-supplied
//! slice. A return value equal to the slice length means the output was
//! exhausted mid-event; call
//! [`write_continue()`](JsonWriter::write_continue()) with a fresh slice
//! until a short write. No byte is emitted twice.
//!
//! ```
//! use jsonpull::{JsonWriter, JsonWriterOptionsBuilder};
//!
//! let mut writer = JsonWriter::with_options(
//!     JsonWriterOptionsBuilder::default().with_indent("  ").build(),
//! )
//! .unwrap();
//!
//! let mut buf = [0u8; 64];
//! let mut out = Vec::new();
//!
//! let n = writer.write_begin_array(&mut buf).unwrap();
//! out.extend_from_slice(&buf[..n]);
//! let n = writer.write_integer(&mut buf, 1).unwrap();
//! out.extend_from_slice(&buf[..n]);
//! let n = writer.write_integer(&mut buf, 2).unwrap();
//! out.extend_from_slice(&buf[..n]);
//! let n = writer.write_end_array(&mut buf).unwrap();
//! out.extend_from_slice(&buf[..n]);
//!
//! assert_eq!(out, b"[\n  1,\n  2\n]");
//! ```
//!
//! ## Callback dispatch
//!
//! For callers that prefer callbacks over a pull loop, the
//! [`callback`] module drives the tokenizer and fans tokens out to a
//! [`JsonTokenHandler`](callback::JsonTokenHandler).
//!
//! ## Parsing into a Serde JSON Value
//!
//! For testing and compatibility reasons, the `serde_json` feature adds
//! [`serde_json::from_slice`](crate::serde_json::from_slice), which
//! builds a Serde JSON `Value` through the tokenizer. If you find
//! yourself relying on it, your data fits into memory and you are most
//! likely better off using Serde JSON directly.

pub mod callback;
mod error;
mod event;
mod number;
mod options;
mod reset;
mod scratch;
mod tokenizer;
pub mod unicode;
mod writer;

#[cfg(feature = "serde_json")]
pub mod serde_json;

pub use error::{
    ErrorKind, FeedError, InvalidFloatValueError, InvalidIntValueError, InvalidOptionsError,
    InvalidStringValueError, Location, ParseError,
};
pub use event::JsonToken;
pub use number::NumberComponents;
pub use options::{
    Encoding, JsonTokenizerOptions, JsonTokenizerOptionsBuilder, JsonWriterOptions,
    JsonWriterOptionsBuilder,
};
pub use reset::Reset;
pub use tokenizer::JsonTokenizer;
pub use writer::{JsonWriter, JsonWriterError};
