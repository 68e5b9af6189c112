use crate::error::InvalidOptionsError;

/// The encoding of raw bytes inside string literals. Structural
/// characters and whitespace are ASCII in both encodings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Strictly validated UTF-8.
    #[default]
    Utf8,

    /// ISO-8859-1: every byte in 0x80–0xFF is the Unicode code point of
    /// the same value.
    Latin1,
}

/// Options for [`JsonTokenizer`](crate::JsonTokenizer). Use
/// [`JsonTokenizerOptionsBuilder`] to create instances of this struct.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct JsonTokenizerOptions {
    pub(crate) integer_fast_path: bool,
    pub(crate) decomposed_numbers: bool,
    pub(crate) number_as_string: bool,
    pub(crate) encoding: Encoding,
}

impl JsonTokenizerOptions {
    /// Returns `true` if numbers without a decimal point or exponent are
    /// emitted as [`JsonToken::Integer`](crate::JsonToken::Integer).
    pub fn integer_fast_path(&self) -> bool {
        self.integer_fast_path
    }

    /// Returns `true` if numbers are surfaced as their decomposed
    /// components instead of a combined double.
    pub fn decomposed_numbers(&self) -> bool {
        self.decomposed_numbers
    }

    /// Returns `true` if number literals are captured verbatim as strings.
    pub fn number_as_string(&self) -> bool {
        self.number_as_string
    }

    /// Returns the input encoding of string literals.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub(crate) fn validate(&self) -> Result<(), InvalidOptionsError> {
        if self.number_as_string && (self.integer_fast_path || self.decomposed_numbers) {
            return Err(InvalidOptionsError);
        }
        Ok(())
    }
}

/// A builder for [`JsonTokenizerOptions`]
///
/// ```rust
/// use jsonpull::{JsonTokenizer, JsonTokenizerOptionsBuilder};
///
/// let mut tokenizer = JsonTokenizer::with_options(
///     JsonTokenizerOptionsBuilder::default()
///         .with_integer_fast_path(true)
///         .build(),
/// )
/// .unwrap();
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct JsonTokenizerOptionsBuilder {
    options: JsonTokenizerOptions,
}

impl JsonTokenizerOptionsBuilder {
    /// Emit numbers without a decimal point or exponent that fit into a
    /// signed 64-bit integer as
    /// [`JsonToken::Integer`](crate::JsonToken::Integer).
    pub fn with_integer_fast_path(mut self, integer_fast_path: bool) -> Self {
        self.options.integer_fast_path = integer_fast_path;
        self
    }

    /// Surface numbers as their decomposed components (sign, integer
    /// part, decimal digits, decimal places, exponent) instead of
    /// combining them into a double.
    pub fn with_decomposed_numbers(mut self, decomposed_numbers: bool) -> Self {
        self.options.decomposed_numbers = decomposed_numbers;
        self
    }

    /// Capture number literals verbatim as strings instead of parsing
    /// them. This mode exists for callers that cannot tolerate the lossy
    /// 64-bit accumulation; it cannot be combined with the integer fast
    /// path or decomposed numbers.
    pub fn with_number_as_string(mut self, number_as_string: bool) -> Self {
        self.options.number_as_string = number_as_string;
        self
    }

    /// Set the input encoding of string literals.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.options.encoding = encoding;
        self
    }

    /// Create a new [`JsonTokenizerOptions`] object
    pub fn build(self) -> JsonTokenizerOptions {
        self.options
    }
}

/// Options for [`JsonWriter`](crate::JsonWriter). Use
/// [`JsonWriterOptionsBuilder`] to create instances of this struct.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct JsonWriterOptions {
    pub(crate) ascii_safe: bool,
    pub(crate) indent: Option<String>,
}

impl JsonWriterOptions {
    /// Returns `true` if all non-ASCII output is escaped as `\uXXXX`.
    pub fn ascii_safe(&self) -> bool {
        self.ascii_safe
    }

    /// Returns the indentation string, if any. `None` means compact
    /// output; an empty string means newlines without indentation.
    pub fn indent(&self) -> Option<&str> {
        self.indent.as_deref()
    }
}

/// A builder for [`JsonWriterOptions`]
///
/// ```rust
/// use jsonpull::{JsonWriter, JsonWriterOptionsBuilder};
///
/// let mut writer = JsonWriter::with_options(
///     JsonWriterOptionsBuilder::default()
///         .with_indent("  ")
///         .build(),
/// )
/// .unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct JsonWriterOptionsBuilder {
    options: JsonWriterOptions,
}

impl JsonWriterOptionsBuilder {
    /// Escape every non-ASCII character as `\uXXXX`, using surrogate
    /// pairs for code points beyond U+FFFF.
    pub fn with_ascii_safe(mut self, ascii_safe: bool) -> Self {
        self.options.ascii_safe = ascii_safe;
        self
    }

    /// Indent output with the given string, which must consist solely of
    /// whitespace. An empty string produces newlines without
    /// indentation. [`JsonWriter::with_options()`](crate::JsonWriter::with_options())
    /// rejects non-whitespace indents.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.options.indent = Some(indent.into());
        self
    }

    /// Produce compact output without any whitespace between tokens.
    /// This is the default.
    pub fn compact(mut self) -> Self {
        self.options.indent = None;
        self
    }

    /// Create a new [`JsonWriterOptions`] object
    pub fn build(self) -> JsonWriterOptions {
        self.options
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn number_as_string_is_exclusive() {
        let options = JsonTokenizerOptionsBuilder::default()
            .with_number_as_string(true)
            .with_integer_fast_path(true)
            .build();
        assert!(options.validate().is_err());

        let options = JsonTokenizerOptionsBuilder::default()
            .with_number_as_string(true)
            .with_decomposed_numbers(true)
            .build();
        assert!(options.validate().is_err());

        let options = JsonTokenizerOptionsBuilder::default()
            .with_number_as_string(true)
            .build();
        assert!(options.validate().is_ok());
    }

    #[test]
    fn integer_and_components_may_combine() {
        let options = JsonTokenizerOptionsBuilder::default()
            .with_integer_fast_path(true)
            .with_decomposed_numbers(true)
            .build();
        assert!(options.validate().is_ok());
    }
}
