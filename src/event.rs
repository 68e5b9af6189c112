use crate::error::ErrorKind;

/// All possible tokens returned by [`JsonTokenizer::next_token()`](crate::JsonTokenizer::next_token())
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i8)]
pub enum JsonToken {
    /// The tokenizer hit an error. The kind is carried inline; the full
    /// error record (including the raise location) is available through
    /// [`JsonTokenizer::error()`](crate::JsonTokenizer::error()).
    Error(ErrorKind) = -1,

    /// The tokenizer needs more input before the next token can be
    /// returned. Call [`JsonTokenizer::feed()`](crate::JsonTokenizer::feed())
    /// with the next chunk, or with an empty slice to signal the end of
    /// input.
    NeedData = 0,

    /// A `null` value.
    Null = 1,

    /// The boolean values `true` and `false`. Call
    /// [`JsonTokenizer::current_bool()`](crate::JsonTokenizer::current_bool())
    /// to get the value.
    Boolean = 2,

    /// A number. Depending on the numeric mode, the value is available
    /// through [`current_f64()`](crate::JsonTokenizer::current_f64()),
    /// [`current_components()`](crate::JsonTokenizer::current_components()),
    /// or, in number-as-string mode,
    /// [`current_str()`](crate::JsonTokenizer::current_str()).
    Number = 3,

    /// A number that is a true integer, emitted only when the integer
    /// fast path is enabled. Call
    /// [`current_i64()`](crate::JsonTokenizer::current_i64()) to get the
    /// value. Integers never collapse back to [`Number`](Self::Number).
    Integer = 4,

    /// A string value, including object keys: the first string inside an
    /// object, and every string following a comma at object level, is a
    /// key. Call [`current_str()`](crate::JsonTokenizer::current_str())
    /// to get the value; it stays valid until the next call to
    /// [`next_token()`](crate::JsonTokenizer::next_token()).
    String = 5,

    /// The start of an array.
    BeginArray = 6,

    /// The end of an array.
    EndArray = 7,

    /// The start of an object.
    BeginObject = 8,

    /// The end of an object.
    EndObject = 9,

    /// The end of the JSON document.
    End = 10,
}
