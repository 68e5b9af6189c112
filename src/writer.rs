use thiserror::Error;

use crate::options::{Encoding, JsonWriterOptions};
use crate::reset::Reset;
use crate::unicode;

/// Initial capacity of the structural stack; it grows in steps of the
/// same size.
const STACK_CHUNK: usize = 64;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// An error returned by the writer. Every error except
/// [`EmptyBuffer`](Self::EmptyBuffer) leaves the writer in a sticky error
/// state that only [`reset()`](crate::Reset::reset()) clears.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum JsonWriterError {
    /// The output slice has zero length.
    #[error("output buffer is empty")]
    EmptyBuffer,

    /// The indent string contains non-whitespace characters.
    #[error("invalid indent string: must consist solely of whitespace")]
    InvalidIndent,

    /// A new event was started while the previous one has not been fully
    /// written; call [`write_continue()`](crate::JsonWriter::write_continue())
    /// until a short write first.
    #[error("an event is still being written")]
    EventInFlight,

    /// `end_array`/`end_object` with no open container.
    #[error("no open container to close")]
    NoOpenContainer,

    /// `end_array` while inside an object, or `end_object` while inside
    /// an array.
    #[error("the open container is of the other kind")]
    ContainerMismatch,

    /// `end_object` directly after a key: the key has no value.
    #[error("object key has no value")]
    DanglingKey,

    /// A non-string event at an object's key position.
    #[error("an object member must start with a string key")]
    ExpectedKey,

    /// A UTF-8 string value contains a malformed sequence.
    #[error("string value contains malformed UTF-8")]
    IllegalUnicode,

    /// Growing the structural stack or the string buffer failed.
    #[error("out of memory")]
    Memory,

    /// The writer is in a sticky error state.
    #[error("writer is in an error state")]
    State,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

/// One open container. `first` controls comma insertion; `expect_value`
/// is the key/value parity of an object.
#[derive(Copy, Clone, Debug)]
struct Frame {
    container: Container,
    first: bool,
    expect_value: bool,
}

/// The fragment currently being emitted. Every event runs the same
/// sequence; steps whose flag is off complete immediately.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Step {
    Comma,
    Newline,
    Indent,
    Colon,
    Body,
}

#[derive(Debug)]
enum Body {
    /// `null`, `true`, `false`, a closing bracket, or `0`.
    Literal(&'static [u8]),
    /// A formatted double, streamed from a bounded buffer.
    Number { buf: [u8; 32], len: usize },
    /// An integer, streamed digit by digit with a divide-down divisor.
    Integer {
        value: u64,
        divisor: u64,
        sign_pending: bool,
    },
    /// An opening bracket.
    Open(u8),
    /// A string, walked unit by unit over the writer-owned copy of the
    /// source; each unit's bytes are staged before being copied out.
    Str {
        pos: usize,
        encoding: Encoding,
        stage: [u8; 16],
        stage_len: usize,
        stage_off: usize,
        closed: bool,
    },
}

/// The resume record of an in-flight event.
#[derive(Debug)]
struct Pending {
    comma: bool,
    newline: bool,
    indent_total: usize,
    indent_done: usize,
    colon: bool,
    step: Step,
    /// Byte offset into the fragment the current step is copying.
    frag: usize,
    body: Body,
}

/// An incremental JSON writer.
///
/// Events are written into caller-supplied output slices. A return value
/// equal to the slice length means the output was exhausted mid-event;
/// call [`write_continue()`](Self::write_continue()) with a fresh slice
/// until a short write signals completion. No byte is ever emitted twice.
///
/// The writer validates call order against its structural stack and
/// rejects, among others, closing the wrong container kind, a dangling
/// key, and non-string events at an object's key position.
pub struct JsonWriter {
    options: JsonWriterOptions,
    frames: Vec<Frame>,
    /// Owned copy of the string value currently being emitted.
    str_buf: Vec<u8>,
    pending: Option<Pending>,
    sick: bool,
}

/// Copy `src[*off..]` into `out[*n..]`, advancing both. Returns `true`
/// when the fragment has been fully copied.
fn put(out: &mut [u8], n: &mut usize, src: &[u8], off: &mut usize) -> bool {
    let take = (src.len() - *off).min(out.len() - *n);
    out[*n..*n + take].copy_from_slice(&src[*off..*off + take]);
    *n += take;
    *off += take;
    *off == src.len()
}

fn stage_unicode_escape(stage: &mut [u8; 16], at: usize, unit: u16) -> usize {
    stage[at] = b'\\';
    stage[at + 1] = b'u';
    for i in 0..4 {
        stage[at + 2 + i] = HEX[((unit >> (12 - 4 * i)) & 0xF) as usize];
    }
    at + 6
}

/// Produce the output bytes for the next unit of a string into `stage`.
/// Returns the number of source bytes consumed and the staged length.
fn stage_unit(
    src: &[u8],
    pos: usize,
    encoding: Encoding,
    ascii_safe: bool,
    stage: &mut [u8; 16],
) -> Result<(usize, usize), JsonWriterError> {
    let b = src[pos];
    if b < 0x80 {
        let escaped: Option<&[u8; 2]> = match b {
            b'"' => Some(b"\\\""),
            b'\\' => Some(b"\\\\"),
            0x08 => Some(b"\\b"),
            0x0C => Some(b"\\f"),
            0x0A => Some(b"\\n"),
            0x0D => Some(b"\\r"),
            0x09 => Some(b"\\t"),
            _ => None,
        };
        if let Some(escaped) = escaped {
            stage[..2].copy_from_slice(escaped);
            return Ok((1, 2));
        }
        if b < 0x20 || b == 0x7F {
            return Ok((1, stage_unicode_escape(stage, 0, b as u16)));
        }
        stage[0] = b;
        return Ok((1, 1));
    }

    match encoding {
        Encoding::Latin1 => {
            // 0x80–0x9F are control characters and always escaped
            if b <= 0x9F || ascii_safe {
                Ok((1, stage_unicode_escape(stage, 0, b as u16)))
            } else {
                let mut buf = [0u8; 4];
                let len = unicode::encode_utf8(b as u32, &mut buf)
                    .map_err(|_| JsonWriterError::IllegalUnicode)?;
                stage[..len].copy_from_slice(&buf[..len]);
                Ok((1, len))
            }
        }
        Encoding::Utf8 => {
            let (codepoint, len) = unicode::decode_utf8(&src[pos..])
                .map_err(|_| JsonWriterError::IllegalUnicode)?;
            if !ascii_safe {
                stage[..len].copy_from_slice(&src[pos..pos + len]);
                Ok((len, len))
            } else if codepoint < 0x10000 {
                Ok((len, stage_unicode_escape(stage, 0, codepoint as u16)))
            } else {
                let v = codepoint - 0x10000;
                let high = 0xD800 + (v >> 10) as u16;
                let low = 0xDC00 + (v & 0x3FF) as u16;
                let at = stage_unicode_escape(stage, 0, high);
                Ok((len, stage_unicode_escape(stage, at, low)))
            }
        }
    }
}

impl JsonWriter {
    /// Create a writer producing compact output.
    pub fn new() -> Self {
        JsonWriter {
            options: JsonWriterOptions::default(),
            frames: Vec::with_capacity(STACK_CHUNK),
            str_buf: Vec::new(),
            pending: None,
            sick: false,
        }
    }

    /// Create a writer with the given options. Fails if the indent string
    /// contains non-whitespace characters.
    pub fn with_options(options: JsonWriterOptions) -> Result<Self, JsonWriterError> {
        if let Some(indent) = options.indent.as_deref() {
            if !indent
                .bytes()
                .all(|b| matches!(b, b' ' | b'\n' | b'\r' | b'\t' | 0x0C | 0x0B))
            {
                return Err(JsonWriterError::InvalidIndent);
            }
        }
        Ok(JsonWriter {
            options,
            ..Self::new()
        })
    }

    /// Returns the options this writer was created with.
    pub fn options(&self) -> &JsonWriterOptions {
        &self.options
    }

    /// Returns the nesting depth, i.e. the number of open containers.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn stick<T>(&mut self, error: JsonWriterError) -> Result<T, JsonWriterError> {
        self.sick = true;
        Err(error)
    }

    fn ready(&mut self, out: &[u8]) -> Result<(), JsonWriterError> {
        if out.is_empty() {
            // pure argument validation, does not stick
            return Err(JsonWriterError::EmptyBuffer);
        }
        if self.sick {
            return Err(JsonWriterError::State);
        }
        if self.pending.is_some() {
            return self.stick(JsonWriterError::EventInFlight);
        }
        Ok(())
    }

    /// Validate the event against the structural stack, update the top
    /// frame, and queue the prelude plus `body`.
    fn start_event(
        &mut self,
        out: &mut [u8],
        body: Body,
        is_string: bool,
    ) -> Result<usize, JsonWriterError> {
        let indented = self.options.indent.is_some();
        let depth = self.frames.len();

        let mut comma = false;
        let mut newline = false;
        let mut indent_total = 0;
        let mut colon = false;

        if let Some(top) = self.frames.last_mut() {
            match top.container {
                Container::Array => {
                    comma = !top.first;
                    top.first = false;
                    if indented {
                        newline = true;
                        indent_total = depth;
                    }
                }
                Container::Object => {
                    if top.expect_value {
                        colon = true;
                        top.expect_value = false;
                    } else {
                        if !is_string {
                            return self.stick(JsonWriterError::ExpectedKey);
                        }
                        comma = !top.first;
                        top.first = false;
                        top.expect_value = true;
                        if indented {
                            newline = true;
                            indent_total = depth;
                        }
                    }
                }
            }
        }

        self.pending = Some(Pending {
            comma,
            newline,
            indent_total,
            indent_done: 0,
            colon,
            step: Step::Comma,
            frag: 0,
            body,
        });
        self.pump(out)
    }

    fn push_frame(&mut self, container: Container) -> Result<(), JsonWriterError> {
        if self.frames.len() == self.frames.capacity()
            && self.frames.try_reserve_exact(STACK_CHUNK).is_err()
        {
            return self.stick(JsonWriterError::Memory);
        }
        self.frames.push(Frame {
            container,
            first: true,
            expect_value: false,
        });
        Ok(())
    }

    /// Validate and pop the innermost container and queue its closing
    /// bracket, preceded by a newline and indentation if the container
    /// emitted children.
    fn close_container(
        &mut self,
        out: &mut [u8],
        container: Container,
        bracket: &'static [u8],
    ) -> Result<usize, JsonWriterError> {
        self.ready(out)?;
        let top = match self.frames.last() {
            Some(top) => *top,
            None => return self.stick(JsonWriterError::NoOpenContainer),
        };
        if top.container != container {
            return self.stick(JsonWriterError::ContainerMismatch);
        }
        if top.expect_value {
            return self.stick(JsonWriterError::DanglingKey);
        }
        self.frames.pop();

        let newline = !top.first && self.options.indent.is_some();
        self.pending = Some(Pending {
            comma: false,
            newline,
            indent_total: if newline { self.frames.len() } else { 0 },
            indent_done: 0,
            colon: false,
            step: Step::Comma,
            frag: 0,
            body: Body::Literal(bracket),
        });
        self.pump(out)
    }

    /// Write a `null` value.
    pub fn write_null(&mut self, out: &mut [u8]) -> Result<usize, JsonWriterError> {
        self.ready(out)?;
        self.start_event(out, Body::Literal(b"null"), false)
    }

    /// Write `true` or `false`.
    pub fn write_boolean(&mut self, out: &mut [u8], value: bool) -> Result<usize, JsonWriterError> {
        self.ready(out)?;
        let literal: &'static [u8] = if value { b"true" } else { b"false" };
        self.start_event(out, Body::Literal(literal), false)
    }

    /// Write a double. Finite values are formatted shortest-round-trip;
    /// NaN and infinities are emitted as `null`.
    pub fn write_number(&mut self, out: &mut [u8], value: f64) -> Result<usize, JsonWriterError> {
        self.ready(out)?;
        let body = if value.is_finite() {
            let mut formatted = dtoa::Buffer::new();
            let text = formatted.format(value).as_bytes();
            let mut buf = [0u8; 32];
            buf[..text.len()].copy_from_slice(text);
            Body::Number {
                buf,
                len: text.len(),
            }
        } else {
            Body::Literal(b"null")
        };
        self.start_event(out, body, false)
    }

    /// Write a signed 64-bit integer.
    pub fn write_integer(&mut self, out: &mut [u8], value: i64) -> Result<usize, JsonWriterError> {
        self.ready(out)?;
        let body = if value == 0 {
            Body::Literal(b"0")
        } else {
            let magnitude = value.unsigned_abs();
            let mut divisor = 10_000_000_000_000_000_000u64;
            while magnitude / divisor == 0 {
                divisor /= 10;
            }
            Body::Integer {
                value: magnitude,
                divisor,
                sign_pending: value < 0,
            }
        };
        self.start_event(out, body, false)
    }

    /// Write a string given its raw bytes and their encoding. The bytes
    /// are copied once; the slice only has to stay valid for this call.
    pub fn write_string(
        &mut self,
        out: &mut [u8],
        value: &[u8],
        encoding: Encoding,
    ) -> Result<usize, JsonWriterError> {
        self.ready(out)?;
        self.str_buf.clear();
        if self.str_buf.try_reserve(value.len()).is_err() {
            return self.stick(JsonWriterError::Memory);
        }
        self.str_buf.extend_from_slice(value);
        let mut stage = [0u8; 16];
        stage[0] = b'"';
        self.start_event(
            out,
            Body::Str {
                pos: 0,
                encoding,
                stage,
                stage_len: 1,
                stage_off: 0,
                closed: false,
            },
            true,
        )
    }

    /// Write a UTF-8 string.
    pub fn write_string_utf8(
        &mut self,
        out: &mut [u8],
        value: &str,
    ) -> Result<usize, JsonWriterError> {
        self.write_string(out, value.as_bytes(), Encoding::Utf8)
    }

    /// Write a Latin-1 string: every byte in 0x80–0xFF is the Unicode
    /// code point of the same value.
    pub fn write_string_latin1(
        &mut self,
        out: &mut [u8],
        value: &[u8],
    ) -> Result<usize, JsonWriterError> {
        self.write_string(out, value, Encoding::Latin1)
    }

    /// Open an array.
    pub fn write_begin_array(&mut self, out: &mut [u8]) -> Result<usize, JsonWriterError> {
        self.ready(out)?;
        self.push_frame(Container::Array)?;
        self.start_event_after_push(out, Body::Open(b'['))
    }

    /// Close the innermost array.
    pub fn write_end_array(&mut self, out: &mut [u8]) -> Result<usize, JsonWriterError> {
        self.close_container(out, Container::Array, b"]")
    }

    /// Open an object.
    pub fn write_begin_object(&mut self, out: &mut [u8]) -> Result<usize, JsonWriterError> {
        self.ready(out)?;
        self.push_frame(Container::Object)?;
        self.start_event_after_push(out, Body::Open(b'{'))
    }

    /// Close the innermost object.
    pub fn write_end_object(&mut self, out: &mut [u8]) -> Result<usize, JsonWriterError> {
        self.close_container(out, Container::Object, b"}")
    }

    /// Resume the most recently started event. Returns `Ok(0)` if no
    /// event is in flight.
    pub fn write_continue(&mut self, out: &mut [u8]) -> Result<usize, JsonWriterError> {
        if out.is_empty() {
            return Err(JsonWriterError::EmptyBuffer);
        }
        if self.sick {
            return Err(JsonWriterError::State);
        }
        self.pump(out)
    }

    /// Like [`start_event`](Self::start_event), but the new container's
    /// frame has already been pushed; the prelude must be computed
    /// against the parent frame.
    fn start_event_after_push(
        &mut self,
        out: &mut [u8],
        body: Body,
    ) -> Result<usize, JsonWriterError> {
        let indented = self.options.indent.is_some();
        // depth of the parent, excluding the frame just pushed
        let depth = self.frames.len() - 1;

        let mut comma = false;
        let mut newline = false;
        let mut indent_total = 0;
        let mut colon = false;

        let frames_len = self.frames.len();
        let parent = if frames_len >= 2 {
            self.frames.get_mut(frames_len - 2)
        } else {
            None
        };
        if let Some(top) = parent {
            match top.container {
                Container::Array => {
                    comma = !top.first;
                    top.first = false;
                    if indented {
                        newline = true;
                        indent_total = depth;
                    }
                }
                Container::Object => {
                    if top.expect_value {
                        colon = true;
                        top.expect_value = false;
                    } else {
                        // a container cannot be an object key
                        self.frames.pop();
                        return self.stick(JsonWriterError::ExpectedKey);
                    }
                }
            }
        }

        self.pending = Some(Pending {
            comma,
            newline,
            indent_total,
            indent_done: 0,
            colon,
            step: Step::Comma,
            frag: 0,
            body,
        });
        self.pump(out)
    }

    /// Drive the pending event forward until it completes or `out` is
    /// exhausted. A full return (`== out.len()`) means more output is
    /// needed.
    fn pump(&mut self, out: &mut [u8]) -> Result<usize, JsonWriterError> {
        let mut n = 0usize;
        let pending = match self.pending.as_mut() {
            Some(pending) => pending,
            None => return Ok(0),
        };

        'event: loop {
            match pending.step {
                Step::Comma => {
                    if pending.comma && !put(out, &mut n, b",", &mut pending.frag) {
                        return Ok(out.len());
                    }
                    pending.frag = 0;
                    pending.step = Step::Newline;
                }
                Step::Newline => {
                    if pending.newline && !put(out, &mut n, b"\n", &mut pending.frag) {
                        return Ok(out.len());
                    }
                    pending.frag = 0;
                    pending.step = Step::Indent;
                }
                Step::Indent => {
                    let indent = self.options.indent.as_deref().unwrap_or("").as_bytes();
                    while pending.indent_done < pending.indent_total {
                        if !put(out, &mut n, indent, &mut pending.frag) {
                            return Ok(out.len());
                        }
                        pending.frag = 0;
                        pending.indent_done += 1;
                    }
                    pending.step = Step::Colon;
                }
                Step::Colon => {
                    let colon: &[u8] = if self.options.indent.is_some() {
                        b": "
                    } else {
                        b":"
                    };
                    if pending.colon && !put(out, &mut n, colon, &mut pending.frag) {
                        return Ok(out.len());
                    }
                    pending.frag = 0;
                    pending.step = Step::Body;
                }
                Step::Body => match &mut pending.body {
                    Body::Literal(bytes) => {
                        if !put(out, &mut n, bytes, &mut pending.frag) {
                            return Ok(out.len());
                        }
                        break 'event;
                    }
                    Body::Open(bracket) => {
                        let one = [*bracket];
                        if !put(out, &mut n, &one, &mut pending.frag) {
                            return Ok(out.len());
                        }
                        break 'event;
                    }
                    Body::Number { buf, len } => {
                        let src: &[u8] = &buf[..*len];
                        if !put(out, &mut n, src, &mut pending.frag) {
                            return Ok(out.len());
                        }
                        break 'event;
                    }
                    Body::Integer {
                        value,
                        divisor,
                        sign_pending,
                    } => {
                        if *sign_pending {
                            if n == out.len() {
                                return Ok(out.len());
                            }
                            out[n] = b'-';
                            n += 1;
                            *sign_pending = false;
                        }
                        while *divisor > 0 {
                            if n == out.len() {
                                return Ok(out.len());
                            }
                            out[n] = b'0' + ((*value / *divisor) % 10) as u8;
                            n += 1;
                            *divisor /= 10;
                        }
                        break 'event;
                    }
                    Body::Str {
                        pos,
                        encoding,
                        stage,
                        stage_len,
                        stage_off,
                        closed,
                    } => loop {
                        if *stage_off < *stage_len {
                            let staged = *stage;
                            if !put(out, &mut n, &staged[..*stage_len], stage_off) {
                                return Ok(out.len());
                            }
                        }
                        if *closed {
                            break 'event;
                        }
                        if *pos >= self.str_buf.len() {
                            stage[0] = b'"';
                            *stage_len = 1;
                            *stage_off = 0;
                            *closed = true;
                            continue;
                        }
                        match stage_unit(
                            &self.str_buf,
                            *pos,
                            *encoding,
                            self.options.ascii_safe,
                            stage,
                        ) {
                            Ok((consumed, staged)) => {
                                *pos += consumed;
                                *stage_len = staged;
                                *stage_off = 0;
                            }
                            Err(error) => {
                                self.sick = true;
                                return Err(error);
                            }
                        }
                    },
                },
            }
        }

        self.pending = None;
        Ok(n)
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reset for JsonWriter {
    /// Reset the writer to the state it was in when it was constructed.
    /// Buffers keep their allocations.
    fn reset(&mut self) {
        self.frames.clear();
        self.str_buf.clear();
        self.pending = None;
        self.sick = false;
    }
}
