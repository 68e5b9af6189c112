use jsonpull::{
    ErrorKind, JsonToken, JsonTokenizer, JsonTokenizerOptions, JsonTokenizerOptionsBuilder,
    NumberComponents, Reset,
};

/// A token together with its attached value, for comparing streams.
#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Null,
    Bool(bool),
    Num(f64),
    Int(i64),
    Str(Vec<u8>),
    Comp(NumberComponents),
    NumStr(String),
    BeginArr,
    EndArr,
    BeginObj,
    EndObj,
    End,
    Err(ErrorKind),
}

/// Tokenize `json`, feeding it in chunks of `chunk` bytes (0 = one
/// chunk), and return the stream with values attached.
fn tokenize_chunked(json: &[u8], options: JsonTokenizerOptions, chunk: usize) -> Vec<Tok> {
    let mut tokenizer = JsonTokenizer::with_options(options).unwrap();
    let mut chunks: Vec<&[u8]> = if chunk == 0 {
        vec![json]
    } else {
        json.chunks(chunk).collect()
    };
    chunks.reverse();

    let mut tokens = vec![];
    loop {
        let tok = match tokenizer.next_token() {
            JsonToken::NeedData => {
                tokenizer.feed(chunks.pop().unwrap_or(&[])).unwrap();
                continue;
            }
            JsonToken::Null => Tok::Null,
            JsonToken::Boolean => Tok::Bool(tokenizer.current_bool().unwrap()),
            JsonToken::Number => {
                if options.number_as_string() {
                    Tok::NumStr(tokenizer.current_str().unwrap().to_owned())
                } else if options.decomposed_numbers() {
                    Tok::Comp(*tokenizer.current_components().unwrap())
                } else {
                    Tok::Num(tokenizer.current_f64().unwrap())
                }
            }
            JsonToken::Integer => Tok::Int(tokenizer.current_i64().unwrap()),
            JsonToken::String => Tok::Str(tokenizer.string_bytes().unwrap().to_vec()),
            JsonToken::BeginArray => Tok::BeginArr,
            JsonToken::EndArray => Tok::EndArr,
            JsonToken::BeginObject => Tok::BeginObj,
            JsonToken::EndObject => Tok::EndObj,
            JsonToken::End => {
                tokens.push(Tok::End);
                return tokens;
            }
            JsonToken::Error(kind) => {
                tokens.push(Tok::Err(kind));
                return tokens;
            }
        };
        tokens.push(tok);
    }
}

fn tokenize(json: &[u8], options: JsonTokenizerOptions) -> Vec<Tok> {
    tokenize_chunked(json, options, 0)
}

fn default_options() -> JsonTokenizerOptions {
    JsonTokenizerOptions::default()
}

fn integer_options() -> JsonTokenizerOptions {
    JsonTokenizerOptionsBuilder::default()
        .with_integer_fast_path(true)
        .build()
}

fn components_options() -> JsonTokenizerOptions {
    JsonTokenizerOptionsBuilder::default()
        .with_decomposed_numbers(true)
        .build()
}

fn string_options() -> JsonTokenizerOptions {
    JsonTokenizerOptionsBuilder::default()
        .with_number_as_string(true)
        .build()
}

fn latin1_options() -> JsonTokenizerOptions {
    JsonTokenizerOptionsBuilder::default()
        .with_encoding(jsonpull::Encoding::Latin1)
        .build()
}

#[test]
fn top_level_true() {
    assert_eq!(
        tokenize(b"true", default_options()),
        vec![Tok::Bool(true), Tok::End]
    );
}

#[test]
fn integer_array_with_surrounding_whitespace() {
    assert_eq!(
        tokenize(b"  [1, 2, 3] ", integer_options()),
        vec![
            Tok::BeginArr,
            Tok::Int(1),
            Tok::Int(2),
            Tok::Int(3),
            Tok::EndArr,
            Tok::End
        ]
    );
}

#[test]
fn simple_object() {
    assert_eq!(
        tokenize(br#"{"a":1,"b":null}"#, default_options()),
        vec![
            Tok::BeginObj,
            Tok::Str(b"a".to_vec()),
            Tok::Num(1.0),
            Tok::Str(b"b".to_vec()),
            Tok::Null,
            Tok::EndObj,
            Tok::End
        ]
    );
}

#[test]
fn surrogate_pair_becomes_utf8() {
    assert_eq!(
        tokenize(br#""\uD83D\uDE00""#, default_options()),
        vec![Tok::Str(vec![0xF0, 0x9F, 0x98, 0x80]), Tok::End]
    );
}

#[test]
fn decomposed_number() {
    let tokens = tokenize(b"12.5e2", components_options());
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Tok::Comp(c) => {
            assert!(c.positive);
            assert_eq!(c.integer, 12);
            assert_eq!(c.decimal, 5);
            assert_eq!(c.decimal_places, 1);
            assert!(c.exponent_positive);
            assert_eq!(c.exponent, 2);
            assert!(!c.is_integer);
        }
        other => panic!("expected components, got {other:?}"),
    }
}

#[test]
fn trailing_comma_is_rejected() {
    assert_eq!(
        tokenize(b"[1, 2,]", default_options()),
        vec![
            Tok::BeginArr,
            Tok::Num(1.0),
            Tok::Num(2.0),
            Tok::Err(ErrorKind::UnexpectedChar)
        ]
    );
}

/// Feeding a document in chunks of any size yields exactly the same
/// token sequence as feeding it whole, including per-byte chunks.
#[test]
fn slice_boundary_invariance() {
    let documents: &[&[u8]] = &[
        b"true",
        b"  [1, 2, 3] ",
        br#"{"a":1,"b":null}"#,
        br#""\uD83D\uDE00""#,
        b"12.5e2",
        b"[1, 2,]",
        br#"  {"k": [1.25e-3, "aA\n", {"x": []}, [false, null, -17]], "": ""}  "#,
        "[\"héllo wörld €😀\", 0.1e10]".as_bytes(),
        b"1e308",
        b"[[[[[[[[[[1]]]]]]]]]]",
    ];
    for options in [
        default_options(),
        integer_options(),
        components_options(),
        string_options(),
    ] {
        for doc in documents {
            let whole = tokenize(doc, options);
            for chunk in [1, 2, 3, 7] {
                assert_eq!(
                    tokenize_chunked(doc, options, chunk),
                    whole,
                    "split {chunk} of {:?}",
                    String::from_utf8_lossy(doc)
                );
            }
        }
    }
}

/// A surrogate pair straddling a feed boundary combines correctly; this
/// is covered byte-by-byte here on top of the invariance sweep.
#[test]
fn surrogate_pair_across_feed_boundary() {
    let json = br#""\uD83D\uDE00""#;
    assert_eq!(
        tokenize_chunked(json, default_options(), 1),
        vec![Tok::Str(vec![0xF0, 0x9F, 0x98, 0x80]), Tok::End]
    );
}

#[test]
fn utf8_continuation_across_feed_boundary() {
    let json = "\"😀\"".as_bytes();
    assert_eq!(
        tokenize_chunked(json, default_options(), 1),
        vec![Tok::Str("😀".as_bytes().to_vec()), Tok::End]
    );
}

#[test]
fn nul_escape_is_preserved() {
    assert_eq!(
        tokenize(br#""a\u0000b""#, default_options()),
        vec![Tok::Str(vec![b'a', 0, b'b']), Tok::End]
    );
}

#[test]
fn one_followed_by_400_zeros() {
    let mut json = b"1".to_vec();
    json.extend(std::iter::repeat(b'0').take(400));

    // combined mode: 1e400 overflows to infinity
    assert_eq!(
        tokenize(&json, default_options()),
        vec![Tok::Num(f64::INFINITY), Tok::End]
    );

    // the integer fast path does not apply to an overflowed mantissa
    assert_eq!(
        tokenize(&json, integer_options()),
        vec![Tok::Num(f64::INFINITY), Tok::End]
    );

    // decomposed mode exposes the saturated mantissa and the implied
    // exponent of the dropped digits
    let tokens = tokenize(&json, components_options());
    match &tokens[0] {
        Tok::Comp(c) => {
            assert_eq!(c.integer, 10_000_000_000_000_000_000);
            assert_eq!(c.exponent, 381);
            assert!(c.exponent_positive);
            assert!(!c.is_integer);
        }
        other => panic!("expected components, got {other:?}"),
    }

    // number-as-string captures all 401 digits verbatim
    let tokens = tokenize(&json, string_options());
    assert_eq!(
        tokens[0],
        Tok::NumStr(String::from_utf8(json.clone()).unwrap())
    );
}

#[test]
fn explicit_exponent_overflow_is_pinned() {
    // one digit more than u64::MAX can hold
    let json = b"1e184467440737095516150";
    assert_eq!(
        tokenize(json, default_options()),
        vec![Tok::Num(f64::INFINITY), Tok::End]
    );
    let tokens = tokenize(json, components_options());
    match &tokens[0] {
        Tok::Comp(c) => assert_eq!(c.exponent, u64::MAX),
        other => panic!("expected components, got {other:?}"),
    }

    // a negative pinned exponent underflows to zero
    assert_eq!(
        tokenize(b"1e-184467440737095516150", default_options()),
        vec![Tok::Num(0.0), Tok::End]
    );
}

#[test]
fn whitespace_only_document() {
    assert_eq!(
        tokenize(b" \t\r\n ", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedEof)]
    );
    assert_eq!(
        tokenize(b"", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedEof)]
    );
}

#[test]
fn object_member_errors() {
    assert_eq!(
        tokenize(br#"{"a"}"#, default_options()),
        vec![
            Tok::BeginObj,
            Tok::Str(b"a".to_vec()),
            Tok::Err(ErrorKind::ExpectedColon)
        ]
    );
    assert_eq!(
        tokenize(br#"{"a":}"#, default_options()),
        vec![
            Tok::BeginObj,
            Tok::Str(b"a".to_vec()),
            Tok::Err(ErrorKind::UnexpectedChar)
        ]
    );
    assert_eq!(
        tokenize(b"{1: 2}", default_options()),
        vec![Tok::BeginObj, Tok::Err(ErrorKind::ExpectedString)]
    );
    assert_eq!(
        tokenize(br#"{"a":1,}"#, default_options()),
        vec![
            Tok::BeginObj,
            Tok::Str(b"a".to_vec()),
            Tok::Num(1.0),
            Tok::Err(ErrorKind::ExpectedString)
        ]
    );
    assert_eq!(
        tokenize(br#"{"a":1"#, default_options()),
        vec![
            Tok::BeginObj,
            Tok::Str(b"a".to_vec()),
            Tok::Num(1.0),
            Tok::Err(ErrorKind::UnexpectedEof)
        ]
    );
    assert_eq!(
        tokenize(br#"{"a":1 "b":2}"#, default_options()),
        vec![
            Tok::BeginObj,
            Tok::Str(b"a".to_vec()),
            Tok::Num(1.0),
            Tok::Err(ErrorKind::ExpectedCommaOrObjectEnd)
        ]
    );
}

#[test]
fn array_errors() {
    assert_eq!(
        tokenize(b"[1 2]", default_options()),
        vec![
            Tok::BeginArr,
            Tok::Num(1.0),
            Tok::Err(ErrorKind::ExpectedCommaOrArrayEnd)
        ]
    );
    assert_eq!(
        tokenize(b"[1,", default_options()),
        vec![Tok::BeginArr, Tok::Num(1.0), Tok::Err(ErrorKind::UnexpectedEof)]
    );
}

#[test]
fn number_errors() {
    assert_eq!(
        tokenize(b"-", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedEof)]
    );
    assert_eq!(
        tokenize(b"-x", default_options()),
        vec![Tok::Err(ErrorKind::ExpectedDigit)]
    );
    assert_eq!(
        tokenize(b"1.", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedEof)]
    );
    assert_eq!(
        tokenize(b"1.x", default_options()),
        vec![Tok::Err(ErrorKind::ExpectedDigit)]
    );
    assert_eq!(
        tokenize(b"1ex", default_options()),
        vec![Tok::Err(ErrorKind::ExpectedDigit)]
    );
    assert_eq!(
        tokenize(b"1e+", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedEof)]
    );
    assert_eq!(
        tokenize(b"01", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedChar)]
    );
    assert_eq!(
        tokenize(b"1true", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedChar)]
    );
}

#[test]
fn string_errors() {
    assert_eq!(
        tokenize(br#""\x""#, default_options()),
        vec![Tok::Err(ErrorKind::IllegalEscape)]
    );
    assert_eq!(
        tokenize(br#""\uZZZZ""#, default_options()),
        vec![Tok::Err(ErrorKind::ExpectedHexDigit)]
    );
    // lone low surrogate
    assert_eq!(
        tokenize(br#""\uDC00""#, default_options()),
        vec![Tok::Err(ErrorKind::IllegalUnicode)]
    );
    // high surrogate not followed by a low one
    assert_eq!(
        tokenize(br#""\uD800x""#, default_options()),
        vec![Tok::Err(ErrorKind::IllegalUnicode)]
    );
    assert_eq!(
        tokenize(br#""\uD800A""#, default_options()),
        vec![Tok::Err(ErrorKind::IllegalUnicode)]
    );
    // stray continuation byte
    assert_eq!(
        tokenize(&[b'"', 0x80, b'"'], default_options()),
        vec![Tok::Err(ErrorKind::IllegalUnicode)]
    );
    // overlong encoding
    assert_eq!(
        tokenize(&[b'"', 0xC0, 0xAF, b'"'], default_options()),
        vec![Tok::Err(ErrorKind::IllegalUnicode)]
    );
    // UTF-8 encoded surrogate
    assert_eq!(
        tokenize(&[b'"', 0xED, 0xA0, 0x80, b'"'], default_options()),
        vec![Tok::Err(ErrorKind::IllegalUnicode)]
    );
    // unterminated string
    assert_eq!(
        tokenize(br#""abc"#, default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedEof)]
    );
}

#[test]
fn latin1_bytes_are_transcoded() {
    // 0xAB is « in Latin-1
    assert_eq!(
        tokenize(&[b'"', 0xAB, b'"'], latin1_options()),
        vec![Tok::Str(vec![0xC2, 0xAB]), Tok::End]
    );
    // 0xFF is ÿ
    assert_eq!(
        tokenize(&[b'"', 0xFF, b'"'], latin1_options()),
        vec![Tok::Str("ÿ".as_bytes().to_vec()), Tok::End]
    );
}

#[test]
fn minus_zero_is_not_an_integer() {
    assert_eq!(
        tokenize(b"-0", integer_options()),
        vec![Tok::Num(-0.0), Tok::End]
    );
    assert_eq!(tokenize(b"0", integer_options()), vec![Tok::Int(0), Tok::End]);

    let tokens = tokenize(b"-0", components_options());
    match &tokens[0] {
        Tok::Comp(c) => {
            assert!(!c.is_integer);
            assert!(!c.positive);
            assert_eq!(c.integer, 0);
        }
        other => panic!("expected components, got {other:?}"),
    }
}

#[test]
fn integer_fast_path_respects_the_signed_range() {
    assert_eq!(
        tokenize(b"9223372036854775807", integer_options()),
        vec![Tok::Int(i64::MAX), Tok::End]
    );
    assert_eq!(
        tokenize(b"-9223372036854775808", integer_options()),
        vec![Tok::Int(i64::MIN), Tok::End]
    );
    // one past the positive range falls back to a double
    assert_eq!(
        tokenize(b"9223372036854775808", integer_options()),
        vec![Tok::Num(9223372036854775808.0), Tok::End]
    );
    assert_eq!(
        tokenize(b"-9223372036854775809", integer_options()),
        vec![Tok::Num(-9223372036854775809.0), Tok::End]
    );
}

#[test]
fn deeply_nested_arrays_grow_the_stack() {
    let mut json = vec![b'['; 1000];
    json.push(b'1');
    json.extend(vec![b']'; 1000]);

    let tokens = tokenize(&json, default_options());
    assert_eq!(tokens.len(), 2002);
    assert_eq!(tokens[0], Tok::BeginArr);
    assert_eq!(tokens[1000], Tok::Num(1.0));
    assert_eq!(tokens[2001], Tok::End);
}

#[test]
fn keywords_must_stand_alone() {
    assert_eq!(
        tokenize(b"truely", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedChar)]
    );
    assert_eq!(
        tokenize(b"nul", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedEof)]
    );
    assert_eq!(
        tokenize(b"nulx", default_options()),
        vec![Tok::Err(ErrorKind::UnexpectedChar)]
    );
    // punctuation is a valid boundary
    assert_eq!(
        tokenize(b"[true]", default_options()),
        vec![Tok::BeginArr, Tok::Bool(true), Tok::EndArr, Tok::End]
    );
}

#[test]
fn trailing_garbage_is_rejected() {
    assert_eq!(
        tokenize(b"true x", default_options()),
        vec![Tok::Bool(true), Tok::Err(ErrorKind::UnexpectedChar)]
    );
}

/// After a reset, replaying the same feeds yields the same results.
#[test]
fn reset_is_idempotent() {
    let json: &[u8] = br#"{"a":[1,2],"b":"c"}"#;
    let mut tokenizer = JsonTokenizer::new();

    let run = |tokenizer: &mut JsonTokenizer| {
        let mut tokens = vec![];
        tokenizer.feed(json).unwrap();
        loop {
            match tokenizer.next_token() {
                JsonToken::NeedData => tokenizer.feed(&[]).unwrap(),
                t @ (JsonToken::End | JsonToken::Error(_)) => {
                    tokens.push(t);
                    break;
                }
                t => tokens.push(t),
            }
        }
        tokens
    };

    let first = run(&mut tokenizer);
    tokenizer.reset();
    let second = run(&mut tokenizer);
    assert_eq!(first, second);

    // also out of an error state
    tokenizer.reset();
    tokenizer.feed(b"@").unwrap();
    assert!(matches!(tokenizer.next_token(), JsonToken::Error(_)));
    tokenizer.reset();
    let third = run(&mut tokenizer);
    assert_eq!(first, third);
}

#[test]
fn number_as_string_is_verbatim() {
    assert_eq!(
        tokenize(b"-12.500e+007", string_options()),
        vec![Tok::NumStr("-12.500e+007".into()), Tok::End]
    );
    assert_eq!(
        tokenize(b"[0, -0, 1e99]", string_options()),
        vec![
            Tok::BeginArr,
            Tok::NumStr("0".into()),
            Tok::NumStr("-0".into()),
            Tok::NumStr("1e99".into()),
            Tok::EndArr,
            Tok::End
        ]
    );
}

#[test]
fn invalid_flag_combination_is_rejected() {
    let options = JsonTokenizerOptionsBuilder::default()
        .with_number_as_string(true)
        .with_integer_fast_path(true)
        .build();
    assert!(JsonTokenizer::with_options(options).is_err());
}
