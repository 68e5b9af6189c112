use serde_json::{Map, Number, Value};

use crate::options::JsonTokenizerOptionsBuilder;
use crate::tokenizer::JsonTokenizer;
use crate::JsonToken;

#[derive(Debug, Clone)]
pub struct ParserError;

/// Parse a byte slice into a Serde JSON [Value] by draining the
/// tokenizer, with the integer fast path enabled so that true integers
/// survive as integers.
///
/// ```
/// use jsonpull::serde_json::from_slice;
///
/// let value = from_slice(br#"{"depth": 3, "open": false}"#).unwrap();
/// assert_eq!(value["depth"], 3);
/// assert_eq!(value["open"], false);
/// ```
pub fn from_slice(v: &[u8]) -> Result<Value, ParserError> {
    let mut tokenizer = JsonTokenizer::with_options(
        JsonTokenizerOptionsBuilder::default()
            .with_integer_fast_path(true)
            .build(),
    )
    .map_err(|_| ParserError)?;
    tokenizer.feed(v).map_err(|_| ParserError)?;

    let mut stack: Vec<(Option<String>, Value)> = vec![];
    let mut result = None;
    let mut current_key: Option<String> = None;

    loop {
        let token = match tokenizer.next_token() {
            JsonToken::NeedData => {
                tokenizer.feed(&[]).map_err(|_| ParserError)?;
                continue;
            }
            token => token,
        };

        let scalar = match token {
            JsonToken::Error(_) => return Err(ParserError),
            JsonToken::End => break,

            JsonToken::BeginObject | JsonToken::BeginArray => {
                let v = if token == JsonToken::BeginObject {
                    Value::Object(Map::new())
                } else {
                    Value::Array(vec![])
                };
                stack.push((current_key.take(), v));
                continue;
            }

            JsonToken::EndObject | JsonToken::EndArray => {
                let (key, v) = stack.pop().ok_or(ParserError)?;
                if let Some((_, top)) = stack.last_mut() {
                    if let Some(m) = top.as_object_mut() {
                        m.insert(key.ok_or(ParserError)?, v);
                    } else if let Some(a) = top.as_array_mut() {
                        a.push(v);
                    }
                } else {
                    result = Some(v);
                }
                continue;
            }

            JsonToken::String => {
                let s = tokenizer.current_string().map_err(|_| ParserError)?;
                // the first string in an object, and every string after a
                // comma at object level, is a key
                if let Some((_, top)) = stack.last() {
                    if top.is_object() && current_key.is_none() {
                        current_key = Some(s);
                        continue;
                    }
                }
                Value::String(s)
            }

            JsonToken::Integer => {
                Value::Number(Number::from(tokenizer.current_i64().ok_or(ParserError)?))
            }

            JsonToken::Number => Value::Number(
                Number::from_f64(tokenizer.current_f64().ok_or(ParserError)?)
                    .ok_or(ParserError)?,
            ),

            JsonToken::Boolean => Value::Bool(tokenizer.current_bool().ok_or(ParserError)?),
            JsonToken::Null => Value::Null,

            JsonToken::NeedData => unreachable!(),
        };

        if let Some((_, top)) = stack.last_mut() {
            if let Some(m) = top.as_object_mut() {
                m.insert(current_key.take().ok_or(ParserError)?, scalar);
            } else if let Some(a) = top.as_array_mut() {
                a.push(scalar);
            }
        } else {
            result = Some(scalar);
        }
    }

    result.ok_or(ParserError)
}
