//! A thin adapter that pulls tokens and dispatches them to handler
//! methods, for callers that prefer callbacks over a pull loop.

use crate::error::ParseError;
use crate::event::JsonToken;
use crate::number::NumberComponents;
use crate::tokenizer::JsonTokenizer;

/// Receives the tokens pulled by [`dispatch()`]. All methods default to
/// doing nothing; implement the ones you care about.
///
/// Exactly one of the number hooks fires per number token, selected by
/// the tokenizer's numeric mode: [`on_number_components()`](Self::on_number_components)
/// in decomposed mode, [`on_number_str()`](Self::on_number_str) in
/// number-as-string mode, and [`on_number()`](Self::on_number) otherwise.
#[allow(unused_variables)]
pub trait JsonTokenHandler {
    fn on_null(&mut self) {}
    fn on_boolean(&mut self, value: bool) {}
    fn on_number(&mut self, value: f64) {}
    fn on_number_components(&mut self, components: &NumberComponents) {}
    fn on_number_str(&mut self, value: &str) {}
    fn on_integer(&mut self, value: i64) {}
    fn on_string(&mut self, value: &str) {}
    fn on_begin_array(&mut self) {}
    fn on_end_array(&mut self) {}
    fn on_begin_object(&mut self) {}
    fn on_end_object(&mut self) {}
    fn on_end(&mut self) {}
    fn on_error(&mut self, error: &ParseError) {}
}

/// Pull tokens from `tokenizer` and dispatch them to `handler` until the
/// tokenizer needs more data, the document ends, or an error is raised.
/// Returns the token that stopped the loop.
pub fn dispatch<H>(tokenizer: &mut JsonTokenizer, handler: &mut H) -> JsonToken
where
    H: JsonTokenHandler,
{
    loop {
        let token = tokenizer.next_token();
        match token {
            JsonToken::Null => handler.on_null(),
            JsonToken::Boolean => {
                if let Some(value) = tokenizer.current_bool() {
                    handler.on_boolean(value);
                }
            }
            JsonToken::Number => {
                if tokenizer.options().number_as_string() {
                    if let Ok(value) = tokenizer.current_str() {
                        handler.on_number_str(value);
                    }
                } else if tokenizer.options().decomposed_numbers() {
                    if let Some(components) = tokenizer.current_components() {
                        handler.on_number_components(components);
                    }
                } else if let Some(value) = tokenizer.current_f64() {
                    handler.on_number(value);
                }
            }
            JsonToken::Integer => {
                if let Some(value) = tokenizer.current_i64() {
                    handler.on_integer(value);
                }
            }
            JsonToken::String => {
                if let Ok(value) = tokenizer.current_str() {
                    handler.on_string(value);
                }
            }
            JsonToken::BeginArray => handler.on_begin_array(),
            JsonToken::EndArray => handler.on_end_array(),
            JsonToken::BeginObject => handler.on_begin_object(),
            JsonToken::EndObject => handler.on_end_object(),
            JsonToken::End => {
                handler.on_end();
                return token;
            }
            JsonToken::Error(_) => {
                if let Some(error) = tokenizer.error() {
                    handler.on_error(error);
                }
                return token;
            }
            JsonToken::NeedData => return token,
        }
    }
}
