//! Reply text extraction
//!
//! The remote agent does not commit to one response shape. Extractors are
//! tried in order and the first match wins:
//!
//! 1. `[{ "output": "..." }]`
//! 2. `{ "output": "..." }`
//! 3. `{ "response": "..." }`
//! 4. `{ "message": "..." }`
//!
//! Only non-empty strings match.

use serde_json::Value;

/// Which shape a reply body matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyShape {
    ArrayOutput(String),
    Output(String),
    Response(String),
    Message(String),
    Unrecognized,
}

impl ReplyShape {
    /// Classify a reply body
    pub fn parse(body: &Value) -> Self {
        EXTRACTORS
            .iter()
            .find_map(|extract| extract(body))
            .unwrap_or(ReplyShape::Unrecognized)
    }

    /// The extracted text, if any shape matched
    #[cfg(test)]
    pub fn text(&self) -> Option<&str> {
        match self {
            ReplyShape::ArrayOutput(s)
            | ReplyShape::Output(s)
            | ReplyShape::Response(s)
            | ReplyShape::Message(s) => Some(s.as_str()),
            ReplyShape::Unrecognized => None,
        }
    }

    /// The extracted text, or `fallback` for an unrecognized body
    pub fn into_text_or(self, fallback: &str) -> String {
        match self {
            ReplyShape::ArrayOutput(s)
            | ReplyShape::Output(s)
            | ReplyShape::Response(s)
            | ReplyShape::Message(s) => s,
            ReplyShape::Unrecognized => fallback.to_string(),
        }
    }
}

type Extractor = fn(&Value) -> Option<ReplyShape>;

const EXTRACTORS: [Extractor; 4] = [array_output, top_level_output, response, message];

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn array_output(body: &Value) -> Option<ReplyShape> {
    let first = body.as_array()?.first()?;
    non_empty_str(first.get("output")).map(ReplyShape::ArrayOutput)
}

fn top_level_output(body: &Value) -> Option<ReplyShape> {
    non_empty_str(body.as_object()?.get("output")).map(ReplyShape::Output)
}

fn response(body: &Value) -> Option<ReplyShape> {
    non_empty_str(body.as_object()?.get("response")).map(ReplyShape::Response)
}

fn message(body: &Value) -> Option<ReplyShape> {
    non_empty_str(body.as_object()?.get("message")).map(ReplyShape::Message)
}
