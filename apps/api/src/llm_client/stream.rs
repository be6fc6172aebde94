//! Folding a streamed chat reply into a single string.
//!
//! Each chunk read off the wire holds zero or more newline-delimited JSON
//! fragments. Fragments are parsed independently within their chunk; anything
//! that is not valid JSON is dropped, and every fragment's `message.content`
//! is appended in stream order.

use serde_json::Value;

pub fn accumulate_content<'a, I>(chunks: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    chunks
        .into_iter()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .filter_map(|fragment| serde_json::from_str::<Value>(fragment).ok())
        .fold(String::new(), |mut acc, fragment| {
            if let Some(content) = fragment.pointer("/message/content").and_then(Value::as_str) {
                acc.push_str(content);
            }
            acc
        })
}
