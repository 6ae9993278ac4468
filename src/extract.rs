//! Best-effort text extraction from an upstream `generateContent` response.
//!
//! The upstream shape is not under our control, so [`extract_text`] is total:
//! it tries the known text locations in order and otherwise hands back the
//! whole response as pretty-printed JSON.

use serde_json::Value;

/// Known locations of the first text part, tried in order.
const TEXT_PATHS: &[&[PathStep]] = &[
    &[
        PathStep::Key("response"),
        PathStep::Key("candidates"),
        PathStep::Index(0),
        PathStep::Key("content"),
        PathStep::Key("parts"),
        PathStep::Index(0),
        PathStep::Key("text"),
    ],
    &[
        PathStep::Key("candidates"),
        PathStep::Index(0),
        PathStep::Key("content"),
        PathStep::Key("parts"),
        PathStep::Index(0),
        PathStep::Key("text"),
    ],
];

#[derive(Debug, Clone, Copy)]
enum PathStep {
    Key(&'static str),
    Index(usize),
}

fn lookup<'a>(value: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, step| match step {
        PathStep::Key(key) => node.get(*key),
        PathStep::Index(idx) => node.get(*idx),
    })
}

/// Map an upstream response to a display string.
///
/// A path only counts when it ends in a non-empty string.
pub fn extract_text(response: &Value) -> String {
    TEXT_PATHS
        .iter()
        .filter_map(|path| lookup(response, path))
        .filter_map(Value::as_str)
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            serde_json::to_string_pretty(response).unwrap_or_else(|e| {
                tracing::error!("Error extracting text: {}", e);
                response.to_string()
            })
        })
}
