//! Strict request payload parsing for todo operations.
//!
//! # Invariants
//! - `author` is rejected in every payload, whatever its value.
//! - Keys outside an operation's schema are rejected, never ignored.
//! - `null` is never accepted in place of a field value.
//! - Parsing is side-effect free; nothing is written before a payload parses.

use crate::model::todo::TodoValidationError;
use serde::Deserialize;
use serde_json::{Map, Value};

const AUTHOR_FIELD: &str = "author";
const TODO_FIELDS: &[&str] = &["title", "content", "tags"];
const MARK_DONE_FIELDS: &[&str] = &["done"];

/// Parsed `create` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    /// Raw markdown, still to be rendered.
    pub markdown: Option<String>,
    pub tags: Vec<String>,
}

/// Parsed `update` payload; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub markdown: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Parsed `markdone` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkDone {
    pub done: bool,
}

/// `content` may be sent as bare markdown or as the stored `{markdown, html}`
/// shape; a supplied `html` is ignored because it is always re-rendered.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentInput {
    Markdown(String),
    Structured { markdown: String },
}

impl NewTodo {
    pub fn from_json(payload: &Value) -> Result<Self, TodoValidationError> {
        let fields = checked_fields(payload, TODO_FIELDS)?;
        let title =
            string_field(fields, "title")?.ok_or(TodoValidationError::MissingField("title"))?;
        if title.trim().is_empty() {
            return Err(TodoValidationError::BlankTitle);
        }

        Ok(Self {
            title,
            markdown: content_field(fields)?,
            tags: tags_field(fields)?.unwrap_or_default(),
        })
    }
}

impl TodoPatch {
    pub fn from_json(payload: &Value) -> Result<Self, TodoValidationError> {
        let fields = checked_fields(payload, TODO_FIELDS)?;
        let title = string_field(fields, "title")?;
        if title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(TodoValidationError::BlankTitle);
        }

        Ok(Self {
            title,
            markdown: content_field(fields)?,
            tags: tags_field(fields)?,
        })
    }
}

impl MarkDone {
    pub fn from_json(payload: &Value) -> Result<Self, TodoValidationError> {
        let fields = checked_fields(payload, MARK_DONE_FIELDS)?;
        match fields.get("done") {
            Some(Value::Bool(done)) => Ok(Self { done: *done }),
            Some(_) => Err(TodoValidationError::InvalidValue {
                field: "done",
                expected: "a boolean",
            }),
            None => Err(TodoValidationError::MissingField("done")),
        }
    }
}

fn checked_fields<'a>(
    payload: &'a Value,
    allowed: &[&str],
) -> Result<&'a Map<String, Value>, TodoValidationError> {
    let fields = payload.as_object().ok_or(TodoValidationError::NotAnObject)?;

    // `author` first so it is reported as forbidden rather than unknown.
    if fields.contains_key(AUTHOR_FIELD) {
        return Err(TodoValidationError::ForbiddenField(AUTHOR_FIELD));
    }
    if let Some(unknown) = fields.keys().find(|key| !allowed.contains(&key.as_str())) {
        return Err(TodoValidationError::UnknownField(unknown.clone()));
    }
    Ok(fields)
}

fn string_field(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, TodoValidationError> {
    match fields.get(field) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(TodoValidationError::InvalidValue {
            field,
            expected: "a string",
        }),
    }
}

fn content_field(fields: &Map<String, Value>) -> Result<Option<String>, TodoValidationError> {
    let Some(value) = fields.get("content") else {
        return Ok(None);
    };
    match ContentInput::deserialize(value) {
        Ok(ContentInput::Markdown(markdown)) | Ok(ContentInput::Structured { markdown }) => {
            Ok(Some(markdown))
        }
        Err(_) => Err(TodoValidationError::InvalidValue {
            field: "content",
            expected: "a string or an object with a `markdown` string",
        }),
    }
}

fn tags_field(fields: &Map<String, Value>) -> Result<Option<Vec<String>>, TodoValidationError> {
    let Some(value) = fields.get("tags") else {
        return Ok(None);
    };
    Vec::<String>::deserialize(value)
        .map(Some)
        .map_err(|_| TodoValidationError::InvalidValue {
            field: "tags",
            expected: "an array of strings",
        })
}

#[cfg(test)]
mod tests {
    use super::{MarkDone, NewTodo, TodoPatch};
    use crate::model::todo::TodoValidationError;
    use serde_json::json;

    #[test]
    fn new_todo_requires_title() {
        let err = NewTodo::from_json(&json!({"content": "x"})).unwrap_err();
        assert_eq!(err, TodoValidationError::MissingField("title"));
    }

    #[test]
    fn new_todo_keeps_tag_order_and_duplicates() {
        let parsed =
            NewTodo::from_json(&json!({"title": "t", "tags": ["b", "a", "b"]})).unwrap();
        assert_eq!(parsed.tags, vec!["b", "a", "b"]);
        assert_eq!(parsed.markdown, None);
    }

    #[test]
    fn author_is_forbidden_whatever_its_value() {
        for author in [json!("someone"), json!(null), json!({"key": "u1"})] {
            let err = NewTodo::from_json(&json!({"title": "t", "author": author})).unwrap_err();
            assert_eq!(err, TodoValidationError::ForbiddenField("author"));
        }
        let err = TodoPatch::from_json(&json!({"author": "someone"})).unwrap_err();
        assert_eq!(err, TodoValidationError::ForbiddenField("author"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = NewTodo::from_json(&json!({"invalid": "invalid"})).unwrap_err();
        assert_eq!(err, TodoValidationError::UnknownField("invalid".to_string()));

        let err = TodoPatch::from_json(&json!({"title": "t", "adfaf": "x"})).unwrap_err();
        assert_eq!(err, TodoValidationError::UnknownField("adfaf".to_string()));
    }

    #[test]
    fn patch_accepts_structured_content() {
        let patch = TodoPatch::from_json(&json!({"content": {"markdown": "aaaa", "html": "stale"}}))
            .unwrap();
        assert_eq!(patch.markdown.as_deref(), Some("aaaa"));
        assert_eq!(patch.title, None);
        assert_eq!(patch.tags, None);
    }

    #[test]
    fn patch_rejects_null_and_mistyped_values() {
        assert!(matches!(
            TodoPatch::from_json(&json!({"title": null})),
            Err(TodoValidationError::InvalidValue { field: "title", .. })
        ));
        assert!(matches!(
            TodoPatch::from_json(&json!({"tags": "a"})),
            Err(TodoValidationError::InvalidValue { field: "tags", .. })
        ));
        assert!(matches!(
            TodoPatch::from_json(&json!({"content": 3})),
            Err(TodoValidationError::InvalidValue { field: "content", .. })
        ));
    }

    #[test]
    fn mark_done_accepts_only_done() {
        assert_eq!(
            MarkDone::from_json(&json!({"done": true})).unwrap(),
            MarkDone { done: true }
        );
        assert_eq!(
            MarkDone::from_json(&json!({"notdone": false})).unwrap_err(),
            TodoValidationError::UnknownField("notdone".to_string())
        );
        assert_eq!(
            MarkDone::from_json(&json!({"title": true, "done": true})).unwrap_err(),
            TodoValidationError::UnknownField("title".to_string())
        );
        assert_eq!(
            MarkDone::from_json(&json!({})).unwrap_err(),
            TodoValidationError::MissingField("done")
        );
        assert!(matches!(
            MarkDone::from_json(&json!({"done": "yes"})),
            Err(TodoValidationError::InvalidValue { field: "done", .. })
        ));
    }
}
