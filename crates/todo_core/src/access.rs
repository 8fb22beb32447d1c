//! Collaborator contracts consumed by the todo core.
//!
//! # Responsibility
//! - Identity: who is acting (`Actor`), used verbatim as `author`.
//! - Authorization: yes/no decision per (actor, project, action).
//! - Rendering: raw markdown to markup, treated as opaque output.
//!
//! # Invariants
//! - Anonymous actors are never authorized by the bundled implementations.
//! - Authorization is consulted before any payload parsing or store access.

use crate::model::user::UserRef;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static BLANK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n+").expect("valid blank line regex"));

/// The identity performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(UserRef),
}

impl Actor {
    pub fn user(&self) -> Option<&UserRef> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }
}

/// Permission class of a todo operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TodoAction {
    Read,
    Write,
}

impl TodoAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Authorization collaborator.
pub trait Authorizer {
    fn authorize(&self, actor: &Actor, project: &str, action: TodoAction) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&Actor, &str, TodoAction) -> bool,
{
    fn authorize(&self, actor: &Actor, project: &str, action: TodoAction) -> bool {
        self(actor, project, action)
    }
}

/// Membership-based authorizer: project members may read and write.
#[derive(Debug, Clone, Default)]
pub struct ProjectGrants {
    members: HashSet<(String, String)>,
}

impl ProjectGrants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `user_key` full access to `project`.
    pub fn grant(mut self, user_key: impl Into<String>, project: impl Into<String>) -> Self {
        self.members.insert((user_key.into(), project.into()));
        self
    }
}

impl Authorizer for ProjectGrants {
    fn authorize(&self, actor: &Actor, project: &str, _action: TodoAction) -> bool {
        actor.user().is_some_and(|user| {
            self.members
                .contains(&(user.key.clone(), project.to_string()))
        })
    }
}

/// Rendering collaborator.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> String;
}

impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> String,
{
    fn render(&self, markdown: &str) -> String {
        self(markdown)
    }
}

/// Minimal renderer: escapes HTML and wraps blank-line separated blocks in
/// `<p>`. It does not interpret markdown syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphRenderer;

impl MarkdownRenderer for ParagraphRenderer {
    fn render(&self, markdown: &str) -> String {
        let normalized = markdown.replace("\r\n", "\n");
        BLANK_LINE_RE
            .split(normalized.trim())
            .filter(|block| !block.trim().is_empty())
            .map(|block| format!("<p>{}</p>", escape_html(block.trim())))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{Actor, Authorizer, MarkdownRenderer, ParagraphRenderer, ProjectGrants, TodoAction};
    use crate::model::user::UserRef;

    #[test]
    fn grants_only_cover_members_of_the_project() {
        let grants = ProjectGrants::new().grant("u1", "p1");
        let member = Actor::User(UserRef::new("u1", "Ada"));
        let stranger = Actor::User(UserRef::new("u2", "Bob"));

        assert!(grants.authorize(&member, "p1", TodoAction::Write));
        assert!(!grants.authorize(&member, "p2", TodoAction::Read));
        assert!(!grants.authorize(&stranger, "p1", TodoAction::Read));
        assert!(!grants.authorize(&Actor::Anonymous, "p1", TodoAction::Read));
    }

    #[test]
    fn paragraph_renderer_wraps_blocks() {
        assert_eq!(ParagraphRenderer.render("some content"), "<p>some content</p>");
        assert_eq!(
            ParagraphRenderer.render("one\n\n  \n\ntwo"),
            "<p>one</p>\n<p>two</p>"
        );
        assert_eq!(ParagraphRenderer.render("   "), "");
    }

    #[test]
    fn paragraph_renderer_escapes_markup() {
        assert_eq!(
            ParagraphRenderer.render("<script>alert('x')</script>"),
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>"
        );
    }
}
