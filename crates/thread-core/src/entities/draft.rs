//! Comment draft - a submission before it reaches the store

use validator::Validate;

use crate::error::DomainError;
use crate::value_objects::ParentId;

use super::comment::NewComment;
use super::session::Session;

/// Inline styling applied to the whole draft text.
///
/// Rendered as inline markers: `**bold**`, `*italic*`, `__underline__`, with
/// bold outermost and underline innermost when combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl TextStyle {
    /// Wrap `text` in the markers for the active styles
    pub fn apply(self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 10);
        if self.bold {
            out.push_str("**");
        }
        if self.italic {
            out.push('*');
        }
        if self.underline {
            out.push_str("__");
        }
        out.push_str(text);
        if self.underline {
            out.push_str("__");
        }
        if self.italic {
            out.push('*');
        }
        if self.bold {
            out.push_str("**");
        }
        out
    }
}

/// A comment in the composer, not yet submitted.
#[derive(Debug, Clone, Default, Validate)]
pub struct CommentDraft {
    #[validate(length(max = 250, message = "Comment text must be at most 250 characters"))]
    pub text: String,
    pub style: TextStyle,
    pub attachment_urls: Vec<String>,
}

impl CommentDraft {
    /// Draft with plain text and no attachments
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Add an already-uploaded attachment URL
    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachment_urls.push(url.into());
        self
    }

    /// Validate the draft before any store write.
    ///
    /// A submission must carry either text or at least one attachment;
    /// text beyond 250 characters is rejected.
    pub fn check(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() && self.attachment_urls.is_empty() {
            return Err(DomainError::Validation(
                "comment needs text or an attachment".to_string(),
            ));
        }
        self.validate()
            .map_err(|e| DomainError::Validation(e.to_string()))?;
        Ok(())
    }

    /// Build the write shape, stamping the author from the session and
    /// applying the inline styling to the text
    pub fn into_new_comment(self, session: &Session, parent: ParentId) -> NewComment {
        let text = self.style.apply(&self.text);
        NewComment::new(
            session.display_name().to_string(),
            text,
            session.author_email().to_string(),
            parent,
            session.avatar_url().to_string(),
            self.attachment_urls,
        )
    }
}
