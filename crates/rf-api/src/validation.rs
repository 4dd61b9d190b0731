//! Request body rules enforced before the core is invoked.

use rf_core::NewThread;

use crate::error::{ApiError, FieldError};

pub const ANSWER_MIN: usize = 30;
pub const ANSWER_MAX: usize = 30_000;
pub const COMMENT_MAX: usize = 1_000;
pub const TITLE_MAX: usize = 300;
pub const TAGS_MAX: usize = 5;

fn required(field: &'static str, raw: &str, min: usize, max: usize) -> Result<String, FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(FieldError::new(field, "cannot be blank"));
    }
    let len = value.chars().count();
    if len < min {
        return Err(FieldError::new(field, format!("must be at least {min} characters long")));
    }
    if len > max {
        return Err(FieldError::new(field, format!("must be at most {max} characters long")));
    }
    Ok(value.to_string())
}

pub fn answer_text(raw: &str) -> Result<String, ApiError> {
    required("text", raw, ANSWER_MIN, ANSWER_MAX).map_err(|e| ApiError::Validation(vec![e]))
}

pub fn comment_body(raw: &str) -> Result<String, ApiError> {
    required("body", raw, 1, COMMENT_MAX).map_err(|e| ApiError::Validation(vec![e]))
}

/// Collects every failing field, not just the first.
pub fn new_thread(fields: NewThread) -> Result<NewThread, ApiError> {
    let mut errors = Vec::new();

    let title = required("title", &fields.title, 1, TITLE_MAX).map_err(|e| errors.push(e)).ok();
    let text = required("text", &fields.text, 1, ANSWER_MAX).map_err(|e| errors.push(e)).ok();

    let tags: Vec<String> = fields
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if tags.is_empty() {
        errors.push(FieldError::new("tags", "at least one tag is required"));
    } else if tags.len() > TAGS_MAX {
        errors.push(FieldError::new("tags", format!("at most {TAGS_MAX} tags are allowed")));
    }

    match (title, text) {
        (Some(title), Some(text)) if errors.is_empty() => Ok(NewThread {
            title,
            text,
            tags,
            category: fields.category.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        }),
        _ => Err(ApiError::Validation(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_errors(err: ApiError) -> Vec<FieldError> {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn answers_need_thirty_characters_after_trimming() {
        let short = "   too short   ";
        let errors = field_errors(answer_text(short).unwrap_err());
        assert_eq!(errors[0].message, "must be at least 30 characters long");

        let ok = format!("  {}  ", "a".repeat(30));
        assert_eq!(answer_text(&ok).unwrap(), "a".repeat(30));
    }

    #[test]
    fn blank_comment_is_rejected() {
        let errors = field_errors(comment_body(" \n\t ").unwrap_err());
        assert_eq!(errors, vec![FieldError::new("body", "cannot be blank")]);
    }

    #[test]
    fn thread_reports_all_failing_fields() {
        let errors = field_errors(new_thread(NewThread::default()).unwrap_err());
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "text", "tags"]);
    }

    #[test]
    fn thread_fields_are_trimmed() {
        let fields = new_thread(NewThread {
            title: "  Title ".into(),
            text: " body ".into(),
            tags: vec![" rust ".into(), " ".into()],
            category: Some("  ".into()),
        })
        .unwrap();
        assert_eq!(fields.title, "Title");
        assert_eq!(fields.tags, vec!["rust"]);
        assert_eq!(fields.category, None);
    }
}
