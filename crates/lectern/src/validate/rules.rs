//! Per-entity rule tables and the sync predicates behind them.
//!
//! Rules are plain data: an ordered slice per entity kind, each entry
//! naming its field, when it applies and what it checks. The engine in the
//! parent module interprets the tables; nothing here touches the store.

use super::{EntityKind, Mode};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// When a rule is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applies {
    /// Runs in create mode unconditionally; in patch mode only when the
    /// field is present and non-null (empty strings and zeros count as
    /// present and get validated).
    Required,
    /// Runs only in create mode, regardless of presence.
    CreateOnly,
    /// Runs in both modes whenever the key is present, null included.
    KeyPresent,
    /// Runs in both modes only when the value is truthy; empty strings and
    /// zeros skip silently.
    Truthy,
}

pub(crate) type SyncCheck = fn(Option<&Value>) -> Option<String>;

/// Store-backed checks the interpreter recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AsyncCheck {
    UniqueUsername,
    UniqueTitle,
    UniqueIsbn13,
    CategoryExists,
    BookExists,
}

pub(crate) enum Check {
    Sync(SyncCheck),
    Async(AsyncCheck),
}

/// One declared field rule; produces at most one violation when run.
pub(crate) struct FieldRule {
    pub field: &'static str,
    pub applies: Applies,
    pub check: Check,
}

impl FieldRule {
    pub(crate) fn is_applicable(&self, mode: Mode, fields: &Map<String, Value>) -> bool {
        let value = fields.get(self.field);
        match self.applies {
            Applies::CreateOnly => mode == Mode::Create,
            Applies::Required => {
                mode == Mode::Create || matches!(value, Some(v) if !v.is_null())
            }
            Applies::KeyPresent => value.is_some(),
            Applies::Truthy => value.is_some_and(truthy),
        }
    }
}

/// The ordered rule table for an entity kind. Declaration order is report
/// order.
pub(crate) fn for_kind(kind: EntityKind) -> &'static [FieldRule] {
    match kind {
        EntityKind::User => USER_RULES,
        EntityKind::Book => BOOK_RULES,
        EntityKind::Read => READ_RULES,
    }
}

static USER_RULES: &[FieldRule] = &[
    // Usernames cannot be patched, so both username rules are create-only.
    FieldRule {
        field: "username",
        applies: Applies::CreateOnly,
        check: Check::Sync(check_username),
    },
    FieldRule {
        field: "username",
        applies: Applies::CreateOnly,
        check: Check::Async(AsyncCheck::UniqueUsername),
    },
    FieldRule {
        field: "password",
        applies: Applies::Required,
        check: Check::Sync(check_password),
    },
    FieldRule {
        field: "name",
        applies: Applies::Required,
        check: Check::Sync(check_name),
    },
];

static BOOK_RULES: &[FieldRule] = &[
    FieldRule {
        field: "title",
        applies: Applies::Required,
        check: Check::Sync(check_title),
    },
    FieldRule {
        field: "title",
        applies: Applies::Required,
        check: Check::Async(AsyncCheck::UniqueTitle),
    },
    FieldRule {
        field: "isbn13",
        applies: Applies::Required,
        check: Check::Sync(check_isbn13),
    },
    FieldRule {
        field: "isbn13",
        applies: Applies::Required,
        check: Check::Async(AsyncCheck::UniqueIsbn13),
    },
    FieldRule {
        field: "category",
        applies: Applies::Required,
        check: Check::Async(AsyncCheck::CategoryExists),
    },
    FieldRule {
        field: "language",
        applies: Applies::KeyPresent,
        check: Check::Sync(check_language),
    },
    FieldRule {
        field: "author",
        applies: Applies::KeyPresent,
        check: Check::Sync(check_author),
    },
    FieldRule {
        field: "description",
        applies: Applies::KeyPresent,
        check: Check::Sync(check_description),
    },
    FieldRule {
        field: "published",
        applies: Applies::KeyPresent,
        check: Check::Sync(check_published),
    },
    FieldRule {
        field: "isbn10",
        applies: Applies::Truthy,
        check: Check::Sync(check_isbn10),
    },
    // Two independent pageCount rules: an over-wide string fails both.
    FieldRule {
        field: "pageCount",
        applies: Applies::Truthy,
        check: Check::Sync(check_page_count_width),
    },
    FieldRule {
        field: "pageCount",
        applies: Applies::Truthy,
        check: Check::Sync(check_page_count_range),
    },
];

static READ_RULES: &[FieldRule] = &[
    FieldRule {
        field: "bookId",
        applies: Applies::Required,
        check: Check::Async(AsyncCheck::BookExists),
    },
    FieldRule {
        field: "rating",
        applies: Applies::Required,
        check: Check::Sync(check_rating),
    },
    FieldRule {
        field: "review",
        applies: Applies::KeyPresent,
        check: Check::Sync(check_review),
    },
];

// ==================== Sync predicates ====================

fn check_username(value: Option<&Value>) -> Option<String> {
    let ok = value
        .and_then(Value::as_str)
        .is_some_and(|s| (3..=32).contains(&s.chars().count()));
    (!ok).then(|| {
        "Username is required, must be at least three letters and no more than 32 characters"
            .to_string()
    })
}

fn check_password(value: Option<&Value>) -> Option<String> {
    let ok = value
        .and_then(Value::as_str)
        .is_some_and(|s| s.chars().count() >= 6);
    (!ok).then(|| "Password must be at least six letters".to_string())
}

fn check_name(value: Option<&Value>) -> Option<String> {
    let ok = value
        .and_then(Value::as_str)
        .is_some_and(|s| (1..=64).contains(&s.chars().count()));
    (!ok).then(|| "Name is required, must not be empty or longer than 64 characters".to_string())
}

fn check_title(value: Option<&Value>) -> Option<String> {
    let ok = value
        .and_then(Value::as_str)
        .is_some_and(|s| (1..=255).contains(&s.chars().count()));
    (!ok).then(|| {
        "Title is required and must not be empty and no longer than 255 characters".to_string()
    })
}

fn check_isbn13(value: Option<&Value>) -> Option<String> {
    let ok = lexical(value).is_some_and(|s| isbn13_re().is_match(&s));
    (!ok).then(|| "ISBN-13 value is invalid".to_string())
}

/// Length 0 is explicitly allowed and means "unset".
fn check_language(value: Option<&Value>) -> Option<String> {
    let ok = value.and_then(Value::as_str).is_some_and(|s| {
        let len = s.chars().count();
        len == 2 || len == 0
    });
    (!ok).then(|| "Language must be a string of length 2".to_string())
}

fn check_author(value: Option<&Value>) -> Option<String> {
    string_only(value, "Author must be a string")
}

fn check_description(value: Option<&Value>) -> Option<String> {
    string_only(value, "Description must be a string")
}

fn check_published(value: Option<&Value>) -> Option<String> {
    let ok = value
        .and_then(Value::as_str)
        .is_some_and(|s| s.chars().count() <= 10);
    (!ok).then(|| "Published must be a string, no more than 10 characters".to_string())
}

fn check_isbn10(value: Option<&Value>) -> Option<String> {
    let ok = lexical(value).is_some_and(|s| isbn10_re().is_match(&s));
    (!ok).then(|| "ISBN-10 value is invalid".to_string())
}

/// Only string inputs carry a raw width; a 10-digit cap keeps the value
/// inside what the range check below can even represent.
fn check_page_count_width(value: Option<&Value>) -> Option<String> {
    let too_wide = value
        .and_then(Value::as_str)
        .is_some_and(|s| s.chars().count() > 10);
    too_wide.then(|| "pageCount must be an integer smaller than 10000000000".to_string())
}

fn check_page_count_range(value: Option<&Value>) -> Option<String> {
    let ok = coerce_integer(value).is_some_and(|n| n > 0);
    (!ok).then(|| "pageCount must be an integer larger than 0".to_string())
}

fn check_rating(value: Option<&Value>) -> Option<String> {
    // Type strictness governs here: a numeric string never passes.
    let Some(v) = value else {
        return Some("Rating is required and must be a number".to_string());
    };
    if !truthy(v) || !v.is_number() {
        return Some("Rating is required and must be a number".to_string());
    }
    let ok = v.as_i64().is_some_and(|n| (1..=5).contains(&n));
    (!ok).then(|| "Rating must be 1, 2, 3, 4 or 5".to_string())
}

fn check_review(value: Option<&Value>) -> Option<String> {
    string_only(value, "Review must be a string")
}

fn string_only(value: Option<&Value>, message: &str) -> Option<String> {
    value
        .and_then(Value::as_str)
        .is_none()
        .then(|| message.to_string())
}

fn isbn13_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{13}$").expect("invalid built-in ISBN-13 regex"))
}

fn isbn10_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("invalid built-in ISBN-10 regex"))
}

// ==================== Value helpers ====================

/// Script-style truthiness for JSON scalars: null, false, zero and the
/// empty string are falsy, everything else is truthy.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The text form of a scalar, as the store driver would serialize it.
/// Arrays, objects and absent values have none.
pub(crate) fn lexical(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer coercion: JSON integers, integral floats and integral decimal
/// strings all coerce; everything else does not.
pub(crate) fn coerce_integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64).then_some(f as i64)
}
