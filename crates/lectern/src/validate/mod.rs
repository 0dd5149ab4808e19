//! Patch-aware validation for catalog entities.
//!
//! Each entity kind declares an ordered table of field rules; the engine
//! interprets the table against a candidate document, running every
//! applicable rule and collecting the full violation list in declaration
//! order — validation never fails fast, so one response can show every
//! problem at once. Rules that need the store go through the injected
//! [`CatalogLookup`] capability.
//!
//! Create mode runs every declared rule. Patch mode skips rules for fields
//! that were omitted entirely, but a field present as an empty string (or
//! zero) is validated — that asymmetry is what makes partial updates work.

mod rules;

#[cfg(test)]
mod tests;

use crate::catalog::CatalogLookup;
use crate::error::CatalogResult;
use rules::{AsyncCheck, Check, FieldRule, coerce_integer, lexical, truthy};
use serde::Serialize;
use serde_json::{Map, Value};

/// Entity kinds the engine knows how to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Book,
    Read,
}

/// Create validates the whole document; patch validates only what the
/// caller sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Patch,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// An ordered collection of violations.
///
/// Order matches rule declaration order and is never sorted; handlers
/// surface the list verbatim as a field-keyed error response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Violations {
    pub items: Vec<Violation>,
}

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, violation: Violation) {
        self.items.push(violation);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.items.iter()
    }

    /// All violations reported for `field`, in order.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.items.iter().filter(move |v| v.field == field)
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// One validation call: which kind, which mode, whose id, which fields.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRequest<'a> {
    pub kind: EntityKind,
    pub mode: Mode,
    /// Present in patch mode; excludes the entity itself from uniqueness
    /// conflicts so re-saving an unchanged title or ISBN is allowed.
    pub entity_id: Option<i64>,
    /// The candidate document, usually a deserialized request body.
    pub fields: &'a Map<String, Value>,
}

/// Rule interpreter over an injected lookup capability.
///
/// Store-backed rules are awaited sequentially in declaration order; the
/// violation list order is part of the contract, and the call count is
/// small enough that fan-out would buy nothing here.
pub struct ValidationEngine<L> {
    lookups: L,
}

impl<L: CatalogLookup> ValidationEngine<L> {
    pub fn new(lookups: L) -> Self {
        Self { lookups }
    }

    /// Run the full rule table for a request.
    ///
    /// Returns the complete ordered violation list — empty means "proceed
    /// to persistence". Invalid input never raises; only store failures
    /// surface as errors.
    pub async fn validate(&self, request: &ValidationRequest<'_>) -> CatalogResult<Violations> {
        let mut violations = Violations::default();

        for rule in rules::for_kind(request.kind) {
            if !rule.is_applicable(request.mode, request.fields) {
                continue;
            }
            let value = request.fields.get(rule.field);
            match &rule.check {
                Check::Sync(check) => {
                    if let Some(message) = check(value) {
                        violations.push(Violation::new(rule.field, message));
                    }
                }
                Check::Async(check) => {
                    self.run_async(*check, rule, value, request.entity_id, &mut violations)
                        .await?;
                }
            }
        }

        Ok(violations)
    }

    /// Validate a user document. Usernames are create-only.
    pub async fn validate_user(
        &self,
        fields: &Map<String, Value>,
        mode: Mode,
    ) -> CatalogResult<Violations> {
        self.validate(&ValidationRequest {
            kind: EntityKind::User,
            mode,
            entity_id: None,
            fields,
        })
        .await
    }

    /// Validate a book document; `entity_id` is the book being patched.
    pub async fn validate_book(
        &self,
        fields: &Map<String, Value>,
        entity_id: Option<i64>,
        mode: Mode,
    ) -> CatalogResult<Violations> {
        self.validate(&ValidationRequest {
            kind: EntityKind::Book,
            mode,
            entity_id,
            fields,
        })
        .await
    }

    /// Validate a read document (create semantics only).
    pub async fn validate_read(&self, fields: &Map<String, Value>) -> CatalogResult<Violations> {
        self.validate(&ValidationRequest {
            kind: EntityKind::Read,
            mode: Mode::Create,
            entity_id: None,
            fields,
        })
        .await
    }

    async fn run_async(
        &self,
        check: AsyncCheck,
        rule: &FieldRule,
        value: Option<&Value>,
        entity_id: Option<i64>,
        out: &mut Violations,
    ) -> CatalogResult<()> {
        match check {
            AsyncCheck::UniqueUsername => {
                // Values without a text form cannot collide with anything.
                let Some(username) = lexical(value) else {
                    return Ok(());
                };
                if self.lookups.find_user_by_username(&username).await?.is_some() {
                    out.push(Violation::new(rule.field, "Username is already registered"));
                }
            }
            AsyncCheck::UniqueTitle => {
                let Some(title) = lexical(value) else {
                    return Ok(());
                };
                if let Some(existing) = self.lookups.find_book_by_title(&title).await?
                    && entity_id != Some(existing)
                {
                    out.push(Violation::new(
                        rule.field,
                        format!("Book \"{title}\" already exists"),
                    ));
                }
            }
            AsyncCheck::UniqueIsbn13 => {
                let Some(isbn13) = lexical(value) else {
                    return Ok(());
                };
                if let Some(existing) = self.lookups.find_book_by_isbn13(&isbn13).await?
                    && entity_id != Some(existing)
                {
                    out.push(Violation::new(
                        rule.field,
                        format!("ISBN-13 value \"{isbn13}\" already exists"),
                    ));
                }
            }
            AsyncCheck::CategoryExists => {
                // The message names the offending id only when the caller
                // sent a real value.
                let message = match value {
                    None | Some(Value::Null) => "Category does not exist".to_string(),
                    Some(v) => format!(
                        "Category with id \"{}\" does not exist",
                        lexical(Some(v)).unwrap_or_default()
                    ),
                };
                match coerce_integer(value) {
                    Some(id) => {
                        if !self.lookups.category_exists(id).await? {
                            out.push(Violation::new(rule.field, message));
                        }
                    }
                    None => out.push(Violation::new(rule.field, message)),
                }
            }
            AsyncCheck::BookExists => {
                let coerced = value.filter(|v| truthy(v)).and_then(|v| coerce_integer(Some(v)));
                match coerced {
                    None => out.push(Violation::new(
                        rule.field,
                        "Book is required and must be an integer",
                    )),
                    Some(id) => {
                        if !self.lookups.book_exists(id).await? {
                            let shown = lexical(value).unwrap_or_default();
                            out.push(Violation::new(
                                rule.field,
                                format!("Book \"{shown}\" does not exist"),
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
