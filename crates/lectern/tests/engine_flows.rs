//! Black-box flows through the public API.
//!
//! The lookup capability is implemented out here, against the public trait,
//! to prove the seam works the way a handler crate would use it: validate a
//! raw document, then turn the accepted patch into a conditional update.

use lectern::prelude::*;
use serde_json::{Map, Value, json};

/// A handler-side double: two books, one user, one category.
struct Shelf;

impl CatalogLookup for Shelf {
    async fn find_user_by_username(&self, username: &str) -> CatalogResult<Option<i64>> {
        Ok((username == "librarian").then_some(1))
    }

    async fn find_book_by_title(&self, title: &str) -> CatalogResult<Option<i64>> {
        Ok(match title {
            "Foundation" => Some(10),
            "Dune" => Some(11),
            _ => None,
        })
    }

    async fn find_book_by_isbn13(&self, isbn13: &str) -> CatalogResult<Option<i64>> {
        Ok(match isbn13 {
            "9780553293357" => Some(10),
            "9780441172719" => Some(11),
            _ => None,
        })
    }

    async fn book_exists(&self, id: i64) -> CatalogResult<bool> {
        Ok(id == 10 || id == 11)
    }

    async fn category_exists(&self, id: i64) -> CatalogResult<bool> {
        Ok(id == 3)
    }
}

fn doc(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("test doc must be an object")
}

#[tokio::test]
async fn create_then_patch_flow() {
    let engine = ValidationEngine::new(Shelf);

    // A bad create reports everything at once, in declaration order.
    let violations = engine
        .validate_book(
            &doc(json!({
                "title": "Foundation",
                "isbn13": "9780553293357",
                "category": 99,
            })),
            None,
            Mode::Create,
        )
        .await
        .unwrap();
    assert_eq!(
        violations
            .iter()
            .map(|v| v.field.as_str())
            .collect::<Vec<_>>(),
        vec!["title", "isbn13", "category"]
    );

    // The same document is fine as a patch of the book that owns it.
    let violations = engine
        .validate_book(
            &doc(json!({
                "title": "Foundation",
                "isbn13": "9780553293357",
                "category": 3,
            })),
            Some(10),
            Mode::Patch,
        )
        .await
        .unwrap();
    assert!(violations.is_empty());

    // ...but a patch cannot steal another book's ISBN.
    let violations = engine
        .validate_book(
            &doc(json!({"isbn13": "9780441172719"})),
            Some(10),
            Mode::Patch,
        )
        .await
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.items[0].field, "isbn13");

    // The accepted patch becomes a conditional update.
    let patch: BookPatch =
        serde_json::from_value(json!({"title": "Foundation (reissue)", "pageCount": 255}))
            .unwrap();
    assert_eq!(
        patch.into_update(10).to_sql().unwrap().unwrap(),
        "UPDATE books SET title = $2, pagecount = $3 WHERE id = $1 RETURNING *"
    );
}

#[tokio::test]
async fn violations_serialize_as_field_message_pairs() {
    let engine = ValidationEngine::new(Shelf);
    let violations = engine
        .validate_user(&doc(json!({"name": ""})), Mode::Patch)
        .await
        .unwrap();

    let body = serde_json::to_value(&violations).unwrap();
    assert_eq!(
        body,
        json!({"items": [{
            "field": "name",
            "message": "Name is required, must not be empty or longer than 64 characters",
        }]})
    );
}

#[tokio::test]
async fn unified_request_surface_matches_the_conveniences() {
    let engine = ValidationEngine::new(Shelf);
    let fields = doc(json!({"bookId": 10, "rating": 2}));

    let via_request = engine
        .validate(&ValidationRequest {
            kind: EntityKind::Read,
            mode: Mode::Create,
            entity_id: None,
            fields: &fields,
        })
        .await
        .unwrap();
    let via_convenience = engine.validate_read(&fields).await.unwrap();

    assert_eq!(via_request, via_convenience);
    assert!(via_request.is_empty());
}

#[test]
fn structural_errors_display_their_contract() {
    let err = ConditionalUpdate::new("books", 1)
        .fields(vec![json!("a"), json!("b")])
        .values(vec![json!("x")])
        .to_sql()
        .unwrap_err();
    assert!(err.is_structural());
    assert_eq!(
        err.to_string(),
        "Structural error: fields and values must be of equal length"
    );
}
