//! Engine tests over an in-memory lookup double.

use super::*;
use crate::catalog::CatalogLookup;
use serde_json::json;

#[derive(Default)]
struct FakeCatalog {
    usernames: Vec<(i64, &'static str)>,
    titles: Vec<(i64, &'static str)>,
    isbn13s: Vec<(i64, &'static str)>,
    book_ids: Vec<i64>,
    category_ids: Vec<i64>,
}

impl CatalogLookup for FakeCatalog {
    async fn find_user_by_username(&self, username: &str) -> CatalogResult<Option<i64>> {
        Ok(self
            .usernames
            .iter()
            .find(|(_, u)| *u == username)
            .map(|(id, _)| *id))
    }

    async fn find_book_by_title(&self, title: &str) -> CatalogResult<Option<i64>> {
        Ok(self
            .titles
            .iter()
            .find(|(_, t)| *t == title)
            .map(|(id, _)| *id))
    }

    async fn find_book_by_isbn13(&self, isbn13: &str) -> CatalogResult<Option<i64>> {
        Ok(self
            .isbn13s
            .iter()
            .find(|(_, i)| *i == isbn13)
            .map(|(id, _)| *id))
    }

    async fn book_exists(&self, id: i64) -> CatalogResult<bool> {
        Ok(self.book_ids.contains(&id))
    }

    async fn category_exists(&self, id: i64) -> CatalogResult<bool> {
        Ok(self.category_ids.contains(&id))
    }
}

fn engine() -> ValidationEngine<FakeCatalog> {
    ValidationEngine::new(FakeCatalog {
        usernames: vec![(1, "admin")],
        titles: vec![(5, "The Left Hand of Darkness")],
        isbn13s: vec![(5, "9780441478125")],
        book_ids: vec![5],
        category_ids: vec![1, 2],
    })
}

fn doc(value: serde_json::Value) -> Map<String, Value> {
    value.as_object().cloned().expect("test doc must be an object")
}

fn fields(violations: &Violations) -> Vec<&str> {
    violations.iter().map(|v| v.field.as_str()).collect()
}

// ==================== User ====================

#[tokio::test]
async fn user_create_valid_passes() {
    let violations = engine()
        .validate_user(
            &doc(json!({"username": "reader", "password": "hunter2", "name": "Jane Doe"})),
            Mode::Create,
        )
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn user_create_short_username_flagged() {
    let violations = engine()
        .validate_user(
            &doc(json!({"username": "ab", "password": "hunter2", "name": "Jane"})),
            Mode::Create,
        )
        .await
        .unwrap();
    assert_eq!(fields(&violations), vec!["username"]);
}

#[tokio::test]
async fn user_create_long_username_flagged() {
    let violations = engine()
        .validate_user(
            &doc(json!({"username": "x".repeat(33), "password": "hunter2", "name": "Jane"})),
            Mode::Create,
        )
        .await
        .unwrap();
    assert_eq!(fields(&violations), vec!["username"]);
}

#[tokio::test]
async fn user_create_taken_username_flagged() {
    let violations = engine()
        .validate_user(
            &doc(json!({"username": "admin", "password": "hunter2", "name": "Jane"})),
            Mode::Create,
        )
        .await
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.items[0].field, "username");
    assert_eq!(violations.items[0].message, "Username is already registered");
}

#[tokio::test]
async fn user_create_missing_everything_reports_all_fields() {
    let violations = engine()
        .validate_user(&doc(json!({})), Mode::Create)
        .await
        .unwrap();
    // Declaration order, never fail-fast; the uniqueness rule passes
    // silently because nothing can collide with an absent username.
    assert_eq!(fields(&violations), vec!["username", "password", "name"]);
}

#[tokio::test]
async fn user_patch_skips_absent_fields() {
    let violations = engine()
        .validate_user(&doc(json!({})), Mode::Patch)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn user_patch_empty_name_is_present_and_flagged() {
    let violations = engine()
        .validate_user(&doc(json!({"name": ""})), Mode::Patch)
        .await
        .unwrap();
    assert_eq!(fields(&violations), vec!["name"]);
}

#[tokio::test]
async fn user_patch_null_name_is_skipped() {
    let violations = engine()
        .validate_user(&doc(json!({"name": null})), Mode::Patch)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn username_rules_never_run_in_patch_mode() {
    let violations = engine()
        .validate_user(&doc(json!({"username": "x"})), Mode::Patch)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

// ==================== Book ====================

fn valid_book() -> Map<String, Value> {
    doc(json!({
        "title": "A Wizard of Earthsea",
        "isbn13": "9780547773742",
        "category": 1,
    }))
}

#[tokio::test]
async fn book_create_minimal_valid_passes() {
    let violations = engine()
        .validate_book(&valid_book(), None, Mode::Create)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn book_short_isbn13_always_fails_format() {
    let mut book = valid_book();
    book.insert("isbn13".into(), json!("123"));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert_eq!(fields(&violations), vec!["isbn13"]);
    assert_eq!(violations.items[0].message, "ISBN-13 value is invalid");
}

#[tokio::test]
async fn book_duplicate_isbn13_of_other_book_fails() {
    let mut book = valid_book();
    book.insert("isbn13".into(), json!("9780441478125"));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert_eq!(fields(&violations), vec!["isbn13"]);
    assert!(violations.items[0].message.contains("already exists"));
}

#[tokio::test]
async fn book_patch_own_isbn13_is_allowed() {
    let violations = engine()
        .validate_book(&doc(json!({"isbn13": "9780441478125"})), Some(5), Mode::Patch)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn book_patch_own_title_is_allowed() {
    let violations = engine()
        .validate_book(
            &doc(json!({"title": "The Left Hand of Darkness"})),
            Some(5),
            Mode::Patch,
        )
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn book_duplicate_title_names_the_book() {
    let mut book = valid_book();
    book.insert("title".into(), json!("The Left Hand of Darkness"));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert_eq!(
        violations.items[0].message,
        "Book \"The Left Hand of Darkness\" already exists"
    );
}

#[tokio::test]
async fn book_numeric_isbn13_passes_format() {
    // Lexical rendering: a 13-digit number reads the same as the string.
    let mut book = valid_book();
    book.insert("isbn13".into(), json!(9780123456789_i64));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn book_missing_category_gets_bare_message() {
    let mut book = valid_book();
    book.remove("category");
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert_eq!(violations.items[0].message, "Category does not exist");
}

#[tokio::test]
async fn book_unknown_category_names_the_id() {
    let mut book = valid_book();
    book.insert("category".into(), json!(99));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert_eq!(
        violations.items[0].message,
        "Category with id \"99\" does not exist"
    );
}

#[tokio::test]
async fn book_category_as_numeric_string_coerces() {
    let mut book = valid_book();
    book.insert("category".into(), json!("2"));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn book_empty_language_means_unset() {
    let mut book = valid_book();
    book.insert("language".into(), json!(""));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn book_null_language_is_flagged() {
    // The language gate is key presence, not truthiness: an explicit null
    // is present and not a string.
    let mut book = valid_book();
    book.insert("language".into(), json!(null));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert_eq!(fields(&violations), vec!["language"]);
}

#[tokio::test]
async fn book_empty_isbn10_skips_silently() {
    let mut book = valid_book();
    book.insert("isbn10".into(), json!(""));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn book_bad_isbn10_is_flagged() {
    let mut book = valid_book();
    book.insert("isbn10".into(), json!("12345"));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert_eq!(fields(&violations), vec!["isbn10"]);
}

#[tokio::test]
async fn book_wide_garbage_page_count_fails_both_rules() {
    let mut book = valid_book();
    book.insert("pageCount".into(), json!("aaaaaaaaaaa"));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    let messages: Vec<&str> = violations
        .for_field("pageCount")
        .map(|v| v.message.as_str())
        .collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("smaller than 10000000000"));
    assert!(messages[1].contains("larger than 0"));
}

#[tokio::test]
async fn book_numeric_page_count_skips_width_rule() {
    // Only string inputs carry a raw width.
    let mut book = valid_book();
    book.insert("pageCount".into(), json!(99999999999_i64));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn book_zero_page_count_skips_silently() {
    let mut book = valid_book();
    book.insert("pageCount".into(), json!(0));
    let violations = engine()
        .validate_book(&book, None, Mode::Create)
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn book_violations_follow_declaration_order() {
    let violations = engine()
        .validate_book(
            &doc(json!({
                "title": "",
                "isbn13": "123",
                "category": 99,
                "language": "english",
                "author": 7,
            })),
            None,
            Mode::Create,
        )
        .await
        .unwrap();
    assert_eq!(
        fields(&violations),
        vec!["title", "isbn13", "category", "language", "author"]
    );
}

// ==================== Read ====================

#[tokio::test]
async fn read_valid_passes() {
    let violations = engine()
        .validate_read(&doc(json!({"bookId": 5, "rating": 4, "review": "gripping"})))
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn read_string_rating_fails_type_strictness() {
    // "5" parses to a valid value, but the rule wants the number type.
    let violations = engine()
        .validate_read(&doc(json!({"bookId": 5, "rating": "5"})))
        .await
        .unwrap();
    assert_eq!(fields(&violations), vec!["rating"]);
    assert_eq!(
        violations.items[0].message,
        "Rating is required and must be a number"
    );
}

#[tokio::test]
async fn read_out_of_range_rating_fails() {
    let violations = engine()
        .validate_read(&doc(json!({"bookId": 5, "rating": 6})))
        .await
        .unwrap();
    assert_eq!(
        violations.items[0].message,
        "Rating must be 1, 2, 3, 4 or 5"
    );
}

#[tokio::test]
async fn read_zero_rating_reports_required() {
    let violations = engine()
        .validate_read(&doc(json!({"bookId": 5, "rating": 0})))
        .await
        .unwrap();
    assert_eq!(
        violations.items[0].message,
        "Rating is required and must be a number"
    );
}

#[tokio::test]
async fn read_unknown_book_is_flagged() {
    let violations = engine()
        .validate_read(&doc(json!({"bookId": 42, "rating": 3})))
        .await
        .unwrap();
    assert_eq!(violations.items[0].message, "Book \"42\" does not exist");
}

#[tokio::test]
async fn read_book_id_as_numeric_string_coerces() {
    let violations = engine()
        .validate_read(&doc(json!({"bookId": "5", "rating": 3})))
        .await
        .unwrap();
    assert!(violations.is_empty());
}

#[tokio::test]
async fn read_missing_book_id_reports_required() {
    let violations = engine()
        .validate_read(&doc(json!({"rating": 3})))
        .await
        .unwrap();
    assert_eq!(
        violations.items[0].message,
        "Book is required and must be an integer"
    );
}

#[tokio::test]
async fn read_non_string_review_is_flagged() {
    let violations = engine()
        .validate_read(&doc(json!({"bookId": 5, "rating": 3, "review": 10})))
        .await
        .unwrap();
    assert_eq!(fields(&violations), vec!["review"]);
}
