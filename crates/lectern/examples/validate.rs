//! Validate a book document against a live catalog and print the outcome.
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/catalog cargo run --example validate
//! ```

use lectern::prelude::*;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;

    let exec = Executor::new(&database_url)?;
    let engine = ValidationEngine::new(PgCatalog::new(&exec));

    let candidate = json!({
        "title": "The Dispossessed",
        "isbn13": "9780061054884",
        "category": 1,
        "language": "en",
        "pageCount": 400,
    });
    let fields = candidate.as_object().expect("candidate is an object");

    let violations = engine.validate_book(fields, None, Mode::Create).await?;
    if violations.is_empty() {
        println!("ok: candidate is ready for persistence");
    } else {
        println!("{} problem(s):", violations.len());
        for violation in violations.iter() {
            println!("  {}: {}", violation.field, violation.message);
        }
    }

    Ok(())
}
