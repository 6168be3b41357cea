//! Example walking the category listing page by page.
//!
//! This example shows how to:
//! - Configure a client from the environment
//! - Page through a listing with a cursor
//! - Re-check a fetched entity with a conditional request
//!
//! Run with: `ICONFINDER_CLIENT_ID=... ICONFINDER_CLIENT_SECRET=... cargo run --example paginate`

use iconfinder::{Category, Client, Error, ListableByCursor, Retrievable};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("iconfinder=debug,paginate=info")
        .init();

    let client = Client::builder()
        .credentials(
            std::env::var("ICONFINDER_CLIENT_ID").unwrap_or_default(),
            std::env::var("ICONFINDER_CLIENT_SECRET").unwrap_or_default(),
        )
        .build()?;

    let categories = client.bind::<Category>();
    let mut page = categories.first_page().await?;
    let mut seen = 0;

    println!("{} categories in total", page.total_count());

    loop {
        for category in &page {
            println!("  {:<24} {}", category.identifier(), category.name());
        }
        seen += page.len();

        let Some(cursor) = page.next_cursor() else {
            break;
        };
        let next = Category::list(&client, 25, Some(cursor), None).await?;
        match next {
            Some(next) if !next.is_empty() => page = next,
            _ => break,
        }
    }

    println!("Listed {} categories", seen);

    if let Some(first) = Category::get(&client, "arrows", None).await? {
        match first.refresh(&client).await? {
            Some(updated) => println!("{} changed: {}", first.identifier(), updated.name()),
            None => println!("{} is unchanged", first.identifier()),
        }
    }

    Ok(())
}
