//! Catalog statistics command.

use std::collections::BTreeMap;

use tracing::info;

use emporium_store::db::ProductRepository;
use emporium_store::models::ProductSummary;

use super::connect;

/// Print the product count, lowest price and per-collection counts.
///
/// # Errors
///
/// Returns an error if the database connection or a query fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let repo = ProductRepository::new(&pool);

    let aggregates = repo.aggregate().await?;
    let summaries = repo.titles_with_collection().await?;

    info!("Catalog Statistics");
    info!("==================");
    info!("Products: {}", aggregates.count);
    match aggregates.min_price {
        Some(price) => info!("Lowest price: {price}"),
        None => info!("Lowest price: -"),
    }
    info!("By collection:");
    for (collection, count) in count_by_collection(&summaries) {
        info!("  {collection}: {count}");
    }

    Ok(())
}

fn count_by_collection(summaries: &[ProductSummary]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for summary in summaries {
        *counts.entry(summary.collection_title.as_str()).or_insert(0) += 1;
    }
    counts
}
