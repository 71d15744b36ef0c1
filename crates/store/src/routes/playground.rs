//! Playground route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::models::{ProductAggregates, ProductWithCollection};
use crate::state::AppState;

/// Greeting page listing every product with its collection.
#[derive(Template, WebTemplate, Serialize)]
#[template(path = "hello.html")]
pub struct HelloTemplate {
    pub name: String,
    pub products: Vec<ProductWithCollection>,
    pub results: ProductAggregates,
}

/// Display the playground page.
///
/// Loads all products joined to their collection in one query, then the
/// count and minimum price over the whole product table in a second one.
/// Both read the same snapshot.
#[instrument(skip(state))]
pub async fn hello(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let repo = ProductRepository::new(state.pool());

    let (products, results) = repo.snapshot_with_aggregates().await?;

    tracing::debug!(
        products = products.len(),
        count = results.count,
        "Loaded playground data"
    );

    Ok(HelloTemplate {
        name: state.config().display_name.clone(),
        products,
        results,
    })
}
