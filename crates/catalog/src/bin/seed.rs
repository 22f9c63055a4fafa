//! Seed an in-memory catalog with demo data and report what was inserted.

use shoestock_catalog::InMemoryCatalog;
use shoestock_catalog::seed::seed_demo_catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shoestock_observability::init();

    let catalog = InMemoryCatalog::in_memory();
    let report = seed_demo_catalog(&catalog).await?;
    tracing::info!(
        brands = report.brands,
        categories = report.categories,
        shoes = report.shoes,
        skus = report.skus,
        "catalog seeded"
    );
    Ok(())
}
