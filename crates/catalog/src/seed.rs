//! Demo data for a fresh catalog.
//!
//! Seeding drives the same validated create workflows as interactive use,
//! so the demo records obey every rule and duplicate check. Rerunning the
//! seed against a populated catalog resolves to the existing records and
//! inserts nothing.

use thiserror::Error;

use shoestock_core::FieldError;
use shoestock_store::EntityStore;

use crate::Catalog;
use crate::brand::{Brand, BrandForm};
use crate::category::{Category, CategoryForm};
use crate::outcome::{CreateOutcome, WorkflowError};
use crate::shoe::{Shoe, ShoeForm};
use crate::sku::{Sku, SkuForm};

/// What a seeding run inserted, per entity type. Records that already
/// existed are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub brands: usize,
    pub categories: usize,
    pub shoes: usize,
    pub skus: usize,
}

#[derive(Debug, Error)]
pub enum SeedError {
    /// A seed record failed validation. The seed data is fixed, so this is
    /// a programming error in the seed itself.
    #[error("seed record rejected: {0:?}")]
    Rejected(Vec<FieldError>),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

fn accepted<E, D: std::fmt::Debug>(
    outcome: CreateOutcome<E, D>,
    inserted: &mut usize,
) -> Result<E, SeedError> {
    match outcome {
        CreateOutcome::Created(entity) => {
            *inserted += 1;
            Ok(entity)
        }
        CreateOutcome::Existing(entity) => Ok(entity),
        CreateOutcome::Invalid { errors, .. } => Err(SeedError::Rejected(errors)),
    }
}

/// Populate the catalog with a small demo inventory.
pub async fn seed_demo_catalog<B, C, S, K>(
    catalog: &Catalog<B, C, S, K>,
) -> Result<SeedReport, SeedError>
where
    B: EntityStore<Brand>,
    C: EntityStore<Category>,
    S: EntityStore<Shoe>,
    K: EntityStore<Sku>,
{
    let mut report = SeedReport::default();

    let mut brands = Vec::new();
    for (name, desc) in [
        ("Nike", ""),
        ("Adidas", "Three stripes since 1949"),
        ("New Balance", ""),
        ("Converse", ""),
    ] {
        let form = BrandForm {
            name: name.into(),
            desc: desc.into(),
        };
        let brand = accepted(catalog.brand_create(form).await?, &mut report.brands)?;
        tracing::info!(name = %brand.name, "seeded brand");
        brands.push(brand);
    }
    let [nike, adidas, new_balance, converse] = &brands[..] else {
        unreachable!("four brands seeded");
    };

    let mut categories = Vec::new();
    for (gender, style) in [
        ("mens", "running"),
        ("womens", "running"),
        ("kids", "school"),
        // Blank gender defaults to unisex.
        ("", "skate"),
    ] {
        let form = CategoryForm {
            gender: gender.into(),
            style: style.into(),
        };
        let category = accepted(
            catalog.category_create(form).await?,
            &mut report.categories,
        )?;
        tracing::info!(gender = %category.gender, style = %category.style, "seeded category");
        categories.push(category);
    }
    let [mens_running, womens_running, kids_school, unisex_skate] = &categories[..] else {
        unreachable!("four categories seeded");
    };

    let mut shoes = Vec::new();
    for (name, desc, brand, category) in [
        ("Air Max 90", "Classic visible-air runner", nike, mens_running),
        ("Pegasus 40", "", nike, womens_running),
        ("Ultraboost Light", "", adidas, mens_running),
        ("574 Core", "", new_balance, kids_school),
        (
            "Chuck Taylor All Star",
            "Canvas high top",
            converse,
            unisex_skate,
        ),
    ] {
        let form = ShoeForm {
            name: name.into(),
            desc: desc.into(),
            brand: brand.id.to_string(),
            category: category.id.to_string(),
        };
        let shoe = accepted(catalog.shoe_create(form).await?, &mut report.shoes)?;
        tracing::info!(name = %shoe.name, "seeded shoe");
        shoes.push(shoe);
    }
    let [air_max, pegasus, ultraboost, nb574, chuck] = &shoes[..] else {
        unreachable!("five shoes seeded");
    };

    let units: [(&Shoe, &str, &str, &str, &str); 8] = [
        (air_max, "white", "42", "12", "129.99"),
        (air_max, "white", "44", "4", "129.99"),
        // Blank qty means none on hand.
        (air_max, "black", "43", "", "119.99"),
        (pegasus, "coral", "38", "7", "139.99"),
        (ultraboost, "core black", "42", "3", "179.99"),
        (nb574, "navy", "33", "20", "49.99"),
        (chuck, "red", "41", "9", "64.99"),
        (chuck, "red", "42", "", "64.99"),
    ];
    for (shoe, color, size, qty, price) in units {
        let form = SkuForm {
            shoe: shoe.id.to_string(),
            color: color.into(),
            size: size.into(),
            qty: qty.into(),
            price: price.into(),
        };
        let sku: Sku = accepted(catalog.sku_create(form).await?, &mut report.skus)?;
        tracing::info!(color = %sku.color, size = sku.size, "seeded sku");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryCatalog;

    #[tokio::test]
    async fn seed_fills_an_empty_catalog() {
        let catalog = InMemoryCatalog::in_memory();
        let report = seed_demo_catalog(&catalog).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                brands: 4,
                categories: 4,
                shoes: 5,
                skus: 8,
            }
        );
        assert_eq!(catalog.brands.count(None).await.unwrap(), 4);
        assert_eq!(catalog.skus.count(None).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn reseeding_inserts_nothing() {
        let catalog = InMemoryCatalog::in_memory();
        seed_demo_catalog(&catalog).await.unwrap();
        let second = seed_demo_catalog(&catalog).await.unwrap();
        assert_eq!(second, SeedReport::default());
        assert_eq!(catalog.shoes.count(None).await.unwrap(), 5);
    }
}
