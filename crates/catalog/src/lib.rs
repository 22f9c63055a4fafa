//! `shoestock-catalog` — entity-management workflows for the shoe catalog.
//!
//! Four entity types (Brand, Category, Shoe, SKU) share the same shape of
//! workflow: browse, detail, create, update, delete, with duplicate
//! detection on create and delete guards on anything that still has
//! dependents. The workflows own validation and referential integrity; the
//! presentation layer only receives [`outcome::Outcome`] values.

pub mod brand;
pub mod category;
pub mod outcome;
pub mod seed;
pub mod shoe;
pub mod sku;
pub mod summary;
pub mod validate;

use std::sync::Arc;

use shoestock_store::{EntityStore, InMemoryStore};

pub use brand::{Brand, BrandDraft, BrandFilter, BrandForm};
pub use category::{Category, CategoryDraft, CategoryFilter, CategoryForm, Gender};
pub use outcome::{
    CreateOutcome, DeleteOutcome, Outcome, PageData, UpdateOutcome, WorkflowError, WorkflowResult,
};
pub use shoe::{Shoe, ShoeDraft, ShoeFilter, ShoeForm, ShoeView};
pub use sku::{Sku, SkuDraft, SkuFilter, SkuForm, SkuView};

/// Store bundle behind the four entity workflows.
///
/// Every operation runs as one logical unit of work. Independent reads
/// inside an operation are joined concurrently as a latency optimization;
/// there is no transaction across the read-check-write sequence, and the
/// store's natural-key constraint backstops the duplicate fast path.
pub struct Catalog<B, C, S, K> {
    pub(crate) brands: B,
    pub(crate) categories: C,
    pub(crate) shoes: S,
    pub(crate) skus: K,
}

impl<B, C, S, K> Catalog<B, C, S, K>
where
    B: EntityStore<Brand>,
    C: EntityStore<Category>,
    S: EntityStore<Shoe>,
    K: EntityStore<Sku>,
{
    pub fn new(brands: B, categories: C, shoes: S, skus: K) -> Self {
        Self {
            brands,
            categories,
            shoes,
            skus,
        }
    }
}

/// Catalog wired to fresh in-memory stores.
pub type InMemoryCatalog = Catalog<
    Arc<InMemoryStore<Brand>>,
    Arc<InMemoryStore<Category>>,
    Arc<InMemoryStore<Shoe>>,
    Arc<InMemoryStore<Sku>>,
>;

impl InMemoryCatalog {
    pub fn in_memory() -> Self {
        Catalog::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryStore::new()),
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::brand::BrandForm;
    use crate::category::CategoryForm;
    use crate::outcome::CreateOutcome;
    use crate::shoe::ShoeForm;

    pub async fn create_brand(catalog: &InMemoryCatalog, name: &str) -> Brand {
        let form = BrandForm {
            name: name.into(),
            desc: String::new(),
        };
        match catalog.brand_create(form).await.unwrap() {
            CreateOutcome::Created(brand) => brand,
            other => panic!("brand fixture failed: {other:?}"),
        }
    }

    pub async fn create_category(
        catalog: &InMemoryCatalog,
        gender: &str,
        style: &str,
    ) -> Category {
        let form = CategoryForm {
            gender: gender.into(),
            style: style.into(),
        };
        match catalog.category_create(form).await.unwrap() {
            CreateOutcome::Created(category) => category,
            other => panic!("category fixture failed: {other:?}"),
        }
    }

    pub async fn create_shoe(
        catalog: &InMemoryCatalog,
        name: &str,
        brand: &Brand,
        category: &Category,
    ) -> Shoe {
        let form = ShoeForm {
            name: name.into(),
            desc: String::new(),
            brand: brand.id.to_string(),
            category: category.id.to_string(),
        };
        match catalog.shoe_create(form).await.unwrap() {
            CreateOutcome::Created(shoe) => shoe,
            other => panic!("shoe fixture failed: {other:?}"),
        }
    }
}
