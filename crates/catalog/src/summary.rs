//! Landing-page stock summary.

use shoestock_store::EntityStore;

use crate::Catalog;
use crate::brand::Brand;
use crate::category::Category;
use crate::outcome::{Outcome, PageData, WorkflowResult};
use crate::shoe::Shoe;
use crate::sku::{Sku, SkuFilter};

impl<B, C, S, K> Catalog<B, C, S, K>
where
    B: EntityStore<Brand>,
    C: EntityStore<Category>,
    S: EntityStore<Shoe>,
    K: EntityStore<Sku>,
{
    /// Display the landing page with record counts across the catalog,
    /// gathered concurrently.
    pub async fn index(&self) -> WorkflowResult {
        let in_stock = SkuFilter {
            in_stock: Some(true),
            ..SkuFilter::default()
        };
        let (shoe_count, sku_count, sku_in_stock_count, brand_count, category_count) = tokio::try_join!(
            self.shoes.count(None),
            self.skus.count(None),
            self.skus.count(Some(&in_stock)),
            self.brands.count(None),
            self.categories.count(None),
        )?;

        let mut data = PageData::new("Home");
        data.insert("shoe_count", shoe_count);
        data.insert("sku_count", sku_count);
        data.insert("sku_in_stock_count", sku_in_stock_count);
        data.insert("brand_count", brand_count);
        data.insert("category_count", category_count);
        Ok(Outcome::render("index", data))
    }
}

#[cfg(test)]
mod tests {
    use crate::outcome::Outcome;
    use crate::sku::SkuForm;
    use crate::{InMemoryCatalog, test_support};

    #[tokio::test]
    async fn empty_catalog_counts_zero_everywhere() {
        let catalog = InMemoryCatalog::in_memory();
        let Outcome::Render { view, data } = catalog.index().await.unwrap() else {
            panic!("expected render");
        };
        assert_eq!(view, "index");
        assert_eq!(data.title(), "Home");
        for key in [
            "shoe_count",
            "sku_count",
            "sku_in_stock_count",
            "brand_count",
            "category_count",
        ] {
            assert_eq!(data.get(key).unwrap().as_u64(), Some(0), "{key}");
        }
    }

    #[tokio::test]
    async fn in_stock_count_excludes_zero_quantity_skus() {
        let catalog = InMemoryCatalog::in_memory();
        let brand = test_support::create_brand(&catalog, "Nike").await;
        let category = test_support::create_category(&catalog, "mens", "running").await;
        let shoe = test_support::create_shoe(&catalog, "Air Max", &brand, &category).await;

        for (size, qty) in [("42", "5"), ("43", "0"), ("44", "1")] {
            catalog
                .sku_create(SkuForm {
                    shoe: shoe.id.to_string(),
                    color: "red".into(),
                    size: size.into(),
                    qty: qty.into(),
                    price: "49.99".into(),
                })
                .await
                .unwrap();
        }

        let Outcome::Render { data, .. } = catalog.index().await.unwrap() else {
            panic!("expected render");
        };
        assert_eq!(data.get("sku_count").unwrap().as_u64(), Some(3));
        assert_eq!(data.get("sku_in_stock_count").unwrap().as_u64(), Some(2));
        assert_eq!(data.get("shoe_count").unwrap().as_u64(), Some(1));
    }
}
