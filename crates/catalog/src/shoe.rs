//! Shoes, the catalog's central entity.
//!
//! A shoe references exactly one brand and one category by id. Display
//! paths populate those references into full records; a reference that no
//! longer resolves is shown as absent rather than failing the page.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use shoestock_core::{BrandId, CategoryId, Entity, FieldError, ShoeId};
use shoestock_store::{CatalogEntity, EntityStore, StoreError};

use crate::Catalog;
use crate::brand::Brand;
use crate::category::Category;
use crate::outcome::{
    CreateOutcome, DeleteOutcome, Outcome, PageData, UpdateOutcome, WorkflowError, WorkflowResult,
};
use crate::sku::{Sku, SkuFilter};
use crate::validate::{self, Validated};

/// A shoe model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shoe {
    pub id: ShoeId,
    pub name: String,
    pub desc: Option<String>,
    pub brand: BrandId,
    pub category: CategoryId,
}

impl Entity for Shoe {
    type Id = ShoeId;

    fn id(&self) -> ShoeId {
        self.id
    }

    fn path(&self) -> String {
        format!("/inventory/shoe/{}", self.id)
    }
}

/// Equality filter over shoe fields.
#[derive(Debug, Clone, Default)]
pub struct ShoeFilter {
    pub name: Option<String>,
    pub brand: Option<BrandId>,
    pub category: Option<CategoryId>,
}

impl CatalogEntity for Shoe {
    type Filter = ShoeFilter;
    type Key = (String, BrandId);

    fn natural_key(&self) -> (String, BrandId) {
        (self.name.clone(), self.brand)
    }

    fn matches(&self, filter: &ShoeFilter) -> bool {
        filter.name.as_deref().is_none_or(|name| self.name == name)
            && filter.brand.is_none_or(|brand| self.brand == brand)
            && filter
                .category
                .is_none_or(|category| self.category == category)
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name)
    }
}

/// A shoe with its references resolved for display. A dangling reference
/// surfaces as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoeView {
    pub shoe: Shoe,
    pub brand: Option<Brand>,
    pub category: Option<Category>,
}

/// Submitted shoe form fields. Brand and category arrive as id strings
/// from a select control.
#[derive(Debug, Clone, Default)]
pub struct ShoeForm {
    pub name: String,
    pub desc: String,
    pub brand: String,
    pub category: String,
}

/// Sanitized-but-unsaved shoe values, kept for redisplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoeDraft {
    pub id: Option<ShoeId>,
    pub name: String,
    pub desc: Option<String>,
    pub brand: Option<BrandId>,
    pub category: Option<CategoryId>,
}

struct ShoeFields {
    name: String,
    desc: Option<String>,
    brand: BrandId,
    category: CategoryId,
}

impl ShoeForm {
    fn validate(&self) -> Validated<ShoeFields, ShoeDraft> {
        let mut errors = Vec::new();
        let name = validate::sanitize(&self.name);
        let desc = validate::optional(&self.desc);

        if name.is_empty() {
            errors.push(FieldError::new("name", "Name must not be empty."));
        } else if name.chars().count() > 100 {
            errors.push(FieldError::new(
                "name",
                "Name must not exceed 100 characters",
            ));
        }

        let brand = match BrandId::from_str(self.brand.trim()) {
            Ok(brand) => Some(brand),
            Err(_) => {
                errors.push(FieldError::new("brand", "A brand must be selected"));
                None
            }
        };
        let category = match CategoryId::from_str(self.category.trim()) {
            Ok(category) => Some(category),
            Err(_) => {
                errors.push(FieldError::new("category", "A category must be selected"));
                None
            }
        };

        match (brand, category) {
            (Some(brand), Some(category)) if errors.is_empty() => Validated::Valid(ShoeFields {
                name,
                desc,
                brand,
                category,
            }),
            _ => Validated::Invalid {
                draft: ShoeDraft {
                    id: None,
                    name,
                    desc,
                    brand,
                    category,
                },
                errors,
            },
        }
    }
}

impl ShoeFields {
    fn into_shoe(self, id: ShoeId) -> Shoe {
        Shoe {
            id,
            name: self.name,
            desc: self.desc,
            brand: self.brand,
            category: self.category,
        }
    }

    fn into_draft(self, id: Option<ShoeId>) -> ShoeDraft {
        ShoeDraft {
            id,
            name: self.name,
            desc: self.desc,
            brand: Some(self.brand),
            category: Some(self.category),
        }
    }
}

impl<B, C, S, K> Catalog<B, C, S, K>
where
    B: EntityStore<Brand>,
    C: EntityStore<Category>,
    S: EntityStore<Shoe>,
    K: EntityStore<Sku>,
{
    /// Resolve brand and category references for a batch of shoes.
    pub(crate) async fn populate_shoes(
        &self,
        shoes: Vec<Shoe>,
    ) -> Result<Vec<ShoeView>, WorkflowError> {
        let mut views = Vec::with_capacity(shoes.len());
        for shoe in shoes {
            let (brand, category) = tokio::try_join!(
                self.brands.find_by_id(shoe.brand),
                self.categories.find_by_id(shoe.category),
            )?;
            views.push(ShoeView {
                shoe,
                brand,
                category,
            });
        }
        Ok(views)
    }

    /// Check that a shoe's references point at stored records.
    async fn unresolved_shoe_refs(
        &self,
        fields: &ShoeFields,
    ) -> Result<Vec<FieldError>, WorkflowError> {
        let (brand, category) = tokio::try_join!(
            self.brands.find_by_id(fields.brand),
            self.categories.find_by_id(fields.category),
        )?;
        let mut errors = Vec::new();
        if brand.is_none() {
            errors.push(FieldError::new("brand", "Unknown brand"));
        }
        if category.is_none() {
            errors.push(FieldError::new("category", "Unknown category"));
        }
        Ok(errors)
    }

    async fn shoe_form_page(
        &self,
        title: &str,
        shoe: impl Serialize,
        errors: &[FieldError],
    ) -> WorkflowResult {
        let (brands, categories) = tokio::try_join!(
            self.brands.find_many(None),
            self.categories.find_many(None),
        )?;
        let mut data = PageData::new(title);
        data.insert("shoe", shoe);
        data.insert("brand_list", &brands);
        data.insert("category_list", &categories);
        data.insert("errors", errors);
        Ok(Outcome::render("shoe_form", data))
    }

    /// Display list of all shoes with brand and category resolved.
    pub async fn shoe_list(&self) -> WorkflowResult {
        let shoes = self.shoes.find_many(None).await?;
        let shoes = self.populate_shoes(shoes).await?;
        let mut data = PageData::new("Shoe List");
        data.insert("shoe_list", &shoes);
        Ok(Outcome::render("shoe_list", data))
    }

    /// Display detail page for a specific shoe. The page title is the
    /// shoe's name, and the shoe's SKUs are summarized into distinct
    /// colors, sizes and prices in first-seen order.
    pub async fn shoe_detail(&self, id: ShoeId) -> WorkflowResult {
        let by_shoe = SkuFilter {
            shoe: Some(id),
            ..SkuFilter::default()
        };
        let (shoe, skus) = tokio::try_join!(
            self.shoes.find_by_id(id),
            self.skus.find_many(Some(&by_shoe)),
        )?;
        let Some(shoe) = shoe else {
            return Err(WorkflowError::NotFound("Shoe not found".into()));
        };
        let mut views = self.populate_shoes(vec![shoe]).await?;
        let view = views.remove(0);

        let mut colors = Vec::new();
        let mut sizes = Vec::new();
        let mut prices = Vec::new();
        for sku in &skus {
            if !colors.contains(&sku.color) {
                colors.push(sku.color.clone());
            }
            if !sizes.contains(&sku.size) {
                sizes.push(sku.size);
            }
            if !prices.contains(&sku.price) {
                prices.push(sku.price);
            }
        }

        let mut data = PageData::new(view.shoe.name.clone());
        data.insert("shoe", &view);
        data.insert("shoe_skus", &skus);
        data.insert("colors", &colors);
        data.insert("sizes", &sizes);
        data.insert("prices", &prices);
        Ok(Outcome::render("shoe_detail", data))
    }

    /// Display shoe create form on GET, offering every brand and category.
    pub async fn shoe_create_get(&self) -> WorkflowResult {
        self.shoe_form_page("Create Shoe", Value::Null, &[]).await
    }

    /// Handle shoe create on POST.
    pub async fn shoe_create_post(&self, form: ShoeForm) -> WorkflowResult {
        match self.shoe_create(form).await? {
            CreateOutcome::Created(shoe) | CreateOutcome::Existing(shoe) => {
                Ok(Outcome::redirect(shoe.path()))
            }
            CreateOutcome::Invalid { draft, errors } => {
                self.shoe_form_page("Create Shoe", &draft, &errors).await
            }
        }
    }

    /// Validate and create a shoe. The (name, brand) pair is the natural
    /// key; references must resolve before anything is written.
    pub async fn shoe_create(
        &self,
        form: ShoeForm,
    ) -> Result<CreateOutcome<Shoe, ShoeDraft>, WorkflowError> {
        let fields = match form.validate() {
            Validated::Valid(fields) => fields,
            Validated::Invalid { draft, errors } => {
                return Ok(CreateOutcome::Invalid { draft, errors });
            }
        };
        let errors = self.unresolved_shoe_refs(&fields).await?;
        if !errors.is_empty() {
            return Ok(CreateOutcome::Invalid {
                draft: fields.into_draft(None),
                errors,
            });
        }

        let same_model = ShoeFilter {
            name: Some(fields.name.clone()),
            brand: Some(fields.brand),
            category: None,
        };
        if let Some(existing) = self.shoes.find_one(&same_model).await? {
            return Ok(CreateOutcome::Existing(existing));
        }

        match self.shoes.insert(fields.into_shoe(ShoeId::new())).await {
            Ok(shoe) => {
                tracing::info!(id = %shoe.id, name = %shoe.name, brand = %shoe.brand, "shoe created");
                Ok(CreateOutcome::Created(shoe))
            }
            Err(StoreError::UniqueViolation { existing }) => {
                match self.shoes.find_by_id(existing.into()).await? {
                    Some(shoe) => Ok(CreateOutcome::Existing(shoe)),
                    None => Err(WorkflowError::NotFound("Shoe not found".into())),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Display shoe delete confirmation on GET.
    pub async fn shoe_delete_get(&self, id: ShoeId) -> WorkflowResult {
        let by_shoe = SkuFilter {
            shoe: Some(id),
            ..SkuFilter::default()
        };
        let (shoe, skus) = tokio::try_join!(
            self.shoes.find_by_id(id),
            self.skus.find_many(Some(&by_shoe)),
        )?;
        let Some(shoe) = shoe else {
            return Ok(Outcome::redirect("/inventory/shoes"));
        };

        let mut data = PageData::new("Delete Shoe");
        data.insert("shoe", &shoe);
        data.insert("shoe_skus", &skus);
        Ok(Outcome::render("shoe_delete", data))
    }

    /// Handle shoe delete on POST.
    pub async fn shoe_delete_post(&self, id: ShoeId) -> WorkflowResult {
        match self.shoe_delete(id).await? {
            DeleteOutcome::Deleted => Ok(Outcome::redirect("/inventory/shoes")),
            DeleteOutcome::Blocked { entity, dependents } => {
                let mut data = PageData::new("Delete Shoe");
                data.insert("shoe", &entity);
                data.insert("shoe_skus", &dependents);
                Ok(Outcome::render("shoe_delete", data))
            }
        }
    }

    /// Delete a shoe unless SKUs still reference it.
    pub async fn shoe_delete(
        &self,
        id: ShoeId,
    ) -> Result<DeleteOutcome<Shoe, Sku>, WorkflowError> {
        let by_shoe = SkuFilter {
            shoe: Some(id),
            ..SkuFilter::default()
        };
        let (shoe, dependents) = tokio::try_join!(
            self.shoes.find_by_id(id),
            self.skus.find_many(Some(&by_shoe)),
        )?;
        let Some(shoe) = shoe else {
            return Ok(DeleteOutcome::Deleted);
        };
        if !dependents.is_empty() {
            return Ok(DeleteOutcome::Blocked {
                entity: shoe,
                dependents,
            });
        }

        match self.shoes.delete_by_id(id).await {
            Ok(()) => {
                tracing::info!(%id, "shoe deleted");
                Ok(DeleteOutcome::Deleted)
            }
            Err(StoreError::NotFound) => Ok(DeleteOutcome::Deleted),
            Err(e) => Err(e.into()),
        }
    }

    /// Display shoe update form on GET.
    pub async fn shoe_update_get(&self, id: ShoeId) -> WorkflowResult {
        let Some(shoe) = self.shoes.find_by_id(id).await? else {
            return Err(WorkflowError::NotFound("Shoe not found".into()));
        };
        self.shoe_form_page("Update Shoe", &shoe, &[]).await
    }

    /// Handle shoe update on POST.
    pub async fn shoe_update_post(&self, id: ShoeId, form: ShoeForm) -> WorkflowResult {
        match self.shoe_update(id, form).await? {
            UpdateOutcome::Updated(shoe) => Ok(Outcome::redirect(shoe.path())),
            UpdateOutcome::Invalid { draft, errors } => {
                self.shoe_form_page("Update Shoe", &draft, &errors).await
            }
        }
    }

    /// Validate and replace a shoe's mutable fields. References must
    /// resolve, as on create.
    pub async fn shoe_update(
        &self,
        id: ShoeId,
        form: ShoeForm,
    ) -> Result<UpdateOutcome<Shoe, ShoeDraft>, WorkflowError> {
        let fields = match form.validate() {
            Validated::Valid(fields) => fields,
            Validated::Invalid { mut draft, errors } => {
                draft.id = Some(id);
                return Ok(UpdateOutcome::Invalid { draft, errors });
            }
        };
        let errors = self.unresolved_shoe_refs(&fields).await?;
        if !errors.is_empty() {
            return Ok(UpdateOutcome::Invalid {
                draft: fields.into_draft(Some(id)),
                errors,
            });
        }

        match self.shoes.update_by_id(id, fields.into_shoe(id)).await {
            Ok(shoe) => {
                tracing::info!(%id, "shoe updated");
                Ok(UpdateOutcome::Updated(shoe))
            }
            Err(StoreError::NotFound) => Err(WorkflowError::NotFound("Shoe not found".into())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryCatalog, test_support};

    async fn fixtures(catalog: &InMemoryCatalog) -> (Brand, Category) {
        let brand = test_support::create_brand(catalog, "Nike").await;
        let category = test_support::create_category(catalog, "mens", "running").await;
        (brand, category)
    }

    fn form(name: &str, brand: &str, category: &str) -> ShoeForm {
        ShoeForm {
            name: name.into(),
            desc: String::new(),
            brand: brand.into(),
            category: category.into(),
        }
    }

    #[tokio::test]
    async fn create_with_resolved_refs_succeeds() {
        let catalog = InMemoryCatalog::in_memory();
        let (brand, category) = fixtures(&catalog).await;

        let outcome = catalog
            .shoe_create(form(
                " Air Max ",
                &brand.id.to_string(),
                &category.id.to_string(),
            ))
            .await
            .unwrap();
        let CreateOutcome::Created(shoe) = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        assert_eq!(shoe.name, "Air Max");
        assert_eq!(shoe.brand, brand.id);
        assert_eq!(shoe.category, category.id);
    }

    #[tokio::test]
    async fn unparseable_selections_fail_per_field() {
        let catalog = InMemoryCatalog::in_memory();
        let outcome = catalog
            .shoe_create(form("Air Max", "", "not-an-id"))
            .await
            .unwrap();
        let CreateOutcome::Invalid { errors, .. } = outcome else {
            panic!("expected Invalid");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["brand", "category"]);
    }

    #[tokio::test]
    async fn well_formed_but_unknown_refs_are_rejected() {
        let catalog = InMemoryCatalog::in_memory();
        let (brand, _) = fixtures(&catalog).await;

        let outcome = catalog
            .shoe_create(form(
                "Air Max",
                &brand.id.to_string(),
                &CategoryId::new().to_string(),
            ))
            .await
            .unwrap();
        let CreateOutcome::Invalid { draft, errors } = outcome else {
            panic!("expected Invalid");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "category");
        assert_eq!(errors[0].message, "Unknown category");
        assert_eq!(draft.brand, Some(brand.id));
        assert_eq!(catalog.shoes.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn name_length_cap_is_enforced() {
        let catalog = InMemoryCatalog::in_memory();
        let (brand, category) = fixtures(&catalog).await;
        let long = "x".repeat(101);

        let outcome = catalog
            .shoe_create(form(&long, &brand.id.to_string(), &category.id.to_string()))
            .await
            .unwrap();
        let CreateOutcome::Invalid { errors, .. } = outcome else {
            panic!("expected Invalid");
        };
        assert_eq!(errors[0].message, "Name must not exceed 100 characters");
    }

    #[tokio::test]
    async fn same_name_under_same_brand_is_a_duplicate() {
        let catalog = InMemoryCatalog::in_memory();
        let (brand, category) = fixtures(&catalog).await;
        let other_brand = test_support::create_brand(&catalog, "Adidas").await;

        let first = catalog
            .shoe_create(form(
                "Air Max",
                &brand.id.to_string(),
                &category.id.to_string(),
            ))
            .await
            .unwrap();
        let CreateOutcome::Created(first) = first else {
            panic!("expected Created");
        };

        let dup = catalog
            .shoe_create(form(
                "Air Max",
                &brand.id.to_string(),
                &category.id.to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(dup, CreateOutcome::Existing(first.clone()));

        let elsewhere = catalog
            .shoe_create(form(
                "Air Max",
                &other_brand.id.to_string(),
                &category.id.to_string(),
            ))
            .await
            .unwrap();
        assert!(matches!(elsewhere, CreateOutcome::Created(_)));
        assert_eq!(catalog.shoes.count(None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_resolves_references() {
        let catalog = InMemoryCatalog::in_memory();
        let (brand, category) = fixtures(&catalog).await;
        catalog
            .shoe_create(form(
                "Pegasus",
                &brand.id.to_string(),
                &category.id.to_string(),
            ))
            .await
            .unwrap();

        let Outcome::Render { data, .. } = catalog.shoe_list().await.unwrap() else {
            panic!("expected render");
        };
        let list = data.get("shoe_list").unwrap().as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["brand"]["name"].as_str().unwrap(), "Nike");
        assert_eq!(list[0]["category"]["style"].as_str().unwrap(), "running");
    }

    #[tokio::test]
    async fn detail_of_missing_shoe_is_not_found() {
        let catalog = InMemoryCatalog::in_memory();
        let err = catalog.shoe_detail(ShoeId::new()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }
}
