//! Brands and their management workflow.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use shoestock_core::{BrandId, Entity, FieldError};
use shoestock_store::{CatalogEntity, EntityStore, StoreError};

use crate::Catalog;
use crate::category::Category;
use crate::outcome::{
    CreateOutcome, DeleteOutcome, Outcome, PageData, UpdateOutcome, WorkflowError, WorkflowResult,
};
use crate::shoe::{Shoe, ShoeFilter};
use crate::sku::Sku;
use crate::validate::{self, Validated};

/// A shoe brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub desc: Option<String>,
}

impl Entity for Brand {
    type Id = BrandId;

    fn id(&self) -> BrandId {
        self.id
    }

    fn path(&self) -> String {
        format!("/inventory/brand/{}", self.id)
    }
}

/// Equality filter over brand fields.
#[derive(Debug, Clone, Default)]
pub struct BrandFilter {
    pub name: Option<String>,
}

impl CatalogEntity for Brand {
    type Filter = BrandFilter;
    type Key = String;

    fn natural_key(&self) -> String {
        self.name.clone()
    }

    fn matches(&self, filter: &BrandFilter) -> bool {
        filter.name.as_deref().is_none_or(|name| self.name == name)
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name)
    }
}

/// Submitted brand form fields, as handed over by the request layer.
#[derive(Debug, Clone, Default)]
pub struct BrandForm {
    pub name: String,
    pub desc: String,
}

/// Sanitized-but-unsaved brand values, kept for redisplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandDraft {
    pub id: Option<BrandId>,
    pub name: String,
    pub desc: Option<String>,
}

struct BrandFields {
    name: String,
    desc: Option<String>,
}

impl BrandForm {
    fn validate(&self) -> Validated<BrandFields, BrandDraft> {
        let mut errors = Vec::new();
        let name = validate::sanitize(&self.name);
        let desc = validate::optional(&self.desc);

        if self.name.trim().chars().count() < 3 {
            errors.push(FieldError::new(
                "name",
                "Brand name must contain at least 3 characters",
            ));
        }

        if errors.is_empty() {
            Validated::Valid(BrandFields { name, desc })
        } else {
            Validated::Invalid {
                draft: BrandDraft {
                    id: None,
                    name,
                    desc,
                },
                errors,
            }
        }
    }
}

impl BrandFields {
    fn into_brand(self, id: BrandId) -> Brand {
        Brand {
            id,
            name: self.name,
            desc: self.desc,
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
    /// Display list of all brands.
    pub async fn brand_list(&self) -> WorkflowResult {
        let brands = self.brands.find_many(None).await?;
        let mut data = PageData::new("Brand List");
        data.insert("brand_list", &brands);
        Ok(Outcome::render("brand_list", data))
    }

    /// Display detail page for a specific brand, with its shoes.
    pub async fn brand_detail(&self, id: BrandId) -> WorkflowResult {
        let by_brand = ShoeFilter {
            brand: Some(id),
            ..ShoeFilter::default()
        };
        let (brand, shoes) = tokio::try_join!(
            self.brands.find_by_id(id),
            self.shoes.find_many(Some(&by_brand)),
        )?;
        let Some(brand) = brand else {
            return Err(WorkflowError::NotFound("Brand not found".into()));
        };
        let shoes = self.populate_shoes(shoes).await?;

        let mut data = PageData::new("Brand:");
        data.insert("brand", &brand);
        data.insert("shoes", &shoes);
        Ok(Outcome::render("brand_detail", data))
    }

    /// Display brand create form on GET.
    pub async fn brand_create_get(&self) -> WorkflowResult {
        let mut data = PageData::new("Create Brand");
        data.insert("brand", Value::Null);
        data.insert("errors", Vec::<FieldError>::new());
        Ok(Outcome::render("brand_form", data))
    }

    /// Handle brand create on POST.
    pub async fn brand_create_post(&self, form: BrandForm) -> WorkflowResult {
        match self.brand_create(form).await? {
            CreateOutcome::Created(brand) | CreateOutcome::Existing(brand) => {
                Ok(Outcome::redirect(brand.path()))
            }
            CreateOutcome::Invalid { draft, errors } => {
                let mut data = PageData::new("Create Brand");
                data.insert("brand", &draft);
                data.insert("errors", &errors);
                Ok(Outcome::render("brand_form", data))
            }
        }
    }

    /// Validate and create a brand. A duplicate name resolves to the
    /// existing record's identity; no second insert happens.
    pub async fn brand_create(
        &self,
        form: BrandForm,
    ) -> Result<CreateOutcome<Brand, BrandDraft>, WorkflowError> {
        let fields = match form.validate() {
            Validated::Valid(fields) => fields,
            Validated::Invalid { draft, errors } => {
                return Ok(CreateOutcome::Invalid { draft, errors });
            }
        };

        // Fast path; the store's unique constraint remains the source of
        // truth if a concurrent create slips past this read.
        let same_name = BrandFilter {
            name: Some(fields.name.clone()),
        };
        if let Some(existing) = self.brands.find_one(&same_name).await? {
            return Ok(CreateOutcome::Existing(existing));
        }

        match self.brands.insert(fields.into_brand(BrandId::new())).await {
            Ok(brand) => {
                tracing::info!(id = %brand.id, name = %brand.name, "brand created");
                Ok(CreateOutcome::Created(brand))
            }
            Err(StoreError::UniqueViolation { existing }) => {
                self.existing_brand(existing.into()).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn existing_brand(
        &self,
        id: BrandId,
    ) -> Result<CreateOutcome<Brand, BrandDraft>, WorkflowError> {
        match self.brands.find_by_id(id).await? {
            Some(brand) => Ok(CreateOutcome::Existing(brand)),
            // The duplicate vanished between the failed insert and this
            // read; surface it like any other missing record.
            None => Err(WorkflowError::NotFound("Brand not found".into())),
        }
    }

    /// Display brand delete confirmation on GET. A missing brand redirects
    /// back to the list (idempotent confirmation path).
    pub async fn brand_delete_get(&self, id: BrandId) -> WorkflowResult {
        let by_brand = ShoeFilter {
            brand: Some(id),
            ..ShoeFilter::default()
        };
        let (brand, shoes) = tokio::try_join!(
            self.brands.find_by_id(id),
            self.shoes.find_many(Some(&by_brand)),
        )?;
        let Some(brand) = brand else {
            return Ok(Outcome::redirect("/inventory/brands"));
        };
        let shoes = self.populate_shoes(shoes).await?;

        let mut data = PageData::new("Delete Brand");
        data.insert("brand", &brand);
        data.insert("brand_shoes", &shoes);
        Ok(Outcome::render("brand_delete", data))
    }

    /// Handle brand delete on POST.
    pub async fn brand_delete_post(&self, id: BrandId) -> WorkflowResult {
        match self.brand_delete(id).await? {
            DeleteOutcome::Deleted => Ok(Outcome::redirect("/inventory/brands")),
            DeleteOutcome::Blocked { entity, dependents } => {
                let mut data = PageData::new("Delete Brand");
                data.insert("brand", &entity);
                data.insert("brand_shoes", &dependents);
                Ok(Outcome::render("brand_delete", data))
            }
        }
    }

    /// Delete a brand unless shoes still reference it. A brand that is
    /// already gone counts as deleted.
    pub async fn brand_delete(
        &self,
        id: BrandId,
    ) -> Result<DeleteOutcome<Brand, Shoe>, WorkflowError> {
        let by_brand = ShoeFilter {
            brand: Some(id),
            ..ShoeFilter::default()
        };
        let (brand, dependents) = tokio::try_join!(
            self.brands.find_by_id(id),
            self.shoes.find_many(Some(&by_brand)),
        )?;
        let Some(brand) = brand else {
            return Ok(DeleteOutcome::Deleted);
        };
        if !dependents.is_empty() {
            return Ok(DeleteOutcome::Blocked {
                entity: brand,
                dependents,
            });
        }

        match self.brands.delete_by_id(id).await {
            Ok(()) => {
                tracing::info!(%id, "brand deleted");
                Ok(DeleteOutcome::Deleted)
            }
            // Deleted concurrently; the end state is what was asked for.
            Err(StoreError::NotFound) => Ok(DeleteOutcome::Deleted),
            Err(e) => Err(e.into()),
        }
    }

    /// Display brand update form on GET.
    pub async fn brand_update_get(&self, id: BrandId) -> WorkflowResult {
        let Some(brand) = self.brands.find_by_id(id).await? else {
            return Err(WorkflowError::NotFound("Brand not found".into()));
        };
        let mut data = PageData::new("Update brand");
        data.insert("brand", &brand);
        data.insert("errors", Vec::<FieldError>::new());
        Ok(Outcome::render("brand_form", data))
    }

    /// Handle brand update on POST.
    pub async fn brand_update_post(&self, id: BrandId, form: BrandForm) -> WorkflowResult {
        match self.brand_update(id, form).await? {
            UpdateOutcome::Updated(brand) => Ok(Outcome::redirect(brand.path())),
            UpdateOutcome::Invalid { draft, errors } => {
                let mut data = PageData::new("Update Brand");
                data.insert("brand", &draft);
                data.insert("errors", &errors);
                Ok(Outcome::render("brand_form", data))
            }
        }
    }

    /// Validate and replace a brand's mutable fields. The id is immutable
    /// and there is no duplicate check on update.
    pub async fn brand_update(
        &self,
        id: BrandId,
        form: BrandForm,
    ) -> Result<UpdateOutcome<Brand, BrandDraft>, WorkflowError> {
        let fields = match form.validate() {
            Validated::Valid(fields) => fields,
            Validated::Invalid { mut draft, errors } => {
                draft.id = Some(id);
                return Ok(UpdateOutcome::Invalid { draft, errors });
            }
        };

        match self.brands.update_by_id(id, fields.into_brand(id)).await {
            Ok(brand) => {
                tracing::info!(%id, "brand updated");
                Ok(UpdateOutcome::Updated(brand))
            }
            Err(StoreError::NotFound) => Err(WorkflowError::NotFound("Brand not found".into())),
            Err(e) => Err(e.into()),
        }
    }
}
