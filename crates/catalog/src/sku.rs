//! SKUs, the sellable stock units of a shoe.
//!
//! A SKU pins one shoe to a color and size, with on-hand quantity and a
//! price. The (shoe, color, size) triple is the natural key.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shoestock_core::{Entity, FieldError, ShoeId, SkuId};
use shoestock_store::{CatalogEntity, EntityStore, StoreError};

use crate::Catalog;
use crate::brand::Brand;
use crate::category::Category;
use crate::outcome::{
    CreateOutcome, Outcome, PageData, UpdateOutcome, WorkflowError, WorkflowResult,
};
use crate::shoe::Shoe;
use crate::validate::{self, Validated};

/// A stock-keeping unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub id: SkuId,
    pub shoe: ShoeId,
    pub color: String,
    pub size: u32,
    pub qty: u32,
    pub price: Decimal,
}

impl Entity for Sku {
    type Id = SkuId;

    fn id(&self) -> SkuId {
        self.id
    }

    fn path(&self) -> String {
        format!("/inventory/sku/{}", self.id)
    }
}

/// Equality filter over SKU fields. `in_stock` filters on whether
/// quantity is above zero.
#[derive(Debug, Clone, Default)]
pub struct SkuFilter {
    pub shoe: Option<ShoeId>,
    pub color: Option<String>,
    pub size: Option<u32>,
    pub in_stock: Option<bool>,
}

impl CatalogEntity for Sku {
    type Filter = SkuFilter;
    type Key = (ShoeId, String, u32);

    fn natural_key(&self) -> (ShoeId, String, u32) {
        (self.shoe, self.color.clone(), self.size)
    }

    fn matches(&self, filter: &SkuFilter) -> bool {
        filter.shoe.is_none_or(|shoe| self.shoe == shoe)
            && filter
                .color
                .as_deref()
                .is_none_or(|color| self.color == color)
            && filter.size.is_none_or(|size| self.size == size)
            && filter
                .in_stock
                .is_none_or(|in_stock| (self.qty > 0) == in_stock)
    }

    // SKUs list in insertion order.
    fn list_order(_: &Self, _: &Self) -> Ordering {
        Ordering::Equal
    }
}

/// A SKU with its shoe resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuView {
    pub sku: Sku,
    pub shoe: Option<Shoe>,
}

/// Submitted SKU form fields. The shoe arrives as an id string from a
/// select control; size, qty and price arrive as raw text.
#[derive(Debug, Clone, Default)]
pub struct SkuForm {
    pub shoe: String,
    pub color: String,
    pub size: String,
    pub qty: String,
    pub price: String,
}

/// Sanitized-but-unsaved SKU values, kept for redisplay. Numeric fields
/// stay as submitted text so a failed parse is echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkuDraft {
    pub id: Option<SkuId>,
    pub shoe: Option<ShoeId>,
    pub color: String,
    pub size: String,
    pub qty: String,
    pub price: String,
}

struct SkuFields {
    shoe: ShoeId,
    color: String,
    size: u32,
    qty: u32,
    price: Decimal,
}

impl SkuForm {
    fn validate(&self) -> Validated<SkuFields, SkuDraft> {
        let mut errors = Vec::new();
        let color = validate::sanitize(&self.color);

        let shoe = match ShoeId::from_str(self.shoe.trim()) {
            Ok(shoe) => Some(shoe),
            Err(_) => {
                errors.push(FieldError::new("shoe", "A shoe must be selected"));
                None
            }
        };
        // Length rule applies to the raw input; escaping inflates it.
        if self.color.trim().chars().count() < 3 {
            errors.push(FieldError::new(
                "color",
                "Color must have 3 characters or more",
            ));
        }
        let size = validate::int_in_range(self.size.trim(), 1, 99);
        if size.is_none() {
            errors.push(FieldError::new("size", "Size must be an integer"));
        }
        // A blank quantity means none on hand.
        let qty = match self.qty.trim() {
            "" => Some(0),
            raw => raw.parse::<u32>().ok(),
        };
        if qty.is_none() {
            errors.push(FieldError::new("qty", "Quantity must be an integer"));
        }
        let price = validate::non_negative_decimal(self.price.trim());
        if price.is_none() {
            errors.push(FieldError::new("price", "Price must be a float"));
        }

        match (shoe, size, qty, price) {
            (Some(shoe), Some(size), Some(qty), Some(price)) if errors.is_empty() => {
                Validated::Valid(SkuFields {
                    shoe,
                    color,
                    size,
                    qty,
                    price,
                })
            }
            _ => Validated::Invalid {
                draft: SkuDraft {
                    id: None,
                    shoe,
                    color,
                    size: validate::sanitize(&self.size),
                    qty: validate::sanitize(&self.qty),
                    price: validate::sanitize(&self.price),
                },
                errors,
            },
        }
    }
}

impl SkuFields {
    fn into_sku(self, id: SkuId) -> Sku {
        Sku {
            id,
            shoe: self.shoe,
            color: self.color,
            size: self.size,
            qty: self.qty,
            price: self.price,
        }
    }

    fn into_draft(self, id: Option<SkuId>) -> SkuDraft {
        SkuDraft {
            id,
            shoe: Some(self.shoe),
            color: self.color,
            size: self.size.to_string(),
            qty: self.qty.to_string(),
            price: self.price.to_string(),
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
    /// Resolve shoe references for a batch of SKUs.
    async fn populate_skus(&self, skus: Vec<Sku>) -> Result<Vec<SkuView>, WorkflowError> {
        let mut views = Vec::with_capacity(skus.len());
        for sku in skus {
            let shoe = self.shoes.find_by_id(sku.shoe).await?;
            views.push(SkuView { sku, shoe });
        }
        Ok(views)
    }

    /// Shoe choices for the SKU form, ordered by brand name then shoe name,
    /// case-insensitively.
    async fn sku_shoe_choices(&self) -> Result<Vec<crate::shoe::ShoeView>, WorkflowError> {
        let shoes = self.shoes.find_many(None).await?;
        let mut views = self.populate_shoes(shoes).await?;
        views.sort_by(|a, b| {
            let brand = |v: &crate::shoe::ShoeView| {
                v.brand
                    .as_ref()
                    .map(|b| b.name.to_uppercase())
                    .unwrap_or_default()
            };
            brand(a)
                .cmp(&brand(b))
                .then_with(|| a.shoe.name.to_uppercase().cmp(&b.shoe.name.to_uppercase()))
        });
        Ok(views)
    }

    /// Display list of all SKUs with their shoes resolved.
    pub async fn sku_list(&self) -> WorkflowResult {
        let skus = self.skus.find_many(None).await?;
        let skus = self.populate_skus(skus).await?;
        let mut data = PageData::new("SKU List");
        data.insert("sku_list", &skus);
        Ok(Outcome::render("sku_list", data))
    }

    /// Display detail page for a specific SKU.
    pub async fn sku_detail(&self, id: SkuId) -> WorkflowResult {
        let Some(sku) = self.skus.find_by_id(id).await? else {
            return Err(WorkflowError::NotFound("SKU not found".into()));
        };
        let shoe = self.shoes.find_by_id(sku.shoe).await?;

        let mut data = PageData::new("SKU");
        data.insert("sku", &SkuView { sku, shoe });
        Ok(Outcome::render("sku_detail", data))
    }

    /// Display SKU create form on GET, offering every shoe.
    pub async fn sku_create_get(&self) -> WorkflowResult {
        let shoe_list = self.sku_shoe_choices().await?;
        let mut data = PageData::new("Create SKU");
        data.insert("sku", Value::Null);
        data.insert("shoe_list", &shoe_list);
        data.insert("errors", Vec::<FieldError>::new());
        Ok(Outcome::render("sku_form", data))
    }

    /// Handle SKU create on POST.
    pub async fn sku_create_post(&self, form: SkuForm) -> WorkflowResult {
        match self.sku_create(form).await? {
            CreateOutcome::Created(sku) | CreateOutcome::Existing(sku) => {
                Ok(Outcome::redirect(sku.path()))
            }
            CreateOutcome::Invalid { draft, errors } => {
                let shoe_list = self.sku_shoe_choices().await?;
                let mut data = PageData::new("Create SKU");
                data.insert("sku", &draft);
                data.insert("shoe_list", &shoe_list);
                data.insert("errors", &errors);
                Ok(Outcome::render("sku_form", data))
            }
        }
    }

    /// Validate and create a SKU. The (shoe, color, size) triple is the
    /// natural key; the shoe reference must resolve before writing.
    pub async fn sku_create(
        &self,
        form: SkuForm,
    ) -> Result<CreateOutcome<Sku, SkuDraft>, WorkflowError> {
        let fields = match form.validate() {
            Validated::Valid(fields) => fields,
            Validated::Invalid { draft, errors } => {
                return Ok(CreateOutcome::Invalid { draft, errors });
            }
        };
        if self.shoes.find_by_id(fields.shoe).await?.is_none() {
            return Ok(CreateOutcome::Invalid {
                draft: fields.into_draft(None),
                errors: vec![FieldError::new("shoe", "Unknown shoe")],
            });
        }

        let same_unit = SkuFilter {
            shoe: Some(fields.shoe),
            color: Some(fields.color.clone()),
            size: Some(fields.size),
            in_stock: None,
        };
        if let Some(existing) = self.skus.find_one(&same_unit).await? {
            return Ok(CreateOutcome::Existing(existing));
        }

        match self.skus.insert(fields.into_sku(SkuId::new())).await {
            Ok(sku) => {
                tracing::info!(
                    id = %sku.id,
                    shoe = %sku.shoe,
                    color = %sku.color,
                    size = sku.size,
                    "sku created"
                );
                Ok(CreateOutcome::Created(sku))
            }
            Err(StoreError::UniqueViolation { existing }) => {
                match self.skus.find_by_id(existing.into()).await? {
                    Some(sku) => Ok(CreateOutcome::Existing(sku)),
                    None => Err(WorkflowError::NotFound("SKU not found".into())),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Display SKU delete confirmation on GET. SKUs have no dependents, so
    /// this only confirms.
    pub async fn sku_delete_get(&self, id: SkuId) -> WorkflowResult {
        let Some(sku) = self.skus.find_by_id(id).await? else {
            return Ok(Outcome::redirect("/inventory/skus"));
        };
        let shoe = self.shoes.find_by_id(sku.shoe).await?;

        let mut data = PageData::new("Delete SKU");
        data.insert("sku", &SkuView { sku, shoe });
        Ok(Outcome::render("sku_delete", data))
    }

    /// Handle SKU delete on POST.
    pub async fn sku_delete_post(&self, id: SkuId) -> WorkflowResult {
        self.sku_delete(id).await?;
        Ok(Outcome::redirect("/inventory/skus"))
    }

    /// Delete a SKU unconditionally. Nothing references SKUs, and a SKU
    /// that is already gone counts as deleted.
    pub async fn sku_delete(&self, id: SkuId) -> Result<(), WorkflowError> {
        match self.skus.delete_by_id(id).await {
            Ok(()) => {
                tracing::info!(%id, "sku deleted");
                Ok(())
            }
            Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Display SKU update form on GET. The shoe selection is pinned to the
    /// SKU's current shoe.
    pub async fn sku_update_get(&self, id: SkuId) -> WorkflowResult {
        let Some(sku) = self.skus.find_by_id(id).await? else {
            return Err(WorkflowError::NotFound("SKU not found".into()));
        };
        let shoe = self.shoes.find_by_id(sku.shoe).await?;
        let shoe_list = match &shoe {
            Some(shoe) => self.populate_shoes(vec![shoe.clone()]).await?,
            None => Vec::new(),
        };

        let mut data = PageData::new("Update SKU");
        data.insert("sku", &sku);
        data.insert("selected_shoe", &shoe);
        data.insert("shoe_list", &shoe_list);
        data.insert("errors", Vec::<FieldError>::new());
        Ok(Outcome::render("sku_form", data))
    }

    /// Handle SKU update on POST.
    pub async fn sku_update_post(&self, id: SkuId, form: SkuForm) -> WorkflowResult {
        match self.sku_update(id, form).await? {
            UpdateOutcome::Updated(sku) => Ok(Outcome::redirect(sku.path())),
            UpdateOutcome::Invalid { draft, errors } => {
                // The update form stays pinned to the submitted shoe, as on
                // the GET path.
                let shoe = match draft.shoe {
                    Some(shoe_id) => self.shoes.find_by_id(shoe_id).await?,
                    None => None,
                };
                let shoe_list = match &shoe {
                    Some(shoe) => self.populate_shoes(vec![shoe.clone()]).await?,
                    None => Vec::new(),
                };
                let mut data = PageData::new("Update SKU");
                data.insert("sku", &draft);
                data.insert("selected_shoe", &shoe);
                data.insert("shoe_list", &shoe_list);
                data.insert("errors", &errors);
                Ok(Outcome::render("sku_form", data))
            }
        }
    }

    /// Validate and replace a SKU's mutable fields. The shoe reference must
    /// resolve, as on create.
    pub async fn sku_update(
        &self,
        id: SkuId,
        form: SkuForm,
    ) -> Result<UpdateOutcome<Sku, SkuDraft>, WorkflowError> {
        let fields = match form.validate() {
            Validated::Valid(fields) => fields,
            Validated::Invalid { mut draft, errors } => {
                draft.id = Some(id);
                return Ok(UpdateOutcome::Invalid { draft, errors });
            }
        };
        if self.shoes.find_by_id(fields.shoe).await?.is_none() {
            return Ok(UpdateOutcome::Invalid {
                draft: fields.into_draft(Some(id)),
                errors: vec![FieldError::new("shoe", "Unknown shoe")],
            });
        }

        match self.skus.update_by_id(id, fields.into_sku(id)).await {
            Ok(sku) => {
                tracing::info!(%id, "sku updated");
                Ok(UpdateOutcome::Updated(sku))
            }
            Err(StoreError::NotFound) => Err(WorkflowError::NotFound("SKU not found".into())),
            Err(e) => Err(e.into()),
        }
    }
}
