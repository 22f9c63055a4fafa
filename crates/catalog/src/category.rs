//! Categories, the gender/style pairing a shoe is filed under.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use shoestock_core::{CategoryId, Entity, FieldError};
use shoestock_store::{CatalogEntity, EntityStore, StoreError};

use crate::Catalog;
use crate::brand::Brand;
use crate::outcome::{
    CreateOutcome, DeleteOutcome, Outcome, PageData, UpdateOutcome, WorkflowError, WorkflowResult,
};
use crate::shoe::{Shoe, ShoeFilter};
use crate::sku::Sku;
use crate::validate::{self, Validated};

/// Audience a category targets. Declared in lexical order so the derived
/// `Ord` matches alphabetical listing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Kids,
    Mens,
    #[default]
    Unisex,
    Womens,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Kids => "kids",
            Gender::Mens => "mens",
            Gender::Unisex => "unisex",
            Gender::Womens => "womens",
        }
    }

    /// Parse a submitted gender. Blank means unspecified and defaults to
    /// unisex; anything else outside the set is rejected.
    fn parse(raw: &str) -> Result<Gender, FieldError> {
        match raw.trim() {
            "" => Ok(Gender::default()),
            "kids" => Ok(Gender::Kids),
            "mens" => Ok(Gender::Mens),
            "unisex" => Ok(Gender::Unisex),
            "womens" => Ok(Gender::Womens),
            _ => Err(FieldError::new(
                "gender",
                "Gender must be one of: mens, womens, kids, unisex",
            )),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub gender: Gender,
    pub style: String,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }

    fn path(&self) -> String {
        format!("/inventory/category/{}", self.id)
    }
}

/// Equality filter over category fields.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub gender: Option<Gender>,
    pub style: Option<String>,
}

impl CatalogEntity for Category {
    type Filter = CategoryFilter;
    type Key = (Gender, String);

    fn natural_key(&self) -> (Gender, String) {
        (self.gender, self.style.clone())
    }

    fn matches(&self, filter: &CategoryFilter) -> bool {
        filter.gender.is_none_or(|gender| self.gender == gender)
            && filter
                .style
                .as_deref()
                .is_none_or(|style| self.style == style)
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.gender.cmp(&b.gender).then_with(|| a.style.cmp(&b.style))
    }
}

/// Submitted category form fields.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub gender: String,
    pub style: String,
}

/// Sanitized-but-unsaved category values, kept for redisplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDraft {
    pub id: Option<CategoryId>,
    pub gender: String,
    pub style: String,
}

struct CategoryFields {
    gender: Gender,
    style: String,
}

impl CategoryForm {
    fn validate(&self) -> Validated<CategoryFields, CategoryDraft> {
        let mut errors = Vec::new();
        let style = validate::sanitize(&self.style);

        let gender = match Gender::parse(&self.gender) {
            Ok(gender) => Some(gender),
            Err(e) => {
                errors.push(e);
                None
            }
        };
        if style.is_empty() {
            errors.push(FieldError::new("style", "Style must be specified"));
        }

        match gender {
            Some(gender) if errors.is_empty() => Validated::Valid(CategoryFields { gender, style }),
            _ => Validated::Invalid {
                draft: CategoryDraft {
                    id: None,
                    gender: validate::sanitize(&self.gender),
                    style,
                },
                errors,
            },
        }
    }
}

impl CategoryFields {
    fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            gender: self.gender,
            style: self.style,
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
    /// Display list of all categories, ordered by gender then style.
    pub async fn category_list(&self) -> WorkflowResult {
        let categories = self.categories.find_many(None).await?;
        let mut data = PageData::new("Category List");
        data.insert("category_list", &categories);
        Ok(Outcome::render("category_list", data))
    }

    /// Display detail page for a specific category, with its shoes.
    pub async fn category_detail(&self, id: CategoryId) -> WorkflowResult {
        let by_category = ShoeFilter {
            category: Some(id),
            ..ShoeFilter::default()
        };
        let (category, shoes) = tokio::try_join!(
            self.categories.find_by_id(id),
            self.shoes.find_many(Some(&by_category)),
        )?;
        let Some(category) = category else {
            return Err(WorkflowError::NotFound("Category not found".into()));
        };
        let shoes = self.populate_shoes(shoes).await?;

        let mut data = PageData::new("Category Detail");
        data.insert("category", &category);
        data.insert("category_shoes", &shoes);
        Ok(Outcome::render("category_detail", data))
    }

    /// Genders currently in use, for the form's selection list.
    async fn gender_choices(&self) -> Result<Vec<Gender>, WorkflowError> {
        Ok(self.categories.distinct_values(|c| c.gender).await?)
    }

    /// Display category create form on GET, offering the genders in use.
    pub async fn category_create_get(&self) -> WorkflowResult {
        let gender_list = self.gender_choices().await?;
        let mut data = PageData::new("Create Category");
        data.insert("category", Value::Null);
        data.insert("gender_list", &gender_list);
        data.insert("errors", Vec::<FieldError>::new());
        Ok(Outcome::render("category_form", data))
    }

    /// Handle category create on POST.
    pub async fn category_create_post(&self, form: CategoryForm) -> WorkflowResult {
        match self.category_create(form).await? {
            CreateOutcome::Created(category) | CreateOutcome::Existing(category) => {
                Ok(Outcome::redirect(category.path()))
            }
            CreateOutcome::Invalid { draft, errors } => {
                let gender_list = self.gender_choices().await?;
                let mut data = PageData::new("Create Category");
                data.insert("category", &draft);
                data.insert("gender_list", &gender_list);
                data.insert("errors", &errors);
                Ok(Outcome::render("category_form", data))
            }
        }
    }

    /// Validate and create a category. The (gender, style) pair is the
    /// natural key; a duplicate resolves to the existing record.
    pub async fn category_create(
        &self,
        form: CategoryForm,
    ) -> Result<CreateOutcome<Category, CategoryDraft>, WorkflowError> {
        let fields = match form.validate() {
            Validated::Valid(fields) => fields,
            Validated::Invalid { draft, errors } => {
                return Ok(CreateOutcome::Invalid { draft, errors });
            }
        };

        let same_pair = CategoryFilter {
            gender: Some(fields.gender),
            style: Some(fields.style.clone()),
        };
        if let Some(existing) = self.categories.find_one(&same_pair).await? {
            return Ok(CreateOutcome::Existing(existing));
        }

        match self
            .categories
            .insert(fields.into_category(CategoryId::new()))
            .await
        {
            Ok(category) => {
                tracing::info!(
                    id = %category.id,
                    gender = %category.gender,
                    style = %category.style,
                    "category created"
                );
                Ok(CreateOutcome::Created(category))
            }
            Err(StoreError::UniqueViolation { existing }) => {
                match self.categories.find_by_id(existing.into()).await? {
                    Some(category) => Ok(CreateOutcome::Existing(category)),
                    None => Err(WorkflowError::NotFound("Category not found".into())),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Display category delete confirmation on GET.
    pub async fn category_delete_get(&self, id: CategoryId) -> WorkflowResult {
        let by_category = ShoeFilter {
            category: Some(id),
            ..ShoeFilter::default()
        };
        let (category, shoes) = tokio::try_join!(
            self.categories.find_by_id(id),
            self.shoes.find_many(Some(&by_category)),
        )?;
        let Some(category) = category else {
            return Ok(Outcome::redirect("/inventory/categories"));
        };

        let mut data = PageData::new("Delete Category");
        data.insert("category", &category);
        data.insert("category_shoes", &shoes);
        Ok(Outcome::render("category_delete", data))
    }

    /// Handle category delete on POST.
    pub async fn category_delete_post(&self, id: CategoryId) -> WorkflowResult {
        match self.category_delete(id).await? {
            DeleteOutcome::Deleted => Ok(Outcome::redirect("/inventory/categories")),
            DeleteOutcome::Blocked { entity, dependents } => {
                let mut data = PageData::new("Delete Category");
                data.insert("category", &entity);
                data.insert("category_shoes", &dependents);
                Ok(Outcome::render("category_delete", data))
            }
        }
    }

    /// Delete a category unless shoes still reference it.
    pub async fn category_delete(
        &self,
        id: CategoryId,
    ) -> Result<DeleteOutcome<Category, Shoe>, WorkflowError> {
        let by_category = ShoeFilter {
            category: Some(id),
            ..ShoeFilter::default()
        };
        let (category, dependents) = tokio::try_join!(
            self.categories.find_by_id(id),
            self.shoes.find_many(Some(&by_category)),
        )?;
        let Some(category) = category else {
            return Ok(DeleteOutcome::Deleted);
        };
        if !dependents.is_empty() {
            return Ok(DeleteOutcome::Blocked {
                entity: category,
                dependents,
            });
        }

        match self.categories.delete_by_id(id).await {
            Ok(()) => {
                tracing::info!(%id, "category deleted");
                Ok(DeleteOutcome::Deleted)
            }
            Err(StoreError::NotFound) => Ok(DeleteOutcome::Deleted),
            Err(e) => Err(e.into()),
        }
    }

    /// Display category update form on GET.
    pub async fn category_update_get(&self, id: CategoryId) -> WorkflowResult {
        let Some(category) = self.categories.find_by_id(id).await? else {
            return Err(WorkflowError::NotFound("Category not found".into()));
        };
        let gender_list = self.gender_choices().await?;
        let mut data = PageData::new("Update Category");
        data.insert("category", &category);
        data.insert("gender_list", &gender_list);
        data.insert("errors", Vec::<FieldError>::new());
        Ok(Outcome::render("category_form", data))
    }

    /// Handle category update on POST.
    pub async fn category_update_post(&self, id: CategoryId, form: CategoryForm) -> WorkflowResult {
        match self.category_update(id, form).await? {
            UpdateOutcome::Updated(category) => Ok(Outcome::redirect(category.path())),
            UpdateOutcome::Invalid { draft, errors } => {
                let gender_list = self.gender_choices().await?;
                let mut data = PageData::new("Update Category");
                data.insert("category", &draft);
                data.insert("gender_list", &gender_list);
                data.insert("errors", &errors);
                Ok(Outcome::render("category_form", data))
            }
        }
    }

    /// Validate and replace a category's mutable fields.
    pub async fn category_update(
        &self,
        id: CategoryId,
        form: CategoryForm,
    ) -> Result<UpdateOutcome<Category, CategoryDraft>, WorkflowError> {
        let fields = match form.validate() {
            Validated::Valid(fields) => fields,
            Validated::Invalid { mut draft, errors } => {
                draft.id = Some(id);
                return Ok(UpdateOutcome::Invalid { draft, errors });
            }
        };

        match self
            .categories
            .update_by_id(id, fields.into_category(id))
            .await
        {
            Ok(category) => {
                tracing::info!(%id, "category updated");
                Ok(UpdateOutcome::Updated(category))
            }
            Err(StoreError::NotFound) => Err(WorkflowError::NotFound("Category not found".into())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryCatalog;

    fn form(gender: &str, style: &str) -> CategoryForm {
        CategoryForm {
            gender: gender.into(),
            style: style.into(),
        }
    }

    async fn created(catalog: &InMemoryCatalog, gender: &str, style: &str) -> Category {
        match catalog.category_create(form(gender, style)).await.unwrap() {
            CreateOutcome::Created(category) => category,
            other => panic!("expected Created, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_gender_defaults_to_unisex() {
        let catalog = InMemoryCatalog::in_memory();
        let category = created(&catalog, "", "skate").await;
        assert_eq!(category.gender, Gender::Unisex);
        assert_eq!(category.style, "skate");
    }

    #[tokio::test]
    async fn out_of_set_gender_is_rejected() {
        let catalog = InMemoryCatalog::in_memory();
        let outcome = catalog
            .category_create(form("martian", "boots"))
            .await
            .unwrap();
        let CreateOutcome::Invalid { draft, errors } = outcome else {
            panic!("expected Invalid");
        };
        assert_eq!(draft.gender, "martian");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "gender");
        assert_eq!(
            errors[0].message,
            "Gender must be one of: mens, womens, kids, unisex"
        );
        assert_eq!(catalog.categories.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_style_is_rejected() {
        let catalog = InMemoryCatalog::in_memory();
        let outcome = catalog.category_create(form("mens", "   ")).await.unwrap();
        let CreateOutcome::Invalid { errors, .. } = outcome else {
            panic!("expected Invalid");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Style must be specified");
    }

    #[tokio::test]
    async fn duplicate_pair_resolves_to_existing_but_other_gender_does_not() {
        let catalog = InMemoryCatalog::in_memory();
        let first = created(&catalog, "mens", "running").await;

        let dup = catalog
            .category_create(form("mens", "running"))
            .await
            .unwrap();
        let CreateOutcome::Existing(existing) = dup else {
            panic!("expected Existing");
        };
        assert_eq!(existing.id, first.id);

        let other = created(&catalog, "womens", "running").await;
        assert_ne!(other.id, first.id);
        assert_eq!(catalog.categories.count(None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_is_sorted_by_gender_then_style() {
        let catalog = InMemoryCatalog::in_memory();
        created(&catalog, "womens", "running").await;
        created(&catalog, "kids", "school").await;
        created(&catalog, "mens", "skate").await;
        created(&catalog, "mens", "running").await;

        let Outcome::Render { data, .. } = catalog.category_list().await.unwrap() else {
            panic!("expected render");
        };
        let pairs: Vec<(String, String)> = data
            .get("category_list")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|c| {
                (
                    c["gender"].as_str().unwrap().to_string(),
                    c["style"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("kids".into(), "school".into()),
                ("mens".into(), "running".into()),
                ("mens".into(), "skate".into()),
                ("womens".into(), "running".into()),
            ]
        );
    }

    #[tokio::test]
    async fn create_get_offers_the_genders_in_use() {
        let catalog = InMemoryCatalog::in_memory();
        created(&catalog, "womens", "running").await;
        created(&catalog, "mens", "running").await;
        created(&catalog, "mens", "skate").await;

        let Outcome::Render { view, data } = catalog.category_create_get().await.unwrap() else {
            panic!("expected render");
        };
        assert_eq!(view, "category_form");
        let genders: Vec<&str> = data
            .get("gender_list")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g.as_str().unwrap())
            .collect();
        assert_eq!(genders, vec!["mens", "womens"]);
    }

    #[tokio::test]
    async fn update_keeps_id_and_moves_the_pair() {
        let catalog = InMemoryCatalog::in_memory();
        let category = created(&catalog, "mens", "running").await;

        let outcome = catalog
            .category_update(category.id, form("womens", "trail"))
            .await
            .unwrap();
        let UpdateOutcome::Updated(updated) = outcome else {
            panic!("expected Updated");
        };
        assert_eq!(updated.id, category.id);
        assert_eq!(updated.gender, Gender::Womens);
        assert_eq!(updated.style, "trail");
    }
}
