//! Workflow results handed to the presentation layer.
//!
//! Every boundary operation resolves to a discriminated [`Outcome`] —
//! render a named view with a data bag, or redirect to a canonical display
//! path — instead of branching ad hoc inside each handler.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use shoestock_core::FieldError;
use shoestock_store::StoreError;

/// Data bag for a rendered view. Always carries a `title`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    title: String,
    bag: Map<String, Value>,
}

impl PageData {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bag: Map::new(),
        }
    }

    /// Insert a serializable payload under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.bag.insert(key.into(), value);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.bag.get(key)
    }

    /// Flatten into a single JSON object, `title` included.
    pub fn into_value(self) -> Value {
        let mut bag = self.bag;
        bag.insert("title".into(), Value::String(self.title));
        Value::Object(bag)
    }
}

/// Discriminated workflow result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Hand `data` to the rendering collaborator under the named view.
    Render {
        view: &'static str,
        data: PageData,
    },
    /// Send the caller to a canonical display path.
    Redirect { location: String },
}

impl Outcome {
    pub fn render(view: &'static str, data: PageData) -> Self {
        Outcome::Render { view, data }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Outcome::Redirect {
            location: location.into(),
        }
    }
}

/// Failure of a boundary operation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The requested entity does not exist; the 404-equivalent signal.
    #[error("{0}")]
    NotFound(String),

    /// Storage failure; fatal for this operation, propagated unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type WorkflowResult = Result<Outcome, WorkflowError>;

/// Result of a validated create.
///
/// A natural-key duplicate is a no-op success: the second submission
/// resolves to the first record's identity and nothing is inserted.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome<E, D> {
    Created(E),
    Existing(E),
    Invalid {
        draft: D,
        errors: Vec<FieldError>,
    },
}

/// Result of a validated update. There is deliberately no duplicate check
/// on update, unlike create.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<E, D> {
    Updated(E),
    Invalid {
        draft: D,
        errors: Vec<FieldError>,
    },
}

/// Result of a guarded delete. A blocked delete surfaces the dependents so
/// the caller can present them; nothing is cascaded or silently dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome<E, D> {
    Deleted,
    Blocked {
        entity: E,
        dependents: Vec<D>,
    },
}
