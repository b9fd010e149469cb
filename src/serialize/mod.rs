//! Conversion of entities into plain JSON records.
//!
//! Customer, Item and Review reference each other in a cycle, so each kind
//! declares exclusion rules for the backlinks it must not re-emit (see
//! [`rules::default_rules`]). Serialization runs in three steps:
//!
//! 1. [`Plan::build`] walks the schema depth-first from the root kind,
//!    applying rules by dotted path and refusing to follow any relationship
//!    twice along one path.
//! 2. [`Snapshot::load`] fetches exactly the rows the plan reaches.
//! 3. [`render`] emits the JSON tree.

mod plan;
mod render;
mod rules;
mod snapshot;


pub use plan::{Plan, PlanEdge};
pub use render::render;
pub use rules::{ExclusionRules, default_rules};
pub use snapshot::Snapshot;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::db::schema::EntityKind;
use crate::db::{
    CustomerQuery, CustomerRepository, Database, DbResult, Id, ItemQuery, ItemRepository,
    ReviewQuery, ReviewRepository,
};

/// Serializes entities stored in `D`.
pub struct Serializer<'a, D: Database> {
    db: &'a D,
}

impl<'a, D: Database> Serializer<'a, D> {
    pub fn new(db: &'a D) -> Self {
        Self { db }
    }

    pub async fn customer(&self, id: Id) -> DbResult<Value> {
        self.customer_with(id, &ExclusionRules::new()).await
    }

    #[instrument(skip(self))]
    pub async fn customer_with(&self, id: Id, rules: &ExclusionRules) -> DbResult<Value> {
        self.db.customers().get(id).await?;
        self.one(EntityKind::Customer, id, rules).await
    }

    pub async fn item(&self, id: Id) -> DbResult<Value> {
        self.item_with(id, &ExclusionRules::new()).await
    }

    #[instrument(skip(self))]
    pub async fn item_with(&self, id: Id, rules: &ExclusionRules) -> DbResult<Value> {
        self.db.items().get(id).await?;
        self.one(EntityKind::Item, id, rules).await
    }

    pub async fn review(&self, id: Id) -> DbResult<Value> {
        self.review_with(id, &ExclusionRules::new()).await
    }

    #[instrument(skip(self))]
    pub async fn review_with(&self, id: Id, rules: &ExclusionRules) -> DbResult<Value> {
        self.db.reviews().get(id).await?;
        self.one(EntityKind::Review, id, rules).await
    }

    /// Serialize one page of customers.
    #[instrument(skip(self))]
    pub async fn customers(
        &self,
        query: Option<&CustomerQuery>,
        rules: &ExclusionRules,
    ) -> DbResult<Vec<Value>> {
        let page = self.db.customers().list(query).await?;
        let ids: Vec<Id> = page.items.iter().map(|c| c.id).collect();
        self.many(EntityKind::Customer, &ids, rules).await
    }

    /// Serialize one page of items.
    #[instrument(skip(self))]
    pub async fn items(
        &self,
        query: Option<&ItemQuery>,
        rules: &ExclusionRules,
    ) -> DbResult<Vec<Value>> {
        let page = self.db.items().list(query).await?;
        let ids: Vec<Id> = page.items.iter().map(|i| i.id).collect();
        self.many(EntityKind::Item, &ids, rules).await
    }

    /// Serialize one page of reviews.
    #[instrument(skip(self))]
    pub async fn reviews(
        &self,
        query: Option<&ReviewQuery>,
        rules: &ExclusionRules,
    ) -> DbResult<Vec<Value>> {
        let page = self.db.reviews().list(query).await?;
        let ids: Vec<Id> = page.items.iter().map(|r| r.id).collect();
        self.many(EntityKind::Review, &ids, rules).await
    }

    async fn one(&self, kind: EntityKind, id: Id, rules: &ExclusionRules) -> DbResult<Value> {
        let mut values = self.many(kind, &[id], rules).await?;
        Ok(values.pop().unwrap_or(Value::Null))
    }

    /// Serialize rows of `kind` in the order of `ids`. Unknown ids render as `null`.
    pub async fn many(
        &self,
        kind: EntityKind,
        ids: &[Id],
        rules: &ExclusionRules,
    ) -> DbResult<Vec<Value>> {
        let plan = Plan::build(kind, rules);
        debug!(
            kind = kind.label(),
            roots = ids.len(),
            depth = plan.depth(),
            "serializing"
        );

        let snapshot = Snapshot::load(self.db, &plan, ids).await?;
        Ok(ids.iter().map(|id| render(&plan, *id, &snapshot)).collect())
    }
}
