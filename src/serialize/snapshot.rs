//! In-memory copy of the rows a plan needs.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use serde_json::{Map, Value};

use super::plan::Plan;
use crate::db::schema::{EntityKind, Relation};
use crate::db::{
    Customer, CustomerRepository, Database, DbError, DbResult, Id, Item, ItemRepository, Review,
    ReviewRepository,
};

/// Rows loaded for one serialization, keyed by id.
#[derive(Debug, Default)]
pub struct Snapshot {
    customers: HashMap<Id, Customer>,
    items: HashMap<Id, Item>,
    reviews: HashMap<Id, Review>,
    customer_reviews: HashMap<Id, Vec<Id>>,
    item_reviews: HashMap<Id, Vec<Id>>,
}

impl Snapshot {
    /// Load every row reachable from `roots` along `plan`.
    ///
    /// Works level by level with one bulk query per relationship, so the
    /// number of queries is bounded by the plan, not by the data.
    pub async fn load<D: Database>(db: &D, plan: &Plan, roots: &[Id]) -> DbResult<Snapshot> {
        let mut snapshot = Snapshot::default();
        let mut queue: VecDeque<(&Plan, Vec<Id>)> = VecDeque::new();
        queue.push_back((plan, roots.to_vec()));

        while let Some((node, ids)) = queue.pop_front() {
            snapshot.ensure(db, node.kind, &ids).await?;

            for edge in &node.children {
                let next = snapshot.follow(db, edge.relation, &ids).await?;
                if !next.is_empty() {
                    queue.push_back((&edge.node, next));
                }
            }
        }

        Ok(snapshot)
    }

    pub fn insert_customer(&mut self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    pub fn insert_item(&mut self, item: Item) {
        self.items.insert(item.id, item);
    }

    pub fn insert_review(&mut self, review: Review) {
        self.reviews.insert(review.id, review);
    }

    /// Scalar fields of a loaded row as a JSON object.
    pub fn fields(&self, kind: EntityKind, id: Id) -> Option<Map<String, Value>> {
        match kind {
            EntityKind::Customer => self.customers.get(&id).and_then(to_object),
            EntityKind::Item => self.items.get(&id).and_then(to_object),
            EntityKind::Review => self.reviews.get(&id).and_then(to_object),
        }
    }

    /// Ids on the far side of `relation` from row `id`.
    pub fn related(&self, relation: &Relation, id: Id) -> Vec<Id> {
        match (relation.source, relation.target) {
            (EntityKind::Customer, EntityKind::Review) => {
                self.customer_reviews.get(&id).cloned().unwrap_or_default()
            }
            (EntityKind::Item, EntityKind::Review) => {
                self.item_reviews.get(&id).cloned().unwrap_or_default()
            }
            (EntityKind::Review, EntityKind::Customer) => self
                .reviews
                .get(&id)
                .map(|r| vec![r.customer_id])
                .unwrap_or_default(),
            (EntityKind::Review, EntityKind::Item) => self
                .reviews
                .get(&id)
                .map(|r| vec![r.item_id])
                .unwrap_or_default(),
            _ => vec![],
        }
    }

    fn contains(&self, kind: EntityKind, id: Id) -> bool {
        match kind {
            EntityKind::Customer => self.customers.contains_key(&id),
            EntityKind::Item => self.items.contains_key(&id),
            EntityKind::Review => self.reviews.contains_key(&id),
        }
    }

    async fn ensure<D: Database>(&mut self, db: &D, kind: EntityKind, ids: &[Id]) -> DbResult<()> {
        let missing: Vec<Id> = ids
            .iter()
            .copied()
            .filter(|id| !self.contains(kind, *id))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        match kind {
            EntityKind::Customer => {
                for customer in db.customers().get_many(&missing).await? {
                    self.insert_customer(customer);
                }
            }
            EntityKind::Item => {
                for item in db.items().get_many(&missing).await? {
                    self.insert_item(item);
                }
            }
            EntityKind::Review => {
                for review in db.reviews().get_many(&missing).await? {
                    self.insert_review(review);
                }
            }
        }
        Ok(())
    }

    async fn follow<D: Database>(
        &mut self,
        db: &D,
        relation: &Relation,
        ids: &[Id],
    ) -> DbResult<Vec<Id>> {
        match (relation.source, relation.target) {
            (EntityKind::Customer, EntityKind::Review) => {
                let missing: Vec<Id> = ids
                    .iter()
                    .copied()
                    .filter(|id| !self.customer_reviews.contains_key(id))
                    .collect();
                if !missing.is_empty() {
                    let reviews = db.reviews().list_by_customers(&missing).await?;
                    for id in &missing {
                        self.customer_reviews.insert(*id, Vec::new());
                    }
                    for review in reviews {
                        if let Some(list) = self.customer_reviews.get_mut(&review.customer_id) {
                            list.push(review.id);
                        }
                        self.insert_review(review);
                    }
                }
                Ok(self.collect_related(relation, ids))
            }
            (EntityKind::Item, EntityKind::Review) => {
                let missing: Vec<Id> = ids
                    .iter()
                    .copied()
                    .filter(|id| !self.item_reviews.contains_key(id))
                    .collect();
                if !missing.is_empty() {
                    let reviews = db.reviews().list_by_items(&missing).await?;
                    for id in &missing {
                        self.item_reviews.insert(*id, Vec::new());
                    }
                    for review in reviews {
                        if let Some(list) = self.item_reviews.get_mut(&review.item_id) {
                            list.push(review.id);
                        }
                        self.insert_review(review);
                    }
                }
                Ok(self.collect_related(relation, ids))
            }
            (EntityKind::Review, _) => Ok(self.collect_related(relation, ids)),
            (source, target) => Err(DbError::Validation {
                message: format!("no relationship from {} to {}", source, target),
            }),
        }
    }

    /// Related ids of every row in `ids`, deduplicated, first-seen order.
    fn collect_related(&self, relation: &Relation, ids: &[Id]) -> Vec<Id> {
        let mut seen = HashSet::new();
        ids.iter()
            .flat_map(|id| self.related(relation, *id))
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

fn to_object<T: Serialize>(value: &T) -> Option<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
