//! Static description of the relational schema.
//!
//! Table and column names here must match `data/sql/sqlite`. The serializer
//! walks [`EntityKind::relations`] to discover the object graph.

/// The three persisted entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Customer,
    Item,
    Review,
}

/// How many rows sit on the far side of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// A navigable relationship from one entity kind to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Attribute name on the source entity.
    pub name: &'static str,
    pub source: EntityKind,
    pub target: EntityKind,
    pub cardinality: Cardinality,
    /// Name of the reciprocal relation on the target.
    pub back_populates: &'static str,
}

pub const CUSTOMER_REVIEWS: Relation = Relation {
    name: "reviews",
    source: EntityKind::Customer,
    target: EntityKind::Review,
    cardinality: Cardinality::Many,
    back_populates: "customer",
};

pub const ITEM_REVIEWS: Relation = Relation {
    name: "reviews",
    source: EntityKind::Item,
    target: EntityKind::Review,
    cardinality: Cardinality::Many,
    back_populates: "item",
};

pub const REVIEW_CUSTOMER: Relation = Relation {
    name: "customer",
    source: EntityKind::Review,
    target: EntityKind::Customer,
    cardinality: Cardinality::One,
    back_populates: "reviews",
};

pub const REVIEW_ITEM: Relation = Relation {
    name: "item",
    source: EntityKind::Review,
    target: EntityKind::Item,
    cardinality: Cardinality::One,
    back_populates: "reviews",
};

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Item => "items",
            EntityKind::Review => "reviews",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Customer => "Customer",
            EntityKind::Item => "Item",
            EntityKind::Review => "Review",
        }
    }

    /// Scalar columns, in declaration order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Customer => &["id", "name"],
            EntityKind::Item => &["id", "name", "price"],
            EntityKind::Review => &["id", "comment", "customer_id", "item_id"],
        }
    }

    pub fn relations(self) -> &'static [Relation] {
        match self {
            EntityKind::Customer => &[CUSTOMER_REVIEWS],
            EntityKind::Item => &[ITEM_REVIEWS],
            EntityKind::Review => &[REVIEW_CUSTOMER, REVIEW_ITEM],
        }
    }

    pub fn relation(self, name: &str) -> Option<&'static Relation> {
        self.relations().iter().find(|r| r.name == name)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A foreign key column and the table whose `id` it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub referenced_table: &'static str,
}

impl ForeignKey {
    /// Constraint name following `fk_<table>_<column>_<referenced_table>`.
    pub fn constraint_name(&self) -> String {
        format!(
            "fk_{}_{}_{}",
            self.table, self.column, self.referenced_table
        )
    }
}

pub const FOREIGN_KEYS: &[ForeignKey] = &[
    ForeignKey {
        table: "reviews",
        column: "customer_id",
        referenced_table: "customers",
    },
    ForeignKey {
        table: "reviews",
        column: "item_id",
        referenced_table: "items",
    },
];

/// Foreign keys on other tables that point at `kind`.
pub fn dependents_of(kind: EntityKind) -> impl Iterator<Item = &'static ForeignKey> {
    FOREIGN_KEYS
        .iter()
        .filter(move |fk| fk.referenced_table == kind.table())
}
