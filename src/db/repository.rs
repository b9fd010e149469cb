//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing business logic.

use crate::db::{
    DbResult,
    models::{
        Customer, CustomerQuery, Id, Item, ItemQuery, ListResult, NewCustomer, NewItem, NewReview,
        Review, ReviewQuery,
    },
};

/// Repository for Customer operations.
pub trait CustomerRepository {
    /// Create a new customer. The store assigns the id.
    async fn create(&self, customer: &NewCustomer) -> DbResult<Customer>;

    /// Get a customer by ID.
    async fn get(&self, id: Id) -> DbResult<Customer>;

    /// Get every customer whose id is in `ids`. Unknown ids are skipped.
    async fn get_many(&self, ids: &[Id]) -> DbResult<Vec<Customer>>;

    /// List customers with optional filtering, sorting, and pagination.
    async fn list(&self, query: Option<&CustomerQuery>) -> DbResult<ListResult<Customer>>;

    /// Update an existing customer's name.
    async fn update(&self, customer: &Customer) -> DbResult<()>;

    /// Delete a customer by ID, honouring the store's delete policy.
    async fn delete(&self, id: Id) -> DbResult<()>;

    /// Reviews written by the customer, oldest first.
    async fn reviews(&self, customer_id: Id) -> DbResult<Vec<Review>>;

    /// Items reached through the customer's reviews, in review order.
    async fn items(&self, customer_id: Id) -> DbResult<Vec<Item>>;

    /// Link the customer to an item by creating a review in one transaction.
    async fn add_item_review(
        &self,
        customer_id: Id,
        item_id: Id,
        comment: Option<&str>,
    ) -> DbResult<Review>;
}

/// Repository for Item operations.
pub trait ItemRepository {
    /// Create a new item. The store assigns the id.
    async fn create(&self, item: &NewItem) -> DbResult<Item>;

    /// Get an item by ID.
    async fn get(&self, id: Id) -> DbResult<Item>;

    /// Get every item whose id is in `ids`. Unknown ids are skipped.
    async fn get_many(&self, ids: &[Id]) -> DbResult<Vec<Item>>;

    /// List items with optional filtering, sorting, and pagination.
    async fn list(&self, query: Option<&ItemQuery>) -> DbResult<ListResult<Item>>;

    /// Update an existing item's name and price.
    async fn update(&self, item: &Item) -> DbResult<()>;

    /// Delete an item by ID, honouring the store's delete policy.
    async fn delete(&self, id: Id) -> DbResult<()>;

    /// Reviews of the item, oldest first.
    async fn reviews(&self, item_id: Id) -> DbResult<Vec<Review>>;
}

/// Repository for Review operations.
pub trait ReviewRepository {
    /// Create a review. Both referenced rows must exist.
    async fn create(&self, review: &NewReview) -> DbResult<Review>;

    /// Get a review by ID.
    async fn get(&self, id: Id) -> DbResult<Review>;

    /// Get every review whose id is in `ids`. Unknown ids are skipped.
    async fn get_many(&self, ids: &[Id]) -> DbResult<Vec<Review>>;

    /// List reviews with optional filtering, sorting, and pagination.
    async fn list(&self, query: Option<&ReviewQuery>) -> DbResult<ListResult<Review>>;

    /// All reviews written by any of the given customers.
    async fn list_by_customers(&self, customer_ids: &[Id]) -> DbResult<Vec<Review>>;

    /// All reviews of any of the given items.
    async fn list_by_items(&self, item_ids: &[Id]) -> DbResult<Vec<Review>>;

    /// The customer who wrote the review.
    async fn customer(&self, review_id: Id) -> DbResult<Customer>;

    /// The item the review is about.
    async fn item(&self, review_id: Id) -> DbResult<Item>;

    /// Update a review's comment. The linked customer and item are fixed.
    async fn update(&self, review: &Review) -> DbResult<()>;

    /// Delete a review by ID.
    async fn delete(&self, id: Id) -> DbResult<()>;
}

/// Combined database interface.
pub trait Database: Send + Sync {
    type Customers<'a>: CustomerRepository
    where
        Self: 'a;
    type Items<'a>: ItemRepository
    where
        Self: 'a;
    type Reviews<'a>: ReviewRepository
    where
        Self: 'a;

    /// Create the schema if it is not present yet.
    async fn migrate(&self) -> DbResult<()>;

    /// Get the customer repository.
    fn customers(&self) -> Self::Customers<'_>;

    /// Get the item repository.
    fn items(&self) -> Self::Items<'_>;

    /// Get the review repository.
    fn reviews(&self) -> Self::Reviews<'_>;
}
