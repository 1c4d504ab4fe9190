mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Persistence interface for users, stores and ratings.
pub trait Database: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &NewUser) -> Result<i64>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Moving a user off the owner role also unassigns every store they own.
    fn update_user(&self, id: i64, address: Option<&str>, role: Role) -> Result<()>;
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn list_owners(&self) -> Result<Vec<OwnerSummary>>;
    fn has_admin(&self) -> Result<bool>;

    // Store operations
    fn create_store(&self, store: &NewStore) -> Result<i64>;
    fn get_store(&self, id: i64) -> Result<Option<Store>>;
    fn list_stores(&self) -> Result<Vec<Store>>;
    fn update_store(&self, id: i64, store: &NewStore) -> Result<()>;
    fn delete_store(&self, id: i64) -> Result<bool>;

    // Rating aggregates (computed per query, never cached)
    fn list_stores_with_rating(&self) -> Result<Vec<StoreWithRating>>;
    fn get_store_with_rating(&self, id: i64) -> Result<Option<StoreWithRating>>;
    fn list_store_ratings(&self, store_id: i64) -> Result<Vec<StoreRating>>;
    fn list_owner_ratings(&self, owner_id: i64, limit: i64, offset: i64)
    -> Result<Vec<OwnerRating>>;
    fn count_owner_ratings(&self, owner_id: i64) -> Result<i64>;
    fn stats(&self) -> Result<PlatformStats>;

    /// Inserts the rating for (user, store) or updates the existing one in a
    /// single statement, so concurrent submissions never create two rows.
    fn upsert_rating(
        &self,
        user_id: i64,
        store_id: i64,
        stars: Stars,
        comment: &CommentUpdate,
    ) -> Result<()>;
    fn get_rating(&self, user_id: i64, store_id: i64) -> Result<Option<Rating>>;
}
