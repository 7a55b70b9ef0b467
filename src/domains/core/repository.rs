use crate::errors::DomainResult;
use crate::auth::AuthContext;
use uuid::Uuid;
use async_trait::async_trait;
use sqlx::{Transaction, Sqlite};

/// Which rows of a soft-deletable table a query may see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Rows with `deleted = 0` only. The default for every user-facing read.
    #[default]
    Visible,
    /// Every row, deleted or not
    All,
}

impl Scope {
    /// SQL predicate for this scope, `None` when the table is read unfiltered
    pub fn predicate(&self) -> Option<&'static str> {
        match self {
            Scope::Visible => Some("deleted = 0"),
            Scope::All => None,
        }
    }

    /// Conditions to start a WHERE clause from
    pub fn conditions(&self) -> Vec<&'static str> {
        self.predicate().into_iter().collect()
    }
}

/// Join conditions into a WHERE clause, empty when there are none
pub fn where_clause(conditions: &[&str]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Trait for finding entities by ID.
/// Lookups by ID are unscoped: a soft-deleted row is still found.
#[async_trait]
pub trait FindById<T> {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<T>;
}

/// The two named accessors every soft-deletable repository exposes
#[async_trait]
pub trait ScopedRepository<T: Send + 'static>: Send + Sync {
    /// Count rows in the given scope
    async fn count(&self, scope: Scope) -> DomainResult<u64>;

    /// All rows in the given scope, in insertion order
    async fn find_all(&self, scope: Scope) -> DomainResult<Vec<T>>;

    /// Default accessor, never yields a deleted row
    async fn visible(&self) -> DomainResult<Vec<T>> {
        self.find_all(Scope::Visible).await
    }

    /// Unfiltered accessor
    async fn all(&self) -> DomainResult<Vec<T>> {
        self.find_all(Scope::All).await
    }
}

/// Trait for entities that support soft deletion
#[async_trait]
pub trait SoftDeletable {
    /// Soft delete an entity by ID (standalone)
    async fn soft_delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()>;

    /// Soft delete an entity by ID within a transaction.
    /// Deleting an already deleted row is a no-op; an unknown ID is `EntityNotFound`.
    async fn soft_delete_with_tx(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_predicates() {
        assert_eq!(Scope::default(), Scope::Visible);
        assert_eq!(Scope::Visible.predicate(), Some("deleted = 0"));
        assert_eq!(Scope::All.predicate(), None);
    }

    #[test]
    fn test_where_clause() {
        assert_eq!(where_clause(&Scope::All.conditions()), "");
        assert_eq!(where_clause(&Scope::Visible.conditions()), " WHERE deleted = 0");
        assert_eq!(
            where_clause(&["deleted = 0", "created_at >= ?"]),
            " WHERE deleted = 0 AND created_at >= ?"
        );
    }
}
