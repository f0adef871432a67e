//! Entity contracts
//!
//! The row-materializer and relation contracts consumed by Find/Get and the
//! preload engine. Both are explicit, per-type trait implementations resolved
//! at compile time: an entity declares its column list, how to build itself
//! from a result row, and name-keyed accessors for each of its relations.

use std::any::Any;
use std::fmt::Debug;

use serde_json::Value;

use crate::backends::DatabaseRow;
use crate::error::{OrmError, OrmResult};

/// Core trait for database entities.
pub trait Model: Debug + Clone + Send + Sync + 'static {
    /// Table name for this entity type
    fn table_name() -> &'static str;

    /// Fixed, ordered list of columns this entity scans from
    fn columns() -> &'static [&'static str];

    /// Materialize an entity from a result row
    fn from_row(row: &dyn DatabaseRow) -> OrmResult<Self>
    where
        Self: Sized;
}

/// Whether a relation associates at most one, or arbitrarily many, child
/// entities with a parent. Fixed per relation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// 0 or 1 related entity, held in an `Option`
    ToOne,
    /// 0..N related entities, held in a `Vec`
    ToMany,
}

impl RelationKind {
    /// Returns true if this relation holds a collection.
    pub fn is_collection(self) -> bool {
        matches!(self, RelationKind::ToMany)
    }
}

/// Describes one named relation: the target table, the column on the target
/// that correlates back to parents, the cardinality, and how to materialize
/// fetched child rows.
#[derive(Debug, Clone)]
pub struct RelationDescriptor {
    pub table: &'static str,
    pub column: &'static str,
    pub kind: RelationKind,
    pub columns: &'static [&'static str],
    from_row: fn(&dyn DatabaseRow) -> OrmResult<Box<dyn Relatable>>,
}

impl RelationDescriptor {
    /// Descriptor for a relation holding at most one `C`.
    pub fn to_one<C: Model + Relatable>(table: &'static str, column: &'static str) -> Self {
        Self {
            table,
            column,
            kind: RelationKind::ToOne,
            columns: C::columns(),
            from_row: materialize::<C>,
        }
    }

    /// Descriptor for a relation holding a list of `C`.
    pub fn to_many<C: Model + Relatable>(table: &'static str, column: &'static str) -> Self {
        Self {
            table,
            column,
            kind: RelationKind::ToMany,
            columns: C::columns(),
            from_row: materialize::<C>,
        }
    }

    pub(crate) fn materialize(&self, row: &dyn DatabaseRow) -> OrmResult<Box<dyn Relatable>> {
        (self.from_row)(row)
    }
}

fn materialize<C: Model + Relatable>(row: &dyn DatabaseRow) -> OrmResult<Box<dyn Relatable>> {
    Ok(Box::new(C::from_row(row)?))
}

/// Name-keyed relation accessors consumed by the preload engine.
///
/// The engine walks a dotted path segment by segment; at each segment it asks
/// the current working set for the relation descriptor, collects `key_value`s
/// to batch into one `IN` lookup, correlates fetched children back through
/// `match_value`, and writes batches in via `attach`. `loaded_mut` then
/// exposes the attached children as the next segment's working set.
pub trait Relatable: Send + 'static {
    /// Descriptor for a named relation on this entity type
    fn relation(&self, name: &str) -> OrmResult<RelationDescriptor>;

    /// The value this entity binds into the batched lookup for `name`;
    /// `Null` means the relation is absent and the entity is skipped
    fn key_value(&self, name: &str) -> OrmResult<Value>;

    /// This entity's own value for `column`, used to correlate it back to
    /// parents when it was fetched as a child
    fn match_value(&self, column: &str) -> OrmResult<Value>;

    /// Assign a fetched batch onto the relation field; a `ToOne` relation
    /// keeps the first entity, a `ToMany` relation the whole list
    fn attach(&mut self, name: &str, batch: Vec<Box<dyn Relatable>>) -> OrmResult<()>;

    /// Mutable view of the currently-attached children for `name`
    fn loaded_mut(&mut self, name: &str) -> OrmResult<Vec<&mut dyn Relatable>>;

    /// Owned copy of this entity behind the trait object
    fn clone_boxed(&self) -> Box<dyn Relatable>;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Downcasts a fetched batch to the concrete child type of a relation.
/// Intended for `Relatable::attach` implementations.
pub fn downcast_batch<C: Relatable>(
    name: &str,
    batch: Vec<Box<dyn Relatable>>,
) -> OrmResult<Vec<C>> {
    batch
        .into_iter()
        .map(|child| {
            child.into_any().downcast::<C>().map(|boxed| *boxed).map_err(|_| {
                OrmError::Relationship(format!(
                    "relation '{}' was given an entity of the wrong type",
                    name
                ))
            })
        })
        .collect()
}

/// The error returned by entity impls for a relation name they do not define.
pub fn unknown_relation(entity: &str, name: &str) -> OrmError {
    OrmError::Relationship(format!("{} has no relation named '{}'", entity, name))
}
