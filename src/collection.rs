//! One page of a cursor-paginated listing.

use crate::capability::{Cursor, Entity};
use crate::error::{json_type, SchemaError};
use crate::field::Field;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::ops::Deref;

const TOTAL_COUNT: Field = Field::integer("total_count");

/// A page of entities plus the size of the whole collection.
///
/// Dereferences to a slice of the entities, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<E> {
    items: Vec<E>,
    total_count: u64,
    last_modified: Option<NaiveDateTime>,
}

impl<E: Entity> Collection<E> {
    /// Reads a listing payload: the `key` array of entities and
    /// `total_count`. Every entity is stamped with `last_modified`.
    ///
    /// A page never holds more entities than `total_count`.
    pub(crate) fn from_payload(
        payload: &Value,
        key: &'static str,
        last_modified: Option<NaiveDateTime>,
    ) -> Result<Self, SchemaError> {
        let object = payload.as_object().ok_or(SchemaError::NotAnObject {
            entity: key,
            actual: json_type(payload),
        })?;

        let items: Vec<E> = Field::nested_list(key, E::schema)
            .decode(object)?
            .ok_or(SchemaError::MissingField { field: key })?;
        let total_count: u64 = TOTAL_COUNT
            .decode(object)?
            .ok_or(SchemaError::MissingField {
                field: TOTAL_COUNT.name(),
            })?;

        if items.len() as u64 > total_count {
            return Err(SchemaError::PageExceedsTotal {
                field: TOTAL_COUNT.name(),
                len: items.len(),
                total_count,
            });
        }

        Ok(Self {
            items: items
                .into_iter()
                .map(|item| item.with_last_modified(last_modified))
                .collect(),
            total_count,
            last_modified,
        })
    }

    /// A cursor pointing past the last entity of this page.
    pub fn next_cursor(&self) -> Option<Cursor<'_, E>> {
        self.items.last().map(Cursor::Entity)
    }
}

impl<E> Collection<E> {
    /// The entities in this page.
    pub fn items(&self) -> &[E] {
        &self.items
    }

    /// Consumes the page, returning its entities.
    pub fn into_items(self) -> Vec<E> {
        self.items
    }

    /// The size of the whole collection, not of this page.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// The `Last-Modified` value of the response.
    pub fn last_modified(&self) -> Option<NaiveDateTime> {
        self.last_modified
    }
}

impl<E> Deref for Collection<E> {
    type Target = [E];

    fn deref(&self) -> &[E] {
        &self.items
    }
}

impl<E> IntoIterator for Collection<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a Collection<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
