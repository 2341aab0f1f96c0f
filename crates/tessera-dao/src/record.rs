//! Name-keyed intermediate representation shared by both mapping directions.

use crate::model::{link_foreign_keys, Model};
use crate::transfer::TransferObject;
use crate::value::{FromValue, Value};
use tessera_core::{TesseraError, TesseraResult};

/// One entry of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// A scalar value.
    Value(Value),
    /// A nested object; `None` when the relationship is unset.
    Nested(Option<Record>),
}

/// Ordered set of named slots.
///
/// Field order is the order of insertion. Inserting an existing name
/// replaces the slot in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(&'static str, Slot)>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Sets a slot, replacing any slot with the same name.
    pub fn insert(&mut self, name: &'static str, slot: Slot) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = slot,
            None => self.entries.push((name, slot)),
        }
    }

    pub fn insert_value(&mut self, name: &'static str, value: impl Into<Value>) {
        self.insert(name, Slot::Value(value.into()));
    }

    pub fn insert_nested(&mut self, name: &'static str, record: Option<Record>) {
        self.insert(name, Slot::Nested(record));
    }

    /// Builder form of [`insert_value`](Self::insert_value).
    #[must_use]
    pub fn with_value(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.insert_value(name, value);
        self
    }

    /// Builder form of [`insert_nested`](Self::insert_nested).
    #[must_use]
    pub fn with_nested(mut self, name: &'static str, record: Option<Record>) -> Self {
        self.insert_nested(name, record);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, slot)| slot)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes and returns the slot with the given name.
    pub fn take(&mut self, name: &str) -> Option<Slot> {
        let index = self.entries.iter().position(|(n, _)| *n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Slot)> {
        self.entries.iter().map(|(name, slot)| (*name, slot))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Takes a required scalar field.
    pub fn take_value<T: FromValue>(&mut self, name: &str) -> TesseraResult<T> {
        match self.take(name) {
            Some(Slot::Value(value)) => T::from_value(value)
                .map_err(|e| TesseraError::mapping(format!("field '{}': {}", name, e))),
            Some(Slot::Nested(_)) => Err(TesseraError::mapping(format!(
                "field '{}' holds a nested object, expected a value",
                name
            ))),
            None => Err(TesseraError::mapping(format!("missing field '{}'", name))),
        }
    }

    /// Takes a scalar field, falling back to `T::default()` when absent.
    pub fn take_value_or_default<T: FromValue + Default>(&mut self, name: &str) -> TesseraResult<T> {
        if self.contains(name) {
            self.take_value(name)
        } else {
            Ok(T::default())
        }
    }

    /// Takes a required nested DTO field.
    pub fn take_nested<D: TransferObject>(&mut self, name: &str) -> TesseraResult<Option<D>> {
        match self.take(name) {
            Some(Slot::Nested(None)) => Ok(None),
            Some(Slot::Nested(Some(record))) => D::from_record(record).map(Some),
            Some(Slot::Value(_)) => Err(TesseraError::mapping(format!(
                "field '{}' holds a value, expected a nested {}",
                name,
                D::NAME
            ))),
            None => Err(TesseraError::mapping(format!("missing field '{}'", name))),
        }
    }

    /// Builds a related model from a nested field.
    ///
    /// An absent field yields `None`: relationships are optional on the
    /// model side.
    pub fn take_related<M: Model>(&mut self, name: &str) -> TesseraResult<Option<M>> {
        match self.take(name) {
            None | Some(Slot::Nested(None)) => Ok(None),
            Some(Slot::Nested(Some(mut record))) => {
                link_foreign_keys(M::meta(), &mut record)?;
                M::from_record(record).map(Some)
            }
            Some(Slot::Value(_)) => Err(TesseraError::mapping(format!(
                "field '{}' holds a value, expected related {}",
                name,
                M::meta().name
            ))),
        }
    }
}
