//! Ownership map from bound elements to their pickers.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::options::{Options, OptionsOverride};
use crate::picker::Picker;
use crate::{ParseError, prelude::*};

/// Identity of a host element a picker is bound to.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Deref, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ElementId(String);

impl ElementId {
    /// Creates an element id, rejecting blank identities.
    ///
    /// # Errors
    /// Returns `PickerError::InvalidTarget` if `id` is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, PickerError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PickerError::InvalidTarget(id));
        }
        Ok(Self(id))
    }
}

impl TryFrom<String> for ElementId {
    type Error = PickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Error type for binding and driving pickers through a [`Registry`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PickerError {
    /// The target element is missing or has no usable identity.
    #[error("The target must be an element with a non-empty id, got {0:?}")]
    InvalidTarget(String),

    /// No picker is bound to the element.
    #[error("No picker is bound to element {0}")]
    NotBound(String),

    /// Error reading a value.
    #[error(transparent)]
    ParseError(#[from] ParseError),
}

/// Pickers keyed by the element they are bound to. Each element owns at most one picker.
#[derive(Debug, Default)]
pub struct Registry {
    pickers: HashMap<ElementId, Picker>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a picker to `id`, reading its initial date from `value`.
    ///
    /// Binding an element that already has a picker is a no-op: the existing
    /// picker is returned and `overrides` are ignored.
    ///
    /// # Errors
    /// Returns `PickerError::InvalidTarget` if `id` is blank.
    pub fn bind(
        &mut self,
        id: &str,
        value: Option<&str>,
        overrides: OptionsOverride,
    ) -> Result<&mut Picker, PickerError> {
        let id = ElementId::new(id)?;
        match self.pickers.entry(id) {
            Entry::Occupied(entry) => {
                tracing::debug!(id = %entry.key(), "element already has a picker");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                tracing::debug!(id = %entry.key(), "binding picker");
                let options = Arc::new(Options::new(overrides));
                Ok(entry.insert(Picker::new(value, options)))
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Picker> {
        self.pickers.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Picker> {
        self.pickers.get_mut(id)
    }

    /// Sets the value of the picker bound to `id`.
    ///
    /// # Errors
    /// Returns `PickerError::NotBound` if no picker is bound to `id`, or
    /// `PickerError::ParseError` if `text` cannot be read.
    pub fn set_value(&mut self, id: &str, text: &str) -> Result<(), PickerError> {
        let picker = self
            .get_mut(id)
            .ok_or_else(|| PickerError::NotBound(id.to_owned()))?;
        picker.set_value(text)?;
        Ok(())
    }

    /// Tears down the picker bound to `id`, handing it back to the caller.
    pub fn unbind(&mut self, id: &str) -> Option<Picker> {
        self.pickers.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pickers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickers.is_empty()
    }
}
