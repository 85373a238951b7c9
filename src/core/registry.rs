//! Attribute registry: the ordered, de-duplicated target attributes

use crate::config::AttributeSpec;
use crate::types::Attribute;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeRegistry {
    attributes: Vec<Attribute>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from caller specs
    pub fn from_specs(specs: &[AttributeSpec]) -> Self {
        let mut registry = Self::new();
        registry.register(specs);
        registry
    }

    /// Append specs in order. A spec whose value key was already registered is dropped.
    pub fn register(&mut self, specs: &[AttributeSpec]) {
        let mut seen: HashSet<String> = self
            .attributes
            .iter()
            .map(|attr| attr.value_key.clone())
            .collect();

        for spec in specs {
            if !seen.insert(spec.value_key.clone()) {
                debug!(value_key = %spec.value_key, "dropping duplicate attribute");
                continue;
            }
            if spec.value_key.is_empty() {
                warn!(title = %spec.title, "attribute registered with an empty value key");
            }
            self.attributes.push(Attribute {
                value_key: spec.value_key.clone(),
                title: spec.title.clone(),
                is_image: spec.is_image.unwrap_or(false),
            });
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn by_value_key(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.value_key == key)
    }

    /// Position of a value key in registration order
    pub fn position(&self, key: &str) -> Option<usize> {
        self.attributes.iter().position(|attr| attr.value_key == key)
    }

    /// Attributes that may be mapped to spreadsheet columns
    pub fn mappable(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|attr| !attr.is_image)
    }

    pub fn image_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|attr| attr.is_image)
    }

    pub fn has_image_attributes(&self) -> bool {
        self.attributes.iter().any(|attr| attr.is_image)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
