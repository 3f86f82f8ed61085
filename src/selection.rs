use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::catalog::Product;

/// Characters left alone by JavaScript's `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Selection key for a product.
///
/// Derived from the name only, so two products sharing a name share a key.
pub fn selection_key(name: &str) -> String {
    utf8_percent_encode(name, COMPONENT).to_string()
}

/// What the selection remembers about a product
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedProduct {
    pub name: String,
    pub brand: String,
    pub image: String,
}

impl From<&Product> for SelectedProduct {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            brand: product.brand.clone(),
            image: product.image.clone(),
        }
    }
}

/// Insertion-ordered set of selected products
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    items: IndexMap<String, SelectedProduct>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the product if absent, remove it if present.
    /// Returns whether the product is selected afterwards.
    pub fn toggle(&mut self, product: &Product) -> bool {
        let key = selection_key(&product.name);
        if self.items.shift_remove(&key).is_some() {
            false
        } else {
            self.items.insert(key, SelectedProduct::from(product));
            true
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<SelectedProduct> {
        self.items.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn is_selected(&self, product: &Product) -> bool {
        self.contains(&selection_key(&product.name))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in the order they were selected
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SelectedProduct)> {
        self.items.iter().map(|(key, item)| (key.as_str(), item))
    }

    /// Key of the entry at `index`, in selection order
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.items.get_index(index).map(|(key, _)| key.as_str())
    }
}
