// ABOUTME: Named, ordered container shared by every registry level
// ABOUTME: Provides keyed lookup, subscript access, iteration and display

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use crate::error::{ItemKind, RegistryError, Result};

/// Children of one registry level, keyed by name and iterated in sorted order
#[derive(Debug)]
pub struct Catalog<T> {
    label: &'static str,
    name: String,
    kind: ItemKind,
    items: BTreeMap<String, T>,
}

impl<T> Catalog<T> {
    /// `label` names the owning level in `Display`; `kind` names the children in errors
    pub(crate) fn new(label: &'static str, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            label,
            name: name.into(),
            kind,
            items: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> Result<&T> {
        self.items
            .get(key)
            .ok_or_else(|| RegistryError::not_found(self.kind, key))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut T> {
        let kind = self.kind;
        self.items
            .get_mut(key)
            .ok_or_else(|| RegistryError::not_found(kind, key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn values(&self) -> btree_map::Values<'_, String, T> {
        self.items.values()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, T> {
        self.items.iter()
    }

    /// Sorted child names
    pub fn list_item_keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    pub(crate) fn values_mut(&mut self) -> btree_map::ValuesMut<'_, String, T> {
        self.items.values_mut()
    }

    /// Insert or replace a child, returning the stored value
    pub(crate) fn insert(&mut self, key: String, item: T) -> &mut T {
        match self.items.entry(key) {
            btree_map::Entry::Occupied(mut entry) => {
                entry.insert(item);
                entry.into_mut()
            }
            btree_map::Entry::Vacant(entry) => entry.insert(item),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Index<&str> for Catalog<T> {
    type Output = T;

    /// Panics with the not-found message when `key` is missing
    fn index(&self, key: &str) -> &T {
        match self.get(key) {
            Ok(item) => item,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<'a, T> IntoIterator for &'a Catalog<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// `Label(name)`; the alternate form also lists the child names
impl<T> fmt::Display for Catalog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label, self.name)?;
        if f.alternate() {
            write!(f, ".({})", self.list_item_keys().join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog<u32> {
        let mut catalog = Catalog::new("Schema", "public", ItemKind::Table);
        catalog.insert("orders".to_string(), 2);
        catalog.insert("customers".to_string(), 1);
        catalog
    }

    #[test]
    fn test_keyed_lookup() {
        let catalog = sample();
        assert_eq!(*catalog.get("orders").unwrap(), 2);
        assert!(catalog.contains("customers"));
        assert!(!catalog.contains("invoices"));

        let err = catalog.get("invoices").unwrap_err();
        assert_eq!(err.to_string(), "No table named 'invoices' was found.");
    }

    #[test]
    fn test_subscript_lookup() {
        let catalog = sample();
        assert_eq!(catalog["customers"], 1);
    }

    #[test]
    #[should_panic(expected = "No table named 'invoices' was found.")]
    fn test_subscript_missing_panics() {
        let catalog = sample();
        let _value = catalog["invoices"];
    }

    #[test]
    fn test_sorted_iteration() {
        let catalog = sample();
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["customers", "orders"]);
        assert_eq!(catalog.values().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(catalog.list_item_keys(), vec!["customers", "orders"]);
        assert_eq!((&catalog).into_iter().count(), 2);
    }

    #[test]
    fn test_insert_replaces() {
        let mut catalog = sample();
        *catalog.insert("orders".to_string(), 7) += 1;
        assert_eq!(catalog["orders"], 8);
        assert_eq!(catalog.len(), 2);

        catalog.clear();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_display() {
        let catalog = sample();
        assert_eq!(catalog.to_string(), "Schema(public)");
        assert_eq!(format!("{:#}", catalog), "Schema(public).(customers, orders)");
    }
}
