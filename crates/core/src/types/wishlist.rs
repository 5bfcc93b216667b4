//! Wishlist membership set.

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;

/// A shopper's saved-for-later products.
///
/// Stored as an ordered list but only membership is meaningful. Product ids
/// never repeat: duplicates in a stored payload are collapsed on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Wishlist(Vec<ProductId>);

impl Wishlist {
    /// An empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from entries, keeping the first occurrence of each product.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = ProductId>) -> Self {
        let mut wishlist = Self::new();
        for entry in entries {
            wishlist.insert(entry);
        }
        wishlist
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.0.contains(product_id)
    }

    /// Add a product. Returns `false` if it was already present.
    pub fn insert(&mut self, product_id: ProductId) -> bool {
        if self.contains(&product_id) {
            return false;
        }
        self.0.push(product_id);
        true
    }

    /// Remove a product. Returns `false` if it was not present.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|entry| entry != product_id);
        self.0.len() != before
    }

    /// Flip membership of a product, returning whether it is now present.
    pub fn toggle(&mut self, product_id: &ProductId) -> bool {
        if self.remove(product_id) {
            false
        } else {
            self.0.push(product_id.clone());
            true
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[ProductId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode as the JSON list kept in the preference store.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode the JSON list kept in the preference store.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the payload is not a list of strings.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

impl<'de> Deserialize<'de> for Wishlist {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<ProductId>::deserialize(deserializer)?;
        Ok(Self::from_entries(entries))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut wishlist = Wishlist::from_entries([ProductId::new("p0")]);
        let original = wishlist.clone();
        let p1 = ProductId::new("p1");

        assert!(wishlist.toggle(&p1));
        assert!(wishlist.contains(&p1));
        assert!(!wishlist.toggle(&p1));
        assert_eq!(wishlist, original);
    }

    #[test]
    fn test_insert_ignores_duplicates() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.insert(ProductId::new("p1")));
        assert!(!wishlist.insert(ProductId::new("p1")));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_decode_collapses_duplicates() {
        let wishlist = Wishlist::from_json(r#"["p1","p2","p1"]"#).unwrap();
        assert_eq!(
            wishlist.entries(),
            &[ProductId::new("p1"), ProductId::new("p2")]
        );
    }

    #[test]
    fn test_json_encoding_is_a_plain_list() {
        let wishlist = Wishlist::from_entries([ProductId::new("p1"), ProductId::new("p2")]);
        assert_eq!(wishlist.to_json().unwrap(), r#"["p1","p2"]"#);
    }

    #[test]
    fn test_decode_rejects_non_list() {
        assert!(Wishlist::from_json(r#"{"p1":true}"#).is_err());
    }
}
