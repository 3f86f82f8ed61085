use std::time::{Duration, Instant};

use crate::catalog::Product;

/// Quiet period after the last search edit before filtering runs
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(160);

/// Filter products by exact category and a case-insensitive text query.
///
/// Empty category or blank query means "no constraint". Catalog order
/// is preserved.
pub fn apply<'a>(products: &'a [Product], category: &str, query: &str) -> Vec<&'a Product> {
    let query = query.trim().to_lowercase();

    products
        .iter()
        .filter(|product| category.is_empty() || product.category == category)
        .filter(|product| query.is_empty() || haystack(product).contains(&query))
        .collect()
}

fn haystack(product: &Product) -> String {
    format!(
        "{} {} {}",
        product.name,
        product.brand,
        product.description.as_deref().unwrap_or_default()
    )
    .to_lowercase()
}

/// Trailing-edge debounce driven by the UI tick
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_edit: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_edit: None,
        }
    }

    /// Record an edit, rescheduling any pending run
    pub fn touch(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    /// Returns true exactly once per burst, when the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_edit {
            Some(edited) if now.saturating_duration_since(edited) >= self.delay => {
                self.last_edit = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending run and report whether there was one
    pub fn flush(&mut self) -> bool {
        self.last_edit.take().is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_products;

    fn names<'a>(products: &[&'a Product]) -> Vec<&'a str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_no_filters_returns_catalog_in_order() {
        let products = sample_products();
        let filtered = apply(&products, "", "");
        assert_eq!(filtered.len(), products.len());
        for (filtered, original) in filtered.iter().zip(products.iter()) {
            assert_eq!(*filtered, original);
        }

        assert_eq!(names(&apply(&products, "", "   ")).len(), products.len());
    }

    #[test]
    fn test_category_is_exact_match() {
        let products = sample_products();
        assert_eq!(
            names(&apply(&products, "moisturizer", "")),
            vec!["Daily Moisturizing Lotion", "Hydro Boost Water Gel"]
        );
        assert!(apply(&products, "Moisturizer", "").is_empty());
        assert!(apply(&products, "moist", "").is_empty());
    }

    #[test]
    fn test_query_searches_name_brand_and_description() {
        let products = sample_products();
        assert_eq!(names(&apply(&products, "", "  NEUTROGENA ")), vec!["Hydro Boost Water Gel"]);
        assert_eq!(
            names(&apply(&products, "", "hyaluronic")),
            vec!["Daily Moisturizing Lotion"]
        );
        assert_eq!(names(&apply(&products, "", "foam")), vec!["Foaming Facial Cleanser"]);
        assert_eq!(names(&apply(&products, "", "l'oréal")), vec!["True Match Foundation"]);
    }

    #[test]
    fn test_category_and_query_are_combined() {
        let products = sample_products();
        assert_eq!(names(&apply(&products, "cleanser", "cerave")), vec!["Foaming Facial Cleanser"]);
        assert!(apply(&products, "suncare", "cerave").is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let products = sample_products();
        let first = names(&apply(&products, "moisturizer", "gel"));
        let second = names(&apply(&products, "moisturizer", "gel"));
        assert_eq!(first, second);
        assert_eq!(first, vec!["Hydro Boost Water Gel"]);
    }

    #[test]
    fn test_debounce_fires_once_after_burst() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.poll(start));

        debouncer.touch(start);
        debouncer.touch(start + Duration::from_millis(50));
        debouncer.touch(start + Duration::from_millis(100));

        // Timed from the last edit, not the first
        assert!(!debouncer.poll(start + Duration::from_millis(200)));
        assert!(debouncer.poll(start + Duration::from_millis(260)));
        assert!(!debouncer.poll(start + Duration::from_millis(400)));
    }

    #[test]
    fn test_debounce_flush() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        assert!(!debouncer.flush());
        debouncer.touch(start);
        assert!(debouncer.flush());
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
    }
}
