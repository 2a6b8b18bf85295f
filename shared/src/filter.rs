//! Listing filters for movements and products
//!
//! Every filter is optional. An empty value or one of the "all" sentinels
//! disables it, and the remaining filters are combined with AND.

use serde::{Deserialize, Serialize};

use crate::types::MovementKind;

/// Values that disable a filter (compared case-insensitively)
pub const ALL_SENTINELS: [&str; 3] = ["all", "todas", "todos"];

/// Normalise a raw filter value: `None` when absent, blank or a sentinel
pub fn active_filter(raw: Option<&str>) -> Option<String> {
    let value = raw?;
    if value.is_empty() || is_sentinel(value) {
        return None;
    }
    Some(value.to_string())
}

fn is_sentinel(value: &str) -> bool {
    ALL_SENTINELS
        .iter()
        .any(|sentinel| value.eq_ignore_ascii_case(sentinel))
}

/// Normalised movement listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    /// Substring of the product name or the acting user's name
    pub search: Option<String>,
    /// Exact category name
    pub category: Option<String>,
    /// Exact acting-user name
    pub user: Option<String>,
    /// Stored kind name (`entrada`/`saida`); values that name no kind are
    /// kept lower-cased and match nothing
    pub kind: Option<String>,
}

impl MovementFilter {
    pub fn new(
        search: Option<&str>,
        category: Option<&str>,
        user: Option<&str>,
        kind: Option<&str>,
    ) -> Self {
        Self {
            search: active_filter(search),
            category: active_filter(category),
            user: active_filter(user),
            kind: active_filter(kind).map(|k| {
                let lowered = k.to_lowercase();
                match lowered.parse::<MovementKind>() {
                    Ok(kind) => kind.as_str().to_string(),
                    Err(_) => lowered,
                }
            }),
        }
    }

    /// Evaluate the filter against one joined movement
    pub fn matches(
        &self,
        product_name: &str,
        category_name: &str,
        user_name: &str,
        kind: MovementKind,
    ) -> bool {
        if let Some(search) = &self.search {
            if !product_name.contains(search.as_str()) && !user_name.contains(search.as_str()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if category_name != category {
                return false;
            }
        }
        if let Some(user) = &self.user {
            if user_name != user {
                return false;
            }
        }
        if let Some(wanted) = &self.kind {
            if kind.as_str() != wanted {
                return false;
            }
        }
        true
    }
}

/// Normalised product listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Substring of the product name or description
    pub search: Option<String>,
    /// Exact category name
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn new(search: Option<&str>, category: Option<&str>) -> Self {
        Self {
            search: active_filter(search),
            category: active_filter(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_disable_filters() {
        let filter = MovementFilter::new(Some("all"), Some("Todas"), Some("TODOS"), Some("All"));
        assert_eq!(filter, MovementFilter::default());
    }

    #[test]
    fn blank_values_disable_filters() {
        let filter = MovementFilter::new(Some(""), None, Some(""), None);
        assert_eq!(filter, MovementFilter::default());
    }

    #[test]
    fn kind_filter_is_lower_cased() {
        let filter = MovementFilter::new(None, None, None, Some("Entrada"));
        assert_eq!(filter.kind.as_deref(), Some("entrada"));
        assert!(filter.matches("Mouse", "Periféricos", "Ana", MovementKind::Entry));
        assert!(!filter.matches("Mouse", "Periféricos", "Ana", MovementKind::Exit));
    }

    #[test]
    fn english_kind_names_map_to_stored_names() {
        let exits = MovementFilter::new(None, None, None, Some("Exit"));
        assert_eq!(exits.kind.as_deref(), Some("saida"));
        assert!(exits.matches("Mouse", "Periféricos", "Ana", MovementKind::Exit));
        assert!(!exits.matches("Mouse", "Periféricos", "Ana", MovementKind::Entry));

        let entries = MovementFilter::new(None, None, None, Some("entry"));
        assert_eq!(entries.kind.as_deref(), Some("entrada"));
        assert!(entries.matches("Mouse", "Periféricos", "Ana", MovementKind::Entry));
    }

    #[test]
    fn unknown_kind_matches_nothing() {
        let filter = MovementFilter::new(None, None, None, Some("transfer"));
        assert!(!filter.matches("Mouse", "Periféricos", "Ana", MovementKind::Entry));
        assert!(!filter.matches("Mouse", "Periféricos", "Ana", MovementKind::Exit));
    }

    #[test]
    fn search_hits_product_or_user_name() {
        let filter = MovementFilter::new(Some("Ana"), None, None, None);
        assert!(filter.matches("Teclado", "Periféricos", "Ana Souza", MovementKind::Exit));
        assert!(filter.matches("Cabo Ana 2m", "Outros", "João", MovementKind::Exit));
        assert!(!filter.matches("Teclado", "Periféricos", "João", MovementKind::Exit));
    }

    #[test]
    fn search_is_case_sensitive() {
        let filter = MovementFilter::new(Some("Ana"), None, None, None);
        assert!(!filter.matches("Banana USB", "Outros", "João", MovementKind::Exit));
        assert!(!filter.matches("Teclado", "Periféricos", "ana souza", MovementKind::Exit));
    }

    #[test]
    fn filters_combine_with_and() {
        let filter = MovementFilter::new(None, Some("Monitores"), Some("João"), Some("saida"));
        assert!(filter.matches("Monitor 24", "Monitores", "João", MovementKind::Exit));
        assert!(!filter.matches("Monitor 24", "Monitores", "Ana", MovementKind::Exit));
        assert!(!filter.matches("Monitor 24", "Periféricos", "João", MovementKind::Exit));
    }

    #[test]
    fn category_and_user_are_exact_matches() {
        let filter = MovementFilter::new(None, Some("Monitor"), None, None);
        assert!(!filter.matches("Monitor 24", "Monitores", "João", MovementKind::Entry));
    }

    #[test]
    fn product_filter_drops_sentinel_category() {
        let filter = ProductFilter::new(Some("sem fio"), Some("Todas"));
        assert_eq!(filter.search.as_deref(), Some("sem fio"));
        assert!(filter.category.is_none());
    }
}
