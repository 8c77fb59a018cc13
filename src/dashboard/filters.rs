//! Filter sets for the list endpoints

/// A filter a list endpoint understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    UserId,
    MessageType,
}

impl FilterKey {
    /// Query parameter name
    pub fn param(&self) -> &'static str {
        match self {
            Self::UserId => "tg_user_id",
            Self::MessageType => "message_type",
        }
    }

    /// Placeholder shown in the filter bar
    pub fn label(&self) -> &'static str {
        match self {
            Self::UserId => "tg_user_id",
            Self::MessageType => "type (text/sticker/...)",
        }
    }
}

/// Current filter values of one view
///
/// Only the keys the view supports can be set. Values are stored as typed by
/// the operator; blank values are left out of the query entirely.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSet {
    entries: Vec<(FilterKey, String)>,
}

impl FilterSet {
    pub fn new(keys: &[FilterKey]) -> Self {
        Self {
            entries: keys.iter().map(|k| (*k, String::new())).collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = FilterKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a value; returns true if the stored value changed
    ///
    /// Unsupported keys are ignored and report no change.
    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) -> bool {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, current)) if *current != value => {
                *current = value;
                true
            }
            _ => false,
        }
    }

    /// Clear every value; returns true if anything was set
    pub fn clear(&mut self) -> bool {
        let mut changed = false;
        for (_, value) in &mut self.entries {
            if !value.is_empty() {
                value.clear();
                changed = true;
            }
        }
        changed
    }

    /// Non-blank values as query pairs, trimmed, in key order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| {
                let value = value.trim();
                (!value.is_empty()).then(|| (key.param().to_string(), value.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_omitted() {
        let mut filters = FilterSet::new(&[FilterKey::UserId, FilterKey::MessageType]);
        assert!(filters.query_pairs().is_empty());

        filters.set(FilterKey::MessageType, "   ");
        assert!(filters.query_pairs().is_empty());

        filters.set(FilterKey::UserId, " 123 ");
        assert_eq!(
            filters.query_pairs(),
            vec![("tg_user_id".to_string(), "123".to_string())]
        );
    }

    #[test]
    fn test_unsupported_key_is_ignored() {
        let mut filters = FilterSet::new(&[FilterKey::UserId]);
        assert!(!filters.set(FilterKey::MessageType, "text"));
        assert_eq!(filters.get(FilterKey::MessageType), None);
        assert!(filters.query_pairs().is_empty());
    }

    #[test]
    fn test_set_reports_change_only_once() {
        let mut filters = FilterSet::new(&[FilterKey::UserId]);
        assert!(filters.set(FilterKey::UserId, "5"));
        assert!(!filters.set(FilterKey::UserId, "5"));
        assert!(filters.clear());
        assert!(!filters.clear());
    }
}
