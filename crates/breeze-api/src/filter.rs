//! Report and listing filters.

use breeze_core::WireValue;

/// Filter parameters for list and report actions.
///
/// ```
/// use breeze_api::Filter;
///
/// let filter = Filter::new().equals("type", "meeting").like("name", "review");
/// assert_eq!(
///     filter.pairs(),
///     [
///         ("filter-type".to_string(), "meeting".to_string()),
///         ("filter-like-name".to_string(), "review".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pairs: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches records whose `field` equals `value` (`filter-<field>`).
    pub fn equals(self, field: &str, value: impl Into<String>) -> Self {
        self.param(format!("filter-{field}"), value)
    }

    /// Matches records whose `field` contains `value` (`filter-like-<field>`).
    pub fn like(self, field: &str, value: impl Into<String>) -> Self {
        self.param(format!("filter-like-{field}"), value)
    }

    /// Matches on a typed value, formatted the way the wire expects it.
    /// Empty values add nothing.
    pub fn equals_value<V: WireValue>(self, field: &str, value: &V) -> Self {
        match value.to_wire() {
            Some(raw) => self.equals(field, raw),
            None => self,
        }
    }

    /// Adds a parameter verbatim, e.g. `sort-name=asc`.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl IntoIterator for Filter {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}
