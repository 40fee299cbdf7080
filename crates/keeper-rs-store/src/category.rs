//! Category index for rule records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description given to categories created implicitly by a rule.
pub fn default_category_description(name: &str) -> String {
    format!("Rules for {name}")
}

/// First-class category metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub description: String,
    /// Member rule ids in creation order.
    #[serde(default)]
    pub rules: Vec<String>,
}

/// Category summary returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: String,
    pub description: String,
    pub rule_count: usize,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
            rule_count: category.rules.len(),
        }
    }
}

/// Categories keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryIndex(BTreeMap<String, Category>);

impl CategoryIndex {
    /// Return the named category, creating it when absent.
    ///
    /// An existing category keeps its description.
    pub fn ensure(&mut self, name: &str, description: impl FnOnce() -> String) -> &mut Category {
        self.0.entry(name.to_string()).or_insert_with(|| Category {
            name: name.to_string(),
            description: description(),
            rules: Vec::new(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Register `id` as a member of `name`, creating the category if needed.
    pub fn add_member(&mut self, name: &str, id: &str) {
        let category = self.ensure(name, || default_category_description(name));
        if !category.rules.iter().any(|member| member == id) {
            category.rules.push(id.to_string());
        }
    }

    /// Drop `id` from the member list of `name`. The category itself stays.
    pub fn remove_member(&mut self, name: &str, id: &str) {
        if let Some(category) = self.0.get_mut(name) {
            category.rules.retain(|member| member != id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.values()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryIndex, CategorySummary, default_category_description};
    use pretty_assertions::assert_eq;

    #[test]
    fn ensure_is_idempotent() {
        let mut index = CategoryIndex::default();
        index.ensure("git", || "Version control".to_string());
        index.ensure("git", || "ignored".to_string());
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get("git").map(|category| category.description.as_str()),
            Some("Version control")
        );
    }

    #[test]
    fn add_member_creates_category_with_default_description() {
        let mut index = CategoryIndex::default();
        index.add_member("perf", "per-001");
        index.add_member("perf", "per-001");
        index.add_member("perf", "per-002");
        let category = index.get("perf").expect("category");
        assert_eq!(category.description, default_category_description("perf"));
        assert_eq!(category.rules, vec!["per-001".to_string(), "per-002".to_string()]);
    }

    #[test]
    fn remove_member_keeps_category() {
        let mut index = CategoryIndex::default();
        index.add_member("git", "git-001");
        index.remove_member("git", "git-001");
        index.remove_member("missing", "x");
        let summary = CategorySummary::from(index.get("git").expect("category"));
        assert_eq!(summary.rule_count, 0);
        assert_eq!(index.contains("missing"), false);
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut index = CategoryIndex::default();
        index.add_member("git", "git-001");
        let value = serde_json::to_value(&index).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "git": {"name": "git", "description": "Rules for git", "rules": ["git-001"]}
            })
        );
    }
}
