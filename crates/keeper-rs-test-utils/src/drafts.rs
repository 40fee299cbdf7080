use keeper_rs_store::{MemoryDraft, RuleDraft};

pub fn memory_draft(title: &str, category: &str) -> MemoryDraft {
    MemoryDraft {
        title: title.to_string(),
        content: format!("notes about {title}"),
        category: category.to_string(),
        ..MemoryDraft::default()
    }
}

pub fn rule_draft(title: &str, category: &str) -> RuleDraft {
    RuleDraft {
        title: title.to_string(),
        content: format!("always {title}"),
        category: category.to_string(),
        ..RuleDraft::default()
    }
}
