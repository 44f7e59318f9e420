//! Search predicates over scanned projects.
//!
//! - `pattern`: regular expression matched from the start of the project name
//! - `lang`: programming language, compared ignoring case
//! - `tag`: tag membership, compared ignoring case
//!
//! Predicates combine with AND. Unset or empty predicates match everything.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::scanner::ProjectView;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ProjectFilter {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.pattern).is_none()
            && non_empty(&self.lang).is_none()
            && non_empty(&self.tag).is_none()
    }

    /// Keep the projects matching every set predicate, preserving order.
    pub fn apply(&self, projects: Vec<ProjectView>) -> StoreResult<Vec<ProjectView>> {
        let pattern = non_empty(&self.pattern).map(compile_prefix).transpose()?;
        let lang = non_empty(&self.lang).map(str::to_lowercase);
        let tag = non_empty(&self.tag).map(str::to_lowercase);

        Ok(projects
            .into_iter()
            .filter(|project| pattern.as_ref().map_or(true, |re| re.is_match(&project.name)))
            .filter(|project| {
                lang.as_deref()
                    .map_or(true, |lang| project.programming_lang.to_lowercase() == lang)
            })
            .filter(|project| {
                tag.as_deref().map_or(true, |tag| {
                    project.tags.iter().any(|t| t.to_lowercase() == tag)
                })
            })
            .collect())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Compile `pattern` so that it only matches at the start of the input.
fn compile_prefix(pattern: &str) -> StoreResult<Regex> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|e| StoreError::InvalidFilter {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
