//! Matching open "missing device" issues to placed devices.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Device, Table};

pub const MISSING_DEVICE_ISSUE: &str = "missing_device";
pub const RESOLVED_STATUS: &str = "resolved";

/// A store issue as reported by the issue source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: Option<String>,
    pub issue_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    /// Direct reference to a placed device, when the reporter recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Issue {
    pub fn missing_device(title: impl Into<String>) -> Self {
        Self {
            id: None,
            issue_type: MISSING_DEVICE_ISSUE.to_string(),
            title: title.into(),
            description: String::new(),
            status: "open".to_string(),
            device_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn is_open_missing_device(&self) -> bool {
        self.issue_type == MISSING_DEVICE_ISSUE && !self.status.eq_ignore_ascii_case(RESOLVED_STATUS)
    }

    pub fn missing_title(&self) -> MissingTitle {
        parse_missing_title(&self.title)
    }
}

/// Keeps only open missing-device issues.
pub fn open_missing_device_issues(issues: impl IntoIterator<Item = Issue>) -> Vec<Issue> {
    issues
        .into_iter()
        .filter(Issue::is_open_missing_device)
        .collect()
}

/// Device reference parsed from an issue title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTitle {
    pub name: String,
    pub color: Option<String>,
}

/// Parses `"Device name (optional color) - reason"`.
///
/// The reason is everything after the first `" - "`. A trailing
/// parenthesised group on the name part is the colour.
pub fn parse_missing_title(title: &str) -> MissingTitle {
    let head = match title.split_once(" - ") {
        Some((head, _reason)) => head,
        None => title,
    }
    .trim();

    if let Some(stripped) = head.strip_suffix(')') {
        if let Some(open) = stripped.rfind('(') {
            let name = stripped[..open].trim();
            let color = stripped[open + 1..].trim();
            if !name.is_empty() {
                return MissingTitle {
                    name: name.to_string(),
                    color: (!color.is_empty()).then(|| color.to_string()),
                };
            }
        }
    }

    MissingTitle {
        name: head.to_string(),
        color: None,
    }
}

/// Flags devices of one table that have an open missing-device issue.
#[derive(Debug, Clone, Default)]
pub struct MissingDeviceMatcher {
    issues: Vec<(Issue, MissingTitle)>,
}

impl MissingDeviceMatcher {
    /// Builds a matcher from raw issues; closed and unrelated issues are dropped.
    pub fn new(issues: impl IntoIterator<Item = Issue>) -> Self {
        Self {
            issues: open_missing_device_issues(issues)
                .into_iter()
                .map(|issue| {
                    let title = issue.missing_title();
                    (issue, title)
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether any open issue refers to `device` on `table`.
    pub fn is_missing(&self, table: &Table, device: &Device) -> bool {
        let parent_name = device
            .attached_to
            .as_deref()
            .and_then(|id| table.device(id))
            .map(|p| p.name.trim().to_lowercase());

        self.issues.iter().any(|(issue, title)| {
            if let Some(id) = &issue.device_id {
                return id == &device.id;
            }
            if !title.name.eq_ignore_ascii_case(device.name.trim()) {
                return false;
            }
            if let (Some(wanted), Some(actual)) = (&title.color, &device.color) {
                if wanted.as_str() != actual.trim() {
                    return false;
                }
            }
            if device.is_accessory() {
                if let Some(parent) = &parent_name {
                    return issue.description.to_lowercase().contains(parent.as_str());
                }
            }
            true
        })
    }

    /// Ids of every missing device on `table`.
    pub fn missing_device_ids(&self, table: &Table) -> HashSet<String> {
        if self.issues.is_empty() {
            return HashSet::new();
        }
        table
            .devices
            .iter()
            .filter(|d| self.is_missing(table, d))
            .map(|d| d.id.clone())
            .collect()
    }
}
