//! Response shapes of the PCE inventory and job endpoints.

use serde::Deserialize;
use serde_json::Value;

use super::error::PceError;
use crate::workload::json_kind;

/// One response body from the inventory endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// A bare array: the complete listing, nothing more to follow.
    Listing(Vec<Value>),
    /// An object with `results`, possibly pointing at the next page.
    Paginated {
        results: Vec<Value>,
        next: Option<String>,
    },
    /// Any other body is taken as a single workload.
    Single(Value),
}

impl Page {
    /// Fails when `results` is present but not an array; the cursor of such
    /// a page is not trusted.
    pub fn from_value(value: Value) -> Result<Self, PceError> {
        let page = match value {
            Value::Array(items) => Page::Listing(items),
            Value::Object(mut map) if map.contains_key("results") => {
                let results = match map.remove("results") {
                    Some(Value::Array(items)) => items,
                    Some(other) => {
                        return Err(PceError::MalformedPage {
                            found: json_kind(&other),
                        });
                    }
                    None => Vec::new(),
                };
                let next = map
                    .get("pagination")
                    .and_then(|p| p.get("next"))
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                Page::Paginated { results, next }
            }
            other => Page::Single(other),
        };
        Ok(page)
    }

    /// Records on this page and the cursor of the next one.
    pub fn into_parts(self) -> (Vec<Value>, Option<String>) {
        match self {
            Page::Listing(items) => (items, None),
            Page::Paginated { results, next } => (results, next),
            Page::Single(item) => (vec![item], None),
        }
    }
}

/// Body of a deferred job's status resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<JobResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    pub href: Option<String>,
}

impl JobStatus {
    pub fn is_done(&self) -> bool {
        self.status.as_deref() == Some("done")
    }

    pub fn result_href(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|r| r.href.as_deref())
            .filter(|h| !h.is_empty())
    }
}

/// Everything one fetch collected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub workloads: Vec<Value>,
    /// Pages that returned data.
    pub pages: usize,
    /// `false` when a page failed and pagination stopped early.
    pub complete: bool,
}

impl Inventory {
    /// No page could be retrieved at all.
    pub fn is_unavailable(&self) -> bool {
        self.pages == 0 && !self.complete
    }
}
