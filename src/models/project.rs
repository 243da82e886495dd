//! Project data models
//!
//! Defines the Project record, its status enumeration, the validated write
//! payload and the page / statistics envelopes returned by the API.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned project identity
pub type ProjectId = i64;

/// Default number of projects per list page
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Upper bound for a requested page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Largest rank a reorder may assign
///
/// Leaves headroom above it so appending a new project never overflows.
pub const MAX_RANK: i64 = i64::MAX / 2;

/// Wire date format (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProjectStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl ProjectStatus {
    /// Every accepted status, in display order
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Pending,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
    ];

    /// Convert to the wire / storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("The selected status is invalid: {}", s))
    }
}

/// A tracked project
///
/// `rank` is the global ordering key and travels as `order` on the wire.
/// `stared` and `quick_access` are independent flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProjectStatus,
    #[serde(rename = "order")]
    pub rank: i64,
    #[serde(default)]
    pub stared: bool,
    #[serde(default)]
    pub quick_access: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Case-insensitive substring match on name or status
    ///
    /// An empty needle matches everything.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.status.as_str().to_lowercase().contains(&needle)
    }
}

/// Per-field validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field; the first message per field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Raw create / update payload as submitted by a form
///
/// Fields stay as strings so that every problem can be reported per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub status: String,
}

/// A payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProject {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProjectStatus,
}

impl ProjectInput {
    pub fn new(name: &str, start_date: &str, end_date: &str, status: ProjectStatus) -> Self {
        Self {
            name: name.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            status: status.as_str().to_string(),
        }
    }

    /// Validate every field and collect all failures
    pub fn validate(&self) -> Result<ValidProject, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "The name field is required.");
        }

        let start_date = parse_date(&self.start_date, "start_date", &mut errors);
        let end_date = parse_date(&self.end_date, "end_date", &mut errors);

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.add("end_date", "End date should not be before the start date.");
            }
        }

        let status = match self.status.parse::<ProjectStatus>() {
            Ok(status) => Some(status),
            Err(_) if self.status.trim().is_empty() => {
                errors.add("status", "The status field is required.");
                None
            }
            Err(message) => {
                errors.add("status", message);
                None
            }
        };

        match (start_date, end_date, status) {
            (Some(start_date), Some(end_date), Some(status)) if errors.is_empty() => {
                Ok(ValidProject {
                    name: name.to_string(),
                    start_date,
                    end_date,
                    status,
                })
            }
            _ => Err(errors),
        }
    }
}

fn parse_date(raw: &str, field: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, format!("The {} field is required.", field));
        return None;
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, format!("The {} is not a valid date.", field));
            None
        }
    }
}

/// One `(id, rank)` pair of a batch reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankUpdate {
    pub id: ProjectId,
    #[serde(rename = "order")]
    pub rank: i64,
}

impl RankUpdate {
    pub fn new(id: ProjectId, rank: i64) -> Self {
        Self { id, rank }
    }
}

/// Body of `PUT /project/update-orders`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBatchRequest {
    #[serde(default)]
    pub projects: Vec<RankUpdate>,
}

/// Global rank for a position inside a page
///
/// Ranks stay comparable across pages without renumbering the whole table.
pub fn global_rank(index: usize, page: u32, page_size: u32) -> i64 {
    let page = i64::from(page.max(1));
    index as i64 + 1 + (page - 1) * i64::from(page_size)
}

/// Normalized list query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32, search: Option<String>) -> Self {
        Self {
            page,
            per_page,
            search,
        }
        .normalized()
    }

    /// Clamp page to >= 1, page size to 1..=MAX_PAGE_SIZE and drop blank searches
    pub fn normalized(self) -> Self {
        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PAGE_SIZE),
            search,
        }
    }

    /// Offset of the first row of this page
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.per_page as usize
    }
}

/// One page of the ranked project list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPage {
    pub data: Vec<Project>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl ProjectPage {
    /// Last page number for `total` rows; an empty result still has page 1
    pub fn last_page_for(total: u64, per_page: u32) -> u32 {
        let per_page = u64::from(per_page.max(1));
        total.div_ceil(per_page).max(1) as u32
    }
}

/// Envelope of `GET /projects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPageResponse {
    pub projects: ProjectPage,
}

/// Dashboard counters plus both derived views
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatistics {
    pub total_projects: u64,
    pub completed_projects: u64,
    pub ongoing_projects: u64,
    pub pending_projects: u64,
    #[serde(default)]
    pub favorite: Vec<Project>,
    #[serde(default)]
    pub quick: Vec<Project>,
}

/// Envelope of single-project responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub project: Project,
}

/// Envelope of `GET /project/myFavorites`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub favorite: Vec<Project>,
}

/// Generic `{ message }` acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
