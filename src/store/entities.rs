use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Minutes attributed to one logged outreach session.
pub const DAILY_SESSION_MINUTES: u32 = 15;

/// The analytics document as it is stored on disk. Keys this crate doesn't know about are kept in
/// `other` so that rewriting the document never drops manual additions.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStore {
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub daily_log: Vec<DailyEntry>,
    /// Missing from a fresh store, appears with the first tracked post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<PostEntry>>,
    #[serde(default)]
    pub weekly_reviews: Vec<Value>,
    #[serde(default)]
    pub monthly_reviews: Vec<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Display-only numbers. Nothing in this crate recomputes them, they are edited by hand or by
/// other tools, so any JSON number is accepted.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(default)]
    pub connections: ConnectionMetrics,
    #[serde(default)]
    pub profile: ProfileMetrics,
    #[serde(default)]
    pub engagement: EngagementMetrics,
    #[serde(default)]
    pub leads: LeadMetrics,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A counter kept exactly as written: `3` stays `3` and a hand-edited `2.5` stays `2.5`.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub struct Metric(pub Number);

impl Default for Metric {
    fn default() -> Self {
        Self(Number::from(0))
    }
}

impl Metric {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or_default()
    }
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionMetrics {
    pub total: Metric,
    pub weekly_growth: Metric,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileMetrics {
    pub views: Metric,
    pub search_appearances: Metric,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EngagementMetrics {
    /// Ratio, `0.042` means 4.2%.
    pub average_rate: f64,
    pub total_impressions: Metric,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadMetrics {
    pub total: Metric,
    pub qualified: Metric,
}

/// One `daily` invocation. Several entries may share a date.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub date: String,
    #[serde(default)]
    pub activities: Activities,
    #[serde(default = "default_session_minutes")]
    pub total_minutes: u32,
}

impl DailyEntry {
    pub fn new(date: String, activities: Activities) -> Self {
        Self {
            date,
            activities,
            total_minutes: DAILY_SESSION_MINUTES,
        }
    }
}

fn default_session_minutes() -> u32 {
    DAILY_SESSION_MINUTES
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct Activities {
    pub comments: u32,
    pub reactions: u32,
    pub replies: u32,
    pub connections: u32,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct PostEntry {
    pub date: String,
    pub url: String,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub engagement: f64,
}

/// Task objects belong to an external tracker, so they are carried verbatim.
pub type Task = Value;

/// The few task fields that the status summary looks at.
pub trait TaskFields {
    fn category(&self) -> Option<&str>;
    fn status(&self) -> Option<&str>;
}

impl TaskFields for Task {
    fn category(&self) -> Option<&str> {
        self.get("category").and_then(Value::as_str)
    }

    fn status(&self) -> Option<&str> {
        self.get("status").and_then(Value::as_str)
    }
}
