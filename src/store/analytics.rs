use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::{
    fs::operations::{read_optional, replace_file, WriterLock},
    utils::percentage::Percentage,
};

use super::{
    entities::{AnalyticsStore, DailyEntry, PostEntry},
    parse_document, to_document,
};

pub const DAILY_LOG_FIELD: &str = "dailyLog";
pub const POSTS_FIELD: &str = "posts";

/// Numbers shown by `status`. Metrics are display data that people edit by hand, so they are
/// whatever JSON number is stored, and anything missing or non numeric reads as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub connections: f64,
    pub profile_views: f64,
    /// `None` when the stored rate is negative.
    pub engagement_rate: Option<Percentage>,
    pub leads: f64,
    pub daily_entries: usize,
    pub posts: usize,
}

impl Summary {
    /// Looks up only the fields it shows, so a drifted document still summarizes.
    pub fn from_document(document: &Value) -> Self {
        let number = |pointer: &str| {
            document
                .pointer(pointer)
                .and_then(Value::as_f64)
                .unwrap_or_default()
        };
        let length = |pointer: &str| {
            document
                .pointer(pointer)
                .and_then(Value::as_array)
                .map_or(0, Vec::len)
        };

        Summary {
            connections: number("/metrics/connections/total"),
            profile_views: number("/metrics/profile/views"),
            engagement_rate: Percentage::from_ratio(number("/metrics/engagement/averageRate")),
            leads: number("/metrics/leads/total"),
            daily_entries: length("/dailyLog"),
            posts: length("/posts"),
        }
    }
}

/// Access to the analytics document. Reads never lock, writes hold the [WriterLock] of the
/// document for the whole read-modify-write cycle.
pub struct AnalyticsStorage {
    path: PathBuf,
}

impl AnalyticsStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the default document if there is no file yet. An existing file is left alone
    /// whatever it contains. Returns whether the document was created.
    pub async fn ensure_initialized(&self) -> Result<bool> {
        let lock = WriterLock::acquire(&self.path).await?;
        let result = self.ensure_initialized_locked().await;
        lock.release().await?;
        result
    }

    async fn ensure_initialized_locked(&self) -> Result<bool> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Failed to check {:?}", self.path))?;
        if exists {
            return Ok(false);
        }

        replace_file(&self.path, &to_document(&AnalyticsStore::default())?).await?;
        info!("Created analytics store at {:?}", self.path);
        Ok(true)
    }

    /// Appends `entry` to the top level list `field`, creating the store and the list when they
    /// are missing. Returns the new length of the list.
    #[instrument(skip(self, entry), fields(path = ?self.path))]
    pub async fn append_entry(&self, field: &str, entry: &impl Serialize) -> Result<usize> {
        let entry = serde_json::to_value(entry)?;

        let lock = WriterLock::acquire(&self.path).await?;
        let result = self.append_locked(field, entry).await;
        lock.release().await?;
        result
    }

    async fn append_locked(&self, field: &str, entry: Value) -> Result<usize> {
        self.ensure_initialized_locked().await?;

        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {:?}", self.path))?;
        let mut document: Map<String, Value> = parse_document(&self.path, &raw)?;

        let list = document
            .entry(field)
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(list) = list else {
            bail!("Field {field} of {:?} is not a list", self.path);
        };
        list.push(entry);
        let length = list.len();

        replace_file(&self.path, &to_document(&document)?).await?;
        debug!("{field} now holds {length} entries");
        Ok(length)
    }

    pub async fn log_daily(&self, entry: &DailyEntry) -> Result<usize> {
        self.append_entry(DAILY_LOG_FIELD, entry).await
    }

    pub async fn track_post(&self, entry: &PostEntry) -> Result<usize> {
        self.append_entry(POSTS_FIELD, entry).await
    }

    /// Parsed store, `None` if the file doesn't exist yet.
    pub async fn load(&self) -> Result<Option<AnalyticsStore>> {
        self.read_as().await
    }

    /// The document exactly as stored, for dumping.
    pub async fn load_raw(&self) -> Result<Option<Value>> {
        self.read_as().await
    }

    async fn read_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        read_optional(&self.path)
            .await?
            .map(|raw| parse_document(&self.path, &raw))
            .transpose()
    }

    /// A store that was never written reports the default numbers.
    pub async fn summary(&self) -> Result<Summary> {
        let document = match self.load_raw().await? {
            Some(document) => document,
            None => serde_json::to_value(AnalyticsStore::default())?,
        };
        Ok(Summary::from_document(&document))
    }
}
