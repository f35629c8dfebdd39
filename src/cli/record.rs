use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::{
    config::WorkspaceConfig,
    store::{
        analytics::AnalyticsStorage,
        entities::{Activities, DailyEntry, PostEntry},
    },
    utils::{clock::Clock, time::date_to_entry_date},
};

#[derive(Debug, Parser)]
pub struct DailyCommand {
    #[arg(long, default_value_t = 0, help = "Posts commented on")]
    comments: u32,
    #[arg(long, default_value_t = 0, help = "Reactions left")]
    reactions: u32,
    #[arg(long, default_value_t = 0, help = "Replies to comments")]
    replies: u32,
    #[arg(long, default_value_t = 0, help = "Connection requests sent")]
    connections: u32,
}

#[derive(Debug, Parser)]
pub struct TrackPostCommand {
    #[arg(long, help = "Link to the post")]
    url: String,
    #[arg(long, default_value_t = 0)]
    impressions: u64,
    #[arg(long, default_value_t = 0., value_parser = parse_finite, help = "Engagement rate of the post")]
    engagement: f64,
}

/// JSON has no NaN or infinity, serde_json would store them as `null`.
fn parse_finite(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(v) => Err(format!("{v} is not a finite number")),
        Err(e) => Err(e.to_string()),
    }
}

/// Command to process `daily`. Appends today's activity counts to the daily log.
pub async fn process_daily_command(
    DailyCommand {
        comments,
        reactions,
        replies,
        connections,
    }: DailyCommand,
    config: &WorkspaceConfig,
    clock: &dyn Clock,
) -> Result<()> {
    let entry = DailyEntry::new(
        date_to_entry_date(clock.today()),
        Activities {
            comments,
            reactions,
            replies,
            connections,
        },
    );

    let storage = AnalyticsStorage::new(config.analytics_path.clone());
    let length = storage.log_daily(&entry).await?;
    info!("Logged daily activity {entry:?}");

    println!(
        "Logged {} minutes on {}: {comments} comments, {reactions} reactions, {replies} replies, {connections} connections ({length} entries)",
        entry.total_minutes, entry.date
    );
    Ok(())
}

/// Command to process `track-post`.
pub async fn process_track_post_command(
    TrackPostCommand {
        url,
        impressions,
        engagement,
    }: TrackPostCommand,
    config: &WorkspaceConfig,
    clock: &dyn Clock,
) -> Result<()> {
    let entry = PostEntry {
        date: date_to_entry_date(clock.today()),
        url,
        impressions,
        engagement,
    };

    let storage = AnalyticsStorage::new(config.analytics_path.clone());
    let length = storage.track_post(&entry).await?;
    info!("Tracked post {entry:?}");

    println!(
        "Tracked {} ({impressions} impressions, {engagement} engagement), {length} posts tracked",
        entry.url
    );
    Ok(())
}
