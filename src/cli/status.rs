use std::{fmt::Write, io::IsTerminal};

use ansi_term::{Colour, Style};
use anyhow::Result;

use crate::{
    config::WorkspaceConfig,
    store::{
        analytics::{AnalyticsStorage, Summary},
        tasks::{load_task_counts, TaskCounts},
    },
};

/// Command to process `status`. Read only, nothing is created when files are missing.
pub async fn process_status_command(config: &WorkspaceConfig) -> Result<()> {
    let summary = AnalyticsStorage::new(config.analytics_path.clone())
        .summary()
        .await?;
    let counts = load_task_counts(&config.master_tasks_path, &config.task_category).await?;

    let colored = std::io::stdout().is_terminal();
    print!(
        "{}",
        render_status(&summary, &counts, &config.task_category, colored)?
    );
    Ok(())
}

fn render_status(
    summary: &Summary,
    counts: &TaskCounts,
    category: &str,
    colored: bool,
) -> Result<String> {
    let (heading, value) = if colored {
        (Colour::Cyan.bold(), Colour::Green.normal())
    } else {
        (Style::new(), Style::new())
    };

    let engagement = summary
        .engagement_rate
        .map_or_else(|| "n/a".to_string(), |v| v.to_string());

    let sections: [(String, Vec<(&str, String)>); 3] = [
        (
            "Metrics".to_string(),
            vec![
                ("Connections", summary.connections.to_string()),
                ("Profile views", summary.profile_views.to_string()),
                ("Engagement rate", engagement),
                ("Leads", summary.leads.to_string()),
            ],
        ),
        (
            "Activity".to_string(),
            vec![
                ("Daily entries", summary.daily_entries.to_string()),
                ("Tracked posts", summary.posts.to_string()),
            ],
        ),
        (
            format!("Tasks ({category})"),
            vec![
                ("Backlog", counts.backlog.to_string()),
                ("In progress", counts.in_progress.to_string()),
                ("Done", counts.done.to_string()),
            ],
        ),
    ];

    let mut output = String::new();
    for (title, rows) in sections {
        writeln!(output, "{}", heading.paint(title))?;
        for (name, amount) in rows {
            writeln!(output, "  {name:<18}{}", value.paint(amount))?;
        }
    }
    Ok(output)
}
