//! Completion statistics over a user's task collection.
//!
//! Day bucketing convention: tasks are grouped by the UTC calendar day of
//! their creation timestamp (not completion). All timestamps are stored in
//! UTC, so a task created near midnight is assigned the same day no matter
//! where the server runs.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Task;

/// Overall completion ratio plus the completed tasks themselves.
#[derive(Debug, Serialize)]
pub struct CompletionStats {
    pub completed_tasks: Vec<Task>,
    /// `100 * completed / total`; 0 when the user has no tasks at all.
    pub completed_percentage: f64,
}

pub fn completion_stats(tasks: Vec<Task>) -> CompletionStats {
    let total = tasks.len();
    let completed_tasks: Vec<Task> = tasks.into_iter().filter(|task| task.completed).collect();

    let completed_percentage = if total == 0 {
        0.0
    } else {
        completed_tasks.len() as f64 / total as f64 * 100.0
    };

    CompletionStats {
        completed_tasks,
        completed_percentage,
    }
}

/// Completion ratio for one creation-day bucket.
#[derive(Debug, PartialEq, Serialize)]
pub struct DayStat {
    pub day: NaiveDate,
    pub percentage: f64,
}

/// Per-day completion ratios in ascending date order, plus their
/// unweighted mean.
#[derive(Debug, Serialize)]
pub struct DailyTrend {
    pub days: Vec<DayStat>,
    /// Mean of the per-day percentages. Days only enter the mean when they
    /// hold at least one task, and each day counts once regardless of how
    /// many tasks it holds.
    pub average_percentage: f64,
}

pub fn daily_completion_trend(tasks: &[Task]) -> DailyTrend {
    let mut by_day: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for task in tasks {
        let bucket = by_day.entry(task.created_at.date_naive()).or_insert((0, 0));
        bucket.0 += 1;
        if task.completed {
            bucket.1 += 1;
        }
    }

    let days: Vec<DayStat> = by_day
        .into_iter()
        .map(|(day, (total, completed))| {
            // A bucket only exists because a task landed in it, but guard
            // the division anyway.
            let percentage = if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64 * 100.0
            };
            DayStat { day, percentage }
        })
        .collect();

    let average_percentage = if days.is_empty() {
        0.0
    } else {
        days.iter().map(|d| d.percentage).sum::<f64>() / days.len() as f64
    };

    DailyTrend {
        days,
        average_percentage,
    }
}
