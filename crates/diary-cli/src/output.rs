//! Output formatting helpers for the CLI.

use comfy_table::presets::NOTHING;
use comfy_table::{ContentArrangement, Table};
use diary_core::storage::{DiaryStats, NotificationSettings, Task};
use diary_core::DiaryView;

const SUMMARY_CHARS: usize = 48;

/// First line of a body, shortened for table cells.
pub fn summary(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > SUMMARY_CHARS {
        let cut: String = first_line.chars().take(SUMMARY_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn diary_json(diary: &DiaryView) -> serde_json::Value {
    serde_json::json!({
        "id": diary.id,
        "title": diary.title,
        "content": diary.content,
        "is_encrypted": diary.is_encrypted,
        "decrypted": diary.decrypted,
        "entry_date": diary.entry_date,
        "daily_rating": diary.daily_rating,
        "created_at": diary.created_at,
        "updated_at": diary.updated_at,
    })
}

pub fn print_diary_list(diaries: &[DiaryView], json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        let values: Vec<_> = diaries.iter().map(diary_json).collect();
        return print_json(&values);
    }
    if quiet {
        for diary in diaries {
            println!("{}", diary.id);
        }
        return Ok(());
    }
    if diaries.is_empty() {
        println!("No diary entries.");
        return Ok(());
    }

    let rows = diaries
        .iter()
        .map(|d| {
            vec![
                d.id.to_string(),
                d.entry_date.format("%Y-%m-%d").to_string(),
                d.title.clone().unwrap_or_default(),
                encryption_label(d, "yes", "").to_string(),
                d.daily_rating.clone().unwrap_or_default(),
                summary(&d.content),
            ]
        })
        .collect();
    println!(
        "{}",
        table(&["ID", "DATE", "TITLE", "ENC", "RATING", "SUMMARY"], rows)
    );
    Ok(())
}

/// Encryption state for display. Rows opened for this read show as "opened".
fn encryption_label<'a>(diary: &DiaryView, sealed: &'a str, plain: &'a str) -> &'a str {
    match (diary.is_encrypted, diary.decrypted) {
        (true, true) => "opened",
        (true, false) => sealed,
        (false, _) => plain,
    }
}

pub fn print_diary(diary: &DiaryView, json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&diary_json(diary));
    }
    if !quiet {
        println!("ID: {}", diary.id);
        if let Some(ref title) = diary.title {
            println!("Title: {}", title);
        }
        println!("Date: {}", diary.entry_date.to_rfc3339());
        println!("Encrypted: {}", encryption_label(diary, "yes", "no"));
        if let Some(ref rating) = diary.daily_rating {
            println!("Rating: {}", rating);
        }
        println!();
    }
    println!("{}", diary.content);
    Ok(())
}

pub fn print_stats(stats: &DiaryStats, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(stats);
    }
    println!("Entries: {}", stats.total_entries);
    println!("Words: {}", stats.total_words);
    println!("Average words/entry: {:.1}", stats.average_words_per_entry);
    println!("Check-in rate: {:.1}%", stats.check_in_frequency_percentage);
    if !stats.daily_ratings_distribution.is_empty() {
        println!("Ratings:");
        for (rating, count) in &stats.daily_ratings_distribution {
            println!("  {}: {}", rating, count);
        }
    }
    Ok(())
}

pub fn print_task_list(tasks: &[Task], json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        return print_json(tasks);
    }
    if quiet {
        for task in tasks {
            println!("{}", task.id);
        }
        return Ok(());
    }
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    let rows = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                if t.completed { "x" } else { " " }.to_string(),
                t.importance.to_string(),
                t.due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                summary(&t.title),
            ]
        })
        .collect();
    println!(
        "{}",
        table(&["ID", "DONE", "IMPORTANCE", "DUE", "TITLE"], rows)
    );
    Ok(())
}

pub fn print_task(task: &Task, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(task);
    }
    println!("ID: {}", task.id);
    println!("Title: {}", task.title);
    println!("Importance: {}", task.importance);
    println!("Completed: {}", if task.completed { "yes" } else { "no" });
    if let Some(due) = task.due_date {
        println!("Due: {}", due.to_rfc3339());
    }
    if let Some(reminder) = task.reminder_time {
        println!("Reminder: {}", reminder.to_rfc3339());
    }
    if let Some(ref description) = task.description {
        println!();
        println!("{}", description);
    }
    Ok(())
}

pub fn print_notification_settings(settings: &NotificationSettings, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(settings);
    }
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    let value = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let rows = vec![
        vec![
            "email".to_string(),
            on_off(settings.email_enabled).to_string(),
            value(&settings.email_address),
        ],
        vec![
            "wecom".to_string(),
            on_off(settings.wecom_enabled).to_string(),
            value(&settings.wecom_webhook_url),
        ],
        vec![
            "dingtalk".to_string(),
            on_off(settings.dingtalk_enabled).to_string(),
            value(&settings.dingtalk_webhook_url),
        ],
        vec![
            "telegram".to_string(),
            on_off(settings.telegram_enabled).to_string(),
            value(&settings.telegram_chat_id),
        ],
    ];
    println!("{}", table(&["CHANNEL", "STATE", "TARGET"], rows));
    Ok(())
}
