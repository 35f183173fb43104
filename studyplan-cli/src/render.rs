//! Terminal rendering for the interactive menu.

use chrono::NaiveDateTime;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use studyplan_core::{BlockKind, Priority, StudyBlock, StudyHours, TaskStatus};

/// `[████░░░░] 40.0%`, filled proportionally and clamped to the bar width.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((width as f64 * percent / 100.0).floor().max(0.0) as usize).min(width);
    format!("[{}{}] {percent:.1}%", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "🟢 Low",
        Priority::Medium => "🟡 Medium",
        Priority::High => "🟠 High",
        Priority::Urgent => "🔴 Urgent",
    }
}

pub fn priority_cell(priority: Priority) -> Cell {
    let color = match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::DarkYellow,
        Priority::Urgent => Color::Red,
    };
    Cell::new(priority_label(priority)).fg(color)
}

pub fn status_cell(status: TaskStatus) -> Cell {
    let color = match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::InProgress => Color::Cyan,
        TaskStatus::Completed => Color::Green,
    };
    Cell::new(status.name()).fg(color)
}

pub fn subject_emoji(subject: &str) -> &'static str {
    const EMOJIS: [(&str, &str); 10] = [
        ("math", "📐"),
        ("physic", "⚡"),
        ("chemi", "🧪"),
        ("biolog", "🧬"),
        ("computer", "💻"),
        ("history", "📜"),
        ("geograph", "🌍"),
        ("language", "💬"),
        ("literature", "📖"),
        ("art", "🎨"),
    ];
    let lower = subject.to_lowercase();
    EMOJIS
        .iter()
        .find(|(key, _)| lower.contains(key))
        .map(|(_, e)| *e)
        .unwrap_or("📚")
}

pub fn time_range(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
}

pub fn kind_label(kind: &BlockKind) -> String {
    match kind {
        BlockKind::Study => "🎯 Study".to_string(),
        BlockKind::Break => "☕ Break".to_string(),
        BlockKind::Review => "🔁 Review".to_string(),
        BlockKind::Other(label) => label.clone(),
    }
}

/// Empty table with bold headers.
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

/// Time, subject, type and comment per block.
pub fn block_table(blocks: &[StudyBlock]) -> Table {
    let mut t = table(&["Time", "Task", "Type", "Comment"]);
    for b in blocks {
        let kind = Cell::new(kind_label(&b.kind));
        let kind = match b.kind {
            BlockKind::Break => kind.fg(Color::Cyan),
            BlockKind::Study => kind.fg(Color::Green),
            _ => kind,
        };
        t.add_row(vec![
            Cell::new(time_range(b.start(), b.end())),
            Cell::new(&b.subject),
            kind,
            Cell::new(b.description.as_deref().unwrap_or_default()),
        ]);
    }
    t
}

/// One row per configured day, Monday first.
pub fn hours_table(hours: &StudyHours) -> Table {
    let mut t = table(&["Day", "Slots"]);
    for (day, slots) in hours.to_raw() {
        t.add_row(vec![day, slots.join(", ")]);
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use studyplan_core::default_study_hours;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn row_with<'a>(rendered: &'a str, needle: &str) -> &'a str {
        rendered.lines().find(|l| l.contains(needle)).unwrap()
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(40.0, 10), "[████░░░░░░] 40.0%");
        assert_eq!(progress_bar(0.0, 4), "[░░░░] 0.0%");
        assert_eq!(progress_bar(150.0, 4), "[████] 150.0%");
    }

    #[test]
    fn test_subject_emoji() {
        assert_eq!(subject_emoji("Applied Mathematics"), "📐");
        assert_eq!(subject_emoji("PHYSICS"), "⚡");
        assert_eq!(subject_emoji("Cooking"), "📚");
    }

    #[test]
    fn test_time_range() {
        assert_eq!(time_range(at(9, 5), at(10, 30)), "09:05 - 10:30");
    }

    #[test]
    fn test_block_table_rows() {
        let blocks = vec![
            StudyBlock::new(at(9, 0), at(10, 30), "Physics", BlockKind::Study)
                .unwrap()
                .with_description("mechanics"),
            StudyBlock::new(at(10, 30), at(10, 45), "Pause", BlockKind::Break).unwrap(),
        ];
        let rendered = block_table(&blocks).to_string();

        assert!(row_with(&rendered, "Time").contains("Comment"));
        let first = row_with(&rendered, "09:00 - 10:30");
        assert!(first.contains("Physics"));
        assert!(first.contains("mechanics"));
        assert!(row_with(&rendered, "10:30 - 10:45").contains("Break"));
    }

    #[test]
    fn test_hours_table_lists_days_in_order() {
        let rendered = hours_table(&default_study_hours()).to_string();
        assert!(row_with(&rendered, "Friday").contains("09:00-12:00, 14:00-16:00"));

        let monday = rendered.find("Monday").unwrap();
        let friday = rendered.find("Friday").unwrap();
        assert!(monday < friday);
    }
}
