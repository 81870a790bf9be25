use crate::{record::SnapshotRecord, record::TRACKED_SEPARATOR, time::format_timestamp};

pub const LOG_HEADING: &str = "# Data Version Log";

/// Heading line plus the blank line that follows it.
pub fn heading_block() -> String {
    format!("{LOG_HEADING}\n\n")
}

/// Full text appended for one record: heading block followed by the entry.
pub fn render(record: &SnapshotRecord) -> String {
    let mut out = heading_block();
    out.push_str(&render_entry(record));
    out
}

/// The record without the heading block. Always ends with a blank line.
pub fn render_entry(record: &SnapshotRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("- Timestamp: {}\n", format_timestamp(&record.timestamp)));
    out.push_str(&format!("- Git commit: {}\n", record.commit_id));
    out.push_str("- Tracked:\n");
    for t in &record.tracked_paths {
        out.push_str(&format!("  - {}{}{}\n", t.label, TRACKED_SEPARATOR, t.path));
    }
    out.push_str("\nNotes:\n");
    for line in record.notes.lines() {
        out.push_str(&format!("- {line}\n"));
    }
    out.push('\n');
    out
}
