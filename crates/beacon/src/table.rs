use unicode_width::UnicodeWidthStr;

use beacon_core::{NotificationPanel, PollSource, badge_label};

use crate::color;

struct Row {
    source: String,
    badge: String,
    detail: String,
}

impl Row {
    fn is_clear(&self) -> bool {
        self.badge.is_empty()
    }
}

fn detail_for(items: &[(String, String)]) -> String {
    items
        .iter()
        .map(|(name, label)| format!("{} {}", name, label))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the notification panel as one row per source.
pub struct PanelTable {
    rows: Vec<Row>,
    source_width: usize,
    badge_width: usize,
}

impl PanelTable {
    pub fn new(panel: &NotificationPanel) -> Self {
        let mut rows: Vec<Row> = panel
            .categories
            .iter()
            .map(|entry| {
                let mut items: Vec<(String, String)> = entry
                    .sub_items
                    .iter()
                    .filter(|sub| sub.count > 0 || sub.has_updates)
                    .map(|sub| (sub.name.clone(), badge_label(sub.count, sub.has_updates)))
                    .collect();
                if !items.is_empty() && !entry.own.is_clear() {
                    items.push((
                        "other".to_string(),
                        badge_label(entry.own.count, entry.own.has_updates),
                    ));
                }
                Row {
                    source: entry.category.to_string(),
                    badge: badge_label(entry.total, entry.has_updates),
                    detail: detail_for(&items),
                }
            })
            .collect();
        rows.push(Row {
            source: PollSource::SystemUpdates.to_string(),
            badge: badge_label(panel.system.count, panel.system.has_updates),
            detail: String::new(),
        });

        // Minimum widths = header label lengths
        let source_width = rows
            .iter()
            .map(|r| display_width(&r.source))
            .fold("Source".len(), usize::max);
        let badge_width = rows
            .iter()
            .map(|r| display_width(&r.badge))
            .fold("Badge".len(), usize::max);

        Self {
            rows,
            source_width,
            badge_width,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}  {}  {}\n",
            color::bold(&pad("Source", self.source_width)),
            color::bold(&pad("Badge", self.badge_width)),
            color::bold("Detail"),
        ));
        for row in &self.rows {
            let source = pad(&row.source, self.source_width);
            let line = if row.is_clear() {
                format!(
                    "{}  {}",
                    color::muted(&source),
                    color::muted(&pad("-", self.badge_width))
                )
            } else {
                format!(
                    "{}  {}  {}",
                    color::tide(&source),
                    color::beam(&pad(&row.badge, self.badge_width)),
                    row.detail
                )
            };
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Display width of a string, counting wide characters (CJK, emoji) as two.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad a string to a minimum display width without truncating.
pub(crate) fn pad(s: &str, min_width: usize) -> String {
    let width = display_width(s);
    if width >= min_width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(min_width - width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{Category, Delta, NotificationStore, SubItemDelta};

    fn panel_with_returns() -> NotificationPanel {
        let store = NotificationStore::new();
        let mut delta = Delta::empty(PollSource::Category(Category::Returns));
        delta.sub_items.insert(
            "damaged".to_string(),
            SubItemDelta {
                count: 2,
                has_updates: true,
            },
        );
        delta.sub_items.insert(
            "wrong size".to_string(),
            SubItemDelta {
                count: 1,
                has_updates: true,
            },
        );
        store.apply_delta(delta);

        let mut logs = Delta::empty(PollSource::Category(Category::Logs));
        logs.has_updates = true;
        store.apply_delta(logs);
        NotificationPanel::from_state(&store.snapshot())
    }

    #[test]
    fn test_pad_shorter_than_width() {
        assert_eq!(pad("hi", 5), "hi   ");
    }

    #[test]
    fn test_pad_counts_wide_characters() {
        assert_eq!(display_width("•"), 1);
        assert_eq!(pad("報告", 6), "報告  ");
    }

    #[test]
    fn test_render_lists_every_source_with_details() {
        color::set_no_color();
        let output = PanelTable::new(&panel_with_returns()).render();
        let lines: Vec<&str> = output.lines().collect();

        // Header, six categories, system.
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("Source"));

        let returns = lines.iter().find(|l| l.starts_with("returns")).unwrap();
        assert!(returns.contains(" 3 "));
        assert!(returns.ends_with("damaged 2, wrong size 1"));

        let logs = lines.iter().find(|l| l.starts_with("logs")).unwrap();
        assert!(logs.contains('•'));

        let system = lines.iter().find(|l| l.starts_with("system")).unwrap();
        assert!(system.trim_end().ends_with('-'));
    }
}
