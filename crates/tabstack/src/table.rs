use crate::commands::replay::GroupSummary;

pub struct GroupTable {
    group_width: usize,
    name_width: usize,
    space_width: usize,
    active_width: usize,
    frame_width: usize,
    members_width: usize,
}

impl GroupTable {
    pub fn new(groups: &[GroupSummary]) -> Self {
        let members_width = groups
            .iter()
            .map(|g| members_label(g).chars().count())
            .max()
            .unwrap_or(16)
            .clamp(7, 60); // Between "Members" header and reasonable terminal width

        Self {
            group_width: 5,
            name_width: 16,
            space_width: 5,
            active_width: 6,
            frame_width: 24,
            members_width,
        }
    }

    pub fn print_table(&self, groups: &[GroupSummary]) {
        self.print_header();
        for group in groups {
            self.print_row(group);
        }
        self.print_footer();
    }

    fn print_header(&self) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!(
            "│ {:<width_group$} │ {:<width_name$} │ {:<width_space$} │ {:<width_active$} │ {:<width_frame$} │ {:<width_members$} │",
            "Group",
            "Name",
            "Space",
            "Active",
            "Frame",
            "Members",
            width_group = self.group_width,
            width_name = self.name_width,
            width_space = self.space_width,
            width_active = self.active_width,
            width_frame = self.frame_width,
            width_members = self.members_width,
        );
        println!("{}", self.border('├', '┼', '┤'));
    }

    fn print_footer(&self) {
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn print_row(&self, group: &GroupSummary) {
        let active = group
            .active
            .map_or("-".to_string(), |window| window.to_string());
        let frame = format!(
            "{},{} {}x{}",
            group.frame.x, group.frame.y, group.frame.width, group.frame.height
        );

        println!(
            "│ {:<width_group$} │ {:<width_name$} │ {:<width_space$} │ {:<width_active$} │ {:<width_frame$} │ {:<width_members$} │",
            truncate(&group.id.to_string(), self.group_width),
            truncate(group.name.as_deref().unwrap_or(""), self.name_width),
            truncate(&group.space.to_string(), self.space_width),
            truncate(&active, self.active_width),
            truncate(&frame, self.frame_width),
            truncate(&members_label(group), self.members_width),
            width_group = self.group_width,
            width_name = self.name_width,
            width_space = self.space_width,
            width_active = self.active_width,
            width_frame = self.frame_width,
            width_members = self.members_width,
        );
    }

    fn border(&self, left: char, join: char, right: char) -> String {
        let columns = [
            self.group_width,
            self.name_width,
            self.space_width,
            self.active_width,
            self.frame_width,
            self.members_width,
        ];
        let segments: Vec<String> = columns.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(&join.to_string()), right)
    }
}

/// Tab titles in bar order. Pinned tabs are starred, separators show as `|`.
fn members_label(group: &GroupSummary) -> String {
    group
        .windows
        .iter()
        .map(|w| {
            if w.separator {
                "|".to_string()
            } else if w.pinned {
                format!("*{}", w.title)
            } else {
                w.title.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Uses character count (not byte count) to safely handle UTF-8 strings
/// including emoji and multi-byte characters.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}
