#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Same,
    Added,
    Removed,
    Changed,
}

impl DiffKind {
    pub fn label(self) -> &'static str {
        match self {
            DiffKind::Same => "same",
            DiffKind::Added => "added",
            DiffKind::Removed => "removed",
            DiffKind::Changed => "changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRow {
    pub id: String,
    pub kind: DiffKind,
    pub before: String,
    pub after: String,
}

fn split_lines(text: &str) -> Vec<String> {
    text.replace('\r', "").split('\n').map(str::to_string).collect()
}

/// Line-by-line comparison of two essay versions: a plain positional walk,
/// not an edit-distance diff, matching how version review presents changes.
pub fn version_diff_rows(base_text: &str, compare_text: &str) -> Vec<DiffRow> {
    let left = split_lines(base_text);
    let right = split_lines(compare_text);
    let max_lines = left.len().max(right.len());

    let mut rows = Vec::with_capacity(max_lines);
    for i in 0..max_lines {
        let before = left.get(i).cloned().unwrap_or_default();
        let after = right.get(i).cloned().unwrap_or_default();
        let kind = if before == after {
            DiffKind::Same
        } else if before.is_empty() {
            DiffKind::Added
        } else if after.is_empty() {
            DiffKind::Removed
        } else {
            DiffKind::Changed
        };
        rows.push(DiffRow {
            id: format!("{}-{i}", kind.label()),
            kind,
            before,
            after,
        });
    }
    rows
}
