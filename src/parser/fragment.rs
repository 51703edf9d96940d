//! H2 section splitting.

use crate::types::Fragment;

/// Split document content into H2 fragments in document order.
///
/// A line opens a fragment only when it starts with `## `. Lines inside
/// fenced code blocks never do, and text before the first heading belongs
/// to no fragment.
pub fn split_fragments(content: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut current: Option<(&str, Vec<&str>)> = None;
    let mut fence: Option<Fence> = None;

    for line in content.lines() {
        if let Some(open) = fence {
            if open.closes(line) {
                fence = None;
            }
        } else if let Some(opened) = Fence::open(line) {
            fence = Some(opened);
        } else if let Some(heading) = line.strip_prefix("## ") {
            if let Some((heading, lines)) = current.take() {
                fragments.push(Fragment::new(heading, trim_blank_lines(&lines)));
            }
            current = Some((heading.trim(), Vec::new()));
            continue;
        }

        if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((heading, lines)) = current {
        fragments.push(Fragment::new(heading, trim_blank_lines(&lines)));
    }

    fragments
}

/// Join lines, dropping leading and trailing blank lines.
fn trim_blank_lines(lines: &[&str]) -> String {
    let is_blank = |line: &&str| line.trim().is_empty();

    let Some(start) = lines.iter().position(|l| !is_blank(l)) else {
        return String::new();
    };
    let end = lines.iter().rposition(|l| !is_blank(l)).unwrap_or(start);

    lines[start..=end].join("\n")
}

/// An open code fence (```` ``` ```` or `~~~`).
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Fence { marker, len })
    }

    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let len = trimmed.chars().take_while(|c| *c == self.marker).count();
        len >= self.len && trimmed.chars().all(|c| c == self.marker)
    }
}
