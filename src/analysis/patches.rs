// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Patch clustering - partitions a file's fork changes by identical diff text

use crate::types::{ForkSummary, PatchGroup, PatchGrouping};
use std::collections::HashMap;

/// Partition forks by exact raw diff text
///
/// Forks with an empty diff never share a group: each becomes a singleton.
/// Groups come back in first-seen order; ranking happens separately.
#[must_use]
pub fn group_patches(forks: &[ForkSummary]) -> PatchGrouping {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut members: Vec<(String, Vec<ForkSummary>)> = Vec::new();

    for fork in forks {
        if fork.patch.is_empty() {
            members.push((String::new(), vec![fork.clone()]));
            continue;
        }
        match index.get(fork.patch.as_str()) {
            Some(&i) => members[i].1.push(fork.clone()),
            None => {
                index.insert(fork.patch.as_str(), members.len());
                members.push((fork.patch.clone(), vec![fork.clone()]));
            }
        }
    }

    PatchGrouping {
        groups: members
            .into_iter()
            .map(|(raw, forks)| PatchGroup::new(raw, forks))
            .collect(),
    }
}

/// Strip `@@` hunk headers, keeping context, added and removed lines
#[must_use]
pub fn clean_diff(patch: &str) -> String {
    patch
        .split('\n')
        .filter(|line| !line.starts_with("@@"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Cap a diff at `max_lines`, appending a summary line when cut
#[must_use]
pub fn truncate_diff(diff: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = diff.split('\n').collect();
    if lines.len() <= max_lines {
        return diff.to_string();
    }
    let remaining = lines.len() - max_lines;
    format!("{}\n... ({} more lines)", lines[..max_lines].join("\n"), remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fork(owner: &str, patch: &str) -> ForkSummary {
        ForkSummary {
            owner: owner.into(),
            repo: "widget".into(),
            html_url: String::new(),
            ahead_by: 1,
            commit_messages: vec![],
            additions: 1,
            deletions: 0,
            patch: patch.into(),
        }
    }

    #[test]
    fn test_partition_with_empty_diffs() {
        let forks = vec![
            fork("d1", "A"),
            fork("d2", "A"),
            fork("d3", "B"),
            fork("d4", ""),
            fork("d5", ""),
        ];

        let grouping = group_patches(&forks);

        assert_eq!(grouping.groups.len(), 4);
        let mut sizes: Vec<usize> = grouping.groups.iter().map(PatchGroup::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 1, 1, 2]);
        assert_eq!(sizes.iter().sum::<usize>(), 5);

        let shared = grouping.groups.iter().find(|g| g.len() == 2).unwrap();
        assert_eq!(shared.raw(), "A");
        assert_eq!(shared.owners(), vec!["d1", "d2"]);

        let empties = grouping.groups.iter().filter(|g| g.raw().is_empty()).count();
        assert_eq!(empties, 2);
    }

    #[test]
    fn test_equality_uses_raw_text() {
        // Same body, different hunk offsets: display text collides, raw does not.
        let a = "@@ -1,2 +1,2 @@\n-old\n+new";
        let b = "@@ -10,2 +10,2 @@\n-old\n+new";
        let grouping = group_patches(&[fork("alice", a), fork("bob", b)]);

        assert_eq!(grouping.groups.len(), 2);
        assert_eq!(grouping.groups[0].display(), grouping.groups[1].display());
        assert_ne!(grouping.groups[0].raw(), grouping.groups[1].raw());
    }

    #[test]
    fn test_clean_diff() {
        let patch = "@@ -1,3 +1,3 @@\n context\n-old\n+new\n@@ -20 +20 @@\n+more\n";
        assert_eq!(clean_diff(patch), "context\n-old\n+new\n+more");
        assert_eq!(clean_diff(""), "");
    }

    #[test]
    fn test_truncate_diff() {
        let diff = "a\nb\nc\nd";
        assert_eq!(truncate_diff(diff, 10), diff);
        assert_eq!(truncate_diff(diff, 4), diff);
        assert_eq!(truncate_diff(diff, 2), "a\nb\n... (2 more lines)");
    }

    #[test]
    fn test_group_id_is_content_hash() {
        let grouping = group_patches(&[fork("alice", "+x"), fork("bob", "+x"), fork("carol", "+y")]);
        let ids: Vec<String> = grouping.groups.iter().map(PatchGroup::id).collect();
        assert_eq!(ids[0], group_patches(&[fork("zed", "+x")]).groups[0].id());
        assert_ne!(ids[0], ids[1]);
        assert!(ids[0].starts_with("patch:"));
        assert_eq!(ids[0].len(), "patch:".len() + 8);
    }
}
