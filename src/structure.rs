//! Hierarchical view of the scanned project with content attached to selected files.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{Candidate, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructureNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StructureNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl StructureNode {
    fn directory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Directory,
            children: Vec::new(),
            importance: None,
            tokens: None,
            content: None,
        }
    }

    fn file(name: &str, selected: Option<&Candidate>) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::File,
            children: Vec::new(),
            importance: selected.map(|c| c.score),
            tokens: selected.map(|c| c.tokens),
            content: selected.map(|c| c.content.clone()),
        }
    }

    pub fn file_count(&self) -> usize {
        match self.kind {
            NodeKind::File => 1,
            NodeKind::Directory => self.children.iter().map(|c| c.file_count()).sum(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Default)]
struct DirTree<'a> {
    dirs: BTreeMap<String, DirTree<'a>>,
    files: BTreeMap<String, Option<&'a Candidate>>,
}

impl<'a> DirTree<'a> {
    fn insert(&mut self, relative_path: &str, selected: Option<&'a Candidate>) {
        let mut parts: Vec<&str> = relative_path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(file_name) = parts.pop() else {
            return;
        };

        let mut node = self;
        for dir in parts {
            node = node.dirs.entry(dir.to_string()).or_default();
        }
        node.files.insert(file_name.to_string(), selected);
    }

    fn into_node(self, name: &str) -> StructureNode {
        let mut children: Vec<StructureNode> = self
            .dirs
            .into_iter()
            .map(|(dir_name, tree)| tree.into_node(&dir_name))
            .collect();
        children.extend(
            self.files
                .into_iter()
                .map(|(file_name, selected)| StructureNode::file(&file_name, selected)),
        );
        children.sort_by(|a, b| a.name.cmp(&b.name));

        let mut node = StructureNode::directory(name);
        node.children = children;
        node
    }
}

/// Build the project tree from every file the selection saw.
///
/// Selected files carry their content, score and token estimate; rejected and
/// skipped files appear as bare entries. Ignored paths are absent.
pub fn build_structure(project_name: &str, selection: &Selection) -> StructureNode {
    let mut tree = DirTree::default();
    for candidate in &selection.files {
        tree.insert(candidate.relative_path(), Some(candidate));
    }
    for candidate in &selection.rejected {
        tree.insert(candidate.relative_path(), None);
    }
    for skipped in &selection.skipped {
        tree.insert(&skipped.relative_path, None);
    }

    tree.into_node(project_name)
}

/// Render an indented text tree, marking selected files with `*`.
pub fn render_tree(node: &StructureNode) -> String {
    let mut out = format!("{}/\n", node.name);
    render_children(node, "", &mut out);
    out
}

fn render_children(node: &StructureNode, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        let branch = if last { "└── " } else { "├── " };
        let marker = if child.content.is_some() { " *" } else { "" };
        let suffix = if child.kind == NodeKind::Directory { "/" } else { "" };
        out.push_str(&format!("{}{}{}{}{}\n", prefix, branch, child.name, suffix, marker));

        if child.kind == NodeKind::Directory {
            let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_children(child, &next, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkipReason;
    use crate::types::{FileEntry, SkippedFile};
    use std::path::PathBuf;

    fn candidate(path: &str, content: &str) -> Candidate {
        Candidate {
            entry: FileEntry::new(PathBuf::from(path), path.to_string(), content.len() as u64),
            content: content.to_string(),
            score: 7,
            tokens: 3,
        }
    }

    fn selection() -> Selection {
        Selection {
            files: vec![candidate("src/main.rs", "fn main() {}"), candidate("README.md", "# hi")],
            rejected: vec![candidate("src/big/data.rs", "...")],
            skipped: vec![SkippedFile {
                relative_path: "assets/logo.bin".to_string(),
                reason: SkipReason::Binary,
            }],
            ..Selection::default()
        }
    }

    #[test]
    fn test_build_structure() {
        let root = build_structure("demo", &selection());

        assert_eq!(root.name, "demo");
        assert_eq!(root.kind, NodeKind::Directory);
        assert_eq!(root.file_count(), 4);

        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["README.md", "assets", "src"]);

        let src = root.children.iter().find(|c| c.name == "src").unwrap();
        let main = src.children.iter().find(|c| c.name == "main.rs").unwrap();
        assert_eq!(main.content.as_deref(), Some("fn main() {}"));
        assert_eq!(main.importance, Some(7));

        let big = src.children.iter().find(|c| c.name == "big").unwrap();
        assert!(big.children[0].content.is_none());
    }

    #[test]
    fn test_json_shape() {
        let json = build_structure("demo", &selection()).to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "directory");
        assert_eq!(value["children"][0]["type"], "file");
        assert_eq!(value["children"][0]["content"], "# hi");
        assert!(value["children"][1]["children"][0].get("content").is_none());
    }

    #[test]
    fn test_render_tree() {
        let text = render_tree(&build_structure("demo", &selection()));
        assert!(text.starts_with("demo/\n"));
        assert!(text.contains("├── README.md *"));
        assert!(text.contains("└── src/"));
        assert!(text.contains("    ├── big/"));
        assert!(text.contains("main.rs *"));
    }

    #[test]
    fn test_empty_selection() {
        let root = build_structure("empty", &Selection::default());
        assert!(root.children.is_empty());
        assert_eq!(render_tree(&root), "empty/\n");
    }
}
