use std::{cmp::Ordering, io, path::Path};

use icu_collator::{Collator, CollatorOptions};
use rocket::serde::Serialize;

use crate::workspace::{DirectoryEntry, DirectoryReader, relative_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Dir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    pub fn file(name: String, path: String) -> Self {
        Self {
            name,
            path,
            kind: NodeKind::File,
            children: None,
        }
    }

    pub fn dir(name: String, path: String, children: Vec<TreeNode>) -> Self {
        Self {
            name,
            path,
            kind: NodeKind::Dir,
            children: Some(children),
        }
    }
}

/// Locale-aware name ordering (root collation, tertiary strength): accents
/// and case only break ties, symbols sort before digits and letters.
pub struct NameCollator(Collator);

impl NameCollator {
    pub fn new() -> io::Result<Self> {
        Collator::try_new(&Default::default(), CollatorOptions::new())
            .map(Self)
            .map_err(|error| io::Error::other(error.to_string()))
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.0.compare(a, b).then_with(|| a.cmp(b))
    }

    fn listing_order(&self, a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| self.compare(&a.name, &b.name))
    }
}

/// Lists the markdown files below `dir`, keeping only directories that
/// (transitively) contain at least one of them.
pub fn build_tree<R>(reader: &R, dir: &Path, root: &Path) -> io::Result<Vec<TreeNode>>
where
    R: DirectoryReader + ?Sized,
{
    let collator = NameCollator::new()?;
    collect_nodes(reader, &collator, dir, root)
}

fn collect_nodes<R>(
    reader: &R,
    collator: &NameCollator,
    dir: &Path,
    root: &Path,
) -> io::Result<Vec<TreeNode>>
where
    R: DirectoryReader + ?Sized,
{
    let mut entries: Vec<DirectoryEntry> = reader
        .read_dir(dir)?
        .into_iter()
        .filter(|entry| !entry.is_excluded())
        .collect();
    entries.sort_by(|a, b| collator.listing_order(a, b));

    let mut nodes = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = dir.join(&entry.name);

        if entry.is_dir {
            let children = collect_nodes(reader, collator, &path, root)?;
            if !children.is_empty() {
                nodes.push(TreeNode::dir(entry.name, relative_path(root, &path), children));
            }
        } else if entry.is_markdown() {
            nodes.push(TreeNode::file(entry.name, relative_path(root, &path)));
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::workspace::testing::MemoryReader;

    fn names(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|node| node.name.as_str()).collect()
    }

    #[test]
    fn hidden_vendored_and_foreign_files_are_left_out() {
        let root = Path::new("/docs");
        let reader = MemoryReader::new(
            root,
            &["a/b.md", "a/c.txt", ".hidden/d.md", "node_modules/e.md"],
        );

        let tree = build_tree(&reader, root, root).unwrap();

        assert_eq!(
            tree,
            vec![TreeNode::dir(
                "a".to_owned(),
                "a".to_owned(),
                vec![TreeNode::file("b.md".to_owned(), "a/b.md".to_owned())],
            )]
        );
    }

    #[test]
    fn directories_without_markdown_are_pruned() {
        let root = Path::new("/docs");
        let reader = MemoryReader::new(
            root,
            &["assets/logo.png", "empty/", "deep/er/still/note.md", "deep/other/x.rs"],
        );

        let tree = build_tree(&reader, root, root).unwrap();

        assert_eq!(names(&tree), ["deep"]);
        let deep = tree[0].children.as_deref().unwrap();
        assert_eq!(names(deep), ["er"]);
        let still = deep[0].children.as_deref().unwrap();
        assert_eq!(still[0].path, "deep/er/still");
        assert_eq!(
            still[0].children.as_deref().unwrap()[0].path,
            "deep/er/still/note.md"
        );
    }

    #[test]
    fn directories_come_first_then_names_in_order() {
        let root = Path::new("/docs");
        let reader = MemoryReader::new(
            root,
            &["zeta.md", "Beta.md", "alpha.md", "notes/x.md", "Guides/y.md", "api/z.md"],
        );

        let tree = build_tree(&reader, root, root).unwrap();

        assert_eq!(
            names(&tree),
            ["api", "Guides", "notes", "alpha.md", "Beta.md", "zeta.md"]
        );
        assert_eq!(tree[0].kind, NodeKind::Dir);
        assert_eq!(tree[3].kind, NodeKind::File);
    }

    #[test]
    fn file_nodes_have_no_children() {
        let root = Path::new("/docs");
        let reader = MemoryReader::new(root, &["readme.md"]);

        let tree = build_tree(&reader, root, root).unwrap();

        assert_eq!(tree[0].children, None);
        let json = rocket::serde::json::to_string(&tree).unwrap();
        assert_eq!(json, r#"[{"name":"readme.md","path":"readme.md","type":"file"}]"#);
    }

    #[test]
    fn unreadable_directories_fail_the_whole_tree() {
        let reader = MemoryReader::new(Path::new("/docs"), &["a.md"]);
        assert!(build_tree(&reader, Path::new("/elsewhere"), Path::new("/elsewhere")).is_err());
    }

    #[test]
    fn accents_and_symbols_sort_like_a_locale_listing() {
        let root = Path::new("/docs");
        let reader = MemoryReader::new(
            root,
            &["fig.md", "éclair.md", "~notes.md", "zeta.md", "Zeta.md", "a10.md", "a2.md"],
        );

        let tree = build_tree(&reader, root, root).unwrap();

        assert_eq!(
            names(&tree),
            ["~notes.md", "a10.md", "a2.md", "éclair.md", "fig.md", "zeta.md", "Zeta.md"]
        );
    }

    #[test]
    fn case_only_differences_put_lowercase_first() {
        let collator = NameCollator::new().unwrap();
        assert_eq!(collator.compare("readme", "README"), Ordering::Less);
        assert_eq!(collator.compare("Apple", "banana"), Ordering::Less);
        assert_eq!(collator.compare("b", "B"), Ordering::Less);
        assert_eq!(collator.compare("same", "same"), Ordering::Equal);
    }
}
