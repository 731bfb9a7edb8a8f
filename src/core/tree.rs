//! Hierarchical view of a tree object.
//!
//! `ls-tree -r` lists blobs with full paths and leaves out the directories between
//! them. The directories are synthesized while building, one node per distinct path.
//! Nodes live in an arena and refer to each other by [`NodeId`].

use crate::core::{
    accessor::{QueryTreeContentParameters, RepositoryAccessor},
    error::Result,
    executor::CommandExecutor,
    parsers::{TreeEntry, TreeEntryKind},
};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNodeKind {
    Directory {
        #[serde(skip)]
        children: Vec<NodeId>,
    },
    File {
        object: String,
        mode: u32,
        size: Option<u64>,
    },
    Submodule {
        commit: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub path: String,
    pub name: String,
    #[serde(skip)]
    pub parent: Option<NodeId>,
    #[serde(flatten)]
    pub kind: TreeNodeKind,
}

impl TreeNode {
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, TreeNodeKind::Directory { .. })
    }

    fn rank(&self) -> u8 {
        match self.kind {
            TreeNodeKind::Directory { .. } => 0,
            TreeNodeKind::Submodule { .. } => 1,
            TreeNodeKind::File { .. } => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    treeish: String,
    nodes: Vec<TreeNode>,
}

impl Tree {
    pub const ROOT: NodeId = NodeId(0);

    /// A tree with only its root directory.
    pub fn empty(treeish: impl Into<String>) -> Self {
        Self {
            treeish: treeish.into(),
            nodes: vec![TreeNode {
                path: String::new(),
                name: String::new(),
                parent: None,
                kind: TreeNodeKind::Directory {
                    children: Vec::new(),
                },
            }],
        }
    }

    pub fn load<E: CommandExecutor>(
        accessor: &RepositoryAccessor<E>,
        treeish: impl Into<String>,
    ) -> Result<Self> {
        let mut tree = Self::empty(treeish);
        tree.refresh(accessor)?;
        Ok(tree)
    }

    pub fn from_entries(treeish: impl Into<String>, entries: &[TreeEntry]) -> Self {
        let mut tree = Self::empty(treeish);
        tree.rebuild(entries);
        tree
    }

    /// Re-reads the tree and rebuilds every node. Node ids from before are invalid.
    pub fn refresh<E: CommandExecutor>(&mut self, accessor: &RepositoryAccessor<E>) -> Result<()> {
        let entries =
            accessor.query_tree_content(&QueryTreeContentParameters::new(&self.treeish))?;
        self.rebuild(&entries);
        Ok(())
    }

    fn rebuild(&mut self, entries: &[TreeEntry]) {
        self.nodes.truncate(1);
        if let TreeNodeKind::Directory { children } = &mut self.nodes[0].kind {
            children.clear();
        }

        let mut directories = HashMap::from([(String::new(), Self::ROOT)]);
        for entry in entries {
            match entry.kind {
                TreeEntryKind::Tree => {
                    self.directory(&mut directories, &entry.path);
                }
                TreeEntryKind::Blob { size } => {
                    let kind = TreeNodeKind::File {
                        object: entry.object.clone(),
                        mode: entry.mode,
                        size,
                    };
                    self.leaf(&mut directories, &entry.path, kind);
                }
                TreeEntryKind::Commit => {
                    let kind = TreeNodeKind::Submodule {
                        commit: entry.object.clone(),
                    };
                    self.leaf(&mut directories, &entry.path, kind);
                }
            }
        }
        log::debug!(
            "Built tree {} with {} nodes from {} entries",
            self.treeish,
            self.nodes.len(),
            entries.len()
        );
    }

    fn leaf(&mut self, directories: &mut HashMap<String, NodeId>, path: &str, kind: TreeNodeKind) {
        let parent = match path.rsplit_once('/') {
            Some((dir, _)) => self.directory(directories, dir),
            None => Self::ROOT,
        };
        self.push(parent, path, kind);
    }

    fn directory(&mut self, directories: &mut HashMap<String, NodeId>, path: &str) -> NodeId {
        if let Some(id) = directories.get(path) {
            return *id;
        }
        let parent = match path.rsplit_once('/') {
            Some((dir, _)) => self.directory(directories, dir),
            None => Self::ROOT,
        };
        let id = self.push(
            parent,
            path,
            TreeNodeKind::Directory {
                children: Vec::new(),
            },
        );
        directories.insert(path.to_string(), id);
        id
    }

    fn push(&mut self, parent: NodeId, path: &str, kind: TreeNodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            parent: Some(parent),
            kind,
        });
        if let TreeNodeKind::Directory { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }
        id
    }

    pub fn treeish(&self) -> &str {
        &self.treeish
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Children in insertion order. Empty for anything but a directory.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).map(|node| &node.kind) {
            Some(TreeNodeKind::Directory { children }) => children,
            _ => &[],
        }
    }

    /// Directories first, then submodules, then files, each group by name.
    pub fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = self.children(id).to_vec();
        children.sort_by(|a, b| {
            let (a, b) = (&self.nodes[a.0], &self.nodes[b.0]);
            match a.rank().cmp(&b.rank()) {
                Ordering::Equal => a.name.cmp(&b.name),
                other => other,
            }
        });
        children
    }

    pub fn find(&self, path: &str) -> Option<NodeId> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Some(Self::ROOT);
        }
        self.nodes
            .iter()
            .position(|node| node.path == path)
            .map(NodeId)
    }

    /// Depth-first walk in [`Tree::sorted_children`] order, root excluded.
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        let mut stack: Vec<(usize, NodeId)> = self
            .sorted_children(Self::ROOT)
            .into_iter()
            .rev()
            .map(|id| (0, id))
            .collect();
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            stack.extend(
                self.sorted_children(id)
                    .into_iter()
                    .rev()
                    .map(|child| (depth + 1, child)),
            );
        }
        out
    }

    /// Every node but the root, in walk order.
    pub fn nodes(&self) -> Vec<&TreeNode> {
        self.walk()
            .into_iter()
            .map(|(_, id)| &self.nodes[id.0])
            .collect()
    }
}
