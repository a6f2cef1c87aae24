// Shaping fetched branches and commits into a node/link graph

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use repograph_fetcher::BranchCommits;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Id of the hub node every other branch hangs off
pub const MAIN_NODE_ID: &str = "main";

pub const MAIN_NODE_SIZE: f64 = 20.0;
pub const BRANCH_NODE_SIZE: f64 = 15.0;
pub const COMMIT_NODE_SIZE: f64 = 8.0;

/// Longest commit label shown untouched
pub const LABEL_MAX_CHARS: usize = 20;
const LABEL_KEEP_CHARS: usize = 17;
const LABEL_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroup {
    Main,
    Branch,
    Commit,
}

impl NodeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeGroup::Main => "main",
            NodeGroup::Branch => "branch",
            NodeGroup::Commit => "commit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub group: NodeGroup,
    pub size: f64,
    /// Set on the stand-in hub inserted when no fetched branch is the hub
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub branches: usize,
    pub commits: usize,
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("graph has no \"main\" node")]
    MissingMain,

    #[error("node id {0:?} appears more than once")]
    DuplicateNode(String),

    #[error("edge {from:?} -> {to:?} references an unknown node")]
    DanglingEdge { from: String, to: String },

    #[error("node {node:?} has {count} incoming edges, expected {expected}")]
    IncomingCount {
        node: String,
        count: usize,
        expected: usize,
    },

    #[error("node {node:?} hangs off {parent:?}, which is not a valid parent")]
    WrongParent { node: String, parent: String },
}

/// Nodes and links handed to the layout engine. Built once per successful
/// fetch and always replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoGraph {
    pub nodes: Vec<GraphNode>,
    #[serde(rename = "links")]
    pub edges: Vec<GraphEdge>,
}

impl RepoGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Direct successors of `id`, in edge order
    pub fn children(&self, id: &str) -> Vec<&GraphNode> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .filter_map(|e| self.node(&e.target))
            .collect()
    }

    /// Counts only nodes backed by fetched data; a placeholder hub is not a branch
    pub fn stats(&self) -> GraphStats {
        let branches = self
            .nodes
            .iter()
            .filter(|n| n.group != NodeGroup::Commit && !n.placeholder)
            .count();
        let commits = self
            .nodes
            .iter()
            .filter(|n| n.group == NodeGroup::Commit)
            .count();

        GraphStats {
            branches,
            commits,
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        }
    }

    /// Index-weighted petgraph view: each node weight is its position in `nodes`.
    /// Edges whose endpoints are unknown are skipped.
    pub fn to_petgraph(&self) -> DiGraph<usize, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let indices: HashMap<&str, NodeIndex> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), graph.add_node(i)))
            .collect();

        for edge in &self.edges {
            if let (Some(&a), Some(&b)) = (
                indices.get(edge.source.as_str()),
                indices.get(edge.target.as_str()),
            ) {
                graph.add_edge(a, b, ());
            }
        }

        graph
    }

    /// Check the structural invariants: a single `main` hub with no parent,
    /// every other branch hanging off `main` exactly once, every commit
    /// hanging off exactly one branch.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if seen.insert(node.id.as_str(), i).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }
        if !seen.contains_key(MAIN_NODE_ID) {
            return Err(GraphError::MissingMain);
        }

        for edge in &self.edges {
            if !seen.contains_key(edge.source.as_str()) || !seen.contains_key(edge.target.as_str()) {
                return Err(GraphError::DanglingEdge {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                });
            }
        }

        let graph = self.to_petgraph();
        for index in graph.node_indices() {
            let node = &self.nodes[graph[index]];
            let parents: Vec<&GraphNode> = graph
                .neighbors_directed(index, Direction::Incoming)
                .map(|p| &self.nodes[graph[p]])
                .collect();

            let expected = if node.id == MAIN_NODE_ID { 0 } else { 1 };
            if parents.len() != expected {
                return Err(GraphError::IncomingCount {
                    node: node.id.clone(),
                    count: parents.len(),
                    expected,
                });
            }

            if let Some(parent) = parents.first() {
                let valid = match node.group {
                    NodeGroup::Branch => parent.id == MAIN_NODE_ID,
                    NodeGroup::Commit => parent.group != NodeGroup::Commit,
                    NodeGroup::Main => false,
                };
                if !valid {
                    return Err(GraphError::WrongParent {
                        node: node.id.clone(),
                        parent: parent.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Shorten a commit message for display.
///
/// Messages longer than [`LABEL_MAX_CHARS`] characters become their first 17
/// characters followed by `...`; shorter ones are returned unchanged.
/// Lengths count characters, not bytes.
pub fn truncate_label(message: &str) -> String {
    if message.chars().count() > LABEL_MAX_CHARS {
        let mut label: String = message.chars().take(LABEL_KEEP_CHARS).collect();
        label.push_str(LABEL_ELLIPSIS);
        label
    } else {
        message.to_string()
    }
}

/// Node id for a branch. The hub branch is always `main`; an ordinary branch
/// that happens to be called `main` is renamed so the two cannot collide.
pub fn branch_node_id(name: &str, hub_branch: &str) -> String {
    if name == hub_branch {
        MAIN_NODE_ID.to_string()
    } else if name == MAIN_NODE_ID {
        format!("{}@branch", name)
    } else {
        name.to_string()
    }
}

pub fn commit_node_id(branch: &str, index: usize) -> String {
    format!("{}-commit-{}", branch, index)
}

/// Build the display graph from fetched branches.
///
/// `hub_branch` names the branch that becomes the `main` node. When no
/// fetched branch carries that name a bare `main` hub is inserted so that
/// every other branch still has a parent.
pub fn shape_graph(branches: &[BranchCommits], hub_branch: &str) -> RepoGraph {
    let mut graph = RepoGraph::default();

    if !branches.iter().any(|b| b.name == hub_branch) {
        graph.nodes.push(GraphNode {
            id: MAIN_NODE_ID.to_string(),
            label: Some(MAIN_NODE_ID.to_string()),
            author: None,
            group: NodeGroup::Main,
            size: MAIN_NODE_SIZE,
            placeholder: true,
        });
    }

    for branch in branches {
        let is_hub = branch.name == hub_branch;
        let branch_id = branch_node_id(&branch.name, hub_branch);

        graph.nodes.push(GraphNode {
            id: branch_id.clone(),
            label: Some(branch.name.clone()),
            author: None,
            group: if is_hub { NodeGroup::Main } else { NodeGroup::Branch },
            size: if is_hub { MAIN_NODE_SIZE } else { BRANCH_NODE_SIZE },
            placeholder: false,
        });

        if !is_hub {
            graph.edges.push(GraphEdge {
                source: MAIN_NODE_ID.to_string(),
                target: branch_id.clone(),
            });
        }

        for (index, commit) in branch.commits.iter().enumerate() {
            let commit_id = commit_node_id(&branch.name, index);
            graph.nodes.push(GraphNode {
                id: commit_id.clone(),
                label: Some(truncate_label(&commit.message)),
                author: commit.author_name.clone(),
                group: NodeGroup::Commit,
                size: COMMIT_NODE_SIZE,
                placeholder: false,
            });
            graph.edges.push(GraphEdge {
                source: branch_id.clone(),
                target: commit_id,
            });
        }
    }

    graph
}
