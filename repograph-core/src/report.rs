// Report generation from a shaped repository graph

use crate::graph::{GraphNode, MAIN_NODE_ID, NodeGroup, RepoGraph};
use crate::repo_url::repository_web_url;
use repograph_fetcher::RepositoryReference;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Dot,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "dot" | "graphviz" => Some(ReportFormat::Dot),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Dot => "dot",
        }
    }
}

pub fn generate_report(
    format: ReportFormat,
    repository: &RepositoryReference,
    graph: &RepoGraph,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(repository, graph)),
        ReportFormat::Json => generate_json_report(repository, graph),
        ReportFormat::Dot => Ok(generate_dot_report(repository, graph)),
    }
}

pub fn generate_text_report(repository: &RepositoryReference, graph: &RepoGraph) -> String {
    let stats = graph.stats();
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str(&format!("Repository:   {}\n", repository));
    report.push_str(&format!("URL:          {}\n", repository_web_url(repository)));
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str("# Summary:\n");
    report.push_str(&format!("  Branches: {}\n", stats.branches));
    report.push_str(&format!("  Commits:  {}\n", stats.commits));
    report.push_str(&format!("  Nodes:    {}\n", stats.nodes));
    report.push_str(&format!("  Links:    {}\n\n", stats.edges));

    let Some(hub) = graph.node(MAIN_NODE_ID) else {
        report.push_str("  (empty)\n");
        return report;
    };

    report.push_str(&format!("{}\n", display_name(hub)));

    let mut hub_children = graph.children(MAIN_NODE_ID);
    // Commits on the hub first, then the branches hanging off it
    hub_children.sort_by_key(|n| n.group != NodeGroup::Commit);

    for (i, child) in hub_children.iter().enumerate() {
        let is_last = i == hub_children.len() - 1;
        let (prefix, indent) = if is_last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        report.push_str(&format!("{}{}\n", prefix, describe_node(child)));

        let commits = graph.children(&child.id);
        for (j, commit) in commits.iter().enumerate() {
            let commit_prefix = if j == commits.len() - 1 { "└── " } else { "├── " };
            report.push_str(&format!("{}{}{}\n", indent, commit_prefix, describe_node(commit)));
        }
    }

    report
}

pub fn generate_json_report(
    repository: &RepositoryReference,
    graph: &RepoGraph,
) -> Result<String, serde_json::Error> {
    let stats = graph.stats();
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "repograph",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "repository": {
                "owner": repository.owner,
                "name": repository.name,
                "url": repository_web_url(repository)
            },
            "summary": stats,
            "nodes": graph.nodes,
            "links": graph.edges
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_dot_report(repository: &RepositoryReference, graph: &RepoGraph) -> String {
    let mut dot = String::new();
    dot.push_str(&format!("digraph \"{}\" {{\n", escape_dot(&repository.to_string())));
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=circle, style=filled, fontname=\"Helvetica\"];\n");

    for node in &graph.nodes {
        dot.push_str(&format!(
            "  \"{}\" [label=\"{}\", fillcolor=\"{}\", width={:.2}];\n",
            escape_dot(&node.id),
            escape_dot(node.label.as_deref().unwrap_or(&node.id)),
            group_color(node.group),
            node.size / 20.0
        ));
    }

    for edge in &graph.edges {
        dot.push_str(&format!(
            "  \"{}\" -> \"{}\";\n",
            escape_dot(&edge.source),
            escape_dot(&edge.target)
        ));
    }

    dot.push_str("}\n");
    dot
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Hex fill color per node group, shared with the terminal diagram palette
pub fn group_color(group: NodeGroup) -> &'static str {
    match group {
        NodeGroup::Main => "#fd8d3c",
        NodeGroup::Branch => "#56b4e9",
        NodeGroup::Commit => "#9ecae1",
    }
}

fn display_name(node: &GraphNode) -> &str {
    node.label.as_deref().unwrap_or(&node.id)
}

fn describe_node(node: &GraphNode) -> String {
    match node.group {
        NodeGroup::Commit => match node.author {
            Some(ref author) => format!("{}  ({})", display_name(node).replace('\n', " "), author),
            None => display_name(node).replace('\n', " "),
        },
        NodeGroup::Branch | NodeGroup::Main => format!("[{}]", display_name(node)),
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}
