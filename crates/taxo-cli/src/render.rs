//! Text rendering of diff views, trees and version lists.

use std::fmt::{Display, Write};

use colored::{ColoredString, Colorize};

use taxo_diff::{
    highlighted_fields, highlighted_resource_fields, text_delta, DiffNode, DiffSummary, DiffType,
    DiffView, FieldPair, NodeDiff, ResourceDiff, TextSegment, TrackedField,
};
use taxo_types::{TaxonomyNode, TaxonomyTree, Version};

fn marker(diff_type: DiffType) -> ColoredString {
    match diff_type {
        DiffType::Added => "+".green().bold(),
        DiffType::Deleted => "-".red().bold(),
        DiffType::Modified => "~".yellow().bold(),
        DiffType::None => " ".normal(),
    }
}

fn pair_text<T: Display>(pair: &FieldPair<T>) -> (String, String) {
    let show = |v: &Option<T>| v.as_ref().map_or_else(|| "(none)".to_string(), T::to_string);
    (show(&pair.original), show(&pair.other))
}

fn node_values(diff: &NodeDiff, field: TrackedField) -> (String, String) {
    match field {
        TrackedField::Name => pair_text(&diff.name),
        TrackedField::Path => pair_text(&diff.path),
        TrackedField::Visible => pair_text(&diff.visible),
        TrackedField::ConnectionId => pair_text(&diff.connection_id),
        TrackedField::Rank => pair_text(&diff.rank),
        TrackedField::RelevanceId => pair_text(&diff.relevance_id),
        TrackedField::IsPrimary => pair_text(&diff.is_primary),
        TrackedField::ContentUri => (String::new(), String::new()),
    }
}

fn resource_values(diff: &ResourceDiff, field: TrackedField) -> (String, String) {
    match field {
        TrackedField::Name => pair_text(&diff.name),
        TrackedField::ContentUri => pair_text(&diff.content_uri),
        TrackedField::Rank => pair_text(&diff.rank),
        TrackedField::RelevanceId => pair_text(&diff.relevance_id),
        TrackedField::IsPrimary => pair_text(&diff.is_primary),
        _ => (String::new(), String::new()),
    }
}

/// Inline character delta: removed text struck through, inserted underlined.
pub fn render_delta(original: &str, other: &str) -> String {
    text_delta(original, other)
        .into_iter()
        .map(|segment| match segment {
            TextSegment::Equal(t) => t.normal().to_string(),
            TextSegment::Inserted(t) => t.green().underline().to_string(),
            TextSegment::Removed(t) => t.red().strikethrough().to_string(),
        })
        .collect()
}

fn field_line(out: &mut String, indent: &str, field: TrackedField, (original, other): (String, String)) {
    let value = if field == TrackedField::Name {
        render_delta(&original, &other)
    } else {
        format!("{} -> {}", original.red(), other.green())
    };
    let _ = writeln!(out, "{indent}    {}: {value}", field.as_str().bold());
}

fn write_node(
    out: &mut String,
    depth: usize,
    diff: &NodeDiff,
    resources: &[ResourceDiff],
    field_view: Option<&str>,
) {
    let indent = "  ".repeat(depth);
    let below = if diff.changed.diff_type.is_none() && diff.has_changes() {
        " (changes below)".dimmed().to_string()
    } else {
        String::new()
    };
    let _ = writeln!(
        out,
        "{indent}{} {} {} {}{below}",
        marker(diff.changed.diff_type),
        diff.display_name(),
        diff.node_type.to_string().dimmed(),
        diff.node_id.as_str().dimmed(),
    );
    for field in highlighted_fields(diff, field_view) {
        field_line(out, &indent, field, node_values(diff, field));
    }
    for resource in resources.iter().filter(|r| !r.changed.diff_type.is_none()) {
        let _ = writeln!(
            out,
            "{indent}    {} resource {} {}",
            marker(resource.changed.diff_type),
            resource.display_name(),
            resource.resource_id.as_str().dimmed(),
        );
        for field in highlighted_resource_fields(resource, field_view) {
            field_line(out, &format!("{indent}    "), field, resource_values(resource, field));
        }
    }
}

fn write_tree(out: &mut String, depth: usize, node: &DiffNode, field_view: Option<&str>) {
    write_node(out, depth, &node.diff, &node.resources, field_view);
    for child in &node.children {
        write_tree(out, depth + 1, child, field_view);
    }
}

/// Render a projected diff as indented, colored text.
pub fn render_view(view: &DiffView, field_view: Option<&str>) -> String {
    let mut out = String::new();
    match view {
        DiffView::Identical { root } => {
            let _ = writeln!(
                out,
                "{} {} is identical in both versions.",
                "=".green().bold(),
                root.diff.display_name().bold()
            );
        }
        DiffView::Tree(root) => write_tree(&mut out, 0, root, field_view),
        DiffView::Flat(rows) => {
            for row in rows {
                write_node(&mut out, row.depth, &row.diff, &row.resources, field_view);
            }
        }
    }
    out
}

pub fn render_summary(summary: &DiffSummary) -> String {
    format!(
        "nodes: {} added, {} deleted, {} modified; resources: {} added, {} deleted, {} modified",
        summary.nodes_added.to_string().green(),
        summary.nodes_deleted.to_string().red(),
        summary.nodes_modified.to_string().yellow(),
        summary.resources_added.to_string().green(),
        summary.resources_deleted.to_string().red(),
        summary.resources_modified.to_string().yellow(),
    )
}

fn write_taxonomy_node(out: &mut String, tree: &TaxonomyTree, node: &TaxonomyNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let hidden = if node.metadata.visible { "" } else { " (hidden)" };
    let _ = writeln!(
        out,
        "{indent}{} {} {}{}",
        node.name.bold(),
        node.node_type.to_string().dimmed(),
        node.id.as_str().dimmed(),
        hidden.yellow(),
    );
    for resource in &node.resources {
        let _ = writeln!(out, "{indent}    resource {} {}", resource.name, resource.id.as_str().dimmed());
    }
    for child in tree.children_of(&node.id) {
        write_taxonomy_node(out, tree, child, depth + 1);
    }
}

/// Render one version's subtree.
pub fn render_tree(tree: &TaxonomyTree) -> String {
    let mut out = String::new();
    write_taxonomy_node(&mut out, tree, &tree.root, 0);
    out
}

pub fn render_versions(versions: &[Version]) -> String {
    if versions.is_empty() {
        return "No versions found.\n".to_string();
    }
    let mut out = String::new();
    for v in versions {
        let locked = if v.locked { " locked" } else { "" };
        let _ = writeln!(
            out,
            "{}  {}  {}  {}{}",
            v.hash.as_str().yellow().bold(),
            v.name,
            v.version_type.to_string().cyan(),
            v.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            locked.red(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxo_diff::{diff_trees, NodeView, ViewMode, ViewOptions};
    use taxo_types::{NodeType, Resource, VersionHash};

    fn plain() {
        colored::control::set_override(false);
    }

    fn scenario() -> (TaxonomyTree, TaxonomyTree) {
        let s = TaxonomyNode::new("urn:subject:1", NodeType::Subject, "S1");
        let a = TaxonomyTree::new(
            s.clone(),
            vec![
                TaxonomyNode::new("urn:topic:1", NodeType::Topic, "Math").under(&s),
                TaxonomyNode::new("urn:topic:2", NodeType::Topic, "Science").under(&s),
            ],
        );
        let b = TaxonomyTree::new(
            s.clone(),
            vec![
                TaxonomyNode::new("urn:topic:1", NodeType::Topic, "Mathematics").under(&s),
                TaxonomyNode::new("urn:topic:3", NodeType::Topic, "History").under(&s),
            ],
        );
        (a, b)
    }

    #[test]
    fn tree_view_marks_each_verdict() {
        plain();
        let (a, b) = scenario();
        let text = render_view(&diff_trees(&a, &b, &ViewOptions::default()), None);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("  S1 SUBJECT urn:subject:1 (changes below)"));
        assert!(lines[1].starts_with("  ~ Mathematics"));
        assert_eq!(lines[2].trim(), "name: Mathematics");
        assert!(text.contains("  - Science"));
        assert!(text.contains("  + History"));
    }

    #[test]
    fn flat_view_uses_depth_for_indent() {
        plain();
        let (a, b) = scenario();
        let options = ViewOptions::new(ViewMode::Flat, NodeView::Changed);
        let text = render_view(&diff_trees(&a, &b, &options), None);
        assert!(text.lines().any(|l| l.starts_with("  + History")));
    }

    #[test]
    fn field_filter_hides_other_fields() {
        plain();
        let (a, b) = scenario();
        let text = render_view(&diff_trees(&a, &b, &ViewOptions::default()), Some("rank"));
        assert!(!text.contains("name:"));
    }

    #[test]
    fn identical_message() {
        plain();
        let (a, _) = scenario();
        let text = render_view(&diff_trees(&a, &a, &ViewOptions::default()), None);
        assert_eq!(text, "= S1 is identical in both versions.\n");
    }

    #[test]
    fn delta_without_color_is_concatenation() {
        plain();
        assert_eq!(render_delta("Math", "Maths"), "Maths");
    }

    #[test]
    fn tree_rendering_indents_children() {
        plain();
        let s = TaxonomyNode::new("urn:subject:1", NodeType::Subject, "S1");
        let t = TaxonomyNode::new("urn:topic:1", NodeType::Topic, "T1")
            .under(&s)
            .with_visible(false)
            .with_resource(Resource::new("urn:resource:1", "Article"));
        let text = render_tree(&TaxonomyTree::new(s, vec![t]));
        assert_eq!(
            text,
            "S1 SUBJECT urn:subject:1\n  T1 TOPIC urn:topic:1 (hidden)\n      resource Article urn:resource:1\n"
        );
    }

    #[test]
    fn empty_version_list() {
        plain();
        assert_eq!(render_versions(&[]), "No versions found.\n");
        let v = Version::new(VersionHash::parse("v1").unwrap(), "First");
        assert!(render_versions(&[v]).contains("v1  First  BETA"));
    }
}
