//! Renderer helpers: which fields to highlight and how a string changed.
//!
//! Text deltas use the `similar` crate's character diff so a renamed node can
//! be shown with the inserted and removed characters marked.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::field::{NodeDiff, ResourceDiff, TrackedField};

/// Changed node fields that pass the `fieldView` filter.
///
/// `field_view` is a comma separated list of field names. `None`, an empty
/// string or a list without any known field shows every changed field.
pub fn highlighted_fields(diff: &NodeDiff, field_view: Option<&str>) -> Vec<TrackedField> {
    filter_fields(diff.changed_fields(), field_view)
}

/// Changed resource fields that pass the `fieldView` filter.
pub fn highlighted_resource_fields(diff: &ResourceDiff, field_view: Option<&str>) -> Vec<TrackedField> {
    filter_fields(diff.changed_fields(), field_view)
}

fn filter_fields(changed: Vec<TrackedField>, field_view: Option<&str>) -> Vec<TrackedField> {
    let wanted: Vec<TrackedField> = field_view
        .unwrap_or_default()
        .split(',')
        .filter_map(|name| name.trim().parse().ok())
        .collect();
    if wanted.is_empty() {
        return changed;
    }
    changed.into_iter().filter(|f| wanted.contains(f)).collect()
}

/// A run of characters in a text delta.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "text", rename_all = "lowercase")]
pub enum TextSegment {
    Equal(String),
    Inserted(String),
    Removed(String),
}

/// Character-level delta from `original` to `other`, adjacent runs merged.
pub fn text_delta(original: &str, other: &str) -> Vec<TextSegment> {
    let diff = TextDiff::from_chars(original, other);
    let mut segments: Vec<TextSegment> = Vec::new();

    for change in diff.iter_all_changes() {
        let text = change.value();
        let tag = change.tag();
        let extended = match (segments.last_mut(), tag) {
            (Some(TextSegment::Equal(run)), ChangeTag::Equal)
            | (Some(TextSegment::Inserted(run)), ChangeTag::Insert)
            | (Some(TextSegment::Removed(run)), ChangeTag::Delete) => {
                run.push_str(text);
                true
            }
            _ => false,
        };
        if !extended {
            segments.push(match tag {
                ChangeTag::Equal => TextSegment::Equal(text.to_string()),
                ChangeTag::Insert => TextSegment::Inserted(text.to_string()),
                ChangeTag::Delete => TextSegment::Removed(text.to_string()),
            });
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::diff_node;
    use taxo_types::{NodeId, NodeType, TaxonomyNode};

    fn modified_name_and_rank() -> NodeDiff {
        let a = TaxonomyNode::new("urn:topic:1", NodeType::Topic, "Math");
        let b = a.clone().with_name("Mathematics").with_rank(2);
        diff_node(&NodeId::new("urn:topic:1"), Some(&a), Some(&b))
    }

    #[test]
    fn no_filter_shows_all_changed_fields() {
        let diff = modified_name_and_rank();
        assert_eq!(
            highlighted_fields(&diff, None),
            vec![TrackedField::Name, TrackedField::Rank]
        );
        assert_eq!(highlighted_fields(&diff, Some("")).len(), 2);
    }

    #[test]
    fn filter_restricts_to_named_fields() {
        let diff = modified_name_and_rank();
        assert_eq!(highlighted_fields(&diff, Some("rank")), vec![TrackedField::Rank]);
        assert_eq!(
            highlighted_fields(&diff, Some("name, visible")),
            vec![TrackedField::Name]
        );
        assert!(highlighted_fields(&diff, Some("visible")).is_empty());
    }

    #[test]
    fn unknown_filter_names_are_ignored() {
        let diff = modified_name_and_rank();
        assert_eq!(highlighted_fields(&diff, Some("colour")).len(), 2);
    }

    #[test]
    fn delta_for_appended_suffix() {
        assert_eq!(
            text_delta("Math", "Mathematics"),
            vec![
                TextSegment::Equal("Math".into()),
                TextSegment::Inserted("ematics".into()),
            ]
        );
    }

    #[test]
    fn delta_for_identical_text() {
        assert_eq!(text_delta("Same", "Same"), vec![TextSegment::Equal("Same".into())]);
        assert!(text_delta("", "").is_empty());
    }

    #[test]
    fn delta_for_replacement() {
        let segments = text_delta("Science", "History");
        assert!(segments.iter().any(|s| matches!(s, TextSegment::Removed(_))));
        assert!(segments.iter().any(|s| matches!(s, TextSegment::Inserted(_))));
        let rebuilt: String = segments
            .iter()
            .filter_map(|s| match s {
                TextSegment::Equal(t) | TextSegment::Inserted(t) => Some(t.as_str()),
                TextSegment::Removed(_) => None,
            })
            .collect();
        assert_eq!(rebuilt, "History");
    }
}
