//! Field-level diff: compare one identity's tracked fields across versions.
//!
//! A node present on one side only is `Added`/`Deleted` outright. A node
//! present on both sides is `Modified` when any tracked field differs and
//! `None` otherwise. Field pairs are kept individually so renderers can show
//! which field changed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use taxo_types::{NodeId, NodeType, Resource, ResourceId, TaxonomyNode};

use crate::error::DiffError;

/// The change verdict for one identity or one aggregate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffType {
    #[default]
    None,
    Added,
    Deleted,
    Modified,
}

impl DiffType {
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Classify a pair of optional sides where `fields_differ` reports whether
    /// any tracked field differs when both are present.
    pub fn classify(original: bool, other: bool, fields_differ: bool) -> Self {
        match (original, other) {
            (false, true) => Self::Added,
            (true, false) => Self::Deleted,
            (true, true) if fields_differ => Self::Modified,
            _ => Self::None,
        }
    }

    /// Aggregate verdict over the entries beneath a node.
    ///
    /// Never `Added`/`Deleted`: those belong to the entry that was itself
    /// added or removed.
    pub fn aggregate(verdicts: impl IntoIterator<Item = DiffType>, membership_equal: bool) -> Self {
        if membership_equal && verdicts.into_iter().all(DiffType::is_none) {
            Self::None
        } else {
            Self::Modified
        }
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Added => write!(f, "ADDED"),
            Self::Deleted => write!(f, "DELETED"),
            Self::Modified => write!(f, "MODIFIED"),
        }
    }
}

/// Wrapper matching the `{ "diffType": ... }` wire shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changed {
    pub diff_type: DiffType,
}

impl Changed {
    pub fn new(diff_type: DiffType) -> Self {
        Self { diff_type }
    }
}

/// One field's value in the original and the other version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPair<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<T>,
}

impl<T: PartialEq> FieldPair<T> {
    pub fn new(original: Option<T>, other: Option<T>) -> Self {
        Self { original, other }
    }

    /// Extract a field from each side. Optional fields flatten into the pair.
    fn extract<S>(original: Option<&S>, other: Option<&S>, get: impl Fn(&S) -> Option<T>) -> Self {
        Self::new(original.and_then(&get), other.and_then(&get))
    }

    pub fn differs(&self) -> bool {
        self.original != self.other
    }
}

/// A field compared between versions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackedField {
    Name,
    Path,
    Visible,
    ConnectionId,
    Rank,
    RelevanceId,
    IsPrimary,
    ContentUri,
}

impl TrackedField {
    /// Fields tracked on nodes, in display order.
    pub const NODE: [TrackedField; 7] = [
        Self::Name,
        Self::Path,
        Self::Visible,
        Self::ConnectionId,
        Self::Rank,
        Self::RelevanceId,
        Self::IsPrimary,
    ];

    /// Fields tracked on resources, in display order.
    pub const RESOURCE: [TrackedField; 5] = [
        Self::Name,
        Self::ContentUri,
        Self::Rank,
        Self::RelevanceId,
        Self::IsPrimary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Path => "path",
            Self::Visible => "visible",
            Self::ConnectionId => "connectionId",
            Self::Rank => "rank",
            Self::RelevanceId => "relevanceId",
            Self::IsPrimary => "isPrimary",
            Self::ContentUri => "contentUri",
        }
    }
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackedField {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "path" => Ok(Self::Path),
            "visible" | "metadata.visible" => Ok(Self::Visible),
            "connectionId" => Ok(Self::ConnectionId),
            "rank" => Ok(Self::Rank),
            "relevanceId" => Ok(Self::RelevanceId),
            "isPrimary" | "primary" => Ok(Self::IsPrimary),
            "contentUri" => Ok(Self::ContentUri),
            other => Err(DiffError::UnknownField(other.to_string())),
        }
    }
}

/// The per-identity comparison of one node.
///
/// `children_changed` and `resources_changed` are filled in by propagation;
/// the field differ leaves them unset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDiff {
    pub node_id: NodeId,
    pub node_type: NodeType,
    pub id: FieldPair<NodeId>,
    pub name: FieldPair<String>,
    pub path: FieldPair<String>,
    pub visible: FieldPair<bool>,
    pub connection_id: FieldPair<String>,
    pub rank: FieldPair<i32>,
    pub relevance_id: FieldPair<String>,
    pub is_primary: FieldPair<bool>,
    pub changed: Changed,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children_changed: Option<Changed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources_changed: Option<Changed>,
}

impl NodeDiff {
    /// Whether `field` differs between two present sides.
    pub fn field_differs(&self, field: TrackedField) -> bool {
        match field {
            TrackedField::Name => self.name.differs(),
            TrackedField::Path => self.path.differs(),
            TrackedField::Visible => self.visible.differs(),
            TrackedField::ConnectionId => self.connection_id.differs(),
            TrackedField::Rank => self.rank.differs(),
            TrackedField::RelevanceId => self.relevance_id.differs(),
            TrackedField::IsPrimary => self.is_primary.differs(),
            TrackedField::ContentUri => false,
        }
    }

    /// Tracked fields that differ. Empty for added or deleted nodes.
    pub fn changed_fields(&self) -> Vec<TrackedField> {
        if self.changed.diff_type != DiffType::Modified {
            return Vec::new();
        }
        TrackedField::NODE
            .into_iter()
            .filter(|f| self.field_differs(*f))
            .collect()
    }

    /// The node's own verdict followed by any aggregate verdicts.
    pub fn verdicts(&self) -> impl Iterator<Item = DiffType> + '_ {
        std::iter::once(self.changed.diff_type)
            .chain(self.children_changed.map(|c| c.diff_type))
            .chain(self.resources_changed.map(|c| c.diff_type))
    }

    /// Whether the node or anything beneath it changed.
    pub fn has_changes(&self) -> bool {
        self.verdicts().any(|v| !v.is_none())
    }

    /// Display name, preferring the other version.
    pub fn display_name(&self) -> &str {
        self.name
            .other
            .as_deref()
            .or(self.name.original.as_deref())
            .unwrap_or_default()
    }
}

/// The per-identity comparison of one attached resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDiff {
    pub resource_id: ResourceId,
    pub id: FieldPair<ResourceId>,
    pub name: FieldPair<String>,
    pub content_uri: FieldPair<String>,
    pub rank: FieldPair<i32>,
    pub relevance_id: FieldPair<String>,
    pub is_primary: FieldPair<bool>,
    pub changed: Changed,
}

impl ResourceDiff {
    pub fn field_differs(&self, field: TrackedField) -> bool {
        match field {
            TrackedField::Name => self.name.differs(),
            TrackedField::ContentUri => self.content_uri.differs(),
            TrackedField::Rank => self.rank.differs(),
            TrackedField::RelevanceId => self.relevance_id.differs(),
            TrackedField::IsPrimary => self.is_primary.differs(),
            _ => false,
        }
    }

    pub fn changed_fields(&self) -> Vec<TrackedField> {
        if self.changed.diff_type != DiffType::Modified {
            return Vec::new();
        }
        TrackedField::RESOURCE
            .into_iter()
            .filter(|f| self.field_differs(*f))
            .collect()
    }

    pub fn display_name(&self) -> &str {
        self.name
            .other
            .as_deref()
            .or(self.name.original.as_deref())
            .unwrap_or_default()
    }
}

/// Compare one node identity across versions.
///
/// At least one side must be present; `node_id` names the identity.
pub fn diff_node(
    node_id: &NodeId,
    original: Option<&TaxonomyNode>,
    other: Option<&TaxonomyNode>,
) -> NodeDiff {
    let node_type = other
        .or(original)
        .map(|n| n.node_type)
        .unwrap_or_default();

    let mut diff = NodeDiff {
        node_id: node_id.clone(),
        node_type,
        id: FieldPair::extract(original, other, |n| Some(n.id.clone())),
        name: FieldPair::extract(original, other, |n| Some(n.name.clone())),
        path: FieldPair::extract(original, other, |n| Some(n.path.clone())),
        visible: FieldPair::extract(original, other, |n| Some(n.metadata.visible)),
        connection_id: FieldPair::extract(original, other, |n| n.connection_id.clone()),
        rank: FieldPair::extract(original, other, |n| Some(n.rank)),
        relevance_id: FieldPair::extract(original, other, |n| n.relevance_id.clone()),
        is_primary: FieldPair::extract(original, other, |n| Some(n.is_primary)),
        changed: Changed::default(),
        children_changed: None,
        resources_changed: None,
    };

    let fields_differ = TrackedField::NODE.into_iter().any(|f| diff.field_differs(f));
    diff.changed = Changed::new(DiffType::classify(
        original.is_some(),
        other.is_some(),
        fields_differ,
    ));
    diff
}

/// Compare one resource identity across versions.
pub fn diff_resource(
    resource_id: &ResourceId,
    original: Option<&Resource>,
    other: Option<&Resource>,
) -> ResourceDiff {
    let mut diff = ResourceDiff {
        resource_id: resource_id.clone(),
        id: FieldPair::extract(original, other, |r| Some(r.id.clone())),
        name: FieldPair::extract(original, other, |r| Some(r.name.clone())),
        content_uri: FieldPair::extract(original, other, |r| r.content_uri.clone()),
        rank: FieldPair::extract(original, other, |r| Some(r.rank)),
        relevance_id: FieldPair::extract(original, other, |r| r.relevance_id.clone()),
        is_primary: FieldPair::extract(original, other, |r| Some(r.is_primary)),
        changed: Changed::default(),
    };

    let fields_differ = TrackedField::RESOURCE
        .into_iter()
        .any(|f| diff.field_differs(f));
    diff.changed = Changed::new(DiffType::classify(
        original.is_some(),
        other.is_some(),
        fields_differ,
    ));
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(name: &str) -> TaxonomyNode {
        TaxonomyNode::new("urn:topic:1", NodeType::Topic, name)
    }

    fn id() -> NodeId {
        NodeId::new("urn:topic:1")
    }

    #[test]
    fn identical_nodes_are_none() {
        let a = topic("Math");
        let diff = diff_node(&id(), Some(&a), Some(&a));
        assert_eq!(diff.changed.diff_type, DiffType::None);
        assert!(diff.changed_fields().is_empty());
        assert!(!diff.has_changes());
    }

    #[test]
    fn added_when_original_absent() {
        let b = topic("Math");
        let diff = diff_node(&id(), None, Some(&b));
        assert_eq!(diff.changed.diff_type, DiffType::Added);
        assert_eq!(diff.name, FieldPair::new(None, Some("Math".to_string())));
        assert!(diff.changed_fields().is_empty());
    }

    #[test]
    fn deleted_when_other_absent() {
        let a = topic("Math");
        let diff = diff_node(&id(), Some(&a), None);
        assert_eq!(diff.changed.diff_type, DiffType::Deleted);
        assert_eq!(diff.name.original.as_deref(), Some("Math"));
        assert_eq!(diff.display_name(), "Math");
    }

    #[test]
    fn name_change_is_modified() {
        let a = topic("Math");
        let b = topic("Mathematics");
        let diff = diff_node(&id(), Some(&a), Some(&b));
        assert_eq!(diff.changed.diff_type, DiffType::Modified);
        assert_eq!(diff.changed_fields(), vec![TrackedField::Name]);
        assert_eq!(diff.display_name(), "Mathematics");
    }

    #[test]
    fn each_tracked_field_is_compared() {
        let a = topic("T");
        let variants: Vec<(TaxonomyNode, TrackedField)> = vec![
            (topic("T").with_name("U"), TrackedField::Name),
            (
                {
                    let mut n = topic("T");
                    n.path = "/elsewhere".into();
                    n
                },
                TrackedField::Path,
            ),
            (topic("T").with_visible(false), TrackedField::Visible),
            (topic("T").with_connection("urn:topic-subtopic:1"), TrackedField::ConnectionId),
            (topic("T").with_rank(5), TrackedField::Rank),
            (
                {
                    let mut n = topic("T");
                    n.relevance_id = Some("urn:relevance:supplementary".into());
                    n
                },
                TrackedField::RelevanceId,
            ),
            (
                {
                    let mut n = topic("T");
                    n.is_primary = false;
                    n
                },
                TrackedField::IsPrimary,
            ),
        ];

        for (b, field) in variants {
            let diff = diff_node(&id(), Some(&a), Some(&b));
            assert_eq!(diff.changed.diff_type, DiffType::Modified, "{field}");
            assert_eq!(diff.changed_fields(), vec![field]);
        }
    }

    #[test]
    fn untracked_fields_are_ignored() {
        let a = topic("T");
        let mut b = topic("T");
        b.metadata.grep_codes.push("KM1".into());
        b.content_uri = Some("urn:article:1".into());
        let diff = diff_node(&id(), Some(&a), Some(&b));
        assert_eq!(diff.changed.diff_type, DiffType::None);
    }

    #[test]
    fn resource_fields() {
        let a = Resource::new("urn:resource:1", "Fractions").with_content_uri("urn:article:1");
        let b = Resource::new("urn:resource:1", "Fractions").with_content_uri("urn:article:2");
        let rid = ResourceId::new("urn:resource:1");

        let same = diff_resource(&rid, Some(&a), Some(&a));
        assert_eq!(same.changed.diff_type, DiffType::None);

        let modified = diff_resource(&rid, Some(&a), Some(&b));
        assert_eq!(modified.changed.diff_type, DiffType::Modified);
        assert_eq!(modified.changed_fields(), vec![TrackedField::ContentUri]);

        assert_eq!(diff_resource(&rid, None, Some(&b)).changed.diff_type, DiffType::Added);
        assert_eq!(diff_resource(&rid, Some(&a), None).changed.diff_type, DiffType::Deleted);
    }

    #[test]
    fn aggregate_never_reports_structural_verdicts() {
        assert_eq!(DiffType::aggregate([], true), DiffType::None);
        assert_eq!(DiffType::aggregate([DiffType::None, DiffType::None], true), DiffType::None);
        assert_eq!(DiffType::aggregate([DiffType::Added], false), DiffType::Modified);
        assert_eq!(DiffType::aggregate([DiffType::Deleted], false), DiffType::Modified);
        assert_eq!(DiffType::aggregate([DiffType::None], false), DiffType::Modified);
    }

    #[test]
    fn tracked_field_names_round_trip() {
        for field in TrackedField::NODE.into_iter().chain(TrackedField::RESOURCE) {
            assert_eq!(field.as_str().parse::<TrackedField>().unwrap(), field);
        }
        assert_eq!("metadata.visible".parse::<TrackedField>().unwrap(), TrackedField::Visible);
        assert!("colour".parse::<TrackedField>().is_err());
    }

    #[test]
    fn diff_type_wire_format() {
        let json = serde_json::to_string(&Changed::new(DiffType::Modified)).unwrap();
        assert_eq!(json, r#"{"diffType":"MODIFIED"}"#);
    }
}
