use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{Language, NodeId, ResourceId};

/// The kind of a taxonomy node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Subject,
    Topic,
    #[default]
    Node,
}

impl NodeType {
    /// Whether nodes of this type may have child nodes.
    pub fn has_children(self) -> bool {
        true
    }

    /// Whether nodes of this type may have resources attached.
    pub fn carries_resources(self) -> bool {
        !matches!(self, Self::Subject)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subject => write!(f, "SUBJECT"),
            Self::Topic => write!(f, "TOPIC"),
            Self::Node => write!(f, "NODE"),
        }
    }
}

/// Editorial metadata carried by a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grep_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, String>,
}

fn default_visible() -> bool {
    true
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            visible: true,
            grep_codes: Vec::new(),
            custom_fields: BTreeMap::new(),
        }
    }
}

/// A content item (article, learning path) attached to a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_uri: Option<String>,
    #[serde(default)]
    pub rank: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_id: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<Language, String>,
}

impl Resource {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(id),
            name: name.into(),
            content_uri: None,
            rank: 0,
            relevance_id: None,
            is_primary: true,
            connection_id: None,
            translations: BTreeMap::new(),
        }
    }

    pub fn with_content_uri(mut self, uri: impl Into<String>) -> Self {
        self.content_uri = Some(uri.into());
        self
    }

    pub fn with_rank(mut self, rank: i32) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_relevance(mut self, relevance_id: impl Into<String>) -> Self {
        self.relevance_id = Some(relevance_id.into());
        self
    }

    fn localize(&mut self, language: &Language) {
        if let Some(name) = self.translations.get(language) {
            self.name = name.clone();
        }
    }
}

/// One version's view of a taxonomy node.
///
/// `id` is the cross-version identity. `name`, `path`, `rank`,
/// `relevance_id`, `is_primary`, `metadata.visible` and `connection_id` are
/// the fields compared between versions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyNode {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub node_type: NodeType,
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub rank: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_id: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<Language, String>,
}

impl TaxonomyNode {
    /// Create a visible, primary node with no parent and no resources.
    pub fn new(id: impl Into<String>, node_type: NodeType, name: impl Into<String>) -> Self {
        let id = NodeId::new(id);
        let path = format!("/{}", id.as_str().trim_start_matches("urn:"));
        Self {
            id,
            parent_id: None,
            node_type,
            name: name.into(),
            path,
            rank: 0,
            relevance_id: None,
            is_primary: true,
            metadata: Metadata::default(),
            connection_id: None,
            content_uri: None,
            resources: Vec::new(),
            translations: BTreeMap::new(),
        }
    }

    /// Place the node under `parent`, deriving `path` from the parent's path.
    pub fn under(mut self, parent: &TaxonomyNode) -> Self {
        let own = self.id.as_str().trim_start_matches("urn:");
        self.path = format!("{}/{}", parent.path, own);
        self.parent_id = Some(parent.id.clone());
        self
    }

    pub fn with_rank(mut self, rank: i32) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.metadata.visible = visible;
        self
    }

    pub fn with_connection(mut self, connection_id: impl Into<String>) -> Self {
        self.connection_id = Some(connection_id.into());
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_translation(mut self, language: Language, name: impl Into<String>) -> Self {
        self.translations.insert(language, name.into());
        self
    }

    /// Find an attached resource by id.
    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.id == id)
    }

    /// Apply the translation for `language` to this node and its resources.
    ///
    /// Names without a translation for `language` are left unchanged.
    pub fn localized(mut self, language: &Language) -> Self {
        if let Some(name) = self.translations.get(language) {
            self.name = name.clone();
        }
        for resource in &mut self.resources {
            resource.localize(language);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_cannot_carry_resources() {
        assert!(!NodeType::Subject.carries_resources());
        assert!(NodeType::Topic.carries_resources());
        assert!(NodeType::Node.carries_resources());
        assert!(NodeType::Subject.has_children());
    }

    #[test]
    fn under_derives_path_and_parent() {
        let subject = TaxonomyNode::new("urn:subject:1", NodeType::Subject, "Math");
        let topic = TaxonomyNode::new("urn:topic:7", NodeType::Topic, "Algebra").under(&subject);
        assert_eq!(subject.path, "/subject:1");
        assert_eq!(topic.path, "/subject:1/topic:7");
        assert_eq!(topic.parent_id, Some(subject.id.clone()));
    }

    #[test]
    fn localized_replaces_translated_names_only() {
        let nn = Language::parse("nn").unwrap();
        let node = TaxonomyNode::new("urn:topic:1", NodeType::Topic, "Matematikk")
            .with_translation(nn.clone(), "Matematikk (nn)")
            .with_resource(Resource::new("urn:resource:1", "Brøk"));

        let localized = node.localized(&nn);
        assert_eq!(localized.name, "Matematikk (nn)");
        assert_eq!(localized.resources[0].name, "Brøk");
    }

    #[test]
    fn json_uses_camel_case_and_defaults() {
        let json = r#"{
            "id": "urn:topic:1",
            "parentId": "urn:subject:1",
            "nodeType": "TOPIC",
            "name": "Algebra",
            "isPrimary": true,
            "metadata": { "grepCodes": ["KM123"] }
        }"#;
        let node: TaxonomyNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.parent_id, Some(NodeId::new("urn:subject:1")));
        assert_eq!(node.node_type, NodeType::Topic);
        assert!(node.metadata.visible);
        assert_eq!(node.metadata.grep_codes, vec!["KM123".to_string()]);
        assert_eq!(node.rank, 0);
        assert!(node.resources.is_empty());
    }

    #[test]
    fn resource_lookup_by_id() {
        let node = TaxonomyNode::new("urn:topic:1", NodeType::Topic, "T")
            .with_resource(Resource::new("urn:resource:1", "A"))
            .with_resource(Resource::new("urn:resource:2", "B"));
        let found = node.resource(&ResourceId::new("urn:resource:2")).unwrap();
        assert_eq!(found.name, "B");
        assert!(node.resource(&ResourceId::new("urn:resource:3")).is_none());
    }
}
