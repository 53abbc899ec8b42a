//! GameObject graph resolution
//!
//! Rebuilds GameObjects from a document's records. The [`RecordSet`] stays
//! the owner of every object: nodes refer to children by `fileID`, and every
//! traversal threads a visited set, so cyclic or self-parenting transforms
//! cannot trap a walk.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use unity_graph_core::{DecodedValue, FileId, RawRecord, class_ids, classify};
use unity_graph_yaml::RecordSet;

/// A component attached to a GameObject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRef {
    pub type_name: String,
    pub file_id: Option<FileId>,
    pub properties: IndexMap<String, DecodedValue>,
}

/// A reconstructed GameObject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameObjectNode {
    pub name: String,
    pub tag: Option<String>,
    pub layer: Option<i32>,
    pub is_active: bool,
    pub components: Vec<ComponentRef>,
    /// Child identities as written in `m_Children` (usually Transform IDs)
    pub children: Vec<FileId>,
    pub file_id: Option<FileId>,
}

impl GameObjectNode {
    /// Components whose classified type matches `type_name`
    pub fn components_of_type<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a ComponentRef> + 'a {
        self.components
            .iter()
            .filter(move |c| c.type_name == type_name)
    }
}

/// Free-function form of [`GameObjectNode::components_of_type`]
pub fn find_components_of_type<'a>(
    node: &'a GameObjectNode,
    type_name: &str,
) -> Vec<&'a ComponentRef> {
    node.components
        .iter()
        .filter(|c| c.type_name == type_name)
        .collect()
}

/// A reference that named a `fileID` absent from the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    /// Record holding the reference
    pub from: FileId,
    /// Field the reference was read from
    pub field: String,
    pub target: FileId,
}

/// Resolved GameObjects of one document
#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneGraph {
    /// GameObjects in document order
    nodes: IndexMap<FileId, GameObjectNode>,
    /// Transform record ID to the GameObject that owns it
    #[serde(skip)]
    transform_owner: HashMap<FileId, FileId>,
    /// GameObjects that are some other object's child
    #[serde(skip)]
    parented: HashSet<FileId>,
    /// Resolution report: references that pointed nowhere
    unresolved: Vec<UnresolvedReference>,
}

impl SceneGraph {
    /// Resolve every GameObject record of a document
    pub fn resolve(records: &RecordSet) -> Self {
        let mut graph = SceneGraph::default();

        for record in records.iter().filter(|r| is_transform_like(r)) {
            if let Some(owner) = record.get("m_GameObject").and_then(DecodedValue::file_id) {
                if owner != 0 {
                    graph.transform_owner.insert(record.file_id, owner);
                }
            }
        }

        for record in records.of_class(class_ids::GAME_OBJECT) {
            let node = graph.resolve_game_object(record, records);
            graph.nodes.insert(record.file_id, node);
        }

        let child_links: Vec<FileId> = graph
            .nodes
            .values()
            .flat_map(|node| node.children.iter().copied())
            .filter_map(|child| graph.resolve_child(child))
            .collect();
        graph.parented.extend(child_links);

        debug!(
            game_objects = graph.nodes.len(),
            unresolved = graph.unresolved.len(),
            "resolved scene graph"
        );
        graph
    }

    fn resolve_game_object(&mut self, record: &RawRecord, records: &RecordSet) -> GameObjectNode {
        let mut components = Vec::new();
        let mut children = Vec::new();

        let entries = record
            .get("m_Component")
            .and_then(DecodedValue::as_seq)
            .unwrap_or_default();

        for entry in entries {
            let Some(target) = component_target(entry) else {
                continue;
            };
            if target == 0 {
                continue;
            }
            let Some(component) = records.get(target) else {
                debug!(from = record.file_id, target, "component reference dangles");
                self.unresolved.push(UnresolvedReference {
                    from: record.file_id,
                    field: "m_Component".to_string(),
                    target,
                });
                continue;
            };

            if is_transform_like(component) {
                self.transform_owner.insert(component.file_id, record.file_id);
                self.collect_children(component, records, &mut children);
                if has_father(component) {
                    self.parented.insert(record.file_id);
                }
            }

            components.push(ComponentRef {
                type_name: classify(component.class_id),
                file_id: Some(component.file_id),
                properties: component.fields.clone(),
            });
        }

        // older layouts inline the transform on the GameObject itself
        for key in ["m_Transform", "m_RectTransform"] {
            if let Some(DecodedValue::FlowMap(inline)) = record.get(key) {
                if inline.contains_key("m_Children") {
                    let mut holder = RawRecord::new(class_ids::TRANSFORM, record.file_id);
                    holder.fields = inline.clone();
                    self.collect_children(&holder, records, &mut children);
                }
            }
        }

        GameObjectNode {
            name: record
                .name()
                .filter(|n| !n.is_empty())
                .unwrap_or("GameObject")
                .to_string(),
            tag: record
                .get("m_TagString")
                .and_then(DecodedValue::as_str)
                .map(str::to_string),
            layer: record
                .get("m_Layer")
                .and_then(DecodedValue::as_i64)
                .and_then(|l| i32::try_from(l).ok()),
            is_active: record
                .get("m_IsActive")
                .is_none_or(DecodedValue::is_truthy),
            components,
            children,
            file_id: Some(record.file_id),
        }
    }

    fn collect_children(
        &mut self,
        transform: &RawRecord,
        records: &RecordSet,
        children: &mut Vec<FileId>,
    ) {
        let entries = transform
            .get("m_Children")
            .and_then(DecodedValue::as_seq)
            .unwrap_or_default();

        for child in entries.iter().filter_map(DecodedValue::file_id) {
            if child == 0 || children.contains(&child) {
                continue;
            }
            if records.contains(child) {
                children.push(child);
            } else {
                self.unresolved.push(UnresolvedReference {
                    from: transform.file_id,
                    field: "m_Children".to_string(),
                    target: child,
                });
            }
        }
    }

    /// Map a child identity (GameObject or Transform ID) to its GameObject
    pub fn resolve_child(&self, id: FileId) -> Option<FileId> {
        if self.nodes.contains_key(&id) {
            return Some(id);
        }
        self.transform_owner
            .get(&id)
            .copied()
            .filter(|owner| self.nodes.contains_key(owner))
    }

    /// Look up a GameObject by its own `fileID`
    pub fn node(&self, file_id: FileId) -> Option<&GameObjectNode> {
        self.nodes.get(&file_id)
    }

    /// All GameObjects in document order
    pub fn nodes(&self) -> impl Iterator<Item = &GameObjectNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// References that named missing objects
    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    /// GameObjects nothing else parents, in document order
    pub fn root_ids(&self) -> Vec<FileId> {
        self.nodes
            .keys()
            .copied()
            .filter(|id| !self.parented.contains(id))
            .collect()
    }

    /// The first unparented GameObject, falling back to the first GameObject
    pub fn root(&self) -> Option<&GameObjectNode> {
        self.nodes
            .iter()
            .find(|(id, _)| !self.parented.contains(*id))
            .or_else(|| self.nodes.first())
            .map(|(_, node)| node)
    }

    /// Depth-first walk from `root_id`.
    ///
    /// `root_id` may name a GameObject or its Transform. Each GameObject is
    /// visited at most once across calls sharing `visited`.
    pub fn walk<F>(&self, root_id: FileId, visited: &mut HashSet<FileId>, mut on_visit: F)
    where
        F: FnMut(&GameObjectNode, usize),
    {
        let Some(start) = self.resolve_child(root_id) else {
            return;
        };
        let mut stack = vec![(start, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            on_visit(node, depth);

            for child in node.children.iter().rev() {
                if let Some(child_id) = self.resolve_child(*child) {
                    if !visited.contains(&child_id) {
                        stack.push((child_id, depth + 1));
                    }
                }
            }
        }
    }

    /// Walk with a fresh visited set
    pub fn traverse<F>(&self, root_id: FileId, on_visit: F)
    where
        F: FnMut(&GameObjectNode, usize),
    {
        let mut visited = HashSet::new();
        self.walk(root_id, &mut visited, on_visit);
    }
}

/// Target `fileID` of one `m_Component` entry.
///
/// Current Unity writes `- component: {fileID: N}`; older versions wrote
/// `- 4: {fileID: N}` keyed by class ID.
fn component_target(entry: &DecodedValue) -> Option<FileId> {
    match entry {
        DecodedValue::Reference(r) => Some(r.file_id),
        DecodedValue::FlowMap(map) => map
            .get("component")
            .and_then(DecodedValue::file_id)
            .or_else(|| map.values().find_map(DecodedValue::file_id)),
        _ => None,
    }
}

fn is_transform_like(record: &RawRecord) -> bool {
    matches!(
        record.class_id,
        class_ids::TRANSFORM | class_ids::RECT_TRANSFORM | class_ids::RECT_TRANSFORM_LEGACY
    ) || record.has_field("m_Children")
}

fn has_father(transform: &RawRecord) -> bool {
    transform
        .get("m_Father")
        .and_then(DecodedValue::file_id)
        .is_some_and(|id| id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unity_graph_yaml::parse_document;

    const HIERARCHY: &str = "\
--- !u!1 &1
GameObject:
  m_Component:
  - component: {fileID: 11}
  m_Layer: 0
  m_Name: Root
  m_TagString: Untagged
  m_IsActive: 1
--- !u!4 &11
Transform:
  m_GameObject: {fileID: 1}
  m_Children:
  - {fileID: 22}
  - {fileID: 33}
  m_Father: {fileID: 0}
--- !u!1 &2
GameObject:
  m_Component:
  - component: {fileID: 22}
  m_Name: Left
  m_IsActive: 0
--- !u!4 &22
Transform:
  m_GameObject: {fileID: 2}
  m_Children: []
  m_Father: {fileID: 11}
--- !u!1 &3
GameObject:
  m_Component:
  - component: {fileID: 33}
  - component: {fileID: 99}
  m_Name: Right
--- !u!4 &33
Transform:
  m_GameObject: {fileID: 3}
  m_Children: []
  m_Father: {fileID: 11}
";

    #[test]
    fn test_resolves_nodes() {
        let graph = SceneGraph::resolve(&parse_document(HIERARCHY));
        assert_eq!(graph.len(), 3);

        let root = graph.node(1).unwrap();
        assert_eq!(root.name, "Root");
        assert_eq!(root.tag.as_deref(), Some("Untagged"));
        assert_eq!(root.layer, Some(0));
        assert!(root.is_active);
        assert_eq!(root.children, vec![22, 33]);
        assert_eq!(root.components.len(), 1);
        assert_eq!(root.components[0].type_name, "Transform");

        assert!(!graph.node(2).unwrap().is_active);
    }

    #[test]
    fn test_dangling_component_is_reported_not_fatal() {
        let graph = SceneGraph::resolve(&parse_document(HIERARCHY));
        let right = graph.node(3).unwrap();
        assert_eq!(right.components.len(), 1);
        assert_eq!(
            graph.unresolved(),
            &[UnresolvedReference {
                from: 3,
                field: "m_Component".to_string(),
                target: 99,
            }]
        );
    }

    #[test]
    fn test_root_discovery() {
        let graph = SceneGraph::resolve(&parse_document(HIERARCHY));
        assert_eq!(graph.root_ids(), vec![1]);
        assert_eq!(graph.root().unwrap().name, "Root");
    }

    #[test]
    fn test_walk_depth_first() {
        let graph = SceneGraph::resolve(&parse_document(HIERARCHY));
        let mut seen = Vec::new();
        graph.traverse(1, |node, depth| seen.push((node.name.clone(), depth)));
        assert_eq!(
            seen,
            vec![
                ("Root".to_string(), 0),
                ("Left".to_string(), 1),
                ("Right".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_walk_from_transform_id() {
        let graph = SceneGraph::resolve(&parse_document(HIERARCHY));
        let mut count = 0;
        graph.traverse(11, |_, _| count += 1);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_cyclic_hierarchy_terminates() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Component:
  - component: {fileID: 11}
  m_Name: A
--- !u!4 &11
Transform:
  m_GameObject: {fileID: 1}
  m_Children:
  - {fileID: 22}
--- !u!1 &2
GameObject:
  m_Component:
  - component: {fileID: 22}
  m_Name: B
--- !u!4 &22
Transform:
  m_GameObject: {fileID: 2}
  m_Children:
  - {fileID: 11}
";
        let graph = SceneGraph::resolve(&parse_document(text));

        // both are parented, so the first GameObject is the fallback root
        assert!(graph.root_ids().is_empty());
        assert_eq!(graph.root().unwrap().name, "A");

        let mut visits: HashMap<String, usize> = HashMap::new();
        let mut visited = HashSet::new();
        graph.walk(1, &mut visited, |node, _| {
            *visits.entry(node.name.clone()).or_default() += 1;
        });
        assert_eq!(visits.get("A"), Some(&1));
        assert_eq!(visits.get("B"), Some(&1));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_self_parenting_transform() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Component:
  - component: {fileID: 11}
  m_Name: Loop
--- !u!4 &11
Transform:
  m_GameObject: {fileID: 1}
  m_Children:
  - {fileID: 11}
";
        let graph = SceneGraph::resolve(&parse_document(text));
        let mut count = 0;
        graph.traverse(1, |_, _| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_legacy_component_layout() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Component:
  - 4: {fileID: 11}
  - 114: {fileID: 12}
  m_Name: Old
--- !u!4 &11
Transform:
  m_Children: []
--- !u!114 &12
MonoBehaviour:
  m_Enabled: 1
";
        let graph = SceneGraph::resolve(&parse_document(text));
        let node = graph.node(1).unwrap();
        let types: Vec<_> = node.components.iter().map(|c| c.type_name.as_str()).collect();
        assert_eq!(types, vec!["Transform", "MonoBehaviour"]);
        assert_eq!(find_components_of_type(node, "MonoBehaviour").len(), 1);
        assert_eq!(node.components_of_type("Camera").count(), 0);
    }

    #[test]
    fn test_dangling_child_is_skipped() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Component:
  - component: {fileID: 11}
  m_Name: Parent
--- !u!4 &11
Transform:
  m_GameObject: {fileID: 1}
  m_Children:
  - {fileID: 404}
";
        let graph = SceneGraph::resolve(&parse_document(text));
        assert!(graph.node(1).unwrap().children.is_empty());
        assert_eq!(graph.unresolved()[0].field, "m_Children");
        assert_eq!(graph.unresolved()[0].target, 404);
    }
}
