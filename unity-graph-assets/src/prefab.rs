//! Prefab read model

use crate::graph::{GameObjectNode, SceneGraph};
use serde::Serialize;
use tracing::{debug, instrument};
use unity_graph_core::{DecodedValue, Reference, class_ids};
use unity_graph_yaml::{RecordSet, extract_guids, parse_document, unique_guids};

/// One property override recorded by a prefab instance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefabModification {
    pub target: Reference,
    pub property_path: String,
    pub value: DecodedValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_reference: Option<Reference>,
}

/// A parsed `.prefab` document
#[derive(Debug, Clone, Serialize)]
pub struct ParsedPrefab {
    /// Name of the root GameObject
    pub name: String,
    pub root: GameObjectNode,
    pub modifications: Vec<PrefabModification>,
    /// Referenced asset GUIDs, first-seen order, no repeats
    pub dependencies: Vec<String>,
    #[serde(skip)]
    pub graph: SceneGraph,
}

impl ParsedPrefab {
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// Parse prefab text.
///
/// Returns `None` when the document holds no GameObject to act as root.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_prefab(text: &str) -> Option<ParsedPrefab> {
    let records = parse_document(text);
    let graph = SceneGraph::resolve(&records);

    let Some(root) = graph.root().cloned() else {
        debug!("prefab has no GameObject");
        return None;
    };

    Some(ParsedPrefab {
        name: root.name.clone(),
        root,
        modifications: collect_modifications(&records),
        dependencies: unique_guids(extract_guids(text)),
        graph,
    })
}

fn collect_modifications(records: &RecordSet) -> Vec<PrefabModification> {
    records
        .of_class(class_ids::PREFAB_INSTANCE)
        .filter_map(|record| {
            record
                .get("m_Modification")
                .and_then(|m| m.get("m_Modifications"))
                .and_then(DecodedValue::as_seq)
        })
        .flatten()
        .filter_map(modification_from)
        .collect()
}

fn modification_from(entry: &DecodedValue) -> Option<PrefabModification> {
    let target = entry.get("target").and_then(DecodedValue::as_reference)?;
    let property_path = entry.get("propertyPath").map(ToString::to_string)?;

    Some(PrefabModification {
        target: target.clone(),
        property_path,
        value: entry.get("value").cloned().unwrap_or(DecodedValue::Null),
        object_reference: entry
            .get("objectReference")
            .and_then(DecodedValue::as_reference)
            .filter(|r| !r.is_null())
            .cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_prefab() {
        let prefab =
            parse_prefab("--- !u!1 &100\nGameObject:\n  m_Name: Player\n  m_IsActive: 1\n")
                .unwrap();
        assert_eq!(prefab.name, "Player");
        assert!(prefab.root.is_active);
        assert!(prefab.root.components.is_empty());
        assert!(prefab.root.children.is_empty());
        assert!(prefab.modifications.is_empty());
        assert!(prefab.dependencies().is_empty());
    }

    #[test]
    fn test_no_game_object_is_none() {
        assert!(parse_prefab("").is_none());
        assert!(parse_prefab("--- !u!4 &1\nTransform:\n  m_Children: []\n").is_none());
    }

    #[test]
    fn test_dependencies_are_deduplicated() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Name: Shared
--- !u!23 &2
MeshRenderer:
  m_Materials:
  - {fileID: 2100000, guid: aaaa0000aaaa0000aaaa0000aaaa0000, type: 2}
  - {fileID: 2100000, guid: bbbb0000bbbb0000bbbb0000bbbb0000, type: 2}
  - {fileID: 2100000, guid: aaaa0000aaaa0000aaaa0000aaaa0000, type: 2}
";
        let prefab = parse_prefab(text).unwrap();
        assert_eq!(
            prefab.dependencies,
            vec![
                "aaaa0000aaaa0000aaaa0000aaaa0000",
                "bbbb0000bbbb0000bbbb0000bbbb0000"
            ]
        );
    }

    #[test]
    fn test_prefab_instance_modifications() {
        let text = "\
--- !u!1 &10
GameObject:
  m_Name: Variant
--- !u!1001 &100100000
PrefabInstance:
  m_ObjectHideFlags: 0
  m_Modification:
    m_TransformParent: {fileID: 0}
    m_Modifications:
    - target: {fileID: 400000, guid: 5f1d2c3b4a5e6f708192a3b4c5d6e7f8, type: 3}
      propertyPath: m_LocalPosition.x
      value: 2.5
      objectReference: {fileID: 0}
    - target: {fileID: 100000, guid: 5f1d2c3b4a5e6f708192a3b4c5d6e7f8, type: 3}
      propertyPath: m_Name
      value: Renamed
      objectReference: {fileID: 0}
    m_RemovedComponents: []
  m_SourcePrefab: {fileID: 100100000, guid: 5f1d2c3b4a5e6f708192a3b4c5d6e7f8, type: 3}
";
        let prefab = parse_prefab(text).unwrap();
        assert_eq!(prefab.modifications.len(), 2);

        let first = &prefab.modifications[0];
        assert_eq!(first.target.file_id, 400000);
        assert_eq!(first.property_path, "m_LocalPosition.x");
        assert_eq!(first.value, DecodedValue::Float(2.5));
        assert_eq!(first.object_reference, None);

        assert_eq!(prefab.modifications[1].value, DecodedValue::from("Renamed"));
        assert_eq!(prefab.dependencies.len(), 1);
    }
}
