//! Scene read model

use crate::graph::{GameObjectNode, SceneGraph};
use serde::Serialize;
use tracing::{debug, instrument};
use unity_graph_yaml::{extract_guids, parse_document, unique_guids};

/// Scene lighting. Not extracted yet; every field stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingSettings {
    pub skybox_material: Option<String>,
    pub ambient_mode: Option<String>,
    pub ambient_color: Option<[f32; 4]>,
}

/// Scene render settings. Not extracted yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSettings {
    pub fog: bool,
    pub fog_color: Option<[f32; 4]>,
    pub fog_mode: Option<String>,
}

/// A parsed `.unity` document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedScene {
    pub name: String,
    /// First referenced GUID, or empty
    pub guid: String,
    pub graph: SceneGraph,
    pub lighting_settings: LightingSettings,
    pub render_settings: RenderSettings,
    pub dependencies: Vec<String>,
}

impl ParsedScene {
    /// Every GameObject, roots and children alike, in document order
    pub fn game_objects(&self) -> impl Iterator<Item = &GameObjectNode> {
        self.graph.nodes()
    }

    /// GameObjects with no parent
    pub fn roots(&self) -> Vec<&GameObjectNode> {
        self.graph
            .root_ids()
            .into_iter()
            .filter_map(|id| self.graph.node(id))
            .collect()
    }
}

/// Parse scene text.
///
/// Returns `None` only when the document holds no records at all; a scene
/// without GameObjects is still a scene.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_scene(text: &str) -> Option<ParsedScene> {
    let records = parse_document(text);
    if records.is_empty() {
        debug!("scene has no records");
        return None;
    }

    let graph = SceneGraph::resolve(&records);
    let dependencies = unique_guids(extract_guids(text));

    Some(ParsedScene {
        name: "Scene".to_string(),
        guid: dependencies.first().cloned().unwrap_or_default(),
        graph,
        lighting_settings: LightingSettings::default(),
        render_settings: RenderSettings::default(),
        dependencies,
    })
}
