//! Deconstruct: an asset as an editable list of property bags
//!
//! Each asset kind has a fixed template. Prefabs get a simplified editing
//! surface of default Transform, MeshRenderer and BoxCollider records rather
//! than their parsed components.

use crate::asset::{AssetKind, ParsedAsset, SourceAsset};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use unity_graph_core::DEFAULT_RENDER_QUEUE;

/// Role of a deconstructed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    Component,
    Property,
    Content,
    Meta,
}

/// One editable property bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeconstructedComponent {
    /// `"{asset_id}-{slug}"`
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub properties: Value,
    pub editable: bool,
}

impl DeconstructedComponent {
    fn new(asset: &SourceAsset, slug: &str, name: &str, kind: ComponentKind) -> Self {
        Self {
            id: component_id(&asset.id, slug),
            name: name.to_string(),
            kind,
            properties: Value::Object(Default::default()),
            editable: true,
        }
    }

    fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Template slug: the id with the `"{asset_id}-"` prefix removed
    pub fn slug<'a>(&'a self, asset_id: &str) -> Option<&'a str> {
        self.id.strip_prefix(asset_id)?.strip_prefix('-')
    }
}

pub(crate) const SLUG_TRANSFORM: &str = "transform";
pub(crate) const SLUG_MESH: &str = "mesh";
pub(crate) const SLUG_COLLIDER: &str = "collider";
pub(crate) const SLUG_SHADER: &str = "shader";
pub(crate) const SLUG_CODE: &str = "code";
pub(crate) const SLUG_META: &str = "meta";

/// Every slug some template emits
pub(crate) const ALL_SLUGS: &[&str] = &[
    SLUG_TRANSFORM,
    SLUG_MESH,
    SLUG_COLLIDER,
    SLUG_SHADER,
    SLUG_CODE,
    SLUG_META,
];

/// Slugs the template for `kind` emits, in emission order
pub fn template_slugs(kind: AssetKind) -> &'static [&'static str] {
    match kind {
        AssetKind::Prefab => &[SLUG_TRANSFORM, SLUG_MESH, SLUG_COLLIDER, SLUG_META],
        AssetKind::Material => &[SLUG_SHADER, SLUG_META],
        AssetKind::Script => &[SLUG_CODE, SLUG_META],
        _ => &[SLUG_META],
    }
}

pub fn component_id(asset_id: &str, slug: &str) -> String {
    format!("{}-{}", asset_id, slug)
}

/// Deconstruct an asset into editable records.
///
/// `parsed` is consulted only for materials, whose shader name and render
/// queue come from the parsed document when one is supplied.
pub fn deconstruct(
    asset: &SourceAsset,
    parsed: Option<&ParsedAsset>,
) -> Vec<DeconstructedComponent> {
    let mut components = match asset.kind {
        AssetKind::Prefab => prefab_template(asset),
        AssetKind::Material => vec![shader_record(asset, parsed)],
        AssetKind::Script => vec![source_record(asset)],
        _ => Vec::new(),
    };

    components.push(
        DeconstructedComponent::new(asset, SLUG_META, "Metadata", ComponentKind::Meta)
            .with_properties(Value::Object(asset.metadata.clone()))
            .read_only(),
    );

    debug!(asset = %asset.id, kind = %asset.kind, count = components.len(), "deconstructed asset");
    components
}

fn prefab_template(asset: &SourceAsset) -> Vec<DeconstructedComponent> {
    vec![
        DeconstructedComponent::new(asset, SLUG_TRANSFORM, "Transform", ComponentKind::Component)
            .with_properties(json!({
                "position": { "x": 0, "y": 0, "z": 0 },
                "rotation": { "x": 0, "y": 0, "z": 0 },
                "scale": { "x": 1, "y": 1, "z": 1 },
            })),
        DeconstructedComponent::new(asset, SLUG_MESH, "Mesh Renderer", ComponentKind::Component)
            .with_properties(json!({
                "castShadows": true,
                "receiveShadows": true,
                "materials": ["Material_Main"],
            })),
        DeconstructedComponent::new(asset, SLUG_COLLIDER, "Box Collider", ComponentKind::Component)
            .with_properties(json!({
                "isTrigger": false,
                "center": { "x": 0, "y": 0, "z": 0 },
                "size": { "x": 1, "y": 1, "z": 1 },
            })),
    ]
}

fn shader_record(asset: &SourceAsset, parsed: Option<&ParsedAsset>) -> DeconstructedComponent {
    let material = parsed.and_then(ParsedAsset::as_material);
    let shader = material.map_or("Standard", |m| m.shader.name.as_str());
    let render_queue = material.map_or(DEFAULT_RENDER_QUEUE, |m| m.render_queue);

    DeconstructedComponent::new(asset, SLUG_SHADER, "Shader", ComponentKind::Property)
        .with_properties(json!({
            "shader": shader,
            "renderQueue": render_queue,
        }))
        .read_only()
}

fn source_record(asset: &SourceAsset) -> DeconstructedComponent {
    let lines = asset
        .contents
        .as_deref()
        .map_or(0, |text| text.split('\n').count());

    DeconstructedComponent::new(asset, SLUG_CODE, "Source Code", ComponentKind::Content)
        .with_properties(json!({
            "language": "C#",
            "lines": lines,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::parse_material;
    use serde_json::Map;

    fn names(components: &[DeconstructedComponent]) -> Vec<&str> {
        components.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_prefab_template() {
        let asset = SourceAsset::new("p1", "Crate.prefab", AssetKind::Prefab);
        let components = deconstruct(&asset, None);

        assert_eq!(
            names(&components),
            vec!["Transform", "Mesh Renderer", "Box Collider", "Metadata"]
        );
        assert_eq!(components[0].id, "p1-transform");
        assert_eq!(components[0].properties["scale"]["x"], 1);
        assert_eq!(components[1].properties["materials"][0], "Material_Main");
        assert_eq!(components[2].properties["isTrigger"], false);
        assert!(components[..3].iter().all(|c| c.editable));
        assert!(
            components[..3]
                .iter()
                .all(|c| c.kind == ComponentKind::Component)
        );
    }

    #[test]
    fn test_metadata_record_is_last_and_read_only() {
        let mut metadata = Map::new();
        metadata.insert("guid".to_string(), Value::from("feedbeef"));
        let asset =
            SourceAsset::new("t1", "Wood.png", AssetKind::Texture).with_metadata(metadata);

        let components = deconstruct(&asset, None);
        assert_eq!(components.len(), 1);

        let meta = &components[0];
        assert_eq!(meta.id, "t1-meta");
        assert_eq!(meta.kind, ComponentKind::Meta);
        assert!(!meta.editable);
        assert_eq!(meta.properties["guid"], "feedbeef");
    }

    #[test]
    fn test_material_defaults_and_parsed_values() {
        let asset = SourceAsset::new("m1", "Brick.mat", AssetKind::Material);

        let components = deconstruct(&asset, None);
        assert_eq!(components[0].name, "Shader");
        assert_eq!(components[0].kind, ComponentKind::Property);
        assert!(!components[0].editable);
        assert_eq!(components[0].properties["shader"], "Standard");
        assert_eq!(components[0].properties["renderQueue"], 2000);

        let parsed = parse_material(
            "--- !u!21 &1\nMaterial:\n  m_Shader: {m_Name: Custom/Toon}\n  m_CustomRenderQueue: 3000\n",
        )
        .map(ParsedAsset::Material)
        .unwrap();
        let components = deconstruct(&asset, Some(&parsed));
        assert_eq!(components[0].properties["shader"], "Custom/Toon");
        assert_eq!(components[0].properties["renderQueue"], 3000);
    }

    #[test]
    fn test_script_line_count() {
        let asset = SourceAsset::new("s1", "Player.cs", AssetKind::Script)
            .with_contents("using UnityEngine;\nclass Player {}\n// end");
        let components = deconstruct(&asset, None);

        assert_eq!(names(&components), vec!["Source Code", "Metadata"]);
        assert_eq!(components[0].id, "s1-code");
        assert_eq!(components[0].kind, ComponentKind::Content);
        assert_eq!(components[0].properties["lines"], 3);
        assert_eq!(components[0].properties["language"], "C#");

        let empty = SourceAsset::new("s2", "Empty.cs", AssetKind::Script);
        assert_eq!(deconstruct(&empty, None)[0].properties["lines"], 0);
    }

    #[test]
    fn test_template_slugs_match_output() {
        for kind in [AssetKind::Prefab, AssetKind::Material, AssetKind::Script, AssetKind::Audio] {
            let asset = SourceAsset::new("x", "x", kind);
            let slugs: Vec<_> = deconstruct(&asset, None)
                .iter()
                .map(|c| c.slug("x").unwrap_or_default().to_string())
                .collect();
            assert_eq!(slugs, template_slugs(kind));
        }
    }
}
