//! Material read model
//!
//! Materials are single-object documents, so this reads the one `Material`
//! record directly instead of resolving a GameObject graph.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, instrument};
use unity_graph_core::{DEFAULT_RENDER_QUEUE, DecodedValue, RawRecord, class_ids, class_names};
use unity_graph_yaml::{RecordSet, parse_document};

/// Kind of a saved material property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialPropertyKind {
    Color,
    Float,
    Texture,
    Vector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialProperty {
    #[serde(rename = "type")]
    pub kind: MaterialPropertyKind,
    pub value: DecodedValue,
}

/// Shader identity as referenced by the material
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShaderRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
}

/// A texture slot bound to an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialTexture {
    pub name: String,
    pub guid: String,
}

/// A parsed `.mat` document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMaterial {
    pub name: String,
    pub shader: ShaderRef,
    pub properties: IndexMap<String, MaterialProperty>,
    pub textures: Vec<MaterialTexture>,
    pub keywords: Vec<String>,
    pub render_queue: i64,
}

impl ParsedMaterial {
    /// GUIDs of every bound texture
    pub fn texture_guids(&self) -> Vec<&str> {
        self.textures.iter().map(|t| t.guid.as_str()).collect()
    }
}

/// Texture GUIDs of a parsed material, in slot order
pub fn extract_material_textures(material: &ParsedMaterial) -> Vec<String> {
    material.textures.iter().map(|t| t.guid.clone()).collect()
}

/// Parse material text.
///
/// Returns `None` when the document has no `Material` block.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_material(text: &str) -> Option<ParsedMaterial> {
    let records = parse_document(text);
    let Some(material) = find_material(&records) else {
        debug!("no Material block");
        return None;
    };

    let saved = material.get("m_SavedProperties");
    let table = |key: &str| {
        saved
            .and_then(|s| s.get(key))
            .map(named_entries)
            .unwrap_or_default()
    };

    let textures = table("m_TexEnvs")
        .into_iter()
        .filter_map(|(name, slot)| {
            let guid = texture_guid(slot)?;
            Some(MaterialTexture { name, guid })
        })
        .collect();

    let mut properties = IndexMap::new();
    for (name, value) in table("m_Floats") {
        properties.insert(
            name,
            MaterialProperty {
                kind: MaterialPropertyKind::Float,
                value: value.clone(),
            },
        );
    }
    for (name, value) in table("m_Colors") {
        properties.insert(
            name,
            MaterialProperty {
                kind: MaterialPropertyKind::Color,
                value: value.clone(),
            },
        );
    }

    Some(ParsedMaterial {
        name: material
            .name()
            .filter(|n| !n.is_empty())
            .unwrap_or("Unnamed Material")
            .to_string(),
        shader: shader_ref(material.get("m_Shader")),
        properties,
        textures,
        keywords: keywords(material),
        render_queue: material
            .get("m_CustomRenderQueue")
            .and_then(DecodedValue::as_i64)
            .unwrap_or(DEFAULT_RENDER_QUEUE),
    })
}

fn find_material(records: &RecordSet) -> Option<&RawRecord> {
    records
        .find_by_class_name(class_names::MATERIAL)
        .or_else(|| records.of_class(class_ids::MATERIAL).next())
}

/// Entries of a saved-property table.
///
/// Unity has written three shapes over the years: a plain map, a sequence of
/// single-key maps (2018+), and a sequence of `first: {name}` / `second`
/// pairs (Unity 5).
fn named_entries(table: &DecodedValue) -> Vec<(String, &DecodedValue)> {
    match table {
        DecodedValue::FlowMap(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        DecodedValue::FlowSeq(items) => items.iter().filter_map(sequence_entry).collect(),
        _ => Vec::new(),
    }
}

fn sequence_entry(item: &DecodedValue) -> Option<(String, &DecodedValue)> {
    let map = item.as_map()?;
    if let (Some(first), Some(second)) = (map.get("first"), map.get("second")) {
        let name = first.get("name").and_then(DecodedValue::as_str)?;
        return Some((name.to_string(), second));
    }
    match map.len() {
        1 => map.iter().next().map(|(k, v)| (k.clone(), v)),
        _ => None,
    }
}

fn texture_guid(slot: &DecodedValue) -> Option<String> {
    let texture = slot.get("m_Texture")?;
    let guid = match texture {
        DecodedValue::Reference(r) => r.guid.as_deref(),
        other => other.get("guid").and_then(DecodedValue::as_str),
    }?;
    (!guid.is_empty()).then(|| guid.to_string())
}

fn shader_ref(shader: Option<&DecodedValue>) -> ShaderRef {
    let name = shader
        .and_then(|s| s.get("m_Name"))
        .and_then(DecodedValue::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let guid = match shader {
        Some(DecodedValue::Reference(r)) => r.guid.clone(),
        Some(other) => other
            .get("guid")
            .and_then(DecodedValue::as_str)
            .map(str::to_string),
        None => None,
    };
    ShaderRef { name, guid }
}

fn keywords(material: &RawRecord) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();

    if let Some(text) = material
        .get("m_ShaderKeywords")
        .and_then(DecodedValue::as_str)
    {
        words.extend(text.split_whitespace().map(str::to_string));
    }

    let valid = material
        .get("m_ValidKeywords")
        .and_then(DecodedValue::as_seq)
        .unwrap_or_default();
    for keyword in valid.iter().filter_map(DecodedValue::as_str) {
        if !words.iter().any(|w| w == keyword) {
            words.push(keyword.to_string());
        }
    }

    words
}
