//! Asset identity
//!
//! What kind of asset a file is, what its `.meta` sidecar says about it, and
//! the kind-dispatching entry point over the text parsers.

use crate::material::{ParsedMaterial, parse_material};
use crate::prefab::{ParsedPrefab, parse_prefab};
use crate::scene::{ParsedScene, parse_scene};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Asset kinds known to a Unity project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetKind {
    Prefab,
    Scene,
    ScriptableObject,
    Material,
    Shader,
    Texture,
    Model,
    Audio,
    Animation,
    AnimatorController,
    Script,
    Font,
    Video,
    Compute,
    RenderTexture,
    LightingData,
    Unknown,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Prefab => "Prefab",
            AssetKind::Scene => "Scene",
            AssetKind::ScriptableObject => "ScriptableObject",
            AssetKind::Material => "Material",
            AssetKind::Shader => "Shader",
            AssetKind::Texture => "Texture",
            AssetKind::Model => "Model",
            AssetKind::Audio => "Audio",
            AssetKind::Animation => "Animation",
            AssetKind::AnimatorController => "AnimatorController",
            AssetKind::Script => "Script",
            AssetKind::Font => "Font",
            AssetKind::Video => "Video",
            AssetKind::Compute => "Compute",
            AssetKind::RenderTexture => "RenderTexture",
            AssetKind::LightingData => "LightingData",
            AssetKind::Unknown => "Unknown",
        }
    }

    /// Whether [`parse_asset`] understands this kind
    pub fn has_text_parser(&self) -> bool {
        matches!(
            self,
            AssetKind::Prefab | AssetKind::Scene | AssetKind::Material
        )
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infer the asset kind from a file extension
pub fn infer_asset_kind<P: AsRef<Path>>(path: P) -> AssetKind {
    let path = path.as_ref().to_string_lossy();
    let extension = path.rsplit('.').next().unwrap_or_default().to_lowercase();

    match extension.as_str() {
        "prefab" => AssetKind::Prefab,
        "unity" => AssetKind::Scene,
        "asset" => AssetKind::ScriptableObject,
        "mat" => AssetKind::Material,
        "shader" | "cginc" | "hlsl" => AssetKind::Shader,
        "png" | "jpg" | "jpeg" | "tga" | "psd" | "exr" | "hdr" => AssetKind::Texture,
        "fbx" | "obj" | "blend" | "dae" | "3ds" => AssetKind::Model,
        "wav" | "mp3" | "ogg" | "aiff" => AssetKind::Audio,
        "anim" => AssetKind::Animation,
        "controller" => AssetKind::AnimatorController,
        "cs" | "js" | "boo" => AssetKind::Script,
        "ttf" | "otf" => AssetKind::Font,
        "mp4" | "mov" | "avi" => AssetKind::Video,
        "compute" => AssetKind::Compute,
        "rendertexture" => AssetKind::RenderTexture,
        _ => AssetKind::Unknown,
    }
}

static META_GUID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"guid:\s*([a-f0-9]+)").expect("meta guid pattern is valid"));
static META_FORMAT_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"fileFormatVersion:\s*(\d+)").expect("format version pattern is valid")
});
static META_IMPORTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+Importer):").expect("importer pattern is valid"));
static META_BUNDLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)assetBundleName:[ \t]*(.*)$").expect("bundle name pattern is valid")
});
static META_BUNDLE_VARIANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)assetBundleVariant:[ \t]*(.*)$").expect("bundle variant pattern is valid")
});

/// Fields of a `.meta` sidecar file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_bundle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_bundle_variant: Option<String>,
}

impl AssetMeta {
    /// The fields as a JSON object, for [`SourceAsset::metadata`]
    pub fn to_metadata(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Parse a `.meta` file. Missing fields stay `None`.
pub fn parse_meta_file(text: &str) -> AssetMeta {
    AssetMeta {
        guid: capture(&META_GUID, text),
        file_format_version: capture(&META_FORMAT_VERSION, text).and_then(|v| v.parse().ok()),
        importer: capture(&META_IMPORTER, text),
        asset_bundle_name: capture(&META_BUNDLE_NAME, text),
        asset_bundle_variant: capture(&META_BUNDLE_VARIANT, text),
    }
}

/// First capture group, trimmed; empty counts as absent
fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Strip dashes and lowercase
pub fn normalize_guid(guid: &str) -> String {
    guid.replace('-', "").to_lowercase()
}

/// Format a 32-character GUID as 8-4-4-4-12; other lengths pass through
pub fn format_guid(guid: &str) -> String {
    if guid.len() != 32 || !guid.is_ascii() {
        return guid.to_string();
    }
    format!(
        "{}-{}-{}-{}-{}",
        &guid[..8],
        &guid[8..12],
        &guid[12..16],
        &guid[16..20],
        &guid[20..]
    )
}

/// An asset as handed to deconstruct/reconstruct
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceAsset {
    pub id: String,
    /// File name, extension included
    pub name: String,
    pub kind: AssetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    pub metadata: Map<String, Value>,
}

impl SourceAsset {
    pub fn new<S: Into<String>, N: Into<String>>(id: S, name: N, kind: AssetKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            guid: None,
            contents: None,
            metadata: Map::new(),
        }
    }

    pub fn with_contents<S: Into<String>>(mut self, contents: S) -> Self {
        self.contents = Some(contents.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_guid<S: Into<String>>(mut self, guid: S) -> Self {
        self.guid = Some(guid.into());
        self
    }

    /// Explicit GUID, else the `guid` entry of the metadata
    pub fn guid(&self) -> Option<&str> {
        self.guid
            .as_deref()
            .or_else(|| self.metadata.get("guid").and_then(Value::as_str))
    }
}

/// Result of a kind-specific parse
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum ParsedAsset {
    Prefab(ParsedPrefab),
    Material(ParsedMaterial),
    Scene(ParsedScene),
}

impl ParsedAsset {
    pub fn kind(&self) -> AssetKind {
        match self {
            ParsedAsset::Prefab(_) => AssetKind::Prefab,
            ParsedAsset::Material(_) => AssetKind::Material,
            ParsedAsset::Scene(_) => AssetKind::Scene,
        }
    }

    /// Referenced asset GUIDs
    pub fn dependencies(&self) -> Vec<String> {
        match self {
            ParsedAsset::Prefab(prefab) => prefab.dependencies.clone(),
            ParsedAsset::Scene(scene) => scene.dependencies.clone(),
            ParsedAsset::Material(material) => {
                let mut guids: Vec<String> = material.shader.guid.iter().cloned().collect();
                guids.extend(material.textures.iter().map(|t| t.guid.clone()));
                guids
            }
        }
    }

    pub fn as_prefab(&self) -> Option<&ParsedPrefab> {
        match self {
            ParsedAsset::Prefab(prefab) => Some(prefab),
            _ => None,
        }
    }

    pub fn as_material(&self) -> Option<&ParsedMaterial> {
        match self {
            ParsedAsset::Material(material) => Some(material),
            _ => None,
        }
    }

    pub fn as_scene(&self) -> Option<&ParsedScene> {
        match self {
            ParsedAsset::Scene(scene) => Some(scene),
            _ => None,
        }
    }
}

/// Parse text with the parser for `kind`.
///
/// `None` for kinds without a text parser and for documents the parser
/// found nothing in.
pub fn parse_asset(kind: AssetKind, text: &str) -> Option<ParsedAsset> {
    match kind {
        AssetKind::Prefab => parse_prefab(text).map(ParsedAsset::Prefab),
        AssetKind::Material => parse_material(text).map(ParsedAsset::Material),
        AssetKind::Scene => parse_scene(text).map(ParsedAsset::Scene),
        other => {
            debug!(kind = %other, "no text parser for asset kind");
            None
        }
    }
}
