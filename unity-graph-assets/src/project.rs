//! Project-level files
//!
//! Readers for the small files around the assets: `ProjectVersion.txt`,
//! `EditorBuildSettings.asset`, `ProjectSettings.asset`,
//! `Packages/manifest.json`, plus project path helpers.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use unity_graph_core::DecodedValue;
use unity_graph_yaml::parse_document;

static EDITOR_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)m_EditorVersion:[ \t]*(.+)$").expect("editor version pattern is valid")
});

/// Editor version from `ProjectVersion.txt`, or `"Unknown"`
pub fn parse_project_version(text: &str) -> String {
    EDITOR_VERSION
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|v| !v.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

/// A scene listed in the build settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildScene {
    pub path: String,
    pub guid: String,
    /// File name without `.unity`
    pub name: String,
    /// Position among enabled scenes; `None` when disabled
    pub build_index: Option<usize>,
    pub enabled: bool,
}

/// Scenes from `EditorBuildSettings.asset`, in listed order
pub fn parse_scene_list(text: &str) -> Vec<BuildScene> {
    let records = parse_document(text);
    let Some(entries) = records
        .iter()
        .find_map(|r| r.get("m_Scenes"))
        .and_then(DecodedValue::as_seq)
    else {
        return Vec::new();
    };

    let mut next_index = 0;
    entries
        .iter()
        .filter_map(|entry| {
            let path = entry.get("path").and_then(DecodedValue::as_str)?;
            let enabled = entry.get("enabled").is_none_or(DecodedValue::is_truthy);
            let build_index = enabled.then(|| {
                next_index += 1;
                next_index - 1
            });

            Some(BuildScene {
                path: path.to_string(),
                guid: entry
                    .get("guid")
                    .and_then(DecodedValue::as_str)
                    .unwrap_or_default()
                    .to_string(),
                name: scene_name(path),
                build_index,
                enabled,
            })
        })
        .collect()
}

fn scene_name(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.strip_suffix(".unity").unwrap_or(file).to_string()
}

/// A package dependency from `manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub name: String,
    /// Version, or the git/file URL the package resolves from
    pub version: String,
    pub display_name: String,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    dependencies: IndexMap<String, Value>,
}

/// Packages from `Packages/manifest.json`; malformed JSON yields none
pub fn parse_package_manifest(json: &str) -> Vec<PackageInfo> {
    let manifest: Manifest = match serde_json::from_str(json) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(error = %e, "failed to parse package manifest");
            return Vec::new();
        }
    };

    manifest
        .dependencies
        .into_iter()
        .map(|(name, version)| PackageInfo {
            display_name: name.clone(),
            version: match version {
                Value::String(s) => s,
                other => other.to_string(),
            },
            name,
        })
        .collect()
}

/// Identity fields of `ProjectSettings.asset`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

pub fn parse_project_settings(text: &str) -> ProjectSettings {
    let records = parse_document(text);
    let field = |key: &str| {
        records
            .iter()
            .find_map(|r| r.get(key))
            .filter(|v| !v.is_null())
            .map(ToString::to_string)
    };

    ProjectSettings {
        company_name: field("companyName"),
        product_name: field("productName"),
    }
}

/// Forward slashes only, no repeated separators
pub fn normalize_unity_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let mut normalized = String::with_capacity(forward.len());
    for c in forward.chars() {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }
    normalized
}

/// Whether the path lies under one of a project's top-level folders
pub fn is_unity_project_path(path: &str) -> bool {
    let path = normalize_unity_path(path);
    ["Assets/", "ProjectSettings/", "Packages/"]
        .iter()
        .any(|folder| path.contains(folder))
}

/// The path from `Assets/` (or `Packages/`) onwards; other paths unchanged
pub fn relative_asset_path(path: &str) -> String {
    let path = normalize_unity_path(path);
    ["Assets/", "Packages/"]
        .iter()
        .find_map(|folder| path.find(folder))
        .map_or_else(|| path.clone(), |start| path[start..].to_string())
}
