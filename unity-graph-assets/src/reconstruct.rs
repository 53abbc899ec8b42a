//! Reconstruct: serialize an edited component list back into an artifact
//!
//! The artifact is always JSON. [`ExportFormat::PackageStub`] only changes
//! the suggested file extension; no Unity package container is written.

use crate::asset::{AssetKind, SourceAsset};
use crate::deconstruct::{ALL_SLUGS, ComponentKind, DeconstructedComponent, template_slugs};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::info;
use unity_graph_core::{Result, UnityGraphError};

/// Export container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "unitypackage")]
    PackageStub,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::PackageStub => "unitypackage",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "unitypackage" | "package" => Ok(ExportFormat::PackageStub),
            other => Err(format!(
                "unknown export format `{}` (expected json or unitypackage)",
                other
            )),
        }
    }
}

/// The produced artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructedAsset {
    pub original_id: String,
    pub name: String,
    pub kind: AssetKind,
    pub modified_properties: Map<String, Value>,
    pub export_format: ExportFormat,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ReconstructedAsset {
    /// Suggested download name
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.export_format.extension())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    asset: ExportAsset<'a>,
    components: Vec<ExportComponent<'a>>,
    modifications: &'a Map<String, Value>,
    reconstructed_at: String,
}

#[derive(Serialize)]
struct ExportAsset<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: AssetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    guid: Option<&'a str>,
}

#[derive(Serialize)]
struct ExportComponent<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: ComponentKind,
    properties: &'a Value,
}

/// Reconstruct with the current time as `reconstructedAt`
pub fn reconstruct(
    asset: &SourceAsset,
    components: &[DeconstructedComponent],
    modified_properties: &Map<String, Value>,
    format: ExportFormat,
) -> Result<ReconstructedAsset> {
    reconstruct_at(asset, components, modified_properties, format, Utc::now())
}

/// Reconstruct with an explicit timestamp.
///
/// Fails when `components` is empty, when a component id is not derived from
/// `asset.id`, or when a component came from another kind's template.
pub fn reconstruct_at(
    asset: &SourceAsset,
    components: &[DeconstructedComponent],
    modified_properties: &Map<String, Value>,
    format: ExportFormat,
    timestamp: DateTime<Utc>,
) -> Result<ReconstructedAsset> {
    validate(asset, components)?;

    let document = ExportDocument {
        asset: ExportAsset {
            name: &asset.name,
            kind: asset.kind,
            guid: asset.guid(),
        },
        components: components
            .iter()
            .map(|c| ExportComponent {
                name: &c.name,
                kind: c.kind,
                properties: &c.properties,
            })
            .collect(),
        modifications: modified_properties,
        reconstructed_at: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    let bytes = serde_json::to_vec_pretty(&document)
        .map_err(|e| UnityGraphError::serialization(e.to_string()))?;

    let stem = asset.name.split('.').next().unwrap_or_default();
    let reconstructed = ReconstructedAsset {
        original_id: asset.id.clone(),
        name: format!("{}_reconstructed", stem),
        kind: asset.kind,
        modified_properties: modified_properties.clone(),
        export_format: format,
        bytes,
    };

    info!(
        asset = %asset.id,
        file = %reconstructed.file_name(),
        bytes = reconstructed.bytes.len(),
        "reconstructed asset"
    );
    Ok(reconstructed)
}

fn validate(asset: &SourceAsset, components: &[DeconstructedComponent]) -> Result<()> {
    if components.is_empty() {
        return Err(UnityGraphError::empty_components(asset.id.as_str()));
    }

    let own_slugs = template_slugs(asset.kind);
    for component in components {
        let Some(slug) = component.slug(&asset.id) else {
            return Err(UnityGraphError::component_mismatch(
                component.id.as_str(),
                asset.id.as_str(),
            ));
        };
        if ALL_SLUGS.contains(&slug) && !own_slugs.contains(&slug) {
            return Err(UnityGraphError::caller_misuse(format!(
                "component `{}` comes from another template than {} `{}`",
                component.id, asset.kind, asset.id
            )));
        }
    }

    Ok(())
}
