//! Unity Graph Assets
//!
//! Everything built on top of the parsed records: the GameObject graph,
//! the prefab, material and scene read models, asset identity, the
//! deconstruct/reconstruct workflow and project-file helpers.
//!
//! # Examples
//!
//! ```rust
//! use unity_graph_assets::parse_prefab;
//!
//! let prefab = parse_prefab("--- !u!1 &100\nGameObject:\n  m_Name: Player\n  m_IsActive: 1\n")
//!     .expect("document has a GameObject");
//!
//! assert_eq!(prefab.root.name, "Player");
//! assert!(prefab.root.is_active);
//! ```

// Re-export core types
pub use unity_graph_core::{
    DecodedValue, FileId, RawRecord, Reference, Result, UnityGraphError, classify,
};

pub mod asset;
pub mod deconstruct;
pub mod graph;
pub mod material;
pub mod prefab;
pub mod project;
pub mod reconstruct;
pub mod scene;

pub use asset::{
    AssetKind, AssetMeta, ParsedAsset, SourceAsset, format_guid, infer_asset_kind,
    normalize_guid, parse_asset, parse_meta_file,
};
pub use deconstruct::{ComponentKind, DeconstructedComponent, deconstruct, template_slugs};
pub use graph::{
    ComponentRef, GameObjectNode, SceneGraph, UnresolvedReference, find_components_of_type,
};
pub use material::{
    MaterialProperty, MaterialPropertyKind, MaterialTexture, ParsedMaterial, ShaderRef,
    extract_material_textures, parse_material,
};
pub use prefab::{ParsedPrefab, PrefabModification, parse_prefab};
pub use project::{
    BuildScene, PackageInfo, ProjectSettings, is_unity_project_path, normalize_unity_path,
    parse_package_manifest, parse_project_settings, parse_project_version, parse_scene_list,
    relative_asset_path,
};
pub use reconstruct::{ExportFormat, ReconstructedAsset, reconstruct, reconstruct_at};
pub use scene::{LightingSettings, ParsedScene, RenderSettings, parse_scene};
