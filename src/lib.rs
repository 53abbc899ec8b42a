//! Unity Asset Graph
//!
//! Reads Unity's text serialization (scenes, prefabs, materials) into typed
//! records and GameObject graphs, extracts cross-asset dependencies and
//! supports a deconstruct → edit → reconstruct workflow.
//!
//! The parsing engine is synchronous and does no I/O; the [`loader`] module
//! is the host side that reads files and fans batches out over a thread pool.
//!
//! # Examples
//!
//! ```rust
//! use unity_asset_graph::{AssetKind, parse_asset};
//!
//! let text = "--- !u!1 &100\nGameObject:\n  m_Name: Player\n  m_IsActive: 1\n";
//! let parsed = parse_asset(AssetKind::Prefab, text).unwrap();
//!
//! assert_eq!(parsed.as_prefab().unwrap().root.name, "Player");
//! ```

// Re-export from core, YAML and asset crates
pub use unity_graph_core::{
    DecodedValue, FileId, RawRecord, Reference, Result, UnityGraphError, class_ids, classify,
};

pub use unity_graph_yaml::{
    ParseDiagnostics, RecordSet, extract_guids, parse_document, tokenize, unique_guids,
};

pub use unity_graph_assets::*;

/// Host-side file loading
pub mod loader {
    use crate::{
        AssetKind, ParsedAsset, Result, SourceAsset, UnityGraphError, infer_asset_kind,
        parse_asset, parse_meta_file, relative_asset_path,
    };
    use rayon::prelude::*;
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};
    use tracing::{debug, info, instrument, warn};
    use unity_graph_yaml::{extract_guids, unique_guids};

    /// Largest file the loader reads by default (100 MiB)
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

    /// Loader limits
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct LoaderConfig {
        /// Files above this size fail with [`UnityGraphError::FileTooLarge`]
        pub max_file_size: u64,
        /// Worker threads for [`load_assets`]; 0 uses rayon's global pool
        pub max_concurrent_loads: usize,
        /// Report each dependency GUID once
        pub dedupe_dependencies: bool,
    }

    impl Default for LoaderConfig {
        fn default() -> Self {
            Self {
                max_file_size: DEFAULT_MAX_FILE_SIZE,
                max_concurrent_loads: 0,
                dedupe_dependencies: true,
            }
        }
    }

    /// A file read from disk, with its parse result
    #[derive(Debug, Clone, Serialize)]
    pub struct LoadedAsset {
        pub path: PathBuf,
        pub source: SourceAsset,
        /// `None` for kinds without a text parser or documents without content
        pub parsed: Option<ParsedAsset>,
        pub dependencies: Vec<String>,
    }

    impl LoadedAsset {
        pub fn kind(&self) -> AssetKind {
            self.source.kind
        }

        /// The parse result, or an error when the kind has no text parser
        pub fn parsed(&self) -> Result<Option<&ParsedAsset>> {
            if !self.kind().has_text_parser() {
                return Err(UnityGraphError::unsupported_kind(self.kind().as_str()));
            }
            Ok(self.parsed.as_ref())
        }
    }

    /// Kinds stored as text in a project
    fn reads_as_text(kind: AssetKind) -> bool {
        matches!(
            kind,
            AssetKind::Prefab
                | AssetKind::Scene
                | AssetKind::ScriptableObject
                | AssetKind::Material
                | AssetKind::Shader
                | AssetKind::Animation
                | AssetKind::AnimatorController
                | AssetKind::Script
                | AssetKind::Compute
                | AssetKind::RenderTexture
                | AssetKind::LightingData
        )
    }

    /// Load one asset file.
    ///
    /// A document the parser finds nothing in yields `parsed: None`; only
    /// I/O failures and the size limit are errors.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_asset<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<LoadedAsset> {
        let path = path.as_ref();

        let size = std::fs::metadata(path)?.len();
        if size > config.max_file_size {
            return Err(UnityGraphError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: config.max_file_size,
            });
        }

        let kind = infer_asset_kind(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = relative_asset_path(&path.to_string_lossy());
        let mut source = SourceAsset::new(id, name, kind);

        let meta_path = PathBuf::from(format!("{}.meta", path.display()));
        if meta_path.is_file() {
            let meta = parse_meta_file(&std::fs::read_to_string(&meta_path)?);
            source = source.with_metadata(meta.to_metadata());
            if let Some(guid) = meta.guid {
                source = source.with_guid(guid);
            }
        }

        let mut parsed = None;
        let mut dependencies = Vec::new();
        if reads_as_text(kind) {
            let text = read_text(path)?;
            parsed = parse_asset(kind, &text);

            let guids = extract_guids(&text);
            dependencies = if config.dedupe_dependencies {
                unique_guids(guids)
            } else {
                guids
            };
            source = source.with_contents(text);
        }

        debug!(%kind, parsed = parsed.is_some(), dependencies = dependencies.len(), "loaded asset");
        Ok(LoadedAsset {
            path: path.to_path_buf(),
            source,
            parsed,
            dependencies,
        })
    }

    /// Read a text-kind file. Binary-serialized `.asset` files and scripts in
    /// legacy encodings are decoded lossily instead of failing the load.
    fn read_text(path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                debug!(error = %e.utf8_error(), "file is not valid UTF-8, decoding lossily");
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    /// Load many files in parallel.
    ///
    /// Results come back in input order; one failure never blocks the rest.
    pub fn load_assets<P>(paths: &[P], config: &LoaderConfig) -> Vec<(PathBuf, Result<LoadedAsset>)>
    where
        P: AsRef<Path> + Sync,
    {
        let load_all = || {
            paths
                .par_iter()
                .map(|p| (p.as_ref().to_path_buf(), load_asset(p, config)))
                .collect::<Vec<_>>()
        };

        let results = match config.max_concurrent_loads {
            0 => load_all(),
            threads => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(load_all),
                Err(e) => {
                    warn!(error = %e, "could not build loader pool, using the global one");
                    load_all()
                }
            },
        };

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(files = results.len(), failed, "batch load finished");
        results
    }

    /// Every asset file under `dir`, sorted, skipping Unity's generated folders
    pub fn collect_asset_paths<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        traverse_directory(dir.as_ref(), &mut paths)?;
        paths.sort();
        Ok(paths)
    }

    /// Asset files under `dir` that have a text parser (prefabs, scenes, materials)
    pub fn collect_parseable_paths<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut paths = collect_asset_paths(dir)?;
        paths.retain(|p| infer_asset_kind(p).has_text_parser());
        Ok(paths)
    }

    fn traverse_directory(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                let skip = path.file_name().and_then(|n| n.to_str()).is_some_and(|name| {
                    matches!(
                        name,
                        "Library" | "Temp" | "Logs" | "obj" | "bin" | ".git" | ".vs"
                    )
                });
                if !skip {
                    traverse_directory(&path, paths)?;
                }
            } else if infer_asset_kind(&path) != AssetKind::Unknown {
                paths.push(path);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::fs;
        use tempfile::TempDir;

        const PREFAB: &str = "\
--- !u!1 &1
GameObject:
  m_Component:
  - component: {fileID: 2}
  m_Name: Crate
--- !u!23 &2
MeshRenderer:
  m_GameObject: {fileID: 1}
  m_Materials:
  - {fileID: 2100000, guid: aaaabbbbccccddddaaaabbbbccccdddd, type: 2}
  - {fileID: 2100000, guid: aaaabbbbccccddddaaaabbbbccccdddd, type: 2}
";

        #[test]
        fn test_load_prefab_with_meta() -> anyhow::Result<()> {
            let dir = TempDir::new()?;
            let assets = dir.path().join("Assets");
            fs::create_dir_all(&assets)?;
            let path = assets.join("Crate.prefab");
            fs::write(&path, PREFAB)?;
            fs::write(
                assets.join("Crate.prefab.meta"),
                "fileFormatVersion: 2\nguid: 0f0e0d0c0b0a09080706050403020100\nPrefabImporter:\n",
            )?;

            let loaded = load_asset(&path, &LoaderConfig::default())?;
            assert_eq!(loaded.kind(), AssetKind::Prefab);
            assert_eq!(loaded.source.name, "Crate.prefab");
            assert_eq!(loaded.source.id, "Assets/Crate.prefab");
            assert_eq!(loaded.source.guid(), Some("0f0e0d0c0b0a09080706050403020100"));
            assert_eq!(loaded.dependencies, vec!["aaaabbbbccccddddaaaabbbbccccdddd"]);

            let parsed = loaded.parsed()?.expect("prefab parses");
            assert_eq!(parsed.as_prefab().map(|p| p.name.as_str()), Some("Crate"));
            Ok(())
        }

        #[test]
        fn test_keep_duplicate_dependencies() -> anyhow::Result<()> {
            let dir = TempDir::new()?;
            let path = dir.path().join("Crate.prefab");
            fs::write(&path, PREFAB)?;

            let config = LoaderConfig {
                dedupe_dependencies: false,
                ..LoaderConfig::default()
            };
            let loaded = load_asset(&path, &config)?;
            assert_eq!(loaded.dependencies.len(), 2);
            Ok(())
        }

        #[test]
        fn test_file_too_large() -> anyhow::Result<()> {
            let dir = TempDir::new()?;
            let path = dir.path().join("Big.prefab");
            fs::write(&path, PREFAB)?;

            let config = LoaderConfig {
                max_file_size: 16,
                ..LoaderConfig::default()
            };
            let err = load_asset(&path, &config).unwrap_err();
            assert!(matches!(err, UnityGraphError::FileTooLarge { limit: 16, .. }));
            Ok(())
        }

        #[test]
        fn test_unparsed_kinds() -> anyhow::Result<()> {
            let dir = TempDir::new()?;
            let texture = dir.path().join("Wood.png");
            fs::write(&texture, [0x89, b'P', b'N', b'G', 0xff, 0xfe])?;
            let script = dir.path().join("Player.cs");
            fs::write(&script, "class Player {}\n")?;

            let loaded = load_asset(&texture, &LoaderConfig::default())?;
            assert!(loaded.source.contents.is_none());
            assert!(matches!(
                loaded.parsed(),
                Err(UnityGraphError::UnsupportedAssetKind { .. })
            ));

            let loaded = load_asset(&script, &LoaderConfig::default())?;
            assert_eq!(loaded.source.contents.as_deref(), Some("class Player {}\n"));
            assert!(loaded.parsed.is_none());
            Ok(())
        }

        #[test]
        fn test_non_utf8_text_kinds_still_load() -> anyhow::Result<()> {
            let dir = TempDir::new()?;
            let lighting = dir.path().join("Lighting.asset");
            fs::write(&lighting, [0x55, 0x6e, 0xff, 0xfe, 0x00, 0x01])?;
            let script = dir.path().join("Legacy.cs");
            fs::write(&script, b"// caf\xe9\nclass Legacy {}\n")?;

            let loaded = load_asset(&lighting, &LoaderConfig::default())?;
            assert_eq!(loaded.kind(), AssetKind::ScriptableObject);
            assert!(loaded.parsed.is_none());
            assert!(loaded.dependencies.is_empty());
            assert!(loaded.source.contents.as_deref().is_some_and(|t| t.starts_with("Un")));

            let loaded = load_asset(&script, &LoaderConfig::default())?;
            let contents = loaded.source.contents.unwrap_or_default();
            assert!(contents.contains("class Legacy {}"));
            assert!(contents.contains('\u{fffd}'));
            Ok(())
        }

        #[test]
        fn test_batch_load_keeps_order_and_isolates_failures() -> anyhow::Result<()> {
            let dir = TempDir::new()?;
            let good = dir.path().join("A.prefab");
            let empty = dir.path().join("B.prefab");
            let missing = dir.path().join("C.prefab");
            fs::write(&good, PREFAB)?;
            fs::write(&empty, "")?;

            let config = LoaderConfig {
                max_concurrent_loads: 2,
                ..LoaderConfig::default()
            };
            let results = load_assets(&[&good, &empty, &missing], &config);

            let order: Vec<_> = results.iter().map(|(p, _)| p.clone()).collect();
            assert_eq!(order, vec![good.clone(), empty.clone(), missing.clone()]);
            assert!(results[0].1.as_ref().is_ok_and(|a| a.parsed.is_some()));
            assert!(results[1].1.as_ref().is_ok_and(|a| a.parsed.is_none()));
            assert!(matches!(results[2].1, Err(UnityGraphError::Io(_))));
            Ok(())
        }

        #[test]
        fn test_collect_asset_paths_skips_generated_folders() -> anyhow::Result<()> {
            let dir = TempDir::new()?;
            fs::create_dir_all(dir.path().join("Assets/Prefabs"))?;
            fs::create_dir_all(dir.path().join("Library/Cache"))?;
            fs::write(dir.path().join("Assets/Prefabs/Crate.prefab"), PREFAB)?;
            fs::write(dir.path().join("Assets/Prefabs/Crate.prefab.meta"), "guid: 01\n")?;
            fs::write(dir.path().join("Assets/Brick.mat"), "Material:\n  m_Name: Brick\n")?;
            fs::write(dir.path().join("Library/Cache/Stale.prefab"), PREFAB)?;

            let paths = collect_asset_paths(dir.path())?;
            let names: Vec<_> = paths
                .iter()
                .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
                .collect();
            assert_eq!(names, vec!["Brick.mat", "Crate.prefab"]);
            Ok(())
        }

        #[test]
        fn test_collect_parseable_paths_leaves_out_binary_kinds() -> anyhow::Result<()> {
            let dir = TempDir::new()?;
            fs::create_dir_all(dir.path().join("Assets/Art"))?;
            fs::write(dir.path().join("Assets/Art/Wood.png"), [0x89, b'P', b'N', b'G'])?;
            fs::write(dir.path().join("Assets/Art/Rock.fbx"), "Kaydara FBX Binary")?;
            fs::write(dir.path().join("Assets/Player.cs"), "class Player {}\n")?;
            fs::write(dir.path().join("Assets/Crate.prefab"), PREFAB)?;
            fs::write(dir.path().join("Assets/Main.unity"), PREFAB)?;

            let all = collect_asset_paths(dir.path())?;
            assert_eq!(all.len(), 5);

            let paths = collect_parseable_paths(dir.path())?;
            let names: Vec<_> = paths
                .iter()
                .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
                .collect();
            assert_eq!(names, vec!["Crate.prefab", "Main.unity"]);

            let config = LoaderConfig::default();
            assert!(load_assets(&paths, &config)
                .iter()
                .all(|(_, r)| r.as_ref().is_ok_and(|a| a.parsed().is_ok())));
            Ok(())
        }
    }
}

pub use loader::{
    LoadedAsset, LoaderConfig, collect_asset_paths, collect_parseable_paths, load_asset,
    load_assets,
};
