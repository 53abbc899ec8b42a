//! Unity class IDs and the class classifier
//!
//! Unity tags every serialized object with a numeric class ID
//! (`--- !u!<classID> &<fileID>`). The table here maps the well-known IDs to
//! component type names.

/// Render queue reported for materials that do not store one
pub const DEFAULT_RENDER_QUEUE: i64 = 2000;

/// Look up the semantic type name for a class ID, if it is a known one
pub const fn class_name(class_id: u32) -> Option<&'static str> {
    match class_id {
        1 => Some("GameObject"),
        2 => Some("Component"),
        4 => Some("Transform"),
        20 => Some("Camera"),
        21 => Some("Material"),
        23 => Some("MeshRenderer"),
        25 => Some("Renderer"),
        28 => Some("Texture2D"),
        33 => Some("MeshFilter"),
        43 => Some("Mesh"),
        48 => Some("Shader"),
        54 => Some("Rigidbody"),
        61 => Some("Animation"),
        65 => Some("BoxCollider"),
        81 => Some("AudioListener"),
        82 => Some("AudioSource"),
        89 => Some("CubeMap"),
        90 => Some("Avatar"),
        91 => Some("AnimatorController"),
        92 => Some("GUILayer"),
        95 => Some("Animator"),
        96 => Some("TrailRenderer"),
        102 => Some("TextMesh"),
        104 => Some("RenderTexture"),
        108 => Some("Light"),
        111 => Some("AnimationClip"),
        114 => Some("MonoBehaviour"),
        115 => Some("MonoScript"),
        120 => Some("LineRenderer"),
        124 => Some("Flare"),
        128 => Some("Font"),
        129 => Some("GUIText"),
        132 => Some("GUITexture"),
        135 => Some("SphereCollider"),
        136 => Some("CapsuleCollider"),
        137 => Some("SkinnedMeshRenderer"),
        138 => Some("FixedJoint"),
        141 => Some("AudioClip"),
        143 => Some("CharacterController"),
        144 => Some("CharacterJoint"),
        153 => Some("ConfigurableJoint"),
        156 => Some("TerrainCollider"),
        157 => Some("Terrain"),
        198 => Some("ParticleSystem"),
        199 => Some("ParticleSystemRenderer"),
        212 => Some("SpriteRenderer"),
        213 => Some("Sprite"),
        218 => Some("Terrain"),
        222 => Some("RectTransform"),
        223 => Some("Canvas"),
        224 => Some("CanvasGroup"),
        225 => Some("CanvasRenderer"),
        _ => None,
    }
}

/// Classify a class ID into a component type name.
///
/// Total over `u32`: unknown IDs become `Component_<id>`.
pub fn classify(class_id: u32) -> String {
    match class_name(class_id) {
        Some(name) => name.to_string(),
        None => format!("Component_{}", class_id),
    }
}

/// Common Unity class IDs
pub mod class_ids {
    pub const OBJECT: u32 = 0;
    pub const GAME_OBJECT: u32 = 1;
    pub const TRANSFORM: u32 = 4;
    pub const MATERIAL: u32 = 21;
    /// Unity's RectTransform. The classifier table names 222 RectTransform,
    /// but editor-written scenes use 224, so hierarchy code accepts both.
    pub const RECT_TRANSFORM: u32 = 224;
    pub const RECT_TRANSFORM_LEGACY: u32 = 222;
    pub const PREFAB_INSTANCE: u32 = 1001;
}

/// Common Unity class names
pub mod class_names {
    pub const MATERIAL: &str = "Material";
}
