//! Canonical storage-path derivation for model files.
//!
//! Every component that computes a storage path (upload path generation,
//! record creation, migration, rollback, tests) goes through this module.
//! Path rules living in one place is what keeps the gateway's 1:1
//! path-to-key mapping collision-free.

/// Route prefix under which model objects are served by the gateway.
pub const MODELS_PREFIX: &str = "/models";

/// Derive the canonical folder slug from a model's display name.
///
/// Lowercases the name, collapses every maximal run of characters outside
/// `[a-z0-9]` into a single hyphen, and strips leading/trailing hyphens.
/// Idempotent: slugging a slug returns it unchanged. Returns an empty
/// string for names with no alphanumeric content; callers must treat that
/// as "no valid slug".
pub fn folder_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Canonical storage paths for one model, derived from its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub folder: String,
    pub ifc_url: String,
    pub xkt_url: String,
}

/// Compute the canonical folder-per-model paths for a display name.
///
/// Returns `None` when the name slugs to the empty string, in which case
/// no canonical layout exists for the model.
pub fn canonical_paths(name: &str) -> Option<ModelPaths> {
    let folder = folder_slug(name);
    if folder.is_empty() {
        return None;
    }
    let ifc_url = format!("{MODELS_PREFIX}/{folder}/{folder}.ifc");
    let xkt_url = format!("{MODELS_PREFIX}/{folder}/{folder}.xkt");
    Some(ModelPaths {
        folder,
        ifc_url,
        xkt_url,
    })
}

/// Legacy flat-namespace paths for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyPaths {
    pub ifc_url: String,
    pub xkt_url: String,
}

/// Join the whitespace-separated words of a display name with hyphens,
/// preserving case. This is the legacy file-name rule and is deliberately
/// distinct from [`folder_slug`]: legacy objects were stored under their
/// capitalized names.
pub fn legacy_file_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Compute the legacy flat-layout paths for a display name.
///
/// IFC sources lived under `/files/input/`, converted XKT output under
/// `/files/output/`. This is the single legacy-path rule; rollback is its
/// only producer.
pub fn legacy_paths(name: &str) -> LegacyPaths {
    let file = legacy_file_name(name);
    LegacyPaths {
        ifc_url: format!("/files/input/{file}.ifc"),
        xkt_url: format!("/files/output/{file}.xkt"),
    }
}

/// Map a storage URL path to its object-store key: the path with the
/// single leading slash removed. No other normalization happens here;
/// the slug rules above are what guarantee canonical, collision-free
/// keys.
pub fn url_to_key(url: &str) -> &str {
    url.strip_prefix('/').unwrap_or(url)
}
