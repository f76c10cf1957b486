pub const DEFAULT_ADMIN_URL: &str = "https://api.neelayurvedics.in/admin/";
pub const DEFAULT_STORAGE_URL: &str = "https://api.neelayurvedics.in";

pub const ADMIN_URL_VAR: &str = "SFA_ADMIN_URL";
pub const STORAGE_URL_VAR: &str = "SFA_STORAGE_URL";

const STORAGE_SEGMENT: &str = "storage/";
const THEMES_SEGMENT: &str = "themes/";

#[derive(Debug, Clone)]
pub struct AssetBase {
    pub admin_url: String,
    pub storage_url: String,
}

impl AssetBase {
    pub fn from_env() -> Self {
        AssetBase {
            admin_url: std::env::var(ADMIN_URL_VAR)
                .unwrap_or_else(|_| DEFAULT_ADMIN_URL.into()),
            storage_url: std::env::var(STORAGE_URL_VAR)
                .unwrap_or_else(|_| DEFAULT_STORAGE_URL.into()),
        }
    }
}

impl std::default::Default for AssetBase {
    fn default() -> Self {
        AssetBase::from_env()
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// bare relative paths get exactly one `storage/` segment; absolute urls
/// pass through unchanged, which also makes resolution idempotent
pub fn storage_image_url(base: &AssetBase, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    if is_absolute(path) {
        return path.into();
    }

    let clean = path.trim_start_matches('/');
    let base = base.storage_url.trim_end_matches('/');

    if clean.starts_with(STORAGE_SEGMENT) {
        format!("{}/{}", base, clean)
    } else {
        format!("{}/{}{}", base, STORAGE_SEGMENT, clean)
    }
}

pub fn theme_image_url(base: &AssetBase, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    if is_absolute(name) {
        return name.into();
    }

    let base = base.admin_url.trim_end_matches('/');

    format!("{}/images/themes/{}", base, name.trim_start_matches('/'))
}

pub fn image_url(base: &AssetBase, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    if is_absolute(path) {
        return path.into();
    }

    if let Some(name) = path.strip_prefix(THEMES_SEGMENT) {
        theme_image_url(base, name)
    } else {
        storage_image_url(base, path)
    }
}
