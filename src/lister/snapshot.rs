use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::context::{DiagnosticsLookup, PrivateEndpointSource};
use crate::error::{PostureError, Result};
use crate::resource::AzureResource;

use super::{Pages, ResourceLister};

const PRIVATE_ENDPOINTS_FILE: &str = "privateEndpoints.json";
const DIAGNOSTIC_SETTINGS_FILE: &str = "diagnosticSettings.json";

/// Offline provider backed by a directory of ARM list responses.
///
/// Layout:
/// - `privateEndpoints.json`: list response of `Microsoft.Network/privateEndpoints`
/// - `diagnosticSettings.json`: object mapping resource id to its settings array
/// - `<resource-group>/*.json`: list response pages, read in file name order
///
/// Missing top-level files mean "none configured". A missing resource group
/// directory is a listing error.
pub struct Snapshot {
    root: PathBuf,
    diagnostics: OnceCell<HashMap<String, bool>>,
}

/// One page of an ARM list response.
#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    value: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PrivateEndpoint {
    #[serde(default)]
    properties: Option<PrivateEndpointProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrivateEndpointProperties {
    #[serde(default)]
    private_link_service_connections: Vec<LinkServiceConnection>,
    #[serde(default)]
    manual_private_link_service_connections: Vec<LinkServiceConnection>,
}

#[derive(Debug, Deserialize)]
struct LinkServiceConnection {
    #[serde(default)]
    properties: Option<LinkServiceConnectionProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkServiceConnectionProperties {
    #[serde(default)]
    private_link_service_id: Option<String>,
}

impl Snapshot {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(PostureError::Snapshot {
                path: root.display().to_string(),
                message: "not a directory".into(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
            diagnostics: OnceCell::new(),
        })
    }

    /// Resource groups present in the snapshot, sorted by name.
    pub fn resource_groups(&self) -> Result<Vec<String>> {
        let mut groups = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| snapshot_error(&self.root, e))?;
            if entry.file_type().is_dir() {
                groups.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        groups.sort();
        Ok(groups)
    }

    fn page_files(&self, resource_group: &str) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(resource_group);
        if !dir.is_dir() {
            return Err(PostureError::Listing {
                resource_group: resource_group.to_string(),
                message: "resource group not found in snapshot".into(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| snapshot_error(&dir, e))?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "json") {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    fn diagnostics_index(&self) -> Result<&HashMap<String, bool>> {
        self.diagnostics.get_or_try_init(|| self.load_diagnostics())
    }

    fn load_diagnostics(&self) -> Result<HashMap<String, bool>> {
        let path = self.root.join(DIAGNOSTIC_SETTINGS_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no diagnostic settings in snapshot");
            return Ok(HashMap::new());
        }
        let raw: HashMap<String, Vec<serde_json::Value>> = read_json(&path)?;
        Ok(raw
            .into_iter()
            .map(|(id, settings)| (id.to_lowercase(), !settings.is_empty()))
            .collect())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| snapshot_error(path, e))
}

fn snapshot_error(path: &Path, error: impl std::fmt::Display) -> PostureError {
    PostureError::Snapshot {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// Keep items of type `R` from a page and deserialize them.
fn parse_page<R: AzureResource>(path: &Path) -> Result<Vec<R>> {
    let page: ListPage = read_json(path)?;
    page.value
        .into_iter()
        .filter(|item| {
            item.get("type")
                .and_then(|t| t.as_str())
                .is_some_and(|t| t.eq_ignore_ascii_case(R::ARM_TYPE))
        })
        .map(|item| serde_json::from_value(item).map_err(|e| snapshot_error(path, e)))
        .collect()
}

impl<R: AzureResource> ResourceLister<R> for Snapshot {
    fn list_by_resource_group<'a>(&'a self, resource_group: &str) -> Pages<'a, R> {
        match self.page_files(resource_group) {
            Ok(files) => Box::new(files.into_iter().map(|path| parse_page::<R>(&path))),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

impl PrivateEndpointSource for Snapshot {
    fn private_endpoint_targets(&self) -> Result<Vec<String>> {
        let path = self.root.join(PRIVATE_ENDPOINTS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let page: ListPage = read_json(&path)
            .map_err(|e| PostureError::PrivateEndpoints(e.to_string()))?;

        let mut targets = Vec::new();
        for item in page.value {
            let endpoint: PrivateEndpoint = serde_json::from_value(item)
                .map_err(|e| PostureError::PrivateEndpoints(e.to_string()))?;
            let Some(props) = endpoint.properties else {
                continue;
            };
            targets.extend(
                props
                    .private_link_service_connections
                    .into_iter()
                    .chain(props.manual_private_link_service_connections)
                    .filter_map(|c| c.properties.and_then(|p| p.private_link_service_id)),
            );
        }
        Ok(targets)
    }
}

impl DiagnosticsLookup for Snapshot {
    fn has_diagnostics(&self, resource_id: &str) -> Result<bool> {
        let index = self
            .diagnostics_index()
            .map_err(|e| PostureError::Diagnostics {
                resource_id: resource_id.to_string(),
                message: e.to_string(),
            })?;
        Ok(index
            .get(&resource_id.to_lowercase())
            .copied()
            .unwrap_or(false))
    }
}
