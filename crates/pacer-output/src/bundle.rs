//! Script bundle consumed by the dashboard front-end.

use std::path::Path;

use anyhow::{Context, Result};
use pacer_model::{Bundle, BundleIndexEntry, PatientGroup, header_fields};
use tracing::{debug, info, warn};

/// Global the dashboard reads its data from.
pub const BUNDLE_VARIABLE: &str = "window.PACEMAKER_DATA";

const UNKNOWN: &str = "Unknown";

fn index_entry(file_name: &str, group: &PatientGroup) -> BundleIndexEntry {
    let latest = group.latest();
    let field = |label: &str| latest.and_then(|record| record.header_field(label));
    BundleIndexEntry {
        id: group.registration_id.clone(),
        name: group.name.clone(),
        count: group.visit_count,
        brand: field(header_fields::BRAND).unwrap_or(UNKNOWN).to_string(),
        model: field(header_fields::MODEL).unwrap_or(UNKNOWN).to_string(),
        implant_date: field(header_fields::IMPLANT_DATE)
            .unwrap_or_default()
            .to_string(),
        file_name: file_name.to_string(),
    }
}

/// Collect every patient document in `dir`.
///
/// JSON files that are not patient documents are skipped.
pub fn build_bundle(dir: &Path) -> Result<Bundle> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read patient directory {}", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("read patient directory {}", dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut bundle = Bundle::default();
    for path in paths {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let contents =
            std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let group: PatientGroup = match serde_json::from_str(&contents) {
            Ok(group) => group,
            Err(error) => {
                warn!(file = file_name, %error, "skipping non-patient JSON");
                continue;
            }
        };
        bundle.index.push(index_entry(file_name, &group));
        bundle.records.insert(file_name.to_string(), group);
    }
    bundle.index.sort_by(|a, b| a.id.cmp(&b.id));
    debug!(patients = bundle.index.len(), "bundle assembled");
    Ok(bundle)
}

/// Bundle as a single assignment statement.
pub fn render_bundle(bundle: &Bundle) -> Result<String> {
    let json = serde_json::to_string(bundle).context("serialize bundle")?;
    Ok(format!("{BUNDLE_VARIABLE} = {json};"))
}

pub fn write_bundle(path: &Path, bundle: &Bundle) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create bundle directory {}", parent.display()))?;
    }
    let script = render_bundle(bundle)?;
    std::fs::write(path, script).with_context(|| format!("write bundle {}", path.display()))?;
    info!(patients = bundle.index.len(), path = %path.display(), "bundle written");
    Ok(())
}
