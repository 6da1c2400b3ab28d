//! Writing a synthesized site to disk.
//!
//! Layout of an output directory:
//! ```text
//! <dir>/
//! ├── index.html
//! ├── dsl.json
//! └── manifest.json
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use sitegen_render::RenderedPage;
use sitegen_shared::{CURRENT_SCHEMA_VERSION, Result, SiteGenError, WebsiteDsl};

/// Checksum entry for one written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Where a site came from.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    pub tool_version: String,
    /// Classifier strategy name, absent when rendering a stored DSL.
    pub classifier: Option<String>,
    /// `"text"`, `"html"` or `"dsl"`.
    pub input: String,
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteManifest {
    pub schema_version: u32,
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub tool_version: String,
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub site_type: String,
    pub style: String,
    pub confidence: f64,
    pub sections: Vec<String>,
    #[serde(default)]
    pub dropped: Vec<String>,
    pub files: Vec<FileMeta>,
}

/// Write `content` to `path` through a temp file and a rename.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SiteGenError::validation(format!("not a file path: {}", path.display())))?;
    let temp = path.with_file_name(format!(".{filename}.tmp"));

    std::fs::write(&temp, content).map_err(|e| SiteGenError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| SiteGenError::io(path, e))?;
    Ok(())
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Write `index.html`, `dsl.json` and `manifest.json` into `dir`.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_site(
    dir: &Path,
    dsl: &WebsiteDsl,
    page: &RenderedPage,
    provenance: &Provenance,
) -> Result<SiteManifest> {
    std::fs::create_dir_all(dir).map_err(|e| SiteGenError::io(dir, e))?;

    let dsl_json = dsl.to_json_pretty()?;
    let mut files = Vec::with_capacity(2);
    for (filename, content) in [("index.html", page.html.as_str()), ("dsl.json", dsl_json.as_str())] {
        write_atomic(&dir.join(filename), content)?;
        debug!(file = filename, size = content.len(), "wrote file");
        files.push(FileMeta {
            filename: filename.to_string(),
            sha256: sha256_hex(content),
            size_bytes: content.len(),
        });
    }

    let manifest = SiteManifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        id: Uuid::now_v7(),
        created_at: Utc::now(),
        tool_version: provenance.tool_version.clone(),
        input: provenance.input.clone(),
        classifier: provenance.classifier.clone(),
        site_type: dsl.site_type.clone(),
        style: dsl.style.clone(),
        confidence: dsl.confidence,
        sections: page.rendered.iter().map(ToString::to_string).collect(),
        dropped: page.dropped.iter().map(ToString::to_string).collect(),
        files,
    };

    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    write_atomic(&dir.join("manifest.json"), &manifest_json)?;

    info!(id = %manifest.id, site_type = %manifest.site_type, "site written");
    Ok(manifest)
}

/// Read back the DSL from an output directory or a `dsl.json` path.
pub fn read_dsl(path: &Path) -> Result<WebsiteDsl> {
    let file: PathBuf = if path.is_dir() {
        path.join("dsl.json")
    } else {
        path.to_path_buf()
    };
    let content = std::fs::read_to_string(&file).map_err(|e| SiteGenError::io(&file, e))?;
    WebsiteDsl::from_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitegen_render::PageRenderer;
    use sitegen_shared::{ClassificationResult, SectionKind};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sitegen-output-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample() -> (WebsiteDsl, RenderedPage) {
        let dsl = WebsiteDsl::new(
            &ClassificationResult::new("blog", "minimal_clean", 0.6),
            [
                (SectionKind::Navbar, "solid".to_string()),
                (SectionKind::parse("carousel"), "default".to_string()),
                (SectionKind::Footer, "minimal".to_string()),
            ],
        );
        let page = PageRenderer::default().render(&dsl, "Notes from the field");
        (dsl, page)
    }

    #[test]
    fn writes_all_files_with_checksums() {
        let tmp = temp_dir();
        let (dsl, page) = sample();
        let provenance = Provenance {
            tool_version: "0.1.0-test".into(),
            classifier: Some("frequency".into()),
            input: "text".into(),
        };

        let manifest = write_site(&tmp, &dsl, &page, &provenance).unwrap();

        assert!(tmp.join("index.html").exists());
        assert!(tmp.join("dsl.json").exists());
        assert!(tmp.join("manifest.json").exists());
        assert!(!tmp.join(".index.html.tmp").exists());

        let html = std::fs::read_to_string(tmp.join("index.html")).unwrap();
        assert_eq!(manifest.files[0].sha256, sha256_hex(&html));
        assert_eq!(manifest.sections, vec!["navbar", "footer"]);
        assert_eq!(manifest.dropped, vec!["carousel"]);

        let on_disk: SiteManifest =
            serde_json::from_str(&std::fs::read_to_string(tmp.join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(on_disk, manifest);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn dsl_reads_back_from_dir_or_file() {
        let tmp = temp_dir();
        let (dsl, page) = sample();
        write_site(&tmp, &dsl, &page, &Provenance::default()).unwrap();

        assert_eq!(read_dsl(&tmp).unwrap(), dsl);
        assert_eq!(read_dsl(&tmp.join("dsl.json")).unwrap(), dsl);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rewrite_replaces_files() {
        let tmp = temp_dir();
        let path = tmp.join("a.txt");
        write_atomic(&path, "one").unwrap();
        write_atomic(&path, "two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn sha256_is_hex() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
