//! Input resolution: turn user-supplied paths, directories and URLs into
//! named byte buffers.
//!
//! Directories are expanded one level deep and filtered through the
//! extension table in [`crate::formats`]; explicitly named files must also
//! carry a known image extension. Reading or downloading happens per image,
//! and a failure there is reported for that image only.

use crate::error::{ItemError, NormalizeError};
use crate::formats::SourceFormat;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Local(PathBuf),
    Url(String),
}

impl InputSource {
    /// Name shown to the user and used to derive the output filename.
    pub fn display_name(&self) -> String {
        match self {
            InputSource::Local(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            InputSource::Url(u) => filename_from_url(u),
        }
    }
}

/// An image's raw bytes with its display name.
#[derive(Debug, Clone)]
pub struct InputImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Result of expanding the command-line inputs.
#[derive(Debug, Default)]
pub struct ExpandedInputs {
    pub sources: Vec<InputSource>,
    /// Files left out because their extension is not an image format.
    pub skipped: Vec<PathBuf>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Expand URLs, files and directories into a flat, ordered source list.
///
/// Directory entries are sorted by name so repeated runs see the same order.
/// Paths that do not exist are kept; they fail individually when read.
pub fn expand_inputs(inputs: &[String]) -> Result<ExpandedInputs, NormalizeError> {
    let mut out = ExpandedInputs::default();

    for input in inputs {
        if is_url(input) {
            out.sources.push(InputSource::Url(input.clone()));
            continue;
        }

        let path = PathBuf::from(input);
        if path.is_dir() {
            let mut files = list_dir(&path)?;
            files.sort();
            for file in files {
                accept_file(file, &mut out);
            }
        } else if path.exists() {
            accept_file(path, &mut out);
        } else {
            out.sources.push(InputSource::Local(path));
        }
    }

    debug!(
        "Expanded {} inputs → {} images, {} skipped",
        inputs.len(),
        out.sources.len(),
        out.skipped.len()
    );
    Ok(out)
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, NormalizeError> {
    let unreadable = |source| NormalizeError::InputDirUnreadable {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

fn accept_file(path: PathBuf, out: &mut ExpandedInputs) {
    let known = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(SourceFormat::from_filename)
        .is_some();
    if known {
        out.sources.push(InputSource::Local(path));
    } else {
        warn!("Skipping {}: not a recognised image extension", path.display());
        out.skipped.push(path);
    }
}

/// Read or download one source.
pub async fn load_input(source: &InputSource, timeout_secs: u64) -> Result<InputImage, ItemError> {
    match source {
        InputSource::Local(path) => read_local(path).await,
        InputSource::Url(url) => download_url(url, timeout_secs).await,
    }
}

async fn read_local(path: &Path) -> Result<InputImage, ItemError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        let detail = match e.kind() {
            std::io::ErrorKind::NotFound => format!("file not found: {}", path.display()),
            std::io::ErrorKind::PermissionDenied => {
                format!("permission denied: {}", path.display())
            }
            _ => format!("{}: {e}", path.display()),
        };
        ItemError::Read { detail }
    })?;

    debug!("Read {} ({} bytes)", path.display(), bytes.len());
    Ok(InputImage::new(
        InputSource::Local(path.to_path_buf()).display_name(),
        bytes,
    ))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<InputImage, ItemError> {
    info!("Downloading image from: {}", url);
    let failed = |detail: String| ItemError::Download { detail };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            failed(format!("timed out after {timeout_secs}s: {url}"))
        } else {
            failed(format!("{url}: {e}"))
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("{url}: HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| failed(format!("{url}: {e}")))?;

    info!("Downloaded {} bytes from {}", bytes.len(), url);
    Ok(InputImage::new(filename_from_url(url), bytes.to_vec()))
}

/// Last non-empty path segment of the URL, or `download`.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty())
        .unwrap_or_else(|| "download".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/cat.png"));
        assert!(is_url("http://example.com/cat.png"));
        assert!(!is_url("/tmp/cat.png"));
        assert!(!is_url("cat.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn url_display_names() {
        assert_eq!(filename_from_url("https://x.test/a/b/cat.webp?s=1"), "cat.webp");
        assert_eq!(filename_from_url("https://x.test/"), "download");
        assert_eq!(filename_from_url("not a url"), "download");
    }

    #[test]
    fn directories_are_filtered_and_sorted() {
        let dir = TempDir::new().expect("tempdir");
        for name in ["b.PNG", "a.jpg", "notes.txt", "c.heic"] {
            std::fs::write(dir.path().join(name), b"x").expect("write");
        }
        std::fs::create_dir(dir.path().join("nested.png")).expect("mkdir");

        let expanded =
            expand_inputs(&[dir.path().to_string_lossy().into_owned()]).expect("expand");
        let names: Vec<String> = expanded.sources.iter().map(InputSource::display_name).collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.heic"]);
        assert_eq!(expanded.skipped.len(), 1);
    }

    #[test]
    fn missing_files_are_kept_for_per_item_failure() {
        let expanded = expand_inputs(&["/no/such/file.png".to_string()]).expect("expand");
        assert_eq!(
            expanded.sources,
            vec![InputSource::Local(PathBuf::from("/no/such/file.png"))]
        );
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let err = load_input(&InputSource::Local(PathBuf::from("/no/such/file.png")), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::Read { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn local_file_loads_with_its_name() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("pic.gif");
        std::fs::write(&path, b"GIF89a").expect("write");
        let img = load_input(&InputSource::Local(path), 5).await.expect("load");
        assert_eq!(img.name, "pic.gif");
        assert_eq!(img.bytes, b"GIF89a");
    }
}
