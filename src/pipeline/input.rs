//! Document loading for the CLI: local path or URL → base64 PDF.
//!
//! The HTTP endpoint receives documents already base64-encoded by the
//! browser and forwards them untouched. The `extract` subcommand starts from
//! a file or link instead, so it reads the bytes, checks the `%PDF` magic
//! (a CSV export passed by mistake should fail here, not after a paid model
//! call) and encodes them the way the browser would.

use crate::error::ExtractError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load a statement from a local path or HTTP(S) URL and return it base64-encoded.
pub async fn load_document(input: &str, timeout_secs: u64) -> Result<String, ExtractError> {
    let bytes = if is_url(input) {
        download(input, timeout_secs).await?
    } else {
        read_local(Path::new(input)).await?
    };
    let encoded = encode_pdf(&bytes);
    debug!("Encoded statement → {} bytes base64", encoded.len());
    Ok(encoded)
}

/// Base64-encode raw PDF bytes for the upstream document block.
pub fn encode_pdf(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Reject anything whose first four bytes are not `%PDF`.
fn check_magic(path: PathBuf, bytes: &[u8]) -> Result<(), ExtractError> {
    if bytes.len() >= 4 && &bytes[..4] != PDF_MAGIC {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(ExtractError::NotAPdf { path, magic });
    }
    Ok(())
}

async fn read_local(path: &Path) -> Result<Vec<u8>, ExtractError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;
    check_magic(path.to_path_buf(), &bytes)?;
    debug!("Read local statement: {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

async fn download(url: &str, timeout_secs: u64) -> Result<Vec<u8>, ExtractError> {
    info!("Downloading statement from: {}", url);

    let failed = |reason: String| ExtractError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ExtractError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    check_magic(PathBuf::from(url), &bytes)?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/statement.pdf"));
        assert!(is_url("http://example.com/statement.pdf"));
        assert!(!is_url("/tmp/statement.pdf"));
        assert!(!is_url("statement.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn encode_is_standard_base64() {
        assert_eq!(encode_pdf(b"%PDF-1.4\n"), "JVBERi0xLjQK");
    }

    #[tokio::test]
    async fn loads_and_encodes_local_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4\n").unwrap();
        let encoded = load_document(file.path().to_str().unwrap(), 5).await.unwrap();
        assert_eq!(encoded, "JVBERi0xLjQK");
    }

    #[tokio::test]
    async fn rejects_non_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Date,Description,Amount\n").unwrap();
        let err = load_document(file.path().to_str().unwrap(), 5).await.unwrap_err();
        match err {
            ExtractError::NotAPdf { magic, .. } => assert_eq!(&magic, b"Date"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_reported() {
        let err = load_document("/definitely/not/here/statement.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }
}
