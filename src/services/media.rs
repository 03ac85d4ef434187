//! 上传图片（base64 data URL）落盘与 URL 拼接
//!
//! 文件由反向代理直接提供，这里只负责写入和删除。

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use crate::config::SiteConfig;
use crate::errors::{FoodgramError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    RecipeImage,
    Avatar,
}

impl MediaKind {
    fn dir(&self) -> &'static str {
        match self {
            MediaKind::RecipeImage => "recipes/images",
            MediaKind::Avatar => "users/avatars",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    /// 例如 `http://localhost:8000/media/`
    public_prefix: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        let mut public_prefix = public_prefix.into();
        if !public_prefix.ends_with('/') {
            public_prefix.push('/');
        }
        Self {
            root: root.into(),
            public_prefix,
        }
    }

    pub fn from_config(site: &SiteConfig) -> Self {
        let base = site.base_url.trim_end_matches('/');
        let media_url = if site.media_url.starts_with('/') {
            site.media_url.clone()
        } else {
            format!("/{}", site.media_url)
        };
        Self::new(&site.media_root, format!("{}{}", base, media_url))
    }

    /// 相对路径 → 公开 URL
    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.public_prefix, relative.trim_start_matches('/'))
    }

    /// 解码并写入图片，返回相对 media 根目录的路径
    pub async fn save_base64(&self, kind: MediaKind, data_url: &str) -> Result<String> {
        let (ext, bytes) = decode_data_url(data_url)?;
        let relative = format!("{}/{}.{}", kind.dir(), uuid::Uuid::new_v4().simple(), ext);
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored media file {}", relative);
        Ok(relative)
    }

    /// 删除文件；失败只记录日志，不影响业务结果
    pub async fn remove(&self, relative: &str) {
        if relative.is_empty() || relative.contains("..") {
            return;
        }
        let path = self.root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to remove media file {}: {}", path.display(), e);
        }
    }
}

/// `data:image/<type>;base64,<payload>` → (扩展名, 字节)
pub fn decode_data_url(data_url: &str) -> Result<(&'static str, Vec<u8>)> {
    let rest = data_url
        .trim()
        .strip_prefix("data:image/")
        .ok_or_else(|| FoodgramError::validation("Image must be a base64 data URL (data:image/...)."))?;
    let (format, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| FoodgramError::validation("Image must be base64-encoded."))?;

    let ext = match format.to_ascii_lowercase().as_str() {
        "png" => "png",
        "jpeg" | "jpg" => "jpg",
        "gif" => "gif",
        "webp" => "webp",
        other => {
            return Err(FoodgramError::validation(format!(
                "Unsupported image type: {}",
                other
            )));
        }
    };

    let bytes = STANDARD.decode(payload.trim())?;
    if bytes.is_empty() {
        return Err(FoodgramError::validation("Image is empty."));
    }
    if !has_signature(ext, &bytes) {
        return Err(FoodgramError::validation(format!(
            "Upload a valid image. The file is not a {} image.",
            ext
        )));
    }
    Ok((ext, bytes))
}

/// 文件头是否与声明的格式一致
fn has_signature(ext: &str, bytes: &[u8]) -> bool {
    match ext {
        "png" => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "jpg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "gif" => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
        "webp" => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_data_url() {
        let (ext, bytes) = decode_data_url(PIXEL).unwrap();
        assert_eq!(ext, "png");
        assert_eq!(&bytes[1..4], b"PNG");

        let (ext, _) = decode_data_url("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_data_url("hello").is_err());
        assert!(decode_data_url("data:image/png,abc").is_err());
        assert!(decode_data_url("data:image/tiff;base64,AAAA").is_err());
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
        assert!(decode_data_url("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_decode_checks_file_signature() {
        // "hello world" 冒充 png
        let err = decode_data_url("data:image/png;base64,aGVsbG8gd29ybGQ=").unwrap_err();
        assert!(matches!(err, FoodgramError::Validation(_)));

        // png 字节声明为 gif
        let gif = PIXEL.replace("image/png", "image/gif");
        assert!(decode_data_url(&gif).is_err());

        // GIF89a
        let (ext, _) = decode_data_url("data:image/gif;base64,R0lGODlhAQABAAAAACw=").unwrap();
        assert_eq!(ext, "gif");

        // RIFF....WEBP
        let (ext, _) = decode_data_url("data:image/webp;base64,UklGRhoAAABXRUJQVlA4").unwrap();
        assert_eq!(ext, "webp");
    }

    #[test]
    fn test_url_joins_prefix() {
        let store = MediaStore::new("/tmp/m", "http://example.com/media");
        assert_eq!(
            store.url("recipes/images/a.png"),
            "http://example.com/media/recipes/images/a.png"
        );
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), "http://t/media/");

        let rel = store.save_base64(MediaKind::Avatar, PIXEL).await.unwrap();
        assert!(rel.starts_with("users/avatars/"));
        assert!(rel.ends_with(".png"));
        assert!(dir.path().join(&rel).exists());

        store.remove(&rel).await;
        assert!(!dir.path().join(&rel).exists());
    }
}
