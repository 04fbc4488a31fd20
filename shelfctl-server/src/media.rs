//! Image storage for avatars
//!
//! Uploaded bytes must decode as an image. They are written under
//! `<root>/avatars/` with the detected format's extension and referenced
//! by their relative path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use shelfctl_core::models::profile::{AVATAR_DIR, MAX_AVATAR_LEN};
use shelfctl_core::models::AvatarPath;

/// Give up after this many name collisions
const MAX_SUFFIX: u32 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload is not a supported image (png, jpeg, gif, webp)")]
    UnsupportedImage,

    #[error("invalid file name: {0:?}")]
    InvalidName(String),
}

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    /// Identify an upload by its content and check that it decodes.
    pub fn detect(bytes: &[u8]) -> Result<Self, MediaError> {
        let format = image::guess_format(bytes).map_err(|_| MediaError::UnsupportedImage)?;
        let kind = Self::from_format(format).ok_or(MediaError::UnsupportedImage)?;

        image::load_from_memory_with_format(bytes, format).map_err(|e| {
            tracing::debug!(error = %e, ?kind, "upload failed to decode");
            MediaError::UnsupportedImage
        })?;

        Ok(kind)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Where avatar uploads go
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an avatar and return its relative path (`avatars/<name>`).
    async fn save_avatar(&self, filename: &str, bytes: &[u8]) -> Result<AvatarPath, MediaError>;

    /// Whether a stored file exists at `path`.
    async fn exists(&self, path: &AvatarPath) -> Result<bool, MediaError>;
}

/// Media stored on the local filesystem
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save_avatar(&self, filename: &str, bytes: &[u8]) -> Result<AvatarPath, MediaError> {
        let kind = ImageKind::detect(bytes)?;
        let stem = sanitize_stem(filename, kind)?;
        let ext = kind.extension();

        let dir = self.root.join(AVATAR_DIR);
        fs::create_dir_all(&dir).await?;

        for n in 0..MAX_SUFFIX {
            let name = candidate(&stem, ext, n);
            let target = dir.join(&name);
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            write_or_remove(&mut file, &target, bytes).await?;

            let relative = format!("{}/{}", AVATAR_DIR, name);
            tracing::info!(path = %relative, size = bytes.len(), "avatar stored");
            return AvatarPath::new(&relative).map_err(|_| MediaError::InvalidName(relative));
        }

        Err(MediaError::InvalidName(filename.to_owned()))
    }

    async fn exists(&self, path: &AvatarPath) -> Result<bool, MediaError> {
        match fs::metadata(self.root.join(path.as_str())).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write the whole upload, removing `target` if anything fails so the
/// name is not left holding a partial file.
async fn write_or_remove<W>(file: &mut W, target: &Path, bytes: &[u8]) -> Result<(), MediaError>
where
    W: AsyncWrite + Unpin,
{
    let written: std::io::Result<()> = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(target).await {
            tracing::warn!(
                path = %target.display(),
                error = %cleanup,
                "failed to remove partial upload"
            );
        }
        return Err(e.into());
    }
    Ok(())
}

/// Sanitise an uploaded name into a file stem.
///
/// Directory parts and the client's extension are dropped, and anything
/// outside `[A-Za-z0-9._-]` becomes `_`. The stored extension always comes
/// from the decoded format.
fn sanitize_stem(filename: &str, kind: ImageKind) -> Result<String, MediaError> {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim_start_matches('.');

    let clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = match clean.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => clean.as_str(),
    }
    .trim_end_matches('.');

    if stem.is_empty() {
        return Err(MediaError::InvalidName(filename.to_owned()));
    }

    // Leave room for "avatars/", "_NNN" and ".ext"
    let budget = MAX_AVATAR_LEN
        .saturating_sub(AVATAR_DIR.len() + 1 + 4 + 1 + kind.extension().len())
        .max(1);

    Ok(stem.chars().take(budget).collect())
}

fn candidate(stem: &str, ext: &str, n: u32) -> String {
    if n == 0 {
        format!("{}.{}", stem, ext)
    } else {
        format!("{}_{}.{}", stem, n, ext)
    }
}

/// A small, fully valid PNG.
#[cfg(test)]
pub(crate) fn test_png() -> Vec<u8> {
    let img = image::RgbImage::from_fn(4, 4, |x, y| {
        image::Rgb([(x * 60) as u8, (y * 60) as u8, 128])
    });
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;

    #[test]
    fn detects_decodable_formats() {
        assert_eq!(ImageKind::detect(&test_png()).unwrap(), ImageKind::Png);

        let mut gif = Vec::new();
        image::RgbaImage::new(2, 2)
            .write_to(&mut io::Cursor::new(&mut gif), ImageFormat::Gif)
            .unwrap();
        assert_eq!(ImageKind::detect(&gif).unwrap(), ImageKind::Gif);

        assert!(ImageKind::detect(b"%PDF-1.7").is_err());
        assert!(ImageKind::detect(b"").is_err());
    }

    #[test]
    fn rejects_header_without_image_data() {
        let err = ImageKind::detect(b"\x89PNG\r\n\x1a\nthis is not an image at all");
        assert!(matches!(err, Err(MediaError::UnsupportedImage)));
    }

    #[test]
    fn sanitises_names() {
        let stem = sanitize_stem("../../etc/pass wd.PNG", ImageKind::Png).unwrap();
        assert_eq!(stem, "pass_wd");
        assert_eq!(sanitize_stem("noext", ImageKind::Gif).unwrap(), "noext");
        assert_eq!(sanitize_stem("a.tar.gz", ImageKind::Png).unwrap(), "a.tar");

        assert!(sanitize_stem("...", ImageKind::Png).is_err());
        assert!(sanitize_stem("dir/", ImageKind::Png).is_err());
    }

    #[tokio::test]
    async fn stores_under_avatars() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());
        let png = test_png();

        let path = store.save_avatar("me.png", &png).await.unwrap();
        assert_eq!(path.as_str(), "avatars/me.png");
        let written = std::fs::read(dir.path().join("avatars/me.png")).unwrap();
        assert_eq!(written, png);
        assert!(store.exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn extension_follows_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());

        let path = store.save_avatar("evil.html", &test_png()).await.unwrap();
        assert_eq!(path.as_str(), "avatars/evil.png");
        assert!(!dir.path().join("avatars/evil.html").exists());

        let path = store.save_avatar("photo.jpg", &test_png()).await.unwrap();
        assert_eq!(path.as_str(), "avatars/photo.png");
    }

    #[tokio::test]
    async fn collisions_get_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());

        store.save_avatar("me.png", &test_png()).await.unwrap();
        let second = store.save_avatar("me.png", &test_png()).await.unwrap();
        assert_eq!(second.as_str(), "avatars/me_1.png");
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());
        assert!(matches!(
            store.save_avatar("doc.png", b"not an image").await.unwrap_err(),
            MediaError::UnsupportedImage
        ));
        assert!(matches!(
            store
                .save_avatar("me.png", b"\x89PNG\r\n\x1a\nthis is not an image at all")
                .await
                .unwrap_err(),
            MediaError::UnsupportedImage
        ));
        assert!(!dir.path().join("avatars").exists());
    }

    #[tokio::test]
    async fn long_names_fit_column() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());
        let name = format!("{}.png", "x".repeat(300));
        let path = store.save_avatar(&name, &test_png()).await.unwrap();
        assert!(path.as_str().chars().count() <= MAX_AVATAR_LEN);
    }

    #[tokio::test]
    async fn missing_files_do_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());
        std::fs::create_dir_all(dir.path().join("avatars/sub")).unwrap();

        let missing = AvatarPath::new("avatars/never-uploaded.png").unwrap();
        assert!(!store.exists(&missing).await.unwrap());
        let directory = AvatarPath::new("avatars/sub").unwrap();
        assert!(!store.exists(&directory).await.unwrap());
    }

    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _: &mut Context<'_>,
            _: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::other("no space left on device")))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("partial.png");
        std::fs::write(&target, b"\x89PNG").unwrap();

        let err = write_or_remove(&mut FullDisk, &target, &test_png())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Io(_)));
        assert!(!target.exists());
    }
}
