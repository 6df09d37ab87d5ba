use std::{
    io,
    path::{Path, PathBuf},
};

use log::debug;

/// Where uploaded images land on disk, and the URL they are served under.
#[derive(Clone, Debug)]
pub struct ImageStore {
    dir: PathBuf,
    public_url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredImage {
    pub file_name: String,
    pub url: String,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, public_url: &str) -> ImageStore {
        ImageStore {
            dir: dir.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn create_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write `bytes` under the client's file name. A file with the same name
    /// is overwritten.
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> io::Result<StoredImage> {
        let file_name = file_name(original_name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unusable file name {original_name:?}"),
            )
        })?;

        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored {} bytes at {}", bytes.len(), path.display());

        Ok(StoredImage {
            url: self.url_for(&file_name),
            file_name,
        })
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/images/{}", self.public_url, file_name)
    }
}

/// The last path component of a client-supplied name, so `../x.png` or
/// `C:\dir\x.png` can't point outside the image directory.
fn file_name(original: &str) -> Option<String> {
    let name = original.rsplit(&['/', '\\'][..]).next()?;
    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}
