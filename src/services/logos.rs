//! Brand logo library served from a static directory.

use std::io;
use std::path::PathBuf;

const LOGO_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "svg", "webp"];

#[derive(Clone, Debug)]
pub struct LogoLibrary {
    dir: PathBuf,
    url_prefix: String,
}

impl LogoLibrary {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self { dir: dir.into(), url_prefix: url_prefix.into().trim_end_matches('/').to_string() }
    }

    /// Public paths of every image in the directory, sorted by file name.
    /// A missing directory is an empty library.
    pub async fn list(&self) -> io::Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str().filter(|n| is_logo(n)) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names.into_iter().map(|name| format!("{}/{}", self.url_prefix, name)).collect())
    }
}

fn is_logo(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| LOGO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}
