use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::errors::Result;

/// One file of a gist, as GitHub describes it.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GistFile {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub raw_url: Option<String>,
}

impl GistFile {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        GistFile {
            filename: filename.into(),
            content: Some(content.into()),
            ..GistFile::default()
        }
    }

    /// The file's text, with absent content read as empty.
    pub fn text(&self) -> &str {
        self.content.as_ref().map(String::as_str).unwrap_or("")
    }
}

/// Gist files keyed by name. Iteration order is lexicographic.
pub type GistFiles = BTreeMap<String, GistFile>;

/// The outcome of asking for a gist: the upstream status and, on a 200, its
/// files.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GistFetch {
    pub status: u16,
    pub files: GistFiles,
}

impl GistFetch {
    pub fn found(files: GistFiles) -> Self {
        GistFetch { status: 200, files }
    }

    pub fn status(status: u16) -> Self {
        GistFetch {
            status,
            files: GistFiles::new(),
        }
    }
}

#[async_trait]
pub trait GistSource: Send + Sync {
    /// Fetches a gist. Upstream statuses are reported in the result; only
    /// transport and decoding failures are errors.
    async fn fetch_gist(&self, id: &str) -> Result<GistFetch>;
}

/// Builds a file mapping from `(name, content)` pairs.
pub fn files_from<'a, I>(pairs: I) -> GistFiles
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(name, content)| (name.to_string(), GistFile::new(name, content)))
        .collect()
}
