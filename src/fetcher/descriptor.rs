//! Page descriptors: the short string a worker reports for each URL

use std::fmt;
use url::Url;

/// Prefix marking a downloadable file that was not fetched
pub const FILE_PREFIX: &str = "[FILE]";

/// Prefix marking a reachable page that was not HTML
pub const SKIPPED_PREFIX: &str = "[SKIPPED]";

/// Placeholder used when a page offers nothing to describe it
pub const NO_TITLE: &str = "No Title";

/// Extensions treated as downloadable files rather than pages
pub const FILE_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip", "rar", "jpg", "jpeg", "png",
    "gif", "svg", "mp3", "mp4", "avi", "mov",
];

/// Outcome summary for one processed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// An HTML page, described by its title or a fallback
    Page(String),
    /// A downloadable file, tagged with its uppercase extension
    File(String),
    /// A non-HTML response, tagged with its content type
    Skipped(String),
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(title) => write!(f, "{}", title),
            Self::File(ext) => write!(f, "{} {}", FILE_PREFIX, ext),
            Self::Skipped(content_type) => write!(f, "{} {}", SKIPPED_PREFIX, content_type),
        }
    }
}

/// True for descriptor strings produced by [`Descriptor::File`]
pub fn is_file_descriptor(descriptor: &str) -> bool {
    descriptor.starts_with(FILE_PREFIX)
}

/// True for descriptor strings produced by [`Descriptor::Skipped`]
pub fn is_skipped_descriptor(descriptor: &str) -> bool {
    descriptor.starts_with(SKIPPED_PREFIX)
}

/// Returns the file extension if the URL's path names a downloadable file
///
/// Only the path is inspected, so `/report.pdf?download=1` is a file and
/// `/search?q=report.pdf` is not.
pub fn file_extension(url: &Url) -> Option<&'static str> {
    let path = url.path().to_lowercase();
    let last_segment = path.rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;

    FILE_EXTENSIONS.iter().copied().find(|known| *known == ext)
}
