//! Filesystem-based descriptor loader.
//!
//! Discovers `*.toml` and `*.json` descriptor files under a directory tree
//! and decodes them into [`TemplateDescriptor`]s.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── base.toml
//! ├── apple/
//! │   ├── swift.json
//! │   └── app.toml
//! └── bundle.toml          ← several descriptors in one file
//! ```
//!
//! # File format
//!
//! Keys are PascalCase, matching the descriptor fields:
//!
//! ```toml
//! Identifier = "com.acme.app"
//! Ancestors  = ["com.acme.base"]
//! Concrete   = true
//! Nodes      = ["___PACKAGENAMEASIDENTIFIER___/main.swift"]
//!
//! [[Options]]
//! Identifier = "productName"
//! Type       = "text"
//! Required   = true
//!
//! [SharedSettings]
//! PRODUCT_NAME = "___VARIABLE_productName___"
//! ```
//!
//! A file may also hold several descriptors under a `Templates` array
//! (`[[Templates]]` in TOML). JSON files may be a bare array.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use forma_core::{
    application::{ApplicationError, ports::DescriptorStore},
    domain::{DescriptorRegistry, TemplateDescriptor},
    error::FormaResult,
};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// Key holding a list of descriptors in a multi-descriptor file.
pub const TEMPLATES_KEY: &str = "Templates";

// ── Formats ───────────────────────────────────────────────────────────────────

/// Supported descriptor encodings, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Toml,
    Json,
}

impl DescriptorFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// Why a single descriptor file could not be decoded.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{TEMPLATES_KEY}' must be an array of descriptors")]
    TemplatesNotArray,

    #[error("file declares no descriptors")]
    Empty,
}

/// Decode descriptor text in the given format.
pub fn parse_str(format: DescriptorFormat, text: &str) -> Result<Vec<TemplateDescriptor>, ParseError> {
    let descriptors = match format {
        DescriptorFormat::Toml => parse_toml(text)?,
        DescriptorFormat::Json => parse_json(text)?,
    };
    if descriptors.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(descriptors)
}

fn parse_toml(text: &str) -> Result<Vec<TemplateDescriptor>, ParseError> {
    let mut table: toml::Table = toml::from_str(text)?;
    match table.remove(TEMPLATES_KEY) {
        Some(toml::Value::Array(items)) => items
            .into_iter()
            .map(|item| item.try_into().map_err(ParseError::from))
            .collect(),
        Some(_) => Err(ParseError::TemplatesNotArray),
        None => Ok(vec![toml::Value::Table(table).try_into()?]),
    }
}

fn parse_json(text: &str) -> Result<Vec<TemplateDescriptor>, ParseError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Object(mut object) => match object.remove(TEMPLATES_KEY) {
            Some(list @ serde_json::Value::Array(_)) => Ok(serde_json::from_value(list)?),
            Some(_) => Err(ParseError::TemplatesNotArray),
            None => Ok(vec![serde_json::from_value(serde_json::Value::Object(object))?]),
        },
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

/// Read and decode one descriptor file.
pub fn parse_file(path: &Path) -> Result<Vec<TemplateDescriptor>, ApplicationError> {
    let load_error = |reason: String| ApplicationError::DescriptorLoad {
        path: path.to_path_buf(),
        reason,
    };

    let format = DescriptorFormat::from_path(path)
        .ok_or_else(|| load_error("unsupported file extension (expected .toml or .json)".into()))?;
    let text = fs::read_to_string(path)
        .map_err(ParseError::from)
        .map_err(|e| load_error(e.to_string()))?;
    parse_str(format, &text).map_err(|e| load_error(e.to_string()))
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`TemplateDescriptor`]s from a directory tree.
///
/// Files are visited in file-name order, so the first file declaring an
/// identifier wins. In lenient mode (the default) unreadable files and
/// duplicate identifiers emit a `WARN` log and are skipped; in strict mode
/// the first problem is returned as an error.
///
/// # Example
///
/// ```no_run
/// use forma_adapters::FilesystemDescriptorLoader;
///
/// let loader = FilesystemDescriptorLoader::new("./templates");
/// let descriptors = loader.load_all()?;
/// println!("Loaded {} descriptors", descriptors.len());
/// # Ok::<(), forma_core::error::FormaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FilesystemDescriptorLoader {
    root: PathBuf,
    strict: bool,
}

impl FilesystemDescriptorLoader {
    /// Create a loader pointed at `root`.
    ///
    /// `root` may also be a single descriptor file. It does not need to
    /// exist yet; [`load_all`](Self::load_all) reports it if missing.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            strict: false,
        }
    }

    /// Fail on the first bad file or duplicate identifier.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every descriptor found under the root.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::DescriptorLoad`] if the root does not
    /// exist. In strict mode, also for any unreadable file, and
    /// [`ApplicationError::DuplicateIdentifier`] for a repeated identifier.
    #[instrument(skip(self), fields(root = %self.root.display(), strict = self.strict))]
    pub fn load_all(&self) -> FormaResult<Vec<TemplateDescriptor>> {
        if !self.root.exists() {
            return Err(ApplicationError::DescriptorLoad {
                path: self.root.clone(),
                reason: "templates directory not found".into(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        let mut descriptors = Vec::new();

        for path in self.descriptor_files()? {
            let loaded = match parse_file(&path) {
                Ok(loaded) => loaded,
                Err(e) if self.strict => return Err(e.into()),
                Err(e) => {
                    warn!(
                        file  = %path.display(),
                        error = %e,
                        "skipping descriptor file due to load error"
                    );
                    continue;
                }
            };

            for descriptor in loaded {
                if !seen.insert(descriptor.identifier.clone()) {
                    if self.strict {
                        return Err(ApplicationError::DuplicateIdentifier {
                            identifier: descriptor.identifier,
                            path,
                        }
                        .into());
                    }
                    warn!(
                        identifier = %descriptor.identifier,
                        file       = %path.display(),
                        "skipping duplicate descriptor identifier"
                    );
                    continue;
                }
                debug!(identifier = %descriptor.identifier, file = %path.display(), "loaded descriptor");
                descriptors.push(descriptor);
            }
        }

        debug!(count = descriptors.len(), "finished loading descriptors");
        Ok(descriptors)
    }

    /// Load into a fresh [`DescriptorRegistry`].
    pub fn load_registry(&self) -> FormaResult<DescriptorRegistry> {
        Ok(self.load_all()?.into_iter().collect())
    }

    /// Load into `store`, returning how many descriptors were inserted.
    pub fn load_into(&self, store: &dyn DescriptorStore) -> FormaResult<usize> {
        let descriptors = self.load_all()?;
        let count = descriptors.len();
        for descriptor in descriptors {
            store.insert(descriptor)?;
        }
        Ok(count)
    }

    /// Descriptor files under the root, sorted by path.
    fn descriptor_files(&self) -> FormaResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if self.strict => {
                    return Err(ApplicationError::DescriptorLoad {
                        path: e.path().map_or_else(|| self.root.clone(), Path::to_path_buf),
                        reason: e.to_string(),
                    }
                    .into());
                }
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && DescriptorFormat::from_path(entry.path()).is_some() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
