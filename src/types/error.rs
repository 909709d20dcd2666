//! Error types for tokenization, fitting, encoding and parameter persistence.

use std::path::PathBuf;

/// Which kind of user-supplied file a configuration error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Dictionary,
    StopWords,
    Params,
    Config,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileKind::Dictionary => "dictionary",
            FileKind::StopWords => "stop-word",
            FileKind::Params => "parameter",
            FileKind::Config => "config",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Bm25Error {
    #[error("{} file not found: {}", .kind, .path.display())]
    FileNotFound { kind: FileKind, path: PathBuf },

    #[error("Invalid dictionary {} at line {}: {}", .path.display(), .line, .reason)]
    InvalidDictionary {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Unsupported hash function '{0}', expected \"mmh3\"")]
    UnsupportedHashFunction(String),

    #[error("Unsupported language '{0}', expected \"zh\" or \"en\"")]
    UnsupportedLanguage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoder is not fit: fit a corpus or load parameters before encoding")]
    NotFitted,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed parameter file {}: {}", .path.display(), .source)]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed config file {}: {}", .path.display(), .source)]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Bm25Error {
    /// True for errors caused by a bad configuration value (paths, hash
    /// function, language tag, conflicting flags).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Bm25Error::FileNotFound { .. }
                | Bm25Error::InvalidDictionary { .. }
                | Bm25Error::UnsupportedHashFunction(_)
                | Bm25Error::UnsupportedLanguage(_)
                | Bm25Error::InvalidConfig(_)
        )
    }

    /// True for I/O or deserialization failures on a parameter or config file.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Bm25Error::Io { .. } | Bm25Error::Json { .. } | Bm25Error::Toml { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Bm25Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Bm25Result<T> = Result<T, Bm25Error>;
