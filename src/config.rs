//! Encoder configuration loaded from TOML.
//!
//! ```toml
//! language = "zh"            # bundled preset to start from
//! params_file = "bm25.json"  # or a parameter file written by download_params
//! b = 0.75
//! k1 = 1.2
//!
//! [tokenizer]
//! stop_words = true          # false, true, or a path
//! dict_file = "user.dict"
//! for_search = false
//! cut_all = false
//! HMM = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::{Bm25Encoder, EncoderParams, Language, TokenizerParamsUpdate};
use crate::types::{Bm25Error, Bm25Result, FileKind};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Bundled preset applied first.
    pub language: Option<Language>,
    /// Parameter file applied after the preset.
    pub params_file: Option<PathBuf>,
    pub b: Option<f64>,
    pub k1: Option<f64>,
    /// Tokenizer delta applied last.
    pub tokenizer: TokenizerParamsUpdate,
}

impl EncoderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Read a TOML config file. Relative `params_file` and tokenizer paths are
    /// resolved against the config file's directory.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Bm25Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Bm25Error::FileNotFound {
                kind: FileKind::Config,
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|e| Bm25Error::io(path, e))?;
        let mut config = Self::from_toml_str(&raw).map_err(|e| Bm25Error::Toml {
            path: path.to_path_buf(),
            source: e,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(p) = self.params_file.as_mut() {
            resolve(p);
        }
        if let Some(Some(p)) = self.tokenizer.dict_file.as_mut() {
            resolve(p);
        }
        if let Some(crate::engine::StopWordsPolicy::File(p)) = self.tokenizer.stop_words.as_mut() {
            resolve(p);
        }
    }

    /// Build an encoder: preset, then parameter file, then explicit b/k1, then
    /// the tokenizer delta.
    pub fn build(&self) -> Bm25Result<Bm25Encoder> {
        let mut encoder = match self.language {
            Some(language) => Bm25Encoder::default_for(language)?,
            None => Bm25Encoder::new(),
        };
        if let Some(path) = &self.params_file {
            encoder.apply_params(EncoderParams::load(path)?)?;
        }
        if self.b.is_some() || self.k1.is_some() {
            encoder.set_bm25(
                self.b.unwrap_or(encoder.b()),
                self.k1.unwrap_or(encoder.k1()),
            )?;
        }
        encoder.update_tokenizer(&self.tokenizer)?;
        Ok(encoder)
    }
}

impl Bm25Encoder {
    /// Build an encoder from a configuration.
    pub fn from_config(config: &EncoderConfig) -> Bm25Result<Self> {
        config.build()
    }
}
