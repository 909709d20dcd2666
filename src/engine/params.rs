//! Parameter snapshots: the on-disk JSON format and the bundled language presets.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::tokenizer::TokenizerParams;
use crate::index::CorpusStats;
use crate::types::{Bm25Error, Bm25Result, FileKind, DEFAULT_B, DEFAULT_K1};

const PRESET_ZH: &str = include_str!("../../resources/bm25_zh.json");
const PRESET_EN: &str = include_str!("../../resources/bm25_en.json");

/// Everything needed to rebuild an encoder that produces identical weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderParams {
    #[serde(default = "default_b")]
    pub b: f64,
    #[serde(default = "default_k1")]
    pub k1: f64,
    #[serde(default)]
    pub tokenizer_params: TokenizerParams,
    #[serde(default)]
    pub bm25_learned_params: CorpusStats,
}

fn default_b() -> f64 {
    DEFAULT_B
}

fn default_k1() -> f64 {
    DEFAULT_K1
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self {
            b: DEFAULT_B,
            k1: DEFAULT_K1,
            tokenizer_params: TokenizerParams::default(),
            bm25_learned_params: CorpusStats::new(),
        }
    }
}

impl EncoderParams {
    /// Read a parameter file.
    pub fn load(path: impl AsRef<Path>) -> Bm25Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Bm25Error::FileNotFound {
                kind: FileKind::Params,
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|e| Bm25Error::io(path, e))?;
        let params: EncoderParams =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| Bm25Error::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
        params.validate()?;
        Ok(params)
    }

    /// Write a parameter file, replacing any existing one.
    pub fn save(&self, path: impl AsRef<Path>) -> Bm25Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Bm25Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| Bm25Error::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        writer.flush().map_err(|e| Bm25Error::io(path, e))
    }

    /// Parameters bundled for a language.
    pub fn preset(language: Language) -> Bm25Result<Self> {
        let (name, raw) = match language {
            Language::Zh => ("bm25_zh.json", PRESET_ZH),
            Language::En => ("bm25_en.json", PRESET_EN),
        };
        let params: EncoderParams = serde_json::from_str(raw).map_err(|e| Bm25Error::Json {
            path: name.into(),
            source: e,
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Check b, k1 and the corpus statistics.
    pub fn validate(&self) -> Bm25Result<()> {
        validate_bm25(self.b, self.k1)?;
        self.bm25_learned_params.validate()
    }
}

pub(crate) fn validate_bm25(b: f64, k1: f64) -> Bm25Result<()> {
    if !(0.0..=1.0).contains(&b) {
        return Err(Bm25Error::InvalidConfig(format!(
            "b must be within [0, 1], got {}",
            b
        )));
    }
    if !k1.is_finite() || k1 <= 0.0 {
        return Err(Bm25Error::InvalidConfig(format!(
            "k1 must be a positive number, got {}",
            k1
        )));
    }
    Ok(())
}

/// Languages with bundled pre-fit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = Bm25Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" => Ok(Language::Zh),
            "en" => Ok(Language::En),
            _ => Err(Bm25Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::hasher::{Murmur3Hasher, TermHasher};

    #[test]
    fn test_presets_parse_and_are_fitted() {
        for lang in [Language::Zh, Language::En] {
            let params = EncoderParams::preset(lang).unwrap();
            assert_eq!(params.b, 0.75);
            assert_eq!(params.k1, 1.2);
            assert!(params.bm25_learned_params.is_fitted(), "{lang} preset");
            assert_eq!(params.tokenizer_params.hash_function, "mmh3");
        }
    }

    #[test]
    fn test_presets_cover_general_vocabulary() {
        let hasher = Murmur3Hasher;
        for (lang, words) in [
            (Language::Zh, ["数据库", "检索", "天气"]),
            (Language::En, ["search", "file", "sparse"]),
        ] {
            let stats = EncoderParams::preset(lang).unwrap().bm25_learned_params;
            assert!(stats.doc_count() >= 50_000, "{lang} preset");
            assert!(stats.term_count() >= 20_000, "{lang} preset");
            for word in words {
                let df = stats.doc_frequency(hasher.hash(word));
                assert!(df > 0.0 && df < stats.doc_count() as f64, "{lang}: {word}");
            }
        }
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("zh".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::En);
        let err = "fr".parse::<Language>().unwrap_err();
        assert!(err.is_configuration());
        let msg = err.to_string();
        assert!(msg.contains("\"zh\"") && msg.contains("\"en\""));
    }

    #[test]
    fn test_validate_bm25_ranges() {
        assert!(validate_bm25(0.75, 1.2).is_ok());
        assert!(validate_bm25(0.0, 0.5).is_ok());
        assert!(validate_bm25(1.5, 1.2).is_err());
        assert!(validate_bm25(0.75, 0.0).is_err());
        assert!(validate_bm25(f64::NAN, 1.2).is_err());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let params: EncoderParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, EncoderParams::default());
    }
}
