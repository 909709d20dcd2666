//! Shared tokenizer for document and query encoding.
//!
//! Text is segmented with jieba (default, search or cut-all mode), each segment
//! is trimmed and lowercased, and empty or stop-word tokens are dropped.
//! Reconfiguration never mutates tables in place: a new snapshot is built and
//! swapped in only when every file it needs loaded cleanly.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jieba_rs::Jieba;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

use super::hasher::{hasher_by_name, TermHasher};
use crate::types::{Bm25Error, Bm25Result, FileKind, TermId, DEFAULT_HASH_FUNCTION};

/// Built-in stop words: Chinese and English function words plus punctuation.
const DEFAULT_STOP_WORDS: &str = include_str!("../../resources/stopwords.txt");

/// Where the active stop-word set comes from.
///
/// Persisted as `false`, `true` or a path string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "StopWordsValue", into = "StopWordsValue")]
pub enum StopWordsPolicy {
    Disabled,
    #[default]
    Default,
    File(PathBuf),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StopWordsValue {
    Flag(bool),
    Path(PathBuf),
}

impl From<StopWordsValue> for StopWordsPolicy {
    fn from(value: StopWordsValue) -> Self {
        match value {
            StopWordsValue::Flag(true) => StopWordsPolicy::Default,
            StopWordsValue::Flag(false) => StopWordsPolicy::Disabled,
            StopWordsValue::Path(path) => StopWordsPolicy::File(path),
        }
    }
}

impl From<StopWordsPolicy> for StopWordsValue {
    fn from(policy: StopWordsPolicy) -> Self {
        match policy {
            StopWordsPolicy::Disabled => StopWordsValue::Flag(false),
            StopWordsPolicy::Default => StopWordsValue::Flag(true),
            StopWordsPolicy::File(path) => StopWordsValue::Path(path),
        }
    }
}

/// Segmentation strategy. Exactly one is active per configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    /// Single best segmentation.
    Default,
    /// Finer overlapping segments on top of the default cut, favoring recall.
    Search,
    /// Every dictionary word found anywhere in the text.
    CutAll,
}

/// Complete, self-describing tokenizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizerParams {
    #[serde(default = "default_hash_function")]
    pub hash_function: String,
    #[serde(default)]
    pub stop_words: StopWordsPolicy,
    #[serde(default)]
    pub dict_file: Option<PathBuf>,
    #[serde(default)]
    pub cut_all: bool,
    #[serde(default)]
    pub for_search: bool,
    /// Statistical (HMM) joining of out-of-vocabulary character runs.
    #[serde(rename = "HMM", default = "default_hmm")]
    pub hmm: bool,
}

fn default_hash_function() -> String {
    DEFAULT_HASH_FUNCTION.to_string()
}

fn default_hmm() -> bool {
    true
}

impl Default for TokenizerParams {
    fn default() -> Self {
        Self {
            hash_function: default_hash_function(),
            stop_words: StopWordsPolicy::Default,
            dict_file: None,
            cut_all: false,
            for_search: false,
            hmm: default_hmm(),
        }
    }
}

impl TokenizerParams {
    /// The segmentation mode these flags select.
    pub fn mode(&self) -> Bm25Result<SegmentMode> {
        match (self.cut_all, self.for_search) {
            (false, false) => Ok(SegmentMode::Default),
            (false, true) => Ok(SegmentMode::Search),
            (true, false) => Ok(SegmentMode::CutAll),
            (true, true) => Err(Bm25Error::InvalidConfig(
                "cut_all and for_search are mutually exclusive".to_string(),
            )),
        }
    }

    /// Apply a partial update; fields left unset keep their current value.
    pub fn merged(&self, update: &TokenizerParamsUpdate) -> Self {
        let mut next = self.clone();
        if let Some(hash_function) = &update.hash_function {
            next.hash_function = hash_function.clone();
        }
        if let Some(stop_words) = &update.stop_words {
            next.stop_words = stop_words.clone();
        }
        if let Some(dict_file) = &update.dict_file {
            next.dict_file = dict_file.clone();
        }
        if let Some(cut_all) = update.cut_all {
            next.cut_all = cut_all;
        }
        if let Some(for_search) = update.for_search {
            next.for_search = for_search;
        }
        if let Some(hmm) = update.hmm {
            next.hmm = hmm;
        }
        next
    }
}

/// A partial tokenizer configuration delta.
///
/// `dict_file` distinguishes "leave unchanged" (`None`) from "clear the user
/// dictionary" (`Some(None)`); in serialized form a missing key is the former
/// and an explicit `null` the latter. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerParamsUpdate {
    pub hash_function: Option<String>,
    pub stop_words: Option<StopWordsPolicy>,
    #[serde(deserialize_with = "explicit_option")]
    pub dict_file: Option<Option<PathBuf>>,
    pub cut_all: Option<bool>,
    pub for_search: Option<bool>,
    #[serde(rename = "HMM", alias = "hmm")]
    pub hmm: Option<bool>,
}

fn explicit_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<TokenizerParams> for TokenizerParamsUpdate {
    fn from(params: TokenizerParams) -> Self {
        Self {
            hash_function: Some(params.hash_function),
            stop_words: Some(params.stop_words),
            dict_file: Some(params.dict_file),
            cut_all: Some(params.cut_all),
            for_search: Some(params.for_search),
            hmm: Some(params.hmm),
        }
    }
}

/// Jieba-backed tokenizer with stop-word filtering and hashed term ids.
///
/// Cloning is cheap: the segmenter, stop words and hasher are shared
/// immutable snapshots.
#[derive(Clone)]
pub struct Tokenizer {
    params: TokenizerParams,
    mode: SegmentMode,
    segmenter: Arc<Jieba>,
    stop_words: Arc<HashSet<String>>,
    hasher: Arc<dyn TermHasher>,
}

impl Tokenizer {
    /// Create a tokenizer with default parameters: default segmentation, HMM
    /// on, built-in stop words, MurmurHash3 term ids.
    pub fn new() -> Self {
        Self {
            params: TokenizerParams::default(),
            mode: SegmentMode::Default,
            segmenter: Arc::new(Jieba::new()),
            stop_words: Arc::new(default_stop_words()),
            hasher: Arc::new(super::hasher::Murmur3Hasher),
        }
    }

    /// Create a tokenizer from a full parameter set, loading any dictionary
    /// and stop-word files it names.
    pub fn with_params(params: TokenizerParams) -> Bm25Result<Self> {
        Self::build(params, None)
    }

    fn build(params: TokenizerParams, previous: Option<&Tokenizer>) -> Bm25Result<Self> {
        let mode = params.mode()?;
        let hasher: Arc<dyn TermHasher> = Arc::from(hasher_by_name(&params.hash_function)?);

        let segmenter = match previous {
            Some(prev) if prev.params.dict_file == params.dict_file => {
                if let Some(path) = &params.dict_file {
                    require_file(path, FileKind::Dictionary)?;
                }
                Arc::clone(&prev.segmenter)
            }
            _ => Arc::new(load_segmenter(params.dict_file.as_deref())?),
        };

        let stop_words = match previous {
            Some(prev) if prev.params.stop_words == params.stop_words => {
                if let StopWordsPolicy::File(path) = &params.stop_words {
                    require_file(path, FileKind::StopWords)?;
                }
                Arc::clone(&prev.stop_words)
            }
            _ => Arc::new(load_stop_words(&params.stop_words)?),
        };

        Ok(Self {
            params,
            mode,
            segmenter,
            stop_words,
            hasher,
        })
    }

    /// Apply a partial configuration delta.
    ///
    /// The replacement snapshot is fully built before it is swapped in, so a
    /// failure leaves the current configuration untouched.
    pub fn update_parameters(&mut self, update: &TokenizerParamsUpdate) -> Bm25Result<()> {
        let params = self.params.merged(update);
        let next = Self::build(params, Some(self))?;
        debug!(
            "tokenizer reconfigured: mode={:?} hmm={} stop_words={:?} dict={:?}",
            next.mode, next.params.hmm, next.params.stop_words, next.params.dict_file
        );
        *self = next;
        Ok(())
    }

    /// Load a user dictionary on top of the base dictionary.
    pub fn load_dict(&mut self, path: impl AsRef<Path>) -> Bm25Result<()> {
        self.update_parameters(&TokenizerParamsUpdate {
            dict_file: Some(Some(path.as_ref().to_path_buf())),
            ..Default::default()
        })
    }

    /// Snapshot of the current configuration.
    pub fn parameters(&self) -> TokenizerParams {
        self.params.clone()
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    pub fn hasher_name(&self) -> &'static str {
        self.hasher.name()
    }

    /// Number of entries in the active stop-word set.
    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }

    fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self.mode {
            SegmentMode::Default => self.segmenter.cut(text, self.params.hmm),
            SegmentMode::Search => self.segmenter.cut_for_search(text, self.params.hmm),
            SegmentMode::CutAll => self.segmenter.cut_all(text),
        }
    }

    /// Tokenize text into normalized terms, excluding empty and stop-word tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.segment(text)
            .into_iter()
            .filter_map(|segment| {
                let trimmed = segment.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let token = trimmed.to_lowercase();
                if self.stop_words.contains(&token) {
                    None
                } else {
                    Some(token)
                }
            })
            .collect()
    }

    /// Hash a single token with the configured hasher.
    pub fn hash(&self, token: &str) -> TermId {
        self.hasher.hash(token)
    }

    /// Tokenize and hash, preserving order and duplicates.
    pub fn encode(&self, text: &str) -> Vec<TermId> {
        self.tokenize(text)
            .iter()
            .map(|token| self.hasher.hash(token))
            .collect()
    }

    /// Tokenize, hash and return per-term occurrence counts.
    pub fn term_frequencies(&self, text: &str) -> BTreeMap<TermId, u32> {
        let mut freqs = BTreeMap::new();
        for term in self.encode(text) {
            *freqs.entry(term).or_insert(0) += 1;
        }
        freqs
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("params", &self.params)
            .field("mode", &self.mode)
            .field("stop_words", &self.stop_words.len())
            .field("hasher", &self.hasher.name())
            .finish()
    }
}

fn require_file(path: &Path, kind: FileKind) -> Bm25Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Bm25Error::FileNotFound {
            kind,
            path: path.to_path_buf(),
        })
    }
}

fn read_text_file(path: &Path, kind: FileKind) -> Bm25Result<String> {
    require_file(path, kind)?;
    std::fs::read_to_string(path).map_err(|e| Bm25Error::io(path, e))
}

fn default_stop_words() -> HashSet<String> {
    parse_stop_words(DEFAULT_STOP_WORDS)
}

fn parse_stop_words(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn load_stop_words(policy: &StopWordsPolicy) -> Bm25Result<HashSet<String>> {
    match policy {
        StopWordsPolicy::Disabled => Ok(HashSet::new()),
        StopWordsPolicy::Default => Ok(default_stop_words()),
        StopWordsPolicy::File(path) => {
            let words = parse_stop_words(&read_text_file(path, FileKind::StopWords)?);
            debug!("loaded {} stop words from {}", words.len(), path.display());
            Ok(words)
        }
    }
}

/// One user dictionary line: `word [freq] [tag]`.
#[derive(Debug, PartialEq)]
struct DictEntry<'a> {
    word: &'a str,
    freq: Option<usize>,
    tag: Option<&'a str>,
}

fn parse_dict<'a>(path: &Path, text: &'a str) -> Bm25Result<Vec<DictEntry<'a>>> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            continue;
        };
        let freq = match fields.next() {
            Some(raw) => Some(raw.parse::<usize>().map_err(|e| Bm25Error::InvalidDictionary {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: format!("frequency '{}' is not a valid integer: {}", raw, e),
            })?),
            None => None,
        };
        let tag = fields.next();
        entries.push(DictEntry { word, freq, tag });
    }
    Ok(entries)
}

fn load_segmenter(dict_file: Option<&Path>) -> Bm25Result<Jieba> {
    let mut jieba = Jieba::new();
    if let Some(path) = dict_file {
        let text = read_text_file(path, FileKind::Dictionary)?;
        let entries = parse_dict(path, &text)?;
        for entry in &entries {
            jieba.add_word(entry.word, entry.freq, entry.tag);
        }
        debug!(
            "loaded {} user dictionary entries from {}",
            entries.len(),
            path.display()
        );
    }
    Ok(jieba)
}
