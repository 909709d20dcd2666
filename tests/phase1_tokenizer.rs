//! Phase 1 tests: hashing, segmentation modes, stop words, user dictionaries
//! and tokenizer reconfiguration.

use std::io::Write;
use std::path::PathBuf;

use bm25_sparse::{
    hasher_by_name, Bm25Error, SegmentMode, StopWordsPolicy, Tokenizer, TokenizerParams,
    TokenizerParamsUpdate,
};

// ==================== Helpers ====================

fn no_stop_words() -> Tokenizer {
    Tokenizer::with_params(TokenizerParams {
        stop_words: StopWordsPolicy::Disabled,
        ..Default::default()
    })
    .unwrap()
}

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

// ==================== Hasher Tests ====================

#[test]
fn test_hasher_deterministic_and_named() {
    let hasher = hasher_by_name("mmh3").unwrap();
    assert_eq!(hasher.name(), "mmh3");
    for token in ["向量", "database", "数据库", ""] {
        let first = hasher.hash(token);
        for _ in 0..10 {
            assert_eq!(hasher.hash(token), first);
        }
    }
    assert_ne!(hasher.hash("向量"), hasher.hash("数据库"));
}

#[test]
fn test_unknown_hash_function_rejected() {
    let err = Tokenizer::with_params(TokenizerParams {
        hash_function: "xxhash".to_string(),
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, Bm25Error::UnsupportedHashFunction(ref name) if name == "xxhash"));
}

// ==================== Tokenize Tests ====================

#[test]
fn test_tokenizer_basic_english() {
    let tokenizer = Tokenizer::new();
    assert_eq!(tokenizer.tokenize("Hello World"), vec!["hello", "world"]);
}

#[test]
fn test_tokenizer_stop_words_removed() {
    let tokenizer = Tokenizer::new();
    assert_eq!(
        tokenizer.tokenize("the quick brown fox"),
        vec!["quick", "brown", "fox"]
    );
}

#[test]
fn test_tokenizer_only_stop_words() {
    let tokenizer = Tokenizer::new();
    assert!(tokenizer.tokenize("the is a").is_empty());
    assert!(tokenizer.tokenize("的，是。了").is_empty());
}

#[test]
fn test_tokenizer_empty_and_whitespace() {
    let tokenizer = no_stop_words();
    assert!(tokenizer.tokenize("").is_empty());
    assert!(tokenizer.tokenize("   \t\n  ").is_empty());
}

#[test]
fn test_tokenizer_default_cut_without_hmm() {
    let tokenizer = Tokenizer::with_params(TokenizerParams {
        stop_words: StopWordsPolicy::Disabled,
        hmm: false,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(
        tokenizer.tokenize("我们中出了一个叛徒"),
        vec!["我们", "中", "出", "了", "一个", "叛徒"]
    );
}

#[test]
fn test_tokenizer_hmm_only_merges() {
    let plain = Tokenizer::with_params(TokenizerParams {
        stop_words: StopWordsPolicy::Disabled,
        hmm: false,
        ..Default::default()
    })
    .unwrap();
    let hmm = no_stop_words();
    let text = "我们中出了一个叛徒";
    assert!(hmm.tokenize(text).len() <= plain.tokenize(text).len());
    assert_eq!(hmm.tokenize(text).concat(), text);
}

#[test]
fn test_tokenizer_deterministic() {
    let tokenizer = Tokenizer::new();
    let input = "腾讯云向量数据库是一款全托管的自研企业级分布式数据库服务";
    let expected = tokenizer.tokenize(input);
    for _ in 0..50 {
        assert_eq!(tokenizer.tokenize(input), expected);
    }
}

#[test]
fn test_tokenizer_lowercases() {
    let tokenizer = Tokenizer::new();
    assert_eq!(tokenizer.tokenize("BM25 Encoder"), vec!["bm25", "encoder"]);
}

// ==================== Segmentation Mode Tests ====================

#[test]
fn test_search_mode_adds_finer_segments() {
    let default = no_stop_words();
    let mut search = no_stop_words();
    search
        .update_parameters(&TokenizerParamsUpdate {
            for_search: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(search.mode(), SegmentMode::Search);

    let text = "中华人民共和国";
    let coarse = default.tokenize(text);
    let fine = search.tokenize(text);
    assert_eq!(coarse, vec!["中华人民共和国"]);
    assert!(fine.len() > coarse.len());
    assert!(fine.iter().any(|t| t == "中华人民共和国"));
}

#[test]
fn test_cut_all_mode_expands() {
    let mut tokenizer = no_stop_words();
    tokenizer
        .update_parameters(&TokenizerParamsUpdate {
            cut_all: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(tokenizer.mode(), SegmentMode::CutAll);
    assert!(tokenizer.tokenize("中华人民共和国").len() > 1);
}

#[test]
fn test_conflicting_modes_rejected() {
    let mut tokenizer = Tokenizer::new();
    tokenizer
        .update_parameters(&TokenizerParamsUpdate {
            for_search: Some(true),
            ..Default::default()
        })
        .unwrap();
    let err = tokenizer
        .update_parameters(&TokenizerParamsUpdate {
            cut_all: Some(true),
            ..Default::default()
        })
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(tokenizer.mode(), SegmentMode::Search);
}

// ==================== Encode Tests ====================

#[test]
fn test_encode_preserves_order_and_duplicates() {
    let tokenizer = Tokenizer::new();
    let ids = tokenizer.encode("rust vector rust");
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], ids[2]);
    assert_eq!(ids[0], tokenizer.hash("rust"));
    assert_eq!(ids[1], tokenizer.hash("vector"));
}

#[test]
fn test_term_frequencies_count_duplicates() {
    let tokenizer = Tokenizer::new();
    let freqs = tokenizer.term_frequencies("rust vector rust");
    assert_eq!(freqs.len(), 2);
    assert_eq!(freqs[&tokenizer.hash("rust")], 2);
    assert_eq!(freqs[&tokenizer.hash("vector")], 1);
}

// ==================== Stop Word Policy Tests ====================

#[test]
fn test_disabled_stop_words_keep_everything() {
    let tokenizer = no_stop_words();
    assert_eq!(tokenizer.stop_word_count(), 0);
    assert_eq!(tokenizer.tokenize("the fox"), vec!["the", "fox"]);
}

#[test]
fn test_custom_stop_word_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "stop.txt", "Fox\n\n  brown  \n");
    let tokenizer = Tokenizer::with_params(TokenizerParams {
        stop_words: StopWordsPolicy::File(path),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(tokenizer.stop_word_count(), 2);
    assert_eq!(
        tokenizer.tokenize("the quick brown fox"),
        vec!["the", "quick"]
    );
}

#[test]
fn test_missing_stop_word_file_keeps_prior_state() {
    let mut tokenizer = Tokenizer::new();
    let before = tokenizer.parameters();
    let err = tokenizer
        .update_parameters(&TokenizerParamsUpdate {
            stop_words: Some(StopWordsPolicy::File("/no/such/stop.txt".into())),
            hmm: Some(false),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, Bm25Error::FileNotFound { .. }));
    assert_eq!(tokenizer.parameters(), before);
    assert!(tokenizer.tokenize("the is a").is_empty());
}

// ==================== User Dictionary Tests ====================

#[test]
fn test_user_dictionary_adds_words() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "user.dict", "腾讯云向量数据库 100000 nz\n");
    let mut tokenizer = no_stop_words();
    assert!(!tokenizer
        .tokenize("什么是腾讯云向量数据库")
        .iter()
        .any(|t| t == "腾讯云向量数据库"));

    tokenizer.load_dict(&path).unwrap();
    assert!(tokenizer
        .tokenize("什么是腾讯云向量数据库")
        .iter()
        .any(|t| t == "腾讯云向量数据库"));
    assert_eq!(tokenizer.parameters().dict_file, Some(path));
}

#[test]
fn test_user_dictionary_keeps_base_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "user.dict", "稀疏向量 50000\n");
    let mut tokenizer = no_stop_words();
    let before = tokenizer.tokenize("中华人民共和国");
    tokenizer.load_dict(&path).unwrap();
    assert_eq!(tokenizer.tokenize("中华人民共和国"), before);
}

#[test]
fn test_missing_dictionary_is_configuration_error() {
    let mut tokenizer = Tokenizer::new();
    let err = tokenizer.load_dict("/no/such/user.dict").unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(tokenizer.parameters().dict_file, None);
}

#[test]
fn test_malformed_dictionary_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "user.dict", "好词 10\n坏词 many\n");
    let err = Tokenizer::with_params(TokenizerParams {
        dict_file: Some(path),
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, Bm25Error::InvalidDictionary { line: 2, .. }));
}

// ==================== Parameter Snapshot Tests ====================

#[test]
fn test_parameters_snapshot_rebuilds_equivalent_tokenizer() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_file(&dir, "user.dict", "腾讯云向量数据库 100000\n");
    let mut original = Tokenizer::new();
    original
        .update_parameters(&TokenizerParamsUpdate {
            dict_file: Some(Some(dict)),
            for_search: Some(true),
            hmm: Some(false),
            ..Default::default()
        })
        .unwrap();

    let rebuilt = Tokenizer::with_params(original.parameters()).unwrap();
    let text = "什么是腾讯云向量数据库，它支持混合检索吗？";
    assert_eq!(rebuilt.tokenize(text), original.tokenize(text));
    assert_eq!(rebuilt.encode(text), original.encode(text));
}

#[test]
fn test_update_parameters_idempotent() {
    let mut tokenizer = Tokenizer::new();
    let update = TokenizerParamsUpdate {
        cut_all: Some(true),
        ..Default::default()
    };
    tokenizer.update_parameters(&update).unwrap();
    let once = tokenizer.parameters();
    tokenizer.update_parameters(&update).unwrap();
    assert_eq!(tokenizer.parameters(), once);
}

#[test]
fn test_empty_update_leaves_state_untouched() {
    let mut tokenizer = Tokenizer::new();
    let before = tokenizer.parameters();
    tokenizer
        .update_parameters(&TokenizerParamsUpdate::default())
        .unwrap();
    assert_eq!(tokenizer.parameters(), before);
}
