use bytepair::{BpeError, Segmentation, Segmenter, TokenId, Tokenizer};
use tempfile::tempdir;

const STRINGS: &[&str] = &[
    "",
    "!",
    "a",
    "hello world!!!? (안녕하세요!) lol123 😉",
    "e\u{301}cole nai\u{308}ve 🇺‌🇳 👩‍👩‍👧",
    "tabs\tand\r\nnewlines\n\n  trailing   ",
];

const LONG_TEXT: &str = "Ｕｎｉｃｏｄｅ! 🅤🅝🅘🅒🅞🅓🅔‽ 🇺‌🇳‌🇮‌🇨‌🇴‌🇩‌🇪! 😄 The very name strikes fear and awe into the hearts of programmers worldwide. We all know we ought to “support Unicode” in our software (whatever that means—like using wchar_t for all the strings, right?). But Unicode can be abstruse, and diving into the thousand-page Unicode Standard plus its dozens of supplementary annexes, reports, and notes can be more than a little intimidating. I don’t blame programmers for still finding the whole thing mysterious, even 30 years after Unicode’s inception.";

fn variants() -> [Tokenizer; 3] {
    [
        Tokenizer::basic(),
        Tokenizer::new(Segmentation::Gpt2),
        Tokenizer::regex(),
    ]
}

#[test]
fn untrained_round_trip() {
    for tokenizer in variants() {
        for text in STRINGS {
            let ids = tokenizer.encode(text);
            assert_eq!(tokenizer.decode(&ids), *text);
        }
    }
}

#[test]
fn untrained_encode_is_raw_utf8() {
    for tokenizer in variants() {
        for text in STRINGS {
            let expected: Vec<TokenId> = text.bytes().map(TokenId::from).collect();
            assert_eq!(tokenizer.encode(text), expected);
        }
    }
}

#[test]
fn trained_round_trip() {
    for mut tokenizer in variants() {
        tokenizer.train(LONG_TEXT, 256 + 64, false).unwrap();
        for text in STRINGS.iter().chain([&LONG_TEXT]) {
            let ids = tokenizer.encode(text);
            assert_eq!(tokenizer.decode(&ids), *text);
        }
        assert!(tokenizer.encode(LONG_TEXT).len() < LONG_TEXT.len());
    }
}

#[test]
fn wikipedia_example() {
    // Tie between (256, 97) and (97, 98) goes to the first seen, giving
    // 256 = "aa", 257 = "aaa", 258 = "aaab".
    for mut tokenizer in variants() {
        let text = "aaabdaaabac";
        tokenizer.train(text, 256 + 3, false).unwrap();
        assert_eq!(
            tokenizer.merges().pairs(),
            &[(97, 97), (256, 97), (257, 98)]
        );
        let ids = tokenizer.encode(text);
        assert_eq!(ids, vec![258, 100, 258, 97, 99]);
        assert_eq!(tokenizer.decode(&ids), text);
    }
}

#[test]
fn save_load_equivalence() {
    let dir = tempdir().unwrap();
    for (name, mode) in [
        ("basic", Segmentation::Disabled),
        ("gpt2", Segmentation::Gpt2),
        ("regex", Segmentation::Gpt4),
    ] {
        let mut tokenizer = Tokenizer::new(mode);
        tokenizer.train(LONG_TEXT, 256 + 64, false).unwrap();
        let ids = tokenizer.encode(LONG_TEXT);

        let written = tokenizer.save(dir.path().join(name)).unwrap();
        assert_eq!(written, dir.path().join(format!("{name}.model")));

        let mut restored = Tokenizer::new(mode);
        restored.load(dir.path().join(name)).unwrap();
        let restored_ids = restored.encode(LONG_TEXT);
        assert_eq!(ids, restored_ids);
        assert_eq!(restored.decode(&restored_ids), LONG_TEXT);
        assert_eq!(restored.merges(), tokenizer.merges());
        assert_eq!(restored.model().token_bytes(), tokenizer.model().token_bytes());
    }
}

#[test]
fn load_replaces_existing_state() {
    let dir = tempdir().unwrap();
    let mut small = Tokenizer::basic();
    small.train("abababab", 257, false).unwrap();
    small.save(dir.path().join("small")).unwrap();

    let mut tokenizer = Tokenizer::basic();
    tokenizer.train(LONG_TEXT, 300, false).unwrap();
    tokenizer.load(dir.path().join("small.json")).unwrap();
    assert_eq!(tokenizer.vocab_size(), 257);
    assert_eq!(tokenizer.encode("abab"), vec![256, 256]);
}

#[test]
fn failed_load_keeps_previous_model() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("broken.model"), "[[97, 97], [97]]").unwrap();

    let mut tokenizer = Tokenizer::basic();
    tokenizer.train("abababab", 257, false).unwrap();
    let err = tokenizer.load(dir.path().join("broken")).unwrap_err();
    assert!(matches!(err, BpeError::Format(_)));
    assert_eq!(tokenizer.merges().pairs(), &[(97, 98)]);
}

#[test]
fn retraining_starts_from_clean_state() {
    let mut tokenizer = Tokenizer::basic();
    tokenizer.train(LONG_TEXT, 300, false).unwrap();
    tokenizer.train("xyxyxy", 257, false).unwrap();
    assert_eq!(tokenizer.vocab_size(), 257);
    assert_eq!(tokenizer.merges().pairs(), &[(120, 121)]);

    let mut fresh = Tokenizer::basic();
    fresh.train("xyxyxy", 257, false).unwrap();
    assert_eq!(fresh.merges(), tokenizer.merges());
}

#[test]
fn invalid_retrain_leaves_untrained_state() {
    for mut tokenizer in variants() {
        tokenizer.train("abababab", 257, false).unwrap();
        let err = tokenizer.train("abababab", 100, false).unwrap_err();
        assert!(matches!(err, BpeError::InvalidConfig(_)));
        assert_eq!(tokenizer.vocab_size(), 256);
        assert_eq!(tokenizer.encode("ab"), vec![97, 98]);
    }
}

#[test]
fn training_is_deterministic() {
    let mut first = Tokenizer::regex();
    let mut second = Tokenizer::regex();
    first.train(LONG_TEXT, 320, false).unwrap();
    second.train(LONG_TEXT, 320, false).unwrap();
    assert_eq!(first.merges(), second.merges());
}

#[test]
fn exhaustion_is_an_error() {
    for mut tokenizer in variants() {
        let err = tokenizer.train("aaaaaaaa", 256 + 10, false).unwrap_err();
        match err {
            BpeError::Exhausted {
                completed,
                requested,
            } => {
                assert_eq!(completed, 3);
                assert_eq!(requested, 10);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert!(tokenizer.merges().is_empty());
    }
}

#[test]
fn empty_text_exhausts_but_base_vocab_does_not() {
    for mut tokenizer in variants() {
        assert!(matches!(
            tokenizer.train("", 257, false),
            Err(BpeError::Exhausted { completed: 0, .. })
        ));
        let metrics = tokenizer.train("", 256, false).unwrap();
        assert!(metrics.iterations.is_empty());
        assert_eq!(tokenizer.encode("hi"), vec![104, 105]);
    }
}

#[test]
fn tokens_never_span_segments() {
    let mut tokenizer = Tokenizer::regex();
    tokenizer.train(LONG_TEXT, 256 + 128, false).unwrap();

    let chunks = Segmenter::gpt4().split(LONG_TEXT);
    assert_eq!(chunks.concat(), LONG_TEXT);
    let mut boundaries = Vec::with_capacity(chunks.len() + 1);
    let mut offset = 0usize;
    boundaries.push(offset);
    for chunk in &chunks {
        offset += chunk.len();
        boundaries.push(offset);
    }

    let mut start = 0usize;
    for id in tokenizer.encode(LONG_TEXT) {
        let len = tokenizer.model().token(id).unwrap().len();
        let end = start + len;
        assert!(
            !boundaries.iter().any(|&b| b > start && b < end),
            "token {id} spans bytes {start}..{end} across a chunk boundary"
        );
        start = end;
    }
    assert_eq!(start, LONG_TEXT.len());
}

#[test]
fn verbose_training_returns_the_same_model() {
    let mut quiet = Tokenizer::regex();
    let mut verbose = Tokenizer::regex();
    let quiet_metrics = quiet.train(LONG_TEXT, 280, false).unwrap();
    let verbose_metrics = verbose.train(LONG_TEXT, 280, true).unwrap();
    assert_eq!(quiet.merges(), verbose.merges());
    assert_eq!(quiet_metrics.final_tokens, verbose_metrics.final_tokens);
}
