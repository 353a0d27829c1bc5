//! Integration tests for the mode-stack tokenizer.

use trawl_lexer::{Handler, LexError, LexerEvent, Rejection, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
enum Mode {
    Text,
    Tag,
    Quoted,
    Blank,
}

/// Records every dispatched token along with the handler that saw it.
#[derive(Default)]
struct Recorder {
    tokens: Vec<(&'static str, LexerEvent, String)>,
}

fn text(recorder: &mut Recorder, token: &str, event: LexerEvent) -> Result<(), Rejection> {
    recorder.tokens.push(("text", event, token.to_string()));
    Ok(())
}

fn tag(recorder: &mut Recorder, token: &str, event: LexerEvent) -> Result<(), Rejection> {
    recorder.tokens.push(("tag", event, token.to_string()));
    Ok(())
}

fn quoted(recorder: &mut Recorder, token: &str, event: LexerEvent) -> Result<(), Rejection> {
    recorder.tokens.push(("quoted", event, token.to_string()));
    Ok(())
}

fn refuse(_: &mut Recorder, token: &str, _: LexerEvent) -> Result<(), Rejection> {
    Err(Rejection::new(format!("refused {token}")))
}

fn markup_tokenizer() -> Tokenizer<Mode, Recorder> {
    let mut tokenizer = Tokenizer::new(Mode::Text, text as Handler<Recorder>, true);
    tokenizer.add_entry_pattern("<", Mode::Text, Mode::Tag);
    tokenizer.add_special_pattern(r"\s+", Mode::Tag, Mode::Blank);
    tokenizer.add_entry_pattern("\"", Mode::Tag, Mode::Quoted);
    tokenizer.add_pattern(r#"\\""#, Mode::Quoted);
    tokenizer.add_exit_pattern("\"", Mode::Quoted);
    tokenizer.add_exit_pattern(">", Mode::Tag);
    tokenizer.map_handler(Mode::Tag, tag);
    tokenizer.map_handler(Mode::Quoted, quoted);
    tokenizer.map_handler(Mode::Blank, tag);
    tokenizer
}

fn token(handler: &'static str, event: LexerEvent, text: &str) -> (&'static str, LexerEvent, String) {
    (handler, event, text.to_string())
}

#[test]
fn test_empty_input_dispatches_nothing() {
    let mut tokenizer = markup_tokenizer();
    let mut recorder = Recorder::default();
    tokenizer.parse("", &mut recorder).unwrap();
    assert!(recorder.tokens.is_empty());
}

#[test]
fn test_plain_text_is_one_unmatched_token() {
    let mut tokenizer = markup_tokenizer();
    let mut recorder = Recorder::default();
    tokenizer.parse("just words", &mut recorder).unwrap();
    assert_eq!(
        recorder.tokens,
        vec![token("text", LexerEvent::Unmatched, "just words")]
    );
}

#[test]
fn test_event_routing() {
    let mut tokenizer = markup_tokenizer();
    let mut recorder = Recorder::default();
    tokenizer
        .parse(r#"hi <a x "q\"r"> end"#, &mut recorder)
        .unwrap();
    assert_eq!(
        recorder.tokens,
        vec![
            token("text", LexerEvent::Unmatched, "hi "),
            token("tag", LexerEvent::Enter, "<"),
            token("tag", LexerEvent::Unmatched, "a"),
            token("tag", LexerEvent::Special, " "),
            token("tag", LexerEvent::Unmatched, "x"),
            token("tag", LexerEvent::Special, " "),
            token("quoted", LexerEvent::Enter, "\""),
            token("quoted", LexerEvent::Unmatched, "q"),
            token("quoted", LexerEvent::Matched, "\\\""),
            token("quoted", LexerEvent::Unmatched, "r"),
            token("quoted", LexerEvent::Exit, "\""),
            token("tag", LexerEvent::Exit, ">"),
            token("text", LexerEvent::Unmatched, " end"),
        ]
    );
}

#[test]
fn test_tokens_reassemble_input() {
    let input = "<p> a <b \"c\">d</b> \"e\" <";
    let mut tokenizer = markup_tokenizer();
    let mut recorder = Recorder::default();
    tokenizer.parse(input, &mut recorder).unwrap();
    let rebuilt: String = recorder.tokens.iter().map(|(_, _, t)| t.as_str()).collect();
    assert_eq!(rebuilt, input);
    assert!(recorder.tokens.iter().all(|(_, _, t)| !t.is_empty()));
}

#[test]
fn test_no_rules_is_a_configuration_error() {
    let mut tokenizer: Tokenizer<Mode, Recorder> = Tokenizer::new(Mode::Text, text, true);
    let mut recorder = Recorder::default();
    assert_eq!(tokenizer.rule_count(), 0);
    assert_eq!(tokenizer.parse("", &mut recorder), Ok(()));
    assert_eq!(
        tokenizer.parse("text", &mut recorder),
        Err(LexError::NoRules)
    );
}

#[test]
fn test_zero_width_match_fails() {
    let mut tokenizer = Tokenizer::new(Mode::Text, text as Handler<Recorder>, true);
    tokenizer.add_pattern("x*", Mode::Text);
    let mut recorder = Recorder::default();
    let err = tokenizer.parse("abc", &mut recorder).unwrap_err();
    assert_eq!(
        err,
        LexError::NoProgress {
            mode: "Text".to_string(),
            offset: 0
        }
    );
    assert!(recorder.tokens.is_empty());
}

#[test]
fn test_zero_width_after_progress_reports_offset() {
    let mut tokenizer = Tokenizer::new(Mode::Text, text as Handler<Recorder>, true);
    tokenizer.add_pattern("x*", Mode::Text);
    let mut recorder = Recorder::default();
    let err = tokenizer.parse("xxab", &mut recorder).unwrap_err();
    assert!(matches!(err, LexError::NoProgress { offset: 2, .. }));
    assert_eq!(recorder.tokens, vec![token("text", LexerEvent::Matched, "xx")]);
}

#[test]
fn test_exit_from_start_mode_is_unbalanced() {
    let mut tokenizer = Tokenizer::new(Mode::Text, text as Handler<Recorder>, true);
    tokenizer.add_exit_pattern(">", Mode::Text);
    let mut recorder = Recorder::default();
    let err = tokenizer.parse("a>b", &mut recorder).unwrap_err();
    assert_eq!(
        err,
        LexError::UnbalancedExit {
            mode: "Text".to_string(),
            offset: 1
        }
    );
    // The exit token itself was dispatched before the pop failed.
    assert_eq!(
        recorder.tokens,
        vec![
            token("text", LexerEvent::Unmatched, "a"),
            token("text", LexerEvent::Exit, ">"),
        ]
    );
}

#[test]
fn test_unmapped_mode_fails() {
    let mut tokenizer = Tokenizer::new(Mode::Text, text as Handler<Recorder>, true);
    tokenizer.add_entry_pattern("<", Mode::Text, Mode::Tag);
    let mut recorder = Recorder::default();
    let err = tokenizer.parse("a<b", &mut recorder).unwrap_err();
    assert_eq!(
        err,
        LexError::UnmappedMode {
            mode: "Tag".to_string()
        }
    );
}

#[test]
fn test_mode_without_patterns_takes_the_rest() {
    let mut tokenizer = Tokenizer::new(Mode::Text, text as Handler<Recorder>, true);
    tokenizer.add_entry_pattern("<", Mode::Text, Mode::Tag);
    tokenizer.map_handler(Mode::Tag, tag);
    let mut recorder = Recorder::default();
    tokenizer.parse("a<b>c", &mut recorder).unwrap();
    assert_eq!(
        recorder.tokens,
        vec![
            token("text", LexerEvent::Unmatched, "a"),
            token("tag", LexerEvent::Enter, "<"),
            token("tag", LexerEvent::Unmatched, "b>c"),
        ]
    );
}

#[test]
fn test_rejection_aborts_immediately() {
    let mut tokenizer = markup_tokenizer();
    tokenizer.map_handler(Mode::Quoted, refuse);
    let mut recorder = Recorder::default();
    let err = tokenizer
        .parse(r#"<a "x"> never seen"#, &mut recorder)
        .unwrap_err();
    let LexError::Rejected {
        mode,
        event,
        offset,
        source,
    } = &err
    else {
        panic!("expected a rejection, got {err:?}");
    };
    assert_eq!(mode, "Quoted");
    assert_eq!(*event, LexerEvent::Enter);
    assert_eq!(*offset, 3);
    assert_eq!(source.reason(), "refused \"");
    assert!(
        recorder
            .tokens
            .iter()
            .all(|(_, _, t)| !t.contains("never"))
    );
}

#[test]
fn test_tokenizer_is_reusable() {
    let mut tokenizer = markup_tokenizer();
    let mut first = Recorder::default();
    // Ends inside a tag.
    tokenizer.parse("<open", &mut first).unwrap();
    let mut second = Recorder::default();
    tokenizer.parse("plain", &mut second).unwrap();
    assert_eq!(
        second.tokens,
        vec![token("text", LexerEvent::Unmatched, "plain")]
    );
}

#[test]
fn test_invalid_pattern_reports_mode() {
    let mut tokenizer = Tokenizer::new(Mode::Text, text as Handler<Recorder>, true);
    tokenizer.add_pattern("[", Mode::Text);
    let err = tokenizer.parse("abc", &mut Recorder::default()).unwrap_err();
    assert!(matches!(&err, LexError::InvalidPattern { mode, .. } if mode == "Text"), "{err:?}");
    assert_eq!(err.clone(), err);
}
