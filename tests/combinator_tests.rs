// tests/combinator_tests.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use grammarkit::{
    ErrorKind, Grammar, GrammarError, Matcher, Parsed, Sequence, Source, StructureId,
    StructureKind, Switch, Value,
};

fn text(pattern: &str) -> Matcher {
    Matcher::new(pattern).map_value(|m, _| Value::text(m.as_str()))
}

/// A text matcher that counts how often its mapper runs.
fn counted(pattern: &str, counter: &Arc<AtomicUsize>) -> Matcher {
    let counter = Arc::clone(counter);
    Matcher::new(pattern).map_value(move |m, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Value::text(m.as_str())
    })
}

fn list(items: &[&str]) -> Value {
    Value::List(items.iter().map(|item| Value::text(*item)).collect())
}

// ---
// Matcher
// ---

#[test]
fn matcher_returns_mapper_result_and_end_of_match() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a+")).unwrap();
    let parsed = grammar.parse_str(a, "aab").unwrap();
    assert_eq!(
        parsed,
        Parsed {
            value: Some(Value::text("aa")),
            next: 2
        }
    );
}

#[test]
fn matcher_fails_at_start_for_any_end() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let source = Source::anonymous("xyz");
    for end in 1..=3 {
        let error = grammar.parse(a, &source, 1, end).unwrap_err();
        assert_eq!(error.kind, ErrorKind::NoMatch);
        assert_eq!(error.position, 1);
    }
}

#[test]
fn matcher_never_reads_past_end() {
    let mut grammar = Grammar::new();
    let digits = grammar.define(text("[0-9]+")).unwrap();
    let source = Source::anonymous("12345");
    let parsed = grammar.parse(digits, &source, 1, 3).unwrap();
    assert_eq!(parsed.value, Some(Value::text("23")));
    assert_eq!(parsed.next, 3);
}

#[test]
fn assertions_treat_end_as_end_of_input() {
    let mut grammar = Grammar::new();
    let dollar = grammar.define(text("a$")).unwrap();
    let boundary = grammar.define(text(r"a\b")).unwrap();
    let end_of_input = grammar.define(Matcher::placeholder(r"\z")).unwrap();
    let source = Source::anonymous("ab");

    assert_eq!(grammar.parse(dollar, &source, 0, 1).unwrap().next, 1);
    assert_eq!(grammar.parse(boundary, &source, 0, 1).unwrap().next, 1);
    assert_eq!(grammar.parse(end_of_input, &source, 1, 1).unwrap(), Parsed { value: None, next: 1 });

    assert!(grammar.parse(dollar, &source, 0, 2).unwrap_err().is_no_match());
    assert!(grammar.parse(boundary, &source, 0, 2).unwrap_err().is_no_match());
    assert!(grammar.parse(end_of_input, &source, 1, 2).unwrap_err().is_no_match());
}

// ---
// Sequence
// ---

#[test]
fn sequence_children_consume_contiguous_spans() {
    let mut grammar = Grammar::new();
    let span = |pattern: &str| {
        Matcher::new(pattern).map_value(|m, _| Value::text(format!("{}..{}", m.start(), m.end())))
    };
    let word = grammar.define(span("[a-z]+")).unwrap();
    let number = grammar.define(span("[0-9]+")).unwrap();
    let seq = grammar
        .define(Sequence::new([word, number, word]).map_value(|values, _| Value::List(values)))
        .unwrap();
    let parsed = grammar.parse_str(seq, "ab12cd!").unwrap();
    assert_eq!(parsed.value, Some(list(&["0..2", "2..4", "4..6"])));
    assert_eq!(parsed.next, 6);
}

#[test]
fn sequence_stops_at_the_first_failing_child() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let b = grammar.define(text("b")).unwrap();
    let c = grammar.define(counted("c", &counter)).unwrap();
    let seq = grammar.define(Sequence::new([a, b, c])).unwrap();

    let error = grammar.parse_str(seq, "axc").unwrap_err();
    assert_eq!(error.kind, ErrorKind::NoMatch);
    assert_eq!(error.position, 1);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn placeholders_are_left_out_of_collected_values() {
    let mut grammar = Grammar::new();
    let word = grammar.define(text("[a-z]+")).unwrap();
    let comma = grammar.define(Matcher::literal_placeholder(",")).unwrap();
    let pair = grammar
        .define(Sequence::new([word, comma, word]).map_value(|values, _| Value::List(values)))
        .unwrap();
    let parsed = grammar.fullparse_str(pair, "ab,cd").unwrap();
    assert_eq!(parsed.value, Some(list(&["ab", "cd"])));
}

#[test]
fn placeholders_are_left_out_at_either_end() {
    let mut grammar = Grammar::new();
    let word = grammar.define(text("[a-z]+")).unwrap();
    let comma = grammar.define(Matcher::literal_placeholder(",")).unwrap();
    let framed = grammar
        .define(Sequence::new([comma, word, comma]).map_value(|values, _| Value::List(values)))
        .unwrap();
    let leading = grammar
        .define(Sequence::new([comma, word]).map_value(|values, _| Value::List(values)))
        .unwrap();
    let trailing = grammar
        .define(Sequence::new([word, comma]).map_value(|values, _| Value::List(values)))
        .unwrap();
    let only = grammar
        .define(Sequence::new([comma, comma]).map_value(|values, _| Value::List(values)))
        .unwrap();

    assert_eq!(grammar.fullparse_str(framed, ",ab,").unwrap().value, Some(list(&["ab"])));
    assert_eq!(grammar.fullparse_str(leading, ",ab").unwrap().value, Some(list(&["ab"])));
    assert_eq!(grammar.fullparse_str(trailing, "ab,").unwrap().value, Some(list(&["ab"])));
    assert_eq!(grammar.fullparse_str(only, ",,").unwrap().value, Some(list(&[])));
}

#[test]
fn flatten_splices_into_the_parent() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let b = grammar.define(text("b")).unwrap();
    let c = grammar.define(text("c")).unwrap();
    let inner = grammar.define(Sequence::new([a, b]).flatten()).unwrap();
    let outer = grammar.define(Sequence::new([inner, c])).unwrap();

    let parsed = grammar.fullparse_str(outer, "abc").unwrap();
    assert_eq!(parsed.value, Some(Value::tagged(outer, list(&["a", "b", "c"]))));
}

#[test]
fn unflattened_sequences_nest() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let b = grammar.define(text("b")).unwrap();
    let inner = grammar.define(Sequence::new([a, b])).unwrap();
    let outer = grammar.define(Sequence::new([inner, a])).unwrap();

    let parsed = grammar.fullparse_str(outer, "aba").unwrap();
    assert_eq!(
        parsed.value,
        Some(Value::tagged(
            outer,
            Value::List(vec![
                Value::tagged(inner, list(&["a", "b"])),
                Value::text("a")
            ])
        ))
    );
}

#[test]
fn sequence_fullparse_puts_the_boundary_on_the_last_child() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let b = grammar.define(text("b+")).unwrap();
    let seq = grammar.define(Sequence::new([a, b])).unwrap();

    assert_eq!(grammar.fullparse_str(seq, "abbb").unwrap().next, 4);
    let error = grammar.fullparse_str(seq, "abbc").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Fatal);
    assert_eq!(error.message, "extra unparsed data");
    assert_eq!(error.position, 3);
}

// ---
// Switch
// ---

#[test]
fn switch_commits_to_the_first_match() {
    let short = Arc::new(AtomicUsize::new(0));
    let long = Arc::new(AtomicUsize::new(0));
    let mut grammar = Grammar::new();
    let a = grammar.define(counted("a", &short)).unwrap();
    let ab = grammar.define(counted("ab", &long)).unwrap();
    let switch = grammar.define(Switch::new([a, ab])).unwrap();

    let parsed = grammar.parse_str(switch, "ab").unwrap();
    assert_eq!(parsed.value, Some(Value::text("a")));
    assert_eq!(parsed.next, 1);
    assert_eq!(short.load(Ordering::SeqCst), 1);
    assert_eq!(long.load(Ordering::SeqCst), 0);
}

#[test]
fn switch_tries_later_alternatives_after_no_match() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let b = grammar.define(text("b")).unwrap();
    let only_a = grammar.define(Switch::new([a])).unwrap();
    let outer = grammar.define(Switch::new([only_a, b])).unwrap();

    let parsed = grammar.parse_str(outer, "b").unwrap();
    assert_eq!(parsed.value, Some(Value::text("b")));
}

#[test]
fn fatal_failures_stop_the_switch() {
    let fallback = Arc::new(AtomicUsize::new(0));
    let mut grammar = Grammar::new();
    let broken = grammar
        .define(Matcher::new("x").map(|_, _| Err("mapper exploded".into())))
        .unwrap();
    let other = grammar.define(counted("x", &fallback)).unwrap();
    let switch = grammar.define(Switch::new([broken, other])).unwrap();

    let source = Source::anonymous("  x");
    let error = grammar.parse(switch, &source, 2, 3).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Fatal);
    assert_eq!(error.message, "mapper exploded");
    assert_eq!(error.position, 2);
    assert_eq!(fallback.load(Ordering::SeqCst), 0);
}

#[test]
fn allow_no_match_under_fullparse() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let maybe = grammar.define(Switch::new([a]).allow_no_match()).unwrap();
    let source = Source::anonymous("xb");

    assert_eq!(grammar.fullparse(maybe, &source, 1, 1).unwrap(), Parsed { value: None, next: 1 });
    assert_eq!(grammar.parse(maybe, &source, 1, 2).unwrap(), Parsed { value: None, next: 1 });

    let error = grammar.fullparse(maybe, &source, 1, 2).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Fatal);
    assert!(error.message.starts_with("no valid full match for"));
    assert_eq!(error.position, 1);
}

#[test]
fn switch_exhaustion_reports_the_switch() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let b = grammar.define(text("b")).unwrap();
    let switch = grammar.define(Switch::new([a, b])).unwrap();

    let error = grammar.parse_str(switch, "c").unwrap_err();
    assert_eq!(error.kind, ErrorKind::NoMatch);
    assert_eq!(
        error.message,
        r#"no valid match for <Switch [<Matcher "a">, <Matcher "b">]>"#
    );
}

// ---
// Mappers and boundaries
// ---

#[test]
fn fullparse_boundary() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();

    let error = grammar.fullparse_str(a, "ab").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Fatal);
    assert_eq!(error.message, "extra unparsed data");
    assert_eq!(error.position, 1);

    assert_eq!(grammar.fullparse_str(a, "a").unwrap().next, 1);
}

#[test]
fn mapper_failure_is_fatal_at_structure_start() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let b = grammar.define(text("b")).unwrap();
    let seq = grammar
        .define(Sequence::new([a, b]).map(|values, _| {
            Err(format!("cannot combine {} values", values.len()).into())
        }))
        .unwrap();
    let source = Source::anonymous("xab");

    let error = grammar.parse(seq, &source, 1, 3).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Fatal);
    assert_eq!(error.message, "cannot combine 2 values");
    assert_eq!(error.position, 1);
}

#[test]
fn mapper_may_reject_with_no_match() {
    let mut grammar = Grammar::new();
    let keyword = grammar
        .define(Matcher::new("[a-z]+").map(|m, _| {
            if m.as_str() == "let" {
                let source = Source::anonymous(m.as_str());
                Err(grammarkit::ParseError::no_match("reserved word", &source, 0).into())
            } else {
                Ok(Some(Value::text(m.as_str())))
            }
        }))
        .unwrap();
    let fallback = grammar.define(Matcher::literal("let").map_value(|_, _| Value::text("kw"))).unwrap();
    let switch = grammar.define(Switch::new([keyword, fallback])).unwrap();

    assert_eq!(grammar.parse_str(switch, "let").unwrap().value, Some(Value::text("kw")));
    assert_eq!(grammar.parse_str(switch, "lex").unwrap().value, Some(Value::text("lex")));
}

#[test]
fn default_mappers_tag_values_with_their_structure() {
    let mut grammar = Grammar::new();
    let number = grammar.define(Matcher::new("([0-9]+)(?:\\.([0-9]+))?")).unwrap();
    let parsed = grammar.parse_str(number, "12").unwrap();
    let (tag, inner) = parsed.value.unwrap().into_tagged().unwrap();
    assert_eq!(tag, number);
    assert_eq!(inner.capture(1), Some("12"));
    assert_eq!(inner.capture(2), None);
}

// ---
// Recursion and rewiring
// ---

fn balanced(grammar: &mut Grammar) -> StructureId {
    // parens ::= "(" parens* ")"
    let open = grammar.define(Matcher::literal_placeholder("(")).unwrap();
    let close = grammar.define(Matcher::literal_placeholder(")")).unwrap();
    let parens = grammar.declare_named("parens");
    let many = grammar.declare();
    let more = grammar.define(Switch::new([many]).allow_no_match()).unwrap();
    grammar.bind(many, Sequence::new([parens, more]).flatten()).unwrap();
    let inside = grammar.define(Switch::new([many]).allow_no_match()).unwrap();
    grammar.bind(parens, Sequence::new([open, inside, close])).unwrap();
    parens
}

#[test]
fn recursive_grammars_parse_nested_input() {
    let mut grammar = Grammar::new();
    let parens = balanced(&mut grammar);

    assert_eq!(grammar.fullparse_str(parens, "(()(()))").unwrap().next, 8);
    assert!(grammar.fullparse_str(parens, "(()").is_err());
    assert_eq!(grammar.render(parens), r#"<Sequence "parens">"#);
}

#[test]
fn self_referential_rendering_terminates() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let expr = grammar.declare();
    let nested = grammar.define(Sequence::new([a, expr])).unwrap();
    grammar.bind(expr, Switch::new([nested, a])).unwrap();

    let rendered = grammar.render(expr);
    assert_eq!(
        rendered,
        r#"<Switch [<Sequence [<Matcher "a">, ...]>, <Matcher "a">]>"#
    );
}

#[test]
fn alternatives_can_be_added_and_removed() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    let b = grammar.define(text("b")).unwrap();
    let switch = grammar.define(Switch::new([a])).unwrap();
    assert!(grammar.parse_str(switch, "b").is_err());

    assert!(grammar.add_alternative(switch, b).unwrap());
    assert_eq!(grammar.parse_str(switch, "b").unwrap().value, Some(Value::text("b")));

    grammar.remove_alternative(switch, a).unwrap();
    assert_eq!(grammar.alternatives(switch), Some(&[b][..]));
    assert!(grammar.parse_str(switch, "a").is_err());
}

#[test]
fn names_can_be_changed() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();
    assert_eq!(grammar.name(a), Some("a"));
    grammar.set_name(a, Some("letter".into())).unwrap();
    assert_eq!(grammar.render(a), r#"<Matcher "letter">"#);
    grammar.set_name(a, None).unwrap();
    assert_eq!(grammar.render(a), "<Matcher /a/>");
}

#[test]
fn grammars_are_shared_between_threads() {
    let mut grammar = Grammar::new();
    let parens = balanced(&mut grammar);
    let grammar = &grammar;
    std::thread::scope(|scope| {
        for (input, next) in [("()", 2), ("(())", 4), ("()()", 2)] {
            scope.spawn(move || {
                assert_eq!(grammar.parse_str(parens, input).unwrap().next, next);
            });
        }
    });
}

// ---
// Configuration errors
// ---

#[test]
fn configuration_mistakes_are_reported() {
    let mut grammar = Grammar::new();
    let a = grammar.define(text("a")).unwrap();

    assert!(matches!(
        grammar.define(Sequence::new([])),
        Err(GrammarError::EmptySequence)
    ));
    assert!(matches!(
        grammar.define(Matcher::new("(unclosed")),
        Err(GrammarError::InvalidPattern { .. })
    ));
    assert!(matches!(
        grammar.bind(a, Matcher::literal("b")),
        Err(GrammarError::AlreadyBound(id)) if id == a
    ));
    assert!(matches!(
        grammar.add_alternative(a, a),
        Err(GrammarError::NotASwitch(_))
    ));

    let switch = grammar.define(Switch::new([a])).unwrap();
    let stray = grammar.define(text("z")).unwrap();
    assert!(matches!(
        grammar.remove_alternative(switch, stray),
        Err(GrammarError::MissingAlternative { .. })
    ));

    let mut other = Grammar::new();
    for _ in 0..10 {
        other.declare();
    }
    let foreign = other.declare();
    assert!(matches!(
        grammar.define(Sequence::new([foreign])),
        Err(GrammarError::UnknownStructure(id)) if id == foreign
    ));
    assert_eq!(grammar.kind(stray), Some(StructureKind::Matcher));
}
