//! Whitespace control: `~` markers and standalone lines.

use whisker_parser::*;

fn parse_ok(source: &str) -> Program {
    parse(source, &ParseOptions::default()).unwrap()
}

fn values(program: &Program) -> Vec<String> {
    program
        .body
        .iter()
        .filter_map(|s| s.as_content().map(|c| c.value.clone()))
        .collect()
}

fn block(program: &Program, index: usize) -> &BlockStatement {
    match &program.body[index] {
        Statement::Block(b) => b,
        other => panic!("expected a block, got {}", other.type_name()),
    }
}

// ===== Strip markers =====

#[test]
fn test_tilde_strips_all_whitespace() {
    let program = parse_ok("a  \n {{~foo~}} \n b");
    assert_eq!(values(&program), vec!["a", "b"]);
}

#[test]
fn test_tilde_on_block_tags() {
    let program = parse_ok("{{#if x~}}  in  {{~/if}}");
    let inner = block(&program, 0).program.as_ref().unwrap();
    assert_eq!(values(inner), vec!["in"]);
}

#[test]
fn test_tilde_on_else() {
    let program = parse_ok("{{#if x}} a {{~else~}} b {{/if}}");
    let b = block(&program, 0);
    assert_eq!(values(b.program.as_ref().unwrap()), vec![" a"]);
    assert_eq!(values(b.inverse.as_ref().unwrap()), vec!["b "]);
}

#[test]
fn test_original_text_is_kept() {
    let program = parse_ok("a  {{~foo}}");
    let content = program.body[0].as_content().unwrap();
    assert_eq!(content.value, "a");
    assert_eq!(content.original, "a  ");
}

// ===== Standalone lines =====

#[test]
fn test_standalone_block_lines_are_removed() {
    let program = parse_ok("{{#if a}}\n  X\n{{/if}}\n");
    let inner = block(&program, 0).program.as_ref().unwrap();
    assert_eq!(values(inner), vec!["  X\n"]);
    assert_eq!(values(&program), vec![""]);
}

#[test]
fn test_indented_standalone_block() {
    let program = parse_ok("  {{#each xs}}\n  - {{.}}\n  {{/each}}\n");
    assert_eq!(values(&program), vec!["", ""]);
    let inner = block(&program, 1).program.as_ref().unwrap();
    assert_eq!(values(inner), vec!["  - ", "\n"]);
}

#[test]
fn test_standalone_else() {
    let program = parse_ok("{{#if a}}\nyes\n{{else}}\nno\n{{/if}}\n");
    let b = block(&program, 0);
    assert_eq!(values(b.program.as_ref().unwrap()), vec!["yes\n"]);
    assert_eq!(values(b.inverse.as_ref().unwrap()), vec!["no\n"]);
}

#[test]
fn test_standalone_comment() {
    let program = parse_ok("{{! note }}\nhello");
    assert_eq!(values(&program), vec!["hello"]);
}

#[test]
fn test_standalone_partial_records_indent() {
    let program = parse_ok("a\n  {{> p}}\nb");
    assert_eq!(values(&program), vec!["a\n", "b"]);
    match &program.body[1] {
        Statement::Partial(p) => assert_eq!(p.indent, "  "),
        other => panic!("unexpected {}", other.type_name()),
    }
}

#[test]
fn test_mustache_is_never_standalone() {
    let program = parse_ok("  {{foo}}\n");
    assert_eq!(values(&program), vec!["  ", "\n"]);
}

#[test]
fn test_tag_with_text_on_line_is_not_standalone() {
    let program = parse_ok("x {{! c }}\ny");
    assert_eq!(values(&program), vec!["x ", "\ny"]);
}

#[test]
fn test_ignore_standalone_keeps_lines() {
    let options = ParseOptions {
        ignore_standalone: true,
        ..ParseOptions::default()
    };
    let program = parse("{{#if a}}\nX\n{{/if}}", &options).unwrap();
    let inner = block(&program, 0).program.as_ref().unwrap();
    assert_eq!(values(inner), vec!["\nX\n"]);
}

#[test]
fn test_ignore_standalone_still_applies_tilde() {
    let options = ParseOptions {
        ignore_standalone: true,
        ..ParseOptions::default()
    };
    let program = parse("a {{~! c ~}} b", &options).unwrap();
    assert_eq!(values(&program), vec!["a", "b"]);
}

#[test]
fn test_without_processing_keeps_whitespace() {
    let program = parse_without_processing("{{! c }}\nhello", &ParseOptions::default()).unwrap();
    assert_eq!(values(&program), vec!["\nhello"]);
}
