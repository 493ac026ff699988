//! Whitespace control.
//!
//! Applies `~` strip markers and removes the lines of standalone tags: a
//! block, partial or comment tag that is alone on its line takes the line's
//! indentation and newline with it. Standalone checks always read a content
//! node's `original` text, so earlier stripping never changes a later
//! decision.

use crate::ast::*;
use crate::visitor::{Statements, Transform};
use smallvec::smallvec;

/// What a statement asks of its neighbours.
#[derive(Debug, Clone, Copy, Default)]
struct StripInfo {
    open: bool,
    close: bool,
    /// Block opening tag may be standalone.
    open_standalone: bool,
    /// Block closing tag may be standalone.
    close_standalone: bool,
    /// The whole tag may be standalone (partials and comments).
    inline_standalone: bool,
}

/// The whitespace-control pass. Run once per tree, on the root program.
#[derive(Debug, Default)]
pub struct WhitespaceControl {
    ignore_standalone: bool,
    root_seen: bool,
}

impl WhitespaceControl {
    pub fn new(ignore_standalone: bool) -> Self {
        WhitespaceControl {
            ignore_standalone,
            root_seen: false,
        }
    }

    fn strip_info(&self, statement: &Statement) -> Option<StripInfo> {
        match statement {
            Statement::Mustache(m) => Some(StripInfo {
                open: m.strip.open,
                close: m.strip.close,
                ..StripInfo::default()
            }),
            Statement::Partial(PartialStatement { strip, .. })
            | Statement::Comment(CommentStatement { strip, .. }) => Some(StripInfo {
                open: strip.open,
                close: strip.close,
                inline_standalone: true,
                ..StripInfo::default()
            }),
            Statement::Block(block) => {
                let mut info = StripInfo {
                    open: block.open_strip.open,
                    close: block.close_strip.close,
                    ..StripInfo::default()
                };
                let main = block.program.as_ref().or(block.inverse.as_ref());
                if let Some(main) = main {
                    let inverse = block.program.as_ref().and(block.inverse.as_ref());
                    let first = inverse.and_then(first_inverse).unwrap_or(main);
                    info.open_standalone = is_next_whitespace(&main.body, None, false);
                    info.close_standalone = is_prev_whitespace(&first.body, None, false);
                }
                Some(info)
            }
            Statement::PartialBlock(partial) => Some(StripInfo {
                open: partial.open_strip.open,
                close: partial.close_strip.close,
                open_standalone: is_next_whitespace(&partial.program.body, None, false),
                close_standalone: is_prev_whitespace(&partial.program.body, None, false),
                inline_standalone: false,
            }),
            Statement::Content(_) => None,
        }
    }

    /// Strip markers and the standalone `{{else}}` inside a block.
    fn strip_block_inner(&self, block: &mut BlockStatement) {
        let open_strip = block.open_strip;
        let inverse_strip = block.inverse_strip;
        let close_strip = block.close_strip;

        match (block.program.as_mut(), block.inverse.as_mut()) {
            (Some(program), Some(inverse)) => {
                let standalone_else = !self.ignore_standalone
                    && is_prev_whitespace(&program.body, None, false)
                    && first_inverse(inverse)
                        .is_some_and(|first| is_next_whitespace(&first.body, None, false));

                if open_strip.close {
                    omit_right(&mut program.body, None, true);
                }
                if inverse_strip.open {
                    omit_left(&mut program.body, None, true);
                }
                if inverse_strip.close
                    && let Some(first) = first_inverse_mut(inverse)
                {
                    omit_right(&mut first.body, None, true);
                }
                if close_strip.open
                    && let Some(last) = last_inverse_mut(inverse)
                {
                    omit_left(&mut last.body, None, true);
                }
                if standalone_else {
                    tracing::trace!("standalone inverse tag");
                    omit_left(&mut program.body, None, false);
                    if let Some(first) = first_inverse_mut(inverse) {
                        omit_right(&mut first.body, None, false);
                    }
                }
            }
            (Some(program), None) | (None, Some(program)) => {
                if open_strip.close {
                    omit_right(&mut program.body, None, true);
                }
                if close_strip.open {
                    omit_left(&mut program.body, None, true);
                }
            }
            (None, None) => {}
        }
    }
}

impl Transform for WhitespaceControl {
    fn transform_program(&mut self, program: Program) -> Program {
        let is_root = !self.root_seen;
        self.root_seen = true;

        let mut program = crate::visitor::transform::walk_program(self, program);
        let body = &mut program.body;
        let standalone = !self.ignore_standalone;

        for i in 0..body.len() {
            let Some(strip) = self.strip_info(&body[i]) else {
                continue;
            };
            let prev_whitespace = is_prev_whitespace(body, Some(i), is_root);
            let next_whitespace = is_next_whitespace(body, Some(i), is_root);
            let open_standalone = strip.open_standalone && prev_whitespace;
            let close_standalone = strip.close_standalone && next_whitespace;
            let inline_standalone = strip.inline_standalone && prev_whitespace && next_whitespace;

            if strip.close {
                omit_right(body, Some(i), true);
            }
            if strip.open {
                omit_left(body, Some(i), true);
            }

            if standalone && inline_standalone {
                omit_right(body, Some(i), false);
                if omit_left(body, Some(i), false) {
                    let indent = trailing_indent(&body[i - 1]);
                    if let Statement::Partial(partial) = &mut body[i] {
                        partial.indent = indent;
                    }
                }
                tracing::trace!(index = i, kind = body[i].type_name(), "standalone tag");
            }

            if standalone && open_standalone {
                if let Some(main) = open_program_mut(&mut body[i]) {
                    omit_right(&mut main.body, None, false);
                }
                omit_left(body, Some(i), false);
                tracing::trace!(index = i, "standalone opening tag");
            }

            if standalone && close_standalone {
                omit_right(body, Some(i), false);
                if let Some(last) = close_program_mut(&mut body[i]) {
                    omit_left(&mut last.body, None, false);
                }
                tracing::trace!(index = i, "standalone closing tag");
            }
        }

        program
    }

    fn transform_block(&mut self, mut block: BlockStatement) -> Statements {
        block.program = block.program.map(|p| self.transform_program(p));
        block.inverse = block.inverse.map(|p| self.transform_program(p));
        self.strip_block_inner(&mut block);
        smallvec![Statement::Block(block)]
    }

    fn transform_partial_block(&mut self, mut partial: PartialBlockStatement) -> Statements {
        partial.program = self.transform_program(partial.program);
        if partial.open_strip.close {
            omit_right(&mut partial.program.body, None, true);
        }
        if partial.close_strip.open {
            omit_left(&mut partial.program.body, None, true);
        }
        smallvec![Statement::PartialBlock(partial)]
    }

    fn transform_expression(&mut self, expr: Expression) -> Expression {
        expr
    }
}

/// The program right after an opening tag.
fn open_program_mut(statement: &mut Statement) -> Option<&mut Program> {
    match statement {
        Statement::Block(block) => block.program.as_mut().or(block.inverse.as_mut()),
        Statement::PartialBlock(partial) => Some(&mut partial.program),
        _ => None,
    }
}

/// The program right before a closing tag, as seen from the enclosing body.
fn close_program_mut(statement: &mut Statement) -> Option<&mut Program> {
    match statement {
        Statement::Block(block) => block.inverse.as_mut().or(block.program.as_mut()),
        Statement::PartialBlock(partial) => Some(&mut partial.program),
        _ => None,
    }
}

/// For a chained inverse, the program of its first `{{else if}}` block.
fn first_inverse(inverse: &Program) -> Option<&Program> {
    if !inverse.chained {
        return Some(inverse);
    }
    match inverse.body.first() {
        Some(Statement::Block(block)) => block.program.as_ref(),
        _ => None,
    }
}

fn first_inverse_mut(inverse: &mut Program) -> Option<&mut Program> {
    if inverse.chained {
        match inverse.body.first_mut() {
            Some(Statement::Block(block)) => block.program.as_mut(),
            _ => None,
        }
    } else {
        Some(inverse)
    }
}

/// Follow a chain of `{{else if}}` blocks down to the last one's program.
fn last_inverse_mut(inverse: &mut Program) -> Option<&mut Program> {
    if inverse.chained {
        match inverse.body.last_mut() {
            Some(Statement::Block(block)) => block.program.as_mut().and_then(last_inverse_mut),
            _ => None,
        }
    } else {
        Some(inverse)
    }
}

fn trailing_whitespace(text: &str) -> &str {
    &text[text.trim_end().len()..]
}

fn leading_whitespace(text: &str) -> &str {
    &text[..text.len() - text.trim_start().len()]
}

/// Whether the statement before `i` (or the last one) ends its line with
/// nothing but whitespace.
fn is_prev_whitespace(body: &[Statement], i: Option<usize>, is_root: bool) -> bool {
    let i = i.unwrap_or(body.len());
    let Some(prev) = i.checked_sub(1).and_then(|p| body.get(p)) else {
        return is_root;
    };
    let has_sibling = i >= 2;
    match prev {
        Statement::Content(content) => {
            let tail = trailing_whitespace(&content.original);
            tail.contains('\n') || (!has_sibling && is_root && tail.len() == content.original.len())
        }
        _ => false,
    }
}

/// Whether the statement after `i` (or the first one) starts with nothing
/// but whitespace up to its first newline.
fn is_next_whitespace(body: &[Statement], i: Option<usize>, is_root: bool) -> bool {
    let next = i.map_or(0, |i| i + 1);
    let Some(statement) = body.get(next) else {
        return is_root;
    };
    let has_sibling = body.len() > next + 1;
    match statement {
        Statement::Content(content) => {
            let head = leading_whitespace(&content.original);
            head.contains('\n') || (!has_sibling && is_root && head.len() == content.original.len())
        }
        _ => false,
    }
}

/// Strip leading whitespace from the content after `i` (or the first
/// statement). Without `multiple`, only up to and including one newline.
fn omit_right(body: &mut [Statement], i: Option<usize>, multiple: bool) -> bool {
    let index = i.map_or(0, |i| i + 1);
    let Some(Statement::Content(content)) = body.get_mut(index) else {
        return false;
    };
    if !multiple && content.right_stripped {
        return false;
    }
    let value = content.value.as_str();
    let stripped = if multiple {
        value.trim_start()
    } else {
        let rest = value.trim_start_matches([' ', '\t']);
        let rest = rest.strip_prefix('\r').unwrap_or(rest);
        rest.strip_prefix('\n').unwrap_or(rest)
    };
    content.right_stripped = stripped.len() != value.len();
    if content.right_stripped {
        content.value = stripped.to_string();
    }
    content.right_stripped
}

/// Strip trailing whitespace from the content before `i` (or the last
/// statement). Without `multiple`, only spaces and tabs.
fn omit_left(body: &mut [Statement], i: Option<usize>, multiple: bool) -> bool {
    let index = match i {
        Some(i) => i.checked_sub(1),
        None => body.len().checked_sub(1),
    };
    let Some(Statement::Content(content)) = index.and_then(|index| body.get_mut(index)) else {
        return false;
    };
    if !multiple && content.left_stripped {
        return false;
    }
    let value = content.value.as_str();
    let stripped = if multiple {
        value.trim_end()
    } else {
        value.trim_end_matches([' ', '\t'])
    };
    content.left_stripped = stripped.len() != value.len();
    if content.left_stripped {
        content.value = stripped.to_string();
    }
    content.left_stripped
}

/// The `[ \t]+` run ending the previous content's original text.
fn trailing_indent(statement: &Statement) -> String {
    match statement {
        Statement::Content(content) => {
            let original = content.original.as_str();
            let kept = original.trim_end_matches([' ', '\t']).len();
            original[kept..].to_string()
        }
        _ => String::new(),
    }
}
