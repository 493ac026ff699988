//! Owning AST rewrites.
//!
//! A [`Transform`] consumes the tree and builds a new one. Statement handlers
//! return a [`Statements`] sequence: empty deletes the node, one element
//! replaces it, several are spliced in its place. The only positions that may
//! become empty are a block's optional `program` and `inverse`.
//!
//! ```
//! use smallvec::smallvec;
//! use whisker_parser::ast::*;
//! use whisker_parser::visitor::{Statements, Transform};
//!
//! /// Drop every comment from a template.
//! struct StripComments;
//!
//! impl Transform for StripComments {
//!     fn transform_comment(&mut self, _comment: CommentStatement) -> Statements {
//!         smallvec![]
//!     }
//! }
//!
//! let program = whisker_parser::parse_without_processing(
//!     "a{{! note }}b",
//!     &Default::default(),
//! )
//! .unwrap();
//! let program = StripComments.transform_program(program);
//! assert_eq!(program.body.len(), 2);
//! ```

use crate::ast::*;
use smallvec::{SmallVec, smallvec};

/// Replacement for a single statement.
pub type Statements = SmallVec<[Statement; 1]>;

/// Trait for rebuilding AST nodes.
pub trait Transform {
    fn transform_program(&mut self, program: Program) -> Program {
        walk_program(self, program)
    }

    fn transform_statement(&mut self, statement: Statement) -> Statements {
        walk_statement(self, statement)
    }

    fn transform_mustache(&mut self, mustache: MustacheStatement) -> Statements {
        walk_mustache(self, mustache)
    }

    fn transform_block(&mut self, block: BlockStatement) -> Statements {
        walk_block(self, block)
    }

    fn transform_partial(&mut self, partial: PartialStatement) -> Statements {
        walk_partial(self, partial)
    }

    fn transform_partial_block(&mut self, partial: PartialBlockStatement) -> Statements {
        walk_partial_block(self, partial)
    }

    fn transform_content(&mut self, content: ContentStatement) -> Statements {
        smallvec![Statement::Content(content)]
    }

    fn transform_comment(&mut self, comment: CommentStatement) -> Statements {
        smallvec![Statement::Comment(comment)]
    }

    /// A block's `program` or `inverse`. Returning `None` removes it.
    fn transform_block_program(&mut self, program: Program) -> Option<Program> {
        Some(self.transform_program(program))
    }

    fn transform_expression(&mut self, expr: Expression) -> Expression {
        walk_expression(self, expr)
    }

    fn transform_sub_expression(&mut self, sexpr: SubExpression) -> Expression {
        Expression::SubExpression(walk_sub_expression(self, sexpr))
    }

    fn transform_path(&mut self, path: PathExpression) -> PathExpression {
        path
    }

    fn transform_hash(&mut self, hash: Hash) -> Hash {
        walk_hash(self, hash)
    }
}

pub fn walk_program<T: Transform + ?Sized>(transform: &mut T, program: Program) -> Program {
    let Program {
        body,
        block_params,
        chained,
        loc,
    } = program;
    let mut rebuilt = Vec::with_capacity(body.len());
    for statement in body {
        rebuilt.extend(transform.transform_statement(statement));
    }
    Program {
        body: rebuilt,
        block_params,
        chained,
        loc,
    }
}

pub fn walk_statement<T: Transform + ?Sized>(transform: &mut T, statement: Statement) -> Statements {
    match statement {
        Statement::Mustache(m) => transform.transform_mustache(m),
        Statement::Block(b) => transform.transform_block(b),
        Statement::Partial(p) => transform.transform_partial(p),
        Statement::PartialBlock(p) => transform.transform_partial_block(p),
        Statement::Content(c) => transform.transform_content(c),
        Statement::Comment(c) => transform.transform_comment(c),
    }
}

pub fn walk_mustache<T: Transform + ?Sized>(
    transform: &mut T,
    mut mustache: MustacheStatement,
) -> Statements {
    mustache.expr = transform.transform_expression(mustache.expr);
    smallvec![Statement::Mustache(mustache)]
}

pub fn walk_block<T: Transform + ?Sized>(transform: &mut T, mut block: BlockStatement) -> Statements {
    block.expr = transform.transform_expression(block.expr);
    block.program = block
        .program
        .and_then(|program| transform.transform_block_program(program));
    block.inverse = block
        .inverse
        .and_then(|inverse| transform.transform_block_program(inverse));
    if let Some(close) = block.close {
        block.close = Some(transform.transform_path(close));
    }
    smallvec![Statement::Block(block)]
}

fn walk_params<T: Transform + ?Sized>(transform: &mut T, params: Vec<Expression>) -> Vec<Expression> {
    params
        .into_iter()
        .map(|param| transform.transform_expression(param))
        .collect()
}

pub fn walk_partial<T: Transform + ?Sized>(
    transform: &mut T,
    mut partial: PartialStatement,
) -> Statements {
    partial.name = transform.transform_expression(partial.name);
    partial.params = walk_params(transform, partial.params);
    partial.hash = partial.hash.map(|hash| transform.transform_hash(hash));
    smallvec![Statement::Partial(partial)]
}

pub fn walk_partial_block<T: Transform + ?Sized>(
    transform: &mut T,
    mut partial: PartialBlockStatement,
) -> Statements {
    partial.name = transform.transform_expression(partial.name);
    partial.params = walk_params(transform, partial.params);
    partial.hash = partial.hash.map(|hash| transform.transform_hash(hash));
    partial.program = transform.transform_program(partial.program);
    smallvec![Statement::PartialBlock(partial)]
}

pub fn walk_expression<T: Transform + ?Sized>(transform: &mut T, expr: Expression) -> Expression {
    match expr {
        Expression::SubExpression(s) => transform.transform_sub_expression(s),
        Expression::Path(p) => Expression::Path(transform.transform_path(p)),
        literal => literal,
    }
}

pub fn walk_sub_expression<T: Transform + ?Sized>(
    transform: &mut T,
    mut sexpr: SubExpression,
) -> SubExpression {
    sexpr.path = transform.transform_path(sexpr.path);
    sexpr.params = walk_params(transform, sexpr.params);
    sexpr.hash = sexpr.hash.map(|hash| transform.transform_hash(hash));
    sexpr
}

pub fn walk_hash<T: Transform + ?Sized>(transform: &mut T, mut hash: Hash) -> Hash {
    hash.pairs = hash
        .pairs
        .into_iter()
        .map(|mut pair| {
            pair.value = transform.transform_expression(pair.value);
            pair
        })
        .collect();
    hash
}
