//! Visitor pattern for AST traversal.
//!
//! [`Visitor`] borrows the tree and observes it; [`Transform`] consumes it and
//! rebuilds a new one. Every per-node method has a default that walks into the
//! node's children, so an implementation only overrides the node kinds it
//! cares about.

pub mod transform;
pub mod walk;

pub use transform::{Statements, Transform};

use crate::ast::*;

/// Trait for visiting AST nodes.
pub trait Visitor {
    fn visit_program(&mut self, program: &Program) {
        walk::walk_program(self, program);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk::walk_statement(self, statement);
    }

    fn visit_mustache(&mut self, mustache: &MustacheStatement) {
        walk::walk_mustache(self, mustache);
    }

    fn visit_block(&mut self, block: &BlockStatement) {
        walk::walk_block(self, block);
    }

    fn visit_partial(&mut self, partial: &PartialStatement) {
        walk::walk_partial(self, partial);
    }

    fn visit_partial_block(&mut self, partial: &PartialBlockStatement) {
        walk::walk_partial_block(self, partial);
    }

    fn visit_content(&mut self, _content: &ContentStatement) {}

    fn visit_comment(&mut self, _comment: &CommentStatement) {}

    fn visit_expression(&mut self, expr: &Expression) {
        walk::walk_expression(self, expr);
    }

    fn visit_sub_expression(&mut self, sexpr: &SubExpression) {
        walk::walk_sub_expression(self, sexpr);
    }

    fn visit_path(&mut self, _path: &PathExpression) {}

    fn visit_string(&mut self, _literal: &StringLiteral) {}

    fn visit_number(&mut self, _literal: &NumberLiteral) {}

    fn visit_boolean(&mut self, _literal: &BooleanLiteral) {}

    fn visit_undefined(&mut self, _literal: &UndefinedLiteral) {}

    fn visit_null(&mut self, _literal: &NullLiteral) {}

    fn visit_hash(&mut self, hash: &Hash) {
        walk::walk_hash(self, hash);
    }

    fn visit_hash_pair(&mut self, pair: &HashPair) {
        walk::walk_hash_pair(self, pair);
    }
}
