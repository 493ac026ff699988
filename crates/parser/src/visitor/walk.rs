//! Default traversal for [`Visitor`]: children in source order.

use super::Visitor;
use crate::ast::*;

pub fn walk_program<V: Visitor + ?Sized>(visitor: &mut V, program: &Program) {
    for statement in &program.body {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Mustache(m) => visitor.visit_mustache(m),
        Statement::Block(b) => visitor.visit_block(b),
        Statement::Partial(p) => visitor.visit_partial(p),
        Statement::PartialBlock(p) => visitor.visit_partial_block(p),
        Statement::Content(c) => visitor.visit_content(c),
        Statement::Comment(c) => visitor.visit_comment(c),
    }
}

pub fn walk_mustache<V: Visitor + ?Sized>(visitor: &mut V, mustache: &MustacheStatement) {
    visitor.visit_expression(&mustache.expr);
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &BlockStatement) {
    visitor.visit_expression(&block.expr);
    if let Some(program) = &block.program {
        visitor.visit_program(program);
    }
    if let Some(inverse) = &block.inverse {
        visitor.visit_program(inverse);
    }
}

fn walk_partial_call<V: Visitor + ?Sized>(
    visitor: &mut V,
    name: &Expression,
    params: &[Expression],
    hash: Option<&Hash>,
) {
    visitor.visit_expression(name);
    for param in params {
        visitor.visit_expression(param);
    }
    if let Some(hash) = hash {
        visitor.visit_hash(hash);
    }
}

pub fn walk_partial<V: Visitor + ?Sized>(visitor: &mut V, partial: &PartialStatement) {
    walk_partial_call(visitor, &partial.name, &partial.params, partial.hash.as_ref());
}

pub fn walk_partial_block<V: Visitor + ?Sized>(visitor: &mut V, partial: &PartialBlockStatement) {
    walk_partial_call(visitor, &partial.name, &partial.params, partial.hash.as_ref());
    visitor.visit_program(&partial.program);
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::SubExpression(s) => visitor.visit_sub_expression(s),
        Expression::Path(p) => visitor.visit_path(p),
        Expression::String(s) => visitor.visit_string(s),
        Expression::Number(n) => visitor.visit_number(n),
        Expression::Boolean(b) => visitor.visit_boolean(b),
        Expression::Undefined(u) => visitor.visit_undefined(u),
        Expression::Null(n) => visitor.visit_null(n),
    }
}

pub fn walk_sub_expression<V: Visitor + ?Sized>(visitor: &mut V, sexpr: &SubExpression) {
    visitor.visit_path(&sexpr.path);
    for param in &sexpr.params {
        visitor.visit_expression(param);
    }
    if let Some(hash) = &sexpr.hash {
        visitor.visit_hash(hash);
    }
}

pub fn walk_hash<V: Visitor + ?Sized>(visitor: &mut V, hash: &Hash) {
    for pair in &hash.pairs {
        visitor.visit_hash_pair(pair);
    }
}

pub fn walk_hash_pair<V: Visitor + ?Sized>(visitor: &mut V, pair: &HashPair) {
    visitor.visit_expression(&pair.value);
}
