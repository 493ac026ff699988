//! Persistent lookup scopes.
//!
//! A sub-program extends its caller's scope without copying it: contexts,
//! block parameter frames and data frames are all shared linked lists.

use super::value::{Object, Value};
use crate::bytecode::{ProgramId, TemplateSpec};
use std::rc::Rc;
use std::sync::Arc;

pub(crate) struct Stack<T>(Option<Rc<Link<T>>>);

struct Link<T> {
    head: T,
    tail: Stack<T>,
}

impl<T> Clone for Stack<T> {
    fn clone(&self) -> Self {
        Stack(self.0.clone())
    }
}

impl<T> Stack<T> {
    pub(crate) fn new() -> Self {
        Stack(None)
    }

    pub(crate) fn push(&self, head: T) -> Self {
        Stack(Some(Rc::new(Link {
            head,
            tail: self.clone(),
        })))
    }

    pub(crate) fn peek(&self) -> Option<&T> {
        self.0.as_ref().map(|link| &link.head)
    }

    /// The element `depth` links below the top.
    pub(crate) fn get(&self, depth: usize) -> Option<&T> {
        self.iter().nth(depth)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::successors(self.0.as_deref(), |&link| link.tail.0.as_deref())
            .map(|link| &link.head)
    }
}

/// Body of the innermost partial block, rendered by `{{> @partial-block}}`.
pub(crate) struct PartialBlock {
    pub(crate) template: Arc<TemplateSpec>,
    pub(crate) program: ProgramId,
    /// Scope at the call site of the partial.
    pub(crate) scope: Scope,
}

/// `@data` variables. Lookups fall through to enclosing frames; `@../name`
/// starts at the parent.
#[derive(Clone)]
pub(crate) struct DataFrame(Rc<DataNode>);

struct DataNode {
    values: Object,
    parent: Option<DataFrame>,
    partial_block: Option<Rc<PartialBlock>>,
}

impl DataFrame {
    pub(crate) fn root(values: Object) -> Self {
        DataFrame(Rc::new(DataNode {
            values,
            parent: None,
            partial_block: None,
        }))
    }

    pub(crate) fn child(&self, values: Object) -> Self {
        DataFrame(Rc::new(DataNode {
            values,
            parent: Some(self.clone()),
            partial_block: self.0.partial_block.clone(),
        }))
    }

    pub(crate) fn with_partial_block(&self, block: Option<Rc<PartialBlock>>) -> Self {
        DataFrame(Rc::new(DataNode {
            values: Object::new(),
            parent: Some(self.clone()),
            partial_block: block,
        }))
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Value> {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if let Some(value) = current.0.values.get(name) {
                return Some(value);
            }
            frame = current.0.parent.as_ref();
        }
        None
    }

    pub(crate) fn ancestor(&self, depth: u32) -> Option<&DataFrame> {
        let mut frame = self;
        for _ in 0..depth {
            frame = frame.0.parent.as_ref()?;
        }
        Some(frame)
    }

    pub(crate) fn partial_block(&self) -> Option<&Rc<PartialBlock>> {
        self.0.partial_block.as_ref()
    }
}

#[derive(Clone)]
pub(crate) struct Scope {
    pub(crate) contexts: Stack<Value>,
    pub(crate) block_params: Stack<Rc<[Value]>>,
    pub(crate) data: DataFrame,
}

impl Scope {
    pub(crate) fn new(context: Value, data: DataFrame, block_params: &[Value]) -> Self {
        Scope {
            contexts: Stack::new().push(context),
            block_params: Stack::new().push(Rc::from(block_params)),
            data,
        }
    }

    pub(crate) fn context(&self) -> &Value {
        self.contexts.peek().unwrap_or(Value::undefined())
    }

    /// Scope of a sub-program. The context is pushed only when it differs
    /// from the current one; a block parameter frame is always pushed.
    pub(crate) fn enter(&self, context: Value, block_params: Vec<Value>, data: DataFrame) -> Self {
        let contexts = if self.context().same(&context) {
            self.contexts.clone()
        } else {
            self.contexts.push(context)
        };
        Scope {
            contexts,
            block_params: self.block_params.push(Rc::from(block_params)),
            data,
        }
    }

    /// Scope of a partial: the caller's contexts stay reachable through
    /// `../`, block parameters do not.
    pub(crate) fn for_partial(&self, context: Value, data: DataFrame) -> Self {
        let contexts = if self.context().same(&context) {
            self.contexts.clone()
        } else {
            self.contexts.push(context)
        };
        Scope {
            contexts,
            block_params: Stack::new().push(Rc::from(Vec::<Value>::new())),
            data,
        }
    }

    pub(crate) fn block_param(&self, depth: usize, index: usize) -> Value {
        self.block_params
            .get(depth)
            .and_then(|frame| frame.get(index))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_is_persistent() {
        let base = Stack::new().push(1).push(2);
        let extended = base.push(3);
        assert_eq!(base.iter().copied().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(extended.get(0), Some(&3));
        assert_eq!(extended.get(2), Some(&1));
        assert_eq!(extended.get(3), None);
    }

    #[test]
    fn test_data_frames_fall_through() {
        let mut values = Object::new();
        values.insert("root".into(), Value::from("r"));
        let root = DataFrame::root(values);
        let mut values = Object::new();
        values.insert("index".into(), Value::from(1usize));
        let child = root.child(values);

        assert_eq!(child.get("root"), Some(&Value::from("r")));
        assert_eq!(child.get("index"), Some(&Value::Int(1)));
        assert!(child.ancestor(1).unwrap().get("index").is_none());
        assert!(child.ancestor(2).is_none());
    }

    #[test]
    fn test_enter_skips_same_context() {
        let ctx = Value::from(serde_json::json!({"a": 1}));
        let scope = Scope::new(ctx.clone(), DataFrame::root(Object::new()), &[]);
        let same = scope.enter(ctx, Vec::new(), scope.data.clone());
        assert_eq!(same.contexts.iter().count(), 1);
        assert_eq!(same.block_params.iter().count(), 2);

        let other = scope.enter(Value::from("x"), Vec::new(), scope.data.clone());
        assert_eq!(other.contexts.iter().count(), 2);
    }
}
