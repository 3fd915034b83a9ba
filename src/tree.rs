//! Declaration surface and the resolved context tree.
//!
//! Spec files populate a [`Suite`] through `describe`, `it`,
//! `shared_examples`, `it_behaves_like` and the guard helpers. Nothing runs at
//! declaration time: bodies are stored as deferred closures. [`Suite::build`]
//! validates the declarations, splices shared groups into their including
//! contexts and freezes the result into a [`SpecTree`] the runner walks.
//!
//! ```rust
//! use specrun::prelude::*;
//!
//! let mut suite = Suite::new();
//! suite.shared_examples("non-empty", |g| {
//!     g.it("has elements", |ex| {
//!         let items = ex.get("items")?;
//!         equals(&items.call("length", &[])?, &Value::from(2)).negate().check()?;
//!         Ok(())
//!     });
//! });
//! suite.describe("Array", |d| {
//!     d.before_each(|ex| {
//!         ex.set("items", vec![1, 2, 3]);
//!         Ok(())
//!     });
//!     d.it_behaves_like("non-empty");
//! });
//! let tree = suite.build().unwrap();
//! assert_eq!(tree.example_count(), 1);
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::errors::{ExampleResult, StructuralError};
use crate::guard::Guard;
use crate::resolve::Resolver;
use crate::scope::ExampleScope;
use crate::value::Value;

/// Path reported for declarations made directly on a [`Suite`].
pub const SUITE_ROOT: &str = "<suite root>";

/// Deferred example body or hook.
pub type Body = Rc<dyn Fn(&mut ExampleScope<'_>) -> ExampleResult>;

// ============================================================================
// DECLARATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DeclId(pub(crate) usize);

pub(crate) struct ContextDecl {
    pub(crate) description: Option<String>,
    pub(crate) parent: Option<DeclId>,
    pub(crate) guards: Vec<Guard>,
    pub(crate) items: Vec<Item>,
    pub(crate) before_each: Vec<Body>,
    pub(crate) after_each: Vec<Body>,
}

pub(crate) enum Item {
    Context(DeclId),
    Example {
        description: Option<String>,
        body: Body,
    },
    Include {
        name: String,
        arg: Option<Value>,
    },
}

/// A collection of declarations, the unit that is built and run.
#[derive(Default)]
pub struct Suite {
    pub(crate) contexts: Vec<ContextDecl>,
    pub(crate) roots: Vec<DeclId>,
    pub(crate) shared: HashMap<String, DeclId>,
    errors: Vec<StructuralError>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a top-level context.
    pub fn describe<F>(&mut self, description: impl Into<String>, block: F)
    where
        F: FnOnce(&mut ContextBuilder<'_>),
    {
        let id = self.push_context(Some(description.into()), None, Vec::new());
        self.roots.push(id);
        block(&mut ContextBuilder { suite: self, id });
    }

    /// Declares a top-level context that only runs when `guard` admits the configuration.
    pub fn describe_guarded<F>(&mut self, description: impl Into<String>, guard: Guard, block: F)
    where
        F: FnOnce(&mut ContextBuilder<'_>),
    {
        let id = self.push_context(Some(description.into()), None, vec![guard]);
        self.roots.push(id);
        block(&mut ContextBuilder { suite: self, id });
    }

    /// Registers a named bundle of declarations for `it_behaves_like`.
    pub fn shared_examples<F>(&mut self, name: impl Into<String>, block: F)
    where
        F: FnOnce(&mut ContextBuilder<'_>),
    {
        let name = name.into();
        let id = self.push_context(None, None, Vec::new());
        if self.shared.insert(name.clone(), id).is_some() {
            self.errors.push(StructuralError::DuplicateSharedGroup {
                context: SUITE_ROOT.to_string(),
                name: name.clone(),
            });
        }
        block(&mut ContextBuilder { suite: self, id });
    }

    /// Validates and resolves the declarations into an executable tree.
    pub fn build(mut self) -> Result<SpecTree, StructuralError> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }
        let tree = Resolver::new(&self).resolve()?;
        debug!(
            roots = tree.roots().len(),
            contexts = tree.contexts.len(),
            examples = tree.example_count(),
            shared_groups = self.shared.len(),
            "resolved spec tree"
        );
        Ok(tree)
    }

    fn push_context(
        &mut self,
        description: Option<String>,
        parent: Option<DeclId>,
        guards: Vec<Guard>,
    ) -> DeclId {
        let id = DeclId(self.contexts.len());
        self.contexts.push(ContextDecl {
            description,
            parent,
            guards,
            items: Vec::new(),
            before_each: Vec::new(),
            after_each: Vec::new(),
        });
        id
    }

    /// Space-separated descriptions from the root down to `id`.
    pub(crate) fn decl_path(&self, id: DeclId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(DeclId(index)) = current {
            let decl = &self.contexts[index];
            if let Some(description) = &decl.description {
                parts.push(description.as_str());
            }
            current = decl.parent;
        }
        if parts.is_empty() {
            return "<shared group>".to_string();
        }
        parts.reverse();
        parts.join(" ")
    }
}

/// Declaration scope of one context; handed to `describe` blocks.
pub struct ContextBuilder<'s> {
    suite: &'s mut Suite,
    id: DeclId,
}

impl ContextBuilder<'_> {
    fn decl(&mut self) -> &mut ContextDecl {
        &mut self.suite.contexts[self.id.0]
    }

    fn nested<F>(&mut self, description: Option<String>, guards: Vec<Guard>, block: F)
    where
        F: FnOnce(&mut ContextBuilder<'_>),
    {
        let id = self.suite.push_context(description, Some(self.id), guards);
        self.decl().items.push(Item::Context(id));
        block(&mut ContextBuilder {
            suite: &mut *self.suite,
            id,
        });
    }

    pub fn describe<F>(&mut self, description: impl Into<String>, block: F)
    where
        F: FnOnce(&mut ContextBuilder<'_>),
    {
        self.nested(Some(description.into()), Vec::new(), block);
    }

    pub fn describe_guarded<F>(&mut self, description: impl Into<String>, guard: Guard, block: F)
    where
        F: FnOnce(&mut ContextBuilder<'_>),
    {
        self.nested(Some(description.into()), vec![guard], block);
    }

    /// Declarations in `block` only run when the target version lies in `range`.
    ///
    /// A malformed range is reported by [`Suite::build`].
    pub fn version_is<F>(&mut self, range: &str, block: F)
    where
        F: FnOnce(&mut ContextBuilder<'_>),
    {
        let guards = match Guard::version(range) {
            Ok(guard) => vec![guard],
            Err(reason) => {
                let context = self.suite.decl_path(self.id);
                self.suite.errors.push(StructuralError::MalformedGuard {
                    context,
                    guard: range.to_string(),
                    reason,
                });
                Vec::new()
            }
        };
        self.nested(None, guards, block);
    }

    pub fn platform_is<F>(&mut self, platforms: &[&str], block: F)
    where
        F: FnOnce(&mut ContextBuilder<'_>),
    {
        self.nested(None, vec![Guard::platform_is(platforms)], block);
    }

    pub fn platform_is_not<F>(&mut self, platforms: &[&str], block: F)
    where
        F: FnOnce(&mut ContextBuilder<'_>),
    {
        self.nested(None, vec![Guard::platform_is_not(platforms)], block);
    }

    pub fn it<F>(&mut self, description: impl Into<String>, body: F)
    where
        F: Fn(&mut ExampleScope<'_>) -> ExampleResult + 'static,
    {
        self.decl().items.push(Item::Example {
            description: Some(description.into()),
            body: Rc::new(body),
        });
    }

    /// An example without a description.
    pub fn specify<F>(&mut self, body: F)
    where
        F: Fn(&mut ExampleScope<'_>) -> ExampleResult + 'static,
    {
        self.decl().items.push(Item::Example {
            description: None,
            body: Rc::new(body),
        });
    }

    pub fn it_behaves_like(&mut self, name: impl Into<String>) {
        self.decl().items.push(Item::Include {
            name: name.into(),
            arg: None,
        });
    }

    /// Includes a shared group, handing `arg` to its examples via
    /// [`ExampleScope::shared_arg`].
    pub fn it_behaves_like_with(&mut self, name: impl Into<String>, arg: impl Into<Value>) {
        self.decl().items.push(Item::Include {
            name: name.into(),
            arg: Some(arg.into()),
        });
    }

    /// Runs before every example in this context and its descendants.
    pub fn before_each<F>(&mut self, hook: F)
    where
        F: Fn(&mut ExampleScope<'_>) -> ExampleResult + 'static,
    {
        self.decl().before_each.push(Rc::new(hook));
    }

    /// Runs after every example in this context and its descendants, whatever the outcome.
    pub fn after_each<F>(&mut self, hook: F)
    where
        F: Fn(&mut ExampleScope<'_>) -> ExampleResult + 'static,
    {
        self.decl().after_each.push(Rc::new(hook));
    }
}

// ============================================================================
// RESOLVED TREE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub(crate) usize);

/// A context after shared-group resolution.
pub struct Context {
    pub(crate) description: Option<String>,
    pub(crate) parent: Option<ContextId>,
    pub(crate) guards: Vec<Guard>,
    pub(crate) children: Vec<Child>,
    pub(crate) before_each: Vec<Body>,
    pub(crate) after_each: Vec<Body>,
    /// Argument of the latest inclusion into this context, if it had one.
    pub(crate) shared_arg: Option<Value>,
}

impl Context {
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parent(&self) -> Option<ContextId> {
        self.parent
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn shared_arg(&self) -> Option<&Value> {
        self.shared_arg.as_ref()
    }
}

pub enum Child {
    Context(ContextId),
    Example(Example),
}

pub struct Example {
    pub(crate) description: Option<String>,
    pub(crate) body: Body,
    pub(crate) shared_arg: Option<Value>,
}

impl Example {
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn shared_arg(&self) -> Option<&Value> {
        self.shared_arg.as_ref()
    }
}

/// The frozen, executable tree produced by [`Suite::build`].
pub struct SpecTree {
    pub(crate) contexts: Vec<Context>,
    pub(crate) roots: Vec<ContextId>,
}

impl SpecTree {
    pub fn roots(&self) -> &[ContextId] {
        &self.roots
    }

    pub fn context(&self, id: ContextId) -> &Context {
        &self.contexts[id.0]
    }

    pub fn example_count(&self) -> usize {
        self.contexts
            .iter()
            .flat_map(|c| &c.children)
            .filter(|child| matches!(child, Child::Example(_)))
            .count()
    }

    /// Contexts from the root down to `id`, inclusive.
    pub fn ancestry(&self, id: ContextId) -> Vec<ContextId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(ctx) = current {
            chain.push(ctx);
            current = self.context(ctx).parent;
        }
        chain.reverse();
        chain
    }

    /// Descriptions of the named contexts from the root down to `id`.
    pub fn path(&self, id: ContextId) -> Vec<String> {
        self.ancestry(id)
            .into_iter()
            .filter_map(|ctx| self.context(ctx).description.clone())
            .collect()
    }
}
