//! Shared-group resolution.
//!
//! Every `it_behaves_like` is expanded in place: the group's examples and
//! nested contexts land at the inclusion point and its hooks are merged into
//! the including context, exactly as if the group body had been written there.
//! An inclusion argument travels with the spliced examples and is also recorded
//! on the including context for its own examples.
//! Undefined and cyclic inclusions are reported before anything runs.

use std::rc::Rc;

use tracing::trace;

use crate::errors::StructuralError;
use crate::tree::{Child, Context, ContextId, DeclId, Example, Item, SpecTree, Suite};
use crate::value::Value;

pub(crate) struct Resolver<'a> {
    suite: &'a Suite,
    contexts: Vec<Context>,
    /// Names of the groups currently being expanded, outermost first.
    chain: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(suite: &'a Suite) -> Self {
        Self {
            suite,
            contexts: Vec::new(),
            chain: Vec::new(),
        }
    }

    pub(crate) fn resolve(mut self) -> Result<SpecTree, StructuralError> {
        let mut roots = Vec::with_capacity(self.suite.roots.len());
        for &root in &self.suite.roots {
            roots.push(self.resolve_context(root, None, None)?);
        }
        Ok(SpecTree {
            contexts: self.contexts,
            roots,
        })
    }

    fn resolve_context(
        &mut self,
        decl_id: DeclId,
        parent: Option<ContextId>,
        arg: Option<&Value>,
    ) -> Result<ContextId, StructuralError> {
        let suite = self.suite;
        let decl = &suite.contexts[decl_id.0];
        let id = ContextId(self.contexts.len());
        self.contexts.push(Context {
            description: decl.description.clone(),
            parent,
            guards: decl.guards.clone(),
            children: Vec::new(),
            before_each: decl.before_each.clone(),
            after_each: decl.after_each.clone(),
            shared_arg: None,
        });
        self.splice(&decl.items, id, arg)?;
        Ok(id)
    }

    fn splice(
        &mut self,
        items: &'a [Item],
        target: ContextId,
        arg: Option<&Value>,
    ) -> Result<(), StructuralError> {
        for item in items {
            match item {
                Item::Context(child) => {
                    let child = self.resolve_context(*child, Some(target), arg)?;
                    self.contexts[target.0].children.push(Child::Context(child));
                }
                Item::Example { description, body } => {
                    self.contexts[target.0].children.push(Child::Example(Example {
                        description: description.clone(),
                        body: Rc::clone(body),
                        shared_arg: arg.cloned(),
                    }));
                }
                Item::Include {
                    name,
                    arg: include_arg,
                } => self.include(name, include_arg.as_ref().or(arg), target)?,
            }
        }
        Ok(())
    }

    fn include(
        &mut self,
        name: &str,
        arg: Option<&Value>,
        target: ContextId,
    ) -> Result<(), StructuralError> {
        let suite = self.suite;
        let Some(&group_id) = suite.shared.get(name) else {
            return Err(StructuralError::UndefinedSharedGroup {
                context: self.context_path(target),
                name: name.to_string(),
            });
        };
        if self.chain.iter().any(|active| active == name) {
            let mut chain = self.chain.clone();
            chain.push(name.to_string());
            return Err(StructuralError::CyclicInclusion {
                context: self.context_path(target),
                chain,
            });
        }
        trace!(group = name, context = %self.context_path(target), "expanding shared group");

        let group = &suite.contexts[group_id.0];
        let context = &mut self.contexts[target.0];
        context.before_each.extend(group.before_each.iter().cloned());
        context.after_each.extend(group.after_each.iter().cloned());
        // Merged hooks also run for the host's own examples; they see the
        // argument of the latest inclusion that supplied one.
        if let Some(arg) = arg {
            context.shared_arg = Some(arg.clone());
        }

        self.chain.push(name.to_string());
        let result = self.splice(&group.items, target, arg);
        self.chain.pop();
        result
    }

    fn context_path(&self, id: ContextId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(ctx) = current {
            let context = &self.contexts[ctx.0];
            if let Some(description) = &context.description {
                parts.push(description.as_str());
            }
            current = context.parent;
        }
        parts.reverse();
        parts.join(" ")
    }
}
