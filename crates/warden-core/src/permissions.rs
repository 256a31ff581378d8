// Copyright 2024 Warden Contributors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! The permissions registry and its two calling conventions.
//!
//! A [`Permissions`] value maps resource names to [`PermissionDefinition`]s.
//! It is built once and never mutated afterwards. Queries go through either
//!
//! - the builder accessor, `get(resource)?.can(&actor).invoke(action, entity, attributes)`, or
//! - the direct dispatcher, `can(resource, context)` for every action at once or
//!   `can(resource, (action, context))` for a single decision.
//!
//! All paths end in the same handler call with the same [`Args`], and all of
//! them return the handler's output untouched.

use crate::config::PermissionsConfig;
use crate::definition::{Handler, PermissionDefinition};
use crate::errors::{Result, WardenError};
use crate::types::{Args, ResourceName};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace, warn};

/// Resource → definition registry.
///
/// `A` is the actor type, `E` the entity type, `Attr` the attribute type and
/// `O` the handler output. The registry is `Send + Sync` whatever those types
/// are, so it can be shared behind an `Arc` without locking.
pub struct Permissions<A, E, Attr, O> {
    config: PermissionsConfig,
    definitions: HashMap<ResourceName, PermissionDefinition<A, E, Attr, O>>,
}

/// Builds a registry from `initial_defs` using the default configuration.
///
/// Definitions are inserted in order. When two share a resource name the later
/// one replaces the earlier one. An empty sequence yields an empty registry.
pub fn create_permissions<A, E, Attr, O, I>(initial_defs: I) -> Permissions<A, E, Attr, O>
where
    I: IntoIterator<Item = PermissionDefinition<A, E, Attr, O>>,
{
    Permissions::with_config(PermissionsConfig::default(), initial_defs)
}

impl<A, E, Attr, O> Permissions<A, E, Attr, O> {
    /// Builds a registry from `initial_defs` with explicit settings.
    pub fn with_config<I>(config: PermissionsConfig, initial_defs: I) -> Self
    where
        I: IntoIterator<Item = PermissionDefinition<A, E, Attr, O>>,
    {
        let mut definitions = HashMap::new();
        for definition in initial_defs {
            let resource = definition.resource().to_string();
            if let Some(replaced) = definitions.insert(resource, definition) {
                if config.warn_on_overwrite {
                    warn!(
                        registry = %config.name,
                        resource = %replaced.resource(),
                        "resource defined more than once; the later definition wins"
                    );
                }
            }
        }
        debug!(
            registry = %config.name,
            resources = definitions.len(),
            "permissions registry built"
        );
        Self {
            config,
            definitions,
        }
    }

    /// Builder-style accessor for `resource`.
    ///
    /// # Errors
    /// [`WardenError::UnknownResource`] if nothing is registered under `resource`.
    pub fn get(&self, resource: &str) -> Result<ResourceAccess<'_, A, E, Attr, O>> {
        let definition = self.lookup(resource)?;
        Ok(ResourceAccess { definition })
    }

    /// Direct dispatch.
    ///
    /// The shape of `query` picks the result:
    ///
    /// - a bare [`Args`] (`can(resource, ctx)`) yields [`Dispatch::Actions`],
    ///   one zero-argument action per declared handler, all bound to `ctx`;
    /// - an `(action, Args)` pair (`can(resource, (action, ctx))`) invokes that
    ///   one handler and yields [`Dispatch::Decision`] with its output.
    ///
    /// Only the pair form carries an action name, so a context can never be
    /// mistaken for one whatever it contains.
    ///
    /// # Errors
    /// [`WardenError::UnknownResource`] for an unregistered resource, and
    /// [`WardenError::UnknownAction`] when the pair form names an undeclared
    /// action. Both are returned before any handler runs.
    pub fn can<'p, 'a, Q>(&'p self, resource: &str, query: Q) -> Result<Dispatch<'p, 'a, A, E, Attr, O>>
    where
        Q: Into<Query<'a, A, E, Attr>>,
    {
        match query.into() {
            Query::Action { action, context } => {
                self.check(resource, action, context).map(Dispatch::Decision)
            }
            Query::Context(context) => self.can_all(resource, context).map(Dispatch::Actions),
        }
    }

    /// Binds `context` to every action of `resource`.
    ///
    /// The context is not validated; each action forwards it as given.
    pub fn can_all<'p, 'a>(
        &'p self,
        resource: &str,
        context: Args<'a, A, E, Attr>,
    ) -> Result<ActionSet<'p, 'a, A, E, Attr, O>> {
        let definition = self.lookup(resource)?;
        trace!(registry = %self.config.name, resource, "binding context to all actions");
        let resource = definition.resource();
        let actions = definition
            .handlers()
            .map(|(action, handler)| {
                let bound = BoundAction {
                    resource,
                    action,
                    handler,
                    context,
                };
                (action, bound)
            })
            .collect();
        Ok(ActionSet {
            resource,
            context,
            actions,
        })
    }

    /// Runs the handler for `action` on `resource` and returns its output.
    pub fn check(&self, resource: &str, action: &str, context: Args<'_, A, E, Attr>) -> Result<O> {
        let definition = self.lookup(resource)?;
        let handler = definition.handler(action).ok_or_else(|| {
            debug!(registry = %self.config.name, resource, action, "unknown action");
            WardenError::unknown_action(resource, action)
        })?;
        trace!(registry = %self.config.name, resource, action, "dispatching action");
        Ok(handler(context))
    }

    /// The definition registered under `resource`, if any.
    pub fn definition(&self, resource: &str) -> Option<&PermissionDefinition<A, E, Attr, O>> {
        self.definitions.get(resource)
    }

    /// Whether `resource` is registered.
    pub fn contains(&self, resource: &str) -> bool {
        self.definitions.contains_key(resource)
    }

    /// Registered resource names, sorted.
    pub fn resources(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry holds no resources.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The settings this registry was built with.
    pub fn config(&self) -> &PermissionsConfig {
        &self.config
    }

    fn lookup(&self, resource: &str) -> Result<&PermissionDefinition<A, E, Attr, O>> {
        self.definitions.get(resource).ok_or_else(|| {
            debug!(registry = %self.config.name, resource, "unknown resource");
            WardenError::unknown_resource(resource)
        })
    }
}

impl<A, E, Attr, O> fmt::Debug for Permissions<A, E, Attr, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permissions")
            .field("config", &self.config)
            .field("definitions", &self.definitions.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Argument shape for [`Permissions::can`].
pub enum Query<'a, A, E, Attr> {
    /// `can(resource, ctx)`: bind the context to every action.
    Context(Args<'a, A, E, Attr>),
    /// `can(resource, (action, ctx))`: decide one action.
    Action {
        /// Action to invoke.
        action: &'a str,
        /// Context handed to the handler.
        context: Args<'a, A, E, Attr>,
    },
}

impl<'a, A, E, Attr> From<Args<'a, A, E, Attr>> for Query<'a, A, E, Attr> {
    fn from(context: Args<'a, A, E, Attr>) -> Self {
        Query::Context(context)
    }
}

impl<'a, A, E, Attr> From<(&'a str, Args<'a, A, E, Attr>)> for Query<'a, A, E, Attr> {
    fn from((action, context): (&'a str, Args<'a, A, E, Attr>)) -> Self {
        Query::Action { action, context }
    }
}

/// Result of [`Permissions::can`].
pub enum Dispatch<'p, 'a, A, E, Attr, O> {
    /// Every action of the resource, bound to the supplied context.
    Actions(ActionSet<'p, 'a, A, E, Attr, O>),
    /// The output of the single handler that was invoked.
    Decision(O),
}

impl<'p, 'a, A, E, Attr, O> Dispatch<'p, 'a, A, E, Attr, O> {
    /// The handler output, if this came from the single-action form.
    pub fn into_decision(self) -> Option<O> {
        match self {
            Dispatch::Decision(outcome) => Some(outcome),
            Dispatch::Actions(_) => None,
        }
    }

    /// The bound action set, if this came from the context-only form.
    pub fn into_actions(self) -> Option<ActionSet<'p, 'a, A, E, Attr, O>> {
        match self {
            Dispatch::Actions(actions) => Some(actions),
            Dispatch::Decision(_) => None,
        }
    }
}

/// A resolved resource, ready to bind an actor.
pub struct ResourceAccess<'p, A, E, Attr, O> {
    definition: &'p PermissionDefinition<A, E, Attr, O>,
}

impl<'p, A, E, Attr, O> ResourceAccess<'p, A, E, Attr, O> {
    /// Binds `actor`, producing an invoker for every action of the resource.
    pub fn can<'a>(&self, actor: &'a A) -> ActionInvoker<'p, 'a, A, E, Attr, O> {
        ActionInvoker {
            definition: self.definition,
            actor,
        }
    }

    /// The resolved definition.
    pub fn definition(&self) -> &'p PermissionDefinition<A, E, Attr, O> {
        self.definition
    }
}

/// Actor-bound access to the actions of one resource.
///
/// Entity and attributes are optional on every call regardless of what the
/// handler needs; they are forwarded as given.
pub struct ActionInvoker<'p, 'a, A, E, Attr, O> {
    definition: &'p PermissionDefinition<A, E, Attr, O>,
    actor: &'a A,
}

impl<'p, 'a, A, E, Attr, O> ActionInvoker<'p, 'a, A, E, Attr, O> {
    /// Runs `action` for the bound actor.
    ///
    /// # Errors
    /// [`WardenError::UnknownAction`] if the resource does not declare `action`.
    pub fn invoke(&self, action: &str, entity: Option<&E>, attributes: Option<&Attr>) -> Result<O> {
        Ok(self.action(action)?.call(entity, attributes))
    }

    /// Handle on a single action, callable repeatedly with different entities.
    pub fn action(&self, action: &str) -> Result<BoundActor<'p, 'a, A, E, Attr, O>> {
        let resource = self.definition.resource();
        let (action, handler) = self
            .definition
            .handler_entry(action)
            .ok_or_else(|| {
                debug!(resource, action, "unknown action");
                WardenError::unknown_action(resource, action)
            })?;
        Ok(BoundActor {
            resource,
            action,
            handler,
            actor: self.actor,
        })
    }

    /// Actions available on this resource, sorted.
    pub fn action_names(&self) -> Vec<&'p str> {
        self.definition.action_names()
    }

    /// The bound actor.
    pub fn actor(&self) -> &'a A {
        self.actor
    }
}

/// One action of one resource with the actor already bound.
pub struct BoundActor<'p, 'a, A, E, Attr, O> {
    resource: &'p str,
    action: &'p str,
    handler: &'p Handler<A, E, Attr, O>,
    actor: &'a A,
}

impl<A, E, Attr, O> BoundActor<'_, '_, A, E, Attr, O> {
    /// Invokes the handler with the bound actor and the given entity/attributes.
    pub fn call(&self, entity: Option<&E>, attributes: Option<&Attr>) -> O {
        trace!(resource = self.resource, action = self.action, "dispatching bound action");
        (self.handler)(Args::from_parts(self.actor, entity, attributes))
    }
}

/// Every action of one resource, each bound to the same context.
pub struct ActionSet<'p, 'a, A, E, Attr, O> {
    resource: &'p str,
    context: Args<'a, A, E, Attr>,
    actions: HashMap<&'p str, BoundAction<'p, 'a, A, E, Attr, O>>,
}

impl<'p, 'a, A, E, Attr, O> ActionSet<'p, 'a, A, E, Attr, O> {
    /// The bound action named `action`, if declared.
    pub fn get(&self, action: &str) -> Option<&BoundAction<'p, 'a, A, E, Attr, O>> {
        self.actions.get(action)
    }

    /// Invokes `action` with the bound context.
    ///
    /// # Errors
    /// [`WardenError::UnknownAction`] if the resource does not declare `action`.
    pub fn call(&self, action: &str) -> Result<O> {
        self.get(action).map(BoundAction::call).ok_or_else(|| {
            debug!(resource = self.resource, action, "unknown action");
            WardenError::unknown_action(self.resource, action)
        })
    }

    /// Declared action names, sorted.
    pub fn action_names(&self) -> Vec<&'p str> {
        let mut names: Vec<&'p str> = self.actions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Iterates over `(action, bound action)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&'p str, &BoundAction<'p, 'a, A, E, Attr, O>)> {
        self.actions.iter().map(|(action, bound)| (*action, bound))
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the resource declares no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The resource these actions belong to.
    pub fn resource(&self) -> &'p str {
        self.resource
    }

    /// The context every action is bound to.
    pub fn context(&self) -> Args<'a, A, E, Attr> {
        self.context
    }
}

/// A zero-argument action: handler plus the context it will receive.
pub struct BoundAction<'p, 'a, A, E, Attr, O> {
    resource: &'p str,
    action: &'p str,
    handler: &'p Handler<A, E, Attr, O>,
    context: Args<'a, A, E, Attr>,
}

impl<A, E, Attr, O> BoundAction<'_, '_, A, E, Attr, O> {
    /// Invokes the handler with the bound context.
    pub fn call(&self) -> O {
        trace!(resource = self.resource, action = self.action, "dispatching bound action");
        (self.handler)(self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::create_permission_definition;
    use crate::definition::handler;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type JsonPermissions = Permissions<Value, Value, Value, bool>;
    type JsonDefinition = PermissionDefinition<Value, Value, Value, bool>;

    fn post_definition() -> JsonDefinition {
        JsonDefinition::builder("post")
            .action("create", |args| args.actor["role"] == "admin")
            .action("edit", |args| {
                args.entity
                    .map(|post| post["authorId"] == args.actor["id"])
                    .unwrap_or(false)
            })
            .build()
    }

    fn registry() -> JsonPermissions {
        create_permissions(vec![post_definition()])
    }

    #[test]
    fn empty_registry_has_no_resources() {
        let permissions: JsonPermissions = create_permissions(Vec::new());
        assert!(permissions.is_empty());
        assert!(permissions.resources().is_empty());
        assert!(permissions.get("post").err().unwrap().is_unknown_resource());
    }

    #[test]
    fn get_resolves_registered_resource() {
        let permissions = registry();
        let access = permissions.get("post").unwrap();
        assert_eq!(access.definition().resource(), "post");

        let actor = json!({"id": "2", "role": "user"});
        let invoker = access.can(&actor);
        assert_eq!(invoker.action_names(), vec!["create", "edit"]);
        assert_eq!(invoker.actor(), &actor);
    }

    #[test]
    fn lookup_is_exact_match() {
        let permissions = registry();
        for near_miss in ["Post", "post ", "posts", ""] {
            let err = permissions.get(near_miss).err().unwrap();
            assert!(matches!(err, WardenError::UnknownResource { ref resource } if resource == near_miss));
        }
    }

    #[test]
    fn single_action_shape_returns_decision() {
        let permissions = registry();
        let admin = json!({"role": "admin"});
        let outcome = permissions
            .can("post", ("create", Args::new(&admin)))
            .unwrap()
            .into_decision();
        assert_eq!(outcome, Some(true));
    }

    #[test]
    fn context_shape_returns_action_set() {
        let permissions = registry();
        let actor = json!({"id": "2"});
        let actions = permissions
            .can("post", Args::new(&actor))
            .unwrap()
            .into_actions()
            .unwrap();
        assert_eq!(actions.action_names(), vec!["create", "edit"]);
        assert_eq!(actions.resource(), "post");
        assert!(actions.context().entity.is_none());
        assert!(!actions.call("edit").unwrap());
    }

    #[test]
    fn single_action_with_unknown_action_fails_before_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let definition = JsonDefinition::builder("post")
            .action("create", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .build();
        let permissions = create_permissions(vec![definition]);
        let actor = json!({});

        let err = permissions.check("post", "publish", Args::new(&actor)).unwrap_err();
        match err {
            WardenError::UnknownAction { resource, action } => {
                assert_eq!(resource, "post");
                assert_eq!(action, "publish");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn context_shape_never_treats_context_as_action() {
        // A context whose actor looks like an action name still selects the
        // context-only shape.
        let permissions = registry();
        let actor = json!("create");
        let dispatch = permissions.can("post", Args::new(&actor)).unwrap();
        assert!(matches!(dispatch, Dispatch::Actions(_)));
    }

    #[test]
    fn builder_invoker_reports_unknown_action() {
        let permissions = registry();
        let actor = json!({"id": "2"});
        let invoker = permissions.get("post").unwrap().can(&actor);
        let err = invoker.invoke("archive", None, None).unwrap_err();
        assert!(err.is_unknown_action());
        assert!(err.to_string().contains("'archive'"));
        assert!(invoker.action("archive").is_err());
    }

    #[test]
    fn bound_actor_is_reusable_across_entities() {
        let permissions = registry();
        let actor = json!({"id": "2"});
        let invoker = permissions.get("post").unwrap().can(&actor);
        let edit = invoker.action("edit").unwrap();
        assert!(edit.call(Some(&json!({"authorId": "2"})), None));
        assert!(!edit.call(Some(&json!({"authorId": "9"})), None));
        assert!(!edit.call(None, None));
    }

    #[test]
    fn duplicate_resources_keep_the_later_definition() {
        let first: JsonDefinition = create_permission_definition(
            "x",
            vec![("only_in_first", handler(|_args: Args<'_, Value, Value, Value>| true))],
        );
        let second: JsonDefinition = create_permission_definition(
            "x",
            vec![("only_in_second", handler(|_args: Args<'_, Value, Value, Value>| false))],
        );
        let permissions = Permissions::with_config(
            PermissionsConfig {
                name: "dupes".into(),
                warn_on_overwrite: false,
            },
            vec![first, second],
        );
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions.config().name, "dupes");
        let definition = permissions.definition("x").unwrap();
        assert_eq!(definition.action_names(), vec!["only_in_second"]);
    }

    #[test]
    fn introspection_lists_sorted_resources() {
        let comment: JsonDefinition = JsonDefinition::builder("comment").action("create", |_| true).build();
        let permissions = create_permissions(vec![post_definition(), comment]);
        assert_eq!(permissions.resources(), vec!["comment", "post"]);
        assert!(permissions.contains("comment"));
        assert!(!permissions.contains("user"));
        let rendered = format!("{:?}", permissions);
        assert!(rendered.contains("Permissions"));
    }

    #[test]
    fn action_set_iterates_every_action() {
        let permissions = registry();
        let admin = json!({"id": "1", "role": "admin"});
        let post = json!({"authorId": "1"});
        let actions = permissions.can_all("post", Args::new(&admin).with_entity(&post)).unwrap();
        assert_eq!(actions.len(), 2);
        assert!(!actions.is_empty());
        assert!(actions.iter().all(|(_, action)| action.call()));
        assert!(actions.get("create").is_some());
        assert!(actions.get("delete").is_none());
    }
}
