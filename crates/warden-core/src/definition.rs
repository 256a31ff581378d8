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


//! Permission definitions: one resource name plus its named action handlers.

use crate::types::{ActionName, Args, ResourceName};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Decision function for one action.
///
/// The output type `O` is whatever the handler produces. For synchronous
/// checks that is usually `bool`; asynchronous checks return a future such as
/// `futures::future::BoxFuture<'static, bool>`. The registry never inspects,
/// coerces or awaits it.
pub type Handler<A, E, Attr, O> = Arc<dyn Fn(Args<'_, A, E, Attr>) -> O + Send + Sync>;

/// Wraps a closure or function into a [`Handler`].
///
/// Passing the closure through this function gives it the higher-ranked
/// `Args<'_, ..>` signature the registry stores, which plain `Arc::new` on an
/// unannotated closure does not.
pub fn handler<A, E, Attr, O, F>(f: F) -> Handler<A, E, Attr, O>
where
    F: Fn(Args<'_, A, E, Attr>) -> O + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A resource name and the handlers for its actions.
///
/// Definitions are immutable once built. Cloning is cheap because handlers
/// are reference counted, so the same definition can be registered into more
/// than one registry.
pub struct PermissionDefinition<A, E, Attr, O> {
    resource: ResourceName,
    handlers: HashMap<ActionName, Handler<A, E, Attr, O>>,
}

/// Builds a definition from a resource name and an action → handler mapping.
///
/// Both inputs are stored as given. The resource name is not validated in any
/// way. If the mapping repeats an action name, the last handler is kept.
pub fn create_permission_definition<A, E, Attr, O, R, I, K>(
    resource: R,
    handlers: I,
) -> PermissionDefinition<A, E, Attr, O>
where
    R: Into<ResourceName>,
    I: IntoIterator<Item = (K, Handler<A, E, Attr, O>)>,
    K: Into<ActionName>,
{
    let definition = PermissionDefinition {
        resource: resource.into(),
        handlers: handlers
            .into_iter()
            .map(|(action, handler)| (action.into(), handler))
            .collect(),
    };
    tracing::trace!(
        resource = %definition.resource,
        actions = definition.handlers.len(),
        "permission definition created"
    );
    definition
}

impl<A, E, Attr, O> PermissionDefinition<A, E, Attr, O> {
    /// Starts a fluent definition for `resource`.
    pub fn builder(resource: impl Into<ResourceName>) -> DefinitionBuilder<A, E, Attr, O> {
        DefinitionBuilder {
            resource: resource.into(),
            handlers: Vec::new(),
        }
    }

    /// The resource name this definition is registered under.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The handler for `action`, if declared.
    pub fn handler(&self, action: &str) -> Option<&Handler<A, E, Attr, O>> {
        self.handlers.get(action)
    }

    /// The stored action name and its handler, if declared.
    pub(crate) fn handler_entry(&self, action: &str) -> Option<(&str, &Handler<A, E, Attr, O>)> {
        self.handlers
            .get_key_value(action)
            .map(|(name, handler)| (name.as_str(), handler))
    }

    /// Whether `action` is declared.
    pub fn contains_action(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    /// Declared action names, sorted.
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of declared actions.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the definition declares no actions at all.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn handlers(&self) -> impl Iterator<Item = (&str, &Handler<A, E, Attr, O>)> {
        self.handlers
            .iter()
            .map(|(action, handler)| (action.as_str(), handler))
    }
}

impl<A, E, Attr, O> Clone for PermissionDefinition<A, E, Attr, O> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

impl<A, E, Attr, O> fmt::Debug for PermissionDefinition<A, E, Attr, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionDefinition")
            .field("resource", &self.resource)
            .field("actions", &self.action_names())
            .finish()
    }
}

/// Fluent construction of a [`PermissionDefinition`].
///
/// Produces exactly what [`create_permission_definition`] would for the same
/// actions; the built definition is just as immutable.
pub struct DefinitionBuilder<A, E, Attr, O> {
    resource: ResourceName,
    handlers: Vec<(ActionName, Handler<A, E, Attr, O>)>,
}

impl<A, E, Attr, O> DefinitionBuilder<A, E, Attr, O> {
    /// Declares `action`, decided by `f`.
    pub fn action<F>(mut self, action: impl Into<ActionName>, f: F) -> Self
    where
        F: Fn(Args<'_, A, E, Attr>) -> O + Send + Sync + 'static,
    {
        let handler: Handler<A, E, Attr, O> = Arc::new(f);
        self.handlers.push((action.into(), handler));
        self
    }

    /// Declares `action` with an already wrapped handler.
    pub fn handler(mut self, action: impl Into<ActionName>, handler: Handler<A, E, Attr, O>) -> Self {
        self.handlers.push((action.into(), handler));
        self
    }

    /// Finishes the definition.
    pub fn build(self) -> PermissionDefinition<A, E, Attr, O> {
        create_permission_definition(self.resource, self.handlers)
    }
}
