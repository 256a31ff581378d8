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


//! Common type definitions used throughout Warden.

use serde_json::Value as JsonValue;
use std::fmt;

/// Name of a resource class, e.g. `"post"`. Compared by exact string equality.
pub type ResourceName = String;

/// Name of an action within one resource, e.g. `"edit"`.
pub type ActionName = String;

/// The context object handed to a handler on every dispatch.
///
/// `actor` is always present. `entity` and `attributes` are independently
/// optional; nothing checks whether a particular handler needs them, so a
/// handler that cannot decide without an entity has to treat `None` itself.
///
/// `Args` only borrows, so it is `Copy` whatever the actor/entity types are and
/// a batch dispatch can hand the same context to every action.
pub struct Args<'a, A, E, Attr> {
    /// The party requesting permission.
    pub actor: &'a A,
    /// The target of the action, if any.
    pub entity: Option<&'a E>,
    /// Extra contextual data, if any.
    pub attributes: Option<&'a Attr>,
}

/// Context whose actor, entity and attributes are all JSON values.
pub type JsonArgs<'a> = Args<'a, JsonValue, JsonValue, JsonValue>;

impl<'a, A, E, Attr> Args<'a, A, E, Attr> {
    /// Creates a context carrying only an actor.
    pub fn new(actor: &'a A) -> Self {
        Self {
            actor,
            entity: None,
            attributes: None,
        }
    }

    /// Creates a context from all three parts at once.
    pub fn from_parts(actor: &'a A, entity: Option<&'a E>, attributes: Option<&'a Attr>) -> Self {
        Self {
            actor,
            entity,
            attributes,
        }
    }

    /// Sets the target entity.
    pub fn with_entity(mut self, entity: &'a E) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Sets the contextual attributes.
    pub fn with_attributes(mut self, attributes: &'a Attr) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

impl<A, E, Attr> Clone for Args<'_, A, E, Attr> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, E, Attr> Copy for Args<'_, A, E, Attr> {}

impl<A, E, Attr> fmt::Debug for Args<'_, A, E, Attr>
where
    A: fmt::Debug,
    E: fmt::Debug,
    Attr: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("actor", &self.actor)
            .field("entity", &self.entity)
            .field("attributes", &self.attributes)
            .finish()
    }
}
