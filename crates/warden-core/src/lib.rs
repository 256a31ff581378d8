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


#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Attribute-based access control helpers for Warden.
//!
//! This crate provides:
//! - Permission definitions: a resource name plus named action handlers
//! - A registry built once from a list of definitions
//! - A builder accessor: `get(resource)?.can(&actor).invoke(action, entity, attributes)`
//! - A direct dispatcher: `can(resource, ctx)` or `can(resource, (action, ctx))`
//!
//! Handlers decide; the registry only routes. Whatever a handler returns
//! (`bool`, a future, or anything else) reaches the caller unchanged, and
//! asynchronous results are never awaited here.
//!
//! ```
//! use warden_core::{create_permissions, Args, PermissionDefinition};
//!
//! struct User { id: u32, admin: bool }
//! struct Post { author_id: u32 }
//!
//! let post = PermissionDefinition::<User, Post, (), bool>::builder("post")
//!     .action("create", |args| args.actor.admin)
//!     .action("edit", |args| {
//!         args.entity.map_or(false, |post| post.author_id == args.actor.id)
//!     })
//!     .build();
//! let permissions = create_permissions(vec![post]);
//!
//! let alice = User { id: 2, admin: false };
//! let draft = Post { author_id: 2 };
//! assert!(permissions.get("post")?.can(&alice).invoke("edit", Some(&draft), None)?);
//! assert!(!permissions.check("post", "create", Args::new(&alice))?);
//! # Ok::<(), warden_core::WardenError>(())
//! ```

pub mod config;
pub mod definition;
pub mod errors;
pub mod permissions;
pub mod types;

pub use config::PermissionsConfig;
pub use definition::{create_permission_definition, handler, DefinitionBuilder, Handler, PermissionDefinition};
pub use errors::{Result, WardenError};
pub use permissions::{
    create_permissions, ActionInvoker, ActionSet, BoundAction, BoundActor, Dispatch, Permissions, Query,
    ResourceAccess,
};
pub use types::{ActionName, Args, JsonArgs, ResourceName};
