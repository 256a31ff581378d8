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


//! Compiled-in blog permissions used by the `warden` binary.
//!
//! Actors, entities and attributes are JSON objects. Handlers that need an
//! entity deny when none is supplied.

use serde_json::Value as JsonValue;
use warden_core::{create_permission_definition, handler, JsonArgs, PermissionDefinition, Permissions, PermissionsConfig};

/// Registry over JSON actors/entities/attributes with boolean decisions.
pub type BlogPermissions = Permissions<JsonValue, JsonValue, JsonValue, bool>;
type BlogDefinition = PermissionDefinition<JsonValue, JsonValue, JsonValue, bool>;

fn role<'a>(args: &JsonArgs<'a>) -> &'a str {
    args.actor["role"].as_str().unwrap_or("")
}

fn is_author(args: &JsonArgs<'_>) -> bool {
    match (args.actor.get("id"), args.entity.and_then(|e| e.get("authorId"))) {
        (Some(id), Some(author)) => id == author,
        _ => false,
    }
}

fn flag(value: Option<&JsonValue>, key: &str) -> bool {
    value.and_then(|v| v[key].as_bool()).unwrap_or(false)
}

fn post() -> BlogDefinition {
    BlogDefinition::builder("post")
        .action("create", |args| matches!(role(&args), "admin" | "author"))
        .action("read", |args| {
            args.entity.is_some() && (flag(args.entity, "published") || is_author(&args) || role(&args) == "admin")
        })
        .action("edit", |args| is_author(&args))
        .action("delete", |args| {
            role(&args) == "admin" || (is_author(&args) && !flag(args.entity, "published"))
        })
        .build()
}

fn comment() -> BlogDefinition {
    create_permission_definition(
        "comment",
        [
            (
                "create",
                handler(|args: JsonArgs<'_>| {
                    args.actor["id"].as_str().is_some_and(|id| !id.is_empty()) && !flag(args.attributes, "locked")
                }),
            ),
            (
                "moderate",
                handler(|args: JsonArgs<'_>| matches!(role(&args), "admin" | "moderator")),
            ),
        ],
    )
}

/// Builds the blog registry under `config`.
pub fn permissions(config: PermissionsConfig) -> BlogPermissions {
    Permissions::with_config(config, vec![post(), comment()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warden_core::Args;

    fn blog() -> BlogPermissions {
        permissions(PermissionsConfig::named("blog-test"))
    }

    #[test]
    fn authors_and_admins_create_posts() {
        let blog = blog();
        for (actor, expected) in [
            (json!({"role": "admin"}), true),
            (json!({"role": "author"}), true),
            (json!({"role": "reader"}), false),
            (json!({}), false),
        ] {
            assert_eq!(blog.check("post", "create", Args::new(&actor)).unwrap(), expected);
        }
    }

    #[test]
    fn drafts_are_private_to_their_author() {
        let blog = blog();
        let author = json!({"id": "7", "role": "author"});
        let reader = json!({"id": "8", "role": "reader"});
        let draft = json!({"authorId": "7", "published": false});
        let live = json!({"authorId": "7", "published": true});

        assert!(blog.check("post", "read", Args::new(&author).with_entity(&draft)).unwrap());
        assert!(!blog.check("post", "read", Args::new(&reader).with_entity(&draft)).unwrap());
        assert!(blog.check("post", "read", Args::new(&reader).with_entity(&live)).unwrap());
        assert!(!blog.check("post", "read", Args::new(&reader)).unwrap());
    }

    #[test]
    fn published_posts_need_an_admin_to_delete() {
        let blog = blog();
        let author = json!({"id": "7", "role": "author"});
        let admin = json!({"id": "1", "role": "admin"});
        let draft = json!({"authorId": "7", "published": false});
        let live = json!({"authorId": "7", "published": true});

        let as_author = blog.get("post").unwrap().can(&author);
        assert!(as_author.invoke("delete", Some(&draft), None).unwrap());
        assert!(!as_author.invoke("delete", Some(&live), None).unwrap());
        assert!(blog.check("post", "delete", Args::new(&admin).with_entity(&live)).unwrap());
    }

    #[test]
    fn locked_threads_reject_comments() {
        let blog = blog();
        let actor = json!({"id": "3"});
        let locked = json!({"locked": true});
        let actions = blog.can_all("comment", Args::new(&actor)).unwrap();
        assert!(actions.call("create").unwrap());
        assert!(!actions.call("moderate").unwrap());
        assert!(!blog.check("comment", "create", Args::new(&actor).with_attributes(&locked)).unwrap());
    }

    #[test]
    fn registry_lists_both_resources() {
        assert_eq!(blog().resources(), vec!["comment", "post"]);
    }
}
