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


//! `warden`: evaluate the built-in blog permissions from the command line.

mod blog;

use blog::BlogPermissions;
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use warden_core::{Args, PermissionsConfig, WardenError};

/// Evaluate attribute-based permissions for JSON actors and entities.
#[derive(Parser, Debug)]
#[command(name = "warden", about = "Evaluate attribute-based permissions")]
struct Cli {
    /// JSON file with registry settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered resources and their actions
    Resources,
    /// Decide a single action
    Check {
        /// Resource name, e.g. `post`
        resource: String,
        /// Action name, e.g. `edit`
        action: String,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Decide every action of a resource for one context
    Actions {
        /// Resource name, e.g. `post`
        resource: String,
        #[command(flatten)]
        context: ContextArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct ContextArgs {
    /// Actor as a JSON object
    #[arg(long)]
    actor: String,
    /// Target entity as a JSON object
    #[arg(long)]
    entity: Option<String>,
    /// Contextual attributes as a JSON object
    #[arg(long)]
    attributes: Option<String>,
}

struct ParsedContext {
    actor: JsonValue,
    entity: Option<JsonValue>,
    attributes: Option<JsonValue>,
}

impl ParsedContext {
    fn parse(args: &ContextArgs) -> Result<Self, serde_json::Error> {
        Ok(Self {
            actor: serde_json::from_str(&args.actor)?,
            entity: args.entity.as_deref().map(serde_json::from_str).transpose()?,
            attributes: args.attributes.as_deref().map(serde_json::from_str).transpose()?,
        })
    }

    fn as_args(&self) -> Args<'_, JsonValue, JsonValue, JsonValue> {
        Args::from_parts(&self.actor, self.entity.as_ref(), self.attributes.as_ref())
    }
}

fn verdict(allowed: bool) -> &'static str {
    if allowed {
        "allow"
    } else {
        "deny"
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PermissionsConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let document = fs::read_to_string(path)?;
            Ok(PermissionsConfig::from_json(&document)?)
        }
        None => Ok(PermissionsConfig::named("blog")),
    }
}

fn run(command: &Command, permissions: &BlogPermissions) -> Result<String, Box<dyn std::error::Error>> {
    let output = match command {
        Command::Resources => {
            let mut lines = Vec::new();
            for resource in permissions.resources() {
                let access = permissions.get(resource)?;
                lines.push(format!("{}: {}", resource, access.definition().action_names().join(", ")));
            }
            lines.join("\n")
        }
        Command::Check {
            resource,
            action,
            context,
        } => {
            let parsed = ParsedContext::parse(context)?;
            let allowed = permissions.check(resource, action, parsed.as_args())?;
            verdict(allowed).to_string()
        }
        Command::Actions { resource, context } => {
            let parsed = ParsedContext::parse(context)?;
            let actions = permissions.can_all(resource, parsed.as_args())?;
            actions
                .action_names()
                .into_iter()
                .map(|name| -> Result<String, WardenError> {
                    Ok(format!("{}: {}", name, verdict(actions.call(name)?)))
                })
                .collect::<Result<Vec<_>, _>>()?
                .join("\n")
        }
    };
    Ok(output)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    tracing::info!(registry = %config.name, "loading blog permissions");
    let permissions = blog::permissions(config);

    println!("{}", run(&cli.command, &permissions)?);
    Ok(())
}
