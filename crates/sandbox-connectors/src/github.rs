//! `github` module: thin wrappers over the GitHub REST API.
//!
//! Builtins format the resource path from their leading arguments and send
//! the rest as body or query. Pagination, rate limiting and response shapes
//! belong to the service.

use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sandbox_core::{BoundArguments, Builtin, HostError, Signature, SignatureBuilder};
use sandbox_types::TypeDescriptor as T;
use serde_json::json;
use std::sync::Arc;

use crate::client::{body_without, query_params, ConnectorConfig, RestClient};

const DEFAULT_BASE_URL: &str = "https://api.github.com";

fn params(builder: SignatureBuilder, required: &[&str], optional: &[&str]) -> SignatureBuilder {
    let mut builder = builder;
    for name in required {
        builder = builder.param(name, T::string());
    }
    for name in optional {
        builder = builder.optional(name, T::string());
    }
    builder
}

fn signature(required: &[&str], optional: &[&str]) -> Result<Signature> {
    Ok(params(Signature::builder(), required, optional)
        .returns(T::Value)
        .build()?)
}

fn repo_path(args: &BoundArguments, rest: &str) -> Result<String, HostError> {
    let owner = args.str("owner").map_err(HostError::failed)?;
    let repo = args.str("repo").map_err(HostError::failed)?;
    if rest.is_empty() {
        Ok(format!("repos/{owner}/{repo}"))
    } else {
        Ok(format!("repos/{owner}/{repo}/{rest}"))
    }
}

/// `{owner}/{repo}/<template>` with `{name}` placeholders filled from the
/// bound arguments.
fn fill_path(args: &BoundArguments, template: &str) -> Result<String, HostError> {
    let mut rest = template.to_string();
    for (name, value) in args.iter() {
        let placeholder = format!("{{{name}}}");
        if rest.contains(&placeholder) {
            let value = value
                .as_str()
                .ok_or_else(|| HostError::failed(anyhow::anyhow!("{name} is not a string")))?;
            rest = rest.replace(&placeholder, value);
        }
    }
    repo_path(args, &rest)
}

/// Names appearing as `{placeholder}`s in a template; these are path
/// parameters, excluded from bodies and query strings.
fn path_params<'a>(template: &'a str, args: &BoundArguments) -> Vec<&'a str> {
    let mut out = vec!["owner", "repo"];
    for (name, _) in args.iter() {
        let placeholder = format!("{{{name}}}");
        if let Some(start) = template.find(&placeholder) {
            out.push(&template[start + 1..start + 1 + name.len()]);
        }
    }
    out
}

fn send(
    client: &Arc<RestClient>,
    name: &str,
    method: &'static str,
    template: &'static str,
    required: &[&str],
    optional: &[&str],
) -> Result<Builtin> {
    let client = Arc::clone(client);
    Ok(Builtin::new(
        name,
        signature(required, optional)?,
        move |args, ctx| {
            let path = fill_path(&args, template)?;
            let exclude = path_params(template, &args);
            match method {
                "GET" => client.get_json(&path, &query_params(&args, &exclude), ctx),
                "DELETE" => client.call(method, &path, ctx),
                _ => client.send_json(method, &path, &body_without(&args, &exclude), ctx),
            }
        },
    ))
}

pub fn build_github_builtins(config: &ConnectorConfig) -> Result<Vec<Builtin>> {
    let client = Arc::new(RestClient::new(DEFAULT_BASE_URL, config));
    let mut builtins = Vec::new();

    // Issues.
    builtins.push(send(
        &client,
        "create_issue",
        "POST",
        "issues",
        &["owner", "repo", "title", "body"],
        &["assignee", "milestone", "labels", "assignees"],
    )?);
    builtins.push(send(
        &client,
        "get_issue",
        "GET",
        "issues/{number}",
        &["owner", "repo", "number"],
        &[],
    )?);
    builtins.push(send(
        &client,
        "update_issue",
        "PATCH",
        "issues/{number}",
        &["owner", "repo", "number"],
        &[
            "title",
            "body",
            "assignee",
            "state",
            "state_reason",
            "milestone",
            "labels",
            "assignees",
        ],
    )?);
    builtins.push(send(
        &client,
        "list_repository_issues",
        "GET",
        "issues",
        &["owner", "repo"],
        &[
            "milestone",
            "state",
            "assignee",
            "creator",
            "mentioned",
            "labels",
            "sort",
            "direction",
            "since",
        ],
    )?);

    // Issue comments.
    builtins.push(send(
        &client,
        "create_issue_comment",
        "POST",
        "issues/{number}/comments",
        &["owner", "repo", "number", "body"],
        &[],
    )?);

    // Issue labels.
    builtins.push(send(
        &client,
        "add_issue_labels",
        "POST",
        "issues/{number}/labels",
        &["owner", "repo", "number", "labels"],
        &[],
    )?);
    builtins.push(send(
        &client,
        "remove_issue_label",
        "DELETE",
        "issues/{number}/labels/{label}",
        &["owner", "repo", "number", "label"],
        &[],
    )?);

    // Pull requests.
    builtins.push(send(
        &client,
        "get_pull_request",
        "GET",
        "pulls/{number}",
        &["owner", "repo", "number"],
        &[],
    )?);
    builtins.push(send(
        &client,
        "list_pull_requests",
        "GET",
        "pulls",
        &["owner", "repo"],
        &["state", "head", "base", "sort", "direction"],
    )?);
    builtins.push(send(
        &client,
        "create_pull_request",
        "POST",
        "pulls",
        &["owner", "repo", "head", "base"],
        &[
            "title",
            "body",
            "head_repo",
            "draft",
            "issue",
            "maintainer_can_modify",
        ],
    )?);
    builtins.push(send(
        &client,
        "list_review_comments",
        "GET",
        "pulls/{number}/comments",
        &["owner", "repo", "number"],
        &[],
    )?);

    // Reactions.
    builtins.push(send(
        &client,
        "create_reaction_for_issue",
        "POST",
        "issues/{number}/reactions",
        &["owner", "repo", "number", "content"],
        &[],
    )?);
    builtins.push(send(
        &client,
        "create_reaction_for_issue_comment",
        "POST",
        "issues/comments/{id}/reactions",
        &["owner", "repo", "id", "content"],
        &[],
    )?);

    // Repository contents. The API wants file content base64-encoded.
    {
        let client = Arc::clone(&client);
        builtins.push(Builtin::new(
            "create_file",
            signature(
                &["owner", "repo", "path", "content", "message"],
                &["sha", "branch", "committer"],
            )?,
            move |args, ctx| {
                let file_path = args.str("path").map_err(HostError::failed)?.to_string();
                let content = args.str("content").map_err(HostError::failed)?;
                let mut body = body_without(&args, &["owner", "repo", "path"]);
                body["content"] = json!(STANDARD.encode(content.as_bytes()));
                let path = repo_path(&args, &format!("contents/{file_path}"))?;
                client.send_json("PUT", &path, &body, ctx)
            },
        ));
    }
    builtins.push(send(
        &client,
        "get_contents",
        "GET",
        "contents/{path}",
        &["owner", "repo", "path"],
        &["ref"],
    )?);

    // Git references.
    builtins.push(send(
        &client,
        "create_ref",
        "POST",
        "git/refs",
        &["owner", "repo", "ref", "sha"],
        &[],
    )?);
    builtins.push(send(
        &client,
        "get_ref",
        "GET",
        "git/ref/{ref}",
        &["owner", "repo", "ref"],
        &[],
    )?);

    Ok(builtins)
}
