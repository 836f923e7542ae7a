//! `slack` module: thin wrappers over the Slack Web API.
//!
//! Each builtin maps one-to-one onto a Web API method; parameter names match
//! the service's field names, so payloads are built straight from the bound
//! arguments. Service-level semantics (rate limits, retry, message shapes)
//! stay with the service.

use anyhow::Result;
use sandbox_core::{Builtin, HostError, Signature, SignatureBuilder};
use sandbox_types::TypeDescriptor as T;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::client::{body_without, query_params, ConnectorConfig, RestClient};

const DEFAULT_BASE_URL: &str = "https://slack.com/api";

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

/// A builtin that POSTs its non-null arguments to one Web API method.
fn post_method(
    client: &Arc<RestClient>,
    name: &str,
    api_method: &str,
    required: &[&str],
    optional: &[&str],
) -> Result<Builtin> {
    let signature = params(Signature::builder(), required, optional)
        .returns(T::Value)
        .build()?;
    let client = Arc::clone(client);
    let api_method = api_method.to_string();
    Ok(Builtin::new(name, signature, move |args, ctx| {
        client.post_json(&api_method, &body_without(&args, &[]), ctx)
    }))
}

/// A builtin that GETs one Web API method with its non-null arguments as
/// query parameters.
fn get_method(
    client: &Arc<RestClient>,
    name: &str,
    api_method: &str,
    required: &[&str],
    optional: &[&str],
) -> Result<Builtin> {
    let signature = params(Signature::builder(), required, optional)
        .returns(T::Value)
        .build()?;
    let client = Arc::clone(client);
    let api_method = api_method.to_string();
    Ok(Builtin::new(name, signature, move |args, ctx| {
        client.get_json(&api_method, &query_params(&args, &[]), ctx)
    }))
}

pub fn build_slack_builtins(config: &ConnectorConfig) -> Result<Vec<Builtin>> {
    let client = Arc::new(RestClient::new(DEFAULT_BASE_URL, config));
    let mut builtins = Vec::new();

    builtins.push(post_method(&client, "auth_test", "auth.test", &[], &[])?);

    builtins.push(post_method(
        &client,
        "chat_delete",
        "chat.delete",
        &["channel", "ts"],
        &[],
    )?);
    builtins.push(post_method(
        &client,
        "chat_post_ephemeral",
        "chat.postEphemeral",
        &["channel", "user", "text"],
        &["blocks", "thread_ts"],
    )?);
    builtins.push(post_method(
        &client,
        "chat_post_message",
        "chat.postMessage",
        &["channel"],
        &["text", "blocks", "thread_ts", "reply_broadcast"],
    )?);
    builtins.push(post_method(
        &client,
        "chat_update",
        "chat.update",
        &["channel", "ts"],
        &["text", "blocks", "reply_broadcast"],
    )?);

    // Convenience wrapper over chat.postMessage.
    {
        let signature = params(
            Signature::builder(),
            &["target", "text"],
            &["thread_ts", "reply_broadcast"],
        )
        .returns(T::Value)
        .build()?;
        let client = Arc::clone(&client);
        builtins.push(Builtin::new(
            "send_text_message",
            signature,
            move |args, ctx| {
                let mut body = body_without(&args, &["target"]);
                body["channel"] = json!(args.str("target").map_err(HostError::failed)?);
                client.post_json("chat.postMessage", &body, ctx)
            },
        ));
    }

    // Convenience wrapper rendering a two-button approval prompt.
    {
        let signature = params(
            Signature::builder(),
            &["target", "header", "message"],
            &["green_button", "red_button", "thread_ts", "reply_broadcast"],
        )
        .returns(T::Value)
        .build()?;
        let client = Arc::clone(&client);
        builtins.push(Builtin::new(
            "send_approval_message",
            signature,
            move |args, ctx| {
                let header = args.str("header").map_err(HostError::failed)?;
                let message = args.str("message").map_err(HostError::failed)?;
                let green = args.opt_str("green_button").unwrap_or("Approve");
                let red = args.opt_str("red_button").unwrap_or("Deny");

                let mut body = body_without(
                    &args,
                    &["target", "header", "message", "green_button", "red_button"],
                );
                body["channel"] = json!(args.str("target").map_err(HostError::failed)?);
                body["text"] = json!(format!("{header}: {message}"));
                body["blocks"] = approval_blocks(header, message, green, red);
                client.post_json("chat.postMessage", &body, ctx)
            },
        ));
    }

    builtins.push(get_method(
        &client,
        "conversations_history",
        "conversations.history",
        &["channel"],
        &[
            "cursor",
            "limit",
            "include_all_metadata",
            "inclusive",
            "oldest",
            "latest",
        ],
    )?);
    builtins.push(get_method(
        &client,
        "conversations_info",
        "conversations.info",
        &["channel"],
        &["include_locale", "include_num_members"],
    )?);
    builtins.push(get_method(
        &client,
        "conversations_list",
        "conversations.list",
        &[],
        &["cursor", "limit", "exclude_archived", "team_id", "types"],
    )?);
    builtins.push(get_method(
        &client,
        "conversations_replies",
        "conversations.replies",
        &["channel", "ts"],
        &[
            "cursor",
            "limit",
            "include_all_metadata",
            "inclusive",
            "oldest",
            "latest",
        ],
    )?);

    builtins.push(post_method(
        &client,
        "reactions_add",
        "reactions.add",
        &["channel", "name", "timestamp"],
        &[],
    )?);

    builtins.push(get_method(
        &client,
        "users_get_presence",
        "users.getPresence",
        &[],
        &["user"],
    )?);

    Ok(builtins)
}

fn approval_blocks(header: &str, message: &str, green: &str, red: &str) -> JsonValue {
    json!([
        {
            "type": "header",
            "text": {"type": "plain_text", "text": header}
        },
        {
            "type": "section",
            "text": {"type": "mrkdwn", "text": message}
        },
        {
            "type": "actions",
            "elements": [
                {
                    "type": "button",
                    "style": "primary",
                    "text": {"type": "plain_text", "text": green},
                    "action_id": "approve"
                },
                {
                    "type": "button",
                    "style": "danger",
                    "text": {"type": "plain_text", "text": red},
                    "action_id": "deny"
                }
            ]
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_matches_declarations() {
        let builtins = build_slack_builtins(&ConnectorConfig::default()).unwrap();
        let names: Vec<&str> = builtins.iter().map(|b| b.name.as_str()).collect();
        assert!(names.contains(&"auth_test"));
        assert!(names.contains(&"send_text_message"));
        assert!(names.contains(&"conversations_replies"));
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn test_send_text_message_signature_order() {
        let builtins = build_slack_builtins(&ConnectorConfig::default()).unwrap();
        let builtin = builtins
            .iter()
            .find(|b| b.name == "send_text_message")
            .unwrap();
        assert_eq!(
            builtin.signature.describe_params(),
            "(target: string, text: string, thread_ts: string|None, reply_broadcast: string|None)"
        );
    }

    #[test]
    fn test_approval_blocks_shape() {
        let blocks = approval_blocks("Deploy?", "v1.2 is ready", "Ship it", "Hold");
        assert_eq!(blocks[2]["elements"][0]["style"], "primary");
        assert_eq!(blocks[2]["elements"][1]["text"]["text"], "Hold");
    }
}
