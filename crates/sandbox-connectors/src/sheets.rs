//! `sheets` module: thin wrappers over the Google Sheets values API.

use anyhow::{anyhow, Result};
use sandbox_core::{BoundArguments, Builtin, HostError, Signature};
use sandbox_types::TypeDescriptor as T;
use serde_json::json;
use std::sync::Arc;

use crate::client::{ConnectorConfig, RestClient};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// `A1` column letters for a one-based column index.
fn column_letters(mut col: u64) -> String {
    let mut out = String::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        out.insert(0, (b'A' + rem) as char);
        col = (col - 1) / 26;
    }
    out
}

fn parse_index(args: &BoundArguments, name: &str) -> Result<u64, HostError> {
    let raw = args.str(name).map_err(HostError::failed)?;
    raw.parse::<u64>()
        .map_err(|_| HostError::failed(anyhow!("{name} is not a positive integer: {raw:?}")))
}

/// Build an A1 reference for a single cell from one-based row/col indices.
fn cell_range(args: &BoundArguments) -> Result<String, HostError> {
    let row = parse_index(args, "row_index")?;
    let col = parse_index(args, "col_index")?;
    if row == 0 || col == 0 {
        return Err(HostError::failed(anyhow!("cell indices are one-based")));
    }
    let cell = format!("{}{row}", column_letters(col));
    Ok(match args.opt_str("sheet_name") {
        Some(sheet) => format!("{sheet}!{cell}"),
        None => cell,
    })
}

fn render_option_query(args: &BoundArguments) -> Vec<(String, String)> {
    args.opt_str("value_render_option")
        .map(|option| vec![("valueRenderOption".to_string(), option.to_string())])
        .unwrap_or_default()
}

pub fn build_sheets_builtins(config: &ConnectorConfig) -> Result<Vec<Builtin>> {
    let client = Arc::new(RestClient::new(DEFAULT_BASE_URL, config));
    let mut builtins = Vec::new();

    // Pure helper: compose an A1 range string.
    builtins.push(Builtin::new(
        "a1_range",
        Signature::builder()
            .optional("sheet_name", T::string())
            .optional("from", T::string())
            .optional("to", T::string())
            .returns(T::string())
            .build()?,
        |args, _| {
            let span = match (args.opt_str("from"), args.opt_str("to")) {
                (Some(from), Some(to)) => format!("{from}:{to}"),
                (Some(from), None) => from.to_string(),
                (None, Some(to)) => to.to_string(),
                (None, None) => String::new(),
            };
            let out = match (args.opt_str("sheet_name"), span.is_empty()) {
                (Some(sheet), false) => format!("{sheet}!{span}"),
                (Some(sheet), true) => sheet.to_string(),
                (None, _) => span,
            };
            Ok(json!(out))
        },
    ));

    {
        let client = Arc::clone(&client);
        builtins.push(Builtin::new(
            "read_cell",
            Signature::builder()
                .param("spreadsheet_id", T::string())
                .param("row_index", T::string())
                .param("col_index", T::string())
                .optional("sheet_name", T::string())
                .optional("value_render_option", T::string())
                .build()?,
            move |args, ctx| {
                let id = args.str("spreadsheet_id").map_err(HostError::failed)?;
                let range = cell_range(&args)?;
                client.get_json(
                    &format!("{id}/values/{range}"),
                    &render_option_query(&args),
                    ctx,
                )
            },
        ));
    }

    {
        let client = Arc::clone(&client);
        builtins.push(Builtin::new(
            "read_range",
            Signature::builder()
                .param("spreadsheet_id", T::string())
                .param("a1_range", T::string())
                .optional("value_render_option", T::string())
                .build()?,
            move |args, ctx| {
                let id = args.str("spreadsheet_id").map_err(HostError::failed)?;
                let range = args.str("a1_range").map_err(HostError::failed)?;
                client.get_json(
                    &format!("{id}/values/{range}"),
                    &render_option_query(&args),
                    ctx,
                )
            },
        ));
    }

    {
        let client = Arc::clone(&client);
        builtins.push(Builtin::new(
            "write_cell",
            Signature::builder()
                .param("spreadsheet_id", T::string())
                .param("row_index", T::string())
                .param("col_index", T::string())
                .param("value", T::string())
                .optional("sheet_name", T::string())
                .build()?,
            move |args, ctx| {
                let id = args.str("spreadsheet_id").map_err(HostError::failed)?;
                let value = args.str("value").map_err(HostError::failed)?;
                let range = cell_range(&args)?;
                let body = json!({"range": range, "values": [[value]]});
                client.send_json(
                    "PUT",
                    &format!("{id}/values/{range}?valueInputOption=USER_ENTERED"),
                    &body,
                    ctx,
                )
            },
        ));
    }

    {
        let client = Arc::clone(&client);
        builtins.push(Builtin::new(
            "write_range",
            Signature::builder()
                .param("spreadsheet_id", T::string())
                .param("a1_range", T::string())
                .param("data", T::Value)
                .build()?,
            move |args, ctx| {
                let id = args.str("spreadsheet_id").map_err(HostError::failed)?;
                let range = args.str("a1_range").map_err(HostError::failed)?;
                let body = json!({"range": range, "values": args.json("data")});
                client.send_json(
                    "PUT",
                    &format!("{id}/values/{range}?valueInputOption=USER_ENTERED"),
                    &body,
                    ctx,
                )
            },
        ));
    }

    {
        let client = Arc::clone(&client);
        builtins.push(Builtin::new(
            "set_background_color",
            Signature::builder()
                .param("spreadsheet_id", T::string())
                .param("a1_range", T::string())
                .param("color", T::string())
                .build()?,
            move |args, ctx| {
                let id = args.str("spreadsheet_id").map_err(HostError::failed)?;
                let range = args.str("a1_range").map_err(HostError::failed)?;
                let color = args.str("color").map_err(HostError::failed)?;
                let body = json!({
                    "requests": [{
                        "repeatCell": {
                            "range": range,
                            "cell": {"userEnteredFormat": {"backgroundColorStyle": {"rgbColor": color}}},
                            "fields": "userEnteredFormat.backgroundColorStyle"
                        }
                    }]
                });
                client.post_json(&format!("{id}:batchUpdate"), &body, ctx)
            },
        ));
    }

    {
        let client = Arc::clone(&client);
        builtins.push(Builtin::new(
            "set_text_format",
            Signature::builder()
                .param("spreadsheet_id", T::string())
                .param("a1_range", T::string())
                .optional("color", T::string())
                .optional("bold", T::string())
                .optional("italic", T::string())
                .optional("strikethrough", T::string())
                .optional("underline", T::string())
                .build()?,
            move |args, ctx| {
                let id = args.str("spreadsheet_id").map_err(HostError::failed)?;
                let range = args.str("a1_range").map_err(HostError::failed)?;
                let mut format = serde_json::Map::new();
                for flag in ["bold", "italic", "strikethrough", "underline"] {
                    if let Some(value) = args.opt_str(flag) {
                        format.insert(flag.to_string(), json!(value == "true"));
                    }
                }
                if let Some(color) = args.opt_str("color") {
                    format.insert(
                        "foregroundColorStyle".to_string(),
                        json!({"rgbColor": color}),
                    );
                }
                let body = json!({
                    "requests": [{
                        "repeatCell": {
                            "range": range,
                            "cell": {"userEnteredFormat": {"textFormat": format}},
                            "fields": "userEnteredFormat.textFormat"
                        }
                    }]
                });
                client.post_json(&format!("{id}:batchUpdate"), &body, ctx)
            },
        ));
    }

    Ok(builtins)
}
