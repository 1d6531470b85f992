use crate::shared::catalog::{self, MessageClass};
use anyhow::{Result, bail};

const QUERY_TOKEN: &str = "QUERY";

// One sentence worth of fields plus a label used in logs and error context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub label: String,
    pub fields: Vec<String>,
}

// Message class for a command name. Names outside the catalog are sent as API commands.
fn class_for(name: &str) -> MessageClass {
    match catalog::lookup(name) {
        Some(spec) => spec.class,
        None => {
            tracing::warn!(command = name, "command not in catalog; sending as PERDAPI");
            MessageClass::Api
        }
    }
}

// Split a comma-separated flag value, dropping blank entries.
fn tokens(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|token| {
        if token.is_empty() {
            tracing::warn!("skipping empty command entry");
            false
        } else {
            true
        }
    })
}

// Warns when a catalogued command has no GET form; the query is still sent.
// Returns whether the warning fired.
fn warn_if_set_only(name: &str) -> bool {
    let set_only = catalog::lookup(name).is_some_and(|spec| !spec.queryable());
    if set_only {
        tracing::warn!(
            command = name,
            "command has no GET form; the receiver may reject this query"
        );
    }
    set_only
}

// `-g GNSS,FIXMASK`: one GET request per command name.
pub fn query_requests(list: &str) -> Result<Vec<Request>> {
    let requests: Vec<Request> = tokens(list)
        .map(|name| {
            warn_if_set_only(name);
            let class = class_for(name);
            let mut fields = vec![class.talker().to_string(), name.to_string()];
            if class.takes_query_token() {
                fields.push(QUERY_TOKEN.to_string());
            }
            Request {
                label: format!("query {name}"),
                fields,
            }
        })
        .collect();

    if requests.is_empty() {
        bail!("no command names given to query: {list:?}");
    }
    Ok(requests)
}

// `-z "PPS VCLK 1 0 200 0 0,RESTART 0"`: command name followed by space-separated parameters.
pub fn execute_requests(list: &str) -> Result<Vec<Request>> {
    let mut requests = Vec::new();
    for token in tokens(list) {
        let mut parts = token.split_whitespace();
        let Some(name) = parts.next() else {
            continue;
        };
        let mut fields = vec![class_for(name).talker().to_string(), name.to_string()];
        fields.extend(parts.map(str::to_string));
        requests.push(Request {
            label: format!("execute {name}"),
            fields,
        });
    }

    if requests.is_empty() {
        bail!("no commands given to execute: {list:?}");
    }
    Ok(requests)
}

// `-S 115200`: push a new UART1 baud rate to the receiver.
pub fn baud_update_request(baud_rate: u32) -> Request {
    Request {
        label: "baud rate update".to_string(),
        fields: vec![
            MessageClass::Cfg.talker().to_string(),
            "UART1".to_string(),
            baud_rate.to_string(),
        ],
    }
}

pub fn version_request() -> Request {
    Request {
        label: "SYS [VERSION]".to_string(),
        fields: vec![MessageClass::Sys.talker().to_string(), "VERSION".to_string()],
    }
}
