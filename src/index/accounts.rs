//! User-to-packages lookup over the index's XML-RPC interface.
//!
//! The `user_packages` method returns an array of `[role, package]` rows;
//! only the package column matters here. Faults come back as a `fault`
//! struct whose `faultString` member carries the message.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::CONTENT_TYPE;
use std::collections::HashSet;
use url::Url;

use crate::http::{classify_status, HttpClient};
use crate::name::normalize;

/// Resolves a user to the packages they maintain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageLookup: Send + Sync {
    async fn user_packages(&self, user: &str) -> Result<Vec<String>>;
}

/// `user_packages` lookup against the index's XML-RPC endpoint.
pub struct XmlRpcLookup {
    client: HttpClient,
    endpoint: Url,
}

impl XmlRpcLookup {
    pub fn new(client: HttpClient, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl PackageLookup for XmlRpcLookup {
    #[tracing::instrument(skip(self))]
    async fn user_packages(&self, user: &str) -> Result<Vec<String>> {
        debug!("POST {} user_packages({})...", self.endpoint, user);

        let response = self
            .client
            .inner()
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(user_packages_request(user))
            .send()
            .await
            .context("Failed to send XML-RPC request")?;

        let response = response.error_for_status().map_err(classify_status)?;

        let body = response
            .text()
            .await
            .context("Failed to read XML-RPC response")?;

        parse_user_packages(&body)
            .with_context(|| format!("Failed to look up packages for user {}", user))
    }
}

fn user_packages_request(user: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\
         <methodCall>\
         <methodName>user_packages</methodName>\
         <params><param><value><string>{}</string></value></param></params>\
         </methodCall>",
        escape(user)
    )
}

/// Extracts the package column from a `user_packages` method response.
///
/// Rows are the second-level arrays; within a row the second value is the
/// package name. A `fault` response becomes an error carrying the
/// `faultString` message.
fn parse_user_packages(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut packages = Vec::new();
    let mut array_depth = 0usize;
    let mut current_row: Option<Vec<String>> = None;
    let mut pending_value: Option<String> = None;

    let mut saw_fault = false;
    let mut in_fault = false;
    let mut in_member_name = false;
    let mut member_name = String::new();
    let mut fault_message: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"array" => {
                    array_depth += 1;
                    if array_depth == 2 {
                        current_row = Some(Vec::new());
                    }
                }
                b"value" => {
                    if current_row.is_some() || (in_fault && member_name == "faultString") {
                        pending_value = Some(String::new());
                    }
                }
                b"fault" => {
                    saw_fault = true;
                    in_fault = true;
                }
                b"name" => {
                    if in_fault {
                        in_member_name = true;
                        member_name.clear();
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"array" => {
                    if array_depth == 2 {
                        if let Some(row) = current_row.take() {
                            if let Some(package) = row.into_iter().nth(1) {
                                packages.push(package);
                            }
                        }
                    }
                    array_depth = array_depth.saturating_sub(1);
                }
                b"value" => {
                    if let Some(value) = pending_value.take() {
                        if in_fault {
                            if member_name == "faultString" {
                                fault_message = Some(value);
                            }
                        } else if let Some(row) = current_row.as_mut() {
                            row.push(value);
                        }
                    }
                }
                b"name" => {
                    in_member_name = false;
                }
                b"fault" => {
                    in_fault = false;
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"value" {
                    if in_fault {
                        if member_name == "faultString" {
                            fault_message = Some(String::new());
                        }
                    } else if let Some(row) = current_row.as_mut() {
                        row.push(String::new());
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = match e.unescape() {
                    Ok(text) => text,
                    Err(e) => bail!("Failed to parse XML-RPC response: {}", e),
                };
                if in_member_name {
                    member_name.push_str(&text);
                } else if let Some(pending) = pending_value.as_mut() {
                    pending.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => bail!("Failed to parse XML-RPC response: {}", e),
        }
    }

    if saw_fault {
        match fault_message {
            Some(message) => bail!("XML-RPC fault: {}", message),
            None => bail!("XML-RPC fault"),
        }
    }

    Ok(packages)
}

/// Resolves each user to their packages and concatenates the results,
/// dropping packages already seen under another spelling.
pub async fn expand_users(lookup: &dyn PackageLookup, users: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for user in users {
        let names = lookup.user_packages(user).await?;
        debug!("User {} maintains {} packages", user, names.len());
        for name in names {
            if seen.insert(normalize(&name)) {
                packages.push(name);
            }
        }
    }

    Ok(packages)
}
