//! XML format of the registry state file
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <servers>
//!   <server url="http://host:8080/modeshape-rest" user="admin" password="c2VjcmV0"/>
//! </servers>
//! ```
//!
//! `password` is base64 of the raw password bytes and is only written for
//! servers that opted into persisting it. This is encoding, not encryption.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use modeshape_rest::Server;

use crate::{RegistryError, Result};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ROOT_ELEMENT: &str = "servers";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "servers")]
struct ServerList {
    #[serde(rename = "server", default)]
    servers: Vec<ServerRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ServerRecord {
    #[serde(rename = "@url", default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(rename = "@user", default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(rename = "@password", default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

/// Servers read from a state file, plus the entries that had to be skipped.
#[derive(Debug, Default)]
pub struct Decoded {
    pub servers: Vec<Server>,
    pub skipped: Vec<String>,
}

/// Render `servers` as a registry document. `path` is only used for errors.
pub fn encode(servers: &[Server], path: &Path) -> Result<String> {
    let list = ServerList {
        servers: servers
            .iter()
            .map(|server| ServerRecord {
                url: Some(server.url().to_string()),
                user: Some(server.user().to_string()),
                password: server
                    .persist_password()
                    .then(|| server.password().map(|p| STANDARD.encode(p)))
                    .flatten(),
            })
            .collect(),
    };

    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    list.serialize(serializer)
        .map_err(|e| persistence_error(path, e))?;

    Ok(format!("{XML_DECLARATION}\n{body}\n"))
}

/// Parse a registry document.
///
/// Malformed XML and a root other than `<servers>` are errors. Entries
/// without a `url` or `user`, and entries whose password is not valid base64
/// UTF-8, are skipped and reported in [`Decoded::skipped`].
pub fn decode(xml: &str, path: &Path) -> Result<Decoded> {
    match root_element(xml).map_err(|e| persistence_error(path, e))? {
        Some(name) if name == ROOT_ELEMENT => {}
        Some(name) => {
            return Err(persistence_error(
                path,
                format!("root element is <{name}>, expected <{ROOT_ELEMENT}>"),
            ));
        }
        None => return Err(persistence_error(path, "document has no root element")),
    }

    let list: ServerList =
        quick_xml::de::from_str(xml).map_err(|e| persistence_error(path, e))?;

    let mut decoded = Decoded::default();
    for (index, record) in list.servers.into_iter().enumerate() {
        match into_server(record) {
            Ok(server) => decoded.servers.push(server),
            Err(reason) => decoded
                .skipped
                .push(format!("server entry {} skipped: {}", index + 1, reason)),
        }
    }
    Ok(decoded)
}

fn into_server(record: ServerRecord) -> std::result::Result<Server, String> {
    let url = record
        .url
        .filter(|u| !u.is_empty())
        .ok_or("missing url attribute")?;
    let user = record
        .user
        .filter(|u| !u.is_empty())
        .ok_or("missing user attribute")?;

    let password = match record.password {
        Some(encoded) => {
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| format!("password is not base64: {e}"))?;
            Some(String::from_utf8(bytes).map_err(|_| "password is not UTF-8".to_string())?)
        }
        None => None,
    };

    let persist_password = password.is_some();
    Ok(Server::new(url, user, password, persist_password))
}

/// Name of the first element, skipping the prolog.
fn root_element(xml: &str) -> std::result::Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(Some(String::from_utf8_lossy(e.name().as_ref()).into_owned()));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn persistence_error(path: &Path, e: impl std::fmt::Display) -> RegistryError {
    RegistryError::Persistence {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
