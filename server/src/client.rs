//! The command line client.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::ClientError;

/// Environment variable overriding the server address.
pub const ADDR_VAR: &str = "LFKV_ADDR";

/// The server address used when [`ADDR_VAR`] is not set.
pub const DEFAULT_ADDR: &str = "127.0.0.1:12345";

/// Usage of the command line client.
pub const USAGE: &str = "Usage: lfkv-cli <GET|SET|DEL> <key> [value]";

/// Usage of the `SET` command.
pub const SET_USAGE: &str = "Usage: lfkv-cli SET <key> <value>";

/// Builds a request line, terminator included, from the command line arguments.
///
/// The arguments after the key are joined by single spaces to form the value of `SET`, and
/// ignored for any other command.
///
/// # Errors
///
/// Returns [`ClientError::Usage`] if the command or the key is missing, or if `SET` has no
/// value.
pub fn request_line<S: AsRef<str>>(args: &[S]) -> Result<String, ClientError> {
    let [command, key, rest @ ..] = args else {
        return Err(ClientError::Usage { usage: USAGE });
    };
    let (command, key) = (command.as_ref(), key.as_ref());
    if command != "SET" {
        return Ok(format!("{command} {key}\n"));
    }
    if rest.is_empty() {
        return Err(ClientError::Usage { usage: SET_USAGE });
    }
    let value = rest.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join(" ");
    Ok(format!("{command} {key} {value}\n"))
}

/// Parses the server address, or returns the default one.
///
/// # Errors
///
/// Returns [`ClientError::InvalidAddr`] if the address cannot be parsed.
pub fn server_addr(value: Option<String>) -> Result<SocketAddr, ClientError> {
    let value = value.unwrap_or_else(|| DEFAULT_ADDR.to_owned());
    value
        .parse()
        .map_err(|_| ClientError::InvalidAddr { value })
}

/// Sends a request line and returns the response line without its terminator.
///
/// # Errors
///
/// Returns a [`ClientError`] if the server is unreachable or closes the connection without
/// responding.
pub async fn send(addr: SocketAddr, request: &str) -> Result<String, ClientError> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(request.as_bytes()).await?;
    let mut reader = BufReader::new(stream);
    let mut response = String::new();
    if reader.read_line(&mut response).await? == 0 {
        return Err(ClientError::NoResponse);
    }
    let trimmed = response.trim_end_matches(['\r', '\n']).len();
    response.truncate(trimmed);
    Ok(response)
}
