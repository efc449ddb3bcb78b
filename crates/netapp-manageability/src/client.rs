//! A configured connection with method-style command calls.

use crate::api::{Api, ServerHandle};
use crate::error::{NamError, Result};
use crate::server::{ServerType, Style, Transport, TransportType};
use crate::value::Value;

/// Settings applied when a [`Client`] opens its server.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct ClientOptions {
    pub server: String,
    pub auth_style: Style,
    pub transport_type: TransportType,
    /// Leave unset to keep the transport's default port.
    pub port: Option<u16>,
    /// Call timeout in seconds.
    pub timeout: Option<u32>,
    pub server_type: ServerType,
    pub username: Option<String>,
    pub password: Option<String>,
    pub major_version: u32,
    pub minor_version: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            server: String::new(),
            auth_style: Style::LoginPassword,
            transport_type: TransportType::Http,
            port: None,
            timeout: None,
            server_type: ServerType::Filer,
            username: None,
            password: None,
            major_version: 1,
            minor_version: 0,
        }
    }
}

impl ClientOptions {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Map a method-style name to its API command (`aggr_add` -> `aggr-add`).
pub fn api_command(method: &str) -> String {
    method.replace('_', "-")
}

/// An open, configured server plus the API it was opened through.
pub struct Client<T: Transport> {
    api: Api<T>,
    handle: ServerHandle<T::Server>,
    options: ClientOptions,
}

impl<T: Transport> Client<T> {
    /// Open `options.server` and apply every setting in `options`.
    pub fn new(api: Api<T>, options: ClientOptions) -> Result<Self> {
        if options.server.is_empty() {
            return Err(NamError::Api("client options: server is required".into()));
        }

        let mut handle =
            api.server_open(&options.server, options.major_version, options.minor_version)?;

        api.server_style(&mut handle, options.auth_style)?;
        check(
            api.server_set_transport_type(&mut handle, options.transport_type)?,
            "transport type",
        )?;
        check(
            api.server_set_server_type(&mut handle, options.server_type)?,
            "server type",
        )?;
        if let Some(port) = options.port {
            check(api.server_set_port(&mut handle, port)?, "port")?;
        }
        if let Some(timeout) = options.timeout {
            check(api.server_set_timeout(&mut handle, timeout)?, "timeout")?;
        }
        match (&options.username, &options.password) {
            (Some(user), Some(password)) => {
                check(api.server_adminuser(&mut handle, user, password)?, "admin user")?;
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(NamError::Api(
                    "client options: username and password must be given together".into(),
                ));
            }
            (None, None) => {}
        }

        Ok(Self {
            api,
            handle,
            options,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn api(&self) -> &Api<T> {
        &self.api
    }

    pub fn handle(&self) -> &ServerHandle<T::Server> {
        &self.handle
    }

    /// Invoke the API command named by `method`.
    pub fn call(&mut self, method: &str, args: &Value) -> Result<Value> {
        let command = api_command(method);
        self.api.server_invoke(&mut self.handle, &command, args)
    }

    /// Invoke an API command by its exact name.
    pub fn invoke(&mut self, command: &str, args: &Value) -> Result<Value> {
        self.api.server_invoke(&mut self.handle, command, args)
    }

    pub fn close(mut self) -> Result<()> {
        self.handle.close()
    }
}

fn check(accepted: bool, setting: &str) -> Result<()> {
    if accepted {
        Ok(())
    } else {
        Err(NamError::Api(format!("server rejected {setting} setting")))
    }
}
