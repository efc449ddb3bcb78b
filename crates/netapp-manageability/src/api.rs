//! The `API` facade: opening servers, forwarding connection settings and
//! invoking commands.
//!
//! Every entry point logs a `[calling]` / `[returned]` pair. The level is
//! chosen per call from [`ApiConfig::verbose`], and nothing is emitted when
//! no tracing subscriber is installed.

use crate::config::ApiConfig;
use crate::elem::Elem;
use crate::error::{NamError, Result};
use crate::marshal::{marshal, unmarshal};
use crate::server::{
    DebugStyle, ResultStatus, Results, Server, ServerType, Style, Transport, TransportType,
};
use crate::value::Value;

/// Prefix used in log lines and error messages.
pub const CLASS_NAME: &str = "API";

macro_rules! log_call {
    ($config:expr, $($arg:tt)+) => {
        if $config.verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

/// Owner of one opened server connection.
///
/// The connection is closed exactly once: by [`ServerHandle::close`], or when
/// the handle is dropped while still open.
pub struct ServerHandle<S: Server> {
    inner: Option<S>,
    address: String,
}

impl<S: Server> ServerHandle<S> {
    fn new(server: S, address: &str) -> Self {
        Self {
            inner: Some(server),
            address: address.to_string(),
        }
    }

    /// The address this handle was opened with.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    pub fn server(&self) -> Result<&S> {
        self.inner.as_ref().ok_or_else(closed)
    }

    pub fn server_mut(&mut self) -> Result<&mut S> {
        self.inner.as_mut().ok_or_else(closed)
    }

    /// Close the connection. Closing an already closed handle is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(mut server) => server.close(),
            None => Ok(()),
        }
    }
}

impl<S: Server> Drop for ServerHandle<S> {
    fn drop(&mut self) {
        if let Some(mut server) = self.inner.take() {
            if let Err(e) = server.close() {
                tracing::warn!("{CLASS_NAME}: closing {} on drop failed: {e}", self.address);
            }
        }
    }
}

fn closed() -> NamError {
    NamError::Api(format!("{CLASS_NAME}: server handle is closed"))
}

/// The trees of one call. Whatever is still held is handed back to the
/// server when the slot is dropped, on success and on every error path.
struct CallTrees<'a, S: Server + ?Sized> {
    server: &'a mut S,
    request: Option<Elem>,
    response: Option<Results>,
}

impl<'a, S: Server + ?Sized> CallTrees<'a, S> {
    fn new(server: &'a mut S) -> Self {
        Self {
            server,
            request: None,
            response: None,
        }
    }
}

impl<S: Server + ?Sized> Drop for CallTrees<'_, S> {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            self.server.free_elem(request);
        }
        if let Some(response) = self.response.take() {
            self.server.free_elem(response.elem);
        }
    }
}

/// Run `command` with `args` on `server` and convert the response.
///
/// Fails with [`NamError::TypeConversion`] when `args` cannot be encoded,
/// with [`NamError::RemoteOperation`] when the server reports a failed
/// status, and passes transport errors through unchanged. Both trees are
/// released before this returns.
pub fn invoke<S: Server + ?Sized>(
    server: &mut S,
    config: &ApiConfig,
    command: &str,
    args: &Value,
) -> Result<Value> {
    log_call!(config, "{CLASS_NAME}.server_invoke [calling]: command = {command}");
    let mut trees = CallTrees::new(server);
    let outcome = invoke_protected(&mut trees, config, command, args);
    log_call!(config, "{CLASS_NAME}.server_invoke [returned]: command = {command}");
    drop(trees);
    outcome
}

fn invoke_protected<S: Server + ?Sized>(
    trees: &mut CallTrees<'_, S>,
    config: &ApiConfig,
    command: &str,
    args: &Value,
) -> Result<Value> {
    let request = trees.request.insert(Elem::new(command));
    marshal(request, args)?;

    if config.wire_dump {
        wire_dump(config, "REQUEST", &request.to_xml());
    }

    let results = trees.server.invoke_elem(request)?;
    let results = trees.response.insert(results);

    if config.wire_dump {
        wire_dump(config, "RESPONSE", &results.to_xml());
    }

    if let ResultStatus::Failed { errno, reason } = &results.status {
        return Err(NamError::RemoteOperation {
            command: command.to_string(),
            errno: *errno,
            reason: reason.clone(),
        });
    }
    Ok(unmarshal(&results.elem))
}

fn wire_dump(config: &ApiConfig, what: &str, xml: &str) {
    log_call!(config, "{CLASS_NAME}.server_invoke: {what} START");
    log_call!(config, "{xml}");
    log_call!(config, "{CLASS_NAME}.server_invoke: {what} END");
}

/// Entry point for a scripting host: one SDK library plus logging flags.
pub struct Api<T: Transport> {
    transport: T,
    config: ApiConfig,
}

impl<T: Transport> Api<T> {
    /// Initialize the SDK library behind `transport`.
    pub fn new(mut transport: T, config: ApiConfig) -> Result<Self> {
        transport
            .startup()
            .map_err(|e| NamError::Api(format!("Error in na_startup: {e}")))?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ApiConfig) {
        self.config = config;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn server_open(
        &self,
        server: &str,
        major: u32,
        minor: u32,
    ) -> Result<ServerHandle<T::Server>> {
        log_call!(
            self.config,
            "{CLASS_NAME}.server_open [calling]: server = {server}, \
             major = {major}, minor = {minor}"
        );
        let opened = self.transport.open(server, major, minor).ok_or_else(|| {
            NamError::Api(format!(
                "{CLASS_NAME}.server_open: could not open connection to server {server}"
            ))
        })?;
        log_call!(
            self.config,
            "{CLASS_NAME}.server_open [returned]: server = {server}, \
             major = {major}, minor = {minor}"
        );
        Ok(ServerHandle::new(opened, server))
    }

    pub fn server_get_style(&self, handle: &ServerHandle<T::Server>) -> Result<Style> {
        let server = handle.server()?;
        log_call!(self.config, "{CLASS_NAME}.server_get_style [calling]");
        let style = server.style();
        log_call!(
            self.config,
            "{CLASS_NAME}.server_get_style [returned]: style = {}",
            style.as_i32()
        );
        Ok(style)
    }

    pub fn server_get_transport_type(
        &self,
        handle: &ServerHandle<T::Server>,
    ) -> Result<TransportType> {
        let server = handle.server()?;
        log_call!(self.config, "{CLASS_NAME}.server_get_transport_type [calling]");
        let transport = server.transport_type();
        log_call!(
            self.config,
            "{CLASS_NAME}.server_get_transport_type [returned]: type = {}",
            transport.as_i32()
        );
        Ok(transport)
    }

    pub fn server_get_port(&self, handle: &ServerHandle<T::Server>) -> Result<u16> {
        let server = handle.server()?;
        log_call!(self.config, "{CLASS_NAME}.server_get_port [calling]");
        let port = server.port();
        log_call!(self.config, "{CLASS_NAME}.server_get_port [returned]: port = {port}");
        Ok(port)
    }

    pub fn server_get_timeout(&self, handle: &ServerHandle<T::Server>) -> Result<u32> {
        let server = handle.server()?;
        log_call!(self.config, "{CLASS_NAME}.server_get_timeout [calling]");
        let timeout = server.timeout();
        log_call!(self.config, "{CLASS_NAME}.server_get_timeout [returned]: timeout = {timeout}");
        Ok(timeout)
    }

    pub fn server_style(&self, handle: &mut ServerHandle<T::Server>, style: Style) -> Result<()> {
        let server = handle.server_mut()?;
        log_call!(self.config, "{CLASS_NAME}.server_style [calling]: style = {}", style.as_i32());
        server.set_style(style);
        log_call!(self.config, "{CLASS_NAME}.server_style [returned]");
        Ok(())
    }

    pub fn server_set_debugstyle(
        &self,
        handle: &mut ServerHandle<T::Server>,
        style: DebugStyle,
    ) -> Result<()> {
        let server = handle.server_mut()?;
        log_call!(
            self.config,
            "{CLASS_NAME}.server_set_debugstyle [calling]: style = {}",
            style.as_i32()
        );
        server.set_debug_style(style);
        log_call!(self.config, "{CLASS_NAME}.server_set_debugstyle [returned]");
        Ok(())
    }

    pub fn server_set_server_type(
        &self,
        handle: &mut ServerHandle<T::Server>,
        server_type: ServerType,
    ) -> Result<bool> {
        let server = handle.server_mut()?;
        log_call!(
            self.config,
            "{CLASS_NAME}.server_set_server_type [calling]: type = {}",
            server_type.as_i32()
        );
        let rv = server.set_server_type(server_type);
        log_call!(self.config, "{CLASS_NAME}.server_set_server_type [returned]: rv = {rv}");
        Ok(rv)
    }

    pub fn server_set_transport_type(
        &self,
        handle: &mut ServerHandle<T::Server>,
        transport: TransportType,
    ) -> Result<bool> {
        let server = handle.server_mut()?;
        log_call!(
            self.config,
            "{CLASS_NAME}.server_set_transport_type [calling]: type = {}",
            transport.as_i32()
        );
        let rv = server.set_transport_type(transport);
        log_call!(self.config, "{CLASS_NAME}.server_set_transport_type [returned]: rv = {rv}");
        Ok(rv)
    }

    pub fn server_set_port(&self, handle: &mut ServerHandle<T::Server>, port: u16) -> Result<bool> {
        let server = handle.server_mut()?;
        log_call!(self.config, "{CLASS_NAME}.server_set_port [calling]: port = {port}");
        let rv = server.set_port(port);
        log_call!(self.config, "{CLASS_NAME}.server_set_port [returned]: rv = {rv}");
        Ok(rv)
    }

    pub fn server_set_timeout(
        &self,
        handle: &mut ServerHandle<T::Server>,
        seconds: u32,
    ) -> Result<bool> {
        let server = handle.server_mut()?;
        log_call!(self.config, "{CLASS_NAME}.server_set_timeout [calling]: timeout = {seconds}");
        let rv = server.set_timeout(seconds);
        log_call!(self.config, "{CLASS_NAME}.server_set_timeout [returned]: rv = {rv}");
        Ok(rv)
    }

    /// Set admin credentials. The password is never logged.
    pub fn server_adminuser(
        &self,
        handle: &mut ServerHandle<T::Server>,
        login: &str,
        password: &str,
    ) -> Result<bool> {
        let server = handle.server_mut()?;
        log_call!(self.config, "{CLASS_NAME}.server_adminuser [calling]: login = {login}");
        let rv = server.set_admin_user(login, password);
        log_call!(self.config, "{CLASS_NAME}.server_adminuser [returned]: rv = {rv}");
        Ok(rv)
    }

    pub fn server_invoke(
        &self,
        handle: &mut ServerHandle<T::Server>,
        command: &str,
        args: &Value,
    ) -> Result<Value> {
        invoke(handle.server_mut()?, &self.config, command, args)
    }
}
