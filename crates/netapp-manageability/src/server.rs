//! Seams to the server SDK: connection handles, transports and the
//! connection settings they expose.
//!
//! The binding never talks to the network itself. A [`Transport`] opens
//! [`Server`] connections, and a `Server` turns a request tree into a
//! [`Results`] tree with one blocking call.

use std::fmt;
use std::str::FromStr;

use crate::elem::Elem;
use crate::error::{NamError, Result};

macro_rules! sdk_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $value:literal => $text:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name {
            $($variant = $value,)+
        }

        impl $name {
            /// The SDK's integer constant.
            pub fn as_i32(self) -> i32 {
                self as i32
            }

            pub fn from_i32(v: i32) -> Option<Self> {
                match v {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = NamError;

            fn from_str(s: &str) -> Result<Self> {
                let lower = s.trim().to_ascii_lowercase().replace('-', "_");
                match lower.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(NamError::Api(format!(
                        "unknown {} {s:?}",
                        stringify!($name)
                    ))),
                }
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

sdk_enum! {
    /// Authentication style (`NA_STYLE_*`).
    Style {
        LoginPassword = 0 => "login_password",
        Rpc = 1 => "rpc",
        HostsEquiv = 2 => "hosts_equiv",
    }
}

sdk_enum! {
    /// Transport protocol (`NA_SERVER_TRANSPORT_*`).
    TransportType {
        Http = 0 => "http",
        Https = 1 => "https",
    }
}

sdk_enum! {
    /// Kind of server at the other end (`NA_SERVER_TYPE_*`).
    ServerType {
        Filer = 0 => "filer",
        NetCache = 1 => "netcache",
        Agent = 2 => "agent",
        Dfm = 3 => "dfm",
        Cluster = 4 => "cluster",
    }
}

sdk_enum! {
    /// SDK-side debug output (`NA_NO_DEBUG`, `NA_PRINT_DONT_PARSE`, ...).
    DebugStyle {
        NoDebug = 0 => "no_debug",
        PrintDontParse = 1 => "print_dont_parse",
        DontPrintDontParse = 2 => "dont_print_dont_parse",
    }
}

/// Outcome of a call as reported on the response root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultStatus {
    Passed,
    Failed { errno: i32, reason: String },
}

/// A response tree together with its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Results {
    pub status: ResultStatus,
    pub elem: Elem,
}

impl Results {
    pub fn passed(elem: Elem) -> Self {
        Self {
            status: ResultStatus::Passed,
            elem,
        }
    }

    pub fn failed(elem: Elem, errno: i32, reason: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Failed {
                errno,
                reason: reason.into(),
            },
            elem,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == ResultStatus::Passed
    }

    /// Remote error number; 0 when the call passed.
    pub fn errno(&self) -> i32 {
        match &self.status {
            ResultStatus::Passed => 0,
            ResultStatus::Failed { errno, .. } => *errno,
        }
    }

    /// Failure reason; empty when the call passed.
    pub fn reason(&self) -> &str {
        match &self.status {
            ResultStatus::Passed => "",
            ResultStatus::Failed { reason, .. } => reason,
        }
    }
}

/// An open connection to a storage server (`na_server_t`).
///
/// Implementations wrap the SDK session. Getters and setters forward to the
/// session configuration; setters that the SDK can refuse return whether the
/// change was accepted.
pub trait Server: Send {
    /// Send `request` and block until the response tree arrives.
    fn invoke_elem(&mut self, request: &Elem) -> Result<Results>;

    /// Release a tree created or received during a call.
    fn free_elem(&mut self, elem: Elem) {
        drop(elem);
    }

    fn style(&self) -> Style;
    fn set_style(&mut self, style: Style);
    fn set_debug_style(&mut self, style: DebugStyle);

    fn transport_type(&self) -> TransportType;
    fn set_transport_type(&mut self, transport: TransportType) -> bool;

    fn port(&self) -> u16;
    fn set_port(&mut self, port: u16) -> bool;

    /// Call timeout in seconds; 0 means no timeout.
    fn timeout(&self) -> u32;
    fn set_timeout(&mut self, seconds: u32) -> bool;

    fn set_server_type(&mut self, server_type: ServerType) -> bool;
    fn set_admin_user(&mut self, login: &str, password: &str) -> bool;

    /// Close the session. Called exactly once per opened server.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Factory for server connections (the SDK library itself).
pub trait Transport {
    type Server: Server;

    /// One-time library initialization. The error string is the SDK's
    /// startup diagnostic.
    fn startup(&mut self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Open a connection speaking API version `major.minor`. `None` means
    /// the connection could not be established.
    fn open(&self, server: &str, major: u32, minor: u32) -> Option<Self::Server>;
}
