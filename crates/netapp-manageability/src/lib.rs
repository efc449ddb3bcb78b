//! Binding layer for the storage manageability SDK (ONTAPI).
//!
//! The SDK speaks in labeled element trees: a request is a tree whose root is
//! named after the API command, and a response is a `results` tree. This
//! crate converts between those trees and dynamically typed host values, and
//! drives calls through a pluggable SDK transport.
//!
//! # Architecture
//!
//! - **Elements** (`elem.rs`, `xml.rs`): the tree model and its XML text form
//!   used for wire dumps
//! - **Values** (`value.rs`): host values and the `NamHash` result container
//! - **Marshal** (`marshal.rs`): value -> tree and tree -> value
//! - **Server** (`server.rs`): traits the SDK is plugged in through, plus its
//!   constants
//!
//! On top of these, `api.rs` provides the `API` facade and the invocation
//! sequence (marshal, send, check status, unmarshal, release), and
//! `client.rs` wraps an opened and configured server.
//!
//! # Example
//!
//! ```rust
//! use netapp_manageability::{marshal_request, unmarshal, Value};
//!
//! let args = Value::hash([("volume", Value::from(vec!["vol0", "vol1"]))]);
//! let request = marshal_request("volume-offline", &args).unwrap();
//! assert_eq!(request.children().len(), 2);
//!
//! let back = unmarshal(&request);
//! assert_eq!(back.get("volume"), Some(&Value::from(vec!["vol0", "vol1"])));
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod elem;
pub mod error;
pub mod marshal;
pub mod server;
pub mod value;
pub mod xml;

// Re-export key types
pub use api::{invoke, Api, ServerHandle};
pub use client::{api_command, Client, ClientOptions};
pub use config::ApiConfig;
pub use elem::Elem;
pub use error::{NamError, Result};
pub use marshal::{marshal, marshal_request, unmarshal};
pub use server::{
    DebugStyle, ResultStatus, Results, Server, ServerType, Style, Transport, TransportType,
};
pub use value::{NamHash, Value};
