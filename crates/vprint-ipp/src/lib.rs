// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// vprint IPP: the binary codec, typed attribute model and operation
// dispatcher behind the virtual printer, plus a thin TCP transport.  The
// codec and dispatcher do no I/O; `server` is the only module that touches
// the network.

pub mod attribute;
pub mod codec;
pub mod dispatch;
pub mod message;
pub mod printer;
pub mod server;
pub mod tag;
pub mod value;

mod wire;

pub use attribute::{Attribute, Group};
pub use codec::{decode_request, decode_response, encode_request, encode_response};
pub use dispatch::Dispatcher;
pub use message::{Request, Response};
pub use printer::Printer;
pub use server::IppServer;
pub use tag::{DelimiterTag, Operation, StatusCode, ValueTag, Version};
pub use value::{Collection, Member, Value};
