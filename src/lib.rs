#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

//! A strict encoder/decoder for the DHCPv6 message family.
//!
//! The crate turns a length-delimited byte buffer into a validated, strongly-typed
//! tree of messages and options, and serializes such a tree back into bytes that
//! round-trip exactly. It follows the layering of a `wire` module in a TCP/IP stack:
//!
//!  * a zero-copy _packet_ view ([`wire::Dhcpv6Packet`]) gives checked access to the
//!    fixed header fields and the raw option area of a buffer;
//!  * a typed _element_ tree ([`wire::Message`], [`wire::DhcpOption`]) is loaded from
//!    and emitted through that view, and validates itself against the occurrence
//!    constraints declared for every container kind.
//!
//! Parsing never needs to know the concrete message or option kind in advance:
//! [`StructuredElement::parse`](wire::StructuredElement::parse) inspects the leading
//! tag, constructs the matching variant and loads it. Unrecognized tags are not an
//! error; they degrade to [`wire::UnknownMessage`] / [`wire::UnknownOption`] which keep
//! the raw bytes.
//!
//! # Relay chains
//!
//! A relay-forward message embeds the message it relays in a relay-message option,
//! which may itself be another relay-forward message. [`wire::Message::wrap_response`]
//! rebuilds the matching relay-reply chain around a response, echoing the options
//! that ask to be echoed and substituting the response at exactly the depth where the
//! original client message was found.
//!
//! ```
//! use dhcpv6_wire::wire::{Message, StructuredElement};
//!
//! // An unrecognized message type is kept as an opaque payload.
//! let (len, message) = Message::parse(&[200, 1, 2, 3]).unwrap();
//! assert_eq!(len, 4);
//! assert_eq!(message.save().unwrap(), [200, 1, 2, 3]);
//! ```
//!
//! # Features
//!
//!  * `std` links the standard library and implements `std::error::Error`;
//!    without it the crate is `no_std` and only needs `alloc`.
//!  * `log` routes the crate's diagnostics to the `log` facade.
//!  * `verbose` additionally traces every option as it is parsed.

extern crate alloc;

#[macro_use]
mod macros;

pub mod wire;
