/*! Low-level packet access and construction.

The `wire` module deals with the DHCPv6 message format. It provides two levels
of functionality.

 * First, it provides functions to extract fields from sequences of octets,
   and to insert fields into sequences of octets. This happens through the
   [`Dhcpv6Packet`] family of structures, which borrow a buffer and check its
   length once, so that the accessors never panic.
 * Second, it provides a typed, owned element tree: [`Message`] and
   [`DhcpOption`]. Every element implements [`StructuredElement`], which ties
   together dispatch by wire tag, loading from a length-bounded region,
   validation, and canonical serialization.

The second level is built on the first: elements are loaded through the
packet view and emitted through it, and validation runs both at the end of
every load and before every save.

A typical round trip looks like this:

```
use dhcpv6_wire::wire::{
    ClientServerMessage, DhcpOption, ElapsedTimeOption, Message, StructuredElement,
};

let solicit = Message::Solicit(ClientServerMessage {
    transaction_id: 0x123456,
    options: vec![
        DhcpOption::ClientId(b"\x00\x03\x00\x01\x02\x00\x00\x00\x00\x01".to_vec()),
        DhcpOption::ElapsedTime(ElapsedTimeOption { elapsed_time: 0 }),
    ],
});

let bytes = solicit.save().unwrap();
let (len, parsed) = Message::parse(&bytes).unwrap();
assert_eq!(len, bytes.len());
assert_eq!(parsed, solicit);
```
*/

use core::fmt;

mod field {
    pub type Field = ::core::ops::Range<usize>;
    pub type Rest = ::core::ops::RangeFrom<usize>;
}

pub mod dhcpv6;
pub mod element;
pub mod ipv6;
pub mod pretty_print;

pub use self::pretty_print::PrettyPrinter;

pub use self::ipv6::Address as Ipv6Address;

pub use self::element::{Classify, ContainsTable, MayContain, StructuredElement, UNBOUNDED};

pub use self::dhcpv6::{
    ClientServerMessage, Message, MessageType as Dhcpv6MessageType, Packet as Dhcpv6Packet,
    RawOption as Dhcpv6RawOption, RelayServerMessage, UnknownMessage, CLIENT_PORT as DHCPV6_CLIENT_PORT,
    HOP_COUNT_LIMIT as DHCPV6_HOP_COUNT_LIMIT, MAX_NESTING_DEPTH as DHCPV6_MAX_NESTING_DEPTH,
    SERVER_PORT as DHCPV6_SERVER_PORT,
};

pub use self::dhcpv6::options::{
    DhcpOption, DnsServersOption, ElapsedTimeOption, IaAddressOption, IaNaOption, IaTaOption,
    OptionClass, OptionCode as Dhcpv6OptionCode, OptionRequestOption, RelayMessageOption,
    StatusCode, StatusCodeOption, UnknownOption,
};

/// Which occurrence bound a container violated.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Violation {
    /// The container may not hold this kind of element at all.
    NotPermitted,
    /// The container holds more than the given maximum.
    TooMany(usize),
    /// The container holds fewer than the given minimum.
    TooFew(usize),
}

/// The error type for parsing, validating and emitting elements.
///
/// Every error is a rejection of malformed input or of misuse; none of them are
/// transient. Errors abort the current parse or save call immediately.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum Error {
    /// A fixed header or a declared length does not fit in the available bytes.
    ///
    /// `offset` is where the missing octets were expected, counted from the start
    /// of the buffer handed to the outermost `parse`.
    Truncated {
        offset: usize,
        expected: usize,
        available: usize,
    },
    /// `load_from` was called on an element whose fixed tag differs from the buffer's.
    TagMismatch {
        element: &'static str,
        expected: u16,
        found: u16,
    },
    /// A scalar field or a list is outside of its domain.
    FieldRange { field: &'static str, max: usize },
    /// A field could not be decoded, e.g. a fixed-size payload of the wrong length.
    Malformed { field: &'static str },
    /// An address field that must not be multicast is.
    MulticastAddress { field: &'static str },
    /// The elements of a container violate one of its occurrence constraints.
    Containment {
        container: &'static str,
        element: &'static str,
        violation: Violation,
    },
    /// Two options of the same classified kind carry the same IAID.
    DuplicateIaid { kind: &'static str, iaid: u32 },
    /// A relay-forward chain embeds something other than a relay-forward or
    /// client/server message.
    RelayChain { found: &'static str },
    /// Elements are nested deeper than the decoder is willing to follow.
    NestingTooDeep { limit: usize },
}

impl Error {
    /// Rebase the offset of a `Truncated` error that was found `by` octets into
    /// an enclosing buffer.
    pub(crate) fn at_offset(self, by: usize) -> Error {
        match self {
            Error::Truncated {
                offset,
                expected,
                available,
            } => Error::Truncated {
                offset: offset + by,
                expected,
                available,
            },
            err => err,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Truncated {
                offset,
                expected,
                available,
            } => write!(
                f,
                "truncated at offset {offset}: need {expected} octets, {available} available"
            ),
            Error::TagMismatch {
                element,
                expected,
                found,
            } => write!(
                f,
                "buffer does not contain {element} data (tag {found}, expected {expected})"
            ),
            Error::FieldRange { field, max } => write!(f, "{field} must not exceed {max}"),
            Error::Malformed { field } => write!(f, "malformed {field}"),
            Error::MulticastAddress { field } => {
                write!(f, "{field} must be a non-multicast IPv6 address")
            }
            Error::Containment {
                container,
                element,
                violation,
            } => match violation {
                Violation::NotPermitted => write!(f, "{container} cannot contain {element}"),
                Violation::TooMany(1) => write!(f, "{container} may only contain 1 {element}"),
                Violation::TooMany(max) => {
                    write!(f, "{container} may only contain {max} {element}s")
                }
                Violation::TooFew(1) => write!(f, "{container} must contain at least 1 {element}"),
                Violation::TooFew(min) => {
                    write!(f, "{container} must contain at least {min} {element}s")
                }
            },
            Error::DuplicateIaid { kind, iaid } => write!(f, "IAID {iaid} of {kind} is not unique"),
            Error::RelayChain { found } => write!(
                f,
                "relay-forward messages can only contain other relay-forward messages \
                 and client/server messages, found {found}"
            ),
            Error::NestingTooDeep { limit } => {
                write!(f, "elements nested deeper than {limit} levels")
            }
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Check that `buffer` holds at least `len` octets starting at `offset`.
pub(crate) fn check_len(buffer: &[u8], offset: usize, len: usize) -> Result<()> {
    let available = buffer.len().saturating_sub(offset);
    if available < len {
        Err(Error::Truncated {
            offset,
            expected: len,
            available,
        })
    } else {
        Ok(())
    }
}
