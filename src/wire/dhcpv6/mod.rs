// See https://datatracker.ietf.org/doc/html/rfc8415 for the DHCPv6 specification.

use byteorder::{ByteOrder, NetworkEndian};
use core::{fmt, iter};

use super::ipv6::Address;
use super::pretty_print::{PrettyIndent, PrettyPrint};
use super::{check_len, Error, Result, StructuredElement};

mod constraints;
mod message;
pub mod options;

pub use self::message::{ClientServerMessage, Message, RelayServerMessage, UnknownMessage};

pub const SERVER_PORT: u16 = 547;
pub const CLIENT_PORT: u16 = 546;
/// The maximum hop count a relay agent accepts in a relay-forward message.
pub const HOP_COUNT_LIMIT: u8 = 32;
/// How deep relayed messages and option sub-trees may be nested in a decoded buffer.
///
/// Allows a full relay chain plus the client message and its IA sub-options.
pub const MAX_NESTING_DEPTH: usize = HOP_COUNT_LIMIT as usize + 8;
pub const MAX_REQUEST_OPTIONS: usize = 16;
pub const MAX_DNS_ADDRESSES: usize = 16;

enum_with_unknown! {
    /// The possible message types of a DHCPv6 packet.
    pub enum MessageType(u8) {
        Solicit = 1,
        Advertise = 2,
        Request = 3,
        Confirm = 4,
        Renew = 5,
        Rebind = 6,
        Reply = 7,
        Release = 8,
        Decline = 9,
        Reconfigure = 10,
        InformationRequest = 11,
        RelayForw = 12,
        RelayRepl = 13,
    }
}

impl MessageType {
    /// Query whether messages of this type use the client/server header layout.
    pub fn is_client_server(&self) -> bool {
        !matches!(
            *self,
            MessageType::RelayForw | MessageType::RelayRepl | MessageType::Unknown(_)
        )
    }

    /// Query whether messages of this type use the relay agent header layout.
    pub fn is_relay(&self) -> bool {
        matches!(*self, MessageType::RelayForw | MessageType::RelayRepl)
    }

    /// Query whether messages of this type travel from clients (or relays) towards servers.
    pub fn from_client_to_server(&self) -> bool {
        matches!(
            *self,
            MessageType::Solicit
                | MessageType::Request
                | MessageType::Confirm
                | MessageType::Renew
                | MessageType::Rebind
                | MessageType::Release
                | MessageType::Decline
                | MessageType::InformationRequest
                | MessageType::RelayForw
        )
    }

    /// Query whether messages of this type travel from servers towards clients (or relays).
    pub fn from_server_to_client(&self) -> bool {
        matches!(
            *self,
            MessageType::Advertise
                | MessageType::Reply
                | MessageType::Reconfigure
                | MessageType::RelayRepl
        )
    }

    /// Return the length of the fixed header of messages of this type.
    pub fn header_len(&self) -> usize {
        if self.is_relay() {
            field::RELAY_OPTIONS.start
        } else if self.is_client_server() {
            field::OPTIONS.start
        } else {
            field::MTYPE + 1
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Solicit => write!(f, "solicit"),
            Self::Advertise => write!(f, "advertise"),
            Self::Request => write!(f, "request"),
            Self::Confirm => write!(f, "confirm"),
            Self::Renew => write!(f, "renew"),
            Self::Rebind => write!(f, "rebind"),
            Self::Reply => write!(f, "reply"),
            Self::Release => write!(f, "release"),
            Self::Decline => write!(f, "decline"),
            Self::Reconfigure => write!(f, "reconfigure"),
            Self::InformationRequest => write!(f, "information-request"),
            Self::RelayForw => write!(f, "relay-forw"),
            Self::RelayRepl => write!(f, "relay-repl"),
            Self::Unknown(a) => write!(f, "unknown({a})"),
        }
    }
}

/// A writer that appends DHCPv6 options to a buffer.
#[derive(Debug)]
pub struct OptionWriter<'a> {
    /// The part of the buffer that has not been written to yet.
    buffer: &'a mut [u8],
}

impl<'a> OptionWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer }
    }

    /// Return the number of octets that can still be written.
    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a mut [u8]> {
        if self.buffer.len() < len {
            return Err(Error::Truncated {
                offset: 0,
                expected: len,
                available: self.buffer.len(),
            });
        }
        let (buf, rest) = core::mem::take(&mut self.buffer).split_at_mut(len);
        self.buffer = rest;
        Ok(buf)
    }

    /// Emit a [`RawOption`] into the buffer.
    pub fn emit(&mut self, option: RawOption<'_>) -> Result<()> {
        let buf = self.take(field::OPT_DATA.start + option.data.len())?;
        option.emit_header(buf)?;
        buf[field::OPT_DATA].copy_from_slice(option.data);
        Ok(())
    }

    /// Emit a structured element into the buffer.
    pub fn emit_element<E: StructuredElement>(&mut self, element: &E) -> Result<()> {
        let buf = self.take(element.buffer_len())?;
        element.emit(buf)
    }
}

// The format of DHCP options is:

// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |          option-code          |           option-len          |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                          option-data                          |
// |                      (option-len octets)                      |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// option-code          An unsigned integer identifying the specific
//                      option type carried in this option.
//                      A 2-octet field.
//
// option-len           An unsigned integer giving the length of the
//                      option-data field in this option in octets.
//                      A 2-octet field.
//
// option-data          The data for the option; the format of this
//                      data depends on the definition of the option.
//
/// A single DHCPv6 option as it appears on the wire, without interpretation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RawOption<'a> {
    pub kind: u16,
    pub data: &'a [u8],
}

impl<'a> RawOption<'a> {
    /// Split the option at the start of `buffer` off, returning the number of
    /// octets it occupies.
    pub fn parse(buffer: &'a [u8]) -> Result<(usize, Self)> {
        check_len(buffer, 0, field::OPT_DATA.start)?;
        let kind = NetworkEndian::read_u16(&buffer[field::OPT_CODE]);
        let len = NetworkEndian::read_u16(&buffer[field::OPT_LEN]) as usize;
        check_len(buffer, field::OPT_DATA.start, len)?;

        let total_len = field::OPT_DATA.start + len;
        Ok((
            total_len,
            RawOption {
                kind,
                data: &buffer[field::OPT_DATA.start..total_len],
            },
        ))
    }

    /// Write the option code and the length of `data` into the first four
    /// octets of `buffer`.
    pub(crate) fn emit_header(&self, buffer: &mut [u8]) -> Result<()> {
        write_option_header(buffer, self.kind, self.data.len())
    }
}

/// Write an option header for `data_len` octets of option data.
pub(crate) fn write_option_header(buffer: &mut [u8], kind: u16, data_len: usize) -> Result<()> {
    if data_len > u16::MAX as usize {
        return Err(Error::FieldRange {
            field: "option-len",
            max: u16::MAX as usize,
        });
    }
    check_len(buffer, 0, field::OPT_DATA.start)?;
    NetworkEndian::write_u16(&mut buffer[field::OPT_CODE], kind);
    NetworkEndian::write_u16(&mut buffer[field::OPT_LEN], data_len as u16);
    Ok(())
}

/// Return an iterator over the options in `buf`.
///
/// The iterator stops at the end of the buffer, or at the first option that
/// claims more octets than remain.
#[inline]
pub fn parse_options(mut buf: &[u8]) -> impl Iterator<Item = RawOption<'_>> + '_ {
    iter::from_fn(move || match RawOption::parse(buf) {
        Ok((len, option)) => {
            buf = &buf[len..];
            Some(option)
        }
        Err(_) => None,
    })
}

/// A read/write wrapper around a DHCPv6 message buffer.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

pub(crate) mod field {
    #![allow(non_snake_case)]
    #![allow(unused)]

    use crate::wire::field::*;

    pub const MTYPE: usize = 0;

    // Client/server messages.
    pub const XID: Field = 1..4;
    pub const OPTIONS: Rest = 4..;

    // Relay agent messages.
    pub const HOP_COUNT: usize = 1;
    pub const LINK_ADDR: Field = 2..18;
    pub const PEER_ADDR: Field = 18..34;
    pub const RELAY_OPTIONS: Rest = 34..;

    // Options.
    pub const OPT_CODE: Field = 0..2;
    pub const OPT_LEN: Field = 2..4;
    pub const OPT_DATA: Rest = 4..;
}

impl<T: AsRef<[u8]>> Packet<T> {
    /// Imbue a raw octet buffer with DHCPv6 message structure.
    pub const fn new_unchecked(buffer: T) -> Packet<T> {
        Packet { buffer }
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(buffer: T) -> Result<Packet<T>> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error::Truncated)` if the buffer is too short to hold the
    /// fixed header of its message type.
    pub fn check_len(&self) -> Result<()> {
        let buffer = self.buffer.as_ref();
        check_len(buffer, 0, field::MTYPE + 1)?;
        check_len(buffer, 0, self.msg_type().header_len())
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Returns the message type.
    pub fn msg_type(&self) -> MessageType {
        MessageType::from(self.buffer.as_ref()[field::MTYPE])
    }

    /// Returns the length of the fixed header.
    pub fn header_len(&self) -> usize {
        self.msg_type().header_len()
    }

    /// Returns the transaction ID of a client/server message.
    ///
    /// The transaction ID is a random number chosen by the client, used by the
    /// client and server to associate messages and responses.
    pub fn transaction_id(&self) -> u32 {
        let field = &self.buffer.as_ref()[field::XID];
        NetworkEndian::read_u24(field)
    }

    /// Returns the number of relay agents that have already relayed a relay agent message.
    pub fn hop_count(&self) -> u8 {
        self.buffer.as_ref()[field::HOP_COUNT]
    }

    /// Returns the link address of a relay agent message.
    pub fn link_address(&self) -> Address {
        Address::from_bytes(&self.buffer.as_ref()[field::LINK_ADDR])
    }

    /// Returns the peer address of a relay agent message.
    pub fn peer_address(&self) -> Address {
        Address::from_bytes(&self.buffer.as_ref()[field::PEER_ADDR])
    }

    /// Return everything after the fixed header: the options, or the opaque
    /// payload of a message of unknown type.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[self.header_len()..]
    }

    /// Return an iterator over the options.
    #[inline]
    pub fn options(&self) -> impl Iterator<Item = RawOption<'_>> + '_ {
        parse_options(self.payload())
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Sets the message type.
    pub fn set_msg_type(&mut self, value: MessageType) {
        let field = &mut self.buffer.as_mut()[field::MTYPE];
        *field = value.into();
    }

    /// Sets the transaction ID.
    ///
    /// Only the low 24 bits of `value` are used.
    pub fn set_transaction_id(&mut self, value: u32) {
        let value = value & 0xff_ffff;
        let field = &mut self.buffer.as_mut()[field::XID];
        NetworkEndian::write_u24(field, value)
    }

    /// Sets the hop count of a relay agent message.
    pub fn set_hop_count(&mut self, value: u8) {
        self.buffer.as_mut()[field::HOP_COUNT] = value;
    }

    /// Sets the link address of a relay agent message.
    pub fn set_link_address(&mut self, value: Address) {
        self.buffer.as_mut()[field::LINK_ADDR].copy_from_slice(value.as_bytes());
    }

    /// Sets the peer address of a relay agent message.
    pub fn set_peer_address(&mut self, value: Address) {
        self.buffer.as_mut()[field::PEER_ADDR].copy_from_slice(value.as_bytes());
    }

    /// Return a mutable pointer to everything after the fixed header.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut [u8] {
        let header_len = self.header_len();
        &mut self.buffer.as_mut()[header_len..]
    }
}

impl<'a, T: AsRef<[u8]> + AsMut<[u8]> + ?Sized> Packet<&'a mut T> {
    /// Return a writer for the options.
    #[inline]
    pub fn options_mut(&mut self) -> OptionWriter<'_> {
        OptionWriter::new(self.payload_mut())
    }
}

impl<'a, T: AsRef<[u8]> + ?Sized> fmt::Display for Packet<&'a T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Message::parse(self.buffer.as_ref()) {
            Ok((_, message)) => write!(f, "{message}"),
            Err(err) => write!(f, "DHCPv6 ({err})"),
        }
    }
}

impl<T: AsRef<[u8]>> PrettyPrint for Packet<T> {
    fn pretty_print(
        buffer: &dyn AsRef<[u8]>,
        f: &mut fmt::Formatter,
        indent: &mut PrettyIndent,
    ) -> fmt::Result {
        let packet = match Packet::new_checked(buffer.as_ref()) {
            Err(err) => return writeln!(f, "{indent}({err})"),
            Ok(packet) => packet,
        };
        let message = match Message::parse(buffer.as_ref()) {
            Err(err) => return writeln!(f, "{indent}DHCPv6 {} ({err})", packet.msg_type()),
            Ok((_, message)) => message,
        };

        let rendered = alloc::format!("{message}");
        let mut lines = rendered.lines();
        if let Some(first) = lines.next() {
            writeln!(f, "{indent}{first}")?;
        }
        indent.increase(f)?;
        for line in lines {
            writeln!(f, "{indent}{line}")?;
        }
        Ok(())
    }
}
