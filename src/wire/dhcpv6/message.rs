use alloc::vec::Vec;
use core::fmt;

use super::constraints;
use super::options::{
    emit_options, load_options, options_len, validate_options, DhcpOption, OptionClass,
    RelayMessageOption,
};
use super::{field, MessageType, Packet};
use crate::wire::element::{Classify, ContainsTable, StructuredElement};
use crate::wire::ipv6::Address;
use crate::wire::pretty_print::{self, FieldValue, Fields};
use crate::wire::{check_len, Error, Result, Violation};

/// A message with a type this crate does not decode.
///
/// Everything after the type octet is kept verbatim. `message_type` must not be
/// one of the [`MessageType`] variants: validation and [`save`] reject those
/// with `Malformed { field: "msg-type" }`, since the bytes would parse back as
/// the typed message instead.
///
/// [`save`]: StructuredElement::save
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct UnknownMessage {
    pub message_type: u8,
    pub message_data: Vec<u8>,
}

impl UnknownMessage {
    fn validate(&self) -> Result<()> {
        // A known type would be decoded as its typed message instead.
        match MessageType::from(self.message_type) {
            MessageType::Unknown(_) => Ok(()),
            _ => Err(Error::Malformed { field: "msg-type" }),
        }
    }
}

/// The body of a message exchanged between a client and a server.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ClientServerMessage {
    /// Only the low 24 bits are transmitted.
    pub transaction_id: u32,
    pub options: Vec<DhcpOption>,
}

impl ClientServerMessage {
    pub fn new(transaction_id: u32, options: Vec<DhcpOption>) -> Self {
        ClientServerMessage {
            transaction_id,
            options,
        }
    }

    /// Iterate over the options of class `class` or one of its subclasses, in order.
    pub fn options_of_class(&self, class: OptionClass) -> impl Iterator<Item = &DhcpOption> + '_ {
        options_of_class(&self.options, class)
    }

    pub fn option_of_class(&self, class: OptionClass) -> Option<&DhcpOption> {
        self.options_of_class(class).next()
    }

    fn validate_in(&self, table: &ContainsTable<OptionClass>) -> Result<()> {
        if self.transaction_id > 0xff_ffff {
            return Err(Error::FieldRange {
                field: "transaction-id",
                max: 0xff_ffff,
            });
        }
        validate_options(table, &self.options)?;

        let mut seen: Vec<(OptionClass, u32)> = Vec::new();
        for option in &self.options {
            if let Some(iaid) = option.iaid() {
                let class = table
                    .element_class(option.class())
                    .unwrap_or_else(|| option.class());
                if seen.contains(&(class, iaid)) {
                    return Err(Error::DuplicateIaid {
                        kind: class.name(),
                        iaid,
                    });
                }
                seen.push((class, iaid));
            }
        }
        Ok(())
    }
}

/// The body of a message exchanged between relay agents and servers.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct RelayServerMessage {
    pub hop_count: u8,
    pub link_address: Address,
    pub peer_address: Address,
    pub options: Vec<DhcpOption>,
}

impl RelayServerMessage {
    pub fn new(
        hop_count: u8,
        link_address: Address,
        peer_address: Address,
        options: Vec<DhcpOption>,
    ) -> Self {
        RelayServerMessage {
            hop_count,
            link_address,
            peer_address,
            options,
        }
    }

    /// Return the message carried in the relay message option, if any.
    pub fn relayed_message(&self) -> Option<&Message> {
        self.options.iter().find_map(DhcpOption::relayed_message)
    }

    /// Iterate over the options of class `class` or one of its subclasses, in order.
    pub fn options_of_class(&self, class: OptionClass) -> impl Iterator<Item = &DhcpOption> + '_ {
        options_of_class(&self.options, class)
    }

    pub fn option_of_class(&self, class: OptionClass) -> Option<&DhcpOption> {
        self.options_of_class(class).next()
    }

    fn validate_in(&self, table: &ContainsTable<OptionClass>) -> Result<()> {
        if self.link_address.is_multicast() {
            return Err(Error::MulticastAddress {
                field: "link-address",
            });
        }
        if self.peer_address.is_multicast() {
            return Err(Error::MulticastAddress {
                field: "peer-address",
            });
        }
        validate_options(table, &self.options)
    }

    /// Build the relay-reply body answering this relay-forward body.
    fn wrap_response(&self, response: Message) -> Result<RelayServerMessage> {
        let mut response = Some(response);
        let mut options = Vec::new();

        for option in &self.options {
            if option.echo_to_relay() {
                options.push(option.clone());
                continue;
            }

            let relayed = match option.relayed_message() {
                Some(relayed) => relayed,
                None => continue,
            };
            // Only one relay message option can receive the response.
            let response = response.take().ok_or(Error::Containment {
                container: constraints::RELAY_FORWARD_TABLE.container(),
                element: OptionClass::RelayMessage.name(),
                violation: Violation::TooMany(1),
            })?;
            let wrapped = match relayed {
                Message::RelayForward(inner) => {
                    net_trace!(
                        "DHCPv6 relay-repl: wrapping for hop {} via {}",
                        inner.hop_count,
                        inner.link_address
                    );
                    Message::RelayReply(inner.wrap_response(response)?)
                }
                inner if inner.message_type().is_client_server() => response,
                inner => return Err(Error::RelayChain { found: inner.name() }),
            };
            options.push(DhcpOption::RelayMessage(RelayMessageOption::new(wrapped)));
        }

        Ok(RelayServerMessage {
            hop_count: self.hop_count,
            link_address: self.link_address,
            peer_address: self.peer_address,
            options,
        })
    }
}

/// A DHCPv6 message.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Message {
    Solicit(ClientServerMessage),
    Advertise(ClientServerMessage),
    Request(ClientServerMessage),
    Confirm(ClientServerMessage),
    Renew(ClientServerMessage),
    Rebind(ClientServerMessage),
    Reply(ClientServerMessage),
    Release(ClientServerMessage),
    Decline(ClientServerMessage),
    Reconfigure(ClientServerMessage),
    InformationRequest(ClientServerMessage),
    RelayForward(RelayServerMessage),
    RelayReply(RelayServerMessage),
    Unknown(UnknownMessage),
}

enum Body<'a> {
    ClientServer(&'a ClientServerMessage),
    Relay(&'a RelayServerMessage),
    Unknown(&'a UnknownMessage),
}

enum BodyMut<'a> {
    ClientServer(&'a mut ClientServerMessage),
    Relay(&'a mut RelayServerMessage),
    Unknown(&'a mut UnknownMessage),
}

impl Default for Message {
    fn default() -> Self {
        Message::Unknown(UnknownMessage::default())
    }
}

impl Message {
    /// Construct an empty message of type `message_type`.
    pub fn default_for(message_type: MessageType) -> Message {
        match message_type {
            MessageType::Solicit => Message::Solicit(Default::default()),
            MessageType::Advertise => Message::Advertise(Default::default()),
            MessageType::Request => Message::Request(Default::default()),
            MessageType::Confirm => Message::Confirm(Default::default()),
            MessageType::Renew => Message::Renew(Default::default()),
            MessageType::Rebind => Message::Rebind(Default::default()),
            MessageType::Reply => Message::Reply(Default::default()),
            MessageType::Release => Message::Release(Default::default()),
            MessageType::Decline => Message::Decline(Default::default()),
            MessageType::Reconfigure => Message::Reconfigure(Default::default()),
            MessageType::InformationRequest => Message::InformationRequest(Default::default()),
            MessageType::RelayForw => Message::RelayForward(Default::default()),
            MessageType::RelayRepl => Message::RelayReply(Default::default()),
            MessageType::Unknown(message_type) => Message::Unknown(UnknownMessage {
                message_type,
                message_data: Vec::new(),
            }),
        }
    }

    /// Return the message type this message is encoded with.
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Solicit(_) => MessageType::Solicit,
            Message::Advertise(_) => MessageType::Advertise,
            Message::Request(_) => MessageType::Request,
            Message::Confirm(_) => MessageType::Confirm,
            Message::Renew(_) => MessageType::Renew,
            Message::Rebind(_) => MessageType::Rebind,
            Message::Reply(_) => MessageType::Reply,
            Message::Release(_) => MessageType::Release,
            Message::Decline(_) => MessageType::Decline,
            Message::Reconfigure(_) => MessageType::Reconfigure,
            Message::InformationRequest(_) => MessageType::InformationRequest,
            Message::RelayForward(_) => MessageType::RelayForw,
            Message::RelayReply(_) => MessageType::RelayRepl,
            Message::Unknown(message) => MessageType::Unknown(message.message_type),
        }
    }

    fn body(&self) -> Body<'_> {
        match self {
            Message::Solicit(message)
            | Message::Advertise(message)
            | Message::Request(message)
            | Message::Confirm(message)
            | Message::Renew(message)
            | Message::Rebind(message)
            | Message::Reply(message)
            | Message::Release(message)
            | Message::Decline(message)
            | Message::Reconfigure(message)
            | Message::InformationRequest(message) => Body::ClientServer(message),
            Message::RelayForward(message) | Message::RelayReply(message) => Body::Relay(message),
            Message::Unknown(message) => Body::Unknown(message),
        }
    }

    fn body_mut(&mut self) -> BodyMut<'_> {
        match self {
            Message::Solicit(message)
            | Message::Advertise(message)
            | Message::Request(message)
            | Message::Confirm(message)
            | Message::Renew(message)
            | Message::Rebind(message)
            | Message::Reply(message)
            | Message::Release(message)
            | Message::Decline(message)
            | Message::Reconfigure(message)
            | Message::InformationRequest(message) => BodyMut::ClientServer(message),
            Message::RelayForward(message) | Message::RelayReply(message) => {
                BodyMut::Relay(message)
            }
            Message::Unknown(message) => BodyMut::Unknown(message),
        }
    }

    /// Return the occurrence constraints on the options of this message.
    pub fn contains_table(&self) -> ContainsTable<OptionClass> {
        constraints::message_table(self.message_type())
    }

    /// Return the name of the message kind, as used in validation errors.
    pub fn name(&self) -> &'static str {
        self.contains_table().container()
    }

    /// Query whether this message travels from a client (or relay) towards a server.
    pub fn from_client_to_server(&self) -> bool {
        self.message_type().from_client_to_server()
    }

    /// Query whether this message travels from a server towards a client (or relay).
    pub fn from_server_to_client(&self) -> bool {
        self.message_type().from_server_to_client()
    }

    /// Return the transaction ID of a client/server message.
    pub fn transaction_id(&self) -> Option<u32> {
        match self.body() {
            Body::ClientServer(message) => Some(message.transaction_id),
            _ => None,
        }
    }

    /// Return the options of this message. Messages of unknown type have none.
    pub fn options(&self) -> &[DhcpOption] {
        match self.body() {
            Body::ClientServer(message) => &message.options,
            Body::Relay(message) => &message.options,
            Body::Unknown(_) => &[],
        }
    }

    /// Iterate over the options of class `class` or one of its subclasses, in order.
    pub fn options_of_class(&self, class: OptionClass) -> impl Iterator<Item = &DhcpOption> + '_ {
        options_of_class(self.options(), class)
    }

    /// Return the first option of class `class` or one of its subclasses.
    pub fn option_of_class(&self, class: OptionClass) -> Option<&DhcpOption> {
        self.options_of_class(class).next()
    }

    /// Return the message carried by a relay message.
    pub fn relayed_message(&self) -> Option<&Message> {
        match self.body() {
            Body::Relay(message) => message.relayed_message(),
            _ => None,
        }
    }

    /// Follow a relay chain down to the message the client sent, or the message
    /// the server answers with.
    ///
    /// Returns `self` for anything that is not a relay message.
    pub fn inner_message(&self) -> &Message {
        let mut message = self;
        while let Some(relayed) = message.relayed_message() {
            message = relayed;
        }
        message
    }

    /// Construct the relay-reply chain that delivers `response` back along the
    /// path this relay-forward message took.
    ///
    /// Every level of the new chain copies the hop count and addresses of the
    /// matching relay-forward level, and echoes the options relay agents expect
    /// back (see [`DhcpOption::echo_to_relay`]). `response` takes the place of
    /// the client/server message at the bottom of the chain. Other options are
    /// not copied.
    ///
    /// # Errors
    /// Returns `Error::RelayChain` if `self` is not a relay-forward message, or
    /// if the chain contains anything but relay-forward messages above one
    /// client/server message.
    pub fn wrap_response(&self, response: Message) -> Result<Message> {
        match self {
            Message::RelayForward(message) => {
                net_trace!(
                    "DHCPv6 relay-repl: wrapping for hop {} via {}",
                    message.hop_count,
                    message.link_address
                );
                Ok(Message::RelayReply(message.wrap_response(response)?))
            }
            other => Err(Error::RelayChain {
                found: other.name(),
            }),
        }
    }

    pub(crate) fn parse_nested(buffer: &[u8], depth: usize) -> Result<(usize, Self)> {
        let message_type = Self::determine_class(buffer)?;
        let mut message = Self::new_of_class(message_type);
        let len = message.load_nested(buffer, depth)?;
        Ok((len, message))
    }

    pub(crate) fn load_nested(&mut self, buffer: &[u8], depth: usize) -> Result<usize> {
        check_len(buffer, 0, field::MTYPE + 1)?;
        let found = buffer[field::MTYPE];

        if let Message::Unknown(message) = self {
            message.message_type = found;
            message.message_data = buffer[field::MTYPE + 1..].to_vec();
        } else {
            let expected = u8::from(self.message_type());
            if found != expected {
                return Err(Error::TagMismatch {
                    element: self.name(),
                    expected: expected.into(),
                    found: found.into(),
                });
            }

            let packet = Packet::new_checked(buffer)?;
            let options = load_options(packet.payload(), packet.header_len(), depth + 1)?;
            match self.body_mut() {
                BodyMut::ClientServer(message) => {
                    message.transaction_id = packet.transaction_id();
                    message.options = options;
                }
                BodyMut::Relay(message) => {
                    message.hop_count = packet.hop_count();
                    message.link_address = packet.link_address();
                    message.peer_address = packet.peer_address();
                    message.options = options;
                }
                BodyMut::Unknown(_) => {}
            }
        }

        self.validate()?;
        Ok(buffer.len())
    }
}

impl StructuredElement for Message {
    type Class = MessageType;

    fn determine_class(buffer: &[u8]) -> Result<MessageType> {
        check_len(buffer, 0, field::MTYPE + 1)?;
        let message_type = MessageType::from(buffer[field::MTYPE]);
        if let MessageType::Unknown(tag) = message_type {
            net_debug!("DHCPv6 message type {} unrecognized, keeping it opaque", tag);
        }
        Ok(message_type)
    }

    fn new_of_class(message_type: MessageType) -> Self {
        Message::default_for(message_type)
    }

    /// Fill this message in from all of `buffer`.
    ///
    /// A message always consumes its whole buffer; the enclosing datagram or
    /// relay message option determines its length.
    fn load_from(&mut self, buffer: &[u8]) -> Result<usize> {
        self.load_nested(buffer, 0)
    }

    fn validate(&self) -> Result<()> {
        let table = self.contains_table();
        match self.body() {
            Body::ClientServer(message) => message.validate_in(&table),
            Body::Relay(message) => message.validate_in(&table),
            Body::Unknown(message) => message.validate(),
        }
    }

    fn buffer_len(&self) -> usize {
        match self.body() {
            Body::ClientServer(message) => field::OPTIONS.start + options_len(&message.options),
            Body::Relay(message) => field::RELAY_OPTIONS.start + options_len(&message.options),
            Body::Unknown(message) => field::MTYPE + 1 + message.message_data.len(),
        }
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        check_len(buffer, 0, self.buffer_len())?;

        if let Body::Unknown(message) = self.body() {
            buffer[field::MTYPE] = message.message_type;
            let data = &mut buffer[field::MTYPE + 1..field::MTYPE + 1 + message.message_data.len()];
            data.copy_from_slice(&message.message_data);
            return Ok(());
        }

        let mut packet = Packet::new_unchecked(buffer);
        packet.set_msg_type(self.message_type());
        match self.body() {
            Body::ClientServer(message) => {
                packet.set_transaction_id(message.transaction_id);
                emit_options(&mut packet.options_mut(), &message.options)
            }
            Body::Relay(message) => {
                packet.set_hop_count(message.hop_count);
                packet.set_link_address(message.link_address);
                packet.set_peer_address(message.peer_address);
                emit_options(&mut packet.options_mut(), &message.options)
            }
            Body::Unknown(_) => Ok(()),
        }
    }
}

fn options_of_class(
    options: &[DhcpOption],
    class: OptionClass,
) -> impl Iterator<Item = &DhcpOption> + '_ {
    options
        .iter()
        .filter(move |option| option.class().is_a(class))
}

fn list(options: &[DhcpOption]) -> FieldValue<'_> {
    FieldValue::List(options.iter().map(|o| o as &dyn Fields).collect())
}

impl Fields for Message {
    fn element_name(&self) -> &'static str {
        self.name()
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        match self.body() {
            Body::ClientServer(message) => alloc::vec![
                ("transaction_id", FieldValue::Scalar(&message.transaction_id)),
                ("options", list(&message.options)),
            ],
            Body::Relay(message) => alloc::vec![
                ("hop_count", FieldValue::Scalar(&message.hop_count)),
                ("link_address", FieldValue::Scalar(&message.link_address)),
                ("peer_address", FieldValue::Scalar(&message.peer_address)),
                ("options", list(&message.options)),
            ],
            Body::Unknown(message) => alloc::vec![
                ("message_type", FieldValue::Scalar(&message.message_type)),
                ("message_data", FieldValue::Bytes(&message.message_data)),
            ],
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&pretty_print::render(self))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wire::dhcpv6::options::{ElapsedTimeOption, IaNaOption, IaTaOption, UnknownOption};
    use crate::wire::dhcpv6::MAX_NESTING_DEPTH;
    use alloc::string::ToString;
    use alloc::vec;

    const LINK_ADDR: Address = Address::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);
    const PEER_ADDR: Address = Address::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);

    static SOLICIT_BYTES: [u8; 18] = [
        0x01, 0x12, 0x34, 0x56, // msg-type, transaction-id
        0x00, 0x01, 0x00, 0x04, 0xde, 0xad, 0xbe, 0xef, // client-id
        0x00, 0x08, 0x00, 0x02, 0x00, 0x00, // elapsed-time
    ];

    fn solicit() -> Message {
        Message::Solicit(ClientServerMessage::new(
            0x123456,
            vec![
                DhcpOption::ClientId(vec![0xde, 0xad, 0xbe, 0xef]),
                DhcpOption::ElapsedTime(ElapsedTimeOption { elapsed_time: 0 }),
            ],
        ))
    }

    fn reply() -> Message {
        Message::Reply(ClientServerMessage::new(
            0x123456,
            vec![
                DhcpOption::ClientId(vec![0xde, 0xad, 0xbe, 0xef]),
                DhcpOption::ServerId(vec![0x00, 0x01]),
            ],
        ))
    }

    fn relay_forward(hop_count: u8, options: Vec<DhcpOption>) -> Message {
        Message::RelayForward(RelayServerMessage::new(
            hop_count, LINK_ADDR, PEER_ADDR, options,
        ))
    }

    fn relay_option(message: Message) -> DhcpOption {
        DhcpOption::RelayMessage(RelayMessageOption::new(message))
    }

    #[test]
    fn test_parse_solicit() {
        let (len, message) = Message::parse(&SOLICIT_BYTES).unwrap();
        assert_eq!(len, SOLICIT_BYTES.len());
        assert_eq!(message, solicit());
        assert_eq!(message.transaction_id(), Some(0x123456));
        assert!(message.from_client_to_server());
        assert!(!message.from_server_to_client());
    }

    #[test]
    fn test_emit_solicit() {
        assert_eq!(solicit().save().unwrap(), &SOLICIT_BYTES[..]);
        assert_eq!(solicit().buffer_len(), SOLICIT_BYTES.len());
    }

    #[test]
    fn test_parse_at_bounds() {
        let mut bytes = vec![0xaa, 0xbb];
        bytes.extend_from_slice(&SOLICIT_BYTES);
        bytes.push(0xcc);
        let (len, message) = Message::parse_at(&bytes, 2, Some(SOLICIT_BYTES.len())).unwrap();
        assert_eq!(len, SOLICIT_BYTES.len());
        assert_eq!(message, solicit());

        // The declared length cuts the elapsed-time option short.
        assert_eq!(
            Message::parse_at(&bytes, 2, Some(SOLICIT_BYTES.len() - 1)),
            Err(Error::Truncated {
                offset: 2 + 16,
                expected: 2,
                available: 1,
            })
        );
    }

    #[test]
    fn test_parse_at_offset_past_end() {
        assert_eq!(
            Message::parse_at(&[1, 2], 5, None),
            Err(Error::Truncated {
                offset: 0,
                expected: 5,
                available: 2,
            })
        );
        assert_eq!(
            Message::parse_at(&[1, 2], 3, Some(1)),
            Err(Error::Truncated {
                offset: 0,
                expected: 3,
                available: 2,
            })
        );
        // Starting right at the end leaves nothing to read the type from.
        assert_eq!(
            Message::parse_at(&[1, 2], 2, None),
            Err(Error::Truncated {
                offset: 2,
                expected: 1,
                available: 0,
            })
        );
    }

    #[test]
    fn test_unknown_fallback() {
        let bytes = [0xc8, 0x01, 0x02, 0x03];
        let (len, message) = Message::parse(&bytes).unwrap();
        assert_eq!(len, 4);
        assert_eq!(
            message,
            Message::Unknown(UnknownMessage {
                message_type: 200,
                message_data: vec![1, 2, 3],
            })
        );
        assert_eq!(message.message_type(), MessageType::Unknown(200));
        assert!(message.options().is_empty());
        assert_eq!(message.save().unwrap(), &bytes[..]);

        for tag in [0u8, 14, 255] {
            let (_, message) = Message::parse(&[tag]).unwrap();
            assert_eq!(message.message_type(), MessageType::Unknown(tag));
        }
    }

    #[test]
    fn test_unknown_message_with_known_type() {
        let message = Message::Unknown(UnknownMessage {
            message_type: 7,
            message_data: vec![],
        });
        assert_eq!(message.save(), Err(Error::Malformed { field: "msg-type" }));
    }

    #[test]
    fn test_tag_mismatch() {
        let mut message = Message::default_for(MessageType::Advertise);
        assert_eq!(
            message.load_from(&SOLICIT_BYTES),
            Err(Error::TagMismatch {
                element: "Advertise",
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn test_transaction_id_range() {
        let message = Message::Solicit(ClientServerMessage::new(
            0x100_0000,
            vec![
                DhcpOption::ClientId(vec![1]),
                DhcpOption::ElapsedTime(ElapsedTimeOption::default()),
            ],
        ));
        assert_eq!(
            message.save(),
            Err(Error::FieldRange {
                field: "transaction-id",
                max: 0xff_ffff,
            })
        );
    }

    #[test]
    fn test_containment() {
        let message = Message::Solicit(ClientServerMessage::new(
            1,
            vec![
                DhcpOption::ClientId(vec![1]),
                DhcpOption::ClientId(vec![2]),
                DhcpOption::ElapsedTime(ElapsedTimeOption::default()),
            ],
        ));
        assert_eq!(
            message.validate(),
            Err(Error::Containment {
                container: "Solicit",
                element: "ClientIdOption",
                violation: Violation::TooMany(1),
            })
        );

        let message = Message::Solicit(ClientServerMessage::new(
            1,
            vec![DhcpOption::ElapsedTime(ElapsedTimeOption::default())],
        ));
        assert_eq!(
            message.validate(),
            Err(Error::Containment {
                container: "Solicit",
                element: "ClientIdOption",
                violation: Violation::TooFew(1),
            })
        );

        let message = Message::Solicit(ClientServerMessage::new(
            1,
            vec![
                DhcpOption::ClientId(vec![1]),
                DhcpOption::ServerId(vec![2]),
                DhcpOption::ElapsedTime(ElapsedTimeOption::default()),
            ],
        ));
        assert_eq!(
            message.validate(),
            Err(Error::Containment {
                container: "Solicit",
                element: "ServerIdOption",
                violation: Violation::NotPermitted,
            })
        );
    }

    #[test]
    fn test_forbidden_ia() {
        let message = Message::InformationRequest(ClientServerMessage::new(
            1,
            vec![
                DhcpOption::ElapsedTime(ElapsedTimeOption::default()),
                DhcpOption::IaTa(IaTaOption::default()),
            ],
        ));
        assert_eq!(
            message.validate(),
            Err(Error::Containment {
                container: "InformationRequest",
                element: "IaTaOption",
                violation: Violation::NotPermitted,
            })
        );
    }

    #[test]
    fn test_unknown_options_allowed() {
        let message = Message::Solicit(ClientServerMessage::new(
            1,
            vec![
                DhcpOption::ClientId(vec![1]),
                DhcpOption::Unknown(UnknownOption {
                    option_code: 0x1234,
                    option_data: vec![9],
                }),
                DhcpOption::ElapsedTime(ElapsedTimeOption::default()),
            ],
        ));
        let bytes = message.save().unwrap();
        assert_eq!(Message::parse(&bytes).unwrap(), (bytes.len(), message));
    }

    fn ia_na(iaid: u32) -> DhcpOption {
        DhcpOption::IaNa(IaNaOption {
            iaid,
            ..Default::default()
        })
    }

    fn ia_ta(iaid: u32) -> DhcpOption {
        DhcpOption::IaTa(IaTaOption {
            iaid,
            ..Default::default()
        })
    }

    fn request(options: &[DhcpOption]) -> Message {
        let mut all = vec![
            DhcpOption::ClientId(vec![1]),
            DhcpOption::ServerId(vec![2]),
            DhcpOption::ElapsedTime(ElapsedTimeOption::default()),
        ];
        all.extend_from_slice(options);
        Message::Request(ClientServerMessage::new(1, all))
    }

    #[test]
    fn test_options_of_class() {
        let message = request(&[ia_na(1), ia_ta(2), ia_na(3)]);
        let iaids: Vec<u32> = message
            .options_of_class(OptionClass::Ia)
            .filter_map(DhcpOption::iaid)
            .collect();
        assert_eq!(iaids, vec![1, 2, 3]);
        assert_eq!(message.option_of_class(OptionClass::IaTa).and_then(DhcpOption::iaid), Some(2));
        assert_eq!(message.options_of_class(OptionClass::Any).count(), 6);
        assert!(message.option_of_class(OptionClass::RelayMessage).is_none());

        if let Message::Request(body) = &message {
            assert_eq!(body.options_of_class(OptionClass::ServerId).count(), 1);
        }
    }

    #[test]
    fn test_iaid_uniqueness() {
        assert_eq!(request(&[ia_na(1), ia_na(2)]).validate(), Ok(()));
        assert_eq!(
            request(&[ia_na(1), ia_na(1)]).validate(),
            Err(Error::DuplicateIaid {
                kind: "IaNaOption",
                iaid: 1,
            })
        );
        // Different classified kinds may share an IAID.
        assert_eq!(request(&[ia_na(1), ia_ta(1)]).validate(), Ok(()));
        assert_eq!(
            request(&[ia_ta(0), ia_ta(0)]).validate(),
            Err(Error::DuplicateIaid {
                kind: "IaTaOption",
                iaid: 0,
            })
        );
    }

    #[test]
    fn test_relay_multicast_addresses() {
        let mut relay = RelayServerMessage::new(0, LINK_ADDR, PEER_ADDR, vec![relay_option(solicit())]);
        assert_eq!(Message::RelayForward(relay.clone()).validate(), Ok(()));

        relay.link_address = Address::ALL_DHCP_RELAY_AGENTS_AND_SERVERS;
        assert_eq!(
            Message::RelayForward(relay.clone()).validate(),
            Err(Error::MulticastAddress {
                field: "link-address"
            })
        );

        relay.link_address = LINK_ADDR;
        relay.peer_address = Address::ALL_DHCP_RELAY_AGENTS_AND_SERVERS;
        assert_eq!(
            Message::RelayReply(relay).validate(),
            Err(Error::MulticastAddress {
                field: "peer-address"
            })
        );
    }

    #[test]
    fn test_relay_requires_relay_message() {
        assert_eq!(
            relay_forward(0, vec![DhcpOption::InterfaceId(vec![1])]).validate(),
            Err(Error::Containment {
                container: "RelayForward",
                element: "RelayMessageOption",
                violation: Violation::TooFew(1),
            })
        );
    }

    #[test]
    fn test_relay_round_trip() {
        let message = relay_forward(
            1,
            vec![
                DhcpOption::InterfaceId(vec![0x65, 0x74, 0x68, 0x30]),
                relay_option(solicit()),
            ],
        );
        let bytes = message.save().unwrap();
        assert_eq!(bytes.len(), 34 + 8 + 4 + SOLICIT_BYTES.len());
        assert_eq!(&bytes[46..], &SOLICIT_BYTES[..]);

        let (len, parsed) = Message::parse(&bytes).unwrap();
        assert_eq!(len, bytes.len());
        assert_eq!(parsed, message);
        assert_eq!(parsed.relayed_message(), Some(&solicit()));
        assert_eq!(parsed.inner_message(), &solicit());
    }

    #[test]
    fn test_wrap_response() {
        let interface_id = DhcpOption::InterfaceId(vec![0x65, 0x74, 0x68, 0x30]);
        let forward = relay_forward(
            1,
            vec![
                interface_id.clone(),
                DhcpOption::Unknown(UnknownOption {
                    option_code: 0x99,
                    option_data: vec![],
                }),
                relay_option(solicit()),
            ],
        );

        let wrapped = forward.wrap_response(reply()).unwrap();
        assert_eq!(
            wrapped,
            Message::RelayReply(RelayServerMessage::new(
                1,
                LINK_ADDR,
                PEER_ADDR,
                vec![interface_id, relay_option(reply())],
            ))
        );
        assert!(wrapped.from_server_to_client());
        assert_eq!(wrapped.inner_message(), &reply());
        assert!(wrapped.save().is_ok());
    }

    #[test]
    fn test_wrap_response_nested() {
        let inner = relay_forward(0, vec![relay_option(solicit())]);
        let outer = relay_forward(1, vec![relay_option(inner)]);

        let wrapped = outer.wrap_response(reply()).unwrap();
        let expected_inner = Message::RelayReply(RelayServerMessage::new(
            0,
            LINK_ADDR,
            PEER_ADDR,
            vec![relay_option(reply())],
        ));
        let expected = Message::RelayReply(RelayServerMessage::new(
            1,
            LINK_ADDR,
            PEER_ADDR,
            vec![relay_option(expected_inner)],
        ));
        assert_eq!(wrapped, expected);
    }

    #[test]
    fn test_wrap_response_invalid_embedding() {
        let unknown = Message::Unknown(UnknownMessage {
            message_type: 200,
            message_data: vec![],
        });
        let forward = relay_forward(0, vec![relay_option(unknown)]);
        assert_eq!(
            forward.wrap_response(reply()),
            Err(Error::RelayChain {
                found: "UnknownMessage"
            })
        );

        let reply_relay = relay_forward(0, vec![relay_option(solicit())])
            .wrap_response(reply())
            .unwrap();
        let forward = relay_forward(1, vec![relay_option(reply_relay.clone())]);
        assert_eq!(
            forward.wrap_response(reply()),
            Err(Error::RelayChain {
                found: "RelayReply"
            })
        );

        assert_eq!(
            reply_relay.wrap_response(reply()),
            Err(Error::RelayChain {
                found: "RelayReply"
            })
        );
    }

    #[test]
    fn test_nesting_too_deep() {
        let mut message = solicit();
        for hop in 0..=MAX_NESTING_DEPTH {
            message = relay_forward(hop as u8, vec![relay_option(message)]);
        }
        let bytes = message.save().unwrap();
        assert_eq!(
            Message::parse(&bytes),
            Err(Error::NestingTooDeep {
                limit: MAX_NESTING_DEPTH
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            solicit().to_string(),
            "Solicit(\n  transaction_id=1193046,\n  options=[\n    \
             ClientIdOption(duid=0xdeadbeef),\n    \
             ElapsedTimeOption(elapsed_time=0),\n  ],\n)"
        );
    }
}
