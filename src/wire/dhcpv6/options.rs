/*! Typed DHCPv6 options.

An option is decoded from its two-octet code into one variant of [`DhcpOption`].
Codes this crate does not know are kept as [`UnknownOption`] with their data
untouched, so that they survive a parse/save cycle.

Options that nest other options (`IA_NA`, `IA_TA` and `IAADDR`) check their
sub-options against their own occurrence constraints, the same way messages do.
*/

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use byteorder::{ByteOrder, NetworkEndian};
use core::fmt;

use super::constraints;
use super::message::Message;
use super::{
    field, write_option_header, OptionWriter, MAX_DNS_ADDRESSES, MAX_NESTING_DEPTH,
    MAX_REQUEST_OPTIONS,
};
use crate::wire::element::{Classify, ContainsTable, StructuredElement};
use crate::wire::ipv6::{Address, ADDR_SIZE};
use crate::wire::pretty_print::{self, FieldValue, Fields};
use crate::wire::{check_len, Error, Result};

enum_with_unknown! {
    /// The option codes decoded into typed options.
    pub enum OptionCode(u16) {
        ClientId = 1,
        ServerId = 2,
        IaNa = 3,
        IaTa = 4,
        IaAddress = 5,
        OptionRequest = 6,
        ElapsedTime = 8,
        RelayMessage = 9,
        StatusCode = 13,
        InterfaceId = 18,
        DnsServers = 23,
    }
}

/// The classes options are counted as by occurrence constraints.
///
/// `Any` is the root of the hierarchy. `IaNa` and `IaTa` are both kinds of `Ia`,
/// so a container declaring `Ia` counts them together.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum OptionClass {
    Any,
    Ia,
    IaNa,
    IaTa,
    ClientId,
    ServerId,
    IaAddress,
    OptionRequest,
    ElapsedTime,
    RelayMessage,
    StatusCode,
    InterfaceId,
    DnsServers,
    Unknown,
}

impl Classify for OptionClass {
    fn parent(self) -> Option<Self> {
        match self {
            OptionClass::Any => None,
            OptionClass::IaNa | OptionClass::IaTa => Some(OptionClass::Ia),
            _ => Some(OptionClass::Any),
        }
    }

    fn name(self) -> &'static str {
        match self {
            OptionClass::Any => "Option",
            OptionClass::Ia => "IaOption",
            OptionClass::IaNa => "IaNaOption",
            OptionClass::IaTa => "IaTaOption",
            OptionClass::ClientId => "ClientIdOption",
            OptionClass::ServerId => "ServerIdOption",
            OptionClass::IaAddress => "IaAddressOption",
            OptionClass::OptionRequest => "OptionRequestOption",
            OptionClass::ElapsedTime => "ElapsedTimeOption",
            OptionClass::RelayMessage => "RelayMessageOption",
            OptionClass::StatusCode => "StatusCodeOption",
            OptionClass::InterfaceId => "InterfaceIdOption",
            OptionClass::DnsServers => "RecursiveNameServersOption",
            OptionClass::Unknown => "UnknownOption",
        }
    }
}

enum_with_unknown! {
    /// Status codes carried in a status code option.
    pub enum StatusCode(u16) {
        Success = 0,
        UnspecFail = 1,
        NoAddrsAvail = 2,
        NoBinding = 3,
        NotOnLink = 4,
        UseMulticast = 5,
        NoPrefixAvail = 6,
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::Success
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StatusCode::Success => write!(f, "Success"),
            StatusCode::UnspecFail => write!(f, "UnspecFail"),
            StatusCode::NoAddrsAvail => write!(f, "NoAddrsAvail"),
            StatusCode::NoBinding => write!(f, "NoBinding"),
            StatusCode::NotOnLink => write!(f, "NotOnLink"),
            StatusCode::UseMulticast => write!(f, "UseMulticast"),
            StatusCode::NoPrefixAvail => write!(f, "NoPrefixAvail"),
            StatusCode::Unknown(code) => write!(f, "{code}"),
        }
    }
}

// Identity Association for Non-temporary Addresses:
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |          OPTION_IA_NA         |          option-len           |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                        IAID (4 octets)                        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                              T1                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                              T2                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// .                         IA_NA-options                         .
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
/// An Identity Association for Non-temporary Addresses.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct IaNaOption {
    pub iaid: u32,
    pub t1: u32,
    pub t2: u32,
    pub options: Vec<DhcpOption>,
}

/// An Identity Association for Temporary Addresses.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct IaTaOption {
    pub iaid: u32,
    pub options: Vec<DhcpOption>,
}

/// An address leased inside an identity association.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct IaAddressOption {
    pub address: Address,
    pub preferred_lifetime: u32,
    pub valid_lifetime: u32,
    pub options: Vec<DhcpOption>,
}

/// The list of option codes a client asks the server for.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct OptionRequestOption {
    pub requested_options: heapless::Vec<u16, MAX_REQUEST_OPTIONS>,
}

/// How long the client has been trying to complete the current exchange, in
/// hundredths of a second.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct ElapsedTimeOption {
    pub elapsed_time: u16,
}

/// A complete DHCPv6 message carried by a relay agent.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RelayMessageOption {
    pub relayed_message: Box<Message>,
}

impl RelayMessageOption {
    pub fn new(relayed_message: Message) -> Self {
        RelayMessageOption {
            relayed_message: Box::new(relayed_message),
        }
    }
}

impl Default for RelayMessageOption {
    fn default() -> Self {
        RelayMessageOption::new(Message::default())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct StatusCodeOption {
    pub status_code: StatusCode,
    pub status_message: String,
}

/// Recursive DNS name servers, see RFC 3646.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct DnsServersOption {
    pub dns_servers: heapless::Vec<Address, MAX_DNS_ADDRESSES>,
}

/// An option with a code that has no typed representation.
///
/// `option_code` must not be a registered [`OptionCode`]; such an option fails
/// validation with `Malformed { field: "option-code" }`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct UnknownOption {
    pub option_code: u16,
    pub option_data: Vec<u8>,
}

/// A DHCPv6 option.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum DhcpOption {
    /// The DUID of the client.
    ClientId(Vec<u8>),
    /// The DUID of the server.
    ServerId(Vec<u8>),
    IaNa(IaNaOption),
    IaTa(IaTaOption),
    IaAddress(IaAddressOption),
    OptionRequest(OptionRequestOption),
    ElapsedTime(ElapsedTimeOption),
    RelayMessage(RelayMessageOption),
    StatusCode(StatusCodeOption),
    /// An opaque identifier of the interface a relay agent received a message on.
    ///
    /// Relay agents expect this option back in the relay-reply.
    InterfaceId(Vec<u8>),
    DnsServers(DnsServersOption),
    Unknown(UnknownOption),
}

impl DhcpOption {
    /// Return the option code this option is encoded with.
    pub fn code(&self) -> OptionCode {
        match self {
            DhcpOption::ClientId(_) => OptionCode::ClientId,
            DhcpOption::ServerId(_) => OptionCode::ServerId,
            DhcpOption::IaNa(_) => OptionCode::IaNa,
            DhcpOption::IaTa(_) => OptionCode::IaTa,
            DhcpOption::IaAddress(_) => OptionCode::IaAddress,
            DhcpOption::OptionRequest(_) => OptionCode::OptionRequest,
            DhcpOption::ElapsedTime(_) => OptionCode::ElapsedTime,
            DhcpOption::RelayMessage(_) => OptionCode::RelayMessage,
            DhcpOption::StatusCode(_) => OptionCode::StatusCode,
            DhcpOption::InterfaceId(_) => OptionCode::InterfaceId,
            DhcpOption::DnsServers(_) => OptionCode::DnsServers,
            DhcpOption::Unknown(option) => OptionCode::from(option.option_code),
        }
    }

    /// Return the class this option is counted as by occurrence constraints.
    pub fn class(&self) -> OptionClass {
        match self {
            DhcpOption::ClientId(_) => OptionClass::ClientId,
            DhcpOption::ServerId(_) => OptionClass::ServerId,
            DhcpOption::IaNa(_) => OptionClass::IaNa,
            DhcpOption::IaTa(_) => OptionClass::IaTa,
            DhcpOption::IaAddress(_) => OptionClass::IaAddress,
            DhcpOption::OptionRequest(_) => OptionClass::OptionRequest,
            DhcpOption::ElapsedTime(_) => OptionClass::ElapsedTime,
            DhcpOption::RelayMessage(_) => OptionClass::RelayMessage,
            DhcpOption::StatusCode(_) => OptionClass::StatusCode,
            DhcpOption::InterfaceId(_) => OptionClass::InterfaceId,
            DhcpOption::DnsServers(_) => OptionClass::DnsServers,
            DhcpOption::Unknown(_) => OptionClass::Unknown,
        }
    }

    /// Return the IAID of an identity association option.
    pub fn iaid(&self) -> Option<u32> {
        match self {
            DhcpOption::IaNa(option) => Some(option.iaid),
            DhcpOption::IaTa(option) => Some(option.iaid),
            _ => None,
        }
    }

    /// Query whether a relay agent expects this option to be copied from its
    /// relay-forward into the matching relay-reply.
    pub fn echo_to_relay(&self) -> bool {
        matches!(self, DhcpOption::InterfaceId(_))
    }

    /// Return the message carried by a relay message option.
    pub fn relayed_message(&self) -> Option<&Message> {
        match self {
            DhcpOption::RelayMessage(option) => Some(&option.relayed_message),
            _ => None,
        }
    }

    /// Return the sub-options of an option that nests other options.
    pub fn options(&self) -> &[DhcpOption] {
        match self {
            DhcpOption::IaNa(option) => &option.options,
            DhcpOption::IaTa(option) => &option.options,
            DhcpOption::IaAddress(option) => &option.options,
            _ => &[],
        }
    }

    /// Return the occurrence constraints on the sub-options of this option, if
    /// it may have any.
    pub fn contains_table(&self) -> Option<ContainsTable<OptionClass>> {
        match self {
            DhcpOption::IaNa(_) => Some(constraints::IA_NA),
            DhcpOption::IaTa(_) => Some(constraints::IA_TA),
            DhcpOption::IaAddress(_) => Some(constraints::IA_ADDRESS),
            _ => None,
        }
    }

    /// Construct an option from `buffer`, following nested elements at most
    /// `MAX_NESTING_DEPTH - depth` levels deep.
    pub(crate) fn parse_nested(buffer: &[u8], depth: usize) -> Result<(usize, Self)> {
        let code = Self::determine_class(buffer)?;
        let mut option = Self::new_of_class(code);
        let len = option.load_nested(buffer, depth)?;
        Ok((len, option))
    }

    pub(crate) fn load_nested(&mut self, buffer: &[u8], depth: usize) -> Result<usize> {
        check_len(buffer, 0, field::OPT_DATA.start)?;
        let code = NetworkEndian::read_u16(&buffer[field::OPT_CODE]);
        match self {
            DhcpOption::Unknown(option) => option.option_code = code,
            _ => {
                let expected = u16::from(self.code());
                if code != expected {
                    return Err(Error::TagMismatch {
                        element: self.class().name(),
                        expected,
                        found: code,
                    });
                }
            }
        }

        let len = NetworkEndian::read_u16(&buffer[field::OPT_LEN]) as usize;
        check_len(buffer, field::OPT_DATA.start, len)?;
        let data = &buffer[field::OPT_DATA.start..field::OPT_DATA.start + len];
        self.load_data(data, depth)
            .map_err(|err| err.at_offset(field::OPT_DATA.start))?;

        self.validate()?;
        Ok(field::OPT_DATA.start + len)
    }

    fn load_data(&mut self, data: &[u8], depth: usize) -> Result<()> {
        match self {
            DhcpOption::ClientId(duid) | DhcpOption::ServerId(duid) => *duid = data.to_vec(),
            DhcpOption::InterfaceId(interface_id) => *interface_id = data.to_vec(),
            DhcpOption::IaNa(option) => {
                check_len(data, 0, 12)?;
                option.iaid = NetworkEndian::read_u32(&data[0..4]);
                option.t1 = NetworkEndian::read_u32(&data[4..8]);
                option.t2 = NetworkEndian::read_u32(&data[8..12]);
                option.options = load_options(&data[12..], 12, depth + 1)?;
            }
            DhcpOption::IaTa(option) => {
                check_len(data, 0, 4)?;
                option.iaid = NetworkEndian::read_u32(&data[0..4]);
                option.options = load_options(&data[4..], 4, depth + 1)?;
            }
            DhcpOption::IaAddress(option) => {
                check_len(data, 0, ADDR_SIZE + 8)?;
                option.address = Address::from_bytes(&data[..ADDR_SIZE]);
                option.preferred_lifetime = NetworkEndian::read_u32(&data[16..20]);
                option.valid_lifetime = NetworkEndian::read_u32(&data[20..24]);
                option.options = load_options(&data[24..], 24, depth + 1)?;
            }
            DhcpOption::OptionRequest(option) => {
                if data.len() % 2 != 0 {
                    return Err(Error::Malformed {
                        field: "requested-option-code",
                    });
                }
                option.requested_options.clear();
                for chunk in data.chunks(2) {
                    option
                        .requested_options
                        .push(NetworkEndian::read_u16(chunk))
                        .map_err(|_| Error::FieldRange {
                            field: "requested-option-code",
                            max: MAX_REQUEST_OPTIONS,
                        })?;
                }
            }
            DhcpOption::ElapsedTime(option) => {
                if data.len() != 2 {
                    return Err(Error::Malformed {
                        field: "elapsed-time",
                    });
                }
                option.elapsed_time = NetworkEndian::read_u16(data);
            }
            DhcpOption::RelayMessage(option) => {
                let (_, message) = Message::parse_nested(data, depth)?;
                option.relayed_message = Box::new(message);
            }
            DhcpOption::StatusCode(option) => {
                check_len(data, 0, 2)?;
                option.status_code = StatusCode::from(NetworkEndian::read_u16(&data[..2]));
                option.status_message = String::from_utf8(data[2..].to_vec())
                    .map_err(|_| Error::Malformed {
                        field: "status-message",
                    })?;
            }
            DhcpOption::DnsServers(option) => {
                if data.len() % ADDR_SIZE != 0 {
                    return Err(Error::Malformed {
                        field: "dns-recursive-name-server",
                    });
                }
                option.dns_servers.clear();
                for chunk in data.chunks(ADDR_SIZE) {
                    option
                        .dns_servers
                        .push(Address::from_bytes(chunk))
                        .map_err(|_| Error::FieldRange {
                            field: "dns-recursive-name-server",
                            max: MAX_DNS_ADDRESSES,
                        })?;
                }
            }
            DhcpOption::Unknown(option) => option.option_data = data.to_vec(),
        }
        Ok(())
    }

    fn data_len(&self) -> usize {
        match self {
            DhcpOption::ClientId(duid) | DhcpOption::ServerId(duid) => duid.len(),
            DhcpOption::InterfaceId(interface_id) => interface_id.len(),
            DhcpOption::IaNa(option) => 12 + options_len(&option.options),
            DhcpOption::IaTa(option) => 4 + options_len(&option.options),
            DhcpOption::IaAddress(option) => ADDR_SIZE + 8 + options_len(&option.options),
            DhcpOption::OptionRequest(option) => 2 * option.requested_options.len(),
            DhcpOption::ElapsedTime(_) => 2,
            DhcpOption::RelayMessage(option) => option.relayed_message.buffer_len(),
            DhcpOption::StatusCode(option) => 2 + option.status_message.len(),
            DhcpOption::DnsServers(option) => ADDR_SIZE * option.dns_servers.len(),
            DhcpOption::Unknown(option) => option.option_data.len(),
        }
    }

    fn emit_data(&self, data: &mut [u8]) -> Result<()> {
        match self {
            DhcpOption::ClientId(duid) | DhcpOption::ServerId(duid) => {
                data.copy_from_slice(duid)
            }
            DhcpOption::InterfaceId(interface_id) => data.copy_from_slice(interface_id),
            DhcpOption::IaNa(option) => {
                NetworkEndian::write_u32(&mut data[0..4], option.iaid);
                NetworkEndian::write_u32(&mut data[4..8], option.t1);
                NetworkEndian::write_u32(&mut data[8..12], option.t2);
                emit_options(&mut OptionWriter::new(&mut data[12..]), &option.options)?;
            }
            DhcpOption::IaTa(option) => {
                NetworkEndian::write_u32(&mut data[0..4], option.iaid);
                emit_options(&mut OptionWriter::new(&mut data[4..]), &option.options)?;
            }
            DhcpOption::IaAddress(option) => {
                data[..ADDR_SIZE].copy_from_slice(option.address.as_bytes());
                NetworkEndian::write_u32(&mut data[16..20], option.preferred_lifetime);
                NetworkEndian::write_u32(&mut data[20..24], option.valid_lifetime);
                emit_options(&mut OptionWriter::new(&mut data[24..]), &option.options)?;
            }
            DhcpOption::OptionRequest(option) => {
                for (chunk, code) in data.chunks_mut(2).zip(option.requested_options.iter()) {
                    NetworkEndian::write_u16(chunk, *code);
                }
            }
            DhcpOption::ElapsedTime(option) => NetworkEndian::write_u16(data, option.elapsed_time),
            DhcpOption::RelayMessage(option) => option.relayed_message.emit(data)?,
            DhcpOption::StatusCode(option) => {
                NetworkEndian::write_u16(&mut data[..2], option.status_code.into());
                data[2..].copy_from_slice(option.status_message.as_bytes());
            }
            DhcpOption::DnsServers(option) => {
                for (chunk, address) in data.chunks_mut(ADDR_SIZE).zip(option.dns_servers.iter()) {
                    chunk.copy_from_slice(address.as_bytes());
                }
            }
            DhcpOption::Unknown(option) => data.copy_from_slice(&option.option_data),
        }
        Ok(())
    }
}

impl StructuredElement for DhcpOption {
    type Class = OptionCode;

    fn determine_class(buffer: &[u8]) -> Result<OptionCode> {
        check_len(buffer, 0, field::OPT_CODE.end)?;
        let code = OptionCode::from(NetworkEndian::read_u16(&buffer[field::OPT_CODE]));
        if let OptionCode::Unknown(code) = code {
            net_debug!("DHCPv6 option {} unrecognized, keeping it opaque", code);
        }
        Ok(code)
    }

    fn new_of_class(code: OptionCode) -> Self {
        match code {
            OptionCode::ClientId => DhcpOption::ClientId(Vec::new()),
            OptionCode::ServerId => DhcpOption::ServerId(Vec::new()),
            OptionCode::IaNa => DhcpOption::IaNa(IaNaOption::default()),
            OptionCode::IaTa => DhcpOption::IaTa(IaTaOption::default()),
            OptionCode::IaAddress => DhcpOption::IaAddress(IaAddressOption::default()),
            OptionCode::OptionRequest => DhcpOption::OptionRequest(OptionRequestOption::default()),
            OptionCode::ElapsedTime => DhcpOption::ElapsedTime(ElapsedTimeOption::default()),
            OptionCode::RelayMessage => DhcpOption::RelayMessage(RelayMessageOption::default()),
            OptionCode::StatusCode => DhcpOption::StatusCode(StatusCodeOption::default()),
            OptionCode::InterfaceId => DhcpOption::InterfaceId(Vec::new()),
            OptionCode::DnsServers => DhcpOption::DnsServers(DnsServersOption::default()),
            OptionCode::Unknown(option_code) => DhcpOption::Unknown(UnknownOption {
                option_code,
                option_data: Vec::new(),
            }),
        }
    }

    fn load_from(&mut self, buffer: &[u8]) -> Result<usize> {
        self.load_nested(buffer, 0)
    }

    fn validate(&self) -> Result<()> {
        if self.data_len() > u16::MAX as usize {
            return Err(Error::FieldRange {
                field: "option-len",
                max: u16::MAX as usize,
            });
        }

        match self {
            DhcpOption::IaNa(IaNaOption { options, .. })
            | DhcpOption::IaTa(IaTaOption { options, .. })
            | DhcpOption::IaAddress(IaAddressOption { options, .. }) => match self.contains_table() {
                Some(table) => validate_options(&table, options),
                None => Ok(()),
            },
            DhcpOption::RelayMessage(option) => option.relayed_message.validate(),
            // A known code would be decoded as its typed option instead.
            DhcpOption::Unknown(option) => match OptionCode::from(option.option_code) {
                OptionCode::Unknown(_) => Ok(()),
                _ => Err(Error::Malformed {
                    field: "option-code",
                }),
            },
            _ => Ok(()),
        }
    }

    fn buffer_len(&self) -> usize {
        field::OPT_DATA.start + self.data_len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        let data_len = self.data_len();
        write_option_header(buffer, self.code().into(), data_len)?;
        check_len(buffer, field::OPT_DATA.start, data_len)?;
        self.emit_data(&mut buffer[field::OPT_DATA.start..field::OPT_DATA.start + data_len])
    }
}

/// Decode a sequence of options filling all of `buffer`.
///
/// `base` is the position of `buffer` within the enclosing element, and is
/// added to the offsets of truncation errors.
pub(crate) fn load_options(buffer: &[u8], base: usize, depth: usize) -> Result<Vec<DhcpOption>> {
    if depth > MAX_NESTING_DEPTH {
        return Err(Error::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
        });
    }

    let mut options = Vec::new();
    let mut offset = 0;
    while offset < buffer.len() {
        let (len, option) = DhcpOption::parse_nested(&buffer[offset..], depth)
            .map_err(|err| err.at_offset(base + offset))?;
        net_trace!(
            "DHCPv6 option {} ({} octets) at offset {}",
            u16::from(option.code()),
            len,
            base + offset
        );
        options.push(option);
        offset += len;
    }
    Ok(options)
}

/// Check a container's options against its occurrence constraints, then check
/// every option on its own.
pub(crate) fn validate_options(
    table: &ContainsTable<OptionClass>,
    options: &[DhcpOption],
) -> Result<()> {
    table.validate_contains(options.iter().map(DhcpOption::class))?;
    for option in options {
        option.validate()?;
    }
    Ok(())
}

pub(crate) fn options_len(options: &[DhcpOption]) -> usize {
    options.iter().map(DhcpOption::buffer_len).sum()
}

pub(crate) fn emit_options(writer: &mut OptionWriter<'_>, options: &[DhcpOption]) -> Result<()> {
    for option in options {
        writer.emit_element(option)?;
    }
    Ok(())
}

fn list(options: &[DhcpOption]) -> FieldValue<'_> {
    FieldValue::List(options.iter().map(|o| o as &dyn Fields).collect())
}

impl Fields for DhcpOption {
    fn element_name(&self) -> &'static str {
        self.class().name()
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        match self {
            DhcpOption::ClientId(duid) | DhcpOption::ServerId(duid) => {
                alloc::vec![("duid", FieldValue::Bytes(duid))]
            }
            DhcpOption::InterfaceId(interface_id) => {
                alloc::vec![("interface_id", FieldValue::Bytes(interface_id))]
            }
            DhcpOption::IaNa(option) => alloc::vec![
                ("iaid", FieldValue::Scalar(&option.iaid)),
                ("t1", FieldValue::Scalar(&option.t1)),
                ("t2", FieldValue::Scalar(&option.t2)),
                ("options", list(&option.options)),
            ],
            DhcpOption::IaTa(option) => alloc::vec![
                ("iaid", FieldValue::Scalar(&option.iaid)),
                ("options", list(&option.options)),
            ],
            DhcpOption::IaAddress(option) => alloc::vec![
                ("address", FieldValue::Scalar(&option.address)),
                ("preferred_lifetime", FieldValue::Scalar(&option.preferred_lifetime)),
                ("valid_lifetime", FieldValue::Scalar(&option.valid_lifetime)),
                ("options", list(&option.options)),
            ],
            DhcpOption::OptionRequest(option) => alloc::vec![(
                "requested_options",
                FieldValue::Scalars(
                    option
                        .requested_options
                        .iter()
                        .map(|code| code as &dyn fmt::Display)
                        .collect()
                ),
            )],
            DhcpOption::ElapsedTime(option) => {
                alloc::vec![("elapsed_time", FieldValue::Scalar(&option.elapsed_time))]
            }
            DhcpOption::RelayMessage(option) => alloc::vec![(
                "relayed_message",
                FieldValue::Element(&*option.relayed_message)
            )],
            DhcpOption::StatusCode(option) => alloc::vec![
                ("status_code", FieldValue::Scalar(&option.status_code)),
                ("status_message", FieldValue::Text(&option.status_message)),
            ],
            DhcpOption::DnsServers(option) => alloc::vec![(
                "dns_servers",
                FieldValue::Scalars(
                    option
                        .dns_servers
                        .iter()
                        .map(|address| address as &dyn fmt::Display)
                        .collect()
                ),
            )],
            DhcpOption::Unknown(option) => alloc::vec![
                ("option_code", FieldValue::Scalar(&option.option_code)),
                ("option_data", FieldValue::Bytes(&option.option_data)),
            ],
        }
    }
}

impl fmt::Display for DhcpOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&pretty_print::render(self))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wire::Violation;
    use alloc::string::ToString;
    use alloc::vec;

    static IA_NA_BYTES: [u8; 52] = [
        0x00, 0x03, 0x00, 0x30, // IA_NA, len 48
        0x00, 0x00, 0x00, 0x01, // iaid
        0x00, 0x00, 0x0e, 0x10, // t1
        0x00, 0x00, 0x15, 0x18, // t2
        0x00, 0x05, 0x00, 0x20, // IAADDR, len 32
        0x20, 0x01, 0x0d, 0xb8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x01, // address
        0x00, 0x00, 0x1c, 0x20, // preferred-lifetime
        0x00, 0x00, 0x2a, 0x30, // valid-lifetime
        0x00, 0x0d, 0x00, 0x04, // status code, len 4
        0x00, 0x00, 0x6f, 0x6b, // Success, "ok"
    ];

    fn ia_na() -> DhcpOption {
        DhcpOption::IaNa(IaNaOption {
            iaid: 1,
            t1: 3600,
            t2: 5400,
            options: vec![DhcpOption::IaAddress(IaAddressOption {
                address: Address::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1),
                preferred_lifetime: 7200,
                valid_lifetime: 10800,
                options: vec![],
            })],
        })
    }

    #[test]
    fn test_parse_ia_na() {
        let (len, option) = DhcpOption::parse(&IA_NA_BYTES).unwrap();
        assert_eq!(len, IA_NA_BYTES.len());
        assert_eq!(option.iaid(), Some(1));

        let address = match &option.options()[0] {
            DhcpOption::IaAddress(address) => address,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(address.valid_lifetime, 10800);
        assert_eq!(
            address.options,
            vec![DhcpOption::StatusCode(StatusCodeOption {
                status_code: StatusCode::Success,
                status_message: "ok".to_string(),
            })]
        );
        assert_eq!(option.save().unwrap(), &IA_NA_BYTES[..]);
    }

    #[test]
    fn test_emit_ia_na() {
        let bytes = ia_na().save().unwrap();
        assert_eq!(bytes.len(), 44);
        assert_eq!(&bytes[..4], &[0x00, 0x03, 0x00, 0x28]);
        assert_eq!(&bytes[4..16], &IA_NA_BYTES[4..16]);
        assert_eq!(&bytes[16..20], &[0x00, 0x05, 0x00, 0x18]);
        assert_eq!(&bytes[20..44], &IA_NA_BYTES[20..44]);
        assert_eq!(DhcpOption::parse(&bytes).unwrap(), (44, ia_na()));
    }

    #[test]
    fn test_ia_ta() {
        static IA_TA_BYTES: [u8; 36] = [
            0x00, 0x04, 0x00, 0x20, // IA_TA, len 32
            0x00, 0x00, 0x00, 0x07, // iaid
            0x00, 0x05, 0x00, 0x18, // IAADDR, len 24
            0x20, 0x01, 0x0d, 0xb8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x02, // address
            0x00, 0x00, 0x0e, 0x10, // preferred-lifetime
            0x00, 0x00, 0x1c, 0x20, // valid-lifetime
        ];
        let option = DhcpOption::IaTa(IaTaOption {
            iaid: 7,
            options: vec![DhcpOption::IaAddress(IaAddressOption {
                address: Address::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 2),
                preferred_lifetime: 3600,
                valid_lifetime: 7200,
                options: vec![],
            })],
        });
        assert_eq!(option.save().unwrap(), &IA_TA_BYTES[..]);
        assert_eq!(DhcpOption::parse(&IA_TA_BYTES).unwrap(), (36, option));
    }

    #[test]
    fn test_option_consumes_declared_length_only() {
        let mut bytes = vec![0x00, 0x08, 0x00, 0x02, 0x01, 0x2c];
        bytes.extend_from_slice(&[0xff; 3]);
        let (len, option) = DhcpOption::parse(&bytes).unwrap();
        assert_eq!(len, 6);
        assert_eq!(
            option,
            DhcpOption::ElapsedTime(ElapsedTimeOption { elapsed_time: 300 })
        );
    }

    #[test]
    fn test_unknown_option_preserved() {
        let bytes = [0x00, 0xfe, 0x00, 0x03, 0x01, 0x02, 0x03];
        let (len, option) = DhcpOption::parse(&bytes).unwrap();
        assert_eq!(len, 7);
        assert_eq!(
            option,
            DhcpOption::Unknown(UnknownOption {
                option_code: 0xfe,
                option_data: vec![1, 2, 3],
            })
        );
        assert_eq!(option.class(), OptionClass::Unknown);
        assert_eq!(option.save().unwrap(), &bytes[..]);
    }

    #[test]
    fn test_unknown_option_with_known_code() {
        let option = DhcpOption::Unknown(UnknownOption {
            option_code: 1,
            option_data: vec![],
        });
        assert_eq!(
            option.save(),
            Err(Error::Malformed {
                field: "option-code"
            })
        );
    }

    #[test]
    fn test_tag_mismatch() {
        let mut option = DhcpOption::ServerId(vec![]);
        assert_eq!(
            option.load_from(&[0x00, 0x01, 0x00, 0x00]),
            Err(Error::TagMismatch {
                element: "ServerIdOption",
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn test_truncated_option_data() {
        assert_eq!(
            DhcpOption::parse(&[0x00, 0x01, 0x00, 0x08, 0xaa, 0xbb]),
            Err(Error::Truncated {
                offset: 4,
                expected: 8,
                available: 2,
            })
        );
        assert_eq!(
            DhcpOption::parse(&[0x00]),
            Err(Error::Truncated {
                offset: 0,
                expected: 2,
                available: 1,
            })
        );
    }

    #[test]
    fn test_truncated_sub_option_offset() {
        // IA_TA whose single sub-option claims more data than it has.
        let bytes = [
            0x00, 0x04, 0x00, 0x0a, // IA_TA, len 10
            0x00, 0x00, 0x00, 0x07, // iaid
            0x00, 0x0d, 0x00, 0x09, 0x00, 0x00, // status code claiming 9 octets
        ];
        assert_eq!(
            DhcpOption::parse(&bytes),
            Err(Error::Truncated {
                offset: 12,
                expected: 9,
                available: 2,
            })
        );
    }

    #[test]
    fn test_ia_sub_option_constraints() {
        let status = DhcpOption::StatusCode(StatusCodeOption::default());
        let option = DhcpOption::IaTa(IaTaOption {
            iaid: 7,
            options: vec![status.clone(), status],
        });
        assert_eq!(
            option.validate(),
            Err(Error::Containment {
                container: "IaTaOption",
                element: "StatusCodeOption",
                violation: Violation::TooMany(1),
            })
        );

        let option = DhcpOption::IaTa(IaTaOption {
            iaid: 7,
            options: vec![DhcpOption::ClientId(vec![1])],
        });
        assert_eq!(
            option.validate(),
            Err(Error::Containment {
                container: "IaTaOption",
                element: "ClientIdOption",
                violation: Violation::NotPermitted,
            })
        );
    }

    #[test]
    fn test_fixed_size_payloads() {
        assert_eq!(
            DhcpOption::parse(&[0x00, 0x08, 0x00, 0x01, 0x00]),
            Err(Error::Malformed {
                field: "elapsed-time"
            })
        );
        assert_eq!(
            DhcpOption::parse(&[0x00, 0x06, 0x00, 0x03, 0x00, 0x17, 0x00]),
            Err(Error::Malformed {
                field: "requested-option-code"
            })
        );
        assert_eq!(
            DhcpOption::parse(&[0x00, 0x17, 0x00, 0x04, 0x20, 0x01, 0x0d, 0xb8]),
            Err(Error::Malformed {
                field: "dns-recursive-name-server"
            })
        );
    }

    #[test]
    fn test_option_request_limit() {
        let mut bytes = vec![0x00, 0x06, 0x00, 2 * (MAX_REQUEST_OPTIONS as u8 + 1)];
        for code in 0..=MAX_REQUEST_OPTIONS as u16 {
            bytes.extend_from_slice(&code.to_be_bytes());
        }
        assert_eq!(
            DhcpOption::parse(&bytes),
            Err(Error::FieldRange {
                field: "requested-option-code",
                max: MAX_REQUEST_OPTIONS,
            })
        );
    }

    #[test]
    fn test_option_request_and_dns_servers() {
        let mut oro = OptionRequestOption::default();
        oro.requested_options.push(23).unwrap();
        oro.requested_options.push(24).unwrap();
        let option = DhcpOption::OptionRequest(oro);
        let bytes = option.save().unwrap();
        assert_eq!(bytes, vec![0x00, 0x06, 0x00, 0x04, 0x00, 0x17, 0x00, 0x18]);
        assert_eq!(DhcpOption::parse(&bytes).unwrap(), (8, option));

        let mut dns = DnsServersOption::default();
        dns.dns_servers
            .push(Address::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0x53))
            .unwrap();
        let option = DhcpOption::DnsServers(dns);
        let bytes = option.save().unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(DhcpOption::parse(&bytes).unwrap(), (20, option));
    }

    #[test]
    fn test_status_message_must_be_utf8() {
        assert_eq!(
            DhcpOption::parse(&[0x00, 0x0d, 0x00, 0x03, 0x00, 0x01, 0xff]),
            Err(Error::Malformed {
                field: "status-message"
            })
        );
    }

    #[test]
    fn test_option_too_long() {
        let option = DhcpOption::ClientId(vec![0; u16::MAX as usize + 1]);
        assert_eq!(
            option.save(),
            Err(Error::FieldRange {
                field: "option-len",
                max: u16::MAX as usize,
            })
        );
    }

    #[test]
    fn test_echo_to_relay() {
        assert!(DhcpOption::InterfaceId(vec![1]).echo_to_relay());
        assert!(!DhcpOption::ClientId(vec![1]).echo_to_relay());
    }

    #[test]
    fn test_ia_classes() {
        assert!(OptionClass::IaNa.is_a(OptionClass::Ia));
        assert!(OptionClass::IaTa.is_a(OptionClass::Any));
        assert!(!OptionClass::ClientId.is_a(OptionClass::Ia));
        assert_eq!(ia_na().class().parent(), Some(OptionClass::Ia));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DhcpOption::ClientId(vec![0xde, 0xad]).to_string(),
            "ClientIdOption(duid=0xdead)"
        );
        assert_eq!(
            DhcpOption::StatusCode(StatusCodeOption {
                status_code: StatusCode::NoBinding,
                status_message: "gone".to_string(),
            })
            .to_string(),
            "StatusCodeOption(\n  status_code=NoBinding,\n  status_message='gone',\n)"
        );
    }
}
