//! Which options each message type and each nesting option may carry.
//!
//! Every table lists the layer of its own container kind first, followed by the
//! layers of the kinds it specializes.

use super::options::OptionClass;
use super::MessageType;
use crate::wire::element::{ContainsTable, MayContain};

type Layer = &'static [MayContain<OptionClass>];

const CLIENT_SERVER: Layer = &[
    MayContain::any(OptionClass::Unknown),
    MayContain::any(OptionClass::IaNa),
    MayContain::any(OptionClass::IaTa),
];

const SOLICIT: Layer = &[
    MayContain::exactly_one(OptionClass::ClientId),
    MayContain::optional(OptionClass::OptionRequest),
    MayContain::exactly_one(OptionClass::ElapsedTime),
];

const ADVERTISE: Layer = &[
    MayContain::exactly_one(OptionClass::ClientId),
    MayContain::exactly_one(OptionClass::ServerId),
    MayContain::optional(OptionClass::StatusCode),
    MayContain::optional(OptionClass::DnsServers),
];

// Request and Renew.
const REQUEST: Layer = &[
    MayContain::exactly_one(OptionClass::ClientId),
    MayContain::exactly_one(OptionClass::ServerId),
    MayContain::optional(OptionClass::OptionRequest),
    MayContain::exactly_one(OptionClass::ElapsedTime),
];

const CONFIRM: Layer = &[
    MayContain::exactly_one(OptionClass::ClientId),
    MayContain::exactly_one(OptionClass::ElapsedTime),
];

const REBIND: Layer = &[
    MayContain::exactly_one(OptionClass::ClientId),
    MayContain::optional(OptionClass::OptionRequest),
    MayContain::exactly_one(OptionClass::ElapsedTime),
];

const REPLY: Layer = &[
    MayContain::optional(OptionClass::ClientId),
    MayContain::exactly_one(OptionClass::ServerId),
    MayContain::optional(OptionClass::StatusCode),
    MayContain::optional(OptionClass::DnsServers),
];

// Release and Decline.
const RELEASE: Layer = &[
    MayContain::exactly_one(OptionClass::ClientId),
    MayContain::exactly_one(OptionClass::ServerId),
    MayContain::exactly_one(OptionClass::ElapsedTime),
];

const RECONFIGURE: Layer = &[
    MayContain::exactly_one(OptionClass::ClientId),
    MayContain::exactly_one(OptionClass::ServerId),
    MayContain::optional(OptionClass::OptionRequest),
    MayContain::forbidden(OptionClass::IaNa),
    MayContain::forbidden(OptionClass::IaTa),
];

const INFORMATION_REQUEST: Layer = &[
    MayContain::optional(OptionClass::ClientId),
    MayContain::optional(OptionClass::ServerId),
    MayContain::optional(OptionClass::OptionRequest),
    MayContain::exactly_one(OptionClass::ElapsedTime),
    MayContain::forbidden(OptionClass::IaNa),
    MayContain::forbidden(OptionClass::IaTa),
];

const RELAY_SERVER: Layer = &[
    MayContain::exactly_one(OptionClass::RelayMessage),
    MayContain::optional(OptionClass::InterfaceId),
    MayContain::any(OptionClass::Unknown),
];

const IA: Layer = &[
    MayContain::any(OptionClass::IaAddress),
    MayContain::optional(OptionClass::StatusCode),
    MayContain::any(OptionClass::Unknown),
];

const IA_ADDRESS_LAYER: Layer = &[
    MayContain::optional(OptionClass::StatusCode),
    MayContain::any(OptionClass::Unknown),
];

pub(crate) const SOLICIT_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Solicit", &[SOLICIT, CLIENT_SERVER]);
pub(crate) const ADVERTISE_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Advertise", &[ADVERTISE, CLIENT_SERVER]);
pub(crate) const REQUEST_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Request", &[REQUEST, CLIENT_SERVER]);
pub(crate) const CONFIRM_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Confirm", &[CONFIRM, CLIENT_SERVER]);
pub(crate) const RENEW_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Renew", &[REQUEST, CLIENT_SERVER]);
pub(crate) const REBIND_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Rebind", &[REBIND, CLIENT_SERVER]);
pub(crate) const REPLY_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Reply", &[REPLY, CLIENT_SERVER]);
pub(crate) const RELEASE_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Release", &[RELEASE, CLIENT_SERVER]);
pub(crate) const DECLINE_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Decline", &[RELEASE, CLIENT_SERVER]);
pub(crate) const RECONFIGURE_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("Reconfigure", &[RECONFIGURE, CLIENT_SERVER]);
pub(crate) const INFORMATION_REQUEST_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("InformationRequest", &[INFORMATION_REQUEST, CLIENT_SERVER]);
pub(crate) const RELAY_FORWARD_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("RelayForward", &[RELAY_SERVER]);
pub(crate) const RELAY_REPLY_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("RelayReply", &[RELAY_SERVER]);
/// Messages of unknown type have no options at all.
pub(crate) const UNKNOWN_TABLE: ContainsTable<OptionClass> =
    ContainsTable::new("UnknownMessage", &[]);

pub(crate) const IA_NA: ContainsTable<OptionClass> = ContainsTable::new("IaNaOption", &[IA]);
pub(crate) const IA_TA: ContainsTable<OptionClass> = ContainsTable::new("IaTaOption", &[IA]);
pub(crate) const IA_ADDRESS: ContainsTable<OptionClass> =
    ContainsTable::new("IaAddressOption", &[IA_ADDRESS_LAYER]);

/// Return the options table of messages of type `message_type`.
pub(crate) fn message_table(message_type: MessageType) -> ContainsTable<OptionClass> {
    match message_type {
        MessageType::Solicit => SOLICIT_TABLE,
        MessageType::Advertise => ADVERTISE_TABLE,
        MessageType::Request => REQUEST_TABLE,
        MessageType::Confirm => CONFIRM_TABLE,
        MessageType::Renew => RENEW_TABLE,
        MessageType::Rebind => REBIND_TABLE,
        MessageType::Reply => REPLY_TABLE,
        MessageType::Release => RELEASE_TABLE,
        MessageType::Decline => DECLINE_TABLE,
        MessageType::Reconfigure => RECONFIGURE_TABLE,
        MessageType::InformationRequest => INFORMATION_REQUEST_TABLE,
        MessageType::RelayForw => RELAY_FORWARD_TABLE,
        MessageType::RelayRepl => RELAY_REPLY_TABLE,
        MessageType::Unknown(_) => UNKNOWN_TABLE,
    }
}
