#![no_main]
use arbitrary::Arbitrary;
use dhcpv6_wire::wire::{
    ClientServerMessage, DhcpOption, ElapsedTimeOption, Ipv6Address, Message,
    RelayMessageOption, RelayServerMessage, DHCPV6_MAX_NESTING_DEPTH,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Hop {
    hop_count: u8,
    link_address: [u8; 16],
    peer_address: [u8; 16],
    interface_id: Option<Vec<u8>>,
}

#[derive(Debug, Arbitrary)]
struct Input {
    transaction_id: u32,
    client_id: Vec<u8>,
    server_id: Vec<u8>,
    hops: Vec<Hop>,
}

fuzz_target!(|input: Input| {
    let transaction_id = input.transaction_id & 0xff_ffff;
    let mut forward = Message::Solicit(ClientServerMessage::new(
        transaction_id,
        vec![
            DhcpOption::ClientId(input.client_id.clone()),
            DhcpOption::ElapsedTime(ElapsedTimeOption { elapsed_time: 0 }),
        ],
    ));
    let hops: Vec<&Hop> = input.hops.iter().take(DHCPV6_MAX_NESTING_DEPTH).collect();
    for hop in hops.iter() {
        let mut options = Vec::new();
        if let Some(interface_id) = &hop.interface_id {
            options.push(DhcpOption::InterfaceId(interface_id.clone()));
        }
        options.push(DhcpOption::RelayMessage(RelayMessageOption::new(forward)));
        forward = Message::RelayForward(RelayServerMessage::new(
            hop.hop_count,
            Ipv6Address(hop.link_address),
            Ipv6Address(hop.peer_address),
            options,
        ));
    }

    let reply = Message::Reply(ClientServerMessage::new(
        transaction_id,
        vec![
            DhcpOption::ClientId(input.client_id),
            DhcpOption::ServerId(input.server_id),
        ],
    ));

    match forward.wrap_response(reply.clone()) {
        Ok(wrapped) => {
            assert!(!hops.is_empty());
            assert_eq!(wrapped.inner_message(), &reply);

            let mut depth = 0;
            let mut message = &wrapped;
            while let Some(relayed) = message.relayed_message() {
                depth += 1;
                message = relayed;
            }
            assert_eq!(depth, hops.len());
        }
        Err(_) => assert!(hops.is_empty()),
    }
});
