#![no_main]
use dhcpv6_wire::wire::{Message, StructuredElement};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((len, message)) = Message::parse(data) {
        assert_eq!(len, data.len());
        let bytes = message.save().expect("a parsed message must save");
        assert_eq!(bytes, data);
    }
});
