use core::fmt;

/// A sixteen-octet IPv6 address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; ADDR_SIZE]);

/// Size of an IPv6 address in octets.
pub const ADDR_SIZE: usize = 16;

impl Address {
    /// The [unspecified address].
    ///
    /// [unspecified address]: https://tools.ietf.org/html/rfc4291#section-2.5.2
    pub const UNSPECIFIED: Address = Address([0x00; ADDR_SIZE]);

    /// The link-local [all DHCP relay agents and servers multicast address].
    ///
    /// [all DHCP relay agents and servers multicast address]: https://tools.ietf.org/html/rfc8415#section-7.1
    pub const ALL_DHCP_RELAY_AGENTS_AND_SERVERS: Address = Address([
        0xff, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
        0x02,
    ]);

    /// Construct an IPv6 address from parts.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(a0: u16, a1: u16, a2: u16, a3: u16, a4: u16, a5: u16, a6: u16, a7: u16) -> Address {
        let [b0, b1] = a0.to_be_bytes();
        let [b2, b3] = a1.to_be_bytes();
        let [b4, b5] = a2.to_be_bytes();
        let [b6, b7] = a3.to_be_bytes();
        let [b8, b9] = a4.to_be_bytes();
        let [b10, b11] = a5.to_be_bytes();
        let [b12, b13] = a6.to_be_bytes();
        let [b14, b15] = a7.to_be_bytes();
        Address([
            b0, b1, b2, b3, b4, b5, b6, b7, b8, b9, b10, b11, b12, b13, b14, b15,
        ])
    }

    /// Construct an IPv6 address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not sixteen octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; ADDR_SIZE];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Return an IPv6 address as a sequence of octets, in big-endian.
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the IPv6 address is a [multicast address].
    ///
    /// [multicast address]: https://tools.ietf.org/html/rfc4291#section-2.7
    pub const fn is_multicast(&self) -> bool {
        self.0[0] == 0xff
    }

    /// Query whether the IPv6 address is the [unspecified address].
    ///
    /// [unspecified address]: https://tools.ietf.org/html/rfc4291#section-2.5.2
    pub fn is_unspecified(&self) -> bool {
        self.0 == [0x00; ADDR_SIZE]
    }
}

#[cfg(feature = "std")]
impl From<::std::net::Ipv6Addr> for Address {
    fn from(x: ::std::net::Ipv6Addr) -> Address {
        Address(x.octets())
    }
}

#[cfg(feature = "std")]
impl From<Address> for ::std::net::Ipv6Addr {
    fn from(Address(x): Address) -> ::std::net::Ipv6Addr {
        x.into()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut words = [0u16; 8];
        for (word, chunk) in words.iter_mut().zip(self.0.chunks(2)) {
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }

        // Find the longest run of at least two zero words; it is elided as `::`.
        let (mut best_start, mut best_len) = (0, 0);
        let mut idx = 0;
        while idx < words.len() {
            if words[idx] == 0 {
                let start = idx;
                while idx < words.len() && words[idx] == 0 {
                    idx += 1;
                }
                if idx - start > best_len {
                    best_start = start;
                    best_len = idx - start;
                }
            } else {
                idx += 1;
            }
        }

        if best_len < 2 {
            for (i, word) in words.iter().enumerate() {
                if i != 0 {
                    write!(f, ":")?;
                }
                write!(f, "{word:x}")?;
            }
            return Ok(());
        }

        for (i, word) in words[..best_start].iter().enumerate() {
            if i != 0 {
                write!(f, ":")?;
            }
            write!(f, "{word:x}")?;
        }
        write!(f, "::")?;
        for (i, word) in words[best_start + best_len..].iter().enumerate() {
            if i != 0 {
                write!(f, ":")?;
            }
            write!(f, "{word:x}")?;
        }
        Ok(())
    }
}
