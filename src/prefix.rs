//! The normalized prefix key and the bit-level helpers it is built on.

use std::{
    fmt::{Debug, Display, Formatter},
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
#[cfg(feature = "ipnetwork")]
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use num_traits::{PrimInt, Zero};

use crate::ParseError;

/// Offset of an IPv4 prefix length inside the 128-bit key space.
pub const IPV4_OFFSET: u8 = 96;

/// The `::ffff:0:0/96` block that holds IPv4-mapped addresses.
const IPV4_MAPPED: u128 = 0xffff << 32;

/// Extract `width` bits of `word`, starting at bit `offset` counted from the most significant bit.
/// The result is right-aligned.
///
/// ```
/// # use lpm_trie::extract;
/// assert_eq!(extract(0x5555555555555555, 0, 4), 0x5);
/// assert_eq!(extract(0x5555555555555555, 1, 4), 0xa);
/// ```
///
/// # Panics
/// Panics if `offset + width > 64`.
#[inline]
pub fn extract(word: u64, offset: u32, width: u32) -> u64 {
    assert!(
        offset + width <= 64,
        "bit field {offset}+{width} exceeds a 64-bit word"
    );
    if width == 0 {
        0
    } else {
        (word << offset) >> (64 - width)
    }
}

/// Extract up to 64 bits of a 128-bit address, reading the high word, the low word, or the 64-bit
/// window that straddles both.
#[inline]
pub(crate) fn extract_u128(addr: u128, offset: u32, width: u32) -> u64 {
    assert!(
        offset + width <= 128 && width <= 64,
        "bit field {offset}+{width} exceeds a 128-bit address"
    );
    if offset + width <= 64 {
        extract((addr >> 64) as u64, offset, width)
    } else if offset >= 64 {
        extract(addr as u64, offset - 64, width)
    } else {
        extract(((addr << offset) >> 64) as u64, 0, width)
    }
}

/// Mask with the `len` most significant bits set.
pub(crate) fn mask_from_prefix_len<R>(len: u8) -> R
where
    R: PrimInt + Zero,
{
    if len as u32 >= R::zero().count_zeros() {
        !R::zero()
    } else if len == 0 {
        R::zero()
    } else {
        !((!R::zero()) >> len as usize)
    }
}

/// Length of the block spanned by the inclusive range `begin..=end`, if it is an aligned,
/// power-of-two sized block.
fn range_len<R>(begin: R, end: R) -> Result<u8, ParseError>
where
    R: PrimInt + Zero,
{
    if end < begin {
        return Err(ParseError::InvertedRange);
    }
    let size = end - begin;
    let full = size.count_zeros() == 0;
    if !full && (size & (size + R::one()) != R::zero()) {
        return Err(ParseError::UnalignedRange);
    }
    if begin & size != R::zero() {
        return Err(ParseError::UnalignedRange);
    }
    Ok(size.leading_zeros() as u8)
}

/// An IP prefix in the shared 128-bit key space.
///
/// The address is always stored masked to the prefix length. IPv4 prefixes are stored in their
/// IPv4-mapped form, so `10.0.0.0/8` is represented as `::ffff:10.0.0.0/104`. Prefixes are ordered
/// by their address first and by their length second, which is the order in which they appear in
/// a [`crate::PrefixTrie`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Prefix {
    addr: u128,
    len: u8,
}

impl Prefix {
    /// Create a new prefix. Bits of `addr` beyond `len` are cleared.
    ///
    /// # Panics
    /// Panics if `len > 128`.
    pub fn new(addr: u128, len: u8) -> Self {
        assert!(len <= 128, "prefix length {len} exceeds 128 bits");
        Self {
            addr: addr & mask_from_prefix_len::<u128>(len),
            len,
        }
    }

    /// The prefix that contains a single address.
    pub fn host(addr: u128) -> Self {
        Self { addr, len: 128 }
    }

    /// Create an IPv4 prefix, given the prefix length within the IPv4 address space.
    ///
    /// # Panics
    /// Panics if `len > 32`.
    pub fn from_ipv4(addr: Ipv4Addr, len: u8) -> Self {
        assert!(len <= 32, "IPv4 prefix length {len} exceeds 32 bits");
        Self::new(IPV4_MAPPED | u32::from(addr) as u128, len + IPV4_OFFSET)
    }

    /// Create an IPv6 prefix.
    ///
    /// # Panics
    /// Panics if `len > 128`.
    pub fn from_ipv6(addr: Ipv6Addr, len: u8) -> Self {
        Self::new(addr.into(), len)
    }

    /// Create the prefix that spans exactly the inclusive range `begin..=end`. The range must be
    /// an aligned block whose size is a power of two, and both ends must belong to the same
    /// address family.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let p = Prefix::from_range("10.0.0.0".parse()?, "10.0.0.255".parse()?)?;
    /// assert_eq!(p, "10.0.0.0/24".parse()?);
    /// assert_eq!(
    ///     Prefix::from_range("10.0.0.0".parse()?, "10.0.0.254".parse()?),
    ///     Err(ParseError::UnalignedRange)
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_range(begin: IpAddr, end: IpAddr) -> Result<Self, ParseError> {
        match (begin, end) {
            (IpAddr::V4(b), IpAddr::V4(e)) => {
                let len = range_len(u32::from(b), u32::from(e))?;
                Ok(Self::from_ipv4(b, len))
            }
            (IpAddr::V6(b), IpAddr::V6(e)) => {
                let len = range_len(u128::from(b), u128::from(e))?;
                Ok(Self::from_ipv6(b, len))
            }
            _ => Err(ParseError::MixedFamilies),
        }
    }

    /// The (masked) address of the prefix in the 128-bit key space.
    pub fn addr(&self) -> u128 {
        self.addr
    }

    /// Prefix length in the 128-bit key space.
    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Returns `true` if the prefix lies within the IPv4-mapped block.
    pub fn is_ipv4(&self) -> bool {
        self.len >= IPV4_OFFSET
            && self.addr & mask_from_prefix_len::<u128>(IPV4_OFFSET) == IPV4_MAPPED
    }

    /// The network address, as an IPv4 address if the prefix is IPv4-mapped.
    pub fn network(&self) -> IpAddr {
        if self.is_ipv4() {
            IpAddr::V4(Ipv4Addr::from(self.addr as u32))
        } else {
            IpAddr::V6(Ipv6Addr::from(self.addr))
        }
    }

    /// Prefix length within the address family of [`Self::network`].
    pub fn family_len(&self) -> u8 {
        if self.is_ipv4() {
            self.len - IPV4_OFFSET
        } else {
            self.len
        }
    }

    /// Check if `addr` lies within this prefix.
    pub fn contains_addr(&self, addr: u128) -> bool {
        addr & mask_from_prefix_len::<u128>(self.len) == self.addr
    }

    /// Check if `self` contains `other`. This also returns `true` if both are equal.
    pub fn contains(&self, other: &Self) -> bool {
        self.len <= other.len && self.contains_addr(other.addr)
    }

    /// Check if a specific bit is set (counted from the left, where 0 is the first bit).
    pub fn is_bit_set(&self, bit: u8) -> bool {
        bit < 128 && extract_u128(self.addr, bit as u32, 1) == 1
    }

    /// The prefix one bit longer than `self`, with that bit set to `bit`.
    pub(crate) fn child(&self, bit: bool) -> Self {
        debug_assert!(self.len < 128);
        let addr = if bit {
            self.addr | (1u128 << (127 - self.len))
        } else {
            self.addr
        };
        Self {
            addr,
            len: self.len + 1,
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network(), self.family_len())
    }
}

impl Debug for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Parses `address/length` notation. A bare address is parsed as a host prefix. IPv4 text is
/// mapped into the 128-bit key space.
impl FromStr for Prefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('/') {
            Ok(s.parse::<IpNet>()?.into())
        } else {
            Ok(s.parse::<IpAddr>()?.into())
        }
    }
}

impl From<Ipv4Net> for Prefix {
    fn from(net: Ipv4Net) -> Self {
        Self::from_ipv4(net.addr(), net.prefix_len())
    }
}

impl From<Ipv6Net> for Prefix {
    fn from(net: Ipv6Net) -> Self {
        Self::from_ipv6(net.addr(), net.prefix_len())
    }
}

impl From<IpNet> for Prefix {
    fn from(net: IpNet) -> Self {
        match net {
            IpNet::V4(net) => net.into(),
            IpNet::V6(net) => net.into(),
        }
    }
}

impl From<Ipv4Addr> for Prefix {
    fn from(addr: Ipv4Addr) -> Self {
        Self::from_ipv4(addr, 32)
    }
}

impl From<Ipv6Addr> for Prefix {
    fn from(addr: Ipv6Addr) -> Self {
        Self::host(addr.into())
    }
}

impl From<IpAddr> for Prefix {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(addr) => addr.into(),
            IpAddr::V6(addr) => addr.into(),
        }
    }
}

#[cfg(feature = "ipnetwork")]
impl From<Ipv4Network> for Prefix {
    fn from(net: Ipv4Network) -> Self {
        Self::from_ipv4(net.ip(), net.prefix())
    }
}

#[cfg(feature = "ipnetwork")]
impl From<Ipv6Network> for Prefix {
    fn from(net: Ipv6Network) -> Self {
        Self::from_ipv6(net.ip(), net.prefix())
    }
}

#[cfg(feature = "ipnetwork")]
impl From<IpNetwork> for Prefix {
    fn from(net: IpNetwork) -> Self {
        match net {
            IpNetwork::V4(net) => net.into(),
            IpNetwork::V6(net) => net.into(),
        }
    }
}

#[cfg(feature = "cidr")]
impl From<cidr::Ipv4Cidr> for Prefix {
    fn from(net: cidr::Ipv4Cidr) -> Self {
        Self::from_ipv4(net.first_address(), net.network_length())
    }
}

#[cfg(feature = "cidr")]
impl From<cidr::Ipv6Cidr> for Prefix {
    fn from(net: cidr::Ipv6Cidr) -> Self {
        Self::from_ipv6(net.first_address(), net.network_length())
    }
}

#[cfg(feature = "cidr")]
impl From<cidr::IpCidr> for Prefix {
    fn from(net: cidr::IpCidr) -> Self {
        match net {
            cidr::IpCidr::V4(net) => net.into(),
            cidr::IpCidr::V6(net) => net.into(),
        }
    }
}
