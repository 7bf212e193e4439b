//! Captive DNS: answer every lookup with the access point's own address.
//!
//! The codec handles the single-question queries browsers and OS
//! connectivity checks send. Answers reuse the question name through a
//! compression pointer (`0xC00C`).
//!
//! | Query | Reply |
//! |---|---|
//! | A or ANY for a matching name | one A record, the AP address |
//! | any other type for a matching name | NOERROR, no answers |
//! | non-matching name | NXDOMAIN |
//! | responses, non-QUERY opcodes, malformed packets | dropped |
//!
//! A domain of `*` matches every name.

use alloc::vec::Vec;
use core::net::Ipv4Addr;

use crate::config::{long_string, DnsConfig, LongString};

/// DNS header length.
pub const HEADER_LEN: usize = 12;
/// Longest presentation-format name.
pub const MAX_NAME_LEN: usize = 253;
/// Record type A.
pub const TYPE_A: u16 = 1;
/// Query type ANY.
pub const TYPE_ANY: u16 = 255;
/// Class IN.
pub const CLASS_IN: u16 = 1;

const FLAG_QR: u16 = 0x8000;
const FLAG_AA: u16 = 0x0400;
const FLAG_RD: u16 = 0x0100;
const FLAG_RA: u16 = 0x0080;
const RCODE_NXDOMAIN: u16 = 3;

/// The question section of a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsQuery {
    /// Transaction ID.
    pub id: u16,
    /// Raw header flags.
    pub flags: u16,
    /// Dotted name, without the trailing dot.
    pub name: heapless::String<MAX_NAME_LEN>,
    /// Query type.
    pub qtype: u16,
    /// Query class.
    pub qclass: u16,
    question_len: usize,
}

impl DnsQuery {
    /// QR bit set: this is a response, not a query.
    pub fn is_response(&self) -> bool {
        self.flags & FLAG_QR != 0
    }

    /// Opcode field (0 = standard query).
    pub fn opcode(&self) -> u8 {
        ((self.flags >> 11) & 0x0F) as u8
    }

    /// True for A and ANY queries.
    pub fn wants_address(&self) -> bool {
        self.qtype == TYPE_A || self.qtype == TYPE_ANY
    }
}

/// Parse the header and first question of a DNS packet.
///
/// Returns `None` for truncated packets, packets with no question,
/// compressed or non-UTF-8 question names, or names longer than
/// [`MAX_NAME_LEN`].
pub fn parse_query(packet: &[u8]) -> Option<DnsQuery> {
    if packet.len() < HEADER_LEN {
        return None;
    }
    let id = u16::from_be_bytes([packet[0], packet[1]]);
    let flags = u16::from_be_bytes([packet[2], packet[3]]);
    let qdcount = u16::from_be_bytes([packet[4], packet[5]]);
    if qdcount == 0 {
        return None;
    }

    let mut idx = HEADER_LEN;
    let mut name = heapless::String::<MAX_NAME_LEN>::new();
    loop {
        let label_len = *packet.get(idx)? as usize;
        idx += 1;
        if label_len == 0 {
            break;
        }
        // Pointers and extended labels never appear in a question we answer
        if label_len & 0xC0 != 0 {
            return None;
        }
        let label = packet.get(idx..idx + label_len)?;
        let label = core::str::from_utf8(label).ok()?;
        if !name.is_empty() {
            name.push('.').ok()?;
        }
        name.push_str(label).ok()?;
        idx += label_len;
    }

    let tail = packet.get(idx..idx + 4)?;
    let qtype = u16::from_be_bytes([tail[0], tail[1]]);
    let qclass = u16::from_be_bytes([tail[2], tail[3]]);
    idx += 4;

    Some(DnsQuery {
        id,
        flags,
        name,
        qtype,
        qclass,
        question_len: idx - HEADER_LEN,
    })
}

/// What to put in a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DnsAnswer {
    /// One A record.
    Address(Ipv4Addr),
    /// NOERROR with an empty answer section.
    NoData,
    /// Name does not exist.
    NxDomain,
}

/// Build the reply to `query` (the raw packet `question` was parsed from).
///
/// Only the first question is echoed back. The reply is authoritative and
/// copies the query's RD bit.
pub fn build_response(query: &[u8], question: &DnsQuery, answer: DnsAnswer, ttl: u32) -> Vec<u8> {
    let question_end = HEADER_LEN + question.question_len;
    let mut out = Vec::with_capacity(question_end + 16);

    let mut flags = FLAG_QR | FLAG_AA | FLAG_RA | (question.flags & FLAG_RD);
    if answer == DnsAnswer::NxDomain {
        flags |= RCODE_NXDOMAIN;
    }
    let ancount: u16 = match answer {
        DnsAnswer::Address(_) => 1,
        _ => 0,
    };

    out.extend_from_slice(&question.id.to_be_bytes());
    out.extend_from_slice(&flags.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // QDCOUNT
    out.extend_from_slice(&ancount.to_be_bytes());
    out.extend_from_slice(&[0, 0, 0, 0]); // NSCOUNT, ARCOUNT
    out.extend_from_slice(&query[HEADER_LEN..question_end]);

    if let DnsAnswer::Address(ip) = answer {
        out.extend_from_slice(&[0xC0, 0x0C]); // pointer to question name
        out.extend_from_slice(&TYPE_A.to_be_bytes());
        out.extend_from_slice(&CLASS_IN.to_be_bytes());
        out.extend_from_slice(&ttl.to_be_bytes());
        out.extend_from_slice(&4u16.to_be_bytes());
        out.extend_from_slice(&ip.octets());
    }
    out
}

/// Which names to answer, and with what.
#[derive(Clone, Debug)]
pub struct CaptiveDnsPolicy {
    domain: LongString,
    address: Ipv4Addr,
    ttl: u32,
}

impl CaptiveDnsPolicy {
    /// Answer `domain` (or everything, for `*`) with `address`.
    pub fn new(domain: &str, address: Ipv4Addr, ttl: u32) -> Self {
        Self {
            domain: long_string(domain.trim_end_matches('.')),
            address,
            ttl,
        }
    }

    /// Policy from the DNS config section.
    pub fn from_config(config: &DnsConfig, address: Ipv4Addr) -> Self {
        Self::new(config.domain.as_str(), address, config.ttl_secs)
    }

    /// Address handed out.
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Case-insensitive match, or wildcard. A leading `www.` on the
    /// queried name is ignored.
    pub fn matches(&self, name: &str) -> bool {
        if self.domain.as_str() == "*" {
            return true;
        }
        let name = name.trim_end_matches('.');
        let name = match name.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("www.") => &name[4..],
            _ => name,
        };
        self.domain.as_str().eq_ignore_ascii_case(name)
    }

    /// Decide the reply, or `None` to drop the packet.
    pub fn answer(&self, query: &DnsQuery) -> Option<DnsAnswer> {
        if query.is_response() || query.opcode() != 0 {
            return None;
        }
        if !self.matches(&query.name) {
            return Some(DnsAnswer::NxDomain);
        }
        if query.wants_address() {
            Some(DnsAnswer::Address(self.address))
        } else {
            Some(DnsAnswer::NoData)
        }
    }

    /// Parse, decide, and encode. `None` means send nothing.
    pub fn respond(&self, packet: &[u8]) -> Option<Vec<u8>> {
        let query = parse_query(packet)?;
        let answer = self.answer(&query)?;
        log::trace!("[DNS] {} (qtype {}) -> {:?}", query.name, query.qtype, answer);
        Some(build_response(packet, &query, answer, self.ttl))
    }
}

#[cfg(feature = "std")]
pub use server::CaptiveDns;

#[cfg(feature = "std")]
mod server {
    use std::io;
    use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

    use super::CaptiveDnsPolicy;
    use crate::config::DnsConfig;
    use crate::traits::DnsResponder;

    /// Largest classic DNS-over-UDP datagram.
    const MAX_DATAGRAM: usize = 512;

    /// Non-blocking UDP captive DNS server.
    pub struct CaptiveDns {
        socket: UdpSocket,
        policy: CaptiveDnsPolicy,
        buf: [u8; MAX_DATAGRAM],
    }

    impl CaptiveDns {
        /// Bind `0.0.0.0:<config.port>` and answer with `address`.
        pub fn bind(config: &DnsConfig, address: Ipv4Addr) -> io::Result<Self> {
            let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.port))?;
            socket.set_nonblocking(true)?;
            log::info!(
                "[DNS] listening on {} for '{}' -> {}",
                socket.local_addr()?,
                config.domain.as_str(),
                address
            );
            Ok(Self {
                socket,
                policy: CaptiveDnsPolicy::from_config(config, address),
                buf: [0; MAX_DATAGRAM],
            })
        }

        /// Bound socket address.
        pub fn local_addr(&self) -> io::Result<SocketAddr> {
            self.socket.local_addr()
        }

        /// Answer policy in use.
        pub fn policy(&self) -> &CaptiveDnsPolicy {
            &self.policy
        }
    }

    impl DnsResponder for CaptiveDns {
        type Error = io::Error;

        fn process_next_request(&mut self) -> Result<bool, Self::Error> {
            let (len, peer) = match self.socket.recv_from(&mut self.buf) {
                Ok(received) => received,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) => return Err(e),
            };
            match self.policy.respond(&self.buf[..len]) {
                Some(reply) => {
                    self.socket.send_to(&reply, peer)?;
                }
                None => log::trace!("[DNS] dropped {} bytes from {}", len, peer),
            }
            Ok(true)
        }
    }
}
