//! Address-value comparison
//!
//! Two `IpAddr` values can denote the same host while differing in form: an
//! IPv4 address and its IPv4-mapped IPv6 form (`::ffff:a.b.c.d`) compare
//! unequal with `==`. The updater must not treat such a pair as a change.

use std::net::IpAddr;

/// Whether `a` and `b` denote the same address
pub fn same_address(a: IpAddr, b: IpAddr) -> bool {
    a.to_canonical() == b.to_canonical()
}
