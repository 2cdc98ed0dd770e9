use std::net::{IpAddr, Ipv4Addr};

use local_ip_address::list_afinet_netifas;
use tracing::{debug, warn};

/// Source of the host embedded in download links.
pub trait AddressProvider: Send + Sync {
    /// `None` when no usable LAN address exists.
    fn local_host(&self) -> Option<String>;
}

/// Discovers the machine's LAN IPv4 address from its network interfaces on every call,
/// so links follow the host across network changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanAddressProvider;

impl AddressProvider for LanAddressProvider {
    fn local_host(&self) -> Option<String> {
        let interfaces = match list_afinet_netifas() {
            Ok(ifaces) => ifaces,
            Err(e) => {
                warn!(error = %e, "failed to enumerate network interfaces");
                return None;
            }
        };

        let selected = select_lan_address(&interfaces);
        match selected {
            Some(ip) => debug!(ip = %ip, "resolved LAN address"),
            None => warn!("no suitable LAN address found"),
        }
        selected.map(|ip| ip.to_string())
    }
}

/// Fixed host, used for `PUBLIC_HOST` overrides and in tests.
#[derive(Debug, Clone)]
pub struct StaticAddressProvider {
    host: Option<String>,
}

impl StaticAddressProvider {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
        }
    }

    /// A provider that never finds an address.
    pub fn unavailable() -> Self {
        Self { host: None }
    }
}

impl AddressProvider for StaticAddressProvider {
    fn local_host(&self) -> Option<String> {
        self.host.clone()
    }
}

/// Pick the link address: the first private IPv4 on a physical interface, otherwise the
/// first non-loopback, non-link-local IPv4 on one.
pub fn select_lan_address(interfaces: &[(String, IpAddr)]) -> Option<Ipv4Addr> {
    let candidates: Vec<Ipv4Addr> = interfaces
        .iter()
        .filter(|(name, _)| !is_tunnel_interface(name))
        .filter_map(|(_, ip)| match ip {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_link_local() && !v4.is_unspecified() => {
                Some(*v4)
            }
            _ => None,
        })
        .collect();

    candidates
        .iter()
        .copied()
        .find(|ip| ip.is_private())
        .or_else(|| candidates.first().copied())
}

fn is_tunnel_interface(name: &str) -> bool {
    name.contains("utun") || name.contains("tun") || name.contains("tap")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(name: &str, ip: [u8; 4]) -> (String, IpAddr) {
        (name.to_string(), IpAddr::V4(Ipv4Addr::from(ip)))
    }

    #[test]
    fn loopback_and_link_local_are_skipped() {
        let interfaces = vec![
            iface("lo", [127, 0, 0, 1]),
            iface("eth0", [169, 254, 3, 4]),
            iface("wlan0", [192, 168, 1, 20]),
        ];
        assert_eq!(
            select_lan_address(&interfaces),
            Some(Ipv4Addr::new(192, 168, 1, 20))
        );
    }

    #[test]
    fn private_address_is_preferred() {
        let interfaces = vec![
            iface("eth0", [203, 0, 113, 7]),
            iface("eth1", [10, 0, 0, 5]),
        ];
        assert_eq!(
            select_lan_address(&interfaces),
            Some(Ipv4Addr::new(10, 0, 0, 5))
        );
    }

    #[test]
    fn public_address_used_when_no_private_one() {
        let interfaces = vec![iface("lo", [127, 0, 0, 1]), iface("eth0", [203, 0, 113, 7])];
        assert_eq!(
            select_lan_address(&interfaces),
            Some(Ipv4Addr::new(203, 0, 113, 7))
        );
    }

    #[test]
    fn tunnel_interfaces_and_ipv6_are_ignored() {
        let interfaces = vec![
            iface("utun3", [10, 8, 0, 2]),
            ("eth0".to_string(), "fe80::1".parse().unwrap()),
            iface("lo", [127, 0, 0, 1]),
        ];
        assert_eq!(select_lan_address(&interfaces), None);
    }

    #[test]
    fn static_provider() {
        assert_eq!(
            StaticAddressProvider::new("files.lan").local_host(),
            Some("files.lan".to_string())
        );
        assert_eq!(StaticAddressProvider::unavailable().local_host(), None);
    }
}
