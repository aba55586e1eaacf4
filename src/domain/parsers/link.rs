/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Link-layer parsing functions for `ip` command output

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref IP_LINK_LINE_RE: Regex = Regex::new(r"(?m)^(\d+):\s+([^:\s]+):").unwrap();
    pub static ref LINK_STATE_RE: Regex = Regex::new(r"\bstate\s+(\S+)").unwrap();
    pub static ref INET_ADDR_RE: Regex = Regex::new(r"\binet\s+\d{1,3}(?:\.\d{1,3}){3}").unwrap();
    pub static ref EXCLUDED_INTERFACE_RE: Regex =
        Regex::new(r"^(?:lo|docker|br-|veth|virbr|ib)").unwrap();
}

/// Parse interface names from `ip -o link show`, ordered by interface index
pub fn parse_ip_link_names(ip_output: &str) -> Vec<String> {
    let mut links: Vec<(u32, String)> = IP_LINK_LINE_RE
        .captures_iter(ip_output)
        .filter_map(|cap| {
            let index = cap[1].parse().ok()?;
            Some((index, cap[2].to_string()))
        })
        .collect();

    links.sort_by_key(|(index, _)| *index);
    links.into_iter().map(|(_, name)| name).collect()
}

/// Extract the operational state token (e.g. `UP`) from `ip link show dev <name>`
pub fn parse_link_state(ip_output: &str) -> Option<String> {
    LINK_STATE_RE
        .captures(ip_output)
        .map(|cap| cap[1].to_string())
}

/// Whether `ip -4 addr show dev <name>` output contains an IPv4 address
pub fn has_ipv4_address(ip_output: &str) -> bool {
    INET_ADDR_RE.is_match(ip_output)
}

/// Whether an interface is never a candidate for NCCL/UCX socket traffic
///
/// Loopback, container, bridge, veth, InfiniBand-named and VLAN (`@`) interfaces
/// are excluded regardless of state.
pub fn is_excluded_interface(name: &str) -> bool {
    name.contains('@') || EXCLUDED_INTERFACE_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP_LINK_OUTPUT: &str = "1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN mode DEFAULT group default qlen 1000\\    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
3: eth1: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc mq state UP mode DEFAULT group default qlen 1000\\    link/ether 52:54:00:12:34:57 brd ff:ff:ff:ff:ff:ff
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc mq state UP mode DEFAULT group default qlen 1000\\    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
4: ib0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 2044 qdisc mq state UP mode DEFAULT group default qlen 256\\    link/infiniband 00:00:10:29:fe:80 brd 00:ff:ff:ff:ff:12
5: eth0.100@eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc noqueue state UP mode DEFAULT group default qlen 1000\\    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
6: docker0: <NO-CARRIER,BROADCAST,MULTICAST,UP> mtu 1500 qdisc noqueue state DOWN mode DEFAULT group default\\    link/ether 02:42:ac:11:00:01 brd ff:ff:ff:ff:ff:ff
";

    #[test]
    fn test_parse_ip_link_names_sorted_by_index() {
        let names = parse_ip_link_names(IP_LINK_OUTPUT);
        assert_eq!(
            names,
            vec!["lo", "eth0", "eth1", "ib0", "eth0.100@eth0", "docker0"]
        );
    }

    #[test]
    fn test_parse_link_state() {
        let output = "2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc mq state UP mode DEFAULT group default qlen 1000\n    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff\n";
        assert_eq!(parse_link_state(output).as_deref(), Some("UP"));
        assert_eq!(
            parse_link_state("6: docker0: <NO-CARRIER> mtu 1500 state DOWN mode DEFAULT").as_deref(),
            Some("DOWN")
        );
        assert!(parse_link_state("").is_none());
    }

    #[test]
    fn test_has_ipv4_address() {
        assert!(has_ipv4_address(
            "2: eth0    inet 10.0.0.5/24 brd 10.0.0.255 scope global eth0\\       valid_lft forever preferred_lft forever"
        ));
        assert!(!has_ipv4_address(""));
        assert!(!has_ipv4_address(
            "2: eth0    inet6 fe80::5054:ff:fe12:3456/64 scope link"
        ));
    }

    #[test]
    fn test_excluded_interfaces() {
        for name in ["lo", "docker0", "br-3f2a9c", "veth12ab", "virbr0", "ib0", "ibp65s0", "eth0.100@eth0"] {
            assert!(is_excluded_interface(name), "{name} should be excluded");
        }
        for name in ["eth0", "ens3", "enp65s0f0", "bond0"] {
            assert!(!is_excluded_interface(name), "{name} should be a candidate");
        }
    }
}
