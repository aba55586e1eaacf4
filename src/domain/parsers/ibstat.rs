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

//! InfiniBand parsing functions for `ibstat` and sysfs port state

use super::common::{non_empty_lines, parse_key_value};
use crate::domain::{DeviceKind, LinkState, NetworkDevice};

/// Content of a sysfs port `state` file for an active port
pub const SYSFS_ACTIVE_PORT_STATE: &str = "4: ACTIVE";

/// Parse the device names printed by `ibstat -l`
pub fn parse_ibstat_device_list(ibstat_output: &str) -> Vec<String> {
    non_empty_lines(ibstat_output).map(str::to_string).collect()
}

/// Parse the output of `ibstat <device>` into a device snapshot
///
/// Device-level state and link layer come from the first port listed in the
/// CA block. The port count is mandatory; without it the output is rejected.
///
/// # Arguments
/// * `name` - Device name the output belongs to
/// * `ibstat_output` - Raw `ibstat <device>` output
///
/// # Returns
/// * `Ok(NetworkDevice)` - Parsed snapshot
/// * `Err(String)` - Output did not contain a port count
pub fn parse_ibstat_device(name: &str, ibstat_output: &str) -> Result<NetworkDevice, String> {
    let mut port_count: Option<u32> = None;
    let mut state: Option<String> = None;
    let mut link_layer: Option<String> = None;

    for line in ibstat_output.lines() {
        let Ok((key, value)) = parse_key_value(line, ':') else {
            continue;
        };

        match key.as_str() {
            "Number of ports" if port_count.is_none() => {
                port_count = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid port count '{value}' for {name}"))?,
                );
            }
            "State" if state.is_none() => state = Some(value),
            "Link layer" if link_layer.is_none() => link_layer = Some(value),
            _ => {}
        }
    }

    let port_count = port_count.ok_or_else(|| format!("No port count in ibstat output for {name}"))?;

    Ok(NetworkDevice {
        name: name.to_string(),
        kind: link_layer
            .as_deref()
            .map_or(DeviceKind::Other, DeviceKind::from_link_layer),
        link_state: state
            .as_deref()
            .map_or(LinkState::Unknown, LinkState::from_ibstat),
        port_count,
    })
}

/// Whether the content of a sysfs `ports/<n>/state` file denotes an active port
pub fn is_active_port_state(content: &str) -> bool {
    content.trim() == SYSFS_ACTIVE_PORT_STATE
}

#[cfg(test)]
mod tests {
    use super::*;

    const IBSTAT_ACTIVE: &str = "CA 'mlx5_0'
\tCA type: MT4123
\tNumber of ports: 1
\tFirmware version: 20.31.1014
\tHardware version: 0
\tNode GUID: 0x0c42a10300a1b2c3
\tSystem image GUID: 0x0c42a10300a1b2c3
\tPort 1:
\t\tState: Active
\t\tPhysical state: LinkUp
\t\tRate: 200
\t\tBase lid: 12
\t\tLMC: 0
\t\tSM lid: 1
\t\tCapability mask: 0x2651e848
\t\tPort GUID: 0x0c42a10300a1b2c3
\t\tLink layer: InfiniBand
";

    const IBSTAT_ROCE_TWO_PORTS: &str = "CA 'mlx5_2'
\tCA type: MT4125
\tNumber of ports: 2
\tPort 1:
\t\tState: Active
\t\tPhysical state: LinkUp
\t\tRate: 100
\t\tLink layer: Ethernet
\tPort 2:
\t\tState: Down
\t\tPhysical state: Disabled
\t\tRate: 40
\t\tLink layer: Ethernet
";

    #[test]
    fn test_parse_ibstat_device_list() {
        let devices = parse_ibstat_device_list("mlx5_0\nmlx5_1\n\n");
        assert_eq!(devices, vec!["mlx5_0", "mlx5_1"]);
        assert!(parse_ibstat_device_list("").is_empty());
    }

    #[test]
    fn test_parse_active_infiniband_device() {
        let device = parse_ibstat_device("mlx5_0", IBSTAT_ACTIVE).unwrap();
        assert_eq!(device.name, "mlx5_0");
        assert_eq!(device.kind, DeviceKind::InfiniBand);
        assert_eq!(device.link_state, LinkState::Active);
        assert_eq!(device.port_count, 1);
        assert!(device.is_active_infiniband());
    }

    #[test]
    fn test_physical_state_is_not_mistaken_for_state() {
        let output = "CA 'mlx5_0'\n\tNumber of ports: 1\n\tPort 1:\n\t\tPhysical state: LinkUp\n\t\tLink layer: InfiniBand\n";
        let device = parse_ibstat_device("mlx5_0", output).unwrap();
        assert_eq!(device.link_state, LinkState::Unknown);
        assert!(!device.is_active_infiniband());
    }

    #[test]
    fn test_first_port_determines_device_fields() {
        let device = parse_ibstat_device("mlx5_2", IBSTAT_ROCE_TWO_PORTS).unwrap();
        assert_eq!(device.kind, DeviceKind::Ethernet);
        assert_eq!(device.link_state, LinkState::Active);
        assert_eq!(device.port_count, 2);
        assert!(!device.is_active_infiniband());
    }

    #[test]
    fn test_missing_port_count_is_rejected() {
        assert!(parse_ibstat_device("mlx5_0", "ibpanic: [1234] main: 'mlx5_0' IB device can't be found").is_err());
        assert!(parse_ibstat_device("mlx5_0", "\tNumber of ports: two\n").is_err());
    }

    #[test]
    fn test_sysfs_port_state() {
        assert!(is_active_port_state("4: ACTIVE\n"));
        assert!(!is_active_port_state("1: DOWN\n"));
        assert!(!is_active_port_state("2: INIT\n"));
        assert!(!is_active_port_state(""));
    }
}
