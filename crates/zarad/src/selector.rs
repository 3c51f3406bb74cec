//! Method selection.
//!
//! One declared priority table, consulted everywhere. Selection is a pure
//! function of the current capability table: first method in priority order
//! whose backing resource is available wins, and simulation (never probed,
//! always viable) closes every list.

use tracing::debug;

use zara_common::{ActionKind, CapabilityTable, MethodKind, ZaraError};

use crate::config::ZaraConfig;

/// Built-in priority order per action: dedicated peripheral or the best
/// device first, simulation last.
pub fn default_priorities(action: ActionKind) -> &'static [MethodKind] {
    match action {
        ActionKind::Listen => &[
            MethodKind::Microphone,
            MethodKind::ArduinoSerial,
            MethodKind::Simulation,
        ],
        ActionKind::Speak => &[
            MethodKind::Speakers,
            MethodKind::ArduinoLed,
            MethodKind::Simulation,
        ],
        ActionKind::Visual => &[
            MethodKind::Camera,
            MethodKind::ArduinoServo,
            MethodKind::Simulation,
        ],
        ActionKind::Gesture => &[
            MethodKind::Camera,
            MethodKind::ArduinoSensor,
            MethodKind::Simulation,
        ],
    }
}

/// Pick the method for an action given the current capability table and any
/// configured priority override.
///
/// Never returns a method whose backing resource is unavailable. The
/// `AllMethodsExhausted` arm is defensive: it can only trigger if an
/// override omits simulation and nothing else is available.
pub fn select(
    action: ActionKind,
    table: &CapabilityTable,
    config: &ZaraConfig,
) -> Result<MethodKind, ZaraError> {
    let order: &[MethodKind] = config
        .priority_override(action)
        .unwrap_or_else(|| default_priorities(action));

    for &method in order {
        let viable = match method.backing_resource() {
            Some(resource) => table.is_available(resource),
            None => true, // simulation
        };
        if viable {
            debug!("Selected {} for {}", method, action);
            return Ok(method);
        }
    }

    Err(ZaraError::AllMethodsExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zara_common::{CapabilityStatus, ResourceKind};

    fn table_with(available: &[ResourceKind]) -> CapabilityTable {
        let mut table = CapabilityTable::all_unavailable();
        for &kind in available {
            table.set(kind, CapabilityStatus::connected("test"));
        }
        table
    }

    #[test]
    fn never_selects_unavailable_resource() {
        let config = ZaraConfig::default();
        // Exhaustive over the power set of resources.
        for mask in 0u32..(1 << ResourceKind::ALL.len()) {
            let available: Vec<ResourceKind> = ResourceKind::ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, k)| *k)
                .collect();
            let table = table_with(&available);

            for action in ActionKind::ALL {
                let method = select(action, &table, &config).unwrap();
                if let Some(resource) = method.backing_resource() {
                    assert!(
                        table.is_available(resource),
                        "picked {method} while {resource} unavailable (mask {mask:#b})"
                    );
                }
            }
        }
    }

    #[test]
    fn simulation_is_always_selectable() {
        let config = ZaraConfig::default();
        let table = CapabilityTable::all_unavailable();
        for action in ActionKind::ALL {
            assert_eq!(
                select(action, &table, &config).unwrap(),
                MethodKind::Simulation
            );
        }
    }

    #[test]
    fn microphone_beats_arduino_for_listen() {
        let config = ZaraConfig::default();
        let table = table_with(&[ResourceKind::Microphone, ResourceKind::Arduino]);
        assert_eq!(
            select(ActionKind::Listen, &table, &config).unwrap(),
            MethodKind::Microphone
        );
    }

    #[test]
    fn arduino_serves_listen_when_microphone_is_out() {
        let config = ZaraConfig::default();
        let table = table_with(&[ResourceKind::Arduino]);
        assert_eq!(
            select(ActionKind::Listen, &table, &config).unwrap(),
            MethodKind::ArduinoSerial
        );
    }

    #[test]
    fn spec_scenario_arduino_down_microphone_up() {
        let config = ZaraConfig::default();
        let mut table = table_with(&[ResourceKind::Microphone, ResourceKind::Arduino]);
        table.mark_unavailable(ResourceKind::Arduino);
        assert_eq!(
            select(ActionKind::Listen, &table, &config).unwrap(),
            MethodKind::Microphone
        );
    }

    #[test]
    fn config_override_changes_order() {
        let mut config = ZaraConfig::default();
        config.priorities.insert(
            "listen".to_string(),
            vec![
                MethodKind::ArduinoSerial,
                MethodKind::Microphone,
                MethodKind::Simulation,
            ],
        );
        let table = table_with(&[ResourceKind::Microphone, ResourceKind::Arduino]);
        assert_eq!(
            select(ActionKind::Listen, &table, &config).unwrap(),
            MethodKind::ArduinoSerial
        );
    }

    #[test]
    fn exhausted_guard_fires_on_broken_override() {
        let mut config = ZaraConfig::default();
        // Override that forgot simulation - the defensive arm must fire
        // rather than panic.
        config
            .priorities
            .insert("speak".to_string(), vec![MethodKind::Speakers]);
        let table = CapabilityTable::all_unavailable();
        let err = select(ActionKind::Speak, &table, &config).unwrap_err();
        assert!(matches!(err, ZaraError::AllMethodsExhausted));
    }

    #[test]
    fn selection_is_pure_across_calls() {
        let config = ZaraConfig::default();
        let table = table_with(&[ResourceKind::Speakers]);
        let first = select(ActionKind::Speak, &table, &config).unwrap();
        for _ in 0..10 {
            assert_eq!(select(ActionKind::Speak, &table, &config).unwrap(), first);
        }
    }
}
