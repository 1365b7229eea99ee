//! Fuzz target: `parse_message` + `CommandDispatcher::apply`
//!
//! The first byte picks the topic, the rest is the body. Parsing must
//! never panic, and applying whatever it yields must leave the actuator
//! bank in a consistent state.
//!
//! cargo fuzz run fuzz_parse_message

#![no_main]

use libfuzzer_sys::fuzz_target;
use growzone::actuators::{Actuator, ActuatorBank};
use growzone::app::commands::{AppCommand, parse_message};
use growzone::app::dispatcher::CommandDispatcher;
use growzone::app::ports::ActuatorPort;
use growzone::setpoints::SetpointStore;

struct NullPort;

impl ActuatorPort for NullPort {
    fn write(&mut self, _actuator: Actuator, _on: bool) {}
    fn write_light(&mut self, _intensity: Option<u8>) {}
}

const TOPICS: [&str; 4] = [
    "smartcrop/dev/command",
    "smartcrop/dev/setpoints",
    "smartcrop/dev/config",
    "smartcrop/dev/other",
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, body)) = data.split_first() else {
        return;
    };
    let topic = TOPICS[usize::from(selector) % TOPICS.len()];

    let Ok(cmd) = parse_message(topic, body) else {
        return;
    };

    let mut store = SetpointStore::new();
    let mut bank = ActuatorBank::new(NullPort);
    CommandDispatcher::new().apply(cmd, &mut store, &mut bank);

    if let AppCommand::UpdateSetpoints(sp) = cmd {
        assert!(store.is_valid());
        assert!(sp.light_intensity <= 100);
    }
    if cmd == AppCommand::EmergencyStop {
        assert!(Actuator::OUTPUTS.iter().all(|a| !bank.get(*a)));
    }
});
