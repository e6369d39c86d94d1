use crate::types::{CommandEndpoint, Device, Intent, Override};

/// A single write against a control endpoint. Built per user action and
/// dropped once sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCommand {
    pub endpoint: CommandEndpoint,
    pub desired_state: bool,
}

impl ControlCommand {
    pub fn toggle(device: Device, desired_state: bool) -> Self {
        Self {
            endpoint: device.endpoint(),
            desired_state,
        }
    }

    /// Overrides carry no state of their own and always send `running=false`.
    pub fn for_override(action: Override) -> Self {
        Self {
            endpoint: action.endpoint(),
            desired_state: false,
        }
    }

    pub fn form_value(&self) -> &'static str {
        if self.desired_state {
            "true"
        } else {
            "false"
        }
    }
}

/// Displayed intent of the three toggleable actuators.
///
/// Intent follows what the user asked for, never the actuator flags of a
/// later snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceIntents {
    pub humidifier: Intent,
    pub ventilation: Intent,
    pub leds: Intent,
}

impl DeviceIntents {
    pub fn get(&self, device: Device) -> Intent {
        match device {
            Device::Humidifier => self.humidifier,
            Device::Ventilation => self.ventilation,
            Device::Leds => self.leds,
        }
    }

    pub fn set(&mut self, device: Device, intent: Intent) {
        match device {
            Device::Humidifier => self.humidifier = intent,
            Device::Ventilation => self.ventilation = intent,
            Device::Leds => self.leds = intent,
        }
    }

    pub fn plan_toggle(&self, device: Device) -> ControlCommand {
        ControlCommand::toggle(device, self.get(device).toggled().is_on())
    }

    /// Records a command that was sent successfully. Override commands leave
    /// intents untouched.
    pub fn apply(&mut self, command: &ControlCommand) -> Option<Intent> {
        let device = command.endpoint.device()?;
        let intent = Intent::from(command.desired_state);
        self.set(device, intent);
        Some(intent)
    }
}

pub fn status_label(device: Device, intent: Intent) -> String {
    let state = if intent.is_on() { "Actif" } else { "Désactivé" };
    format!("{}: {state}", device.display_name())
}

/// Text for the control that performs the next toggle.
pub fn button_label(device: Device, intent: Intent) -> String {
    let verb = if intent.is_on() { "Désactiver" } else { "Activer" };
    format!("{verb} {}", device.display_name())
}
