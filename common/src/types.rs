use crate::endpoints::{
    PATH_AUTO_MODE, PATH_CONTROL_HUMIDIFIER, PATH_CONTROL_LEDS, PATH_CONTROL_VENTILATION,
    PATH_EMERGENCY_STOP,
};

/// Timestamp reported when the remote payload carries no transition record.
pub const NO_TRANSITION: &str = "N/A";

/// One decoded reading of the enclosure.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub co2: i64,
    pub humidifier_active: bool,
    pub ventilation_active: bool,
    pub leds_active: bool,
    pub timestamp: String,
    pub transition_kind: Option<String>,
}

impl SensorSnapshot {
    pub fn is_active(&self, device: Device) -> bool {
        match device {
            Device::Humidifier => self.humidifier_active,
            Device::Ventilation => self.ventilation_active,
            Device::Leds => self.leds_active,
        }
    }

    pub fn has_transition(&self) -> bool {
        self.timestamp != NO_TRANSITION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Humidifier,
    Ventilation,
    Leds,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Humidifier, Device::Ventilation, Device::Leds];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Humidifier => "humidifier",
            Self::Ventilation => "ventilation",
            Self::Leds => "leds",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Humidifier => "Humidificateur",
            Self::Ventilation => "Ventilation",
            Self::Leds => "LEDs",
        }
    }

    pub fn endpoint(self) -> CommandEndpoint {
        match self {
            Self::Humidifier => CommandEndpoint::Humidifier,
            Self::Ventilation => CommandEndpoint::Ventilation,
            Self::Leds => CommandEndpoint::Leds,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "humidifier" => Some(Self::Humidifier),
            "ventilation" => Some(Self::Ventilation),
            "leds" => Some(Self::Leds),
            _ => None,
        }
    }
}

/// Locally displayed on/off state of a toggleable actuator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Intent {
    #[default]
    Off,
    On,
}

impl Intent {
    pub fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }

    pub fn is_on(self) -> bool {
        self == Self::On
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }
}

impl From<bool> for Intent {
    fn from(active: bool) -> Self {
        if active {
            Self::On
        } else {
            Self::Off
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    EmergencyStop,
    AutoMode,
}

impl Override {
    pub fn endpoint(self) -> CommandEndpoint {
        match self {
            Self::EmergencyStop => CommandEndpoint::EmergencyStop,
            Self::AutoMode => CommandEndpoint::AutoMode,
        }
    }

    pub fn confirmation(self) -> &'static str {
        match self {
            Self::EmergencyStop => "Arrêt d'urgence activé",
            Self::AutoMode => "Mode automatique activé",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandEndpoint {
    Humidifier,
    Ventilation,
    Leds,
    EmergencyStop,
    AutoMode,
}

impl CommandEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Humidifier => PATH_CONTROL_HUMIDIFIER,
            Self::Ventilation => PATH_CONTROL_VENTILATION,
            Self::Leds => PATH_CONTROL_LEDS,
            Self::EmergencyStop => PATH_EMERGENCY_STOP,
            Self::AutoMode => PATH_AUTO_MODE,
        }
    }

    /// The toggle device behind this endpoint, `None` for overrides.
    pub fn device(self) -> Option<Device> {
        match self {
            Self::Humidifier => Some(Device::Humidifier),
            Self::Ventilation => Some(Device::Ventilation),
            Self::Leds => Some(Device::Leds),
            Self::EmergencyStop | Self::AutoMode => None,
        }
    }
}
