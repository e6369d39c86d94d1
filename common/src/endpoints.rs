pub const PATH_STATUS: &str = "/status";

pub const PATH_CONTROL_HUMIDIFIER: &str = "/control_humidifier";
pub const PATH_CONTROL_VENTILATION: &str = "/control_ventilation";
pub const PATH_CONTROL_LEDS: &str = "/control_leds";
pub const PATH_EMERGENCY_STOP: &str = "/stop";
pub const PATH_AUTO_MODE: &str = "/auto_mode";

pub const FORM_RUNNING: &str = "running";
