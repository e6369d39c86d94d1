use chrono::{DateTime, TimeZone};
use greenhouse_common::{status_label, Device, DeviceIntents, SensorSnapshot};

pub fn render_snapshot<Tz>(snapshot: &SensorSnapshot, received_at: &DateTime<Tz>) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut lines = vec![
        format!("Température: {:.1}°C", snapshot.temperature),
        format!("Humidité: {:.1}%", snapshot.humidity),
        format!("CO2: {} ppm", snapshot.co2),
    ];

    let remote: Vec<String> = Device::ALL
        .iter()
        .map(|device| {
            let flag = if snapshot.is_active(*device) { "on" } else { "off" };
            format!("{}={flag}", device.as_str())
        })
        .collect();
    lines.push(format!("Actionneurs (service): {}", remote.join(" ")));

    match snapshot.transition_kind.as_deref() {
        Some(kind) if snapshot.has_transition() => {
            lines.push(format!("Dernière transition: {} ({kind})", snapshot.timestamp))
        }
        _ => lines.push(format!("Dernière transition: {}", snapshot.timestamp)),
    }
    lines.push(format!(
        "Dernière mise à jour: {}",
        received_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines
}

pub fn render_intents(intents: &DeviceIntents) -> Vec<String> {
    Device::ALL
        .iter()
        .map(|device| status_label(*device, intents.get(*device)))
        .collect()
}
