use std::sync::Arc;

use greenhouse_common::{
    button_label, status_label, ControlCommand, Device, DeviceIntents, Intent, Override,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::client::{ClientError, CommandSink};

/// What the display should show after a successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub device: Device,
    pub intent: Intent,
    pub status_label: String,
    pub button_label: String,
}

/// Turns user toggles into commands and tracks displayed intent.
///
/// Intent is updated optimistically as soon as the request is sent. Toggles
/// of the same device are serialized; different devices proceed in parallel.
pub struct Reconciler<C> {
    sink: Arc<C>,
    intents: Mutex<DeviceIntents>,
    humidifier: Mutex<()>,
    ventilation: Mutex<()>,
    leds: Mutex<()>,
}

impl<C: CommandSink> Reconciler<C> {
    pub fn new(sink: Arc<C>) -> Self {
        Self::with_intents(sink, DeviceIntents::default())
    }

    pub fn with_intents(sink: Arc<C>, intents: DeviceIntents) -> Self {
        Self {
            sink,
            intents: Mutex::new(intents),
            humidifier: Mutex::new(()),
            ventilation: Mutex::new(()),
            leds: Mutex::new(()),
        }
    }

    pub async fn intents(&self) -> DeviceIntents {
        *self.intents.lock().await
    }

    pub async fn toggle(&self, device: Device) -> Result<ToggleOutcome, ClientError> {
        let _serial = self.device_lock(device).lock().await;

        let command = self.intents.lock().await.plan_toggle(device);
        if let Err(err) = self.sink.send_command(command).await {
            warn!(device = device.as_str(), "toggle not sent: {err}");
            return Err(err);
        }

        let intent = Intent::from(command.desired_state);
        self.intents.lock().await.apply(&command);
        info!(device = device.as_str(), intent = intent.as_str(), "toggle sent");

        Ok(ToggleOutcome {
            device,
            intent,
            status_label: status_label(device, intent),
            button_label: button_label(device, intent),
        })
    }

    /// Sends an override. Displayed intents are left as they are.
    pub async fn trigger(&self, action: Override) -> Result<&'static str, ClientError> {
        let command = ControlCommand::for_override(action);
        match self.sink.send_command(command).await {
            Ok(()) => {
                info!(endpoint = command.endpoint.path(), "override sent");
                Ok(action.confirmation())
            }
            Err(err) => {
                warn!(endpoint = command.endpoint.path(), "override not sent: {err}");
                Err(err)
            }
        }
    }

    fn device_lock(&self, device: Device) -> &Mutex<()> {
        match device {
            Device::Humidifier => &self.humidifier,
            Device::Ventilation => &self.ventilation,
            Device::Leds => &self.leds,
        }
    }
}
