use anyhow::{anyhow, Result};
use crossbeam_channel::Sender;
use midir::{MidiInput, MidiInputConnection};

use super::message::MidiMessage;
use crate::types::events::ToneEvent;

/// MIDI input handler
/// Keeps the device connection alive and forwards note events to the audio thread
pub struct MidiHandler {
    _connection: MidiInputConnection<()>,
}

impl MidiHandler {
    /// Connect to the MIDI input port at `device_index`
    /// Messages on channels other than `channel_filter` (255 = omni) are dropped
    pub fn connect(
        event_tx: Sender<ToneEvent>,
        device_index: usize,
        channel_filter: u8,
    ) -> Result<Self> {
        let midi_in = MidiInput::new("table-osc-input")?;
        let ports = midi_in.ports();

        let port = ports
            .get(device_index)
            .ok_or_else(|| anyhow!("MIDI device index {} out of range", device_index))?;
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| "Unknown".to_string());

        log::info!("Connecting to MIDI input: {}", port_name);

        let connection = midi_in
            .connect(
                port,
                "table-osc-input",
                move |_timestamp, bytes, _| {
                    let message = MidiMessage::parse(bytes);
                    match message.to_tone_event(channel_filter) {
                        // Use try_send to avoid blocking MIDI thread
                        Some(event) => {
                            let _ = event_tx.try_send(event);
                        }
                        None => log::debug!("Ignoring MIDI message {:?}", message),
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to MIDI port: {}", e))?;

        Ok(Self {
            _connection: connection,
        })
    }

    /// List all available MIDI input devices
    pub fn list_devices() -> Result<Vec<String>> {
        let midi_in = MidiInput::new("table-osc-list")?;
        let ports = midi_in.ports();

        let mut devices = Vec::new();
        for port in ports.iter() {
            if let Ok(name) = midi_in.port_name(port) {
                devices.push(name);
            }
        }

        Ok(devices)
    }
}
