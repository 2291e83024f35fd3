use std::{fs::File, io, path::PathBuf};

use anyhow::Context;
use evdev_rs::{
    Device, DeviceWrapper, InputEvent, ReadFlag, ReadStatus,
    enums::{EV_ABS, EventCode},
    util::event_code_to_int,
};
use tracing::{info, warn};

use super::EventSource;
use crate::event_model::event::{RawEvent, TouchEvent};

/// Highest `/dev/input/eventN` index probed by [`list_devices`].
pub const MAX_INPUT_DEV: u32 = 20;

pub fn event_node(index: u32) -> PathBuf {
    PathBuf::from(format!("/dev/input/event{index}"))
}

/// A touchscreen read through libevdev with blocking reads.
pub struct EvdevSource {
    device: Device,
    syncing: bool,
}

impl EvdevSource {
    pub fn open(index: u32) -> anyhow::Result<Self> {
        let path = event_node(index);
        let file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
        let device = Device::new_from_file(file)
            .with_context(|| format!("init libevdev for {}", path.display()))?;

        info!(
            path = %path.display(),
            name = device.name().unwrap_or("Unknown"),
            "using input device"
        );
        if !device.has(EventCode::EV_ABS(EV_ABS::ABS_MT_SLOT)) {
            warn!("device does not report ABS_MT_SLOT, contacts will stay in slot 0");
        }
        Ok(Self {
            device,
            syncing: false,
        })
    }

    fn decode(event: &InputEvent) -> TouchEvent {
        let (kind, code) = event_code_to_int(&event.event_code);
        TouchEvent::from(RawEvent::new(kind as u16, code as u16, event.value))
    }
}

impl EventSource for EvdevSource {
    fn next_event(&mut self) -> anyhow::Result<TouchEvent> {
        if self.syncing {
            match self.device.next_event(ReadFlag::SYNC) {
                Ok((_, event)) => return Ok(Self::decode(&event)),
                // 同步完成
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => self.syncing = false,
                Err(e) => return Err(e).context("read touch events"),
            }
        }

        let (status, event) = self
            .device
            .next_event(ReadFlag::NORMAL | ReadFlag::BLOCKING)
            .context("read touch events")?;
        if matches!(status, ReadStatus::Sync) {
            warn!("event queue overflowed, resyncing device state");
            self.syncing = true;
        }
        Ok(Self::decode(&event))
    }
}

#[derive(Debug, Clone)]
pub struct InputDeviceInfo {
    pub index: u32,
    pub name: String,
    pub driver_version: i32,
    pub multitouch: bool,
}

impl InputDeviceInfo {
    /// Driver version as `major.minor.patch`.
    pub fn version_string(&self) -> String {
        let v = self.driver_version;
        format!("{}.{}.{}", v >> 16, (v >> 8) & 0xff, v & 0xff)
    }
}

/// Lists the event nodes that can be opened, skipping the rest.
pub fn list_devices() -> Vec<InputDeviceInfo> {
    (0..MAX_INPUT_DEV)
        .filter_map(|index| {
            let file = File::open(event_node(index)).ok()?;
            let device = Device::new_from_file(file).ok()?;
            Some(InputDeviceInfo {
                index,
                name: device.name().unwrap_or("Unknown").to_string(),
                driver_version: device.driver_version(),
                multitouch: device.has(EventCode::EV_ABS(EV_ABS::ABS_MT_SLOT)),
            })
        })
        .collect()
}
