use std::sync::Arc;

use tracing::{debug, trace};

use super::{
    event::{BTN_TOUCH, TouchEvent},
    slot::{MAX_TOUCH, SENTINEL},
};
use crate::{context::TouchContext, input_devices::EventSource};

/// Multitouch protocol B state machine.
///
/// Owns the "current slot" pointer; every slot write goes through the
/// context's slot table lock.
pub struct EventDecoder {
    ctx: Arc<TouchContext>,
    current: usize,
}

impl EventDecoder {
    pub fn new(ctx: Arc<TouchContext>) -> Self {
        Self { ctx, current: 0 }
    }

    pub fn current_slot(&self) -> usize {
        self.current
    }

    /// Applies one event to the slot table, waking the renderer at frame
    /// boundaries and on contact lift.
    pub fn apply(&mut self, event: TouchEvent) {
        match event {
            TouchEvent::SlotSelect(index) => match usize::try_from(index) {
                Ok(index) if index < MAX_TOUCH => self.current = index,
                _ => debug!(index, "slot select out of range, dropped"),
            },
            TouchEvent::TrackingId(id) => {
                {
                    let mut slots = self.ctx.slots.lock();
                    let slot = &mut slots[self.current];
                    if id == SENTINEL {
                        slot.release();
                    } else {
                        slot.tracking_id = id;
                        slot.removed = false;
                    }
                }
                if id == SENTINEL {
                    trace!(slot = self.current, "contact lifted");
                    self.ctx.signal.notify();
                }
            }
            // 屏幕旋转: 设备的 X 轴对应显示的纵轴
            TouchEvent::PositionX(value) => self.ctx.slots.lock()[self.current].pos_y = value,
            TouchEvent::PositionY(value) => self.ctx.slots.lock()[self.current].pos_x = value,
            TouchEvent::Key { code, value } if code == BTN_TOUCH => {
                let mut slots = self.ctx.slots.lock();
                let slot = &mut slots[self.current];
                if value == 0 {
                    slot.release();
                } else {
                    slot.touch_down = true;
                }
            }
            TouchEvent::FrameSync => self.ctx.signal.notify(),
            TouchEvent::Key { .. } | TouchEvent::Unknown => {}
        }
    }

    /// Reads and applies events until stop is requested.
    ///
    /// Returns the source's error on read failure or end of stream.
    pub fn run<S: EventSource>(&mut self, source: &mut S) -> anyhow::Result<()> {
        while !self.ctx.stop_requested() {
            let event = source.next_event()?;
            self.apply(event);
        }
        debug!("decode loop stopped");
        Ok(())
    }
}
