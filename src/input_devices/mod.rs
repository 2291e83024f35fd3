use crate::event_model::event::TouchEvent;

/// evdev 触摸屏输入
pub mod evdev;

/// 脚本化的事件源, 用于测试
pub mod replay;

/// Something that yields touch events one at a time.
///
/// `next_event` blocks until an event is available. End of stream and I/O
/// failures are errors: the decode loop treats both as fatal.
pub trait EventSource {
    fn next_event(&mut self) -> anyhow::Result<TouchEvent>;
}
