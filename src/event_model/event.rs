use num_enum::FromPrimitive;

/// `BTN_TOUCH` key code from `linux/input-event-codes.h`.
pub const BTN_TOUCH: u16 = 0x14a;

/// Kernel event type tags we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u16)]
pub enum EventKind {
    Syn = 0x00,
    Key = 0x01,
    Abs = 0x03,
    #[num_enum(default)]
    Other,
}

/// Multitouch (protocol B) absolute axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u16)]
pub enum AbsAxis {
    MtSlot = 0x2f,
    MtPositionX = 0x35,
    MtPositionY = 0x36,
    MtTrackingId = 0x39,
    #[num_enum(default)]
    Other,
}

/// `SYN_REPORT`, the only sync code that closes a frame.
const SYN_REPORT: u16 = 0;

/// An event record as it comes out of `/dev/input/eventN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(kind: u16, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    SlotSelect(i32),
    TrackingId(i32),
    PositionX(i32),
    PositionY(i32),
    Key { code: u16, value: i32 },
    FrameSync,
    Unknown,
}

impl Default for TouchEvent {
    fn default() -> Self {
        Self::Unknown
    }
}

impl From<RawEvent> for TouchEvent {
    fn from(raw: RawEvent) -> Self {
        match EventKind::from_primitive(raw.kind) {
            EventKind::Syn if raw.code == SYN_REPORT => Self::FrameSync,
            EventKind::Key => Self::Key {
                code: raw.code,
                value: raw.value,
            },
            EventKind::Abs => match AbsAxis::from_primitive(raw.code) {
                AbsAxis::MtSlot => Self::SlotSelect(raw.value),
                AbsAxis::MtTrackingId => Self::TrackingId(raw.value),
                AbsAxis::MtPositionX => Self::PositionX(raw.value),
                AbsAxis::MtPositionY => Self::PositionY(raw.value),
                AbsAxis::Other => Self::Unknown,
            },
            _ => Self::Unknown,
        }
    }
}
