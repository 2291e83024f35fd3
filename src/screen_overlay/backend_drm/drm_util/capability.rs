use anyhow::{Context, bail};
use tracing::debug;

use drm::DriverCapability as DC;
pub const DRIVER_CAP_ENUMS: &[DC] = &[
    DC::DumbBuffer,
    DC::VBlankHighCRTC,
    DC::DumbPreferredDepth,
    DC::DumbPreferShadow,
    DC::Prime,
    DC::MonotonicTimestamp,
    DC::ASyncPageFlip,
    DC::AddFB2Modifiers,
    DC::PageFlipTarget,
    DC::CRTCInVBlankEvent,
];

pub fn log_driver_caps<T: drm::Device>(card: &T) {
    for &cap in DRIVER_CAP_ENUMS {
        debug!("{:?}: {:?}", cap, card.get_driver_capability(cap));
    }
}

/// Fails unless the driver can allocate CPU-mappable dumb buffers.
pub fn require_dumb_buffers<T: drm::Device>(card: &T) -> anyhow::Result<()> {
    let supported = card
        .get_driver_capability(DC::DumbBuffer)
        .context("query dumb buffer capability")?;
    if supported == 0 {
        bail!("driver does not support dumb buffers");
    }
    Ok(())
}
