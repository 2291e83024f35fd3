pub mod drm_util;

use std::path::PathBuf;

use anyhow::{Context, ensure};
use drm::{
    buffer::{Buffer, DrmFourcc},
    control::{Device, dumbbuffer::DumbBuffer, framebuffer},
};
use tracing::{info, warn};

use self::drm_util::{capability, device::Card, output::Output};
use super::{Screen, Surface};

struct ScanoutBuffer {
    dumb: DumbBuffer,
    fb: framebuffer::Handle,
}

/// Double-buffered scanout on one KMS output using dumb buffers.
///
/// Flips go through a full set-CRTC, no page flip events are involved.
pub struct DrmScreen {
    card: Card,
    output: Output,
    buffers: Vec<ScanoutBuffer>,
}

impl DrmScreen {
    /// Takes over output number `output_index` of the first usable card.
    ///
    /// Both buffers are cleared and buffer 0 is shown before returning.
    pub fn open(card_paths: &[PathBuf], output_index: usize) -> anyhow::Result<Self> {
        let (card, path) = Card::open_first(card_paths)?;
        capability::require_dumb_buffers(&card)?;
        capability::log_driver_caps(&card);

        let output = drm_util::output::connected_outputs(&card)?
            .into_iter()
            .nth(output_index)
            .with_context(|| format!("no connected output with index {output_index}"))?;
        let (width, height) = output.size();
        info!(
            card = %path.display(),
            connector = u32::from(output.connector),
            crtc = u32::from(output.crtc),
            output = %output.name,
            "using {width}x{height}"
        );

        let mut screen = Self {
            card,
            output,
            buffers: Vec::with_capacity(2),
        };
        for i in 0..2 {
            let dumb = screen
                .card
                .create_dumb_buffer((width.into(), height.into()), DrmFourcc::Xrgb8888, 32)
                .with_context(|| format!("create dumb buffer {i}"))?;
            let fb = match screen.card.add_framebuffer(&dumb, 24, 32) {
                Ok(fb) => fb,
                Err(e) => {
                    let _ = screen.card.destroy_dumb_buffer(dumb);
                    return Err(e).with_context(|| format!("add framebuffer {i}"));
                }
            };
            screen.buffers.push(ScanoutBuffer { dumb, fb });
        }

        for i in 0..2 {
            screen.with_surface(i, &mut |s: &mut Surface<'_>| s.clear())?;
        }
        screen.submit(0)?;
        Ok(screen)
    }
}

impl Screen for DrmScreen {
    fn geometry(&self) -> (u32, u32) {
        let (w, h) = self.output.size();
        (w.into(), h.into())
    }

    fn with_surface(
        &mut self,
        index: usize,
        draw: &mut dyn FnMut(&mut Surface<'_>),
    ) -> anyhow::Result<()> {
        ensure!(index < self.buffers.len(), "no buffer {index}");
        let (width, height) = self.geometry();
        let buffer = &mut self.buffers[index];
        let pitch = buffer.dumb.pitch();
        let mut mapping = self
            .card
            .map_dumb_buffer(&mut buffer.dumb)
            .with_context(|| format!("map dumb buffer {index}"))?;
        let mut surface = Surface::new(&mut mapping, width, height, pitch)?;
        draw(&mut surface);
        Ok(())
    }

    fn submit(&mut self, index: usize) -> anyhow::Result<()> {
        ensure!(index < self.buffers.len(), "no buffer {index}");
        self.card
            .set_crtc(
                self.output.crtc,
                Some(self.buffers[index].fb),
                (0, 0),
                &[self.output.connector],
                Some(self.output.mode),
            )
            .context("set crtc")
    }
}

impl Drop for DrmScreen {
    fn drop(&mut self) {
        for buffer in self.buffers.drain(..) {
            if let Err(e) = self.card.destroy_framebuffer(buffer.fb) {
                warn!("destroy framebuffer: {e}");
            }
            if let Err(e) = self.card.destroy_dumb_buffer(buffer.dumb) {
                warn!("destroy dumb buffer: {e}");
            }
        }
    }
}
