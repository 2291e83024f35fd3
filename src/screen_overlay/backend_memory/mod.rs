use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, ensure};

use super::{BYTES_PER_PIXEL, Screen, Surface};

/// A copy of a submitted buffer, padding stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Which of the two buffers was submitted.
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != 0).count()
    }

    /// Bounding box `(x0, y0, x1, y1)` of the pixels equal to `color`,
    /// inclusive on both ends.
    pub fn bounds_of(&self, color: u32) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y) != color {
                    continue;
                }
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bounds
    }
}

/// Submitted frames, shared with whoever watches the screen.
pub type FrameLog = Arc<Mutex<Vec<Frame>>>;

/// Two heap buffers standing in for scanout memory.
pub struct MemoryScreen {
    width: u32,
    height: u32,
    pitch: u32,
    buffers: [Vec<u8>; 2],
    log: FrameLog,
    fail_after: Option<usize>,
    submitted: usize,
}

impl MemoryScreen {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_padding(width, height, 0)
    }

    /// Like [`MemoryScreen::new`] with `padding` extra bytes per row.
    pub fn with_padding(width: u32, height: u32, padding: u32) -> Self {
        let pitch = width * BYTES_PER_PIXEL as u32 + padding;
        let len = pitch as usize * height as usize;
        Self {
            width,
            height,
            pitch,
            buffers: [vec![0; len], vec![0; len]],
            log: FrameLog::default(),
            fail_after: None,
            submitted: 0,
        }
    }

    /// Makes every submit after the first `count` fail.
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn log(&self) -> FrameLog {
        self.log.clone()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Raw bytes of buffer `index`, padding included.
    pub fn raw(&self, index: usize) -> &[u8] {
        &self.buffers[index]
    }

    fn snapshot(&self, index: usize) -> Frame {
        let bytes = &self.buffers[index];
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height as usize {
            let row = &bytes[y * self.pitch as usize..][..self.width as usize * BYTES_PER_PIXEL];
            pixels.extend(
                row.chunks_exact(BYTES_PER_PIXEL)
                    .map(|p| u32::from_ne_bytes([p[0], p[1], p[2], p[3]])),
            );
        }
        Frame {
            index,
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

impl Screen for MemoryScreen {
    fn geometry(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn with_surface(
        &mut self,
        index: usize,
        draw: &mut dyn FnMut(&mut Surface<'_>),
    ) -> anyhow::Result<()> {
        ensure!(index < 2, "no buffer {index}");
        let mut surface = Surface::new(
            &mut self.buffers[index],
            self.width,
            self.height,
            self.pitch,
        )?;
        draw(&mut surface);
        Ok(())
    }

    fn submit(&mut self, index: usize) -> anyhow::Result<()> {
        ensure!(index < 2, "no buffer {index}");
        if self.fail_after.is_some_and(|n| self.submitted >= n) {
            bail!("injected submit failure");
        }
        self.submitted += 1;
        let frame = self.snapshot(index);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_records_unpadded_frame() {
        let mut screen = MemoryScreen::with_padding(3, 2, 8);
        assert_eq!(screen.pitch(), 20);
        screen
            .with_surface(1, &mut |s: &mut Surface<'_>| {
                s.row_mut(1)[8..12].copy_from_slice(&7u32.to_ne_bytes())
            })
            .unwrap();
        screen.submit(1).unwrap();

        let frames = screen.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].index, 1);
        assert_eq!(frames[0].pixels, vec![0, 0, 0, 0, 0, 7]);
        assert_eq!(frames[0].bounds_of(7), Some((2, 1, 2, 1)));
        assert!(screen.raw(0).iter().all(|&b| b == 0));
    }

    #[test]
    fn injected_failure() {
        let mut screen = MemoryScreen::new(2, 2).fail_after(0);
        assert!(screen.submit(0).is_err());
        assert!(screen.frames().is_empty());
    }

    #[test]
    fn bad_index() {
        let mut screen = MemoryScreen::new(2, 2);
        assert!(screen.submit(2).is_err());
        assert!(screen.with_surface(2, &mut |_: &mut Surface<'_>| {}).is_err());
    }
}
