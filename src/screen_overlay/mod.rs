use anyhow::ensure;

/// 基于 KMS dumb buffer 的显示后端
pub mod backend_drm;
/// 内存中的显示后端, 记录每一帧
pub mod backend_memory;
pub mod compositor;
pub mod renderer;
pub mod shape;

/// XRGB8888
pub const BYTES_PER_PIXEL: usize = 4;

/// A writable view of one scanout buffer.
///
/// Rows are `pitch` bytes apart; only the first `width * 4` bytes of a row
/// are pixels.
pub struct Surface<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
    pitch: u32,
}

impl<'a> Surface<'a> {
    pub fn new(pixels: &'a mut [u8], width: u32, height: u32, pitch: u32) -> anyhow::Result<Self> {
        let row = width as usize * BYTES_PER_PIXEL;
        ensure!(
            pitch as usize >= row,
            "pitch {pitch} is shorter than a {width} pixel row"
        );
        ensure!(
            pixels.len() >= pitch as usize * height as usize,
            "buffer of {} bytes cannot hold {height} rows of pitch {pitch}",
            pixels.len()
        );
        Ok(Self {
            pixels,
            width,
            height,
            pitch,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Fills the whole buffer, padding included, with transparent black.
    pub fn clear(&mut self) {
        let len = self.pitch as usize * self.height as usize;
        self.pixels[..len].fill(0);
    }

    /// Pixel bytes of row `y`, without the pitch padding.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.pitch as usize;
        &mut self.pixels[start..start + self.width as usize * BYTES_PER_PIXEL]
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        let at = y as usize * self.pitch as usize + x as usize * BYTES_PER_PIXEL;
        u32::from_ne_bytes([
            self.pixels[at],
            self.pixels[at + 1],
            self.pixels[at + 2],
            self.pixels[at + 3],
        ])
    }
}

/// A double-buffered display.
///
/// Buffer indices are `0` and `1`. Implementations show buffer `0` and
/// clear both before handing the screen to a renderer.
pub trait Screen {
    /// `(width, height)` in pixels, identical for both buffers.
    fn geometry(&self) -> (u32, u32);

    /// Runs `draw` against buffer `index`.
    fn with_surface(
        &mut self,
        index: usize,
        draw: &mut dyn FnMut(&mut Surface<'_>),
    ) -> anyhow::Result<()>;

    /// Puts buffer `index` on screen.
    fn submit(&mut self, index: usize) -> anyhow::Result<()>;
}
