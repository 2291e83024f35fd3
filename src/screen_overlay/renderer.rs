use std::{sync::Arc, thread, time::Duration};

use anyhow::{Context, ensure};
use tracing::{debug, trace};

use super::{Screen, Surface, compositor::composite, shape::Shape};
use crate::{
    context::{TouchContext, Wake},
    event_model::slot::MAX_TOUCH,
};

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Draws one disc per active slot into the hidden buffer, then flips.
pub struct Renderer<S: Screen> {
    ctx: Arc<TouchContext>,
    screen: S,
    shapes: Vec<Shape>,
    active: usize,
    frame_interval: Duration,
    frames: u64,
}

impl<S: Screen> Renderer<S> {
    /// `screen` must already show buffer 0.
    pub fn new(
        ctx: Arc<TouchContext>,
        screen: S,
        shapes: Vec<Shape>,
        frame_interval: Duration,
    ) -> anyhow::Result<Self> {
        ensure!(
            shapes.len() == MAX_TOUCH,
            "expected {MAX_TOUCH} discs, got {}",
            shapes.len()
        );
        Ok(Self {
            ctx,
            screen,
            shapes,
            active: 0,
            frame_interval,
            frames: 0,
        })
    }

    /// Index of the buffer currently on screen.
    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Composes and submits one frame from the current slot table.
    pub fn render_frame(&mut self) -> anyhow::Result<()> {
        let back = 1 - self.active;
        let (width, height) = self.screen.geometry();
        let slots = self.ctx.slots.snapshot();
        let shapes = &self.shapes;

        self.screen.with_surface(back, &mut |surface: &mut Surface<'_>| {
            surface.clear();
            for (slot, shape) in slots.iter().zip(shapes) {
                if slot.is_drawable(width, height) {
                    composite(surface, shape, slot.pos_x, slot.pos_y);
                }
            }
        })?;
        self.screen
            .submit(back)
            .with_context(|| format!("submit buffer {back}"))?;

        self.active = back;
        self.frames += 1;
        trace!(frame = self.frames, buffer = back, "frame submitted");
        Ok(())
    }

    /// Renders a frame per wake-up until stop is requested.
    pub fn run(&mut self) -> anyhow::Result<()> {
        while self.ctx.wait_for_frame() == Wake::Frame {
            self.render_frame()?;
            thread::sleep(self.frame_interval);
        }
        debug!(frames = self.frames, "render loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen_overlay::{
        backend_memory::MemoryScreen,
        shape::{DEFAULT_COLORS, create_discs},
    };

    fn renderer(ctx: &Arc<TouchContext>) -> Renderer<MemoryScreen> {
        let shapes = create_discs(10, &DEFAULT_COLORS).unwrap();
        Renderer::new(
            ctx.clone(),
            MemoryScreen::new(64, 48),
            shapes,
            Duration::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn frames_alternate_buffers() {
        let ctx = Arc::new(TouchContext::new());
        let mut r = renderer(&ctx);
        assert_eq!(r.active_index(), 0);
        r.render_frame().unwrap();
        assert_eq!(r.active_index(), 1);
        r.render_frame().unwrap();
        assert_eq!(r.active_index(), 0);

        let frames = r.screen().frames();
        assert_eq!(frames.iter().map(|f| f.index).collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn rerendering_same_state_is_idempotent() {
        let ctx = Arc::new(TouchContext::new());
        {
            let mut slots = ctx.slots.lock();
            slots[0].tracking_id = 1;
            slots[0].pos_x = 10;
            slots[0].pos_y = 12;
            slots[3].tracking_id = 2;
            slots[3].pos_x = 14;
            slots[3].pos_y = 12;
        }
        let mut r = renderer(&ctx);
        for _ in 0..4 {
            r.render_frame().unwrap();
        }
        let frames = r.screen().frames();
        assert!(frames[0].lit_pixels() > 0);
        assert!(frames.windows(2).all(|w| w[0].pixels == w[1].pixels));
    }

    #[test]
    fn inactive_and_out_of_bounds_slots_are_skipped() {
        let ctx = Arc::new(TouchContext::new());
        {
            let mut slots = ctx.slots.lock();
            // no tracking id
            slots[0].pos_x = 10;
            slots[0].pos_y = 10;
            // off the right edge
            slots[1].tracking_id = 5;
            slots[1].pos_x = 64;
            slots[1].pos_y = 10;
        }
        let mut r = renderer(&ctx);
        r.render_frame().unwrap();
        assert_eq!(r.screen().frames()[0].lit_pixels(), 0);
    }

    #[test]
    fn submit_failure_keeps_active_buffer() {
        let ctx = Arc::new(TouchContext::new());
        let shapes = create_discs(10, &DEFAULT_COLORS).unwrap();
        let mut r = Renderer::new(
            ctx,
            MemoryScreen::new(16, 16).fail_after(1),
            shapes,
            Duration::ZERO,
        )
        .unwrap();
        r.render_frame().unwrap();
        assert!(r.render_frame().is_err());
        assert_eq!(r.active_index(), 1);
        assert_eq!(r.frames_rendered(), 1);
    }

    #[test]
    fn wrong_disc_count_is_rejected() {
        let ctx = Arc::new(TouchContext::new());
        let shapes = create_discs(10, &DEFAULT_COLORS).unwrap()[..2].to_vec();
        assert!(Renderer::new(ctx, MemoryScreen::new(8, 8), shapes, Duration::ZERO).is_err());
    }

    #[test]
    fn run_exits_on_stop_without_a_frame() {
        let ctx = Arc::new(TouchContext::new());
        let mut r = renderer(&ctx);
        ctx.signal.notify();
        ctx.request_stop();
        r.run().unwrap();
        assert_eq!(r.frames_rendered(), 0);
    }
}
