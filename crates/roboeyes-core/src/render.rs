//! Renderer contract consumed by the tweening engine.
//!
//! The engine emits each frame as filled rounded rectangles (eye bodies) and
//! filled triangles/rectangles in the background color (eyelid masks). Hosts
//! clear their backbuffer before calling `Eyes::update` and present after.

/// Monochrome display colors.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Color {
    Background,
    Foreground,
}

pub trait Renderer {
    fn fill_rounded_rect(&mut self, x: i32, y: i32, w: i32, h: i32, radius: i32, color: Color);

    #[allow(clippy::too_many_arguments)]
    fn fill_triangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, x2: i32, y2: i32, color: Color);
}

/// One emitted draw command, as recorded by [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawCommand {
    RoundedRect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        radius: i32,
        color: Color,
    },
    Triangle {
        points: [(i32, i32); 3],
        color: Color,
    },
}

/// Renderer that records every command; used by tests and headless demos.
#[derive(Default, Debug)]
pub struct RecordingRenderer {
    pub commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Eye bodies are the only foreground-colored rounded rects in a frame.
    pub fn foreground_rects(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::RoundedRect {
                        color: Color::Foreground,
                        ..
                    }
                )
            })
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn fill_rounded_rect(&mut self, x: i32, y: i32, w: i32, h: i32, radius: i32, color: Color) {
        self.commands.push(DrawCommand::RoundedRect {
            x,
            y,
            w,
            h,
            radius,
            color,
        });
    }

    fn fill_triangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        self.commands.push(DrawCommand::Triangle {
            points: [(x0, y0), (x1, y1), (x2, y2)],
            color,
        });
    }
}

/// Renderer that discards everything; handy for pure state-machine tests.
#[derive(Default, Debug)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn fill_rounded_rect(&mut self, _: i32, _: i32, _: i32, _: i32, _: i32, _: Color) {}
    fn fill_triangle(&mut self, _: i32, _: i32, _: i32, _: i32, _: i32, _: i32, _: Color) {}
}
