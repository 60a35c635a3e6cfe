//! Rendering module
//!
//! Scene composition produces a backend-neutral `Frame`; a host surface
//! (Canvas2D on the web) replays it.

pub mod frame;
pub mod scene;
pub mod shapes;
pub mod theme;

pub use frame::{Color, DrawCommand, Fill, Frame, TextAlign};
pub use scene::{SceneInputs, compose};
pub use theme::{Theme, ThemeKind, theme_for_round};

use crate::error::RenderError;

/// Host drawing surface
pub trait DrawSurface {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError>;
}

/// Surface that keeps the most recent frame
#[derive(Debug, Default)]
pub struct FrameCapture {
    pub last: Option<Frame>,
    pub presented: usize,
}

impl DrawSurface for FrameCapture {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.last = Some(frame.clone());
        self.presented += 1;
        Ok(())
    }
}

impl<T: DrawSurface> DrawSurface for std::rc::Rc<std::cell::RefCell<T>> {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.try_borrow_mut()
            .map_err(|_| RenderError::Backend("surface already borrowed".into()))?
            .present(frame)
    }
}
