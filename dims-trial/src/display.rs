use dims_core::StimulusFrame;

/// Drawing surface a trial presents on.
///
/// The controller owns the display for the trial's lifetime and drops it on
/// resolution; implementations restore whatever window state they changed
/// in their `Drop`.
pub trait Display {
    /// Drawable area in pixels, before chrome insets.
    fn viewport(&self) -> (u32, u32);

    fn draw(&mut self, frame: &StimulusFrame) -> anyhow::Result<()>;
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn viewport(&self) -> (u32, u32) {
        (**self).viewport()
    }

    fn draw(&mut self, frame: &StimulusFrame) -> anyhow::Result<()> {
        (**self).draw(frame)
    }
}
