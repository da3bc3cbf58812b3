use crate::color::Rgb;
use crate::error::Result;

/// Where finished frames go. Nothing is guaranteed to be visible before
/// `commit` returns.
pub trait PixelSink {
    fn pixel_count(&self) -> usize;

    /// Stages new colors for the given pixels, leaving all others as they are.
    fn render(&mut self, pixels: &[(usize, Rgb)]);

    fn set_master_brightness(&mut self, brightness: u8);

    fn commit(&mut self) -> Result<()>;

    fn fill(&mut self, color: Rgb) {
        let pixels: Vec<_> = (0..self.pixel_count()).map(|i| (i, color)).collect();
        self.render(&pixels);
    }
}
