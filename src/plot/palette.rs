use plotters::style::{full_palette, RGBColor};

/// Cycles through a fixed set of colours, one per entity.
///
/// An entity's scatter and regression line share the colour it is handed.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<RGBColor>,
    index: usize,
}
impl Palette {
    /// Returns the next colour, wrapping around at the end of the palette.
    pub fn next_color(&mut self) -> RGBColor {
        let color = self.colors[self.index];
        self.index = (self.index + 1) % self.colors.len();
        color
    }
}
impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                full_palette::BLUE,
                full_palette::ORANGE,
                full_palette::GREEN,
                full_palette::RED,
                full_palette::PURPLE,
                full_palette::BROWN,
                full_palette::PINK,
                full_palette::TEAL,
            ],
            index: 0,
        }
    }
}
