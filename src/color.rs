/// A red-green-blue color, 16 bits per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// The red channel.
    pub red: u16,
    /// The green channel.
    pub green: u16,
    /// The blue channel.
    pub blue: u16,
}

impl Color {
    /// Creates a new color.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Color;
    /// let color = Color::new(1, 2, 3);
    /// ```
    pub fn new(red: u16, green: u16, blue: u16) -> Color {
        Color { red, green, blue }
    }
}
