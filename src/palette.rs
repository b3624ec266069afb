use anyhow::{anyhow, ensure, Result};

/// A class color as a tuple of channel values, parsed from a hex string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color {
    channels: Vec<u8>,
}

impl Color {
    /// Parses a color encoded as a hex string into a tuple of bytes.
    pub fn parse(hex: &str) -> Result<Self> {
        ensure!(
            !hex.is_empty() && hex.len() % 2 == 0,
            "Invalid hex color '{}': expected an even number of hex digits",
            hex
        );

        let channels = (0..hex.len() / 2)
            .map(|i| {
                u8::from_str_radix(&hex[2 * i..2 * (i + 1)], 16)
                    .map_err(|e| anyhow!("Invalid hex color '{}': {}", hex, e))
            })
            .collect::<Result<Vec<u8>>>()?;

        Ok(Color { channels })
    }

    pub fn channels(&self) -> &[u8] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// The ordered set of class-defining colors. Order fixes the output channel
/// index of each class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Parses an ordered list of hex-encoded colors. All colors must live in
    /// the same color space, i.e. have the same number of channels.
    pub fn parse<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        ensure!(!colors.is_empty(), "At least one class color is required");

        let colors = colors
            .iter()
            .map(|c| Color::parse(c.as_ref()))
            .collect::<Result<Vec<Color>>>()?;

        let color_len = colors[0].len();
        ensure!(
            colors.iter().all(|c| c.len() == color_len),
            "All class colors must have the same number of channels"
        );

        Ok(Palette { colors })
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of channels of every color in the palette.
    pub fn color_len(&self) -> usize {
        self.colors[0].len()
    }
}
