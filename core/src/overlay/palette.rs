use super::Rgba;

/// Border and fill color for one detection class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassColors {
    pub border: Rgba,
    pub fill: Rgba,
}

impl ClassColors {
    /// Opaque border, half-transparent fill of the same hue.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            border: Rgba::rgb(r, g, b),
            fill: Rgba::new(r, g, b, 0.5),
        }
    }
}

const CLASS_COLORS: [ClassColors; 7] = [
    ClassColors::from_rgb(249, 146, 82),
    ClassColors::from_rgb(96, 153, 99),
    ClassColors::from_rgb(137, 157, 179),
    ClassColors::from_rgb(157, 98, 120),
    ClassColors::from_rgb(57, 88, 106),
    ClassColors::from_rgb(216, 96, 104),
    ClassColors::from_rgb(183, 134, 107),
];

const FALLBACK: ClassColors = ClassColors::from_rgb(160, 160, 160);

/// Lookup table from `class_id` to colors, with a fallback for unknown ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<ClassColors>,
    fallback: ClassColors,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: CLASS_COLORS.to_vec(),
            fallback: FALLBACK,
        }
    }
}

impl Palette {
    pub fn new(entries: Vec<ClassColors>, fallback: ClassColors) -> Self {
        Self { entries, fallback }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fallback(&self) -> ClassColors {
        self.fallback
    }

    /// Colors for `class_id`; negative or out-of-range ids get the fallback.
    pub fn colors(&self, class_id: i32) -> ClassColors {
        usize::try_from(class_id)
            .ok()
            .and_then(|idx| self.entries.get(idx))
            .copied()
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_palette_has_seven_entries() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 7);
        assert_eq!(palette.colors(0).border, Rgba::rgb(249, 146, 82));
        assert_eq!(palette.colors(0).fill, Rgba::new(249, 146, 82, 0.5));
        assert_eq!(palette.colors(6).border, Rgba::rgb(183, 134, 107));
    }

    #[test]
    fn unknown_ids_use_fallback() {
        let palette = Palette::default();
        assert_eq!(palette.colors(7), palette.fallback());
        assert_eq!(palette.colors(-1), palette.fallback());
        assert_eq!(palette.colors(i32::MAX), palette.fallback());
    }
}
