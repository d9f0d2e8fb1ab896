use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// The feed's single-letter symbol for this color.
    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    /// Parse a feed symbol (`"W"`, `"U"`, `"B"`, `"R"`, `"G"`).
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "W" | "w" => Some(Color::White),
            "U" | "u" => Some(Color::Blue),
            "B" | "b" => Some(Color::Black),
            "R" | "r" => Some(Color::Red),
            "G" | "g" => Some(Color::Green),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_symbol(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown color symbol {s:?}")))
    }
}

/// A set of colors represented as bitflags for efficient operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const COLORLESS: Self = Self(0);

    /// Creates a new empty ColorSet.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Creates a ColorSet from a single color.
    pub const fn from_color(color: Color) -> Self {
        Self(1 << color as u8)
    }

    /// Returns true if this set contains no colors.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this set contains the given color.
    pub const fn contains(self, color: Color) -> bool {
        self.0 & Self::from_color(color).0 != 0
    }

    /// Returns the union of two color sets.
    pub const fn union(self, other: ColorSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the number of colors in this set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Adds a color to this set, returning the new set.
    pub const fn with(self, color: Color) -> Self {
        self.union(Self::from_color(color))
    }

    /// Iterate the colors present in this set, in WUBRG order.
    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl From<Color> for ColorSet {
    fn from(color: Color) -> Self {
        Self::from_color(color)
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        iter.into_iter()
            .fold(ColorSet::COLORLESS, |set, color| set.with(color))
    }
}

impl fmt::Display for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "C");
        }
        for color in self.iter() {
            write!(f, "{}", color.symbol())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_roundtrip() {
        for color in Color::ALL {
            assert_eq!(Color::from_symbol(&color.symbol().to_string()), Some(color));
        }
        assert_eq!(Color::from_symbol("X"), None);
        assert_eq!(Color::from_symbol(""), None);
    }

    #[test]
    fn test_color_set_empty() {
        let set = ColorSet::new();
        assert!(set.is_empty());
        assert_eq!(set.count(), 0);
        assert_eq!(set.to_string(), "C");
    }

    #[test]
    fn test_color_set_union() {
        let izzet = ColorSet::from_color(Color::Blue).with(Color::Red);
        assert!(izzet.contains(Color::Blue));
        assert!(izzet.contains(Color::Red));
        assert!(!izzet.contains(Color::Green));
        assert_eq!(izzet.count(), 2);
    }

    #[test]
    fn test_color_set_from_iter() {
        let set: ColorSet = [Color::White, Color::Black, Color::White]
            .into_iter()
            .collect();
        assert_eq!(set.count(), 2);
        assert!(set.contains(Color::White));
        assert!(set.contains(Color::Black));
    }

    #[test]
    fn test_color_set_iter_order() {
        let set: ColorSet = [Color::Green, Color::White].into_iter().collect();
        let colors: Vec<Color> = set.iter().collect();
        assert_eq!(colors, vec![Color::White, Color::Green]);
        assert_eq!(set.to_string(), "WG");
    }

    #[test]
    fn test_color_deserialize() {
        let colors: Vec<Color> = serde_json::from_str(r#"["R","G"]"#).unwrap();
        assert_eq!(colors, vec![Color::Red, Color::Green]);
        assert!(serde_json::from_str::<Vec<Color>>(r#"["Q"]"#).is_err());
    }
}
