//! Chain color assignment shared by every chart of a page

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::OTHER_BUCKET;

/// Palette for the first chains, in page order
const PALETTE: [&str; 12] = [
    "#627EEA", // Blue
    "#F3BA2F", // Yellow
    "#E84142", // Red
    "#8247E5", // Purple
    "#1969FF", // Azure
    "#00D395", // Green
    "#FF9800", // Orange
    "#00BCD4", // Cyan
    "#E91E63", // Pink
    "#795548", // Brown
    "#4CAF50", // Lime green
    "#3F51B5", // Indigo
];

/// Fixed color of the `"Other"` bucket
pub const OTHER_COLOR: &str = "#9E9E9E";

/// Chain name -> hex color, assigned once per page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChainColors {
    colors: BTreeMap<String, String>,
}

impl ChainColors {
    /// Assign colors to `chains` in order, plus the `"Other"` bucket.
    ///
    /// Chains past the palette get a color derived from their name, so a
    /// chain keeps its color as long as its position does not change.
    pub fn assign(chains: &[String]) -> Self {
        let mut colors = BTreeMap::new();
        for (idx, chain) in chains.iter().enumerate() {
            let color = match PALETTE.get(idx) {
                Some(c) => c.to_string(),
                None => hashed_color(chain),
            };
            colors.entry(chain.clone()).or_insert(color);
        }
        colors.insert(OTHER_BUCKET.to_string(), OTHER_COLOR.to_string());
        Self { colors }
    }

    /// Color of a chain, falling back to the `"Other"` color
    pub fn get(&self, chain: &str) -> &str {
        self.colors
            .get(chain)
            .map(String::as_str)
            .unwrap_or(OTHER_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Deterministic color from a name (FNV-1a hash -> HSL hue)
fn hashed_color(name: &str) -> String {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    let hue = (hash % 360) as f64;
    let (r, g, b) = hsl_to_rgb(hue, 0.65, 0.55);
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Chain{}", i)).collect()
    }

    #[test]
    fn test_palette_then_hashed() {
        let chains = names(20);
        let colors = ChainColors::assign(&chains);

        assert_eq!(colors.len(), 21);
        assert_eq!(colors.get("Chain0"), PALETTE[0]);
        assert_eq!(colors.get("Chain19"), hashed_color("Chain19"));
        assert!(colors.get("Chain19").starts_with('#'));
        assert_eq!(colors.get("Chain19").len(), 7);
    }

    #[test]
    fn test_other_is_fixed() {
        let colors = ChainColors::assign(&names(3));
        assert_eq!(colors.get(OTHER_BUCKET), OTHER_COLOR);
        assert_eq!(colors.get("Unknown"), OTHER_COLOR);
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let chains = names(15);
        assert_eq!(ChainColors::assign(&chains), ChainColors::assign(&chains));
    }
}
