use std::fmt::Write as _;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{BoardError, Color};

/// Seed for deterministic color generation.
///
/// A 128-bit (16-byte) seed for the random number generator that picks the
/// colors of spawned and randomly initialized tiles. The same seed and the
/// same sequence of taps reproduce the same game, which enables:
///
/// - Session recording and replay
/// - Deterministic testing
///
/// Serialized as a 32-character hex string.
///
/// # Example
///
/// ```
/// use match2_engine::{BoardSeed, ColorSource};
/// use rand::Rng as _;
///
/// let seed: BoardSeed = rand::rng().random();
///
/// let mut first = ColorSource::with_seed(seed, 5, 8);
/// let mut second = ColorSource::with_seed(seed, 5, 8);
/// assert_eq!(first.random_color(), second.random_color());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSeed([u8; 16]);

impl BoardSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl Serialize for BoardSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for BoardSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for BoardSeed {
    type Err = String;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// Allows generating random `BoardSeed` values with `rng.random()`.
impl Distribution<BoardSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BoardSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        BoardSeed(seed)
    }
}

/// Supplies the colors of newly created simple tiles.
///
/// Each column owns a queue of preset colors. When a tile spawns at the top
/// of a column the queue is consumed back to front (the last queued color
/// spawns first); once it is empty colors are drawn uniformly from
/// `1..=count_colors`.
#[derive(Debug, Clone)]
pub struct ColorSource {
    rng: Pcg32,
    count_colors: u8,
    drop_queues: Vec<Vec<Color>>,
}

impl ColorSource {
    /// Creates a color source with a random seed.
    #[must_use]
    pub fn new(count_colors: u8, width: usize) -> Self {
        Self::with_seed(rand::rng().random(), count_colors, width)
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: BoardSeed, count_colors: u8, width: usize) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            count_colors: count_colors.max(1),
            drop_queues: vec![Vec::new(); width],
        }
    }

    #[must_use]
    pub fn count_colors(&self) -> u8 {
        self.count_colors
    }

    /// Draws a uniformly random color.
    pub fn random_color(&mut self) -> Color {
        let value = self.rng.random_range(1..=self.count_colors);
        Color::new(value).expect("random color should never be zero")
    }

    /// Color for the next tile spawned at the top of `column`.
    pub fn next_drop_color(&mut self, column: usize) -> Color {
        match self.drop_queues.get_mut(column).and_then(Vec::pop) {
            Some(color) => color,
            None => self.random_color(),
        }
    }

    /// Preset colors still queued for `column`, in queue order.
    ///
    /// The last element spawns first.
    #[must_use]
    pub fn drop_queue(&self, column: usize) -> &[Color] {
        self.drop_queues.get(column).map_or(&[], Vec::as_slice)
    }

    /// Replaces the preset queue of `column`.
    pub fn set_drop_queue(&mut self, column: usize, colors: Vec<Color>) -> Result<(), BoardError> {
        let width = self.drop_queues.len();
        let Some(queue) = self.drop_queues.get_mut(column) else {
            return Err(BoardError::ColumnOutOfRange { column, width });
        };
        if let Some(color) = colors.iter().find(|c| c.get() > self.count_colors) {
            return Err(BoardError::ColorOutOfRange {
                color: color.get(),
                count_colors: self.count_colors,
            });
        }
        *queue = colors;
        Ok(())
    }

    pub fn clear_drop_queues(&mut self) {
        self.drop_queues.iter_mut().for_each(Vec::clear);
    }
}
