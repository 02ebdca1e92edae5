//! Initial-state patterns, evaluated in global frame coordinates.
//!
//! Every worker seeds its own tile (halo included) by asking the
//! [`Initializer`] about each cell's *global* position. Because the
//! answer depends only on `(x, y)` and the frame size, two workers that
//! both hold a copy of a boundary cell always agree on its initial value.
//!
//! The random pattern keeps that property: [`CellNoise`] derives each
//! cell's coin flip from a seeded ChaCha8 keystream addressed by the
//! cell's row (stream) and column (word position), so the draw for a cell
//! does not depend on which worker asks or in what order.

use std::fmt;
use std::str::FromStr;

use lifegrid_core::ConfigError;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Named seeding pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Top row plus the vertical midline (`T`).
    Cross,
    /// Top, middle and bottom rows plus the left column (`E`).
    BorderMidline,
    /// The outer boundary (`O`).
    Border,
    /// Independent fair coin flip per cell.
    Random,
}

impl Pattern {
    /// All patterns, in code order.
    pub const ALL: [Pattern; 4] = [
        Pattern::Cross,
        Pattern::BorderMidline,
        Pattern::Border,
        Pattern::Random,
    ];

    /// Numeric code (`0..=3`) used on the command line.
    pub fn code(self) -> u8 {
        match self {
            Self::Cross => 0,
            Self::BorderMidline => 1,
            Self::Border => 2,
            Self::Random => 3,
        }
    }

    /// Look a pattern up by numeric code.
    pub fn from_code(code: u8) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| ConfigError::UnknownPattern {
                input: code.to_string(),
            })
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cross => "cross",
            Self::BorderMidline => "border-midline",
            Self::Border => "border",
            Self::Random => "random",
        }
    }

    /// Value of a deterministic shape at global `(x, y)`.
    ///
    /// Returns `None` for [`Pattern::Random`], which needs a noise source.
    pub fn shape(self, x: usize, y: usize, frame_size: usize) -> Option<bool> {
        let last = frame_size.saturating_sub(1);
        let mid = frame_size / 2;
        match self {
            Self::Cross => Some(y == 0 || x == mid),
            Self::BorderMidline => Some(y == 0 || y == mid || y == last || x == 0),
            Self::Border => Some(x == 0 || y == 0 || x == last || y == last),
            Self::Random => None,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pattern {
    type Err = ConfigError;

    /// Accepts a canonical name, a single-letter shape alias
    /// (`t`, `e`, `o`), or a numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Ok(code) = lower.parse::<u8>() {
            return Self::from_code(code);
        }
        match lower.as_str() {
            "cross" | "t" => Ok(Self::Cross),
            "border-midline" | "e" => Ok(Self::BorderMidline),
            "border" | "o" => Ok(Self::Border),
            "random" => Ok(Self::Random),
            _ => Err(ConfigError::UnknownPattern { input: s.to_string() }),
        }
    }
}

/// Coordinate-addressed random source for the random pattern.
#[derive(Clone, Debug)]
pub struct CellNoise {
    seed: u64,
    rng: ChaCha8Rng,
}

impl CellNoise {
    /// Noise source for `seed`. Equal seeds give equal frames.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed this source was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Coin flip for global `(x, y)`.
    pub fn coin(&mut self, x: usize, y: usize) -> bool {
        self.seek(x, y);
        self.rng.next_u32() & 1 == 1
    }

    /// Fill `out` with the coin flips for cells `(x0.., y)`.
    pub fn fill_row(&mut self, x0: usize, y: usize, out: &mut [bool]) {
        self.seek(x0, y);
        for cell in out {
            *cell = self.rng.next_u32() & 1 == 1;
        }
    }

    fn seek(&mut self, x: usize, y: usize) {
        self.rng.set_stream(y as u64);
        self.rng.set_word_pos(x as u128);
    }
}

/// Seeds tiles from a [`Pattern`].
#[derive(Clone, Debug)]
pub struct Initializer {
    pattern: Pattern,
    noise: CellNoise,
}

impl Initializer {
    /// Initializer for `pattern`, drawing random cells from `noise`.
    pub fn new(pattern: Pattern, noise: CellNoise) -> Self {
        Self { pattern, noise }
    }

    /// Initializer for a deterministic shape. The noise source is unused
    /// for every pattern except [`Pattern::Random`].
    pub fn shape(pattern: Pattern) -> Self {
        Self::new(pattern, CellNoise::new(0))
    }

    /// The pattern being seeded.
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Whether global `(x, y)` starts alive in a frame of `frame_size`.
    pub fn is_alive(&mut self, x: usize, y: usize, frame_size: usize) -> bool {
        match self.pattern.shape(x, y, frame_size) {
            Some(alive) => alive,
            None => self.noise.coin(x, y),
        }
    }

    /// Fill one buffer row: `out[i]` is global `(x0 + i, y)`.
    pub fn fill_row(&mut self, x0: usize, y: usize, frame_size: usize, out: &mut [bool]) {
        if self.pattern == Pattern::Random {
            self.noise.fill_row(x0, y, out);
            return;
        }
        for (i, cell) in out.iter_mut().enumerate() {
            *cell = self.pattern.shape(x0 + i, y, frame_size).unwrap_or(false);
        }
    }
}
