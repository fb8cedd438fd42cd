use super::color::{color_distance, Rgb};
use rand::Rng;
use std::collections::VecDeque;

pub const MIN_GRID_SIZE: usize = 3;
pub const MAX_GRID_SIZE: usize = 8;
const BASE_VARIANCE: i64 = 50;
const MIN_VARIANCE: i64 = 5;

/// Source of uniform integers for palette generation.
pub trait RandomSource
{
    /// Uniform integer in `low..=high`.
    fn next_in(&mut self, low: i32, high: i32) -> i32;
}

/// Adapts any `rand` generator.
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R>
{
    fn next_in(&mut self, low: i32, high: i32) -> i32
    {
        if high <= low {
            return low;
        }
        self.0.gen_range(low..=high)
    }
}

/// Replays a fixed sequence of values, clamping each into the requested
/// range. Falls back to `low` once the sequence runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource
{
    values: VecDeque<i32>,
}

impl ScriptedSource
{
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self
    {
        Self {
            values: values.into_iter().collect(),
        }
    }

    #[cfg(test)]
    pub fn remaining(&self) -> usize
    {
        self.values.len()
    }
}

impl RandomSource for ScriptedSource
{
    fn next_in(&mut self, low: i32, high: i32) -> i32
    {
        match self.values.pop_front() {
            Some(value) => value.clamp(low, high.max(low)),
            None => low,
        }
    }
}

/// Maximum per-channel offset for a level: `max(5, 50 - 2 * level)`.
pub fn variance_bound(level: u32) -> i32
{
    (BASE_VARIANCE - 2 * level as i64).max(MIN_VARIANCE) as i32
}

#[derive(Clone, Debug, PartialEq)]
pub struct Palette
{
    grid_size: usize,
    variance: i32,
    colors: Vec<Rgb>,
    target: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaletteStats
{
    pub max_pairwise_distance: f64,
    pub hue_range: f64,
}

impl Palette
{
    pub fn grid_size(&self) -> usize
    {
        self.grid_size
    }

    pub fn variance(&self) -> i32
    {
        self.variance
    }

    pub fn colors(&self) -> &[Rgb]
    {
        &self.colors
    }

    pub fn len(&self) -> usize
    {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rgb>
    {
        self.colors.get(index).copied()
    }

    pub fn target(&self) -> usize
    {
        self.target
    }

    pub fn target_color(&self) -> Rgb
    {
        self.colors[self.target]
    }

    pub fn stats(&self) -> PaletteStats
    {
        let mut max_pairwise_distance: f64 = 0.0;
        for (i, &a) in self.colors.iter().enumerate() {
            for &b in &self.colors[i + 1..] {
                max_pairwise_distance = max_pairwise_distance.max(color_distance(a, b));
            }
        }

        let mut min_hue = f64::INFINITY;
        let mut max_hue = f64::NEG_INFINITY;
        for color in &self.colors {
            let hue = color.hue();
            min_hue = min_hue.min(hue);
            max_hue = max_hue.max(hue);
        }
        let hue_range = if self.colors.is_empty() { 0.0 } else { max_hue - min_hue };

        PaletteStats {
            max_pairwise_distance,
            hue_range,
        }
    }
}

/// Generates `grid_size²` colors scattered around a random base color.
///
/// Draw order: base r, g, b, then per-cell r, g, b offsets, then the target
/// index. `grid_size` is clamped to the supported grid range.
pub fn generate_palette(level: u32, grid_size: usize, rng: &mut impl RandomSource) -> Palette
{
    let grid_size = grid_size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
    let variance = variance_bound(level);

    let base_r = rng.next_in(0, 255);
    let base_g = rng.next_in(0, 255);
    let base_b = rng.next_in(0, 255);

    let total_cells = grid_size * grid_size;
    let mut colors = Vec::with_capacity(total_cells);
    for _ in 0..total_cells {
        let r = base_r + rng.next_in(-variance, variance);
        let g = base_g + rng.next_in(-variance, variance);
        let b = base_b + rng.next_in(-variance, variance);
        colors.push(Rgb::clamped(r, g, b));
    }

    let target = rng.next_in(0, total_cells as i32 - 1) as usize;

    Palette {
        grid_size,
        variance,
        colors,
        target,
    }
}
