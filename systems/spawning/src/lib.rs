#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn placement system that scatters start and end markers around the grid.
//!
//! Markers are drawn at random from the perimeter slots while keeping every
//! pair at least a minimum circular distance apart. When the retry budget runs
//! out the placer degrades gracefully so the level always receives its full
//! marker count. The random source is supplied by the caller, which keeps
//! placement reproducible under a fixed seed.

use city_limits_core::{GridGeometry, Level, MarkerRole, PlacementStrategy, SpawnMarker};
use city_limits_system_perimeter::{circular_distance, pixel_of, PerimeterLayout};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, warn};

const DEFAULT_RETRY_BUDGET: u32 = 5_000;
const MIN_SPACING_FLOOR: u32 = 2;

/// Configuration parameters required to construct the spawn placer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    retry_budget: u32,
}

impl Config {
    /// Creates a new configuration allowing `retry_budget` random draws per placement.
    #[must_use]
    pub const fn new(retry_budget: u32) -> Self {
        Self { retry_budget }
    }

    /// Number of random draws attempted before falling back.
    #[must_use]
    pub const fn retry_budget(&self) -> u32 {
        self.retry_budget
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_BUDGET)
    }
}

/// Markers produced for a single level load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Placed markers, with the level's start markers listed first.
    pub markers: Vec<SpawnMarker>,
    /// Strategy that produced the layout.
    pub strategy: PlacementStrategy,
    /// Minimum circular distance the placer aimed for.
    pub min_distance: u32,
}

/// Pure system that selects well-spaced perimeter slots for a level's markers.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpawnPlacer {
    config: Config,
}

impl SpawnPlacer {
    /// Creates a new placer using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Places the level's start and end markers around the provided grid.
    ///
    /// Always returns exactly `level.marker_count()` markers on distinct slots.
    pub fn place<R>(&self, level: Level, geometry: &GridGeometry, rng: &mut R) -> Placement
    where
        R: Rng + ?Sized,
    {
        let layout = PerimeterLayout::for_geometry(geometry);
        let slots: Vec<_> = layout.slots().collect();
        let total = layout.len();
        let need = level.marker_count();
        let min_distance = minimum_spacing(total, need);

        let (mut chosen, strategy) = match self.sample(total, need, min_distance, rng) {
            Ok(chosen) => (chosen, PlacementStrategy::Sampled),
            Err(_) if spacing_feasible(total, need, min_distance) => {
                debug!(
                    total,
                    need, min_distance, "retry budget exhausted, using lattice placement"
                );
                (lattice(total, need, rng), PlacementStrategy::Lattice)
            }
            Err(partial) => {
                warn!(
                    total,
                    need, min_distance, "marker spacing infeasible, filling unspaced slots"
                );
                (
                    fill_unspaced(partial, total, need, rng),
                    PlacementStrategy::Unspaced,
                )
            }
        };

        chosen.shuffle(rng);

        let markers = chosen
            .into_iter()
            .enumerate()
            .map(|(position, index)| {
                let slot = slots[index as usize];
                let role = if position < level.starts() {
                    MarkerRole::Start
                } else {
                    MarkerRole::End
                };
                SpawnMarker {
                    role,
                    slot,
                    index,
                    pixel: pixel_of(slot, geometry),
                }
            })
            .collect();

        Placement {
            markers,
            strategy,
            min_distance,
        }
    }

    fn sample<R>(
        &self,
        total: u32,
        need: usize,
        min_distance: u32,
        rng: &mut R,
    ) -> Result<Vec<u32>, Vec<u32>>
    where
        R: Rng + ?Sized,
    {
        let mut chosen = Vec::with_capacity(need);
        for _ in 0..self.config.retry_budget {
            if chosen.len() == need {
                break;
            }

            let candidate = rng.gen_range(0..total);
            if chosen
                .iter()
                .all(|&existing| circular_distance(existing, candidate, total) >= min_distance)
            {
                chosen.push(candidate);
            }
        }

        if chosen.len() == need {
            Ok(chosen)
        } else {
            Err(chosen)
        }
    }
}

/// Minimum circular distance requested between any two markers.
#[must_use]
pub fn minimum_spacing(total: u32, need: usize) -> u32 {
    let need = u32::try_from(need).unwrap_or(u32::MAX).max(1);
    (total / need).max(MIN_SPACING_FLOOR)
}

fn spacing_feasible(total: u32, need: usize, min_distance: u32) -> bool {
    u64::from(min_distance) * need as u64 <= u64::from(total)
}

fn lattice<R>(total: u32, need: usize, rng: &mut R) -> Vec<u32>
where
    R: Rng + ?Sized,
{
    let offset = rng.gen_range(0..total);
    let need = need as u64;
    let total_wide = u64::from(total);
    (0..need)
        .map(|step| ((u64::from(offset) + step * total_wide / need) % total_wide) as u32)
        .collect()
}

fn fill_unspaced<R>(mut chosen: Vec<u32>, total: u32, need: usize, rng: &mut R) -> Vec<u32>
where
    R: Rng + ?Sized,
{
    let mut unused: Vec<u32> = (0..total).filter(|index| !chosen.contains(index)).collect();
    unused.shuffle(rng);
    let missing = need.saturating_sub(chosen.len());
    chosen.extend(unused.into_iter().take(missing));
    chosen
}
