//! Demand partitioning: split urgent customers into one group per vehicle.
//!
//! # Contract
//!
//! A [`Partition`] maps `n` points and a group count `k` to a label in
//! `0..k` per point.  Every point gets exactly one label, the result always
//! reports `k` groups (some may be empty when `k > n`), and the same input
//! with the same seed always produces the same labels.
//!
//! Two strategies ship with the crate:
//!
//! | Strategy               | Notes                                                  |
//! |------------------------|--------------------------------------------------------|
//! | [`KMeansPartitioner`]  | Lloyd's algorithm with k-means++ seeding (reference)   |
//! | [`SweepPartitioner`]   | Polar-angle slices around the centroid; ignores seed   |

use fl_core::{FleetRng, PartitionStrategy, Point};

use crate::{DispatchError, DispatchResult};

// ── Assignment ────────────────────────────────────────────────────────────────

/// Group label per input point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    labels:      Vec<usize>,
    group_count: usize,
}

impl Assignment {
    pub fn new(labels: Vec<usize>, group_count: usize) -> Self {
        debug_assert!(labels.iter().all(|&l| l < group_count));
        Self { labels, group_count }
    }

    /// Label of each point, in input order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Split `items` (parallel to the partitioned points) into groups.
    /// Items keep their input order inside each group.
    pub fn groups<T: Copy>(&self, items: &[T]) -> Vec<Vec<T>> {
        let mut groups = vec![Vec::new(); self.group_count];
        for (&label, &item) in self.labels.iter().zip(items) {
            groups[label].push(item);
        }
        groups
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.group_count];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

// ── Partition trait ───────────────────────────────────────────────────────────

/// Pluggable demand partitioner.
pub trait Partition: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Label each of `points` with a group in `0..k`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::InvalidVehicleCount`] if `k == 0` and there is at
    /// least one point.
    fn partition(&self, points: &[Point], k: usize, seed: u64) -> DispatchResult<Assignment>;
}

/// The partitioner selected by a config strategy.
pub fn partitioner_for(strategy: PartitionStrategy) -> Box<dyn Partition> {
    match strategy {
        PartitionStrategy::KMeans => Box::new(KMeansPartitioner::default()),
        PartitionStrategy::Sweep  => Box::new(SweepPartitioner),
    }
}

/// Handles the cases every strategy treats the same way.  Returns `Some`
/// when no clustering is needed.
fn trivial(points: &[Point], k: usize) -> DispatchResult<Option<Assignment>> {
    if points.is_empty() {
        return Ok(Some(Assignment::new(Vec::new(), k)));
    }
    if k == 0 {
        return Err(DispatchError::InvalidVehicleCount);
    }
    if k == 1 {
        return Ok(Some(Assignment::new(vec![0; points.len()], 1)));
    }
    Ok(None)
}

// ── K-means ───────────────────────────────────────────────────────────────────

/// Lloyd's k-means on Euclidean coordinates.
///
/// Seeding is k-means++ drawn from `FleetRng::new(seed)`.  A point equally
/// close to two centroids joins the lower-indexed one, and a cluster that
/// loses all its points keeps its previous centroid.  With `k >= n` every
/// point gets its own group.
#[derive(Copy, Clone, Debug)]
pub struct KMeansPartitioner {
    pub max_iterations: usize,
    /// Stop once no centroid moves further than this.
    pub tolerance:      f64,
}

impl Default for KMeansPartitioner {
    fn default() -> Self {
        Self { max_iterations: 300, tolerance: 1e-4 }
    }
}

impl Partition for KMeansPartitioner {
    fn name(&self) -> &'static str {
        "k-means"
    }

    fn partition(&self, points: &[Point], k: usize, seed: u64) -> DispatchResult<Assignment> {
        if let Some(a) = trivial(points, k)? {
            return Ok(a);
        }
        let n = points.len();
        if k >= n {
            return Ok(Assignment::new((0..n).collect(), k));
        }

        let mut rng = FleetRng::new(seed);
        let mut centroids = plus_plus_seeds(points, k, &mut rng);
        let mut labels = vec![0usize; n];

        let mut iterations = 0;
        while iterations < self.max_iterations {
            iterations += 1;
            assign_nearest(points, &centroids, &mut labels);
            let shift = update_centroids(points, &labels, &mut centroids);
            if shift <= self.tolerance {
                break;
            }
        }
        assign_nearest(points, &centroids, &mut labels);

        log::debug!("k-means: {n} points into {k} groups after {iterations} iterations");
        Ok(Assignment::new(labels, k))
    }
}

/// k-means++: the first centre is uniform, each further one is drawn with
/// probability proportional to its squared distance from the nearest centre
/// chosen so far.
fn plus_plus_seeds(points: &[Point], k: usize, rng: &mut FleetRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    let mut d2: Vec<f64> = points.iter().map(|p| p.distance_sq(centroids[0])).collect();
    while centroids.len() < k {
        // All-zero weights mean every point coincides with a centre already.
        let next = rng
            .weighted_index(&d2)
            .unwrap_or_else(|| rng.gen_range(0..points.len()));
        let c = points[next];
        centroids.push(c);
        for (d, p) in d2.iter_mut().zip(points) {
            *d = d.min(p.distance_sq(c));
        }
    }
    centroids
}

fn assign_nearest(points: &[Point], centroids: &[Point], labels: &mut [usize]) {
    for (label, p) in labels.iter_mut().zip(points) {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (i, c) in centroids.iter().enumerate() {
            let d = p.distance_sq(*c);
            if d < best_d {
                best = i;
                best_d = d;
            }
        }
        *label = best;
    }
}

/// Move each centroid to the mean of its points; returns the largest move.
fn update_centroids(points: &[Point], labels: &[usize], centroids: &mut [Point]) -> f64 {
    let k = centroids.len();
    let mut sums = vec![(0.0f64, 0.0f64, 0usize); k];
    for (p, &l) in points.iter().zip(labels) {
        let s = &mut sums[l];
        s.0 += p.x;
        s.1 += p.y;
        s.2 += 1;
    }

    let mut shift: f64 = 0.0;
    for (c, &(sx, sy, count)) in centroids.iter_mut().zip(&sums) {
        if count == 0 {
            continue;
        }
        let moved = Point::new(sx / count as f64, sy / count as f64);
        shift = shift.max(c.distance(moved));
        *c = moved;
    }
    shift
}

// ── Sweep ─────────────────────────────────────────────────────────────────────

/// Angular sweep: points are ordered by polar angle around their centroid
/// and cut into `k` contiguous slices whose sizes differ by at most one.
///
/// Equal angles fall back to input order.  The seed is unused.
#[derive(Copy, Clone, Debug, Default)]
pub struct SweepPartitioner;

impl Partition for SweepPartitioner {
    fn name(&self) -> &'static str {
        "sweep"
    }

    fn partition(&self, points: &[Point], k: usize, _seed: u64) -> DispatchResult<Assignment> {
        if let Some(a) = trivial(points, k)? {
            return Ok(a);
        }
        let n = points.len();
        let Some(centre) = Point::centroid(points) else {
            return Ok(Assignment::new(Vec::new(), k));
        };

        let mut order: Vec<(usize, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (p.y - centre.y).atan2(p.x - centre.x)))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        // The first `n % k` slices take one extra point.
        let (base, extra) = (n / k, n % k);
        let mut labels = vec![0usize; n];
        let mut pos = 0;
        for group in 0..k {
            let size = base + usize::from(group < extra);
            for &(i, _) in &order[pos..pos + size] {
                labels[i] = group;
            }
            pos += size;
        }
        Ok(Assignment::new(labels, k))
    }
}
