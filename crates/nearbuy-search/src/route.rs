//! Exact shortest-path ordering for small stop sets.
//!
//! The origin and destination are fixed; every ordering of the intermediate
//! stops is considered, so the cost is `O(n!)` in the number of stops.
//! Branches whose partial length already reaches the best complete route
//! are cut, which keeps the search exact.

use nearbuy_core::{RouteResult, Stop};
use nearbuy_geo::haversine_km;

const MINUTES_PER_HOUR: f64 = 60.0;

/// Pairwise great-circle distances. Index 0 is the origin, the last index is
/// the destination, everything between is an intermediate stop.
struct DistanceMatrix {
    size: usize,
    km: Vec<f64>,
}

impl DistanceMatrix {
    fn new(points: &[&Stop]) -> Self {
        let size = points.len();
        let mut km = vec![0.0; size * size];
        for (i, from) in points.iter().enumerate() {
            for (j, to) in points.iter().enumerate() {
                if i != j {
                    km[i * size + j] = haversine_km(from.location, to.location);
                }
            }
        }
        Self { size, km }
    }

    fn get(&self, from: usize, to: usize) -> f64 {
        self.km[from * self.size + to]
    }

    fn destination(&self) -> usize {
        self.size - 1
    }

    /// Length of origin → `order`... → destination.
    fn path_cost(&self, order: &[usize]) -> f64 {
        let mut cost = 0.0;
        let mut at = 0;
        for &next in order {
            cost += self.get(at, next);
            at = next;
        }
        cost + self.get(at, self.destination())
    }
}

struct Best {
    order: Vec<usize>,
    cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteOptimizer {
    average_speed_kmh: f64,
}

impl RouteOptimizer {
    /// `average_speed_kmh` converts route length into delivery minutes and
    /// must be positive.
    #[must_use]
    pub fn new(average_speed_kmh: f64) -> Self {
        Self { average_speed_kmh }
    }

    #[must_use]
    pub fn average_speed_kmh(&self) -> f64 {
        self.average_speed_kmh
    }

    /// Minutes needed to cover `distance_km` at the configured average speed.
    #[must_use]
    pub fn minutes_for(&self, distance_km: f64) -> f64 {
        distance_km / self.average_speed_kmh * MINUTES_PER_HOUR
    }

    /// Orders `stops` to minimize the total distance from `origin` to
    /// `destination`. Among equally short orderings the first one found wins.
    #[must_use]
    pub fn solve(&self, origin: &Stop, destination: &Stop, stops: &[Stop]) -> RouteResult {
        let points: Vec<&Stop> = std::iter::once(origin)
            .chain(stops)
            .chain(std::iter::once(destination))
            .collect();
        let matrix = DistanceMatrix::new(&points);

        let mut order: Vec<usize> = (1..=stops.len()).collect();
        let mut best = Best {
            cost: matrix.path_cost(&order),
            order: order.clone(),
        };
        permute(&matrix, &mut order, 0, 0, 0.0, &mut best);

        let ordered_labels = std::iter::once(origin.label.clone())
            .chain(best.order.iter().map(|&idx| points[idx].label.clone()))
            .chain(std::iter::once(destination.label.clone()))
            .collect();

        RouteResult {
            ordered_labels,
            total_distance_km: best.cost,
            estimated_minutes: self.minutes_for(best.cost),
        }
    }
}

/// Fixes `order[depth]` to each remaining stop in turn and recurses.
/// `at` is the point reached after `order[..depth]`, `cost` its length.
fn permute(
    matrix: &DistanceMatrix,
    order: &mut [usize],
    depth: usize,
    at: usize,
    cost: f64,
    best: &mut Best,
) {
    if cost >= best.cost {
        return;
    }

    if depth == order.len() {
        let total = cost + matrix.get(at, matrix.destination());
        if total < best.cost {
            best.cost = total;
            best.order.copy_from_slice(order);
        }
        return;
    }

    for candidate in depth..order.len() {
        order.swap(depth, candidate);
        let next = order[depth];
        permute(
            matrix,
            order,
            depth + 1,
            next,
            cost + matrix.get(at, next),
            best,
        );
        order.swap(depth, candidate);
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
