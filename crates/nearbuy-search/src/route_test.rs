use nearbuy_geo::Coordinate;

use super::*;

fn stop(label: &str, lat: f64, long: f64) -> Stop {
    Stop::new(label, Coordinate::new(lat, long))
}

fn optimizer() -> RouteOptimizer {
    RouteOptimizer::new(40.0)
}

/// Every permutation of `items`, built independently of the optimizer.
fn all_orderings(items: &[Stop]) -> Vec<Vec<Stop>> {
    if items.is_empty() {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for (i, head) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in all_orderings(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}

fn route_length(origin: &Stop, destination: &Stop, stops: &[Stop]) -> f64 {
    let mut total = 0.0;
    let mut at = origin.location;
    for s in stops {
        total += haversine_km(at, s.location);
        at = s.location;
    }
    total + haversine_km(at, destination.location)
}

#[test]
fn zero_stops_is_the_direct_distance() {
    let origin = stop("origin", -6.2088, 106.8456);
    let destination = stop("destination", -6.1754, 106.8272);

    let result = optimizer().solve(&origin, &destination, &[]);

    assert_eq!(result.ordered_labels, vec!["origin", "destination"]);
    assert_eq!(
        result.total_distance_km,
        haversine_km(origin.location, destination.location)
    );
}

#[test]
fn single_stop_is_the_trivial_path() {
    let origin = stop("origin", 0.0, 0.0);
    let a = stop("A", 0.0, 1.0);
    let destination = stop("destination", 0.0, 2.0);

    let result = optimizer().solve(&origin, &destination, std::slice::from_ref(&a));

    assert_eq!(result.ordered_labels, vec!["origin", "A", "destination"]);
    let expected = route_length(&origin, &destination, &[a]);
    assert!((result.total_distance_km - expected).abs() < 1e-9);
}

#[test]
fn four_stops_beat_or_match_every_permutation() {
    let origin = stop("Start", 22.1234, 12.5678);
    let destination = stop("User", 22.1234, -11.5678);
    let stops = vec![
        stop("Merchant A", 40.7128, -74.0060),
        stop("Merchant B", 37.1234, -122.6543),
        stop("Merchant C", -12.8756, 45.1234),
        stop("Merchant D", 51.5076, -0.1227),
    ];

    let result = optimizer().solve(&origin, &destination, &stops);

    let orderings = all_orderings(&stops);
    assert_eq!(orderings.len(), 24);
    for ordering in &orderings {
        let cost = route_length(&origin, &destination, ordering);
        assert!(
            result.total_distance_km <= cost + 1e-9,
            "optimizer returned {} but {:?} costs {cost}",
            result.total_distance_km,
            ordering.iter().map(|s| s.label.as_str()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn reported_cost_matches_reported_order() {
    let origin = stop("origin", -6.20, 106.80);
    let destination = stop("destination", -6.25, 106.90);
    let stops = vec![
        stop("A", -6.21, 106.85),
        stop("B", -6.19, 106.82),
        stop("C", -6.24, 106.88),
        stop("D", -6.22, 106.81),
        stop("E", -6.23, 106.86),
    ];

    let result = optimizer().solve(&origin, &destination, &stops);

    let visited: Vec<Stop> = result.ordered_labels[1..result.ordered_labels.len() - 1]
        .iter()
        .map(|label| stops.iter().find(|s| &s.label == label).unwrap().clone())
        .collect();
    let recomputed = route_length(&origin, &destination, &visited);
    assert!((result.total_distance_km - recomputed).abs() < 1e-9);
}

#[test]
fn path_keeps_origin_first_and_destination_last() {
    let origin = stop("origin", 0.0, 0.0);
    let destination = stop("destination", 0.0, 0.5);
    let stops = vec![
        stop("A", 0.1, 0.1),
        stop("B", 0.2, 0.2),
        stop("C", 0.3, 0.3),
    ];

    let result = optimizer().solve(&origin, &destination, &stops);

    assert_eq!(result.ordered_labels.len(), stops.len() + 2);
    assert_eq!(result.ordered_labels.first().map(String::as_str), Some("origin"));
    assert_eq!(
        result.ordered_labels.last().map(String::as_str),
        Some("destination")
    );
}

#[test]
fn collinear_stops_are_visited_in_order() {
    let origin = stop("origin", 0.0, 0.0);
    let destination = stop("destination", 0.0, 0.05);
    let stops = vec![
        stop("third", 0.0, 0.03),
        stop("first", 0.0, 0.01),
        stop("fourth", 0.0, 0.04),
        stop("second", 0.0, 0.02),
    ];

    let result = optimizer().solve(&origin, &destination, &stops);

    assert_eq!(
        result.ordered_labels,
        vec!["origin", "first", "second", "third", "fourth", "destination"]
    );
    let direct = haversine_km(origin.location, destination.location);
    assert!((result.total_distance_km - direct).abs() < 1e-6);
}

#[test]
fn duplicate_labels_are_kept_apart() {
    let origin = stop("origin", 0.0, 0.0);
    let destination = stop("destination", 0.0, 0.03);
    let stops = vec![stop("Warung", 0.0, 0.02), stop("Warung", 0.0, 0.01)];

    let result = optimizer().solve(&origin, &destination, &stops);

    assert_eq!(result.ordered_labels.len(), 4);
    let direct = haversine_km(origin.location, destination.location);
    assert!((result.total_distance_km - direct).abs() < 1e-6);
}

#[test]
fn estimated_minutes_follow_average_speed() {
    let opt = RouteOptimizer::new(40.0);
    assert!((opt.minutes_for(20.0) - 30.0).abs() < 1e-9);
    assert!((opt.minutes_for(0.0)).abs() < f64::EPSILON);
}

#[test]
fn estimated_minutes_positive_for_nonzero_routes() {
    let origin = stop("origin", -6.2088, 106.8456);
    let destination = stop("destination", -6.2000, 106.8500);
    let result = optimizer().solve(&origin, &destination, &[stop("A", -6.205, 106.84)]);

    assert!(result.total_distance_km > 0.0);
    assert!(result.estimated_minutes > 0.0);
}

#[test]
fn same_origin_and_destination_without_stops_is_zero() {
    let here = stop("here", 1.0, 1.0);
    let result = optimizer().solve(&here, &here, &[]);
    assert!(result.total_distance_km.abs() < f64::EPSILON);
    assert!(result.estimated_minutes.abs() < f64::EPSILON);
}
