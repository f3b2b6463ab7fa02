use approx::assert_abs_diff_eq;

use ezma::catalog::{BuiltinCatalog, Library, LibraryCatalog};
use ezma::geo::TASHKENT_CENTER;
use ezma::{find_nearby, haversine_km, GeoPoint, NearbyError, DEFAULT_RADIUS_KM};

fn libraries() -> Vec<Library> {
    BuiltinCatalog.libraries().unwrap()
}

fn sample_points() -> Vec<GeoPoint> {
    vec![
        TASHKENT_CENTER,
        GeoPoint { latitude: 41.2995, longitude: 69.2401 },
        GeoPoint { latitude: 41.35, longitude: 69.3 },
        GeoPoint { latitude: 39.654, longitude: 66.9597 },
    ]
}

#[test]
fn coincident_candidate_reports_zero() {
    for lib in libraries() {
        let here = GeoPoint { latitude: lib.latitude, longitude: lib.longitude };
        let results = find_nearby(here, libraries(), DEFAULT_RADIUS_KM).unwrap();
        let own = results.iter().find(|r| r.entity.id == lib.id).unwrap();
        assert_eq!(own.distance_km, 0.0);
        assert_eq!(results[0].distance_km, 0.0);
    }
}

#[test]
fn distance_is_symmetric() {
    let points: Vec<GeoPoint> = libraries()
        .iter()
        .map(|l| GeoPoint { latitude: l.latitude, longitude: l.longitude })
        .chain(sample_points())
        .collect();
    for a in &points {
        for b in &points {
            assert_abs_diff_eq!(haversine_km(*a, *b), haversine_km(*b, *a), epsilon = 1e-6);
        }
    }
}

#[test]
fn results_are_within_radius_and_sorted() {
    for query in sample_points() {
        for radius in [0.0, 0.5, 1.8, 2.5, 3.4, 10.0, 500.0] {
            let results = find_nearby(query, libraries(), radius).unwrap();
            assert!(results.iter().all(|r| r.distance_km <= radius));
            assert!(results.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));

            // nothing inside the radius was dropped
            let expected = libraries()
                .iter()
                .filter(|l| {
                    let p = GeoPoint { latitude: l.latitude, longitude: l.longitude };
                    (haversine_km(query, p) * 10.0).round() / 10.0 <= radius
                })
                .count();
            assert_eq!(results.len(), expected);
        }
    }
}

#[test]
fn empty_candidates_give_empty_results() {
    for query in sample_points() {
        assert!(find_nearby(query, Vec::<Library>::new(), 10.0).unwrap().is_empty());
    }
}

#[test]
fn tashkent_reference_value() {
    let query = GeoPoint::new(41.311081, 69.280624).unwrap();
    let nuu = libraries().into_iter().filter(|l| l.id == 2).collect::<Vec<_>>();
    let results = find_nearby(query, nuu, DEFAULT_RADIUS_KM).unwrap();
    assert_eq!(results.len(), 1);
    assert_abs_diff_eq!(results[0].distance_km, 3.4, epsilon = 0.1);
}

#[test]
fn radius_boundary() {
    let nuu: Vec<Library> = libraries().into_iter().filter(|l| l.id == 2).collect();
    let d = find_nearby(TASHKENT_CENTER, &nuu, DEFAULT_RADIUS_KM).unwrap()[0].distance_km;

    assert_eq!(find_nearby(TASHKENT_CENTER, &nuu, d).unwrap().len(), 1);
    assert!(find_nearby(TASHKENT_CENTER, &nuu, d - 0.1).unwrap().is_empty());
}

#[test]
fn invalid_input_is_rejected() {
    let bad_query = GeoPoint { latitude: 200.0, longitude: 69.28 };
    assert!(matches!(
        find_nearby(bad_query, libraries(), 10.0),
        Err(NearbyError::InvalidCoordinate { .. })
    ));
    assert!(matches!(
        find_nearby(TASHKENT_CENTER, libraries(), -5.0),
        Err(NearbyError::InvalidRadius(_))
    ));
}

#[test]
fn ranked_result_serializes_flat_with_distance() {
    let results = BuiltinCatalog.nearby_libraries(TASHKENT_CENTER, 2.0, false).unwrap();
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[0]["id"], 1);
    assert_eq!(json[0]["distanceKm"], 0.0);
    assert_eq!(json[1]["id"], 4);
    assert_eq!(json[1]["distanceKm"], 1.8);
    assert_eq!(json[1]["status"], "active");
}
