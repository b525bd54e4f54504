mod common;
use approx::assert_abs_diff_eq;
use clusterless_intensity_rs::processors::spike_analytics::gaussian_pdf;
use clusterless_intensity_rs::{
    estimate_conditional_intensity, filter_spikes_to_state, occupancy, IntensityError, StateMembership,
};
use common::{argmax, integer_bins, line_trajectory, peak_to_mass};
use ndarray::{array, Array1, Array2, Axis};
use rand::Rng;

#[test]
fn uniform_track_peaks_where_spikes_occur() {
    let trajectory = line_trajectory(6);
    let bins = integer_bins(6);
    let state = StateMembership::new((0..6).collect());

    let result = estimate_conditional_intensity(trajectory.view(), &[2, 2, 3], &state, 1.0, bins.view(), 1.0)
        .unwrap();

    assert_abs_diff_eq!(result.rate.sum(), 1.0, epsilon = 1e-12);
    assert!((2..=3).contains(&argmax(&result.rate)), "rate = {}", result.rate);
    assert_eq!(result.n_spikes, 3);

    // occupancy of a uniform sweep is symmetric around the track center
    for b in 0..3 {
        assert_abs_diff_eq!(result.occupancy[b], result.occupancy[5 - b], epsilon = 1e-12);
    }
    assert!(result.occupancy.iter().all(|&o| o > 0.0));
}

#[test]
fn matches_broadcast_reference() {
    // two channels, state uses the second one and only part of the session
    let trajectory = Array2::from_shape_fn((10, 2), |(t, c)| if c == 0 { t as f64 } else { (t as f64 * 0.7).sin() * 4.0 + 4.0 });
    let bins = Array1::linspace(0.0, 8.0, 9);
    let state = StateMembership::with_channel(1, vec![1, 3, 4, 5, 8, 9]);
    let spikes = [0, 3, 3, 4, 7, 9, 9, 9];
    let (bandwidth, bin_duration) = (1.3, 0.002);

    let result =
        estimate_conditional_intensity(trajectory.view(), &spikes, &state, bandwidth, bins.view(), bin_duration)
            .unwrap();

    // Explicit [position bins × samples] matrices reduced along the sample axis
    let positions = trajectory.column(1);
    let kde = |rows: &[usize]| {
        Array2::from_shape_fn((bins.len(), rows.len()), |(b, s)| gaussian_pdf(bins[b] - positions[rows[s]], bandwidth))
            .sum_axis(Axis(1))
    };
    let expected_occupancy = kde(&state.time_bins);
    let expected_spikes = kde(&[3, 3, 4, 9, 9, 9]);
    let unnormalized = &expected_spikes / &expected_occupancy / bin_duration;
    let expected_rate = &unnormalized / unnormalized.sum();

    for b in 0..bins.len() {
        assert_abs_diff_eq!(result.occupancy[b], expected_occupancy[b], epsilon = 1e-12);
        assert_abs_diff_eq!(result.spike_density[b], expected_spikes[b], epsilon = 1e-12);
        assert_abs_diff_eq!(result.rate[b], expected_rate[b], epsilon = 1e-12);
    }
}

#[test]
fn spikes_outside_state_are_ignored() {
    let trajectory = line_trajectory(40);
    let bins = Array1::linspace(0.0, 39.0, 20);
    let state = StateMembership::new((10..30).collect());
    let inside = vec![12, 15, 15, 22, 29];

    let baseline = estimate_conditional_intensity(trajectory.view(), &inside, &state, 2.0, bins.view(), 0.01).unwrap();

    let mut rng = rand::rng();
    for _ in 0..20 {
        let mut mixed = inside.clone();
        for _ in 0..rng.random_range(1..30) {
            let outside = if rng.random_bool(0.5) { rng.random_range(0..10) } else { rng.random_range(30..1000) };
            let at = rng.random_range(0..=mixed.len());
            mixed.insert(at, outside);
        }
        assert_eq!(filter_spikes_to_state(&mixed, &state), inside);

        let result = estimate_conditional_intensity(trajectory.view(), &mixed, &state, 2.0, bins.view(), 0.01).unwrap();
        assert_eq!(result, baseline);
    }
}

#[test]
fn no_spikes_in_state_is_no_data() {
    let trajectory = line_trajectory(6);
    let bins = integer_bins(6);
    let state = StateMembership::new(vec![0, 1]);

    let err = estimate_conditional_intensity(trajectory.view(), &[2, 2, 3], &state, 1.0, bins.view(), 1.0)
        .unwrap_err();
    assert_eq!(err, IntensityError::NoData { state_size: 2, spikes_offered: 3 });

    let err = estimate_conditional_intensity(trajectory.view(), &[], &state, 1.0, bins.view(), 1.0).unwrap_err();
    assert!(matches!(err, IntensityError::NoData { .. }));
}

#[test]
fn non_positive_bandwidth_is_invalid_parameter() {
    let trajectory = line_trajectory(6);
    let bins = integer_bins(6);
    let full = StateMembership::new((0..6).collect());
    let empty = StateMembership::new(vec![]);

    for bandwidth in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        for state in [&full, &empty] {
            let err = estimate_conditional_intensity(trajectory.view(), &[2], state, bandwidth, bins.view(), 1.0)
                .unwrap_err();
            assert!(matches!(err, IntensityError::InvalidParameter(_)), "bandwidth {bandwidth}: {err}");
        }
        assert!(matches!(
            occupancy(trajectory.view(), &full, bandwidth, bins.view()),
            Err(IntensityError::InvalidParameter(_))
        ));
    }
}

#[test]
fn duplicating_spikes_leaves_rate_unchanged() {
    let trajectory = line_trajectory(6);
    let bins = integer_bins(6);
    let state = StateMembership::new((0..6).collect());
    let spikes = [2, 2, 3];
    let doubled: Vec<usize> = spikes.iter().flat_map(|&s| [s, s]).collect();

    let once = estimate_conditional_intensity(trajectory.view(), &spikes, &state, 1.0, bins.view(), 1.0).unwrap();
    let twice = estimate_conditional_intensity(trajectory.view(), &doubled, &state, 1.0, bins.view(), 1.0).unwrap();

    assert_eq!(twice.n_spikes, 2 * once.n_spikes);
    assert_eq!(twice.occupancy, once.occupancy);
    for b in 0..bins.len() {
        assert_abs_diff_eq!(twice.spike_density[b], 2.0 * once.spike_density[b], epsilon = 1e-12);
        assert_abs_diff_eq!(twice.rate[b], once.rate[b], epsilon = 1e-12);
    }
}

#[test]
fn wider_bandwidth_spreads_occupancy_and_rate() {
    // two separated dwell locations at 2 and 8, spikes only at 2
    let positions = [2.0, 2.0, 2.0, 8.0, 8.0, 8.0];
    let trajectory = Array2::from_shape_fn((6, 1), |(t, _)| positions[t]);
    let bins = integer_bins(11);
    let state = StateMembership::new((0..6).collect());
    let spikes = [0, 1, 1, 2];

    let mut last: Option<(f64, f64)> = None;
    for bandwidth in [1.0, 2.0, 3.0] {
        let result = estimate_conditional_intensity(trajectory.view(), &spikes, &state, bandwidth, bins.view(), 1.0)
            .unwrap();
        let current = (peak_to_mass(&result.occupancy), peak_to_mass(&result.rate));
        if let Some(previous) = last {
            assert!(current.0 < previous.0, "occupancy peak/mass {current:?} !< {previous:?}");
            assert!(current.1 < previous.1, "rate peak/mass {current:?} !< {previous:?}");
        }
        last = Some(current);
    }
}

#[test]
fn rate_sums_to_one_for_uneven_bins() {
    let trajectory = line_trajectory(12);
    let bins = array![-1.0, 0.5, 1.0, 4.0, 4.2, 7.5, 11.0, 15.0];
    let state = StateMembership::new(vec![0, 2, 3, 5, 7, 8, 11]);

    let result = estimate_conditional_intensity(trajectory.view(), &[2, 5, 5, 6, 11], &state, 1.5, bins.view(), 1e-3)
        .unwrap();
    assert_abs_diff_eq!(result.rate.sum(), 1.0, epsilon = 1e-12);
    assert!(result.rate.iter().all(|&r| r.is_finite() && r >= 0.0));
    assert_eq!(result.n_spikes, 4);
}
