//! Property and boundary tests for the public API.
//!
//! This core is explicitly non-reproducible across hosts (host clock and
//! process entropy are folded into every step), so these tests assert
//! distribution and invariant properties rather than exact output vectors.

use qrbg_core::{QrngError, init, version};
use rand_core::RngCore;

#[test]
fn double_draws_stay_in_unit_interval() {
    let mut state = init(Some(b"double-bounds"));
    for _ in 0..10_000 {
        let d = state.double();
        assert!((0.0..1.0).contains(&d), "double() produced {d}");
    }
}

#[test]
fn range64_respects_bounds() {
    let mut state = init(Some(b"range64-bounds"));
    for _ in 0..10_000 {
        let r = state.range64(10, 20);
        assert!((10..=20).contains(&r));
    }
}

#[test]
fn range32_respects_bounds() {
    let mut state = init(Some(b"range32-bounds"));
    for _ in 0..10_000 {
        let r = state.range32(-50, 50);
        assert!((-50..=50).contains(&r));
    }
}

#[test]
fn range32_degenerate_range_returns_min() {
    let mut state = init(Some(b"range32-degenerate"));
    assert_eq!(state.range32(7, 7), 7);
    assert_eq!(state.range32(-3, -3), -3);
}

#[test]
fn range64_degenerate_range_returns_min() {
    let mut state = init(Some(b"range64-degenerate"));
    assert_eq!(state.range64(42, 42), 42);
}

#[test]
fn range32_bad_input_returns_max() {
    let mut state = init(Some(b"range32-bad-input"));
    assert_eq!(state.range32(5, 1), 1);
}

#[test]
fn range64_bad_input_returns_max() {
    let mut state = init(Some(b"range64-bad-input"));
    assert_eq!(state.range64(5, 1), 1);
}

#[test]
fn range32_full_domain_never_panics() {
    let mut state = init(Some(b"range32-full-domain"));
    for _ in 0..10_000 {
        let r = state.range32(i32::MIN, i32::MAX);
        assert!(r >= i32::MIN);
    }
}

#[test]
fn range64_full_domain_hits_the_wraps_to_zero_path() {
    let mut state = init(Some(b"range64-full-domain"));
    // min=0, max=u64::MAX is the one case where range wraps to 0; the
    // core must short-circuit to `max` rather than divide by zero.
    assert_eq!(state.range64(0, u64::MAX), u64::MAX);
}

#[test]
fn bytes_fills_exactly_the_requested_length() {
    let mut state = init(Some(b"bytes-length"));
    let mut out = [0u8; 257];
    state.bytes(&mut out).expect("non-empty buffer should succeed");
    // can't assert non-zero-everywhere deterministically, but the call
    // must have succeeded and filled the whole slice without panicking
    assert_eq!(out.len(), 257);
}

#[test]
fn bytes_spans_a_step_boundary() {
    let mut state = init(Some(b"bytes-boundary"));
    let mut first = [0u8; 128];
    let mut second = [0u8; 129];
    state.bytes(&mut first).unwrap();
    state.bytes(&mut second).unwrap();
    // exercised without asserting internal buffer position directly;
    // the call must not panic across the 128-byte refill boundary
    let _ = (first, second);
}

#[test]
fn bytes_rejects_zero_length() {
    let mut state = init(Some(b"bytes-zero-length"));
    let mut out: [u8; 0] = [];
    assert_eq!(state.bytes(&mut out), Err(QrngError::InvalidLength));
}

#[test]
fn reseed_rejects_empty_seed() {
    let mut state = init(Some(b"reseed-zero-length"));
    assert_eq!(state.reseed(&[]), Err(QrngError::InvalidLength));
}

#[test]
fn reseed_changes_subsequent_output() {
    let mut state = init(Some(b"reseed-changes-output"));
    let before = state.uint64();
    state.reseed(b"reseed-changes-output").expect("non-empty seed");
    let after = state.uint64();
    // runtime entropy varies per call and reseed re-runs the warm-up
    // schedule, so two draws straddling a reseed must differ.
    assert_ne!(before, after);
}

#[test]
fn independent_states_diverge() {
    let mut a = init(None);
    let mut b = init(None);
    assert_ne!(a.uint64(), b.uint64());
}

#[test]
fn entangle_states_changes_both_buffers() {
    let mut state = init(Some(b"entangle"));
    let mut a = [0xAAu8; 32];
    let mut b = [0x55u8; 32];
    let a_before = a;
    let b_before = b;
    state.entangle_states(&mut a, &mut b).expect("non-empty buffers");
    assert_ne!(a, a_before);
    assert_ne!(b, b_before);
    let xor_all_ff = a.iter().zip(b.iter()).all(|(x, y)| x ^ y == 0xFF);
    assert!(!xor_all_ff, "entangled buffers should not stay perfectly complementary");
}

#[test]
fn entangle_states_rejects_empty_buffers() {
    let mut state = init(Some(b"entangle-empty"));
    let mut a: [u8; 0] = [];
    let mut b: [u8; 0] = [];
    assert_eq!(
        state.entangle_states(&mut a, &mut b),
        Err(QrngError::InvalidLength)
    );
}

#[test]
fn entangle_states_rejects_mismatched_lengths() {
    let mut state = init(Some(b"entangle-mismatch"));
    let mut a = [0u8; 4];
    let mut b = [0u8; 5];
    assert_eq!(
        state.entangle_states(&mut a, &mut b),
        Err(QrngError::InvalidLength)
    );
}

#[test]
fn measure_state_buffer_rejects_empty_buffer() {
    let mut state = init(Some(b"measure-empty"));
    let mut buf: [u8; 0] = [];
    assert_eq!(
        state.measure_state_buffer(&mut buf),
        Err(QrngError::InvalidLength)
    );
}

#[test]
fn measure_state_buffer_transforms_input() {
    let mut state = init(Some(b"measure-transform"));
    let mut buf = [0x42u8; 16];
    let before = buf;
    state.measure_state_buffer(&mut buf).expect("non-empty buffer");
    assert_ne!(buf, before);
}

#[test]
fn entropy_estimate_is_finite() {
    let state = init(Some(b"entropy-estimate"));
    let estimate = state.entropy_estimate();
    assert!(estimate.is_finite());
}

#[test]
fn version_reports_semver_shape() {
    let v = version();
    assert_eq!(v.split('.').count(), 3);
}

#[test]
fn rng_core_next_u64_advances_state() {
    let mut state = init(Some(b"rngcore"));
    let a = RngCore::next_u64(&mut state);
    let b = RngCore::next_u64(&mut state);
    assert_ne!(a, b);
}

#[test]
fn bit_popcount_is_roughly_balanced_over_many_draws() {
    let mut state = init(Some(b"popcount-balance"));
    let draws = 20_000u32;
    let mut ones = 0u64;
    for _ in 0..draws {
        ones += state.uint64().count_ones() as u64;
    }
    let total_bits = draws as u64 * 64;
    let ratio = ones as f64 / total_bits as f64;
    assert!(
        (0.47..0.53).contains(&ratio),
        "bit-set ratio {ratio} outside loose balance bounds"
    );
}
