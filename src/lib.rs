//! A deterministic, seedable pseudo-random bit generator with a
//! quantum-inspired mixing schedule.
//!
//! In engineering terms this is a non-cryptographic mixing-function PRBG
//! with a small lane-based state and a 128-byte refill buffer: **not** a
//! CSPRNG, **not** reproducible across hosts for a given seed (host clock
//! and process entropy are folded into every step by design), and not
//! actually quantum-mechanical in any sense beyond vocabulary.
//!
//! # Features
//! - Typed draws: `uint64`, `double`, `range32`, `range64`.
//! - Bulk byte fills via [`QrngState::bytes`], backed by a refill buffer.
//! - Two decorative bulk transforms on caller-owned buffers:
//!   [`QrngState::entangle_states`] and [`QrngState::measure_state_buffer`].
//! - A heuristic [`QrngState::entropy_estimate`] health metric.
//! - Implements [`rand_core::RngCore`] for ecosystem compatibility.
//! - Secure memory zeroization on drop.
//!
//! # Example
//! ```
//! use qrbg_core::init;
//!
//! let mut state = init(Some(b"some-seed-material"));
//! let first = state.uint64();
//! let second = state.uint64();
//! assert_ne!(first, second);
//! assert!((0.0..1.0).contains(&state.double()));
//! ```

mod consts;
mod entropy;
mod error;
mod mixers;
mod noise;
mod state;

pub use error::{QrngError, error_string};
pub use state::QrngState;

use consts::{GOLDEN_RATIO, NUM_QUBITS, PAULI_Z};
use mixers::{pauli_fold, splitmix64};
use noise::{hadamard_gate, phase_gate, quantum_noise};
use rand_core::RngCore;

const U64_MAX_F64: f64 = u64::MAX as f64;

/// Creates a new [`QrngState`], optionally seeded with caller-provided
/// bytes. Runs the mandatory 8-step warm-up schedule before returning.
///
/// Unlike the C original this core is distilled from, state allocation
/// here cannot fail (no heap allocation occurs — every array is inline),
/// so there is no `NullContext` path for callers to check; Rust's
/// ownership model makes a "null state" handle unrepresentable.
pub fn init(seed: Option<&[u8]>) -> QrngState {
    QrngState::new(seed)
}

/// Returns this crate's version as `"major.minor.patch"`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

impl QrngState {
    /// Draws the next 64-bit word.
    ///
    /// Fetches 8 bytes via the bulk byte path (which may trigger one
    /// `step`), then post-mixes the result with a fresh runtime-entropy
    /// snapshot so two draws from the same buffer position never repeat.
    pub fn uint64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_from_buffer(&mut bytes);
        let mut r = u64::from_le_bytes(bytes);
        self.refresh_runtime_entropy();
        r = splitmix64(r ^ self.runtime_entropy);
        r = pauli_fold(r, self.pool_mixer);
        r ^ PAULI_Z.wrapping_mul(r >> 29)
    }

    /// Draws the next double in `[0, 1)`, with 53 bits of precision.
    pub fn double(&mut self) -> f64 {
        (self.uint64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draws an `i32` uniformly from `[min, max]` via rejection sampling.
    ///
    /// Requires `min <= max`; on a bad range (or the unrepresentable
    /// `range == 0` case produced only by `min = i32::MIN, max = i32::MAX`)
    /// returns `max` rather than an error code, preserving value-returning
    /// ergonomics at the API boundary.
    pub fn range32(&mut self, min: i32, max: i32) -> i32 {
        if min > max {
            return max;
        }
        // Computed explicitly in u32 rather than relying on the
        // implementation-defined signed-to-unsigned cast sequencing of
        // `(uint32_t)(max - min + 1)` near the i32 extremes.
        let range = (max as u32).wrapping_sub(min as u32).wrapping_add(1);
        if range == 0 {
            return max;
        }
        let threshold = 0u32.wrapping_sub(range) % range;
        loop {
            let r = self.uint64() as u32;
            if r >= threshold {
                return min.wrapping_add((r % range) as i32);
            }
        }
    }

    /// Draws a `u64` uniformly from `[min, max]` via rejection sampling.
    ///
    /// `min == max` short-circuits to `min`. A bad range, or the
    /// `range == 0` case produced only by `min = 0, max = u64::MAX`,
    /// returns `max`.
    pub fn range64(&mut self, min: u64, max: u64) -> u64 {
        if min == max {
            return min;
        }
        if min > max {
            return max;
        }
        let range = max.wrapping_sub(min).wrapping_add(1);
        if range == 0 {
            return max;
        }
        let threshold = 0u64.wrapping_sub(range) % range;
        loop {
            let r = self.uint64();
            if r >= threshold {
                return min.wrapping_add(r % range);
            }
        }
    }

    /// Fills `out` with random bytes, draining and refilling the internal
    /// buffer as needed.
    ///
    /// # Errors
    /// Returns [`QrngError::InvalidLength`] if `out` is empty.
    pub fn bytes(&mut self, out: &mut [u8]) -> Result<(), QrngError> {
        if out.is_empty() {
            return Err(QrngError::InvalidLength);
        }
        self.fill_from_buffer(out);
        Ok(())
    }

    /// Pairwise-mixes two caller-owned buffers using the PRBG's noise maps.
    ///
    /// A decorative transform, not a cryptographic operation: it shares
    /// machinery with the core mixing engine but offers no security
    /// property. `a` and `b` share a single logical length, matching the
    /// one `len` parameter of the external `entangle_states` signature.
    ///
    /// # Errors
    /// Returns [`QrngError::InvalidLength`] if either buffer is empty or
    /// the two buffers differ in length.
    pub fn entangle_states(
        &mut self,
        a: &mut [u8],
        b: &mut [u8],
    ) -> Result<(), QrngError> {
        if a.len() != b.len() || a.is_empty() {
            return Err(QrngError::InvalidLength);
        }
        let len = a.len();
        self.refresh_runtime_entropy();
        let re = self.runtime_entropy;
        let counter = self.counter;
        let mut mixer = splitmix64(counter.wrapping_mul(GOLDEN_RATIO));
        for i in 0..len {
            let s1 = hadamard_gate(a[i] as u64 ^ mixer ^ re);
            let s2 = hadamard_gate(b[i] as u64 ^ mixer ^ re);
            let phase = phase_gate(s1 ^ s2, counter ^ mixer ^ re);
            a[i] = (s1 ^ phase) as u8;
            b[i] = (s2 ^ phase) as u8;
            mixer = splitmix64(mixer ^ s1 ^ s2 ^ re);
        }
        for i in 0..NUM_QUBITS {
            self.quantum_state[i] =
                quantum_noise(self.quantum_state[i] + re as f64 / U64_MAX_F64);
        }
        Ok(())
    }

    /// Byte-wise collapses a caller-owned buffer through `measure_state`.
    ///
    /// A decorative transform, not a cryptographic operation.
    ///
    /// # Errors
    /// Returns [`QrngError::InvalidLength`] if `buf` is empty.
    pub fn measure_state_buffer(
        &mut self,
        buf: &mut [u8],
    ) -> Result<(), QrngError> {
        if buf.is_empty() {
            return Err(QrngError::InvalidLength);
        }
        self.refresh_runtime_entropy();
        let mut mixer = splitmix64(self.counter.wrapping_mul(GOLDEN_RATIO));
        for byte in buf.iter_mut() {
            let re = self.runtime_entropy;
            let q = quantum_noise(*byte as f64 / 255.0 + re as f64 / U64_MAX_F64);
            let m = self.measure_state(q, mixer);
            *byte = m as u8;
            mixer = splitmix64(mixer ^ m ^ self.runtime_entropy);
        }
        for i in 0..NUM_QUBITS {
            let qs = self.quantum_state[i];
            let last = self.last_measurement[i];
            self.last_measurement[i] = self.measure_state(qs, last);
        }
        Ok(())
    }

    /// A heuristic health metric, not a true Shannon entropy estimate.
    ///
    /// A freshly-initialized pool slot of exactly `0.0` drives `log2(1e-10)`
    /// to roughly `-33.2`, inflating the average; this is the inherited
    /// behavior of the design, not a bug to paper over.
    pub fn entropy_estimate(&self) -> f64 {
        let pool_sum: f64 = self.pool.iter().map(|p| (p + 1e-10).log2()).sum();
        let tail = ((self.runtime_entropy & 0xFF) as f64 / 256.0 + 1e-10).log2();
        (-pool_sum - tail) / 17.0
    }
}

impl RngCore for QrngState {
    fn next_u32(&mut self) -> u32 {
        self.uint64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.uint64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let _ = self.bytes(dst);
    }
}
