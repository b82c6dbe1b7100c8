//! The state engine: per-lane arrays, refill buffer, entropy pool, and the
//! two operations (`seed_apply`, `step`) that drive them.

use zeroize::Zeroize;

use crate::consts::{
    BUFFER_SIZE, ELECTRON_G, GOLDEN_RATIO, HEISENBERG, MIXING_ROUNDS,
    NUM_QUBITS, POOL_SIZE,
};
use crate::entropy;
use crate::error::QrngError;
use crate::mixers::{hadamard_mix, pauli_fold, pauli_fold_no_tail, splitmix64};
use crate::noise::{hadamard_gate, phase_gate, quantum_noise};

const U64_MAX_F64: f64 = u64::MAX as f64;

/// Owning handle to one logical generator's state.
///
/// Not thread-safe: every draw and bulk transform requires exclusive
/// mutable access, which this type's method signatures enforce.
pub struct QrngState {
    pub(crate) phase: [u64; NUM_QUBITS],
    pub(crate) entangle: [u64; NUM_QUBITS],
    pub(crate) quantum_state: [f64; NUM_QUBITS],
    pub(crate) last_measurement: [u64; NUM_QUBITS],
    pub(crate) buffer: [u8; BUFFER_SIZE],
    pub(crate) buffer_pos: usize,
    pub(crate) counter: u64,
    pub(crate) pool: [f64; POOL_SIZE],
    pub(crate) pool_index: u8,
    pub(crate) pool_mixer: u64,
    pub(crate) system_entropy: u64,
    pub(crate) unique_id: u64,
    pub(crate) runtime_entropy: u64,
    #[allow(dead_code)]
    pub(crate) init_time_secs: u64,
    #[allow(dead_code)]
    pub(crate) pid: u32,
}

fn init_pool(system_entropy: u64) -> [f64; POOL_SIZE] {
    let mut pool = [0.0; POOL_SIZE];
    let mut x = system_entropy;
    for slot in pool.iter_mut() {
        x = splitmix64(x);
        *slot = quantum_noise(x as f64 / U64_MAX_F64);
    }
    pool
}

impl QrngState {
    /// Creates a fresh state, optionally seeded with caller-provided bytes.
    ///
    /// Runs the mandatory 8-step warm-up schedule before returning, so the
    /// first draw reflects 8 completed steps.
    pub(crate) fn new(seed: Option<&[u8]>) -> Self {
        let pid = std::process::id();
        let cpu_local = entropy::cpu_local_clock_reading();
        let system_entropy = entropy::system_entropy_snapshot(pid, cpu_local);
        let unique_id = splitmix64(system_entropy);
        let pool = init_pool(system_entropy);
        let mut state = QrngState {
            phase: [0; NUM_QUBITS],
            entangle: [0; NUM_QUBITS],
            quantum_state: [0.0; NUM_QUBITS],
            last_measurement: [0; NUM_QUBITS],
            buffer: [0u8; BUFFER_SIZE],
            buffer_pos: 0,
            counter: 0,
            pool,
            pool_index: 0,
            pool_mixer: HEISENBERG ^ unique_id,
            system_entropy,
            unique_id,
            runtime_entropy: 0,
            init_time_secs: entropy::now_secs(),
            pid,
        };
        state.seed_apply(seed, true);
        state
    }

    /// Re-applies seed material to an existing state, then re-runs the
    /// 8-step warm-up. `seed` must be non-empty.
    ///
    /// # Errors
    /// Returns [`QrngError::InvalidLength`] if `seed` is empty; it is a
    /// contract violation to reseed with no seed material.
    pub fn reseed(&mut self, seed: &[u8]) -> Result<(), QrngError> {
        if seed.is_empty() {
            return Err(QrngError::InvalidLength);
        }
        self.seed_apply(Some(seed), false);
        Ok(())
    }

    /// Shared by `new` (init) and `reseed`: folds seed material into the
    /// lane arrays, then burns the mandatory warm-up schedule.
    fn seed_apply(&mut self, seed: Option<&[u8]>, is_init: bool) {
        self.runtime_entropy = entropy::runtime_entropy(
            self.system_entropy,
            self.unique_id,
            self.counter,
        );
        let base = if is_init {
            self.system_entropy
        } else {
            self.runtime_entropy
        };
        let mut mixer = GOLDEN_RATIO ^ base;

        let lanes = match seed {
            Some(s) if !is_init => s.len().min(NUM_QUBITS),
            _ => NUM_QUBITS,
        };

        for i in 0..lanes {
            let seed_byte_or_i: u64 = match seed {
                Some(s) if !s.is_empty() => s[i % s.len()] as u64,
                _ => 0,
            };
            mixer = splitmix64(mixer ^ seed_byte_or_i ^ self.runtime_entropy);

            if is_init {
                self.phase[i] = hadamard_gate(
                    seed_byte_or_i
                        ^ mixer
                        ^ self.unique_id
                        ^ self.runtime_entropy,
                );
                self.quantum_state[i] = quantum_noise(
                    (self.phase[i] ^ self.system_entropy) as f64
                        / U64_MAX_F64
                        + self.pool[i % POOL_SIZE]
                        + self.runtime_entropy as f64 / U64_MAX_F64,
                );
            } else {
                let seed = seed.expect("reseed requires seed material");
                self.phase[i] = hadamard_gate(
                    self.phase[i]
                        ^ seed[i] as u64
                        ^ mixer
                        ^ self.runtime_entropy,
                );
                self.quantum_state[i] = quantum_noise(
                    self.phase[i] as f64 / U64_MAX_F64
                        + self.runtime_entropy as f64 / U64_MAX_F64,
                );
            }

            let last_input: u64 = match seed {
                Some(s) if !s.is_empty() => {
                    let idx = s.len() - 1 - (i % s.len());
                    (s[idx] as u64) ^ mixer
                }
                _ => i as u64,
            };
            let qs = self.quantum_state[i];
            self.last_measurement[i] = self.measure_state(qs, last_input);
            self.entangle[i] = phase_gate(
                self.last_measurement[i],
                seed_byte_or_i ^ mixer ^ self.runtime_entropy,
            );
        }

        for _ in 0..(2 * MIXING_ROUNDS) {
            self.step();
        }
    }

    /// Collapses a lane's floating-point state into a 64-bit word, folding
    /// in the pool and pool mixer along the way.
    pub(crate) fn measure_state(&mut self, quantum_state: f64, last: u64) -> u64 {
        self.runtime_entropy = entropy::runtime_entropy(
            self.system_entropy,
            self.unique_id,
            self.counter,
        );
        let re_frac = self.runtime_entropy as f64 / U64_MAX_F64;
        let collapsed = quantum_noise(quantum_state + re_frac);

        let slot = self.pool_index as usize;
        self.pool[slot] = quantum_noise(self.pool[slot] + collapsed + re_frac);
        self.pool_index = (self.pool_index + 1) & 0x0F;
        let pool_val = self.pool[self.pool_index as usize];
        self.pool_mixer = hadamard_mix(
            self.pool_mixer
                ^ (pool_val * U64_MAX_F64) as u64
                ^ self.runtime_entropy,
        );

        let r = hadamard_mix(
            (collapsed * U64_MAX_F64) as u64
                ^ last.wrapping_mul(ELECTRON_G)
                ^ self.runtime_entropy,
        );
        pauli_fold(r, self.pool_mixer)
    }

    /// Regenerates the entire refill buffer from the current lane arrays
    /// and advances the counter by one.
    pub(crate) fn step(&mut self) {
        self.counter = self.counter.wrapping_add(1);
        let mut mixer = splitmix64(self.counter.wrapping_mul(GOLDEN_RATIO));
        self.runtime_entropy = entropy::runtime_entropy(
            self.system_entropy,
            self.unique_id,
            self.counter,
        );

        for round in 0..MIXING_ROUNDS {
            mixer = hadamard_mix(mixer ^ self.pool_mixer ^ self.runtime_entropy);
            for i in 0..NUM_QUBITS {
                self.phase[i] = hadamard_gate(
                    self.counter
                        .wrapping_add(mixer)
                        .wrapping_add(i as u64)
                        .wrapping_add(round as u64)
                        .wrapping_add(self.runtime_entropy),
                );
                let pool_val = self.pool[i & 0x0F];
                self.quantum_state[i] = quantum_noise(
                    self.phase[i] as f64 / U64_MAX_F64
                        + pool_val
                        + self.runtime_entropy as f64 / U64_MAX_F64,
                );
                let qs = self.quantum_state[i];
                let last = self.last_measurement[i];
                let measured = self.measure_state(qs, last);
                self.entangle[i] = phase_gate(
                    measured,
                    self.counter ^ mixer ^ self.runtime_entropy,
                );
                self.last_measurement[i] = measured;
                if i > 0 {
                    self.entangle[i] ^= hadamard_mix(
                        self.entangle[i - 1] ^ mixer ^ self.runtime_entropy,
                    );
                    self.quantum_state[i] = quantum_noise(
                        self.quantum_state[i]
                            + self.quantum_state[i - 1]
                            + self.runtime_entropy as f64 / U64_MAX_F64,
                    );
                }
                mixer = splitmix64(
                    mixer ^ measured ^ self.pool_mixer ^ self.runtime_entropy,
                );
            }
        }

        let mut prev = mixer;
        let mut words = [0u64; BUFFER_SIZE / 8];
        for (i, word) in words.iter_mut().enumerate() {
            let lane = i % NUM_QUBITS;
            let qs = self.quantum_state[lane];
            let ent = self.entangle[lane];
            let mut current = self.measure_state(qs, ent);
            current = hadamard_mix(
                current ^ prev ^ self.pool_mixer ^ self.runtime_entropy,
            );
            current = pauli_fold_no_tail(current, self.pool_mixer);
            *word = current;
            prev = current;
        }
        for (i, w) in words.iter().enumerate() {
            self.buffer[i * 8..i * 8 + 8].copy_from_slice(&w.to_le_bytes());
        }
        self.buffer_pos = 0;
    }

    /// Recomputes the runtime-entropy snapshot from the current counter and
    /// one-shot host identifiers.
    pub(crate) fn refresh_runtime_entropy(&mut self) {
        self.runtime_entropy = entropy::runtime_entropy(
            self.system_entropy,
            self.unique_id,
            self.counter,
        );
    }

    /// Drains the refill buffer into `dst`, triggering a `step` whenever the
    /// buffer is exhausted.
    pub(crate) fn fill_from_buffer(&mut self, mut dst: &mut [u8]) {
        while !dst.is_empty() {
            if self.buffer_pos >= BUFFER_SIZE {
                self.step();
            }
            let available = BUFFER_SIZE - self.buffer_pos;
            let take = available.min(dst.len());
            let (head, tail) = dst.split_at_mut(take);
            head.copy_from_slice(
                &self.buffer[self.buffer_pos..self.buffer_pos + take],
            );
            self.buffer_pos += take;
            dst = tail;
        }
    }
}

impl Drop for QrngState {
    fn drop(&mut self) {
        self.phase.zeroize();
        self.entangle.zeroize();
        self.quantum_state.zeroize();
        self.last_measurement.zeroize();
        self.buffer.zeroize();
        self.buffer_pos = 0;
        self.counter.zeroize();
        self.pool.zeroize();
        self.pool_index.zeroize();
        self.pool_mixer.zeroize();
        self.system_entropy.zeroize();
        self.unique_id.zeroize();
        self.runtime_entropy.zeroize();
        self.init_time_secs.zeroize();
        self.pid.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_zero_lanes() {
        let state = QrngState::new(Some(b"test-seed"));
        assert!(state.phase.iter().any(|&v| v != 0));
        assert!(state.entangle.iter().any(|&v| v != 0));
        assert!(state.last_measurement.iter().any(|&v| v != 0));
        for &v in &state.quantum_state {
            assert!(v.is_finite());
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn step_resets_buffer_position() {
        let mut state = QrngState::new(None);
        state.buffer_pos = BUFFER_SIZE;
        state.step();
        assert_eq!(state.buffer_pos, 0);
    }

    #[test]
    fn fill_from_buffer_spans_a_step_boundary() {
        let mut state = QrngState::new(Some(b"boundary"));
        let mut out = vec![0u8; BUFFER_SIZE + 1];
        state.fill_from_buffer(&mut out);
        // the call must have triggered exactly one extra step: buffer_pos
        // ends at 1 (one byte consumed from the fresh buffer).
        assert_eq!(state.buffer_pos, 1);
    }
}
