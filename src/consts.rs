//! Fixed parameters and magic constants for the mixing engine.
//!
//! Values are pinned by the design; renaming is free, changing a value is not.

/// Number of parallel state lanes.
pub(crate) const NUM_QUBITS: usize = 8;
/// Multiplier used to size the refill buffer relative to `NUM_QUBITS`.
pub(crate) const STATE_MULTIPLIER: usize = 16;
/// Size in bytes of the refill buffer (also 16 u64 words).
pub(crate) const BUFFER_SIZE: usize = NUM_QUBITS * STATE_MULTIPLIER;
/// Number of outer mixing rounds performed per `step`.
pub(crate) const MIXING_ROUNDS: usize = 4;
/// Number of entropy pool slots.
pub(crate) const POOL_SIZE: usize = 16;

pub(crate) const FINE_STRUCTURE: u64 = 0x7297_3527_4377_6A1B;
pub(crate) const PLANCK: u64 = 0x6955_9270_8649_5225;
pub(crate) const RYDBERG: u64 = 0x9E37_79B9_7F4A_7C15;
pub(crate) const ELECTRON_G: u64 = 0x02B9_92DD_FA23_2945;
pub(crate) const GOLDEN_RATIO: u64 = 0x9E37_79B9_7F4A_7C15;
pub(crate) const HEISENBERG: u64 = 0xC13F_A9A9_02A6_328F;
pub(crate) const SCHRODINGER: u64 = 0x91E1_0DA5_C79E_7B1D;
pub(crate) const PAULI_X: u64 = 0x4C95_7F2D_8A1E_6B3C;
pub(crate) const PAULI_Y: u64 = 0xD3E9_9E3B_6C1A_4F78;
pub(crate) const PAULI_Z: u64 = 0x8F14_2FC0_7892_A5B6;

pub(crate) const SPLITMIX_GAMMA_1: u64 = 0xBF58_476D_1CE4_E5B9;
pub(crate) const SPLITMIX_GAMMA_2: u64 = 0x94D0_49BB_1331_11EB;
