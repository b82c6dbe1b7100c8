//! Host-entropy collection.
//!
//! Every contribution here is best-effort and XOR-folded into the result;
//! a missing source (no cycle counter on non-x86 hosts, a clock read that
//! fails) simply drops out rather than producing an error.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::mixers::hadamard_mix;

/// Wall-clock seconds and sub-second microseconds since the Unix epoch.
/// Returns `(0, 0)` if the host clock is unavailable or before the epoch.
fn wall_clock_pair() -> (u64, u64) {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => (d.as_secs(), d.subsec_micros() as u64),
        Err(_) => (0, 0),
    }
}

/// Best-effort CPU cycle counter. Zero on architectures without one.
fn cycle_counter() -> u64 {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        core::arch::x86_64::_rdtsc()
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        0
    }
}

/// Address of a stack-local variable, reinterpreted as an integer.
///
/// Varies across runs due to ASLR and stack layout; used only as an
/// entropy contribution, never dereferenced after capture.
fn stack_address() -> u64 {
    let local = 0u8;
    std::ptr::addr_of!(local) as usize as u64
}

/// Wall-clock seconds since the Unix epoch, for the read-only init-time field.
pub(crate) fn now_secs() -> u64 {
    wall_clock_pair().0
}

/// One-shot snapshot folded together at `init` time: wall-clock time,
/// the process id shifted into the high half, a CPU-local clock reading,
/// a stack address, and a cycle-counter reading where available.
pub(crate) fn system_entropy_snapshot(pid: u32, cpu_local_clock: u64) -> u64 {
    let (secs, micros) = wall_clock_pair();
    let mut e = secs ^ micros;
    e ^= (pid as u64) << 32;
    e ^= cpu_local_clock;
    e ^= stack_address();
    e ^= cycle_counter();
    e
}

/// A monotonic-ish reading distinct from the wall clock, used as one of the
/// inputs folded into the system entropy snapshot at init.
pub(crate) fn cpu_local_clock_reading() -> u64 {
    use std::time::Instant;
    // Relative to an arbitrary fixed point; only its variability matters.
    let now = Instant::now();
    let epoch = Instant::now();
    epoch.saturating_duration_since(now).as_nanos() as u64 ^ cycle_counter()
}

/// Recomputed at the top of every `step` and every `measure_state` sub-step;
/// the sole source of per-call non-reproducibility.
pub(crate) fn runtime_entropy(
    system_entropy: u64,
    unique_id: u64,
    counter: u64,
) -> u64 {
    let (secs, micros) = wall_clock_pair();
    let t = (secs << 32) | micros;
    hadamard_mix(t ^ system_entropy ^ unique_id ^ counter)
}
