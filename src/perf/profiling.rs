/// Instrumentation for the frame pipeline
/// Call counters are plain atomics; the `count_call!`/`count_add!` macros
/// compile to nothing unless the `profiling` feature is enabled.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for the geometry, raster and world stages
pub struct FunctionCounters {
    // World
    pub mesh_rebuild_calls: AtomicU64,
    pub faces_emitted: AtomicU64,
    pub raycast_steps: AtomicU64,

    // Geometry pipeline
    pub triangles_submitted: AtomicU64,
    pub triangles_frustum_culled: AtomicU64,
    pub triangles_backface_culled: AtomicU64,
    pub triangles_near_clipped: AtomicU64,
    pub triangles_dropped: AtomicU64,

    // Rasterizer
    pub triangles_rasterized: AtomicU64,
    pub pixels_tested: AtomicU64,
    pub depth_passed: AtomicU64,
    pub depth_failed: AtomicU64,

    // Framebuffer
    pub framebuffer_clear_calls: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            mesh_rebuild_calls: AtomicU64::new(0),
            faces_emitted: AtomicU64::new(0),
            raycast_steps: AtomicU64::new(0),
            triangles_submitted: AtomicU64::new(0),
            triangles_frustum_culled: AtomicU64::new(0),
            triangles_backface_culled: AtomicU64::new(0),
            triangles_near_clipped: AtomicU64::new(0),
            triangles_dropped: AtomicU64::new(0),
            triangles_rasterized: AtomicU64::new(0),
            pixels_tested: AtomicU64::new(0),
            depth_passed: AtomicU64::new(0),
            depth_failed: AtomicU64::new(0),
            framebuffer_clear_calls: AtomicU64::new(0),
        }
    }

    fn all(&self) -> [&AtomicU64; 13] {
        [
            &self.mesh_rebuild_calls,
            &self.faces_emitted,
            &self.raycast_steps,
            &self.triangles_submitted,
            &self.triangles_frustum_culled,
            &self.triangles_backface_culled,
            &self.triangles_near_clipped,
            &self.triangles_dropped,
            &self.triangles_rasterized,
            &self.pixels_tested,
            &self.depth_passed,
            &self.depth_failed,
            &self.framebuffer_clear_calls,
        ]
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CounterSnapshot {
            mesh_rebuild_calls: load(&self.mesh_rebuild_calls),
            faces_emitted: load(&self.faces_emitted),
            raycast_steps: load(&self.raycast_steps),
            triangles_submitted: load(&self.triangles_submitted),
            triangles_frustum_culled: load(&self.triangles_frustum_culled),
            triangles_backface_culled: load(&self.triangles_backface_culled),
            triangles_near_clipped: load(&self.triangles_near_clipped),
            triangles_dropped: load(&self.triangles_dropped),
            triangles_rasterized: load(&self.triangles_rasterized),
            pixels_tested: load(&self.pixels_tested),
            depth_passed: load(&self.depth_passed),
            depth_failed: load(&self.depth_failed),
            framebuffer_clear_calls: load(&self.framebuffer_clear_calls),
        }
    }
}

impl Default for FunctionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub mesh_rebuild_calls: u64,
    pub faces_emitted: u64,
    pub raycast_steps: u64,
    pub triangles_submitted: u64,
    pub triangles_frustum_culled: u64,
    pub triangles_backface_culled: u64,
    pub triangles_near_clipped: u64,
    pub triangles_dropped: u64,
    pub triangles_rasterized: u64,
    pub pixels_tested: u64,
    pub depth_passed: u64,
    pub depth_failed: u64,
    pub framebuffer_clear_calls: u64,
}

impl CounterSnapshot {
    /// Fraction of depth tests that passed, if any were made.
    pub fn depth_pass_rate(&self) -> Option<f64> {
        (self.pixels_tested > 0).then(|| self.depth_passed as f64 / self.pixels_tested as f64)
    }

    /// Emit the report through `tracing` at info level.
    pub fn log_report(&self) {
        tracing::info!("{self}");
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Performance Counters Report ===")?;
        writeln!(f, "World:")?;
        writeln!(f, "  mesh rebuilds:            {:12}", self.mesh_rebuild_calls)?;
        writeln!(f, "  faces emitted:            {:12}", self.faces_emitted)?;
        writeln!(f, "  raycast steps:            {:12}", self.raycast_steps)?;
        writeln!(f, "Geometry:")?;
        writeln!(f, "  triangles submitted:      {:12}", self.triangles_submitted)?;
        writeln!(f, "  frustum culled:           {:12}", self.triangles_frustum_culled)?;
        writeln!(f, "  backface culled:          {:12}", self.triangles_backface_culled)?;
        writeln!(f, "  near clipped:             {:12}", self.triangles_near_clipped)?;
        writeln!(f, "  dropped:                  {:12}", self.triangles_dropped)?;
        writeln!(f, "Raster:")?;
        writeln!(f, "  triangles rasterized:     {:12}", self.triangles_rasterized)?;
        writeln!(f, "  pixels tested:            {:12}", self.pixels_tested)?;
        writeln!(f, "  depth passed:             {:12}", self.depth_passed)?;
        writeln!(f, "  depth failed:             {:12}", self.depth_failed)?;
        if let Some(rate) = self.depth_pass_rate() {
            writeln!(f, "  depth pass rate:          {:11.2}%", rate * 100.0)?;
        }
        write!(f, "  framebuffer clears:       {:12}", self.framebuffer_clear_calls)
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value as u64, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_and_reset_are_consistent() {
        let counters = FunctionCounters::new();
        counters.pixels_tested.fetch_add(4, Ordering::Relaxed);
        counters.depth_passed.fetch_add(3, Ordering::Relaxed);
        let snap = counters.snapshot();
        assert_eq!(snap.pixels_tested, 4);
        assert_eq!(snap.depth_pass_rate(), Some(0.75));
        assert!(snap.to_string().contains("depth pass rate"));

        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
        assert_eq!(CounterSnapshot::default().depth_pass_rate(), None);
    }
}
