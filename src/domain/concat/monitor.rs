use std::sync::Mutex;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Samples this process's resident memory between merge steps.
///
/// Diagnostic only for now; tier selection does not read it yet.
pub struct MemoryMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl MemoryMonitor {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| tracing::warn!(error = %e, "Memory sampling unavailable"))
            .ok();
        Self {
            system: Mutex::new(System::new()),
            pid,
        }
    }

    /// Log and return the current resident set size in MiB
    pub fn sample(&self, stage: &str) -> Option<f64> {
        let pid = self.pid?;
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let rss_mb = system.process(pid)?.memory() as f64 / (1024.0 * 1024.0);

        tracing::debug!(stage = stage, rss_mb = format!("{:.1}", rss_mb), "Memory sample");
        Some(rss_mb)
    }
}

impl Default for MemoryMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMonitor").field("pid", &self.pid).finish()
    }
}
