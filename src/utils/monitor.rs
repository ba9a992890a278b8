#[cfg(feature = "cli")]
use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

/// Resource usage of this process at one pipeline stage.
#[derive(Debug, Clone)]
pub struct StageStats {
    pub cpu_percent: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
struct ProcessSampler {
    system: System,
    pid: Pid,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
impl ProcessSampler {
    fn for_current_process() -> Option<Self> {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                tracing::warn!("Could not determine current PID, monitoring disabled: {}", e);
                return None;
            }
        };
        // 只追蹤本程序的 CPU 與記憶體
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_processes(Self::process_kind()),
        );
        Some(Self {
            system,
            pid,
            peak_memory_mb: 0,
        })
    }

    fn process_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::nothing().with_cpu().with_memory()
    }

    fn sample(&mut self) -> Option<(f32, u64)> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            Self::process_kind(),
        );
        let process = self.system.process(self.pid)?;
        let memory_mb = process.memory() / 1024 / 1024;
        self.peak_memory_mb = self.peak_memory_mb.max(memory_mb);
        Some((process.cpu_usage(), memory_mb))
    }
}

/// Logs CPU and memory per stage when `--monitor` is on. A disabled monitor
/// never touches sysinfo.
pub struct SystemMonitor {
    #[cfg_attr(not(feature = "cli"), allow(dead_code))]
    started: Instant,
    #[cfg(feature = "cli")]
    sampler: Option<Mutex<ProcessSampler>>,
}

impl SystemMonitor {
    #[cfg(feature = "cli")]
    pub fn new(enabled: bool) -> Self {
        let sampler = if enabled {
            ProcessSampler::for_current_process().map(Mutex::new)
        } else {
            None
        };
        Self {
            started: Instant::now(),
            sampler,
        }
    }

    // 沒有 sysinfo 時永遠停用
    #[cfg(not(feature = "cli"))]
    pub fn new(_enabled: bool) -> Self {
        Self {
            started: Instant::now(),
        }
    }

    #[cfg(feature = "cli")]
    pub fn get_stats(&self) -> Option<StageStats> {
        let mut sampler = self.sampler.as_ref()?.lock().ok()?;
        let (cpu_percent, memory_mb) = sampler.sample()?;
        Some(StageStats {
            cpu_percent,
            memory_mb,
            peak_memory_mb: sampler.peak_memory_mb,
            elapsed: self.started.elapsed(),
        })
    }

    #[cfg(not(feature = "cli"))]
    pub fn get_stats(&self) -> Option<StageStats> {
        None
    }

    pub fn log_stats(&self, stage: &str) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                stage,
                stats.cpu_percent,
                stats.memory_mb,
                stats.peak_memory_mb,
                stats.elapsed
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 Run finished in {:?}, peak memory {}MB",
                stats.elapsed,
                stats.peak_memory_mb
            );
        }
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
