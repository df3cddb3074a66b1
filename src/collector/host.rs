//! Host metrics of the machine running the console.
//!
//! Each probe keeps its own `sysinfo` handle so CPU usage is computed
//! against the previous refresh rather than from scratch.

use std::net::IpAddr;
use std::path::Path;

use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};

use super::traits::{CollectError, MetricSource};
use crate::model::{DiskUsage, MemoryUsage, Metric};

/// Mount point whose usage is reported.
const ROOT_MOUNT: &str = "/";

/// Global CPU usage.
pub struct CpuSource {
    system: System,
}

impl CpuSource {
    pub fn new() -> Self {
        let mut system = System::new_with_specifics(
            RefreshKind::new().with_cpu(CpuRefreshKind::new().with_cpu_usage()),
        );
        // Baseline for the first delta.
        system.refresh_cpu_usage();
        Self { system }
    }
}

impl Default for CpuSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for CpuSource {
    fn name(&self) -> &str {
        "cpu"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        self.system.refresh_cpu_usage();
        let usage = self.system.global_cpu_usage();
        if !usage.is_finite() {
            return Err(CollectError::Unavailable("cpu usage".to_string()));
        }
        Ok(Metric::Cpu(usage))
    }
}

/// Host memory usage.
pub struct MemorySource {
    system: System,
}

impl MemorySource {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new().with_memory(MemoryRefreshKind::new().with_ram()),
        );
        Self { system }
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        self.system.refresh_memory();
        memory_usage(self.system.used_memory(), self.system.total_memory()).map(Metric::Memory)
    }
}

fn memory_usage(used: u64, total: u64) -> Result<MemoryUsage, CollectError> {
    if total == 0 {
        return Err(CollectError::Unavailable("memory usage".to_string()));
    }
    Ok(MemoryUsage {
        used_percent: used as f64 / total as f64 * 100.0,
        total_bytes: total,
    })
}

/// Usage of the root filesystem, or the first disk if `/` is not mounted.
pub struct DiskSource {
    disks: Disks,
}

impl DiskSource {
    pub fn new() -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Default for DiskSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for DiskSource {
    fn name(&self) -> &str {
        "disk"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        self.disks.refresh();
        if self.disks.list().is_empty() {
            self.disks.refresh_list();
        }

        let root = Path::new(ROOT_MOUNT);
        let disk = self
            .disks
            .list()
            .iter()
            .find(|d| d.mount_point() == root)
            .or_else(|| self.disks.list().first())
            .ok_or_else(|| CollectError::Unavailable("disk usage".to_string()))?;

        disk_usage(disk.available_space(), disk.total_space()).map(Metric::Disk)
    }
}

fn disk_usage(available: u64, total: u64) -> Result<DiskUsage, CollectError> {
    if total == 0 {
        return Err(CollectError::Unavailable("disk usage".to_string()));
    }
    let used = total.saturating_sub(available);
    Ok(DiskUsage {
        free_bytes: available,
        used_percent: used as f64 / total as f64 * 100.0,
    })
}

/// Host name of the machine.
#[derive(Debug, Default)]
pub struct HostnameSource;

impl MetricSource for HostnameSource {
    fn name(&self) -> &str {
        "hostname"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        System::host_name()
            .filter(|name| !name.is_empty())
            .map(Metric::Hostname)
            .ok_or_else(|| CollectError::Unavailable("hostname".to_string()))
    }
}

/// First non-loopback IPv4 address of the host.
///
/// Interfaces are walked in name order so the pick is stable between
/// cycles. No route is needed, only an address on an interface.
pub struct IpAddressSource {
    networks: Networks,
}

impl IpAddressSource {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for IpAddressSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for IpAddressSource {
    fn name(&self) -> &str {
        "ip_address"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        // Addresses can change at runtime.
        self.networks.refresh_list();

        let mut interfaces: Vec<_> = self.networks.list().iter().collect();
        interfaces.sort_by(|(a, _), (b, _)| a.cmp(b));
        let addrs = interfaces
            .into_iter()
            .flat_map(|(_, data)| data.ip_networks().iter().map(|net| net.addr));

        first_usable_ipv4(addrs)
            .map(|ip| Metric::IpAddress(ip.to_string()))
            .ok_or_else(|| CollectError::Unavailable("local IP address".to_string()))
    }
}

fn usable_ipv4(ip: IpAddr) -> Option<IpAddr> {
    match ip {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(ip),
        _ => None,
    }
}

fn first_usable_ipv4(addrs: impl IntoIterator<Item = IpAddr>) -> Option<IpAddr> {
    addrs.into_iter().find_map(usable_ipv4)
}

/// All host probes, in panel order.
pub fn host_sources() -> Vec<Box<dyn MetricSource>> {
    vec![
        Box::new(HostnameSource),
        Box::new(IpAddressSource::new()),
        Box::new(MemorySource::new()),
        Box::new(CpuSource::new()),
        Box::new(DiskSource::new()),
    ]
}
