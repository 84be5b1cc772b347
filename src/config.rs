/*!
 * Kernel Configuration
 *
 * Compile-time defaults from `core::limits`, overridable through environment
 * variables at boot:
 * - KERNEL_NPROC: process table slots
 * - KERNEL_FG_QUOTA: consecutive foreground dispatches per background dispatch
 * - KERNEL_SCAN_PASSES: cursor scan bound, in full table passes
 * - KERNEL_PAGE_POOL: pages in the kernel page pool
 */

use crate::core::errors::KernelError;
use crate::core::limits::{
    CURSOR_SCAN_PASSES, DEFAULT_PAGE_POOL, FOREGROUND_QUOTA, MAX_PROCESSES, MIN_SCAN_PASSES,
};
use crate::core::types::KernelResult;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KernelConfig {
    pub max_processes: usize,
    pub foreground_quota: u32,
    pub scan_passes: u32,
    pub page_pool_pages: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_processes: MAX_PROCESSES,
            foreground_quota: FOREGROUND_QUOTA,
            scan_passes: CURSOR_SCAN_PASSES,
            page_pool_pages: DEFAULT_PAGE_POOL,
        }
    }
}

impl KernelConfig {
    /// Defaults with any `KERNEL_*` overrides applied, validated
    pub fn from_env() -> KernelResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> KernelResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            max_processes: parse_var(&lookup, "KERNEL_NPROC", defaults.max_processes)?,
            foreground_quota: parse_var(&lookup, "KERNEL_FG_QUOTA", defaults.foreground_quota)?,
            scan_passes: parse_var(&lookup, "KERNEL_SCAN_PASSES", defaults.scan_passes)?,
            page_pool_pages: parse_var(&lookup, "KERNEL_PAGE_POOL", defaults.page_pool_pages)?,
        };
        config.validate()?;
        Ok(config)
    }

    #[inline]
    #[must_use]
    pub fn with_max_processes(mut self, max_processes: usize) -> Self {
        self.max_processes = max_processes;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_foreground_quota(mut self, quota: u32) -> Self {
        self.foreground_quota = quota;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_scan_passes(mut self, passes: u32) -> Self {
        self.scan_passes = passes;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_page_pool(mut self, pages: usize) -> Self {
        self.page_pool_pages = pages;
        self
    }

    pub fn validate(&self) -> KernelResult<()> {
        if self.max_processes == 0 {
            return Err(KernelError::configuration(
                "max_processes must be at least 1",
            ));
        }
        // One pass from a cursor parked past the only candidate finds nothing
        if self.scan_passes < MIN_SCAN_PASSES {
            return Err(KernelError::configuration(format!(
                "scan_passes must be at least {}",
                MIN_SCAN_PASSES
            )));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> KernelResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            KernelError::configuration(format!("{}={:?} is not a valid number", key, raw))
        }),
    }
}
