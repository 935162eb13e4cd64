/*!
 * Kernel Configuration
 *
 * Process count from the command line, timing and resume policy from the
 * environment.
 */

use super::errors::ConfigError;
use super::limits::*;
use super::types::ResumePoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Resume point delivered for a captured syscall context at `resume_point = r`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumePolicy {
    /// Deliver `r + 1`: continue after the instruction that made the syscall
    #[default]
    SkipSyscall,
    /// Deliver `r`: execute the syscall instruction again
    Reexecute,
}

impl ResumePolicy {
    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "skip" | "skip_syscall" | "next" => Ok(Self::SkipSyscall),
            "reexecute" | "re-execute" | "repeat" => Ok(Self::Reexecute),
            _ => Err(ConfigError::InvalidResumePolicy(s.to_string())),
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SkipSyscall => "skip",
            Self::Reexecute => "reexecute",
        }
    }

    /// Offset to hand back to a process whose syscall was captured at `captured`
    #[inline]
    pub const fn apply(&self, captured: ResumePoint) -> ResumePoint {
        match self {
            Self::SkipSyscall => captured.saturating_add(1),
            Self::Reexecute => captured,
        }
    }
}

impl Serialize for ResumePolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResumePolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Validated kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    pub num_apps: usize,
    pub time_slice: Duration,
    pub io_duration: Duration,
    pub instruction_time: Duration,
    pub max_iterations: u32,
    pub resume_policy: ResumePolicy,
}

impl KernelConfig {
    pub fn builder(num_apps: usize) -> KernelConfigBuilder {
        KernelConfigBuilder::new(num_apps)
    }

    /// Load from process arguments (first argument is `num_apps`) and the
    /// `KERNEL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Load from explicit sources. `lookup` resolves environment keys.
    pub fn from_sources<F>(args: &[String], lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = args
            .first()
            .ok_or(ConfigError::MissingArgument("num_apps"))?;
        let num_apps = parse_number::<usize>("num_apps", raw)?;

        let mut builder = KernelConfigBuilder::new(num_apps);

        if let Some(ms) = lookup(ENV_TIME_SLICE_MS) {
            builder = builder.time_slice(parse_millis(ENV_TIME_SLICE_MS, &ms)?);
        }
        if let Some(ms) = lookup(ENV_IO_DURATION_MS) {
            builder = builder.io_duration(parse_millis(ENV_IO_DURATION_MS, &ms)?);
        }
        if let Some(ms) = lookup(ENV_INSTRUCTION_MS) {
            builder = builder.instruction_time(parse_millis(ENV_INSTRUCTION_MS, &ms)?);
        }
        if let Some(n) = lookup(ENV_MAX_ITERATIONS) {
            builder = builder.max_iterations(parse_number(ENV_MAX_ITERATIONS, &n)?);
        }
        if let Some(policy) = lookup(ENV_RESUME_POLICY) {
            builder = builder.resume_policy(ResumePolicy::parse(&policy)?);
        }

        builder.build()
    }
}

/// Builder for [`KernelConfig`]; `build` runs the same checks as `from_env`
#[derive(Debug, Clone)]
pub struct KernelConfigBuilder {
    config: KernelConfig,
}

impl KernelConfigBuilder {
    fn new(num_apps: usize) -> Self {
        Self {
            config: KernelConfig {
                num_apps,
                time_slice: DEFAULT_TIME_SLICE,
                io_duration: DEFAULT_IO_DURATION,
                instruction_time: DEFAULT_INSTRUCTION_TIME,
                max_iterations: DEFAULT_MAX_ITERATIONS,
                resume_policy: ResumePolicy::default(),
            },
        }
    }

    pub fn time_slice(mut self, time_slice: Duration) -> Self {
        self.config.time_slice = time_slice;
        self
    }

    pub fn io_duration(mut self, io_duration: Duration) -> Self {
        self.config.io_duration = io_duration;
        self
    }

    pub fn instruction_time(mut self, instruction_time: Duration) -> Self {
        self.config.instruction_time = instruction_time;
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn resume_policy(mut self, resume_policy: ResumePolicy) -> Self {
        self.config.resume_policy = resume_policy;
        self
    }

    pub fn build(self) -> Result<KernelConfig, ConfigError> {
        let config = self.config;

        if !(MIN_APPS..=MAX_APPS).contains(&config.num_apps) {
            return Err(ConfigError::InvalidProcessCount(config.num_apps));
        }
        for (name, duration) in [
            ("time_slice", config.time_slice),
            ("io_duration", config.io_duration),
            ("instruction_time", config.instruction_time),
        ] {
            if duration.is_zero() {
                return Err(ConfigError::InvalidDuration { name });
            }
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_string(),
    })
}

fn parse_millis(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let ms: u64 = parse_number(name, raw)?;
    if ms == 0 {
        return Err(ConfigError::InvalidDuration { name });
    }
    Ok(Duration::from_millis(ms))
}
