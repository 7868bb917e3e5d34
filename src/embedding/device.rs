use std::str::FromStr;

use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Which device the caller wants the model placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// First compiled GPU backend that initializes, else CPU.
    #[default]
    Auto,
    /// Always CPU, even when a GPU backend is compiled in.
    Cpu,
}

impl FromStr for DevicePreference {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            other => Err(EmbeddingError::InvalidConfig {
                reason: format!("unknown device preference '{other}' (expected auto or cpu)"),
            }),
        }
    }
}

/// Short name of a device for structured logs.
pub fn device_label(device: &Device) -> &'static str {
    match device {
        Device::Cpu => "cpu",
        Device::Cuda(_) => "cuda",
        Device::Metal(_) => "metal",
    }
}

/// Selects the device the siamese model trains on.
///
/// GPU backends are only attempted when compiled in via the `metal` / `cuda` features;
/// every failure is logged and the selection falls back to CPU.
pub fn select_device(preference: DevicePreference) -> Result<Device, EmbeddingError> {
    if preference == DevicePreference::Cpu {
        debug!("CPU device requested explicitly");
        return Ok(Device::Cpu);
    }

    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            info!(device = "metal", "Selected GPU device");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "Metal device unavailable");
            failures.push(format!("metal failed: {e}"));
        }
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            info!(device = "cuda", "Selected GPU device");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "CUDA device unavailable");
            failures.push(format!("cuda failed: {e}"));
        }
    }

    let reason = if !cfg!(any(feature = "metal", feature = "cuda")) {
        "no GPU backend compiled".to_string()
    } else if failures.is_empty() {
        "no GPU device available".to_string()
    } else {
        std::mem::take(&mut failures).join("; ")
    };

    if cfg!(any(feature = "metal", feature = "cuda")) {
        warn!(reason = %reason, "Falling back to CPU device");
    } else {
        info!(reason = %reason, "Using CPU device");
    }
    Ok(Device::Cpu)
}
