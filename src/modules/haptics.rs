// Haptic feedback sink. Implementations talk to the platform; failures are ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

pub trait Haptics: Send + Sync {
    fn impact(&self, style: ImpactStyle) -> anyhow::Result<()>;
}

/// Used when the host has no haptics engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn impact(&self, _style: ImpactStyle) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) fn fire(haptics: &dyn Haptics, style: ImpactStyle) {
    if let Err(e) = haptics.impact(style) {
        log::trace!("[Haptics] {:?} impact failed: {}", style, e);
    }
}
