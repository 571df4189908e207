use serde::{Deserialize, Serialize};

/// Progress curve applied to an animation's normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Easing {
    Linear,
    QuadOut,
    #[default]
    CubicOut,
    CubicInOut,
}

impl Easing {
    /// Maps progress in `[0, 1]` onto the eased curve.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Engine-wide identifier handed back to callers of animated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(u64);

impl AnimationId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationStatus {
    Running,
    Finished,
}

/// Time-stepped interpolation of a single scalar.
///
/// Animations own no callbacks: the frame driver samples them with the
/// current clock and acts on the returned status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub id: AnimationId,
    pub from: f64,
    pub to: f64,
    pub started_at_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Animation {
    #[must_use]
    pub fn new(id: AnimationId, from: f64, to: f64, started_at_ms: f64, duration_ms: f64) -> Self {
        Self {
            id,
            from,
            to,
            started_at_ms,
            duration_ms,
            easing: Easing::default(),
        }
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Interpolated value at `now_ms` plus whether the animation has ended.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> (f64, AnimationStatus) {
        if self.duration_ms.is_nan() || self.duration_ms <= 0.0 {
            return (self.to, AnimationStatus::Finished);
        }
        let elapsed = now_ms - self.started_at_ms;
        if elapsed >= self.duration_ms {
            return (self.to, AnimationStatus::Finished);
        }
        let progress = self.easing.apply(elapsed.max(0.0) / self.duration_ms);
        (
            self.from + (self.to - self.from) * progress,
            AnimationStatus::Running,
        )
    }
}

/// Allocates monotonically increasing animation ids.
#[derive(Debug, Clone, Default)]
pub struct AnimationIds {
    next: u64,
}

impl AnimationIds {
    pub fn allocate(&mut self) -> AnimationId {
        self.next += 1;
        AnimationId::new(self.next)
    }
}
