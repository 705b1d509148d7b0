/// An implementation of a time-varying hyperparameter value
///
/// Used to anneal the importance sampling exponent `beta` toward `1.0` over
/// the course of training.
pub trait Schedule {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

/// A constant value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constant {
    value: f32,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Schedule for Constant {
    fn evaluate(&self, _t: f32) -> f32 {
        self.value
    }
}

/// v(t) = v<sub>i</sub> + min(t / T, 1) * (v<sub>f</sub> - v<sub>i</sub>)
///
/// Interpolates linearly from `vi` to `vf` over `timesteps`, holding at `vf`
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    timesteps: f32,
    vi: f32,
    vf: f32,
}

impl Linear {
    pub fn new(timesteps: f32, vi: f32, vf: f32) -> Result<Self, String> {
        (timesteps > 0.0)
            .then_some(Self { timesteps, vi, vf })
            .ok_or_else(|| String::from("`timesteps` must be positive"))
    }
}

impl Schedule for Linear {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { timesteps, vi, vf } = self;
        vi + (t / timesteps).min(1.0) * (vf - vi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_schedule() {
        let x = Constant::new(0.4);
        assert_eq!(x.evaluate(0.0), 0.4);
        assert_eq!(x.evaluate(100.0), 0.4);
    }

    #[test]
    fn linear_schedule() {
        let x = Linear::new(100.0, 0.5, 1.0).unwrap();
        assert_eq!(x.evaluate(0.0), 0.5);
        assert_eq!(x.evaluate(50.0), 0.75);
        assert_eq!(x.evaluate(100.0), 1.0);
        assert_eq!(x.evaluate(500.0), 1.0, "holds the final value past the horizon");
    }

    #[test]
    fn linear_schedule_validates_horizon() {
        assert!(Linear::new(0.0, 0.5, 1.0).is_err());
        assert!(Linear::new(-1.0, 0.5, 1.0).is_err());
    }
}
