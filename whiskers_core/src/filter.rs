//! Single-pole low-pass filter (signal conditioner).

/// `y = alpha * x + (1 - alpha) * y_prev`, seeded with the first input.
#[derive(Debug, Clone)]
pub struct LowPass {
    alpha: f32,
    prev: Option<f32>,
}

impl LowPass {
    /// `alpha` is clamped into (0.0, 1.0]; non-finite values pass the input through.
    pub fn new(alpha: f32) -> Self {
        let alpha = if alpha.is_finite() && alpha > 0.0 {
            alpha.min(1.0)
        } else {
            1.0
        };
        Self { alpha, prev: None }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Last output, if any input has been seen.
    pub fn value(&self) -> Option<f32> {
        self.prev
    }

    /// Feed one reading and return the smoothed value. Non-finite readings
    /// are ignored and the previous output (or 0.0) is returned.
    pub fn input(&mut self, raw: f32) -> f32 {
        if !raw.is_finite() {
            return self.prev.unwrap_or(0.0);
        }
        let y = match self.prev {
            None => raw,
            Some(prev) => self.alpha * raw + (1.0 - self.alpha) * prev,
        };
        self.prev = Some(y);
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_input_seeds_the_output() {
        let mut f = LowPass::new(0.1);
        assert_eq!(f.value(), None);
        assert_eq!(f.input(1234.0), 1234.0);
        assert_eq!(f.value(), Some(1234.0));
    }

    #[test]
    fn step_response_follows_alpha() {
        let mut f = LowPass::new(0.5);
        f.input(0.0);
        assert_eq!(f.input(100.0), 50.0);
        assert_eq!(f.input(100.0), 75.0);
    }

    #[test]
    fn out_of_range_alpha_is_clamped() {
        assert_eq!(LowPass::new(2.0).alpha(), 1.0);
        assert_eq!(LowPass::new(0.0).alpha(), 1.0);
        assert_eq!(LowPass::new(f32::NAN).alpha(), 1.0);
    }

    #[test]
    fn non_finite_reading_is_ignored() {
        let mut f = LowPass::new(0.3);
        assert_eq!(f.input(f32::NAN), 0.0);
        f.input(10.0);
        assert_eq!(f.input(f32::INFINITY), 10.0);
        assert_eq!(f.value(), Some(10.0));
    }

    #[test]
    fn constant_input_converges() {
        let mut f = LowPass::new(0.2);
        f.input(0.0);
        let mut y = 0.0;
        for _ in 0..200 {
            y = f.input(42.0);
        }
        assert!((y - 42.0).abs() < 1e-3, "{y}");
    }
}
