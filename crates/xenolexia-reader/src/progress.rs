/// Drops progress reports that moved less than `step` percent.
///
/// The 0 and 100 boundaries always go through once reached.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    step: f32,
    last: Option<f32>,
}

impl ProgressThrottle {
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(0.0),
            last: None,
        }
    }

    /// The value to forward, or `None` when the report is swallowed
    pub fn report(&mut self, percent: f32) -> Option<f32> {
        if percent.is_nan() {
            return None;
        }
        let percent = percent.clamp(0.0, 100.0);

        let emit = match self.last {
            None => true,
            Some(last) if last == percent => false,
            Some(last) => {
                (percent - last).abs() >= self.step || percent == 0.0 || percent == 100.0
            }
        };

        if emit {
            self.last = Some(percent);
            Some(percent)
        } else {
            None
        }
    }

    pub fn last(&self) -> Option<f32> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
