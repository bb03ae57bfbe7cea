//! Pulsing user-location indicator, bound to engine lifetime.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Smallest pulse radius in meters.
pub const PULSE_MIN_RADIUS: f64 = 50.0;

/// Largest pulse radius in meters.
pub const PULSE_MAX_RADIUS: f64 = 100.0;

/// Radius change per tick in meters.
pub const PULSE_STEP: f64 = 3.0;

/// Tick interval.
pub const PULSE_TICK: Duration = Duration::from_millis(50);

/// Receives the pulse radius on every animation tick.
pub type PulseSink = Arc<dyn Fn(f64) + Send + Sync>;

/// Animates the user-location circle radius between 50 and 100 meters.
///
/// The animation task is owned: dropping the pulse aborts it, so the
/// indicator can never outlive the session that started it.
pub struct UserLocationPulse {
    task: JoinHandle<()>,
}

impl UserLocationPulse {
    /// Starts the animation, delivering each tick's radius to `sink`.
    #[must_use]
    pub fn start(sink: PulseSink) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(PULSE_TICK);
            let mut radius = PULSE_MIN_RADIUS;
            let mut growing = true;
            loop {
                interval.tick().await;
                if growing {
                    radius += PULSE_STEP;
                    if radius >= PULSE_MAX_RADIUS {
                        growing = false;
                    }
                } else {
                    radius -= PULSE_STEP;
                    if radius <= PULSE_MIN_RADIUS {
                        growing = true;
                    }
                }
                (*sink)(radius);
            }
        });
        Self { task }
    }
}

impl Drop for UserLocationPulse {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn radius_oscillates_within_bounds() {
        let radii: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let radii = Arc::clone(&radii);
            Arc::new(move |radius: f64| radii.lock().unwrap().push(radius))
        };

        let pulse = UserLocationPulse::start(sink);
        // Run long enough to cross the peak and come back down.
        tokio::time::sleep(Duration::from_millis(50 * 40)).await;
        drop(pulse);

        let seen = radii.lock().unwrap().clone();
        assert!(seen.len() >= 30, "expected many ticks, got {}", seen.len());
        let max = seen.iter().copied().fold(f64::MIN, f64::max);
        let min = seen.iter().copied().fold(f64::MAX, f64::min);
        assert!(max <= PULSE_MAX_RADIUS + PULSE_STEP);
        assert!(min >= PULSE_MIN_RADIUS);
        // Both directions observed.
        assert!(seen.windows(2).any(|w| w[1] > w[0]));
        assert!(seen.windows(2).any(|w| w[1] < w[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_ticking() {
        let radii: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let radii = Arc::clone(&radii);
            Arc::new(move |radius: f64| radii.lock().unwrap().push(radius))
        };

        let pulse = UserLocationPulse::start(sink);
        tokio::time::sleep(Duration::from_millis(200)).await;
        drop(pulse);
        let ticks_at_drop = radii.lock().unwrap().len();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(radii.lock().unwrap().len(), ticks_at_drop);
    }
}
