//! Wall-clock timer that also works on `wasm32`, where `std::time::Instant`
//! panics.

pub(crate) type Timer = actual::Timer;

#[cfg(not(target_arch = "wasm32"))]
mod actual {
    use std::time::Instant;

    #[derive(Clone, Copy)]
    pub struct Timer {
        start: Instant,
    }

    impl Timer {
        pub fn start() -> Self {
            Self {
                start: Instant::now(),
            }
        }

        pub fn elapsed_millis(&self) -> u128 {
            self.start.elapsed().as_millis()
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod actual {
    #[derive(Clone, Copy)]
    pub struct Timer {
        start: f64,
    }

    impl Timer {
        pub fn start() -> Self {
            Self { start: now() }
        }

        pub fn elapsed_millis(&self) -> u128 {
            (now() - self.start).max(0.0) as u128
        }
    }

    fn now() -> f64 {
        js_sys::Date::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_is_monotonic() {
        let timer = Timer::start();
        let first = timer.elapsed_millis();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.elapsed_millis() >= first.max(1));
    }
}
