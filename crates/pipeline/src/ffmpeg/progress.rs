//! Parsing of `ffmpeg -progress` key/value output.

/// Latest state reported on ffmpeg's progress pipe.
#[derive(Debug, Default)]
pub(crate) struct ProgressState {
    pub out_time_secs: f64,
    pub complete: bool,
}

impl ProgressState {
    pub fn update(&mut self, key: &str, value: &str) {
        match key {
            // Despite the name, ffmpeg reports microseconds here too.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.trim().parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value.trim() == "end";
            }
            _ => {}
        }
    }

    /// Feed one line; returns true when the line closes a progress block.
    pub fn update_line(&mut self, line: &str) -> bool {
        let Some((key, value)) = line.trim().split_once('=') else {
            return false;
        };
        self.update(key, value);
        key == "progress"
    }

    /// Fraction of `expected_secs` rendered, in `[0.0, 1.0]`.
    pub fn fraction(&self, expected_secs: f64) -> f64 {
        if self.complete {
            return 1.0;
        }
        if expected_secs <= 0.0 {
            return 0.0;
        }
        (self.out_time_secs / expected_secs).clamp(0.0, 1.0)
    }
}
