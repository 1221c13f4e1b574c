use std::io::Write;
use std::thread;
use std::time::Duration;

const FRAMES_PER_SECOND: u32 = 10;

/// Rotating `[/\_____] waiting...` banner shown while sleeping between
/// connection attempts. Draws on stderr and erases itself with backspaces.
#[derive(Debug, Clone)]
pub struct Spinner {
    pattern: Vec<char>,
    visible: bool,
}

impl Spinner {
    pub fn new(visible: bool) -> Self {
        Self {
            pattern: "/\\______".chars().collect(),
            visible,
        }
    }

    /// A spinner that only sleeps
    pub fn hidden() -> Self {
        Self::new(false)
    }

    /// Text of the current frame
    pub fn frame(&self) -> String {
        let shown: String = self.pattern[..self.pattern.len() - 1].iter().collect();
        format!("[{shown}] waiting... ")
    }

    fn advance(&mut self) {
        self.pattern.rotate_right(1);
    }

    /// Block for `duration`, redrawing the banner as it goes
    pub fn wait(&mut self, duration: Duration) {
        if !self.visible || duration.is_zero() {
            thread::sleep(duration);
            return;
        }

        let tick = Duration::from_secs(1) / FRAMES_PER_SECOND;
        let mut remaining = duration;
        let mut stderr = std::io::stderr();
        while !remaining.is_zero() {
            let text = self.frame();
            let _ = write!(stderr, "{text}");
            let _ = stderr.flush();

            let step = remaining.min(tick);
            thread::sleep(step);
            remaining -= step;

            self.advance();
            let _ = write!(stderr, "{}", "\u{8}".repeat(text.chars().count()));
        }
        let _ = stderr.flush();
    }
}
