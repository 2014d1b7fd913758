/// Tracks a batch of outstanding loads and logs start, progress and completion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadingManager {
    total: usize,
    finished: usize,
    failed: usize,
}

impl LoadingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_start(&mut self, path: &str) {
        if self.is_idle() {
            tracing::info!(path, "loading started");
        }
        self.total += 1;
    }

    pub fn item_end(&mut self, path: &str) {
        self.finished += 1;
        let progress = format!("{:.0}%", self.progress() * 100.0);
        tracing::info!(path, %progress, "loading progress");
        self.check_done();
    }

    pub fn item_error(&mut self, path: &str) {
        self.failed += 1;
        self.finished += 1;
        tracing::error!(path, "loading error");
        self.check_done();
    }

    fn check_done(&self) {
        if self.is_idle() {
            tracing::info!(items = self.total, failed = self.failed, "loading finished");
        }
    }

    /// Fraction of requested items that have completed, 1.0 when nothing was requested.
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.finished as f32 / self.total as f32
        }
    }

    pub fn is_idle(&self) -> bool {
        self.finished == self.total
    }

    pub fn pending(&self) -> usize {
        self.total - self.finished
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_counts_successes_and_failures() {
        let mut m = LoadingManager::new();
        assert!(m.is_idle());
        assert_eq!(m.progress(), 1.0);
        m.item_start("a.png");
        m.item_start("b.png");
        m.item_start("c.png");
        m.item_start("d.png");
        assert_eq!(m.pending(), 4);
        m.item_end("a.png");
        assert_eq!(m.progress(), 0.25);
        m.item_error("b.png");
        assert_eq!(m.progress(), 0.5);
        m.item_end("c.png");
        m.item_end("d.png");
        assert!(m.is_idle());
        assert_eq!(m.failed(), 1);
    }
}
