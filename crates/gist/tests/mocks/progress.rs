use std::sync::{Arc, Mutex};

use gist::sink::ProgressSink;

#[derive(Clone, Default)]
pub struct MockProgress {
    pub reports: Arc<Mutex<Vec<f64>>>,
    pub finishes: Arc<Mutex<usize>>,
}

impl ProgressSink for MockProgress {
    fn report(&mut self, percent: f64) {
        self.reports.lock().unwrap().push(percent);
    }

    fn finish(&mut self) {
        *self.finishes.lock().unwrap() += 1;
    }
}
