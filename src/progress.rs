// src/progress.rs
/// Lightweight progress reporting used by the long-running stages.
/// The CLI implements this to surface status to users; tests pass `NullProgress`.
pub trait Progress {
    /// Called at the start with the number of items (if known).
    fn begin(&mut self, _stage: &str, _total: Option<u64>) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one source key is fully processed.
    fn item_done(&mut self, _key: &str) {}

    /// Called at the end of a stage.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Prints to stdout; what the operator watches during a run.
#[derive(Default)]
pub struct ConsoleProgress {
    done: u64,
    total: Option<u64>,
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, stage: &str, total: Option<u64>) {
        self.done = 0;
        self.total = total;
        match total {
            Some(n) => println!("== {stage}: {n} to process"),
            None => println!("== {stage}"),
        }
    }

    fn log(&mut self, msg: &str) {
        println!("{msg}");
    }

    fn item_done(&mut self, _key: &str) {
        self.done += 1;
    }

    fn finish(&mut self) {
        match self.total {
            Some(n) => println!("== done ({}/{n})", self.done),
            None => println!("== done ({})", self.done),
        }
    }
}
