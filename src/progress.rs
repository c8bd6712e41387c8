use indicatif::{ProgressBar, ProgressStyle};

/// Progress over a fixed number of sequential steps
pub struct Progress {
    pb: ProgressBar,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        Self { pb }
    }

    pub fn start_step(&self, name: &str) {
        self.pb.set_message(name.to_string());
    }

    /// Print a line without tearing the bar
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.pb.is_hidden() {
            println!("{}", msg.as_ref());
        } else {
            self.pb.println(msg);
        }
    }

    /// Run `f` with the bar hidden so child processes can write to the terminal
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.pb.suspend(f)
    }

    pub fn finish_step(&self) {
        self.pb.inc(1);
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
