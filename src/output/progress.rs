use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_yellow};

/// Progress tracking for the two report phases
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_fetch() -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        let pb = create_spinner(
            bright_yellow("Phase 1/2: Fetching issues and board events").to_string(),
        );
        Self { pb }
    }

    pub fn finish_fetch_start_compute(self) -> Self {
        self.pb.finish_with_message(
            bright_green("Phase 1/2: Fetched issues and board events ✓").to_string(),
        );
        let pb = create_spinner(bright_yellow("Phase 2/2: Computing weekly metrics").to_string());
        Self { pb }
    }

    pub fn finish(self) {
        self.pb
            .finish_with_message(bright_green("Phase 2/2: Weekly metrics computed ✓").to_string());
        eprintln!("\n");
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
