use cliclack::{ProgressBar, Theme};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Braille frames, the last one is shown once the bar finishes
const FRAMES: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏⠿";
const ACTIONS: [&str; 8] = [
    "🔍 Pinging",
    "📡 Scanning",
    "🌐 Connecting",
    "⚡ Analyzing",
    "🔧 Configuring",
    "📊 Measuring",
    "🎯 Targeting",
    "🚀 Processing",
];
const ACTION_PERIOD: Duration = Duration::from_millis(1500);

/// The default cliclack theme with braille spinner frames
pub struct SpinnerTheme;

impl Theme for SpinnerTheme {
    fn spinner_chars(&self) -> String {
        FRAMES.to_string()
    }
}

/// The action word shown during the `step`th period
pub fn action(step: usize) -> String {
    format!("{}...", ACTIONS[step % ACTIONS.len()])
}

/// A cliclack spinner whose action word rotates until stopped
pub struct Spinner {
    bar: ProgressBar,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Spinner {
    pub fn start() -> Self {
        let bar = cliclack::spinner();
        bar.start(action(0));

        let (stop, mut stopped) = watch::channel(false);
        let rotating = bar.clone();
        let handle = tokio::spawn(async move {
            let mut step = 0;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(ACTION_PERIOD) => {
                        step += 1;
                        rotating.set_message(action(step));
                    }
                    _ = stopped.changed() => break,
                }
            }
        });

        Self { bar, stop, handle }
    }

    /// Stop rotating and clear the spinner line
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.handle.await {
            tracing::debug!(error = %e, "spinner task ended abnormally");
        }
        self.bar.clear();
    }
}
