//! Download progress for the terminal.
//!
//! On a TTY each model component gets an indicatif bar. Otherwise a status
//! line is printed whenever [`ProgressThrottle`] lets a sample through.

use std::collections::HashMap;
use std::io::IsTerminal;
use std::sync::{Mutex, PoisonError};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use lmbridge_core::{DownloadError, FetchProgress};
use lmbridge_download::{FetchObserver, ProgressThrottle, format_speed};

enum Render {
    Fancy {
        multi: MultiProgress,
        bars: HashMap<String, ProgressBar>,
    },
    Plain {
        throttles: HashMap<String, ProgressThrottle>,
    },
}

/// [`FetchObserver`] that draws download progress.
pub struct CliFetchObserver {
    render: Mutex<Render>,
}

impl CliFetchObserver {
    pub fn new() -> Self {
        if std::io::stdout().is_terminal() {
            Self::fancy()
        } else {
            Self::plain()
        }
    }

    fn fancy() -> Self {
        Self {
            render: Mutex::new(Render::Fancy {
                multi: MultiProgress::with_draw_target(ProgressDrawTarget::stdout()),
                bars: HashMap::new(),
            }),
        }
    }

    pub fn plain() -> Self {
        Self {
            render: Mutex::new(Render::Plain {
                throttles: HashMap::new(),
            }),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:40} {bar:30.cyan/blue} {pos:>3}% {prefix}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    /// Clear every bar.
    pub fn finish(&self) {
        let mut render = self.render.lock().unwrap_or_else(PoisonError::into_inner);
        if let Render::Fancy { bars, .. } = &mut *render {
            for (_, bar) in bars.drain() {
                bar.finish_and_clear();
            }
        }
    }
}

impl Default for CliFetchObserver {
    fn default() -> Self {
        Self::new()
    }
}

/// Status line in the same shape as the bar's message.
fn status_line(model_id: &str, progress: &FetchProgress) -> String {
    format!(
        "Download {model_id}: {}% ({})",
        progress.percentage,
        format_speed(progress.throughput_kbps)
    )
}

impl FetchObserver for CliFetchObserver {
    fn on_host_attempt(&self, model_id: &str, host: &str) {
        let mut render = self.render.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *render {
            Render::Fancy { multi, bars } => {
                let bar = bars.entry(model_id.to_string()).or_insert_with(|| {
                    let bar = multi.add(ProgressBar::new(100));
                    bar.set_style(Self::bar_style());
                    bar.set_message(model_id.to_string());
                    bar
                });
                bar.set_position(0);
                bar.set_prefix(host.to_string());
            }
            Render::Plain { throttles } => {
                throttles.entry(model_id.to_string()).or_default().reset();
                println!("Download {model_id} from {host}");
            }
        }
    }

    fn on_progress(&self, model_id: &str, progress: FetchProgress) {
        let mut render = self.render.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *render {
            Render::Fancy { bars, .. } => {
                if let Some(bar) = bars.get(model_id) {
                    bar.set_position(u64::from(progress.percentage));
                    bar.set_prefix(format_speed(progress.throughput_kbps));
                }
            }
            Render::Plain { throttles } => {
                let throttle = throttles.entry(model_id.to_string()).or_default();
                if throttle.should_emit(&progress) || progress.is_complete() {
                    println!("{}", status_line(model_id, &progress));
                }
            }
        }
    }

    fn on_host_failed(&self, model_id: &str, host: &str, error: &DownloadError) {
        let render = self.render.lock().unwrap_or_else(PoisonError::into_inner);
        let line = format!("Failed to download {model_id} from {host}: {error}");
        match &*render {
            Render::Fancy { multi, .. } => {
                let _ = multi.println(line);
            }
            Render::Plain { .. } => eprintln!("{line}"),
        }
    }
}
