use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::Backend;
use ratatui::{backend::CrosstermBackend, Terminal as RatatuiTerminal};

/// Thin wrapper so the app only sees the operations it needs.
pub struct Terminal<B: Backend> {
    inner: RatatuiTerminal<B>,
}

impl<B: Backend> Terminal<B> {
    pub fn new(terminal: RatatuiTerminal<B>) -> Self {
        Self { inner: terminal }
    }

    pub fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.inner.draw(f).map(|_| ())
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        self.inner.backend()
    }
}

fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

/// Run `f` inside the alternate screen. The terminal is restored when `f`
/// returns, fails or panics.
pub fn with_terminal<F, R>(f: F) -> Result<R>
where
    F: FnOnce(Terminal<CrosstermBackend<Stdout>>) -> Result<R>,
{
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let result = with_panic_hook(
        || {
            let _ = restore();
        },
        || {
            RatatuiTerminal::new(CrosstermBackend::new(io::stdout()))
                .map_err(anyhow::Error::from)
                .and_then(|t| f(Terminal::new(t)))
        },
    );

    restore()?;
    result
}

/// Run `f` with `on_panic` called ahead of the current panic hook. The
/// previous hook is back in place once `f` returns.
fn with_panic_hook<R>(on_panic: impl Fn() + Send + Sync + 'static, f: impl FnOnce() -> R) -> R {
    let previous = Arc::new(std::panic::take_hook());
    let chained = Arc::clone(&previous);
    std::panic::set_hook(Box::new(move |info| {
        on_panic();
        (**chained)(info);
    }));

    let result = f();

    drop(std::panic::take_hook());
    std::panic::set_hook(Box::new(move |info| (**previous)(info)));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn panic_hook_only_runs_inside_scope() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let caught = with_panic_hook(
            || {
                CALLS.fetch_add(1, Ordering::SeqCst);
            },
            || {
                std::panic::catch_unwind(|| {
                    panic!("inside");
                })
                .is_err()
            },
        );
        assert!(caught);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);

        let _ = std::panic::catch_unwind(|| {
            panic!("after");
        });
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}
