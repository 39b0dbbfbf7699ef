// ~/vbkontrol/src/plugin/dialog.rs
// Host UI surface used by the interactive controller.

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::{
    paths::translate_path,
    plugin::menu::ListItem,
    warn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// Blocking dialogs. `None` / `false` mean the user cancelled.
pub trait Dialog {
    fn select(&mut self, heading: &str, options: &[String]) -> Option<usize>;
    fn browse_video(&mut self, heading: &str, extensions: &[String], default_dir: &Path) -> Option<String>;
    fn input(&mut self, heading: &str, default: &str) -> Option<String>;
    fn yes_no(&mut self, heading: &str, message: &str) -> bool;
    fn notification(&mut self, heading: &str, message: &str, kind: NotificationKind);
    fn add_directory_items(&mut self, items: &[ListItem]);
}

/// Video files below `dir` whose extension is in `extensions` (lowercase, dotted).
pub fn collect_videos(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| extensions.iter().any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(e)))
                .unwrap_or(false)
        })
        .collect();
    found.sort();
    found
}

/// Dialogs over a line-oriented terminal.
pub struct TerminalDialog<R, W> {
    input: R,
    output: W,
}

impl TerminalDialog<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalDialog<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Next line without its newline. `None` on EOF or read error.
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        let _ = write!(self.output, "{prompt}");
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                warn!("Failed to read terminal input: {e}");
                None
            }
        }
    }

    fn pick_number(&mut self, count: usize) -> Option<usize> {
        let answer = self.read_line("> ")?;
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Some(n - 1),
            _ => None,
        }
    }
}

impl<R: BufRead, W: Write> Dialog for TerminalDialog<R, W> {
    fn select(&mut self, heading: &str, options: &[String]) -> Option<usize> {
        let _ = writeln!(self.output, "{heading}");
        for (idx, option) in options.iter().enumerate() {
            let _ = writeln!(self.output, "  {}. {}", idx + 1, option);
        }
        self.pick_number(options.len())
    }

    fn browse_video(&mut self, heading: &str, extensions: &[String], default_dir: &Path) -> Option<String> {
        let candidates = collect_videos(default_dir, extensions);
        let _ = writeln!(self.output, "{heading}");
        if candidates.is_empty() {
            let _ = writeln!(self.output, "  (no videos in {})", default_dir.display());
        }
        for (idx, path) in candidates.iter().enumerate() {
            let _ = writeln!(self.output, "  {}. {}", idx + 1, path.display());
        }

        let answer = self.read_line("Number or path (empty to cancel): ")?;
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }

        if let Ok(n) = answer.parse::<usize>() {
            return candidates
                .get(n.checked_sub(1)?)
                .map(|p| p.to_string_lossy().to_string());
        }

        if translate_path(answer).is_file() {
            Some(answer.to_string())
        } else {
            let _ = writeln!(self.output, "File not found: {answer}");
            None
        }
    }

    fn input(&mut self, heading: &str, default: &str) -> Option<String> {
        let answer = self.read_line(&format!("{heading} [{default}]: "))?;
        if answer.trim().is_empty() {
            Some(default.to_string())
        } else {
            Some(answer)
        }
    }

    fn yes_no(&mut self, heading: &str, message: &str) -> bool {
        let _ = writeln!(self.output, "{heading}");
        self.read_line(&format!("{message} [y/N]: "))
            .map(|a| matches!(a.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn notification(&mut self, heading: &str, message: &str, kind: NotificationKind) {
        let tag = match kind {
            NotificationKind::Info => "INFO",
            NotificationKind::Error => "ERROR",
        };
        let _ = writeln!(self.output, "[{tag}] {heading}: {message}");
    }

    fn add_directory_items(&mut self, items: &[ListItem]) {
        for item in items {
            match &item.url {
                Some(url) => {
                    let _ = writeln!(self.output, "{}\n    {}", item.label, url);
                }
                None => {
                    let _ = writeln!(self.output, "{}", item.label);
                }
            }
        }
        let _ = self.output.flush();
    }
}
