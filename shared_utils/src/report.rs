//! Report Module
//!
//! Result ledger and summary rendering for one generation run: filename,
//! original size, target quality, detected 2x width, then one line per
//! produced file.

use console::style;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEntry {
    Produced { size: u64 },
    Failed { reason: String },
}

/// Per-invocation result ledger. Entries keep insertion order (original
/// first, then each derivative as it is produced); recording an existing
/// path updates it in place, which is how the original's post-optimization
/// size replaces its starting size.
#[derive(Debug, Clone)]
pub struct Summary {
    pub filename: String,
    pub original_size: u64,
    pub quality: u8,
    pub width_2x: u32,
    entries: Vec<(PathBuf, LedgerEntry)>,
    errors: Vec<(PathBuf, String)>,
}

impl Summary {
    pub fn new(filename: String, original_size: u64, quality: u8, width_2x: u32) -> Self {
        Self {
            filename,
            original_size,
            quality,
            width_2x,
            entries: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn record(&mut self, path: PathBuf, size: u64) {
        self.upsert(path, LedgerEntry::Produced { size });
    }

    pub fn record_failure(&mut self, path: PathBuf, reason: String) {
        self.errors.push((path.clone(), reason.clone()));
        self.upsert(path, LedgerEntry::Failed { reason });
    }

    /// A step failed but its output file still exists (in-place tools leave
    /// the file behind). The ledger keeps the size; the error list keeps
    /// the failure.
    pub fn record_error_with_size(&mut self, path: PathBuf, size: u64, reason: String) {
        self.errors.push((path.clone(), reason));
        self.upsert(path, LedgerEntry::Produced { size });
    }

    fn upsert(&mut self, path: PathBuf, entry: LedgerEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|(p, _)| *p == path) {
            existing.1 = entry;
        } else {
            self.entries.push((path, entry));
        }
    }

    pub fn entries(&self) -> &[(PathBuf, LedgerEntry)] {
        &self.entries
    }

    pub fn errors(&self) -> &[(PathBuf, String)] {
        &self.errors
    }

    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn size_of(&self, path: &Path) -> Option<u64> {
        self.entries.iter().find_map(|(p, e)| match e {
            LedgerEntry::Produced { size } if p == path => Some(*size),
            _ => None,
        })
    }

    /// The notification text: header, blank line, one line per file.
    pub fn render(&self) -> String {
        let mut lines = vec![
            self.filename.clone(),
            format!("Filesize: {}kB", self.original_size / 1024),
            format!("Target quality: {}%", self.quality),
            format!("2x width: {}px", self.width_2x),
            String::new(),
        ];

        for (path, entry) in &self.entries {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match entry {
                LedgerEntry::Produced { size } => {
                    lines.push(format!("{}: {}", name, format_size(*size)))
                }
                LedgerEntry::Failed { reason } => {
                    lines.push(format!("{}: FAILED ({})", name, reason))
                }
            }
        }

        lines.join("\n")
    }
}

/// Floor-kB over 1024 bytes, raw bytes otherwise: 2048 → "2kB", 500 → "500B".
pub fn format_size(bytes: u64) -> String {
    if bytes > 1024 {
        format!("{}kB", bytes / 1024)
    } else {
        format!("{}B", bytes)
    }
}

pub fn print_summary(summary: &Summary) {
    println!();
    println!("📊 {}", style("Variant Summary").bold());
    for line in summary.render().lines() {
        println!("   {}", line);
    }

    // The original is always the first ledger entry; its size was updated
    // in place by the final optimization step.
    if let Some((_, LedgerEntry::Produced { size })) = summary.entries().first() {
        if *size < summary.original_size {
            println!();
            println!(
                "💾 Original reduced by {}",
                format_size(summary.original_size - size)
            );
        }
    }

    if !summary.errors().is_empty() {
        println!();
        println!("❌ Errors encountered:");
        for (path, error) in summary.errors() {
            println!("   {} → {}", path.display(), error);
        }
    }
}
