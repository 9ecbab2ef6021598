//! Anti-cheat violation statistics.

use serde::{Deserialize, Serialize};

/// Snapshot of the counted suspicious events for a session.
///
/// `total_violations` always equals the sum of the three counters. The only
/// ways to build a value are [`AntiCheatStats::new`] and the `record_*`
/// helpers, which recompute the total on every change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AntiCheatStats {
    blur_count: u32,
    copy_count: u32,
    editor_paste_count: u32,
    total_violations: u32,
}

impl AntiCheatStats {
    pub fn new(blur_count: u32, copy_count: u32, editor_paste_count: u32) -> Self {
        Self {
            blur_count,
            copy_count,
            editor_paste_count,
            total_violations: blur_count
                .saturating_add(copy_count)
                .saturating_add(editor_paste_count),
        }
    }

    pub fn blur_count(&self) -> u32 {
        self.blur_count
    }

    pub fn copy_count(&self) -> u32 {
        self.copy_count
    }

    pub fn editor_paste_count(&self) -> u32 {
        self.editor_paste_count
    }

    pub fn total_violations(&self) -> u32 {
        self.total_violations
    }

    /// Window focus was lost.
    pub fn record_blur(&mut self) {
        *self = Self::new(self.blur_count.saturating_add(1), self.copy_count, self.editor_paste_count);
    }

    /// Something was copied to the clipboard.
    pub fn record_copy(&mut self) {
        *self = Self::new(self.blur_count, self.copy_count.saturating_add(1), self.editor_paste_count);
    }

    /// Text was pasted into the code editor.
    pub fn record_editor_paste(&mut self) {
        *self = Self::new(self.blur_count, self.copy_count, self.editor_paste_count.saturating_add(1));
    }

    /// Returns the subset sent to the review service.
    pub fn report(&self) -> AntiCheatReport {
        AntiCheatReport {
            blur_count: self.blur_count,
            copy_count: self.copy_count,
            editor_paste_count: self.editor_paste_count,
        }
    }
}

/// Wire form of the anti-cheat counters attached to a round submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntiCheatReport {
    pub blur_count: u32,
    pub copy_count: u32,
    pub editor_paste_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_tracks_every_increment() {
        let mut stats = AntiCheatStats::default();
        stats.record_blur();
        stats.record_blur();
        stats.record_copy();
        stats.record_editor_paste();

        assert_eq!(stats.blur_count(), 2);
        assert_eq!(stats.copy_count(), 1);
        assert_eq!(stats.editor_paste_count(), 1);
        assert_eq!(stats.total_violations(), 4);
    }

    #[test]
    fn test_report_uses_camel_case_without_total() {
        let stats = AntiCheatStats::new(1, 2, 3);
        let json = serde_json::to_value(stats.report()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"blurCount": 1, "copyCount": 2, "editorPasteCount": 3})
        );
    }
}
