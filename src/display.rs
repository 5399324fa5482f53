//! Output side of the timer: where rendered frames are written.
//!
//! The controller only ever writes to a sink; it never reads back.

/// Receives each formatted frame along with the opaque display target.
pub trait DisplaySink {
    /// Replaces what `target` shows with `text`.
    fn write(&mut self, target: &str, text: &str);
}

/// Keeps only the most recent frame.
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    text: Option<String>,
    target: String,
}

impl LatestFrame {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last frame written, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The display target of the last frame.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl DisplaySink for LatestFrame {
    fn write(&mut self, target: &str, text: &str) {
        if self.target != target {
            self.target = target.to_string();
        }
        match &mut self.text {
            Some(current) => {
                current.clear();
                current.push_str(text);
            }
            None => self.text = Some(text.to_string()),
        }
    }
}

/// Records every frame in order.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    frames: Vec<String>,
}

impl Recorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every frame written so far, oldest first.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// The most recent frame.
    pub fn last(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }
}

impl DisplaySink for Recorder {
    fn write(&mut self, _target: &str, text: &str) {
        self.frames.push(text.to_string());
    }
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn write(&mut self, target: &str, text: &str) {
        (**self).write(target, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_frame_overwrites() {
        let mut sink = LatestFrame::new();
        assert_eq!(sink.text(), None);

        sink.write("responsive-timer", "00:01.00");
        sink.write("responsive-timer", "00:00.50");
        assert_eq!(sink.text(), Some("00:00.50"));
        assert_eq!(sink.target(), "responsive-timer");
    }

    #[test]
    fn test_recorder_keeps_order() {
        let mut sink = Recorder::new();
        sink.write("t", "a");
        sink.write("t", "b");
        assert_eq!(sink.frames(), &["a".to_string(), "b".to_string()]);
        assert_eq!(sink.last(), Some("b"));
    }
}
