//! Invocation context, control stack and stack frames

use serde::Serialize;

/// Function name of the synthetic frame standing for the host caller
pub const ENTRY_FUNCTION: &str = "<entry>";

/// File shown for frames of native functions
pub const NATIVE_FILE: &str = "<native>";

/// What kind of activation a frame records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Entry,
    Interpreted,
    Native,
}

/// Activation record for one function call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    kind: FrameKind,
    module: String,
    function: String,
    file: String,
    line: u32,
}

impl StackFrame {
    /// Frame for an interpreted function, starting at its declaration line
    pub fn interpreted(
        module: impl Into<String>,
        function: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            kind: FrameKind::Interpreted,
            module: module.into(),
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Frame for a native call; its location is always `<native>:0`
    pub fn native(package: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Native,
            module: package.into(),
            function: function.into(),
            file: NATIVE_FILE.to_string(),
            line: 0,
        }
    }

    /// Synthetic outermost frame pushed by `invoke`
    pub fn entry(module: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Entry,
            module: module.into(),
            function: ENTRY_FUNCTION.to_string(),
            file: file.into(),
            line: 0,
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line currently executing in this frame
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn set_line(&mut self, line: u32) {
        self.line = line;
    }
}

/// LIFO of stack frames; the last frame is the innermost call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ControlStack {
    frames: Vec<StackFrame>,
}

impl ControlStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: StackFrame) {
        tracing::trace!(
            module = %frame.module,
            function = %frame.function,
            depth = self.frames.len() + 1,
            "push frame"
        );
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<StackFrame> {
        let frame = self.frames.pop();
        if let Some(frame) = &frame {
            tracing::trace!(
                module = %frame.module,
                function = %frame.function,
                depth = self.frames.len(),
                "pop frame"
            );
        }
        frame
    }

    /// Innermost frame
    pub fn top(&self) -> Option<&StackFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut StackFrame> {
        self.frames.last_mut()
    }

    /// Frames from outermost (index 0) to innermost
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn get(&self, index: usize) -> Option<&StackFrame> {
        self.frames.get(index)
    }

    /// Remove the frame at `index` (0 is the outermost frame)
    pub fn remove(&mut self, index: usize) -> Option<StackFrame> {
        if index < self.frames.len() {
            Some(self.frames.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames from innermost to outermost
    pub fn iter_innermost_first(&self) -> impl Iterator<Item = &StackFrame> {
        self.frames.iter().rev()
    }
}

/// Per-invocation container owning one control stack.
///
/// A context is used by one thread at a time. After a failed invocation the
/// stack still holds every frame that was live when the error was raised.
#[derive(Debug, Clone, Default)]
pub struct Context {
    control_stack: ControlStack,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn control_stack(&self) -> &ControlStack {
        &self.control_stack
    }

    pub fn control_stack_mut(&mut self) -> &mut ControlStack {
        &mut self.control_stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stack() -> ControlStack {
        let mut stack = ControlStack::new();
        stack.push(StackFrame::entry("test.lang", "a.bal"));
        stack.push(StackFrame::interpreted("test.lang", "outer", "a.bal", 3));
        stack.push(StackFrame::interpreted("test.lang", "inner", "a.bal", 9));
        stack
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = stack();
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.top().unwrap().function(), "inner");
        assert_eq!(stack.pop().unwrap().function(), "inner");
        assert_eq!(stack.top().unwrap().function(), "outer");
    }

    #[test]
    fn test_remove_outermost() {
        let mut stack = stack();
        let removed = stack.remove(0).unwrap();
        assert_eq!(removed.kind(), FrameKind::Entry);
        assert_eq!(removed.function(), ENTRY_FUNCTION);
        let names: Vec<&str> = stack.frames().iter().map(|f| f.function()).collect();
        assert_eq!(names, vec!["outer", "inner"]);
        assert!(stack.remove(7).is_none());
    }

    #[test]
    fn test_set_line() {
        let mut stack = stack();
        stack.top_mut().unwrap().set_line(12);
        assert_eq!(stack.get(2).unwrap().line(), 12);
    }

    #[test]
    fn test_native_frame_location() {
        let frame = StackFrame::native("ballerina.lang.json", "getString");
        assert_eq!(frame.file(), "<native>");
        assert_eq!(frame.line(), 0);
    }

    #[test]
    fn test_serializes_innermost_last() {
        let json = serde_json::to_value(stack()).unwrap();
        assert_eq!(json[2]["function"], "inner");
        assert_eq!(json[2]["kind"], "interpreted");
        assert_eq!(json[0]["line"], 0);
    }
}
