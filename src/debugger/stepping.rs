/// A one-shot listener armed by `step` or `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepListener {
    /// Stop at the very next user line, entering calls.
    StepIn,
    /// Stop at the next user line no deeper than `depth`.
    StepOver { depth: usize },
}

impl StepListener {
    pub fn accepts_depth(self, call_depth: usize) -> bool {
        match self {
            StepListener::StepIn => true,
            StepListener::StepOver { depth } => call_depth <= depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_over_waits_for_same_or_shallower_depth() {
        let listener = StepListener::StepOver { depth: 2 };
        assert!(!listener.accepts_depth(3));
        assert!(listener.accepts_depth(2));
        assert!(listener.accepts_depth(0));
        assert!(StepListener::StepIn.accepts_depth(7));
    }
}
