//! Survival clock and the one-shot game-over transition

/// Tracks simulated survival time until the game ends
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TerminationState {
    done: bool,
    elapsed: f32,
}

impl TerminationState {
    /// A running game at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `dt` of simulated time; frozen once done
    pub fn advance(&mut self, dt: f32) {
        if !self.done {
            self.elapsed += dt;
        }
    }

    /// Ends the game; returns false if it had already ended
    pub fn set_done(&mut self) -> bool {
        if self.done {
            return false;
        }
        self.done = true;
        true
    }

    /// Whether the game has ended
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Simulated seconds survived
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whole seconds survived, as shown to the player
    pub fn whole_seconds(&self) -> u64 {
        self.elapsed.max(0.0).floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_elapsed_freezes_when_done() {
        let mut state = TerminationState::new();
        state.advance(1.5);
        assert!(state.set_done());
        state.advance(10.0);

        assert_relative_eq!(state.elapsed(), 1.5);
        assert_eq!(state.whole_seconds(), 1);
    }

    #[test]
    fn test_done_is_one_shot() {
        let mut state = TerminationState::new();
        assert!(state.set_done());
        assert!(!state.set_done());
        assert!(state.is_done());
    }
}
