#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure movement system that turns held keys into player movement commands.

use tilewalk_core::{Command, Direction, Event, InputCode, PixelDelta};

/// Distance in pixels the player travels per tick for each held binding.
pub const DEFAULT_SPEED: f32 = 3.0;

/// How simultaneous bindings for the same direction combine within a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BindingPolicy {
    /// Every held key contributes its own delta, so an arrow key and its
    /// letter alias together move the player twice as far.
    #[default]
    Additive,
    /// Held keys are reduced to the set of directions first, giving at most
    /// one delta per direction.
    PerDirection,
}

/// Pure system that reacts to ticks and emits movement commands.
#[derive(Clone, Debug)]
pub struct Movement {
    policy: BindingPolicy,
    speed: f32,
}

impl Movement {
    /// Creates a movement system with the provided policy and per-tick speed.
    #[must_use]
    pub fn new(policy: BindingPolicy, speed: f32) -> Self {
        Self { policy, speed }
    }

    /// Emits one movement command for every tick contained in `events`.
    ///
    /// `pressed` holds the keys down during the tick in polling order; the
    /// command is emitted even when nothing is held so the world re-clamps
    /// the player on every update.
    pub fn handle(&self, events: &[Event], pressed: &[InputCode], out: &mut Vec<Command>) {
        let ticks = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();
        if ticks == 0 {
            return;
        }

        let delta = self.delta_for(pressed);
        for _ in 0..ticks {
            out.push(Command::MovePlayer { delta });
        }
    }

    /// Sums the per-key deltas for a single tick.
    #[must_use]
    pub fn delta_for(&self, pressed: &[InputCode]) -> PixelDelta {
        match self.policy {
            BindingPolicy::Additive => pressed
                .iter()
                .map(|code| code.direction().delta(self.speed))
                .fold(PixelDelta::ZERO, PixelDelta::plus),
            BindingPolicy::PerDirection => Direction::ALL
                .into_iter()
                .filter(|direction| pressed.iter().any(|code| code.direction() == *direction))
                .map(|direction| direction.delta(self.speed))
                .fold(PixelDelta::ZERO, PixelDelta::plus),
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(BindingPolicy::default(), DEFAULT_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_policy_doubles_speed_for_aliases() {
        let movement = Movement::default();
        let delta = movement.delta_for(&[InputCode::ArrowRight, InputCode::D]);
        assert_eq!(delta, PixelDelta::new(6.0, 0.0));
    }

    #[test]
    fn per_direction_policy_ignores_aliases() {
        let movement = Movement::new(BindingPolicy::PerDirection, DEFAULT_SPEED);
        let delta = movement.delta_for(&[InputCode::ArrowRight, InputCode::D, InputCode::W]);
        assert_eq!(delta, PixelDelta::new(3.0, -3.0));
    }

    #[test]
    fn opposing_keys_cancel_out() {
        let movement = Movement::default();
        let delta = movement.delta_for(&[InputCode::ArrowLeft, InputCode::ArrowRight]);
        assert_eq!(delta, PixelDelta::ZERO);
    }

    #[test]
    fn no_command_without_a_tick() {
        let movement = Movement::default();
        let mut commands = Vec::new();
        movement.handle(&[], &[InputCode::D], &mut commands);
        assert!(commands.is_empty());
    }
}
