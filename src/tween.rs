//! Timed interpolation of visual properties.
//!
//! Every hover or zoom state change retargets a group of tweens: starting a
//! group stops any in-flight group with the same key, so a property is only
//! ever animated by one tween at a time. Groups are advanced once per frame,
//! before the draw call, producing a single coherent intermediate state.

use std::collections::HashMap;

/// Milliseconds for node/link opacity transitions.
pub const OPACITY_TWEEN_MS: f64 = 200.0;

/// Milliseconds for label opacity/scale transitions.
pub const LABEL_TWEEN_MS: f64 = 100.0;

// ============================================================================
// Targets
// ============================================================================

/// The animatable property a tween drives. Indices refer to the session's
/// render entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProp {
    NodeAlpha(usize),
    LinkAlpha(usize),
    LabelAlpha(usize),
    LabelScale(usize),
}

/// Tween groups are keyed so a retarget replaces the whole group at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenGroup {
    Hover,
    Link,
    Label,
}

/// One linear interpolation from a current value to a target value.
#[derive(Debug, Clone)]
pub struct Tween {
    pub prop: TweenProp,
    pub from: f64,
    pub to: f64,
    pub duration_ms: f64,
}

impl Tween {
    pub fn new(prop: TweenProp, from: f64, to: f64, duration_ms: f64) -> Self {
        Tween {
            prop,
            from,
            to,
            duration_ms,
        }
    }
}

struct ActiveTween {
    tween: Tween,
    started_ms: f64,
}

impl ActiveTween {
    fn sample(&self, now_ms: f64) -> (f64, bool) {
        let elapsed = now_ms - self.started_ms;
        if self.tween.duration_ms <= 0.0 || elapsed >= self.tween.duration_ms {
            return (self.tween.to, true);
        }
        let t = (elapsed / self.tween.duration_ms).clamp(0.0, 1.0);
        (self.tween.from + (self.tween.to - self.tween.from) * t, false)
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Session-scoped tween registry. Replaces ambient animation state: created
/// with the session, dropped with it.
#[derive(Default)]
pub struct AnimationScheduler {
    groups: HashMap<TweenGroup, Vec<ActiveTween>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        AnimationScheduler::default()
    }

    /// Start a group of tweens, stopping any in-flight group under the same
    /// key. Stopped tweens simply cease: the new group's `from` values carry
    /// the current on-screen state.
    pub fn start(&mut self, group: TweenGroup, tweens: Vec<Tween>, now_ms: f64) {
        let active = tweens
            .into_iter()
            .map(|tween| ActiveTween {
                tween,
                started_ms: now_ms,
            })
            .collect();
        self.groups.insert(group, active);
    }

    /// Advance all groups to `now_ms` and return the property values to
    /// apply this frame. Finished tweens emit their final value once and are
    /// dropped.
    pub fn advance(&mut self, now_ms: f64) -> Vec<(TweenProp, f64)> {
        let mut updates = Vec::new();
        for tweens in self.groups.values_mut() {
            tweens.retain(|active| {
                let (value, done) = active.sample(now_ms);
                updates.push((active.tween.prop, value));
                !done
            });
        }
        self.groups.retain(|_, tweens| !tweens.is_empty());
        updates
    }

    /// Drop every in-flight tween (session teardown).
    pub fn stop_all(&mut self) {
        self.groups.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_interpolation() {
        let mut sched = AnimationScheduler::new();
        sched.start(
            TweenGroup::Link,
            vec![Tween::new(TweenProp::LinkAlpha(0), 0.0, 1.0, 200.0)],
            1000.0,
        );
        let at_half = sched.advance(1100.0);
        assert_eq!(at_half, vec![(TweenProp::LinkAlpha(0), 0.5)]);
        let at_end = sched.advance(1200.0);
        assert_eq!(at_end, vec![(TweenProp::LinkAlpha(0), 1.0)]);
        assert!(sched.is_idle());
        // finished tween emits nothing further
        assert!(sched.advance(1300.0).is_empty());
    }

    #[test]
    fn test_restart_replaces_group() {
        let mut sched = AnimationScheduler::new();
        sched.start(
            TweenGroup::Hover,
            vec![Tween::new(TweenProp::NodeAlpha(0), 1.0, 0.2, 200.0)],
            0.0,
        );
        // halfway there, hover ends: retarget from the current value
        let mid = sched.advance(100.0);
        assert_eq!(mid[0].1, 0.6);
        sched.start(
            TweenGroup::Hover,
            vec![Tween::new(TweenProp::NodeAlpha(0), 0.6, 1.0, 200.0)],
            100.0,
        );
        let mid2 = sched.advance(200.0);
        assert_eq!(mid2, vec![(TweenProp::NodeAlpha(0), 0.8)]);
    }

    #[test]
    fn test_groups_are_independent() {
        let mut sched = AnimationScheduler::new();
        sched.start(
            TweenGroup::Hover,
            vec![Tween::new(TweenProp::NodeAlpha(1), 1.0, 0.2, 200.0)],
            0.0,
        );
        sched.start(
            TweenGroup::Label,
            vec![Tween::new(TweenProp::LabelAlpha(1), 0.0, 1.0, 100.0)],
            0.0,
        );
        let updates = sched.advance(50.0);
        assert_eq!(updates.len(), 2);
        // restarting one group leaves the other running
        sched.start(TweenGroup::Label, Vec::new(), 50.0);
        let updates = sched.advance(60.0);
        assert_eq!(updates.len(), 1);
        assert!(matches!(updates[0].0, TweenProp::NodeAlpha(1)));
    }

    #[test]
    fn test_stop_all() {
        let mut sched = AnimationScheduler::new();
        sched.start(
            TweenGroup::Link,
            vec![Tween::new(TweenProp::LinkAlpha(0), 0.0, 1.0, 200.0)],
            0.0,
        );
        sched.stop_all();
        assert!(sched.is_idle());
        assert!(sched.advance(100.0).is_empty());
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut sched = AnimationScheduler::new();
        sched.start(
            TweenGroup::Label,
            vec![Tween::new(TweenProp::LabelScale(3), 1.0, 2.0, 0.0)],
            0.0,
        );
        assert_eq!(sched.advance(0.0), vec![(TweenProp::LabelScale(3), 2.0)]);
        assert!(sched.is_idle());
    }
}
