//! Input contract
//!
//! Hosts translate raw key presses into [`InputEvent`]s for a fixed set of
//! logical [`Action`]s. The simulation only ever sees the logical events.

use std::collections::HashMap;

/// Logical actions the player can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Spin counter-clockwise
    RotateLeft,
    /// Spin clockwise
    RotateRight,
    /// Accelerate forward
    Thrust,
    /// Shoot bullets
    Fire,
}

/// Discrete change of an action's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// The action started
    Pressed(Action),
    /// The action stopped
    Released(Action),
}

impl InputEvent {
    /// The action this event refers to
    pub fn action(&self) -> Action {
        match *self {
            Self::Pressed(action) | Self::Released(action) => action,
        }
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// W key
    W,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Source of input events, polled once per tick
pub trait InputSource {
    /// Events that happened since the last poll, in order
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Maps physical keys to logical actions
#[derive(Debug, Clone)]
pub struct InputMap {
    bindings: HashMap<KeyCode, Action>,
}

impl Default for InputMap {
    /// Arrow keys steer and thrust, space fires
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(KeyCode::Left, Action::RotateLeft);
        map.bind(KeyCode::Right, Action::RotateRight);
        map.bind(KeyCode::Up, Action::Thrust);
        map.bind(KeyCode::Space, Action::Fire);
        map
    }
}

impl InputMap {
    /// A map with no bindings
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Binds a key, replacing any previous binding of that key
    pub fn bind(&mut self, key: KeyCode, action: Action) {
        self.bindings.insert(key, action);
    }

    /// Action bound to `key`, if any
    pub fn action_for(&self, key: KeyCode) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    /// Turns a raw key transition into a logical event; unbound keys yield `None`
    pub fn translate(&self, key: KeyCode, pressed: bool) -> Option<InputEvent> {
        self.action_for(key).map(|action| {
            if pressed {
                InputEvent::Pressed(action)
            } else {
                InputEvent::Released(action)
            }
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct KeyTransition {
    tick: u64,
    key: KeyCode,
    pressed: bool,
}

/// Replays a fixed timeline of key transitions, one tick per poll
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    map: InputMap,
    timeline: Vec<KeyTransition>,
    tick: u64,
}

impl ScriptedInput {
    /// Empty script translated through `map`
    pub fn new(map: InputMap) -> Self {
        Self {
            map,
            timeline: Vec::new(),
            tick: 0,
        }
    }

    /// Presses `key` on `tick`
    pub fn press(mut self, tick: u64, key: KeyCode) -> Self {
        self.push(KeyTransition { tick, key, pressed: true });
        self
    }

    /// Releases `key` on `tick`
    pub fn release(mut self, tick: u64, key: KeyCode) -> Self {
        self.push(KeyTransition { tick, key, pressed: false });
        self
    }

    /// Next tick to be polled
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether every scripted transition has been replayed
    pub fn is_finished(&self) -> bool {
        self.timeline.last().map_or(true, |last| last.tick < self.tick)
    }

    fn push(&mut self, transition: KeyTransition) {
        // stable: transitions on the same tick keep insertion order
        let index = self.timeline.partition_point(|t| t.tick <= transition.tick);
        self.timeline.insert(index, transition);
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        let tick = self.tick;
        self.tick += 1;
        self.timeline
            .iter()
            .filter(|transition| transition.tick == tick)
            .filter_map(|transition| self.map.translate(transition.key, transition.pressed))
            .collect()
    }
}
