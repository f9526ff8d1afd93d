use std::collections::HashSet;

use catdash_core::config::KeyBindings;

/// Simulation actions a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Attack,
}

impl Action {
    pub fn from_code(code: &str, keys: &KeyBindings) -> Option<Self> {
        [
            (&keys.left, Action::Left),
            (&keys.right, Action::Right),
            (&keys.up, Action::Up),
            (&keys.down, Action::Down),
            (&keys.jump, Action::Jump),
            (&keys.attack, Action::Attack),
        ]
        .into_iter()
        .find_map(|(bound, action)| (bound == code).then_some(action))
    }
}

/// Actions held at the moment a tick samples input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub attack: bool,
}

/// Persistent pressed-key set fed by key events and sampled once per tick.
/// Repeated key-down events for a held key collapse into one flag.
#[derive(Debug, Clone)]
pub struct InputState {
    bindings: KeyBindings,
    held: HashSet<Action>,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
        }
    }

    /// Register a key-down event. Unbound keys are ignored.
    pub fn on_key_down(&mut self, code: &str) -> Option<Action> {
        let action = Action::from_code(code, &self.bindings)?;
        self.held.insert(action);
        Some(action)
    }

    /// Register a key-up event.
    pub fn on_key_up(&mut self, code: &str) -> Option<Action> {
        let action = Action::from_code(code, &self.bindings)?;
        self.held.remove(&action);
        Some(action)
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            left: self.is_held(Action::Left),
            right: self.is_held(Action::Right),
            up: self.is_held(Action::Up),
            down: self.is_held(Action::Down),
            jump: self.is_held(Action::Jump),
            attack: self.is_held(Action::Attack),
        }
    }

    /// Release everything. Used on restart so stale keys do not leak into a new run.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}
