/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick  →  Move tile cursor
///   A                   →  Select / swap tile
///   B                   →  Check order
///   X                   →  Hint panel
///   Y                   →  Listen
///   Start               →  Next level / restart
///   Select              →  Close panel / quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    select: Vec<Btn>,
    check: Vec<Btn>,
    hint: Vec<Btn>,
    listen: Vec<Btn>,
    next: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            select: vec![Btn::A],
            check: vec![Btn::B],
            hint: vec![Btn::X],
            listen: vec![Btn::Y],
            next: vec![Btn::Start],
            cancel: vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Edge flags, cleared every `update()`.
    pressed: [bool; BTN_COUNT],
    left_pressed: bool,
    right_pressed: bool,
    up_pressed: bool,
    down_pressed: bool,

    // Stick position, turned into edges when it crosses the deadzone
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::debug!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            pressed: [false; BTN_COUNT],
            left_pressed: false,
            right_pressed: false,
            up_pressed: false,
            down_pressed: false,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Unknown names are skipped;
    /// an action left with no valid buttons keeps its default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn apply(names: &[String], slot: &mut Vec<Btn>) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !parsed.is_empty() {
                *slot = parsed;
            }
        }
        let map = &mut self.action_map;
        apply(&cfg.select, &mut map.select);
        apply(&cfg.check, &mut map.check);
        apply(&cfg.hint, &mut map.hint);
        apply(&cfg.listen, &mut map.listen);
        apply(&cfg.next, &mut map.next);
        apply(&cfg.cancel, &mut map.cancel);
    }

    pub fn update(&mut self) {
        self.pressed = [false; BTN_COUNT];
        self.left_pressed = false;
        self.right_pressed = false;
        self.up_pressed = false;
        self.down_pressed = false;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, gilrs_btn: Button) {
        match gilrs_btn {
            Button::DPadUp => self.up_pressed = true,
            Button::DPadDown => self.down_pressed = true,
            Button::DPadLeft => self.left_pressed = true,
            Button::DPadRight => self.right_pressed = true,
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    self.pressed[btn as usize] = true;
                }
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => {
                let prev = self.stick_x;
                self.stick_x = value;
                if value < -STICK_DEADZONE && prev >= -STICK_DEADZONE { self.left_pressed = true; }
                if value > STICK_DEADZONE && prev <= STICK_DEADZONE { self.right_pressed = true; }
            }
            Axis::LeftStickY => {
                let prev = self.stick_y;
                self.stick_y = value;
                if value > STICK_DEADZONE && prev <= STICK_DEADZONE { self.up_pressed = true; }
                if value < -STICK_DEADZONE && prev >= -STICK_DEADZONE { self.down_pressed = true; }
            }
            _ => {}
        }
    }

    // ── Action queries (config-driven) ──

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.pressed[b as usize])
    }

    pub fn select_pressed(&self) -> bool { self.any_pressed(&self.action_map.select) }
    pub fn check_pressed(&self) -> bool { self.any_pressed(&self.action_map.check) }
    pub fn hint_pressed(&self) -> bool { self.any_pressed(&self.action_map.hint) }
    pub fn listen_pressed(&self) -> bool { self.any_pressed(&self.action_map.listen) }
    pub fn next_pressed(&self) -> bool { self.any_pressed(&self.action_map.next) }
    pub fn cancel_pressed(&self) -> bool { self.any_pressed(&self.action_map.cancel) }

    pub fn left_pressed(&self) -> bool { self.left_pressed }
    pub fn right_pressed(&self) -> bool { self.right_pressed }
    pub fn up_pressed(&self) -> bool { self.up_pressed }
    pub fn down_pressed(&self) -> bool { self.down_pressed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_parse_case_insensitively() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("North"), Some(Btn::Y));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("RB"), Some(Btn::R1));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn invalid_mapping_keeps_default() {
        let mut gp = GamepadState::new();
        let cfg = GamepadConfig {
            select: vec!["nope".into()],
            check: vec!["Y".into(), "R1".into()],
            hint: vec![],
            listen: vec!["Y".into()],
            next: vec!["Start".into()],
            cancel: vec!["Select".into()],
        };
        gp.load_button_config(&cfg);
        assert_eq!(gp.action_map.select, vec![Btn::A]);
        assert_eq!(gp.action_map.check, vec![Btn::Y, Btn::R1]);
        assert_eq!(gp.action_map.hint, vec![Btn::X]);
    }
}
