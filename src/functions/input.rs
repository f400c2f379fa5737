//! Keyboard and mouse simulation.
//!
//! Key procedures take Windows virtual-key codes (`65` is `A`); the `*_char`
//! variants take key names such as `"enter"` or `"a"`. Delays and timeouts
//! are in milliseconds.

use crate::Result;
use crate::decode::parse_point;
use crate::gateway::{CallGateway, Dispatch};
use crate::wire::{Point, Rect, WireArg, WireValue};

/// Input simulation backend whose delays are being set.
///
/// Travels as its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypadMode {
    Normal,
    Windows,
    Dx,
}

impl KeypadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            KeypadMode::Normal => "normal",
            KeypadMode::Windows => "windows",
            KeypadMode::Dx => "dx",
        }
    }
}

impl WireArg for KeypadMode {
    fn lower_into(self, out: &mut Vec<WireValue>) {
        out.push(WireValue::from(self.as_str()));
    }
}

/// Mouse simulation backend whose delays are being set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseMode {
    Normal,
    Windows,
    Dx,
}

impl MouseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MouseMode::Normal => "normal",
            MouseMode::Windows => "windows",
            MouseMode::Dx => "dx",
        }
    }
}

impl WireArg for MouseMode {
    fn lower_into(self, out: &mut Vec<WireValue>) {
        out.push(WireValue::from(self.as_str()));
    }
}

crate::wire_enum! {
    /// How foreground input is generated.
    pub enum SimMode {
        /// Regular system input.
        Normal = 0,
        /// Hardware simulation through the bundled driver.
        Hardware = 1,
        /// Hardware simulation for PS/2 devices.
        HardwarePs2 = 2,
        /// Hardware simulation, third driver generation.
        Hardware3 = 3,
    }
}

pub struct InputFunctions<'a, D> {
    gateway: &'a CallGateway<D>,
}

impl<'a, D: Dispatch> InputFunctions<'a, D> {
    pub fn new(gateway: &'a CallGateway<D>) -> Self {
        Self { gateway }
    }

    fn expect_1(&self, procedure: &str, args: &mut crate::wire::FunctionArgs) -> Result<()> {
        Ok(self.gateway.call_expect_1(procedure, args)?)
    }

    /// Toggle the system's enhanced pointer precision.
    pub fn enable_mouse_accuracy(&self, enable: bool) -> Result<bool> {
        Ok(self
            .gateway
            .call_for_bool("EnableMouseAccuracy", &mut crate::args![enable])?)
    }

    pub fn cursor_pos(&self) -> Result<Point> {
        let mut args = crate::args![WireValue::placeholder(), WireValue::placeholder()];
        self.expect_1("GetCursorPos", &mut args)?;
        Ok(args.get_point(-2, -1)?)
    }

    /// Feature code of the current cursor shape.
    pub fn cursor_shape(&self) -> Result<String> {
        Ok(self
            .gateway
            .call_for_string("GetCursorShape", &mut crate::args![])?)
    }

    pub fn cursor_shape_ex(&self, kind: i32) -> Result<String> {
        Ok(self
            .gateway
            .call_for_string("GetCursorShapeEx", &mut crate::args![kind])?)
    }

    /// Hotspot of the current cursor, if the object can determine it.
    pub fn cursor_spot(&self) -> Result<Option<Point>> {
        let result = self
            .gateway
            .call_for_string("GetCursorSpot", &mut crate::args![])?;
        Ok(parse_point(result.as_str())?)
    }

    /// Whether virtual key `vk` is held down.
    pub fn key_state(&self, vk: i32) -> Result<bool> {
        Ok(self.gateway.call_for_bool("GetKeyState", &mut crate::args![vk])?)
    }

    pub fn mouse_speed(&self) -> Result<i32> {
        Ok(self.gateway.call_for_i32("GetMouseSpeed", &mut crate::args![])?)
    }

    /// Set the system pointer speed, 1 to 11.
    pub fn set_mouse_speed(&self, speed: i32) -> Result<()> {
        self.expect_1("SetMouseSpeed", &mut crate::args![speed])
    }

    pub fn key_down(&self, vk: i32) -> Result<()> {
        self.expect_1("KeyDown", &mut crate::args![vk])
    }

    pub fn key_down_char(&self, key: &str) -> Result<()> {
        self.expect_1("KeyDownChar", &mut crate::args![key])
    }

    pub fn key_up(&self, vk: i32) -> Result<()> {
        self.expect_1("KeyUp", &mut crate::args![vk])
    }

    pub fn key_up_char(&self, key: &str) -> Result<()> {
        self.expect_1("KeyUpChar", &mut crate::args![key])
    }

    pub fn key_press(&self, vk: i32) -> Result<()> {
        self.expect_1("KeyPress", &mut crate::args![vk])
    }

    pub fn key_press_char(&self, key: &str) -> Result<()> {
        self.expect_1("KeyPressChar", &mut crate::args![key])
    }

    /// Type `text` one key at a time, waiting `delay_ms` between keys.
    pub fn key_press_str(&self, text: &str, delay_ms: i64) -> Result<()> {
        self.expect_1("KeyPressStr", &mut crate::args![text, delay_ms])
    }

    pub fn left_click(&self) -> Result<()> {
        self.expect_1("LeftClick", &mut crate::args![])
    }

    pub fn left_double_click(&self) -> Result<()> {
        self.expect_1("LeftDoubleClick", &mut crate::args![])
    }

    pub fn left_down(&self) -> Result<()> {
        self.expect_1("LeftDown", &mut crate::args![])
    }

    pub fn left_up(&self) -> Result<()> {
        self.expect_1("LeftUp", &mut crate::args![])
    }

    pub fn middle_click(&self) -> Result<()> {
        self.expect_1("MiddleClick", &mut crate::args![])
    }

    pub fn middle_down(&self) -> Result<()> {
        self.expect_1("MiddleDown", &mut crate::args![])
    }

    pub fn middle_up(&self) -> Result<()> {
        self.expect_1("MiddleUp", &mut crate::args![])
    }

    pub fn right_click(&self) -> Result<()> {
        self.expect_1("RightClick", &mut crate::args![])
    }

    pub fn right_down(&self) -> Result<()> {
        self.expect_1("RightDown", &mut crate::args![])
    }

    pub fn right_up(&self) -> Result<()> {
        self.expect_1("RightUp", &mut crate::args![])
    }

    /// Move the cursor relative to its current position.
    pub fn move_relative(&self, dx: i32, dy: i32) -> Result<()> {
        self.expect_1("MoveR", &mut crate::args![dx, dy])
    }

    pub fn move_to(&self, point: Point) -> Result<()> {
        self.expect_1("MoveTo", &mut crate::args![point])
    }

    /// Move to a random point inside `rect` and return where the cursor
    /// landed.
    pub fn move_to_ex(&self, rect: Rect) -> Result<Option<Point>> {
        let result = self
            .gateway
            .call_for_string("MoveToEx", &mut crate::args![rect])?;
        Ok(parse_point(result.as_str())?)
    }

    pub fn set_keypad_delay(&self, mode: KeypadMode, delay_ms: i64) -> Result<()> {
        self.expect_1("SetKeypadDelay", &mut crate::args![mode, delay_ms])
    }

    pub fn set_mouse_delay(&self, mode: MouseMode, delay_ms: i64) -> Result<()> {
        self.expect_1("SetMouseDelay", &mut crate::args![mode, delay_ms])
    }

    /// Switch the simulation backend. Returns the object's status code;
    /// 1 means the mode is active.
    pub fn set_sim_mode(&self, mode: SimMode) -> Result<i32> {
        Ok(self.gateway.call_for_i32("SetSimMode", &mut crate::args![mode])?)
    }

    /// Wait for key `vk` (0 for any key). Returns the pressed key code, or
    /// 0 on timeout. A timeout of 0 waits indefinitely.
    pub fn wait_key(&self, vk: i32, timeout_ms: i64) -> Result<i32> {
        Ok(self
            .gateway
            .call_for_i32("WaitKey", &mut crate::args![vk, timeout_ms])?)
    }

    pub fn wheel_down(&self) -> Result<()> {
        self.expect_1("WheelDown", &mut crate::args![])
    }

    pub fn wheel_up(&self) -> Result<()> {
        self.expect_1("WheelUp", &mut crate::args![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_support::{answering, succeeding};
    use crate::gateway::{CallError, CallGateway, LAST_ERROR_PROCEDURE};
    use crate::testing::{Call, MockDispatch};
    use crate::Error;

    #[test]
    fn test_cursor_pos() {
        let gw = CallGateway::new(MockDispatch::new(|_, args| {
            if let Some([x, y]) = args {
                *x = WireValue::Int(1920);
                *y = WireValue::Int(1080);
            }
            Ok(WireValue::Int(1))
        }));
        assert_eq!(
            InputFunctions::new(&gw).cursor_pos().unwrap(),
            Point::new(1920, 1080)
        );
    }

    #[test]
    fn test_clicks_use_zero_arg_path() {
        let gw = succeeding();
        let input = InputFunctions::new(&gw);
        input.left_click().unwrap();
        input.right_down().unwrap();
        input.wheel_up().unwrap();
        assert_eq!(
            gw.dispatch().calls(),
            vec![
                Call::no_args("LeftClick"),
                Call::no_args("RightDown"),
                Call::no_args("WheelUp"),
            ]
        );
    }

    #[test]
    fn test_failed_key_reports_error_code() {
        let gw = CallGateway::new(MockDispatch::new(|procedure, _| {
            Ok(WireValue::Int(match procedure {
                LAST_ERROR_PROCEDURE => -1,
                _ => 0,
            }))
        }));
        let err = InputFunctions::new(&gw).key_press(13).unwrap_err();
        assert!(matches!(
            err,
            Error::Call(CallError::RemoteCallFailed { error_code: -1, .. })
        ));
        assert_eq!(err.remote_error_code(), Some(-1));
    }

    #[test]
    fn test_move_to_flattens_point() {
        let gw = succeeding();
        InputFunctions::new(&gw).move_to(Point::new(100, 200)).unwrap();
        assert_eq!(
            gw.dispatch().calls(),
            vec![Call::with_args(
                "MoveTo",
                vec![WireValue::Int(100), WireValue::Int(200)]
            )]
        );
    }

    #[test]
    fn test_move_to_ex_decodes_point() {
        let gw = answering("MoveToEx", WireValue::Str("105,210".to_string()));
        assert_eq!(
            InputFunctions::new(&gw)
                .move_to_ex(Rect::new(100, 200, 10, 20))
                .unwrap(),
            Some(Point::new(105, 210))
        );
    }

    #[test]
    fn test_cursor_spot_empty() {
        let gw = answering("GetCursorSpot", WireValue::Str(String::new()));
        assert_eq!(InputFunctions::new(&gw).cursor_spot().unwrap(), None);
    }

    #[test]
    fn test_mode_arguments() {
        let gw = succeeding();
        let input = InputFunctions::new(&gw);
        input.set_keypad_delay(KeypadMode::Dx, 50).unwrap();
        input.set_mouse_delay(MouseMode::Windows, 10).unwrap();
        assert_eq!(input.set_sim_mode(SimMode::HardwarePs2).unwrap(), 1);
        assert_eq!(
            gw.dispatch().calls(),
            vec![
                Call::with_args(
                    "SetKeypadDelay",
                    vec![WireValue::Str("dx".to_string()), WireValue::Int(50)]
                ),
                Call::with_args(
                    "SetMouseDelay",
                    vec![WireValue::Str("windows".to_string()), WireValue::Int(10)]
                ),
                Call::with_args("SetSimMode", vec![WireValue::Int(2)]),
            ]
        );
    }

    #[test]
    fn test_wait_key_passes_timeout() {
        let gw = answering("WaitKey", WireValue::Int(0));
        assert_eq!(InputFunctions::new(&gw).wait_key(65, 3000).unwrap(), 0);
        assert_eq!(
            gw.dispatch().calls(),
            vec![Call::with_args(
                "WaitKey",
                vec![WireValue::Int(65), WireValue::Int(3000)]
            )]
        );
    }

    #[test]
    fn test_key_state_and_speed() {
        let gw = CallGateway::new(MockDispatch::new(|procedure, _| {
            Ok(WireValue::Int(match procedure {
                "GetKeyState" => 1,
                _ => 6,
            }))
        }));
        let input = InputFunctions::new(&gw);
        assert!(input.key_state(16).unwrap());
        assert_eq!(input.mouse_speed().unwrap(), 6);
    }
}
