//! ### English
//! C ABI input event types.
//! Kept as POD (plain-old-data) so the embedder's browser sink can take
//! arrays without any per-event marshaling.
//!
//! ### 中文
//! C ABI 输入事件类型。
//! 保持为 POD（纯数据结构），使宿主浏览器 sink 能整批接收数组，无需逐个
//! 事件转换。

/// ### English
/// One translated input event. All fields are numeric so the hot path does no
/// parsing or allocation; unused fields for a given `kind` are zero.
///
/// ### 中文
/// 单个已翻译的输入事件。全部字段为数值，热路径无解析与分配；某 `kind`
/// 用不到的字段为零。
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WebOverlayInputEvent {
    /// ### English
    /// Event kind (one of `WEB_OVERLAY_INPUT_KIND_*`).
    ///
    /// ### 中文
    /// 事件类型（`WEB_OVERLAY_INPUT_KIND_*` 之一）。
    pub kind: u32,
    /// ### English
    /// Cursor X in client-area pixels (pointer events).
    ///
    /// ### 中文
    /// 光标 X（客户区像素；指针类事件）。
    pub x: f32,
    /// ### English
    /// Cursor Y in client-area pixels (pointer events).
    ///
    /// ### 中文
    /// 光标 Y（客户区像素；指针类事件）。
    pub y: f32,
    /// ### English
    /// Modifier bitmask (`WEB_OVERLAY_MODIFIER_*`).
    ///
    /// ### 中文
    /// 修饰键位掩码（`WEB_OVERLAY_MODIFIER_*`）。
    pub modifiers: u32,

    /// ### English
    /// Mouse button (`0` = left, `1` = middle, `2` = right).
    ///
    /// ### 中文
    /// 鼠标按键（`0` = 左，`1` = 中，`2` = 右）。
    pub mouse_button: u32,
    /// ### English
    /// Mouse button action (`0` = down, otherwise up).
    ///
    /// ### 中文
    /// 鼠标按键动作（`0` = down，其它 = up）。
    pub mouse_action: u32,

    /// ### English
    /// Wheel delta X (Win32 wheel units, 120 per detent).
    ///
    /// ### 中文
    /// 滚轮 delta X（Win32 滚轮单位，每格 120）。
    pub wheel_delta_x: f64,
    /// ### English
    /// Wheel delta Y (Win32 wheel units, 120 per detent).
    ///
    /// ### 中文
    /// 滚轮 delta Y（Win32 滚轮单位，每格 120）。
    pub wheel_delta_y: f64,

    /// ### English
    /// Key state (`0` = raw key down, `1` = key up, `2` = character).
    ///
    /// ### 中文
    /// 按键状态（`0` = raw key down，`1` = key up，`2` = 字符）。
    pub key_state: u32,
    /// ### English
    /// Windows virtual-key code for key events.
    ///
    /// ### 中文
    /// 按键事件的 Windows 虚拟键码。
    pub key_code: u32,
    /// ### English
    /// Unicode codepoint for character events (0 otherwise).
    ///
    /// ### 中文
    /// 字符事件的 Unicode 码点（其它情况为 0）。
    pub key_codepoint: u32,
    /// ### English
    /// System-key flag (`WM_SYS*` family; `0` = false).
    ///
    /// ### 中文
    /// 系统键标记（`WM_SYS*` 家族；`0` = false）。
    pub is_system_key: u32,
}

/// ### English
/// Input kind: mouse move.
///
/// ### 中文
/// 输入类型：鼠标移动。
pub const WEB_OVERLAY_INPUT_KIND_MOUSE_MOVE: u32 = 1;

/// ### English
/// Input kind: mouse button.
///
/// ### 中文
/// 输入类型：鼠标按键。
pub const WEB_OVERLAY_INPUT_KIND_MOUSE_BUTTON: u32 = 2;

/// ### English
/// Input kind: wheel.
///
/// ### 中文
/// 输入类型：滚轮。
pub const WEB_OVERLAY_INPUT_KIND_WHEEL: u32 = 3;

/// ### English
/// Input kind: keyboard.
///
/// ### 中文
/// 输入类型：键盘。
pub const WEB_OVERLAY_INPUT_KIND_KEY: u32 = 4;

/// ### English
/// Modifier bit: shift held.
///
/// ### 中文
/// 修饰位：shift 按下。
pub const WEB_OVERLAY_MODIFIER_SHIFT: u32 = 1 << 0;
/// ### English
/// Modifier bit: control held.
///
/// ### 中文
/// 修饰位：control 按下。
pub const WEB_OVERLAY_MODIFIER_CONTROL: u32 = 1 << 1;
/// ### English
/// Modifier bit: alt held.
///
/// ### 中文
/// 修饰位：alt 按下。
pub const WEB_OVERLAY_MODIFIER_ALT: u32 = 1 << 2;
/// ### English
/// Modifier bit: left mouse button held.
///
/// ### 中文
/// 修饰位：鼠标左键按下。
pub const WEB_OVERLAY_MODIFIER_LEFT_BUTTON: u32 = 1 << 3;
/// ### English
/// Modifier bit: middle mouse button held.
///
/// ### 中文
/// 修饰位：鼠标中键按下。
pub const WEB_OVERLAY_MODIFIER_MIDDLE_BUTTON: u32 = 1 << 4;
/// ### English
/// Modifier bit: right mouse button held.
///
/// ### 中文
/// 修饰位：鼠标右键按下。
pub const WEB_OVERLAY_MODIFIER_RIGHT_BUTTON: u32 = 1 << 5;
/// ### English
/// Modifier bit: caps lock toggled on.
///
/// ### 中文
/// 修饰位：大写锁定开启。
pub const WEB_OVERLAY_MODIFIER_CAPS_LOCK: u32 = 1 << 6;
/// ### English
/// Modifier bit: num lock toggled on.
///
/// ### 中文
/// 修饰位：数字锁定开启。
pub const WEB_OVERLAY_MODIFIER_NUM_LOCK: u32 = 1 << 7;
