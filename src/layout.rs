use glam::Vec2;

/// Axis-aligned screen rectangle in physical pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub size: Vec2,
}

/// Where the character goes: `display` size, centered in the window.
/// Pixel-snapped so nearest-neighbor scaling stays crisp.
pub fn sprite_rect(window: (u32, u32), display: (u32, u32)) -> ScreenRect {
    let window = Vec2::new(window.0 as f32, window.1 as f32);
    let size = Vec2::new(display.0 as f32, display.1 as f32);
    ScreenRect {
        min: ((window - size) * 0.5).floor(),
        size,
    }
}

/// Backgrounds stretch over the whole window.
pub fn background_rect(window: (u32, u32)) -> ScreenRect {
    ScreenRect {
        min: Vec2::ZERO,
        size: Vec2::new(window.0 as f32, window.1 as f32),
    }
}
