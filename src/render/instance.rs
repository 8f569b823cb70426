use bytemuck::{Pod, Zeroable};

use crate::animation::{AnimationDriver, Background};
use crate::layout::{self, ScreenRect};
use crate::sprite::{Frame, ImageId};

/// Per-instance data uploaded to GPU each frame.
/// Stride = 32 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Top-left corner in screen pixels.
    pub position: [f32; 2],
    /// Size in screen pixels.
    pub size: [f32; 2],
    /// Texture coordinate of the top-left corner.
    pub uv_min: [f32; 2],
    /// Texture coordinate of the bottom-right corner.
    pub uv_max: [f32; 2],
}

impl SpriteInstance {
    /// A whole image stretched over `rect`.
    pub fn full(rect: ScreenRect) -> Self {
        Self {
            position: rect.min.into(),
            size: rect.size.into(),
            uv_min: [0.0, 0.0],
            uv_max: [1.0, 1.0],
        }
    }

    /// One animation frame scaled into `rect`.
    pub fn from_frame(frame: &Frame, rect: ScreenRect) -> Self {
        let (uv_min, uv_max) = frame.uv();
        Self {
            position: rect.min.into(),
            size: rect.size.into(),
            uv_min,
            uv_max,
        }
    }
}

/// One textured quad: which image to bind, where to put it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub image: ImageId,
    pub instance: SpriteInstance,
}

/// Everything to put on screen for one frame, back to front.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub clear: [u8; 3],
    pub draws: Vec<SpriteDraw>,
}

impl Scene {
    /// Rebuild from the driver's current state. Reuses the draw buffer.
    pub fn build(
        &mut self,
        driver: &AnimationDriver,
        window: (u32, u32),
        display: (u32, u32),
        fill: [u8; 3],
    ) {
        self.draws.clear();

        match driver.current_background() {
            Background::Fill(rgb) => self.clear = *rgb,
            Background::Image(image) => {
                self.clear = fill;
                self.draws.push(SpriteDraw {
                    image: image.id(),
                    instance: SpriteInstance::full(layout::background_rect(window)),
                });
            }
        }

        let frame = driver.current_frame();
        self.draws.push(SpriteDraw {
            image: frame.image_id(),
            instance: SpriteInstance::from_frame(frame, layout::sprite_rect(window, display)),
        });
    }

    /// Instance data in draw order, for upload.
    pub fn instances(&self) -> impl Iterator<Item = SpriteInstance> + '_ {
        self.draws.iter().map(|d| d.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tests::{test_table, FILL};
    use crate::animation::AnimationState;
    use pretty_assertions::assert_eq;

    #[test]
    fn instance_is_32_bytes() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
    }

    #[test]
    fn idle_scene_is_fill_plus_sprite() {
        let driver = AnimationDriver::new(test_table([10; 5]), AnimationState::Idle);
        let mut scene = Scene::default();
        scene.build(&driver, (800, 600), (300, 300), [0, 0, 0]);

        assert_eq!(scene.clear, FILL);
        assert_eq!(scene.draws.len(), 1);
        assert_eq!(
            scene.draws[0].instance,
            SpriteInstance {
                position: [250.0, 150.0],
                size: [300.0, 300.0],
                uv_min: [0.0, 0.0],
                uv_max: [1.0 / 3.0, 0.5],
            }
        );
    }

    #[test]
    fn image_background_is_drawn_first_and_full_window() {
        let mut driver = AnimationDriver::new(test_table([10; 5]), AnimationState::Idle);
        driver.switch_state(AnimationState::Dancing);
        for _ in 0..10 {
            driver.advance();
        }

        let mut scene = Scene::default();
        scene.build(&driver, (800, 600), (300, 300), [7, 8, 9]);

        assert_eq!(scene.clear, [7, 8, 9]);
        assert_eq!(scene.draws.len(), 2);
        assert_eq!(scene.draws[0].image, ImageId(11));
        assert_eq!(scene.draws[0].instance.size, [800.0, 600.0]);
        assert_eq!(scene.draws[1].image, ImageId(0));
        assert_eq!(scene.draws[1].instance.uv_min, [1.0 / 3.0, 0.0]);
        assert_eq!(scene.draws[1].instance.uv_max, [2.0 / 3.0, 0.5]);
    }

    #[test]
    fn rebuild_replaces_previous_draws() {
        let mut driver = AnimationDriver::new(test_table([10; 5]), AnimationState::Jumping);
        let mut scene = Scene::default();
        scene.build(&driver, (800, 600), (300, 300), FILL);
        assert_eq!(scene.draws.len(), 2);

        driver.switch_state(AnimationState::Idle);
        scene.build(&driver, (800, 600), (300, 300), FILL);
        assert_eq!(scene.instances().count(), 1);
    }
}
