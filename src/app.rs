use std::sync::Arc;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::animation::{AnimationDriver, AnimationState, StateTable};
use crate::assets::{self, AssetStore};
use crate::config::Config;
use crate::error::Error;
use crate::input::KeyBindings;
use crate::overlay::TextOverlay;
use crate::render::instance::Scene;
use crate::render::GpuState;
use crate::sprite::ImageHandle;

/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;

// ---------------------------------------------------------------------------
// Fixed timestep
// ---------------------------------------------------------------------------

/// Turns variable frame times into a whole number of fixed ticks.
#[derive(Debug, Clone)]
struct FixedStep {
    period: f64,
    accumulator: f64,
}

impl FixedStep {
    fn new(period: f64) -> Self {
        Self {
            period,
            accumulator: 0.0,
        }
    }

    /// Add `dt` seconds and return how many ticks are now due.
    /// The backlog is capped at `MAX_ACCUMULATOR`, or one period if longer.
    fn accumulate(&mut self, dt: f64) -> u32 {
        self.accumulator = (self.accumulator + dt).min(MAX_ACCUMULATOR.max(self.period));

        let mut ticks = 0;
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            ticks += 1;
        }
        ticks
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    config: Config,
    bindings: KeyBindings,
    driver: AnimationDriver,
    /// Every decoded image, indexed by `ImageId`; uploaded once the GPU exists.
    images: Vec<ImageHandle>,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<TextOverlay>,

    // Reused every frame
    scene: Scene,

    // Fixed timestep
    step: FixedStep,
    last_frame_time: Option<Instant>,
    tick_count: u64,

    /// First fatal error raised inside the event loop.
    fatal: Option<Error>,
}

impl App {
    fn new(config: Config, table: StateTable, store: AssetStore) -> Self {
        let bindings = KeyBindings::from_config(&config.states);
        let step = FixedStep::new(config.timing.tick_period());
        Self {
            bindings,
            driver: AnimationDriver::new(table, AnimationState::Idle),
            images: store.images().to_vec(),
            window: None,
            gpu: None,
            overlay: None,
            scene: Scene::default(),
            step,
            last_frame_time: None,
            tick_count: 0,
            fatal: None,
            config,
        }
    }

    /// Create the window, GPU state and overlay.
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Error> {
        let attrs = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = GpuState::new(window.clone(), &self.images)?;
        log::info!("wgpu + sprite pipeline initialized");

        let overlay = TextOverlay::new(&window, &gpu, &self.bindings.help_text());

        self.gpu = Some(gpu);
        self.overlay = Some(overlay);
        self.window = Some(window);
        Ok(())
    }

    /// Run the animation ticks that are due after `dt` seconds.
    fn run_fixed_update(&mut self, dt: f64) {
        let ticks = self.step.accumulate(dt);
        for _ in 0..ticks {
            self.driver.advance();
            self.tick_count += 1;
        }
    }

    fn log_final_state(&self) {
        log::info!(
            "{} ticks run; last state {} at frame {}, timer {}",
            self.tick_count,
            self.driver.state(),
            self.driver.index(),
            self.driver.timer()
        );
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => {
                log::info!("ESC pressed, exiting");
                self.log_final_state();
                event_loop.exit();
            }
            key => {
                if let Some(state) = self.bindings.state_for_key(key) {
                    if state != self.driver.state() {
                        self.driver.switch_state(state);
                        log::info!(
                            "State: {} ({} frames, {} ticks per frame)",
                            state,
                            self.driver.frame_count(),
                            self.driver.cadence()
                        );
                    }
                }
            }
        }
    }

    /// Tick, build the scene, and draw it with the text overlay on top.
    fn redraw(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            self.run_fixed_update(now.duration_since(last).as_secs_f64());
        }
        self.last_frame_time = Some(now);

        let (Some(window), Some(gpu), Some(overlay)) =
            (&self.window, &mut self.gpu, &mut self.overlay)
        else {
            return;
        };

        let screen = (gpu.surface_config.width, gpu.surface_config.height);
        self.scene.build(
            &self.driver,
            screen,
            self.config.sprite.display_size(),
            self.config.sprite.fill_color,
        );
        gpu.update_scene(&self.scene);

        let Some(mut frame) = gpu.begin_frame() else {
            return;
        };
        gpu.draw_scene(&mut frame.encoder, &frame.view, &self.scene);

        let text = overlay.layout(window, self.driver.state(), [screen.0, screen.1]);
        let extra_cmd_bufs = overlay.upload(gpu, &mut frame.encoder, &text);
        {
            let mut pass = GpuState::begin_egui_pass(&mut frame.encoder, &frame.view);
            overlay.paint(&mut pass, &text);
        }

        gpu.finish_frame(frame.encoder, frame.output, extra_cmd_bufs);
        overlay.release(&text);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init_window(event_loop) {
            self.fatal = Some(e);
            event_loop.exit();
            return;
        }

        // Continuous game loop
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(overlay)) = (&self.window, &mut self.overlay) {
            overlay.on_window_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                self.log_final_state();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, &event),
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

/// Entry point: load every asset, then open the window and run.
///
/// Asset and config failures surface here before any window exists.
pub fn run(config: Config) -> Result<(), Error> {
    let mut store = AssetStore::new();
    let table = assets::build_state_table(&config, &mut store)?;
    let total_frames: usize = table.iter().map(|(_, assets)| assets.frames.len()).sum();
    log::info!(
        "Loaded {} images, {} frames across {} states",
        store.images().len(),
        total_frames,
        AnimationState::ALL.len()
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, table, store);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tests::test_table;

    #[test]
    fn fixed_step_emits_whole_ticks_and_keeps_remainder() {
        let mut step = FixedStep::new(0.0625);
        assert_eq!(step.accumulate(0.03125), 0);
        assert_eq!(step.accumulate(0.0625), 1);
        assert_eq!(step.accumulator, 0.03125);
        assert_eq!(step.accumulate(0.125), 2);
    }

    #[test]
    fn fixed_step_clamps_long_stalls() {
        let mut step = FixedStep::new(0.125);
        // A 2 s hitch runs at most MAX_ACCUMULATOR worth of ticks.
        assert_eq!(step.accumulate(2.0), 2);
        assert_eq!(step.accumulator, 0.0);
    }

    #[test]
    fn slow_tick_rates_still_tick() {
        let mut config = Config::default();
        config.timing.tick_rate = 2;
        let mut step = FixedStep::new(config.timing.tick_period());

        let mut ticks = 0;
        for _ in 0..600 {
            ticks += step.accumulate(1.0 / 60.0);
        }
        // 10 s at 2 Hz; float drift may leave the last tick pending
        assert!((19..=20).contains(&ticks), "got {ticks}");

        let mut step = FixedStep::new(1.0);
        assert_eq!(step.accumulate(5.0), 1);
    }

    #[test]
    fn fixed_update_advances_the_driver() {
        let mut config = Config::default();
        config.timing.tick_rate = 10;
        let mut app = App::new(config, test_table([2; 5]), AssetStore::new());
        app.driver.switch_state(AnimationState::Dancing);

        app.run_fixed_update(0.21);
        assert_eq!(app.tick_count, 2);
        assert_eq!(app.driver.timer(), 2);
        assert_eq!(app.driver.index(), 1);
    }
}
