use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::CELL_SIZE_PX;
use crate::gpu::{GpuContext, GridBuffers, RenderPipeline};
use crate::persistence;
use crate::simulation::{Engine, Grid, Position};

/// Startup options for the windowed app
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub tick_interval: Duration,
    pub seed: Option<u64>,
    pub snapshot_path: PathBuf,
    /// Start from this grid instead of a random one
    pub initial: Option<Grid>,
}

/// Application state
pub struct App {
    settings: Settings,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    render_pipeline: Option<RenderPipeline>,
    engine: Option<Engine<GridBuffers>>,
    running: bool,
    editing: bool,
    cursor: Option<PhysicalPosition<f64>>,
    next_tick: Instant,
    tick_counter: TickCounter,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            window: None,
            gpu: None,
            render_pipeline: None,
            engine: None,
            running: false,
            editing: false,
            cursor: None,
            next_tick: Instant::now(),
            tick_counter: TickCounter::new(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn std::error::Error>> {
        let (width, height) = match &self.settings.initial {
            Some(grid) => grid.dimensions(),
            None => (self.settings.width, self.settings.height),
        };

        log::info!("Initializing Game of Life...");
        log::info!("Grid size: {}x{}", width, height);

        let window_attrs = Window::default_attributes()
            .with_title("Game of Life")
            .with_inner_size(window_size(width, height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        let buffers = GridBuffers::new(
            &gpu.device,
            gpu.queue.clone(),
            window.clone(),
            width,
            height,
        )?;
        let mut engine = Engine::from_seed(width, height, buffers, self.settings.seed)?;

        match self.settings.initial.take() {
            Some(grid) => engine.import_snapshot(grid)?,
            None => engine.randomize(),
        }

        let render_pipeline = RenderPipeline::new(&gpu.device, gpu.format());

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Space: Start/pause");
        log::info!("  E: Toggle edit mode (click cells to flip them)");
        log::info!("  N: Single step");
        log::info!("  R: Randomize");
        log::info!("  C: Clear");
        log::info!("  S/L: Save/load {}", self.settings.snapshot_path.display());
        log::info!("  Escape: Quit");

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.render_pipeline = Some(render_pipeline);
        self.engine = Some(engine);
        self.update_title();
        Ok(())
    }

    fn render(&mut self) {
        let (Some(gpu), Some(pipeline), Some(engine)) = (
            self.gpu.as_ref(),
            self.render_pipeline.as_ref(),
            self.engine.as_ref(),
        ) else {
            return;
        };
        let buffers = engine.renderer();

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let bind_group = pipeline.create_bind_group(
            &gpu.device,
            &buffers.cells_buffer,
            &buffers.render_params_buffer,
        );
        pipeline.draw_cells(&mut encoder, &view, &bind_group);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
        if running {
            self.next_tick = Instant::now();
            self.tick_counter = TickCounter::new();
            if self.editing {
                self.set_editing(false);
            }
        }
        log::info!("{}", if running { "Running" } else { "Paused" });
    }

    fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
        if editing && self.running {
            self.set_running(false);
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.renderer_mut().set_editing(editing);
        }
        log::info!("Edit mode: {}", if editing { "ON" } else { "OFF" });
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Space => self.set_running(!self.running),
            KeyCode::KeyE => self.set_editing(!self.editing),
            KeyCode::KeyN => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.step();
                }
            }
            KeyCode::KeyR => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.randomize();
                }
            }
            KeyCode::KeyC => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.reset();
                }
            }
            KeyCode::KeyS => self.save(),
            KeyCode::KeyL => self.load(),
            _ => {}
        }
        self.update_title();
    }

    fn save(&self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        if let Err(e) = persistence::save(&self.settings.snapshot_path, &engine.export_snapshot()) {
            log::error!("Save failed: {}", e);
        }
    }

    fn load(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        // A failed load leaves the live grid as it was
        match persistence::load(&self.settings.snapshot_path) {
            Ok(grid) => {
                if let Err(e) = engine.import_snapshot(grid) {
                    log::error!("Load failed: {}", e);
                }
            }
            Err(e) => log::error!("Load failed: {}", e),
        }
    }

    fn handle_click(&mut self) {
        if !self.editing {
            return;
        }
        let (Some(cursor), Some(window), Some(engine)) =
            (self.cursor, self.window.as_ref(), self.engine.as_mut())
        else {
            return;
        };

        if let Some(position) = cell_at(cursor, window.inner_size(), engine.grid().dimensions()) {
            if let Err(e) = engine.toggle_cell(position) {
                log::error!("Edit failed: {}", e);
            }
            self.update_title();
        }
    }

    fn update_title(&self) {
        let (Some(window), Some(engine)) = (self.window.as_ref(), self.engine.as_ref()) else {
            return;
        };

        let mode = if self.editing {
            "Editing".to_string()
        } else if self.running {
            match self.tick_counter.rate {
                Some(rate) => format!("Running {:.0} gen/s", rate),
                None => "Running".to_string(),
            }
        } else {
            "Paused".to_string()
        };

        window.set_title(&format!(
            "Game of Life - Generation {} - {} alive - {}",
            engine.generation(),
            engine.grid().alive_count(),
            mode
        ));
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("Initialization failed: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => self.handle_click(),
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    gpu.resize(new_size);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.render(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.running {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let now = Instant::now();
        if now >= self.next_tick {
            if let Some(engine) = self.engine.as_mut() {
                engine.step();
            }
            self.tick_counter.tick();
            self.update_title();
            self.next_tick = now + self.settings.tick_interval;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }
}

/// Initial window size; saturates for grids too large to show at full cell size
fn window_size(width: usize, height: usize) -> LogicalSize<u32> {
    let side = |cells: usize| {
        u32::try_from(cells)
            .unwrap_or(u32::MAX)
            .saturating_mul(CELL_SIZE_PX)
    };
    LogicalSize::new(side(width), side(height))
}

/// Map a cursor position in the window to the grid cell under it
pub fn cell_at(
    cursor: PhysicalPosition<f64>,
    surface: PhysicalSize<u32>,
    (width, height): (usize, usize),
) -> Option<Position> {
    if surface.width == 0 || surface.height == 0 || cursor.x < 0.0 || cursor.y < 0.0 {
        return None;
    }

    let x = (cursor.x / surface.width as f64 * width as f64) as usize;
    let y = (cursor.y / surface.height as f64 * height as f64) as usize;
    (x < width && y < height).then_some(Position::new(x, y))
}

/// Generations-per-second counter
struct TickCounter {
    last_update: Instant,
    tick_count: u32,
    rate: Option<f64>,
}

impl TickCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            tick_count: 0,
            rate: None,
        }
    }

    /// Count one generation; refreshes `rate` once a second
    fn tick(&mut self) {
        self.tick_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            self.rate = Some(self.tick_count as f64 / elapsed.as_secs_f64());
            self.tick_count = 0;
            self.last_update = Instant::now();
        }
    }
}
