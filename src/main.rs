use anyhow::{Context, Result};
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::io::{self, BufRead, Write};
use winit::{
    event::{Event, StartCause, WindowEvent},
    event_loop::ControlFlow,
};

use advgl::{
    config::core::{AppConfig, LoggingConfig},
    engine::RenderContext,
    render::device::GlDevice,
    window::GlWindow,
};

struct App {
    gl_window: GlWindow,
    device: GlDevice,
    context: Option<RenderContext>,
}

impl App {
    fn new(config: &AppConfig) -> Result<(Self, winit::event_loop::EventLoop<()>)> {
        info!("Initializing application...");

        let (gl_window, event_loop) =
            GlWindow::create(&config.window).context("OpenGL window setup failed")?;

        let mut device = GlDevice::new();
        let context = RenderContext::init(&mut device, &config.rendering)
            .context("Render context initialization failed")?;

        Ok((
            Self {
                gl_window,
                device,
                context: Some(context),
            },
            event_loop,
        ))
    }

    fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.cleanup();
                true
            }
            WindowEvent::Resized(size) => {
                self.gl_window.resize(&mut self.device, size);
                false
            }
            WindowEvent::RedrawRequested => self.update(),
            _ => false,
        }
    }

    /// Draws and presents one frame. Returns `true` when the loop should stop.
    fn update(&mut self) -> bool {
        let Some(context) = self.context.as_mut() else {
            return false;
        };
        if !context.frame(&mut self.device) {
            return false;
        }
        if let Err(e) = self.gl_window.present() {
            error!("Failed to present frame: {}", e);
            self.cleanup();
            return true;
        }
        false
    }

    fn cleanup(&mut self) {
        if let Some(mut context) = self.context.take() {
            context.request_close();
            info!("Rendered {} frames", context.frames_rendered());
            context.shutdown(&mut self.device);
        }
    }
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = config.level_filter();
    SimpleLogger::new()
        .with_level(level.unwrap_or(LevelFilter::Info))
        .init()?;
    if level.is_none() {
        warn!("Unknown log level '{}', using info", config.level);
    }
    Ok(())
}

fn run(config: &AppConfig) -> Result<()> {
    let (mut app, event_loop) = App::new(config)?;

    event_loop
        .run(move |event, elwt| match event {
            Event::NewEvents(StartCause::Init) => elwt.set_control_flow(ControlFlow::Poll),
            Event::WindowEvent { event, window_id } if window_id == app.gl_window.window().id() => {
                if app.handle_window_event(event) {
                    elwt.exit();
                }
            }
            Event::AboutToWait => app.gl_window.window().request_redraw(),
            _ => (),
        })
        .context("winit event loop terminated with error")?;

    Ok(())
}

fn pause() {
    print!("Press Enter to continue . . . ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

fn main() -> Result<()> {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&config.logging)?;
    if let Some(e) = config_error {
        warn!("Falling back to default configuration: {:#}", e);
    }

    // Setup failures are reported, not propagated: the process still exits 0.
    if let Err(e) = run(&config) {
        error!("{:#}", e);
    }

    if config.pause_on_exit {
        pause();
    }
    Ok(())
}
