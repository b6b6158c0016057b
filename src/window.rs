use crate::config::window::WindowConfig;
use crate::render::device::Device;
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{Display, GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow as _};
use log::{info, warn};
use raw_window_handle::HasRawWindowHandle;
use std::{
    ffi::{CStr, CString},
    num::NonZeroU32,
    ptr,
};
use thiserror::Error;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    error::EventLoopError,
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("Event loop could not be created: {0}")]
    EventLoop(#[from] EventLoopError),
    #[error("Window failed to build!!! {0}")]
    Window(String),
    #[error("OpenGL context setup failed: {0}")]
    Context(#[from] glutin::error::Error),
    #[error("OpenGL loader failed to initialize: {0} is unavailable")]
    Loader(&'static str),
}

/// Entry points the render path cannot run without.
const REQUIRED_FUNCTIONS: &[(&str, fn() -> bool)] = &[
    ("glCreateShader", gl::CreateShader::is_loaded),
    ("glCompileShader", gl::CompileShader::is_loaded),
    ("glCreateProgram", gl::CreateProgram::is_loaded),
    ("glLinkProgram", gl::LinkProgram::is_loaded),
    ("glGenVertexArrays", gl::GenVertexArrays::is_loaded),
    ("glGenBuffers", gl::GenBuffers::is_loaded),
    ("glBufferData", gl::BufferData::is_loaded),
    ("glVertexAttribPointer", gl::VertexAttribPointer::is_loaded),
    ("glDrawArrays", gl::DrawArrays::is_loaded),
    ("glDrawElements", gl::DrawElements::is_loaded),
    ("glClear", gl::Clear::is_loaded),
];

/// A window with a current OpenGL context bound to its surface.
pub struct GlWindow {
    window: Window,
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
}

impl GlWindow {
    pub fn create(config: &WindowConfig) -> Result<(Self, EventLoop<()>), InitError> {
        let event_loop = EventLoop::new()?;
        let window_builder = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(config.width, config.height));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |configs| {
                // glutin only calls the picker with at least one matching config.
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .expect("display offered no framebuffer configs")
            })
            .map_err(|e| InitError::Window(e.to_string()))?;

        let window = window.ok_or_else(|| InitError::Window("no window was created".into()))?;
        let raw_window_handle = window.raw_window_handle();

        let (major, minor) = config.gl_version();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes)? };

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs)? };
        let gl_context = not_current.make_current(&gl_surface)?;

        load_gl(&gl_display)?;
        log_driver_info();

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = gl_surface.set_swap_interval(&gl_context, interval) {
            warn!("Could not set swap interval: {}", e);
        }

        info!(
            "Created {}x{} window with OpenGL {}.{} core context",
            config.width, config.height, major, minor
        );

        Ok((
            Self {
                window,
                gl_context,
                gl_surface,
            },
            event_loop,
        ))
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Swaps the back buffer to the display.
    pub fn present(&self) -> Result<(), glutin::error::Error> {
        self.gl_surface.swap_buffers(&self.gl_context)
    }

    pub fn resize<D: Device>(&self, device: &mut D, size: PhysicalSize<u32>) {
        // Minimized windows report a zero size.
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return;
        };
        self.gl_surface.resize(&self.gl_context, width, height);
        device.viewport(size.width as i32, size.height as i32);
    }
}

fn load_gl(display: &Display) -> Result<(), InitError> {
    gl::load_with(|symbol| match CString::new(symbol) {
        Ok(symbol) => display.get_proc_address(symbol.as_c_str()) as *const _,
        Err(_) => ptr::null(),
    });

    match REQUIRED_FUNCTIONS.iter().find(|(_, is_loaded)| !is_loaded()) {
        Some((name, _)) => Err(InitError::Loader(*name)),
        None => Ok(()),
    }
}

fn log_driver_info() {
    for (label, name) in [
        ("Vendor", gl::VENDOR),
        ("Renderer", gl::RENDERER),
        ("Version", gl::VERSION),
    ] {
        let value = unsafe { gl::GetString(name) };
        if !value.is_null() {
            let value = unsafe { CStr::from_ptr(value as *const _) };
            info!("OpenGL {}: {}", label, value.to_string_lossy());
        }
    }
}
