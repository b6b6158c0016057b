// device.rs - Graphics driver boundary

use crate::render::mesh::{DrawCommand, VertexLayout};
use gl::types::*;
use std::ffi::{c_void, CStr};
use std::fmt;
use std::ptr;

/// Pipeline phase a shader object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::Vertex => gl::VERTEX_SHADER,
            Self::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("Vertex"),
            Self::Fragment => f.write_str("Fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

impl BufferTarget {
    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::Vertex => gl::ARRAY_BUFFER,
            Self::Index => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Every call the crate makes into the driver goes through this trait.
///
/// Status queries must be made right after the call they check; the driver
/// keeps no queue of past failures.
pub trait Device {
    fn create_shader(&mut self, stage: ShaderStage) -> GLuint;
    fn compile_shader(&mut self, shader: GLuint, source: &CStr);
    fn compile_status(&self, shader: GLuint) -> bool;
    /// Reads at most `max_len` bytes of the stage's info log.
    fn shader_info_log(&self, shader: GLuint, max_len: usize) -> String;
    fn delete_shader(&mut self, shader: GLuint);

    fn create_program(&mut self) -> GLuint;
    fn attach_shader(&mut self, program: GLuint, shader: GLuint);
    fn link_program(&mut self, program: GLuint);
    fn link_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint, max_len: usize) -> String;
    fn use_program(&mut self, program: GLuint);
    fn delete_program(&mut self, program: GLuint);

    fn create_vertex_array(&mut self) -> GLuint;
    fn bind_vertex_array(&mut self, vao: GLuint);
    fn delete_vertex_array(&mut self, vao: GLuint);

    fn create_buffer(&mut self) -> GLuint;
    /// Binds `buffer` to `target` and uploads `data` with static-draw usage.
    fn buffer_data(&mut self, target: BufferTarget, buffer: GLuint, data: &[u8]);
    fn delete_buffer(&mut self, buffer: GLuint);

    /// Describes and enables one attribute of the bound vertex array.
    fn vertex_attrib_pointer(&mut self, layout: &VertexLayout);

    fn clear(&mut self, color: [f32; 4]);
    fn draw(&mut self, command: DrawCommand);
    fn viewport(&mut self, width: i32, height: i32);
}

/// Forwards to the global `gl` function table.
///
/// Only construct this once `gl::load_with` has run on a current context.
#[derive(Debug, Default)]
pub struct GlDevice {
    _private: (),
}

impl GlDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_log(
        object: GLuint,
        max_len: usize,
        getter: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
    ) -> String {
        let mut buffer = vec![0u8; max_len];
        let mut written: GLsizei = 0;
        unsafe {
            getter(
                object,
                max_len as GLsizei,
                &mut written,
                buffer.as_mut_ptr() as *mut GLchar,
            );
        }
        buffer.truncate((written.max(0) as usize).min(max_len));
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Device for GlDevice {
    fn create_shader(&mut self, stage: ShaderStage) -> GLuint {
        unsafe { gl::CreateShader(stage.gl_enum()) }
    }

    fn compile_shader(&mut self, shader: GLuint, source: &CStr) {
        unsafe {
            gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
            gl::CompileShader(shader);
        }
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        let mut success = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
        }
        success != 0
    }

    fn shader_info_log(&self, shader: GLuint, max_len: usize) -> String {
        Self::read_log(shader, max_len, gl::GetShaderInfoLog)
    }

    fn delete_shader(&mut self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&mut self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&mut self, program: GLuint) {
        unsafe { gl::LinkProgram(program) };
    }

    fn link_status(&self, program: GLuint) -> bool {
        let mut success = 0;
        unsafe {
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
        }
        success != 0
    }

    fn program_info_log(&self, program: GLuint, max_len: usize) -> String {
        Self::read_log(program, max_len, gl::GetProgramInfoLog)
    }

    fn use_program(&mut self, program: GLuint) {
        unsafe { gl::UseProgram(program) };
    }

    fn delete_program(&mut self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn create_vertex_array(&mut self) -> GLuint {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&mut self, vao: GLuint) {
        unsafe { gl::BindVertexArray(vao) };
    }

    fn delete_vertex_array(&mut self, vao: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &vao) };
    }

    fn create_buffer(&mut self) -> GLuint {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn buffer_data(&mut self, target: BufferTarget, buffer: GLuint, data: &[u8]) {
        unsafe {
            gl::BindBuffer(target.gl_enum(), buffer);
            gl::BufferData(
                target.gl_enum(),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&mut self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) };
    }

    fn vertex_attrib_pointer(&mut self, layout: &VertexLayout) {
        unsafe {
            gl::VertexAttribPointer(
                layout.index,
                layout.components,
                gl::FLOAT,
                if layout.normalized { gl::TRUE } else { gl::FALSE },
                layout.stride,
                layout.offset as *const c_void,
            );
            gl::EnableVertexAttribArray(layout.index);
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe {
            gl::ClearColor(r, g, b, a);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    fn draw(&mut self, command: DrawCommand) {
        unsafe {
            match command {
                DrawCommand::Arrays { first, count } => gl::DrawArrays(gl::TRIANGLES, first, count),
                DrawCommand::Elements { count } => {
                    gl::DrawElements(gl::TRIANGLES, count, gl::UNSIGNED_INT, ptr::null())
                }
            }
        }
    }

    fn viewport(&mut self, width: i32, height: i32) {
        unsafe { gl::Viewport(0, 0, width, height) };
    }
}

#[cfg(test)]
pub mod testing {
    //! A `Device` that records calls instead of talking to a driver.

    use super::*;
    use std::collections::{HashMap, HashSet};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        CreateShader(ShaderStage, GLuint),
        CompileShader(GLuint),
        DeleteShader(GLuint),
        CreateProgram(GLuint),
        AttachShader(GLuint, GLuint),
        LinkProgram(GLuint),
        UseProgram(GLuint),
        DeleteProgram(GLuint),
        CreateVertexArray(GLuint),
        BindVertexArray(GLuint),
        DeleteVertexArray(GLuint),
        CreateBuffer(GLuint),
        BufferData(BufferTarget, GLuint, usize),
        DeleteBuffer(GLuint),
        VertexAttribPointer(VertexLayout),
        Clear([f32; 4]),
        Draw(DrawCommand),
        Viewport(i32, i32),
    }

    #[derive(Debug, Default)]
    pub struct RecordingDevice {
        pub calls: Vec<Call>,
        /// Stages whose compilation reports failure.
        pub failing_stages: HashSet<ShaderStage>,
        pub fail_link: bool,
        /// Returned whole from `shader_info_log`, ignoring `max_len`.
        pub stage_log: String,
        pub link_log: String,
        pub uploads: HashMap<GLuint, Vec<u8>>,
        pub sources: HashMap<GLuint, String>,
        next_id: GLuint,
        stages: HashMap<GLuint, ShaderStage>,
        live: HashSet<GLuint>,
    }

    impl RecordingDevice {
        pub fn new() -> Self {
            Self {
                stage_log: "0:5(1): error: syntax error, unexpected '}'".to_string(),
                link_log: "error: linking with uncompiled shader".to_string(),
                ..Self::default()
            }
        }

        pub fn failing(stage: ShaderStage) -> Self {
            let mut device = Self::new();
            device.failing_stages.insert(stage);
            device
        }

        /// Objects created and not yet deleted.
        pub fn live_objects(&self) -> usize {
            self.live.len()
        }

        pub fn is_live(&self, id: GLuint) -> bool {
            self.live.contains(&id)
        }

        /// Calls issued after the first `skip` recorded ones.
        pub fn calls_since(&self, skip: usize) -> &[Call] {
            &self.calls[skip.min(self.calls.len())..]
        }

        fn allocate(&mut self) -> GLuint {
            self.next_id += 1;
            self.live.insert(self.next_id);
            self.next_id
        }

        fn release(&mut self, id: GLuint) {
            self.live.remove(&id);
        }
    }

    impl Device for RecordingDevice {
        fn create_shader(&mut self, stage: ShaderStage) -> GLuint {
            let id = self.allocate();
            self.stages.insert(id, stage);
            self.calls.push(Call::CreateShader(stage, id));
            id
        }

        fn compile_shader(&mut self, shader: GLuint, source: &CStr) {
            self.sources
                .insert(shader, source.to_string_lossy().into_owned());
            self.calls.push(Call::CompileShader(shader));
        }

        fn compile_status(&self, shader: GLuint) -> bool {
            self.stages
                .get(&shader)
                .map_or(false, |stage| !self.failing_stages.contains(stage))
        }

        fn shader_info_log(&self, _shader: GLuint, _max_len: usize) -> String {
            self.stage_log.clone()
        }

        fn delete_shader(&mut self, shader: GLuint) {
            self.release(shader);
            self.calls.push(Call::DeleteShader(shader));
        }

        fn create_program(&mut self) -> GLuint {
            let id = self.allocate();
            self.calls.push(Call::CreateProgram(id));
            id
        }

        fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
            self.calls.push(Call::AttachShader(program, shader));
        }

        fn link_program(&mut self, program: GLuint) {
            self.calls.push(Call::LinkProgram(program));
        }

        fn link_status(&self, _program: GLuint) -> bool {
            !self.fail_link && self.failing_stages.is_empty()
        }

        fn program_info_log(&self, _program: GLuint, _max_len: usize) -> String {
            self.link_log.clone()
        }

        fn use_program(&mut self, program: GLuint) {
            self.calls.push(Call::UseProgram(program));
        }

        fn delete_program(&mut self, program: GLuint) {
            self.release(program);
            self.calls.push(Call::DeleteProgram(program));
        }

        fn create_vertex_array(&mut self) -> GLuint {
            let id = self.allocate();
            self.calls.push(Call::CreateVertexArray(id));
            id
        }

        fn bind_vertex_array(&mut self, vao: GLuint) {
            self.calls.push(Call::BindVertexArray(vao));
        }

        fn delete_vertex_array(&mut self, vao: GLuint) {
            self.release(vao);
            self.calls.push(Call::DeleteVertexArray(vao));
        }

        fn create_buffer(&mut self) -> GLuint {
            let id = self.allocate();
            self.calls.push(Call::CreateBuffer(id));
            id
        }

        fn buffer_data(&mut self, target: BufferTarget, buffer: GLuint, data: &[u8]) {
            self.uploads.insert(buffer, data.to_vec());
            self.calls.push(Call::BufferData(target, buffer, data.len()));
        }

        fn delete_buffer(&mut self, buffer: GLuint) {
            self.release(buffer);
            self.calls.push(Call::DeleteBuffer(buffer));
        }

        fn vertex_attrib_pointer(&mut self, layout: &VertexLayout) {
            self.calls.push(Call::VertexAttribPointer(*layout));
        }

        fn clear(&mut self, color: [f32; 4]) {
            self.calls.push(Call::Clear(color));
        }

        fn draw(&mut self, command: DrawCommand) {
            self.calls.push(Call::Draw(command));
        }

        fn viewport(&mut self, width: i32, height: i32) {
            self.calls.push(Call::Viewport(width, height));
        }
    }
}
