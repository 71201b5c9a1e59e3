//! An in-memory stand-in for a GL context, for tests.
//!
//! It tracks objects, bindings and completeness closely enough to observe
//! what the wrappers ask of the driver, and counts every delete call so
//! double releases show up.

use super::driver::Driver;
use super::error::{GlError, GlResult};
use super::shader::shader::Stage;
use super::texture::PixelFormat;
use super::uniform::{UniformLocation, UniformValue};
use gl::types::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CStr;

pub const VERTEX_SRC: &str = "attribute vec4 position;
uniform mat4 mvp;
void main() {
    gl_Position = mvp * position;
}
";

pub const FRAGMENT_SRC: &str = "precision mediump float;
uniform vec4 tint;
void main() {
    gl_FragColor = tint;
}
";

const MAX_VERTEX_ATTRIBS: GLuint = 16;
const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: GLenum = 0x8CD9;

#[derive(Debug)]
struct FakeShader {
    stage: Stage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<GLuint>,
    attribs: HashMap<String, GLuint>,
    uniforms: Vec<String>,
    link_requested: bool,
    linked: bool,
    validated: bool,
    log: String,
}

#[derive(Debug, Default)]
struct FakeTexture {
    levels: HashMap<GLint, (GLsizei, GLsizei, PixelFormat, bool)>,
    parameters: HashMap<GLenum, GLint>,
}

#[derive(Debug, Default)]
struct State {
    next_id: GLuint,
    exhausted: bool,
    validation_rejection: Option<String>,
    deletions: HashMap<GLuint, usize>,

    shaders: HashMap<GLuint, FakeShader>,
    programs: HashMap<GLuint, FakeProgram>,
    textures: HashMap<GLuint, FakeTexture>,
    renderbuffers: HashMap<GLuint, Option<(GLenum, GLsizei, GLsizei)>>,
    framebuffers: HashMap<GLuint, HashMap<GLenum, (GLenum, GLuint, GLint)>>,

    bound_texture: GLuint,
    bound_renderbuffer: GLuint,
    bound_framebuffer: GLuint,
    current_program: GLuint,
    uniform_values: HashMap<(GLuint, UniformLocation), UniformValue>,
}

impl State {
    fn allocate(&mut self) -> GLuint {
        if self.exhausted {
            return 0;
        }
        self.next_id += 1;
        self.next_id
    }

    fn record_deletion(&mut self, id: GLuint) {
        if id != 0 {
            *self.deletions.entry(id).or_insert(0) += 1;
        }
    }

    fn attachment_size(&self, kind: GLenum, id: GLuint, level: GLint) -> Option<(GLsizei, GLsizei)> {
        match kind {
            gl::TEXTURE => self.textures.get(&id)?.levels.get(&level).map(|&(w, h, _, _)| (w, h)),
            _ => {
                let (_, w, h) = (*self.renderbuffers.get(&id)?)?;
                Some((w, h))
            }
        }
    }
}

fn error(code: GLenum) -> GlResult<()> {
    Err(GlError::new(code))
}

#[derive(Debug, Default)]
pub struct FakeDriver {
    state: RefCell<State>,
}

impl FakeDriver {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        FakeDriver::default()
    }

    /// A driver that hands out handle 0 for every new object.
    pub fn exhausted() -> Self {
        let driver = FakeDriver::new();
        driver.state.borrow_mut().exhausted = true;
        driver
    }

    /// Makes every later validation of a linked program fail with `log`.
    pub fn reject_validation(&self, log: &str) {
        self.state.borrow_mut().validation_rejection = Some(log.to_string());
    }

    pub fn deletions(&self, id: GLuint) -> usize {
        self.state.borrow().deletions.get(&id).cloned().unwrap_or(0)
    }

    pub fn shader_stage(&self, id: GLuint) -> Option<Stage> {
        self.state.borrow().shaders.get(&id).map(|shader| shader.stage)
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn is_attached(&self, program: GLuint, shader: GLuint) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |p| p.attached.contains(&shader))
    }

    pub fn link_requested(&self, program: GLuint) -> bool {
        self.state.borrow().programs.get(&program).map_or(false, |p| p.link_requested)
    }

    pub fn attrib_binding(&self, program: GLuint, name: &str) -> Option<GLuint> {
        self.state.borrow().programs.get(&program)?.attribs.get(name).cloned()
    }

    pub fn current_program(&self) -> GLuint {
        self.state.borrow().current_program
    }

    pub fn uniform_value(&self, program: GLuint, location: UniformLocation) -> Option<UniformValue> {
        self.state.borrow().uniform_values.get(&(program, location)).cloned()
    }

    pub fn bound_texture(&self) -> GLuint {
        self.state.borrow().bound_texture
    }

    pub fn texture_storage(&self, id: GLuint, level: GLint) -> Option<(GLsizei, GLsizei, PixelFormat)> {
        let state = self.state.borrow();
        let &(w, h, format, _) = state.textures.get(&id)?.levels.get(&level)?;
        Some((w, h, format))
    }

    pub fn texture_has_data(&self, id: GLuint, level: GLint) -> bool {
        let state = self.state.borrow();
        state
            .textures
            .get(&id)
            .and_then(|t| t.levels.get(&level))
            .map_or(false, |&(_, _, _, data)| data)
    }

    pub fn texture_parameter(&self, id: GLuint, pname: GLenum) -> Option<GLint> {
        self.state.borrow().textures.get(&id)?.parameters.get(&pname).cloned()
    }

    pub fn bound_renderbuffer(&self) -> GLuint {
        self.state.borrow().bound_renderbuffer
    }

    pub fn renderbuffer_storage_of(&self, id: GLuint) -> Option<(GLenum, GLsizei, GLsizei)> {
        self.state.borrow().renderbuffers.get(&id).cloned().and_then(|storage| storage)
    }

    pub fn bound_framebuffer(&self) -> GLuint {
        self.state.borrow().bound_framebuffer
    }

    pub fn framebuffer_attachment(&self, framebuffer: GLuint, attachment: GLenum) -> Option<GLuint> {
        let state = self.state.borrow();
        state.framebuffers.get(&framebuffer)?.get(&attachment).map(|&(_, id, _)| id)
    }

    fn attach_to_framebuffer(&self, attachment: GLenum, kind: GLenum, id: GLuint, level: GLint) -> GlResult<()> {
        let mut state = self.state.borrow_mut();
        let bound = state.bound_framebuffer;
        let exists = match kind {
            gl::TEXTURE => id == 0 || state.textures.contains_key(&id),
            _ => id == 0 || state.renderbuffers.contains_key(&id),
        };
        if !exists {
            return error(gl::INVALID_OPERATION);
        }
        let attachments = match state.framebuffers.get_mut(&bound) {
            Some(attachments) => attachments,
            None => return error(gl::INVALID_OPERATION),
        };
        if id == 0 {
            attachments.remove(&attachment);
        } else {
            attachments.insert(attachment, (kind, id, level));
        }
        Ok(())
    }
}

impl Driver for FakeDriver {
    fn create_shader(&self, stage: Stage) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        if id != 0 {
            let shader = FakeShader { stage, source: String::new(), compiled: false, log: String::new() };
            state.shaders.insert(id, shader);
        }
        id
    }

    fn shader_source(&self, shader: GLuint, source: &str) -> GlResult<()> {
        match self.state.borrow_mut().shaders.get_mut(&shader) {
            Some(shader) => {
                shader.source = source.to_string();
                Ok(())
            }
            None => error(gl::INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader: GLuint) -> GlResult<()> {
        match self.state.borrow_mut().shaders.get_mut(&shader) {
            Some(shader) => {
                shader.compiled = shader.source.contains("void main");
                shader.log = if shader.compiled {
                    String::new()
                } else {
                    "ERROR: 0:1: '' : syntax error\n".to_string()
                };
                Ok(())
            }
            None => error(gl::INVALID_VALUE),
        }
    }

    fn shader_parameter(&self, shader: GLuint, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        let shader = match state.shaders.get(&shader) {
            Some(shader) => shader,
            None => return 0,
        };
        match pname {
            gl::COMPILE_STATUS => shader.compiled as GLint,
            gl::INFO_LOG_LENGTH if shader.log.is_empty() => 0,
            gl::INFO_LOG_LENGTH => shader.log.len() as GLint + 1,
            gl::SHADER_TYPE => shader.stage as GLint,
            _ => 0,
        }
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        self.state.borrow().shaders.get(&shader).map(|s| s.log.clone()).unwrap_or_default()
    }

    fn delete_shader(&self, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        state.record_deletion(shader);
        state.shaders.remove(&shader);
    }

    fn create_program(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        if id != 0 {
            state.programs.insert(id, FakeProgram::default());
        }
        id
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) -> GlResult<()> {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            return error(gl::INVALID_VALUE);
        }
        let program = match state.programs.get_mut(&program) {
            Some(program) => program,
            None => return error(gl::INVALID_VALUE),
        };
        if program.attached.contains(&shader) {
            return error(gl::INVALID_OPERATION);
        }
        program.attached.push(shader);
        Ok(())
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) -> GlResult<()> {
        let mut state = self.state.borrow_mut();
        let program = match state.programs.get_mut(&program) {
            Some(program) => program,
            None => return error(gl::INVALID_VALUE),
        };
        match program.attached.iter().position(|&id| id == shader) {
            Some(index) => {
                program.attached.remove(index);
                Ok(())
            }
            None => error(gl::INVALID_OPERATION),
        }
    }

    fn bind_attrib_location(&self, program: GLuint, index: GLuint, name: &CStr) -> GlResult<()> {
        let name = name.to_string_lossy().into_owned();
        if index >= MAX_VERTEX_ATTRIBS {
            return error(gl::INVALID_VALUE);
        }
        if name.starts_with("gl_") {
            return error(gl::INVALID_OPERATION);
        }
        match self.state.borrow_mut().programs.get_mut(&program) {
            Some(program) => {
                program.attribs.insert(name, index);
                Ok(())
            }
            None => error(gl::INVALID_VALUE),
        }
    }

    fn link_program(&self, program: GLuint) -> GlResult<()> {
        let mut state = self.state.borrow_mut();
        let (stages, uniforms) = match state.programs.get(&program) {
            Some(fake) => {
                let shaders: Vec<&FakeShader> =
                    fake.attached.iter().filter_map(|id| state.shaders.get(id)).collect();
                let stages: Vec<(Stage, bool)> = shaders.iter().map(|s| (s.stage, s.compiled)).collect();
                let uniforms: Vec<String> = shaders
                    .iter()
                    .flat_map(|s| s.source.lines())
                    .filter(|line| line.trim_start().starts_with("uniform "))
                    .filter_map(|line| line.trim().trim_end_matches(';').split_whitespace().last())
                    .map(String::from)
                    .collect();
                (stages, uniforms)
            }
            None => return error(gl::INVALID_VALUE),
        };

        let mut log = String::new();
        for &stage in &[Stage::Vertex, Stage::Fragment] {
            if !stages.iter().any(|&(s, compiled)| s == stage && compiled) {
                log.push_str(&format!("error: no compiled {} shader attached\n", stage));
            }
        }

        if let Some(fake) = state.programs.get_mut(&program) {
            fake.link_requested = true;
            fake.linked = log.is_empty();
            fake.uniforms = if fake.linked { uniforms } else { Vec::new() };
            fake.log = log;
        }
        Ok(())
    }

    fn validate_program(&self, program: GLuint) -> GlResult<()> {
        let mut state = self.state.borrow_mut();
        let rejection = state.validation_rejection.clone();
        let fake = match state.programs.get_mut(&program) {
            Some(fake) => fake,
            None => return error(gl::INVALID_VALUE),
        };
        let log = if fake.linked {
            rejection
        } else {
            Some("validation failed: program is not linked\n".to_string())
        };
        fake.validated = log.is_none();
        fake.log = log.unwrap_or_default();
        Ok(())
    }

    fn program_parameter(&self, program: GLuint, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        let program = match state.programs.get(&program) {
            Some(program) => program,
            None => return 0,
        };
        match pname {
            gl::LINK_STATUS => program.linked as GLint,
            gl::VALIDATE_STATUS => program.validated as GLint,
            gl::INFO_LOG_LENGTH if program.log.is_empty() => 0,
            gl::INFO_LOG_LENGTH => program.log.len() as GLint + 1,
            gl::ATTACHED_SHADERS => program.attached.len() as GLint,
            _ => 0,
        }
    }

    fn program_info_log(&self, program: GLuint) -> String {
        self.state.borrow().programs.get(&program).map(|p| p.log.clone()).unwrap_or_default()
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> UniformLocation {
        let state = self.state.borrow();
        let name = name.to_string_lossy();
        state
            .programs
            .get(&program)
            .and_then(|p| p.uniforms.iter().position(|u| *u == name))
            .map_or(-1, |index| index as UniformLocation)
    }

    fn use_program(&self, program: GLuint) -> GlResult<()> {
        let mut state = self.state.borrow_mut();
        if program != 0 {
            match state.programs.get(&program) {
                Some(fake) if fake.linked => {}
                Some(_) => return error(gl::INVALID_OPERATION),
                None => return error(gl::INVALID_VALUE),
            }
        }
        state.current_program = program;
        Ok(())
    }

    fn uniform(&self, location: UniformLocation, value: UniformValue) -> GlResult<()> {
        let mut state = self.state.borrow_mut();
        let current = state.current_program;
        let linked = state.programs.get(&current).map_or(false, |p| p.linked);
        if !linked {
            return error(gl::INVALID_OPERATION);
        }
        if location != -1 {
            state.uniform_values.insert((current, location), value);
        }
        Ok(())
    }

    fn delete_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        state.record_deletion(program);
        state.programs.remove(&program);
        if state.current_program == program {
            state.current_program = 0;
        }
    }

    fn gen_texture(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        if id != 0 {
            state.textures.insert(id, FakeTexture::default());
        }
        id
    }

    fn bind_texture(&self, texture: GLuint) -> GlResult<()> {
        self.state.borrow_mut().bound_texture = texture;
        Ok(())
    }

    fn tex_image_2d(
        &self,
        level: GLint,
        format: &PixelFormat,
        width: GLsizei,
        height: GLsizei,
        data: Option<&[u8]>,
    ) -> GlResult<()> {
        if level < 0 || width < 0 || height < 0 {
            return error(gl::INVALID_VALUE);
        }
        let mut state = self.state.borrow_mut();
        let bound = state.bound_texture;
        match state.textures.get_mut(&bound) {
            Some(texture) => {
                texture.levels.insert(level, (width, height, *format, data.is_some()));
                Ok(())
            }
            None => error(gl::INVALID_OPERATION),
        }
    }

    fn tex_parameter(&self, pname: GLenum, param: GLint) -> GlResult<()> {
        match pname {
            gl::TEXTURE_MIN_FILTER | gl::TEXTURE_MAG_FILTER | gl::TEXTURE_WRAP_S | gl::TEXTURE_WRAP_T => {}
            _ => return error(gl::INVALID_ENUM),
        }
        let mut state = self.state.borrow_mut();
        let bound = state.bound_texture;
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.parameters.insert(pname, param);
        }
        Ok(())
    }

    fn delete_texture(&self, texture: GLuint) {
        let mut state = self.state.borrow_mut();
        state.record_deletion(texture);
        state.textures.remove(&texture);
        if state.bound_texture == texture {
            state.bound_texture = 0;
        }
    }

    fn gen_renderbuffer(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        if id != 0 {
            state.renderbuffers.insert(id, None);
        }
        id
    }

    fn bind_renderbuffer(&self, renderbuffer: GLuint) -> GlResult<()> {
        self.state.borrow_mut().bound_renderbuffer = renderbuffer;
        Ok(())
    }

    fn renderbuffer_storage(&self, format: GLenum, width: GLsizei, height: GLsizei) -> GlResult<()> {
        if width < 0 || height < 0 {
            return error(gl::INVALID_VALUE);
        }
        let mut state = self.state.borrow_mut();
        let bound = state.bound_renderbuffer;
        match state.renderbuffers.get_mut(&bound) {
            Some(storage) => {
                *storage = Some((format, width, height));
                Ok(())
            }
            None => error(gl::INVALID_OPERATION),
        }
    }

    fn delete_renderbuffer(&self, renderbuffer: GLuint) {
        let mut state = self.state.borrow_mut();
        state.record_deletion(renderbuffer);
        state.renderbuffers.remove(&renderbuffer);
        if state.bound_renderbuffer == renderbuffer {
            state.bound_renderbuffer = 0;
        }
    }

    fn gen_framebuffer(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        if id != 0 {
            state.framebuffers.insert(id, HashMap::new());
        }
        id
    }

    fn bind_framebuffer(&self, framebuffer: GLuint) -> GlResult<()> {
        self.state.borrow_mut().bound_framebuffer = framebuffer;
        Ok(())
    }

    fn framebuffer_texture_2d(&self, attachment: GLenum, texture: GLuint, level: GLint) -> GlResult<()> {
        self.attach_to_framebuffer(attachment, gl::TEXTURE, texture, level)
    }

    fn framebuffer_renderbuffer(&self, attachment: GLenum, renderbuffer: GLuint) -> GlResult<()> {
        self.attach_to_framebuffer(attachment, gl::RENDERBUFFER, renderbuffer, 0)
    }

    fn check_framebuffer_status(&self) -> GLenum {
        let state = self.state.borrow();
        let attachments = match state.framebuffers.get(&state.bound_framebuffer) {
            Some(attachments) => attachments,
            // The default frame buffer is always complete.
            None => return gl::FRAMEBUFFER_COMPLETE,
        };
        if attachments.is_empty() {
            return gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT;
        }

        let mut size = None;
        for &(kind, id, level) in attachments.values() {
            let dims = match state.attachment_size(kind, id, level) {
                Some(dims) if dims.0 > 0 && dims.1 > 0 => dims,
                _ => return gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT,
            };
            match size {
                None => size = Some(dims),
                Some(existing) if existing != dims => return FRAMEBUFFER_INCOMPLETE_DIMENSIONS,
                Some(_) => {}
            }
        }
        gl::FRAMEBUFFER_COMPLETE
    }

    fn delete_framebuffer(&self, framebuffer: GLuint) {
        let mut state = self.state.borrow_mut();
        state.record_deletion(framebuffer);
        state.framebuffers.remove(&framebuffer);
        if state.bound_framebuffer == framebuffer {
            state.bound_framebuffer = 0;
        }
    }
}
