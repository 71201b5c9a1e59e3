use gl::types::*;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

pub mod program;
pub mod shader;

use self::program::*;
use self::shader::*;
use crate::gl_api::driver::Driver;
use crate::gl_api::error::{CreationError, GlError};

/// The outcome of a compile, link or validate request along with the
/// driver's info log, passed through verbatim.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Status {
    pub success: bool,
    pub log: String,
}

impl Status {
    pub fn into_result(self) -> Result<String, String> {
        if self.success {
            Ok(self.log)
        } else {
            Err(self.log)
        }
    }
}

// Shared by shaders and programs: read the log first, since a failure
// releases the object the log belongs to.
pub(crate) fn collect_status<L, P, R>(id: &mut GLuint, log: L, param: P, release: R) -> Status
where
    L: FnOnce(GLuint) -> String,
    P: FnOnce(GLuint) -> GLint,
    R: FnOnce(GLuint),
{
    if *id == 0 {
        return Status::default();
    }

    let log = log(*id);
    if param(*id) == gl::FALSE as GLint {
        release(*id);
        *id = 0;
        Status { success: false, log }
    } else {
        Status { success: true, log }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Creation(#[from] CreationError),
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: Stage, log: String },
    #[error("program failed to link:\n{0}")]
    Link(String),
    #[error("program failed validation:\n{0}")]
    Validate(String),
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Gl(#[from] GlError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn compile<D: Driver>(shader: &mut Shader<'_, D>) -> Result<(), PipelineError> {
    let status = shader.status();
    if status.success {
        Ok(())
    } else {
        Err(PipelineError::Compile { stage: shader.stage(), log: status.log })
    }
}

/// Compiles a vertex and fragment shader, binds the given attribute slots,
/// then links and validates a program from them. The shaders are detached
/// and released before returning.
pub fn simple_pipeline<'gl, 's, D: Driver>(
    gl: &'gl D,
    vertex: &str,
    fragment: &str,
    attributes: &[(&str, GLuint)],
) -> Result<Program<'gl, 's, D>, PipelineError> {
    let mut vert_shader = Shader::new(gl, Stage::Vertex)?;
    let mut frag_shader = Shader::new(gl, Stage::Fragment)?;

    vert_shader.source(vertex)?;
    frag_shader.source(fragment)?;
    compile(&mut vert_shader)?;
    compile(&mut frag_shader)?;

    let mut program = Program::new(gl)?;
    program.attach(&vert_shader)?;
    program.attach(&frag_shader)?;
    for &(name, index) in attributes {
        program.bind_attrib_name(name, index)?;
    }

    program.link()?;
    let linked = program.link_status();
    if !linked.success {
        return Err(PipelineError::Link(linked.log));
    }

    program.validate()?;
    let validated = program.validate_status();
    if !validated.success {
        return Err(PipelineError::Validate(validated.log));
    }

    Ok(program.detach_all()?)
}

pub fn pipeline_from_files<'gl, 's, D, P1, P2>(
    gl: &'gl D,
    vert: P1,
    frag: P2,
    attributes: &[(&str, GLuint)],
) -> Result<Program<'gl, 's, D>, PipelineError>
where
    D: Driver,
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let vertex = fs::read_to_string(vert)?;
    let fragment = fs::read_to_string(frag)?;
    simple_pipeline(gl, &vertex, &fragment, attributes)
}
