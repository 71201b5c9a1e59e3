//! Builds a program and an offscreen frame buffer on a real ES 2.0 context
//! and logs what the driver thinks of them. Run with `RUST_LOG=debug`.

use gles_handles::{
    simple_pipeline, AttachmentPoint, Filter, FrameBuffer, GlDriver, PixelKind, RenderTarget,
    RenderTargetFormat, Texture, Wrap,
};
use glutin::{Api, GlContext, GlRequest};
use log::info;
use std::error::Error;

const VERTEX: &str = "attribute vec4 position;
void main() {
    gl_Position = position;
}
";

const FRAGMENT: &str = "precision mediump float;
uniform vec4 tint;
void main() {
    gl_FragColor = tint;
}
";

const SIZE: u32 = 256;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let events_loop = glutin::EventsLoop::new();
    let window = glutin::WindowBuilder::new()
        .with_title("gles-handles offscreen")
        .with_dimensions(SIZE, SIZE);
    let context = glutin::ContextBuilder::new().with_gl(GlRequest::Specific(Api::OpenGlEs, (2, 0)));
    let gl_window = glutin::GlWindow::new(window, context, &events_loop)?;

    unsafe {
        gl_window.make_current()?;
    }
    let gl = GlDriver::load_with(|symbol| gl_window.get_proc_address(symbol) as *const _);

    let program = simple_pipeline(&gl, VERTEX, FRAGMENT, &[("position", 0)])?;
    let tint = program.uniform::<[f32; 4]>("tint").ok_or("fragment shader has no `tint` uniform")?;
    program.set_uniform(&tint, [1.0, 0.5, 0.0, 1.0])?;

    let color = Texture::new(&gl)?;
    color.allocate(SIZE, SIZE, PixelKind::Rgba8)?;
    color.set_filter(Filter::Linear, Filter::Linear)?;
    color.set_wrap(Wrap::ClampToEdge, Wrap::ClampToEdge)?;

    let depth = RenderTarget::new(&gl)?;
    depth.make_storage(SIZE, SIZE, RenderTargetFormat::Depth16)?;

    let mut framebuffer = FrameBuffer::new(&gl)?;
    framebuffer.attach(AttachmentPoint::Color, &color)?;
    framebuffer.attach(AttachmentPoint::Depth, &depth)?;
    info!("offscreen frame buffer {}: {:?}", framebuffer.id(), framebuffer.completeness()?);

    Ok(())
}
