//! wgpu render backend for tumble.
//!
//! Draws the wireframe cube into an HDR buffer, runs the bloom chain over it
//! and copies the result onto the window surface.
//!
//! # Invariants
//! - The renderer never touches animation state; it only reads [`FrameState`].
//! - Intermediate buffers are always [`HDR_FORMAT`]; only the output stage
//!   writes the surface format.
//! - Buffer sizes never exceed the device's maximum texture dimension.

mod bloom;
mod output;
mod renderer;
mod scene;
mod shaders;
mod target;

pub use bloom::{BloomPass, KERNEL_RADII, MIP_LEVELS, gaussian_coefficients, mip_sizes, mip_weights};
pub use output::OutputPass;
pub use renderer::TumbleRenderer;
pub use scene::ScenePass;

use tumble_render::{FrameState, RenderStage};

/// Format of the scene and bloom intermediates.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Device handles shared by every stage.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
}

/// A render stage that records GPU commands.
pub trait GpuStage: RenderStage<Context = GpuContext> {
    /// Upload per-frame uniforms. Called once per frame before any encoding.
    fn prepare(&mut self, _gpu: &GpuContext, _frame: &FrameState) {}

    /// Record the stage's passes, reading `input` and writing `output`.
    fn encode(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
    );
}
