use crate::target::{blit, fullscreen_pipeline, linear_sampler, sampler_entry, texture_entry};
use crate::{GpuContext, GpuStage, shaders};
use tumble_common::BufferSize;
use tumble_render::RenderStage;

/// Copies the composed HDR frame onto the surface.
pub struct OutputPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    size: BufferSize,
}

impl OutputPass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("output_layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });
        let pipeline = fullscreen_pipeline(
            device,
            "output",
            &layout,
            shaders::OUTPUT_FRAGMENT,
            "fs_output",
            gpu.surface_format,
        );
        Self {
            pipeline,
            layout,
            sampler: linear_sampler(device),
            size: BufferSize::new(1, 1),
        }
    }
}

impl RenderStage for OutputPass {
    type Context = GpuContext;

    fn label(&self) -> &str {
        "output"
    }

    fn resize(&mut self, _gpu: &GpuContext, size: BufferSize) {
        self.size = size;
    }

    fn buffer_size(&self) -> BufferSize {
        self.size
    }
}

impl GpuStage for OutputPass {
    fn encode(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
    ) {
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("output_bind_group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        blit(encoder, "output_pass", output, &self.pipeline, &bind_group);
    }
}
