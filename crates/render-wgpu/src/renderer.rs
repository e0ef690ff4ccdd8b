use crate::bloom::BloomPass;
use crate::output::OutputPass;
use crate::scene::ScenePass;
use crate::target::ColorTarget;
use crate::{GpuContext, GpuStage, HDR_FORMAT};
use tumble_common::{BufferSize, SceneConfig};
use tumble_render::{Composer, FrameState, StageTarget, wireframe_box};

/// Scene, bloom and output stages driven by a [`Composer`].
pub struct TumbleRenderer {
    composer: Composer<dyn GpuStage>,
    targets: [ColorTarget; 2],
    max_dimension: u32,
}

impl TumbleRenderer {
    pub fn new(gpu: &GpuContext, config: &SceneConfig, size: BufferSize) -> Self {
        let max_dimension = gpu.device.limits().max_texture_dimension_2d;
        let size = clamp_to_limit(size, max_dimension);

        let mesh = wireframe_box(config.cube_size, config.cube_segments);
        tracing::info!(
            width = size.width,
            height = size.height,
            lines = mesh.line_count(),
            bloom = config.bloom.enabled,
            "creating renderer"
        );

        let mut composer: Composer<dyn GpuStage> = Composer::new(size);
        composer.add_stage(gpu, Box::new(ScenePass::new(gpu, &mesh, config.clear_color)));
        composer.add_stage(gpu, Box::new(BloomPass::new(gpu, config.bloom)));
        composer.add_stage(gpu, Box::new(OutputPass::new(gpu)));

        Self {
            composer,
            targets: Self::create_targets(&gpu.device, size),
            max_dimension,
        }
    }

    fn create_targets(device: &wgpu::Device, size: BufferSize) -> [ColorTarget; 2] {
        [
            ColorTarget::new(device, "composer_buffer_0", size, HDR_FORMAT),
            ColorTarget::new(device, "composer_buffer_1", size, HDR_FORMAT),
        ]
    }

    /// Reallocate every buffer for a new drawing-buffer size.
    pub fn resize(&mut self, gpu: &GpuContext, size: BufferSize) {
        let size = clamp_to_limit(size, self.max_dimension);
        if size == self.composer.size() {
            return;
        }
        self.targets = Self::create_targets(&gpu.device, size);
        self.composer.set_size(gpu, size);
        tracing::debug!(width = size.width, height = size.height, "renderer resized");
    }

    pub fn size(&self) -> BufferSize {
        self.composer.size()
    }

    /// Render one frame into `surface`.
    pub fn render(&mut self, gpu: &GpuContext, surface: &wgpu::TextureView, frame: &FrameState) {
        for stage in self.composer.stages_mut() {
            stage.prepare(gpu, frame);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tumble_frame"),
            });

        let stages = self.composer.stages();
        for run in self.composer.frame_plan() {
            let input = self.targets[run.read].view();
            let output = match run.write {
                StageTarget::Buffer(i) => self.targets[i].view(),
                StageTarget::Surface => surface,
            };
            stages[run.stage].encode(gpu, &mut encoder, input, output);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Shrink a buffer size so neither side exceeds `max_dimension`.
fn clamp_to_limit(size: BufferSize, max_dimension: u32) -> BufferSize {
    let max = max_dimension.max(1);
    BufferSize::new(size.width.clamp(1, max), size.height.clamp(1, max))
}
