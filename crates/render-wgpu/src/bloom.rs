//! Unreal-style bloom.
//!
//! A luminosity high pass runs at half resolution, then five progressively
//! smaller mip levels are each blurred horizontally and vertically. The
//! composite adds the weighted mips back onto the scene.

use crate::target::{
    ColorTarget, blit, fullscreen_pipeline, linear_sampler, sampler_entry, texture_entry,
    uniform_entry,
};
use crate::{GpuContext, GpuStage, HDR_FORMAT, shaders};
use bytemuck::{Pod, Zeroable};
use tumble_common::{BloomSettings, BufferSize};
use tumble_render::RenderStage;
use wgpu::util::DeviceExt;

pub const MIP_LEVELS: usize = 5;

/// Blur kernel radius for each mip level. Sigma equals the radius.
pub const KERNEL_RADII: [u32; MIP_LEVELS] = [3, 5, 7, 9, 11];

const BLOOM_FACTORS: [f32; MIP_LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];
const SMOOTH_WIDTH: f32 = 0.01;
const MAX_COEFFICIENTS: usize = 12;

/// Gaussian weights for offsets `0..kernel_radius`, unnormalized.
pub fn gaussian_coefficients(kernel_radius: u32) -> Vec<f32> {
    let sigma = kernel_radius.max(1) as f32;
    (0..kernel_radius)
        .map(|i| {
            let x = i as f32;
            0.398_94 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma
        })
        .collect()
}

/// Sizes of the blur mips for a given output size. Level 0 is half size and
/// each level halves again.
pub fn mip_sizes(size: BufferSize) -> [BufferSize; MIP_LEVELS] {
    let mut level = size.halved();
    let mut sizes = [level; MIP_LEVELS];
    for slot in sizes.iter_mut() {
        *slot = level;
        level = level.halved();
    }
    sizes
}

/// Per-mip weight: the bloom factor pulled toward `1.2 - factor` by `radius`,
/// scaled by `strength`.
pub fn mip_weights(settings: &BloomSettings) -> [f32; MIP_LEVELS] {
    BLOOM_FACTORS.map(|f| settings.strength * (f + (1.2 - f - f) * settings.radius))
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct HighPassUniforms {
    threshold: f32,
    smooth_width: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BlurUniforms {
    texel: [f32; 2],
    direction: [f32; 2],
    kernel_radius: u32,
    _pad: [u32; 3],
    coefficients: [[f32; 4]; 3],
}

impl BlurUniforms {
    fn new(size: BufferSize, direction: [f32; 2], kernel_radius: u32) -> Self {
        let radius = kernel_radius.min(MAX_COEFFICIENTS as u32);
        let mut coefficients = [[0.0; 4]; 3];
        for (i, c) in gaussian_coefficients(radius).into_iter().enumerate() {
            coefficients[i / 4][i % 4] = c;
        }
        Self {
            texel: size.texel(),
            direction,
            kernel_radius: radius,
            _pad: [0; 3],
            coefficients,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CompositeUniforms {
    weights_a: [f32; 4],
    weights_b: [f32; 4],
}

impl CompositeUniforms {
    fn new(settings: &BloomSettings) -> Self {
        let w = mip_weights(settings);
        Self {
            weights_a: [w[0], w[1], w[2], w[3]],
            weights_b: [w[4], 0.0, 0.0, 0.0],
        }
    }
}

/// Blur targets and bind groups for one mip level.
struct MipLevel {
    horizontal: ColorTarget,
    vertical: ColorTarget,
    horizontal_bind_group: wgpu::BindGroup,
    vertical_bind_group: wgpu::BindGroup,
}

pub struct BloomPass {
    settings: BloomSettings,
    sampler: wgpu::Sampler,
    source_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    high_pass_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    high_pass_uniforms: wgpu::Buffer,
    composite_uniforms: wgpu::Buffer,
    bright: ColorTarget,
    mips: Vec<MipLevel>,
    size: BufferSize,
}

impl BloomPass {
    pub fn new(gpu: &GpuContext, settings: BloomSettings) -> Self {
        let device = &gpu.device;
        let sampler = linear_sampler(device);

        let source_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom_source_layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom_composite_layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
                texture_entry(3),
                texture_entry(4),
                texture_entry(5),
                texture_entry(6),
                texture_entry(7),
            ],
        });

        let high_pass_pipeline = fullscreen_pipeline(
            device,
            "bloom_high_pass",
            &source_layout,
            shaders::HIGH_PASS_FRAGMENT,
            "fs_high_pass",
            HDR_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "bloom_blur",
            &source_layout,
            shaders::BLUR_FRAGMENT,
            "fs_blur",
            HDR_FORMAT,
        );
        let composite_pipeline = fullscreen_pipeline(
            device,
            "bloom_composite",
            &composite_layout,
            shaders::COMPOSITE_FRAGMENT,
            "fs_composite",
            HDR_FORMAT,
        );

        let high_pass_uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom_high_pass_uniforms"),
            contents: bytemuck::bytes_of(&HighPassUniforms {
                threshold: settings.threshold,
                smooth_width: SMOOTH_WIDTH,
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let composite_uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom_composite_uniforms"),
            contents: bytemuck::bytes_of(&CompositeUniforms::new(&settings)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let size = BufferSize::new(1, 1);
        let mut pass = Self {
            settings,
            sampler,
            source_layout,
            composite_layout,
            high_pass_pipeline,
            blur_pipeline,
            composite_pipeline,
            high_pass_uniforms,
            composite_uniforms,
            bright: ColorTarget::new(device, "bloom_bright", size, HDR_FORMAT),
            mips: Vec::new(),
            size,
        };
        pass.rebuild_targets(device, size);
        pass
    }

    pub fn settings(&self) -> BloomSettings {
        self.settings
    }

    fn source_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        source: &wgpu::TextureView,
        uniforms: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.source_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        })
    }

    fn rebuild_targets(&mut self, device: &wgpu::Device, size: BufferSize) {
        let sizes = mip_sizes(size);
        self.bright = ColorTarget::new(device, "bloom_bright", sizes[0], HDR_FORMAT);

        let mut mips: Vec<MipLevel> = Vec::with_capacity(MIP_LEVELS);
        for (level, &mip_size) in sizes.iter().enumerate() {
            let horizontal = ColorTarget::new(device, "bloom_blur_h", mip_size, HDR_FORMAT);
            let vertical = ColorTarget::new(device, "bloom_blur_v", mip_size, HDR_FORMAT);
            let radius = KERNEL_RADII[level];

            let h_uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("bloom_blur_h_uniforms"),
                contents: bytemuck::bytes_of(&BlurUniforms::new(mip_size, [1.0, 0.0], radius)),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let v_uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("bloom_blur_v_uniforms"),
                contents: bytemuck::bytes_of(&BlurUniforms::new(mip_size, [0.0, 1.0], radius)),
                usage: wgpu::BufferUsages::UNIFORM,
            });

            let source = match mips.last() {
                Some(prev) => prev.vertical.view(),
                None => self.bright.view(),
            };
            let horizontal_bind_group =
                self.source_bind_group(device, "bloom_blur_h", source, &h_uniforms);
            let vertical_bind_group =
                self.source_bind_group(device, "bloom_blur_v", horizontal.view(), &v_uniforms);

            mips.push(MipLevel {
                horizontal,
                vertical,
                horizontal_bind_group,
                vertical_bind_group,
            });
        }
        self.mips = mips;
    }
}

impl RenderStage for BloomPass {
    type Context = GpuContext;

    fn label(&self) -> &str {
        "bloom"
    }

    fn resize(&mut self, gpu: &GpuContext, size: BufferSize) {
        self.rebuild_targets(&gpu.device, size);
        self.size = size;
    }

    fn buffer_size(&self) -> BufferSize {
        self.size
    }

    fn contributes_to_frame(&self) -> bool {
        self.settings.enabled
    }
}

impl GpuStage for BloomPass {
    fn encode(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
    ) {
        let device = &gpu.device;

        let high_pass =
            self.source_bind_group(device, "bloom_high_pass", input, &self.high_pass_uniforms);
        blit(
            encoder,
            "bloom_high_pass",
            self.bright.view(),
            &self.high_pass_pipeline,
            &high_pass,
        );

        for mip in &self.mips {
            blit(
                encoder,
                "bloom_blur_h",
                mip.horizontal.view(),
                &self.blur_pipeline,
                &mip.horizontal_bind_group,
            );
            blit(
                encoder,
                "bloom_blur_v",
                mip.vertical.view(),
                &self.blur_pipeline,
                &mip.vertical_bind_group,
            );
        }

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(input),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: self.composite_uniforms.as_entire_binding(),
            },
        ];
        for (level, mip) in self.mips.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: 3 + level as u32,
                resource: wgpu::BindingResource::TextureView(mip.vertical.view()),
            });
        }
        let composite = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom_composite"),
            layout: &self.composite_layout,
            entries: &entries,
        });
        blit(
            encoder,
            "bloom_composite",
            output,
            &self.composite_pipeline,
            &composite,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_peaks_at_center_and_decays() {
        let c = gaussian_coefficients(5);
        assert_eq!(c.len(), 5);
        assert!((c[0] - 0.398_94 / 5.0).abs() < 1e-6);
        assert!(c.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn largest_kernel_fits_uniform() {
        assert!(KERNEL_RADII.iter().all(|&r| r as usize <= MAX_COEFFICIENTS));
        let u = BlurUniforms::new(BufferSize::new(100, 50), [1.0, 0.0], 11);
        assert_eq!(u.kernel_radius, 11);
        assert!(u.coefficients[2][2] > 0.0);
        assert_eq!(u.coefficients[2][3], 0.0);
        assert_eq!(u.texel, [0.01, 0.02]);
    }

    #[test]
    fn blur_uniform_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 80);
        assert_eq!(std::mem::size_of::<HighPassUniforms>(), 16);
        assert_eq!(std::mem::size_of::<CompositeUniforms>(), 32);
    }

    #[test]
    fn mips_halve_from_half_resolution() {
        let sizes = mip_sizes(BufferSize::new(1600, 1200));
        assert_eq!(sizes[0], BufferSize::new(800, 600));
        assert_eq!(sizes[1], BufferSize::new(400, 300));
        assert_eq!(sizes[4], BufferSize::new(50, 38));
    }

    #[test]
    fn tiny_output_keeps_mips_non_empty() {
        let sizes = mip_sizes(BufferSize::new(1, 1));
        assert!(sizes.iter().all(|s| s.width >= 1 && s.height >= 1));
    }

    #[test]
    fn radius_blends_weights_toward_wide_mips() {
        let tight = mip_weights(&BloomSettings {
            radius: 0.0,
            ..BloomSettings::default()
        });
        assert_eq!(tight, BLOOM_FACTORS);

        let default = mip_weights(&BloomSettings::default());
        // mix(1.0, 0.2, 0.2) and mix(0.2, 1.0, 0.2)
        assert!((default[0] - 0.84).abs() < 1e-6);
        assert!((default[4] - 0.36).abs() < 1e-6);

        let strong = mip_weights(&BloomSettings {
            strength: 2.0,
            ..BloomSettings::default()
        });
        assert!((strong[0] - 1.68).abs() < 1e-6);
    }
}
