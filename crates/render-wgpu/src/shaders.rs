/// WGSL shader for the wireframe cube.
pub const WIREFRAME_SHADER: &str = r#"
struct SceneUniforms {
    mvp: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: SceneUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return uniforms.mvp * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return uniforms.color;
}
"#;

/// Fullscreen triangle shared by every post-processing shader.
const FULLSCREEN_VERTEX: &str = r#"
struct FullscreenOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    var out: FullscreenOutput;
    out.clip_position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}
"#;

/// Keeps pixels whose luminance exceeds the threshold, fading in over
/// `smooth_width`.
pub const HIGH_PASS_FRAGMENT: &str = r#"
struct HighPass {
    threshold: f32,
    smooth_width: f32,
    _pad0: f32,
    _pad1: f32,
};

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: HighPass;

@fragment
fn fs_high_pass(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(source, source_sampler, in.uv);
    let luma = dot(texel.rgb, vec3<f32>(0.299, 0.587, 0.114));
    let alpha = smoothstep(params.threshold, params.threshold + params.smooth_width, luma);
    return mix(vec4<f32>(0.0), texel, alpha);
}
"#;

/// One direction of a separable gaussian blur.
pub const BLUR_FRAGMENT: &str = r#"
struct Blur {
    texel: vec2<f32>,
    direction: vec2<f32>,
    kernel_radius: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
    coefficients: array<vec4<f32>, 3>,
};

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: Blur;

fn coefficient(i: u32) -> f32 {
    return params.coefficients[i / 4u][i % 4u];
}

@fragment
fn fs_blur(in: FullscreenOutput) -> @location(0) vec4<f32> {
    var weight_sum = coefficient(0u);
    var sum = textureSample(source, source_sampler, in.uv).rgb * weight_sum;
    for (var i = 1u; i < params.kernel_radius; i = i + 1u) {
        let w = coefficient(i);
        let offset = params.direction * params.texel * f32(i);
        let a = textureSample(source, source_sampler, in.uv + offset).rgb;
        let b = textureSample(source, source_sampler, in.uv - offset).rgb;
        sum = sum + (a + b) * w;
        weight_sum = weight_sum + 2.0 * w;
    }
    return vec4<f32>(sum / weight_sum, 1.0);
}
"#;

/// Adds the weighted bloom mips onto the scene.
pub const COMPOSITE_FRAGMENT: &str = r#"
struct Composite {
    weights_a: vec4<f32>,
    weights_b: vec4<f32>,
};

@group(0) @binding(0) var scene: texture_2d<f32>;
@group(0) @binding(1) var linear_sampler: sampler;
@group(0) @binding(2) var<uniform> params: Composite;
@group(0) @binding(3) var mip0: texture_2d<f32>;
@group(0) @binding(4) var mip1: texture_2d<f32>;
@group(0) @binding(5) var mip2: texture_2d<f32>;
@group(0) @binding(6) var mip3: texture_2d<f32>;
@group(0) @binding(7) var mip4: texture_2d<f32>;

@fragment
fn fs_composite(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let base = textureSample(scene, linear_sampler, in.uv).rgb;
    let bloom = params.weights_a.x * textureSample(mip0, linear_sampler, in.uv).rgb
        + params.weights_a.y * textureSample(mip1, linear_sampler, in.uv).rgb
        + params.weights_a.z * textureSample(mip2, linear_sampler, in.uv).rgb
        + params.weights_a.w * textureSample(mip3, linear_sampler, in.uv).rgb
        + params.weights_b.x * textureSample(mip4, linear_sampler, in.uv).rgb;
    return vec4<f32>(base + bloom, 1.0);
}
"#;

/// Copies the composed frame onto the surface.
pub const OUTPUT_FRAGMENT: &str = r#"
@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;

@fragment
fn fs_output(in: FullscreenOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(source, source_sampler, in.uv).rgb, 1.0);
}
"#;

/// Full WGSL source for a post-processing fragment shader.
pub fn post_shader(fragment: &str) -> String {
    format!("{FULLSCREEN_VERTEX}{fragment}")
}
