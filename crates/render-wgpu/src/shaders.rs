/// WGSL shader for instanced cubes with a surface color and an emissive term.
pub const CUBE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    // x: ambient light intensity
    light: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) emissive: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) emissive: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.emissive = instance.emissive.rgb;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 0.5, 1.0));
    let diffuse = max(dot(in.world_normal, light_dir), 0.0);
    let lighting = uniforms.light.x * 0.7 + diffuse * 0.3;
    return vec4<f32>(in.color.rgb * lighting + in.emissive, in.color.a);
}
"#;

/// Fullscreen triangle shared by every post-processing pass.
pub const FULLSCREEN_VERTEX: &str = r#"
struct FullscreenOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    let corner = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: FullscreenOutput;
    out.clip_position = vec4<f32>(corner * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(corner.x, 1.0 - corner.y);
    return out;
}
"#;

/// Bright-pass extraction and separable Gaussian blur.
pub const BLOOM_FRAGMENTS: &str = r#"
struct BloomParams {
    threshold: f32,
    strength: f32,
    radius: f32,
    _pad: f32,
    texel: vec2<f32>,
    direction: vec2<f32>,
};

@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;
@group(0) @binding(2)
var<uniform> params: BloomParams;

@fragment
fn fs_bright(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let color = textureSample(source, source_sampler, in.uv).rgb;
    let luma = dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
    let contribution = max(luma - params.threshold, 0.0) / max(luma, 0.0001);
    return vec4<f32>(color * contribution, 1.0);
}

@fragment
fn fs_blur(in: FullscreenOutput) -> @location(0) vec4<f32> {
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);
    let stride = params.direction * params.texel * (1.0 + params.radius * 3.0);
    var sum = textureSample(source, source_sampler, in.uv).rgb * weights[0];
    for (var i = 1; i < 5; i++) {
        let offset = stride * f32(i);
        sum += textureSample(source, source_sampler, in.uv + offset).rgb * weights[i];
        sum += textureSample(source, source_sampler, in.uv - offset).rgb * weights[i];
    }
    return vec4<f32>(sum, 1.0);
}
"#;

/// Adds the blurred glow on top of the scene.
pub const COMPOSITE_FRAGMENT: &str = r#"
struct BloomParams {
    threshold: f32,
    strength: f32,
    radius: f32,
    _pad: f32,
    texel: vec2<f32>,
    direction: vec2<f32>,
};

@group(0) @binding(0)
var scene_texture: texture_2d<f32>;
@group(0) @binding(1)
var bloom_texture: texture_2d<f32>;
@group(0) @binding(2)
var linear_sampler: sampler;
@group(0) @binding(3)
var<uniform> params: BloomParams;

@fragment
fn fs_composite(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let scene = textureSample(scene_texture, linear_sampler, in.uv).rgb;
    let glow = textureSample(bloom_texture, linear_sampler, in.uv).rgb;
    return vec4<f32>(scene + glow * params.strength, 1.0);
}
"#;

/// Full source for a post-processing module: shared vertex stage + fragments.
pub fn post_shader(fragments: &str) -> String {
    format!("{FULLSCREEN_VERTEX}\n{fragments}")
}
