//! WGSL shader sources for the point and mesh pipelines.
//!
//! The morphing math all happens CPU-side; these shaders only billboard,
//! attenuate, and shade what the groups computed. Point size follows the
//! reference curve: pre-attenuation size times pixel ratio, divided by view
//! depth.

/// Billboard point rendering with radial falloff and glow mixing.
pub const POINT_SHADER: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    resolution: vec2<f32>,
    time: f32,
    pixel_ratio: f32,
};

struct PointStyle {
    color_bottom: vec4<f32>,
    color_top: vec4<f32>,
    color_glow: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var<uniform> style: PointStyle;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) glow: f32,
    @location(2) alpha: f32,
    @location(3) height_t: f32,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) glow: f32,
    @location(3) alpha: f32,
    @location(4) height_t: f32,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    let view_pos = uniforms.view * vec4<f32>(position, 1.0);
    var clip_pos = uniforms.proj * view_pos;

    // Perspective size attenuation: pixels shrink with view depth.
    let depth = max(-view_pos.z, 0.1);
    let size_px = size * uniforms.pixel_ratio / depth;

    clip_pos.x += quad_pos.x * size_px / uniforms.resolution.x * clip_pos.w;
    clip_pos.y += quad_pos.y * size_px / uniforms.resolution.y * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.uv = quad_pos;
    out.glow = glow;
    out.alpha = alpha;
    out.height_t = height_t;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }

    var strength = 1.0 - dist;
    strength = strength * strength;

    let base = mix(style.color_bottom.rgb, style.color_top.rgb, clamp(in.height_t, 0.0, 1.0));
    let color = mix(base, style.color_glow.rgb, in.glow);

    return vec4<f32>(color, strength * 0.95 * in.alpha);
}
"#;

/// Instanced mesh rendering: half-lambert plus emissive, with a halo mode
/// that inflates the mesh and renders it as a translucent shell.
pub const MESH_SHADER: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    resolution: vec2<f32>,
    time: f32,
    pixel_ratio: f32,
};

struct MeshStyle {
    // rgb = color, w = emissive strength
    color: vec4<f32>,
    // x = shell scale, y = shell opacity, z = halo mode flag
    shell: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var<uniform> style: MeshStyle;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
) -> VertexOutput {
    let model = mat4x4<f32>(model_0, model_1, model_2, model_3);

    let local = position * style.shell.x;
    let world = model * vec4<f32>(local, 1.0);
    let world_normal = normalize((model * vec4<f32>(normal, 0.0)).xyz);

    var out: VertexOutput;
    out.clip_position = uniforms.proj * uniforms.view * world;
    out.normal = world_normal;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if style.shell.z > 0.5 {
        return vec4<f32>(style.color.rgb, style.shell.y);
    }

    let light_dir = normalize(vec3<f32>(0.5, 0.8, 0.4));
    let ndl = dot(normalize(in.normal), light_dir) * 0.5 + 0.5;
    let lit = style.color.rgb * (0.25 + 0.75 * ndl);
    let color = lit + style.color.rgb * style.color.w;

    return vec4<f32>(color, 1.0);
}
"#;
