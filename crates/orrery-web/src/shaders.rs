//! GLSL ES 3.00 sources and program compilation.
//!
//! Three programs: `lit` for the bodies, `unlit` for orbit tubes, the Moon
//! ring and reference lines, `points` for the starfield. All share attribute
//! locations 0/1/2 (position, normal, uv) so one vertex array per mesh works
//! with whichever program draws it.

use web_sys::{WebGl2RenderingContext as Gl, WebGlProgram, WebGlShader};

use crate::error::ShellError;

pub const ATTR_POSITION: u32 = 0;
pub const ATTR_NORMAL: u32 = 1;
pub const ATTR_UV: u32 = 2;

pub const LIT_VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;

uniform mat4 u_view_proj;
uniform mat4 u_model;

out vec3 v_world;
out vec3 v_normal;
out vec2 v_uv;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world = world.xyz;
    v_normal = mat3(u_model) * a_normal;
    v_uv = a_uv;
    gl_Position = u_view_proj * world;
}
"#;

pub const LIT_FRAG: &str = r#"#version 300 es
precision highp float;

in vec3 v_world;
in vec3 v_normal;
in vec2 v_uv;

uniform vec3 u_color;
uniform float u_emissive;
uniform float u_roughness;
uniform float u_metalness;
uniform float u_opacity;
uniform bool u_use_texture;
uniform sampler2D u_texture;

uniform vec3 u_camera_pos;
uniform vec3 u_ambient;
uniform vec3 u_sun_pos;
uniform vec3 u_sun_color;
uniform float u_sun_range;
uniform vec3 u_fill_dir;
uniform vec3 u_fill_color;

out vec4 frag;

void main() {
    vec3 base = u_color;
    if (u_use_texture) {
        base *= texture(u_texture, v_uv).rgb;
    }

    vec3 n = normalize(v_normal);
    vec3 v = normalize(u_camera_pos - v_world);
    vec3 to_sun = u_sun_pos - v_world;
    float dist = length(to_sun);
    vec3 l = to_sun / max(dist, 1e-4);
    float atten = u_sun_range > 0.0 ? clamp(1.0 - dist / u_sun_range, 0.0, 1.0) : 1.0;

    vec3 diffuse = base * (1.0 - u_metalness);
    vec3 specular = mix(vec3(0.04), base, u_metalness);
    float shininess = mix(64.0, 4.0, u_roughness);

    float ndl = max(dot(n, l), 0.0);
    vec3 h = normalize(l + v);
    vec3 color = u_ambient * base;
    color += (diffuse + specular * pow(max(dot(n, h), 0.0), shininess)) * ndl * u_sun_color * atten;
    color += diffuse * max(dot(n, u_fill_dir), 0.0) * u_fill_color;
    color += base * u_emissive;

    frag = vec4(color, u_opacity);
}
"#;

pub const UNLIT_VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;

uniform mat4 u_view_proj;
uniform mat4 u_model;

void main() {
    gl_Position = u_view_proj * u_model * vec4(a_position, 1.0);
}
"#;

pub const UNLIT_FRAG: &str = r#"#version 300 es
precision mediump float;

uniform vec3 u_color;
uniform float u_opacity;

out vec4 frag;

void main() {
    frag = vec4(u_color, u_opacity);
}
"#;

pub const POINTS_VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;

uniform mat4 u_view_proj;
uniform mat4 u_model;
uniform float u_size;
uniform float u_scale;

void main() {
    vec4 clip = u_view_proj * u_model * vec4(a_position, 1.0);
    gl_Position = clip;
    gl_PointSize = max(1.0, u_size * u_scale / max(clip.w, 1e-4));
}
"#;

pub const POINTS_FRAG: &str = UNLIT_FRAG;

fn compile_shader(gl: &Gl, name: &str, kind: u32, source: &str) -> Result<WebGlShader, ShellError> {
    let shader = gl.create_shader(kind).ok_or(ShellError::Gpu("shader object"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let ok = gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let message = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(ShellError::Shader { name: name.to_string(), message })
    }
}

/// Compile and link a vertex/fragment pair.
pub fn link_program(gl: &Gl, name: &str, vert: &str, frag: &str) -> Result<WebGlProgram, ShellError> {
    let vs = compile_shader(gl, name, Gl::VERTEX_SHADER, vert)?;
    let fs = compile_shader(gl, name, Gl::FRAGMENT_SHADER, frag)?;
    let program = gl.create_program().ok_or(ShellError::Gpu("program object"))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));

    let ok = gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        log::debug!("linked shader program '{name}'");
        Ok(program)
    } else {
        let message = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(ShellError::Shader { name: name.to_string(), message })
    }
}
