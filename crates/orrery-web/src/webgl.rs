//! WebGL2 backend for the engine's [`Renderer`] seam.
//!
//! Meshes are uploaded once into a vertex array each. Per frame the renderer
//! draws opaque bodies, then stars, then translucent tubes and reference
//! lines with depth writes off.

use std::collections::HashMap;

use orrery_engine::{
    DrawItem, FrameData, LightingState, MeshData, MeshId, MeshVertex, Renderer, TextureId, Topology,
    Viewport,
};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, HtmlImageElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::ShellError;
use crate::shaders::{self, ATTR_NORMAL, ATTR_POSITION, ATTR_UV};

/// Device pixel ratios above this are clamped to keep fill rate sane.
const MAX_PIXEL_RATIO: f64 = 2.0;

struct GpuMesh {
    vao: WebGlVertexArrayObject,
    // Kept alive for the lifetime of the vertex array.
    _vbo: WebGlBuffer,
    _ibo: Option<WebGlBuffer>,
    count: i32,
    topology: Topology,
}

/// Uniform locations of one program, looked up once after linking.
struct Program {
    program: WebGlProgram,
    uniforms: HashMap<&'static str, WebGlUniformLocation>,
}

impl Program {
    fn new(gl: &Gl, name: &str, vert: &str, frag: &str, names: &[&'static str]) -> Result<Self, ShellError> {
        let program = shaders::link_program(gl, name, vert, frag)?;
        let uniforms = names
            .iter()
            .filter_map(|n| gl.get_uniform_location(&program, n).map(|loc| (*n, loc)))
            .collect();
        Ok(Self { program, uniforms })
    }

    fn loc(&self, name: &str) -> Option<&WebGlUniformLocation> {
        self.uniforms.get(name)
    }
}

pub struct WebGlRenderer {
    gl: Gl,
    canvas: HtmlCanvasElement,
    lit: Program,
    unlit: Program,
    points: Program,
    meshes: HashMap<MeshId, GpuMesh>,
    textures: HashMap<TextureId, WebGlTexture>,
    line_vao: WebGlVertexArrayObject,
    line_vbo: WebGlBuffer,
    pixel_ratio: f64,
    viewport: Viewport,
}

impl WebGlRenderer {
    pub fn new(canvas: HtmlCanvasElement, pixel_ratio: f64) -> Result<Self, ShellError> {
        let gl = canvas
            .get_context("webgl2")?
            .ok_or(ShellError::WebGlUnavailable)?
            .dyn_into::<Gl>()
            .map_err(|_| ShellError::WebGlUnavailable)?;

        let lit = Program::new(
            &gl,
            "lit",
            shaders::LIT_VERT,
            shaders::LIT_FRAG,
            &[
                "u_view_proj", "u_model", "u_color", "u_emissive", "u_roughness", "u_metalness",
                "u_opacity", "u_use_texture", "u_texture", "u_camera_pos", "u_ambient", "u_sun_pos",
                "u_sun_color", "u_sun_range", "u_fill_dir", "u_fill_color",
            ],
        )?;
        let unlit = Program::new(
            &gl,
            "unlit",
            shaders::UNLIT_VERT,
            shaders::UNLIT_FRAG,
            &["u_view_proj", "u_model", "u_color", "u_opacity"],
        )?;
        let points = Program::new(
            &gl,
            "points",
            shaders::POINTS_VERT,
            shaders::POINTS_FRAG,
            &["u_view_proj", "u_model", "u_color", "u_opacity", "u_size", "u_scale"],
        )?;

        let line_vao = gl.create_vertex_array().ok_or(ShellError::Gpu("vertex array"))?;
        let line_vbo = gl.create_buffer().ok_or(ShellError::Gpu("buffer"))?;
        gl.bind_vertex_array(Some(&line_vao));
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&line_vbo));
        gl.enable_vertex_attrib_array(ATTR_POSITION);
        gl.vertex_attrib_pointer_with_i32(ATTR_POSITION, 3, Gl::FLOAT, false, 12, 0);
        gl.bind_vertex_array(None);

        gl.enable(Gl::DEPTH_TEST);
        gl.depth_func(Gl::LEQUAL);
        gl.blend_func(Gl::SRC_ALPHA, Gl::ONE_MINUS_SRC_ALPHA);

        log::info!("WebGL2 renderer ready (pixel ratio {pixel_ratio:.2})");
        Ok(Self {
            gl,
            canvas,
            lit,
            unlit,
            points,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            line_vao,
            line_vbo,
            pixel_ratio: pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO),
            viewport: Viewport::new(0.0, 0.0),
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Upload a decoded image as the texture for `id`.
    pub fn upload_texture(&mut self, id: TextureId, image: &HtmlImageElement) -> Result<(), ShellError> {
        let gl = &self.gl;
        let texture = gl.create_texture().ok_or(ShellError::Gpu("texture"))?;
        gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
        gl.pixel_storei(Gl::UNPACK_FLIP_Y_WEBGL, 1);
        let result = gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
            Gl::TEXTURE_2D,
            0,
            Gl::RGBA as i32,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            image,
        );
        gl.pixel_storei(Gl::UNPACK_FLIP_Y_WEBGL, 0);
        if let Err(err) = result {
            gl.delete_texture(Some(&texture));
            return Err(err.into());
        }
        gl.generate_mipmap(Gl::TEXTURE_2D);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, Gl::LINEAR_MIPMAP_LINEAR as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, Gl::LINEAR as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, Gl::REPEAT as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE as i32);
        gl.bind_texture(Gl::TEXTURE_2D, None);
        self.textures.insert(id, texture);
        Ok(())
    }

    fn set_lighting(&self, lighting: &LightingState, frame: &FrameData) {
        let gl = &self.gl;
        let p = &self.lit;
        let sun = &lighting.sun;
        let sun_color = sun.color.to_array().map(|c| c * sun.intensity);
        let fill = &lighting.fill;
        let fill_color = fill.color.to_array().map(|c| c * fill.intensity);

        gl.uniform3fv_with_f32_array(p.loc("u_camera_pos"), &frame.camera_position.to_array());
        gl.uniform3fv_with_f32_array(p.loc("u_ambient"), &lighting.ambient_rgb());
        gl.uniform3fv_with_f32_array(p.loc("u_sun_pos"), &sun.position.to_array());
        gl.uniform3fv_with_f32_array(p.loc("u_sun_color"), &sun_color);
        gl.uniform1f(p.loc("u_sun_range"), sun.range);
        gl.uniform3fv_with_f32_array(p.loc("u_fill_dir"), &fill.direction().to_array());
        gl.uniform3fv_with_f32_array(p.loc("u_fill_color"), &fill_color);
        gl.uniform1i(p.loc("u_texture"), 0);
    }

    fn draw_mesh(&self, mesh: &GpuMesh) {
        self.gl.bind_vertex_array(Some(&mesh.vao));
        match mesh.topology {
            Topology::Triangles => {
                self.gl
                    .draw_elements_with_i32(Gl::TRIANGLES, mesh.count, Gl::UNSIGNED_INT, 0)
            }
            Topology::Points => self.gl.draw_arrays(Gl::POINTS, 0, mesh.count),
        }
    }

    fn draw_surface(&self, item: &DrawItem) {
        let Some(mesh) = self.meshes.get(&item.mesh) else {
            return;
        };
        let gl = &self.gl;
        let m = &item.material;
        let model = item.model.to_cols_array();

        if m.lit {
            let p = &self.lit;
            gl.use_program(Some(&p.program));
            gl.uniform_matrix4fv_with_f32_array(p.loc("u_model"), false, &model);
            gl.uniform3fv_with_f32_array(p.loc("u_color"), &m.color.to_array());
            gl.uniform1f(p.loc("u_emissive"), m.emissive);
            gl.uniform1f(p.loc("u_roughness"), m.roughness);
            gl.uniform1f(p.loc("u_metalness"), m.metalness);
            gl.uniform1f(p.loc("u_opacity"), m.opacity);

            let texture = m.texture.and_then(|id| self.textures.get(&id));
            gl.uniform1i(p.loc("u_use_texture"), texture.is_some() as i32);
            gl.active_texture(Gl::TEXTURE0);
            gl.bind_texture(Gl::TEXTURE_2D, texture);
        } else {
            let p = &self.unlit;
            gl.use_program(Some(&p.program));
            gl.uniform_matrix4fv_with_f32_array(p.loc("u_model"), false, &model);
            gl.uniform3fv_with_f32_array(p.loc("u_color"), &m.color.to_array());
            gl.uniform1f(p.loc("u_opacity"), m.opacity);
        }
        self.draw_mesh(mesh);
    }

    fn draw_points(&self, item: &DrawItem) {
        let Some(mesh) = self.meshes.get(&item.mesh) else {
            return;
        };
        let gl = &self.gl;
        let p = &self.points;
        let m = &item.material;
        gl.use_program(Some(&p.program));
        gl.uniform_matrix4fv_with_f32_array(p.loc("u_model"), false, &item.model.to_cols_array());
        gl.uniform3fv_with_f32_array(p.loc("u_color"), &m.color.to_array());
        gl.uniform1f(p.loc("u_opacity"), m.opacity);
        gl.uniform1f(p.loc("u_size"), m.point_size);
        gl.uniform1f(p.loc("u_scale"), self.canvas.height() as f32 * 0.5);
        self.draw_mesh(mesh);
    }

    fn draw_lines(&self, frame: &FrameData) {
        if frame.lines.is_empty() {
            return;
        }
        let gl = &self.gl;
        let p = &self.unlit;
        let flat: Vec<f32> = frame
            .lines
            .iter()
            .flat_map(|l| l.points.iter().flat_map(|v| v.to_array()))
            .collect();

        gl.use_program(Some(&p.program));
        gl.uniform_matrix4fv_with_f32_array(p.loc("u_model"), false, &glam::Mat4::IDENTITY.to_cols_array());
        gl.bind_vertex_array(Some(&self.line_vao));
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&self.line_vbo));
        gl.buffer_data_with_u8_array(Gl::ARRAY_BUFFER, bytemuck::cast_slice(&flat), Gl::DYNAMIC_DRAW);

        let mut first = 0;
        for line in &frame.lines {
            let count = line.points.len() as i32;
            gl.uniform3fv_with_f32_array(p.loc("u_color"), &line.color.to_array());
            gl.uniform1f(p.loc("u_opacity"), line.opacity);
            gl.draw_arrays(Gl::LINE_STRIP, first, count);
            first += count;
        }
    }
}

impl Renderer for WebGlRenderer {
    type Error = ShellError;

    fn backend(&self) -> &'static str {
        "webgl2"
    }

    fn upload_mesh(&mut self, id: MeshId, mesh: &MeshData) -> Result<(), ShellError> {
        let gl = &self.gl;
        let vao = gl.create_vertex_array().ok_or(ShellError::Gpu("vertex array"))?;
        let vbo = gl.create_buffer().ok_or(ShellError::Gpu("buffer"))?;
        gl.bind_vertex_array(Some(&vao));

        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&vbo));
        gl.buffer_data_with_u8_array(Gl::ARRAY_BUFFER, mesh.vertex_bytes(), Gl::STATIC_DRAW);
        let stride = MeshVertex::STRIDE_BYTES as i32;
        for (attr, size, offset) in [(ATTR_POSITION, 3, 0), (ATTR_NORMAL, 3, 12), (ATTR_UV, 2, 24)] {
            gl.enable_vertex_attrib_array(attr);
            gl.vertex_attrib_pointer_with_i32(attr, size, Gl::FLOAT, false, stride, offset);
        }

        let (ibo, count) = match mesh.topology {
            Topology::Triangles => {
                let ibo = gl.create_buffer().ok_or(ShellError::Gpu("buffer"))?;
                gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&ibo));
                gl.buffer_data_with_u8_array(Gl::ELEMENT_ARRAY_BUFFER, mesh.index_bytes(), Gl::STATIC_DRAW);
                (Some(ibo), mesh.index_count() as i32)
            }
            Topology::Points => (None, mesh.vertex_count() as i32),
        };
        gl.bind_vertex_array(None);

        self.meshes.insert(
            id,
            GpuMesh { vao, _vbo: vbo, _ibo: ibo, count, topology: mesh.topology },
        );
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        let width = (viewport.width as f64 * self.pixel_ratio).round().max(1.0) as u32;
        let height = (viewport.height as f64 * self.pixel_ratio).round().max(1.0) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.gl.viewport(0, 0, width as i32, height as i32);
        self.viewport = viewport;
        log::debug!("canvas resized to {width}x{height} device pixels");
    }

    fn draw(&mut self, frame: &FrameData) {
        let gl = &self.gl;
        let [r, g, b] = frame.clear_color.to_array();
        gl.clear_color(r, g, b, 1.0);
        gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);

        let view_proj = frame.view_projection().to_cols_array();
        for p in [&self.lit, &self.unlit, &self.points] {
            gl.use_program(Some(&p.program));
            gl.uniform_matrix4fv_with_f32_array(p.loc("u_view_proj"), false, &view_proj);
        }
        gl.use_program(Some(&self.lit.program));
        self.set_lighting(&frame.lighting, frame);

        gl.disable(Gl::BLEND);
        gl.depth_mask(true);
        for item in &frame.opaque {
            self.draw_surface(item);
        }
        for item in &frame.points {
            self.draw_points(item);
        }

        gl.enable(Gl::BLEND);
        gl.depth_mask(false);
        for item in &frame.translucent {
            self.draw_surface(item);
        }
        self.draw_lines(frame);
        gl.depth_mask(true);

        gl.bind_vertex_array(None);
        gl.bind_texture(Gl::TEXTURE_2D, None);
    }
}
