use std::borrow::Cow;

use thiserror::Error;
use wgpu::naga::front::glsl::{Frontend, Options};
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::ShaderStage;

/// Shader failure that the render loop can survive.
///
/// `Compile` carries the naga diagnostic rendered against the offending
/// source, so the author sees line numbers for the file they just saved.
/// `Link` covers pipeline creation errors caught by the device validation
/// scope after both stages compiled.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage:?} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program link failed:\n{log}")]
    Link { log: String },
}

/// Parses and validates one GLSL stage without touching the GPU.
///
/// Compilation is deterministic, so a source that fails here will fail the
/// same way on every retry; callers are expected not to re-attempt until the
/// text actually changes.
pub(crate) fn validate_stage(stage: ShaderStage, source: &str) -> Result<(), ShaderError> {
    let mut frontend = Frontend::default();
    let module = frontend
        .parse(&Options::from(stage), source)
        .map_err(|errors| ShaderError::Compile {
            stage,
            log: errors.emit_to_string(source),
        })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|err| ShaderError::Compile {
            stage,
            log: err.emit_to_string(source),
        })?;

    Ok(())
}

/// Compiles the vertex stage exactly as it appears on disk.
pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    validate_stage(ShaderStage::Vertex, source)?;
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fragview vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_owned()),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    }))
}

/// Wraps the user fragment with our uniform prelude and compiles it.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let wrapped = wrap_fragment(source);
    validate_stage(ShaderStage::Fragment, &wrapped)?;
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fragview fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(wrapped),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    }))
}

/// Produces a self-contained GLSL fragment shader from user code.
///
/// Steps performed:
///
/// 1. Strip `#version` directives and declarations of the uniforms we inject
///    ourselves, so sources written against plain OpenGL keep compiling.
/// 2. Prepend [`HEADER`] which declares the uniform block and macro aliases.
/// 3. Append [`FOOTER`] which remaps the fragment coordinate to a bottom-left
///    origin, calls `mainImage`, and writes the output color.
fn wrap_fragment(source: &str) -> String {
    let mut sanitized = String::new();
    let mut skipped_version = false;
    for line in source.lines() {
        if !skipped_version && line.trim_start().starts_with("#version") {
            skipped_version = true;
            continue;
        }
        let trimmed = line.trim_start();
        let is_injected_uniform = trimmed.starts_with("uniform ")
            && (trimmed.contains("iResolution")
                || trimmed.contains("iTime")
                || trimmed.contains("iMouse"));
        if is_injected_uniform {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!("{HEADER}\n#line 1\n{sanitized}{FOOTER}")
}

/// GLSL prologue injected ahead of every user fragment shader.
///
/// The uniform block layout must match `FrameUniforms` in `gpu/uniforms.rs`.
/// A shader that never mentions `iMouse` simply never expands the macro; the
/// corresponding buffer bytes are written each frame and go unread.
const HEADER: &str = r"#version 450
layout(location = 0) out vec4 fragview_out_color;

layout(std140, set = 0, binding = 0) uniform FrameParams {
    vec2 _iResolution;
    float _iTime;
    float _padding0;
    vec4 _iMouse;
} ubo;

#define iResolution ubo._iResolution
#define iTime ubo._iTime
#define iMouse ubo._iMouse
";

/// GLSL epilogue that remaps coordinates and delegates to `mainImage`.
///
/// `gl_FragCoord` is top-left in wgpu; `mainImage` receives the conventional
/// bottom-left coordinate instead.
const FOOTER: &str = r"void main() {
    vec2 fragCoord = vec2(gl_FragCoord.x, ubo._iResolution.y - gl_FragCoord.y);
    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    fragview_out_color = color;
}
";

#[cfg(test)]
mod tests {
    use super::*;

    const PLASMA: &str = r#"
        void mainImage(out vec4 fragColor, in vec2 fragCoord) {
            vec2 uv = fragCoord / iResolution.xy;
            vec3 col = 0.5 + 0.5 * cos(iTime + uv.xyx + vec3(0.0, 2.0, 4.0));
            fragColor = vec4(col, 1.0);
        }
    "#;

    #[test]
    fn wrap_strips_injected_uniforms() {
        let source = r#"
            #version 410 core
            uniform float iTime;
            uniform vec2 iResolution;
            uniform vec4 iMouse;
            void mainImage(out vec4 fragColor, in vec2 fragCoord) {
                fragColor = vec4(fragCoord, 0.0, 1.0);
            }
        "#;

        let wrapped = wrap_fragment(source);
        assert!(!wrapped.contains("uniform float iTime"));
        assert!(!wrapped.contains("uniform vec2 iResolution"));
        assert!(!wrapped.contains("uniform vec4 iMouse"));
        assert!(!wrapped.contains("#version 410"));
        assert!(wrapped.starts_with("#version 450"));
        assert!(wrapped.contains("mainImage(color, fragCoord)"));
    }

    #[test]
    fn valid_fragment_passes_validation() {
        validate_stage(ShaderStage::Fragment, &wrap_fragment(PLASMA))
            .expect("plasma shader should validate");
    }

    #[test]
    fn syntax_error_is_reported_with_a_log() {
        let broken = r#"
            void mainImage(out vec4 fragColor, in vec2 fragCoord) {
                fragColor = vec4(1.0
            }
        "#;

        let err = validate_stage(ShaderStage::Fragment, &wrap_fragment(broken))
            .expect_err("unbalanced parenthesis must not validate");
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn default_vertex_shader_validates() {
        let vertex = r#"
            #version 450
            layout(location = 0) in vec2 position;

            void main() {
                gl_Position = vec4(position, 0.0, 1.0);
            }
        "#;
        validate_stage(ShaderStage::Vertex, vertex).expect("quad vertex shader should validate");
    }
}
