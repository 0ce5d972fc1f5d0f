use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::api::{ObjectId, ShaderStage, UniformLocation};
use super::context::Gl;
use super::error::ShaderError;
use super::uniform::Uniform;

/// A linked GPU program.
///
/// Uniform locations are resolved on first use and memoized per name; a
/// location never changes for the lifetime of the program, so the cache is
/// never invalidated.
#[derive(Debug)]
pub struct ShaderProgram {
    gl: Gl,
    id: ObjectId,
    uniforms: RefCell<HashMap<String, Option<UniformLocation>>>,
}

impl ShaderProgram {
    pub fn bind(&self) {
        self.gl.use_program(Some(self.id));
    }

    pub fn unbind(&self) {
        self.gl.use_program(None);
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Resolves `name`, querying the driver only on the first lookup.
    ///
    /// `None` means the program has no active uniform with that name.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        if let Some(cached) = self.uniforms.borrow().get(name) {
            return *cached;
        }

        let location = self.gl.uniform_location(self.id, name);
        if location.is_none() {
            log::debug!("program {}: uniform `{name}` not found; uploads will be skipped", self.id);
        }

        self.uniforms.borrow_mut().insert(name.to_owned(), location);
        location
    }

    /// Uploads `value` to `name` on the program currently in use.
    ///
    /// Unknown names are a no-op.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        self.set_uniform_array(name, std::slice::from_ref(&value));
    }

    /// Uploads `values` to the array uniform `name`.
    pub fn set_uniform_array<T: Uniform>(&self, name: &str, values: &[T]) {
        let Some(location) = self.uniform_location(name) else {
            log::trace!("program {}: skipped upload to missing uniform `{name}`", self.id);
            return;
        };

        self.gl.set_uniform(location, T::data(values));
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if self.gl.is_alive() {
            self.gl.delete_program(self.id);
        }
    }
}

/// Collects shader stages, compiles and links them into a [`ShaderProgram`].
///
/// Stage objects are transient: they are released once linking finishes,
/// whatever the outcome. Dropping an unfinished builder releases everything it
/// created.
#[derive(Debug)]
pub struct ShaderBuilder {
    gl: Gl,
    stages: BTreeMap<ShaderStage, ObjectId>,
    program: Option<ObjectId>,
}

impl ShaderBuilder {
    pub fn new(gl: &Gl) -> Self {
        Self {
            gl: gl.clone(),
            stages: BTreeMap::new(),
            program: None,
        }
    }

    /// Reads `path` in full and registers it as the source of `stage`.
    ///
    /// Nothing is registered on failure. Each stage kind may be added once.
    pub fn add_shader(&mut self, stage: ShaderStage, path: impl AsRef<Path>) -> Result<(), ShaderError> {
        let path = path.as_ref();

        if self.program.is_some() {
            return Err(ShaderError::AlreadyLinked);
        }
        if self.stages.contains_key(&stage) {
            return Err(ShaderError::DuplicateStage(stage));
        }

        let source = read_source(stage, path)?;

        let shader = self
            .gl
            .create_shader(stage)
            .map_err(|message| ShaderError::CreateShader { stage, message })?;
        self.gl.shader_source(shader, &source);
        self.stages.insert(stage, shader);

        log::debug!("queued {stage} from {}", path.display());
        Ok(())
    }

    /// Number of stages registered and not yet consumed by linking.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Compiles every registered stage, links and validates the program.
    ///
    /// Fails with [`ShaderError::NoStages`] before touching the GPU when no
    /// stage was added.
    pub fn compile_and_link(&mut self) -> Result<(), ShaderError> {
        if self.program.is_some() {
            return Err(ShaderError::AlreadyLinked);
        }
        if self.stages.is_empty() {
            return Err(ShaderError::NoStages);
        }

        let program = self.gl.create_program().map_err(ShaderError::CreateProgram)?;

        let mut attached = Vec::with_capacity(self.stages.len());
        let result = self.link_into(program, &mut attached);

        for shader in attached {
            self.gl.detach_shader(program, shader);
        }
        for (_, shader) in std::mem::take(&mut self.stages) {
            self.gl.delete_shader(shader);
        }

        match result {
            Ok(()) => {
                self.program = Some(program);
                Ok(())
            }
            Err(err) => {
                self.gl.delete_program(program);
                Err(err)
            }
        }
    }

    fn link_into(&self, program: ObjectId, attached: &mut Vec<ObjectId>) -> Result<(), ShaderError> {
        for (&stage, &shader) in &self.stages {
            self.gl
                .compile_shader(shader)
                .map_err(|log| ShaderError::Compile { stage, log })?;
            self.gl.attach_shader(program, shader);
            attached.push(shader);
        }

        self.gl.link_program(program).map_err(ShaderError::Link)?;

        if let Err(log) = self.gl.validate_program(program) {
            log::warn!("program {program} failed validation: {log}");
        }

        Ok(())
    }

    /// Hands the linked program over to a [`ShaderProgram`].
    pub fn finish(mut self) -> Result<ShaderProgram, ShaderError> {
        let id = self.program.take().ok_or(ShaderError::NotLinked)?;

        Ok(ShaderProgram {
            gl: self.gl.clone(),
            id,
            uniforms: RefCell::new(HashMap::new()),
        })
    }
}

impl Drop for ShaderBuilder {
    fn drop(&mut self) {
        if !self.gl.is_alive() {
            return;
        }
        for (_, shader) in std::mem::take(&mut self.stages) {
            self.gl.delete_shader(shader);
        }
        if let Some(program) = self.program.take() {
            self.gl.delete_program(program);
        }
    }
}

fn read_source(stage: ShaderStage, path: &Path) -> Result<String, ShaderError> {
    let io_err = |source| ShaderError::Io {
        stage,
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let expected = file.metadata().map_err(io_err)?.len();

    let mut source = String::with_capacity(expected as usize);
    file.read_to_string(&mut source).map_err(io_err)?;

    let read = source.len() as u64;
    if read != expected {
        return Err(ShaderError::LengthMismatch {
            path: path.to_path_buf(),
            expected,
            read,
        });
    }

    Ok(source)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use glam::DVec2;
    use tempfile::TempDir;

    use super::*;
    use crate::gl::{Components, UniformData};
    use crate::headless::{recording_gl, GlCall, RecordedUniform, RecordingGl};

    fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn linked_program(gl: &Gl) -> ShaderProgram {
        let dir = tempfile::tempdir().unwrap();
        let vs = write_source(&dir, "vertex.glsl", "void main() {}");
        let fs = write_source(&dir, "fragment.glsl", "void main() {}");

        let mut builder = ShaderBuilder::new(gl);
        builder.add_shader(ShaderStage::Vertex, &vs).unwrap();
        builder.add_shader(ShaderStage::Fragment, &fs).unwrap();
        builder.compile_and_link().unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn missing_file_fails_without_registering_stage() {
        let (gl, log) = recording_gl();
        let mut builder = ShaderBuilder::new(&gl);

        let err = builder
            .add_shader(ShaderStage::Vertex, "/definitely/not/here/vertex.glsl")
            .unwrap_err();

        assert!(matches!(err, ShaderError::Io { stage: ShaderStage::Vertex, .. }));
        assert_eq!(builder.stage_count(), 0);
        assert_eq!(log.count(|c| matches!(c, GlCall::CreateShader { .. })), 0);
    }

    #[test]
    fn zero_stages_fail_before_creating_a_program() {
        let (gl, log) = recording_gl();
        let mut builder = ShaderBuilder::new(&gl);

        assert!(matches!(builder.compile_and_link(), Err(ShaderError::NoStages)));
        assert_eq!(log.count(|c| matches!(c, GlCall::CreateProgram(_))), 0);
    }

    #[test]
    fn duplicate_stage_is_rejected_and_first_kept() {
        let (gl, log) = recording_gl();
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "dup.vert", "void main() {}");
        let mut builder = ShaderBuilder::new(&gl);

        builder.add_shader(ShaderStage::Vertex, &path).unwrap();
        let err = builder.add_shader(ShaderStage::Vertex, &path).unwrap_err();

        assert!(matches!(err, ShaderError::DuplicateStage(ShaderStage::Vertex)));
        assert_eq!(builder.stage_count(), 1);
        assert_eq!(log.count(|c| matches!(c, GlCall::CreateShader { .. })), 1);
    }

    #[test]
    fn source_is_uploaded_in_full() {
        let (gl, log) = recording_gl();
        let text = "#version 410 core\nvoid main() {}\n";
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "full.frag", text);

        let mut builder = ShaderBuilder::new(&gl);
        builder.add_shader(ShaderStage::Fragment, &path).unwrap();

        assert_eq!(log.count(|c| matches!(c, GlCall::ShaderSource { len, .. } if *len == text.len())), 1);
    }

    #[test]
    fn link_releases_stage_objects() {
        let (gl, log) = recording_gl();
        let program = linked_program(&gl);

        let created = log.count(|c| matches!(c, GlCall::CreateShader { .. }));
        let detached = log.count(|c| matches!(c, GlCall::DetachShader { program: p, .. } if *p == program.id()));
        let deleted = log.count(|c| matches!(c, GlCall::DeleteShader(_)));

        assert_eq!(created, 2);
        assert_eq!(detached, 2);
        assert_eq!(deleted, 2);
        assert!(log.contains(&GlCall::LinkProgram(program.id())));
        assert!(log.contains(&GlCall::ValidateProgram(program.id())));
    }

    #[test]
    fn compile_failure_reports_stage_and_log() {
        let (gl, log) = RecordingGl::new()
            .fail_compile(ShaderStage::Fragment, "0:1: syntax error")
            .into_gl();
        let dir = tempfile::tempdir().unwrap();
        let vs = write_source(&dir, "cf.vert", "void main() {}");
        let fs = write_source(&dir, "cf.frag", "void main( {}");

        let mut builder = ShaderBuilder::new(&gl);
        builder.add_shader(ShaderStage::Vertex, &vs).unwrap();
        builder.add_shader(ShaderStage::Fragment, &fs).unwrap();

        match builder.compile_and_link() {
            Err(ShaderError::Compile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(log, "0:1: syntax error");
            }
            other => panic!("expected compile failure, got {other:?}"),
        }

        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteShader(_))), 2);
        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteProgram(_))), 1);
        assert_eq!(log.count(|c| matches!(c, GlCall::LinkProgram(_))), 0);
        assert!(matches!(builder.finish(), Err(ShaderError::NotLinked)));
    }

    #[test]
    fn link_failure_is_surfaced() {
        let (gl, _log) = RecordingGl::new().fail_link("missing main").into_gl();
        let dir = tempfile::tempdir().unwrap();
        let vs = write_source(&dir, "lf.vert", "void main() {}");

        let mut builder = ShaderBuilder::new(&gl);
        builder.add_shader(ShaderStage::Vertex, &vs).unwrap();

        assert!(matches!(builder.compile_and_link(), Err(ShaderError::Link(msg)) if msg == "missing main"));
    }

    #[test]
    fn validation_failure_only_warns() {
        let (gl, log) = RecordingGl::new().fail_validate().into_gl();
        let dir = tempfile::tempdir().unwrap();
        let vs = write_source(&dir, "vertex.glsl", "void main() {}");
        let fs = write_source(&dir, "fragment.glsl", "void main() {}");

        let mut builder = ShaderBuilder::new(&gl);
        builder.add_shader(ShaderStage::Vertex, &vs).unwrap();
        builder.add_shader(ShaderStage::Fragment, &fs).unwrap();

        assert!(builder.compile_and_link().is_ok());
        let program = builder.finish().unwrap();

        assert!(log.contains(&GlCall::ValidateProgram(program.id())));
        assert_eq!(log.count(|c| matches!(c, GlCall::DetachShader { .. })), 2);
        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteShader(_))), 2);
        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteProgram(_))), 0);
    }

    #[test]
    fn adding_after_link_is_rejected() {
        let (gl, _log) = recording_gl();
        let dir = tempfile::tempdir().unwrap();
        let vs = write_source(&dir, "late.vert", "void main() {}");
        let gs = write_source(&dir, "late.geom", "void main() {}");

        let mut builder = ShaderBuilder::new(&gl);
        builder.add_shader(ShaderStage::Vertex, &vs).unwrap();
        builder.compile_and_link().unwrap();

        assert!(matches!(
            builder.add_shader(ShaderStage::Geometry, &gs),
            Err(ShaderError::AlreadyLinked)
        ));
    }

    #[test]
    fn dropping_unfinished_builder_releases_program() {
        let (gl, log) = recording_gl();
        let dir = tempfile::tempdir().unwrap();
        let vs = write_source(&dir, "drop.vert", "void main() {}");

        let mut builder = ShaderBuilder::new(&gl);
        builder.add_shader(ShaderStage::Vertex, &vs).unwrap();
        builder.compile_and_link().unwrap();
        drop(builder);

        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteProgram(_))), 1);
    }

    #[test]
    fn uniform_location_is_cached_after_first_lookup() {
        let (gl, log) = recording_gl();
        let program = linked_program(&gl);
        log.clear();

        let first = program.uniform_location("u_offset");
        let second = program.uniform_location("u_offset");

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(log.count(|c| matches!(c, GlCall::UniformLocation { .. })), 1);
    }

    #[test]
    fn missing_uniform_is_cached_and_upload_skipped() {
        let (gl, log) = RecordingGl::new().without_uniform("u_gone").into_gl();
        let program = linked_program(&gl);
        log.clear();

        program.set_uniform("u_gone", 1.0f32);
        program.set_uniform("u_gone", 2.0f32);

        assert_eq!(log.count(|c| matches!(c, GlCall::UniformLocation { .. })), 1);
        assert_eq!(log.count(|c| matches!(c, GlCall::SetUniform { .. })), 0);
    }

    #[test]
    fn set_uniform_uploads_typed_values() {
        let (gl, log) = recording_gl();
        let program = linked_program(&gl);
        program.bind();

        program.set_uniform("u_offset", DVec2::new(-0.5, 0.25));
        let location = program.uniform_location("u_offset").unwrap();

        assert!(log.contains(&GlCall::SetUniform {
            location,
            values: RecordedUniform::F64 { components: Components::Two, values: vec![-0.5, 0.25] },
        }));
    }

    #[test]
    fn set_uniform_array_uploads_every_element() {
        let (gl, log) = recording_gl();
        let program = linked_program(&gl);

        program.set_uniform_array("u_palette", &[1i32, 2, 3]);

        let uploaded = log.calls().into_iter().find_map(|c| match c {
            GlCall::SetUniform { values, .. } => Some(values),
            _ => None,
        });
        assert_eq!(
            uploaded,
            Some(RecordedUniform::I32 { components: Components::One, values: vec![1, 2, 3] })
        );
        assert_eq!(
            i32::data(&[1, 2, 3]),
            UniformData::I32 { components: Components::One, values: &[1, 2, 3] }
        );
    }
}
