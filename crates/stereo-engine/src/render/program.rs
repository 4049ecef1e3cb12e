//! Shader program construction.
//!
//! A program is a vertex + fragment WGSL pair. Each stage is compiled on its
//! own; the pair is then linked, which checks the vertex attribute slots
//! against the bound attribute table and the inter-stage interface. Only a
//! fully linked program is uploaded to the device.

use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};

/// Vertex attribute slot of the position attribute.
pub const ATTR_POSITION: u32 = 1;

/// Vertex attribute slot of the normal attribute.
pub const ATTR_NORMAL: u32 = 2;

/// Fixed attribute table shared by every built-in program.
pub const DEFAULT_ATTRIBUTES: [(&str, u32); 2] = [("aPos", ATTR_POSITION), ("aNorm", ATTR_NORMAL)];

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failure to build a shader program.
///
/// `log` carries the diagnostic text; it is never empty.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramError {
    Compile { stage: ShaderStage, log: String },
    Link { log: String },
}

impl ProgramError {
    pub fn log(&self) -> &str {
        match self {
            ProgramError::Compile { log, .. } | ProgramError::Link { log } => log,
        }
    }
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::Compile { stage, log } => {
                write!(f, "{stage} shader compile failed:\n{log}")
            }
            ProgramError::Link { log } => write!(f, "program link failed:\n{log}"),
        }
    }
}

impl std::error::Error for ProgramError {}

/// A `@location` slot on a stage interface, with the name it was declared under.
#[derive(Debug, Clone, Eq, PartialEq)]
struct Slot {
    name: Option<String>,
    location: u32,
}

/// One successfully compiled stage.
struct CompiledStage {
    entry_point: String,
    inputs: Vec<Slot>,
    outputs: Vec<Slot>,
}

/// Output of a successful link; not yet on the device.
#[derive(Debug, Clone)]
pub struct LinkedProgram {
    label: String,
    vertex_source: String,
    fragment_source: String,
    vertex_entry: String,
    fragment_entry: String,
    attributes: Vec<(String, u32)>,
}

impl LinkedProgram {
    /// Attribute slots actually consumed by the vertex stage, in slot order.
    pub fn attributes(&self) -> &[(String, u32)] {
        &self.attributes
    }

    /// Creates the device-side shader modules.
    pub fn upload(self, device: &wgpu::Device) -> ShaderProgram {
        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} vertex", self.label)),
            source: wgpu::ShaderSource::Wgsl(self.vertex_source.into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} fragment", self.label)),
            source: wgpu::ShaderSource::Wgsl(self.fragment_source.into()),
        });

        ShaderProgram {
            vertex,
            fragment,
            vertex_entry: self.vertex_entry,
            fragment_entry: self.fragment_entry,
        }
    }
}

/// A linked, device-resident shader program.
///
/// Holding one means both stages compiled and linked; there is no invalid state.
/// Modules are released when the program is dropped.
pub struct ShaderProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,
}

impl ShaderProgram {
    pub fn vertex_state<'a>(
        &'a self,
        buffers: &'a [wgpu::VertexBufferLayout<'a>],
    ) -> wgpu::VertexState<'a> {
        wgpu::VertexState {
            module: &self.vertex,
            entry_point: Some(self.vertex_entry.as_str()),
            compilation_options: Default::default(),
            buffers,
        }
    }

    pub fn fragment_state<'a>(
        &'a self,
        targets: &'a [Option<wgpu::ColorTargetState>],
    ) -> wgpu::FragmentState<'a> {
        wgpu::FragmentState {
            module: &self.fragment,
            entry_point: Some(self.fragment_entry.as_str()),
            compilation_options: Default::default(),
            targets,
        }
    }
}

/// Builds a [`ShaderProgram`] from a vertex and a fragment source.
///
/// Attribute slots must be bound before [`link`](Self::link) for the check to
/// take them into account.
#[derive(Debug, Clone)]
pub struct ProgramBuilder<'a> {
    label: &'a str,
    vertex: &'a str,
    fragment: &'a str,
    attributes: Vec<(&'a str, u32)>,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(label: &'a str, vertex: &'a str, fragment: &'a str) -> Self {
        Self {
            label,
            vertex,
            fragment,
            attributes: Vec::new(),
        }
    }

    /// Binds the vertex input `name` to attribute slot `slot`.
    pub fn bind_attribute(mut self, name: &'a str, slot: u32) -> Self {
        self.attributes.retain(|(n, _)| *n != name);
        self.attributes.push((name, slot));
        self
    }

    /// Binds the fixed `aPos`/`aNorm` table.
    pub fn with_default_attributes(self) -> Self {
        DEFAULT_ATTRIBUTES
            .iter()
            .fold(self, |b, &(name, slot)| b.bind_attribute(name, slot))
    }

    /// Compiles both stages and links them, without touching the device.
    ///
    /// Failures are reported to the log with the program label.
    pub fn link(&self) -> Result<LinkedProgram, ProgramError> {
        let result = self.try_link();
        if let Err(err) = &result {
            log::error!("[{}] {err}", self.label);
        }
        result
    }

    /// Compiles, links and uploads the program.
    pub fn build(&self, device: &wgpu::Device) -> Result<ShaderProgram, ProgramError> {
        let program = self.link()?.upload(device);
        log::debug!("[{}] program built", self.label);
        Ok(program)
    }

    fn try_link(&self) -> Result<LinkedProgram, ProgramError> {
        // A fragment failure drops the compiled vertex stage with it.
        let vertex = compile_stage(ShaderStage::Vertex, self.vertex)?;
        let fragment = compile_stage(ShaderStage::Fragment, self.fragment)?;

        let mut problems = Vec::new();
        let mut attributes = Vec::new();

        for input in &vertex.inputs {
            let name = input.name.as_deref().unwrap_or("<unnamed>");
            match self.attributes.iter().find(|(n, _)| *n == name) {
                Some(&(_, slot)) if slot == input.location => {
                    attributes.push((name.to_string(), slot));
                }
                Some(&(_, slot)) => problems.push(format!(
                    "attribute `{name}` is declared at location {} but bound to slot {slot}",
                    input.location
                )),
                None => problems.push(format!(
                    "attribute `{name}` at location {} has no bound slot",
                    input.location
                )),
            }
        }

        for input in &fragment.inputs {
            if !vertex.outputs.iter().any(|o| o.location == input.location) {
                problems.push(format!(
                    "fragment input `{}` at location {} is not written by the vertex stage",
                    input.name.as_deref().unwrap_or("<unnamed>"),
                    input.location
                ));
            }
        }

        if !problems.is_empty() {
            return Err(ProgramError::Link {
                log: problems.join("\n"),
            });
        }

        attributes.sort_by_key(|&(_, slot)| slot);

        Ok(LinkedProgram {
            label: self.label.to_string(),
            vertex_source: self.vertex.to_string(),
            fragment_source: self.fragment.to_string(),
            vertex_entry: vertex.entry_point,
            fragment_entry: fragment.entry_point,
            attributes,
        })
    }
}

fn compile_stage(stage: ShaderStage, source: &str) -> Result<CompiledStage, ProgramError> {
    let compile_error = |log: String| ProgramError::Compile { stage, log };

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    let mut entries = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == stage.naga());

    let entry = entries
        .next()
        .ok_or_else(|| compile_error(format!("no @{stage} entry point")))?;
    if entries.next().is_some() {
        return Err(compile_error(format!("more than one @{stage} entry point")));
    }

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_slots(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_slots(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    Ok(CompiledStage {
        entry_point: entry.name.clone(),
        inputs,
        outputs,
    })
}

/// Gathers `@location` slots from a direct binding or from struct members.
fn collect_slots(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<Slot>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(Slot {
            name: name.map(str::to_string),
            location: *location,
        }),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.push(Slot {
                            name: member.name.clone(),
                            location: *location,
                        });
                    }
                }
            }
        }
    }
}
