//! Types for operation parameters, request bodies and responses.
//!
//! Collection runs while the arena is still being built, since every schema an operation
//! mentions has to be lowered before the resolver can borrow the arena. Compilation runs
//! afterwards against the same [`SchemaCompiler`] used for component schemas.

use std::collections::{BTreeMap, BTreeSet};

use mediatype::MediaType;
use serde_json::{Map, Value};
use strum::Display;

use crate::{
  generator::{
    compiler::{
      Property, PropertyExtensions, RustType, SchemaCompiler, StructShape, TypeDefinition, TypeDescriptor, TypePath,
      struct_descriptor,
    },
    document::{ArenaBuilder, SchemaRef},
    errors::GenerationResult,
    filter::{HTTP_METHODS, OPERATION_SECTIONS},
    metrics::GenerationWarning,
    naming::{
      identifiers::{segments_to_type_name, to_rust_field_name, to_rust_type_name},
      unique::ensure_unique,
    },
  },
  utils::refs::parse_component_ref,
};

const MAX_DEREF: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ParameterLocation {
  Path,
  Query,
  Header,
  Cookie,
}

impl ParameterLocation {
  fn parse(value: &str) -> Option<Self> {
    match value {
      "path" => Some(Self::Path),
      "query" => Some(Self::Query),
      "header" => Some(Self::Header),
      "cookie" => Some(Self::Cookie),
      _ => None,
    }
  }
}

/// Component sections whose JSON schemas get a type of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum ComponentSection {
  #[strum(to_string = "parameters")]
  Parameters,
  #[strum(to_string = "requestBodies")]
  RequestBodies,
  #[strum(to_string = "responses")]
  Responses,
  #[strum(to_string = "headers")]
  Headers,
}

impl ComponentSection {
  const ALL: [Self; 4] = [Self::Parameters, Self::RequestBodies, Self::Responses, Self::Headers];

  fn type_suffix(self) -> &'static str {
    match self {
      Self::Parameters => "Parameter",
      Self::RequestBodies => "RequestBody",
      Self::Responses => "Response",
      Self::Headers => "Header",
    }
  }
}

/// Whether a content type carries JSON: `application/json` or any `+json` suffix.
#[must_use]
pub fn is_json_media_type(content_type: &str) -> bool {
  let Ok(media) = MediaType::parse(content_type) else {
    return false;
  };
  let suffix = media.suffix.as_ref().map(mediatype::Name::as_str);
  matches!(
    (media.ty.as_str(), media.subty.as_str(), suffix),
    ("application", "json", _) | (_, _, Some("json"))
  )
}

/// The schema of the preferred JSON entry of a `content` map. `application/json` wins over
/// other JSON media types.
fn json_content_schema(content: &Map<String, Value>) -> Option<&Value> {
  let exact = content.iter().find(|(content_type, _)| {
    MediaType::parse(content_type).is_ok_and(|m| m.ty.as_str() == "application" && m.subty.as_str() == "json")
  });
  let (_, media) = exact.or_else(|| content.iter().find(|(content_type, _)| is_json_media_type(content_type)))?;
  media.get("schema")
}

/// What a parameter, body or response compiles from.
#[derive(Debug, Clone)]
enum PlannedSchema {
  Schema(SchemaRef),
  /// Element schema of a `oneOf` accepting one value or a list of values.
  OneOrMany(SchemaRef),
  /// No JSON schema, carried as text.
  Text,
  /// A component of another section that has a type of its own.
  Component(ComponentSection, String),
}

#[derive(Debug, Clone)]
struct PlannedComponent {
  section: ComponentSection,
  name: String,
  schema: PlannedSchema,
}

#[derive(Debug, Clone)]
struct PlannedParameter {
  name: String,
  location: ParameterLocation,
  required: bool,
  deprecated: bool,
  description: Option<String>,
  schema: PlannedSchema,
}

#[derive(Debug, Clone)]
struct PlannedOperation {
  /// Base of every type name derived from the operation.
  type_name: String,
  method: String,
  path: String,
  is_webhook: bool,
  parameters: Vec<PlannedParameter>,
  request_body: Option<PlannedSchema>,
  responses: Vec<(String, PlannedSchema)>,
}

/// Operation-level schemas of a document, lowered and waiting to be compiled.
#[derive(Debug, Clone, Default)]
pub struct OperationPlan {
  components: Vec<PlannedComponent>,
  planned: BTreeSet<(ComponentSection, String)>,
  operations: Vec<PlannedOperation>,
  warnings: Vec<GenerationWarning>,
}

/// The types an operation ended up using.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationTypes {
  pub type_name: String,
  pub method: String,
  pub path: String,
  pub is_webhook: bool,
  /// The query, header and cookie parameter struct.
  pub params: Option<String>,
  pub path_parameters: Vec<(String, RustType)>,
  pub request_body: Option<RustType>,
  /// Status code (or `default`) to body type, in document order.
  pub responses: Vec<(String, RustType)>,
}

#[derive(Debug, Clone, Default)]
pub struct CompiledOperations {
  pub definitions: Vec<TypeDefinition>,
  pub operations: Vec<OperationTypes>,
}

impl OperationPlan {
  /// Lowers the schemas of component parameters, request bodies, responses and headers, and of
  /// every operation under `paths` and `webhooks`, in sorted path order.
  pub fn collect(document: &Value, builder: &mut ArenaBuilder<'_>) -> Self {
    let mut plan = Self::default();
    plan.collect_components(document, builder);

    for section in OPERATION_SECTIONS {
      let Some(items) = document.get(section).and_then(Value::as_object) else {
        continue;
      };
      let mut items: Vec<(&String, &Value)> = items.iter().collect();
      items.sort_by(|a, b| a.0.cmp(b.0));

      for (path, item) in items {
        let (_, item) = dereference(document, item, "pathItems");
        let shared = item
          .get("parameters")
          .and_then(Value::as_array)
          .map(Vec::as_slice)
          .unwrap_or_default();
        for method in HTTP_METHODS {
          if let Some(operation) = item.get(method) {
            plan.collect_operation(document, builder, section == "webhooks", path, method, operation, shared);
          }
        }
      }
    }
    plan
  }

  #[must_use]
  pub fn operation_count(&self) -> usize {
    self.operations.len()
  }

  fn collect_components(&mut self, document: &Value, builder: &mut ArenaBuilder<'_>) {
    for section in ComponentSection::ALL {
      let Some(entries) = document
        .pointer(&format!("/components/{section}"))
        .and_then(Value::as_object)
      else {
        continue;
      };
      for (name, value) in entries {
        // A component that only refers to another one is typed through its target.
        if value.get("$ref").is_some() {
          continue;
        }
        let schema = match section {
          ComponentSection::Parameters | ComponentSection::Headers => parameter_schema(value, builder),
          ComponentSection::RequestBodies | ComponentSection::Responses => {
            content_schema(value, builder).map(PlannedSchema::Schema)
          }
        };
        let Some(schema) = schema else {
          tracing::debug!(%section, %name, "component has no JSON schema");
          continue;
        };
        self.planned.insert((section, name.clone()));
        self.components.push(PlannedComponent {
          section,
          name: name.clone(),
          schema,
        });
      }
    }
  }

  #[allow(clippy::too_many_arguments)]
  fn collect_operation(
    &mut self,
    document: &Value,
    builder: &mut ArenaBuilder<'_>,
    is_webhook: bool,
    path: &str,
    method: &str,
    operation: &Value,
    shared: &[Value],
  ) {
    let operation_id = operation.get("operationId").and_then(Value::as_str);
    let type_name = operation_type_name(operation_id, method, path);
    let label = operation_id.map_or_else(|| format!("{} {path}", method.to_uppercase()), str::to_string);

    let own = operation
      .get("parameters")
      .and_then(Value::as_array)
      .map(Vec::as_slice)
      .unwrap_or_default();
    let mut parameters: Vec<PlannedParameter> = vec![];
    for raw in shared.iter().chain(own) {
      let Some(parameter) = self.plan_parameter(document, builder, raw, &label) else {
        continue;
      };
      match parameters
        .iter_mut()
        .find(|p| p.name == parameter.name && p.location == parameter.location)
      {
        Some(existing) => *existing = parameter,
        None => parameters.push(parameter),
      }
    }

    let request_body = operation
      .get("requestBody")
      .and_then(|body| self.plan_payload(document, builder, body, ComponentSection::RequestBodies));

    let responses = operation
      .get("responses")
      .and_then(Value::as_object)
      .map(|responses| {
        responses
          .iter()
          .filter_map(|(status, response)| {
            self
              .plan_payload(document, builder, response, ComponentSection::Responses)
              .map(|schema| (status.clone(), schema))
          })
          .collect()
      })
      .unwrap_or_default();

    self.operations.push(PlannedOperation {
      type_name,
      method: method.to_string(),
      path: path.to_string(),
      is_webhook,
      parameters,
      request_body,
      responses,
    });
  }

  fn plan_parameter(
    &mut self,
    document: &Value,
    builder: &mut ArenaBuilder<'_>,
    raw: &Value,
    label: &str,
  ) -> Option<PlannedParameter> {
    let (component, value) = dereference(document, raw, "parameters");
    let name = value.get("name").and_then(Value::as_str);
    let location = value.get("in").and_then(Value::as_str).and_then(ParameterLocation::parse);
    let (Some(name), Some(location)) = (name, location) else {
      self.warnings.push(GenerationWarning::OperationSpecific {
        operation_id: label.to_string(),
        message: "parameter without a usable name and location was skipped".to_string(),
      });
      return None;
    };

    let schema = match component.filter(|c| self.planned.contains(&(ComponentSection::Parameters, c.clone()))) {
      Some(component) => PlannedSchema::Component(ComponentSection::Parameters, component),
      None => parameter_schema(value, builder).unwrap_or_else(|| {
        self.warnings.push(GenerationWarning::NonJsonParameter {
          operation_id: label.to_string(),
          parameter: name.to_string(),
        });
        PlannedSchema::Text
      }),
    };

    Some(PlannedParameter {
      name: name.to_string(),
      location,
      required: location == ParameterLocation::Path || flag(value, "required"),
      deprecated: flag(value, "deprecated"),
      description: value.get("description").and_then(Value::as_str).map(str::to_string),
      schema,
    })
  }

  /// A request body or response: the component type when it has one, else its JSON schema.
  fn plan_payload(
    &self,
    document: &Value,
    builder: &mut ArenaBuilder<'_>,
    raw: &Value,
    section: ComponentSection,
  ) -> Option<PlannedSchema> {
    let (component, value) = dereference(document, raw, &section.to_string());
    if let Some(component) = component.filter(|c| self.planned.contains(&(section, c.clone()))) {
      return Some(PlannedSchema::Component(section, component));
    }
    content_schema(value, builder).map(PlannedSchema::Schema)
  }

  /// Compiles every planned schema. Component types are named first so operations can use them.
  pub fn compile(self, compiler: &mut SchemaCompiler<'_>) -> GenerationResult<CompiledOperations> {
    for warning in self.warnings {
      compiler.warn(warning);
    }

    let mut names = BTreeMap::new();
    for component in &self.components {
      let candidate = format!("{}{}", to_rust_type_name(&component.name), component.section.type_suffix());
      let name = compiler.resolver_mut().claim_name(&candidate)?;
      names.insert((component.section, component.name.clone()), name);
    }

    let mut compiled = CompiledOperations::default();
    for component in &self.components {
      let Some(name) = names.get(&(component.section, component.name.clone())).cloned() else {
        continue;
      };
      let _span = tracing::debug_span!("component", section = %component.section, name = %component.name).entered();
      let descriptor = compile_schema(compiler, &component.schema, &TypePath::root(name.clone()), &names)?;
      compiled.definitions.extend(SchemaCompiler::top_level(name, descriptor));
    }

    for operation in &self.operations {
      let _span = tracing::debug_span!("operation", method = %operation.method, path = %operation.path).entered();
      let types = compile_operation(compiler, operation, &names, &mut compiled.definitions)?;
      compiled.operations.push(types);
    }
    Ok(compiled)
  }
}

type ComponentNames = BTreeMap<(ComponentSection, String), String>;

fn compile_operation(
  compiler: &mut SchemaCompiler<'_>,
  operation: &PlannedOperation,
  names: &ComponentNames,
  definitions: &mut Vec<TypeDefinition>,
) -> GenerationResult<OperationTypes> {
  let path_root = TypePath::root(operation.type_name.clone());
  let mut path_parameters = vec![];
  for parameter in operation
    .parameters
    .iter()
    .filter(|p| p.location == ParameterLocation::Path)
  {
    let mut descriptor = compile_schema(compiler, &parameter.schema, &path_root.child(parameter.name.clone()), names)?;
    definitions.extend(descriptor.take_additional_types());
    path_parameters.push((parameter.name.clone(), descriptor.rust_type));
  }

  let params = compile_params_struct(compiler, operation, names, definitions)?;

  let request_body = match &operation.request_body {
    Some(schema) => {
      let candidate = format!("{}RequestBody", operation.type_name);
      Some(compile_payload(compiler, schema, &candidate, names, definitions)?)
    }
    None => None,
  };

  let mut responses = vec![];
  for (status, schema) in &operation.responses {
    let candidate = segments_to_type_name([operation.type_name.as_str(), status.as_str(), "Response"]);
    responses.push((status.clone(), compile_payload(compiler, schema, &candidate, names, definitions)?));
  }

  Ok(OperationTypes {
    type_name: operation.type_name.clone(),
    method: operation.method.clone(),
    path: operation.path.clone(),
    is_webhook: operation.is_webhook,
    params,
    path_parameters,
    request_body,
    responses,
  })
}

/// `{Operation}Params` holding the query, header and cookie parameters.
fn compile_params_struct(
  compiler: &mut SchemaCompiler<'_>,
  operation: &PlannedOperation,
  names: &ComponentNames,
  definitions: &mut Vec<TypeDefinition>,
) -> GenerationResult<Option<String>> {
  let parameters: Vec<&PlannedParameter> = operation
    .parameters
    .iter()
    .filter(|p| p.location != ParameterLocation::Path)
    .collect();
  if parameters.is_empty() {
    return Ok(None);
  }

  let name = compiler
    .resolver_mut()
    .claim_name(&format!("{}Params", operation.type_name))?;
  let root = TypePath::root(name.clone());

  let mut used = BTreeSet::new();
  let mut properties = Vec::with_capacity(parameters.len());
  for parameter in parameters {
    let mut descriptor = compile_schema(compiler, &parameter.schema, &root.child(parameter.name.clone()), names)?;
    definitions.extend(descriptor.take_additional_types());

    let field_name = ensure_unique(&to_rust_field_name(&parameter.name), &used);
    used.insert(field_name.clone());
    properties.push(Property {
      json_name: parameter.name.clone(),
      field_name,
      required: parameter.required,
      nullable: descriptor.nullable,
      read_only: false,
      write_only: false,
      deprecated: parameter.deprecated,
      description: parameter.description.clone().or_else(|| descriptor.description.clone()),
      default: None,
      extensions: PropertyExtensions::default(),
      descriptor,
    });
  }

  let descriptor = struct_descriptor(StructShape {
    properties,
    ..StructShape::default()
  });
  definitions.extend(SchemaCompiler::top_level(name.clone(), descriptor));
  Ok(Some(name))
}

/// A request body or response type. References are used as they are, inline schemas are
/// named after `candidate`.
fn compile_payload(
  compiler: &mut SchemaCompiler<'_>,
  schema: &PlannedSchema,
  candidate: &str,
  names: &ComponentNames,
  definitions: &mut Vec<TypeDefinition>,
) -> GenerationResult<RustType> {
  if let PlannedSchema::Component(..) = schema {
    return Ok(compile_schema(compiler, schema, &TypePath::root(candidate), names)?.rust_type);
  }

  let reference = matches!(schema, PlannedSchema::Schema(r) if r.is_reference());
  let path_name = if reference {
    candidate.to_string()
  } else {
    compiler.resolver_mut().claim_name(candidate)?
  };
  let mut descriptor = compile_schema(compiler, schema, &TypePath::root(path_name.clone()), names)?;

  if reference && !descriptor.is_structural() {
    definitions.extend(descriptor.take_additional_types());
    return Ok(descriptor.rust_type);
  }

  // A reference into the middle of a schema compiles to a body that still needs a name.
  let name = if reference {
    compiler.resolver_mut().claim_name(&path_name)?
  } else {
    path_name
  };
  definitions.extend(SchemaCompiler::top_level(name.clone(), descriptor));
  Ok(RustType::Named(name))
}

fn compile_schema(
  compiler: &mut SchemaCompiler<'_>,
  schema: &PlannedSchema,
  path: &TypePath,
  names: &ComponentNames,
) -> GenerationResult<TypeDescriptor> {
  match schema {
    PlannedSchema::Schema(schema_ref) => compiler.compile(schema_ref, path),
    PlannedSchema::OneOrMany(element) => {
      let mut element = compiler.compile(element, &path.child("Item"))?;
      let additional_types = element.take_additional_types();
      let mut descriptor = TypeDescriptor::new(RustType::Verbatim(format!(
        "oas3_typegen_support::OneOrMany<{}>",
        element.rust_type
      )));
      descriptor.nullable = element.nullable;
      descriptor.additional_types = additional_types;
      Ok(descriptor)
    }
    PlannedSchema::Text => Ok(TypeDescriptor::new(RustType::string())),
    PlannedSchema::Component(section, name) => Ok(
      names
        .get(&(*section, name.clone()))
        .map_or_else(TypeDescriptor::any, |name| TypeDescriptor::named(name.clone())),
    ),
  }
}

/// Type name base of an operation: its `operationId`, or the method and path segments.
#[must_use]
pub fn operation_type_name(operation_id: Option<&str>, method: &str, path: &str) -> String {
  match operation_id.filter(|id| !id.is_empty()) {
    Some(id) => to_rust_type_name(id),
    None => segments_to_type_name(
      std::iter::once(method).chain(
        path
          .split('/')
          .map(|segment| segment.trim_matches(|c: char| c == '{' || c == '}'))
          .filter(|segment| !segment.is_empty()),
      ),
    ),
  }
}

fn parameter_schema(value: &Value, builder: &mut ArenaBuilder<'_>) -> Option<PlannedSchema> {
  if let Some(schema) = value.get("schema") {
    return Some(match one_or_many_element(schema) {
      Some(element) => PlannedSchema::OneOrMany(builder.lower_value(element)),
      None => PlannedSchema::Schema(builder.lower_value(schema)),
    });
  }

  let content = value.get("content")?.as_object()?;
  if content.len() != 1 {
    return None;
  }
  let (content_type, media) = content.iter().next()?;
  if !is_json_media_type(content_type) {
    return None;
  }
  media.get("schema").map(|schema| PlannedSchema::Schema(builder.lower_value(schema)))
}

fn content_schema(value: &Value, builder: &mut ArenaBuilder<'_>) -> Option<SchemaRef> {
  let content = value.get("content")?.as_object()?;
  json_content_schema(content).map(|schema| builder.lower_value(schema))
}

/// The element schema of `oneOf: [{type: string}, {type: array, items: ...}]`.
fn one_or_many_element(schema: &Value) -> Option<&Value> {
  let members = schema.get("oneOf")?.as_array()?;
  if members.len() != 2 {
    return None;
  }
  members.iter().find(|m| has_type(m, "string"))?;
  members
    .iter()
    .find(|m| has_type(m, "array"))
    .and_then(|many| many.get("items"))
}

fn has_type(schema: &Value, name: &str) -> bool {
  match schema.get("type") {
    Some(Value::String(ty)) => ty == name,
    Some(Value::Array(types)) => types.iter().any(|ty| ty.as_str() == Some(name)),
    _ => false,
  }
}

/// Follows local references into `section` and returns the last component reached.
fn dereference<'v>(document: &'v Value, value: &'v Value, section: &str) -> (Option<String>, &'v Value) {
  let mut current = value;
  let mut component = None;
  for _ in 0..MAX_DEREF {
    let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
      break;
    };
    let Some(target) = parse_component_ref(reference).filter(|r| r.document.is_none() && r.section == section) else {
      break;
    };
    let Some(next) = document
      .get("components")
      .and_then(|c| c.get(section))
      .and_then(|s| s.get(&target.name))
    else {
      break;
    };
    component = Some(target.name);
    current = next;
  }
  (component, current)
}

fn flag(value: &Value, key: &str) -> bool {
  value.get(key).and_then(Value::as_bool).unwrap_or(false)
}
