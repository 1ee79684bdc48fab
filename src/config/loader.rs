//! File loading and include resolution.
//!
//! A vehicle document may farm sections out to sibling files; every include
//! path resolves relative to the directory of the document that names it.
//! Any failure (missing file, bad YAML, unknown operator) aborts the load
//! with an error instead of producing a partial model.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::document::{AerodynamicsDoc, SystemDoc, VehicleDocument};
use super::parser::build_model;
use crate::model::DynamicsModel;
use crate::utils::ConfigError;

/// Load, resolve and assemble a vehicle description in one step.
pub fn load_model(path: impl AsRef<Path>) -> Result<DynamicsModel, ConfigError> {
    let doc = load_document(path.as_ref())?;
    let model = build_model(&doc)?;
    info!(
        vehicle = doc.name.as_deref().unwrap_or("unnamed"),
        properties = model.properties.len(),
        "vehicle model assembled"
    );
    Ok(model)
}

/// Read a document and inline its includes.
pub fn load_document(path: &Path) -> Result<VehicleDocument, ConfigError> {
    let text = fs::read_to_string(path)?;
    let mut doc: VehicleDocument = serde_yaml::from_str(&text)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_includes(&mut doc, root)?;
    Ok(doc)
}

fn resolve_includes(doc: &mut VehicleDocument, root: &Path) -> Result<(), ConfigError> {
    if let Some(file) = doc.aerodynamics.file.take() {
        doc.aerodynamics = read_include::<AerodynamicsDoc>(root, &file)?;
    }
    for system in doc.systems.iter_mut().chain(doc.engine.iter_mut()) {
        if let Some(file) = system.file.take() {
            let loaded = read_include::<SystemDoc>(root, &file)?;
            system.name = loaded.name.or_else(|| system.name.take());
            system.functions = loaded.functions;
        }
    }
    Ok(())
}

fn read_include<T: DeserializeOwned>(root: &Path, file: &str) -> Result<T, ConfigError> {
    let path = root.join(file);
    debug!(path = %path.display(), "resolving include");
    let text = fs::read_to_string(&path)
        .map_err(|e| ConfigError::Include(format!("{}: {e}", path.display())))?;
    Ok(serde_yaml::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) {
        let mut f = fs::File::create(dir.path().join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    const BASE: &str = r#"
name: testcraft
metrics:
  wing_area: {value: 16.0}
  wing_span: {value: 10.0}
  chord: {value: 1.6}
mass_balance:
  ixx: {value: 1000.0}
  iyy: {value: 1500.0}
  izz: {value: 2200.0}
  empty_weight: {value: 700.0}
  location: {name: CG, x: 0.0, y: 0.0, z: 0.0}
"#;

    #[test]
    fn loads_inline_document() {
        let dir = TempDir::new().unwrap();
        let doc = format!(
            "{BASE}aerodynamics:\n  axes:\n    - name: LIFT\n      functions:\n        - name: aero/force/L\n          function:\n            value: 10.0\n"
        );
        write_file(&dir, "craft.yaml", &doc);
        let model = load_model(dir.path().join("craft.yaml")).unwrap();
        assert!(model.function("aero/force/L").is_some());
    }

    #[test]
    fn resolves_aerodynamics_include() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "aero.yaml",
            r#"
axes:
  - name: DRAG
    functions:
      - name: aero/force/D
        function:
          value: 3.0
"#,
        );
        let doc = format!("{BASE}aerodynamics:\n  file: aero.yaml\n");
        write_file(&dir, "craft.yaml", &doc);
        let model = load_model(dir.path().join("craft.yaml")).unwrap();
        assert_eq!(model.eval_function("aero/force/D").unwrap(), 3.0);
    }

    #[test]
    fn resolves_system_include() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "flaps.yaml",
            r#"
name: flap-logic
functions:
  - name: systems/flap-factor
    function:
      value: 1.2
"#,
        );
        let doc = format!(
            "{BASE}aerodynamics:\n  axes: []\nsystems:\n  - file: flaps.yaml\n"
        );
        write_file(&dir, "craft.yaml", &doc);
        let model = load_model(dir.path().join("craft.yaml")).unwrap();
        // system functions are referenceable but feed no axis
        assert_eq!(model.eval_function("systems/flap-factor").unwrap(), 1.2);
        let (force, _) = model.eval();
        assert_eq!(force.norm(), 0.0);
    }

    #[test]
    fn missing_include_aborts_load() {
        let dir = TempDir::new().unwrap();
        let doc = format!("{BASE}aerodynamics:\n  file: nope.yaml\n");
        write_file(&dir, "craft.yaml", &doc);
        assert!(matches!(
            load_model(dir.path().join("craft.yaml")),
            Err(ConfigError::Include(_))
        ));
    }

    #[test]
    fn unknown_operator_aborts_load() {
        let dir = TempDir::new().unwrap();
        let doc = format!(
            "{BASE}aerodynamics:\n  axes:\n    - name: LIFT\n      functions:\n        - name: aero/force/L\n          function:\n            clamp: [{{value: 1.0}}]\n"
        );
        write_file(&dir, "craft.yaml", &doc);
        assert!(matches!(
            load_model(dir.path().join("craft.yaml")),
            Err(ConfigError::Yaml(_))
        ));
    }
}
