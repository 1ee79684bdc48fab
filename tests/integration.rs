//! End-to-end: YAML document to per-tick force and moment evaluation.

use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use nalgebra::Vector3;
use tempfile::TempDir;

use airframe::config::load_model;
use airframe::model::{AxisDimension, Kinematics};
use airframe::utils::ConfigError;
use airframe::DynamicsModel;

const CRAFT: &str = r#"
name: demo-craft
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
aerodynamics:
  functions:
    - name: aero/function/kCLge
      description: ground effect on lift
      function:
        table:
          independent_var:
            - property: aero/h_b-mac-1?
          data: |
            0.0  1.2
            1.0  1.1
            2.0  1.0
  axes:
    - name: LIFT
      functions:
        - name: aero/force/Lift_alpha
          function:
            product:
              - property: aero/qbar-psf
              - property: metrics/Sw-sqft
              - table:
                  independent_var:
                    - property: aero/alpha-rad
                  data: |
                    -0.2  -0.4
                     0.0   0.2
                     0.2   1.2
    - name: DRAG
      functions:
        - name: aero/force/Drag_basic
          function:
            product:
              - property: aero/qbar-psf
              - property: metrics/Sw-sqft
              - value: 0.03
    - name: PITCH
      functions:
        - name: aero/moment/Pitch_damp
          function:
            product:
              - value: -40.0
              - property: velocities/q-aero-rad_sec
"#;

fn write_craft(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("craft.yaml");
    fs::write(&path, content).unwrap();
    path
}

fn loaded() -> DynamicsModel {
    let dir = TempDir::new().unwrap();
    let path = write_craft(&dir, CRAFT);
    load_model(path).unwrap()
}

#[test]
fn forces_follow_qbar_coefficient_area() {
    let mut model = loaded();
    model.set_kinematics(&Kinematics {
        velocity: Vector3::new(50.0, 0.0, 2.0),
        angular: Vector3::new(0.0, 0.05, 0.0),
        altitude: 1000.0,
        terrain_altitude: 0.0,
        ..Default::default()
    });
    let (force, torque) = model.step(0.02);

    let qbar = model.get("aero/qbar-psf").unwrap();
    let alpha = model.get("aero/alpha-rad").unwrap();
    assert_relative_eq!(alpha, 2.0f32.atan2(50.0), epsilon = 1e-6);

    // linear CL between the (0.0, 0.2) and (0.2, 1.2) breakpoints
    let cl = 0.2 + (1.2 - 0.2) * alpha / 0.2;
    assert_relative_eq!(force.z, -(qbar * 16.0 * cl), max_relative = 1e-4);
    assert_relative_eq!(force.x, -(qbar * 16.0 * 0.03), max_relative = 1e-5);
    assert_relative_eq!(force.y, 0.0);
    assert_relative_eq!(torque.y, -40.0 * 0.05, max_relative = 1e-5);
}

#[test]
fn dynamic_pressure_tracks_altitude() {
    let mut model = loaded();
    let fly_at = |model: &mut DynamicsModel, alt: f32| {
        model.set_kinematics(&Kinematics {
            velocity: Vector3::new(60.0, 0.0, 0.0),
            altitude: alt,
            ..Default::default()
        });
        model.step(0.02);
        model.get("aero/qbar-psf").unwrap()
    };
    let low = fly_at(&mut model, 0.0);
    let high = fly_at(&mut model, 8000.0);
    assert!(high < low, "thinner air must lower dynamic pressure");
    assert_relative_eq!(low, 0.5 * 1.225 * 3600.0, max_relative = 1e-3);
}

#[test]
fn ground_effect_ramps_out_with_height() {
    let mut model = loaded();
    let k_at = |model: &mut DynamicsModel, agl: f32| {
        model.set_kinematics(&Kinematics {
            velocity: Vector3::new(40.0, 0.0, 0.0),
            altitude: 100.0 + agl,
            terrain_altitude: 100.0,
            ..Default::default()
        });
        model.step(0.02);
        model.get("aero/function/kCLge").unwrap()
    };
    // height ratio = agl / chord(1.6)
    assert_relative_eq!(k_at(&mut model, 0.0), 1.2, epsilon = 1e-5);
    assert_relative_eq!(k_at(&mut model, 1.6), 1.1, epsilon = 1e-4);
    assert_relative_eq!(k_at(&mut model, 160.0), 1.0, epsilon = 1e-5);
}

#[test]
fn unknown_axis_parks_functions_off_the_wrench() {
    let dir = TempDir::new().unwrap();
    let doc = CRAFT.replace("- name: DRAG", "- name: SWAY");
    let path = write_craft(&dir, &doc);
    let mut model = load_model(path).unwrap();

    model.set_kinematics(&Kinematics {
        velocity: Vector3::new(50.0, 0.0, 0.0),
        ..Default::default()
    });
    let (force, _) = model.step(0.02);
    // the drag coefficient no longer reaches the force sum
    assert_relative_eq!(force.x, 0.0);
    // but the function itself stays evaluable by name
    let qbar = model.get("aero/qbar-psf").unwrap();
    assert_relative_eq!(
        model.eval_function("aero/force/Drag_basic").unwrap(),
        qbar * 16.0 * 0.03,
        max_relative = 1e-5
    );
    assert_relative_eq!(model.eval_axis(AxisDimension::Dummy), model.get("aero/function/kCLge").unwrap() + qbar * 16.0 * 0.03, max_relative = 1e-4);
}

#[test]
fn three_variable_table_fails_the_load() {
    let dir = TempDir::new().unwrap();
    let doc = CRAFT.replace(
        "                    - property: aero/alpha-rad\n",
        "                    - property: aero/alpha-rad\n                    - property: aero/beta-rad\n                    - property: velocities/mach\n",
    );
    let path = write_craft(&dir, &doc);
    assert!(matches!(
        load_model(path),
        Err(ConfigError::TableDimension(3))
    ));
}

#[test]
fn snapshot_round_trip_preserves_behaviour() {
    let mut model = loaded();
    let kin = Kinematics {
        velocity: Vector3::new(55.0, 1.5, 3.0),
        angular: Vector3::new(0.02, 0.04, -0.01),
        altitude: 2500.0,
        terrain_altitude: 300.0,
        ..Default::default()
    };
    model.set_kinematics(&kin);
    model.step(0.02);

    let json = serde_json::to_string(&model.snapshot()).unwrap();
    let mut restored = DynamicsModel::from_snapshot(&serde_json::from_str(&json).unwrap()).unwrap();

    restored.set_kinematics(&kin);
    let (f1, t1) = model.step(0.02);
    let (f2, t2) = restored.step(0.02);
    assert_relative_eq!(f1.x, f2.x, max_relative = 1e-5);
    assert_relative_eq!(f1.z, f2.z, max_relative = 1e-5);
    assert_relative_eq!(t1.y, t2.y, max_relative = 1e-5);
}

#[test]
fn tuning_properties_default_to_unity() {
    let dir = TempDir::new().unwrap();
    let doc = CRAFT.replace(
        "              - value: 0.03\n",
        "              - value: 0.03\n              - property: tune/drag-gain\n",
    );
    let path = write_craft(&dir, &doc);
    let mut model = load_model(path).unwrap();
    model.set_kinematics(&Kinematics {
        velocity: Vector3::new(50.0, 0.0, 0.0),
        ..Default::default()
    });
    let (baseline, _) = model.step(0.02);

    // halving the gain halves the drag contribution
    model.try_set("tune/drag-gain", 0.5).unwrap();
    let (halved, _) = model.step(0.02);
    assert_relative_eq!(halved.x, baseline.x * 0.5, max_relative = 1e-5);
}
