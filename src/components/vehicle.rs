use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::document::{MassBalanceDoc, MetricsDoc, Valued};
use crate::config::units::InertiaUnit;
use crate::properties::{PropertyId, PropertyStore};
use crate::utils::math::diagonalize;

/// A named reference point on the airframe, in metres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub position: Vector3<f32>,
}

/// Geometry and mass properties, built once at load time. The raw inertia
/// matrix is converted to SI and diagonalized into principal moments plus
/// the principal-axis frame.
#[derive(Debug)]
pub struct Vehicle {
    pub wing_area: PropertyId,
    pub wing_span: PropertyId,
    pub wing_incidence: PropertyId,
    pub wing_chord: PropertyId,
    pub htail_area: PropertyId,
    pub htail_arm: PropertyId,
    pub vtail_area: PropertyId,
    pub vtail_arm: PropertyId,
    pub empty_weight: PropertyId,
    pub locations: Vec<Location>,

    /// Principal moments of inertia, kg·m².
    pub inertia_tensor: Vector3<f32>,
    /// Principal-axis orientation relative to the body frame.
    pub mass_frame: UnitQuaternion<f32>,
    /// Centre of mass, metres.
    pub center_of_mass: Vector3<f32>,
}

fn si<U: Copy>(v: &Option<Valued<U>>, to_si: impl Fn(U) -> f32) -> f32 {
    v.as_ref().map_or(0.0, |x| x.si(to_si))
}

impl Vehicle {
    pub fn new(props: &mut PropertyStore, metrics: &MetricsDoc, mass: &MassBalanceDoc) -> Self {
        let wing_area = props.get_or_create("metrics/Sw-1?");
        let wing_span = props.get_or_create("metrics/bw-1?");
        let wing_incidence = props.get_or_create("metrics/iw-deg");
        let wing_chord = props.get_or_create("metrics/cbarw-1?");
        let htail_area = props.get_or_create("metrics/Sh-1?");
        let htail_arm = props.get_or_create("metrics/lh-1?");
        let vtail_area = props.get_or_create("metrics/Sv-1?");
        let vtail_arm = props.get_or_create("metrics/lv-1?");
        let empty_weight = props.get_or_create("inertia/empty-weight-1?");

        props.set_value(wing_area, si(&metrics.wing_area, |u| u.to_si()));
        props.set_value(wing_span, si(&metrics.wing_span, |u| u.to_si()));
        props.set_value(wing_incidence, si(&metrics.wing_incidence, |u| u.to_si()));
        props.set_value(wing_chord, si(&metrics.chord, |u| u.to_si()));
        props.set_value(htail_area, si(&metrics.htail_area, |u| u.to_si()));
        props.set_value(htail_arm, si(&metrics.htail_arm, |u| u.to_si()));
        props.set_value(vtail_area, si(&metrics.vtail_area, |u| u.to_si()));
        props.set_value(vtail_arm, si(&metrics.vtail_arm, |u| u.to_si()));
        props.set_value(empty_weight, mass.empty_weight.si(|u| u.to_si()));

        let locations = metrics
            .locations
            .iter()
            .map(|loc| {
                let scale = loc.unit.map_or(1.0, |u| u.to_si());
                Location {
                    name: loc.name.clone(),
                    position: Vector3::new(loc.x, loc.y, loc.z) * scale,
                }
            })
            .collect();

        let ixx = mass.ixx.value;
        let iyy = mass.iyy.value;
        let izz = mass.izz.value;
        let ixy = mass.ixy.map_or(0.0, |v| v.value);
        let ixz = mass.ixz.map_or(0.0, |v| v.value);
        let iyz = mass.iyz.map_or(0.0, |v| v.value);

        let inertia = if mass.negated_crossproduct_inertia {
            Matrix3::new(
                ixx, -ixy, ixz, //
                -ixy, iyy, -iyz, //
                ixz, -iyz, izz,
            )
        } else {
            Matrix3::new(
                ixx, ixy, -ixz, //
                ixy, iyy, iyz, //
                -ixz, iyz, izz,
            )
        };
        let scale = mass.ixx.unit.unwrap_or(InertiaUnit::KilogramSquareMetres).to_si();
        let inertia = inertia * scale;

        let cg_scale = mass.location.unit.map_or(1.0, |u| u.to_si());
        let center_of_mass =
            Vector3::new(mass.location.x, mass.location.y, mass.location.z) * cg_scale;

        let (inertia_tensor, mass_frame) = diagonalize(&inertia);

        Vehicle {
            wing_area,
            wing_span,
            wing_incidence,
            wing_chord,
            htail_area,
            htail_arm,
            vtail_area,
            vtail_arm,
            empty_weight,
            locations,
            inertia_tensor,
            mass_frame,
            center_of_mass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::document::LocationDoc;
    use crate::config::units::{AreaUnit, LengthUnit, WeightUnit};
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    fn valued<U>(value: f32, unit: U) -> Option<Valued<U>> {
        Some(Valued {
            value,
            unit: Some(unit),
        })
    }

    fn test_docs() -> (MetricsDoc, MassBalanceDoc) {
        let metrics = MetricsDoc {
            wing_area: valued(174.0, AreaUnit::SquareFeet),
            wing_span: valued(35.8, LengthUnit::Feet),
            wing_incidence: None,
            chord: valued(4.9, LengthUnit::Feet),
            htail_area: None,
            htail_arm: None,
            vtail_area: None,
            vtail_arm: None,
            locations: vec![LocationDoc {
                name: "AERORP".into(),
                x: 43.2,
                y: 0.0,
                z: 59.4,
                unit: Some(LengthUnit::Inches),
            }],
        };
        let mass = MassBalanceDoc {
            ixx: Valued {
                value: 948.0,
                unit: Some(InertiaUnit::SlugSquareFeet),
            },
            iyy: Valued {
                value: 1346.0,
                unit: Some(InertiaUnit::SlugSquareFeet),
            },
            izz: Valued {
                value: 1967.0,
                unit: Some(InertiaUnit::SlugSquareFeet),
            },
            ixy: None,
            ixz: None,
            iyz: None,
            negated_crossproduct_inertia: true,
            empty_weight: Valued {
                value: 1500.0,
                unit: Some(WeightUnit::Pounds),
            },
            location: LocationDoc {
                name: "CG".into(),
                x: 41.0,
                y: 0.0,
                z: 36.5,
                unit: Some(LengthUnit::Inches),
            },
        };
        (metrics, mass)
    }

    #[test]
    fn converts_geometry_to_si() {
        let (metrics, mass) = test_docs();
        let mut props = PropertyStore::new();
        let vehicle = Vehicle::new(&mut props, &metrics, &mass);

        assert_relative_eq!(props.value(vehicle.wing_area), 174.0 * 0.092903, epsilon = 1e-3);
        assert_relative_eq!(props.value(vehicle.wing_span), 35.8 * 0.3048, epsilon = 1e-3);
        assert_relative_eq!(props.value(vehicle.empty_weight), 1500.0 * 0.453592, epsilon = 1e-2);
        assert_relative_eq!(vehicle.locations[0].position.x, 43.2 * 0.0254, epsilon = 1e-4);
    }

    #[test]
    fn diagonal_inertia_passes_through() {
        let (metrics, mass) = test_docs();
        let mut props = PropertyStore::new();
        let vehicle = Vehicle::new(&mut props, &metrics, &mass);

        let scale = InertiaUnit::SlugSquareFeet.to_si();
        assert_relative_eq!(vehicle.inertia_tensor.x, 948.0 * scale, epsilon = 0.5);
        assert_relative_eq!(vehicle.inertia_tensor.y, 1346.0 * scale, epsilon = 0.5);
        assert_relative_eq!(vehicle.inertia_tensor.z, 1967.0 * scale, epsilon = 0.5);
        assert_relative_eq!(vehicle.mass_frame.angle(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn coupled_inertia_diagonalizes() {
        let (metrics, mut mass) = test_docs();
        mass.ixz = Some(Valued {
            value: 80.0,
            unit: Some(InertiaUnit::SlugSquareFeet),
        });
        let mut props = PropertyStore::new();
        let vehicle = Vehicle::new(&mut props, &metrics, &mass);

        // principal frame reconstructs the SI inertia matrix
        let scale = InertiaUnit::SlugSquareFeet.to_si();
        let expected = Matrix3::new(
            948.0, 0.0, 80.0, //
            0.0, 1346.0, 0.0, //
            80.0, 0.0, 1967.0,
        ) * scale;
        let r = vehicle.mass_frame.to_rotation_matrix().into_inner();
        let rebuilt = r * Matrix3::from_diagonal(&vehicle.inertia_tensor) * r.transpose();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(rebuilt[(i, j)], expected[(i, j)], epsilon = 1.0);
            }
        }
    }
}
