use nalgebra::Vector3;

use crate::properties::{PropertyId, PropertyStore};

/// Host-supplied kinematic state: body angular rates, attitude roll and the
/// altitude pair driving ground effect.
#[derive(Debug)]
pub struct Motion {
    /// Body angular rate vector (p, q, r), rad/s. Written by the host.
    pub angular: Vector3<f32>,

    pub p: PropertyId,
    pub q: PropertyId,
    pub r: PropertyId,
    pub roll: PropertyId,
    /// Sea-level geometric altitude, m.
    pub alt: PropertyId,
    /// Terrain elevation above sea level, m.
    pub terrain_alt: PropertyId,
    /// Height above ground level, m; derived each tick.
    pub height: PropertyId,
}

impl Motion {
    pub fn new(props: &mut PropertyStore) -> Self {
        Motion {
            angular: Vector3::zeros(),
            p: props.get_or_create("velocities/p-aero-1?"),
            q: props.get_or_create("velocities/q-aero-1?"),
            r: props.get_or_create("velocities/r-aero-1?"),
            roll: props.get_or_create("attitude/roll-1?"),
            alt: props.get_or_create("position/h-sl-1?"),
            terrain_alt: props.get_or_create("position/terrain-elevation-asl-1?"),
            height: props.get_or_create("position/h-agl-1?"),
        }
    }

    pub fn update_property(&self, props: &mut PropertyStore) {
        props.set_value(self.p, self.angular.x);
        props.set_value(self.q, self.angular.y);
        props.set_value(self.r, self.angular.z);
        let agl = props.value(self.alt) - props.value(self.terrain_alt);
        props.set_value(self.height, agl);
    }
}
